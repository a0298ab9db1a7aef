//! The conversation engine for quill.
//!
//! The engine follows a **Read → Infer → Route** cycle:
//!
//! 1. **Read** a user turn from the active input source (terminal or script)
//! 2. **Infer**: send the full conversation and the tool schemas to the provider
//! 3. **Route**: if the reply requests tools, dispatch each one, append the
//!    results and go back to step 2
//! 4. Otherwise persist the session and go back to step 1
//!
//! The run ends when the input source is exhausted.

pub mod engine;
pub mod event;
pub mod input;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use engine::{ConversationEngine, RunMode, RunSummary};
pub use event::{AgentEvent, EventSink, TracingSink};
pub use input::{EXIT_WORDS, InputSource, ScriptedInput, TerminalInput};
