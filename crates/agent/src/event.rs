//! Engine events.
//!
//! `AgentEvent` is what the conversation engine reports as it moves between
//! states. Front ends implement [`EventSink`] to render them; the default
//! [`TracingSink`] only logs.

use serde::{Deserialize, Serialize};

/// Events emitted while a session runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A session with prior history was picked up.
    SessionResumed { session_id: String, messages: usize },

    /// The engine is waiting on a person to type.
    AwaitingInput,

    /// The scripted input ran out and a live terminal took over.
    SwitchedToInteractive,

    /// Assistant text.
    AssistantText { content: String },

    /// The model asked for a tool.
    ToolCall {
        id: String,
        name: String,
        arguments: String,
    },

    /// A tool finished (successfully or not).
    ToolResult {
        id: String,
        name: String,
        output: String,
        success: bool,
    },

    /// The run reached its terminal state.
    Done {
        session_id: String,
        inferences: usize,
        tool_calls_made: usize,
    },
}

impl AgentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionResumed { .. } => "session_resumed",
            Self::AwaitingInput => "awaiting_input",
            Self::SwitchedToInteractive => "switched_to_interactive",
            Self::AssistantText { .. } => "assistant_text",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Done { .. } => "done",
        }
    }
}

/// Receives engine events. Called inline from the run loop, so keep it cheap.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &AgentEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &AgentEvent) {
        match event {
            AgentEvent::AssistantText { content } => {
                tracing::info!(chars = content.len(), "Assistant replied");
            }
            AgentEvent::ToolCall { name, arguments, .. } => {
                tracing::info!(tool = %name, arguments = %arguments, "Tool call");
            }
            AgentEvent::ToolResult { name, success, .. } => {
                tracing::debug!(tool = %name, success, "Tool result");
            }
            other => tracing::debug!(event = other.event_type(), "Agent event"),
        }
    }
}
