//! The conversation engine.
//!
//! A run is a small state machine:
//!
//! ```text
//! AwaitingInput --turn--> Inferring --text only--> AwaitingInput
//!       |                     |  ^
//!   exhausted            tool calls |
//!       v                     v  |
//!      Done              RoutingTools
//! ```
//!
//! The session is persisted after every cycle that appended messages, so a
//! crash loses at most the cycle in flight.

use std::sync::Arc;
use std::time::Duration;

use quill_core::error::{ProviderError, Result};
use quill_core::message::{Message, MessageToolCall};
use quill_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use quill_core::tool::ToolRegistry;
use quill_session::{Session, SessionStore};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::event::{AgentEvent, EventSink, TracingSink};
use crate::input::InputSource;

/// How the input sources of a run are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Read turns until the source ends. No inference deadline.
    Interactive,
    /// Play the script, then stop. Inference is bound to the run deadline.
    SingleShot,
    /// Play the script, then hand over to a live source. No deadline.
    SingleShotThenInteractive,
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub inferences: usize,
    pub tool_calls_made: usize,
}

enum State {
    AwaitingInput,
    Inferring,
    RoutingTools(Vec<MessageToolCall>),
    Done,
}

/// Drives one session through user turns, model calls and tool calls.
pub struct ConversationEngine {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// Tools exposed to the model
    tools: Arc<ToolRegistry>,

    /// Where the session is persisted after each cycle
    store: Arc<SessionStore>,

    model: String,
    temperature: f32,
    max_tokens: Option<u32>,

    /// Pause before every inference call
    request_delay: Duration,

    /// Deadline for a single-shot run
    timeout: Option<Duration>,

    /// Texts appended as user messages before the first turn
    preprompts: Vec<String>,

    sink: Arc<dyn EventSink>,
}

impl ConversationEngine {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        store: Arc<SessionStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            store,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            request_delay: Duration::ZERO,
            timeout: None,
            preprompts: Vec::new(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Bound a [`RunMode::SingleShot`] run. Other modes ignore it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_preprompts(mut self, preprompts: Vec<String>) -> Self {
        self.preprompts = preprompts;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run the session until its input ends.
    ///
    /// `live` is only consulted in [`RunMode::SingleShotThenInteractive`],
    /// once `source` is exhausted. An inference error ends the run; tool
    /// failures never do.
    pub async fn run(
        &self,
        session: &mut Session,
        source: Box<dyn InputSource>,
        mode: RunMode,
        live: Option<Box<dyn InputSource>>,
    ) -> Result<RunSummary> {
        if !session.conversation.is_empty() {
            info!(
                session = %session.id,
                messages = session.conversation.len(),
                "Resuming session"
            );
            self.sink.emit(&AgentEvent::SessionResumed {
                session_id: session.id.to_string(),
                messages: session.conversation.len(),
            });
        }

        for text in &self.preprompts {
            session.conversation.push(Message::user(text.clone()));
        }

        let deadline = match (mode, self.timeout) {
            (RunMode::SingleShot, Some(timeout)) => Some(Instant::now() + timeout),
            _ => None,
        };
        let tool_defs = self.tools.list();
        let mut source = source;
        let mut live = live;
        let mut summary = RunSummary::default();
        let mut state = State::AwaitingInput;

        loop {
            state = match state {
                State::AwaitingInput => {
                    if source.is_live() {
                        self.sink.emit(&AgentEvent::AwaitingInput);
                    }
                    match source.next_turn().await {
                        Some(text) => {
                            session.conversation.push(Message::user(text));
                            State::Inferring
                        }
                        None => match (mode, live.take()) {
                            (RunMode::SingleShotThenInteractive, Some(next)) => {
                                debug!("Script exhausted, switching to interactive input");
                                source = next;
                                self.sink.emit(&AgentEvent::SwitchedToInteractive);
                                State::AwaitingInput
                            }
                            _ => State::Done,
                        },
                    }
                }

                State::Inferring => {
                    if !self.request_delay.is_zero() {
                        tokio::time::sleep(self.request_delay).await;
                    }

                    let response = self.infer(session, &tool_defs, deadline).await?;
                    summary.inferences += 1;

                    let message = response.message;
                    if !message.text().is_empty() {
                        self.sink.emit(&AgentEvent::AssistantText {
                            content: message.text().to_string(),
                        });
                    }
                    let calls = message.tool_calls.clone();
                    session.conversation.push(message);

                    if calls.is_empty() {
                        self.persist(session).await;
                        State::AwaitingInput
                    } else {
                        State::RoutingTools(calls)
                    }
                }

                State::RoutingTools(calls) => {
                    for call in &calls {
                        self.sink.emit(&AgentEvent::ToolCall {
                            id: call.id.clone(),
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        });

                        let result = self.tools.dispatch(call).await;
                        summary.tool_calls_made += 1;

                        self.sink.emit(&AgentEvent::ToolResult {
                            id: call.id.clone(),
                            name: call.name.clone(),
                            output: result.output.clone(),
                            success: result.success,
                        });
                        session
                            .conversation
                            .push(Message::tool_result(&call.id, result.output));
                    }
                    self.persist(session).await;
                    State::Inferring
                }

                State::Done => break,
            };
        }

        info!(
            session = %session.id,
            inferences = summary.inferences,
            tool_calls = summary.tool_calls_made,
            "Run finished"
        );
        self.sink.emit(&AgentEvent::Done {
            session_id: session.id.to_string(),
            inferences: summary.inferences,
            tool_calls_made: summary.tool_calls_made,
        });
        Ok(summary)
    }

    async fn infer(
        &self,
        session: &Session,
        tools: &[ToolDefinition],
        deadline: Option<Instant>,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: session.conversation.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: tools.to_vec(),
        };

        debug!(
            provider = self.provider.name(),
            messages = request.messages.len(),
            "Calling provider"
        );

        let Some(deadline) = deadline else {
            return self.provider.complete(request).await;
        };
        let secs = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
        tokio::time::timeout_at(deadline, self.provider.complete(request))
            .await
            .map_err(|_| ProviderError::Timeout(format!("no response within {secs}s")))?
    }

    async fn persist(&self, session: &Session) {
        if let Err(e) = self.store.persist(session).await {
            warn!(session = %session.id, error = %e, "Failed to persist session");
        }
    }
}
