//! Message and Conversation domain types.
//!
//! These are the core value objects that flow through the entire system:
//! user turn → Conversation → provider → assistant turn → tool results → provider.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (live terminal, prompt file, or preprompt)
    User,
    /// The model
    Assistant,
    /// Tool execution result
    Tool,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content. `None` for assistant turns that only request tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn build(role: Role, content: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::build(Role::User, Some(content.into()))
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::build(Role::Assistant, Some(content.into()))
    }

    /// Create an assistant message that only requests tools.
    pub fn assistant_tool_calls(tool_calls: Vec<MessageToolCall>) -> Self {
        let mut message = Self::build(Role::Assistant, None);
        message.tool_calls = tool_calls;
        message
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::build(Role::Tool, Some(content.into()));
        message.tool_call_id = Some(tool_call_id.into());
        message
    }

    /// The text content, or `""` when there is none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON string, exactly as the model produced them
    pub arguments: String,
}

/// An ordered sequence of messages. Grows monotonically; never truncated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The first tool-result call id that no earlier assistant message emitted.
    pub fn first_dangling_tool_result(&self) -> Option<&str> {
        let mut emitted: HashSet<&str> = HashSet::new();
        for message in &self.messages {
            match message.role {
                Role::Assistant => {
                    emitted.extend(message.tool_calls.iter().map(|tc| tc.id.as_str()));
                }
                Role::Tool => {
                    let call_id = message.tool_call_id.as_deref().unwrap_or("");
                    if !emitted.contains(call_id) {
                        return Some(call_id);
                    }
                }
                Role::User => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> MessageToolCall {
        MessageToolCall {
            id: id.into(),
            name: "read_file".into(),
            arguments: "{}".into(),
        }
    }

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, agent!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), "Hello, agent!");
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn tool_only_assistant_message_has_no_content() {
        let msg = Message::assistant_tool_calls(vec![call("call_1")]);
        assert!(msg.content.is_none());
        assert_eq!(msg.text(), "");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("\"content\""));
    }

    #[test]
    fn conversation_serializes_as_plain_array() {
        let mut conv = Conversation::new();
        conv.push(Message::user("hi"));
        let json = serde_json::to_value(&conv).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[test]
    fn conversation_round_trips_through_messages() {
        let mut conv = Conversation::new();
        assert!(conv.is_empty());
        conv.push(Message::user("hi"));
        conv.push(Message::assistant("hello"));

        let json = serde_json::to_string(&conv).unwrap();
        let back: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.messages[1].text(), "hello");
        assert_eq!(back, conv);
    }

    #[test]
    fn linked_tool_results_are_accepted() {
        let mut conv = Conversation::new();
        conv.push(Message::user("read it"));
        conv.push(Message::assistant_tool_calls(vec![call("call_1"), call("call_2")]));
        conv.push(Message::tool_result("call_1", "ok"));
        conv.push(Message::tool_result("call_2", "ok"));
        assert_eq!(conv.first_dangling_tool_result(), None);
    }

    #[test]
    fn tool_result_before_its_call_is_dangling() {
        let mut conv = Conversation::new();
        conv.push(Message::tool_result("call_9", "orphan"));
        conv.push(Message::assistant_tool_calls(vec![call("call_9")]));
        assert_eq!(conv.first_dangling_tool_result(), Some("call_9"));
    }
}
