//! Terminal rendering and the interactive session picker.

use std::io::{BufRead, Write};

use quill_agent::{AgentEvent, EventSink};
use quill_core::{SessionError, SessionId};
use quill_session::SessionSelector;

const BLUE: &str = "\u{1b}[94m";
const YELLOW: &str = "\u{1b}[93m";
const GREEN: &str = "\u{1b}[92m";
const RED: &str = "\u{1b}[91m";
const RESET: &str = "\u{1b}[0m";

/// Prints the transcript to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: &AgentEvent) {
        match event {
            AgentEvent::SessionResumed {
                session_id,
                messages,
            } => {
                println!("Resuming session {session_id} with {messages} previous messages");
            }
            AgentEvent::AwaitingInput => {
                print!("{BLUE}You{RESET}: ");
                let _ = std::io::stdout().flush();
            }
            AgentEvent::SwitchedToInteractive => {
                println!("Prompt file done, continuing interactively.");
            }
            AgentEvent::AssistantText { content } => {
                println!("{YELLOW}Agent{RESET}: {content}");
            }
            AgentEvent::ToolCall {
                name, arguments, ..
            } => {
                println!("{GREEN}tool{RESET}: {name}({arguments})");
            }
            AgentEvent::ToolResult {
                success: false,
                output,
                ..
            } => {
                println!("{RED}tool error{RESET}: {output}");
            }
            AgentEvent::ToolResult { .. } | AgentEvent::Done { .. } => {}
        }
    }
}

/// Numbered list on stdout, choice read from stdin. The last entry creates
/// a new session.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSelector;

impl SessionSelector for StdinSelector {
    fn choose(&self, sessions: &[SessionId]) -> Result<Option<SessionId>, SessionError> {
        println!("Available sessions:");
        for (i, id) in sessions.iter().enumerate() {
            println!("  {}. {id}", i + 1);
        }
        println!("  {}. Create new session", sessions.len() + 1);
        print!("Select a session (1-{}): ", sessions.len() + 1);
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| SessionError::Selection(e.to_string()))?;
        parse_selection(&line, sessions)
    }
}

/// Map a 1-based menu choice onto the listed sessions. One past the end
/// means "create new".
pub fn parse_selection(
    input: &str,
    sessions: &[SessionId],
) -> Result<Option<SessionId>, SessionError> {
    let choice: usize = input
        .trim()
        .parse()
        .map_err(|_| SessionError::Selection(format!("invalid selection '{}'", input.trim())))?;

    match choice {
        n if (1..=sessions.len()).contains(&n) => Ok(Some(sessions[n - 1].clone())),
        n if n == sessions.len() + 1 => Ok(None),
        n => Err(SessionError::Selection(format!(
            "selection {n} is out of range 1-{}",
            sessions.len() + 1
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<SessionId> {
        vec![
            SessionId::parse("2024-05-02-10-00-00").unwrap(),
            SessionId::parse("2024-05-01-10-00-00").unwrap(),
        ]
    }

    #[test]
    fn picks_listed_session() {
        let picked = parse_selection("2\n", &ids()).unwrap();
        assert_eq!(picked.unwrap().as_str(), "2024-05-01-10-00-00");
    }

    #[test]
    fn last_entry_creates_new() {
        assert_eq!(parse_selection(" 3 ", &ids()).unwrap(), None);
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        assert!(matches!(
            parse_selection("abc", &ids()),
            Err(SessionError::Selection(_))
        ));
        assert!(parse_selection("0", &ids()).is_err());
        assert!(parse_selection("4", &ids()).is_err());
    }
}
