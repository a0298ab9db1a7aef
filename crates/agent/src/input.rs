//! Where user turns come from.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

/// Words that end a live session.
pub const EXIT_WORDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// A source of user turns. `None` means the source is exhausted.
#[async_trait]
pub trait InputSource: Send {
    async fn next_turn(&mut self) -> Option<String>;

    /// Whether a person is typing on the other end.
    fn is_live(&self) -> bool {
        false
    }
}

/// Pre-loaded turns, handed out in order.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    turns: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(turns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            turns: turns.into_iter().map(Into::into).collect(),
        }
    }

    /// A script with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_turn(&mut self) -> Option<String> {
        self.turns.pop_front()
    }
}

/// Line-oriented reader over a terminal (or anything that looks like one).
///
/// Blank lines are skipped. End of input and the [`EXIT_WORDS`] both end
/// the source.
pub struct TerminalInput<R> {
    lines: Lines<BufReader<R>>,
}

impl TerminalInput<tokio::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin + Send> TerminalInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> InputSource for TerminalInput<R> {
    async fn next_turn(&mut self) -> Option<String> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read input");
                    return None;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if EXIT_WORDS.contains(&trimmed) {
                return None;
            }
            return Some(line);
        }
    }

    fn is_live(&self) -> bool {
        true
    }
}
