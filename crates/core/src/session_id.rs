//! Session identifiers: local timestamps at second precision.
//!
//! The format (`YYYY-MM-DD-HH-MM-SS`) sorts lexically in creation order, which
//! is what the session listing relies on.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

const FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
const LEN: usize = "2006-01-02-15-04-05".len();

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// A fresh id for the current local time.
    pub fn generate() -> Self {
        Self::at(Local::now())
    }

    pub fn at<Tz: TimeZone>(time: DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(time.format(FORMAT).to_string())
    }

    /// Validate and wrap an existing id.
    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(SessionError::InvalidId { id: raw.to_string() })
        }
    }

    pub fn is_valid(raw: &str) -> bool {
        raw.len() == LEN && NaiveDateTime::parse_from_str(raw, FORMAT).is_ok()
    }

    /// The id one second later. Used to step past a directory that is already taken.
    pub fn next(&self) -> Self {
        match NaiveDateTime::parse_from_str(&self.0, FORMAT) {
            Ok(time) => Self((time + chrono::Duration::seconds(1)).format(FORMAT).to_string()),
            Err(_) => self.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}
