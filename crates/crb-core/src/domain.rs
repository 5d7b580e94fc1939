use std::fmt;

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Ledger row id. Assigned by the ledger on insert, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where forwarded messages go: a numeric chat id or a public `@channel`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    Chat(ChatId),
    Username(String),
}

impl Destination {
    /// Parse a `CHANNEL_ID` value. Returns `None` for anything that is neither
    /// an integer nor an `@name`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(id) = raw.parse::<i64>() {
            return Some(Destination::Chat(ChatId(id)));
        }
        match raw.strip_prefix('@') {
            Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => {
                Some(Destination::Username(raw.to_string()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Chat(id) => write!(f, "{}", id.0),
            Destination::Username(name) => f.write_str(name),
        }
    }
}
