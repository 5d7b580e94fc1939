use crate::domain::{ChatId, UserId};

/// A message received from a user, already stripped of transport details.
///
/// `text` is `None` for stickers, photos and anything else without a text body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub text: Option<String>,
}

impl InboundMessage {
    pub fn text(
        chat_id: ChatId,
        user_id: UserId,
        username: Option<&str>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            chat_id,
            user_id,
            username: username.map(str::to_string),
            text: Some(text.into()),
        }
    }
}

/// Bot commands understood by the adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Stats,
    Unknown(String),
    /// `/cmd@SomeOtherBot`: neither answered nor relayed.
    ForOtherBot,
}

impl Command {
    /// Parse `/cmd`, `/cmd@botname` and `/cmd args`. Returns `None` for text
    /// that is not a command at all, including a bare `/`.
    ///
    /// `bot_username` is this bot's username without `@`; when it is empty,
    /// any `@suffix` is accepted.
    pub fn parse(text: &str, bot_username: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        let body = first.strip_prefix('/')?;
        let (name, target) = match body.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (body, None),
        };
        if name.is_empty() {
            return None;
        }

        if let Some(target) = target {
            if !bot_username.is_empty() && !target.eq_ignore_ascii_case(bot_username) {
                return Some(Command::ForOtherBot);
            }
        }

        let name = name.to_lowercase();
        Some(match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "stats" => Command::Stats,
            _ => Command::Unknown(name),
        })
    }
}
