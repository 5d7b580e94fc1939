use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::Destination, errors::Error, replies, Result};

const DEFAULT_DATABASE_PATH: &str = "messages.db";
const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 30;

/// Typed process configuration, resolved once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    /// Fixed target for every forwarded message.
    pub channel: Destination,
    pub database_path: PathBuf,
    /// `None` waits on the channel send indefinitely.
    pub delivery_timeout: Option<Duration>,
    pub welcome_text: String,
}

impl Config {
    /// Read `.env` (if present, without overriding the environment), then the
    /// process environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let telegram_bot_token = get("BOT_TOKEN").ok_or_else(|| {
            Error::Config("BOT_TOKEN environment variable is required".to_string())
        })?;
        let channel_raw = get("CHANNEL_ID").ok_or_else(|| {
            Error::Config("CHANNEL_ID environment variable is required".to_string())
        })?;
        let channel = Destination::parse(&channel_raw).ok_or_else(|| {
            Error::Config(format!(
                "CHANNEL_ID must be a numeric chat id or an @channel name, got {channel_raw:?}"
            ))
        })?;

        // Optional
        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let delivery_timeout_secs = match get("DELIVERY_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "DELIVERY_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                ))
            })?,
            None => DEFAULT_DELIVERY_TIMEOUT_SECS,
        };
        let delivery_timeout =
            (delivery_timeout_secs > 0).then(|| Duration::from_secs(delivery_timeout_secs));

        let welcome_text =
            get("WELCOME_TEXT").unwrap_or_else(|| replies::DEFAULT_WELCOME.to_string());

        Ok(Self {
            telegram_bot_token,
            channel,
            database_path,
            delivery_timeout,
            welcome_text,
        })
    }

    /// Token prefix safe to print in logs.
    pub fn masked_token(&self) -> String {
        let prefix: String = self.telegram_bot_token.chars().take(10).collect();
        format!("{prefix}...")
    }
}

/// Variables already set in the environment win over the file. A missing file
/// is fine; an unreadable or malformed one is a startup error.
fn load_dotenv_if_present(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!(
            "failed to load {}: {e}",
            path.display()
        ))),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::ChatId;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn loads_required_values_with_defaults() {
        let cfg = load(&[
            ("BOT_TOKEN", "123456789:ABCDEFGHIJ"),
            ("CHANNEL_ID", "-1001234567890"),
        ])
        .unwrap();

        assert_eq!(cfg.channel, Destination::Chat(ChatId(-1001234567890)));
        assert_eq!(cfg.database_path, PathBuf::from("messages.db"));
        assert_eq!(cfg.delivery_timeout, Some(Duration::from_secs(30)));
        assert_eq!(cfg.welcome_text, replies::DEFAULT_WELCOME);
        assert_eq!(cfg.masked_token(), "123456789:...");
    }

    #[test]
    fn missing_or_blank_required_values_are_fatal() {
        let err = load(&[("CHANNEL_ID", "@roc")]).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("BOT_TOKEN")));

        let err = load(&[("BOT_TOKEN", "t"), ("CHANNEL_ID", "   ")]).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("CHANNEL_ID")));

        let err = load(&[("BOT_TOKEN", "t"), ("CHANNEL_ID", "general")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_dotenv_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        load_dotenv_if_present(&dir.path().join(".env")).unwrap();
    }

    #[test]
    fn malformed_dotenv_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "CRB_TEST_UNTERMINATED=\"never closed\n").unwrap();

        let err = load_dotenv_if_present(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains(".env")));
    }

    #[test]
    fn optional_overrides() {
        let cfg = load(&[
            ("BOT_TOKEN", "t"),
            ("CHANNEL_ID", "@roc_angel_mortal"),
            ("DATABASE_PATH", "/var/lib/crb/messages.db"),
            ("DELIVERY_TIMEOUT_SECS", "0"),
            ("WELCOME_TEXT", "hello!"),
        ])
        .unwrap();

        assert_eq!(
            cfg.channel,
            Destination::Username("@roc_angel_mortal".to_string())
        );
        assert_eq!(cfg.database_path, PathBuf::from("/var/lib/crb/messages.db"));
        assert_eq!(cfg.delivery_timeout, None);
        assert_eq!(cfg.welcome_text, "hello!");

        let err = load(&[
            ("BOT_TOKEN", "t"),
            ("CHANNEL_ID", "1"),
            ("DELIVERY_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
