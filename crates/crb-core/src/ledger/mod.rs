//! Message ledger: one row per inbound message plus its forwarding status.
//!
//! The relay only talks to the [`Ledger`] trait; [`SqliteLedger`] is the
//! durable implementation used by the bot.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    domain::{RecordId, UserId},
    stats::Stats,
    Result,
};

mod migrations;
mod sqlite;

pub use sqlite::SqliteLedger;

/// Stored in place of a missing Telegram username.
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// One row of the `messages` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub username: String,
    pub message_text: String,
    pub timestamp: NaiveDateTime,
    pub forwarded: bool,
}

/// Durable record store.
///
/// Every method commits before returning. Records are independent rows, so
/// concurrent callers only rely on the implementation being safe for
/// independent inserts/updates.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Insert a new record with `forwarded = false` and the current time.
    async fn record(&self, user_id: UserId, username: &str, text: &str) -> Result<RecordId>;

    /// Set `forwarded = true`. Unknown ids are a no-op; repeating is harmless.
    async fn mark_forwarded(&self, id: RecordId) -> Result<()>;

    async fn count_all(&self) -> Result<u64>;

    async fn count_forwarded(&self) -> Result<u64>;

    async fn get(&self, id: RecordId) -> Result<Option<MessageRecord>>;

    /// Point-in-time counts. The two reads are not taken in one transaction.
    async fn stats(&self) -> Result<Stats> {
        let total = self.count_all().await?;
        let forwarded = self.count_forwarded().await?;
        Ok(Stats { total, forwarded })
    }
}
