use std::fmt;

use crate::{ledger::Ledger, Result};

/// Snapshot of the ledger counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: u64,
    pub forwarded: u64,
}

impl Stats {
    /// Records that were received but never made it to the channel.
    pub fn failed(&self) -> u64 {
        self.total.saturating_sub(self.forwarded)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bot Statistics:\nTotal messages received: {}\nSuccessfully forwarded: {}",
            self.total, self.forwarded
        )
    }
}

pub async fn stats(ledger: &dyn Ledger) -> Result<Stats> {
    ledger.stats().await
}
