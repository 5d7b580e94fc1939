//! Core of the channel relay bot.
//!
//! Framework-agnostic: Telegram lives behind the messaging port, implemented in
//! the `crb-telegram` adapter crate.

pub mod config;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod logging;
pub mod messaging;
pub mod relay;
pub mod replies;
pub mod stats;

pub use errors::{Error, Result};
