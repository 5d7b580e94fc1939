//! Messenger abstractions. Telegram is the only adapter today.

pub mod port;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
