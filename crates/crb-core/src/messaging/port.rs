use async_trait::async_trait;

use crate::{
    domain::{Destination, MessageRef},
    Result,
};

/// Outbound side of a messenger.
///
/// Text is sent verbatim (no parse mode), so user content reaches the channel
/// exactly as it was typed. Implementations report any transport failure as
/// `Error::Delivery`.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, to: &Destination, text: &str) -> Result<MessageRef>;
}
