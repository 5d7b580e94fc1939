//! Inbound message → ledger record → channel delivery → reply.

use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    domain::{Destination, RecordId},
    errors::Error,
    ledger::{Ledger, ANONYMOUS_USERNAME},
    messaging::{port::MessagingPort, types::InboundMessage},
    replies, Result,
};

/// Why a relay attempt failed. Both kinds produce the same reply to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Storage,
    Delivery,
}

impl FailureKind {
    /// Ledger calls only yield `Storage`/`Io` and the messenger only
    /// `Delivery`; anything else is a bug in an adapter and is logged as such.
    fn of(err: &Error) -> Self {
        match err {
            Error::Storage(_) | Error::Io(_) => FailureKind::Storage,
            Error::Delivery(_) => FailureKind::Delivery,
            Error::Config(_) | Error::Validation(_) | Error::External(_) => {
                warn!(
                    error = %err,
                    "unexpected error kind during relay, counted as delivery failure"
                );
                FailureKind::Delivery
            }
        }
    }
}

/// Terminal state of one [`Relay::handle`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Delivered to the channel and marked forwarded.
    Forwarded { id: RecordId },
    /// No text; nothing was recorded.
    Rejected,
    /// `id` is `None` when the ledger write itself failed.
    Failed {
        id: Option<RecordId>,
        kind: FailureKind,
    },
}

impl RelayOutcome {
    pub fn reply(&self) -> &'static str {
        match self {
            RelayOutcome::Forwarded { .. } => replies::FORWARDED,
            RelayOutcome::Rejected => replies::SEND_TEXT_PROMPT,
            RelayOutcome::Failed { .. } => replies::GENERIC_FAILURE,
        }
    }
}

/// Stateless between calls; all state lives in the ledger.
pub struct Relay {
    ledger: Arc<dyn Ledger>,
    messenger: Arc<dyn MessagingPort>,
    destination: Destination,
    delivery_timeout: Option<Duration>,
}

impl Relay {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        messenger: Arc<dyn MessagingPort>,
        destination: Destination,
    ) -> Self {
        Self {
            ledger,
            messenger,
            destination,
            delivery_timeout: None,
        }
    }

    pub fn with_delivery_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Run one full cycle for `msg`, including the reply to the sender.
    ///
    /// Never returns an error: failures are logged and turned into the generic
    /// failure reply. The record keeps `forwarded = false` unless the channel
    /// send succeeded.
    pub async fn handle(&self, msg: &InboundMessage) -> RelayOutcome {
        let outcome = self.relay(msg).await;

        let sender = Destination::Chat(msg.chat_id);
        if let Err(e) = self.messenger.send_text(&sender, outcome.reply()).await {
            warn!(chat_id = msg.chat_id.0, error = %e, "failed to reply to sender");
        }

        outcome
    }

    async fn relay(&self, msg: &InboundMessage) -> RelayOutcome {
        let text = match validate(msg) {
            Ok(text) => text,
            Err(e) => {
                debug!(user_id = msg.user_id.0, "{e}");
                return RelayOutcome::Rejected;
            }
        };

        let username = msg
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(ANONYMOUS_USERNAME);

        let id = match self.ledger.record(msg.user_id, username, text).await {
            Ok(id) => id,
            Err(e) => return failed(None, e),
        };

        if let Err(e) = self.deliver(text).await {
            return failed(Some(id), e);
        }

        if let Err(e) = self.ledger.mark_forwarded(id).await {
            error!(record = %id, error = %e, "delivered but could not mark record forwarded");
            return RelayOutcome::Failed {
                id: Some(id),
                kind: FailureKind::Storage,
            };
        }

        info!(record = %id, user_id = msg.user_id.0, "message forwarded");
        RelayOutcome::Forwarded { id }
    }

    async fn deliver(&self, text: &str) -> Result<()> {
        let send = self.messenger.send_text(&self.destination, text);
        match self.delivery_timeout {
            Some(limit) => {
                tokio::time::timeout(limit, send).await.map_err(|_| {
                    Error::Delivery(format!("channel send timed out after {limit:?}"))
                })??;
            }
            None => {
                send.await?;
            }
        }
        Ok(())
    }
}

fn validate(msg: &InboundMessage) -> Result<&str> {
    match msg.text.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err(Error::Validation("empty text message".to_string())),
        None => Err(Error::Validation("message has no text".to_string())),
    }
}

fn failed(id: Option<RecordId>, err: Error) -> RelayOutcome {
    let kind = FailureKind::of(&err);
    match (kind, id) {
        (FailureKind::Storage, _) => {
            error!(record = ?id.map(|i| i.0), error = %err, "ledger write failed");
        }
        (FailureKind::Delivery, Some(id)) => {
            error!(record = %id, error = %err, "channel delivery failed");
        }
        (FailureKind::Delivery, None) => {
            error!(error = %err, "channel delivery failed");
        }
    }
    RelayOutcome::Failed { id, kind }
}
