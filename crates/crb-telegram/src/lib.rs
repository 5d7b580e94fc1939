//! Telegram adapter (teloxide).
//!
//! This crate implements the `crb-core` MessagingPort over the Telegram Bot API
//! and feeds incoming updates into the relay.

use async_trait::async_trait;

use teloxide::{prelude::*, types::Recipient};

pub mod handlers;
pub mod router;

use crb_core::{
    domain::{ChatId, Destination, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn recipient(to: &Destination) -> Recipient {
        match to {
            Destination::Chat(id) => Recipient::Id(teloxide::types::ChatId(id.0)),
            Destination::Username(name) => Recipient::ChannelUsername(name.clone()),
        }
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Delivery(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, to: &Destination, text: &str) -> Result<MessageRef> {
        // Single attempt: a retried send could duplicate a post in the channel.
        let msg = self
            .bot
            .send_message(Self::recipient(to), text.to_string())
            .await
            .map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id: ChatId(msg.chat.id.0),
            message_id: MessageId(msg.id.0),
        })
    }
}
