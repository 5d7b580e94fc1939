//! Telegram update handlers.
//!
//! Commands (`/start`, `/help`, `/stats`) are answered directly; every other
//! message from a user goes through the relay.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};
use tracing::debug;

use crb_core::{
    domain::{ChatId, UserId},
    messaging::types::{Command, InboundMessage},
};

use crate::router::AppState;

mod commands;
mod text;

/// What to do with one incoming Telegram message.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Ignore,
    Command(Command, ChatId),
    Relay(InboundMessage),
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    match route(&msg, &state.bot_username) {
        Route::Ignore => {
            debug!(chat_id = msg.chat.id.0, "ignoring message");
            Ok(())
        }
        Route::Command(cmd, chat_id) => commands::handle_command(cmd, chat_id, state).await,
        Route::Relay(inbound) => text::handle_text(inbound, state).await,
    }
}

fn route(msg: &Message, bot_username: &str) -> Route {
    let Some(inbound) = inbound_message(msg) else {
        return Route::Ignore;
    };

    match inbound.text.as_deref().and_then(|t| Command::parse(t, bot_username)) {
        Some(Command::ForOtherBot) => Route::Ignore,
        Some(cmd) => Route::Command(cmd, inbound.chat_id),
        None => Route::Relay(inbound),
    }
}

fn inbound_message(msg: &Message) -> Option<InboundMessage> {
    let user = msg.from()?;
    Some(InboundMessage {
        chat_id: ChatId(msg.chat.id.0),
        user_id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        text: msg.text().map(str::to_string),
    })
}
