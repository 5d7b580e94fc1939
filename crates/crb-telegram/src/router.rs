use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{info, warn};

use crb_core::{config::Config, ledger::Ledger, messaging::port::MessagingPort, relay::Relay};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub relay: Arc<Relay>,
    pub ledger: Arc<dyn Ledger>,
    pub messenger: Arc<dyn MessagingPort>,
    /// Own username (no `@`), empty when `getMe` failed.
    pub bot_username: String,
}

impl AppState {
    pub fn new(
        cfg: Arc<Config>,
        ledger: Arc<dyn Ledger>,
        messenger: Arc<dyn MessagingPort>,
        bot_username: String,
    ) -> Self {
        let relay = Relay::new(ledger.clone(), messenger.clone(), cfg.channel.clone())
            .with_delivery_timeout(cfg.delivery_timeout);
        Self {
            cfg,
            relay: Arc::new(relay),
            ledger,
            messenger,
            bot_username,
        }
    }
}

/// Long-poll Telegram until the process is interrupted.
pub async fn run_polling(cfg: Arc<Config>, ledger: Arc<dyn Ledger>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!(bot = %me.username(), "bot started");
            me.username().to_string()
        }
        Err(e) => {
            warn!(error = %e, "getMe failed; continuing");
            String::new()
        }
    };

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let token = cfg.masked_token();
    let state = Arc::new(AppState::new(cfg, ledger, messenger, bot_username));
    info!(token = %token, channel = %state.relay.destination(), "relaying to channel");

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("dispatcher stopped");
    Ok(())
}
