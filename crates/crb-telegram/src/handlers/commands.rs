use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, warn};

use crb_core::{
    domain::{ChatId, Destination},
    ledger::Ledger,
    messaging::types::Command,
    replies, stats,
};

use crate::router::AppState;

pub async fn handle_command(
    cmd: Command,
    chat_id: ChatId,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(reply) = command_reply(&cmd, &state.cfg.welcome_text, state.ledger.as_ref()).await
    else {
        return Ok(());
    };

    if let Err(e) = state
        .messenger
        .send_text(&Destination::Chat(chat_id), &reply)
        .await
    {
        warn!(chat_id = chat_id.0, error = %e, "failed to answer command");
    }
    Ok(())
}

/// `None` for commands this bot must stay silent on.
async fn command_reply(cmd: &Command, welcome: &str, ledger: &dyn Ledger) -> Option<String> {
    let reply = match cmd {
        Command::Start | Command::Help => welcome.to_string(),
        Command::Stats => match stats::stats(ledger).await {
            Ok(stats) => stats.to_string(),
            Err(e) => {
                error!(error = %e, "stats query failed");
                replies::GENERIC_FAILURE.to_string()
            }
        },
        Command::Unknown(name) => replies::unknown_command(name),
        Command::ForOtherBot => return None,
    };
    Some(reply)
}
