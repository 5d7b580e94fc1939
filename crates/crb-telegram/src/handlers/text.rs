use std::sync::Arc;

use teloxide::prelude::*;

use crb_core::messaging::types::InboundMessage;

use crate::router::AppState;

pub async fn handle_text(msg: InboundMessage, state: Arc<AppState>) -> ResponseResult<()> {
    // The relay replies to the sender itself and never fails the update.
    let _ = state.relay.handle(&msg).await;
    Ok(())
}
