use std::sync::Arc;

use tracing::info;

use crb_core::{
    config::Config,
    ledger::{Ledger, SqliteLedger},
};

#[tokio::main]
async fn main() -> Result<(), crb_core::Error> {
    crb_core::logging::init("crb")?;

    // Missing BOT_TOKEN / CHANNEL_ID aborts here, before touching Telegram.
    let cfg = Arc::new(Config::load()?);
    info!(database = %cfg.database_path.display(), "starting channel relay bot");

    let ledger: Arc<dyn Ledger> = Arc::new(SqliteLedger::open(&cfg.database_path)?);

    let result = crb_telegram::router::run_polling(cfg, ledger.clone()).await;

    match crb_core::stats::stats(ledger.as_ref()).await {
        Ok(stats) => info!(
            total = stats.total,
            forwarded = stats.forwarded,
            failed = stats.failed(),
            "shutting down"
        ),
        Err(e) => info!(error = %e, "shutting down"),
    }
    drop(ledger);

    result.map_err(|e| crb_core::Error::External(format!("telegram bot failed: {e}")))
}
