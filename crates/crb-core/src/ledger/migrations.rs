use rusqlite::Connection;
use tracing::debug;

use crate::Result;

/// Create the `messages` table if it does not exist yet.
///
/// The layout matches databases written by earlier versions of the bot, so an
/// existing `messages.db` can be reused as is.
pub(super) fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS messages (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       INTEGER,
            username      TEXT,
            message_text  TEXT,
            timestamp     DATETIME,
            forwarded     BOOLEAN DEFAULT FALSE
        );
        ",
    )?;

    debug!("ledger schema ready");
    Ok(())
}
