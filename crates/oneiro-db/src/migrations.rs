use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS dreams (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL REFERENCES users(id),
            summary             TEXT NOT NULL,
            content             TEXT NOT NULL,
            dream_date          TEXT NOT NULL,
            is_lucid            INTEGER NOT NULL DEFAULT 0,
            mood_score          INTEGER,
            sleep_duration      REAL,
            sleep_quality       INTEGER,
            bedtime             TEXT,
            sleep_disruptions   TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_dreams_user
            ON dreams(user_id, dream_date);

        CREATE TABLE IF NOT EXISTS symbols (
            id      TEXT PRIMARY KEY,
            name    TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS dream_symbols (
            dream_id    TEXT NOT NULL REFERENCES dreams(id),
            symbol_id   TEXT NOT NULL REFERENCES symbols(id),
            UNIQUE(dream_id, symbol_id)
        );

        CREATE INDEX IF NOT EXISTS idx_dream_symbols_dream
            ON dream_symbols(dream_id);

        CREATE INDEX IF NOT EXISTS idx_dream_symbols_symbol
            ON dream_symbols(symbol_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
