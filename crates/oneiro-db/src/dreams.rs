use std::collections::HashMap;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use tracing::warn;
use uuid::Uuid;

use crate::Database;
use crate::models::{DeleteDream, DreamRow, NewDream, ProfileStatsRow};

/// Column list shared by every dream read; mapper below reads by position.
pub(crate) const DREAM_COLS: &str = "d.id, d.user_id, d.summary, d.content, d.dream_date, \
     d.is_lucid, d.mood_score, d.sleep_duration, d.sleep_quality, d.bedtime, \
     d.sleep_disruptions, d.created_at";

pub(crate) fn dream_from_row(row: &rusqlite::Row) -> rusqlite::Result<DreamRow> {
    let disruptions: Option<String> = row.get(10)?;
    Ok(DreamRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        summary: row.get(2)?,
        content: row.get(3)?,
        dream_date: row.get(4)?,
        is_lucid: row.get(5)?,
        mood_score: row.get(6)?,
        sleep_duration: row.get(7)?,
        sleep_quality: row.get(8)?,
        bedtime: row.get(9)?,
        sleep_disruptions: parse_disruptions(disruptions.as_deref()),
        created_at: row.get(11)?,
        username: None,
        symbols: Vec::new(),
    })
}

fn parse_disruptions(raw: Option<&str>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(s) => serde_json::from_str(s).unwrap_or_else(|e| {
            warn!("Corrupt sleep_disruptions '{}': {}", s, e);
            Vec::new()
        }),
    }
}

/// Batch-fetch symbol names for a page of dreams and attach them in memory.
/// One IN query instead of a per-dream lookup.
pub(crate) fn attach_symbols(conn: &Connection, dreams: &mut [DreamRow]) -> Result<()> {
    if dreams.is_empty() {
        return Ok(());
    }

    let placeholders: Vec<String> = (1..=dreams.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "SELECT ds.dream_id, s.name
         FROM dream_symbols ds
         JOIN symbols s ON ds.symbol_id = s.id
         WHERE ds.dream_id IN ({})",
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::types::ToSql> = dreams
        .iter()
        .map(|d| &d.id as &dyn rusqlite::types::ToSql)
        .collect();

    let pairs = stmt
        .query_map(params.as_slice(), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut by_dream: HashMap<String, Vec<String>> = HashMap::new();
    for (dream_id, name) in pairs {
        by_dream.entry(dream_id).or_default().push(name);
    }

    for dream in dreams.iter_mut() {
        if let Some(names) = by_dream.remove(&dream.id) {
            dream.symbols = names;
        }
    }

    Ok(())
}

impl Database {
    /// Insert a dream together with its symbol links in one transaction:
    /// either the dream, every find-or-create symbol, and every link land,
    /// or none do.
    pub fn insert_dream(&self, dream: &NewDream) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let disruptions_json = if dream.sleep_disruptions.is_empty() {
                None
            } else {
                Some(serde_json::to_string(&dream.sleep_disruptions)?)
            };

            tx.execute(
                "INSERT INTO dreams
                 (id, user_id, summary, content, dream_date, is_lucid, mood_score,
                  sleep_duration, sleep_quality, bedtime, sleep_disruptions)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                rusqlite::params![
                    dream.id,
                    dream.user_id,
                    dream.summary,
                    dream.content,
                    dream.dream_date,
                    dream.is_lucid,
                    dream.mood_score,
                    dream.sleep_duration,
                    dream.sleep_quality,
                    dream.bedtime,
                    disruptions_json,
                ],
            )?;

            for name in &dream.symbols {
                let symbol_id: String = match tx
                    .query_row("SELECT id FROM symbols WHERE name = ?1", [name], |row| {
                        row.get(0)
                    })
                    .optional()?
                {
                    Some(id) => id,
                    None => {
                        let id = Uuid::new_v4().to_string();
                        tx.execute(
                            "INSERT INTO symbols (id, name) VALUES (?1, ?2)",
                            (&id, name),
                        )?;
                        id
                    }
                };

                tx.execute(
                    "INSERT OR IGNORE INTO dream_symbols (dream_id, symbol_id) VALUES (?1, ?2)",
                    (&dream.id, &symbol_id),
                )?;
            }

            tx.commit()?;
            Ok(())
        })
    }

    /// All of a user's dreams, newest dream date first, symbols attached.
    pub fn dreams_for_user(&self, user_id: &str) -> Result<Vec<DreamRow>> {
        self.query_user_dreams(user_id, None)
    }

    /// The user's most recent dreams (by dream date), symbols attached.
    pub fn recent_dreams(&self, user_id: &str, limit: i64) -> Result<Vec<DreamRow>> {
        self.query_user_dreams(user_id, Some(limit))
    }

    fn query_user_dreams(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<DreamRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {DREAM_COLS} FROM dreams d
                 WHERE d.user_id = ?1
                 ORDER BY d.dream_date DESC, d.created_at DESC
                 LIMIT ?2"
            );

            let mut stmt = conn.prepare(&sql)?;
            // SQLite treats a negative LIMIT as unbounded.
            let mut rows = stmt
                .query_map(rusqlite::params![user_id, limit.unwrap_or(-1)], dream_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            attach_symbols(conn, &mut rows)?;
            Ok(rows)
        })
    }

    /// Ownership check and delete run in the same transaction; links go
    /// first to satisfy the foreign key.
    pub fn delete_dream(&self, dream_id: &str, user_id: &str) -> Result<DeleteDream> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owner: Option<String> = tx
                .query_row(
                    "SELECT user_id FROM dreams WHERE id = ?1",
                    [dream_id],
                    |row| row.get(0),
                )
                .optional()?;

            let outcome = match owner {
                None => DeleteDream::NotFound,
                Some(owner_id) if owner_id != user_id => DeleteDream::NotOwner,
                Some(_) => {
                    tx.execute("DELETE FROM dream_symbols WHERE dream_id = ?1", [dream_id])?;
                    tx.execute("DELETE FROM dreams WHERE id = ?1", [dream_id])?;
                    DeleteDream::Deleted
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    /// Public feed: dreams from all users with the owner's username,
    /// optionally restricted to dreams carrying one symbol.
    pub fn feed(&self, symbol: Option<&str>, limit: i64, offset: i64) -> Result<Vec<DreamRow>> {
        self.with_conn(|conn| {
            let base = format!(
                "SELECT {DREAM_COLS}, u.username
                 FROM dreams d
                 JOIN users u ON d.user_id = u.id"
            );
            let order = " ORDER BY d.dream_date DESC, d.created_at DESC LIMIT ?1 OFFSET ?2";

            let mut rows = if let Some(name) = symbol {
                let sql = format!(
                    "{base}
                     WHERE EXISTS (
                         SELECT 1 FROM dream_symbols ds
                         JOIN symbols s ON ds.symbol_id = s.id
                         WHERE ds.dream_id = d.id AND s.name = ?3
                     ){order}"
                );
                let mut stmt = conn.prepare(&sql)?;
                stmt.query_map(rusqlite::params![limit, offset, name], feed_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            } else {
                let sql = format!("{base}{order}");
                let mut stmt = conn.prepare(&sql)?;
                stmt.query_map(rusqlite::params![limit, offset], feed_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };

            attach_symbols(conn, &mut rows)?;
            Ok(rows)
        })
    }

    // -- Profile statistics --

    pub fn profile_stats(&self, user_id: &str) -> Result<ProfileStatsRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(is_lucid), 0),
                        AVG(mood_score),
                        MIN(dream_date),
                        MAX(dream_date)
                 FROM dreams
                 WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(ProfileStatsRow {
                        total_dreams: row.get(0)?,
                        lucid_dreams: row.get(1)?,
                        avg_mood: row.get(2)?,
                        first_dream_date: row.get(3)?,
                        last_dream_date: row.get(4)?,
                    })
                },
            )?;
            Ok(row)
        })
    }

    /// The user's most frequent symbols, descending.
    pub fn top_symbols_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<(String, i64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.name, COUNT(*) AS frequency
                 FROM dreams d
                 JOIN dream_symbols ds ON d.id = ds.dream_id
                 JOIN symbols s ON ds.symbol_id = s.id
                 WHERE d.user_id = ?1
                 GROUP BY s.name
                 ORDER BY frequency DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Dream counts per calendar month for the trailing 12 months.
    pub fn monthly_dream_counts(&self, user_id: &str) -> Result<Vec<(String, i64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT strftime('%Y-%m', dream_date) AS month, COUNT(*)
                 FROM dreams
                 WHERE user_id = ?1
                   AND dream_date >= date('now', '-12 months')
                 GROUP BY month
                 ORDER BY month",
            )?;
            let rows = stmt
                .query_map([user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Per-symbol per-month usage over the trailing 12 months, ordered by
    /// month then usage descending.
    pub fn symbol_timeline(&self, user_id: &str) -> Result<Vec<(String, String, i64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.name, strftime('%Y-%m', d.dream_date) AS month, COUNT(*) AS usage_count
                 FROM dreams d
                 JOIN dream_symbols ds ON d.id = ds.dream_id
                 JOIN symbols s ON ds.symbol_id = s.id
                 WHERE d.user_id = ?1
                   AND d.dream_date >= date('now', '-12 months')
                 GROUP BY s.name, month
                 ORDER BY month, usage_count DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn feed_row(row: &rusqlite::Row) -> rusqlite::Result<DreamRow> {
    let mut dream = dream_from_row(row)?;
    dream.username = row.get(12)?;
    Ok(dream)
}
