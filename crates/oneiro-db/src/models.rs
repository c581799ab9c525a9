//! Database row types — these map directly to SQLite rows.
//! Distinct from the oneiro-types API models to keep the DB layer
//! independent; dates and timestamps stay TEXT here and are parsed at the
//! API boundary.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct SymbolRow {
    pub id: String,
    pub name: String,
}

pub struct DreamRow {
    pub id: String,
    pub user_id: String,
    pub summary: String,
    pub content: String,
    pub dream_date: String,
    pub is_lucid: bool,
    pub mood_score: Option<i64>,
    pub sleep_duration: Option<f64>,
    pub sleep_quality: Option<i64>,
    pub bedtime: Option<String>,
    pub sleep_disruptions: Vec<String>,
    pub created_at: String,
    /// Owner's username, populated only by the feed query's JOIN.
    pub username: Option<String>,
    /// Linked symbol names, filled in by a batch fetch after the row query.
    pub symbols: Vec<String>,
}

/// Insert payload for a new dream plus its symbol names.
pub struct NewDream {
    pub id: String,
    pub user_id: String,
    pub summary: String,
    pub content: String,
    pub dream_date: String,
    pub is_lucid: bool,
    pub mood_score: Option<i64>,
    pub sleep_duration: Option<f64>,
    pub sleep_quality: Option<i64>,
    pub bedtime: Option<String>,
    pub sleep_disruptions: Vec<String>,
    pub symbols: Vec<String>,
}

/// Outcome of a delete attempt; the ownership check happens inside the
/// delete transaction so the check and the delete see the same state.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteDream {
    Deleted,
    NotFound,
    NotOwner,
}

pub struct ProfileStatsRow {
    pub total_dreams: i64,
    pub lucid_dreams: i64,
    pub avg_mood: Option<f64>,
    pub first_dream_date: Option<String>,
    pub last_dream_date: Option<String>,
}
