use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// JWT claims shared by the auth handlers (token mint) and the request
/// middleware (token validation). Canonical definition lives here in
/// oneiro-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserInfo,
    pub token: String,
}

/// Public view of a user — never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

// -- Dreams --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDreamRequest {
    /// Legacy clients send the owner id in the body; it must match the
    /// authenticated user when present.
    pub user_id: Option<Uuid>,
    pub content: String,
    pub summary: String,
    #[serde(default)]
    pub is_lucid: bool,
    pub mood_score: Option<i64>,
    pub dream_date: NaiveDate,
    pub sleep_duration: Option<f64>,
    pub sleep_quality: Option<i64>,
    pub bedtime: Option<String>,
    #[serde(default)]
    pub sleep_disruptions: Vec<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateDreamResponse {
    pub message: String,
    #[serde(rename = "dreamId")]
    pub dream_id: Uuid,
}

/// A dream as returned by every read endpoint. The stored summary is
/// exposed as `title`; `username` is only populated on the public feed.
#[derive(Debug, Clone, Serialize)]
pub struct DreamResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub dream_date: NaiveDate,
    pub is_lucid: bool,
    pub mood_score: Option<i64>,
    pub sleep_duration: Option<f64>,
    pub sleep_quality: Option<i64>,
    pub bedtime: Option<String>,
    pub sleep_disruptions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub symbols: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub dreams: Vec<DreamResponse>,
    pub total: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

// -- Symbols --

#[derive(Debug, Serialize)]
pub struct PopularSymbol {
    pub name: String,
    pub dream_count: i64,
}

// -- Profile --

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserInfo,
    pub statistics: ProfileStatistics,
    #[serde(rename = "topSymbols")]
    pub top_symbols: Vec<SymbolFrequency>,
    #[serde(rename = "dreamFrequency")]
    pub dream_frequency: Vec<MonthlyCount>,
    #[serde(rename = "recentDreams")]
    pub recent_dreams: Vec<DreamResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProfileStatistics {
    pub total_dreams: i64,
    pub lucid_dreams: i64,
    pub avg_mood: Option<f64>,
    pub first_dream_date: Option<NaiveDate>,
    pub last_dream_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SymbolFrequency {
    pub name: String,
    pub frequency: i64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyCount {
    /// Year-month key, `YYYY-MM`.
    pub month: String,
    pub dream_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TimelineEntry {
    pub symbol: String,
    pub month: String,
    pub usage_count: i64,
}
