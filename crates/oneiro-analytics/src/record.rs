use chrono::NaiveDate;

/// One dream as seen by the analytics engine. Optional fields reflect what
/// the journal actually captured; a missing value drops the record from the
/// metrics that need it.
#[derive(Debug, Clone)]
pub struct DreamRecord {
    pub dream_date: NaiveDate,
    pub is_lucid: bool,
    /// 1-10 rating of the dream's emotional tone.
    pub mood_score: Option<i64>,
    /// Hours slept, fractional.
    pub sleep_duration: Option<f64>,
    /// 1-10 rating.
    pub sleep_quality: Option<i64>,
    /// Time of day, `HH:MM`. Captured but not used by any current metric.
    pub bedtime: Option<String>,
    pub sleep_disruptions: Vec<String>,
    pub symbols: Vec<String>,
}

impl DreamRecord {
    pub fn new(dream_date: NaiveDate) -> Self {
        Self {
            dream_date,
            is_lucid: false,
            mood_score: None,
            sleep_duration: None,
            sleep_quality: None,
            bedtime: None,
            sleep_disruptions: Vec::new(),
            symbols: Vec::new(),
        }
    }
}
