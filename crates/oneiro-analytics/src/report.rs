use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::recommend::{self, Recommendation};
use crate::record::DreamRecord;
use crate::stats::{Trend, mean, pearson_correlation, trend_of};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamAnalysis {
    pub total_dreams: usize,
    pub date_range: DateRange,
    pub mood_analysis: MoodAnalysis,
    pub sleep_analysis: SleepAnalysis,
    pub lucid_analysis: LucidAnalysis,
    pub symbol_analysis: SymbolAnalysis,
    pub correlations: Correlations,
    pub trends: Vec<MonthlyTrend>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Default, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Default, Serialize)]
pub struct MoodAnalysis {
    /// Mean mood over dreams that carry a score; 0 when none do.
    pub average: f64,
    pub distribution: MoodDistribution,
    pub trend: Trend,
}

/// Mood scores bucketed into five bands. Under the 1-10 input range the
/// blissful band holds exactly the perfect 10s.
#[derive(Debug, Default, Serialize)]
pub struct MoodDistribution {
    pub nightmare: MoodBand,
    pub negative: MoodBand,
    pub neutral: MoodBand,
    pub positive: MoodBand,
    pub blissful: MoodBand,
}

#[derive(Debug, Default, Serialize)]
pub struct MoodBand {
    pub count: usize,
    /// Share of all dreams in the batch, in percent.
    pub percentage: f64,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepAnalysis {
    pub avg_duration: f64,
    pub avg_quality: f64,
    /// Dreams whose sleep duration fell in the 7-9 hour band.
    pub optimal_range: usize,
    pub disruptions: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LucidAnalysis {
    pub percentage: f64,
    pub trend: Trend,
    pub avg_mood_when_lucid: f64,
    pub avg_mood_when_non_lucid: f64,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolAnalysis {
    pub total_unique: usize,
    pub most_common: Vec<SymbolCount>,
    /// Symbols ranked by the mean mood of the dreams carrying them.
    pub symbol_mood_correlation: Vec<SymbolMood>,
}

#[derive(Debug, Serialize)]
pub struct SymbolCount {
    pub symbol: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMood {
    pub symbol: String,
    pub avg_mood: f64,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlations {
    pub sleep_duration_vs_mood: f64,
    pub sleep_quality_vs_mood: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// Year-month key, `YYYY-MM`.
    pub month: String,
    pub dream_count: usize,
    pub lucid_percentage: f64,
    pub avg_mood: f64,
    pub avg_sleep_duration: f64,
}

/// Compute the full analytics report for a batch of dreams. Input order is
/// irrelevant; time-based metrics sort internally.
pub fn analyze(dreams: &[DreamRecord]) -> DreamAnalysis {
    if dreams.is_empty() {
        return DreamAnalysis::default();
    }

    let total = dreams.len();

    let date_range = DateRange {
        start: dreams.iter().map(|d| d.dream_date).min(),
        end: dreams.iter().map(|d| d.dream_date).max(),
    };

    let mood_analysis = mood_analysis(dreams, total);
    let sleep_analysis = sleep_analysis(dreams);
    let lucid_analysis = lucid_analysis(dreams, total);
    let symbol_analysis = symbol_analysis(dreams, total);
    let correlations = correlations(dreams);
    let trends = monthly_trends(dreams);

    let recommendations = recommend::generate(
        &mood_analysis,
        &sleep_analysis,
        &lucid_analysis,
        &correlations,
    );

    DreamAnalysis {
        total_dreams: total,
        date_range,
        mood_analysis,
        sleep_analysis,
        lucid_analysis,
        symbol_analysis,
        correlations,
        trends,
        recommendations,
    }
}

fn mood_analysis(dreams: &[DreamRecord], total: usize) -> MoodAnalysis {
    let scored: Vec<(NaiveDate, f64)> = dreams
        .iter()
        .filter_map(|d| d.mood_score.map(|m| (d.dream_date, m as f64)))
        .collect();
    let scores: Vec<f64> = scored.iter().map(|(_, m)| *m).collect();

    let band = |lo: i64, hi: i64| -> MoodBand {
        let count = dreams
            .iter()
            .filter_map(|d| d.mood_score)
            .filter(|m| (lo..=hi).contains(m))
            .count();
        MoodBand {
            count,
            percentage: count as f64 / total as f64 * 100.0,
        }
    };

    MoodAnalysis {
        average: mean(&scores),
        distribution: MoodDistribution {
            nightmare: band(i64::MIN, 3),
            negative: band(4, 5),
            neutral: band(6, 7),
            positive: band(8, 9),
            blissful: band(10, i64::MAX),
        },
        trend: trend_of(&scored),
    }
}

fn sleep_analysis(dreams: &[DreamRecord]) -> SleepAnalysis {
    let durations: Vec<f64> = dreams.iter().filter_map(|d| d.sleep_duration).collect();
    let qualities: Vec<f64> = dreams
        .iter()
        .filter_map(|d| d.sleep_quality.map(|q| q as f64))
        .collect();

    let mut disruptions: BTreeMap<String, usize> = BTreeMap::new();
    for label in dreams.iter().flat_map(|d| &d.sleep_disruptions) {
        *disruptions.entry(label.clone()).or_default() += 1;
    }

    SleepAnalysis {
        avg_duration: mean(&durations),
        avg_quality: mean(&qualities),
        optimal_range: durations.iter().filter(|d| (7.0..=9.0).contains(*d)).count(),
        disruptions,
    }
}

fn lucid_analysis(dreams: &[DreamRecord], total: usize) -> LucidAnalysis {
    let lucid_count = dreams.iter().filter(|d| d.is_lucid).count();

    let indicator: Vec<(NaiveDate, f64)> = dreams
        .iter()
        .map(|d| (d.dream_date, if d.is_lucid { 1.0 } else { 0.0 }))
        .collect();

    let mood_when = |lucid: bool| -> f64 {
        let moods: Vec<f64> = dreams
            .iter()
            .filter(|d| d.is_lucid == lucid)
            .filter_map(|d| d.mood_score.map(|m| m as f64))
            .collect();
        mean(&moods)
    };

    LucidAnalysis {
        percentage: lucid_count as f64 / total as f64 * 100.0,
        trend: trend_of(&indicator),
        avg_mood_when_lucid: mood_when(true),
        avg_mood_when_non_lucid: mood_when(false),
    }
}

fn symbol_analysis(dreams: &[DreamRecord], total: usize) -> SymbolAnalysis {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for symbol in dreams.iter().flat_map(|d| &d.symbols) {
        *counts.entry(symbol.as_str()).or_default() += 1;
    }

    let mut most_common: Vec<SymbolCount> = counts
        .iter()
        .map(|(symbol, count)| SymbolCount {
            symbol: (*symbol).to_string(),
            count: *count,
            percentage: *count as f64 / total as f64 * 100.0,
        })
        .collect();
    // Count descending, then name, so equal counts rank deterministically.
    most_common.sort_by(|a, b| b.count.cmp(&a.count).then(a.symbol.cmp(&b.symbol)));
    most_common.truncate(10);

    let mut by_mood: Vec<SymbolMood> = counts
        .keys()
        .filter_map(|symbol| {
            let moods: Vec<f64> = dreams
                .iter()
                .filter(|d| d.symbols.iter().any(|s| s == symbol))
                .filter_map(|d| d.mood_score.map(|m| m as f64))
                .collect();
            if moods.is_empty() {
                None
            } else {
                Some(SymbolMood {
                    symbol: (*symbol).to_string(),
                    avg_mood: mean(&moods),
                })
            }
        })
        .collect();
    by_mood.sort_by(|a, b| {
        b.avg_mood
            .partial_cmp(&a.avg_mood)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.symbol.cmp(&b.symbol))
    });
    by_mood.truncate(5);

    SymbolAnalysis {
        total_unique: counts.len(),
        most_common,
        symbol_mood_correlation: by_mood,
    }
}

fn correlations(dreams: &[DreamRecord]) -> Correlations {
    let duration_mood: Vec<(f64, f64)> = dreams
        .iter()
        .filter_map(|d| match (d.sleep_duration, d.mood_score) {
            (Some(dur), Some(m)) => Some((dur, m as f64)),
            _ => None,
        })
        .collect();
    let quality_mood: Vec<(f64, f64)> = dreams
        .iter()
        .filter_map(|d| match (d.sleep_quality, d.mood_score) {
            (Some(q), Some(m)) => Some((q as f64, m as f64)),
            _ => None,
        })
        .collect();

    let split = |pairs: &[(f64, f64)]| -> (Vec<f64>, Vec<f64>) {
        pairs.iter().copied().unzip()
    };

    let (dur, dur_moods) = split(&duration_mood);
    let (qual, qual_moods) = split(&quality_mood);

    Correlations {
        sleep_duration_vs_mood: pearson_correlation(&dur, &dur_moods),
        sleep_quality_vs_mood: pearson_correlation(&qual, &qual_moods),
    }
}

#[derive(Default)]
struct MonthAcc {
    count: usize,
    lucid: usize,
    mood_sum: f64,
    mood_count: usize,
    duration_sum: f64,
    duration_count: usize,
}

fn monthly_trends(dreams: &[DreamRecord]) -> Vec<MonthlyTrend> {
    // BTreeMap keeps the YYYY-MM keys ascending for free.
    let mut months: BTreeMap<String, MonthAcc> = BTreeMap::new();

    for dream in dreams {
        let key = dream.dream_date.format("%Y-%m").to_string();
        let acc = months.entry(key).or_default();
        acc.count += 1;
        if dream.is_lucid {
            acc.lucid += 1;
        }
        if let Some(mood) = dream.mood_score {
            acc.mood_sum += mood as f64;
            acc.mood_count += 1;
        }
        if let Some(duration) = dream.sleep_duration {
            acc.duration_sum += duration;
            acc.duration_count += 1;
        }
    }

    let skip = months.len().saturating_sub(12);
    months
        .into_iter()
        .skip(skip)
        .map(|(month, acc)| MonthlyTrend {
            month,
            dream_count: acc.count,
            lucid_percentage: acc.lucid as f64 / acc.count as f64 * 100.0,
            avg_mood: if acc.mood_count > 0 {
                acc.mood_sum / acc.mood_count as f64
            } else {
                0.0
            },
            avg_sleep_duration: if acc.duration_count > 0 {
                acc.duration_sum / acc.duration_count as f64
            } else {
                0.0
            },
        })
        .collect()
}
