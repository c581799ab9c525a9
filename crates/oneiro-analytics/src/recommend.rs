use serde::Serialize;

use crate::report::{Correlations, LucidAnalysis, MoodAnalysis, SleepAnalysis};

/// Presentation hint only; no ordering or filtering keys off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub description: String,
    pub priority: Priority,
}

/// Fixed rule list over the computed aggregates. The thresholds are policy
/// constants the dashboard was tuned around; they are compared as-is
/// against the (zero-defaulted) aggregates.
pub fn generate(
    mood: &MoodAnalysis,
    sleep: &SleepAnalysis,
    lucid: &LucidAnalysis,
    correlations: &Correlations,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if mood.average < 6.0 {
        recommendations.push(Recommendation {
            kind: "mood",
            title: "Improve Dream Mood",
            description: "Your average dream mood is below neutral. Consider dream \
                          incubation techniques or keeping a gratitude journal before bed."
                .to_string(),
            priority: Priority::High,
        });
    }

    if sleep.avg_duration < 7.0 {
        recommendations.push(Recommendation {
            kind: "sleep",
            title: "Increase Sleep Duration",
            description: format!(
                "You're averaging {:.1} hours of sleep. Aim for 7-9 hours for better \
                 dream recall and mood.",
                sleep.avg_duration
            ),
            priority: Priority::High,
        });
    }

    if sleep.avg_quality < 6.0 {
        recommendations.push(Recommendation {
            kind: "sleep",
            title: "Improve Sleep Quality",
            description: "Your sleep quality could be improved. Consider a consistent \
                          bedtime routine and limiting screen time before bed."
                .to_string(),
            priority: Priority::Medium,
        });
    }

    if lucid.percentage < 10.0 {
        recommendations.push(Recommendation {
            kind: "lucid",
            title: "Enhance Lucid Dreaming",
            description: "Try reality checks throughout the day and keep a detailed \
                          dream journal to increase lucid dream frequency."
                .to_string(),
            priority: Priority::Low,
        });
    }

    if correlations.sleep_quality_vs_mood > 0.3 {
        recommendations.push(Recommendation {
            kind: "insight",
            title: "Sleep Quality Affects Your Dreams",
            description: "Your data shows better sleep quality correlates with more \
                          positive dreams. Prioritize sleep hygiene."
                .to_string(),
            priority: Priority::Medium,
        });
    }

    recommendations
}
