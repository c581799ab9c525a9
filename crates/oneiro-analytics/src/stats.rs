use chrono::NaiveDate;
use serde::Serialize;

/// Half-mean difference below which a series counts as flat.
pub const TREND_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    #[default]
    Stable,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Classify a time series by comparing the mean of its earlier half against
/// the mean of its later half. The earlier half takes the extra element on
/// odd counts. A difference of magnitude <= 0.1 (and any series shorter
/// than 2 points) is stable.
pub fn trend_of(points: &[(NaiveDate, f64)]) -> Trend {
    if points.len() < 2 {
        return Trend::Stable;
    }

    let mut sorted = points.to_vec();
    sorted.sort_by_key(|(date, _)| *date);

    let split = sorted.len().div_ceil(2);
    let first: Vec<f64> = sorted[..split].iter().map(|(_, v)| *v).collect();
    let second: Vec<f64> = sorted[split..].iter().map(|(_, v)| *v).collect();

    let diff = mean(&second) - mean(&first);
    if diff > TREND_THRESHOLD {
        Trend::Improving
    } else if diff < -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Standard Pearson correlation coefficient over two parallel series.
///
/// Defined as exactly 0 when fewer than 2 paired observations exist or when
/// either series has zero variance; the degenerate denominator would
/// otherwise divide by zero, and downstream consumers rely on the 0.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|a| a * a).sum();

    let var_x = n * sum_x2 - sum_x * sum_x;
    let var_y = n * sum_y2 - sum_y * sum_y;
    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    (numerator / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn trend_short_series_is_stable() {
        assert_eq!(trend_of(&[]), Trend::Stable);
        assert_eq!(trend_of(&[(date("2026-01-01"), 9.0)]), Trend::Stable);
    }

    #[test]
    fn trend_at_threshold_is_stable() {
        // Half means differ by exactly 0.1.
        let points = [(date("2026-01-01"), 5.0), (date("2026-01-02"), 5.1)];
        assert_eq!(trend_of(&points), Trend::Stable);
    }

    #[test]
    fn trend_detects_direction() {
        let up = [
            (date("2026-01-01"), 3.0),
            (date("2026-01-02"), 3.0),
            (date("2026-01-03"), 8.0),
            (date("2026-01-04"), 8.0),
        ];
        assert_eq!(trend_of(&up), Trend::Improving);

        let down: Vec<_> = up.iter().map(|(d, v)| (*d, 10.0 - v)).collect();
        assert_eq!(trend_of(&down), Trend::Declining);
    }

    #[test]
    fn trend_sorts_by_date_before_splitting() {
        // Same values as the improving case, delivered out of order.
        let shuffled = [
            (date("2026-01-03"), 8.0),
            (date("2026-01-01"), 3.0),
            (date("2026-01-04"), 8.0),
            (date("2026-01-02"), 3.0),
        ];
        assert_eq!(trend_of(&shuffled), Trend::Improving);
    }

    #[test]
    fn trend_odd_count_gives_extra_point_to_earlier_half() {
        // First half [1, 1, 10] mean 4, second half [4, 4] mean 4 -> stable.
        // A floor split would compare [1, 1] against [10, 4, 4] instead.
        let points = [
            (date("2026-01-01"), 1.0),
            (date("2026-01-02"), 1.0),
            (date("2026-01-03"), 10.0),
            (date("2026-01-04"), 4.0),
            (date("2026-01-05"), 4.0),
        ];
        assert_eq!(trend_of(&points), Trend::Stable);
    }

    #[test]
    fn pearson_is_symmetric_and_bounded() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];

        let xy = pearson_correlation(&x, &y);
        let yx = pearson_correlation(&y, &x);
        assert!((xy - yx).abs() < 1e-12);
        assert!((-1.0..=1.0).contains(&xy));
    }

    #[test]
    fn pearson_perfect_correlation() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 6.0];
        assert!((pearson_correlation(&x, &y) - 1.0).abs() < 1e-12);

        let inv = [6.0, 4.0, 2.0];
        assert!((pearson_correlation(&x, &inv) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_degenerate_inputs_are_zero() {
        assert_eq!(pearson_correlation(&[], &[]), 0.0);
        assert_eq!(pearson_correlation(&[1.0], &[2.0]), 0.0);
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[3.0]), 0.0);
        // Constant series has zero variance.
        assert_eq!(pearson_correlation(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), 0.0);
    }
}
