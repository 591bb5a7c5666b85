//! Summary statistics for a simulated glucose trace
//!
//! Trend, time-in-range and the active-insulin heuristic operate on plain
//! value slices so callers can feed them any window of a series. Malformed
//! input (empty slices, inverted ranges) is rejected instead of producing NaN.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alerts::CgmAlert;
use crate::error::{GlucosimError, Result};
use crate::synth::{GlucoseSeries, BASELINE_MGDL};
use crate::units::{check_bounds, GlucoseRange, GlucoseStatus, TargetRange};

/// Default number of trailing readings used for the trend
pub const DEFAULT_TREND_WINDOW: usize = 3;

/// Trailing readings averaged by the active-insulin estimate (30 minutes)
pub const ACTIVE_INSULIN_WINDOW: usize = 6;

/// mg/dL below baseline attributed to one unit of active insulin
const ACTIVE_INSULIN_DIVISOR: f64 = 40.0;

/// Rate of change over the last `window` readings, in mg/dL per reading.
///
/// Computed as `(last - first) / n` where `n` is the number of readings in
/// the window (fewer than `window` when the input is shorter). Returns 0 for
/// fewer than two readings.
pub fn trend(values: &[f64], window: usize) -> Result<f64> {
    if window < 2 {
        return Err(GlucosimError::invalid(format!(
            "trend window must be at least 2 (got {window})"
        )));
    }
    if values.len() < 2 {
        return Ok(0.0);
    }
    let tail = &values[values.len().saturating_sub(window)..];
    let first = tail[0];
    let last = tail[tail.len() - 1];
    Ok((last - first) / tail.len() as f64)
}

/// Direction bucket for a trend rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    RisingRapidly,
    Rising,
    Stable,
    Falling,
    FallingRapidly,
}

impl TrendDirection {
    /// Boundaries are inclusive toward `Stable`: exactly 3 is `Rising`,
    /// exactly -1 is `Stable`.
    pub fn classify(rate: f64) -> Self {
        if rate > 3.0 {
            TrendDirection::RisingRapidly
        } else if rate > 1.0 {
            TrendDirection::Rising
        } else if rate >= -1.0 {
            TrendDirection::Stable
        } else if rate >= -3.0 {
            TrendDirection::Falling
        } else {
            TrendDirection::FallingRapidly
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrendDirection::RisingRapidly => "rising rapidly",
            TrendDirection::Rising => "rising",
            TrendDirection::Stable => "stable",
            TrendDirection::Falling => "falling",
            TrendDirection::FallingRapidly => "falling rapidly",
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            TrendDirection::RisingRapidly => "⇈",
            TrendDirection::Rising => "↗",
            TrendDirection::Stable => "→",
            TrendDirection::Falling => "↘",
            TrendDirection::FallingRapidly => "⇊",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.arrow(), self.label())
    }
}

/// Percentage (0-100) of readings within `[low, high]`, inclusive
pub fn time_in_range(values: &[f64], low: f64, high: f64) -> Result<f64> {
    check_bounds(low, high)?;
    if values.is_empty() {
        return Err(GlucosimError::invalid("time in range of an empty series"));
    }
    let in_range = values.iter().filter(|&&v| v >= low && v <= high).count();
    Ok(in_range as f64 / values.len() as f64 * 100.0)
}

/// Rough active-insulin figure from the last 30 minutes of readings.
///
/// Not a pharmacokinetic model: any mean below the 120 mg/dL baseline is
/// read as insulin still acting, at one unit per 40 mg/dL.
pub fn active_insulin_estimate(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(GlucosimError::invalid("active insulin of an empty series"));
    }
    let tail = &values[values.len().saturating_sub(ACTIVE_INSULIN_WINDOW)..];
    let mean = tail.iter().sum::<f64>() / tail.len() as f64;
    if mean < BASELINE_MGDL {
        Ok((BASELINE_MGDL - mean) / ACTIVE_INSULIN_DIVISOR)
    } else {
        Ok(0.0)
    }
}

/// Basic statistical measures over mg/dL values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub q1: f64, // 25th percentile
    pub q3: f64, // 75th percentile
}

impl BasicStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std_dev = calculate_std_dev(values, mean);

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            count,
            mean,
            std_dev,
            min: sorted[0],
            max: sorted[count - 1],
            median: percentile(&sorted, 50.0),
            q1: percentile(&sorted, 25.0),
            q3: percentile(&sorted, 75.0),
        })
    }

    /// Coefficient of variation in percent
    pub fn cv_percent(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean * 100.0
        }
    }
}

/// Per-band reading counts against a target range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeInRange {
    pub total: usize,
    pub very_low: usize,
    pub low: usize,
    pub in_range: usize,
    pub high: usize,
    pub very_high: usize,
}

impl TimeInRange {
    pub fn from_values(values: &[f64], range: TargetRange) -> Self {
        let mut tir = Self {
            total: values.len(),
            very_low: 0,
            low: 0,
            in_range: 0,
            high: 0,
            very_high: 0,
        };

        for &v in values {
            match range.classify(v) {
                GlucoseRange::VeryLow => tir.very_low += 1,
                GlucoseRange::Low => tir.low += 1,
                GlucoseRange::InRange => tir.in_range += 1,
                GlucoseRange::High => tir.high += 1,
                GlucoseRange::VeryHigh => tir.very_high += 1,
            }
        }

        tir
    }

    pub fn percentage(&self, band: GlucoseRange) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = match band {
            GlucoseRange::VeryLow => self.very_low,
            GlucoseRange::Low => self.low,
            GlucoseRange::InRange => self.in_range,
            GlucoseRange::High => self.high,
            GlucoseRange::VeryHigh => self.very_high,
        };
        count as f64 / self.total as f64 * 100.0
    }

    pub fn low_percent(&self) -> f64 {
        self.percentage(GlucoseRange::VeryLow) + self.percentage(GlucoseRange::Low)
    }

    pub fn high_percent(&self) -> f64 {
        self.percentage(GlucoseRange::High) + self.percentage(GlucoseRange::VeryHigh)
    }
}

/// Everything the dashboard shows next to the CGM chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub current: f64,
    pub status: GlucoseStatus,
    pub stats: BasicStats,
    pub trend_rate: f64,
    pub trend: TrendDirection,
    pub time_in_range: f64,
    pub breakdown: TimeInRange,
    pub active_insulin: f64,
    pub alert: Option<CgmAlert>,
}

/// Compute the full summary for a series against `range`
pub fn summarize(series: &GlucoseSeries, range: TargetRange, trend_window: usize) -> Result<SeriesSummary> {
    let values = series.values();
    let stats = BasicStats::from_values(&values)
        .ok_or_else(|| GlucosimError::invalid("summary of an empty series"))?;
    let current = values[values.len() - 1];
    let trend_rate = trend(&values, trend_window)?;

    Ok(SeriesSummary {
        current,
        status: GlucoseStatus::classify(current),
        stats,
        trend_rate,
        trend: TrendDirection::classify(trend_rate),
        time_in_range: time_in_range(&values, range.low(), range.high())?,
        breakdown: TimeInRange::from_values(&values, range),
        active_insulin: active_insulin_estimate(&values)?,
        alert: CgmAlert::evaluate(current, trend_rate),
    })
}

// ============= Helper Functions =============

/// Percentile from sorted values, nearest-rank on the rounded index
fn percentile(sorted_values: &[f64], pct: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let idx = ((sorted_values.len() as f64 - 1.0) * pct / 100.0).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

/// Sample standard deviation
fn calculate_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance: f64 = values.iter()
        .map(|&v| (v - mean).powi(2))
        .sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{generate, PatientArchetype};

    #[test]
    fn test_trend_flat_is_stable() {
        let rate = trend(&[100.0, 100.0, 100.0], 3).unwrap();
        assert_eq!(rate, 0.0);
        assert_eq!(TrendDirection::classify(rate), TrendDirection::Stable);
    }

    #[test]
    fn test_trend_rising_rapidly() {
        let rate = trend(&[100.0, 110.0, 115.0], 3).unwrap();
        assert!((rate - 5.0).abs() < 1e-12);
        assert_eq!(TrendDirection::classify(rate), TrendDirection::RisingRapidly);
    }

    #[test]
    fn test_trend_uses_trailing_window() {
        let rate = trend(&[300.0, 100.0, 103.0, 106.0], 3).unwrap();
        assert!((rate - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_trend_short_input() {
        assert_eq!(trend(&[], 3).unwrap(), 0.0);
        assert_eq!(trend(&[140.0], 3).unwrap(), 0.0);
        // Two readings: divisor is the two readings actually used
        assert_eq!(trend(&[100.0, 104.0], 3).unwrap(), 2.0);
        assert!(trend(&[100.0, 104.0], 1).is_err());
    }

    #[test]
    fn test_direction_boundaries() {
        assert_eq!(TrendDirection::classify(3.0), TrendDirection::Rising);
        assert_eq!(TrendDirection::classify(3.01), TrendDirection::RisingRapidly);
        assert_eq!(TrendDirection::classify(1.0), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(1.01), TrendDirection::Rising);
        assert_eq!(TrendDirection::classify(-1.0), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(-1.01), TrendDirection::Falling);
        assert_eq!(TrendDirection::classify(-3.0), TrendDirection::Falling);
        assert_eq!(TrendDirection::classify(-3.01), TrendDirection::FallingRapidly);
    }

    #[test]
    fn test_time_in_range() {
        let values = [60.0, 80.0, 120.0, 150.0, 151.0];
        assert_eq!(time_in_range(&values, 80.0, 150.0).unwrap(), 60.0);
        assert_eq!(time_in_range(&values, 0.0, 1000.0).unwrap(), 100.0);
    }

    #[test]
    fn test_time_in_range_rejects_bad_input() {
        assert!(matches!(
            time_in_range(&[], 70.0, 180.0),
            Err(GlucosimError::InvalidArgument(_))
        ));
        assert!(matches!(
            time_in_range(&[100.0], 180.0, 70.0),
            Err(GlucosimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_active_insulin() {
        let at_baseline = [200.0, 110.0, 130.0, 120.0, 115.0, 125.0, 120.0];
        assert_eq!(active_insulin_estimate(&at_baseline).unwrap(), 0.0);

        let low = [300.0, 70.0, 90.0, 80.0, 75.0, 85.0, 80.0];
        assert!((active_insulin_estimate(&low).unwrap() - 1.0).abs() < 1e-12);

        assert!(active_insulin_estimate(&[]).is_err());
    }

    #[test]
    fn test_basic_stats() {
        let stats = BasicStats::from_values(&[100.0, 120.0, 140.0, 160.0, 180.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert!((stats.mean - 140.0).abs() < 0.01);
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.max, 180.0);
        assert_eq!(stats.median, 140.0);
        assert!(BasicStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_breakdown() {
        let range = TargetRange::new(70.0, 180.0).unwrap();
        let tir = TimeInRange::from_values(&[50.0, 65.0, 100.0, 150.0, 200.0, 300.0], range);
        assert_eq!(tir.very_low, 1);
        assert_eq!(tir.low, 1);
        assert_eq!(tir.in_range, 2);
        assert_eq!(tir.high, 1);
        assert_eq!(tir.very_high, 1);
        assert!((tir.low_percent() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_consistent_with_parts() {
        let series = generate(PatientArchetype::DawnPhenomenon, 42);
        let range = TargetRange::default();
        let summary = summarize(&series, range, DEFAULT_TREND_WINDOW).unwrap();
        let values = series.values();

        assert_eq!(summary.current, values[287]);
        assert_eq!(summary.stats.count, 288);
        assert_eq!(summary.breakdown.total, 288);
        assert_eq!(summary.time_in_range, time_in_range(&values, 80.0, 150.0).unwrap());
        assert!((summary.breakdown.percentage(GlucoseRange::InRange) - summary.time_in_range).abs() < 1e-9);
        assert_eq!(summary.trend, TrendDirection::classify(summary.trend_rate));
    }
}
