//! Glucose value types, target ranges and clinical classification
//!
//! All simulated values are mg/dL. The target range is caller-owned and only
//! used for downstream classification, never for generation.

use serde::{Deserialize, Serialize};

use crate::error::{GlucosimError, Result};

/// Glucose value in mg/dL (milligrams per deciliter)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MgDl(pub f64);

impl MgDl {
    /// Format the value with unit suffix, rounded to whole mg/dL
    pub fn format(self) -> String {
        format!("{:.0} mg/dL", self.0)
    }
}

/// Target glucose band used for time-in-range classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    low: f64,
    high: f64,
}

impl Default for TargetRange {
    fn default() -> Self {
        Self { low: 80.0, high: 150.0 }
    }
}

impl TargetRange {
    /// Standard 70-180 mg/dL band
    pub const STANDARD: TargetRange = TargetRange { low: 70.0, high: 180.0 };
    /// Moderately relaxed band for patients with some hypoglycemia risk
    pub const RELAXED: TargetRange = TargetRange { low: 100.0, high: 180.0 };
    /// Conservative band for patients at high hypoglycemia risk
    pub const CONSERVATIVE: TargetRange = TargetRange { low: 120.0, high: 200.0 };

    /// Build a range, rejecting non-finite bounds and `low >= high`
    pub fn new(low: f64, high: f64) -> Result<Self> {
        check_bounds(low, high)?;
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// Classify a reading into the five clinical bands
    pub fn classify(&self, mg_dl: f64) -> GlucoseRange {
        if mg_dl < Thresholds::VERY_LOW_MGDL {
            GlucoseRange::VeryLow
        } else if mg_dl < self.low {
            GlucoseRange::Low
        } else if mg_dl <= self.high {
            GlucoseRange::InRange
        } else if mg_dl <= Thresholds::VERY_HIGH_MGDL {
            GlucoseRange::High
        } else {
            GlucoseRange::VeryHigh
        }
    }

    pub fn format(&self) -> String {
        format!("{:.0}-{:.0} mg/dL", self.low, self.high)
    }
}

pub(crate) fn check_bounds(low: f64, high: f64) -> Result<()> {
    if !low.is_finite() || !high.is_finite() {
        return Err(GlucosimError::invalid(format!(
            "range bounds must be finite (got {low}, {high})"
        )));
    }
    if low >= high {
        return Err(GlucosimError::invalid(format!(
            "range low ({low}) must be below high ({high})"
        )));
    }
    Ok(())
}

/// Fixed clinical thresholds shared by the chart overlays and alerts
pub struct Thresholds;

impl Thresholds {
    /// Severe hypoglycemia
    pub const VERY_LOW_MGDL: f64 = 54.0;
    /// Hypoglycemia line drawn on the CGM chart
    pub const HYPO_MGDL: f64 = 70.0;
    /// Upper edge of the standard 70-180 band
    pub const HIGH_MGDL: f64 = 180.0;
    /// Severe hyperglycemia
    pub const VERY_HIGH_MGDL: f64 = 250.0;
}

/// Classification of glucose value against a target range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlucoseRange {
    VeryLow,  // < 54 mg/dL - severe hypoglycemia
    Low,      // 54 to target low
    InRange,  // target low to target high
    High,     // target high to 250
    VeryHigh, // > 250 mg/dL - risk of ketoacidosis
}

/// Traffic-light status of the current reading (fixed 70/180 lines)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlucoseStatus {
    Low,
    InRange,
    High,
}

impl GlucoseStatus {
    pub fn classify(mg_dl: f64) -> Self {
        if mg_dl < Thresholds::HYPO_MGDL {
            GlucoseStatus::Low
        } else if mg_dl > Thresholds::HIGH_MGDL {
            GlucoseStatus::High
        } else {
            GlucoseStatus::InRange
        }
    }

    pub fn status(self) -> &'static str {
        match self {
            GlucoseStatus::Low => "LOW",
            GlucoseStatus::InRange => "OK",
            GlucoseStatus::High => "HIGH",
        }
    }
}
