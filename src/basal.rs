//! Age-shaped starting basal profiles
//!
//! The flat rate from the TDD share is scaled per 3-hour segment so the
//! profile follows the typical circadian need of each age group.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dosing::average_basal_rate;
use crate::error::{GlucosimError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgeGroup {
    /// 5-12
    Child,
    /// 13-18
    Adolescent,
    /// 19-65
    #[default]
    Adult,
    /// 65+
    Elderly,
}

impl AgeGroup {
    /// Multipliers for the segments starting at 0, 3, 6, ... 21h
    fn multipliers(self) -> [f64; 8] {
        match self {
            // Reverse pattern: higher afternoon need
            AgeGroup::Child => [0.7, 0.6, 0.8, 1.0, 1.1, 1.2, 1.1, 0.9],
            // Strong dawn effect
            AgeGroup::Adolescent => [0.9, 1.3, 1.1, 1.0, 0.8, 0.7, 0.8, 1.0],
            AgeGroup::Adult => [0.8, 1.2, 1.0, 0.9, 0.8, 0.7, 0.8, 0.9],
            // Flatter profile
            AgeGroup::Elderly => [0.9, 1.0, 1.0, 0.9, 0.8, 0.7, 0.8, 0.9],
        }
    }
}

impl FromStr for AgeGroup {
    type Err = GlucosimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "child" => Ok(AgeGroup::Child),
            "adolescent" | "teen" => Ok(AgeGroup::Adolescent),
            "adult" => Ok(AgeGroup::Adult),
            "elderly" => Ok(AgeGroup::Elderly),
            _ => Err(GlucosimError::invalid(format!("unknown age group: {s:?}"))),
        }
    }
}

const SEGMENTS: [(u8, &str, &str); 8] = [
    (0, "Midnight", "Overnight maintenance"),
    (3, "3:00 AM", "Dawn phenomenon peak"),
    (6, "6:00 AM", "Post-dawn adjustment"),
    (9, "9:00 AM", "Morning activity"),
    (12, "Noon", "Midday lowest"),
    (15, "3:00 PM", "Afternoon activity"),
    (18, "6:00 PM", "Evening meals"),
    (21, "9:00 PM", "Pre-sleep"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasalSegment {
    pub start_hour: u8,
    pub label: String,
    /// U/hr
    pub rate: f64,
    pub rationale: String,
}

pub fn basal_profile(tdd: f64, basal_percent: f64, age: AgeGroup) -> Result<Vec<BasalSegment>> {
    let base_rate = average_basal_rate(tdd, basal_percent)?;

    Ok(SEGMENTS
        .iter()
        .zip(age.multipliers())
        .map(|(&(start_hour, label, rationale), mult)| BasalSegment {
            start_hour,
            label: label.to_string(),
            rate: base_rate * mult,
            rationale: rationale.to_string(),
        })
        .collect())
}
