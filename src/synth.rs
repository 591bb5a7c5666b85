//! Synthetic 24-hour CGM trace generation
//!
//! A trace is a baseline of 120 mg/dL with a dawn rise, an evening rise and
//! three Gaussian meal responses, shaped by the patient archetype, plus
//! seeded Gaussian sensor noise. Values are clamped to the sensor range.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{GlucosimError, Result};

/// 24h at one reading every 5 minutes
pub const POINTS_PER_DAY: usize = 288;
pub const SAMPLE_INTERVAL_MINUTES: u32 = 5;

pub const BASELINE_MGDL: f64 = 120.0;
pub const SENSOR_MIN_MGDL: f64 = 50.0;
pub const SENSOR_MAX_MGDL: f64 = 400.0;
pub const NOISE_STD_DEV: f64 = 10.0;

/// (meal hour, peak rise in mg/dL): breakfast, lunch, dinner
pub const MEALS: [(f64, f64); 3] = [(7.0, 60.0), (12.0, 50.0), (18.0, 70.0)];

/// Patient profile selecting which modifiers shape the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PatientArchetype {
    #[default]
    Normal,
    DawnPhenomenon,
    Gastroparesis,
    /// Currently shaped exactly like `Normal`
    Athletic,
}

impl PatientArchetype {
    pub const ALL: [PatientArchetype; 4] = [
        PatientArchetype::Normal,
        PatientArchetype::DawnPhenomenon,
        PatientArchetype::Gastroparesis,
        PatientArchetype::Athletic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PatientArchetype::Normal => "Normal",
            PatientArchetype::DawnPhenomenon => "Dawn Phenomenon",
            PatientArchetype::Gastroparesis => "Gastroparesis",
            PatientArchetype::Athletic => "Athletic",
        }
    }
}

impl fmt::Display for PatientArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PatientArchetype {
    type Err = GlucosimError;

    /// Accepts display labels and kebab/snake case, ignoring case
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "normal" => Ok(PatientArchetype::Normal),
            "dawn phenomenon" | "dawn" => Ok(PatientArchetype::DawnPhenomenon),
            "gastroparesis" => Ok(PatientArchetype::Gastroparesis),
            "athletic" => Ok(PatientArchetype::Athletic),
            _ => Err(GlucosimError::invalid(format!("unknown patient archetype: {s:?}"))),
        }
    }
}

/// One simulated CGM reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Hour of day in [0, 24)
    pub hour: f64,
    #[serde(rename = "mg/dL")]
    pub glucose: f64,
    /// Minutes since the start of the trace
    pub offset_minutes: u32,
}

impl TimePoint {
    pub fn offset(&self) -> Duration {
        Duration::minutes(i64::from(self.offset_minutes))
    }
}

/// A full day of readings, generated in one go and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseSeries {
    archetype: PatientArchetype,
    seed: u64,
    points: Vec<TimePoint>,
}

impl GlucoseSeries {
    pub fn archetype(&self) -> PatientArchetype {
        self.archetype
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Glucose values in time order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.glucose).collect()
    }

    /// Most recent reading
    pub fn current(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    /// Wall-clock timestamps when the trace is anchored at `start`
    pub fn timestamps(&self, start: NaiveDateTime) -> Vec<NaiveDateTime> {
        self.points.iter().map(|p| start + p.offset()).collect()
    }
}

/// Hour of day for sample `i`
fn hour_at(i: usize) -> f64 {
    (i as u32 * SAMPLE_INTERVAL_MINUTES) as f64 / 60.0
}

/// The noise-free curve for an archetype, one value per sample
pub fn base_curve(archetype: PatientArchetype) -> Vec<f64> {
    (0..POINTS_PER_DAY)
        .map(|i| base_value(archetype, hour_at(i)))
        .collect()
}

fn base_value(archetype: PatientArchetype, hour: f64) -> f64 {
    let mut value = BASELINE_MGDL;

    // Circadian terms
    if (3.0..8.0).contains(&hour) {
        value += 20.0 * ((hour - 3.0) * PI / 5.0).sin();
    } else if (18.0..22.0).contains(&hour) {
        value += 10.0 * ((hour - 18.0) * PI / 4.0).sin();
    }

    for &(meal, effect) in &MEALS {
        if (meal..meal + 4.0).contains(&hour) {
            let since_meal = hour - meal;
            value += effect * (-(since_meal - 1.0).powi(2) / 0.5).exp();
        }
    }

    match archetype {
        PatientArchetype::DawnPhenomenon => {
            if (4.0..9.0).contains(&hour) {
                value += 40.0;
            }
        }
        PatientArchetype::Gastroparesis => {
            // Delayed, flatter absorption on top of the normal meal response
            for &(meal, effect) in &MEALS {
                if (meal + 1.0..meal + 6.0).contains(&hour) {
                    let since_onset = hour - meal - 1.0;
                    value += 0.8 * effect * (-since_onset.powi(2) / 2.0).exp();
                }
            }
        }
        PatientArchetype::Normal | PatientArchetype::Athletic => {}
    }

    value
}

/// Generate a reproducible day of readings for `archetype`.
///
/// The noise stream depends only on `seed`, so two archetypes generated with
/// the same seed receive identical noise at every sample.
pub fn generate(archetype: PatientArchetype, seed: u64) -> GlucoseSeries {
    let mut rng = StdRng::seed_from_u64(seed);

    let points: Vec<TimePoint> = base_curve(archetype)
        .into_iter()
        .enumerate()
        .map(|(i, base)| {
            let noise: f64 = rng.sample(StandardNormal);
            TimePoint {
                hour: hour_at(i),
                glucose: (base + NOISE_STD_DEV * noise).clamp(SENSOR_MIN_MGDL, SENSOR_MAX_MGDL),
                offset_minutes: i as u32 * SAMPLE_INTERVAL_MINUTES,
            }
        })
        .collect();

    debug!("Generated {} points for {} (seed {})", points.len(), archetype, seed);

    GlucoseSeries { archetype, seed, points }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argmax_in(curve: &[f64], from_hour: f64, to_hour: f64) -> f64 {
        let mut best = (0.0, f64::NEG_INFINITY);
        for (i, &v) in curve.iter().enumerate() {
            let h = hour_at(i);
            if h >= from_hour && h < to_hour && v > best.1 {
                best = (h, v);
            }
        }
        best.0
    }

    #[test]
    fn test_series_shape() {
        let series = generate(PatientArchetype::Normal, 42);
        assert_eq!(series.len(), POINTS_PER_DAY);
        assert_eq!(series.points()[0].hour, 0.0);
        assert_eq!(series.points()[12].hour, 1.0);
        assert_eq!(series.points()[287].offset_minutes, 1435);
        assert!(series.points().windows(2).all(|w| w[1].hour > w[0].hour));
    }

    #[test]
    fn test_values_clamped_for_many_seeds() {
        for archetype in PatientArchetype::ALL {
            for seed in 0..50 {
                let series = generate(archetype, seed);
                assert_eq!(series.len(), 288);
                assert!(series
                    .values()
                    .iter()
                    .all(|v| (SENSOR_MIN_MGDL..=SENSOR_MAX_MGDL).contains(v)));
            }
        }
    }

    #[test]
    fn test_reproducible() {
        let a = generate(PatientArchetype::Gastroparesis, 7);
        let b = generate(PatientArchetype::Gastroparesis, 7);
        assert_eq!(a, b);
        assert_ne!(a.values(), generate(PatientArchetype::Gastroparesis, 8).values());
    }

    #[test]
    fn test_base_curve_landmarks() {
        let curve = base_curve(PatientArchetype::Normal);
        assert_eq!(curve[0], BASELINE_MGDL);
        // Lunch bump peaks exactly one hour after the meal with nothing else active
        assert!((curve[13 * 12] - 170.0).abs() < 1e-9);
        assert!((argmax_in(&curve, 12.0, 16.0) - 13.0).abs() < 1e-9);
        assert!((argmax_in(&curve, 18.0, 22.0) - 19.0).abs() < 1e-9);
        assert!((argmax_in(&curve, 7.0, 11.0) - 8.0).abs() <= 0.25);
    }

    #[test]
    fn test_athletic_matches_normal() {
        assert_eq!(base_curve(PatientArchetype::Athletic), base_curve(PatientArchetype::Normal));
    }

    #[test]
    fn test_gastroparesis_adds_delayed_response() {
        let normal = base_curve(PatientArchetype::Normal);
        let gastro = base_curve(PatientArchetype::Gastroparesis);
        // Before the first delayed window the curves agree
        for i in 0..(8 * 12) {
            assert_eq!(normal[i], gastro[i]);
        }
        // At breakfast + 1h the delayed term is at its 0.8 * 60 peak
        assert!((gastro[8 * 12] - normal[8 * 12] - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_timestamps_follow_offsets() {
        let series = generate(PatientArchetype::Normal, 1);
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let stamps = series.timestamps(start);
        assert_eq!(stamps[1] - stamps[0], Duration::minutes(5));
        assert_eq!(stamps[287], start + Duration::minutes(1435));
    }

    #[test]
    fn test_archetype_parsing() {
        assert_eq!("Dawn Phenomenon".parse::<PatientArchetype>().unwrap(), PatientArchetype::DawnPhenomenon);
        assert_eq!("dawn-phenomenon".parse::<PatientArchetype>().unwrap(), PatientArchetype::DawnPhenomenon);
        assert_eq!("GASTROPARESIS".parse::<PatientArchetype>().unwrap(), PatientArchetype::Gastroparesis);
        assert!(matches!(
            "marathoner".parse::<PatientArchetype>(),
            Err(GlucosimError::InvalidArgument(_))
        ));
    }
}
