//! Insulin pump therapy training core
//!
//! Generates reproducible synthetic CGM traces for a handful of patient
//! archetypes and derives the metrics shown next to them (trend, time in
//! range, active insulin). Also carries the closed-form dosing arithmetic
//! and practice cases used in calculation drills.
//!
//! Every function is pure: callers own all state and pass seeds explicitly.

pub mod alerts;
pub mod basal;
pub mod competency;
pub mod config;
pub mod dosing;
pub mod error;
pub mod export;
pub mod risk;
pub mod stats;
pub mod synth;
pub mod units;

pub use error::{GlucosimError, Result};
pub use stats::{active_insulin_estimate, summarize, time_in_range, trend, SeriesSummary, TrendDirection};
pub use synth::{generate, GlucoseSeries, PatientArchetype, TimePoint};
pub use units::TargetRange;
