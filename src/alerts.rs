//! CGM alert rules for the current reading

use serde::{Deserialize, Serialize};

use crate::units::Thresholds;

/// Trend rate (mg/dL per reading) beyond which a fast-change alert fires
const FAST_CHANGE_RATE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CgmAlert {
    LowGlucose,
    HighGlucose,
    FallingRapidly,
    RisingRapidly,
}

impl CgmAlert {
    /// First matching rule wins; level alerts take priority over trend alerts
    pub fn evaluate(current: f64, trend_rate: f64) -> Option<Self> {
        if current < Thresholds::HYPO_MGDL {
            Some(CgmAlert::LowGlucose)
        } else if current > Thresholds::VERY_HIGH_MGDL {
            Some(CgmAlert::HighGlucose)
        } else if trend_rate < -FAST_CHANGE_RATE {
            Some(CgmAlert::FallingRapidly)
        } else if trend_rate > FAST_CHANGE_RATE {
            Some(CgmAlert::RisingRapidly)
        } else {
            None
        }
    }

    pub fn is_urgent(self) -> bool {
        matches!(self, CgmAlert::LowGlucose | CgmAlert::HighGlucose)
    }

    pub fn message(self) -> &'static str {
        match self {
            CgmAlert::LowGlucose => "LOW GLUCOSE ALERT - Treat immediately with 15g fast-acting carbs",
            CgmAlert::HighGlucose => "HIGH GLUCOSE ALERT - Check ketones and consider correction",
            CgmAlert::FallingRapidly => "FALLING RAPIDLY - Monitor closely",
            CgmAlert::RisingRapidly => "RISING RAPIDLY - Consider intervention",
        }
    }
}
