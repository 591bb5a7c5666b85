//! Hypoglycemia risk assessment for relaxing glucose targets

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::units::TargetRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFactor {
    AgeOver70,
    CognitiveImpairment,
    LivingAlone,
    MultipleMedications,
    RenalInsufficiency,
    HypoglycemiaUnawareness,
    PreviousSevereHypoglycemia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Lower,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub factor_count: usize,
    pub level: RiskLevel,
    pub suggested_targets: TargetRange,
}

/// Duplicated factors count once
pub fn assess(factors: &[RiskFactor]) -> RiskAssessment {
    let factor_count = factors.iter().collect::<HashSet<_>>().len();
    let (level, suggested_targets) = match factor_count {
        n if n >= 3 => (RiskLevel::High, TargetRange::CONSERVATIVE),
        2 => (RiskLevel::Moderate, TargetRange::RELAXED),
        _ => (RiskLevel::Lower, TargetRange::STANDARD),
    };

    RiskAssessment {
        factor_count,
        level,
        suggested_targets,
    }
}
