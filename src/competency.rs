//! Calculation competency practice cases
//!
//! A practice case is a randomly drawn patient whose basal, I:C, correction
//! factor and total bolus the trainee works out by hand. Cases draw from
//! their own seeded RNG, independent of the glucose simulation stream.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::dosing::{
    basal_daily_units, correction_factor, ic_ratio_weight_based, BolusRequest, CorrectionRule,
    DEFAULT_BASAL_PERCENT, DEFAULT_TARGET_BG,
};
use crate::error::Result;

const BASAL_TOLERANCE: f64 = 1.0;
const IC_TOLERANCE: f64 = 2.0;
const CF_TOLERANCE: f64 = 10.0;
const BOLUS_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PracticeCase {
    pub weight_kg: u32,
    pub tdd: u32,
    pub current_bg: u32,
    pub carbs_g: u32,
    pub target_bg: f64,
}

impl PracticeCase {
    pub fn generate(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            weight_kg: rng.gen_range(60..90),
            tdd: rng.gen_range(35..65),
            current_bg: rng.gen_range(150..280),
            carbs_g: rng.gen_range(30..80),
            target_bg: DEFAULT_TARGET_BG,
        }
    }

    /// Worked answers; I:C and CF are rounded half-to-even to whole numbers
    /// first and the bolus is computed from the rounded values
    pub fn answer_key(&self) -> Result<AnswerKey> {
        let tdd = f64::from(self.tdd);
        let basal_units = basal_daily_units(tdd, DEFAULT_BASAL_PERCENT)?;
        let ic_ratio = ic_ratio_weight_based(f64::from(self.weight_kg), tdd)?.round_ties_even();
        let cf = correction_factor(tdd, CorrectionRule::Standard)?.round_ties_even();

        let bolus = BolusRequest {
            carbs_g: f64::from(self.carbs_g),
            current_bg: f64::from(self.current_bg),
            target_bg: self.target_bg,
            ic_ratio,
            correction_factor: cf,
        }
        .calculate()?;

        Ok(AnswerKey {
            basal_units,
            ic_ratio,
            correction_factor: cf,
            food_bolus: bolus.food,
            correction_bolus: bolus.correction,
            total_bolus: bolus.total,
        })
    }

    pub fn grade(&self, answers: &Answers) -> Result<Grade> {
        let key = self.answer_key()?;
        let item = |name: &'static str, expected: f64, submitted: f64, tolerance: f64| GradedItem {
            name,
            expected,
            submitted,
            correct: (submitted - expected).abs() <= tolerance,
        };

        Ok(Grade {
            items: vec![
                item("Basal", key.basal_units, answers.basal_units, BASAL_TOLERANCE),
                item("I:C ratio", key.ic_ratio, answers.ic_ratio, IC_TOLERANCE),
                item("Correction factor", key.correction_factor, answers.correction_factor, CF_TOLERANCE),
                item("Total bolus", key.total_bolus, answers.total_bolus, BOLUS_TOLERANCE),
            ],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
    pub basal_units: f64,
    pub ic_ratio: f64,
    pub correction_factor: f64,
    pub food_bolus: f64,
    pub correction_bolus: f64,
    pub total_bolus: f64,
}

/// A trainee's submitted calculations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Answers {
    pub basal_units: f64,
    pub ic_ratio: f64,
    pub correction_factor: f64,
    pub total_bolus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedItem {
    pub name: &'static str,
    pub expected: f64,
    pub submitted: f64,
    pub correct: bool,
}

impl fmt::Display for GradedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.correct {
            write!(f, "[ok] {} correct", self.name)
        } else {
            write!(f, "[x] {}: expected {:.1}, got {:.1}", self.name, self.expected, self.submitted)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub items: Vec<GradedItem>,
}

impl Grade {
    pub fn correct_count(&self) -> usize {
        self.items.iter().filter(|i| i.correct).count()
    }

    pub fn percent(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.correct_count() as f64 / self.items.len() as f64 * 100.0
    }
}
