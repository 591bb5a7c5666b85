//! Closed-form pump dosing arithmetic
//!
//! Starting-point formulas taught alongside the simulator: basal share of
//! total daily dose (TDD), weight-based insulin-to-carb ratio, the 1800/1960
//! correction-factor rules, meal and correction boluses, and bolus splitting.

use serde::{Deserialize, Serialize};

use crate::error::{GlucosimError, Result};

/// Default basal share of TDD in percent
pub const DEFAULT_BASAL_PERCENT: f64 = 45.0;

/// Default correction target in mg/dL
pub const DEFAULT_TARGET_BG: f64 = 120.0;

/// Weight-based I:C coefficient
const IC_WEIGHT_COEFFICIENT: f64 = 5.7;

/// Approximate glucose rise per gram of fast carbohydrate
const MGDL_PER_GRAM_CARB: f64 = 4.0;

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GlucosimError::invalid(format!("{name} must be positive (got {value})")))
    }
}

fn require_percent(name: &str, value: f64) -> Result<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(GlucosimError::invalid(format!("{name} must be within 0-100% (got {value})")))
    }
}

/// Daily basal units for a given share of TDD
pub fn basal_daily_units(tdd: f64, basal_percent: f64) -> Result<f64> {
    require_positive("total daily dose", tdd)?;
    require_percent("basal percentage", basal_percent)?;
    Ok(tdd * basal_percent / 100.0)
}

/// Flat hourly basal rate (U/hr) for a given share of TDD
pub fn average_basal_rate(tdd: f64, basal_percent: f64) -> Result<f64> {
    Ok(basal_daily_units(tdd, basal_percent)? / 24.0)
}

/// Grams of carbohydrate covered by one unit: (5.7 x weight) / TDD
pub fn ic_ratio_weight_based(weight_kg: f64, tdd: f64) -> Result<f64> {
    require_positive("weight", weight_kg)?;
    require_positive("total daily dose", tdd)?;
    Ok(IC_WEIGHT_COEFFICIENT * weight_kg / tdd)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Meal {
    /// Breakfast needs more insulin per gram, dinner less
    pub fn ic_multiplier(self) -> f64 {
        match self {
            Meal::Breakfast => 0.8,
            Meal::Lunch => 1.0,
            Meal::Dinner => 1.2,
        }
    }

    /// Whole-gram ratio for this meal, truncated like the pump's entry field.
    /// A ratio that truncates below 1 g/unit is rejected.
    pub fn ic_ratio(self, base_ratio: f64) -> Result<f64> {
        let scaled = base_ratio * self.ic_multiplier();
        let ratio = scaled.trunc();
        if ratio < 1.0 {
            return Err(GlucosimError::invalid(format!(
                "{self:?} I:C ratio 1:{scaled:.2} truncates to 1:{ratio:.0}; need at least 1 g/unit"
            )));
        }
        Ok(ratio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorrectionRule {
    /// 1800 rule, for most patients
    #[default]
    Standard,
    /// 1960 rule, for HbA1c < 7%
    WellControlled,
}

impl CorrectionRule {
    fn numerator(self) -> f64 {
        match self {
            CorrectionRule::Standard => 1800.0,
            CorrectionRule::WellControlled => 1960.0,
        }
    }
}

/// mg/dL drop per unit of insulin
pub fn correction_factor(tdd: f64, rule: CorrectionRule) -> Result<f64> {
    require_positive("total daily dose", tdd)?;
    Ok(rule.numerator() / tdd)
}

/// Inputs to a standard meal + correction bolus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BolusRequest {
    pub carbs_g: f64,
    pub current_bg: f64,
    pub target_bg: f64,
    pub ic_ratio: f64,
    pub correction_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BolusCalculation {
    pub food: f64,
    pub correction: f64,
    pub total: f64,
}

impl BolusRequest {
    /// Food bolus plus a correction that never goes negative
    pub fn calculate(&self) -> Result<BolusCalculation> {
        require_positive("I:C ratio", self.ic_ratio)?;
        require_positive("correction factor", self.correction_factor)?;
        if !(self.carbs_g.is_finite() && self.carbs_g >= 0.0) {
            return Err(GlucosimError::invalid(format!(
                "carbohydrate amount must be non-negative (got {})",
                self.carbs_g
            )));
        }

        let food = self.carbs_g / self.ic_ratio;
        let correction = ((self.current_bg - self.target_bg) / self.correction_factor).max(0.0);
        Ok(BolusCalculation { food, correction, total: food + correction })
    }
}

/// A bolus divided into an immediate part and a part extended over time.
/// Covers both square-wave (extended) and dual-wave delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BolusSplit {
    pub immediate: f64,
    pub extended: f64,
    pub duration_hours: f64,
}

pub fn split_bolus(total: f64, immediate_percent: f64, duration_hours: f64) -> Result<BolusSplit> {
    if !(total.is_finite() && total >= 0.0) {
        return Err(GlucosimError::invalid(format!("bolus must be non-negative (got {total})")));
    }
    require_percent("immediate percentage", immediate_percent)?;
    require_positive("extended duration", duration_hours)?;

    let immediate = total * immediate_percent / 100.0;
    Ok(BolusSplit {
        immediate,
        extended: total * (100.0 - immediate_percent) / 100.0,
        duration_hours,
    })
}

/// Meal textures with a recommended split for delayed gastric emptying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Liquid,
    RegularSolid,
    HighFat,
    GastroparesisFlare,
}

impl MealType {
    /// (immediate %, extended duration in hours)
    fn split_plan(self) -> (f64, f64) {
        match self {
            MealType::Liquid => (70.0, 2.0),
            MealType::RegularSolid => (40.0, 4.0),
            MealType::HighFat => (30.0, 6.0),
            MealType::GastroparesisFlare => (0.0, 8.0),
        }
    }

    pub fn recommended_split(self, total: f64) -> Result<BolusSplit> {
        let (immediate_percent, hours) = self.split_plan();
        split_bolus(total, immediate_percent, hours)
    }
}

/// Pre-exercise plan check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExercisePlan {
    /// Carbs needed to lift current glucose to the pre-exercise target
    pub carbs_to_target: f64,
    /// Planned carbs >= 25 g and basal reduced by >= 30%
    pub adequate: bool,
}

pub fn exercise_plan(current_bg: f64, target_bg: f64, planned_carbs: f64, basal_reduction_percent: f64) -> Result<ExercisePlan> {
    require_percent("basal reduction", basal_reduction_percent)?;
    Ok(ExercisePlan {
        carbs_to_target: ((target_bg - current_bg) / MGDL_PER_GRAM_CARB).max(0.0),
        adequate: planned_carbs >= 25.0 && basal_reduction_percent >= 30.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basal_from_tdd() {
        assert!((basal_daily_units(40.0, 45.0).unwrap() - 18.0).abs() < 1e-12);
        assert!((average_basal_rate(40.0, 45.0).unwrap() - 0.75).abs() < 1e-12);
        assert!(basal_daily_units(0.0, 45.0).is_err());
        assert!(basal_daily_units(40.0, 120.0).is_err());
    }

    #[test]
    fn test_ic_ratio() {
        let ratio = ic_ratio_weight_based(70.0, 40.0).unwrap();
        assert!((ratio - 9.975).abs() < 1e-12);
        assert_eq!(Meal::Breakfast.ic_ratio(ratio).unwrap(), 7.0);
        assert_eq!(Meal::Lunch.ic_ratio(ratio).unwrap(), 9.0);
        assert_eq!(Meal::Dinner.ic_ratio(ratio).unwrap(), 11.0);
        assert!(ic_ratio_weight_based(-1.0, 40.0).is_err());
    }

    #[test]
    fn test_meal_ratio_truncating_to_zero() {
        // 20 kg on 100 U/day: 1.14 g/unit, breakfast 0.91 g/unit
        let ratio = ic_ratio_weight_based(20.0, 100.0).unwrap();
        assert_eq!(Meal::Lunch.ic_ratio(ratio).unwrap(), 1.0);
        match Meal::Breakfast.ic_ratio(ratio) {
            Err(GlucosimError::InvalidArgument(msg)) => assert!(msg.contains("truncates to 1:0"), "{msg}"),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_correction_factor_rules() {
        assert_eq!(correction_factor(40.0, CorrectionRule::Standard).unwrap(), 45.0);
        assert_eq!(correction_factor(40.0, CorrectionRule::WellControlled).unwrap(), 49.0);
    }

    #[test]
    fn test_bolus_from_exam_question() {
        // 60 g meal, BG 180, 1:12, CF 40, target 120
        let calc = BolusRequest {
            carbs_g: 60.0,
            current_bg: 180.0,
            target_bg: 120.0,
            ic_ratio: 12.0,
            correction_factor: 40.0,
        }
        .calculate()
        .unwrap();
        assert_eq!(calc.food, 5.0);
        assert_eq!(calc.correction, 1.5);
        assert_eq!(calc.total, 6.5);
    }

    #[test]
    fn test_no_negative_correction() {
        let calc = BolusRequest {
            carbs_g: 30.0,
            current_bg: 90.0,
            target_bg: 120.0,
            ic_ratio: 10.0,
            correction_factor: 40.0,
        }
        .calculate()
        .unwrap();
        assert_eq!(calc.correction, 0.0);
        assert_eq!(calc.total, 3.0);
    }

    #[test]
    fn test_meal_type_splits() {
        let split = MealType::HighFat.recommended_split(8.0).unwrap();
        assert!((split.immediate - 2.4).abs() < 1e-12);
        assert!((split.extended - 5.6).abs() < 1e-12);
        assert_eq!(split.duration_hours, 6.0);

        let flare = MealType::GastroparesisFlare.recommended_split(8.0).unwrap();
        assert_eq!(flare.immediate, 0.0);
        assert_eq!(flare.extended, 8.0);
    }

    #[test]
    fn test_exercise_plan() {
        let plan = exercise_plan(95.0, 140.0, 30.0, 50.0).unwrap();
        assert!((plan.carbs_to_target - 11.25).abs() < 1e-12);
        assert!(plan.adequate);
        assert!(!exercise_plan(95.0, 140.0, 20.0, 50.0).unwrap().adequate);
        assert_eq!(exercise_plan(180.0, 140.0, 30.0, 50.0).unwrap().carbs_to_target, 0.0);
    }
}
