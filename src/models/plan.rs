//! Computed plan model
//!
//! The immutable result of one successful calculation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Number of months in every plan
pub const PLAN_MONTHS: usize = 3;

/// One day of the meal template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayMeals(Vec<String>);

impl DayMeals {
    pub fn new(meals: Vec<String>) -> Self {
        Self(meals)
    }

    pub fn meals(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ingredient swap suggestions per macro category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swaps {
    pub protein: String,
    pub carbs: String,
    pub fats: String,
}

/// Calorie and macro targets without the meal plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSummary {
    pub calories: i64,
    pub protein: i64, // grams
    pub carbs: i64,   // grams
    pub fat: i64,     // grams
}

/// Targets, cardio and meals for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthPlan {
    pub month: u8,
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
    pub cardio: String,
    /// Shared by all months of a plan
    pub meals: Arc<Vec<DayMeals>>,
    pub swaps: Arc<Swaps>,
}

impl MonthPlan {
    pub fn macros(&self) -> MacroSummary {
        MacroSummary {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}

/// BMR, TDEE and the three monthly plans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetabolicResult {
    pub bmr: i64,
    pub tdee: i64,
    pub monthly_plans: Vec<MonthPlan>,
}

impl MetabolicResult {
    /// Month 1 targets, the part shown before unlocking
    pub fn teaser(&self) -> Option<MacroSummary> {
        self.monthly_plans.first().map(MonthPlan::macros)
    }
}
