//! Nutrition calculation module
//!
//! Metabolic formulas, unit conversions and the meal template.

pub mod calculator;
pub mod meals;
pub mod units;

pub use calculator::{cardio_for, compute_plan, mifflin_st_jeor, month_targets, MonthTargets};
pub use meals::{generate_meals, swaps, DAYS_PER_WEEK, MEALS_PER_DAY};
pub use units::{inches_to_cm, lbs_to_kg, round_display};
