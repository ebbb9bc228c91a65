//! Data models
//!
//! Form input and computed plan structures.

mod input;
mod plan;

pub use input::{
    ActivityLevel, FormField, FormFields, Gender, Goal, UserInput, MAX_AGE_YEARS, MAX_HEIGHT_IN,
    MAX_WEIGHT_LBS,
};
pub use plan::{DayMeals, MacroSummary, MetabolicResult, MonthPlan, Swaps, PLAN_MONTHS};
