//! Meal template generation
//!
//! The meal plan is a fixed daily template labelled with its day number. It
//! does not depend on the user's numbers.

use crate::models::{DayMeals, Swaps};

/// Days in the weekly template
pub const DAYS_PER_WEEK: usize = 7;

/// Meals per template day
pub const MEALS_PER_DAY: usize = 6;

const DAY_TEMPLATE: [&str; MEALS_PER_DAY] = [
    "Meal 1: 6 egg whites, 2 whole eggs, 40g oats, 1 tbsp peanut butter",
    "Meal 2: 6 oz grilled chicken, 150g rice, 1 tbsp olive oil",
    "Meal 3: 6 oz lean beef, 200g sweet potato, 1/2 avocado",
    "Meal 4: Whey isolate + banana + cereal",
    "Meal 5: White fish + rice + coconut oil",
    "Meal 6: Whey + almond butter",
];

/// Build the 7-day plan, each meal suffixed with `(Day N)`
pub fn generate_meals() -> Vec<DayMeals> {
    (1..=DAYS_PER_WEEK)
        .map(|day| {
            DayMeals::new(
                DAY_TEMPLATE
                    .iter()
                    .map(|meal| format!("{} (Day {})", meal, day))
                    .collect(),
            )
        })
        .collect()
}

/// Category-level ingredient swaps, constant across days and months
pub fn swaps() -> Swaps {
    Swaps {
        protein: "Protein swaps: chicken, turkey, tofu, fish, lentils, whey".to_string(),
        carbs: "Carb swaps: rice, oats, sweet potatoes, quinoa, sourdough bread".to_string(),
        fats: "Fat swaps: olive oil, nuts, peanut butter, avocado, coconut oil".to_string(),
    }
}
