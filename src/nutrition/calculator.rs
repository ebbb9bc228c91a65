//! Metabolic calculator
//!
//! BMR via Mifflin-St Jeor, TDEE via activity multiplier, then three months
//! of progressively larger caloric adjustments with macro splits.

use std::sync::Arc;

use super::meals::{generate_meals, swaps};
use super::units::{
    inches_to_cm, lbs_to_kg, round_display, KCAL_PER_G_CARBS, KCAL_PER_G_FAT,
    KCAL_PER_G_PROTEIN,
};
use crate::error::{PlanError, PlanResult};
use crate::models::{
    DayMeals, Gender, Goal, MetabolicResult, MonthPlan, Swaps, UserInput, PLAN_MONTHS,
};

/// Calorie adjustment added per month of the plan
pub const MONTHLY_ADJUSTMENT_KCAL: f64 = 500.0;

/// Cardio recommendation when the goal is not fat loss
pub const MAINTENANCE_CARDIO: &str = "Optional light cardio or rest";

/// Basal Metabolic Rate (Mifflin-St Jeor, 1990)
///
/// `BMR = 10 x kg + 6.25 x cm - 5 x age + s`, where `s` is +5 for men and
/// -161 for women.
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age: f64, gender: Gender) -> f64 {
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age + offset
}

/// Unrounded macro targets for one month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthTargets {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Targets for a zero-based month index
pub fn month_targets(tdee: f64, weight_kg: f64, goal: Goal, month_index: usize) -> MonthTargets {
    let adjustment = MONTHLY_ADJUSTMENT_KCAL * (month_index as f64 + 1.0);

    let (calories, protein_per_kg, fat_ratio) = if goal.is_fat_loss() {
        (tdee - adjustment, 2.5, 0.20)
    } else {
        (tdee + adjustment, 2.2, 0.25)
    };

    let protein = weight_kg * protein_per_kg;
    let fat = calories * fat_ratio / KCAL_PER_G_FAT;
    let carbs = (calories - protein * KCAL_PER_G_PROTEIN - fat * KCAL_PER_G_FAT) / KCAL_PER_G_CARBS;

    MonthTargets {
        calories,
        protein,
        carbs,
        fat,
    }
}

/// Cardio recommendation for a zero-based month index
pub fn cardio_for(goal: Goal, month_index: usize) -> String {
    if goal.is_fat_loss() {
        format!("{} days/week @ 20 mins", 3 + month_index)
    } else {
        MAINTENANCE_CARDIO.to_string()
    }
}

/// Reject values that cannot be shown as whole numbers
fn finite(field: &'static str, value: f64) -> PlanResult<f64> {
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Ok(value)
    } else {
        Err(PlanError::NonFiniteResult { field })
    }
}

/// Compute the full plan for a validated input.
///
/// The meal template and swaps are generated once and shared by all months.
/// Inputs that overflow any intermediate value are rejected instead of
/// producing saturated targets.
pub fn compute_plan(input: &UserInput) -> PlanResult<MetabolicResult> {
    let weight_kg = lbs_to_kg(input.weight);
    let height_cm = inches_to_cm(input.height);

    let bmr = finite("bmr", mifflin_st_jeor(weight_kg, height_cm, input.age, input.gender))?;
    // TDEE is taken from the unrounded BMR
    let tdee = finite("tdee", bmr * input.activity_level.multiplier())?;

    let meals: Arc<Vec<DayMeals>> = Arc::new(generate_meals());
    let swaps: Arc<Swaps> = Arc::new(swaps());

    let monthly_plans = (0..PLAN_MONTHS)
        .map(|m| {
            let targets = month_targets(tdee, weight_kg, input.goal, m);
            if targets.carbs < 0.0 {
                tracing::warn!(
                    month = m + 1,
                    calories = targets.calories,
                    "Carb target is negative; calorie budget is below the protein and fat floor"
                );
            }
            Ok(MonthPlan {
                month: (m + 1) as u8,
                calories: round_display(finite("calories", targets.calories)?),
                protein: round_display(finite("protein", targets.protein)?),
                carbs: round_display(finite("carbs", targets.carbs)?),
                fat: round_display(finite("fat", targets.fat)?),
                cardio: cardio_for(input.goal, m),
                meals: Arc::clone(&meals),
                swaps: Arc::clone(&swaps),
            })
        })
        .collect::<PlanResult<Vec<_>>>()?;

    Ok(MetabolicResult {
        bmr: round_display(bmr),
        tdee: round_display(tdee),
        monthly_plans,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityLevel;
    use crate::nutrition::meals::{DAYS_PER_WEEK, MEALS_PER_DAY};

    fn reference_male(goal: Goal) -> UserInput {
        UserInput {
            gender: Gender::Male,
            age: 30.0,
            height: 70.0,
            weight: 180.0,
            activity_level: ActivityLevel::Moderate,
            goal,
            email: String::new(),
        }
    }

    #[test]
    fn test_reference_bmr_and_tdee() {
        let result = compute_plan(&reference_male(Goal::FatLoss)).unwrap();
        assert_eq!(result.bmr, 1783);
        assert_eq!(result.tdee, 2763);
    }

    #[test]
    fn test_mifflin_st_jeor_gender_offset() {
        let male = mifflin_st_jeor(70.0, 175.0, 40.0, Gender::Male);
        let female = mifflin_st_jeor(70.0, 175.0, 40.0, Gender::Female);
        assert!((male - female - 166.0).abs() < 1e-9);
        assert!((male - 1598.75).abs() < 1e-9);
    }

    #[test]
    fn test_fat_loss_months() {
        let result = compute_plan(&reference_male(Goal::FatLoss)).unwrap();
        let months: Vec<_> = result
            .monthly_plans
            .iter()
            .map(|p| (p.month, p.calories, p.protein, p.carbs, p.fat))
            .collect();
        assert_eq!(
            months,
            vec![
                (1, 2263, 204, 249, 50),
                (2, 1763, 204, 149, 39),
                (3, 1263, 204, 49, 28),
            ]
        );
        assert_eq!(result.monthly_plans[0].cardio, "3 days/week @ 20 mins");
        assert_eq!(result.monthly_plans[2].cardio, "5 days/week @ 20 mins");
    }

    #[test]
    fn test_muscle_gain_months() {
        let result = compute_plan(&reference_male(Goal::MuscleGain)).unwrap();
        let months: Vec<_> = result
            .monthly_plans
            .iter()
            .map(|p| (p.calories, p.protein, p.carbs, p.fat))
            .collect();
        assert_eq!(
            months,
            vec![(3263, 180, 432, 91), (3763, 180, 526, 105), (4263, 180, 620, 118)]
        );
        assert!(result
            .monthly_plans
            .iter()
            .all(|p| p.cardio == MAINTENANCE_CARDIO));
    }

    #[test]
    fn test_female_light_activity() {
        let input = UserInput {
            gender: Gender::Female,
            age: 45.0,
            height: 62.0,
            weight: 130.0,
            activity_level: ActivityLevel::Light,
            goal: Goal::MuscleGain,
            email: String::new(),
        };
        let result = compute_plan(&input).unwrap();
        assert_eq!(result.bmr, 1188);
        assert_eq!(result.tdee, 1633);
        assert_eq!(result.monthly_plans[0].calories, 2133);
        assert_eq!(result.monthly_plans[0].protein, 130);
    }

    #[test]
    fn test_small_deficit_can_go_negative_on_carbs() {
        let input = UserInput {
            gender: Gender::Female,
            age: 25.0,
            height: 64.0,
            weight: 140.0,
            activity_level: ActivityLevel::Sedentary,
            goal: Goal::FatLoss,
            email: String::new(),
        };
        let result = compute_plan(&input).unwrap();
        assert_eq!(result.tdee, 1638);
        assert_eq!(result.monthly_plans[1].carbs, -31);
        assert_eq!(result.monthly_plans[2].calories, 138);
    }

    #[test]
    fn test_compute_plan_is_deterministic() {
        let input = reference_male(Goal::FatLoss);
        assert_eq!(compute_plan(&input).unwrap(), compute_plan(&input).unwrap());
    }

    #[test]
    fn test_calories_monotonic_by_goal() {
        for activity in [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
            ActivityLevel::VeryActive,
        ] {
            let mut input = reference_male(Goal::FatLoss);
            input.activity_level = activity;
            let cals: Vec<i64> = compute_plan(&input).unwrap()
                .monthly_plans
                .iter()
                .map(|p| p.calories)
                .collect();
            assert!(cals[0] > cals[1] && cals[1] > cals[2]);

            input.goal = Goal::MuscleGain;
            let cals: Vec<i64> = compute_plan(&input).unwrap()
                .monthly_plans
                .iter()
                .map(|p| p.calories)
                .collect();
            assert!(cals[0] < cals[1] && cals[1] < cals[2]);
        }
    }

    #[test]
    fn test_plan_shape_and_shared_meals() {
        let result = compute_plan(&reference_male(Goal::FatLoss)).unwrap();
        assert_eq!(result.monthly_plans.len(), PLAN_MONTHS);
        for plan in &result.monthly_plans {
            assert_eq!(plan.meals.len(), DAYS_PER_WEEK);
            assert!(plan.meals.iter().all(|d| d.len() == MEALS_PER_DAY));
        }
        let first = &result.monthly_plans[0];
        assert!(result
            .monthly_plans
            .iter()
            .all(|p| Arc::ptr_eq(&p.meals, &first.meals) && Arc::ptr_eq(&p.swaps, &first.swaps)));
    }

    #[test]
    fn test_overflowing_input_is_rejected() {
        let mut input = reference_male(Goal::MuscleGain);
        input.weight = 1e308;
        assert!(matches!(
            compute_plan(&input),
            Err(PlanError::NonFiniteResult { field: "bmr" })
        ));

        let mut input = reference_male(Goal::FatLoss);
        input.age = f64::INFINITY;
        assert!(compute_plan(&input).is_err());
    }

    #[test]
    fn test_upper_bounds_stay_finite() {
        let input = UserInput {
            gender: Gender::Male,
            age: 1.0,
            height: crate::models::MAX_HEIGHT_IN,
            weight: crate::models::MAX_WEIGHT_LBS,
            activity_level: ActivityLevel::VeryActive,
            goal: Goal::MuscleGain,
            email: String::new(),
        };
        let result = compute_plan(&input).unwrap();
        assert!(result.tdee > 0);
        assert!(result.monthly_plans.iter().all(|p| p.calories < 100_000));
    }

    #[test]
    fn test_month_targets_energy_balance() {
        let t = month_targets(2500.0, 80.0, Goal::FatLoss, 0);
        let total = t.protein * 4.0 + t.carbs * 4.0 + t.fat * 9.0;
        assert!((total - t.calories).abs() < 1e-9);
        assert!((t.fat * 9.0 / t.calories - 0.20).abs() < 1e-12);
    }
}
