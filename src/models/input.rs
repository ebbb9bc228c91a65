//! User input model
//!
//! Raw form fields as edited by the caller, and the validated `UserInput`
//! the calculator consumes.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Largest accepted age in years
pub const MAX_AGE_YEARS: f64 = 130.0;
/// Largest accepted height in inches
pub const MAX_HEIGHT_IN: f64 = 120.0;
/// Largest accepted weight in pounds
pub const MAX_WEIGHT_LBS: f64 = 1500.0;

/// Biological sex used by the BMR equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const VALID: &'static str = "male, female";

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Activity level, selects the TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const VALID: &'static str = "sedentary, light, moderate, active, very_active";

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" | "very active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }

    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// Plan goal. Drives the sign of the caloric adjustment and the macro ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    FatLoss,
    MuscleGain,
}

impl Goal {
    pub const VALID: &'static str = "fat_loss, muscle_gain (other)";

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::FatLoss => "fat_loss",
            Goal::MuscleGain => "muscle_gain",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fat_loss" => Some(Goal::FatLoss),
            "muscle_gain" | "other" => Some(Goal::MuscleGain),
            _ => None,
        }
    }

    pub fn is_fat_loss(&self) -> bool {
        matches!(self, Goal::FatLoss)
    }
}

/// Names of the editable form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Gender,
    Age,
    Height,
    Weight,
    Activity,
    Goal,
    Email,
}

impl FormField {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gender" => Some(FormField::Gender),
            "age" => Some(FormField::Age),
            "height" => Some(FormField::Height),
            "weight" => Some(FormField::Weight),
            "activity" | "activity_level" => Some(FormField::Activity),
            "goal" => Some(FormField::Goal),
            "email" => Some(FormField::Email),
            _ => None,
        }
    }
}

/// Unvalidated form state, one string per field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFields {
    pub gender: String,
    pub age: String,
    pub height: String,   // inches
    pub weight: String,   // pounds
    pub activity: String,
    pub goal: String,
    pub email: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            gender: Gender::Male.as_str().to_string(),
            age: String::new(),
            height: String::new(),
            weight: String::new(),
            activity: ActivityLevel::Moderate.as_str().to_string(),
            goal: Goal::FatLoss.as_str().to_string(),
            email: String::new(),
        }
    }
}

impl FormFields {
    /// Replace a single field
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Gender => self.gender = value,
            FormField::Age => self.age = value,
            FormField::Height => self.height = value,
            FormField::Weight => self.weight = value,
            FormField::Activity => self.activity = value,
            FormField::Goal => self.goal = value,
            FormField::Email => self.email = value,
        }
    }

    /// Validate every field into a `UserInput`.
    ///
    /// Numeric fields are checked first so that a half-filled form reports
    /// the missing number rather than an enum.
    pub fn parse(&self) -> PlanResult<UserInput> {
        let age = parse_positive("age", &self.age, MAX_AGE_YEARS)?;
        let height = parse_positive("height", &self.height, MAX_HEIGHT_IN)?;
        let weight = parse_positive("weight", &self.weight, MAX_WEIGHT_LBS)?;

        let gender = Gender::from_str(&self.gender).ok_or_else(|| PlanError::InvalidEnum {
            field: "gender",
            value: self.gender.clone(),
            expected: Gender::VALID,
        })?;
        let activity_level =
            ActivityLevel::from_str(&self.activity).ok_or_else(|| PlanError::InvalidEnum {
                field: "activity",
                value: self.activity.clone(),
                expected: ActivityLevel::VALID,
            })?;
        let goal = Goal::from_str(&self.goal).ok_or_else(|| PlanError::InvalidEnum {
            field: "goal",
            value: self.goal.clone(),
            expected: Goal::VALID,
        })?;

        Ok(UserInput {
            gender,
            age,
            height,
            weight,
            activity_level,
            goal,
            email: self.email.clone(),
        })
    }
}

fn parse_positive(field: &'static str, raw: &str, max: f64) -> PlanResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > max => Err(PlanError::OutOfRange {
            field,
            value: raw.to_string(),
            max,
        }),
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(PlanError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Validated calculator input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    pub gender: Gender,
    pub age: f64,
    pub height: f64, // inches
    pub weight: f64, // pounds
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FormFields {
        FormFields {
            age: "30".into(),
            height: "70".into(),
            weight: "180".into(),
            ..FormFields::default()
        }
    }

    #[test]
    fn test_defaults() {
        let form = FormFields::default();
        assert_eq!(form.gender, "male");
        assert_eq!(form.activity, "moderate");
        assert_eq!(form.goal, "fat_loss");
        assert!(form.age.is_empty());
    }

    #[test]
    fn test_parse_valid_form() {
        let input = filled().parse().unwrap();
        assert_eq!(input.gender, Gender::Male);
        assert_eq!(input.age, 30.0);
        assert_eq!(input.height, 70.0);
        assert_eq!(input.weight, 180.0);
        assert_eq!(input.activity_level, ActivityLevel::Moderate);
        assert_eq!(input.goal, Goal::FatLoss);
    }

    #[test]
    fn test_parse_rejects_empty_age() {
        let mut form = filled();
        form.set(FormField::Age, "");
        match form.parse() {
            Err(PlanError::InvalidNumber { field, .. }) => assert_eq!(field, "age"),
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_non_finite_and_non_positive() {
        for bad in ["abc", "NaN", "inf", "-5", "0"] {
            let mut form = filled();
            form.set(FormField::Weight, bad);
            assert!(
                matches!(form.parse(), Err(PlanError::InvalidNumber { field: "weight", .. })),
                "weight '{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_rejects_implausible_magnitudes() {
        let mut form = filled();
        form.set(FormField::Weight, "1e308");
        assert!(matches!(
            form.parse(),
            Err(PlanError::OutOfRange { field: "weight", .. })
        ));

        let mut form = filled();
        form.set(FormField::Height, "121");
        assert!(matches!(
            form.parse(),
            Err(PlanError::OutOfRange { field: "height", .. })
        ));

        let mut form = filled();
        form.set(FormField::Age, "130");
        assert!(form.parse().is_ok());
        form.set(FormField::Age, "131");
        assert!(matches!(
            form.parse(),
            Err(PlanError::OutOfRange { field: "age", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_activity() {
        let mut form = filled();
        form.set(FormField::Activity, "couch");
        assert!(matches!(
            form.parse(),
            Err(PlanError::InvalidEnum { field: "activity", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_goal() {
        let mut form = filled();
        form.set(FormField::Goal, "bulk");
        assert!(matches!(
            form.parse(),
            Err(PlanError::InvalidEnum { field: "goal", .. })
        ));
    }

    #[test]
    fn test_goal_other_alias() {
        assert_eq!(Goal::from_str("other"), Some(Goal::MuscleGain));
        assert_eq!(Goal::from_str("FAT_LOSS"), Some(Goal::FatLoss));
    }

    #[test]
    fn test_activity_multipliers() {
        assert_eq!(ActivityLevel::Sedentary.multiplier(), 1.2);
        assert_eq!(ActivityLevel::Light.multiplier(), 1.375);
        assert_eq!(ActivityLevel::Moderate.multiplier(), 1.55);
        assert_eq!(ActivityLevel::Active.multiplier(), 1.725);
        assert_eq!(ActivityLevel::VeryActive.multiplier(), 1.9);
    }

    #[test]
    fn test_form_field_names() {
        assert_eq!(FormField::from_str("activity_level"), Some(FormField::Activity));
        assert_eq!(FormField::from_str("Email"), Some(FormField::Email));
        assert_eq!(FormField::from_str("diet"), None);
    }
}
