//! Unit conversion constants
//!
//! Imperial form inputs are converted to metric before any formula runs.

// ============================================================================
// Body Measurement Conversion Constants
// ============================================================================

/// Pounds per kilogram, as used by the calculator
pub const LBS_PER_KG: f64 = 2.205;
/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

// ============================================================================
// Energy Constants
// ============================================================================

/// Kilocalories per gram of protein
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
/// Kilocalories per gram of carbohydrate
pub const KCAL_PER_G_CARBS: f64 = 4.0;
/// Kilocalories per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;

// ============================================================================
// Conversions
// ============================================================================

/// Convert a body weight in pounds to kilograms
pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs / LBS_PER_KG
}

/// Convert a height in inches to centimeters
pub fn inches_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

/// Round to the nearest whole number, halves away from zero
pub fn round_display(value: f64) -> i64 {
    value.round() as i64
}
