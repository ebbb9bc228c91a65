//! Utility to compute a plan from the command line and print it as JSON
//!
//! Usage: print-plan <gender> <age> <height_in> <weight_lbs> [activity] [goal]

use mealplan::models::{FormField, FormFields};
use mealplan::nutrition::compute_plan;

const USAGE: &str = "Usage: print-plan <male|female> <age> <height_in> <weight_lbs> [activity] [goal]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 4 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let fields = [
        FormField::Gender,
        FormField::Age,
        FormField::Height,
        FormField::Weight,
        FormField::Activity,
        FormField::Goal,
    ];
    let mut form = FormFields::default();
    for (field, value) in fields.into_iter().zip(args) {
        form.set(field, value);
    }

    let input = form.parse()?;
    let result = compute_plan(&input)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
