//! Build script for mealplan
//!
//! Embeds a build number, the build profile and a UTC timestamp. The counter
//! lives in `OUT_DIR` so builds never write into the source tree, and release
//! pipelines can pin it with `MEALPLAN_BUILD_NUMBER`.

use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

const BUILD_NUMBER_VAR: &str = "MEALPLAN_BUILD_NUMBER";

fn next_counter(path: &Path) -> Result<u64, Box<dyn Error>> {
    let previous = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let next = previous + 1;
    fs::write(path, next.to_string())?;
    Ok(next)
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed={}", BUILD_NUMBER_VAR);

    let pinned = env::var(BUILD_NUMBER_VAR).ok();
    let build_number = match pinned.as_deref().map(|v| v.trim().parse::<u64>()) {
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            return Err(format!("{} must be a whole number: {}", BUILD_NUMBER_VAR, e).into());
        }
        None => {
            let out_dir = PathBuf::from(env::var("OUT_DIR")?);
            next_counter(&out_dir.join("build_number.txt"))?
        }
    };

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!("cargo:rustc-env={}={}", BUILD_NUMBER_VAR, build_number);
    println!("cargo:rustc-env=MEALPLAN_BUILD_PROFILE={}", profile);
    println!("cargo:rustc-env=MEALPLAN_BUILD_TIMESTAMP={}", timestamp);
    Ok(())
}
