//! 3-Month Meal Plan Generator Library
//!
//! Metabolic calculator, meal template and the unlock-gated plan controller.

pub mod build_info;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
