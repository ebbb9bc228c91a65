//! 3-Month Meal Plan Generator
//!
//! An MCP server for metabolic and macro planning.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use mealplan::build_info;
use mealplan::config::Config;
use mealplan::mcp::MealPlanService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to stderr; stdout carries the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mealplan=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env()?;
    eprintln!("Return page: {}", config.page_url);
    if config.checkout.is_none() {
        tracing::warn!("Stripe is not configured; begin_checkout will be unavailable");
    }

    let service = MealPlanService::new(config)?;

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
