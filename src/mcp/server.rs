//! Meal Plan MCP Server Implementation
//!
//! Exposes the plan controller transitions as MCP tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;

use crate::config::Config;
use crate::error::PlanError;
use crate::models::{DayMeals, FormField, Swaps};
use crate::nutrition::{generate_meals, swaps};
use crate::tools::checkout::{open_session, CheckoutError, CheckoutProvider, StripeCheckout};
use crate::tools::plan::PlanController;
use crate::tools::status::{StatusTracker, PLAN_INSTRUCTIONS};

/// Meal Plan MCP Service
#[derive(Clone)]
pub struct MealPlanService {
    controller: Arc<Mutex<PlanController>>,
    status_tracker: Arc<StatusTracker>,
    config: Arc<Config>,
    checkout: Option<Arc<dyn CheckoutProvider>>,
    tool_router: ToolRouter<MealPlanService>,
}

impl MealPlanService {
    /// Service using Stripe when checkout is configured
    pub fn new(config: Config) -> Result<Self, CheckoutError> {
        let provider: Option<Arc<dyn CheckoutProvider>> = match &config.checkout {
            Some(checkout) => Some(Arc::new(StripeCheckout::new(checkout)?)),
            None => None,
        };
        Ok(Self::with_provider(config, provider))
    }

    /// Service with an explicit checkout provider
    pub fn with_provider(config: Config, checkout: Option<Arc<dyn CheckoutProvider>>) -> Self {
        let controller = PlanController::with_price_label(config.price_label.clone());
        Self {
            controller: Arc::new(Mutex::new(controller)),
            status_tracker: Arc::new(StatusTracker::new(checkout.is_some())),
            config: Arc::new(config),
            checkout,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

#[derive(Debug, Serialize)]
struct MealsResponse {
    days: Vec<DayMeals>,
    swaps: Swaps,
}

#[derive(Debug, Serialize)]
struct CheckoutReturnResponse {
    unlocked: bool,
    email: Option<String>,
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetFormFieldParams {
    /// Field: gender, age, height, weight, activity, goal, email
    pub field: String,
    /// New raw value (height in inches, weight in pounds)
    pub value: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BeginCheckoutParams {
    /// Page to return to after checkout (defaults to MEALPLAN_PAGE_URL)
    pub page_url: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CheckoutReturnParams {
    /// Return URL or query string, e.g. "?unlocked=true&email=..."
    pub location: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetUnlockedParams {
    pub unlocked: bool,
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn plan_error(e: PlanError) -> McpError {
    if e.is_input_error() {
        McpError::invalid_params(e.to_string(), None)
    } else {
        McpError::internal_error(e.to_string(), None)
    }
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MealPlanService {
    // --- Status ---

    #[tool(description = "Get the current status of the meal plan service including build info, plan state, and process information")]
    async fn mealplan_status(&self) -> Result<CallToolResult, McpError> {
        let controller = self.controller.lock().await;
        to_json(&self.status_tracker.get_status(&controller))
    }

    #[tool(description = "Get step-by-step instructions for filling the form, generating a plan, and unlocking it.")]
    fn plan_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(PLAN_INSTRUCTIONS)]))
    }

    // --- Form & Plan ---

    #[tool(description = "Set one form field: gender, age, height (inches), weight (pounds), activity, goal, or email. Returns the form.")]
    async fn set_form_field(&self, Parameters(p): Parameters<SetFormFieldParams>) -> Result<CallToolResult, McpError> {
        let field = FormField::from_str(&p.field).ok_or_else(|| {
            McpError::invalid_params(
                format!("Unknown field '{}'. Valid fields: gender, age, height, weight, activity, goal, email", p.field),
                None,
            )
        })?;
        let mut controller = self.controller.lock().await;
        controller.set_field(field, p.value);
        to_json(controller.form())
    }

    #[tool(description = "Compute BMR, TDEE and the 3-month plan from the form. Locks the plan again. Invalid input keeps the previous plan.")]
    async fn generate_plan(&self) -> Result<CallToolResult, McpError> {
        let mut controller = self.controller.lock().await;
        controller.generate_plan().map_err(plan_error)?;
        to_json(&controller.view())
    }

    #[tool(description = "Get the 7-day meal template and ingredient swaps")]
    fn generate_meals(&self) -> Result<CallToolResult, McpError> {
        to_json(&MealsResponse {
            days: generate_meals(),
            swaps: swaps(),
        })
    }

    #[tool(description = "Get the current plan view. BMR, TDEE and month 1 macros are always shown; all months, meals, swaps and cardio only when unlocked.")]
    async fn get_plan(&self) -> Result<CallToolResult, McpError> {
        let controller = self.controller.lock().await;
        match controller.view() {
            Some(view) => to_json(&view),
            None => Ok(CallToolResult::success(vec![Content::text(
                r#"{"error": "No plan generated yet"}"#,
            )])),
        }
    }

    // --- Unlock ---

    #[tool(description = "Start a one-time payment checkout for the current email. Returns the URL to send the user to. Requires an email.")]
    async fn begin_checkout(&self, Parameters(p): Parameters<BeginCheckoutParams>) -> Result<CallToolResult, McpError> {
        let (provider, checkout_config) = match (&self.checkout, &self.config.checkout) {
            (Some(provider), Some(config)) => (Arc::clone(provider), config),
            _ => return Err(plan_error(CheckoutError::NotConfigured.into())),
        };

        let page_url = match p.page_url.as_deref() {
            Some(raw) => Url::parse(raw).map_err(|e| {
                McpError::invalid_params(format!("Invalid page_url '{}': {}", raw, e), None)
            })?,
            None => self.config.page_url.clone(),
        };

        // The lock is released before the provider round trip
        let request = {
            let controller = self.controller.lock().await;
            controller
                .prepare_checkout(&page_url, &checkout_config.price_id)
                .map_err(plan_error)?
        };
        let handoff = open_session(provider.as_ref(), request)
            .await
            .map_err(|e| plan_error(e.into()))?;
        to_json(&handoff)
    }

    #[tool(description = "Report the URL or query string the user returned with after checkout. Unlocks the plan when it carries unlocked=true.")]
    async fn checkout_return(&self, Parameters(p): Parameters<CheckoutReturnParams>) -> Result<CallToolResult, McpError> {
        let mut controller = self.controller.lock().await;
        let ret = controller.observe_checkout_return(&p.location);
        to_json(&CheckoutReturnResponse {
            unlocked: controller.is_unlocked(),
            email: ret.email,
        })
    }

    #[tool(description = "Set the unlock state directly")]
    async fn set_unlocked(&self, Parameters(p): Parameters<SetUnlockedParams>) -> Result<CallToolResult, McpError> {
        let mut controller = self.controller.lock().await;
        controller.set_unlocked(p.unlocked);
        to_json(&serde_json::json!({ "unlocked": controller.is_unlocked() }))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MealPlanService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mealplan".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("3-Month Meal Plan Generator".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "3-Month Meal Plan Generator. Call plan_instructions first. \
                 Form: set_form_field. Plan: generate_plan, get_plan, generate_meals. \
                 Unlock: begin_checkout, checkout_return, set_unlocked. Status: mealplan_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckoutConfig;
    use crate::tools::checkout::{CheckoutRequest, CheckoutSession};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct AlwaysOk;

    #[async_trait]
    impl CheckoutProvider for AlwaysOk {
        async fn create_session(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutSession, CheckoutError> {
            Ok(CheckoutSession {
                id: "cs_1".to_string(),
                url: format!("https://pay.example.com/{}", request.price_id),
            })
        }
    }

    /// Signals once called, then never answers
    struct Stalled {
        called: Arc<Notify>,
    }

    #[async_trait]
    impl CheckoutProvider for Stalled {
        async fn create_session(
            &self,
            _request: &CheckoutRequest,
        ) -> Result<CheckoutSession, CheckoutError> {
            self.called.notify_one();
            std::future::pending().await
        }
    }

    fn config(with_checkout: bool) -> Config {
        Config {
            page_url: Url::parse("https://plans.example.com/").unwrap(),
            price_label: "$9.99".to_string(),
            checkout: with_checkout.then(|| CheckoutConfig {
                secret_key: "sk_test".to_string(),
                price_id: "price_1".to_string(),
                api_base: Url::parse("https://api.stripe.com").unwrap(),
                timeout: Duration::from_secs(30),
            }),
        }
    }

    fn field(name: &str, value: &str) -> Parameters<SetFormFieldParams> {
        Parameters(SetFormFieldParams {
            field: name.to_string(),
            value: value.to_string(),
        })
    }

    async fn fill(service: &MealPlanService) {
        for (name, value) in [("age", "30"), ("height", "70"), ("weight", "180")] {
            service.set_form_field(field(name, value)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_generate_plan_rejects_empty_form() {
        let service = MealPlanService::with_provider(config(false), None);
        assert!(service.generate_plan().await.is_err());
        assert!(service.controller.lock().await.result().is_none());
    }

    #[tokio::test]
    async fn test_unknown_form_field() {
        let service = MealPlanService::with_provider(config(false), None);
        assert!(service.set_form_field(field("diet", "keto")).await.is_err());
    }

    #[tokio::test]
    async fn test_plan_then_return_unlocks() {
        let service = MealPlanService::with_provider(config(false), None);
        fill(&service).await;
        service.generate_plan().await.unwrap();

        let params = Parameters(CheckoutReturnParams {
            location: "https://plans.example.com/?unlocked=true&email=jo%40example.com".to_string(),
        });
        service.checkout_return(params).await.unwrap();

        let controller = service.controller.lock().await;
        assert!(controller.is_unlocked());
        assert_eq!(controller.view().unwrap().monthly_plans.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_begin_checkout_requires_configuration() {
        let service = MealPlanService::with_provider(config(false), None);
        fill(&service).await;
        service.set_form_field(field("email", "jo@example.com")).await.unwrap();
        let params = Parameters(BeginCheckoutParams { page_url: None });
        assert!(service.begin_checkout(params).await.is_err());
    }

    #[tokio::test]
    async fn test_begin_checkout_requires_email() {
        let service = MealPlanService::with_provider(config(true), Some(Arc::new(AlwaysOk)));
        let params = Parameters(BeginCheckoutParams { page_url: None });
        assert!(service.begin_checkout(params).await.is_err());
    }

    #[tokio::test]
    async fn test_begin_checkout_keeps_gate_locked() {
        let service = MealPlanService::with_provider(config(true), Some(Arc::new(AlwaysOk)));
        fill(&service).await;
        service.set_form_field(field("email", "jo@example.com")).await.unwrap();
        service.generate_plan().await.unwrap();

        let params = Parameters(BeginCheckoutParams { page_url: None });
        let result = service.begin_checkout(params).await.unwrap();
        assert_ne!(result.is_error, Some(true));
        assert!(!service.controller.lock().await.is_unlocked());
    }

    #[tokio::test]
    async fn test_stalled_checkout_does_not_block_other_tools() {
        let called = Arc::new(Notify::new());
        let provider = Stalled {
            called: Arc::clone(&called),
        };
        let service = MealPlanService::with_provider(config(true), Some(Arc::new(provider)));
        fill(&service).await;
        service.set_form_field(field("email", "jo@example.com")).await.unwrap();
        service.generate_plan().await.unwrap();

        let pending = {
            let service = service.clone();
            tokio::spawn(async move {
                let params = Parameters(BeginCheckoutParams { page_url: None });
                service.begin_checkout(params).await
            })
        };
        called.notified().await;

        let deadline = Duration::from_secs(2);
        assert!(tokio::time::timeout(deadline, service.get_plan()).await.is_ok());
        assert!(tokio::time::timeout(deadline, service.set_form_field(field("age", "31")))
            .await
            .is_ok());
        assert!(tokio::time::timeout(deadline, service.mealplan_status()).await.is_ok());

        pending.abort();
    }

    #[test]
    fn test_server_info() {
        let service = MealPlanService::with_provider(config(false), None);
        let info = service.get_info();
        assert_eq!(info.server_info.name, "mealplan");
    }
}
