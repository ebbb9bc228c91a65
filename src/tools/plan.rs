//! Plan controller
//!
//! Single owner of the form, the current result and the unlock gate. Every
//! change goes through one of the named transitions below.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::error::{PlanError, PlanResult};
use crate::models::{FormField, FormFields, MacroSummary, MetabolicResult, MonthPlan};
use crate::nutrition::compute_plan;
use crate::tools::checkout::{
    open_session, parse_checkout_return, CheckoutHandoff, CheckoutProvider, CheckoutRequest,
    CheckoutReturn,
};

/// Shown in the locked view
pub const UNLOCK_PROMPT: &str = "Unlock full plan including meals, swaps, and PDF download via email.";

/// What the caller may render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanView {
    pub bmr: i64,
    pub tdee: i64,
    pub unlocked: bool,
    /// Month 1 targets, always present
    pub month_one: MacroSummary,
    /// All months with meals and swaps; only when unlocked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_plans: Option<Vec<MonthPlan>>,
    /// Call to action while locked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_prompt: Option<String>,
}

/// Form, result and unlock state
#[derive(Debug, Clone, Default)]
pub struct PlanController {
    form: FormFields,
    result: Option<MetabolicResult>,
    computed_at: Option<DateTime<Utc>>,
    unlocked: bool,
    price_label: Option<String>,
}

impl PlanController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller whose locked view advertises the given price
    pub fn with_price_label(price_label: impl Into<String>) -> Self {
        Self {
            price_label: Some(price_label.into()),
            ..Self::default()
        }
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn result(&self) -> Option<&MetabolicResult> {
        self.result.as_ref()
    }

    pub fn computed_at(&self) -> Option<DateTime<Utc>> {
        self.computed_at
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Edit one form field. Does not touch the result.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Validate the form and compute a new plan.
    ///
    /// On success the result is replaced and the gate is locked again. On
    /// failure both the prior result and the gate are left as they were.
    pub fn generate_plan(&mut self) -> PlanResult<&MetabolicResult> {
        let (input, result) = match self
            .form
            .parse()
            .and_then(|input| compute_plan(&input).map(|result| (input, result)))
        {
            Ok(computed) => computed,
            Err(e) => {
                tracing::warn!(error = %e, "Plan generation rejected");
                return Err(e);
            }
        };

        tracing::info!(
            bmr = result.bmr,
            tdee = result.tdee,
            goal = input.goal.as_str(),
            activity = input.activity_level.as_str(),
            "Plan computed"
        );

        self.unlocked = false;
        self.computed_at = Some(Utc::now());
        Ok(self.result.insert(result))
    }

    pub fn set_unlocked(&mut self, unlocked: bool) {
        if unlocked != self.unlocked {
            tracing::info!(unlocked, "Unlock state changed");
        }
        self.unlocked = unlocked;
    }

    /// Inspect a checkout return location and unlock if it carries the
    /// success marker. Anything else leaves the gate unchanged.
    pub fn observe_checkout_return(&mut self, location: &str) -> CheckoutReturn {
        let ret = parse_checkout_return(location);
        if ret.unlocked {
            self.set_unlocked(true);
        } else {
            tracing::debug!("Checkout return without unlock marker");
        }
        ret
    }

    /// Build the checkout request for the current email
    pub fn prepare_checkout(&self, page_url: &Url, price_id: &str) -> PlanResult<CheckoutRequest> {
        let email = self.form.email.trim();
        if email.is_empty() {
            return Err(PlanError::MissingEmail);
        }
        Ok(CheckoutRequest::new(email, price_id, page_url))
    }

    /// Prepare the request and open a session with the provider.
    ///
    /// Never unlocks; the gate only opens when the return marker is observed.
    pub async fn begin_checkout(
        &self,
        provider: &dyn CheckoutProvider,
        page_url: &Url,
        price_id: &str,
    ) -> PlanResult<CheckoutHandoff> {
        let request = self.prepare_checkout(page_url, price_id)?;
        Ok(open_session(provider, request).await?)
    }

    /// Current view, or `None` before the first successful plan
    pub fn view(&self) -> Option<PlanView> {
        let result = self.result.as_ref()?;
        let month_one = result.teaser()?;

        Some(PlanView {
            bmr: result.bmr,
            tdee: result.tdee,
            unlocked: self.unlocked,
            month_one,
            monthly_plans: self.unlocked.then(|| result.monthly_plans.clone()),
            unlock_prompt: (!self.unlocked).then(|| self.unlock_prompt()),
        })
    }

    fn unlock_prompt(&self) -> String {
        match &self.price_label {
            Some(price) => format!("{} Unlock for {}", UNLOCK_PROMPT, price),
            None => UNLOCK_PROMPT.to_string(),
        }
    }
}
