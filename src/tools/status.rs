//! Status Tool
//!
//! Provides runtime status information about the meal plan service.

use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::tools::plan::PlanController;

/// How to drive the plan tools, for AI assistants
pub const PLAN_INSTRUCTIONS: &str = r#"
# Meal Plan Instructions

1. Fill the form with `set_form_field`. Fields: gender (male/female), age (years),
   height (inches), weight (pounds), activity (sedentary, light, moderate, active,
   very_active), goal (fat_loss, muscle_gain), email.
2. Call `generate_plan`. Invalid numbers or unknown options are rejected and the
   previous plan is kept.
3. `get_plan` shows BMR, TDEE and month 1 macros. The full 3-month plan with meals,
   swaps and cardio is shown only after unlocking.
4. To unlock, call `begin_checkout` (needs an email) and send the user to the
   returned URL. When they come back, pass the return URL or query string to
   `checkout_return`.
5. Generating a new plan locks it again.
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
    pub version: &'static str,

    /// Plan state
    pub has_plan: bool,
    pub plan_computed_at: Option<String>,
    pub unlocked: bool,
    pub checkout_configured: bool,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    checkout_configured: bool,
}

impl StatusTracker {
    pub fn new(checkout_configured: bool) -> Self {
        Self {
            start_time: Instant::now(),
            checkout_configured,
        }
    }

    /// Get the current status
    pub fn get_status(&self, controller: &PlanController) -> ServiceStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ServiceStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            build_profile: build_info.build_profile,
            version: build_info.version,
            has_plan: controller.result().is_some(),
            plan_computed_at: controller
                .computed_at()
                .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            unlocked: controller.is_unlocked(),
            checkout_configured: self.checkout_configured,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
