//! Tools module
//!
//! Plan controller, checkout redirect and service status used by the MCP
//! server.

pub mod checkout;
pub mod plan;
pub mod status;
