//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `agent` - Context preview and agent questions
//! - `core` - Shared utilities (config, dataset, filter flags)
//! - `export` - Filtered line item export
//! - `prompts` - Prompt library management commands
//! - `reports` - KPI, daily and group summary reports
//! - `serve` - Web server command

pub mod agent;
pub mod core;
pub mod export;
pub mod prompts;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use agent::*;
pub use core::*;
pub use export::*;
pub use prompts::*;
pub use reports::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
