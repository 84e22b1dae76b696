//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod agent;
pub mod dashboard;
pub mod export;
pub mod filter;

// Re-export all handlers for use in router
pub use agent::*;
pub use dashboard::*;
pub use export::*;
