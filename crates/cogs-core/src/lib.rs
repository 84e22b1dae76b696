//! COGS Core Library
//!
//! Shared functionality for the COGS report agent:
//! - Dataset loading from CSV exports, with a single-load cache
//! - Dashboard filters, KPIs and group summaries
//! - Context assembler for the insight generator
//! - Pluggable insight generators (local heuristic, OpenAI-compatible)
//! - Prompt library for customizable system instructions
//! - Layered configuration (embedded defaults, override file, environment)

pub mod agent;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod import;
pub mod models;
pub mod prompts;
pub mod report;
pub mod stats;

/// Test utilities including a mock chat-completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use agent::{
    local_answer, AgentBackend, AgentClient, AgentReply, AnalysisMode, Answer, ChartSuggestion,
    LocalBackend, OpenAICompatibleBackend,
};
pub use config::AgentConfig;
pub use context::{AgentContext, ContextBuilder, Headline, Samples};
pub use dataset::{global_cache, Dataset, DatasetCache};
pub use error::{Error, Result};
pub use filter::{DashboardFilter, FilteredSlice, ResolvedFilter};
pub use models::{
    DailyRow, DailySummary, DictionaryEntry, GroupSummary, Kpis, LineItem, ProductSummary,
    ProductType,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
