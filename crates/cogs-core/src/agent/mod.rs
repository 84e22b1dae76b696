//! Pluggable insight generator
//!
//! # Architecture
//!
//! - `AgentBackend` trait: answers a question about an `AgentContext`
//! - `AgentClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `LocalBackend` (heuristic, offline) and
//!   `OpenAICompatibleBackend` (remote chat completion)
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = AgentConfig::load(None)?;
//! let client = AgentClient::for_mode(AnalysisMode::LocalDemo, &config);
//! let reply = client.answer(system, &context, "What drives cost?").await?;
//! ```

mod local;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use local::{local_answer, LocalBackend, MIN_CORRELATION_DAYS, NARRATIVE_LIMIT};
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use async_trait::async_trait;

use crate::config::AgentConfig;
use crate::context::AgentContext;
use crate::error::Result;

/// Trait defining the interface for all insight generators
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Answer a question about the context
    ///
    /// `system` is the instruction for model-backed generators; the local
    /// heuristic ignores it.
    async fn answer(
        &self,
        system: &str,
        context: &AgentContext,
        question: &str,
    ) -> Result<AgentReply>;

    /// Short backend name (for logging)
    fn name(&self) -> &str;

    /// Model identifier
    fn model(&self) -> &str;
}

/// Concrete agent client enum
#[derive(Clone)]
pub enum AgentClient {
    Local(LocalBackend),
    OpenAICompatible(OpenAICompatibleBackend),
}

impl AgentClient {
    /// Create the client for an analysis mode
    pub fn for_mode(mode: AnalysisMode, config: &AgentConfig) -> Self {
        match mode {
            AnalysisMode::LocalDemo => AgentClient::Local(LocalBackend::new()),
            AnalysisMode::OpenAi => {
                AgentClient::OpenAICompatible(OpenAICompatibleBackend::from_config(config))
            }
        }
    }

    /// Create a local heuristic client
    pub fn local() -> Self {
        AgentClient::Local(LocalBackend::new())
    }

    /// The mode this client answers in
    pub fn mode(&self) -> AnalysisMode {
        match self {
            AgentClient::Local(_) => AnalysisMode::LocalDemo,
            AgentClient::OpenAICompatible(_) => AnalysisMode::OpenAi,
        }
    }
}

// Implement AgentBackend for AgentClient by delegating to the inner backend
#[async_trait]
impl AgentBackend for AgentClient {
    async fn answer(
        &self,
        system: &str,
        context: &AgentContext,
        question: &str,
    ) -> Result<AgentReply> {
        tracing::debug!(backend = self.name(), model = self.model(), "Generating insights");
        match self {
            AgentClient::Local(b) => b.answer(system, context, question).await,
            AgentClient::OpenAICompatible(b) => b.answer(system, context, question).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            AgentClient::Local(b) => b.name(),
            AgentClient::OpenAICompatible(b) => b.name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            AgentClient::Local(b) => b.model(),
            AgentClient::OpenAICompatible(b) => b.model(),
        }
    }
}
