//! Agent handlers: context preview and question answering

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::filter::{FilterBody, FilterQuery};
use crate::{AppError, AppState};
use cogs_core::{
    AgentBackend, AgentClient, AgentContext, AgentReply, AnalysisMode, ContextBuilder,
    DashboardFilter,
};

/// Request body for POST /api/agent
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AgentRequest {
    /// Question to answer (defaults to the prompt's default question)
    pub question: Option<String>,
    /// local-demo or openai (default local-demo)
    pub mode: Option<String>,
    pub filter: FilterBody,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub mode: AnalysisMode,
    pub model: String,
    pub question: String,
    pub reply: AgentReply,
}

fn build_context(state: &AppState, filter: &DashboardFilter) -> Result<AgentContext, AppError> {
    ContextBuilder::new(&state.dataset)
        .daily_sample_days(state.agent.daily_sample_days)
        .build(filter)
        .map_err(|e| AppError::bad_request(&e.to_string()))
}

/// GET /api/context - The context document the agent would receive
pub async fn get_context(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<AgentContext>, AppError> {
    let filter = params.to_filter(&state.dataset)?;
    Ok(Json(build_context(&state, &filter)?))
}

/// POST /api/agent - Answer a question about the selection
pub async fn ask_agent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AgentRequest>,
) -> Result<Json<AgentResponse>, AppError> {
    let mode = body
        .mode
        .as_deref()
        .map(str::parse::<AnalysisMode>)
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?
        .unwrap_or_default();

    let question = body
        .question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| state.default_question.clone());

    let filter = body.filter.to_filter(&state.dataset)?;
    let context = build_context(&state, &filter)?;

    let client = AgentClient::for_mode(mode, &state.agent);
    info!(mode = %mode, model = client.model(), "Answering agent question");

    let reply = client
        .answer(&state.system_prompt, &context, &question)
        .await
        .map_err(|e| match mode {
            AnalysisMode::OpenAi => AppError::bad_gateway("Insight generator request failed", e),
            AnalysisMode::LocalDemo => AppError::from(e),
        })?;

    if reply.is_raw() {
        info!("Agent returned unstructured content");
    }

    Ok(Json(AgentResponse {
        mode,
        model: client.model().to_string(),
        question,
        reply,
    }))
}
