//! Insight generator response types
//!
//! These types are backend-agnostic and shared by the local heuristic and
//! the remote chat-completion path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Structured answer document
///
/// Every field defaults to empty so partially filled replies still parse.
/// An explicit `null` counts as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_insights: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub narrative: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_questions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chart_suggestions: Vec<ChartSuggestion>,
}

/// A suggested chart over the daily series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSuggestion {
    /// Chart kind ("line", "bar", ...)
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub x: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ChartSuggestion {
    /// Line chart keyed by date (the only kind the renderers draw)
    pub fn is_date_line(&self) -> bool {
        self.kind.eq_ignore_ascii_case("line") && self.x == "date"
    }
}

/// What the generator returns
///
/// Serialized untagged: a structured reply is the answer document itself, a
/// raw reply is `{"raw": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentReply {
    /// Remote content that was not a valid answer document
    Raw { raw: String },
    Structured(Answer),
}

impl AgentReply {
    pub fn raw(content: impl Into<String>) -> Self {
        AgentReply::Raw {
            raw: content.into(),
        }
    }

    pub fn answer(&self) -> Option<&Answer> {
        match self {
            AgentReply::Structured(answer) => Some(answer),
            AgentReply::Raw { .. } => None,
        }
    }

    pub fn raw_content(&self) -> Option<&str> {
        match self {
            AgentReply::Raw { raw } => Some(raw),
            AgentReply::Structured(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, AgentReply::Raw { .. })
    }
}

impl From<Answer> for AgentReply {
    fn from(answer: Answer) -> Self {
        AgentReply::Structured(answer)
    }
}

/// Which generator answers the question
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMode {
    /// Deterministic local heuristic (no network)
    #[default]
    #[serde(rename = "local-demo", alias = "local")]
    LocalDemo,
    /// Remote OpenAI-compatible chat completion
    #[serde(rename = "openai", alias = "remote")]
    OpenAi,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::LocalDemo => "local-demo",
            AnalysisMode::OpenAi => "openai",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local-demo" | "local" => Ok(AnalysisMode::LocalDemo),
            "openai" | "remote" => Ok(AnalysisMode::OpenAi),
            _ => Err(format!(
                "Unknown analysis mode: {}. Available: local-demo, openai",
                s
            )),
        }
    }
}
