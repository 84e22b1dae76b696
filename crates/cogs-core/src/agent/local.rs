//! Local heuristic insight generator
//!
//! Deterministic and offline: correlates the daily cost and generic-ratio
//! series, names the top cost drivers, and reports the average margin. The
//! question is accepted for interface parity but does not change the output.

use async_trait::async_trait;

use crate::context::{AgentContext, DailySample};
use crate::error::Result;
use crate::format::{format_currency, format_percent};
use crate::stats::{pearson, std_dev};

use super::types::{AgentReply, Answer, ChartSuggestion};
use super::AgentBackend;

/// Days needed before a correlation is attempted
pub const MIN_CORRELATION_DAYS: usize = 5;

/// Standard deviations at or below this are treated as constant series
const VARIANCE_EPSILON: f64 = 1e-6;

/// Maximum narrative length in characters
pub const NARRATIVE_LIMIT: usize = 600;

const BULLET: &str = "• ";

const NARRATIVE: &str = "Within the selected filters, COGs is concentrated among a few \
sites/customers/products. Monitor how generic mix (GCR) moves relative to COGs: if \
correlation is negative, higher GCR may be lowering cost. Focus where COGs is highest \
and GCR is lagging.";

const NEXT_QUESTIONS: [&str; 3] = [
    "On which dates did COGs spike with low GCR, and who drove it?",
    "Which products have the highest COGs at the lowest GCR deciles?",
    "Are margin% improvements aligned with GCR increases by site?",
];

/// Build the heuristic answer for a context
pub fn local_answer(context: &AgentContext, _question: &str) -> Answer {
    let samples = &context.samples;
    let mut notes = vec![correlation_note(&samples.daily)];

    if let Some(top) = top_by_cogs(&samples.sites, |s| s.cogs) {
        notes.push(format!(
            "Top site by COGs: {} ({}).",
            top.site,
            format_currency(top.cogs)
        ));
    }
    if let Some(top) = top_by_cogs(&samples.customers, |c| c.cogs) {
        notes.push(format!(
            "Top customer by COGs: {} ({}).",
            top.customer_id,
            format_currency(top.cogs)
        ));
    }
    if let Some(top) = top_by_cogs(&samples.products, |p| p.cogs) {
        notes.push(format!(
            "Top product by COGs: {} ({}, {}).",
            top.product_name,
            top.product_id,
            format_currency(top.cogs)
        ));
    }

    notes.push(format!(
        "Avg margin% in scope: {}.",
        format_percent(context.headline.avg_margin_pct(), 1)
    ));

    Answer {
        key_insights: notes
            .into_iter()
            .map(|note| format!("{}{}", BULLET, note))
            .collect(),
        narrative: NARRATIVE.chars().take(NARRATIVE_LIMIT).collect(),
        next_questions: NEXT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        chart_suggestions: vec![ChartSuggestion {
            kind: "line".to_string(),
            x: "date".to_string(),
            y: vec!["daily_cogs".to_string(), "avg_gcr".to_string()],
            note: Some("Dual-axis if available; else two panels.".to_string()),
        }],
    }
}

/// Correlation between the generic ratio and cost over the sampled days
fn correlation_note(daily: &[DailySample]) -> String {
    if daily.len() < MIN_CORRELATION_DAYS {
        return "Not enough recent days to compute a meaningful correlation (need ≥5).".to_string();
    }

    let cogs: Vec<f64> = daily.iter().map(DailySample::cogs).collect();
    let ratio: Vec<f64> = daily.iter().map(DailySample::ratio).collect();

    let varies = |values: &[f64]| std_dev(values).is_some_and(|s| s > VARIANCE_EPSILON);
    let r = if varies(&cogs) && varies(&ratio) {
        pearson(&ratio, &cogs)
    } else {
        None
    };

    match r {
        Some(r) => format!(
            "GCR↔COGs correlation on the last {} days: {:+.2} (indicative).",
            daily.len(),
            r
        ),
        None => "Not enough variance to relate GCR to COGs in the recent window.".to_string(),
    }
}

/// Highest-cost record; the first one wins ties
fn top_by_cogs<T, F>(rows: &[T], cogs: F) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    let mut best: Option<&T> = None;
    for row in rows {
        match best {
            Some(current) if cogs(row) <= cogs(current) => {}
            _ => best = Some(row),
        }
    }
    best
}

/// Offline backend wrapping `local_answer`
#[derive(Debug, Clone, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentBackend for LocalBackend {
    async fn answer(
        &self,
        _system: &str,
        context: &AgentContext,
        question: &str,
    ) -> Result<AgentReply> {
        Ok(AgentReply::Structured(local_answer(context, question)))
    }

    fn name(&self) -> &str {
        "local-demo"
    }

    fn model(&self) -> &str {
        "heuristic"
    }
}
