//! Agent command implementations (context preview, ask)

use std::fmt::Write as _;

use anyhow::{Context, Result};
use cogs_core::format::format_currency;
use cogs_core::models::DailyRow;
use cogs_core::{
    report, AgentBackend, AgentClient, AgentConfig, AgentReply, AnalysisMode, ContextBuilder,
    DashboardFilter, Dataset, PromptId, PromptLibrary,
};
use tracing::info;

use super::describe_filter;

/// Chart suggestions rendered per reply
const MAX_CHARTS: usize = 2;

/// Print the context document as pretty JSON
pub fn cmd_context(dataset: &Dataset, filter: &DashboardFilter, config: &AgentConfig) -> Result<()> {
    let context = ContextBuilder::new(dataset)
        .daily_sample_days(config.daily_sample_days)
        .build(filter)?;
    println!("{}", serde_json::to_string_pretty(&context)?);
    Ok(())
}

/// Build the context and ask the agent; returns the question actually asked
pub async fn ask(
    dataset: &Dataset,
    filter: &DashboardFilter,
    config: &AgentConfig,
    prompts: &mut PromptLibrary,
    question: Option<&str>,
    mode: AnalysisMode,
) -> Result<(String, AgentReply)> {
    let prompt = prompts.get(PromptId::ReportAgent)?;
    let question = question
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| prompt.default_question())
        .to_string();

    let context = ContextBuilder::new(dataset)
        .daily_sample_days(config.daily_sample_days)
        .build(filter)?;

    let client = AgentClient::for_mode(mode, config);
    info!(backend = client.name(), model = client.model(), "Asking agent");

    let reply = client
        .answer(prompt.system_section(), &context, &question)
        .await
        .with_context(|| format!("{} request failed", client.name()))?;

    Ok((question, reply))
}

pub async fn cmd_ask(
    dataset: &Dataset,
    filter: &DashboardFilter,
    config: &AgentConfig,
    question: Option<&str>,
    mode: &str,
    json: bool,
) -> Result<()> {
    let mode: AnalysisMode = mode.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let mut prompts = PromptLibrary::new();

    let (question, reply) = ask(dataset, filter, config, &mut prompts, question, mode).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    println!();
    println!("🤖 Agent ({})", mode);
    println!("   {}", describe_filter(filter, dataset));
    println!("   Q: {}", question);
    println!("   ─────────────────────────────────────────────────────────────");

    let slice = filter.apply(dataset)?;
    print!("{}", render_reply(&reply, &report::daily_rows(&slice)));

    Ok(())
}

/// Render a reply for the terminal
///
/// Chart suggestions become tables over the filtered daily rows. Only the
/// first two suggestions are considered, and only line charts keyed by date
/// are drawn; columns the daily series does not have are skipped.
pub fn render_reply(reply: &AgentReply, daily: &[DailyRow]) -> String {
    let mut out = String::new();

    let answer = match reply {
        AgentReply::Raw { raw } => {
            let _ = writeln!(out, "\n💡 Insights");
            for line in raw.lines() {
                let _ = writeln!(out, "   {}", line);
            }
            return out;
        }
        AgentReply::Structured(answer) => answer,
    };

    let _ = writeln!(out, "\n💡 Insights");
    for insight in &answer.key_insights {
        let _ = writeln!(out, "   {}", insight);
    }

    if !answer.narrative.is_empty() {
        let _ = writeln!(out, "\n📝 Narrative");
        let _ = writeln!(out, "   {}", answer.narrative);
    }

    if !answer.next_questions.is_empty() {
        let _ = writeln!(out, "\n❓ Suggested next questions");
        for question in &answer.next_questions {
            let _ = writeln!(out, "   • {}", question);
        }
    }

    for chart in answer
        .chart_suggestions
        .iter()
        .take(MAX_CHARTS)
        .filter(|c| c.is_date_line())
    {
        let columns: Vec<&str> = chart
            .y
            .iter()
            .map(String::as_str)
            .filter(|c| DailyRow::has_column(c))
            .collect();

        let _ = writeln!(out, "\n📈 Chart suggestion: {}", columns.join(", "));

        let mut header = format!("   {:10}", "date");
        for column in &columns {
            let _ = write!(header, " │ {:>14}", column);
        }
        let _ = writeln!(out, "{}", header);

        for row in daily {
            let mut line = format!("   {:10}", row.date.to_string());
            for column in &columns {
                let _ = write!(line, " │ {:>14}", format_cell(column, row.column(column)));
            }
            let _ = writeln!(out, "{}", line);
        }

        if let Some(note) = chart.note.as_deref().filter(|n| !n.is_empty()) {
            let _ = writeln!(out, "   {}", note);
        }
    }

    out
}

fn format_cell(column: &str, value: Option<f64>) -> String {
    match value {
        None => "-".to_string(),
        Some(v) if column == "avg_gcr" || column == "margin_pct" => format!("{:.3}", v),
        Some(v) => format_currency(v),
    }
}
