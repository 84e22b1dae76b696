//! COGS CLI - Cost of goods sold analytics and insight generator
//!
//! Usage:
//!   cogs kpis --from 2024-03-01        Headline figures for a date range
//!   cogs sites --product-type brand    COGS by site for branded products
//!   cogs ask --mode openai             Ask the remote agent for insights
//!   cogs serve --port 3000             Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    // Prompt commands need neither config nor dataset
    if let Commands::Prompts { action } = &cli.command {
        return match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        };
    }

    let config = commands::load_config(cli.config.as_deref(), cli.data_dir.as_deref())?;
    let dataset = commands::load_dataset(&config)?;

    match cli.command {
        Commands::Kpis { filter } => {
            let filter = commands::build_filter(&filter, &dataset)?;
            commands::cmd_kpis(&dataset, &filter)
        }
        Commands::Daily { filter } => {
            let filter = commands::build_filter(&filter, &dataset)?;
            commands::cmd_daily(&dataset, &filter)
        }
        Commands::Sites { filter } => {
            let filter = commands::build_filter(&filter, &dataset)?;
            commands::cmd_sites(&dataset, &filter)
        }
        Commands::Customers { filter, limit } => {
            let filter = commands::build_filter(&filter, &dataset)?;
            commands::cmd_customers(&dataset, &filter, limit)
        }
        Commands::Products { filter, limit } => {
            let filter = commands::build_filter(&filter, &dataset)?;
            commands::cmd_products(&dataset, &filter, limit)
        }
        Commands::Export { filter, output } => {
            let filter = commands::build_filter(&filter, &dataset)?;
            commands::cmd_export(&dataset, &filter, &output)
        }
        Commands::Context { filter } => {
            let filter = commands::build_filter(&filter, &dataset)?;
            commands::cmd_context(&dataset, &filter, &config)
        }
        Commands::Ask {
            filter,
            question,
            mode,
            json,
        } => {
            let filter = commands::build_filter(&filter, &dataset)?;
            commands::cmd_ask(&dataset, &filter, &config, question.as_deref(), &mode, json).await
        }
        Commands::Serve {
            port,
            host,
            allowed_origins,
        } => commands::cmd_serve(dataset, config, &host, port, allowed_origins).await,
        Commands::Prompts { .. } => Ok(()),
    }
}
