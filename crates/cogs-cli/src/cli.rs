//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// COGS report agent - explore cost of goods sold and ask for insights
#[derive(Parser)]
#[command(name = "cogs")]
#[command(about = "COGS analytics and insight generator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dataset directory (line_items.csv, daily_summary.csv, data_dictionary.csv)
    ///
    /// Overrides the config file and the COGS_DATA_DIR environment variable.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to the override file, then embedded defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Dashboard selection shared by the data commands
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Start date (YYYY-MM-DD, defaults to the first day in the dataset)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD, defaults to the last day in the dataset)
    #[arg(long)]
    pub to: Option<String>,

    /// Restrict to a site (repeatable)
    #[arg(long = "site")]
    pub sites: Vec<String>,

    /// Restrict to a customer id (repeatable)
    #[arg(long = "customer")]
    pub customers: Vec<String>,

    /// Restrict to a product name (repeatable)
    #[arg(long = "product")]
    pub products: Vec<String>,

    /// Product type: all, generic, brand
    #[arg(long, default_value = "all")]
    pub product_type: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show headline KPIs for the selection
    Kpis {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show the daily series with margin columns
    Daily {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show COGS by site
    Sites {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show COGS by customer
    Customers {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum rows to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show COGS by product
    Products {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum rows to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Export the filtered line items to CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output file
        #[arg(short, long, default_value = "filtered_line_items.csv")]
        output: PathBuf,
    },

    /// Print the context document the agent receives
    Context {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Ask the agent a question about the selection
    Ask {
        #[command(flatten)]
        filter: FilterArgs,

        /// Question (defaults to the prompt's default question)
        #[arg(short, long)]
        question: Option<String>,

        /// Analysis mode: local-demo, openai
        #[arg(short, long, default_value = "local-demo")]
        mode: String,

        /// Print the raw reply as JSON instead of rendering it
        #[arg(long)]
        json: bool,
    },

    /// Manage prompt templates
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., report_agent)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
