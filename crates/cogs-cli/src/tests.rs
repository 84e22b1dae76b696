//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::PathBuf;

use clap::Parser;
use cogs_core::test_utils::MockChatServer;
use cogs_core::{
    AgentConfig, AgentReply, AnalysisMode, Answer, ChartSuggestion, DashboardFilter, Dataset,
    PromptLibrary, ProductType,
};

use crate::cli::{Cli, Commands, FilterArgs};
use crate::commands::{self, truncate};

fn sample_dataset() -> Dataset {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data");
    Dataset::load(&dir).unwrap()
}

fn filter_args() -> FilterArgs {
    FilterArgs {
        from: None,
        to: None,
        sites: vec![],
        customers: vec![],
        products: vec![],
        product_type: "all".to_string(),
    }
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_repeatable_filters() {
    let cli = Cli::try_parse_from([
        "cogs",
        "sites",
        "--site",
        "North Pharmacy",
        "--site",
        "Eastside Clinic",
        "--product-type",
        "brand",
        "--from",
        "2024-03-05",
    ])
    .unwrap();

    match cli.command {
        Commands::Sites { filter } => {
            assert_eq!(filter.sites, vec!["North Pharmacy", "Eastside Clinic"]);
            assert_eq!(filter.product_type, "brand");
            assert_eq!(filter.from.as_deref(), Some("2024-03-05"));
            assert!(filter.to.is_none());
        }
        _ => panic!("expected sites command"),
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["cogs", "ask", "--data-dir", "/tmp/cogs", "-v"]).unwrap();
    assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/cogs")));
    assert!(cli.verbose);
    match cli.command {
        Commands::Ask { mode, question, .. } => {
            assert_eq!(mode, "local-demo");
            assert!(question.is_none());
        }
        _ => panic!("expected ask command"),
    }
}

// ========== Filter Tests ==========

#[test]
fn test_build_filter_defaults() {
    let dataset = sample_dataset();
    let filter = commands::build_filter(&filter_args(), &dataset).unwrap();
    assert_eq!(filter, DashboardFilter::new());
}

#[test]
fn test_build_filter_selection() {
    let dataset = sample_dataset();
    let args = FilterArgs {
        to: Some("2024-03-10".to_string()),
        customers: vec!["CUST-002".to_string()],
        product_type: "generic".to_string(),
        ..filter_args()
    };
    let filter = commands::build_filter(&args, &dataset).unwrap();

    let (from, to) = filter.date_range.unwrap();
    assert_eq!(from.to_string(), "2024-03-01");
    assert_eq!(to.to_string(), "2024-03-10");
    assert!(filter.sites.is_none());
    assert_eq!(filter.customers, Some(vec!["CUST-002".to_string()]));
    assert_eq!(filter.product_type, ProductType::GenericOnly);
}

#[test]
fn test_build_filter_rejects_bad_input() {
    let dataset = sample_dataset();

    let bad_date = FilterArgs {
        from: Some("yesterday".to_string()),
        ..filter_args()
    };
    let err = commands::build_filter(&bad_date, &dataset).unwrap_err();
    assert!(err.to_string().contains("--from"));

    let bad_type = FilterArgs {
        product_type: "store-brand".to_string(),
        ..filter_args()
    };
    assert!(commands::build_filter(&bad_type, &dataset).is_err());

    let inverted = FilterArgs {
        from: Some("2024-03-20".to_string()),
        to: Some("2024-03-02".to_string()),
        ..filter_args()
    };
    assert!(commands::build_filter(&inverted, &dataset).is_err());
}

#[test]
fn test_describe_filter() {
    let dataset = sample_dataset();
    let filter = DashboardFilter::new()
        .sites(Some(vec!["North Pharmacy".to_string()]))
        .product_type(ProductType::BrandOnly);
    let text = commands::describe_filter(&filter, &dataset);
    assert!(text.starts_with("2024-03-01 to 2024-03-30"));
    assert!(text.contains("sites: North Pharmacy"));
    assert!(text.ends_with("Brand only"));
}

// ========== Report Command Tests ==========

#[test]
fn test_report_commands() {
    let dataset = sample_dataset();
    let filter = DashboardFilter::new();
    assert!(commands::cmd_kpis(&dataset, &filter).is_ok());
    assert!(commands::cmd_daily(&dataset, &filter).is_ok());
    assert!(commands::cmd_sites(&dataset, &filter).is_ok());
    assert!(commands::cmd_customers(&dataset, &filter, 2).is_ok());
    assert!(commands::cmd_products(&dataset, &filter, 20).is_ok());
}

#[test]
fn test_report_commands_empty_selection() {
    let dataset = sample_dataset();
    let filter = DashboardFilter::new().products(Some(vec![]));
    assert!(commands::cmd_sites(&dataset, &filter).is_ok());
    assert!(commands::cmd_products(&dataset, &filter, 20).is_ok());
}

#[test]
fn test_cmd_export() {
    let dataset = sample_dataset();
    let dir = tempfile::TempDir::new().unwrap();
    let output = dir.path().join("north_brand.csv");

    let filter = DashboardFilter::new()
        .sites(Some(vec!["North Pharmacy".to_string()]))
        .product_type(ProductType::BrandOnly);
    commands::cmd_export(&dataset, &filter, &output).unwrap();

    let file = std::fs::File::open(&output).unwrap();
    let items = cogs_core::import::parse_line_items(file).unwrap();
    assert_eq!(items.len(), 25);
    assert!(items.iter().all(|i| !i.is_generic));
}

#[test]
fn test_cmd_export_bad_path() {
    let dataset = sample_dataset();
    let output = PathBuf::from("/nonexistent/dir/out.csv");
    assert!(commands::cmd_export(&dataset, &DashboardFilter::new(), &output).is_err());
}

// ========== Agent Command Tests ==========

#[test]
fn test_cmd_context() {
    let dataset = sample_dataset();
    let result = commands::cmd_context(&dataset, &DashboardFilter::new(), &AgentConfig::default());
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_ask_local_uses_default_question() {
    let dataset = sample_dataset();
    let mut prompts = PromptLibrary::embedded_only();

    let (question, reply) = commands::ask(
        &dataset,
        &DashboardFilter::new(),
        &AgentConfig::default(),
        &mut prompts,
        Some("   "),
        AnalysisMode::LocalDemo,
    )
    .await
    .unwrap();

    assert!(question.contains("GCR"));
    assert_eq!(reply.answer().unwrap().key_insights.len(), 5);
}

#[tokio::test]
async fn test_ask_remote() {
    let mock = MockChatServer::start(
        r#"{"key_insights": ["Brand share is rising"], "narrative": "", "next_questions": ["Why?"]}"#,
    )
    .await;
    let config = AgentConfig {
        base_url: mock.url(),
        model: "gpt-mock".to_string(),
        ..Default::default()
    };
    let dataset = sample_dataset();
    let mut prompts = PromptLibrary::embedded_only();

    let (question, reply) = commands::ask(
        &dataset,
        &DashboardFilter::new(),
        &config,
        &mut prompts,
        Some("Where is brand spend concentrated?"),
        AnalysisMode::OpenAi,
    )
    .await
    .unwrap();

    assert_eq!(question, "Where is brand spend concentrated?");
    assert_eq!(reply.answer().unwrap().key_insights, vec!["Brand share is rising"]);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body["model"], "gpt-mock");
}

#[tokio::test]
async fn test_ask_remote_failure() {
    let mock = MockChatServer::start_failing(401).await;
    let config = AgentConfig {
        base_url: mock.url(),
        ..Default::default()
    };
    let dataset = sample_dataset();
    let mut prompts = PromptLibrary::embedded_only();

    let result = commands::ask(
        &dataset,
        &DashboardFilter::new(),
        &config,
        &mut prompts,
        None,
        AnalysisMode::OpenAi,
    )
    .await;
    assert!(result.is_err());
}

// ========== Rendering Tests ==========

fn chart(kind: &str, x: &str, y: &[&str], note: Option<&str>) -> ChartSuggestion {
    ChartSuggestion {
        kind: kind.to_string(),
        x: x.to_string(),
        y: y.iter().map(|s| s.to_string()).collect(),
        note: note.map(str::to_string),
    }
}

#[test]
fn test_render_structured_reply() {
    let dataset = sample_dataset();
    let slice = DashboardFilter::new().apply(&dataset).unwrap();
    let daily = cogs_core::report::daily_rows(&slice);

    let reply = AgentReply::from(Answer {
        key_insights: vec!["• Top site by COGs: North Pharmacy ($9,000).".to_string()],
        narrative: String::new(),
        next_questions: vec!["Which products drive it?".to_string()],
        chart_suggestions: vec![
            chart("line", "date", &["daily_cogs", "bogus"], Some("Watch the spikes")),
            chart("bar", "site", &["cogs"], None),
            chart("line", "date", &["avg_gcr"], Some("Third chart is never drawn")),
        ],
    });

    let text = commands::render_reply(&reply, &daily);
    assert!(text.contains("💡 Insights"));
    assert!(text.contains("Top site by COGs"));
    // Empty narrative is omitted
    assert!(!text.contains("Narrative"));
    assert!(text.contains("• Which products drive it?"));
    assert_eq!(text.matches("📈 Chart suggestion").count(), 1);
    assert!(text.contains("daily_cogs"));
    assert!(!text.contains("bogus"));
    assert!(text.contains("2024-03-30"));
    assert!(text.contains("Watch the spikes"));
    assert!(!text.contains("Third chart"));
}

#[test]
fn test_render_raw_reply() {
    let reply = AgentReply::raw("Not JSON at all.\nSecond line.");
    let text = commands::render_reply(&reply, &[]);
    assert!(text.contains("💡 Insights"));
    assert!(text.contains("   Not JSON at all."));
    assert!(text.contains("   Second line."));
    assert!(!text.contains("Suggested next questions"));
}

#[test]
fn test_render_omits_empty_questions() {
    let reply = AgentReply::from(Answer {
        key_insights: vec!["• Avg GCR: 12.0%".to_string()],
        narrative: "Stable margins.".to_string(),
        ..Default::default()
    });
    let text = commands::render_reply(&reply, &[]);
    assert!(text.contains("Avg GCR"));
    assert!(text.contains("📝 Narrative"));
    assert!(!text.contains("Suggested next questions"));
    assert!(!text.contains("📈 Chart suggestion"));
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Atorvastatin 20mg", 30), "Atorvastatin 20mg");
    assert_eq!(truncate("Atorvastatin 20mg", 10), "Atorvas...");
    assert_eq!(truncate("Amoxicillin 500mg", 17), "Amoxicillin 500mg");
}
