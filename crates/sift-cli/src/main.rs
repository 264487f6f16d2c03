//! sift - conversational analytics client

mod config;
mod plain;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sift_api::AssistantClient;
use sift_chat::{ChatWorkflow, PollPolicy};

use config::Config;

/// Backend used when neither the CLI nor the config file names one
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// sift - ask questions about your data in plain language
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (default: http://localhost:8000)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Ask a single question, print the reply, and exit
    #[arg(short, long)]
    question: Option<String>,

    /// Disable the TUI (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("sift=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        let path = Config::init()?;
        println!("Config file created at: {}", path.display());
        println!("\nExample configuration:\n{}", config::example_config());
        return Ok(());
    }

    let config = Config::load();

    let base_url = args
        .base_url
        .or(config.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let mut policy = PollPolicy::default();
    if let Some(attempts) = config.poll_max_attempts {
        policy.max_attempts = attempts;
    }
    if let Some(interval_ms) = config.poll_interval_ms {
        policy.interval = Duration::from_millis(interval_ms);
    }

    tracing::debug!("using backend at {}", base_url);
    let client = Arc::new(AssistantClient::new(base_url.as_str()));
    let workflow = ChatWorkflow::new(client).with_policy(policy);

    if let Some(question) = args.question {
        return plain::run_once(&workflow, &question).await;
    }

    if args.no_tui {
        return plain::run_repl(&workflow).await;
    }

    ui::run_tui(workflow, base_url, config.example_questions).await
}
