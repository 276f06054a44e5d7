use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use soadvisor::advisor::{AdvisorError, AdvisorService, AdvisorServiceBuilder};
use soadvisor::cache::JsonFileCache;
use soadvisor::config::{Config, default_cache_dir};
use soadvisor::models::AdvisorResult;
use soadvisor::stack_exchange::StackExchangeClientBuilder;
use soadvisor::summarizer::{OpenRouterSummarizerBuilder, SimpleSummarizer, Summarizer};

/// soadvisor - Stack Overflow answer summarizer CLI
#[derive(Parser)]
#[command(name = "soadvisor")]
#[command(about = "Searches Stack Overflow and condenses the top answers into bullets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Ask a question and print a condensed answer summary
    Ask(AskCommand),
}

/// Ask a question
#[derive(Parser)]
struct AskCommand {
    /// The question to ask
    #[arg(value_name = "QUESTION")]
    question: String,

    /// Run without the result cache
    #[arg(long)]
    no_cache: bool,

    /// Semicolon-separated tag filter for the advanced search tier
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Ask(cmd) => handle_ask(cmd).await,
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
fn is_user_error(error: &anyhow::Error) -> bool {
    error.to_string().contains("cannot be empty")
}

/// Handles the ask command by running the advisor pipeline.
async fn handle_ask(cmd: &AskCommand) -> Result<()> {
    if cmd.question.trim().is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let config = Config::from_env();
    let service = build_service(&config, cmd)?;

    println!("Searching Stack Overflow...");
    match service.ask(&cmd.question).await {
        Ok(result) => {
            print_result(&result);
            Ok(())
        }
        Err(AdvisorError::SearchUnavailable(e)) => {
            tracing::error!(error = %e, "search request failed");
            anyhow::bail!(
                "Could not reach Stack Overflow right now. Check your connection or try again later."
            )
        }
    }
}

/// Wires the pipeline from configuration: one Stack Exchange client serving
/// both provider roles, a summarizer chosen by credential presence, and an
/// optional file cache.
fn build_service(config: &Config, cmd: &AskCommand) -> Result<AdvisorService> {
    let mut client_builder = StackExchangeClientBuilder::new();
    if let Some(key) = &config.stack_exchange_key {
        client_builder = client_builder.api_key(key.as_str());
    }
    if let Some(tags) = cmd.tags.as_ref().or(config.tagged.as_ref()) {
        client_builder = client_builder.tagged(tags.as_str());
    }
    let client = Arc::new(
        client_builder
            .build()
            .context("Failed to build Stack Exchange client")?,
    );

    let summarizer: Arc<dyn Summarizer> = match &config.openrouter_api_key {
        Some(key) => {
            let mut builder = OpenRouterSummarizerBuilder::new().api_key(key.as_str());
            if let Some(model) = &config.openrouter_model {
                builder = builder.model(model.as_str());
            }
            if let Some(referer) = &config.openrouter_referer {
                builder = builder.referer(referer.as_str());
            }
            if let Some(title) = &config.openrouter_title {
                builder = builder.title(title.as_str());
            }
            tracing::info!("OpenRouter summarizer enabled");
            Arc::new(
                builder
                    .build()
                    .context("Failed to build OpenRouter summarizer")?,
            )
        }
        None => Arc::new(SimpleSummarizer::new()),
    };

    let mut builder = AdvisorServiceBuilder::new()
        .search(client.clone())
        .answers(client)
        .summarizer(summarizer);

    if !cmd.no_cache {
        let dir = config
            .cache_dir
            .clone()
            .or_else(default_cache_dir)
            .ok_or_else(|| anyhow::anyhow!("Failed to determine cache directory"))?;
        let cache = JsonFileCache::new(dir).context("Failed to create cache directory")?;
        builder = builder.cache(Arc::new(cache));
    }

    Ok(builder.build())
}

fn print_result(result: &AdvisorResult) {
    println!();
    println!("Found {} relevant posts", result.top_posts.len());
    println!("Summary:");
    if result.summary.starts_with("- ") {
        println!("{}", result.summary);
    } else {
        println!("- {}", result.summary);
    }
    println!();
    match result.top_posts.first() {
        Some(top) => println!("Top thread: {}", top.link),
        None => println!("No threads found. Try refining your question."),
    }
}
