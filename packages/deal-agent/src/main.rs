//! Deal discovery agent.
//!
//! Searches Google Shopping through SerpAPI, ranks the discounted products
//! and stages them in Supabase as pending deals for moderator approval.

mod config;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use deal_pipeline::{
    AlertSource, ApprovalStore, Deal, DealPipeline, KeywordSource, MemoryApprovalStore,
    PipelineConfig, PipelineOutput, RateLimitedProvider, SearchRequest, SerpApiProvider, SortKey,
    SupabaseStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AgentConfig;

#[derive(Parser)]
#[command(name = "deal-agent")]
#[command(about = "Find discounted products and stage them for approval")]
struct Cli {
    /// Search this keyword instead of deal alerts and popular keywords
    #[arg(short, long)]
    keyword: Option<String>,

    /// Restrict to a category
    #[arg(short, long)]
    category: Option<String>,

    /// Minimum discount percentage (0-100)
    #[arg(long)]
    min_discount: Option<u32>,

    /// Maximum number of provider queries
    #[arg(long, default_value_t = 20)]
    max_queries: usize,

    /// discount, price, rating or relevance
    #[arg(long, default_value = "discount")]
    sort_by: SortKey,

    /// Keep at most this many deals
    #[arg(long)]
    limit: Option<usize>,

    /// Rank deals without staging them
    #[arg(long)]
    dry_run: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print deals and summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn request(&self, default_min_discount: u32) -> SearchRequest {
        SearchRequest {
            keyword: self.keyword.clone(),
            category: self.category.clone(),
            min_discount: self.min_discount.unwrap_or(default_min_discount),
            max_queries: self.max_queries,
            sort_by: self.sort_by,
            limit: self.limit,
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "debug"
    } else {
        "info,deal_pipeline=debug"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AgentConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        country = %config.serp.country,
        supabase = config.supabase.is_some(),
        "Configuration loaded"
    );

    let provider = RateLimitedProvider::new(
        SerpApiProvider::new(&config.serp_api_key, config.serp.clone())
            .context("Failed to create SerpAPI client")?,
        config.queries_per_second,
    );

    let pipeline_config = PipelineConfig::new().with_currency(config.currency.clone());

    let pipeline = match &config.supabase {
        Some(credentials) => {
            let mut supabase = SupabaseStore::new(credentials.clone());
            if let Some(user_id) = &config.posted_by {
                supabase = supabase.with_posted_by(user_id.clone());
            }
            let supabase = Arc::new(supabase);
            let store: Arc<dyn ApprovalStore> = supabase.clone();
            let alerts: Arc<dyn AlertSource> = supabase.clone();
            let keywords: Arc<dyn KeywordSource> = supabase;
            DealPipeline::new(provider, store, pipeline_config)
                .with_alert_source(alerts)
                .with_keyword_source(keywords)
        }
        None if cli.dry_run && cli.keyword.is_some() => {
            tracing::info!("Supabase not configured, using in-memory store for dry run");
            let store: Arc<dyn ApprovalStore> = Arc::new(MemoryApprovalStore::new());
            DealPipeline::new(provider, store, pipeline_config)
        }
        None => bail!(
            "SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY (or SUPABASE_ANON_KEY) must be set \
             unless running --dry-run with --keyword"
        ),
    };

    let request = cli.request(config.min_discount);
    let output = pipeline.run(&request).await.context("Deal run failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize output")?
        );
    } else {
        print_report(&output);
    }

    Ok(())
}

fn print_report(output: &PipelineOutput) {
    let summary = &output.summary;

    println!();
    if summary.dry_run {
        println!("{}", "Dry run: nothing was staged".bright_yellow().bold());
    }
    println!(
        "{} {}",
        "Keywords:".bold(),
        summary.keywords.join(", ")
    );
    println!(
        "{} {} planned, {} succeeded, {} failed, {} skipped",
        "Queries:".bold(),
        summary.queries_planned,
        summary.queries_succeeded,
        summary.queries_failed,
        summary.queries_skipped
    );
    println!(
        "{} {} received, {} normalized, {} with discount, {} dropped",
        "Products:".bold(),
        summary.records_received,
        summary.deals_normalized,
        summary.deals_with_discount,
        summary.dropped()
    );

    println!();
    if output.deals.is_empty() {
        println!("{}", "No deals matched".bright_yellow());
    }
    for (index, deal) in output.deals.iter().enumerate() {
        print_deal(index + 1, deal);
    }

    if !summary.dry_run {
        println!();
        println!(
            "{} {} staged, {} already staged, {} failed",
            "Approval:".bold(),
            summary.staged.to_string().bright_green(),
            summary.already_staged,
            summary.staging_failures.len()
        );
    }

    let errors = summary.errors();
    if !errors.is_empty() {
        println!();
        println!("{}", "Errors:".bright_red().bold());
        for error in errors {
            println!("  {}", error.red());
        }
    }
}

fn print_deal(rank: usize, deal: &Deal) {
    let discount = format!("-{}%", deal.discount_percent);
    let was = match deal.original_price {
        Some(original) if original > deal.current_price => {
            format!(" (was {:.2})", original).dimmed().to_string()
        }
        _ => String::new(),
    };

    println!(
        "{:>3}. {:>5}  {}",
        rank,
        discount.bright_green().bold(),
        deal.title.bold()
    );
    println!(
        "       {:.2} {}{}  {}",
        deal.current_price,
        deal.currency,
        was,
        deal.source.bright_blue()
    );
    if let Some(link) = &deal.link {
        println!("       {}", link.dimmed());
    }
}
