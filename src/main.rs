//! Sora - Penguin Statistics Admin CLI
//!
//! ```text
//! sora --token <TOKEN> items [--ark-item-id <ID>]
//! sora invalidate <NAME> [--key <KEY>]
//! sora caches
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sora::config::DEFAULT_BASE_URL;
use sora::{AdminClient, CacheContext, ClientConfig, Invalidation, ItemService};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Penguin Statistics Admin CLI
#[derive(Parser, Debug)]
#[command(name = "sora", author, version, about, long_about = None)]
struct Args {
    /// Base URL of the admin API, without trailing slash
    #[arg(long, short = 'u', env = "SORA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Bearer token for authentication to the admin API
    #[arg(long, env = "SORA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch items through the cache
    Items {
        /// Print a single item instead of the item count
        #[arg(long)]
        ark_item_id: Option<String>,
    },

    /// Flush a named cache
    Invalidate {
        /// Registered cache name, e.g. `zones` or `timeRanges#server`
        name: String,

        /// Key qualifier; only key-bearing (set) caches match when given
        #[arg(long)]
        key: Option<String>,
    },

    /// List registered caches with their counters
    Caches,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let ctx = CacheContext::new();
    let caches = ctx.initialize().context("failed to initialize caches")?;

    match args.command {
        Command::Items { ref ark_item_id } => {
            let token = args
                .token
                .clone()
                .context("--token (or SORA_TOKEN) is required for `items`")?;
            let client = AdminClient::new(ClientConfig::new(args.base_url.clone(), token))
                .context("failed to create admin API client")?;
            let items = ItemService::new(Arc::new(client), caches);

            match ark_item_id {
                Some(id) => {
                    let item = items
                        .get_item_by_ark_id(id)
                        .await
                        .with_context(|| format!("failed to get item {id}"))?;
                    println!("{}", serde_json::to_string_pretty(&item)?);
                }
                None => {
                    let all = items.get_items().await.context("failed to get items")?;
                    println!("{} items", all.len());
                }
            }
        }
        Command::Invalidate { ref name, ref key } => {
            match ctx.invalidate(name, key.is_some())? {
                Invalidation::Flushed(kind) => info!("Flushed {} cache {}", kind, name),
                Invalidation::NotFound => warn!("No cache matched {}", name),
            }
        }
        Command::Caches => {
            for cache in ctx.registry().describe() {
                println!("{:<48} {:<9} {}", cache.name, cache.kind, cache.stats);
            }
        }
    }

    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
