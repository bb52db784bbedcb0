//! xocdash CLI
//!
//! Reads the XOC protocol dashboard for one wallet, either once or on an
//! interval.

mod output;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use xocdash::config::parse_address;
use xocdash::prelude::*;
use xocdash::{DashboardSnapshot, ReadSummary};

#[derive(Parser)]
#[command(name = "xocdash", version, about = "XOC protocol dashboard reader")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read every dashboard figure once
    Refresh(RefreshArgs),
    /// Refresh on an interval and print changes
    Watch(WatchArgs),
}

#[derive(Args)]
struct Target {
    /// Config file
    #[arg(long, default_value = DashboardConfig::DEFAULT_PATH)]
    config: PathBuf,
    /// Wallet to read, overriding the config and XOCDASH_WALLET
    #[arg(long)]
    wallet: Option<String>,
}

#[derive(Args)]
struct RefreshArgs {
    #[command(flatten)]
    target: Target,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct WatchArgs {
    #[command(flatten)]
    target: Target,
    /// Seconds between refreshes
    #[arg(long, default_value_t = 15)]
    interval: u64,
}

#[derive(Serialize)]
struct RefreshOutput {
    slots: DashboardSnapshot,
    reads: Vec<ReadSummary>,
    elapsed_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().command {
        Command::Refresh(args) => refresh(args).await,
        Command::Watch(args) => watch(args).await,
    }
}

fn open(target: &Target) -> Result<DashboardReader> {
    let mut config = DashboardConfig::load(&target.config)
        .with_context(|| format!("loading {}", target.config.display()))?;
    config.apply_env()?;
    if let Some(wallet) = &target.wallet {
        config.wallet_address = Some(parse_address(wallet)?);
    }
    config.validate()?;

    let sessions = SessionStore::new();
    sessions.connect(config.session().context("no wallet to read; pass --wallet or set XOCDASH_WALLET")?);
    Ok(config.reader(sessions)?)
}

async fn refresh(args: RefreshArgs) -> Result<()> {
    let reader = open(&args.target)?;
    let report = reader.refresh().await?;

    if args.json {
        let out = RefreshOutput {
            slots: reader.slots().snapshot(),
            reads: report.summary(),
            elapsed_ms: report.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        output::print_snapshot(&reader.slots().snapshot());
        output::print_report(&report);
    }

    let failures = report.failures();
    if !failures.is_empty() {
        bail!("{} of {} reads failed", failures.len(), report.entries().len());
    }
    Ok(())
}

async fn watch(args: WatchArgs) -> Result<()> {
    let reader = open(&args.target)?;
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));
    let mut last = reader.slots().snapshot();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping");
                return Ok(());
            }
        }

        match reader.refresh().await {
            Ok(report) => {
                for (read, err) in report.failures() {
                    tracing::warn!(%read, error = %err, "read failed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "refresh failed");
                continue;
            }
        }

        let current = reader.slots().snapshot();
        for (slot, value) in current.changes_since(&last) {
            output::print_change(slot, value);
        }
        last = current;
    }
}
