//! Billflow pipeline runner.
//!
//! Entry point for the scheduler and for operators. Each subcommand runs one
//! pipeline stage (or all of them) against the configured database, ERP
//! bridge, storage and notification gateway.

use std::sync::Arc;

use anyhow::Context;
use billflow_core::dispatch::Gateway;
use billflow_core::erp::HttpErpSource;
use billflow_core::pipeline::{Collaborators, Pipeline};
use billflow_core::storage::StorageService;
use billflow_db::{BillRecordRepository, CheckpointRepository, ProfileRepository, connect};
use billflow_shared::AppConfig;
use billflow_shared::types::BillRecordId;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

type BillflowPipeline =
    Pipeline<HttpErpSource, BillRecordRepository, CheckpointRepository, ProfileRepository, Gateway>;

#[derive(Debug, Parser)]
#[command(name = "billflow", version, about = "Billing statement pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// Enroll eligible ERP customers for this billing cycle.
    Enroll,
    /// Render statements for every pending record.
    Render,
    /// Render or re-render a single record.
    RenderRecord {
        /// Bill record id.
        id: BillRecordId,
    },
    /// Dispatch statements due today.
    Dispatch {
        /// Dispatch the records due on this day of month instead.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        day: Option<u32>,
    },
    /// Dispatch a single record, bypassing the same-day guard.
    DispatchRecord {
        /// Bill record id.
        id: BillRecordId,
    },
    /// Enroll, render and dispatch in order.
    RunAll,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "billflow=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn build_pipeline(config: &AppConfig) -> anyhow::Result<BillflowPipeline> {
    let db = connect(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    let storage = StorageService::from_provider(&config.storage.provider)?;
    let gateway = Gateway::from_config(&config.gateway, storage.clone())?;
    info!(
        storage = storage.provider_name(),
        gateway = gateway.kind(),
        "Collaborators configured"
    );

    let parts = Collaborators {
        erp: Arc::new(HttpErpSource::new(&config.erp)?),
        records: Arc::new(BillRecordRepository::new(db.clone())),
        checkpoints: Arc::new(CheckpointRepository::new(db.clone())),
        profiles: Arc::new(ProfileRepository::new(db)),
        gateway: Arc::new(gateway),
        storage,
    };
    Ok(Pipeline::new(config, parts)?)
}

fn print_report<T: Serialize>(report: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

async fn run_all(pipeline: &BillflowPipeline) -> anyhow::Result<()> {
    let mut failed = Vec::new();

    match pipeline.run_enrollment().await {
        Ok(report) => print_report(&report)?,
        Err(e) => {
            error!(stage = "enroll", code = e.error_code(), error = %e, "stage failed");
            failed.push("enroll");
        }
    }
    match pipeline.run_rendering().await {
        Ok(report) => print_report(&report)?,
        Err(e) => {
            error!(stage = "render", code = e.error_code(), error = %e, "stage failed");
            failed.push("render");
        }
    }
    match pipeline.run_dispatch(None).await {
        Ok(report) => print_report(&report)?,
        Err(e) => {
            error!(stage = "dispatch", code = e.error_code(), error = %e, "stage failed");
            failed.push("dispatch");
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("stages failed: {}", failed.join(", "))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    let pipeline = build_pipeline(&config).await?;

    match cli.command {
        Command::Enroll => print_report(&pipeline.run_enrollment().await?)?,
        Command::Render => print_report(&pipeline.run_rendering().await?)?,
        Command::RenderRecord { id } => {
            let artifacts = pipeline.render_record(id).await?;
            info!(
                record_id = %id,
                html = %artifacts.html.key(),
                excel = %artifacts.excel.key(),
                "record rendered"
            );
        }
        Command::Dispatch { day } => print_report(&pipeline.run_dispatch(day).await?)?,
        Command::DispatchRecord { id } => {
            let outcome = pipeline.run_dispatch_for_record(id).await?;
            info!(record_id = %id, ?outcome, "manual dispatch finished");
        }
        Command::RunAll => run_all(&pipeline).await?,
    }

    Ok(())
}
