// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printsync: SNMP printer discovery with idempotent sync into Snipe-IT.
//
// Entry point. Parses the command line, initialises logging, builds the SNMP
// transport and the inventory client, then runs one scan-and-sync pass that
// Ctrl-C can interrupt. Blocking SNMP queries still running at that point are
// left behind rather than awaited.

mod cli;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use printsync_core::config::SyncConfig;
use printsync_core::types::{DeviceOutcome, SyncSummary};
use printsync_inventory::client::{HttpInventory, InventoryApi};
use printsync_inventory::memory::MemoryInventory;
use printsync_inventory::models::Resource;
use printsync_scan::prober::DeviceProber;
use printsync_scan::retry::RetryPolicy;
use printsync_scan::scheduler::NetworkScanner;
use printsync_scan::snmp::{Snmp2Transport, SnmpTransport};
use printsync_sync::engine::SyncEngine;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    block_on_detached(run_cli(cli))?
}

/// Drive `future` to completion on a fresh runtime, then shut the runtime
/// down without waiting for blocking tasks that are still running.
fn block_on_detached<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

async fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config()?;
    let targets = cli.targets()?;
    info!(
        targets = targets.len(),
        concurrency = config.concurrency,
        dry_run = cli.dry_run,
        "printsync starting"
    );

    let transport = Snmp2Transport::new(
        config.community.clone(),
        RetryPolicy::new(config.snmp_retries, config.snmp_timeout()),
    );
    let prober = DeviceProber::new(Arc::new(transport));
    let scanner = NetworkScanner::new(config.concurrency);

    if cli.dry_run {
        let inventory = Arc::new(MemoryInventory::new());
        let summary = run(Arc::clone(&inventory), &config, &targets, &scanner, &prober).await?;
        print_summary(&summary);
        print_dry_run_notes(&inventory, &summary);
    } else {
        let (url, token) = config.credentials()?;
        let inventory = HttpInventory::new(url, token, config.accept_invalid_certs)
            .context("building inventory client")?;
        let summary = run(Arc::new(inventory), &config, &targets, &scanner, &prober).await?;
        print_summary(&summary);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

async fn run<A: InventoryApi, T: SnmpTransport>(
    api: Arc<A>,
    config: &SyncConfig,
    targets: &[String],
    scanner: &NetworkScanner,
    prober: &DeviceProber<T>,
) -> anyhow::Result<SyncSummary> {
    let mut engine = SyncEngine::new(api, config.search_limit);
    tokio::select! {
        result = engine.run(targets, scanner, prober) => Ok(result?),
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, abandoning in-flight probes");
            bail!("interrupted")
        }
    }
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!("Sync summary");
    for device in &summary.devices {
        let outcome = match &device.outcome {
            DeviceOutcome::Created { asset_id } => format!("created asset {asset_id}"),
            DeviceOutcome::Updated { asset_id } => format!("updated asset {asset_id}"),
            DeviceOutcome::Failed { reason } => format!("FAILED: {reason}"),
        };
        println!(
            "  {:<15}  {:<32}  {:<20}  {outcome}",
            device.ip, device.name, device.serial
        );
    }
    println!("  Success: {}", summary.succeeded);
    println!("  Failed:  {}", summary.failed);
    println!("  Total:   {}", summary.total());
}

fn print_dry_run_notes(inventory: &MemoryInventory, summary: &SyncSummary) {
    for device in &summary.devices {
        let asset_id = match device.outcome {
            DeviceOutcome::Created { asset_id } | DeviceOutcome::Updated { asset_id } => asset_id,
            DeviceOutcome::Failed { .. } => continue,
        };
        let notes = inventory
            .get(Resource::Hardware, asset_id)
            .and_then(|asset| asset.get("notes").and_then(|n| n.as_str()).map(String::from))
            .unwrap_or_default();
        println!();
        println!("--- {} ({}) ---", device.name, device.serial);
        println!("{notes}");
    }
}
