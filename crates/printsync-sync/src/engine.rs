// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan-and-sync engine.
//
// One run walks the states
//
//   Uninitialized -> Initializing -> Ready -> Scanning -> Syncing -> Done
//
// and ends in Aborted if the Printers category or the deployable status
// cannot be resolved, or if the targets expand to no addresses. Devices are
// synced one at a time; a device that fails is recorded and the loop goes
// on.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use printsync_core::error::{PrintsyncError, Result};
use printsync_core::types::{DeviceOutcome, DeviceRecord, DeviceReport, SyncState, SyncSummary};
use printsync_inventory::client::InventoryApi;
use printsync_inventory::models::{AssetPayload, Resource};
use printsync_inventory::resolver::TaxonomyResolver;
use printsync_scan::prober::DeviceProber;
use printsync_scan::scheduler::NetworkScanner;
use printsync_scan::snmp::SnmpTransport;
use printsync_scan::targets::expand_targets;

use crate::identity::extract_manufacturer_model;
use crate::notes::render_notes;

/// Category every printer model and asset is filed under.
pub const PRINTERS_CATEGORY: &str = "Printers";
pub const PRINTERS_CATEGORY_TYPE: &str = "asset";

/// Ids resolved once per run and handed to every upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncContext {
    pub category_id: u64,
    pub status_id: u64,
}

/// Drives one run against one inventory.
pub struct SyncEngine<A: InventoryApi + ?Sized> {
    api: Arc<A>,
    resolver: TaxonomyResolver<A>,
    search_limit: u32,
    state: SyncState,
}

impl<A: InventoryApi + ?Sized> SyncEngine<A> {
    pub fn new(api: Arc<A>, search_limit: u32) -> Self {
        Self {
            resolver: TaxonomyResolver::new(Arc::clone(&api), search_limit),
            api,
            search_limit,
            state: SyncState::Uninitialized,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    fn transition(&mut self, next: SyncState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(PrintsyncError::Aborted(format!(
                "illegal state change {} -> {next}",
                self.state
            )));
        }
        info!(from = %self.state, to = %next, "sync state");
        self.state = next;
        Ok(())
    }

    /// Resolve (or create) the Printers category and the deployable status.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self) -> Result<SyncContext> {
        self.transition(SyncState::Initializing)?;
        match self.resolve_context().await {
            Ok(context) => {
                self.transition(SyncState::Ready)?;
                info!(
                    category_id = context.category_id,
                    status_id = context.status_id,
                    "initialization complete"
                );
                Ok(context)
            }
            Err(e) => {
                error!(error = %e, "initialization failed");
                self.transition(SyncState::Aborted)?;
                Err(e)
            }
        }
    }

    async fn resolve_context(&self) -> Result<SyncContext> {
        let category_id = self
            .resolver
            .category(PRINTERS_CATEGORY, PRINTERS_CATEGORY_TYPE)
            .await?;
        let status_id = self.resolver.deployable_status().await?;
        Ok(SyncContext {
            category_id,
            status_id,
        })
    }

    /// Full run: initialize, scan `targets`, sync every printer found.
    pub async fn run<T: SnmpTransport>(
        &mut self,
        targets: &[String],
        scanner: &NetworkScanner,
        prober: &DeviceProber<T>,
    ) -> Result<SyncSummary> {
        let context = self.initialize().await?;

        self.transition(SyncState::Scanning)?;
        let addresses = expand_targets(targets);
        if addresses.is_empty() {
            error!("no valid addresses to scan");
            self.transition(SyncState::Aborted)?;
            return Err(PrintsyncError::NoTargets);
        }
        info!(count = addresses.len(), "scanning");

        let printers = scanner.scan(prober, addresses).await;
        if printers.is_empty() {
            warn!("no printers found");
            self.transition(SyncState::Done)?;
            return Ok(SyncSummary::default());
        }

        self.transition(SyncState::Syncing)?;
        let summary = self.sync_devices(&context, printers).await;
        self.transition(SyncState::Done)?;
        Ok(summary)
    }

    /// Upsert every device in order and tally the outcomes.
    pub async fn sync_devices(
        &self,
        context: &SyncContext,
        devices: Vec<DeviceRecord>,
    ) -> SyncSummary {
        info!(count = devices.len(), "syncing printers");
        let mut summary = SyncSummary::default();

        for device in devices {
            let outcome = match self.sync_device(context, &device).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(ip = %device.ip, error = %e, "printer sync failed");
                    DeviceOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            summary.record(DeviceReport {
                ip: device.ip,
                name: device.display_name(),
                serial: device.effective_serial(),
                outcome,
            });
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            total = summary.total(),
            "sync complete"
        );
        summary
    }

    /// Resolve the device's manufacturer and model, then create or update
    /// its asset keyed by serial.
    #[instrument(skip(self, context, device), fields(ip = %device.ip))]
    pub async fn sync_device(
        &self,
        context: &SyncContext,
        device: &DeviceRecord,
    ) -> Result<DeviceOutcome> {
        let name = device.display_name();
        let serial = device.effective_serial();
        if !device.has_serial() {
            warn!(serial = %serial, "printer has no serial, keying on address");
        }

        let (manufacturer, model) = extract_manufacturer_model(&device.description, &name);
        info!(
            name = %name,
            manufacturer = %manufacturer,
            model = %model,
            serial = %serial,
            "processing printer"
        );

        let manufacturer_id = self.resolver.manufacturer(&manufacturer).await?;
        let model_id = self
            .resolver
            .model(&model, manufacturer_id, context.category_id)
            .await?;

        let payload = AssetPayload {
            model_id,
            status_id: context.status_id,
            serial: serial.clone(),
            name,
            notes: render_notes(device),
        };
        let body = serde_json::to_value(&payload)?;

        match self.find_asset(&serial).await? {
            Some(asset_id) => {
                info!(asset_id, "updating existing asset");
                self.api.update(Resource::Hardware, asset_id, &body).await?;
                Ok(DeviceOutcome::Updated { asset_id })
            }
            None => {
                let asset_id = self.api.create(Resource::Hardware, &body).await?;
                info!(asset_id, "created asset");
                Ok(DeviceOutcome::Created { asset_id })
            }
        }
    }

    /// Id of the asset whose serial equals `serial`, ignoring case.
    async fn find_asset(&self, serial: &str) -> Result<Option<u64>> {
        let rows = self
            .api
            .search(Resource::Hardware, Some(serial), self.search_limit)
            .await?;
        Ok(rows
            .iter()
            .find(|row| {
                row.serial
                    .as_deref()
                    .is_some_and(|s| s.trim().eq_ignore_ascii_case(serial))
            })
            .map(|row| row.id))
    }
}
