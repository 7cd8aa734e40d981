// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer probe: one SNMP query sequence against one address.
//
// Query order:
//   1. sysDescr. No answer, or a description without a printer keyword,
//      ends the probe with no result.
//   2. hrDeviceDescr name, prtMarker serial, lifetime page counter.
//   3. Marker supplies at the four fixed slots (black, cyan, magenta,
//      yellow). If none answers, walk the supplies description, level and
//      capacity tables and correlate them by row index.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use printsync_core::classify::{FIXED_SUPPLY_SLOTS, identify_color, is_printer_description};
use printsync_core::types::{ConsumableLevel, DeviceRecord};

use crate::snmp::{SnmpTransport, SnmpValue};

pub const OID_SYS_DESCR: &[u64] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];
pub const OID_DEVICE_NAME: &[u64] = &[1, 3, 6, 1, 2, 1, 25, 3, 2, 1, 3, 1];
pub const OID_SERIAL: &[u64] = &[1, 3, 6, 1, 2, 1, 43, 5, 1, 1, 17, 1];
pub const OID_PAGE_COUNT: &[u64] = &[1, 3, 6, 1, 2, 1, 43, 10, 2, 1, 4, 1, 1];

/// prtMarkerSuppliesDescription, marker table 1.
pub const OID_SUPPLY_NAME: &[u64] = &[1, 3, 6, 1, 2, 1, 43, 11, 1, 1, 6, 1];
/// prtMarkerSuppliesMaxCapacity, marker table 1.
pub const OID_SUPPLY_MAX: &[u64] = &[1, 3, 6, 1, 2, 1, 43, 11, 1, 1, 8, 1];
/// prtMarkerSuppliesLevel, marker table 1.
pub const OID_SUPPLY_LEVEL: &[u64] = &[1, 3, 6, 1, 2, 1, 43, 11, 1, 1, 9, 1];

/// Capacity assumed when a supply reports a level but no maximum.
pub const DEFAULT_SUPPLY_MAX: i64 = 100;

/// Row cap for each supplies-table walk.
pub const SUPPLY_WALK_ROWS: usize = 20;

/// Probes addresses through a shared transport.
pub struct DeviceProber<T: SnmpTransport> {
    transport: Arc<T>,
}

impl<T: SnmpTransport> Clone for DeviceProber<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: SnmpTransport> DeviceProber<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Probe one address. Every failure, including a non-printer answer,
    /// yields `None`.
    #[instrument(skip(self))]
    pub async fn probe(&self, ip: Ipv4Addr) -> Option<DeviceRecord> {
        let description = self
            .text(ip, OID_SYS_DESCR)
            .await
            .filter(|d| !d.is_empty())?;

        if !is_printer_description(&description) {
            debug!(%ip, description = %description, "not a printer");
            return None;
        }

        let mut device = DeviceRecord::new(ip, description);
        device.name = self.text(ip, OID_DEVICE_NAME).await.filter(|n| !n.is_empty());
        device.serial = self.text(ip, OID_SERIAL).await.filter(|s| !s.is_empty());
        device.page_count = self
            .value(ip, OID_PAGE_COUNT)
            .await
            .and_then(|v| v.as_i64())
            .and_then(|n| u64::try_from(n).ok());
        device.consumables = self.consumables(ip).await;

        info!(
            %ip,
            name = device.name.as_deref().unwrap_or("-"),
            serial = device.serial.as_deref().unwrap_or("-"),
            supplies = device.consumables.len(),
            "printer found"
        );
        Some(device)
    }

    async fn consumables(&self, ip: Ipv4Addr) -> BTreeMap<String, ConsumableLevel> {
        let fixed = self.fixed_slot_levels(ip).await;
        if !fixed.is_empty() {
            return fixed;
        }
        debug!(%ip, "no fixed supply slots answered, walking supplies table");
        self.walked_levels(ip).await
    }

    async fn fixed_slot_levels(&self, ip: Ipv4Addr) -> BTreeMap<String, ConsumableLevel> {
        let mut levels = BTreeMap::new();
        for &(slot, color) in FIXED_SUPPLY_SLOTS {
            let slot = u64::from(slot);
            let Some(current) = self
                .value(ip, &with_index(OID_SUPPLY_LEVEL, slot))
                .await
                .and_then(|v| v.as_i64())
            else {
                continue;
            };
            let max = self
                .value(ip, &with_index(OID_SUPPLY_MAX, slot))
                .await
                .and_then(|v| v.as_i64())
                .unwrap_or(DEFAULT_SUPPLY_MAX);
            levels.insert(color.to_string(), ConsumableLevel::new(current, max));
        }
        levels
    }

    async fn walked_levels(&self, ip: Ipv4Addr) -> BTreeMap<String, ConsumableLevel> {
        let names = self.walk_by_index(ip, OID_SUPPLY_NAME).await;
        if names.is_empty() {
            return BTreeMap::new();
        }
        let levels = self.walk_by_index(ip, OID_SUPPLY_LEVEL).await;
        let maxima = self.walk_by_index(ip, OID_SUPPLY_MAX).await;

        let mut consumables = BTreeMap::new();
        for (index, name) in &names {
            let Some(current) = levels.get(index).and_then(SnmpValue::as_i64) else {
                continue;
            };
            let max = maxima
                .get(index)
                .and_then(SnmpValue::as_i64)
                .unwrap_or(DEFAULT_SUPPLY_MAX);
            let name = name.to_string();
            consumables.insert(
                identify_color(&name),
                ConsumableLevel::new(current, max).with_reported_name(name),
            );
        }
        consumables
    }

    /// Walk a table and key its rows by the final OID component. Iterating
    /// the result in index order means the highest row wins when two rows
    /// map to the same color.
    async fn walk_by_index(&self, ip: Ipv4Addr, base: &[u64]) -> BTreeMap<u64, SnmpValue> {
        match self.transport.walk(ip, base, SUPPLY_WALK_ROWS).await {
            Ok(rows) => rows
                .into_iter()
                .filter_map(|(oid, value)| oid.last().map(|&index| (index, value)))
                .collect(),
            Err(e) => {
                debug!(%ip, error = %e, "supplies walk failed");
                BTreeMap::new()
            }
        }
    }

    async fn value(&self, ip: Ipv4Addr, oid: &[u64]) -> Option<SnmpValue> {
        match self.transport.get(ip, oid).await {
            Ok(value) => value,
            Err(e) => {
                debug!(%ip, error = %e, "SNMP get failed");
                None
            }
        }
    }

    async fn text(&self, ip: Ipv4Addr, oid: &[u64]) -> Option<String> {
        self.value(ip, oid).await.map(|v| v.to_string().trim().to_string())
    }
}

/// `base` with a table row index appended.
pub fn with_index(base: &[u64], index: u64) -> Vec<u64> {
    let mut oid = base.to_vec();
    oid.push(index);
    oid
}
