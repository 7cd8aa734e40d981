// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the printsync pipeline.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Level reading for one printer supply (a single toner color, drum, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumableLevel {
    /// Raw level reported by the device.
    pub current: i64,
    /// Raw maximum capacity reported by the device.
    pub max: i64,
    /// `current / max * 100` rounded to one decimal, or `current` when the
    /// device reports no usable maximum.
    pub percentage: f64,
    /// Supply description as reported by the device, when the channel was
    /// identified from the supplies table rather than a fixed slot.
    pub reported_name: Option<String>,
}

impl ConsumableLevel {
    pub fn new(current: i64, max: i64) -> Self {
        Self {
            current,
            max,
            percentage: percentage(current, max),
            reported_name: None,
        }
    }

    pub fn with_reported_name(mut self, name: impl Into<String>) -> Self {
        self.reported_name = Some(name.into());
        self
    }

    /// Three-tier health label used in the asset notes.
    pub fn status(&self) -> SupplyStatus {
        if self.percentage < 20.0 {
            SupplyStatus::Critical
        } else if self.percentage < 50.0 {
            SupplyStatus::Low
        } else {
            SupplyStatus::Ok
        }
    }
}

/// Compute a fill percentage. A non-positive maximum means the device did not
/// report a capacity, so the raw level is passed through unscaled.
pub fn percentage(current: i64, max: i64) -> f64 {
    if max > 0 {
        let pct = current as f64 / max as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    } else {
        current as f64
    }
}

/// Supply health bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyStatus {
    /// Below 20 %.
    Critical,
    /// Below 50 %.
    Low,
    Ok,
}

impl SupplyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "\u{2717} CRITICAL",
            Self::Low => "\u{26a0} LOW",
            Self::Ok => "\u{2713} OK",
        }
    }
}

/// A printer found by a successful probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub ip: Ipv4Addr,
    /// sysDescr text, used for printer classification and model fallback.
    pub description: String,
    /// Declared device name (hrDeviceDescr), if the device reports one.
    pub name: Option<String>,
    pub serial: Option<String>,
    /// Lifetime page counter.
    pub page_count: Option<u64>,
    /// Consumable channels keyed by color ("black", "cyan", ...) or by the raw
    /// supply name when no known color matched.
    pub consumables: BTreeMap<String, ConsumableLevel>,
    pub scanned_at: DateTime<Utc>,
}

impl DeviceRecord {
    pub fn new(ip: Ipv4Addr, description: impl Into<String>) -> Self {
        Self {
            ip,
            description: description.into(),
            name: None,
            serial: None,
            page_count: None,
            consumables: BTreeMap::new(),
            scanned_at: Utc::now(),
        }
    }

    /// Serial to key the asset on: the reported serial when it is non-blank,
    /// otherwise a surrogate derived from the address (`10-0-0-5`).
    pub fn effective_serial(&self) -> String {
        match self.serial.as_deref().map(str::trim) {
            Some(serial) if !serial.is_empty() => serial.to_string(),
            _ => self.ip.to_string().replace('.', "-"),
        }
    }

    /// Display name: the declared name, or `Printer-<ip>`.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Printer-{}", self.ip),
        }
    }

    /// Whether the serial is a real device serial rather than a surrogate.
    pub fn has_serial(&self) -> bool {
        self.serial
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// Lifecycle states of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    Uninitialized,
    /// Resolving the Printers category and the deployable status.
    Initializing,
    Ready,
    Scanning,
    Syncing,
    Done,
    /// Terminal failure during initialisation or scanning.
    Aborted,
}

impl SyncState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: SyncState) -> bool {
        use SyncState::*;
        matches!(
            (self, next),
            (Uninitialized, Initializing)
                | (Initializing, Ready)
                | (Initializing, Aborted)
                | (Ready, Scanning)
                | (Scanning, Syncing)
                | (Scanning, Done)
                | (Scanning, Aborted)
                | (Syncing, Done)
        )
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// How a single device upsert ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceOutcome {
    Created { asset_id: u64 },
    Updated { asset_id: u64 },
    Failed { reason: String },
}

impl DeviceOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Per-device line in the run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceReport {
    pub ip: Ipv4Addr,
    pub name: String,
    pub serial: String,
    pub outcome: DeviceOutcome,
}

/// Final counts of a sync run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub devices: Vec<DeviceReport>,
}

impl SyncSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn record(&mut self, report: DeviceReport) {
        if report.outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.devices.push(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(20, 100), 20.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
    }

    #[test]
    fn percentage_without_max_is_raw_level() {
        assert_eq!(percentage(37, 0), 37.0);
        assert_eq!(percentage(-3, -2), -3.0);
    }

    #[test]
    fn supply_status_thresholds() {
        assert_eq!(ConsumableLevel::new(19, 100).status(), SupplyStatus::Critical);
        assert_eq!(ConsumableLevel::new(20, 100).status(), SupplyStatus::Low);
        assert_eq!(ConsumableLevel::new(49, 100).status(), SupplyStatus::Low);
        assert_eq!(ConsumableLevel::new(50, 100).status(), SupplyStatus::Ok);
    }

    #[test]
    fn surrogate_serial_from_address() {
        let mut device = DeviceRecord::new(Ipv4Addr::new(10, 0, 0, 5), "HP LaserJet");
        assert_eq!(device.effective_serial(), "10-0-0-5");
        assert!(!device.has_serial());

        device.serial = Some("   ".into());
        assert_eq!(device.effective_serial(), "10-0-0-5");

        device.serial = Some(" CNB1234 ".into());
        assert_eq!(device.effective_serial(), "CNB1234");
        assert!(device.has_serial());
    }

    #[test]
    fn display_name_falls_back_to_address() {
        let mut device = DeviceRecord::new(Ipv4Addr::new(192, 168, 1, 20), "Xerox");
        assert_eq!(device.display_name(), "Printer-192.168.1.20");
        device.name = Some("Front Office".into());
        assert_eq!(device.display_name(), "Front Office");
    }

    #[test]
    fn state_machine_transitions() {
        use SyncState::*;
        assert!(Uninitialized.can_transition_to(Initializing));
        assert!(Initializing.can_transition_to(Aborted));
        assert!(Scanning.can_transition_to(Done));
        assert!(!Ready.can_transition_to(Syncing));
        assert!(!Done.can_transition_to(Scanning));
        assert!(!Syncing.can_transition_to(Aborted));
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = SyncSummary::default();
        let report = |outcome| DeviceReport {
            ip: Ipv4Addr::LOCALHOST,
            name: "p".into(),
            serial: "s".into(),
            outcome,
        };
        summary.record(report(DeviceOutcome::Created { asset_id: 1 }));
        summary.record(report(DeviceOutcome::Failed { reason: "x".into() }));
        summary.record(report(DeviceOutcome::Updated { asset_id: 2 }));
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
    }
}
