// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printsync Scan: expands scan targets into addresses, probes each address
// over SNMP for printer identity and supply levels, and runs the probes under
// a concurrency ceiling.

pub mod prober;
pub mod retry;
pub mod scheduler;
pub mod snmp;
pub mod targets;

pub use prober::DeviceProber;
pub use scheduler::NetworkScanner;
pub use snmp::{Snmp2Transport, SnmpTransport, SnmpValue};
pub use targets::{ScanTarget, expand_targets};
