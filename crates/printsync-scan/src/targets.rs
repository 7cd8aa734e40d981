// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan target parsing and expansion.
//
// A target is one of:
//   * a single IPv4 address        `192.168.1.5`
//   * a last-octet range           `192.168.1.1-254`
//   * a CIDR block                 `192.168.1.0/24`
//
// Expansion never fails as a whole: a malformed target is logged and
// contributes no addresses.

use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use tracing::{debug, error, info, warn};

use printsync_core::error::PrintsyncError;

/// One parsed scan target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    Host(Ipv4Addr),
    /// `base` through `base` with its last octet replaced by `end_octet`.
    Range { base: Ipv4Addr, end_octet: u8 },
    Cidr(Ipv4Net),
}

impl FromStr for ScanTarget {
    type Err = PrintsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('/') {
            parse_cidr(s)
        } else if s.contains('-') {
            parse_range(s)
        } else {
            s.parse::<Ipv4Addr>()
                .map(ScanTarget::Host)
                .map_err(|e| invalid(s, format!("not an IPv4 address: {e}")))
        }
    }
}

impl ScanTarget {
    /// All addresses this target covers, in ascending order.
    pub fn addresses(&self) -> Vec<Ipv4Addr> {
        match *self {
            ScanTarget::Host(ip) => vec![ip],
            ScanTarget::Range { base, end_octet } => {
                let [a, b, c, start] = base.octets();
                (start..=end_octet)
                    .map(|d| Ipv4Addr::new(a, b, c, d))
                    .collect()
            }
            ScanTarget::Cidr(net) => net.hosts().collect(),
        }
    }
}

/// Expand every target into a flat address list.
///
/// Overlapping targets yield duplicate addresses; the upsert downstream is
/// idempotent so they are not removed here.
pub fn expand_targets<S: AsRef<str>>(targets: &[S]) -> Vec<Ipv4Addr> {
    let mut addresses = Vec::new();
    for raw in targets {
        let raw = raw.as_ref();
        match raw.parse::<ScanTarget>() {
            Ok(target) => {
                let expanded = target.addresses();
                if expanded.is_empty() {
                    warn!(target = raw, "scan target covers no addresses");
                }
                debug!(target = raw, count = expanded.len(), "expanded scan target");
                addresses.extend(expanded);
            }
            Err(e) => error!(error = %e, "skipping scan target"),
        }
    }
    info!(count = addresses.len(), "addresses to scan");
    addresses
}

fn parse_cidr(s: &str) -> Result<ScanTarget, PrintsyncError> {
    s.parse::<Ipv4Net>()
        .map(ScanTarget::Cidr)
        .map_err(|e| invalid(s, format!("bad CIDR block: {e}")))
}

fn parse_range(s: &str) -> Result<ScanTarget, PrintsyncError> {
    let Some((base, end)) = s.split_once('-') else {
        return Err(invalid(s, "expected <address>-<end octet>"));
    };
    let base = base
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|e| invalid(s, format!("bad range start: {e}")))?;
    let end_octet = end
        .trim()
        .parse::<u8>()
        .map_err(|e| invalid(s, format!("bad range end octet '{}': {e}", end.trim())))?;
    Ok(ScanTarget::Range { base, end_octet })
}

fn invalid(target: &str, reason: impl Into<String>) -> PrintsyncError {
    PrintsyncError::InvalidTarget {
        target: target.to_string(),
        reason: reason.into(),
    }
}
