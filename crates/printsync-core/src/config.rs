// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration and the plain-text config files (auth file, target list).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PrintsyncError, Result};

/// Settings for one scan-and-sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Inventory API base URL, e.g. `http://snipeit.local/api/v1`.
    pub inventory_url: Option<String>,
    /// Bearer token for the inventory API.
    pub inventory_token: Option<String>,
    /// SNMP community string.
    pub community: String,
    /// Maximum number of probes in flight.
    pub concurrency: usize,
    /// Per-query SNMP timeout in seconds.
    pub snmp_timeout_secs: u64,
    /// Extra attempts after a timed-out SNMP query.
    pub snmp_retries: u32,
    /// Page size for inventory searches.
    pub search_limit: u32,
    /// Skip TLS certificate verification for the inventory API.
    pub accept_invalid_certs: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            inventory_url: None,
            inventory_token: None,
            community: "public".into(),
            concurrency: 50,
            snmp_timeout_secs: 2,
            snmp_retries: 1,
            search_limit: 500,
            accept_invalid_certs: false,
        }
    }
}

impl SyncConfig {
    pub fn snmp_timeout(&self) -> Duration {
        Duration::from_secs(self.snmp_timeout_secs)
    }

    /// Fill unset credentials from an auth file. Values already present win.
    ///
    /// The community is not merged here: `community` always holds a value,
    /// so only the caller knows whether it was given explicitly.
    pub fn merge_auth(&mut self, auth: &AuthFile) {
        if self.inventory_url.is_none() {
            self.inventory_url = auth.url.clone();
        }
        if self.inventory_token.is_none() {
            self.inventory_token = auth.token.clone();
        }
    }

    /// Check that the inventory credentials are present and return them.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let url = self
            .inventory_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| PrintsyncError::Config("missing inventory URL".into()))?;
        let token = self
            .inventory_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PrintsyncError::Config("missing inventory token".into()))?;

        if !url.contains("/api/v1") {
            warn!(url, "inventory URL should include the /api/v1 path");
        }
        Ok((url, token))
    }

    /// Reject values the scanner cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(PrintsyncError::Config("concurrency must be at least 1".into()));
        }
        if self.snmp_timeout_secs == 0 {
            return Err(PrintsyncError::Config("SNMP timeout must be at least 1s".into()));
        }
        if self.search_limit == 0 {
            return Err(PrintsyncError::Config("search limit must be at least 1".into()));
        }
        Ok(())
    }
}

/// Contents of a `key=value` auth file.
///
/// ```text
/// url=http://192.168.0.126:8000/api/v1
/// token=YOUR_TOKEN_HERE
/// community=public
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFile {
    pub url: Option<String>,
    pub token: Option<String>,
    pub community: Option<String>,
}

impl AuthFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PrintsyncError::Config(format!("cannot read auth file {}: {e}", path.display()))
        })?;
        let auth = Self::parse(&text);
        info!(path = %path.display(), "loaded auth file");
        Ok(auth)
    }

    pub fn parse(text: &str) -> Self {
        let mut auth = Self::default();
        for line in meaningful_lines(text) {
            let Some((key, value)) = line.split_once('=') else {
                warn!(line, "ignoring auth file line without '='");
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            match key.as_str() {
                "url" => auth.url = Some(value),
                "token" => auth.token = Some(value),
                "community" => auth.community = Some(value),
                other => debug!(key = other, "ignoring unknown auth file key"),
            }
        }
        auth
    }
}

/// Read scan targets from a file: one IP, range, or CIDR per line.
pub fn load_target_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        PrintsyncError::Config(format!("cannot read target file {}: {e}", path.display()))
    })?;
    let targets = parse_target_list(&text);
    info!(path = %path.display(), count = targets.len(), "loaded scan targets");
    Ok(targets)
}

pub fn parse_target_list(text: &str) -> Vec<String> {
    meaningful_lines(text).map(String::from).collect()
}

/// Trimmed lines that are neither blank nor `#` comments.
fn meaningful_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}
