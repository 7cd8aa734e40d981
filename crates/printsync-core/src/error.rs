// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for printsync.

use thiserror::Error;

/// Top-level error type for all printsync operations.
#[derive(Debug, Error)]
pub enum PrintsyncError {
    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no scan targets given")]
    NoTargets,

    // -- Scanning --
    #[error("invalid scan target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("SNMP query failed: {0}")]
    Snmp(String),

    // -- Inventory API --
    #[error("inventory request failed: {method} {url}: {detail}")]
    InventoryTransport {
        method: String,
        url: String,
        detail: String,
    },

    #[error("inventory returned HTTP {status} for {method} {url}")]
    InventoryStatus {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("inventory rejected {method} {url}: {messages}")]
    InventoryRejected {
        method: String,
        url: String,
        messages: String,
    },

    #[error("unexpected inventory response: {0}")]
    InventoryDecode(String),

    // -- Sync --
    #[error("could not resolve {kind} '{name}'")]
    Resolution { kind: &'static str, name: String },

    #[error("sync aborted: {0}")]
    Aborted(String),

    // -- Plumbing --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintsyncError>;
