// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printsync Core: core types, configuration, and classification rules shared
// across all crates.

pub mod classify;
pub mod config;
pub mod error;
pub mod types;

pub use config::SyncConfig;
pub use error::PrintsyncError;
pub use types::*;
