// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printsync Sync: turns probed printers into inventory assets.

pub mod engine;
pub mod identity;
pub mod notes;

pub use engine::{SyncContext, SyncEngine};
pub use identity::extract_manufacturer_model;
pub use notes::render_notes;
