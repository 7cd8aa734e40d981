// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printsync Inventory: the asset-inventory REST API behind one trait, an
// HTTP implementation, an in-memory implementation, and get-or-create
// resolution of manufacturers, models, categories and status labels.

pub mod client;
pub mod memory;
pub mod models;
pub mod resolver;

pub use client::{HttpInventory, InventoryApi};
pub use memory::MemoryInventory;
pub use models::{Resource, Row};
pub use resolver::TaxonomyResolver;
