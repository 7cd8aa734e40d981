// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Taxonomy resolution: get-or-create for manufacturers, models, categories
// and the deployable status label.
//
// Names match case-insensitively and exactly, so an existing "HP" is reused
// for "hp" and never duplicated.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use printsync_core::classify::{has_deployable_keyword, is_disqualified_status};
use printsync_core::error::{PrintsyncError, Result};

use crate::client::InventoryApi;
use crate::models::{
    CategoryPayload, ManufacturerPayload, ModelPayload, Resource, Row, StatusLabelPayload,
};

/// Which rule picked the deployable status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTier {
    /// Declared type is "deployable".
    DeclaredDeployable,
    /// Name contains a ready/deploy/stock style keyword.
    Keyword,
    /// First label not ruled out by name.
    FirstUsable,
}

/// Pick the deployable status from existing labels. Labels whose name
/// contains a disqualifying term are never chosen.
pub fn select_deployable_status(labels: &[Row]) -> Option<(u64, StatusTier)> {
    let usable: Vec<&Row> = labels
        .iter()
        .filter(|row| !is_disqualified_status(row.name()))
        .collect();

    let declared = usable.iter().find(|row| {
        row.status_type
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("deployable"))
    });
    if let Some(row) = declared {
        return Some((row.id, StatusTier::DeclaredDeployable));
    }

    if let Some(row) = usable.iter().find(|row| has_deployable_keyword(row.name())) {
        return Some((row.id, StatusTier::Keyword));
    }

    usable.first().map(|row| (row.id, StatusTier::FirstUsable))
}

/// Get-or-create against one inventory.
pub struct TaxonomyResolver<A: InventoryApi + ?Sized> {
    api: Arc<A>,
    search_limit: u32,
}

impl<A: InventoryApi + ?Sized> TaxonomyResolver<A> {
    pub fn new(api: Arc<A>, search_limit: u32) -> Self {
        Self { api, search_limit }
    }

    #[instrument(skip(self))]
    pub async fn manufacturer(&self, name: &str) -> Result<u64> {
        self.get_or_create(Resource::Manufacturers, name, &ManufacturerPayload { name })
            .await
    }

    #[instrument(skip(self))]
    pub async fn category(&self, name: &str, category_type: &str) -> Result<u64> {
        self.get_or_create(
            Resource::Categories,
            name,
            &CategoryPayload {
                name,
                category_type,
            },
        )
        .await
    }

    /// An existing model is reused whatever its manufacturer or category.
    #[instrument(skip(self))]
    pub async fn model(&self, name: &str, manufacturer_id: u64, category_id: u64) -> Result<u64> {
        self.get_or_create(
            Resource::Models,
            name,
            &ModelPayload {
                name,
                manufacturer_id,
                category_id,
                fieldset_id: None,
            },
        )
        .await
    }

    /// The status label new and updated assets are put in. Falls back to
    /// creating "Ready to Deploy" when no existing label qualifies.
    #[instrument(skip(self))]
    pub async fn deployable_status(&self) -> Result<u64> {
        let labels = self
            .api
            .search(Resource::StatusLabels, None, self.search_limit)
            .await?;

        match select_deployable_status(&labels) {
            Some((id, StatusTier::FirstUsable)) => {
                warn!(id, "no deployable status label found; using first usable label");
                Ok(id)
            }
            Some((id, tier)) => {
                info!(id, ?tier, "found deployable status label");
                Ok(id)
            }
            None => {
                warn!(
                    existing = labels.len(),
                    "no usable status label, creating 'Ready to Deploy'"
                );
                let payload = StatusLabelPayload::ready_to_deploy();
                self.create(Resource::StatusLabels, payload.name, &payload)
                    .await
            }
        }
    }

    async fn get_or_create<P: Serialize + Sync>(
        &self,
        resource: Resource,
        name: &str,
        payload: &P,
    ) -> Result<u64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PrintsyncError::Resolution {
                kind: resource.kind(),
                name: String::new(),
            });
        }

        let rows = self
            .api
            .search(resource, Some(name), self.search_limit)
            .await?;
        if let Some(row) = rows.iter().find(|row| row.name_matches(name)) {
            info!(kind = resource.kind(), name, id = row.id, "found existing");
            return Ok(row.id);
        }

        info!(kind = resource.kind(), name, "creating");
        self.create(resource, name, payload).await
    }

    async fn create<P: Serialize + Sync>(
        &self,
        resource: Resource,
        name: &str,
        payload: &P,
    ) -> Result<u64> {
        let body: Value = serde_json::to_value(payload)?;
        self.api.create(resource, &body).await.map_err(|e| {
            error!(kind = resource.kind(), name, error = %e, "creation failed");
            PrintsyncError::Resolution {
                kind: resource.kind(),
                name: name.to_string(),
            }
        })
    }
}
