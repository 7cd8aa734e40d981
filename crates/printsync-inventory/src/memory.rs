// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory inventory.
//
// Backs `--dry-run` and the sync tests. Search mimics the server's free-text
// search (case-insensitive substring over name and serial); creates can be
// made to fail per resource and name.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use printsync_core::error::{PrintsyncError, Result};

use crate::client::InventoryApi;
use crate::models::{Resource, Row};

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    /// Stored entity bodies by resource, then id.
    tables: BTreeMap<Resource, BTreeMap<u64, Map<String, Value>>>,
    /// (resource, lower-cased name) pairs whose creation is refused.
    refuse: HashSet<(Resource, String)>,
    creates: usize,
    updates: usize,
}

/// `InventoryApi` held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    state: Mutex<State>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an entity directly, bypassing create counters and refusals.
    pub fn seed(&self, resource: Resource, body: Value) -> u64 {
        let mut state = self.state();
        insert(&mut state, resource, body)
    }

    /// Refuse future creates of `resource` named `name` (case-insensitive).
    pub fn refuse_create(&self, resource: Resource, name: &str) {
        self.state().refuse.insert((resource, name.to_lowercase()));
    }

    /// All rows of one resource, in id order.
    pub fn rows(&self, resource: Resource) -> Vec<Row> {
        self.state()
            .tables
            .get(&resource)
            .map(|table| table.iter().map(|(id, body)| to_row(*id, body)).collect())
            .unwrap_or_default()
    }

    /// Full stored body of one entity.
    pub fn get(&self, resource: Resource, id: u64) -> Option<Value> {
        self.state()
            .tables
            .get(&resource)?
            .get(&id)
            .map(|body| Value::Object(body.clone()))
    }

    pub fn create_count(&self) -> usize {
        self.state().creates
    }

    pub fn update_count(&self) -> usize {
        self.state().updates
    }
}

#[async_trait]
impl InventoryApi for MemoryInventory {
    async fn search(
        &self,
        resource: Resource,
        search: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Row>> {
        let needle = search.map(str::to_lowercase);
        let rows: Vec<Row> = self
            .rows(resource)
            .into_iter()
            .filter(|row| match &needle {
                None => true,
                Some(needle) => [row.name.as_deref(), row.serial.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(needle.as_str())),
            })
            .take(limit as usize)
            .collect();
        debug!(resource = %resource, search = search.unwrap_or(""), hits = rows.len(), "memory search");
        Ok(rows)
    }

    async fn create(&self, resource: Resource, body: &Value) -> Result<u64> {
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        let mut state = self.state();
        if state.refuse.contains(&(resource, name)) {
            return Err(PrintsyncError::InventoryRejected {
                method: "POST".into(),
                url: format!("memory://{}", resource.path()),
                messages: format!("{} creation refused", resource.kind()),
            });
        }
        state.creates += 1;
        let id = insert(&mut state, resource, body.clone());
        info!(resource = %resource, id, "created in memory");
        Ok(id)
    }

    async fn update(&self, resource: Resource, id: u64, body: &Value) -> Result<()> {
        let mut state = self.state();
        let Some(stored) = state.tables.get_mut(&resource).and_then(|t| t.get_mut(&id)) else {
            return Err(PrintsyncError::InventoryStatus {
                method: "PATCH".into(),
                url: format!("memory://{}/{id}", resource.path()),
                status: 404,
                body: String::new(),
            });
        };
        if let Value::Object(fields) = body {
            for (key, value) in fields {
                stored.insert(key.clone(), value.clone());
            }
        }
        state.updates += 1;
        info!(resource = %resource, id, "updated in memory");
        Ok(())
    }
}

fn insert(state: &mut State, resource: Resource, body: Value) -> u64 {
    state.next_id += 1;
    let id = state.next_id;
    let mut fields = match body {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    fields.insert("id".into(), Value::from(id));
    state.tables.entry(resource).or_default().insert(id, fields);
    id
}

fn to_row(id: u64, body: &Map<String, Value>) -> Row {
    let text = |key: &str| body.get(key).and_then(Value::as_str).map(String::from);
    Row {
        id,
        name: text("name"),
        serial: text("serial"),
        status_type: text("type").or_else(|| text("status_type")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let inventory = MemoryInventory::new();
        inventory.seed(Resource::Manufacturers, json!({"name": "Hewlett HP"}));
        inventory.seed(Resource::Manufacturers, json!({"name": "Canon"}));

        let hits = inventory
            .search(Resource::Manufacturers, Some("hp"), 500)
            .await
            .expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), "Hewlett HP");

        let all = inventory
            .search(Resource::Manufacturers, None, 1)
            .await
            .expect("search");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn search_matches_serial() {
        let inventory = MemoryInventory::new();
        inventory.seed(Resource::Hardware, json!({"name": "Front", "serial": "CNB123"}));
        let hits = inventory
            .search(Resource::Hardware, Some("cnb123"), 500)
            .await
            .expect("search");
        assert_eq!(hits[0].serial.as_deref(), Some("CNB123"));
    }

    #[tokio::test]
    async fn create_update_and_refusal() {
        let inventory = MemoryInventory::new();
        inventory.refuse_create(Resource::Models, "Bad Model");

        let id = inventory
            .create(Resource::Hardware, &json!({"name": "P1", "notes": "old"}))
            .await
            .expect("create");
        inventory
            .update(Resource::Hardware, id, &json!({"notes": "new"}))
            .await
            .expect("update");
        let stored = inventory.get(Resource::Hardware, id).expect("stored");
        assert_eq!(stored["notes"], "new");
        assert_eq!(stored["name"], "P1");

        let err = inventory
            .create(Resource::Models, &json!({"name": "bad model"}))
            .await
            .expect_err("refused");
        assert!(matches!(err, PrintsyncError::InventoryRejected { .. }));
        assert_eq!(inventory.create_count(), 1);
        assert_eq!(inventory.update_count(), 1);
    }

    #[tokio::test]
    async fn update_of_missing_id_is_404() {
        let inventory = MemoryInventory::new();
        let err = inventory
            .update(Resource::Hardware, 99, &json!({}))
            .await
            .expect_err("missing");
        assert!(matches!(err, PrintsyncError::InventoryStatus { status: 404, .. }));
    }

    #[test]
    fn status_type_read_from_either_key() {
        let inventory = MemoryInventory::new();
        inventory.seed(Resource::StatusLabels, json!({"name": "Ready", "type": "deployable"}));
        inventory.seed(Resource::StatusLabels, json!({"name": "Pending", "status_type": "pending"}));
        let rows = inventory.rows(Resource::StatusLabels);
        assert_eq!(rows[0].status_type.as_deref(), Some("deployable"));
        assert_eq!(rows[1].status_type.as_deref(), Some("pending"));
    }
}
