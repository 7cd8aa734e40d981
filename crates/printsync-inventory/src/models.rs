// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire types for the inventory REST API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// REST resources the sync touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Hardware,
    Models,
    Manufacturers,
    Categories,
    StatusLabels,
}

impl Resource {
    /// Path segment under the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Models => "models",
            Self::Manufacturers => "manufacturers",
            Self::Categories => "categories",
            Self::StatusLabels => "statuslabels",
        }
    }

    /// Singular noun for log and error messages.
    pub fn kind(self) -> &'static str {
        match self {
            Self::Hardware => "asset",
            Self::Models => "model",
            Self::Manufacturers => "manufacturer",
            Self::Categories => "category",
            Self::StatusLabels => "status label",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One row of a search page. Only the fields the sync reads are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    /// Status labels only: "deployable", "pending", "archived", ...
    #[serde(default, rename = "type", alias = "status_type")]
    pub status_type: Option<String>,
}

impl Row {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Case-insensitive exact name comparison.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.trim().to_lowercase() == name.trim().to_lowercase())
    }
}

/// `GET /<resource>` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total: Option<u64>,
    pub rows: Vec<Row>,
}

/// Body of every POST/PATCH response. Failures arrive as HTTP 200 with
/// `status: "error"`.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationResponse {
    pub status: String,
    #[serde(default)]
    pub messages: Value,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl MutationResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// `payload.id` of a created entity.
    pub fn created_id(&self) -> Option<u64> {
        self.payload.as_ref()?.get("id")?.as_u64()
    }

    /// Messages flattened to one line.
    pub fn message_text(&self) -> String {
        match &self.messages {
            Value::Null => "no message".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ManufacturerPayload<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryPayload<'a> {
    pub name: &'a str,
    pub category_type: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelPayload<'a> {
    pub name: &'a str,
    pub manufacturer_id: u64,
    pub category_id: u64,
    /// Always null; models get no custom fieldset.
    pub fieldset_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusLabelPayload<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub status_type: &'a str,
    pub color: &'a str,
    pub show_in_nav: bool,
    pub default_label: bool,
}

impl StatusLabelPayload<'static> {
    /// The status label created when the inventory has no usable one.
    pub fn ready_to_deploy() -> Self {
        Self {
            name: "Ready to Deploy",
            status_type: "deployable",
            color: "00FF00",
            show_in_nav: true,
            default_label: false,
        }
    }
}

/// Create/update body for a hardware asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetPayload {
    pub model_id: u64,
    pub status_id: u64,
    pub serial: String,
    pub name: String,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_accepts_both_status_type_spellings() {
        let a: Row = serde_json::from_value(json!({"id": 1, "name": "Ready", "type": "deployable"}))
            .expect("row");
        let b: Row =
            serde_json::from_value(json!({"id": 2, "name": "Ready", "status_type": "deployable"}))
                .expect("row");
        assert_eq!(a.status_type.as_deref(), Some("deployable"));
        assert_eq!(b.status_type.as_deref(), Some("deployable"));
    }

    #[test]
    fn row_tolerates_extra_and_null_fields() {
        let row: Row = serde_json::from_value(json!({
            "id": 7, "name": null, "serial": "ABC", "manufacturer": {"id": 3, "name": "HP"}
        }))
        .expect("row");
        assert_eq!(row.name(), "");
        assert_eq!(row.serial.as_deref(), Some("ABC"));
    }

    #[test]
    fn name_match_is_case_insensitive_and_exact() {
        let row = Row {
            id: 1,
            name: Some("HP".into()),
            ..Default::default()
        };
        assert!(row.name_matches("hp"));
        assert!(!row.name_matches("hpe"));
    }

    #[test]
    fn mutation_response_parts() {
        let ok: MutationResponse =
            serde_json::from_value(json!({"status": "success", "messages": "ok", "payload": {"id": 42}}))
                .expect("response");
        assert!(ok.is_success());
        assert_eq!(ok.created_id(), Some(42));

        let err: MutationResponse = serde_json::from_value(
            json!({"status": "error", "messages": {"name": ["The name has already been taken."]}, "payload": null}),
        )
        .expect("response");
        assert!(!err.is_success());
        assert_eq!(err.created_id(), None);
        assert!(err.message_text().contains("already been taken"));
    }

    #[test]
    fn status_label_payload_shape() {
        let body = serde_json::to_value(StatusLabelPayload::ready_to_deploy()).expect("json");
        assert_eq!(
            body,
            json!({
                "name": "Ready to Deploy",
                "type": "deployable",
                "color": "00FF00",
                "show_in_nav": true,
                "default_label": false
            })
        );
    }

    #[test]
    fn model_payload_sends_null_fieldset() {
        let body = serde_json::to_value(ModelPayload {
            name: "LaserJet M404",
            manufacturer_id: 1,
            category_id: 2,
            fieldset_id: None,
        })
        .expect("json");
        assert_eq!(body["fieldset_id"], Value::Null);
    }
}
