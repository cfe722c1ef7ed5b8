use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Parsed upload: the header line plus every data line, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Zero-based position among the data rows of the file.
    pub index: usize,
    pub values: HashMap<String, String>,
}

impl RawRow {
    pub fn value(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }
}

/// Destination field -> source header. Unset fields are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping(BTreeMap<String, String>);

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_key: &str) -> Option<&str> {
        self.0.get(field_key).map(String::as_str)
    }

    pub fn set(&mut self, field_key: impl Into<String>, header: impl Into<String>) {
        self.0.insert(field_key.into(), header.into());
    }

    pub fn clear(&mut self, field_key: &str) -> Option<String> {
        self.0.remove(field_key)
    }

    pub fn is_mapped(&self, field_key: &str) -> bool {
        self.0.contains_key(field_key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRow {
    /// 1-based position in the validated output.
    pub row_number: usize,
    pub row: RawRow,
    pub errors: Vec<String>,
    pub valid: bool,
}

impl ValidatedRow {
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based position among the rows submitted in the run.
    pub row_number: usize,
    /// 1-based position of the row in the uploaded file.
    pub source_row: usize,
    pub message: String,
}

/// Summary of one import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub id: Uuid,
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub errors: Vec<RowError>,
    pub file_name: String,
    pub started_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
    pub cancelled: bool,
}

impl ImportOutcome {
    /// True when every submitted row was accepted.
    pub fn is_complete(&self) -> bool {
        self.failure_count == 0
    }

    pub fn failure_summary(&self, limit: usize) -> &[RowError] {
        &self.errors[..self.errors.len().min(limit)]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl ImportProgress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };
        Self { completed, total, percent }
    }
}

/// JSON body sent to the create-order endpoint.
pub type OrderPayload = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CreateOrderResponse {
    pub fn accepted() -> Self {
        Self { success: true, message: None }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStage {
    Upload,
    Map,
    Preview,
    Importing,
    Done,
}

impl fmt::Display for WizardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStage::Upload => "upload",
            WizardStage::Map => "map",
            WizardStage::Preview => "preview",
            WizardStage::Importing => "importing",
            WizardStage::Done => "done",
        };
        f.write_str(name)
    }
}
