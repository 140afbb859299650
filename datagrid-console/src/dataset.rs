//! Dataset files: grid options, column declarations and records.

use std::path::Path;

use serde::Deserialize;

use datagrid::{ColumnDef, GridOptions, Record};

use crate::error::ConsoleError;

fn default_page_size() -> usize {
    30
}

/// A dataset as read from a JSON file.
///
/// ```json
/// {
///   "options": { "use_editable": true, "use_pagination": true },
///   "page_size": 10,
///   "columns": [{ "id": "code", "header": "Code" }],
///   "rows": [{ "id": 1, "code": "X1" }]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub options: GridOptions,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub rows: Vec<Record>,
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self, ConsoleError> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}
