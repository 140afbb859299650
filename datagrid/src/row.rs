//! Row data: cell values, the row trait, and a dynamic record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A dynamic cell value.
///
/// Deserializes from plain JSON scalars, so rows fetched from a REST endpoint
/// can be fed to the grid without a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integral number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text value.
    String(String),
}

impl CellValue {
    /// Returns true for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the value, used by summary aggregation.
    ///
    /// Text that parses as a number counts; everything else does not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(n) => Some(*n),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            CellValue::Null | CellValue::Bool(_) => None,
        }
    }

    /// Parse user input into a value shaped like `like`.
    ///
    /// Keyboard input is always text; a numeric or boolean cell keeps its type
    /// when the input parses, and falls back to text otherwise.
    pub fn parse_input(input: &str, like: &CellValue) -> CellValue {
        match like {
            CellValue::Int(_) => input
                .trim()
                .parse::<i64>()
                .map(CellValue::Int)
                .unwrap_or_else(|_| CellValue::String(input.to_string())),
            CellValue::Float(_) => input
                .trim()
                .parse::<f64>()
                .map(CellValue::Float)
                .unwrap_or_else(|_| CellValue::String(input.to_string())),
            CellValue::Bool(_) => match input.trim() {
                "true" => CellValue::Bool(true),
                "false" => CellValue::Bool(false),
                _ => CellValue::String(input.to_string()),
            },
            CellValue::Null | CellValue::String(_) => CellValue::String(input.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(n) => write!(f, "{}", n),
            CellValue::Float(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
            },
            serde_json::Value::String(s) => CellValue::String(s),
            other => CellValue::String(other.to_string()),
        }
    }
}

/// Trait for rows that can be displayed and edited in a grid.
///
/// Rows are owned by the hosting page. The grid only writes to a row through
/// [`GridRow::set_cell`] while an optimistic edit is pending.
///
/// # Example
///
/// ```
/// use datagrid::{CellValue, GridRow};
///
/// #[derive(Clone)]
/// struct Part {
///     id: Option<u32>,
///     code: String,
/// }
///
/// impl GridRow for Part {
///     fn row_id(&self) -> Option<String> {
///         self.id.map(|id| id.to_string())
///     }
///
///     fn cell(&self, column_id: &str) -> CellValue {
///         match column_id {
///             "code" => CellValue::from(self.code.as_str()),
///             _ => CellValue::Null,
///         }
///     }
///
///     fn set_cell(&mut self, column_id: &str, value: CellValue) {
///         if column_id == "code" {
///             self.code = value.to_string();
///         }
///     }
/// }
/// ```
pub trait GridRow: Clone + Send + Sync + 'static {
    /// Stable business identifier (e.g. primary key), if the row has one.
    fn row_id(&self) -> Option<String>;

    /// Current value of the cell for the given column.
    fn cell(&self, column_id: &str) -> CellValue;

    /// Overwrite the cell for the given column.
    fn set_cell(&mut self, column_id: &str, value: CellValue);
}

/// Field holding a record's business identifier.
pub const RECORD_ID_FIELD: &str = "id";

/// A dynamic row backed by a field map.
///
/// The row identifier is read from the `id` field.
///
/// # Example
///
/// ```
/// use datagrid::{GridRow, Record};
///
/// let record = Record::new().set("id", 7).set("code", "X1");
/// assert_eq!(record.row_id().as_deref(), Some("7"));
/// assert_eq!(record.cell("code").to_string(), "X1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, CellValue>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, builder style.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    /// Sets a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Iterates over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.fields.iter()
    }
}

impl GridRow for Record {
    fn row_id(&self) -> Option<String> {
        match self.fields.get(RECORD_ID_FIELD)? {
            CellValue::Null => None,
            CellValue::String(s) if s.is_empty() => None,
            value => Some(value.to_string()),
        }
    }

    fn cell(&self, column_id: &str) -> CellValue {
        self.fields.get(column_id).cloned().unwrap_or_default()
    }

    fn set_cell(&mut self, column_id: &str, value: CellValue) {
        self.fields.insert(column_id.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_record() {
        let json = r#"{"id": 7, "code": "X1", "qty": 2.5, "active": true, "note": null}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.get("id"), Some(&CellValue::Int(7)));
        assert_eq!(record.get("qty"), Some(&CellValue::Float(2.5)));
        assert_eq!(record.get("active"), Some(&CellValue::Bool(true)));
        assert_eq!(record.get("note"), Some(&CellValue::Null));
        assert_eq!(record.row_id().as_deref(), Some("7"));
    }

    #[test]
    fn test_row_id_missing_or_empty() {
        assert_eq!(Record::new().set("code", "X1").row_id(), None);
        assert_eq!(Record::new().set("id", CellValue::Null).row_id(), None);
        assert_eq!(Record::new().set("id", "").row_id(), None);
        assert_eq!(Record::new().set("id", "A-1").row_id().as_deref(), Some("A-1"));
    }

    #[test]
    fn test_missing_cell_is_null() {
        let record = Record::new().set("id", 1);
        assert!(record.cell("name").is_null());
    }

    #[test]
    fn test_parse_input_keeps_type() {
        assert_eq!(
            CellValue::parse_input("42", &CellValue::Int(1)),
            CellValue::Int(42)
        );
        assert_eq!(
            CellValue::parse_input("4.5", &CellValue::Float(1.0)),
            CellValue::Float(4.5)
        );
        assert_eq!(
            CellValue::parse_input("abc", &CellValue::Int(1)),
            CellValue::String("abc".into())
        );
        assert_eq!(
            CellValue::parse_input("false", &CellValue::Bool(true)),
            CellValue::Bool(false)
        );
        assert_eq!(
            CellValue::parse_input("7", &CellValue::Null),
            CellValue::String("7".into())
        );
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(CellValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::from(" 1.5 ").as_f64(), Some(1.5));
        assert_eq!(CellValue::from("n/a").as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(CellValue::from(serde_json::json!(3)), CellValue::Int(3));
        assert_eq!(CellValue::from(serde_json::json!(0.5)), CellValue::Float(0.5));
        assert_eq!(CellValue::from(serde_json::json!("a")), CellValue::from("a"));
        assert_eq!(
            CellValue::from(serde_json::json!([1, 2])),
            CellValue::String("[1,2]".into())
        );
    }
}
