//! Grid configuration

use serde::Deserialize;

/// Column ids that are never editable, regardless of their declaration.
///
/// Matched case-insensitively.
pub const NON_EDITABLE_COLUMNS: &[&str] = &[
    "id",
    "date",
    "created_at",
    "updated_at",
    "createdat",
    "updatedat",
    "createddate",
    "updateddate",
];

/// How a row is keyed in the selection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKey {
    /// Position of the row within the current page.
    #[default]
    RowIndex,
    /// Business identifier of the row ([`GridRow::row_id`](crate::GridRow::row_id)).
    RowId,
}

/// Width bounds applied to columns that do not declare their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefaultColumn {
    /// Width used when a column declares none.
    ///
    /// Default: 150 px
    pub size: u32,

    /// Lower width bound.
    ///
    /// Default: 100 px
    pub min_size: u32,

    /// Upper width bound.
    ///
    /// Default: 400 px
    pub max_size: u32,
}

impl Default for DefaultColumn {
    fn default() -> Self {
        Self {
            size: 150,
            min_size: 100,
            max_size: 400,
        }
    }
}

/// Options recognized by a [`DataGrid`](crate::DataGrid).
///
/// # Example
///
/// ```
/// use datagrid::GridOptions;
///
/// let options = GridOptions::default()
///     .with_single_select(true)
///     .with_editable(true)
///     .with_title("Orders");
/// assert!(options.enable_single_select);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Adding a row to the selection removes every other member.
    pub enable_single_select: bool,

    /// Cells of editable columns may be edited.
    pub use_editable: bool,

    /// A commit collaborator is attached. When false, a changed value is
    /// applied locally and the edit completes without emitting a commit.
    pub commit_edits: bool,

    /// Show the pagination footer.
    pub use_pagination: bool,

    /// Show the summary row for summarizable columns.
    pub use_summary: bool,

    /// Show the search slot in the controls area.
    pub use_search: bool,

    /// Title displayed in the controls area.
    pub title: Option<String>,

    /// How rows are keyed in the selection set.
    pub selection_key: SelectionKey,

    /// Fallback width bounds.
    pub default_column: DefaultColumn,

    /// Column ids that are never editable.
    pub non_editable_columns: Vec<String>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            enable_single_select: false,
            use_editable: false,
            commit_edits: true,
            use_pagination: false,
            use_summary: false,
            use_search: false,
            title: None,
            selection_key: SelectionKey::default(),
            default_column: DefaultColumn::default(),
            non_editable_columns: NON_EDITABLE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GridOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the single-select policy.
    pub fn with_single_select(mut self, enabled: bool) -> Self {
        self.enable_single_select = enabled;
        self
    }

    /// Enables or disables cell editing.
    pub fn with_editable(mut self, enabled: bool) -> Self {
        self.use_editable = enabled;
        self
    }

    /// Declares whether a commit collaborator is attached.
    pub fn with_commit_edits(mut self, enabled: bool) -> Self {
        self.commit_edits = enabled;
        self
    }

    /// Enables or disables the pagination footer.
    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.use_pagination = enabled;
        self
    }

    /// Enables or disables the summary row.
    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.use_summary = enabled;
        self
    }

    /// Enables or disables the search slot.
    pub fn with_search(mut self, enabled: bool) -> Self {
        self.use_search = enabled;
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets how rows are keyed in the selection set.
    pub fn with_selection_key(mut self, key: SelectionKey) -> Self {
        self.selection_key = key;
        self
    }

    /// Sets the fallback width bounds.
    pub fn with_default_column(mut self, default_column: DefaultColumn) -> Self {
        self.default_column = default_column;
        self
    }

    /// Replaces the list of never-editable column ids.
    pub fn with_non_editable_columns<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_editable_columns = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the column id is on the never-editable list.
    pub fn is_locked_column(&self, column_id: &str) -> bool {
        self.non_editable_columns
            .iter()
            .any(|id| id.eq_ignore_ascii_case(column_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GridOptions::default();
        assert!(!options.use_editable);
        assert!(options.commit_edits);
        assert_eq!(options.default_column.size, 150);
        assert_eq!(options.default_column.min_size, 100);
        assert_eq!(options.default_column.max_size, 400);
        assert_eq!(options.selection_key, SelectionKey::RowIndex);
    }

    #[test]
    fn test_locked_columns_case_insensitive() {
        let options = GridOptions::default();
        assert!(options.is_locked_column("ID"));
        assert!(options.is_locked_column("CreatedAt"));
        assert!(!options.is_locked_column("code"));

        let options = options.with_non_editable_columns(["code"]);
        assert!(options.is_locked_column("Code"));
        assert!(!options.is_locked_column("id"));
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{
            "use_editable": true,
            "selection_key": "row_id",
            "default_column": { "size": 120 }
        }"#;
        let options: GridOptions = serde_json::from_str(json).unwrap();

        assert!(options.use_editable);
        assert!(!options.use_pagination);
        assert_eq!(options.selection_key, SelectionKey::RowId);
        assert_eq!(options.default_column.size, 120);
        assert_eq!(options.default_column.min_size, 100);
        assert!(options.is_locked_column("updated_at"));
    }
}
