//! Column sizing engine.
//!
//! Widths are pure derived state: a function of the column model, user resize
//! overrides, and any live resize gesture. The resulting [`SizingTable`] is
//! rebuilt from scratch on every size-affecting change and never carries
//! entries for columns that no longer exist.

use std::collections::HashMap;

use log::trace;

use crate::column::{ColumnGroup, LeafColumn, Pin};
use crate::config::DefaultColumn;

/// Width of the row sequence number column.
pub const SEQUENCE_COLUMN_WIDTH: u32 = 64;

/// Width of the row selection checkbox column.
pub const CHECKBOX_COLUMN_WIDTH: u32 = 48;

/// Sticky offset of the first left-pinned column.
pub const LEFT_PIN_START: u32 = SEQUENCE_COLUMN_WIDTH + CHECKBOX_COLUMN_WIDTH;

/// Resolved sizes for one leaf column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSizes {
    /// Width bound to the header cell.
    pub header_size: u32,
    /// Width bound to body cells.
    pub column_size: u32,
    /// Sticky offset for pinned columns.
    pub offset: Option<u32>,
}

/// Sizes keyed by column id, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizingTable {
    order: Vec<String>,
    entries: HashMap<String, ColumnSizes>,
    groups: HashMap<String, u32>,
}

impl SizingTable {
    pub fn get(&self, column_id: &str) -> Option<&ColumnSizes> {
        self.entries.get(column_id)
    }

    /// Header width of a group: the sum of its visible leaves.
    pub fn group_size(&self, group_id: &str) -> Option<u32> {
        self.groups.get(group_id).copied()
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.entries.contains_key(column_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Column ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Sum of all body column widths.
    pub fn total_width(&self) -> u32 {
        self.entries.values().map(|s| s.column_size).sum()
    }

    /// Named size quantities for the rendering layer.
    ///
    /// Two per column: `--header-{id}-size` and `--col-{id}-size`.
    pub fn variables(&self) -> Vec<(String, String)> {
        let mut vars = Vec::with_capacity(self.order.len() * 2);
        for id in &self.order {
            if let Some(sizes) = self.entries.get(id) {
                vars.push((format!("--header-{}-size", id), format!("{}px", sizes.header_size)));
                vars.push((format!("--col-{}-size", id), format!("{}px", sizes.column_size)));
            }
        }
        vars
    }
}

/// A resize drag in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeGesture {
    pub column_id: String,
    /// Width when the gesture began.
    pub start_width: u32,
    /// Accumulated pointer movement in pixels.
    pub delta: i64,
}

impl ResizeGesture {
    /// Unclamped width the gesture currently proposes.
    pub fn preview_width(&self) -> u32 {
        (self.start_width as i64 + self.delta).clamp(0, u32::MAX as i64) as u32
    }
}

/// User-driven resize state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSizing {
    overrides: HashMap<String, u32>,
    gesture: Option<ResizeGesture>,
}

impl ColumnSizing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed width override for a column.
    pub fn override_for(&self, column_id: &str) -> Option<u32> {
        self.overrides.get(column_id).copied()
    }

    pub fn set_override(&mut self, column_id: impl Into<String>, width: u32) {
        self.overrides.insert(column_id.into(), width);
    }

    pub fn gesture(&self) -> Option<&ResizeGesture> {
        self.gesture.as_ref()
    }

    /// Start dragging a column edge. Replaces any gesture already live.
    pub fn begin_resize(&mut self, column_id: impl Into<String>, current_width: u32) {
        self.gesture = Some(ResizeGesture {
            column_id: column_id.into(),
            start_width: current_width,
            delta: 0,
        });
    }

    /// Set the accumulated movement of the live gesture.
    pub fn update_resize(&mut self, delta: i64) -> bool {
        match self.gesture.as_mut() {
            Some(gesture) => {
                gesture.delta = delta;
                true
            }
            None => false,
        }
    }

    /// Commit the live gesture as an override.
    pub fn finish_resize(&mut self) -> Option<(String, u32)> {
        let gesture = self.gesture.take()?;
        let width = gesture.preview_width();
        self.overrides.insert(gesture.column_id.clone(), width);
        Some((gesture.column_id, width))
    }

    /// Drop the live gesture without committing it.
    pub fn cancel_resize(&mut self) -> bool {
        self.gesture.take().is_some()
    }

    /// Forget overrides and gestures for columns not in `ids`.
    pub fn retain<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = ids.into_iter().collect();
        self.overrides.retain(|id, _| keep.contains(id.as_str()));
        if self
            .gesture
            .as_ref()
            .is_some_and(|g| !keep.contains(g.column_id.as_str()))
        {
            self.gesture = None;
        }
    }

    fn requested_width(&self, column_id: &str) -> Option<u32> {
        match &self.gesture {
            Some(gesture) if gesture.column_id == column_id => Some(gesture.preview_width()),
            _ => self.override_for(column_id),
        }
    }
}

/// Resolve the clamped width of one column.
pub fn column_width(column: &LeafColumn, sizing: &ColumnSizing, defaults: &DefaultColumn) -> u32 {
    let min = column.min_width.unwrap_or(defaults.min_size);
    let max = column.max_width.unwrap_or(defaults.max_size).max(min);
    sizing
        .requested_width(&column.id)
        .or(column.width)
        .unwrap_or(defaults.size)
        .clamp(min, max)
}

/// Rebuild the sizing table for `columns`.
///
/// Every column passed in gets exactly one entry. Groups get the summed width
/// of their leaves that are present in `columns`.
pub fn recompute(
    columns: &[&LeafColumn],
    groups: &[ColumnGroup],
    sizing: &ColumnSizing,
    defaults: &DefaultColumn,
) -> SizingTable {
    let mut table = SizingTable {
        order: Vec::with_capacity(columns.len()),
        entries: HashMap::with_capacity(columns.len()),
        groups: HashMap::with_capacity(groups.len()),
    };

    let mut left_offset = LEFT_PIN_START;
    for column in columns {
        let width = column_width(column, sizing, defaults);
        let offset = match column.pin {
            Some(Pin::Left) => {
                let offset = left_offset;
                left_offset += width;
                Some(offset)
            }
            _ => None,
        };
        table.order.push(column.id.clone());
        table.entries.insert(
            column.id.clone(),
            ColumnSizes {
                header_size: width,
                column_size: width,
                offset,
            },
        );
    }

    // Right-pinned columns stick to the right edge, so offsets accumulate
    // from the last column backwards.
    let mut right_offset = 0;
    for column in columns.iter().rev() {
        if column.pin == Some(Pin::Right)
            && let Some(sizes) = table.entries.get_mut(&column.id)
        {
            sizes.offset = Some(right_offset);
            right_offset += sizes.column_size;
        }
    }

    for group in groups {
        let width: u32 = group
            .leaves
            .iter()
            .filter_map(|id| table.entries.get(id))
            .map(|s| s.column_size)
            .sum();
        table.groups.insert(group.id.clone(), width);
    }

    trace!("recomputed sizes for {} columns", table.len());
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnDef, ColumnModel};
    use crate::config::GridOptions;

    fn model(defs: Vec<ColumnDef>) -> ColumnModel {
        ColumnModel::normalize(&defs, &GridOptions::default()).unwrap()
    }

    fn table(model: &ColumnModel, sizing: &ColumnSizing) -> SizingTable {
        recompute(
            &model.visible_leaves(),
            model.groups(),
            sizing,
            &DefaultColumn::default(),
        )
    }

    #[test]
    fn test_defaults_and_clamping() {
        let model = model(vec![
            ColumnDef::new("a", "A"),
            ColumnDef::new("b", "B").width(60),
            ColumnDef::new("c", "C").width(900),
            ColumnDef::new("d", "D").width(60).min_width(40),
            ColumnDef::new("e", "E").width(500).max_width(600),
        ]);
        let sizes = table(&model, &ColumnSizing::new());

        assert_eq!(sizes.get("a").unwrap().column_size, 150);
        assert_eq!(sizes.get("b").unwrap().column_size, 100);
        assert_eq!(sizes.get("c").unwrap().column_size, 400);
        assert_eq!(sizes.get("d").unwrap().column_size, 60);
        assert_eq!(sizes.get("e").unwrap().column_size, 500);
        assert_eq!(sizes.get("a").unwrap().header_size, 150);
    }

    #[test]
    fn test_override_clamped() {
        let model = model(vec![ColumnDef::new("a", "A")]);
        let mut sizing = ColumnSizing::new();

        sizing.set_override("a", 220);
        assert_eq!(table(&model, &sizing).get("a").unwrap().column_size, 220);

        sizing.set_override("a", 20);
        assert_eq!(table(&model, &sizing).get("a").unwrap().column_size, 100);
    }

    #[test]
    fn test_resize_gesture_lifecycle() {
        let model = model(vec![ColumnDef::new("a", "A"), ColumnDef::new("b", "B")]);
        let mut sizing = ColumnSizing::new();

        sizing.begin_resize("a", 150);
        assert!(sizing.update_resize(40));
        assert_eq!(table(&model, &sizing).get("a").unwrap().column_size, 190);

        assert!(sizing.cancel_resize());
        assert_eq!(table(&model, &sizing).get("a").unwrap().column_size, 150);

        sizing.begin_resize("b", 150);
        sizing.update_resize(-500);
        assert_eq!(sizing.finish_resize(), Some(("b".to_string(), 0)));
        assert!(sizing.gesture().is_none());
        assert_eq!(table(&model, &sizing).get("b").unwrap().column_size, 100);
        assert!(!sizing.update_resize(5));
    }

    #[test]
    fn test_hidden_columns_excluded() {
        let model = model(vec![ColumnDef::new("a", "A"), ColumnDef::new("b", "B").hidden()]);
        let sizes = table(&model, &ColumnSizing::new());

        assert_eq!(sizes.ids().collect::<Vec<_>>(), ["a"]);
        assert!(!sizes.contains("b"));
    }

    #[test]
    fn test_group_sizes() {
        let model = model(vec![
            ColumnDef::new("a", "A"),
            ColumnDef::group(
                "G",
                vec![
                    ColumnDef::new("b", "B").width(120),
                    ColumnDef::new("c", "C").width(130),
                    ColumnDef::new("d", "D").hidden(),
                ],
            ),
        ]);
        let sizes = table(&model, &ColumnSizing::new());
        assert_eq!(sizes.group_size("G"), Some(250));
    }

    #[test]
    fn test_pin_offsets() {
        let model = model(vec![
            ColumnDef::new("a", "A").width(120).pin(Pin::Left),
            ColumnDef::new("b", "B").width(130).pin(Pin::Left),
            ColumnDef::new("c", "C"),
            ColumnDef::new("d", "D").width(110).pin(Pin::Right),
            ColumnDef::new("e", "E").width(140).pin(Pin::Right),
        ]);
        let sizes = table(&model, &ColumnSizing::new());

        assert_eq!(sizes.get("a").unwrap().offset, Some(112));
        assert_eq!(sizes.get("b").unwrap().offset, Some(232));
        assert_eq!(sizes.get("c").unwrap().offset, None);
        assert_eq!(sizes.get("e").unwrap().offset, Some(0));
        assert_eq!(sizes.get("d").unwrap().offset, Some(140));
    }

    #[test]
    fn test_variables() {
        let model = model(vec![ColumnDef::new("code", "Code").width(120)]);
        let vars = table(&model, &ColumnSizing::new()).variables();
        assert_eq!(
            vars,
            vec![
                ("--header-code-size".to_string(), "120px".to_string()),
                ("--col-code-size".to_string(), "120px".to_string()),
            ]
        );
    }

    #[test]
    fn test_retain_drops_stale_overrides() {
        let mut sizing = ColumnSizing::new();
        sizing.set_override("a", 200);
        sizing.set_override("gone", 200);
        sizing.begin_resize("gone", 150);

        sizing.retain(["a"]);
        assert_eq!(sizing.override_for("a"), Some(200));
        assert_eq!(sizing.override_for("gone"), None);
        assert!(sizing.gesture().is_none());
    }
}
