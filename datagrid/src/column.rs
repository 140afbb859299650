//! Column model: declarations, normalization, and visibility.
//!
//! Column declarations may be nested into groups. Normalization flattens them
//! into an ordered list of leaf columns, the unit every other part of the grid
//! works with. Declared order is render order and tab order.

use std::collections::HashSet;

use log::trace;
use serde::Deserialize;

use crate::config::GridOptions;
use crate::error::ColumnError;

/// Horizontal alignment of cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Side a column is pinned (sticky) to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pin {
    Left,
    Right,
}

fn default_true() -> bool {
    true
}

/// A column declaration as supplied by the hosting page.
///
/// A declaration with children is a group header; one without is a leaf.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnDef {
    /// Identifier. Leaves with an empty id get one derived from position.
    #[serde(default)]
    pub id: String,
    /// Header text.
    #[serde(default)]
    pub header: String,
    /// Declared width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Lower width bound in pixels.
    #[serde(default)]
    pub min_width: Option<u32>,
    /// Upper width bound in pixels.
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    /// Contributes to the summary row.
    #[serde(default)]
    pub summarizable: bool,
    #[serde(default)]
    pub align: Alignment,
    #[serde(default)]
    pub pin: Option<Pin>,
    /// Nested declarations; non-empty for group headers.
    #[serde(default)]
    pub children: Vec<ColumnDef>,
}

impl ColumnDef {
    /// Create a visible, editable leaf column.
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            width: None,
            min_width: None,
            max_width: None,
            visible: true,
            editable: true,
            summarizable: false,
            align: Alignment::default(),
            pin: None,
            children: Vec::new(),
        }
    }

    /// Create a group header spanning the given children.
    pub fn group(header: impl Into<String>, children: Vec<ColumnDef>) -> Self {
        Self {
            children,
            ..Self::new("", header)
        }
    }

    /// Set the declared width.
    pub fn width(mut self, px: u32) -> Self {
        self.width = Some(px);
        self
    }

    /// Set the lower width bound.
    pub fn min_width(mut self, px: u32) -> Self {
        self.min_width = Some(px);
        self
    }

    /// Set the upper width bound.
    pub fn max_width(mut self, px: u32) -> Self {
        self.max_width = Some(px);
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Never editable.
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Include in the summary row.
    pub fn summary(mut self) -> Self {
        self.summarizable = true;
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn pin(mut self, pin: Pin) -> Self {
        self.pin = Some(pin);
        self
    }

    fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A normalized leaf column. Maps to exactly one body cell per row.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafColumn {
    pub id: String,
    pub header: String,
    pub width: Option<u32>,
    pub min_width: Option<u32>,
    pub max_width: Option<u32>,
    pub visible: bool,
    /// Declared editable and not on the never-editable list.
    pub editable: bool,
    pub summarizable: bool,
    pub align: Alignment,
    pub pin: Option<Pin>,
    /// Id of the innermost enclosing group, if any.
    pub group: Option<String>,
}

/// A group header spanning several leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGroup {
    pub id: String,
    pub header: String,
    /// Ids of every leaf below this group, in declared order.
    pub leaves: Vec<String>,
}

/// Entry of the column visibility menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMenuEntry {
    pub id: String,
    pub header: String,
    pub visible: bool,
}

/// Ordered leaf columns plus the groups above them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnModel {
    leaves: Vec<LeafColumn>,
    groups: Vec<ColumnGroup>,
}

impl ColumnModel {
    /// Flatten declarations into leaf columns.
    ///
    /// Fails with [`ColumnError::DuplicateId`] if two leaves share an id.
    pub fn normalize(defs: &[ColumnDef], options: &GridOptions) -> Result<Self, ColumnError> {
        let mut builder = Normalizer {
            options,
            model: ColumnModel::default(),
            seen: HashSet::new(),
            group_ids: HashSet::new(),
            group_count: 0,
        };
        builder.walk(defs, None, true)?;
        trace!(
            "normalized {} leaf columns in {} groups",
            builder.model.leaves.len(),
            builder.model.groups.len()
        );
        Ok(builder.model)
    }

    /// All leaves in declared order.
    pub fn leaves(&self) -> &[LeafColumn] {
        &self.leaves
    }

    /// All groups, outermost first.
    pub fn groups(&self) -> &[ColumnGroup] {
        &self.groups
    }

    /// Find a leaf by id.
    pub fn leaf(&self, id: &str) -> Option<&LeafColumn> {
        self.leaves.iter().find(|c| c.id == id)
    }

    /// Visible leaves in declared order. This is the tab order.
    pub fn visible_leaves(&self) -> Vec<&LeafColumn> {
        visible_leaves(&self.leaves)
    }

    /// Show or hide a leaf. Returns true if visibility changed.
    pub fn set_visibility(&mut self, id: &str, visible: bool) -> bool {
        match self.leaves.iter_mut().find(|c| c.id == id) {
            Some(column) if column.visible != visible => {
                column.visible = visible;
                true
            }
            _ => false,
        }
    }

    /// Flip a leaf's visibility. Returns the new visibility.
    pub fn toggle_visibility(&mut self, id: &str) -> Option<bool> {
        let column = self.leaves.iter_mut().find(|c| c.id == id)?;
        column.visible = !column.visible;
        Some(column.visible)
    }

    /// Leaves whose header or id contains `query`, ignoring case.
    pub fn column_menu(&self, query: &str) -> Vec<ColumnMenuEntry> {
        let query = query.trim().to_lowercase();
        self.leaves
            .iter()
            .filter(|c| {
                query.is_empty()
                    || c.header.to_lowercase().contains(&query)
                    || c.id.to_lowercase().contains(&query)
            })
            .map(|c| ColumnMenuEntry {
                id: c.id.clone(),
                header: c.header.clone(),
                visible: c.visible,
            })
            .collect()
    }
}

/// Filter leaves to the visible ones, preserving order.
pub fn visible_leaves(leaves: &[LeafColumn]) -> Vec<&LeafColumn> {
    leaves.iter().filter(|c| c.visible).collect()
}

struct Normalizer<'a> {
    options: &'a GridOptions,
    model: ColumnModel,
    seen: HashSet<String>,
    group_ids: HashSet<String>,
    group_count: usize,
}

impl Normalizer<'_> {
    /// `base`, or `{base}_{n}` with the first free `n` when taken.
    fn derive_group_id(&mut self, base: String) -> String {
        let mut id = base.clone();
        let mut n = 1;
        while self.group_ids.contains(&id) {
            id = format!("{}_{}", base, n);
            n += 1;
        }
        self.group_ids.insert(id.clone());
        id
    }

    /// Returns the ids of the leaves produced below `defs`.
    fn walk(
        &mut self,
        defs: &[ColumnDef],
        parent: Option<&str>,
        parent_visible: bool,
    ) -> Result<Vec<String>, ColumnError> {
        let mut produced = Vec::new();

        for (index, def) in defs.iter().enumerate() {
            if def.is_group() {
                let id = if !def.id.is_empty() {
                    if !self.group_ids.insert(def.id.clone()) {
                        return Err(ColumnError::DuplicateId { id: def.id.clone() });
                    }
                    def.id.clone()
                } else {
                    let base = if def.header.is_empty() {
                        format!("group_{}", self.group_count)
                    } else {
                        def.header.clone()
                    };
                    self.derive_group_id(base)
                };
                self.group_count += 1;

                // Reserve the slot so groups keep outer-first order.
                let slot = self.model.groups.len();
                self.model.groups.push(ColumnGroup {
                    id: id.clone(),
                    header: def.header.clone(),
                    leaves: Vec::new(),
                });
                let leaves = self.walk(&def.children, Some(&id), parent_visible && def.visible)?;
                self.model.groups[slot].leaves = leaves.clone();
                produced.extend(leaves);
                continue;
            }

            let id = if def.id.is_empty() {
                format!("{}_{}", parent.unwrap_or("column"), index)
            } else {
                def.id.clone()
            };
            if !self.seen.insert(id.clone()) {
                return Err(ColumnError::DuplicateId { id });
            }

            self.model.leaves.push(LeafColumn {
                editable: def.editable && !self.options.is_locked_column(&id),
                id: id.clone(),
                header: def.header.clone(),
                width: def.width,
                min_width: def.min_width,
                max_width: def.max_width,
                visible: parent_visible && def.visible,
                summarizable: def.summarizable,
                align: def.align,
                pin: def.pin,
                group: parent.map(str::to_string),
            });
            produced.push(id);
        }

        Ok(produced)
    }
}
