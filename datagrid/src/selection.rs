//! Row selection set and the single-select policy.
//!
//! Every mutation is reported as a list of [`SelectionChange`]s, one per
//! member toggled, so the hosting page can mirror the set one toggle at a time.

use std::collections::HashSet;

use log::trace;

/// One toggle of one row key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub key: String,
    /// True when the key was added, false when it was removed.
    pub selected: bool,
}

impl SelectionChange {
    fn on(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            selected: true,
        }
    }

    fn off(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            selected: false,
        }
    }
}

/// Set of selected row keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from existing keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected keys, sorted for stable output.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.selected.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Add the key if absent, remove it if present.
    pub fn toggle(&mut self, key: &str) -> SelectionChange {
        let change = if self.selected.remove(key) {
            SelectionChange::off(key)
        } else {
            self.selected.insert(key.to_string());
            SelectionChange::on(key)
        };
        trace!("selection toggle {} -> {}", change.key, change.selected);
        change
    }

    /// Toggle under the single-select policy.
    ///
    /// With `enabled`, adding a key to a non-empty set first toggles every
    /// current member off, then toggles the key on. Removing the only member
    /// and adding to an empty set are plain toggles. Without `enabled` this is
    /// [`SelectionSet::toggle`].
    pub fn toggle_with_single_select_policy(
        &mut self,
        key: &str,
        enabled: bool,
    ) -> Vec<SelectionChange> {
        let mut changes = Vec::new();
        if enabled && !self.selected.is_empty() && !self.selected.contains(key) {
            for member in self.keys() {
                changes.push(self.toggle(&member));
            }
        }
        changes.push(self.toggle(key));
        changes
    }

    /// True when `keys` is non-empty and every key is selected.
    pub fn is_all_selected<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        let mut any = false;
        for key in keys {
            if !self.selected.contains(key) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Select-all affordance for one page.
    ///
    /// When every key is already selected each is toggled off, otherwise each
    /// unselected key is toggled on.
    pub fn toggle_all(&mut self, keys: &[String]) -> Vec<SelectionChange> {
        if self.is_all_selected(keys.iter().map(String::as_str)) {
            keys.iter().map(|key| self.toggle(key)).collect()
        } else {
            keys.iter()
                .filter(|key| !self.selected.contains(key.as_str()))
                .cloned()
                .collect::<Vec<_>>()
                .into_iter()
                .map(|key| self.toggle(&key))
                .collect()
        }
    }

    /// Drop members not present in `present`, one toggle-off per member.
    pub fn reconcile<'a>(&mut self, present: impl IntoIterator<Item = &'a str>) -> Vec<SelectionChange> {
        let present: HashSet<&str> = present.into_iter().collect();
        let stale: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|key| !present.contains(key.as_str()))
            .collect();
        stale.iter().map(|key| self.toggle(key)).collect()
    }

    /// Remove every member without reporting changes.
    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
