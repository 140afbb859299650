//! In-memory record store standing in for the REST backend.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use log::{debug, info};

use datagrid::{CellCommit, CellCommitter, CellValue, CommitRejected, GridRow, Record};

/// Holds every record and settles cell commits against them.
///
/// Blank text values and unknown rows are rejected, so both the accept and
/// the rollback path of the grid can be exercised.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Mutex<Vec<Record>>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn records(&self) -> std::sync::MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Records of one page.
    pub fn page(&self, page_index: usize, page_size: usize) -> Vec<Record> {
        self.records()
            .iter()
            .skip(page_index.saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<Record> {
        self.records().clone()
    }

    #[cfg(test)]
    pub fn get(&self, row_id: &str) -> Option<Record> {
        self.records()
            .iter()
            .find(|r| r.row_id().as_deref() == Some(row_id))
            .cloned()
    }
}

#[async_trait]
impl CellCommitter for RecordStore {
    async fn commit(&self, commit: &CellCommit) -> Result<(), CommitRejected> {
        if let CellValue::String(text) = &commit.value
            && text.trim().is_empty()
        {
            return Err(CommitRejected::new(format!("{} must not be empty", commit.column_id)));
        }

        let mut records = self.records();
        let record = records
            .iter_mut()
            .find(|r| r.row_id().as_deref() == Some(commit.row_id.as_str()))
            .ok_or_else(|| CommitRejected::new(format!("record {} not found", commit.row_id)))?;

        debug!("store: {} {} = {}", commit.row_id, commit.column_id, commit.value);
        record.set_cell(&commit.column_id, commit.value.clone());
        info!("saved {} on record {}", commit.column_id, commit.row_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagrid::CommitTicket;

    fn store() -> RecordStore {
        RecordStore::new(
            (1..=5)
                .map(|i| Record::new().set("id", i as i64).set("code", format!("X{}", i)))
                .collect(),
        )
    }

    fn commit(row_id: &str, value: CellValue) -> CellCommit {
        CellCommit {
            ticket: first_ticket(),
            row_id: row_id.to_string(),
            column_id: "code".to_string(),
            value,
        }
    }

    fn first_ticket() -> CommitTicket {
        use datagrid::{ColumnDef, DataGrid, GridOptions, SubmitOutcome};

        let grid: DataGrid<Record> = DataGrid::new(
            vec![ColumnDef::new("code", "Code")],
            GridOptions::default().with_editable(true),
        )
        .unwrap()
        .with_rows(vec![Record::new().set("id", 1).set("code", "a")]);
        grid.begin_edit(0, "code");
        match grid.submit(CellValue::from("b")) {
            Ok(SubmitOutcome::Dispatched(commit)) => commit.ticket,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_paging() {
        let store = store();
        assert_eq!(store.len(), 5);
        assert_eq!(store.page(1, 2).len(), 2);
        assert_eq!(store.page(2, 2).len(), 1);
        assert!(store.page(9, 2).is_empty());
        assert_eq!(store.page(1, 2)[0].cell("code"), CellValue::from("X3"));
    }

    #[tokio::test]
    async fn test_commit_accepts_and_persists() {
        let store = store();
        store.commit(&commit("2", CellValue::from("NEW"))).await.unwrap();
        assert_eq!(store.get("2").unwrap().cell("code"), CellValue::from("NEW"));
    }

    #[tokio::test]
    async fn test_commit_rejects_blank_and_unknown() {
        let store = store();

        let err = store.commit(&commit("2", CellValue::from("  "))).await.unwrap_err();
        assert_eq!(err.message, "code must not be empty");
        assert_eq!(store.get("2").unwrap().cell("code"), CellValue::from("X2"));

        let err = store.commit(&commit("99", CellValue::from("Y"))).await.unwrap_err();
        assert_eq!(err.message, "record 99 not found");
    }
}
