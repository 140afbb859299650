//! End-to-end editing, selection and commit scenarios.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use datagrid::{
    CellCommit, CellCommitter, CellValue, ColumnDef, CommitRejected, CommitResolution, DataGrid,
    Direction, EditError, EditState, EditTarget, GridEvent, GridOptions, GridRow, Record,
    SelectionChange, SelectionSet, SubmitOutcome, settle_commit,
};

fn columns() -> Vec<ColumnDef> {
    vec![ColumnDef::new("code", "Code"), ColumnDef::new("name", "Name")]
}

fn widget_grid() -> DataGrid<Record> {
    DataGrid::new(columns(), GridOptions::default().with_editable(true))
        .unwrap()
        .with_rows(vec![Record::new().set("id", 7).set("code", "X1").set("name", "Widget")])
}

fn commits(events: &[GridEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GridEvent::CellCommit(_)))
        .count()
}

/// Counts calls and answers with a fixed result.
struct CountingCommitter {
    calls: AtomicUsize,
    reject: Option<&'static str>,
}

impl CountingCommitter {
    fn accepting() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reject: None,
        }
    }

    fn rejecting(message: &'static str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reject: Some(message),
        }
    }
}

#[async_trait]
impl CellCommitter for CountingCommitter {
    async fn commit(&self, _commit: &CellCommit) -> Result<(), CommitRejected> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reject {
            Some(message) => Err(message.into()),
            None => Ok(()),
        }
    }
}

/// Records what the grid displays while the commit is pending, then rejects.
struct InspectingCommitter {
    grid: DataGrid<Record>,
    seen: Mutex<Option<CellValue>>,
}

#[async_trait]
impl CellCommitter for InspectingCommitter {
    async fn commit(&self, commit: &CellCommit) -> Result<(), CommitRejected> {
        let shown = self.grid.row(0).map(|row| row.cell(&commit.column_id));
        *self.seen.lock().unwrap() = shown;
        Err(CommitRejected::new("server said no"))
    }
}

struct PanickingCommitter;

#[async_trait]
impl CellCommitter for PanickingCommitter {
    async fn commit(&self, _commit: &CellCommit) -> Result<(), CommitRejected> {
        panic!("connection reset");
    }
}

fn take_commit(grid: &DataGrid<Record>) -> CellCommit {
    grid.drain_events()
        .into_iter()
        .find_map(|event| match event {
            GridEvent::CellCommit(commit) => Some(commit),
            _ => None,
        })
        .expect("a commit was queued")
}

#[test]
fn test_unchanged_submit_skips_commit() {
    let grid = widget_grid();
    assert!(grid.begin_edit(0, "code"));

    let outcome = grid.submit(CellValue::from("X1"));

    assert_eq!(outcome, Ok(SubmitOutcome::Unchanged));
    assert_eq!(grid.edit_state(), EditState::Idle);
    assert_eq!(commits(&grid.drain_events()), 0);
    assert_eq!(grid.row(0).unwrap().cell("code"), CellValue::from("X1"));
}

#[tokio::test]
async fn test_rejected_commit_reverts_after_optimistic_display() {
    let grid = widget_grid();
    grid.begin_edit(0, "code");
    grid.submit(CellValue::from("X2")).unwrap();
    assert_eq!(grid.row(0).unwrap().cell("code"), CellValue::from("X2"));

    let committer = InspectingCommitter {
        grid: grid.clone(),
        seen: Mutex::new(None),
    };
    let resolution = settle_commit(&grid, take_commit(&grid), &committer).await;

    assert_eq!(*committer.seen.lock().unwrap(), Some(CellValue::from("X2")));
    assert!(matches!(resolution, CommitResolution::RolledBack { restored: true, .. }));
    assert_eq!(grid.row(0).unwrap().cell("code"), CellValue::from("X1"));
    assert_eq!(grid.edit_state(), EditState::Idle);
}

#[tokio::test]
async fn test_accepted_commit_keeps_value() {
    let grid = widget_grid();
    grid.begin_edit(0, "name");
    grid.submit(CellValue::from("Gadget")).unwrap();

    let committer = CountingCommitter::accepting();
    let resolution = settle_commit(&grid, take_commit(&grid), &committer).await;

    assert_eq!(resolution, CommitResolution::Confirmed);
    assert_eq!(committer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(grid.row(0).unwrap().cell("name"), CellValue::from("Gadget"));
    assert_eq!(grid.commit_in_flight(), None);
}

#[tokio::test]
async fn test_panicking_committer_counts_as_rejection() {
    let grid = widget_grid();
    grid.begin_edit(0, "name");
    grid.submit(CellValue::from("Gadget")).unwrap();

    let resolution = settle_commit(&grid, take_commit(&grid), &PanickingCommitter).await;

    assert!(matches!(resolution, CommitResolution::RolledBack { .. }));
    assert_eq!(grid.row(0).unwrap().cell("name"), CellValue::from("Widget"));
    let events = grid.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        GridEvent::CommitRolledBack { message, .. } if message == "connection reset"
    )));
}

#[tokio::test]
async fn test_rejection_message_reaches_host() {
    let grid = widget_grid();
    grid.begin_edit(0, "code");
    grid.submit(CellValue::from("")).unwrap();
    let commit = take_commit(&grid);
    let ticket = commit.ticket;

    let committer = CountingCommitter::rejecting("code required");
    settle_commit(&grid, commit, &committer).await;

    assert_eq!(
        grid.drain_events(),
        vec![GridEvent::CommitRolledBack {
            ticket,
            row_id: "7".into(),
            column_id: "code".into(),
            message: "code required".into(),
            restored: true,
        }]
    );
    assert_eq!(grid.row(0).unwrap().cell("code"), CellValue::from("X1"));
}

#[test]
fn test_tab_wraps_to_first_column() {
    let grid = widget_grid();
    grid.begin_edit(0, "name");

    assert_eq!(grid.advance(Direction::Next), Some(EditTarget::new(0, "code")));
    assert_eq!(grid.advance(Direction::Prev), Some(EditTarget::new(0, "name")));
}

#[test]
fn test_single_select_replaces_selection() {
    let mut selection = SelectionSet::from_keys(["7"]);
    let changes = selection.toggle_with_single_select_policy("9", true);

    assert_eq!(selection.keys(), ["9"]);
    assert_eq!(
        changes,
        vec![
            SelectionChange { key: "7".into(), selected: false },
            SelectionChange { key: "9".into(), selected: true },
        ]
    );
}

#[test]
fn test_row_without_id_cannot_commit() {
    let grid = DataGrid::new(columns(), GridOptions::default().with_editable(true))
        .unwrap()
        .with_rows(vec![Record::new().set("code", "X1").set("name", "Widget")]);
    grid.begin_edit(0, "code");

    let outcome = grid.submit(CellValue::from("Y"));

    assert_eq!(outcome, Err(EditError::MissingRowIdentifier { row_index: 0 }));
    assert_eq!(grid.edit_state(), EditState::Idle);
    assert_eq!(grid.commit_in_flight(), None);
    assert_eq!(commits(&grid.drain_events()), 0);
    assert_eq!(grid.row(0).unwrap().cell("code"), CellValue::from("X1"));
}

#[test]
fn test_row_without_id_fails_even_when_unchanged() {
    let grid = DataGrid::new(
        vec![ColumnDef::new("code", "Code")],
        GridOptions::default().with_editable(true),
    )
    .unwrap()
    .with_rows(vec![Record::new().set("code", "X1")]);
    grid.begin_edit(0, "code");

    let outcome = grid.submit(CellValue::from("X1"));

    assert_eq!(outcome, Err(EditError::MissingRowIdentifier { row_index: 0 }));
    assert_eq!(grid.edit_state(), EditState::Idle);
    assert_eq!(
        grid.drain_events(),
        vec![GridEvent::MissingRowIdentifier { row_index: 0, column_id: "code".into() }]
    );
}

#[test]
fn test_without_collaborator_edits_apply_locally() {
    let grid = DataGrid::new(
        columns(),
        GridOptions::default().with_editable(true).with_commit_edits(false),
    )
    .unwrap()
    .with_rows(vec![Record::new().set("id", 1).set("code", "X1")]);
    grid.begin_edit(0, "code");

    assert_eq!(grid.submit(CellValue::from("X5")), Ok(SubmitOutcome::Applied));
    assert_eq!(grid.row(0).unwrap().cell("code"), CellValue::from("X5"));
    assert_eq!(commits(&grid.drain_events()), 0);
}

#[tokio::test]
async fn test_data_replacement_during_commit() {
    let grid = widget_grid();
    grid.begin_edit(0, "code");
    grid.submit(CellValue::from("X2")).unwrap();
    let commit = take_commit(&grid);

    grid.set_data(vec![Record::new().set("id", 7).set("code", "X3").set("name", "Widget")]);
    assert_eq!(grid.edit_state(), EditState::Idle);

    let committer = CountingCommitter::rejecting("stale");
    let resolution = settle_commit(&grid, commit, &committer).await;

    assert!(matches!(resolution, CommitResolution::RolledBack { restored: false, .. }));
    assert_eq!(grid.row(0).unwrap().cell("code"), CellValue::from("X3"));
}
