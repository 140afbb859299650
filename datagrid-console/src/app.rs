//! The console session: commands in, grid events settled against the store.

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use datagrid::{
    CellKey, CellValue, CommitResolution, DataGrid, GridError, GridEvent, GridRow, PageRequest,
    PageState, Record, settle_commit,
};

use crate::command::{Command, HELP};
use crate::dataset::Dataset;
use crate::error::ConsoleError;
use crate::render::render;
use crate::store::RecordStore;

/// Result of one command.
#[derive(Debug, Default)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

pub struct App {
    grid: DataGrid<Record>,
    store: RecordStore,
    paginated: bool,
}

impl App {
    pub fn new(dataset: Dataset) -> Result<Self, ConsoleError> {
        let paginated = dataset.options.use_pagination;
        let page_size = dataset.page_size.max(1);
        let store = RecordStore::new(dataset.rows);
        let grid = DataGrid::new(dataset.columns, dataset.options).map_err(GridError::from)?;

        let app = Self {
            grid,
            store,
            paginated,
        };
        if paginated {
            app.load_page(PageRequest {
                page_index: 0,
                page_size,
            });
        } else {
            app.grid.set_data(app.store.all());
        }
        info!("console session started with {} records", app.store.len());
        Ok(app)
    }

    #[cfg(test)]
    pub fn grid(&self) -> &DataGrid<Record> {
        &self.grid
    }

    #[cfg(test)]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    fn load_page(&self, request: PageRequest) {
        let rows = self.store.page(request.page_index, request.page_size);
        debug!(
            "loaded page {} ({} rows)",
            request.page_index,
            rows.len()
        );
        self.grid.set_page_state(PageState::new(
            request.page_index,
            request.page_size,
            self.store.len(),
        ));
        self.grid.set_data(rows);
        self.grid.reconcile_selection();
    }

    /// Apply one command, then settle every event it produced.
    pub async fn execute(&self, command: Command) -> Result<Reply, ConsoleError> {
        debug!("command: {:?}", command);
        let mut reply = Reply::default();

        match command {
            Command::Show => reply = reply.line(render(&self.grid.view())),
            Command::Edit { row, column } => {
                if !self.grid.begin_edit(row, &column) {
                    reply = reply.line(format!("cannot edit row {} column {}", row + 1, column));
                }
            }
            Command::Type(text) => {
                let target = self
                    .grid
                    .edit_target()
                    .ok_or_else(|| ConsoleError::usage("no cell is being edited"))?;
                let current = self
                    .grid
                    .row(target.row_index)
                    .map(|row| row.cell(&target.column_id))
                    .unwrap_or_default();
                self.grid.update_buffer(CellValue::parse_input(&text, &current));
            }
            Command::Enter => reply = self.key(reply, CellKey::Enter).await,
            Command::Tab => reply = self.key(reply, CellKey::Tab).await,
            Command::BackTab => reply = self.key(reply, CellKey::BackTab).await,
            Command::Escape => {
                self.grid.handle_key(CellKey::Escape).map_err(GridError::from)?;
            }
            Command::Toggle(key) => {
                if self.grid.toggle_row_selection(&key).is_empty() {
                    reply = reply.line(format!("no row {} on this page", key));
                }
            }
            Command::ToggleAll => {
                self.grid.toggle_all();
            }
            Command::Page(index) => reply = self.page(reply, self.grid.request_page_change(index)),
            Command::Next => reply = self.page(reply, self.grid.next_page()),
            Command::Prev => reply = self.page(reply, self.grid.previous_page()),
            Command::First => reply = self.page(reply, self.grid.first_page()),
            Command::Last => reply = self.page(reply, self.grid.last_page()),
            Command::PageSize(size) => reply = self.page(reply, self.grid.set_page_size(size)),
            Command::Hide(column) => {
                if !self.grid.set_column_visibility(&column, false) {
                    reply = reply.line(format!("column {} is hidden or unknown", column));
                }
            }
            Command::Unhide(column) => {
                if !self.grid.set_column_visibility(&column, true) {
                    reply = reply.line(format!("column {} is visible or unknown", column));
                }
            }
            Command::Resize { column, width } => match self.grid.set_column_width(&column, width) {
                Some(applied) => reply = reply.line(format!("{} is now {}px", column, applied)),
                None => reply = reply.line(format!("column {} is hidden or unknown", column)),
            },
            Command::Columns(query) => {
                for entry in self.grid.column_menu(&query) {
                    reply = reply.line(format!(
                        "[{}] {} ({})",
                        if entry.visible { "x" } else { " " },
                        entry.header,
                        entry.id
                    ));
                }
            }
            Command::Variables => {
                for (name, value) in self.grid.size_variables() {
                    reply = reply.line(format!("{}: {}", name, value));
                }
            }
            Command::Help => reply = reply.line(HELP),
            Command::Quit => {
                reply.quit = true;
                return Ok(reply);
            }
        }

        for line in self.settle_events().await {
            reply = reply.line(line);
        }
        Ok(reply)
    }

    /// Events queued by a failed key are reported before the error.
    async fn key(&self, mut reply: Reply, key: CellKey) -> Reply {
        if self.grid.edit_target().is_none() {
            return reply.line("no cell is being edited");
        }
        let result = self.grid.handle_key(key);
        for line in self.settle_events().await {
            reply = reply.line(line);
        }
        if let Err(e) = result {
            reply = reply.line(format!("error: {}", GridError::from(e)));
        }
        reply
    }

    fn page(&self, reply: Reply, request: Option<PageRequest>) -> Reply {
        match request {
            Some(_) if !self.paginated => reply.line("pagination is disabled"),
            Some(_) => reply,
            None => reply.line("already on that page"),
        }
    }

    /// Drain and act on grid events until the queue stays empty.
    async fn settle_events(&self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let events = self.grid.drain_events();
            if events.is_empty() {
                return lines;
            }
            for event in events {
                match event {
                    GridEvent::SelectionToggled { key, selected } => {
                        debug!("selection {} -> {}", key, selected);
                        lines.push(format!(
                            "{} row {}",
                            if selected { "selected" } else { "deselected" },
                            key
                        ));
                    }
                    GridEvent::PageChange(request) => {
                        if self.paginated {
                            self.load_page(request);
                        }
                    }
                    GridEvent::CellCommit(commit) => {
                        lines.push(format!(
                            "saving {} on record {} {}",
                            commit.column_id, commit.row_id, commit.ticket
                        ));
                        match settle_commit(&self.grid, commit, &self.store).await {
                            CommitResolution::Confirmed => lines.push("saved".into()),
                            // The rollback event that follows carries the reason.
                            CommitResolution::RolledBack { .. } => {}
                            CommitResolution::Unknown => {
                                warn!("commit resolution not recognised by the grid");
                            }
                        }
                    }
                    GridEvent::CommitRolledBack {
                        row_id,
                        column_id,
                        message,
                        restored,
                        ..
                    } => {
                        warn!("commit rejected for {} on {}: {}", column_id, row_id, message);
                        lines.push(if restored {
                            format!("rejected: {} (value restored)", message)
                        } else {
                            format!("rejected: {} (row changed since, kept as shown)", message)
                        });
                    }
                    GridEvent::MissingRowIdentifier { row_index, column_id } => {
                        warn!("row {} has no identifier, edit of {} dropped", row_index, column_id);
                        lines.push(format!("row {} has no id and cannot be saved", row_index + 1));
                    }
                }
            }
        }
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run(&self) -> Result<(), ConsoleError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{}", render(&self.grid.view()));
        self.grid.take_dirty();

        while let Some(line) = lines.next_line().await? {
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };
            let show = command == Command::Show;
            match self.execute(command).await {
                Ok(reply) => {
                    for line in &reply.lines {
                        println!("{}", line);
                    }
                    if reply.quit {
                        break;
                    }
                }
                Err(e) => println!("error: {}", e),
            }
            if self.grid.take_dirty() && !show {
                println!("{}", render(&self.grid.view()));
            }
        }
        info!("console session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagrid::{ColumnDef, EditState, GridOptions};

    fn dataset(paginated: bool) -> Dataset {
        Dataset {
            options: GridOptions::default()
                .with_editable(true)
                .with_pagination(paginated),
            page_size: 2,
            columns: vec![ColumnDef::new("code", "Code"), ColumnDef::new("qty", "Qty")],
            rows: (1..=5)
                .map(|i| {
                    Record::new()
                        .set("id", i as i64)
                        .set("code", format!("X{}", i))
                        .set("qty", i as i64)
                })
                .collect(),
        }
    }

    async fn run(app: &App, line: &str) -> Reply {
        let command = Command::parse(line).unwrap().unwrap();
        app.execute(command).await.unwrap()
    }

    #[tokio::test]
    async fn test_edit_saves_to_store() {
        let app = App::new(dataset(true)).unwrap();
        run(&app, "edit 1 qty").await;
        run(&app, "type 40").await;
        let reply = run(&app, "enter").await;

        assert_eq!(reply.lines.last().map(String::as_str), Some("saved"));
        assert_eq!(app.store().get("1").unwrap().cell("qty"), CellValue::Int(40));
        assert_eq!(app.grid().edit_state(), EditState::Idle);
    }

    #[tokio::test]
    async fn test_blank_value_rolls_back() {
        let app = App::new(dataset(true)).unwrap();
        run(&app, "edit 2 code").await;
        run(&app, "type").await;
        let reply = run(&app, "enter").await;

        assert!(reply.lines.iter().any(|l| l.starts_with("rejected: code must not be empty")));
        assert_eq!(app.grid().row(1).unwrap().cell("code"), CellValue::from("X2"));
        assert_eq!(app.store().get("2").unwrap().cell("code"), CellValue::from("X2"));
    }

    #[tokio::test]
    async fn test_tab_saves_and_moves() {
        let app = App::new(dataset(true)).unwrap();
        run(&app, "edit 1 code").await;
        run(&app, "type Z1").await;
        run(&app, "tab").await;

        assert_eq!(app.store().get("1").unwrap().cell("code"), CellValue::from("Z1"));
        assert_eq!(app.grid().edit_target().map(|t| t.column_id), Some("qty".to_string()));
    }

    #[tokio::test]
    async fn test_paging_reloads_rows_and_prunes_selection() {
        let app = App::new(dataset(true)).unwrap();
        assert_eq!(app.grid().len(), 2);
        run(&app, "toggle 1").await;

        run(&app, "last").await;
        assert_eq!(app.grid().page_state().page_index, 2);
        assert_eq!(app.grid().len(), 1);
        assert_eq!(app.grid().row(0).unwrap().row_id().as_deref(), Some("5"));
        assert!(app.grid().selected_rows().is_empty());

        let reply = run(&app, "next").await;
        assert_eq!(reply.lines, vec!["already on that page".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_enter_reports_missing_id_at_once() {
        let mut dataset = dataset(true);
        dataset.rows[0] = Record::new().set("code", "X0").set("qty", 0);
        let app = App::new(dataset).unwrap();

        run(&app, "edit 1 code").await;
        run(&app, "type Y").await;
        let reply = run(&app, "enter").await;

        assert_eq!(
            reply.lines,
            vec![
                "row 1 has no id and cannot be saved".to_string(),
                "error: row 0 has no identifier; edit discarded".to_string(),
            ]
        );
        let next = run(&app, "columns code").await;
        assert_eq!(next.lines, vec!["[x] Code (code)".to_string()]);
    }

    #[tokio::test]
    async fn test_unpaginated_shows_everything() {
        let app = App::new(dataset(false)).unwrap();
        assert_eq!(app.grid().len(), 5);
    }

    #[tokio::test]
    async fn test_type_without_edit_is_usage_error() {
        let app = App::new(dataset(true)).unwrap();
        let err = app.execute(Command::Type("x".into())).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Usage(_)));
        assert!(run(&app, "quit").await.quit);
    }
}
