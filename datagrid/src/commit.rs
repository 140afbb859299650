//! Async commit collaborator.

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use log::debug;

use crate::edit::CommitResolution;
use crate::error::{CommitRejected, extract_panic_message};
use crate::event::CellCommit;
use crate::grid::DataGrid;
use crate::row::GridRow;

/// Persists cell changes on behalf of the hosting page.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use datagrid::{CellCommit, CellCommitter, CommitRejected};
///
/// struct RejectEmpty;
///
/// #[async_trait]
/// impl CellCommitter for RejectEmpty {
///     async fn commit(&self, commit: &CellCommit) -> Result<(), CommitRejected> {
///         if commit.value.to_string().is_empty() {
///             return Err("value required".into());
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait CellCommitter: Send + Sync {
    async fn commit(&self, commit: &CellCommit) -> Result<(), CommitRejected>;
}

/// Run `commit` through `committer` and resolve it on `grid`.
///
/// The grid lock is not held while the committer runs. A panicking committer
/// counts as a rejection.
pub async fn settle_commit<R, C>(
    grid: &DataGrid<R>,
    commit: CellCommit,
    committer: &C,
) -> CommitResolution
where
    R: GridRow,
    C: CellCommitter + ?Sized,
{
    debug!("settling commit {}", commit.ticket);
    let result = match AssertUnwindSafe(committer.commit(&commit)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(CommitRejected::new(extract_panic_message(&panic))),
    };
    grid.resolve_commit(commit.ticket, result)
}
