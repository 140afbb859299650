mod app;
mod command;
mod dataset;
mod error;
mod paths;
mod render;
mod store;

use std::fs::File;

use simplelog::{Config, LevelFilter, WriteLogger};

use crate::app::App;
use crate::dataset::Dataset;
use crate::error::ConsoleError;

const LOG_LEVEL_VAR: &str = "DATAGRID_LOG";

fn log_level() -> LevelFilter {
    std::env::var(LOG_LEVEL_VAR)
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Debug)
}

fn init_logging() {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    // Logging is best effort; the console works without it.
    if let Ok(file) = File::create(&path) {
        let _ = WriteLogger::init(log_level(), Config::default(), file);
    }
}

async fn run() -> Result<(), ConsoleError> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| ConsoleError::usage("usage: datagrid-console <dataset.json>"))?;
    let dataset = Dataset::load(&path).await?;
    log::info!("loaded dataset {}", path);
    App::new(dataset)?.run().await
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
