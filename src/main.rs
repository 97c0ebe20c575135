//! Binary entry point: resolve configuration, start file logging, open the
//! store, and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use school_library_manager::logging::init_logging;
use school_library_manager::{run_app, App, AppConfig, SqliteStore, SystemClock};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_level, &config.log_dir()).context("failed to start logging")?;

    let store = SqliteStore::open(&config.db_path()).context("failed to open library database")?;
    let mut app = App::new(store, Box::new(SystemClock));
    run_app(&mut app, config.retention_check_interval)
}
