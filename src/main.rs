//! Binary entry point: resolve settings, start logging, open the database,
//! load both tables, and drive the Ratatui event loop until the user exits.
use library_manager::db::{open_database, seed_if_empty};
use library_manager::{logging, run_app, App, Settings};

/// Fatal startup problems (an unwritable data directory, a corrupt database
/// file) bubble up to the terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    logging::init(&settings)?;

    let conn = open_database(&settings)?;
    if settings.seed_sample {
        seed_if_empty(&conn)?;
    }
    let mut app = App::load(conn)?;
    tracing::info!("library manager started");

    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal session ended with an error");
    }
    result
}
