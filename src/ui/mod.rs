//! Ratatui front-end: the application state machine, its forms and tables,
//! and the crossterm event loop that drives them.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
