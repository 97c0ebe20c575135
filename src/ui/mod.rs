//! Ratatui front-end. The screens here are thin glue: every change to books
//! or records goes through `library`, and the weekly cleanup is triggered from
//! the event loop in `terminal`.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
