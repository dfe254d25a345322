//! DocuQ server library - HTTP routes, page rendering and application state.
//!
//! Separated from main.rs so the router can be driven from integration tests.

pub mod config;
pub mod logging;
pub mod routes;
pub mod server;
pub mod state;
pub mod ui;
