//! Terminal client for the Hiroba chat relay.

mod domain;
pub mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::run_client;
