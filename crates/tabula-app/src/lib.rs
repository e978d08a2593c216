//! Command-line front end for record tables
//!
//! Loads a table snapshot, applies filter and checkbox flags, and drives the
//! submission controller against the configured server.

pub mod cli;
pub mod commands;
pub mod console;
pub mod logging;
pub mod snapshot;
