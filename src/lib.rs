//! Launchpad - directory-scoped command launcher
//!
//! Resolves one free-text query such as `timer checkout main` against
//! configured locations and a command tree, and renders the command it names
//! into a shell line that runs in the location's directory.

pub mod command;
pub mod core;
pub mod model;
pub mod ui;
