//! Named working directories

use crate::model::command::Command;
use serde::Serialize;
use std::path::PathBuf;

/// A named working directory the resolver can target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub title: String,
    pub directory: PathBuf,
    /// Optional per-location command file
    pub actions_path: Option<PathBuf>,
    /// Commands read from `actions_path` at load time
    pub commands: Vec<Command>,
    /// Whether the global commands stay available next to `actions_path` ones
    pub show_default_commands: bool,
}

impl Location {
    pub fn new(title: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            directory: directory.into(),
            actions_path: None,
            commands: Vec::new(),
            show_default_commands: true,
        }
    }
}
