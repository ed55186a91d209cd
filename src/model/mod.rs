//! Command tree model
//!
//! Locations and commands as loaded from configuration. Everything in here is
//! read-only once loaded; resolution works on borrowed views (see
//! [`crate::command::arena`]).

pub mod command;
pub mod loader;
pub mod location;

pub use command::{Command, CommandKind, Modifier, ModifierKey, Subtitle, TextView, ValueSource};
pub use loader::{load_commands_file, load_config_file, parse_config, LaunchConfig};
pub use location::Location;
