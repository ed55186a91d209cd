//! Query resolution pipeline
//!
//! Turns a free-text query into a location and a chain of commands:
//! input -> matcher -> resolver (expansion to a fixed point) -> Resolution,
//! then the template engine renders the executable action.

pub mod arena;
pub mod expansion;
pub mod matcher;
pub mod resolver;
pub mod runner;
pub mod template;

pub use arena::{CommandArena, CommandNode, NodeId};
pub use expansion::{expand, expand_level, Expansion};
pub use matcher::{match_commands, match_location, strip_title_prefix};
pub use resolver::{Resolution, Resolver};
pub use runner::{CommandRunner, ScriptedRunner, ShellRunner};
pub use template::{substitute_parameter, ActionTemplate, RenderedAction, TemplateContext};
