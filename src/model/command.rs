//! Command definitions
//!
//! A [`Command`] is a node of an n-ary tree. Its [`CommandKind`] decides how
//! the launcher treats a match: run it, ask for a parameter, or offer a list
//! of values to pick from.

use crate::core::error::LaunchError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Where a selection command gets its values from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Values listed in configuration
    Static(Vec<String>),
    /// Shell command whose stdout lines are the values
    Command(String),
}

/// How a matched command behaves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Shows the action output inline without running anything
    InfoOnly,
    /// Shows the action output as a list, one item per line
    InlineList,
    /// Runs immediately
    SingleAction,
    /// Runs once the unfinished query supplies a parameter
    NeedsParameter,
    /// Runs once one of the values has been picked
    NeedsSelection(ValueSource),
}

impl CommandKind {
    /// Parse the configuration name of a kind that carries no value source
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "info-only" => Some(Self::InfoOnly),
            "inline-list" => Some(Self::InlineList),
            "single-action" => Some(Self::SingleAction),
            "needs-parameter" => Some(Self::NeedsParameter),
            _ => None,
        }
    }

    pub fn value_source(&self) -> Option<&ValueSource> {
        match self {
            Self::NeedsSelection(source) => Some(source),
            _ => None,
        }
    }

    /// Info-only and inline-list commands never produce a runnable action
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::InfoOnly | Self::InlineList)
    }
}

/// Keyboard accelerators a modifier can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ModifierKey {
    Cmd,
    Alt,
    Ctrl,
    Fn,
    Shift,
    CmdAlt,
}

impl ModifierKey {
    pub const ALL: [ModifierKey; 6] = [
        Self::Cmd,
        Self::Alt,
        Self::Ctrl,
        Self::Fn,
        Self::Shift,
        Self::CmdAlt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cmd => "cmd",
            Self::Alt => "alt",
            Self::Ctrl => "ctrl",
            Self::Fn => "fn",
            Self::Shift => "shift",
            Self::CmdAlt => "cmd+alt",
        }
    }
}

impl FromStr for ModifierKey {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| LaunchError::InvalidModifier(s.to_string()))
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alternate action used while a modifier key is held
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifier {
    pub key: ModifierKey,
    /// Action template, substituted like the command's own action
    pub action: String,
    pub subtitle: String,
    pub valid: bool,
}

/// Command handed to the host's text view instead of running in a shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextView {
    /// Action template, substituted like the command's own action
    pub command: String,
    /// Alternates exposed to the text view, one per modifier key
    pub mods: Vec<Modifier>,
}

/// Second line shown under a command's title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtitle {
    Text(String),
    /// Shell command whose trimmed output is the subtitle
    Command(String),
}

impl Default for Subtitle {
    fn default() -> Self {
        Subtitle::Text(String::new())
    }
}

/// A named, possibly parameterized, possibly nested action definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    /// Unique among siblings; matched case-insensitively
    pub title: String,
    /// Action template (see [`crate::command::template`])
    pub action: String,
    /// Run first; its trimmed output fills the parameter placeholders
    pub secondary_action: Option<String>,
    pub kind: CommandKind,
    pub subcommands: Vec<Command>,
    /// Values become matchable sibling commands instead of a selection step
    pub inline: bool,
    /// Trim whitespace off values before substituting them
    pub trim_values: bool,
    pub subtitle: Subtitle,
    pub icon: Option<String>,
    /// Icon for commands generated from this command's values
    pub values_icon: Option<String>,
    pub mods: Vec<Modifier>,
    pub quicklook_url: Option<String>,
    /// Host UI should not reorder this item by usage
    pub skip_smart_sort: bool,
    pub textview: Option<TextView>,
}

impl Command {
    /// A single-action command with no children or display extras
    pub fn new(title: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            action: action.into(),
            secondary_action: None,
            kind: CommandKind::SingleAction,
            subcommands: Vec::new(),
            inline: false,
            trim_values: true,
            subtitle: Subtitle::default(),
            icon: None,
            values_icon: None,
            mods: Vec::new(),
            quicklook_url: None,
            skip_smart_sort: false,
            textview: None,
        }
    }

    pub fn with_kind(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_subcommands(mut self, subcommands: Vec<Command>) -> Self {
        self.subcommands = subcommands;
        self
    }

    pub fn with_secondary_action(mut self, secondary: impl Into<String>) -> Self {
        self.secondary_action = Some(secondary.into());
        self
    }

    pub fn with_mods(mut self, mods: Vec<Modifier>) -> Self {
        self.mods = mods;
        self
    }

    pub fn with_textview(mut self, textview: TextView) -> Self {
        self.textview = Some(textview);
        self
    }

    /// Mark the command's values for expansion as inline siblings
    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }

    pub fn value_source(&self) -> Option<&ValueSource> {
        self.kind.value_source()
    }

    /// A value-bearing command that asks for a selection before running
    pub fn is_selection(&self) -> bool {
        self.value_source().is_some() && !self.inline
    }
}
