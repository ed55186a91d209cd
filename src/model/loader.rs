//! Load launcher configuration from TOML
//!
//! Parsing goes through raw serde structs first, then each raw entry is
//! converted and validated into the model. All problems surface here, at
//! load time, so resolution never has to deal with a malformed tree.

use crate::core::config::ResolverConfig;
use crate::core::error::{LaunchError, Result};
use crate::model::command::{
    Command, CommandKind, Modifier, ModifierKey, Subtitle, TextView, ValueSource,
};
use crate::model::location::Location;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fully validated launcher configuration
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub settings: ResolverConfig,
    pub locations: Vec<Location>,
    pub commands: Vec<Command>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    settings: RawSettings,
    #[serde(default)]
    locations: Vec<RawLocation>,
    #[serde(default)]
    commands: Vec<RawCommand>,
}

#[derive(Debug, Deserialize)]
struct RawCommandsFile {
    #[serde(default)]
    commands: Vec<RawCommand>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    max_depth: Option<usize>,
    command_timeout_ms: Option<u64>,
    shell: Option<String>,
    reload_template: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    title: String,
    path: String,
    actions_path: Option<String>,
    #[serde(default = "default_true")]
    show_default_commands: bool,
}

#[derive(Debug, Deserialize)]
struct RawModifier {
    #[serde(rename = "mod")]
    key: String,
    command: String,
    #[serde(default)]
    subtitle: String,
}

#[derive(Debug, Deserialize)]
struct RawTextView {
    command: String,
    #[serde(default)]
    mods: Vec<RawModifier>,
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    title: String,
    #[serde(default)]
    action: String,
    secondary_action: Option<String>,
    kind: Option<String>,
    values: Option<Vec<String>>,
    values_command: Option<String>,
    #[serde(default)]
    inline: bool,
    #[serde(default = "default_true")]
    trim_values: bool,
    subtitle: Option<String>,
    subtitle_command: Option<String>,
    icon: Option<String>,
    values_icon: Option<String>,
    #[serde(default)]
    mods: Vec<RawModifier>,
    quicklook_url: Option<String>,
    #[serde(default)]
    skip_smart_sort: bool,
    textview: Option<RawTextView>,
    #[serde(default)]
    subcommands: Vec<RawCommand>,
}

fn default_true() -> bool {
    true
}

/// Load the launcher configuration file at `path`
pub fn load_config_file(path: &Path) -> Result<LaunchConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, env_lookup)
        .map_err(|e| match e {
            LaunchError::Parse(msg) => LaunchError::Parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })
}

/// Load a per-location command file (only a `[[commands]]` array)
pub fn load_commands_file(path: &Path) -> Result<Vec<Command>> {
    let content = std::fs::read_to_string(path)?;
    let raw: RawCommandsFile = toml::from_str(&content)
        .map_err(|e| LaunchError::Parse(format!("{}: {}", path.display(), e)))?;
    convert_commands(raw.commands, &path.display().to_string())
}

/// Parse configuration text, expanding `$VAR` path segments through `env`
///
/// Command files named by a location's `actions_path` are read and validated
/// here as well.
pub fn parse_config<F>(content: &str, env: F) -> Result<LaunchConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let raw: RawConfig = toml::from_str(content).map_err(|e| LaunchError::Parse(e.to_string()))?;

    let settings = convert_settings(raw.settings)?;

    check_unique(raw.locations.iter().map(|l| l.title.as_str()), "locations")?;
    let locations = raw
        .locations
        .into_iter()
        .map(|loc| convert_location(loc, &env))
        .collect::<Result<Vec<_>>>()?;

    let commands = convert_commands(raw.commands, "commands")?;

    Ok(LaunchConfig {
        settings,
        locations,
        commands,
    })
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Replace path segments of the form `$NAME` with the variable's value
///
/// Unset variables leave the segment as written.
pub fn expand_path<F>(path: &str, env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let expanded: Vec<String> = path
        .split('/')
        .map(|part| match part.strip_prefix('$') {
            Some(name) if !name.is_empty() => env(name).unwrap_or_else(|| part.to_string()),
            _ => part.to_string(),
        })
        .collect();
    PathBuf::from(expanded.join("/"))
}

fn convert_settings(raw: RawSettings) -> Result<ResolverConfig> {
    let defaults = ResolverConfig::default();
    let settings = ResolverConfig {
        max_depth: raw.max_depth.unwrap_or(defaults.max_depth),
        command_timeout: raw
            .command_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.command_timeout),
        shell: raw.shell.unwrap_or(defaults.shell),
        reload_template: raw.reload_template.unwrap_or(defaults.reload_template),
    };
    settings.validate().map_err(LaunchError::InvalidConfig)?;
    Ok(settings)
}

fn convert_location<F>(raw: RawLocation, env: &F) -> Result<Location>
where
    F: Fn(&str) -> Option<String>,
{
    if raw.title.trim().is_empty() {
        return Err(LaunchError::InvalidConfig(format!(
            "location for path '{}' has an empty title",
            raw.path
        )));
    }

    let actions_path = raw.actions_path.as_deref().map(|p| expand_path(p, env));
    let commands = match &actions_path {
        Some(path) => load_commands_file(path)?,
        None => Vec::new(),
    };

    Ok(Location {
        title: raw.title.trim().to_string(),
        directory: expand_path(&raw.path, env),
        actions_path,
        commands,
        show_default_commands: raw.show_default_commands,
    })
}

fn convert_commands(raw: Vec<RawCommand>, scope: &str) -> Result<Vec<Command>> {
    check_unique(raw.iter().map(|c| c.title.as_str()), scope)?;
    raw.into_iter().map(convert_command).collect()
}

fn convert_command(raw: RawCommand) -> Result<Command> {
    let title = raw.title.trim().to_string();
    let invalid = |reason: &str| LaunchError::InvalidCommand {
        title: title.clone(),
        reason: reason.to_string(),
    };

    if title.is_empty() {
        return Err(invalid("title must not be empty"));
    }

    let source = match (raw.values, raw.values_command) {
        (Some(_), Some(_)) => return Err(invalid("values and values_command are exclusive")),
        (Some(values), None) => Some(ValueSource::Static(values)),
        (None, Some(command)) => Some(ValueSource::Command(command)),
        (None, None) => None,
    };

    let kind = match (raw.kind.as_deref(), source) {
        (None | Some("needs-selection"), Some(source)) => CommandKind::NeedsSelection(source),
        (Some("needs-selection"), None) => {
            return Err(invalid("needs-selection requires values or values_command"))
        }
        (None, None) => CommandKind::SingleAction,
        (Some(name), source) => {
            let kind = CommandKind::from_name(name)
                .ok_or_else(|| invalid(&format!("unknown kind '{}'", name)))?;
            if source.is_some() {
                return Err(invalid("values require kind needs-selection"));
            }
            kind
        }
    };

    if raw.inline && kind.value_source().is_none() {
        return Err(invalid("inline requires values or values_command"));
    }

    let subtitle = match (raw.subtitle, raw.subtitle_command) {
        (Some(_), Some(_)) => return Err(invalid("subtitle and subtitle_command are exclusive")),
        (Some(text), None) => Subtitle::Text(text),
        (None, Some(command)) => Subtitle::Command(command),
        (None, None) => Subtitle::default(),
    };

    let mods = convert_mods(raw.mods, &title)?;
    let textview = match raw.textview {
        Some(tv) => Some(TextView {
            command: tv.command,
            mods: convert_mods(tv.mods, &title)?,
        }),
        None => None,
    };

    let subcommands = convert_commands(raw.subcommands, &format!("subcommands of '{}'", title))?;

    Ok(Command {
        title,
        action: raw.action,
        secondary_action: raw.secondary_action,
        kind,
        subcommands,
        inline: raw.inline,
        trim_values: raw.trim_values,
        subtitle,
        icon: raw.icon,
        values_icon: raw.values_icon,
        mods,
        quicklook_url: raw.quicklook_url,
        skip_smart_sort: raw.skip_smart_sort,
        textview,
    })
}

fn convert_mods(raw: Vec<RawModifier>, title: &str) -> Result<Vec<Modifier>> {
    let mut seen_keys = HashSet::new();
    let mut mods = Vec::with_capacity(raw.len());
    for raw_mod in raw {
        let key: ModifierKey = raw_mod.key.parse()?;
        if !seen_keys.insert(key) {
            return Err(LaunchError::InvalidCommand {
                title: title.to_string(),
                reason: format!("modifier '{}' bound twice", key),
            });
        }
        mods.push(Modifier {
            key,
            action: raw_mod.command,
            subtitle: raw_mod.subtitle,
            valid: true,
        });
    }
    Ok(mods)
}

/// Titles are match keys, so uniqueness is case-insensitive
fn check_unique<'a>(titles: impl Iterator<Item = &'a str>, scope: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for title in titles {
        if !seen.insert(title.trim().to_lowercase()) {
            return Err(LaunchError::DuplicateTitle {
                scope: scope.to_string(),
                title: title.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml_str = r#"
[[locations]]
title = "timer"
path = "/tmp/timer"

[[commands]]
title = "pull"
action = "git pull"
"#;
        let config = parse_config(toml_str, no_env).unwrap();
        assert_eq!(config.locations.len(), 1);
        assert_eq!(config.locations[0].directory, PathBuf::from("/tmp/timer"));
        assert!(config.locations[0].show_default_commands);
        assert_eq!(config.commands[0].kind, CommandKind::SingleAction);
        assert_eq!(config.settings, ResolverConfig::default());
    }

    #[test]
    fn test_values_imply_selection() {
        let toml_str = r#"
[[commands]]
title = "checkout"
action = "git checkout [input]"
values_command = "git branch"
"#;
        let config = parse_config(toml_str, no_env).unwrap();
        assert_eq!(
            config.commands[0].kind,
            CommandKind::NeedsSelection(ValueSource::Command("git branch".into()))
        );
    }

    #[test]
    fn test_expand_path_segments() {
        let env = |name: &str| (name == "HOME").then(|| "/home/me".to_string());
        assert_eq!(expand_path("$HOME/dev/$MISSING", env), PathBuf::from("/home/me/dev/$MISSING"));
        assert_eq!(expand_path("/opt/$/x", env), PathBuf::from("/opt/$/x"));
    }

    #[test]
    fn test_duplicate_sibling_titles_rejected() {
        let toml_str = r#"
[[commands]]
title = "git"
[[commands.subcommands]]
title = "Push"
[[commands.subcommands]]
title = "push"
"#;
        let err = parse_config(toml_str, no_env).unwrap_err();
        assert!(matches!(err, LaunchError::DuplicateTitle { ref title, .. } if title == "push"));
    }

    #[test]
    fn test_conflicting_value_sources_rejected() {
        let toml_str = r#"
[[commands]]
title = "pick"
values = ["a"]
values_command = "ls"
"#;
        assert!(matches!(
            parse_config(toml_str, no_env),
            Err(LaunchError::InvalidCommand { .. })
        ));
    }

    #[test]
    fn test_values_on_wrong_kind_rejected() {
        let toml_str = r#"
[[commands]]
title = "pick"
kind = "single-action"
values = ["a"]
"#;
        assert!(matches!(
            parse_config(toml_str, no_env),
            Err(LaunchError::InvalidCommand { .. })
        ));
    }

    #[test]
    fn test_invalid_modifier_rejected() {
        let toml_str = r#"
[[commands]]
title = "push"
action = "git push"
[[commands.mods]]
mod = "meta"
command = "git push -f"
"#;
        assert!(matches!(
            parse_config(toml_str, no_env),
            Err(LaunchError::InvalidModifier(ref k)) if k == "meta"
        ));
    }

    #[test]
    fn test_textview_table() {
        let toml_str = r#"
[[commands]]
title = "log"
action = "git log"
[commands.textview]
command = "git log -n 20"
[[commands.textview.mods]]
mod = "alt"
command = "git log --stat"
subtitle = "with stats"
"#;
        let config = parse_config(toml_str, no_env).unwrap();
        let textview = config.commands[0].textview.as_ref().unwrap();
        assert_eq!(textview.command, "git log -n 20");
        assert_eq!(textview.mods[0].key, ModifierKey::Alt);
        assert_eq!(textview.mods[0].subtitle, "with stats");
    }

    #[test]
    fn test_textview_duplicate_modifier_rejected() {
        let toml_str = r#"
[[commands]]
title = "log"
action = "git log"
[commands.textview]
command = "git log"
[[commands.textview.mods]]
mod = "alt"
command = "a"
[[commands.textview.mods]]
mod = "alt"
command = "b"
"#;
        assert!(matches!(
            parse_config(toml_str, no_env),
            Err(LaunchError::InvalidCommand { ref reason, .. }) if reason.contains("alt")
        ));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let toml_str = r#"
[settings]
max_depth = 0
"#;
        assert!(matches!(
            parse_config(toml_str, no_env),
            Err(LaunchError::InvalidConfig(_))
        ));
    }
}
