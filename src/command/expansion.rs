//! Dynamic expansion of matched commands
//!
//! After a match, the last matched command may open up a new level:
//! - a command with subcommands splices them into the working set, with any
//!   inline-valued subcommand replaced by one command per value;
//! - a selection command replaces the working set with one command per value.
//!
//! Top-level inline commands are expanded the same way before the first match.
//!
//! Generated commands are new arena nodes; configured commands are never
//! touched.

use crate::command::arena::{CommandArena, NodeId};
use crate::command::runner::CommandRunner;
use crate::command::template::substitute_parameter;
use crate::model::{Command, CommandKind, Modifier, Subtitle, TextView, ValueSource};
use std::collections::HashSet;
use std::path::Path;

/// What the last matched command contributes to the next matching pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// Nothing to expand; resolution is at a fixed point
    None,
    /// Add these commands to the working set
    Splice(Vec<NodeId>),
    /// Use these commands as the whole working set
    Replace(Vec<NodeId>),
}

/// Expand `id` according to its kind and subcommands
pub fn expand(
    arena: &mut CommandArena<'_>,
    id: NodeId,
    runner: &dyn CommandRunner,
    cwd: Option<&Path>,
) -> Expansion {
    if arena.command(id).is_selection() {
        let items = materialize(arena, id, runner, cwd);
        tracing::debug!(command = arena.title(id), items = items.len(), "Expanded selection");
        return Expansion::Replace(items);
    }

    let children = arena.node(id).children.clone();
    if children.is_empty() {
        return Expansion::None;
    }

    let spliced = expand_level(arena, children, runner, cwd);
    tracing::debug!(command = arena.title(id), items = spliced.len(), "Expanded subcommands");
    Expansion::Splice(spliced)
}

/// Replace every inline-valued command in `level` by one command per value
pub fn expand_level(
    arena: &mut CommandArena<'_>,
    level: Vec<NodeId>,
    runner: &dyn CommandRunner,
    cwd: Option<&Path>,
) -> Vec<NodeId> {
    let mut expanded = Vec::with_capacity(level.len());
    for id in level {
        let command = arena.command(id);
        if command.inline && command.value_source().is_some() {
            expanded.extend(materialize(arena, id, runner, cwd));
        } else {
            expanded.push(id);
        }
    }
    expanded
}

/// Generate one ephemeral command per value of `template`
///
/// A failing or silent value command produces no commands.
pub fn materialize(
    arena: &mut CommandArena<'_>,
    template: NodeId,
    runner: &dyn CommandRunner,
    cwd: Option<&Path>,
) -> Vec<NodeId> {
    let items: Vec<Command> = {
        let command = arena.command(template);
        let Some(source) = command.value_source() else {
            return Vec::new();
        };

        let values = read_values(source, runner, cwd);
        let mut seen = HashSet::new();
        values
            .iter()
            .filter_map(|raw| {
                let title = raw.trim();
                if title.is_empty() || !seen.insert(title.to_lowercase()) {
                    return None;
                }
                let value = if command.trim_values { title } else { raw.as_str() };
                Some(ephemeral_command(command, title, value))
            })
            .collect()
    };

    items
        .into_iter()
        .map(|item| arena.push_ephemeral(item, template))
        .collect()
}

fn read_values(source: &ValueSource, runner: &dyn CommandRunner, cwd: Option<&Path>) -> Vec<String> {
    match source {
        ValueSource::Static(values) => values.clone(),
        ValueSource::Command(command) => match runner.run(command, cwd) {
            Ok(output) => output.lines().map(str::to_string).collect(),
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "Value command failed");
                Vec::new()
            }
        },
    }
}

/// Copy display and action settings from `template` onto a value
///
/// A selection template becomes a single action with the value already
/// substituted into its action and modifiers.
fn ephemeral_command(template: &Command, title: &str, value: &str) -> Command {
    let (kind, action, mods, textview) = match template.kind {
        CommandKind::NeedsSelection(_) => (
            CommandKind::SingleAction,
            substitute_parameter(&template.action, value),
            substitute_mods(&template.mods, value),
            template.textview.as_ref().map(|tv| TextView {
                command: substitute_parameter(&tv.command, value),
                mods: substitute_mods(&tv.mods, value),
            }),
        ),
        ref other => (
            other.clone(),
            template.action.clone(),
            template.mods.clone(),
            template.textview.clone(),
        ),
    };

    let subtitle = match &template.subtitle {
        Subtitle::Text(text) => Subtitle::Text(text.clone()),
        Subtitle::Command(command) => Subtitle::Command(substitute_parameter(command, value)),
    };

    Command {
        title: title.to_string(),
        action,
        secondary_action: template.secondary_action.clone(),
        kind,
        subcommands: Vec::new(),
        inline: false,
        trim_values: template.trim_values,
        subtitle,
        icon: template.values_icon.clone().or_else(|| template.icon.clone()),
        values_icon: None,
        mods,
        quicklook_url: template
            .quicklook_url
            .as_deref()
            .map(|url| substitute_parameter(url, value)),
        skip_smart_sort: template.skip_smart_sort,
        textview,
    }
}

fn substitute_mods(mods: &[Modifier], value: &str) -> Vec<Modifier> {
    mods.iter()
        .cloned()
        .map(|mut m| {
            m.action = substitute_parameter(&m.action, value);
            m
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::runner::ScriptedRunner;
    use crate::model::ModifierKey;

    fn selection(title: &str, action: &str, source: ValueSource) -> Command {
        Command::new(title, action).with_kind(CommandKind::NeedsSelection(source))
    }

    #[test]
    fn test_plain_command_does_not_expand() {
        let tree = vec![Command::new("pull", "git pull")];
        let mut arena = CommandArena::new();
        let roots = arena.intern_tree(&tree);

        let runner = ScriptedRunner::new();
        assert_eq!(expand(&mut arena, roots[0], &runner, None), Expansion::None);
    }

    #[test]
    fn test_selection_replaces_working_set() {
        let tree = vec![selection(
            "checkout",
            "git checkout [input]",
            ValueSource::Static(vec![" main ".into(), "dev".into(), "".into(), "MAIN".into()]),
        )];
        let mut arena = CommandArena::new();
        let roots = arena.intern_tree(&tree);

        let runner = ScriptedRunner::new();
        let Expansion::Replace(items) = expand(&mut arena, roots[0], &runner, None) else {
            panic!("expected replacement");
        };

        let titles: Vec<&str> = items.iter().map(|&id| arena.title(id)).collect();
        assert_eq!(titles, vec!["main", "dev"]);
        assert_eq!(arena.command(items[0]).action, "git checkout main");
        assert_eq!(arena.command(items[0]).kind, CommandKind::SingleAction);
        assert_eq!(arena.node(items[0]).origin, Some(roots[0]));
    }

    #[test]
    fn test_selection_values_fill_textview() {
        let template = selection(
            "diff",
            "git diff [input]",
            ValueSource::Static(vec!["src/lib.rs".into()]),
        )
        .with_textview(TextView {
            command: "git diff --stat [input]".into(),
            mods: vec![Modifier {
                key: ModifierKey::Alt,
                action: "git diff --cached [input]".into(),
                subtitle: "staged".into(),
                valid: true,
            }],
        });
        let tree = vec![template];
        let mut arena = CommandArena::new();
        let roots = arena.intern_tree(&tree);

        let runner = ScriptedRunner::new();
        let items = materialize(&mut arena, roots[0], &runner, None);
        let textview = arena.command(items[0]).textview.as_ref().unwrap();
        assert_eq!(textview.command, "git diff --stat src/lib.rs");
        assert_eq!(textview.mods[0].action, "git diff --cached src/lib.rs");
    }

    #[test]
    fn test_untrimmed_values_keep_whitespace_in_action() {
        let mut template = selection(
            "say",
            "echo '[input_raw]'",
            ValueSource::Static(vec!["  hi".into()]),
        );
        template.trim_values = false;
        let tree = vec![template];
        let mut arena = CommandArena::new();
        let roots = arena.intern_tree(&tree);

        let runner = ScriptedRunner::new();
        let items = materialize(&mut arena, roots[0], &runner, None);
        assert_eq!(arena.title(items[0]), "hi");
        assert_eq!(arena.command(items[0]).action, "echo '  hi'");
    }

    #[test]
    fn test_inline_subcommand_values_become_siblings() {
        let mut branches = selection(
            "branches",
            "git checkout [input]",
            ValueSource::Command("git branch".into()),
        )
        .inline()
        .with_mods(vec![Modifier {
            key: ModifierKey::Cmd,
            action: "git branch -D [input]".into(),
            subtitle: "delete".into(),
            valid: true,
        }]);
        branches.values_icon = Some("fork.png".into());

        let tree = vec![Command::new("git", "")
            .with_subcommands(vec![Command::new("status", "git status"), branches])];
        let mut arena = CommandArena::new();
        let roots = arena.intern_tree(&tree);

        let runner = ScriptedRunner::new().with_output("git branch", "main\nfeature/x\n");
        let Expansion::Splice(ids) = expand(&mut arena, roots[0], &runner, Some(Path::new("/repo")))
        else {
            panic!("expected splice");
        };

        let titles: Vec<&str> = ids.iter().map(|&id| arena.title(id)).collect();
        assert_eq!(titles, vec!["status", "main", "feature/x"]);
        let feature = arena.command(ids[2]);
        assert_eq!(feature.action, "git checkout feature/x");
        assert_eq!(feature.mods[0].action, "git branch -D feature/x");
        assert_eq!(feature.icon.as_deref(), Some("fork.png"));
    }

    #[test]
    fn test_failing_inline_source_splices_nothing_for_it() {
        let tree = vec![Command::new("git", "").with_subcommands(vec![
            Command::new("status", "git status"),
            selection("branches", "git checkout [input]", ValueSource::Command("false".into()))
                .inline(),
        ])];
        let mut arena = CommandArena::new();
        let roots = arena.intern_tree(&tree);

        let runner = ScriptedRunner::new().with_failure("false");
        let Expansion::Splice(ids) = expand(&mut arena, roots[0], &runner, None) else {
            panic!("expected splice");
        };
        assert_eq!(ids.len(), 1);
        assert_eq!(arena.title(ids[0]), "status");
    }
}
