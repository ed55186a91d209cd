//! Query listing for the host UI
//!
//! Runs one query through the resolver and turns the outcome into result
//! items: locations while none is matched, commands while the query is still
//! picking one, and the rendered action once a command is fully specified.

use crate::command::arena::NodeId;
use crate::command::matcher::match_location;
use crate::command::resolver::{Resolution, Resolver};
use crate::command::runner::CommandRunner;
use crate::command::template::{ActionTemplate, TemplateContext};
use crate::model::{Command, CommandKind, LaunchConfig, Location, Subtitle, TextView};
use crate::ui::item::{ItemList, ModItem, ResultItem, TextItem, NEEDS_INPUT_SUFFIX};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

const LOCATION_ICON: &str = "folder.png";

/// Shown when the configuration has no locations at all
pub const TEMPLATE_CONFIG: &str = r#"[[locations]]
title = "Repo 1"
path = "$HOME/dev/repo1"

[[locations]]
title = "Repo 2"
path = "/path/to/repo2"
"#;

/// What a query resolved to, before rendering
#[derive(Debug)]
pub enum QueryOutcome<'a> {
    /// No locations configured; nothing can resolve
    Misconfigured,
    /// No location title prefixes the query
    NoLocation {
        matches: Vec<&'a Location>,
        query: String,
    },
    Resolved(Resolution<'a>),
}

/// Machine-readable summary of a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    pub misconfigured: bool,
    pub location: Option<String>,
    pub commands: Vec<String>,
    pub unfinished_query: String,
    /// Rendered action of the last matched command, when it has one
    pub action: Option<String>,
    pub full_command: Option<String>,
    pub runnable: bool,
}

/// Resolves queries against a loaded configuration
pub struct Launcher<'r> {
    config: &'r LaunchConfig,
    runner: &'r dyn CommandRunner,
}

impl<'r> Launcher<'r> {
    pub fn new(config: &'r LaunchConfig, runner: &'r dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Resolve `query` and hand the outcome to `f`
    ///
    /// The working command list may be merged per query, so the outcome only
    /// lives for the duration of the callback.
    pub fn with_outcome<R>(&self, query: &str, f: impl FnOnce(QueryOutcome<'_>) -> R) -> R {
        let locations = &self.config.locations;
        if locations.is_empty() {
            tracing::warn!("No locations configured");
            return f(QueryOutcome::Misconfigured);
        }

        let (location, rest) = match_location(query, locations);
        let Some(location) = location else {
            let needle = rest.to_lowercase();
            let matches = locations
                .iter()
                .filter(|loc| loc.title.to_lowercase().contains(&needle))
                .collect();
            return f(QueryOutcome::NoLocation {
                matches,
                query: rest.to_string(),
            });
        };

        let commands = self.commands_for(location);
        let resolution = Resolver::new(&self.config.settings, self.runner).resolve_commands(
            Some(location),
            rest,
            &commands,
        );
        f(QueryOutcome::Resolved(resolution))
    }

    /// Global commands merged with the location's own command file
    ///
    /// Location commands shadow global ones with the same title.
    pub fn commands_for<'l>(&self, location: &'l Location) -> Cow<'l, [Command]>
    where
        'r: 'l,
    {
        if location.actions_path.is_none() {
            return Cow::Borrowed(self.config.commands.as_slice());
        }

        let local = &location.commands;
        if !location.show_default_commands {
            return Cow::Borrowed(local.as_slice());
        }

        let mut merged: Vec<Command> = self
            .config
            .commands
            .iter()
            .filter(|global| {
                !local
                    .iter()
                    .any(|own| own.title.to_lowercase() == global.title.to_lowercase())
            })
            .cloned()
            .collect();
        merged.extend(local.iter().cloned());
        Cow::Owned(merged)
    }

    /// Items for the host UI
    pub fn items(&self, query: &str) -> ItemList {
        let items = self.with_outcome(query, |outcome| match outcome {
            QueryOutcome::Misconfigured => vec![misconfigured_item()],
            QueryOutcome::NoLocation { matches, .. } => {
                matches.into_iter().map(location_item).collect()
            }
            QueryOutcome::Resolved(resolution) => self.resolution_items(&resolution),
        });
        ItemList { items }
    }

    /// Location, matched titles and rendered action for `query`
    pub fn summarize(&self, query: &str) -> ResolutionSummary {
        self.with_outcome(query, |outcome| match outcome {
            QueryOutcome::Misconfigured => ResolutionSummary {
                misconfigured: true,
                location: None,
                commands: Vec::new(),
                unfinished_query: query.trim().to_string(),
                action: None,
                full_command: None,
                runnable: false,
            },
            QueryOutcome::NoLocation { query, .. } => ResolutionSummary {
                misconfigured: false,
                location: None,
                commands: Vec::new(),
                unfinished_query: query,
                action: None,
                full_command: None,
                runnable: false,
            },
            QueryOutcome::Resolved(resolution) => self.summary_for(&resolution),
        })
    }

    fn summary_for(&self, resolution: &Resolution<'_>) -> ResolutionSummary {
        let mut summary = ResolutionSummary {
            misconfigured: false,
            location: resolution.location().map(|loc| loc.title.clone()),
            commands: resolution.commands().map(|cmd| cmd.title.clone()).collect(),
            unfinished_query: resolution.unfinished_query().to_string(),
            action: None,
            full_command: None,
            runnable: false,
        };

        let Some(last) = resolution.last() else {
            return summary;
        };
        let command = resolution.arena().command(last);
        if !command.kind.is_actionable() || command.is_selection() {
            return summary;
        }

        let parameter = parameter_for(resolution, command);
        let rendered = ActionTemplate::new(&self.config.settings, self.runner).render(
            &command.action,
            parameter,
            command.secondary_action.as_deref(),
            &resolution.context_for(last),
        );

        summary.runnable = rendered.satisfied
            && resolution.arena().node(last).children.is_empty()
            && (parameter.is_some() || !matches!(command.kind, CommandKind::NeedsParameter));
        summary.action = Some(rendered.text);
        summary.full_command = Some(rendered.full_command);

        summary
    }

    fn resolution_items(&self, resolution: &Resolution<'_>) -> Vec<ResultItem> {
        let query = resolution.unfinished_query().to_lowercase();

        let last = match resolution.last() {
            Some(last) if resolution.candidates().is_empty() => last,
            _ => {
                return resolution
                    .candidates()
                    .iter()
                    .copied()
                    .filter(|&id| resolution.arena().title(id).to_lowercase().contains(&query))
                    .map(|id| self.command_item(resolution, id, None))
                    .collect();
            }
        };

        let command = resolution.arena().command(last);
        match &command.kind {
            CommandKind::InlineList => {
                let output = self.output_of(&command.action, resolution.location());
                output
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && line.to_lowercase().contains(&query))
                    .map(|line| {
                        let mut item = ResultItem::new(line, resolution.path_with(line))
                            .with_icon(command.values_icon.as_deref());
                        item.text = Some(TextItem {
                            copy: line.to_string(),
                            largetype: line.to_string(),
                        });
                        item
                    })
                    .collect()
            }
            // Value list came back empty or failed
            CommandKind::NeedsSelection(_) => Vec::new(),
            _ => vec![self.command_item(resolution, last, parameter_for(resolution, command))],
        }
    }

    fn command_item(
        &self,
        resolution: &Resolution<'_>,
        id: NodeId,
        parameter: Option<&str>,
    ) -> ResultItem {
        let arena = resolution.arena();
        let command = arena.command(id);
        let ctx = resolution.context_for(id);
        let location = resolution.location();
        let path = ctx.path(0);

        let mut item = ResultItem::new(command.title.clone(), format!("{} ", path))
            .with_icon(command.icon.as_deref());
        item.uid = (!command.skip_smart_sort).then(|| path.clone());

        let mut needs_input = command.is_selection() || !arena.node(id).children.is_empty();

        match &command.kind {
            CommandKind::InfoOnly => {
                let output = self.output_of(&command.action, location);
                item.subtitle = output.clone();
                item.text = Some(TextItem {
                    copy: output.clone(),
                    largetype: output,
                });
            }
            CommandKind::InlineList => {
                item.subtitle = self.subtitle_of(command, location);
                needs_input = true;
            }
            _ if needs_input => {
                item.subtitle = self.subtitle_of(command, location);
            }
            kind => {
                let engine = ActionTemplate::new(&self.config.settings, self.runner);
                let secondary = command.secondary_action.as_deref();
                let rendered = engine.render(&command.action, parameter, secondary, &ctx);

                let has_parameter = parameter.is_some_and(|p| !p.is_empty());
                item.valid = rendered.satisfied
                    && (has_parameter || !matches!(kind, CommandKind::NeedsParameter));
                needs_input = !item.valid;

                let configured = self.subtitle_of(command, location);
                item.subtitle = if configured.is_empty() {
                    format!("runs `{}`", rendered.text)
                } else {
                    configured
                };
                item.arg = rendered.full_command;

                for modifier in &command.mods {
                    let alt = engine.render(&modifier.action, parameter, secondary, &ctx);
                    item.mods.insert(
                        modifier.key.as_str().to_string(),
                        ModItem {
                            valid: modifier.valid && alt.satisfied,
                            arg: alt.full_command,
                            subtitle: modifier.subtitle.clone(),
                            variables: BTreeMap::new(),
                        },
                    );
                }

                item.quicklookurl = command
                    .quicklook_url
                    .as_deref()
                    .map(|url| engine.render(url, parameter, None, &ctx).text);

                if let Some(textview) = &command.textview {
                    for (key, mod_item) in item.mods.iter_mut() {
                        mod_item.variables.insert("is_mod".to_string(), key.clone());
                    }
                    item.variables =
                        textview_variables(&engine, textview, parameter, secondary, &ctx);
                }
            }
        }

        if needs_input {
            item.title.push_str(NEEDS_INPUT_SUFFIX);
        }
        item
    }

    fn subtitle_of(&self, command: &Command, location: Option<&Location>) -> String {
        match &command.subtitle {
            Subtitle::Text(text) => text.clone(),
            Subtitle::Command(cmd) => self.output_of(cmd, location),
        }
    }

    fn output_of(&self, command: &str, location: Option<&Location>) -> String {
        let cwd = location.map(|loc| loc.directory.as_path());
        match self.runner.run(command, cwd) {
            Ok(output) => output.trim().to_string(),
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "Display command failed");
                String::new()
            }
        }
    }
}

/// `tv_command` plus `tv_<mod>_action` and `tv_<mod>_action_subtitle` per modifier
fn textview_variables(
    engine: &ActionTemplate<'_>,
    textview: &TextView,
    parameter: Option<&str>,
    secondary: Option<&str>,
    ctx: &TemplateContext<'_>,
) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();
    let command = engine.render(&textview.command, parameter, secondary, ctx);
    variables.insert("tv_command".to_string(), command.full_command.trim().to_string());

    for modifier in &textview.mods {
        let key = modifier.key.as_str();
        let action = engine.render(&modifier.action, parameter, secondary, ctx);
        variables.insert(format!("tv_{}_action", key), action.full_command.trim().to_string());
        variables.insert(
            format!("tv_{}_action_subtitle", key),
            modifier.subtitle.trim().to_string(),
        );
    }
    variables
}

/// The unfinished query is the parameter of a command that asks for one
fn parameter_for<'q>(resolution: &'q Resolution<'_>, command: &Command) -> Option<&'q str> {
    let query = resolution.unfinished_query();
    (matches!(command.kind, CommandKind::NeedsParameter) && !query.is_empty()).then_some(query)
}

fn misconfigured_item() -> ResultItem {
    let mut item = ResultItem::new("No locations configured", "");
    item.uid = None;
    item.subtitle = "Press enter to copy a template configuration".to_string();
    item.arg = TEMPLATE_CONFIG.to_string();
    item.valid = true;
    item
}

fn location_item(location: &Location) -> ResultItem {
    let directory = location.directory.display().to_string();
    let mut item = ResultItem::new(location.title.clone(), format!("{} ", location.title))
        .with_icon(Some(LOCATION_ICON));
    item.subtitle = directory.clone();
    item.arg = directory;
    item
}
