//! Action templates
//!
//! Placeholders understood in action, modifier and quicklook templates:
//!
//! | placeholder            | replaced with                                        |
//! |------------------------|------------------------------------------------------|
//! | `[input]`              | parameter, spaces turned into underscores            |
//! | `[input_raw]`          | parameter as typed                                   |
//! | `[title]`              | parameter if present, else the command's title       |
//! | `[parent]`/`[parent:N]`| title N commands above this one (default 1)          |
//! | `[reload]`/`[reload:N]`| reload directive for the path minus N commands       |
//!
//! Templates are scanned once; substituted text is never rescanned, so a
//! parameter containing `[title]` stays literal. Any other bracketed text is
//! left alone.

use crate::command::resolver::join_path;
use crate::command::runner::CommandRunner;
use crate::core::config::{ResolverConfig, RELOAD_PATH_TOKEN};
use crate::model::Location;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1};
use nom::combinator::{map, map_res, opt, value};
use nom::sequence::{delimited, preceded};
use nom::{IResult, Parser};
use std::path::Path;

const INPUT: &str = "[input]";
const INPUT_RAW: &str = "[input_raw]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Input,
    InputRaw,
    Title,
    Parent(usize),
    Reload(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    Literal(&'t str),
    Placeholder(Placeholder),
}

fn offset(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |digits: &str| digits.parse::<usize>()).parse(input)
}

fn placeholder(input: &str) -> IResult<&str, Placeholder> {
    delimited(
        char('['),
        alt((
            value(Placeholder::InputRaw, tag("input_raw")),
            value(Placeholder::Input, tag("input")),
            value(Placeholder::Title, tag("title")),
            map(preceded(tag("parent"), opt(preceded(char(':'), offset))), |n| {
                Placeholder::Parent(n.unwrap_or(1))
            }),
            map(preceded(tag("reload"), opt(preceded(char(':'), offset))), |n| {
                Placeholder::Reload(n.unwrap_or(0))
            }),
        )),
        char(']'),
    )
    .parse(input)
}

/// Split a template into literal text and placeholders
pub fn parse_template(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(pos) = rest.find('[') {
        match placeholder(&rest[pos..]) {
            Ok((after, found)) => {
                if pos > 0 {
                    segments.push(Segment::Literal(&rest[..pos]));
                }
                segments.push(Segment::Placeholder(found));
                rest = after;
            }
            Err(_) => {
                segments.push(Segment::Literal(&rest[..=pos]));
                rest = &rest[pos + 1..];
            }
        }
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

/// Fill both parameter placeholders with `value`, leaving everything else
pub fn substitute_parameter(template: &str, value: &str) -> String {
    parse_template(template)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text.to_string(),
            Segment::Placeholder(Placeholder::Input) => value.replace(' ', "_"),
            Segment::Placeholder(Placeholder::InputRaw) => value.to_string(),
            Segment::Placeholder(other) => placeholder_text(other),
        })
        .collect()
}

fn placeholder_text(placeholder: Placeholder) -> String {
    match placeholder {
        Placeholder::Input => INPUT.to_string(),
        Placeholder::InputRaw => INPUT_RAW.to_string(),
        Placeholder::Title => "[title]".to_string(),
        Placeholder::Parent(n) => format!("[parent:{}]", n),
        Placeholder::Reload(n) => format!("[reload:{}]", n),
    }
}

/// Where in the resolution a template is being rendered
#[derive(Debug, Clone)]
pub struct TemplateContext<'c> {
    pub location: Option<&'c Location>,
    /// Titles from the outermost matched command down to the rendered one
    pub lineage: Vec<&'c str>,
}

impl<'c> TemplateContext<'c> {
    pub fn own_title(&self) -> &str {
        self.lineage.last().copied().unwrap_or("")
    }

    /// Title `n` commands above the rendered one; empty when out of range
    pub fn parent(&self, n: usize) -> &str {
        self.lineage
            .len()
            .checked_sub(n + 1)
            .map(|idx| self.lineage[idx])
            .unwrap_or("")
    }

    /// Location and lineage titles, minus `back` trailing commands
    pub fn path(&self, back: usize) -> String {
        let keep = self.lineage.len().saturating_sub(back);
        join_path(self.location, self.lineage[..keep].iter().copied())
    }
}

/// Result of rendering one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAction {
    /// Action text for display; reload markers removed
    pub text: String,
    /// Executable command: directory change, action, reload directive
    pub full_command: String,
    /// No parameter placeholder was left unfilled
    pub satisfied: bool,
}

/// Renders templates against a resolution context
pub struct ActionTemplate<'r> {
    config: &'r ResolverConfig,
    runner: &'r dyn CommandRunner,
}

impl<'r> ActionTemplate<'r> {
    pub fn new(config: &'r ResolverConfig, runner: &'r dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Render `template` for the command at the end of `ctx.lineage`
    ///
    /// With a `secondary` action its trimmed output fills the parameter
    /// placeholders and `parameter` is ignored.
    pub fn render(
        &self,
        template: &str,
        parameter: Option<&str>,
        secondary: Option<&str>,
        ctx: &TemplateContext<'_>,
    ) -> RenderedAction {
        let secondary_value = secondary.map(|command| self.secondary_value(command, ctx));
        let parameter = match secondary_value {
            Some(_) => None,
            None => parameter.filter(|p| !p.is_empty()),
        };

        let mut text = String::with_capacity(template.len());
        let mut full = String::with_capacity(template.len());
        let mut satisfied = true;

        for segment in parse_template(template) {
            let (shown, executed) = match segment {
                Segment::Literal(literal) => (literal.to_string(), None),
                Segment::Placeholder(p @ (Placeholder::Input | Placeholder::InputRaw)) => {
                    match (&secondary_value, parameter) {
                        (Some(value), _) => (value.clone(), None),
                        (None, Some(param)) if p == Placeholder::Input => {
                            (param.replace(' ', "_"), None)
                        }
                        (None, Some(param)) => (param.to_string(), None),
                        (None, None) => {
                            satisfied = false;
                            (placeholder_text(p), None)
                        }
                    }
                }
                Segment::Placeholder(Placeholder::Title) => {
                    (parameter.unwrap_or(ctx.own_title()).to_string(), None)
                }
                Segment::Placeholder(Placeholder::Parent(n)) => (ctx.parent(n).to_string(), None),
                Segment::Placeholder(Placeholder::Reload(n)) => (
                    String::new(),
                    Some(self.config.reload_template.replace(RELOAD_PATH_TOKEN, &ctx.path(n))),
                ),
            };

            match executed {
                Some(directive) => full.push_str(&directive),
                None => full.push_str(&shown),
            }
            text.push_str(&shown);
        }

        let full_command = match ctx.location {
            Some(location) => format!("{}{}", cd_prefix(&location.directory), full),
            None => full,
        };

        RenderedAction {
            text: text.trim().to_string(),
            full_command,
            satisfied,
        }
    }

    fn secondary_value(&self, command: &str, ctx: &TemplateContext<'_>) -> String {
        let cwd = ctx.location.map(|loc| loc.directory.as_path());
        match self.runner.run(command, cwd) {
            Ok(output) => output.trim().to_string(),
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "Secondary action failed");
                String::new()
            }
        }
    }
}

/// `cd '<dir>'; ` with the directory quoted for a POSIX shell
pub fn cd_prefix(directory: &Path) -> String {
    format!("cd {}; ", shell_quote(&directory.to_string_lossy()))
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}
