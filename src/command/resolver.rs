//! Query resolution - drives matching and expansion to a fixed point
//!
//! Pipeline per query:
//! input -> location match -> command match -> expand last match -> match
//! the next level -> ... until nothing new matches.

use crate::command::arena::{CommandArena, NodeId};
use crate::command::expansion::{expand, expand_level, Expansion};
use crate::command::matcher::{match_commands, match_location};
use crate::command::runner::CommandRunner;
use crate::command::template::TemplateContext;
use crate::core::config::ResolverConfig;
use crate::model::{Command, Location};

/// Outcome of resolving one query
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    location: Option<&'a Location>,
    arena: CommandArena<'a>,
    chain: Vec<NodeId>,
    unfinished_query: String,
    /// Commands offered at the level after the last match
    candidates: Vec<NodeId>,
}

impl<'a> Resolution<'a> {
    pub fn new(
        location: Option<&'a Location>,
        arena: CommandArena<'a>,
        chain: Vec<NodeId>,
        unfinished_query: String,
        candidates: Vec<NodeId>,
    ) -> Self {
        Self {
            location,
            arena,
            chain,
            unfinished_query,
            candidates,
        }
    }

    pub fn location(&self) -> Option<&'a Location> {
        self.location
    }

    pub fn arena(&self) -> &CommandArena<'a> {
        &self.arena
    }

    pub fn chain(&self) -> &[NodeId] {
        &self.chain
    }

    /// Matched commands, outermost first
    pub fn commands(&self) -> impl Iterator<Item = &Command> + '_ {
        self.chain.iter().map(|&id| self.arena.command(id))
    }

    pub fn last(&self) -> Option<NodeId> {
        self.chain.last().copied()
    }

    pub fn last_command(&self) -> Option<&Command> {
        self.last().map(|id| self.arena.command(id))
    }

    pub fn unfinished_query(&self) -> &str {
        &self.unfinished_query
    }

    pub fn candidates(&self) -> &[NodeId] {
        &self.candidates
    }

    /// Location title followed by the matched titles, minus `back` trailing commands
    pub fn current_path(&self, back: usize) -> String {
        let keep = self.chain.len().saturating_sub(back);
        join_path(
            self.location,
            self.chain[..keep].iter().map(|&id| self.arena.title(id)),
        )
    }

    /// Path used to autocomplete into `next`, always ending in a space
    pub fn path_with(&self, next: &str) -> String {
        let current = self.current_path(0);

        if !next.is_empty() && current.ends_with(next) {
            return format!("{} ", current);
        }

        match (current.is_empty(), next.is_empty()) {
            (false, false) => format!("{} {} ", current, next),
            (false, true) => format!("{} ", current),
            _ => format!("{} ", next),
        }
    }

    /// Title of the command `n` positions before the last match
    ///
    /// `n == 0` is the last match itself. Out of range gives an empty string.
    pub fn parent_title(&self, n: usize) -> &str {
        self.chain
            .len()
            .checked_sub(n + 1)
            .map(|idx| self.arena.title(self.chain[idx]))
            .unwrap_or("")
    }

    /// Template context for rendering `id`
    ///
    /// If `id` is part of the chain its lineage stops there; otherwise it is
    /// treated as a candidate one level below the last match.
    pub fn context_for(&self, id: NodeId) -> TemplateContext<'_> {
        let prefix = match self.chain.iter().position(|&c| c == id) {
            Some(pos) => &self.chain[..pos],
            None => &self.chain[..],
        };

        let mut lineage: Vec<&str> = prefix.iter().map(|&c| self.arena.title(c)).collect();
        lineage.push(self.arena.title(id));

        TemplateContext {
            location: self.location,
            lineage,
        }
    }
}

pub(crate) fn join_path<'t>(
    location: Option<&'t Location>,
    titles: impl Iterator<Item = &'t str>,
) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(loc) = location {
        parts.push(loc.title.as_str());
    }
    parts.extend(titles);
    parts.join(" ")
}

/// Resolves queries against a location list and a command tree
pub struct Resolver<'r> {
    config: &'r ResolverConfig,
    runner: &'r dyn CommandRunner,
}

impl<'r> Resolver<'r> {
    pub fn new(config: &'r ResolverConfig, runner: &'r dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Resolve a full query: location first, then commands
    pub fn resolve<'a>(
        &self,
        input: &str,
        locations: &'a [Location],
        commands: &'a [Command],
    ) -> Resolution<'a> {
        let (location, rest) = match_location(input, locations);
        self.resolve_commands(location, rest, commands)
    }

    /// Resolve the command part of a query once the location is known
    pub fn resolve_commands<'a>(
        &self,
        location: Option<&'a Location>,
        text: &str,
        commands: &'a [Command],
    ) -> Resolution<'a> {
        let cwd = location.map(|loc| loc.directory.as_path());

        let mut arena = CommandArena::new();
        let configured = arena.intern_tree(commands);
        let roots = expand_level(&mut arena, configured, self.runner, cwd);

        let mut working = roots.clone();
        let mut candidates = roots;
        let mut chain: Vec<NodeId> = Vec::new();
        let mut remainder = text.trim().to_string();
        let mut depth: usize = 1;

        loop {
            let (matched, rest) = {
                let titles: Vec<(NodeId, &str)> =
                    working.iter().map(|&id| (id, arena.title(id))).collect();
                let (matched, rest) =
                    match_commands(&remainder, &titles, depth.saturating_sub(chain.len()));
                (matched, rest.to_string())
            };

            if matched.is_empty() {
                break;
            }

            chain.extend(matched);
            remainder = rest;

            if chain.len() >= self.config.max_depth {
                tracing::debug!(depth = chain.len(), "Resolution reached max depth");
                candidates = Vec::new();
                break;
            }

            let Some(&last) = chain.last() else { break };
            match expand(&mut arena, last, self.runner, cwd) {
                Expansion::None => {
                    candidates = Vec::new();
                    break;
                }
                Expansion::Splice(children) => {
                    let unseen: Vec<NodeId> = children
                        .iter()
                        .copied()
                        .filter(|id| !working.contains(id))
                        .collect();
                    candidates = children;
                    if unseen.is_empty() {
                        break;
                    }
                    // Deeper levels win length ties against shallower ones
                    working = unseen.into_iter().chain(working).collect();
                }
                Expansion::Replace(items) => {
                    candidates = items.clone();
                    if items.is_empty() {
                        break;
                    }
                    working = items;
                }
            }

            depth += 1;
        }

        tracing::debug!(
            location = location.map(|l| l.title.as_str()),
            commands = chain.len(),
            unfinished = %remainder,
            "Resolved query"
        );

        Resolution::new(location, arena, chain, remainder, candidates)
    }
}
