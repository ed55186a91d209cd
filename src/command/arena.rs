//! Index-addressed storage for the commands of one resolution
//!
//! Configured commands are borrowed into the arena once per query; ephemeral
//! commands generated from value lists are appended as owned nodes that point
//! back at the node they were generated from. Nothing in the arena is mutated
//! after it is pushed.

use crate::model::Command;
use std::borrow::Cow;

/// Handle to a node in a [`CommandArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct CommandNode<'a> {
    pub command: Cow<'a, Command>,
    /// Configured subcommands, already interned
    pub children: Vec<NodeId>,
    /// Template node this one was generated from (ephemeral nodes only)
    pub origin: Option<NodeId>,
}

impl CommandNode<'_> {
    pub fn is_ephemeral(&self) -> bool {
        self.origin.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandArena<'a> {
    nodes: Vec<CommandNode<'a>>,
}

impl<'a> CommandArena<'a> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Intern a configured command tree, returning the ids of its roots
    pub fn intern_tree(&mut self, commands: &'a [Command]) -> Vec<NodeId> {
        commands.iter().map(|cmd| self.intern(cmd)).collect()
    }

    fn intern(&mut self, command: &'a Command) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode {
            command: Cow::Borrowed(command),
            children: Vec::new(),
            origin: None,
        });
        let children = self.intern_tree(&command.subcommands);
        self.nodes[id.0].children = children;
        id
    }

    /// Add a generated command derived from `origin`
    pub fn push_ephemeral(&mut self, command: Command, origin: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode {
            command: Cow::Owned(command),
            children: Vec::new(),
            origin: Some(origin),
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &CommandNode<'a> {
        &self.nodes[id.0]
    }

    pub fn command(&self, id: NodeId) -> &Command {
        &self.nodes[id.0].command
    }

    pub fn title(&self, id: NodeId) -> &str {
        &self.nodes[id.0].command.title
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
