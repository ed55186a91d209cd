//! External command execution
//!
//! Value lists, secondary actions, info output and computed subtitles all
//! come from shell commands. Callers treat every error from a runner as
//! "no output" and carry on.

use crate::core::config::ResolverConfig;
use crate::core::error::{LaunchError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Runs a command line and returns its stdout
pub trait CommandRunner {
    fn run(&self, command: &str, cwd: Option<&Path>) -> Result<String>;
}

/// Runs commands through `<shell> -c`, bounded by a timeout
pub struct ShellRunner {
    shell: String,
    timeout: Duration,
    runtime: Runtime,
}

impl ShellRunner {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            shell: config.shell.clone(),
            timeout: config.command_timeout,
            runtime,
        })
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, cwd: Option<&Path>) -> Result<String> {
        if command.trim().is_empty() {
            return Err(LaunchError::EmptyCommand);
        }

        let mut process = tokio::process::Command::new(&self.shell);
        process
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            process.current_dir(dir);
        }

        tracing::debug!(command = %command, cwd = ?cwd, "Running external command");

        let output = self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, process.output()).await })
            .map_err(|_| LaunchError::CommandTimeout {
                command: command.to_string(),
                timeout_ms: self.timeout.as_millis(),
            })??;

        if !output.status.success() {
            return Err(LaunchError::CommandFailed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Answers from a fixed table instead of spawning processes
///
/// Unknown commands fail like a missing executable. Every call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outputs: HashMap<String, Option<String>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.outputs.insert(command.into(), Some(output.into()));
        self
    }

    pub fn with_failure(mut self, command: impl Into<String>) -> Self {
        self.outputs.insert(command.into(), None);
        self
    }

    /// Commands run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &str, _cwd: Option<&Path>) -> Result<String> {
        self.calls.borrow_mut().push(command.to_string());

        match self.outputs.get(command) {
            Some(Some(output)) => Ok(output.clone()),
            Some(None) => Err(LaunchError::CommandFailed {
                command: command.to_string(),
                status: "exit status: 1".to_string(),
                stderr: String::new(),
            }),
            None => Err(LaunchError::CommandFailed {
                command: command.to_string(),
                status: "exit status: 127".to_string(),
                stderr: format!("{}: command not found", command),
            }),
        }
    }
}
