//! Resolver configuration with documented defaults
//!
//! Every tunable of the resolution pipeline lives here. Values come from the
//! optional `[settings]` table of the launcher config file; anything left out
//! falls back to [`ResolverConfig::default`].

use std::time::Duration;

/// Placeholder that `reload_template` must contain
pub const RELOAD_PATH_TOKEN: &str = "{path}";

/// Configuration for a single resolution run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Hard cap on the length of the matched command chain
    ///
    /// The expansion engine raises the matcher depth by one per pass, so this
    /// also bounds the number of external value-list calls per query.
    pub max_depth: usize,

    /// How long a value-producing or secondary-action command may run
    ///
    /// A command that exceeds this is killed and treated as producing no
    /// output.
    pub command_timeout: Duration,

    /// Shell used to run external commands (`<shell> -c <command>`)
    pub shell: String,

    /// Command text that replaces a `[reload]` marker in the full command
    ///
    /// `{path}` is replaced with the resolution path so the host UI can
    /// re-enter the resolver at that depth.
    pub reload_template: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            command_timeout: Duration::from_millis(5000),
            shell: "/bin/sh".to_string(),
            reload_template: format!("launchpad-reload \"{}\"", RELOAD_PATH_TOKEN),
        }
    }
}

impl ResolverConfig {
    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be at least 1".into());
        }

        if self.command_timeout.is_zero() {
            return Err("command_timeout must be positive".into());
        }

        if self.shell.trim().is_empty() {
            return Err("shell must not be empty".into());
        }

        if !self.reload_template.contains(RELOAD_PATH_TOKEN) {
            return Err(format!(
                "reload_template ({}) must contain {}",
                self.reload_template, RELOAD_PATH_TOKEN
            ));
        }

        Ok(())
    }
}
