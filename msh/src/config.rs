use crate::parser::{DEFAULT_MAX_ARGS, DEFAULT_MAX_LINE_LEN, Limits};
use crate::process::job::DEFAULT_MAX_JOBS;
use crate::shell::APP_NAME;
use anyhow::Context as _;
use anyhow::Result;
use msh_types::MshError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_PROMPT: &str = "minishell> ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub prompt: String,
    /// Maximum number of concurrently tracked background jobs
    pub max_jobs: usize,
    pub max_line_len: usize,
    pub max_args: usize,
    /// Print the startup and shutdown banners in interactive mode
    pub banner: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            prompt: DEFAULT_PROMPT.to_string(),
            max_jobs: DEFAULT_MAX_JOBS,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_args: DEFAULT_MAX_ARGS,
            banner: true,
        }
    }
}

impl Config {
    pub fn parse(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("invalid config")?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Config::parse(&toml_str).with_context(|| format!("in {}", path.display()))
    }

    fn validate(&self) -> Result<(), MshError> {
        for (name, value) in [
            ("max_jobs", self.max_jobs),
            ("max_line_len", self.max_line_len),
            ("max_args", self.max_args),
        ] {
            if value == 0 {
                return Err(MshError::Config(format!("{name} must be greater than 0")));
            }
        }
        Ok(())
    }

    /// Loads the configuration.
    ///
    /// An explicit path must be readable and valid. Otherwise the XDG config file is
    /// used when present; a broken one is reported and the defaults are used instead.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Config::read_file(path);
        }

        let found = xdg::BaseDirectories::with_prefix(APP_NAME)
            .ok()
            .and_then(|dirs| dirs.find_config_file(CONFIG_FILE));
        let Some(path) = found else {
            debug!("no config file found, using defaults");
            return Ok(Config::default());
        };

        match Config::read_file(&path) {
            Ok(config) => {
                debug!("loaded config from {}", path.display());
                Ok(config)
            }
            Err(err) => {
                warn!("ignoring config {}: {:#}", path.display(), err);
                eprintln!("{}: ignoring config: {:#}", APP_NAME, err);
                Ok(Config::default())
            }
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_line_len: self.max_line_len,
            max_args: self.max_args,
        }
    }
}
