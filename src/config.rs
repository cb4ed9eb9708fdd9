//! Startup configuration.
//!
//! The config file path comes from the `CONFIG_PATH` environment variable,
//! or from `--config <path>` when that variable is unset. The file is JSON:
//!
//! ```json
//! {
//!   "env": "local",
//!   "storage_path": "storage/storage.db",
//!   "http_server": { "address": "localhost:8082" }
//! }
//! ```
//!
//! Every value is required. `ENV`, when set, overrides `env` and may stand
//! in for it entirely.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::Error;

/// Environment variable that overrides the `env` value from the file.
pub const ENV_OVERRIDE_VAR: &str = "ENV";

/// Environment variable naming the config file. Checked before `--config`.
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";

/// Command line interface of the `students-api` binary.
#[derive(Parser, Debug)]
#[command(name = "students-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    env: String,
    storage_path: PathBuf,
    http_server: HttpServerConfig,
}

#[derive(Debug, Deserialize)]
struct HttpServerConfig {
    address: String,
}

/// Flat configuration, populated once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Deployment environment name, e.g. `local` or `production`.
    pub env: String,
    /// SQLite database file.
    pub storage_path: PathBuf,
    /// `host:port` the server binds to.
    pub address: String,
}

impl Config {
    /// Resolves the path from `CONFIG_PATH` or `cli` and loads the file.
    pub fn from_cli(cli: &Cli) -> Result<Self, Error> {
        let path = resolve_path(std::env::var(CONFIG_PATH_VAR).ok(), cli)?;
        Self::load(path)
    }

    /// Loads and validates the config file at `path`, honouring `ENV`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file does not exist: {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|err| {
            Error::Config(format!("cannot read config file {}: {err}", path.display()))
        })?;
        Self::parse(&text, std::env::var(ENV_OVERRIDE_VAR).ok())
    }

    /// Parses config JSON. `env_override` replaces the file's `env` when set.
    pub fn parse(text: &str, env_override: Option<String>) -> Result<Self, Error> {
        let file: FileConfig = serde_json::from_str(text)
            .map_err(|err| Error::Config(format!("cannot parse config file: {err}")))?;

        let config = Self {
            env: env_override
                .filter(|env| !env.trim().is_empty())
                .unwrap_or(file.env),
            storage_path: file.storage_path,
            address: file.http_server.address,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        let missing = [
            ("env", self.env.trim().is_empty()),
            ("storage_path", self.storage_path.as_os_str().is_empty()),
            ("http_server.address", self.address.trim().is_empty()),
        ];
        match missing.iter().find(|(_, empty)| *empty) {
            Some((key, _)) => Err(Error::Config(format!("`{key}` must not be empty"))),
            None => Ok(()),
        }
    }
}

/// Picks the config path: a non-empty `env_path` wins over `--config`.
pub fn resolve_path(env_path: Option<String>, cli: &Cli) -> Result<PathBuf, Error> {
    env_path
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            cli.config
                .clone()
                .filter(|path| !path.as_os_str().is_empty())
        })
        .ok_or_else(|| Error::Config("config path is not set".to_string()))
}
