//! Runtime configuration: `.env` discovery and environment lookup.
//!
//! A `.env` file is looked for, in order, at the explicit `--config` path, the
//! current directory, `<config dir>/boardhand/.env`, and next to the
//! executable. The first one found is loaded with `dotenvy`; variables already
//! present in the process environment always win.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

pub const ENV_FILE: &str = ".env";
const APP_DIR: &str = "boardhand";

pub const TRELLO_API_KEY: &str = "TRELLO_API_KEY";
pub const TRELLO_API_TOKEN: &str = "TRELLO_API_TOKEN";
pub const TRELLO_BOARD_ID: &str = "TRELLO_BOARD_ID";
pub const CODEX_COMMAND: &str = "BOARDHAND_CODEX_COMMAND";
pub const CLAUDE_COMMAND: &str = "BOARDHAND_CLAUDE_COMMAND";
pub const LOG_PATH: &str = "BOARDHAND_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Everything the session needs from the environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    /// The `.env` file that was loaded, if any.
    pub source: Option<PathBuf>,
    pub trello_key: String,
    pub trello_token: String,
    pub board_id: Option<String>,
    pub codex_cmd: Vec<String>,
    pub claude_cmd: Vec<String>,
    pub log_path: Option<PathBuf>,
}

impl std::fmt::Debug for LoadedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedConfig")
            .field("source", &self.source)
            .field("trello_key", &redact(&self.trello_key))
            .field("trello_token", &redact(&self.trello_token))
            .field("board_id", &self.board_id)
            .field("codex_cmd", &self.codex_cmd)
            .field("claude_cmd", &self.claude_cmd)
            .field("log_path", &self.log_path)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl LoadedConfig {
    /// Build from a variable lookup. Blank values count as unset.
    pub fn from_lookup(source: Option<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            source,
            trello_key: get(TRELLO_API_KEY).unwrap_or_default(),
            trello_token: get(TRELLO_API_TOKEN).unwrap_or_default(),
            board_id: get(TRELLO_BOARD_ID),
            codex_cmd: parse_command(get(CODEX_COMMAND).as_deref(), "codex"),
            claude_cmd: parse_command(get(CLAUDE_COMMAND).as_deref(), "claude"),
            log_path: get(LOG_PATH).map(PathBuf::from),
        }
    }

    pub fn auth_configured(&self) -> bool {
        !self.trello_key.is_empty() && !self.trello_token.is_empty()
    }
}

/// Parse a JSON argv array, falling back to `[default]` when absent or invalid.
pub fn parse_command(raw: Option<&str>, default: &str) -> Vec<String> {
    let fallback = || vec![default.to_string()];
    let Some(raw) = raw else {
        return fallback();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(argv) if argv.first().is_some_and(|p| !p.trim().is_empty()) => argv,
        Ok(_) => {
            warn!(default, "empty agent command; using default");
            fallback()
        }
        Err(error) => {
            warn!(%error, default, "agent command is not a JSON string array; using default");
            fallback()
        }
    }
}

/// Candidate locations to search, in priority order.
pub struct SearchPaths {
    pub cwd: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub exe_dir: Option<PathBuf>,
}

impl SearchPaths {
    pub fn from_system() -> Self {
        Self {
            cwd: std::env::current_dir().ok(),
            config_dir: dirs::config_dir().map(|d| d.join(APP_DIR)),
            exe_dir: std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf)),
        }
    }
}

/// Find the `.env` file to load. An explicit path must exist.
pub fn discover_env_file(
    explicit: Option<&Path>,
    search: &SearchPaths,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }
    let found = [&search.cwd, &search.config_dir, &search.exe_dir]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(ENV_FILE))
        .find(|p| p.is_file());
    Ok(found)
}

/// Discover and load the `.env` file, then read the process environment.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let source = discover_env_file(explicit, &SearchPaths::from_system())?;
    if let Some(path) = &source {
        dotenvy::from_path(path).map_err(|source| ConfigError::Load {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "loaded env file");
    }
    Ok(LoadedConfig::from_lookup(source, |name| std::env::var(name).ok()))
}
