//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then `<meta_dir>/config.toml`,
//! then environment variables (a `.env` file is honored through `dotenvy`),
//! then command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::search::client::{DEFAULT_REQUEST_TIMEOUT, ServerAddr};
use crate::ui::components::theme::Theme;

pub const ENV_HOST: &str = "TBRUSH_HOST";
pub const ENV_PORT: &str = "TBRUSH_PORT";
pub const ENV_NOTES_DIR: &str = "TBRUSH_NOTES_DIR";
pub const ENV_META_DIR: &str = "TBRUSH_META_DIR";
pub const ENV_TIMEOUT_MS: &str = "TBRUSH_TIMEOUT_MS";
pub const ENV_THEME: &str = "TBRUSH_THEME";
pub const ENV_EDITOR: &str = "EDITOR";

const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "out.log";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    NoHome,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Keys accepted in `config.toml`. All optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    notes_dir: Option<PathBuf>,
    timeout_ms: Option<u64>,
    editor: Option<String>,
    theme: Option<Theme>,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub notes_dir: Option<PathBuf>,
    pub meta_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerAddr,
    pub notes_dir: PathBuf,
    /// Scratch files, the log file and `config.toml` live here.
    pub meta_dir: PathBuf,
    pub editor: Option<String>,
    pub request_timeout: Duration,
    pub theme: Theme,
}

impl Config {
    pub fn defaults(home: &Path) -> Self {
        Self {
            server: ServerAddr::default(),
            notes_dir: home.join("Dropbox").join("tbrush_notes"),
            meta_dir: home.join(".toothbrush_meta"),
            editor: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            theme: Theme::default(),
        }
    }

    /// Resolve against the real home directory and process environment.
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let home = directories::BaseDirs::new()
            .ok_or(ConfigError::NoHome)?
            .home_dir()
            .to_path_buf();
        Self::resolve(&home, overrides, |key| dotenvy::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve(
        home: &Path,
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut cfg = Self::defaults(home);

        // The config file lives in the metadata dir, so that one is settled first.
        if let Some(dir) = env(ENV_META_DIR) {
            cfg.meta_dir = PathBuf::from(dir);
        }
        if let Some(dir) = &overrides.meta_dir {
            cfg.meta_dir = dir.clone();
        }

        let path = cfg.config_path();
        if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let file: FileConfig =
                toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;
            cfg.apply_file(file);
        }

        cfg.apply_env(&env);
        cfg.apply_overrides(overrides);
        Ok(cfg)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(host) = file.host {
            self.server.host = host;
        }
        if let Some(port) = file.port {
            self.server.port = port;
        }
        if let Some(dir) = file.notes_dir {
            self.notes_dir = dir;
        }
        if let Some(ms) = file.timeout_ms {
            self.request_timeout = Duration::from_millis(ms);
        }
        if file.editor.is_some() {
            self.editor = file.editor;
        }
        if let Some(theme) = file.theme {
            self.theme = theme;
        }
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) {
        if let Some(host) = env(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(val) = env(ENV_PORT) {
            match val.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("ignoring {ENV_PORT}={val:?}: not a port number"),
            }
        }
        if let Some(dir) = env(ENV_NOTES_DIR) {
            self.notes_dir = PathBuf::from(dir);
        }
        if let Some(val) = env(ENV_TIMEOUT_MS) {
            match val.parse::<u64>() {
                Ok(ms) => self.request_timeout = Duration::from_millis(ms),
                Err(_) => warn!("ignoring {ENV_TIMEOUT_MS}={val:?}: not a number"),
            }
        }
        if let Some(val) = env(ENV_THEME) {
            match Theme::parse(&val) {
                Some(theme) => self.theme = theme,
                None => warn!("ignoring {ENV_THEME}={val:?}: expected dark or light"),
            }
        }
        if let Some(editor) = env(ENV_EDITOR).filter(|e| !e.trim().is_empty()) {
            self.editor = Some(editor);
        }
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(host) = &overrides.host {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(dir) = &overrides.notes_dir {
            self.notes_dir = dir.clone();
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.meta_dir.join(CONFIG_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.meta_dir.join(LOG_FILE)
    }

    /// Create the notes and metadata directories if they are missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.notes_dir)?;
        std::fs::create_dir_all(&self.meta_dir)?;
        Ok(())
    }
}
