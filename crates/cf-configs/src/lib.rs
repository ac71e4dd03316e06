//! # cf-configs
//!
//! Layered settings for the community forum binary. Later layers win:
//! 1. built-in defaults
//! 2. `forum.toml` in the working directory, or the file passed explicitly
//! 3. `FORUM__<SECTION>__<KEY>` environment variables (a `.env` file is
//!    loaded into the environment first)

use std::path::{Path, PathBuf};

use cf_core::store::{ReplyParentPolicy, StoreOptions, DEFAULT_REPLY_AUTHOR, POSTS_STORAGE_KEY};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Session-only; nothing survives the process.
    Memory,
    /// Files under `data_dir`.
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForumSettings {
    pub posts_key: String,
    pub default_author: String,
    pub reply_parents: ReplyParentPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directives; `RUST_LOG` overrides this when set
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub forum: ForumSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Loads all layers. `path`, when given, must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "loaded .env");
        }

        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name("forum").required(false),
        };
        let builder = Self::defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix("FORUM").separator("__"));
        Self::finish(builder.build()?)
    }

    /// Defaults overlaid with a TOML document; no files or environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder.build()?)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("storage.backend", "local")?
            .set_default("storage.data_dir", "./data/forum")?
            .set_default("forum.posts_key", POSTS_STORAGE_KEY)?
            .set_default("forum.default_author", DEFAULT_REPLY_AUTHOR)?
            .set_default("forum.reply_parents", "permissive")?
            .set_default("log.filter", "info")?
            .set_default("log.format", "text")?)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.forum.posts_key.trim().is_empty() {
            return Err(ConfigError::Invalid("forum.posts_key", "must not be empty".into()));
        }
        if self.forum.default_author.trim().is_empty() {
            return Err(ConfigError::Invalid("forum.default_author", "must not be empty".into()));
        }
        if self.storage.backend == StorageBackend::Local
            && self.storage.data_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "storage.data_dir",
                "required for the local backend".into(),
            ));
        }
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            posts_key: self.forum.posts_key.clone(),
            default_author: self.forum.default_author.clone(),
            reply_parents: self.forum.reply_parents,
        }
    }
}
