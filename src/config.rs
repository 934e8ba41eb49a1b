use crate::eid::Eid;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "sqlite://preview.db";

/// Which metadata extractor serves `/extract-metadata`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Parse the submitted document.
    #[default]
    Html,
    /// Fixed placeholder record, whatever the input.
    Constant,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// `sqlite://<path>` or `sqlite::memory:`.
    /// Overridden by `DATABASE_URL`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub extractor: ExtractorKind,

    /// Answer every error with 500 instead of its own status code.
    #[serde(default)]
    pub uniform_error_status: bool,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_url: default_database_url(),
            extractor: ExtractorKind::default(),
            uniform_error_status: false,
            base_path: String::new(),
        }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            bail!("database_url must not be empty");
        }

        self.bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("bind_addr {:?} is not a socket address", self.bind_addr))?;

        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            if !database_url.is_empty() {
                self.database_url = database_url;
            }
        }

        if let Ok(bind_addr) = std::env::var("PREVIEW_API_BIND_ADDR") {
            if !bind_addr.is_empty() {
                self.bind_addr = bind_addr;
            }
        }
    }

    fn path(base_path: &str) -> PathBuf {
        PathBuf::from(base_path).join(CONFIG_FILE)
    }

    /// Loads `config.yaml` from `base_path`, writing defaults when it does not
    /// exist yet. Environment overrides are applied on top and never saved.
    pub fn load_with(base_path: &str) -> anyhow::Result<Self> {
        std::fs::create_dir_all(base_path)
            .with_context(|| format!("failed to create config dir {base_path}"))?;

        let path = Self::path(base_path);

        // create new if does not exist
        if !path.exists() {
            let config = Self {
                base_path: base_path.to_string(),
                ..Default::default()
            };
            config.save()?;
        }

        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str)
            .with_context(|| format!("{} is malformed", path.display()))?;

        config.base_path = base_path.to_string();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        config.apply_env();
        config.validate()?;

        log::info!(
            "config loaded from {}: bind_addr={} extractor={:?} uniform_error_status={}",
            path.display(),
            config.bind_addr,
            config.extractor,
            config.uniform_error_status
        );

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::path(&self.base_path);
        let temp_path = PathBuf::from(&self.base_path).join(format!("{}-{CONFIG_FILE}", Eid::new()));

        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(&temp_path, config_str.as_bytes())
            .with_context(|| format!("failed to write {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(())
    }
}
