use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use sar_core::RedactionMarker;
use sar_security::MatchMode;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Project-local config file name, looked up in the working directory
pub const LOCAL_CONFIG: &str = "sar.toml";

/// Configuration for sar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub marker: RedactionMarker,

    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: String,

    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Worker threads for the redaction stages (0 = one per core)
    #[serde(default)]
    pub jobs: usize,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub words: WordsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Extra case-insensitive glob patterns for metadata files to delete
    #[serde(default)]
    pub extra_metadata: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordsConfig {
    #[serde(default = "default_word_list")]
    pub list: PathBuf,

    #[serde(default)]
    pub match_mode: MatchMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker: RedactionMarker::default(),
            attachments_dir: default_attachments_dir(),
            state_dir: default_state_dir(),
            jobs: 0,
            normalize: NormalizeConfig::default(),
            words: WordsConfig::default(),
        }
    }
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            list: default_word_list(),
            match_mode: MatchMode::default(),
        }
    }
}

fn default_attachments_dir() -> String {
    "attachments".to_string()
}

fn default_state_dir() -> String {
    ".sar".to_string()
}

fn default_word_list() -> PathBuf {
    PathBuf::from("redact_words.txt")
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_or_create(&path),
            None => {
                warn!("No home directory found; using default config");
                Ok(Config::default())
            }
        }
    }

    /// Load `path`, or write the defaults there if it does not exist yet.
    ///
    /// Failing to write the default file only costs the next run a retry, so
    /// it is logged and the defaults are used.
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Config::default();
        if let Err(e) = config.save(path) {
            warn!("{:#}; using default config", e);
        }
        Ok(config)
    }

    /// Write this config as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write default config {}", path.display()))?;
        Ok(())
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// `--config` if given, else `./sar.toml`, else the per-user config
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            return Self::load_from(local);
        }

        Self::load()
    }

    /// Per-user config file path; `None` when there is no home directory
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "sar", "sar")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (key, value) in [
            ("attachments_dir", &self.attachments_dir),
            ("state_dir", &self.state_dir),
        ] {
            let mut components = Path::new(value).components();
            let single_name = matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            );
            if !single_name {
                anyhow::bail!("{} must be a single folder name, got '{}'", key, value);
            }
        }

        if self.attachments_dir.eq_ignore_ascii_case(&self.state_dir) {
            anyhow::bail!("attachments_dir and state_dir must differ");
        }

        Ok(())
    }
}
