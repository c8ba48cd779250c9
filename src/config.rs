use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::store::DEFAULT_USER;

pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_DATA_DIR: &str = ".lexdesk";

pub const ENV_USER: &str = "LEXDESK_USER";
pub const ENV_DOWNLOAD_DELAY: &str = "LEXDESK_DOWNLOAD_DELAY_MS";
pub const ENV_LOG: &str = "LEXDESK_LOG";

/// Runtime configuration, read from `<data_dir>/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the snapshot database and downloads live
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Seeds the current user of a fresh catalog
    pub current_user: String,
    /// User named by `--user` or `LEXDESK_USER`; replaces the persisted user
    #[serde(skip)]
    pub acting_user: Option<String>,
    /// Delay between "download started" and "download completed"
    pub download_delay_ms: u64,
    /// Origin used to build share links
    pub share_base_url: String,
    /// Reject blank titles and names at the store boundary
    pub strict_validation: bool,
    /// Results listed per section in search dialogs
    pub results_preview: usize,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            current_user: DEFAULT_USER.to_string(),
            acting_user: None,
            download_delay_ms: 2000,
            share_base_url: "http://localhost".to_string(),
            strict_validation: true,
            results_preview: 3,
            log_filter: crate::logging::DEFAULT_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load `<data_dir>/config.yaml` if present, then apply environment overrides.
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with_env(data_dir, |key| std::env::var(key).ok())
    }

    pub fn load_with_env(data_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let mut config: Config = if path.exists() {
            serde_yaml::from_str(&fs::read_to_string(&path)?)?
        } else {
            Config::default()
        };
        config.data_dir = data_dir.to_path_buf();
        config.apply_env(env);
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(user) = env(ENV_USER).filter(|u| !u.trim().is_empty()) {
            self.acting_user = Some(user);
        }
        if let Some(raw) = env(ENV_DOWNLOAD_DELAY) {
            match raw.trim().parse() {
                Ok(ms) => self.download_delay_ms = ms,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_DOWNLOAD_DELAY),
            }
        }
        if let Some(filter) = env(ENV_LOG).filter(|f| !f.trim().is_empty()) {
            self.log_filter = filter;
        }
    }

    /// Where downloaded and exported files are written
    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir.join("downloads")
    }

    pub fn download_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.download_delay_ms)
    }

    /// Share link for a document
    pub fn share_link(&self, id: &str) -> String {
        format!("{}/document/{}", self.share_base_url.trim_end_matches('/'), id)
    }
}
