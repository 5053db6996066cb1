use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::map::{MapTable, DEFAULT_MAP_IMAGE_BASE_URL};
use crate::presence::MapTableStore;
use crate::telemetry::DEFAULT_API_URL;

const SETTINGS_DIR: &str = "wt-presence";
const SETTINGS_FILE: &str = "config.json";
const MANIFEST_TIMEOUT: Duration = Duration::from_secs(3);

pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/ajaniceman/WarThunderRPC/main/map_manifest.json";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_manifest_url() -> String {
    DEFAULT_MANIFEST_URL.to_string()
}

fn default_map_image_base_url() -> String {
    DEFAULT_MAP_IMAGE_BASE_URL.to_string()
}

/// Contents of `config.json`. The upper-case keys match files written by
/// earlier releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(rename = "APP_ID", default)]
    pub app_id: Option<String>,
    #[serde(rename = "MAP_HASHES", default)]
    pub map_hashes: MapTable,
    #[serde(rename = "VEHICLE_OVERRIDES", default)]
    pub vehicle_overrides: BTreeMap<String, String>,
    #[serde(rename = "API_URL", default = "default_api_url")]
    pub api_url: String,
    #[serde(rename = "POLL_INTERVAL_SECS", default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(rename = "MANIFEST_URL", default = "default_manifest_url")]
    pub manifest_url: String,
    #[serde(rename = "MAP_IMAGE_BASE_URL", default = "default_map_image_base_url")]
    pub map_image_base_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_id: None,
            map_hashes: MapTable::new(),
            vehicle_overrides: BTreeMap::new(),
            api_url: default_api_url(),
            poll_interval_secs: default_poll_interval(),
            manifest_url: default_manifest_url(),
            map_image_base_url: default_map_image_base_url(),
        }
    }
}

impl AppSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Replaces the fingerprint table with `remote ∪ local`, local winning.
    pub fn merge_remote_maps(&mut self, remote: &MapTable) {
        self.map_hashes = MapTable::merged(remote, &self.map_hashes);
    }

    pub fn require_app_id(&self) -> Result<&str> {
        self.app_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingAppId)
    }
}

/// Reads and writes the settings file at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir().ok_or(Error::NoConfigDir)?;
        Ok(Self::new(dir.join(SETTINGS_DIR).join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, falling back to defaults when the file is
    /// missing or cannot be parsed.
    pub fn load(&self) -> AppSettings {
        tracing::debug!("Loading settings from {}", self.path.display());

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No settings file yet, using defaults");
                return AppSettings::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read settings file, using defaults: {}", e);
                return AppSettings::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to parse settings file, using defaults: {}", e);
                AppSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &AppSettings) -> Result<()> {
        tracing::debug!("Saving settings to {}", self.path.display());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl MapTableStore for SettingsStore {
    fn save_map_table(&self, table: &MapTable) -> Result<()> {
        let mut settings = self.load();
        settings.map_hashes = table.clone();
        self.save(&settings)?;
        tracing::info!(
            "Saved {} map fingerprints to {}",
            table.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "MAP_HASHES", default)]
    map_hashes: MapTable,
}

/// Downloads the shared fingerprint manifest.
pub async fn fetch_manifest(url: &str) -> Result<MapTable> {
    let client = reqwest::Client::builder()
        .timeout(MANIFEST_TIMEOUT)
        .build()
        .map_err(Error::HttpClient)?;

    let manifest: Manifest = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(Error::Manifest)?
        .json()
        .await
        .map_err(Error::Manifest)?;

    tracing::info!(
        "Map manifest downloaded with {} entries",
        manifest.map_hashes.len()
    );
    Ok(manifest.map_hashes)
}

/// Loads local settings, merges the remote manifest when requested and
/// writes the merged result back.
pub async fn load_merged(store: &SettingsStore, use_manifest: bool) -> Result<AppSettings> {
    let mut settings = store.load();

    if use_manifest {
        match fetch_manifest(&settings.manifest_url).await {
            Ok(remote) => settings.merge_remote_maps(&remote),
            Err(e) => tracing::warn!("Using local map table only: {}", e),
        }
    }

    store.save(&settings)?;
    Ok(settings)
}
