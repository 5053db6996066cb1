//! Map identification from the fingerprint of the minimap image

mod display;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use display::{MapAsset, MapDisplay};

/// Fingerprint of the menu/hangar background served in place of a minimap.
pub const HANGAR_FINGERPRINT: &str =
    "cfb99c04947c94c19d4c523c1e0fb3a2d71d403263fefcad5f4c4fc8485d07d0";

pub const DEFAULT_MAP_IMAGE_BASE_URL: &str =
    "https://raw.githubusercontent.com/ajaniceman/WarThunderRPC/main/mapPictures/";

const PLACEHOLDER_LABEL: &str = "unknown_map";
const MAP_IMAGE_EXTENSION: &str = ".jpg";
const HANGAR_TABLE_VALUE: &str = "Hangar";

/// SHA-256 of the raw map image bytes, lower-case hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_image(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self(hex::encode(Sha256::digest(bytes))))
    }

    pub fn from_hex(hex: &str) -> Self {
        Self(hex.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }

    pub fn is_hangar(&self) -> bool {
        self.0 == HANGAR_FINGERPRINT
    }
}

/// Fingerprint to asset key or image URL. An empty value marks a map that
/// has been seen but not named yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapTable(BTreeMap<String, String>);

impl MapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlays `local` on top of `remote`; local entries win.
    pub fn merged(remote: &MapTable, local: &MapTable) -> Self {
        let mut table = remote.clone();
        table
            .0
            .extend(local.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        table
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&str> {
        self.0.get(fingerprint.as_str()).map(String::as_str)
    }

    pub fn insert(&mut self, fingerprint: &Fingerprint, value: impl Into<String>) {
        self.0.insert(fingerprint.as_str().to_string(), value.into());
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.0.contains_key(fingerprint.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// What the current map resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapValue {
    /// No map image available.
    NotInMission,
    Hangar,
    /// Known fingerprint that still needs a curated name.
    NeedsName,
    /// Image URL or presence asset key.
    Reference(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identified {
    pub value: MapValue,
    pub newly_registered: bool,
}

/// Resolves fingerprints against the merged table, registering unseen ones.
pub struct MapIdentifier {
    table: MapTable,
    image_base_url: String,
}

impl MapIdentifier {
    pub fn new(table: MapTable, image_base_url: impl Into<String>) -> Self {
        Self {
            table,
            image_base_url: image_base_url.into(),
        }
    }

    pub fn identify(&mut self, fingerprint: Option<&Fingerprint>) -> Identified {
        let Some(fingerprint) = fingerprint else {
            return Identified {
                value: MapValue::NotInMission,
                newly_registered: false,
            };
        };

        if fingerprint.is_hangar() {
            let newly_registered = !self.table.contains(fingerprint);
            if newly_registered {
                self.table.insert(fingerprint, HANGAR_TABLE_VALUE);
                tracing::info!("Hangar fingerprint added to the map table");
            }
            return Identified {
                value: MapValue::Hangar,
                newly_registered,
            };
        }

        match self.table.get(fingerprint) {
            Some("") => Identified {
                value: MapValue::NeedsName,
                newly_registered: false,
            },
            Some(value) => Identified {
                value: MapValue::Reference(value.to_string()),
                newly_registered: false,
            },
            None => {
                let placeholder = self.placeholder_reference();
                self.table.insert(fingerprint, placeholder.clone());
                tracing::warn!(
                    "New map detected ({}...), registered placeholder {}",
                    fingerprint.short(),
                    placeholder
                );
                Identified {
                    value: MapValue::Reference(placeholder),
                    newly_registered: true,
                }
            }
        }
    }

    fn placeholder_reference(&self) -> String {
        format!(
            "{}{}{}",
            self.image_base_url, PLACEHOLDER_LABEL, MAP_IMAGE_EXTENSION
        )
    }

    pub fn table(&self) -> &MapTable {
        &self.table
    }
}
