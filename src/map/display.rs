use url::Url;

use super::MapValue;
use crate::text::humanize;

const NOT_IN_MISSION: &str = "Not in Mission";
const HANGAR: &str = "Hangar";
const NEEDS_UPDATE: &str = "Unknown Map (Needs Update)";
const UPLOAD_PENDING: &str = "Unknown Map (Upload Pending)";
const UPLOADING_CAPTION: &str = "Uploading Map Image";

/// Asset keys that stand for a diagnostic state rather than a real map.
const DIAGNOSTIC_KEYS: &[&str] = &[
    "unknown_map",
    "unknown_map_needs_update",
    "unknown_map_just_added",
    "unknown_map_upload_pending",
    "not_in_mission",
    "hangar",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapAsset {
    /// Directly fetchable image. `pending` marks the auto-registered placeholder.
    Url { url: String, pending: bool },
    /// Asset key uploaded to the presence application.
    Key(String),
    None,
}

/// Human map name plus the image that can represent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDisplay {
    pub name: String,
    pub asset: MapAsset,
}

impl MapDisplay {
    pub fn is_hangar(&self) -> bool {
        self.name == HANGAR && self.asset == MapAsset::None
    }

    /// Image key and caption to use as the large image, if the map has one.
    pub fn large_image(&self) -> Option<(String, String)> {
        match &self.asset {
            MapAsset::Url { url, pending: true } => {
                Some((url.clone(), UPLOADING_CAPTION.to_string()))
            }
            MapAsset::Url { url, pending: false } => Some((url.clone(), self.name.clone())),
            MapAsset::Key(key) => Some((key.clone(), self.name.clone())),
            MapAsset::None => None,
        }
    }
}

impl From<&MapValue> for MapDisplay {
    fn from(value: &MapValue) -> Self {
        match value {
            MapValue::NotInMission => diagnostic(NOT_IN_MISSION),
            MapValue::Hangar => diagnostic(HANGAR),
            MapValue::NeedsName => diagnostic(NEEDS_UPDATE),
            MapValue::Reference(reference) if is_url(reference) => from_url(reference),
            MapValue::Reference(token) => from_token(token),
        }
    }
}

fn diagnostic(name: &str) -> MapDisplay {
    MapDisplay {
        name: name.to_string(),
        asset: MapAsset::None,
    }
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// The map name is the image file stem: `.../abandoned_town.jpg` is
/// "Abandoned Town".
fn from_url(reference: &str) -> MapDisplay {
    let stem = Url::parse(reference).ok().and_then(|url| {
        let file = url.path_segments()?.next_back()?.to_string();
        let stem = match file.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
            _ => file,
        };
        (!stem.is_empty()).then_some(stem)
    });

    let Some(stem) = stem else {
        return MapDisplay {
            name: reference.to_string(),
            asset: MapAsset::Url {
                url: reference.to_string(),
                pending: false,
            },
        };
    };

    let name = humanize(&stem);
    let pending = name == "Unknown Map";

    MapDisplay {
        name: if pending { UPLOAD_PENDING.to_string() } else { name },
        asset: MapAsset::Url {
            url: reference.to_string(),
            pending,
        },
    }
}

fn from_token(token: &str) -> MapDisplay {
    let key: String = token
        .to_lowercase()
        .replace([' ', '-'], "_")
        .chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect();

    let name = humanize(token);
    let asset = if DIAGNOSTIC_KEYS.contains(&key.as_str()) {
        MapAsset::None
    } else {
        MapAsset::Key(key)
    };

    MapDisplay { name, asset }
}
