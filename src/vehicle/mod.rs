//! Vehicle identity and display-name resolution

mod lookup;
mod resolver;

pub use lookup::{LookupResult, VehicleLookup, WikiLookup};
pub use resolver::VehicleResolver;

pub const UNKNOWN_VEHICLE_ID: &str = "unknown_vehicle";
pub const UNKNOWN_VEHICLE_NAME: &str = "Unknown Vehicle";

const VEHICLE_IMAGE_BASE_URL: &str = "https://static.encyclopedia.warthunder.com/images/";

/// Vehicle identifier as reported by the game.
///
/// `unfiltered` is the lower-cased raw value with its model path intact
/// (`tankmodels/t-34_1942`); `canonical` is its last `/` segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VehicleId {
    canonical: String,
    unfiltered: String,
}

impl VehicleId {
    pub fn unknown() -> Self {
        Self {
            canonical: UNKNOWN_VEHICLE_ID.to_string(),
            unfiltered: UNKNOWN_VEHICLE_ID.to_string(),
        }
    }

    pub fn parse(raw: &str) -> Self {
        let unfiltered = raw.trim().to_lowercase();
        if unfiltered.is_empty() || unfiltered == UNKNOWN_VEHICLE_ID || unfiltered == "unknown vehicle"
        {
            return Self::unknown();
        }

        let canonical = match unfiltered.rsplit('/').next() {
            Some(last) if !last.is_empty() => last.to_string(),
            _ => return Self::unknown(),
        };

        Self {
            canonical,
            unfiltered,
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn unfiltered(&self) -> &str {
        &self.unfiltered
    }

    pub fn is_unknown(&self) -> bool {
        self.canonical == UNKNOWN_VEHICLE_ID
    }

    pub fn domain(&self) -> VehicleDomain {
        if self.is_unknown() {
            VehicleDomain::Unknown
        } else if self.unfiltered.contains("tankmodels/") {
            VehicleDomain::Ground
        } else if self.unfiltered.contains("shipmodels/") || self.unfiltered.contains("boat/") {
            VehicleDomain::Naval
        } else {
            VehicleDomain::Air
        }
    }
}

/// Kind of vehicle, inferred from the model path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleDomain {
    Ground,
    Naval,
    Air,
    Unknown,
}

/// A vehicle as it is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRecord {
    pub id: VehicleId,
    pub display_name: String,
    /// Battle rating text such as `"8.7"`; `None` when unavailable.
    pub rating: Option<String>,
}

impl VehicleRecord {
    pub fn unknown() -> Self {
        Self {
            id: VehicleId::unknown(),
            display_name: UNKNOWN_VEHICLE_NAME.to_string(),
            rating: None,
        }
    }

    pub fn is_known(&self) -> bool {
        !self.id.is_unknown()
    }

    /// Public encyclopedia image for the vehicle, if one is selected.
    pub fn image_url(&self) -> Option<String> {
        self.is_known()
            .then(|| format!("{}{}.png", VEHICLE_IMAGE_BASE_URL, self.id.canonical()))
    }

    /// `"{name} BR: {rating}"`, or just the name without a rating.
    pub fn caption(&self) -> String {
        match &self.rating {
            Some(rating) => format!("{} BR: {}", self.display_name, rating),
            None => self.display_name.clone(),
        }
    }
}
