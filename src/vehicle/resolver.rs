//! Cache-first vehicle name resolution with a manual override table

use std::collections::HashMap;

use super::{LookupResult, VehicleId, VehicleLookup, VehicleRecord};
use crate::text::humanize;

/// Owns the vehicle name cache for one engine instance.
///
/// Successful lookups are cached for the lifetime of the resolver. A failed
/// lookup is not repeated while the same id stays selected; it is retried
/// once a different id has been seen in between.
pub struct VehicleResolver<L> {
    lookup: L,
    cache: HashMap<String, LookupResult>,
    overrides: HashMap<String, String>,
    last_seen: Option<String>,
    last_miss: Option<String>,
}

impl<L: VehicleLookup> VehicleResolver<L> {
    pub fn new(lookup: L, overrides: HashMap<String, String>) -> Self {
        Self {
            lookup,
            cache: HashMap::new(),
            overrides,
            last_seen: None,
            last_miss: None,
        }
    }

    pub async fn resolve(&mut self, id: &VehicleId) -> VehicleRecord {
        if id.is_unknown() {
            self.last_seen = Some(id.canonical().to_string());
            return VehicleRecord::unknown();
        }

        let canonical = id.canonical();
        let mut record = VehicleRecord {
            id: id.clone(),
            display_name: humanize(canonical),
            rating: None,
        };

        if let Some(cached) = self.cache.get(canonical) {
            record.display_name = cached.display_name.clone();
            record.rating = cached.rating.clone();
        } else if self.is_known_miss(canonical) {
            tracing::trace!("Skipping lookup for {}, it failed last tick", canonical);
        } else {
            match self.lookup.lookup(canonical).await {
                Some(found) => {
                    tracing::info!(
                        "Resolved vehicle {} as {} (BR: {})",
                        canonical,
                        found.display_name,
                        found.rating.as_deref().unwrap_or("N/A")
                    );
                    record.display_name = found.display_name.clone();
                    record.rating = found.rating.clone();
                    self.cache.insert(canonical.to_string(), found);
                    self.last_miss = None;
                }
                None => {
                    tracing::warn!(
                        "Lookup failed for {}, using default name: {}",
                        canonical,
                        record.display_name
                    );
                    self.last_miss = Some(canonical.to_string());
                }
            }
        }

        if let Some(name) = self.overrides.get(canonical) {
            tracing::debug!("Applied manual name override for {}: {}", canonical, name);
            record.display_name = name.clone();
        }

        self.last_seen = Some(canonical.to_string());
        record
    }

    fn is_known_miss(&self, canonical: &str) -> bool {
        self.last_miss.as_deref() == Some(canonical) && self.last_seen.as_deref() == Some(canonical)
    }

    pub fn is_cached(&self, canonical: &str) -> bool {
        self.cache.contains_key(canonical)
    }
}
