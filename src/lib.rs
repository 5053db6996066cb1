pub mod discord;
pub mod error;
pub mod logging;
pub mod map;
pub mod presence;
pub mod settings;
pub mod telemetry;
pub mod text;
pub mod vehicle;

use std::collections::HashMap;

pub use error::{Error, Result};

use map::MapIdentifier;
use presence::PresenceEngine;
use settings::AppSettings;
use telemetry::HttpTelemetry;
use vehicle::{VehicleResolver, WikiLookup};

/// Engine wired to the game's HTTP API and the wiki, configured from `settings`.
pub fn engine_from_settings(
    settings: &AppSettings,
) -> Result<PresenceEngine<HttpTelemetry, WikiLookup>> {
    let telemetry = HttpTelemetry::new(&settings.api_url)?;
    let overrides: HashMap<String, String> = settings
        .vehicle_overrides
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();
    let vehicles = VehicleResolver::new(WikiLookup::new()?, overrides);
    let maps = MapIdentifier::new(
        settings.map_hashes.clone(),
        settings.map_image_base_url.clone(),
    );

    tracing::info!(
        "Engine configured: api={}, {} known maps, {} vehicle overrides",
        settings.api_url,
        settings.map_hashes.len(),
        settings.vehicle_overrides.len()
    );

    Ok(PresenceEngine::new(telemetry, vehicles, maps))
}
