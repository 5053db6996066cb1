use std::future::Future;

use crate::error::Result;
use crate::map::MapTable;

use super::PresentationState;

/// Trait for presence sinks (Discord, test recorders, ...)
pub trait PresenceSink: Send + Sync {
    /// Returns the name of this sink (for logging)
    fn name(&self) -> &'static str;

    /// Show a new presence state
    fn publish(&self, state: &PresentationState);

    /// Clear the presence and close the connection
    fn shutdown(&self) -> impl Future<Output = ()> + Send;
}

/// Receives the fingerprint table whenever a new map has been registered
pub trait MapTableStore: Send + Sync {
    fn save_map_table(&self, table: &MapTable) -> Result<()>;
}
