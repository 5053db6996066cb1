mod classifier;
mod engine;
mod gate;
mod manager;
mod state;
mod traits;

pub use classifier::{classify, matching_rule, BattleKind, StatusInput, StatusRule, RULES};
pub use engine::{PresenceEngine, TickOutcome};
pub use gate::ChangeGate;
pub use manager::{Poller, PollerState, DEFAULT_POLL_INTERVAL};
pub use state::{PresentationState, LOGO_IMAGE_KEY, LOGO_IMAGE_TEXT};
pub use traits::{MapTableStore, PresenceSink};
