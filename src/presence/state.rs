use serde::Serialize;

pub const LOGO_IMAGE_KEY: &str = "war_thunder_logo";
pub const LOGO_IMAGE_TEXT: &str = "War Thunder";

/// One outward status update. Two states are only equal when every field,
/// including the session start, matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentationState {
    pub headline: String,
    pub subline: String,
    pub large_image_key: String,
    pub large_image_text: String,
    pub small_image_key: Option<String>,
    pub small_image_text: Option<String>,
    /// Unix timestamp (seconds) the elapsed-time counter starts from.
    pub session_start: i64,
}
