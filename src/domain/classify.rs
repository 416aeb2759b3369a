// Content-based classification of upstream failures.
//
// The provider answers recently-played with 404 both when the history is
// empty and when the token lacks the recently-played scope.

pub const MISSING_SCOPE_GUIDANCE: &str = "Missing required permission. Please log out and log back in to grant the user-read-recently-played permission.";

pub const NO_RECENT_HISTORY_GUIDANCE: &str = "No recent playback history was found. Play a few tracks and try again, or log out and back in if this persists.";

// True when an upstream message points at a missing permission scope.
pub fn is_scope_error(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("scope") || message.contains("permission")
}

// Guidance shown for a recently-played 404 with the given upstream message.
pub fn recently_played_guidance(message: &str) -> &'static str {
    if is_scope_error(message) {
        MISSING_SCOPE_GUIDANCE
    } else {
        NO_RECENT_HISTORY_GUIDANCE
    }
}
