// 🔗 Share links - one state, one URL
//
// Two mutually exclusive query parameters:
//   s=<encoded state>   URL mode: the whole state lives in the link
//   list=<26-char id>   persisted mode: the state lives server-side
//
// When `list` is present, `s` is ignored. URL mode is abandoned once the
// estimated full URL would blow past a conservative browser/messenger
// budget - that is the trigger for offering the persisted upgrade, not
// an error.

use crate::codec::encode_state;
use crate::list_id::normalize_list_id;
use crate::state::AppState;

/// Conservative full-URL budget. Above this, offer persisted mode.
pub const URL_LENGTH_BUDGET: usize = 2000;

/// Query parameter carrying the encoded state (URL mode).
pub const STATE_PARAM: &str = "s";

/// Query parameter carrying the persisted-list id (persisted mode).
pub const LIST_PARAM: &str = "list";

/// What a share link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareTarget {
    /// URL mode: the codec's encoded state string.
    Encoded(String),
    /// Persisted mode: a normalized 26-character list id.
    Persisted(String),
}

/// Build a URL-mode share link. `base` is origin + path,
/// e.g. "https://tabsplit.app/".
pub fn build_share_url(base: &str, state: &AppState) -> String {
    format!("{}?{}={}", base, STATE_PARAM, encode_state(state))
}

/// Build a persisted-mode share link.
pub fn build_list_url(base: &str, list_id: &str) -> String {
    format!("{}?{}={}", base, LIST_PARAM, list_id)
}

/// True when the full URL-mode link would exceed the budget and the
/// persisted upgrade should be offered.
pub fn exceeds_url_budget(base: &str, state: &AppState) -> bool {
    build_share_url(base, state).len() > URL_LENGTH_BUDGET
}

/// Parse a raw query string (without the leading '?') into a share
/// target. A present `list` parameter wins outright: `s` is ignored, and
/// a malformed id yields None rather than falling back to URL mode.
pub fn parse_share_query(query: &str) -> Option<ShareTarget> {
    let mut encoded: Option<String> = None;
    let mut list: Option<&str> = None;

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            LIST_PARAM => list = Some(value),
            STATE_PARAM => {
                if let Ok(decoded) = urlencoding::decode(value) {
                    encoded = Some(decoded.into_owned());
                }
            }
            _ => {} // unknown parameters are ignored
        }
    }

    if let Some(raw) = list {
        return normalize_list_id(raw).map(ShareTarget::Persisted);
    }

    encoded
        .filter(|s| !s.is_empty())
        .map(ShareTarget::Encoded)
}

// ============================================================================
// TESTS
// ============================================================================
