// 🔗 Compact Codec - AppState ⇄ URL-safe share string
//
// Two-step pipeline:
//   1. Compaction: rename every field to a single-character key and drop
//      anything equal to its default. JSON keys are most of a small
//      payload's weight, so this is where the size win comes from.
//   2. Encoding: JSON text → UTF-8 bytes → base64 URL-safe without
//      padding ('+' → '-', '/' → '_', trailing '=' stripped).
//
// Decoding is total: any failure at any stage collapses to None. A bad
// share link means "start a fresh session", never a crash.
//
// Backward compatibility: older links were built by percent-encoding the
// JSON and standard-base64-encoding the percent-encoded text. When the
// URL-safe path fails we retry with that legacy scheme before giving up.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::{AppState, LineItem, PaymentMethods, Person, DEFAULT_CURRENCY};

// ============================================================================
// COMPACT FORM
// Key map:
//   state   people→p  currency→c  eventName→e
//   person  id→i      name→n      items→t      payments→y
//   item    id→i      name→n      amountCents→a
//   payments  venmo→v  zelle→z  paypal→p  cashapp→a  other→o
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CompactState {
    p: Vec<CompactPerson>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    c: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    e: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CompactPerson {
    i: String,
    n: String,

    /// Always present, even when empty - an empty expense list is state,
    /// not absence of state.
    t: Vec<CompactItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<CompactPayments>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CompactItem {
    i: String,
    n: String,
    a: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CompactPayments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    v: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    z: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    p: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    a: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    o: Option<String>,
}

fn to_compact(state: &AppState) -> CompactState {
    CompactState {
        p: state.people.iter().map(person_to_compact).collect(),
        // The default "$" is omitted outright, not stored
        c: state
            .currency
            .as_deref()
            .filter(|c| *c != DEFAULT_CURRENCY)
            .map(str::to_string),
        e: state.event_name.clone(),
    }
}

fn person_to_compact(person: &Person) -> CompactPerson {
    CompactPerson {
        i: person.id.clone(),
        n: person.name.clone(),
        t: person
            .items
            .iter()
            .map(|item| CompactItem {
                i: item.id.clone(),
                n: item.name.clone(),
                a: item.amount_cents,
            })
            .collect(),
        // A payments object with zero non-empty fields is omitted
        // entirely, never serialized as {}
        y: person
            .payments
            .as_ref()
            .filter(|pm| !pm.is_blank())
            .map(|pm| CompactPayments {
                v: pm.venmo.clone(),
                z: pm.zelle.clone(),
                p: pm.paypal.clone(),
                a: pm.cashapp.clone(),
                o: pm.other.clone(),
            }),
    }
}

fn from_compact(compact: CompactState) -> AppState {
    AppState {
        people: compact
            .p
            .into_iter()
            .map(|cp| Person {
                id: cp.i,
                name: cp.n,
                items: cp
                    .t
                    .into_iter()
                    .map(|ci| LineItem {
                        id: ci.i,
                        name: ci.n,
                        amount_cents: ci.a,
                    })
                    .collect(),
                payments: cp.y.map(|cy| PaymentMethods {
                    venmo: cy.v,
                    zelle: cy.z,
                    paypal: cy.p,
                    cashapp: cy.a,
                    other: cy.o,
                }),
            })
            .collect(),
        currency: compact.c,
        event_name: compact.e,
    }
}

// ============================================================================
// ENCODE / DECODE
// ============================================================================

/// Encode an AppState into a URL-safe share string.
///
/// Example:
/// ```
/// use tab_split::{AppState, encode_state, decode_state};
///
/// let state = AppState::new_session();
/// let encoded = encode_state(&state);
/// assert_eq!(decode_state(&encoded), Some(state));
/// ```
pub fn encode_state(state: &AppState) -> String {
    let compact = to_compact(state);
    // Serializing a struct of plain fields cannot fail
    let json = serde_json::to_string(&compact).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decode a share string back into an AppState.
///
/// Returns None for anything malformed - bad base64, bad UTF-8, bad JSON,
/// or a JSON object of unrecognized shape. Errors never propagate; the
/// caller falls back to a fresh session.
pub fn decode_state(encoded: &str) -> Option<AppState> {
    let value = decode_url_safe(encoded).or_else(|| decode_legacy(encoded))?;
    state_from_value(value)
}

/// Primary path: URL-safe base64 → UTF-8 → JSON.
fn decode_url_safe(encoded: &str) -> Option<Value> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    let json = String::from_utf8(bytes).ok()?;
    serde_json::from_str(&json).ok()
}

/// Legacy path: standard base64 (re-padded) → percent-encoded JSON →
/// percent-decode → JSON.
fn decode_legacy(encoded: &str) -> Option<Value> {
    let padded = repad(encoded);
    let bytes = STANDARD.decode(&padded).ok()?;
    let escaped = String::from_utf8(bytes).ok()?;
    let json = urlencoding::decode(&escaped).ok()?;
    serde_json::from_str(&json).ok()
}

/// Restore standard base64 padding to a multiple of 4 characters.
fn repad(s: &str) -> String {
    let mut padded = s.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    padded
}

/// Explicit two-case tagged parse of the decoded JSON:
/// a `people` key means the object is already in full form; a `p` key
/// means compact form and needs expansion; anything else is a failure.
fn state_from_value(value: Value) -> Option<AppState> {
    let obj = value.as_object()?;

    if obj.contains_key("people") {
        serde_json::from_value::<AppState>(value).ok()
    } else if obj.contains_key("p") {
        serde_json::from_value::<CompactState>(value)
            .ok()
            .map(from_compact)
    } else {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
