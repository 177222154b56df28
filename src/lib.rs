// Tab Split - Core Library
// Bill splitting: people enter expenses, we compute the fewest payments
// that settle everyone up. State travels inside a share link, or - once
// the link gets too long - inside a server-side list with optimistic
// version checking.

pub mod codec;
pub mod list_id;
pub mod settlement;
pub mod share;
pub mod state;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use codec::{decode_state, encode_state};
pub use list_id::{is_valid_list_id, new_list_id, normalize_list_id};
pub use settlement::{compute_balances, compute_settlements, Balance, Settlement};
pub use share::{
    build_list_url, build_share_url, exceeds_url_budget, parse_share_query, ShareTarget,
    LIST_PARAM, STATE_PARAM, URL_LENGTH_BUDGET,
};
pub use state::{AppState, LineItem, PaymentMethods, Person, DEFAULT_CURRENCY};
pub use store::{create_list, get_list, setup_database, update_list, PersistedList, StoreError};
pub use sync::{
    ConflictInfo, Debouncer, SaveCoordinator, SavePhase, AUTOSAVE_DEBOUNCE, SETTLEMENT_DEBOUNCE,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
