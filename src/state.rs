// 💵 State Model - People, line items, and the root AppState
//
// Everything monetary is integer minor units (cents). Never floats -
// floating point drifts and a bill splitter that drifts is worthless.
//
// Optional fields (currency, event name, payments) collapse to None when
// they equal their default / are blank, so the serialized form stays as
// small as possible for the share link.

use serde::{Deserialize, Serialize};

/// Default display currency symbol. Stored as None when equal to this.
pub const DEFAULT_CURRENCY: &str = "$";

// ============================================================================
// LINE ITEM
// ============================================================================

/// One expense row owned by a single person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,

    pub name: String,

    /// Amount in cents. Non-negative; upstream validation rejects
    /// negatives before they reach the settlement engine.
    #[serde(rename = "amountCents")]
    pub amount_cents: i64,
}

impl LineItem {
    pub fn new(name: &str, amount_cents: i64) -> Self {
        LineItem {
            id: new_id(),
            name: name.to_string(),
            amount_cents,
        }
    }
}

// ============================================================================
// PAYMENT METHODS
// ============================================================================

/// Free-text payment handles. Presence affects nothing in the settlement
/// math - this is display-only metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentMethods {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venmo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zelle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paypal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashapp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

impl PaymentMethods {
    /// True when every field is absent or blank after trimming.
    /// An all-blank payments object must be omitted from serialization
    /// entirely, never emitted as `{}`.
    pub fn is_blank(&self) -> bool {
        [
            &self.venmo,
            &self.zelle,
            &self.paypal,
            &self.cashapp,
            &self.other,
        ]
        .iter()
        .all(|f| f.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

// ============================================================================
// PERSON
// ============================================================================

/// A participant. People own their line items exclusively.
/// Blank-named people are excluded from settlement (see settlement.rs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,

    pub name: String,

    pub items: Vec<LineItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<PaymentMethods>,
}

impl Person {
    /// Fresh person with a blank name and no items.
    pub fn blank() -> Self {
        Person {
            id: new_id(),
            name: String::new(),
            items: Vec::new(),
            payments: None,
        }
    }

    pub fn named(name: &str) -> Self {
        Person {
            name: name.to_string(),
            ..Person::blank()
        }
    }

    /// Sum of this person's line items, in cents.
    pub fn paid_total(&self) -> i64 {
        self.items.iter().map(|item| item.amount_cents).sum()
    }

    /// A person participates in the split only with a non-blank name.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

// ============================================================================
// APP STATE (root aggregate)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub people: Vec<Person>,

    /// Display symbol only - never used in computation.
    /// None means the default "$".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "eventName")]
    pub event_name: Option<String>,
}

impl AppState {
    /// Explicit factory for a fresh session: one default blank person,
    /// freshly generated id. No hidden global default state.
    pub fn new_session() -> Self {
        AppState {
            people: vec![Person::blank()],
            currency: None,
            event_name: None,
        }
    }

    /// Display currency, defaulting to "$".
    pub fn currency_symbol(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    // ========================================================================
    // MUTATION OPERATIONS
    // All total: unknown ids are no-ops, nothing here ever panics.
    // ========================================================================

    /// Append a fresh blank person and return its id.
    pub fn add_person(&mut self) -> String {
        let person = Person::blank();
        let id = person.id.clone();
        self.people.push(person);
        id
    }

    /// Remove by id. No-op when the id is unknown.
    pub fn remove_person(&mut self, person_id: &str) {
        self.people.retain(|p| p.id != person_id);
    }

    /// Rename by id. No-op when the id is unknown.
    pub fn rename_person(&mut self, person_id: &str, name: &str) {
        if let Some(person) = self.person_mut(person_id) {
            person.name = name.to_string();
        }
    }

    /// Append an expense row to a person. Returns the item id, or None
    /// when the person id is unknown.
    pub fn add_item(&mut self, person_id: &str, name: &str, amount_cents: i64) -> Option<String> {
        let person = self.person_mut(person_id)?;
        let item = LineItem::new(name, amount_cents);
        let id = item.id.clone();
        person.items.push(item);
        Some(id)
    }

    /// Edit an item in place. No-op when either id is unknown.
    pub fn update_item(&mut self, person_id: &str, item_id: &str, name: &str, amount_cents: i64) {
        if let Some(person) = self.person_mut(person_id) {
            if let Some(item) = person.items.iter_mut().find(|i| i.id == item_id) {
                item.name = name.to_string();
                item.amount_cents = amount_cents;
            }
        }
    }

    /// Remove an item. No-op when either id is unknown.
    pub fn remove_item(&mut self, person_id: &str, item_id: &str) {
        if let Some(person) = self.person_mut(person_id) {
            person.items.retain(|i| i.id != item_id);
        }
    }

    /// Set the display currency. The default symbol is stored as None to
    /// keep the serialized state minimal.
    pub fn set_currency(&mut self, symbol: &str) {
        let trimmed = symbol.trim();
        self.currency = if trimmed.is_empty() || trimmed == DEFAULT_CURRENCY {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// Set the event name. Blank after trimming stores None.
    pub fn set_event_name(&mut self, name: &str) {
        let trimmed = name.trim();
        self.event_name = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// Set a person's payment methods. An all-blank payments object is
    /// stored as None, matching the codec's omission rule. No-op when the
    /// person id is unknown.
    pub fn set_payments(&mut self, person_id: &str, payments: PaymentMethods) {
        if let Some(person) = self.person_mut(person_id) {
            person.payments = if payments.is_blank() {
                None
            } else {
                Some(payments)
            };
        }
    }

    fn person_mut(&mut self, person_id: &str) -> Option<&mut Person> {
        self.people.iter_mut().find(|p| p.id == person_id)
    }
}

/// Opaque string identifier for people and items.
fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// TESTS
// ============================================================================
