// 🆔 Persisted-list identifiers
//
// 26-character Crockford base32 (ULID): first 10 chars encode a
// millisecond timestamp, remaining 16 are random, so lexicographic order
// equals creation order. The alphabet is digits plus uppercase letters
// excluding I, L, O, U. Input is case-insensitive; the canonical form is
// uppercase.

use ulid::Ulid;

/// Crockford base32 alphabet, 32 symbols.
pub const ALPHABET: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Exact identifier length.
pub const ID_LENGTH: usize = 26;

/// Generate a fresh sortable list identifier.
pub fn new_list_id() -> String {
    Ulid::new().to_string()
}

/// Validate and canonicalize an identifier: exactly 26 characters, every
/// character (after uppercasing) inside the alphabet. Returns the
/// uppercase form, or None on any violation.
pub fn normalize_list_id(raw: &str) -> Option<String> {
    if raw.len() != ID_LENGTH {
        return None;
    }

    let upper = raw.to_ascii_uppercase();
    if upper.chars().all(|c| ALPHABET.contains(c)) {
        Some(upper)
    } else {
        None
    }
}

/// Quick validity check without allocating the canonical form.
pub fn is_valid_list_id(raw: &str) -> bool {
    normalize_list_id(raw).is_some()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_valid_and_sortable() {
        let a = new_list_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_list_id();

        assert_eq!(a.len(), 26);
        assert!(is_valid_list_id(&a));
        assert!(is_valid_list_id(&b));

        // Later creation sorts later
        assert!(a < b);
        println!("✅ Generated ids: {} < {}", a, b);
    }

    #[test]
    fn test_case_insensitive_normalization() {
        let id = new_list_id();
        let lower = id.to_ascii_lowercase();

        assert_eq!(normalize_list_id(&lower), Some(id));
    }

    #[test]
    fn test_rejects_bad_length_and_alphabet() {
        assert_eq!(normalize_list_id(""), None);
        assert_eq!(normalize_list_id("TOOSHORT"), None);
        assert_eq!(normalize_list_id(&"0".repeat(27)), None);

        // Right length, excluded letters (I, L, O, U)
        assert_eq!(normalize_list_id(&"I".repeat(26)), None);
        assert_eq!(normalize_list_id(&"U".repeat(26)), None);

        // Right length, non-alphanumeric
        assert_eq!(normalize_list_id(&"-".repeat(26)), None);

        // Right length, valid alphabet
        assert!(normalize_list_id(&"7".repeat(26)).is_some());
    }
}
