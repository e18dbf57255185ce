//! Deterministic identifiers for records that predate UUID keys.
//!
//! Success factors were originally keyed by slugs such as `sf-7`. Every
//! slug maps to a UUIDv5 under [`SUCCESS_FACTOR_NAMESPACE`], so the catalog
//! seed and the one-off migration always agree on the new id.

use uuid::Uuid;

/// Namespace for success factor ids.
pub const SUCCESS_FACTOR_NAMESPACE: Uuid = Uuid::from_u128(0x6f1b_3c5e_8a2d_4f7b_9c1e_2d4a_6b8c_0e31);

/// Namespace for personal heuristics that were stored as bare strings.
pub const HEURISTIC_NAMESPACE: Uuid = Uuid::from_u128(0x3a9e_7d21_c4b6_4e08_a5f3_91d2_0b7c_64ea);

pub fn factor_uuid(legacy_id: &str) -> Uuid {
    Uuid::new_v5(&SUCCESS_FACTOR_NAMESPACE, legacy_id.as_bytes())
}

/// Stable id for a heuristic that only ever had a text value.
pub fn heuristic_uuid(text: &str) -> Uuid {
    Uuid::new_v5(&HEURISTIC_NAMESPACE, text.trim().as_bytes())
}

/// True when the id is not yet in UUID form and needs rewriting.
pub fn is_legacy_id(id: &str) -> bool {
    Uuid::parse_str(id).is_err()
}

/// Canonical id for a success factor, accepting either form.
pub fn canonical_factor_id(id: &str) -> String {
    if is_legacy_id(id) {
        factor_uuid(id).to_string()
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_uuid_is_deterministic() {
        let first = factor_uuid("sf-1");
        let second = factor_uuid("sf-1");
        assert_eq!(first, second);
        assert_eq!(first.get_version_num(), 5);
        assert_ne!(first, factor_uuid("sf-2"));
    }

    #[test]
    fn canonical_factor_id_leaves_uuids_alone() {
        let uuid = factor_uuid("sf-3").to_string();
        assert_eq!(canonical_factor_id(&uuid), uuid);
        assert_eq!(canonical_factor_id("sf-3"), uuid);
    }

    #[test]
    fn heuristic_uuid_ignores_surrounding_whitespace() {
        assert_eq!(
            heuristic_uuid("  Talk to users early "),
            heuristic_uuid("Talk to users early")
        );
    }
}
