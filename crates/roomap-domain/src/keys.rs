//! Store key strategy.
//!
//! A hotel can be registered under two spellings of its identifier: the
//! plain form (`42`) and the hash-tagged form (`#42`). Both name the same
//! hotel, so every lookup probes the identifier as given first and the
//! toggled spelling second.

/// Leading marker distinguishing the two identifier spellings.
pub const HASH_TAG_MARKER: char = '#';

/// Prefix of every room mapping key.
pub const KEY_PREFIX: &str = "room_map";

/// Returns the other spelling of `hotel_id`.
///
/// The identifier is trimmed; if it then starts with the marker, the marker
/// is stripped, otherwise it is prepended. Applying it twice gives back the
/// trimmed identifier whenever the marker is not followed by whitespace.
pub fn alternate_of(hotel_id: &str) -> String {
    let trimmed = hotel_id.trim();
    match trimmed.strip_prefix(HASH_TAG_MARKER) {
        Some(rest) => rest.to_string(),
        None => format!("{HASH_TAG_MARKER}{trimmed}"),
    }
}

/// Key of the hash holding `hotel_id`'s rooms.
///
/// The braces form a Redis Cluster hash tag so all fields of one hotel hash
/// to the same slot.
pub fn primary_key_of(hotel_id: &str) -> String {
    format!("{KEY_PREFIX}:{{{hotel_id}}}")
}

/// Key of the hash under the identifier's alternate spelling.
pub fn alternate_key_of(hotel_id: &str) -> String {
    primary_key_of(&alternate_of(hotel_id))
}

/// Both store keys probed for one identifier, in probe order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub primary: String,
    pub alternate: String,
}

impl KeyPair {
    /// Derives the key pair for `hotel_id`.
    pub fn for_identifier(hotel_id: &str) -> Self {
        Self {
            primary: primary_key_of(hotel_id),
            alternate: alternate_key_of(hotel_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternate_prepends_marker() {
        assert_eq!(alternate_of("42"), "#42");
    }

    #[test]
    fn test_alternate_strips_marker() {
        assert_eq!(alternate_of("#42"), "42");
    }

    #[test]
    fn test_alternate_trims_before_toggling() {
        assert_eq!(alternate_of("  #42 "), "42");
        assert_eq!(alternate_of(" 42\t"), "#42");
    }

    #[test]
    fn test_bare_marker_alternates_to_empty() {
        assert_eq!(alternate_of("#"), "");
    }

    #[test]
    fn test_only_one_leading_marker_is_stripped() {
        assert_eq!(alternate_of("##42"), "#42");
    }

    #[test]
    fn test_key_template() {
        assert_eq!(primary_key_of("42"), "room_map:{42}");
        assert_eq!(primary_key_of("#42"), "room_map:{#42}");
        assert_eq!(alternate_key_of("42"), "room_map:{#42}");
        assert_eq!(alternate_key_of("#42"), "room_map:{42}");
    }

    #[test]
    fn test_key_pair_probe_order() {
        let pair = KeyPair::for_identifier("#H2");
        assert_eq!(pair.primary, "room_map:{#H2}");
        assert_eq!(pair.alternate, "room_map:{H2}");
    }
}
