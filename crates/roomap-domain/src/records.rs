//! Assembly of room records from a stored hash.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decode::try_decode_room_id;
use crate::normalize::normalize_room_name;

/// A hotel's stored hash: raw room name to JSON-encoded value blob.
pub type RawFieldMap = HashMap<String, String>;

/// One resolved room: normalized name and its numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Normalized room name (see [`normalize_room_name`]).
    pub name: String,
    /// Room id, never zero.
    pub id: i64,
}

impl RoomRecord {
    pub fn new(name: impl Into<String>, id: i64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// Decodes and normalizes a hotel's fields into records sorted by name.
///
/// Raw field names are visited in ascending byte order, which makes the
/// result independent of the store's iteration order:
/// - at most `max_fields` raw fields are visited; the rest are ignored;
/// - a field whose value does not decode is logged and skipped;
/// - when several raw names normalize to the same name, the first one
///   visited wins and the others are dropped.
pub fn build_room_records(
    hotel_id: &str,
    fields: &RawFieldMap,
    max_fields: usize,
) -> Vec<RoomRecord> {
    let mut raw_names: Vec<&String> = fields.keys().collect();

    if raw_names.len() > max_fields {
        warn!(
            hotel_id,
            field_count = raw_names.len(),
            max_fields,
            "Hotel exceeds field limit, ignoring excess fields"
        );
        metrics::counter!("roomap_field_limit_exceeded_total").increment(1);
        if max_fields == 0 {
            return Vec::new();
        }
        raw_names.select_nth_unstable(max_fields - 1);
        raw_names.truncate(max_fields);
    }
    raw_names.sort_unstable();

    let mut seen: HashSet<String> = HashSet::with_capacity(raw_names.len());
    let mut records = Vec::with_capacity(raw_names.len());

    for raw_name in raw_names {
        let blob = &fields[raw_name];
        let id = match try_decode_room_id(blob) {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    hotel_id,
                    room = %raw_name,
                    error = %e,
                    "Failed to parse room data"
                );
                metrics::counter!("roomap_decode_failures_total").increment(1);
                continue;
            }
        };

        let name = normalize_room_name(raw_name);
        if seen.contains(&name) {
            debug!(
                hotel_id,
                room = %raw_name,
                normalized = %name,
                "Duplicate normalized room name, keeping first"
            );
            continue;
        }
        seen.insert(name.clone());
        records.push(RoomRecord { name, id });
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> RawFieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_records_are_normalized_and_sorted() {
        let map = fields(&[
            ("Superior King", r#"{"id":3}"#),
            ("Deluxe-Twin", r#"{"id":1}"#),
            ("  Budget  Single ", r#"{"id":2}"#),
        ]);
        let records = build_room_records("h1", &map, 2000);
        assert_eq!(
            records,
            vec![
                RoomRecord::new("budget single", 2),
                RoomRecord::new("deluxe twin", 1),
                RoomRecord::new("superior king", 3),
            ]
        );
    }

    #[test]
    fn test_bad_fields_are_skipped_without_affecting_siblings() {
        let map = fields(&[
            ("Zero", r#"{"id":0}"#),
            ("Text", r#"{"id":"x"}"#),
            ("Broken", "not json"),
            ("Good", r#"{"id":9}"#),
        ]);
        let records = build_room_records("h1", &map, 2000);
        assert_eq!(records, vec![RoomRecord::new("good", 9)]);
    }

    #[test]
    fn test_collision_keeps_lexically_first_raw_name() {
        // "Deluxe Room" < "deluxe  room" in byte order ('D' < 'd').
        let map = fields(&[
            ("deluxe  room", r#"{"id":102}"#),
            ("Deluxe Room", r#"{"id":101}"#),
        ]);
        let records = build_room_records("h1", &map, 2000);
        assert_eq!(records, vec![RoomRecord::new("deluxe room", 101)]);
    }

    #[test]
    fn test_collision_with_same_id_yields_one_record() {
        let map = fields(&[("ocean view", r#"{"id":5}"#), ("Ocean-View", r#"{"id":5}"#)]);
        let records = build_room_records("42", &map, 2000);
        assert_eq!(records, vec![RoomRecord::new("ocean view", 5)]);
    }

    #[test]
    fn test_undecodable_first_name_does_not_shadow_later_valid_one() {
        let map = fields(&[("Ocean-View", r#"{"id":0}"#), ("ocean view", r#"{"id":5}"#)]);
        let records = build_room_records("42", &map, 2000);
        assert_eq!(records, vec![RoomRecord::new("ocean view", 5)]);
    }

    #[test]
    fn test_field_limit_visits_lexically_first_fields() {
        let map: RawFieldMap = (1..=10)
            .map(|i| (format!("room {i:02}"), format!(r#"{{"id":{i}}}"#)))
            .collect();
        let records = build_room_records("big", &map, 3);
        assert_eq!(
            records,
            vec![
                RoomRecord::new("room 01", 1),
                RoomRecord::new("room 02", 2),
                RoomRecord::new("room 03", 3),
            ]
        );
    }

    #[test]
    fn test_zero_field_limit_yields_nothing() {
        let map = fields(&[("a", r#"{"id":1}"#)]);
        assert!(build_room_records("h", &map, 0).is_empty());
    }

    #[test]
    fn test_empty_map_yields_nothing() {
        assert!(build_room_records("h", &RawFieldMap::new(), 2000).is_empty());
    }

    #[test]
    fn test_record_serializes_as_name_and_id() {
        let json = serde_json::to_string(&RoomRecord::new("ocean view", 5)).unwrap();
        assert_eq!(json, r#"{"name":"ocean view","id":5}"#);
    }
}
