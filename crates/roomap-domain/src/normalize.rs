//! Room name normalization.
//!
//! Room names arrive from several suppliers with inconsistent casing,
//! spacing and punctuation ("Deluxe Room", "deluxe-room", "DELUXE ROOM (KING)").
//! Normalization maps all of them onto one comparison form.

/// Characters treated as word separators.
const SEPARATORS: [char; 6] = ['-', ',', '.', '/', '(', ')'];

/// Canonicalizes a raw room name.
///
/// Lowercases, turns `- , . / ( )` into spaces, collapses runs of ASCII
/// whitespace (`\t \n \x0C \r` and space) to a single space and trims
/// Unicode whitespace from both ends. Other Unicode spaces inside the name,
/// such as NBSP, are kept. Pure, total and idempotent.
///
/// # Example
///
/// ```
/// use roomap_domain::normalize_room_name;
///
/// assert_eq!(normalize_room_name("  Ocean-View  (King) "), "ocean view king");
/// ```
pub fn normalize_room_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut normalized = String::with_capacity(lowered.len());

    for word in lowered
        .split(|c: char| c.is_ascii_whitespace() || SEPARATORS.contains(&c))
        .filter(|w| !w.is_empty())
    {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(word);
    }

    match normalized.trim() {
        trimmed if trimmed.len() == normalized.len() => normalized,
        trimmed => trimmed.to_string(),
    }
}
