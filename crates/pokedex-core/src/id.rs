//! Entity id helpers.
//!
//! Upstream listings reference entities by URL
//! (`https://pokeapi.co/api/v2/pokemon/25/`); the stable id is the last
//! non-empty path segment.

use std::cmp::Ordering;

/// Prefix of every display number.
pub const DISPLAY_NUMBER_PREFIX: &str = "No.";

/// Extract the entity id from an upstream resource URL.
///
/// Returns `None` when the URL has no non-empty path segment.
pub fn entity_id_from_url(url: &str) -> Option<&str> {
    url.split('/').filter(|segment| !segment.is_empty()).next_back()
}

/// Render the display number for an id: `No.` followed by the id
/// zero-padded to at least three characters. Longer ids are never truncated.
pub fn display_number(id: &str) -> String {
    format!("{DISPLAY_NUMBER_PREFIX}{id:0>3}")
}

/// Ordering for id strings: numeric ids ascending, then non-numeric ids
/// lexicographically.
pub fn numeric_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
