//! Display-ready value objects served by the API.
//!
//! All values are immutable once built and carry no back-references, so they
//! can be cached and cloned freely.

use serde::{Deserialize, Serialize};

use crate::id::entity_id_from_url;

/// Minimal reference to one entity as returned by an upstream listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityListItem {
    /// Romanized upstream name (e.g. `pikachu`).
    pub display_key: String,
    /// Upstream resource URL; its last path segment is the entity id.
    pub source_url: String,
}

impl EntityListItem {
    pub fn new(display_key: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            display_key: display_key.into(),
            source_url: source_url.into(),
        }
    }

    /// Stable entity id parsed from the source URL.
    pub fn id(&self) -> Option<&str> {
        entity_id_from_url(&self.source_url)
    }
}

/// Normalized, locale-translated list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDetail {
    pub id: String,
    #[serde(rename = "name")]
    pub localized_name: String,
    #[serde(rename = "image")]
    pub image_url: String,
    #[serde(rename = "number")]
    pub display_number: String,
    #[serde(rename = "types")]
    pub categories: Vec<String>,
}

/// One page of results; the unit of response and of page-level caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    pub results: Vec<EntityDetail>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl PageEnvelope {
    /// Envelope for a query that matched nothing.
    pub fn no_matches() -> Self {
        Self {
            results: Vec::new(),
            current_page: 1,
            total_pages: 0,
            total_items: 0,
        }
    }

    /// Envelope for a page past the end of a non-empty dataset.
    pub fn past_end(page: u64, total_pages: u64, total_items: u64) -> Self {
        Self {
            results: Vec::new(),
            current_page: page,
            total_pages,
            total_items,
        }
    }
}

/// Named base stat value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    pub name: String,
    pub value: u32,
}

/// Alternate form sharing a display number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRef {
    pub id: String,
    pub name: String,
    pub number: String,
}

/// Full record served by the single-entity endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonProfile {
    pub id: String,
    pub name: String,
    pub number: String,
    pub image: String,
    pub height: u32,
    pub weight: u32,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: Vec<StatValue>,
    pub habitat: String,
    pub color: String,
    pub shape: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forms: Option<Vec<FormRef>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_item_id() {
        let item = EntityListItem::new("pikachu", "https://pokeapi.co/api/v2/pokemon/25/");
        assert_eq!(item.id(), Some("25"));
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = PageEnvelope {
            results: vec![EntityDetail {
                id: "25".into(),
                localized_name: "ピカチュウ".into(),
                image_url: "https://img/25.png".into(),
                display_number: "No.025".into(),
                categories: vec!["でんき".into()],
            }],
            current_page: 2,
            total_pages: 52,
            total_items: 1025,
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "results": [{
                    "id": "25",
                    "name": "ピカチュウ",
                    "image": "https://img/25.png",
                    "number": "No.025",
                    "types": ["でんき"]
                }],
                "currentPage": 2,
                "totalPages": 52,
                "totalItems": 1025
            })
        );
    }

    #[test]
    fn test_profile_omits_absent_forms() {
        let profile = PokemonProfile {
            id: "1".into(),
            name: "フシギダネ".into(),
            number: "No.001".into(),
            image: "img".into(),
            height: 7,
            weight: 69,
            types: vec![],
            abilities: vec![],
            stats: vec![],
            habitat: "草原".into(),
            color: "緑".into(),
            shape: "四足型".into(),
            forms: None,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("forms").is_none());
    }
}
