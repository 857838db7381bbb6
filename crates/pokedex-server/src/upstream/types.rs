//! PokeAPI response shapes.
//!
//! Only the fields the proxy reads are modelled; everything else is ignored.
//! Collections default to empty so sparse records still parse.

use serde::Deserialize;

use pokedex_core::{EntityListItem, entity_id_from_url};

/// `{ name, url }` reference used throughout PokeAPI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl NamedResource {
    pub fn id(&self) -> Option<&str> {
        entity_id_from_url(&self.url)
    }
}

/// `GET /pokemon?offset=&limit=`
#[derive(Debug, Clone, Deserialize)]
pub struct ListPage {
    pub count: u64,
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

impl ListPage {
    pub fn items(&self) -> Vec<EntityListItem> {
        self.results
            .iter()
            .map(|r| EntityListItem::new(r.name.clone(), r.url.clone()))
            .collect()
    }
}

/// `GET /pokemon/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub species: NamedResource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtherSprites {
    #[serde(default, rename = "official-artwork")]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artwork {
    #[serde(default)]
    pub front_default: Option<String>,
}

impl Sprites {
    /// Official artwork, falling back to the default sprite.
    pub fn best(&self) -> Option<&str> {
        let artwork = self
            .other
            .as_ref()
            .and_then(|o| o.official_artwork.as_ref())
            .and_then(|a| a.front_default.as_deref())
            .filter(|url| !url.is_empty());
        artwork.or(self.front_default.as_deref().filter(|url| !url.is_empty()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatSlot {
    pub base_stat: u32,
    pub stat: NamedResource,
}

/// Name entry tagged with its language.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedName {
    pub language: NamedResource,
    pub name: String,
}

/// Pick the name for `language`, then for `fallback_language`.
pub fn pick_name<'a>(
    names: &'a [LocalizedName],
    language: &str,
    fallback_language: Option<&str>,
) -> Option<&'a str> {
    let find = |lang: &str| {
        names
            .iter()
            .find(|n| n.language.name == lang)
            .map(|n| n.name.as_str())
    };
    find(language).or_else(|| fallback_language.and_then(find))
}

/// `GET /pokemon-species/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesRecord {
    #[serde(default)]
    pub names: Vec<LocalizedName>,
    #[serde(default)]
    pub habitat: Option<NamedResource>,
    #[serde(default)]
    pub color: Option<NamedResource>,
    #[serde(default)]
    pub shape: Option<NamedResource>,
    #[serde(default)]
    pub varieties: Vec<Variety>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Variety {
    #[serde(default)]
    pub is_default: bool,
    pub pokemon: NamedResource,
}

/// `GET /type/{key}`
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    #[serde(default)]
    pub names: Vec<LocalizedName>,
}
