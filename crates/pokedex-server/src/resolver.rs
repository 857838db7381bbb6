//! Detail resolution: one entity id to one display-ready [`EntityDetail`].
//!
//! Joins the base record, the species record (localized name) and one
//! category record per type. Never fails: any upstream error is converted to
//! a fallback value, a degraded record or [`Resolution::Missing`].
//!
//! Cache writes happen at two levels: `detail:{id}` for complete records and
//! `category-name:{key}` for translated categories. Degraded records are not
//! cached so the next request can repair them.

use futures_util::future::join_all;
use pokedex_core::{EntityDetail, display_number, locale};

use crate::cache::{CacheKey, CacheStore};
use crate::config::LocaleConfig;
use crate::upstream::{PokemonRecord, UpstreamClient, UpstreamError, pick_name};

/// Image served when upstream has no sprite or could not be reached.
pub const PLACEHOLDER_IMAGE: &str = "/images/no-image.png";

/// Names already known locally for an entity.
#[derive(Debug, Clone, Default)]
pub struct NameHint {
    /// Localized name; when present the species join is skipped.
    pub localized: Option<String>,
    /// Romanized upstream name, e.g. from the listing.
    pub romanized: Option<String>,
}

impl NameHint {
    pub fn romanized(name: impl Into<String>) -> Self {
        Self {
            localized: None,
            romanized: Some(name.into()),
        }
    }

    fn best(&self) -> Option<&str> {
        self.localized.as_deref().or(self.romanized.as_deref())
    }
}

/// Outcome of resolving one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Full record, from cache or freshly joined.
    Resolved(EntityDetail),
    /// Base record unavailable; built from local hints with a placeholder image.
    Degraded(EntityDetail),
    /// Base record unavailable and nothing known locally.
    Missing,
}

impl Resolution {
    /// The record, if any; degraded records only when `include_degraded`.
    pub fn into_detail(self, include_degraded: bool) -> Option<EntityDetail> {
        match self {
            Resolution::Resolved(detail) => Some(detail),
            Resolution::Degraded(detail) if include_degraded => Some(detail),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct DetailResolver {
    client: UpstreamClient,
    cache: CacheStore,
    locale: LocaleConfig,
}

impl DetailResolver {
    pub fn new(client: UpstreamClient, cache: CacheStore, locale: LocaleConfig) -> Self {
        Self {
            client,
            cache,
            locale,
        }
    }

    pub fn client(&self) -> &UpstreamClient {
        &self.client
    }

    pub async fn resolve(&self, id: &str, hint: &NameHint) -> Resolution {
        let key = CacheKey::detail(id);
        if let Some(detail) = self.cache.get::<EntityDetail>(&key) {
            return Resolution::Resolved(detail);
        }

        let base = match self.client.pokemon(id).await {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Base record unavailable");
                return self.degraded(id, hint);
            }
        };

        let localized_name = match &hint.localized {
            Some(name) => name.clone(),
            None => self.localized_name(&base).await,
        };
        let categories = self.category_names(&base).await;

        let detail = EntityDetail {
            id: id.to_string(),
            localized_name,
            image_url: base.sprites.best().unwrap_or(PLACEHOLDER_IMAGE).to_string(),
            display_number: display_number(id),
            categories,
        };
        self.cache.set(&key, &detail);
        Resolution::Resolved(detail)
    }

    fn degraded(&self, id: &str, hint: &NameHint) -> Resolution {
        match hint.best() {
            Some(name) => Resolution::Degraded(EntityDetail {
                id: id.to_string(),
                localized_name: name.to_string(),
                image_url: PLACEHOLDER_IMAGE.to_string(),
                display_number: display_number(id),
                categories: Vec::new(),
            }),
            None => Resolution::Missing,
        }
    }

    /// Localized name from the species record, or the romanized base name.
    pub async fn localized_name(&self, base: &PokemonRecord) -> String {
        let species_id = base
            .species
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| base.id.to_string());
        match self.species_name(&species_id).await {
            Ok(Some(name)) => name,
            Ok(None) => base.name.clone(),
            Err(e) => {
                tracing::warn!(id = %base.id, error = %e, "Species record unavailable");
                base.name.clone()
            }
        }
    }

    /// Localized name carried by a species record, if it has one for the locale.
    pub async fn species_name(&self, species_id: &str) -> Result<Option<String>, UpstreamError> {
        let species = self.client.species(species_id).await?;
        Ok(self.pick(&species.names).map(str::to_string))
    }

    async fn category_names(&self, base: &PokemonRecord) -> Vec<String> {
        join_all(
            base.types
                .iter()
                .map(|slot| self.category_name(&slot.kind.name)),
        )
        .await
    }

    /// Translated category name, cached long-lived.
    ///
    /// Falls back to the static table and then the key itself when the
    /// category record cannot be fetched; those fallbacks are not cached.
    pub async fn category_name(&self, key: &str) -> String {
        let cache_key = CacheKey::category_name(key);
        if let Some(name) = self.cache.get::<String>(&cache_key) {
            return name;
        }

        match self.client.category(key).await {
            Ok(record) => {
                let name = self.pick(&record.names).unwrap_or(key).to_string();
                self.cache.set(&cache_key, &name);
                name
            }
            Err(e) => {
                tracing::warn!(category = %key, error = %e, "Category record unavailable");
                locale::type_name(key).unwrap_or(key).to_string()
            }
        }
    }

    pub(crate) fn pick<'a>(&self, names: &'a [crate::upstream::LocalizedName]) -> Option<&'a str> {
        pick_name(
            names,
            &self.locale.language,
            self.locale.fallback_language.as_deref(),
        )
    }
}
