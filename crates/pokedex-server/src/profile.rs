//! Single-entity profile behind `GET /api/pokemon/{id}`.

use std::sync::Arc;

use futures_util::future::join_all;
use pokedex_core::{FormRef, PokemonProfile, Snapshot, StatValue, display_number, locale};

use crate::resolver::{DetailResolver, PLACEHOLDER_IMAGE};
use crate::upstream::{PokemonRecord, SpeciesRecord, UpstreamError};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("pokemon not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[derive(Clone)]
pub struct ProfileService {
    resolver: DetailResolver,
    snapshot: Option<Arc<Snapshot>>,
}

impl ProfileService {
    pub fn new(resolver: DetailResolver, snapshot: Option<Arc<Snapshot>>) -> Self {
        Self { resolver, snapshot }
    }

    pub async fn profile(&self, id: &str) -> Result<PokemonProfile, ProfileError> {
        if let Some(snapshot) = &self.snapshot
            && snapshot.get(id).is_none()
        {
            return Err(ProfileError::NotFound(id.to_string()));
        }

        let client = self.resolver.client();
        let base = client.pokemon(id).await.map_err(|e| {
            if e.is_not_found() {
                ProfileError::NotFound(id.to_string())
            } else {
                ProfileError::Upstream(e)
            }
        })?;
        let species_id = base
            .species
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| base.id.to_string());
        let species = client.species(&species_id).await?;

        let entity_id = base.id.to_string();
        let number = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.display_number(&entity_id))
            .unwrap_or_else(|| display_number(&entity_id));
        let types = join_all(
            base.types
                .iter()
                .map(|slot| self.resolver.category_name(&slot.kind.name)),
        )
        .await;
        let forms = self.forms(&entity_id, &species, &number);

        Ok(PokemonProfile {
            name: self
                .resolver
                .pick(&species.names)
                .unwrap_or(&base.name)
                .to_string(),
            image: base.sprites.best().unwrap_or(PLACEHOLDER_IMAGE).to_string(),
            height: base.height,
            weight: base.weight,
            types,
            abilities: abilities(&base),
            stats: stats(&base),
            habitat: locale::or_unknown(locale::habitat_name, named(&species.habitat)),
            color: locale::or_unknown(locale::color_name, named(&species.color)),
            shape: locale::or_unknown(locale::shape_name, named(&species.shape)),
            forms,
            number,
            id: entity_id,
        })
    }

    /// Alternate forms: the snapshot's entries sharing the number, else the
    /// species varieties. `None` unless there are at least two.
    fn forms(&self, id: &str, species: &SpeciesRecord, number: &str) -> Option<Vec<FormRef>> {
        if let Some(snapshot) = &self.snapshot {
            return snapshot.forms_of(id);
        }
        let forms: Vec<FormRef> = species
            .varieties
            .iter()
            .filter_map(|variety| {
                Some(FormRef {
                    id: variety.pokemon.id()?.to_string(),
                    name: variety.pokemon.name.clone(),
                    number: number.to_string(),
                })
            })
            .collect();
        (forms.len() > 1).then_some(forms)
    }
}

fn named(resource: &Option<crate::upstream::NamedResource>) -> Option<&str> {
    resource.as_ref().map(|r| r.name.as_str())
}

fn abilities(base: &PokemonRecord) -> Vec<String> {
    base.abilities
        .iter()
        .map(|slot| locale::or_key(locale::ability_name, &slot.ability.name))
        .collect()
}

fn stats(base: &PokemonRecord) -> Vec<StatValue> {
    base.stats
        .iter()
        .map(|slot| StatValue {
            name: locale::or_key(locale::stat_name, &slot.stat.name),
            value: slot.base_stat,
        })
        .collect()
}
