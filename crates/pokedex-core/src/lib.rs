pub mod error;
pub mod id;
pub mod locale;
pub mod model;
pub mod paging;
pub mod search;
pub mod snapshot;

pub use error::{CoreError, Result};
pub use id::{display_number, entity_id_from_url, numeric_order};
pub use model::{EntityDetail, EntityListItem, FormRef, PageEnvelope, PokemonProfile, StatValue};
pub use paging::{PageQuery, total_pages};
pub use search::normalize_term;
pub use snapshot::{Snapshot, SnapshotEntry};
