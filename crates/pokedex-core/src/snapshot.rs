//! Static snapshot of the upstream catalog.
//!
//! The snapshot is a JSON array generated offline:
//!
//! ```json
//! [{ "id": "3", "name_en": "venusaur", "name_ja": "フシギバナ", "number": "003" },
//!  { "id": "10033", "name_en": "venusaur-mega", "name_ja": "メガフシギバナ", "number": "003" }]
//! ```
//!
//! Entries sharing a `number` are alternate forms of one entity.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::id::display_number;
use crate::model::FormRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id: String,
    pub name_en: String,
    pub name_ja: String,
    pub number: String,
}

/// Loaded snapshot with an id lookup table.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
    by_id: HashMap<String, usize>,
}

impl Snapshot {
    pub fn from_entries(entries: Vec<SnapshotEntry>) -> Self {
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.id.clone(), idx))
            .collect();
        Self { entries, by_id }
    }

    /// Read and parse a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let entries: Vec<SnapshotEntry> = serde_json::from_str(&raw)?;
        tracing::info!(
            path = %path.as_ref().display(),
            entries = entries.len(),
            "Snapshot loaded"
        );
        Ok(Self::from_entries(entries))
    }

    pub fn get(&self, id: &str) -> Option<&SnapshotEntry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display number for an id, if the snapshot knows it.
    pub fn display_number(&self, id: &str) -> Option<String> {
        self.get(id).map(|entry| display_number(&entry.number))
    }

    /// All forms sharing the id's number, or `None` unless there are at least two.
    pub fn forms_of(&self, id: &str) -> Option<Vec<FormRef>> {
        let entry = self.get(id)?;
        let forms: Vec<FormRef> = self
            .entries
            .iter()
            .filter(|other| other.number == entry.number)
            .map(|other| FormRef {
                id: other.id.clone(),
                name: other.name_ja.clone(),
                number: display_number(&other.number),
            })
            .collect();
        (forms.len() > 1).then_some(forms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> Vec<SnapshotEntry> {
        vec![
            SnapshotEntry {
                id: "3".into(),
                name_en: "venusaur".into(),
                name_ja: "フシギバナ".into(),
                number: "003".into(),
            },
            SnapshotEntry {
                id: "10033".into(),
                name_en: "venusaur-mega".into(),
                name_ja: "メガフシギバナ".into(),
                number: "003".into(),
            },
            SnapshotEntry {
                id: "25".into(),
                name_en: "pikachu".into(),
                name_ja: "ピカチュウ".into(),
                number: "025".into(),
            },
        ]
    }

    #[test]
    fn test_forms_only_when_shared() {
        let snapshot = Snapshot::from_entries(sample());

        let forms = snapshot.forms_of("3").unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[1].name, "メガフシギバナ");
        assert_eq!(forms[1].number, "No.003");

        assert!(snapshot.forms_of("25").is_none());
        assert!(snapshot.forms_of("999").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&sample()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let snapshot = Snapshot::load(file.path()).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get("25").unwrap().name_ja, "ピカチュウ");
        assert_eq!(snapshot.display_number("10033").as_deref(), Some("No.003"));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(Snapshot::load(file.path()).is_err());
    }
}
