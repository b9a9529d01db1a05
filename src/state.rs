use crate::record::{Observation, ObservationDraft, ObservationId, Rarity};
use log::warn;
use std::collections::HashSet;

/// Client-held copy of the server's observations, in server order plus appends.
#[derive(Debug, Default, Clone)]
pub struct ObservationList {
    records: Vec<Observation>,
}

impl ObservationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the server's list as-is except for repeated ids, where the first wins.
    pub fn replace_all(&mut self, records: Vec<Observation>) {
        let mut seen = HashSet::new();
        self.records = records
            .into_iter()
            .filter(|record| {
                let fresh = seen.insert(record.id.clone());
                if !fresh {
                    warn!("Server listed id {} more than once, keeping the first", record.id);
                }
                fresh
            })
            .collect();
    }

    /// Appends a persisted record. A record whose id is already present replaces
    /// nothing and is dropped, keeping ids unique.
    pub fn append(&mut self, record: Observation) -> bool {
        if self.contains(&record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Idempotent: removing an absent id is a no-op returning `None`.
    pub fn remove_by_id(&mut self, id: &ObservationId) -> Option<Observation> {
        let index = self.records.iter().position(|r| &r.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn get(&self, id: &ObservationId) -> Option<&Observation> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &ObservationId) -> bool {
        self.get(id).is_some()
    }

    pub fn records(&self) -> &[Observation] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// The add-observation form's transient fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservationForm {
    pub name: String,
    pub rarity: Rarity,
    pub notes: String,
}

impl ObservationForm {
    pub fn draft(&self) -> ObservationDraft {
        ObservationDraft::new(self.name.trim(), self.rarity, self.notes.clone())
    }

    /// Rarity goes back to `common`, not blank.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
