use log::debug;

use std::collections::HashMap;

use crate::model::*;

/// The canonical sequence of election records, plus secondary indices for
/// lookup by election, by party within an election and by constituency
/// within an election.
///
/// Positions in the index vectors are positions in the primary sequence and
/// are kept in ascending order, so every index enumerates its records in
/// insertion order. Records are never deleted individually; [RecordStore::clear]
/// is the only way to remove data.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<ElectionRecord>,
    by_key: HashMap<RecordKey, usize>,
    by_election: HashMap<ElectionKey, Vec<usize>>,
    by_party: HashMap<PartyKey, Vec<usize>>,
    by_constituency: HashMap<ConstituencyKey, Vec<usize>>,
}

impl RecordStore {
    pub fn new() -> RecordStore {
        RecordStore::default()
    }

    /// Adds a record to the store and to every index.
    ///
    /// Fails with [StoreError::DuplicateKey] if a record with the same
    /// identity key is already present, in which case the store is left
    /// unchanged.
    pub fn insert(&mut self, record: ElectionRecord) -> Result<(), StoreError> {
        let key = record.key();
        if self.by_key.contains_key(&key) {
            return Err(StoreError::DuplicateKey(key));
        }
        let pos = self.records.len();
        self.by_election
            .entry(ElectionKey {
                country: record.country.clone(),
                year: record.year,
            })
            .or_default()
            .push(pos);
        self.by_party
            .entry(PartyKey {
                country: record.country.clone(),
                year: record.year,
                party: record.party.clone(),
            })
            .or_default()
            .push(pos);
        self.by_constituency
            .entry(ConstituencyKey {
                country: record.country.clone(),
                year: record.year,
                constituency: record.constituency.clone(),
            })
            .or_default()
            .push(pos);
        self.by_key.insert(key, pos);
        self.records.push(record);
        Ok(())
    }

    /// Replaces the mutable fields (`votes`, `elected`, `party`) of the
    /// record with the same identity key as `record`.
    ///
    /// A change of `party` re-routes the party index under the new name.
    /// The identity-key fields themselves are immutable: a record with a
    /// different key is a different record. Fails with
    /// [StoreError::NotFound] if the key is absent, leaving the store
    /// unchanged.
    pub fn update(&mut self, record: ElectionRecord) -> Result<(), StoreError> {
        let key = record.key();
        let pos = match self.by_key.get(&key) {
            Some(p) => *p,
            None => return Err(StoreError::NotFound(key)),
        };
        let old_party = self.records[pos].party.clone();
        if old_party != record.party {
            debug!(
                "update: re-routing party index {:?} -> {:?} for {:?}",
                old_party, record.party, key
            );
            let old_key = PartyKey {
                country: record.country.clone(),
                year: record.year,
                party: old_party,
            };
            let mut now_empty = false;
            if let Some(positions) = self.by_party.get_mut(&old_key) {
                positions.retain(|p| *p != pos);
                now_empty = positions.is_empty();
            }
            if now_empty {
                self.by_party.remove(&old_key);
            }
            let positions = self
                .by_party
                .entry(PartyKey {
                    country: record.country.clone(),
                    year: record.year,
                    party: record.party.clone(),
                })
                .or_default();
            // Insert at the sorted position so the index stays in
            // insertion order.
            if let Err(idx) = positions.binary_search(&pos) {
                positions.insert(idx, pos);
            }
        }
        let stored = &mut self.records[pos];
        stored.party = record.party;
        stored.votes = record.votes;
        stored.elected = record.elected;
        Ok(())
    }

    /// The record with this identity key, if present.
    pub fn lookup(
        &self,
        country: &str,
        year: u32,
        constituency: &str,
        candidate: &str,
    ) -> Option<&ElectionRecord> {
        let key = RecordKey {
            country: country.to_string(),
            year,
            constituency: constituency.to_string(),
            candidate: candidate.to_string(),
        };
        self.by_key.get(&key).map(|pos| &self.records[*pos])
    }

    /// All the records of one election, in insertion order.
    pub fn records_for_election(&self, country: &str, year: u32) -> Vec<&ElectionRecord> {
        self.matching(self.by_election.get(&ElectionKey::new(country, year)))
    }

    /// All the records of one party in one election, in insertion order.
    pub fn records_for_party(&self, country: &str, year: u32, party: &str) -> Vec<&ElectionRecord> {
        let key = PartyKey {
            country: country.to_string(),
            year,
            party: party.to_string(),
        };
        self.matching(self.by_party.get(&key))
    }

    /// All the records of one constituency in one election, in insertion order.
    pub fn records_for_constituency(
        &self,
        country: &str,
        year: u32,
        constituency: &str,
    ) -> Vec<&ElectionRecord> {
        let key = ConstituencyKey {
            country: country.to_string(),
            year,
            constituency: constituency.to_string(),
        };
        self.matching(self.by_constituency.get(&key))
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    /// The full sequence of records, in insertion order.
    pub fn all_records(&self) -> &[ElectionRecord] {
        &self.records
    }

    /// Empties the store and every index.
    pub fn clear(&mut self) {
        self.records.clear();
        self.by_key.clear();
        self.by_election.clear();
        self.by_party.clear();
        self.by_constituency.clear();
    }

    fn matching(&self, positions: Option<&Vec<usize>>) -> Vec<&ElectionRecord> {
        match positions {
            Some(ps) => ps.iter().map(|pos| &self.records[*pos]).collect(),
            None => Vec::new(),
        }
    }
}
