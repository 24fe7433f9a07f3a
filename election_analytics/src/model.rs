// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One candidate's result in one constituency of one election.
///
/// The four fields `(country, year, constituency, candidate)` form the
/// identity key of the record: no two records in a store may share them.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct ElectionRecord {
    pub country: String,
    pub year: u32,
    pub constituency: String,
    pub candidate: String,
    pub party: String,
    pub votes: u64,
    pub elected: bool,
}

impl ElectionRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            country: self.country.clone(),
            year: self.year,
            constituency: self.constituency.clone(),
            candidate: self.candidate.clone(),
        }
    }
}

/// The identity key of a record.
///
/// Keys are structured values rather than delimiter-joined strings, so field
/// contents can never collide with a separator.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RecordKey {
    pub country: String,
    pub year: u32,
    pub constituency: String,
    pub candidate: String,
}

/// An election: all the records sharing a `(country, year)` pair.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct ElectionKey {
    pub country: String,
    pub year: u32,
}

impl ElectionKey {
    pub fn new(country: &str, year: u32) -> ElectionKey {
        ElectionKey {
            country: country.to_string(),
            year,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub(crate) struct PartyKey {
    pub country: String,
    pub year: u32,
    pub party: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub(crate) struct ConstituencyKey {
    pub country: String,
    pub year: u32,
    pub constituency: String,
}

// ******** Output data structures *********

/// Aggregated results for one party in one election.
#[derive(PartialEq, Debug, Clone)]
pub struct PartyStats {
    pub party: String,
    pub total_votes: u64,
    pub seats_won: u32,
    /// Percentage of all votes cast in the election. Zero when the election
    /// itself has zero votes.
    pub vote_share: f64,
    pub candidates_count: u32,
}

/// The full statistics bundle for one election.
#[derive(PartialEq, Debug, Clone)]
pub struct ElectionStats {
    pub country: String,
    pub year: u32,
    pub total_votes: u64,
    pub total_seats: u32,
    pub total_candidates: u32,
    pub constituencies: u32,
    pub party_stats: Vec<PartyStats>,
}

/// Vote and seat deltas for one party between two elections.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartyChange {
    pub party: String,
    pub vote_change: i64,
    pub seat_change: i64,
}

/// Comparison of two elections in the same country.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparativeAnalysis {
    pub country: String,
    pub year1: u32,
    pub year2: u32,
    pub vote_change: i64,
    /// Percentage change relative to the first year. Zero when the first
    /// year has zero votes.
    pub vote_change_percent: f64,
    pub party_changes: Vec<PartyChange>,
    pub new_parties: Vec<String>,
    pub disappeared_parties: Vec<String>,
}

/// One point of a party's trend line: its stats in a given year.
#[derive(PartialEq, Debug, Clone)]
pub struct PartyTrendEntry {
    pub year: u32,
    pub stats: PartyStats,
}

/// Errors reported by the record store mutators.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StoreError {
    /// A record with the same identity key is already present.
    DuplicateKey(RecordKey),
    /// No record with this identity key is present.
    NotFound(RecordKey),
}

impl Error for StoreError {}

impl Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DuplicateKey(k) => write!(
                f,
                "duplicate record key: {}/{}/{}/{}",
                k.country, k.year, k.constituency, k.candidate
            ),
            StoreError::NotFound(k) => write!(
                f,
                "no record with key: {}/{}/{}/{}",
                k.country, k.year, k.constituency, k.candidate
            ),
        }
    }
}
