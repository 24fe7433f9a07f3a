mod model;
mod store;

use log::debug;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

pub use crate::model::*;
pub use crate::store::RecordStore;

// **** Aggregation engine ****
//
// Every function here is a pure, single-pass computation over the current
// contents of a store. Nothing is cached: identical store contents and
// identical parameters always produce identical results, including the order
// of tied entries.

/// Sum of the votes cast in one election.
pub fn total_votes(store: &RecordStore, country: &str, year: u32) -> u64 {
    store
        .records_for_election(country, year)
        .iter()
        .map(|r| r.votes)
        .sum()
}

/// Number of seats won in one election (records with `elected` set).
pub fn total_seats(store: &RecordStore, country: &str, year: u32) -> u32 {
    store
        .records_for_election(country, year)
        .iter()
        .filter(|r| r.elected)
        .count() as u32
}

/// Per-party vote totals, seats, candidate counts and vote shares for one
/// election, sorted by total votes descending.
///
/// Ties are broken by party name ascending so that the ranking does not
/// depend on grouping order. An election with zero total votes yields zero
/// shares rather than a division error.
pub fn party_vote_shares(store: &RecordStore, country: &str, year: u32) -> Vec<PartyStats> {
    let records = store.records_for_election(country, year);
    let election_votes: u64 = records.iter().map(|r| r.votes).sum();

    let mut by_party: HashMap<&str, PartyStats> = HashMap::new();
    for r in records.iter() {
        let stats = by_party.entry(r.party.as_str()).or_insert(PartyStats {
            party: r.party.clone(),
            total_votes: 0,
            seats_won: 0,
            vote_share: 0.0,
            candidates_count: 0,
        });
        stats.total_votes += r.votes;
        stats.candidates_count += 1;
        if r.elected {
            stats.seats_won += 1;
        }
    }

    let mut parties: Vec<PartyStats> = by_party.into_values().collect();
    if election_votes > 0 {
        for p in parties.iter_mut() {
            p.vote_share = (p.total_votes as f64 * 100.0) / election_votes as f64;
        }
    }
    parties.sort_by(|a, b| {
        b.total_votes
            .cmp(&a.total_votes)
            .then_with(|| a.party.cmp(&b.party))
    });
    debug!(
        "party_vote_shares: {}/{}: {} parties over {} votes",
        country,
        year,
        parties.len(),
        election_votes
    );
    parties
}

/// The full statistics bundle for one election.
///
/// An unknown `(country, year)` pair yields all-zero numbers and an empty
/// party list, not an error.
pub fn election_stats(store: &RecordStore, country: &str, year: u32) -> ElectionStats {
    let records = store.records_for_election(country, year);
    let constituencies: HashSet<&str> = records.iter().map(|r| r.constituency.as_str()).collect();
    ElectionStats {
        country: country.to_string(),
        year,
        total_votes: total_votes(store, country, year),
        total_seats: total_seats(store, country, year),
        total_candidates: records.len() as u32,
        constituencies: constituencies.len() as u32,
        party_stats: party_vote_shares(store, country, year),
    }
}

/// Seats per party in one election. Parties without a seat are absent from
/// the mapping, not present with a zero.
pub fn seat_distribution(store: &RecordStore, country: &str, year: u32) -> BTreeMap<String, u32> {
    let mut seats: BTreeMap<String, u32> = BTreeMap::new();
    for r in store.records_for_election(country, year) {
        if r.elected {
            *seats.entry(r.party.clone()).or_insert(0) += 1;
        }
    }
    seats
}

/// Parties of one election ranked by total votes descending.
pub fn rank_parties_by_votes(store: &RecordStore, country: &str, year: u32) -> Vec<PartyStats> {
    party_vote_shares(store, country, year)
}

/// Parties of one election ranked by seats won descending.
///
/// Ties are broken by total votes descending, then by party name ascending.
pub fn rank_parties_by_seats(store: &RecordStore, country: &str, year: u32) -> Vec<PartyStats> {
    let mut parties = party_vote_shares(store, country, year);
    parties.sort_by(|a, b| {
        b.seats_won
            .cmp(&a.seats_won)
            .then_with(|| b.total_votes.cmp(&a.total_votes))
            .then_with(|| a.party.cmp(&b.party))
    });
    parties
}

/// The `n` candidates of one election with the most votes, sorted by votes
/// descending with ties broken by candidate name ascending.
pub fn top_candidates(
    store: &RecordStore,
    country: &str,
    year: u32,
    n: usize,
) -> Vec<ElectionRecord> {
    let mut records: Vec<ElectionRecord> = store
        .records_for_election(country, year)
        .into_iter()
        .cloned()
        .collect();
    sort_by_votes(&mut records);
    records.truncate(n);
    records
}

/// The elected candidates of one election, sorted like [top_candidates].
pub fn winning_candidates(store: &RecordStore, country: &str, year: u32) -> Vec<ElectionRecord> {
    let mut winners: Vec<ElectionRecord> = store
        .records_for_election(country, year)
        .into_iter()
        .filter(|r| r.elected)
        .cloned()
        .collect();
    sort_by_votes(&mut winners);
    winners
}

fn sort_by_votes(records: &mut [ElectionRecord]) {
    records.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| a.candidate.cmp(&b.candidate))
    });
}

/// Compares two elections of the same country.
///
/// Per-party deltas cover the union of the parties seen in either year; a
/// party absent from one year contributes zero votes and zero seats to its
/// delta. Parties only present in `year2` are reported as new, parties only
/// present in `year1` as disappeared. All three lists are in ascending party
/// name order.
pub fn compare_elections(
    store: &RecordStore,
    country: &str,
    year1: u32,
    year2: u32,
) -> ComparativeAnalysis {
    let stats1 = election_stats(store, country, year1);
    let stats2 = election_stats(store, country, year2);
    debug!(
        "compare_elections: {}: {} ({} votes) vs {} ({} votes)",
        country, year1, stats1.total_votes, year2, stats2.total_votes
    );

    let by_party1: HashMap<&str, &PartyStats> = stats1
        .party_stats
        .iter()
        .map(|p| (p.party.as_str(), p))
        .collect();
    let by_party2: HashMap<&str, &PartyStats> = stats2
        .party_stats
        .iter()
        .map(|p| (p.party.as_str(), p))
        .collect();

    let all_parties: BTreeSet<&str> = by_party1
        .keys()
        .chain(by_party2.keys())
        .cloned()
        .collect();

    let mut party_changes: Vec<PartyChange> = Vec::new();
    let mut new_parties: Vec<String> = Vec::new();
    let mut disappeared_parties: Vec<String> = Vec::new();
    for party in all_parties.iter() {
        let p1 = by_party1.get(party);
        let p2 = by_party2.get(party);
        let (votes1, seats1) = p1.map_or((0, 0), |p| (p.total_votes, p.seats_won));
        let (votes2, seats2) = p2.map_or((0, 0), |p| (p.total_votes, p.seats_won));
        party_changes.push(PartyChange {
            party: party.to_string(),
            vote_change: votes2 as i64 - votes1 as i64,
            seat_change: seats2 as i64 - seats1 as i64,
        });
        match (p1, p2) {
            (None, Some(_)) => new_parties.push(party.to_string()),
            (Some(_), None) => disappeared_parties.push(party.to_string()),
            _ => {}
        }
    }

    let vote_change = stats2.total_votes as i64 - stats1.total_votes as i64;
    let vote_change_percent = if stats1.total_votes > 0 {
        (vote_change as f64 * 100.0) / stats1.total_votes as f64
    } else {
        0.0
    };

    ComparativeAnalysis {
        country: country.to_string(),
        year1,
        year2,
        vote_change,
        vote_change_percent,
        party_changes,
        new_parties,
        disappeared_parties,
    }
}

/// One party's stats across the given years, processed in the given order
/// (duplicates allowed).
///
/// Years in which the party has no records are omitted from the result.
pub fn party_trend(
    store: &RecordStore,
    country: &str,
    party: &str,
    years: &[u32],
) -> Vec<PartyTrendEntry> {
    let mut trend: Vec<PartyTrendEntry> = Vec::new();
    for &year in years {
        let parties = party_vote_shares(store, country, year);
        if let Some(stats) = parties.into_iter().find(|p| p.party == party) {
            trend.push(PartyTrendEntry { year, stats });
        }
    }
    trend
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(
        country: &str,
        year: u32,
        constituency: &str,
        candidate: &str,
        party: &str,
        votes: u64,
        elected: bool,
    ) -> ElectionRecord {
        ElectionRecord {
            country: country.to_string(),
            year,
            constituency: constituency.to_string(),
            candidate: candidate.to_string(),
            party: party.to_string(),
            votes,
            elected,
        }
    }

    fn store_2020() -> RecordStore {
        let mut store = RecordStore::new();
        store.insert(rec("C", 2020, "K1", "A", "P1", 1000, true)).unwrap();
        store.insert(rec("C", 2020, "K2", "B", "P1", 2000, true)).unwrap();
        store.insert(rec("C", 2020, "K3", "D", "P2", 1500, false)).unwrap();
        store
    }

    #[test]
    fn totals_and_stats() {
        let store = store_2020();
        assert_eq!(total_votes(&store, "C", 2020), 4500);
        assert_eq!(total_seats(&store, "C", 2020), 2);
        let stats = election_stats(&store, "C", 2020);
        assert_eq!(stats.total_candidates, 3);
        assert_eq!(stats.constituencies, 3);
        let p1 = stats.party_stats.iter().find(|p| p.party == "P1").unwrap();
        assert_eq!(p1.total_votes, 3000);
        assert_eq!(p1.seats_won, 2);
        assert_eq!(p1.candidates_count, 2);
    }

    #[test]
    fn stats_for_unknown_election_are_zero() {
        let store = store_2020();
        assert_eq!(total_votes(&store, "C", 1999), 0);
        let stats = election_stats(&store, "X", 2020);
        assert_eq!(stats.total_votes, 0);
        assert_eq!(stats.total_seats, 0);
        assert_eq!(stats.total_candidates, 0);
        assert_eq!(stats.constituencies, 0);
        assert!(stats.party_stats.is_empty());
    }

    #[test]
    fn vote_shares_sum_to_one_hundred() {
        let store = store_2020();
        let parties = party_vote_shares(&store, "C", 2020);
        let sum: f64 = parties.iter().map(|p| p.vote_share).sum();
        assert!((sum - 100.0).abs() < 1e-6, "sum was {}", sum);
        // Sorted by votes descending.
        assert_eq!(parties[0].party, "P1");
        assert_eq!(parties[1].party, "P2");
    }

    #[test]
    fn vote_shares_with_zero_votes_are_zero() {
        let mut store = RecordStore::new();
        store.insert(rec("C", 2020, "K1", "A", "P1", 0, false)).unwrap();
        store.insert(rec("C", 2020, "K2", "B", "P2", 0, false)).unwrap();
        let parties = party_vote_shares(&store, "C", 2020);
        assert_eq!(parties.len(), 2);
        assert!(parties.iter().all(|p| p.vote_share == 0.0));
        // Equal vote counts fall back to name order.
        assert_eq!(parties[0].party, "P1");
        assert_eq!(parties[1].party, "P2");
    }

    #[test]
    fn seat_distribution_omits_seatless_parties() {
        let store = store_2020();
        let seats = seat_distribution(&store, "C", 2020);
        assert_eq!(seats.get("P1"), Some(&2));
        assert!(!seats.contains_key("P2"));
        assert_eq!(seats.len(), 1);
    }

    #[test]
    fn rank_by_seats_breaks_ties_by_votes_then_name() {
        let mut store = RecordStore::new();
        store.insert(rec("C", 2020, "K1", "A", "P1", 500, true)).unwrap();
        store.insert(rec("C", 2020, "K2", "B", "P2", 800, true)).unwrap();
        store.insert(rec("C", 2020, "K3", "D", "P3", 800, true)).unwrap();
        let ranked = rank_parties_by_seats(&store, "C", 2020);
        let names: Vec<&str> = ranked.iter().map(|p| p.party.as_str()).collect();
        // One seat each: votes descending, then name ascending for P2 vs P3.
        assert_eq!(names, vec!["P2", "P3", "P1"]);
    }

    #[test]
    fn top_candidates_sorted_and_truncated() {
        let store = store_2020();
        let top = top_candidates(&store, "C", 2020, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].candidate, "B");
        assert_eq!(top[1].candidate, "D");
        assert!(top[0].votes >= top[1].votes);
        // n larger than the number of candidates is clamped.
        assert_eq!(top_candidates(&store, "C", 2020, 10).len(), 3);
        assert!(top_candidates(&store, "C", 2020, 0).is_empty());
    }

    #[test]
    fn top_candidates_ties_broken_by_name() {
        let mut store = RecordStore::new();
        store.insert(rec("C", 2020, "K1", "Zoe", "P1", 700, false)).unwrap();
        store.insert(rec("C", 2020, "K2", "Ada", "P2", 700, false)).unwrap();
        let top = top_candidates(&store, "C", 2020, 2);
        assert_eq!(top[0].candidate, "Ada");
        assert_eq!(top[1].candidate, "Zoe");
    }

    #[test]
    fn winning_candidates_filters_and_sorts() {
        let store = store_2020();
        let winners = winning_candidates(&store, "C", 2020);
        let names: Vec<&str> = winners.iter().map(|r| r.candidate.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn compare_elections_deltas_and_party_sets() {
        let mut store = RecordStore::new();
        store.insert(rec("C", 2020, "K1", "A", "P1", 1000, true)).unwrap();
        store.insert(rec("C", 2020, "K2", "B", "P2", 2000, true)).unwrap();
        store.insert(rec("C", 2021, "K1", "A", "P1", 1500, true)).unwrap();
        store.insert(rec("C", 2021, "K2", "B", "P2", 2500, true)).unwrap();
        store.insert(rec("C", 2021, "K3", "D", "P3", 1000, false)).unwrap();
        let analysis = compare_elections(&store, "C", 2020, 2021);
        assert_eq!(analysis.vote_change, 2000);
        let p1 = analysis
            .party_changes
            .iter()
            .find(|c| c.party == "P1")
            .unwrap();
        assert_eq!(p1.vote_change, 500);
        let p2 = analysis
            .party_changes
            .iter()
            .find(|c| c.party == "P2")
            .unwrap();
        assert_eq!(p2.vote_change, 500);
        // P3 only exists in 2021: its delta counts from zero.
        let p3 = analysis
            .party_changes
            .iter()
            .find(|c| c.party == "P3")
            .unwrap();
        assert_eq!(p3.vote_change, 1000);
        assert_eq!(p3.seat_change, 0);
        assert_eq!(analysis.new_parties, vec!["P3".to_string()]);
        assert!(analysis.disappeared_parties.is_empty());
    }

    #[test]
    fn compare_elections_with_empty_first_year() {
        let mut store = RecordStore::new();
        store.insert(rec("C", 2021, "K1", "A", "P1", 1000, true)).unwrap();
        let analysis = compare_elections(&store, "C", 2020, 2021);
        assert_eq!(analysis.vote_change, 1000);
        assert_eq!(analysis.vote_change_percent, 0.0);
        assert_eq!(analysis.new_parties, vec!["P1".to_string()]);
    }

    #[test]
    fn party_trend_omits_absent_years() {
        let mut store = RecordStore::new();
        store.insert(rec("C", 2020, "K1", "A", "P1", 1000, true)).unwrap();
        store.insert(rec("C", 2021, "K1", "A", "P1", 1200, true)).unwrap();
        store.insert(rec("C", 2021, "K2", "B", "P2", 800, false)).unwrap();
        let trend = party_trend(&store, "C", "P1", &[2019, 2020, 2021]);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].year, 2020);
        assert_eq!(trend[1].year, 2021);
        assert_eq!(trend[1].stats.total_votes, 1200);
        // Years are processed in the given order, duplicates included.
        let trend = party_trend(&store, "C", "P1", &[2021, 2020, 2021]);
        let years: Vec<u32> = trend.iter().map(|e| e.year).collect();
        assert_eq!(years, vec![2021, 2020, 2021]);
    }

    #[test]
    fn update_is_visible_to_queries() {
        let mut store = store_2020();
        store.update(rec("C", 2020, "K3", "D", "P2", 2500, true)).unwrap();
        assert_eq!(total_votes(&store, "C", 2020), 5500);
        assert_eq!(total_seats(&store, "C", 2020), 3);
        let seats = seat_distribution(&store, "C", 2020);
        assert_eq!(seats.get("P2"), Some(&1));
    }
}
