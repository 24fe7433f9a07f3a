use log::{debug, info, warn};

use election_analytics::*;
use snafu::{prelude::*, Snafu};

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{Args, Command};

pub mod io_csv;

#[derive(Debug, Snafu)]
pub enum AnalysisError {
    #[snafu(display("Error opening data file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing reference file {path}"))]
    ParsingReference {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing output file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading configuration file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration file {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display(""))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Description of a data set, as read from a JSON configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Paths relative to the configuration file.
    #[serde(rename = "dataFiles")]
    pub data_files: Vec<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

/// The data files named by a configuration file, resolved against its
/// parent directory.
fn read_config(config_path: &str) -> AnalysisResult<(AnalysisConfig, Vec<String>)> {
    let contents = fs::read_to_string(config_path).context(OpeningConfigSnafu {
        path: config_path,
    })?;
    let config: AnalysisConfig = serde_json::from_str(&contents).context(ParsingConfigSnafu {
        path: config_path,
    })?;
    info!("config: {:?}", config);
    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;
    let paths = config
        .data_files
        .iter()
        .map(|f| {
            let p: PathBuf = root_p.join(f);
            p.display().to_string()
        })
        .collect();
    Ok((config, paths))
}

/// Loads every input file into a fresh store.
///
/// Rows whose identity key is already present are skipped with a warning:
/// the first occurrence wins, the store is never left half-updated.
fn load_store(paths: &[String]) -> AnalysisResult<RecordStore> {
    let mut store = RecordStore::new();
    for path in paths {
        let records = io_csv::read_records(path)?;
        let mut inserted: usize = 0;
        let mut duplicates: usize = 0;
        for record in records {
            match store.insert(record) {
                Ok(()) => inserted += 1,
                Err(StoreError::DuplicateKey(key)) => {
                    warn!("{}: skipping duplicate record {:?}", path, key);
                    duplicates += 1;
                }
                Err(e) => whatever!("Unexpected store error: {:?}", e),
            }
        }
        info!(
            "Loaded {}: {} records ({} duplicates skipped)",
            path, inserted, duplicates
        );
    }
    info!("Store contains {} records", store.total_count());
    Ok(store)
}

fn party_stats_to_json(ps: &PartyStats) -> JSValue {
    json!({
        "party": ps.party,
        "totalVotes": ps.total_votes,
        "voteShare": ps.vote_share,
        "seatsWon": ps.seats_won,
        "candidatesCount": ps.candidates_count,
    })
}

fn stats_to_json(stats: &ElectionStats) -> JSValue {
    let parties: Vec<JSValue> = stats.party_stats.iter().map(party_stats_to_json).collect();
    json!({
        "country": stats.country,
        "year": stats.year,
        "totalVotes": stats.total_votes,
        "totalSeats": stats.total_seats,
        "totalCandidates": stats.total_candidates,
        "constituencies": stats.constituencies,
        "parties": parties,
    })
}

fn candidates_to_json(records: &[ElectionRecord]) -> JSValue {
    let candidates: Vec<JSValue> = records
        .iter()
        .map(|r| {
            json!({
                "candidate": r.candidate,
                "party": r.party,
                "constituency": r.constituency,
                "votes": r.votes,
                "elected": r.elected,
            })
        })
        .collect();
    json!({ "candidates": candidates })
}

fn comparison_to_json(analysis: &ComparativeAnalysis) -> JSValue {
    let changes: Vec<JSValue> = analysis
        .party_changes
        .iter()
        .map(|c| {
            json!({
                "party": c.party,
                "voteChange": c.vote_change,
                "seatChange": c.seat_change,
            })
        })
        .collect();
    json!({
        "country": analysis.country,
        "year1": analysis.year1,
        "year2": analysis.year2,
        "voteChange": analysis.vote_change,
        "voteChangePercent": analysis.vote_change_percent,
        "partyChanges": changes,
        "newParties": analysis.new_parties,
        "disappearedParties": analysis.disappeared_parties,
    })
}

fn seats_to_json(country: &str, year: u32, seats: &BTreeMap<String, u32>) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (party, count) in seats.iter() {
        m.insert(party.clone(), json!(count));
    }
    json!({ "country": country, "year": year, "seats": m })
}

fn trend_to_json(country: &str, party: &str, trend: &[PartyTrendEntry]) -> JSValue {
    let entries: Vec<JSValue> = trend
        .iter()
        .map(|e| {
            json!({
                "year": e.year,
                "totalVotes": e.stats.total_votes,
                "voteShare": e.stats.vote_share,
                "seatsWon": e.stats.seats_won,
                "candidatesCount": e.stats.candidates_count,
            })
        })
        .collect();
    json!({ "country": country, "party": party, "trend": entries })
}

/// The countries seen in the store and their election years, sorted.
fn countries_to_json(store: &RecordStore) -> JSValue {
    let mut country_years: BTreeMap<&str, BTreeSet<u32>> = BTreeMap::new();
    for record in store.all_records() {
        country_years
            .entry(record.country.as_str())
            .or_default()
            .insert(record.year);
    }
    let countries: Vec<JSValue> = country_years
        .iter()
        .map(|(name, years)| {
            let ys: Vec<u32> = years.iter().cloned().collect();
            json!({ "name": name, "years": ys })
        })
        .collect();
    json!({ "countries": countries })
}

fn run_query(store: &RecordStore, command: &Command) -> JSValue {
    match command {
        Command::Countries => countries_to_json(store),
        Command::Stats { country, year } => {
            stats_to_json(&election_stats(store, country, *year))
        }
        Command::Seats { country, year } => {
            seats_to_json(country, *year, &seat_distribution(store, country, *year))
        }
        Command::Top { country, year, n } => {
            candidates_to_json(&top_candidates(store, country, *year, *n))
        }
        Command::Winners { country, year } => {
            candidates_to_json(&winning_candidates(store, country, *year))
        }
        Command::Compare {
            country,
            year1,
            year2,
        } => comparison_to_json(&compare_elections(store, country, *year1, *year2)),
        Command::Trend {
            country,
            party,
            years,
        } => trend_to_json(country, party, &party_trend(store, country, party, years)),
    }
}

pub fn run(args: &Args) -> AnalysisResult<()> {
    let mut paths: Vec<String> = args.input.clone();
    let mut config_out: Option<String> = None;
    if let Some(config_path) = &args.config {
        let (config, config_paths) = read_config(config_path)?;
        paths.extend(config_paths);
        config_out = config.output_path;
    }
    if paths.is_empty() {
        whatever!("No input files: pass at least one --input file or a --config file")
    }
    let store = load_store(&paths)?;
    debug!("run: command: {:?}", args.command);

    let result_js = run_query(&store, &args.command);
    let pretty_js = serde_json::to_string_pretty(&result_js)
        .expect("serde_json::Value is always serializable");
    println!("{}", pretty_js);

    // --out overrides the path that may come from the configuration file.
    let out = args.out.clone().or(config_out);
    if let Some(out_path) = &out {
        fs::write(out_path, &pretty_js).context(WritingOutputSnafu {
            path: out_path.as_str(),
        })?;
        info!("Wrote output to {}", out_path);
    }

    // The reference output, if provided for comparison.
    if let Some(ref_path) = &args.reference {
        let contents = fs::read_to_string(ref_path).context(OpeningReferenceSnafu {
            path: ref_path.as_str(),
        })?;
        let reference_js: JSValue =
            serde_json::from_str(&contents).context(ParsingReferenceSnafu {
                path: ref_path.as_str(),
            })?;
        let pretty_reference = serde_json::to_string_pretty(&reference_js)
            .expect("serde_json::Value is always serializable");
        if pretty_reference != pretty_js {
            warn!("Found differences with the reference output");
            print_diff(pretty_reference.as_str(), pretty_js.as_str(), "\n");
            whatever!("Difference detected between computed output and reference output")
        }
    }

    Ok(())
}
