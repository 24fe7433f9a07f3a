// Primitives for reading the election result CSV files.

use log::{debug, warn};

use election_analytics::ElectionRecord;

use snafu::prelude::*;

use crate::analysis::{AnalysisResult, CsvOpenSnafu};

const NUM_FIELDS: usize = 7;

/// Reads one CSV file of election result rows.
///
/// The expected columns, in order: country, year, constituency, candidate,
/// party, votes, elected. The first row is a header and is skipped.
/// Malformed rows (missing fields, unparseable year or votes, year 0) are
/// skipped with a warning; only a file-level open failure is an error.
pub fn read_records(path: &str) -> AnalysisResult<Vec<ElectionRecord>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut res: Vec<ElectionRecord> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = match line_r {
            Ok(l) => l,
            Err(e) => {
                warn!("{}:{}: skipping unreadable row: {}", path, lineno, e);
                continue;
            }
        };
        debug!("read_records: {}:{}: {:?}", path, lineno, line);
        match parse_record(&line) {
            Some(record) => res.push(record),
            None => {
                warn!("{}:{}: skipping malformed row", path, lineno);
            }
        }
    }
    Ok(res)
}

/// Maps one row to a record, or `None` if the row is malformed.
fn parse_record(line: &csv::StringRecord) -> Option<ElectionRecord> {
    if line.len() < NUM_FIELDS {
        return None;
    }
    let year = line.get(1)?.parse::<u32>().ok()?;
    if year == 0 {
        return None;
    }
    let votes = line.get(5)?.parse::<u64>().ok()?;
    Some(ElectionRecord {
        country: line.get(0)?.to_string(),
        year,
        constituency: line.get(2)?.to_string(),
        candidate: line.get(3)?.to_string(),
        party: line.get(4)?.to_string(),
        votes,
        elected: parse_elected(line.get(6)?),
    })
}

/// The `elected` column accepts `yes`, `true` or `1` (case-insensitive);
/// anything else means not elected.
fn parse_elected(token: &str) -> bool {
    matches!(
        token.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1"
    )
}
