//! CSV ingest and normalization.
//!
//! This module turns the three input CSVs (per-race polls, historical
//! presidential results, generic-ballot polls) into clean domain records.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but say what happened)
//! - **Deterministic behavior**: row order is preserved, because pollster
//!   deduplication is first-encountered-in-input-order wins
//! - **Separation of concerns**: no model logic here
//!
//! One exception to skip-and-continue: an unrecognized poll `Type` aborts the
//! whole run. It signals a data-entry defect that must be fixed at the
//! source, and silently dropping the row would hide it.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::warn;

use crate::domain::{NATIONAL_RACE, Poll, PollType, PresidentialResult};
use crate::error::AppError;

/// Load the per-race poll dataset.
pub fn load_polls(path: &Path) -> Result<Vec<Poll>, AppError> {
    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;
    ensure_columns(path, &header_map, &["state", "date", "poll", "sample", "type", "dem", "gop"])?;

    let mut polls = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV lines are 1-based.
        let line = idx + 2;
        let Some(record) = check_record(result, path, line) else {
            continue;
        };

        let race = match get_required(&record, &header_map, "state") {
            Ok(s) => s.to_string(),
            Err(msg) => {
                skip_row(path, line, &msg);
                continue;
            }
        };
        match parse_poll_fields(&record, &header_map, race) {
            Ok(poll) => polls.push(poll),
            Err(RowIssue::Skip(msg)) => skip_row(path, line, &msg),
            Err(RowIssue::Abort(err)) => return Err(err),
        }
    }
    Ok(polls)
}

/// Load the generic-ballot dataset (national, no state column).
pub fn load_generic(path: &Path) -> Result<Vec<Poll>, AppError> {
    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;
    ensure_columns(path, &header_map, &["date", "poll", "sample", "type", "dem", "gop"])?;

    let mut polls = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let Some(record) = check_record(result, path, line) else {
            continue;
        };

        match parse_poll_fields(&record, &header_map, NATIONAL_RACE.to_string()) {
            Ok(mut poll) => {
                // The generic ballot is a two-way question.
                poll.ind = None;
                polls.push(poll);
            }
            Err(RowIssue::Skip(msg)) => skip_row(path, line, &msg),
            Err(RowIssue::Abort(err)) => return Err(err),
        }
    }
    Ok(polls)
}

/// Load historical presidential results (two reference elections per state).
pub fn load_results(path: &Path) -> Result<Vec<PresidentialResult>, AppError> {
    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;
    ensure_columns(path, &header_map, &["state", "clinton", "trump", "obama", "romney"])?;

    let mut results = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let Some(record) = check_record(result, path, line) else {
            continue;
        };

        match parse_result_fields(&record, &header_map) {
            Ok(row) => results.push(row),
            Err(msg) => skip_row(path, line, &msg),
        }
    }
    Ok(results)
}

/// Load a race list: one race name per line, `#` comments and blanks ignored.
pub fn load_race_list(path: &Path) -> Result<Vec<String>, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::new(2, format!("Failed to read race list '{}': {e}", path.display()))
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Why a poll row could not be used.
enum RowIssue {
    /// Recoverable defect: log and move on.
    Skip(String),
    /// Data-integrity defect: abort the run.
    Abort(AppError),
}

fn parse_poll_fields(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    race: String,
) -> Result<Poll, RowIssue> {
    let date = get_required(record, header_map, "date")
        .and_then(|s| parse_date(s))
        .map_err(RowIssue::Skip)?;
    let pollster = get_required(record, header_map, "poll")
        .map_err(RowIssue::Skip)?
        .to_string();

    let sample = get_required(record, header_map, "sample")
        .and_then(|s| parse_f64(s, "Sample"))
        .map_err(RowIssue::Skip)?;
    if sample <= 0.0 {
        return Err(RowIssue::Skip(format!("Non-positive `Sample` value {sample}.")));
    }

    let kind = get_required(record, header_map, "type")
        .map_err(RowIssue::Skip)
        .and_then(|s| PollType::parse(s).map_err(RowIssue::Abort))?;

    Ok(Poll {
        race,
        date,
        pollster,
        sample,
        kind,
        dem: parse_share(record, header_map, "dem"),
        gop: parse_share(record, header_map, "gop"),
        ind: parse_share(record, header_map, "ind"),
    })
}

fn parse_result_fields(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<PresidentialResult, String> {
    let state = get_required(record, header_map, "state")?.to_string();
    let dem_recent = get_required(record, header_map, "clinton").and_then(|s| parse_f64(s, "Clinton"))?;
    let gop_recent = get_required(record, header_map, "trump").and_then(|s| parse_f64(s, "Trump"))?;
    let dem_prior = get_required(record, header_map, "obama").and_then(|s| parse_f64(s, "Obama"))?;
    let gop_prior = get_required(record, header_map, "romney").and_then(|s| parse_f64(s, "Romney"))?;

    if dem_recent + gop_recent <= 0.0 || dem_prior + gop_prior <= 0.0 {
        return Err("Vote totals must be positive in both reference elections.".to_string());
    }

    Ok(PresidentialResult {
        state,
        dem_recent,
        gop_recent,
        dem_prior,
        gop_prior,
    })
}

fn open_csv(path: &Path) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn read_header_map(
    reader: &mut csv::Reader<File>,
    path: &Path,
) -> Result<HashMap<String, usize>, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers from '{}': {e}", path.display())))?;
    Ok(build_header_map(headers))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿State"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_columns(
    path: &Path,
    header_map: &HashMap<String, usize>,
    required: &[&str],
) -> Result<(), AppError> {
    for name in required {
        if !header_map.contains_key(*name) {
            return Err(AppError::new(
                2,
                format!("'{}': missing required column `{name}`", path.display()),
            ));
        }
    }
    Ok(())
}

fn check_record(
    result: Result<StringRecord, csv::Error>,
    path: &Path,
    line: usize,
) -> Option<StringRecord> {
    match result {
        Ok(r) => Some(r),
        Err(e) => {
            warn!("{}: line {line}: CSV parse error: {e} (row skipped)", path.display());
            None
        }
    }
}

fn skip_row(path: &Path, line: usize, message: &str) {
    warn!("{}: line {line}: {message} (row skipped)", path.display());
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Vote-share column: a percentage in 0-100, stored as a fraction.
/// Absent column, empty cell, or an unparsable value all mean "missing".
fn parse_share(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<f64> {
    let s = get_optional(record, header_map, name)?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v / 100.0) } else { None }
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{s}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `{name}` value '{s}'."));
    }
    Ok(v)
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Poll exports use MM/DD/YY; we also accept the four-digit-year variant.
    const FMTS: [&str; 2] = ["%m/%d/%y", "%m/%d/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected MM/DD/YY or MM/DD/YYYY."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("pollcast-ingest-{name}-{}", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_poll_rows_with_missing_ind() {
        let path = write_temp(
            "polls",
            "State,Date,Poll,Sample,Type,DEM,GOP,IND\n\
             Texas,10/12/18,Quincy,800,Likely,45,49,\n\
             Texas,10/01/18,Acme,612,Registered,44,48,3\n",
        );
        let polls = load_polls(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(polls.len(), 2);
        assert_eq!(polls[0].race, "Texas");
        assert_eq!(polls[0].pollster, "Quincy");
        assert_eq!(polls[0].date, NaiveDate::from_ymd_opt(2018, 10, 12).unwrap());
        assert_eq!(polls[0].kind, PollType::Likely);
        assert!((polls[0].dem.unwrap() - 0.45).abs() < 1e-12);
        assert!(polls[0].ind.is_none());
        assert!((polls[1].ind.unwrap() - 0.03).abs() < 1e-12);
    }

    #[test]
    fn unknown_poll_type_aborts_the_run() {
        let path = write_temp(
            "badtype",
            "State,Date,Poll,Sample,Type,DEM,GOP,IND\n\
             Texas,10/12/18,Quincy,800,Exit,45,49,\n",
        );
        let err = load_polls(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_sample_skips_the_row_only() {
        let path = write_temp(
            "badsample",
            "State,Date,Poll,Sample,Type,DEM,GOP,IND\n\
             Texas,10/12/18,Quincy,n/a,Likely,45,49,\n\
             Texas,10/13/18,Acme,700,Likely,46,48,\n",
        );
        let polls = load_polls(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].pollster, "Acme");
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let path = write_temp(
            "noschema",
            "State,Date,Poll,Sample,DEM,GOP\nTexas,10/12/18,Quincy,800,45,49\n",
        );
        let err = load_polls(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn generic_rows_are_national_and_two_way() {
        let path = write_temp(
            "generic",
            "Date,Poll,Sample,Type,DEM,GOP\n10/20/18,Quincy,1100,Likely,48,44\n",
        );
        let polls = load_generic(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].race, NATIONAL_RACE);
        assert!(polls[0].ind.is_none());
        assert!((polls[0].gop.unwrap() - 0.44).abs() < 1e-12);
    }

    #[test]
    fn results_rows_parse_and_validate_totals() {
        let path = write_temp(
            "results",
            "State,Clinton,Trump,Obama,Romney\n\
             Texas,3877868,4685047,3308124,4569843\n\
             Nowhere,0,0,0,0\n",
        );
        let results = load_results(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state, "Texas");
        assert!((results[0].dem_recent - 3_877_868.0).abs() < 1e-6);
    }

    #[test]
    fn race_list_skips_blanks_and_comments() {
        let path = write_temp(
            "races",
            "# 2018 cycle\nArizona\n\nMississippi (S)\n",
        );
        let races = load_race_list(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(races, vec!["Arizona".to_string(), "Mississippi (S)".to_string()]);
    }

    #[test]
    fn date_formats() {
        assert_eq!(
            parse_date("1/5/18").unwrap(),
            NaiveDate::from_ymd_opt(2018, 1, 5).unwrap()
        );
        assert_eq!(
            parse_date("10/12/2018").unwrap(),
            NaiveDate::from_ymd_opt(2018, 10, 12).unwrap()
        );
        assert!(parse_date("2018-10-12").is_err());
    }
}
