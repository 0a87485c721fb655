use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use chrono::{NaiveDate, TimeDelta};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::DashError;
use crate::record::{Plan, Record, SignupDate, Status};

/// Demo dataset size when no file is given.
pub const DEMO_ROWS: usize = 60;

const FIRST_NAMES: [&str; 20] = [
    "Ava", "Ben", "Carla", "Dmitri", "Elena", "Farid", "Greta", "Hugo", "Ines", "Jonas",
    "Kenji", "Lena", "Marco", "Nadia", "Oscar", "Priya", "Quinn", "Rosa", "Stefan", "Tara",
];

const LAST_NAMES: [&str; 20] = [
    "Alvarez", "Brandt", "Chen", "Duarte", "Eriksen", "Fischer", "Garcia", "Hansen", "Ito",
    "Jansen", "Klein", "Larsen", "Meyer", "Novak", "Okafor", "Petrov", "Quintana", "Rossi",
    "Sato", "Weber",
];

const MAIL_DOMAINS: [&str; 5] = [
    "example.com", "acme.io", "northwind.dev", "globex.net", "initech.org",
];

/// Deterministic demo records. The same seed always produces the same
/// dataset, so a session can be reproduced exactly.
pub fn demo_records(count: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let signup_epoch = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();

    (0..count)
        .map(|i| {
            let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
            let domain = MAIL_DOMAINS[rng.random_range(0..MAIL_DOMAINS.len())];

            let plan = match rng.random_range(0..=99) {
                0..=49 => Plan::Free,
                50..=84 => Plan::Pro,
                _ => Plan::Business,
            };
            let status = match rng.random_range(0..=99) {
                0..=59 => Status::Active,
                60..=79 => Status::Trial,
                _ => Status::Churned,
            };
            let spend: f64 = match plan {
                Plan::Free => rng.random_range(0.0..200.0),
                Plan::Pro => rng.random_range(200.0..3000.0),
                Plan::Business => rng.random_range(1000.0..20000.0),
            };
            // ~3.5 years of signups, up to 2025-07-31
            let signup = signup_epoch + TimeDelta::days(rng.random_range(0..1308));

            Record {
                id: format!("cus_{:04}", i + 1),
                name: format!("{first} {last}"),
                email: format!(
                    "{}.{}{}@{}",
                    first.to_lowercase(),
                    last.to_lowercase(),
                    i + 1,
                    domain
                ),
                plan,
                status,
                signup_date: SignupDate::Valid(signup),
                spend: (spend * 100.0).round() / 100.0,
            }
        })
        .collect()
}

/// What came out of a file load, with enough context for the status
/// line and the log.
#[derive(Debug)]
pub struct LoadReport {
    pub records: Vec<Record>,
    /// Rows whose signup date did not parse. They are kept, not dropped.
    pub bad_dates: usize,
    pub duration_ms: u128,
}

/// Loads customer records from a CSV file with the columns
/// `id,name,email,plan,status,signup_date,spend`.
///
/// Unparsable dates are recoverable and only counted; anything else
/// wrong with a row fails the load with the row number.
pub fn load_csv(path: &Path) -> Result<LoadReport, DashError> {
    let file_size = check_csv_path(path)?;
    let start_time = Instant::now();

    let df = LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()?
        .collect()?;
    debug!("read {} ({file_size} bytes): {} rows", path.display(), df.height());

    let ids = column_values(&df, "id")?;
    let names = column_values(&df, "name")?;
    let emails = column_values(&df, "email")?;
    let plans = column_values(&df, "plan")?;
    let statuses = column_values(&df, "status")?;
    let dates = column_values(&df, "signup_date")?;
    let spends = column_values(&df, "spend")?;

    let records: Vec<Record> = (0..df.height())
        .into_par_iter()
        .map(|i| {
            // 1-based data row as seen in the file, after the header
            let row = i + 2;
            Ok(Record {
                id: required(&ids, i, row, "id")?,
                name: required(&names, i, row, "name")?,
                email: required(&emails, i, row, "email")?,
                plan: parse_cell(&plans, i, row, "plan", Plan::parse)?,
                status: parse_cell(&statuses, i, row, "status", Status::parse)?,
                signup_date: parse_date(&dates, i, row),
                spend: parse_spend(&spends, i, row)?,
            })
        })
        .collect::<Result<_, DashError>>()?;

    warn_on_duplicate_ids(&records);
    let bad_dates = records
        .iter()
        .filter(|r| matches!(r.signup_date, SignupDate::Invalid(_)))
        .count();

    let duration_ms = start_time.elapsed().as_millis();
    info!(
        "loaded {} records from {} in {duration_ms}ms ({bad_dates} unparsable dates)",
        records.len(),
        path.display()
    );

    Ok(LoadReport { records, bad_dates, duration_ms })
}

fn check_csv_path(path: &Path) -> Result<u64, DashError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DashError::FileNotFound,
        ErrorKind::PermissionDenied => DashError::PermissionDenied,
        _ => DashError::Io(e),
    })?;
    if !metadata.is_file() {
        return Err(DashError::LoadingFailed("not a file".into()));
    }
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(metadata.len()),
        _ => Err(DashError::UnknownFileType),
    }
}

/// One column as strings, nulls kept as `None`. Everything is cast to
/// string first so numeric columns come out in their textual form.
fn column_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DashError> {
    let col = df
        .column(name)
        .map_err(|_| DashError::MissingColumn(name.to_string()))?
        .cast(&DataType::String)?;
    let series = col.str()?;
    debug!("column {name}: {} values", series.len());
    Ok(series
        .into_iter()
        .map(|value| value.map(|s| s.trim().to_string()))
        .collect())
}

fn required(
    values: &[Option<String>],
    i: usize,
    row: usize,
    column: &'static str,
) -> Result<String, DashError> {
    match values[i].as_deref() {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(DashError::BadValue {
            row,
            column,
            value: "<empty>".to_string(),
        }),
    }
}

fn parse_cell<T>(
    values: &[Option<String>],
    i: usize,
    row: usize,
    column: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, DashError> {
    let value = required(values, i, row, column)?;
    parse(&value).ok_or(DashError::BadValue { row, column, value })
}

fn parse_date(values: &[Option<String>], i: usize, row: usize) -> SignupDate {
    let raw = values[i].as_deref().unwrap_or("");
    let date = SignupDate::parse(raw);
    if let SignupDate::Invalid(value) = &date {
        warn!("row {row}: unparsable signup_date \"{value}\", keeping it verbatim");
    }
    date
}

fn parse_spend(values: &[Option<String>], i: usize, row: usize) -> Result<f64, DashError> {
    let value = required(values, i, row, "spend")?;
    match value.parse::<f64>() {
        Ok(spend) if spend.is_finite() && spend >= 0.0 => Ok(spend),
        _ => Err(DashError::BadValue { row, column: "spend", value }),
    }
}

fn warn_on_duplicate_ids(records: &[Record]) {
    let mut seen = std::collections::HashSet::new();
    for record in records {
        if !seen.insert(record.id.as_str()) {
            warn!("duplicate id \"{}\", keeping both rows", record.id);
        }
    }
}
