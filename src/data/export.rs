use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::datetime::{format_date, parse_date};
use crate::processing::aggregation::DailyAggregate;
use crate::processing::statistics::DailyStats;
use crate::state::measurement::{Measurement, Statistic};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected column '{0}'")]
    UnknownColumn(String),
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("missing 'date' column")]
    MissingDateColumn,
    #[error("row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: incomplete statistics for {measurement}")]
    IncompleteStats { row: usize, measurement: Measurement },
    #[error("row {row}: statistics for {measurement} out of order (min <= mean, median <= max, std >= 0)")]
    InconsistentStats { row: usize, measurement: Measurement },
    #[error("row {row}: date {date} repeats an earlier row")]
    DuplicateDate { row: usize, date: NaiveDate },
    #[error("row {row}: date {date} comes before the previous row")]
    UnorderedDate { row: usize, date: NaiveDate },
}

fn column_name(measurement: Measurement, stat: Statistic) -> String {
    format!("{}_{}", measurement.name(), stat.name())
}

fn parse_column(name: &str) -> Option<(Measurement, Statistic)> {
    let (gas, stat) = name.trim().rsplit_once('_')?;
    Some((gas.parse().ok()?, Statistic::from_name(stat)?))
}

/// Header row: `date` then `<gas>_<stat>` for every measurement and statistic.
pub fn header() -> Vec<String> {
    let mut header = vec!["date".to_string()];
    for m in Measurement::ALL {
        for stat in Statistic::ALL {
            header.push(column_name(m, stat));
        }
    }
    header
}

/// Write the aggregate table as CSV, one row per date.
pub fn write_csv<W: Write>(table: &[DailyAggregate], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header())?;

    for row in table {
        let mut record = vec![format_date(row.date)];
        for m in Measurement::ALL {
            for stat in Statistic::ALL {
                record.push(match row.get(m) {
                    Some(stats) => format!("{}", stats.get(stat)),
                    None => String::new(),
                });
            }
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(table: &[DailyAggregate]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    // The writer only ever receives UTF-8 strings.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn save_csv(table: &[DailyAggregate], path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(table, file)?;
    tracing::info!("Exported {} daily rows to {:?}", table.len(), path);
    Ok(())
}

/// Parse a CSV produced by [`write_csv`] back into an aggregate table.
///
/// Columns may appear in any order but only once each. Dates must be strictly
/// ascending. A measurement must have either all of its statistics or none of
/// them on a given row, and they must be consistent with each other.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<DailyAggregate>, ExportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut date_col = None;
    let mut stat_cols: Vec<(usize, Measurement, Statistic)> = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        if name == "date" {
            if date_col.replace(idx).is_some() {
                return Err(ExportError::DuplicateColumn(name.to_string()));
            }
        } else {
            let (m, stat) =
                parse_column(name).ok_or_else(|| ExportError::UnknownColumn(name.to_string()))?;
            if stat_cols.iter().any(|&(_, pm, ps)| pm == m && ps == stat) {
                return Err(ExportError::DuplicateColumn(name.to_string()));
            }
            stat_cols.push((idx, m, stat));
        }
    }
    let date_col = date_col.ok_or(ExportError::MissingDateColumn)?;

    let mut table: Vec<DailyAggregate> = Vec::new();
    for (row_idx, record) in rdr.records().enumerate() {
        let record = record?;
        let row = row_idx + 1;

        let raw_date = record.get(date_col).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| ExportError::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;
        if let Some(prev) = table.last() {
            if date == prev.date {
                return Err(ExportError::DuplicateDate { row, date });
            }
            if date < prev.date {
                return Err(ExportError::UnorderedDate { row, date });
            }
        }

        let mut partial: BTreeMap<Measurement, Vec<(Statistic, f64)>> = BTreeMap::new();
        for &(idx, m, stat) in &stat_cols {
            let cell = record.get(idx).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            let value = cell.parse::<f64>().map_err(|_| ExportError::InvalidNumber {
                row,
                column: headers.get(idx).unwrap_or_default().to_string(),
                value: cell.to_string(),
            })?;
            partial.entry(m).or_default().push((stat, value));
        }

        let mut stats = BTreeMap::new();
        for (m, values) in partial {
            let complete = Statistic::ALL
                .iter()
                .all(|s| values.iter().any(|(vs, _)| vs == s));
            if !complete {
                return Err(ExportError::IncompleteStats { row, measurement: m });
            }
            let mut daily = DailyStats {
                mean: 0.0,
                median: 0.0,
                max: 0.0,
                min: 0.0,
                std: 0.0,
            };
            for (stat, value) in values {
                daily.set(stat, value);
            }
            if !daily.is_consistent() {
                return Err(ExportError::InconsistentStats { row, measurement: m });
            }
            stats.insert(m, daily);
        }

        table.push(DailyAggregate { date, stats });
    }

    Ok(table)
}
