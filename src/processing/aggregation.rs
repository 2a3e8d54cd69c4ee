use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::generator::Sample;
use crate::processing::statistics::DailyStats;
use crate::state::measurement::Measurement;

/// Statistics for every measurement observed on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub stats: BTreeMap<Measurement, DailyStats>,
}

impl DailyAggregate {
    pub fn get(&self, measurement: Measurement) -> Option<&DailyStats> {
        self.stats.get(&measurement)
    }
}

/// Group samples by calendar date and summarise each measurement per day.
///
/// Output holds one row per distinct date, ascending. Dates without samples
/// are not filled in.
pub fn aggregate_daily(samples: &[Sample]) -> Vec<DailyAggregate> {
    let mut grouped: BTreeMap<NaiveDate, BTreeMap<Measurement, Vec<f64>>> = BTreeMap::new();
    for sample in samples {
        grouped
            .entry(sample.timestamp.date())
            .or_default()
            .entry(sample.measurement)
            .or_default()
            .push(sample.value);
    }

    grouped
        .into_iter()
        .map(|(date, by_measurement)| DailyAggregate {
            date,
            stats: by_measurement
                .into_iter()
                .filter_map(|(m, values)| DailyStats::compute(&values).map(|s| (m, s)))
                .collect(),
        })
        .collect()
}

/// First and last date of an ascending aggregate table.
pub fn date_extent(table: &[DailyAggregate]) -> Option<(NaiveDate, NaiveDate)> {
    Some((table.first()?.date, table.last()?.date))
}
