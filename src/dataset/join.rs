//! Code-keyed merge of the GDP and population tables, then enrichment of
//! every boundary feature with the merged record.

use super::classify::{magnitude, Extent};
use super::rows::MetricRow;
use super::{CountryMetric, EnrichedFeature, YearValue, YearWindow};
use crate::data::BoundaryFeature;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Whatever each source provided for one country code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedRecord {
    pub gdp: Option<f64>,
    pub gdp_magnitude: Option<i32>,
    pub gdp_history: Option<Vec<YearValue>>,
    pub population: Option<f64>,
    pub population_magnitude: Option<i32>,
    pub population_history: Option<Vec<YearValue>>,
}

/// Merged tables plus the bucket extents observed across them
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTable {
    pub records: BTreeMap<String, JoinedRecord>,
    pub gdp_extent: Option<Extent>,
    pub population_extent: Option<Extent>,
}

impl JoinedTable {
    pub fn get(&self, code: &str) -> Option<&JoinedRecord> {
        self.records.get(code)
    }
}

/// Merge both tables. A code present in only one of them still yields a
/// record carrying that source's fields.
pub fn join_tables(
    gdp: &HashMap<String, MetricRow>,
    population: &HashMap<String, MetricRow>,
) -> JoinedTable {
    let mut records: BTreeMap<String, JoinedRecord> = BTreeMap::new();

    for (code, row) in gdp {
        let record = records.entry(code.clone()).or_default();
        record.gdp = Some(row.value);
        record.gdp_magnitude = magnitude(row.value);
        record.gdp_history = Some(row.history.clone());
    }
    for (code, row) in population {
        let record = records.entry(code.clone()).or_default();
        record.population = Some(row.value);
        record.population_magnitude = magnitude(row.value);
        record.population_history = Some(row.history.clone());
    }

    let gdp_extent = Extent::of(records.values().map(|r| r.gdp_magnitude));
    let population_extent = Extent::of(records.values().map(|r| r.population_magnitude));

    JoinedTable {
        records,
        gdp_extent,
        population_extent,
    }
}

/// History of zeros for features lacking a table row
fn empty_history(window: &YearWindow) -> Vec<YearValue> {
    window
        .years()
        .map(|year| YearValue { year, value: 0.0 })
        .collect()
}

/// Attach joined data to one boundary feature. Missing values resolve to 0
/// and missing buckets to the dataset-wide minimum.
pub fn enrich(
    feature: &BoundaryFeature,
    table: &JoinedTable,
    window: &YearWindow,
) -> EnrichedFeature {
    let code = feature.join_code();
    let record = table.get(&code).cloned().unwrap_or_default();

    let gdp_fallback = Extent::fallback(table.gdp_extent);
    let population_fallback = Extent::fallback(table.population_extent);

    let metric = CountryMetric {
        name: feature.display_name(),
        flag_code: feature.flag_code(),
        bounds: feature.bounds(),
        gdp_usd: record.gdp,
        population_count: record.population,
        gdp_magnitude: record.gdp_magnitude,
        population_magnitude: record.population_magnitude,
        gdp_history: record.gdp_history.unwrap_or_else(|| empty_history(window)),
        population_history: record
            .population_history
            .unwrap_or_else(|| empty_history(window)),
        code,
    };

    EnrichedFeature {
        gdp: metric.gdp_usd.unwrap_or(0.0),
        gdp_level: metric.gdp_magnitude.unwrap_or(gdp_fallback),
        population: metric.population_count.unwrap_or(0.0),
        population_level: metric.population_magnitude.unwrap_or(population_fallback),
        metric: Arc::new(metric),
    }
}
