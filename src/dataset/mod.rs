//! Joined, colorable, searchable per-country dataset.
//!
//! Raw CSV rows and boundary features go in through [`DatasetBuilder`];
//! what comes out is a read-only [`Dataset`]: one [`EnrichedFeature`] per
//! boundary feature, a color scale per indicator and the [`SearchIndex`].

mod builder;
pub mod classify;
pub mod join;
pub mod rows;
pub mod scale;
pub mod search;

use serde::Serialize;
use std::sync::Arc;

pub use builder::DatasetBuilder;
pub use scale::{ColorScale, Palette, Rgb};
pub use search::{Match, SearchIndex, MAX_SUGGESTIONS};

/// Raw CSV row: column name -> cell text
pub type RawRow = std::collections::HashMap<String, String>;

/// Column holding the join key in both tables
pub const CODE_COLUMN: &str = "Country Code";

/// Sentinel used by the boundary dataset for "no code"
pub const UNKNOWN_CODE: &str = "-99";

/// Which economic series drives coloring, tooltips and charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Indicator {
    Gdp,
    Population,
}

impl Indicator {
    pub fn toggled(self) -> Self {
        match self {
            Indicator::Gdp => Indicator::Population,
            Indicator::Population => Indicator::Gdp,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP",
            Indicator::Population => "Population",
        }
    }
}

/// Reference year plus the inclusive history window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub reference: i32,
    pub from: i32,
    pub to: i32,
}

impl YearWindow {
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.from..=self.to
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self {
            reference: 2018,
            from: 2000,
            to: 2018,
        }
    }
}

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub const WORLD: Bounds = Bounds {
        min_lon: -180.0,
        min_lat: -90.0,
        max_lon: 180.0,
        max_lat: 90.0,
    };

    /// Bounding box of a set of (lon, lat) points, `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (lon, lat) = iter.next()?;
        let mut b = Bounds {
            min_lon: lon,
            min_lat: lat,
            max_lon: lon,
            max_lat: lat,
        };
        for (lon, lat) in iter {
            b.min_lon = b.min_lon.min(lon);
            b.min_lat = b.min_lat.min(lat);
            b.max_lon = b.max_lon.max(lon);
            b.max_lat = b.max_lat.max(lat);
        }
        Some(b)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// `[minLon, minLat, maxLon, maxLat]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

/// One point of a per-year series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// Per-country record keyed by its join code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryMetric {
    pub code: String,
    pub name: String,
    #[serde(rename = "gdpUSD")]
    pub gdp_usd: Option<f64>,
    pub population_count: Option<f64>,
    pub gdp_magnitude: Option<i32>,
    pub population_magnitude: Option<i32>,
    pub gdp_history: Vec<YearValue>,
    pub population_history: Vec<YearValue>,
    pub bounds: Bounds,
    pub flag_code: Option<String>,
}

impl CountryMetric {
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Gdp => self.gdp_usd,
            Indicator::Population => self.population_count,
        }
    }

    pub fn magnitude(&self, indicator: Indicator) -> Option<i32> {
        match indicator {
            Indicator::Gdp => self.gdp_magnitude,
            Indicator::Population => self.population_magnitude,
        }
    }

    pub fn history(&self, indicator: Indicator) -> &[YearValue] {
        match indicator {
            Indicator::Gdp => &self.gdp_history,
            Indicator::Population => &self.population_history,
        }
    }
}

/// Boundary feature with resolved values for rendering.
///
/// Unlike [`CountryMetric`], none of these fields is ever missing: absent
/// data resolves to `0.0` and the dataset-wide minimum bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedFeature {
    #[serde(flatten)]
    pub metric: Arc<CountryMetric>,
    #[serde(rename = "GDP")]
    pub gdp: f64,
    #[serde(rename = "GDPLevel")]
    pub gdp_level: i32,
    pub population: f64,
    #[serde(rename = "populationLevel")]
    pub population_level: i32,
}

impl EnrichedFeature {
    pub fn value(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::Gdp => self.gdp,
            Indicator::Population => self.population,
        }
    }

    pub fn level(&self, indicator: Indicator) -> i32 {
        match indicator {
            Indicator::Gdp => self.gdp_level,
            Indicator::Population => self.population_level,
        }
    }
}

/// Output of the pipeline, immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Vec<EnrichedFeature>,
    pub gdp_scale: ColorScale,
    pub population_scale: ColorScale,
    pub search: SearchIndex,
}

impl Dataset {
    pub fn scale(&self, indicator: Indicator) -> &ColorScale {
        match indicator {
            Indicator::Gdp => &self.gdp_scale,
            Indicator::Population => &self.population_scale,
        }
    }

    /// Palette bin of every feature for the given indicator, in feature order
    pub fn bins(&self, indicator: Indicator) -> Vec<usize> {
        let scale = self.scale(indicator);
        self.features
            .iter()
            .map(|f| scale.bin(f.level(indicator)))
            .collect()
    }

    pub fn color(&self, index: usize, indicator: Indicator) -> Option<Rgb> {
        let feature = self.features.get(index)?;
        Some(self.scale(indicator).color(feature.level(indicator)))
    }

    /// Features with no economic data from either table
    pub fn without_data(&self) -> impl Iterator<Item = &EnrichedFeature> {
        self.features
            .iter()
            .filter(|f| f.metric.gdp_usd.is_none() && f.metric.population_count.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let b = Bounds::from_points([(10.0, -5.0), (-3.0, 7.0), (2.0, 1.0)]).unwrap();
        assert_eq!(b.to_array(), [-3.0, -5.0, 10.0, 7.0]);
        assert!(b.contains(0.0, 0.0));
        assert!(!b.contains(11.0, 0.0));
        assert_eq!(b.center(), (3.5, 1.0));
    }

    #[test]
    fn test_bounds_from_no_points() {
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_year_window_inclusive() {
        let w = YearWindow {
            reference: 2002,
            from: 2000,
            to: 2002,
        };
        assert_eq!(w.years().collect::<Vec<_>>(), vec![2000, 2001, 2002]);
    }

    #[test]
    fn test_indicator_toggle() {
        assert_eq!(Indicator::Gdp.toggled(), Indicator::Population);
        assert_eq!(Indicator::Population.toggled(), Indicator::Gdp);
    }
}
