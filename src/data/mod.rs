//! Source loading: one GeoJSON boundary collection and two economic tables.

mod boundary;

pub use boundary::{BoundaryFeature, Polygon, Ring};

use crate::dataset::{RawRow, CODE_COLUMN};
use crate::error::{DatasetError, Result};
use geojson::GeoJson;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Natural Earth 1:10m admin-0 countries
pub const DEFAULT_BOUNDARIES_URL: &str = "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson/ne_10m_admin_0_countries.geojson";

/// Prefix addressing a table compiled into the binary
pub const BUNDLED_PREFIX: &str = "bundled:";

/// World Bank tables shipped under `data/`
const BUNDLED: &[(&str, &[u8])] = &[
    ("gdp", include_bytes!("../../data/gdp.csv")),
    ("population", include_bytes!("../../data/population.csv")),
];

/// Where a source lives
#[derive(Clone, PartialEq, Eq)]
pub enum Location {
    Url(String),
    Path(PathBuf),
    Bundled {
        name: &'static str,
        bytes: &'static [u8],
    },
}

impl Location {
    /// `http(s)://` is fetched, `bundled:<name>` names a shipped table,
    /// anything else is a file path
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            return Location::Url(s.to_string());
        }
        let bundled = s
            .strip_prefix(BUNDLED_PREFIX)
            .and_then(|name| BUNDLED.iter().find(|(n, _)| *n == name));
        match bundled {
            Some(&(name, bytes)) => Location::Bundled { name, bytes },
            None => Location::Path(PathBuf::from(s)),
        }
    }

    /// Path used in error messages
    fn origin(&self) -> PathBuf {
        match self {
            Location::Url(url) => PathBuf::from(url),
            Location::Path(path) => path.clone(),
            Location::Bundled { name, .. } => PathBuf::from(format!("{BUNDLED_PREFIX}{name}")),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Url(url) => f.write_str(url),
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Bundled { name, .. } => write!(f, "{BUNDLED_PREFIX}{name}"),
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({self})")
    }
}

/// Locations of the three sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub boundaries: Location,
    pub gdp: Location,
    pub population: Location,
}

/// Parsed sources, ready for the dataset builder
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub boundaries: Vec<BoundaryFeature>,
    pub gdp: Vec<RawRow>,
    pub population: Vec<RawRow>,
}

/// Fetch and parse all three sources concurrently. Fails if any one fails.
pub fn load(config: &SourceConfig) -> Result<Sources> {
    let (boundaries, (gdp, population)) = rayon::join(
        || load_boundaries(&config.boundaries),
        || {
            rayon::join(
                || load_table(&config.gdp),
                || load_table(&config.population),
            )
        },
    );

    Ok(Sources {
        boundaries: boundaries?,
        gdp: gdp?,
        population: population?,
    })
}

fn read_bytes(location: &Location) -> Result<Vec<u8>> {
    debug!(%location, "reading source");
    let bytes = match location {
        Location::Url(url) => {
            let fetch_err = |source| DatasetError::Fetch {
                url: url.clone(),
                source,
            };
            let response = reqwest::blocking::get(url).map_err(fetch_err)?;
            let status = response.status();
            if !status.is_success() {
                return Err(DatasetError::Status {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            response.bytes().map_err(fetch_err)?.to_vec()
        }
        Location::Path(path) => fs::read(path).map_err(|source| DatasetError::Io {
            path: path.clone(),
            source,
        })?,
        Location::Bundled { bytes, .. } => bytes.to_vec(),
    };
    info!(%location, bytes = bytes.len(), "source read");
    Ok(bytes)
}

/// Load the boundary FeatureCollection
pub fn load_boundaries(location: &Location) -> Result<Vec<BoundaryFeature>> {
    let mut bytes = read_bytes(location)?;
    parse_boundaries(&mut bytes)
}

/// Parse a GeoJSON FeatureCollection; the buffer is used as scratch space
pub fn parse_boundaries(bytes: &mut [u8]) -> Result<Vec<BoundaryFeature>> {
    let geojson: GeoJson = simd_json::serde::from_slice(bytes)?;
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            let features: Vec<_> = fc.features.iter().map(BoundaryFeature::from_geojson).collect();
            info!(features = features.len(), "parsed boundaries");
            Ok(features)
        }
        _ => Err(DatasetError::NotFeatureCollection),
    }
}

/// Load an economic table
pub fn load_table(location: &Location) -> Result<Vec<RawRow>> {
    let bytes = read_bytes(location)?;
    parse_table(&bytes, &location.origin())
}

/// Parse CSV text into rows keyed by header. Lines before the first record
/// with a `Country Code` cell are skipped.
pub fn parse_table(bytes: &[u8], origin: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let clean = |cell: &str| cell.trim_start_matches('\u{feff}').trim().to_string();

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| DatasetError::Csv {
            path: origin.to_path_buf(),
            source,
        })?;
        match headers {
            None => {
                if record.iter().any(|cell| clean(cell) == CODE_COLUMN) {
                    headers = Some(record.iter().map(clean).collect());
                }
            }
            Some(ref names) => {
                let row: RawRow = names
                    .iter()
                    .zip(record.iter())
                    .filter(|(name, _)| !name.is_empty())
                    .map(|(name, cell)| (name.clone(), cell.to_string()))
                    .collect();
                rows.push(row);
            }
        }
    }

    if headers.is_none() {
        return Err(DatasetError::MissingColumn {
            path: origin.to_path_buf(),
            column: CODE_COLUMN,
        });
    }
    debug!(origin = %origin.display(), rows = rows.len(), "parsed table");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse() {
        assert_eq!(
            Location::parse("https://example.org/a.geojson"),
            Location::Url("https://example.org/a.geojson".into())
        );
        assert_eq!(
            Location::parse("data/gdp.csv"),
            Location::Path(PathBuf::from("data/gdp.csv"))
        );
        assert!(matches!(
            Location::parse("bundled:population"),
            Location::Bundled { name: "population", .. }
        ));
        // Unknown bundle names fall through to a (missing) file
        assert_eq!(
            Location::parse("bundled:nope"),
            Location::Path(PathBuf::from("bundled:nope"))
        );
    }

    #[test]
    fn test_bundled_tables_parse() {
        for name in ["gdp", "population"] {
            let location = Location::parse(&format!("bundled:{name}"));
            let rows = load_table(&location).unwrap();
            assert_eq!(rows.len(), 60, "{location}");
            let france = rows.iter().find(|r| r["Country Code"] == "FRA").unwrap();
            assert!(france["2018"].parse::<f64>().unwrap() > 0.0);
            assert!(france.contains_key("2000"));
        }
    }

    #[test]
    fn test_parse_table_plain() {
        let csv = "Country Name,Country Code,2017,2018\nFrance,FRA,1,2\nGabon,GAB,,3\n";
        let rows = parse_table(csv.as_bytes(), Path::new("t.csv")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Country Code"], "FRA");
        assert_eq!(rows[1]["2017"], "");
        assert_eq!(rows[1]["2018"], "3");
    }

    #[test]
    fn test_parse_table_skips_preamble() {
        let csv = "\u{feff}\"Data Source\",\"World Development Indicators\",\n\n\"Last Updated Date\",\"2019-07-10\",\n\n\"Country Name\",\"Country Code\",\"2018\",\n\"Aruba\",\"ABW\",\"2.7e9\",\n";
        let rows = parse_table(csv.as_bytes(), Path::new("wb.csv")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Country Code"], "ABW");
        assert_eq!(rows[0]["2018"], "2.7e9");
    }

    #[test]
    fn test_parse_table_without_code_column() {
        let csv = "Name,2018\nFrance,1\n";
        let err = parse_table(csv.as_bytes(), Path::new("bad.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { .. }));
    }

    #[test]
    fn test_parse_boundaries() {
        let mut json = br#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"NAME":"A","WB_A3":"AAA"},"geometry":null},
            {"type":"Feature","properties":{"NAME":"B","WB_A3":"-99","ADM0_A3":"BBB"},"geometry":null}
        ]}"#
        .to_vec();
        let features = parse_boundaries(&mut json).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[1].join_code(), "BBB");
    }

    #[test]
    fn test_parse_boundaries_rejects_single_feature() {
        let mut json =
            br#"{"type":"Feature","properties":{"NAME":"A"},"geometry":null}"#.to_vec();
        assert!(matches!(
            parse_boundaries(&mut json),
            Err(DatasetError::NotFeatureCollection)
        ));
    }

    #[test]
    fn test_parse_boundaries_invalid_json() {
        let mut json = b"{not json".to_vec();
        let err = parse_boundaries(&mut json).unwrap_err();
        assert!(matches!(err, DatasetError::GeoJson(_)));
        // The decoder error stays reachable through the source chain
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<simd_json::Error>().is_some());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let config = SourceConfig {
            boundaries: Location::Path(PathBuf::from("/nonexistent/b.geojson")),
            gdp: Location::Path(PathBuf::from("/nonexistent/g.csv")),
            population: Location::Path(PathBuf::from("/nonexistent/p.csv")),
        };
        assert!(matches!(load(&config), Err(DatasetError::Io { .. })));
    }
}
