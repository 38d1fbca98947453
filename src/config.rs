use crate::data::{Location, SourceConfig, DEFAULT_BOUNDARIES_URL};
use crate::dataset::YearWindow;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line for gdp-map
#[derive(Debug, Parser)]
#[command(
    name = "gdp-map",
    version,
    about = "Terminal choropleth of per-country GDP and population"
)]
pub struct Args {
    /// GeoJSON country boundaries (URL or file path)
    #[arg(long, global = true, default_value = DEFAULT_BOUNDARIES_URL)]
    pub boundaries: String,

    /// GDP table (CSV, one column per year); `bundled:gdp` is the shipped copy
    #[arg(long, global = true, default_value = "bundled:gdp")]
    pub gdp: String,

    /// Population table (CSV, one column per year); `bundled:population`
    /// is the shipped copy
    #[arg(long, global = true, default_value = "bundled:population")]
    pub population: String,

    /// Reference year used for coloring
    #[arg(long, global = true, default_value_t = 2018)]
    pub year: i32,

    /// First year of the history chart
    #[arg(long, global = true, default_value_t = 2000)]
    pub history_from: i32,

    /// Last year of the history chart
    #[arg(long, global = true, default_value_t = 2018)]
    pub history_to: i32,

    /// Write logs to this file (the viewer logs nothing otherwise)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive terminal map (default)
    View,

    /// Print dataset statistics and color legends
    Summary,

    /// List countries whose name starts with QUERY (case-sensitive)
    Search {
        query: String,
    },

    /// Write the enriched features as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::View)
    }

    pub fn sources(&self) -> SourceConfig {
        SourceConfig {
            boundaries: Location::parse(&self.boundaries),
            gdp: Location::parse(&self.gdp),
            population: Location::parse(&self.population),
        }
    }

    pub fn window(&self) -> anyhow::Result<YearWindow> {
        anyhow::ensure!(
            self.history_from <= self.history_to,
            "--history-from {} is after --history-to {}",
            self.history_from,
            self.history_to
        );
        Ok(YearWindow {
            reference: self.year,
            from: self.history_from,
            to: self.history_to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["gdp-map"]);
        assert_eq!(args.command(), Command::View);
        assert_eq!(args.window().unwrap(), YearWindow::default());
        let sources = args.sources();
        assert!(matches!(sources.boundaries, Location::Url(_)));
        assert!(matches!(sources.gdp, Location::Bundled { name: "gdp", .. }));
        assert!(matches!(
            sources.population,
            Location::Bundled {
                name: "population",
                ..
            }
        ));

        let args = Args::parse_from(["gdp-map", "--gdp", "data/gdp.csv"]);
        assert_eq!(args.sources().gdp, Location::Path(PathBuf::from("data/gdp.csv")));
    }

    #[test]
    fn test_subcommand_with_global_options() {
        let args = Args::parse_from([
            "gdp-map",
            "search",
            "Ger",
            "--boundaries",
            "countries.geojson",
            "--year",
            "2015",
            "-vv",
        ]);
        assert_eq!(
            args.command(),
            Command::Search {
                query: "Ger".into()
            }
        );
        assert_eq!(
            args.sources().boundaries,
            Location::Path(PathBuf::from("countries.geojson"))
        );
        assert_eq!(args.year, 2015);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_inverted_history_window_rejected() {
        let args = Args::parse_from(["gdp-map", "--history-from", "2010", "--history-to", "2000"]);
        assert!(args.window().is_err());
    }
}
