use super::join::{enrich, join_tables};
use super::rows::parse_table;
use super::scale::{ColorScale, Palette};
use super::search::SearchIndex;
use super::{Dataset, RawRow, YearWindow};
use crate::data::{BoundaryFeature, Sources};
use std::sync::Arc;
use tracing::info;

/// Turns the three loaded sources into a [`Dataset`].
///
/// Building is a pure function of its inputs: the same sources always give
/// an identical dataset.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    window: YearWindow,
    gdp_palette: Palette,
    population_palette: Palette,
}

impl DatasetBuilder {
    pub fn new(window: YearWindow) -> Self {
        Self {
            window,
            gdp_palette: Palette::Blues,
            population_palette: Palette::Oranges,
        }
    }

    pub fn window(&self) -> &YearWindow {
        &self.window
    }

    pub fn palettes(mut self, gdp: Palette, population: Palette) -> Self {
        self.gdp_palette = gdp;
        self.population_palette = population;
        self
    }

    pub fn build_from(&self, sources: &Sources) -> Dataset {
        self.build(&sources.boundaries, &sources.gdp, &sources.population)
    }

    pub fn build(
        &self,
        boundaries: &[BoundaryFeature],
        gdp_rows: &[RawRow],
        population_rows: &[RawRow],
    ) -> Dataset {
        let gdp = parse_table(gdp_rows, &self.window);
        let population = parse_table(population_rows, &self.window);
        info!(
            gdp_rows = gdp_rows.len(),
            gdp_kept = gdp.len(),
            population_rows = population_rows.len(),
            population_kept = population.len(),
            "parsed economic tables"
        );

        let table = join_tables(&gdp, &population);

        let features: Vec<_> = boundaries
            .iter()
            .map(|b| enrich(b, &table, &self.window))
            .collect();

        let gdp_scale = ColorScale::new(table.gdp_extent, self.gdp_palette);
        let population_scale = ColorScale::new(table.population_extent, self.population_palette);
        let search = SearchIndex::new(features.iter().map(|f| Arc::clone(&f.metric)).collect());

        let dataset = Dataset {
            features,
            gdp_scale,
            population_scale,
            search,
        };
        info!(
            features = dataset.features.len(),
            without_data = dataset.without_data().count(),
            gdp_domain = ?dataset.gdp_scale.domain(),
            population_domain = ?dataset.population_scale.domain(),
            "dataset built"
        );
        dataset
    }
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new(YearWindow::default())
    }
}
