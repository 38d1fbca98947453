use crate::dataset::Bounds;
use std::collections::HashMap;

/// Spatial index for geographic features using conservative approximation.
/// Each feature's bounding box is indexed into every cell it overlaps,
/// guaranteeing no false negatives while allowing false positives
/// (eliminated downstream by bbox and point-in-polygon checks).
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounding boxes (conservative approximation:
    /// each feature inserted into every cell its bbox overlaps)
    pub fn build<'a>(bboxes: impl Iterator<Item = &'a Bounds>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, b) in bboxes.enumerate() {
            let min_cell = grid.to_cell(b.min_lon, b.min_lat);
            let max_cell = grid.to_cell(b.max_lon, b.max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Append feature indices for the given bounds into results vec.
    /// May contain duplicates; caller should dedup after all queries.
    pub fn query_into(&self, bounds: &Bounds, results: &mut Vec<usize>) {
        let min_cell = self.to_cell(bounds.min_lon, bounds.min_lat);
        let max_cell = self.to_cell(bounds.max_lon, bounds.max_lat);
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    results.extend_from_slice(indices);
                }
            }
        }
    }

    /// Sorted, deduplicated feature indices whose cells overlap `bounds`
    pub fn query(&self, bounds: &Bounds) -> Vec<usize> {
        let mut results = Vec::new();
        self.query_into(bounds, &mut results);
        results.sort_unstable();
        results.dedup();
        results
    }

    /// Feature indices whose cell contains the point
    pub fn query_point(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Bounds {
        Bounds {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    #[test]
    fn test_query_dedups_multi_cell_features() {
        let boxes = [b(0.0, 0.0, 25.0, 25.0), b(100.0, 10.0, 101.0, 11.0)];
        let grid = FeatureGrid::build(boxes.iter(), 10.0);
        assert_eq!(grid.query(&b(-5.0, -5.0, 30.0, 30.0)), vec![0]);
        assert_eq!(grid.query(&Bounds::WORLD), vec![0, 1]);
    }

    #[test]
    fn test_query_point() {
        let boxes = [b(0.0, 0.0, 25.0, 25.0), b(100.0, 10.0, 101.0, 11.0)];
        let grid = FeatureGrid::build(boxes.iter(), 10.0);
        assert_eq!(grid.query_point(12.0, 12.0), &[0]);
        assert_eq!(grid.query_point(100.5, 10.5), &[1]);
        assert!(grid.query_point(-120.0, 40.0).is_empty());
    }
}
