//! Uniform lon/lat cell index shared by polygon layers and county dots.
//!
//! Lookups are conservative: a query returns every index whose point or
//! bounding box touches a cell the query touches, so callers still run the
//! exact test (point-in-polygon, distance) on the candidates.

use super::layer::Bounds;
use glam::DVec2;
use std::collections::HashMap;

#[derive(Debug)]
pub struct CellGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    /// Cell size in degrees
    cell_size: f64,
}

impl CellGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    /// Grid over polygon bounding boxes, indexed by position in the iterator.
    /// Empty boxes are left out.
    pub fn from_bounds(bounds: impl Iterator<Item = Bounds>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, b) in bounds.enumerate() {
            grid.insert_bounds(idx, &b);
        }
        grid
    }

    #[inline(always)]
    fn cell_of(&self, p: DVec2) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    fn cells_of(&self, b: &Bounds) -> impl Iterator<Item = (i32, i32)> {
        let (x0, y0) = self.cell_of(b.min);
        let (x1, y1) = self.cell_of(b.max);
        (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| (x, y)))
    }

    pub fn insert_point(&mut self, idx: usize, p: DVec2) {
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(idx);
    }

    pub fn insert_bounds(&mut self, idx: usize, b: &Bounds) {
        if b.is_empty() {
            return;
        }
        let cells: Vec<_> = self.cells_of(b).collect();
        for cell in cells {
            self.cells.entry(cell).or_default().push(idx);
        }
    }

    /// Append indices touching `bounds` to `out`. Boxes spanning several
    /// cells show up once per cell; dedup if that matters.
    pub fn query_into(&self, bounds: &Bounds, out: &mut Vec<usize>) {
        for cell in self.cells_of(bounds) {
            if let Some(indices) = self.cells.get(&cell) {
                out.extend_from_slice(indices);
            }
        }
    }

    /// Indices in cells within `radius` degrees of `p`
    pub fn query_radius(&self, p: DVec2, radius: f64) -> Vec<usize> {
        let r = DVec2::splat(radius);
        let mut out = Vec::new();
        self.query_into(&Bounds { min: p - r, max: p + r }, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_query_finds_neighbors() {
        let mut grid = CellGrid::new(0.5);
        grid.insert_point(0, DVec2::new(-115.1, 36.2));
        grid.insert_point(1, DVec2::new(-119.8, 39.5));
        assert_eq!(grid.query_radius(DVec2::new(-115.0, 36.0), 0.5), vec![0]);
        assert!(grid.query_radius(DVec2::new(-100.0, 36.0), 0.5).is_empty());
    }

    #[test]
    fn test_bounds_span_cells() {
        let grid = CellGrid::from_bounds(
            [Bounds::from_coords(-120.0, 35.0, -114.0, 42.0), Bounds::EMPTY].into_iter(),
            1.0,
        );
        let mut hits = Vec::new();
        grid.query_into(&Bounds::from_coords(-115.5, 41.5, -115.5, 41.5), &mut hits);
        assert_eq!(hits, vec![0]);
        hits.clear();
        grid.query_into(&Bounds::from_coords(-100.0, 30.0, -100.0, 30.0), &mut hits);
        assert!(hits.is_empty());
    }
}
