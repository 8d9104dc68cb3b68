use super::spatial::CellGrid;
use crate::election::CountyDot;
use crate::geo::CountyFips;
use glam::DVec2;
use std::collections::HashMap;

/// Grid cell size in degrees for dot lookup
const DOT_CELL_DEGREES: f64 = 0.5;

/// County centroids with a radius index, built off the UI thread
#[derive(Debug)]
pub struct DotLayer {
    dots: Vec<CountyDot>,
    grid: CellGrid,
    by_fips: HashMap<CountyFips, usize>,
}

impl DotLayer {
    pub fn new(dots: Vec<CountyDot>) -> Self {
        let mut grid = CellGrid::new(DOT_CELL_DEGREES);
        let mut by_fips = HashMap::with_capacity(dots.len());
        for (i, dot) in dots.iter().enumerate() {
            grid.insert_point(i, DVec2::new(dot.lon, dot.lat));
            by_fips.insert(dot.fips, i);
        }
        Self { dots, grid, by_fips }
    }

    pub fn get(&self, fips: CountyFips) -> Option<&CountyDot> {
        self.by_fips.get(&fips).and_then(|&i| self.dots.get(i))
    }

    pub fn dots(&self) -> &[CountyDot] {
        &self.dots
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// Closest dot with data for `year` within `radius` degrees
    pub fn nearest(&self, lon: f64, lat: f64, radius: f64, year: u16) -> Option<&CountyDot> {
        self.grid
            .query_radius(DVec2::new(lon, lat), radius)
            .into_iter()
            .filter_map(|i| self.dots.get(i))
            .filter(|d| d.year(year).is_some())
            .map(|d| (d, (d.lon - lon).hypot(d.lat - lat)))
            .filter(|&(_, dist)| dist <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(d, _)| d)
    }
}
