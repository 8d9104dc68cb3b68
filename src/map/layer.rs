//! Polygon layers with bbox-indexed hit-testing.

use super::spatial::CellGrid;
use glam::DVec2;
use std::collections::HashMap;
use std::hash::Hash;

/// Grid cell size in degrees for region lookup
const GRID_CELL_DEGREES: f64 = 1.0;

/// Axis-aligned lon/lat box; `x` is longitude, `y` latitude
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min: DVec2::new(f64::INFINITY, f64::INFINITY),
        max: DVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    pub const fn from_coords(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min: DVec2::new(min_lon, min_lat),
            max: DVec2::new(max_lon, max_lat),
        }
    }

    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a DVec2>) -> Self {
        points.into_iter().fold(Self::EMPTY, |b, &p| b.extend(p))
    }

    #[inline]
    pub fn extend(self, p: DVec2) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn union(self, other: Bounds) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }
}

/// Even-odd ray casting against one closed ring
pub fn ring_contains(ring: &[DVec2], p: DVec2) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Signed shoelace area (planar degrees²)
pub fn ring_area(ring: &[DVec2]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        sum += a.perp_dot(b);
    }
    sum * 0.5
}

/// Area-weighted centroid of a ring, or the vertex mean for degenerate rings
pub fn ring_centroid(ring: &[DVec2]) -> Option<DVec2> {
    if ring.is_empty() {
        return None;
    }
    let area = ring_area(ring);
    if area.abs() < 1e-12 {
        let sum: DVec2 = ring.iter().copied().sum();
        return Some(sum / ring.len() as f64);
    }
    let n = ring.len();
    let mut c = DVec2::ZERO;
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        c += (a + b) * a.perp_dot(b);
    }
    Some(c / (6.0 * area))
}

/// Exterior ring plus holes
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<DVec2>,
    pub holes: Vec<Vec<DVec2>>,
}

impl Polygon {
    pub fn contains(&self, p: DVec2) -> bool {
        ring_contains(&self.exterior, p) && !self.holes.iter().any(|h| ring_contains(h, p))
    }

    pub fn area(&self) -> f64 {
        ring_area(&self.exterior).abs() - self.holes.iter().map(|h| ring_area(h).abs()).sum::<f64>()
    }
}

/// A named geographic unit with its outline
#[derive(Clone, Debug, PartialEq)]
pub struct Region<K> {
    pub key: K,
    pub name: String,
    pub polygons: Vec<Polygon>,
    pub bounds: Bounds,
}

impl<K> Region<K> {
    pub fn new(key: K, name: String, polygons: Vec<Polygon>) -> Self {
        let bounds = polygons
            .iter()
            .map(|p| Bounds::of_points(&p.exterior))
            .fold(Bounds::EMPTY, Bounds::union);
        Self {
            key,
            name,
            polygons,
            bounds,
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.bounds.contains(p) && self.polygons.iter().any(|poly| poly.contains(p))
    }

    /// Centroid of the largest polygon, where a label or dot belongs
    pub fn centroid(&self) -> Option<DVec2> {
        self.polygons
            .iter()
            .max_by(|a, b| a.area().total_cmp(&b.area()))
            .and_then(|p| ring_centroid(&p.exterior))
    }

    /// Every ring, for outline drawing
    pub fn rings(&self) -> impl Iterator<Item = &[DVec2]> {
        self.polygons.iter().flat_map(|p| {
            std::iter::once(p.exterior.as_slice()).chain(p.holes.iter().map(Vec::as_slice))
        })
    }
}

/// Regions of one kind with a spatial index
pub struct Layer<K> {
    regions: Vec<Region<K>>,
    grid: CellGrid,
    index: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash> Layer<K> {
    pub fn new(regions: Vec<Region<K>>) -> Self {
        let grid = CellGrid::from_bounds(regions.iter().map(|r| r.bounds), GRID_CELL_DEGREES);
        let index = regions.iter().enumerate().map(|(i, r)| (r.key, i)).collect();
        Self {
            regions,
            grid,
            index,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn regions(&self) -> &[Region<K>] {
        &self.regions
    }

    pub fn get(&self, key: K) -> Option<&Region<K>> {
        self.index.get(&key).map(|&i| &self.regions[i])
    }

    /// Region containing the point among those accepted by `filter`
    pub fn hit(&self, lon: f64, lat: f64, filter: impl Fn(&Region<K>) -> bool) -> Option<&Region<K>> {
        let p = DVec2::new(lon, lat);
        let mut candidates = Vec::new();
        self.grid.query_into(&Bounds { min: p, max: p }, &mut candidates);
        candidates
            .into_iter()
            .map(|i| &self.regions[i])
            .find(|r| filter(r) && r.contains(p))
    }

    /// Indices of regions whose bounds overlap `view`
    pub fn visible(&self, view: &Bounds) -> Vec<usize> {
        let mut out = Vec::new();
        self.grid.query_into(view, &mut out);
        out.sort_unstable();
        out.dedup();
        out.retain(|&i| self.regions[i].bounds.intersects(view));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x0 + size, y0),
            DVec2::new(x0 + size, y0 + size),
            DVec2::new(x0, y0 + size),
        ]
    }

    #[test]
    fn test_polygon_with_hole() {
        let poly = Polygon {
            exterior: square(0.0, 0.0, 10.0),
            holes: vec![square(4.0, 4.0, 2.0)],
        };
        assert!(poly.contains(DVec2::new(1.0, 1.0)));
        assert!(!poly.contains(DVec2::new(5.0, 5.0)));
        assert!(!poly.contains(DVec2::new(11.0, 5.0)));
        assert_eq!(poly.area(), 96.0);
    }

    #[test]
    fn test_centroid() {
        let c = ring_centroid(&square(2.0, 2.0, 4.0)).unwrap();
        assert!((c - DVec2::new(4.0, 4.0)).length() < 1e-9);
    }

    #[test]
    fn test_layer_hit_and_filter() {
        let a = Region::new(1u32, "A".into(), vec![Polygon { exterior: square(0.0, 0.0, 3.0), holes: vec![] }]);
        let b = Region::new(2u32, "B".into(), vec![Polygon { exterior: square(3.0, 0.0, 3.0), holes: vec![] }]);
        let layer = Layer::new(vec![a, b]);
        assert_eq!(layer.hit(1.0, 1.0, |_| true).map(|r| r.key), Some(1));
        assert_eq!(layer.hit(4.5, 1.0, |_| true).map(|r| r.key), Some(2));
        assert!(layer.hit(4.5, 1.0, |r| r.key == 1).is_none());
        assert!(layer.hit(10.0, 10.0, |_| true).is_none());
        assert_eq!(layer.get(2).map(|r| r.name.as_str()), Some("B"));
        assert_eq!(layer.visible(&Bounds::from_coords(3.5, 0.5, 5.0, 1.0)), vec![1]);
    }
}
