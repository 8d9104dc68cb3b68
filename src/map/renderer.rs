use crate::braille::BrailleCanvas;
use crate::color::{margin_color, Rgb, BACKDROP, NO_DATA};
use crate::election::CountyDot;
use crate::geo::{CountyFips, DistrictId, StateCode};
use crate::map::dots::DotLayer;
use crate::map::geometry::{fill_disc, stroke_path, Stroke};
use crate::map::layer::{Layer, Region};
use crate::map::projection::Viewport;
use crate::nav::{HoverTarget, LayerVisibility, Scope};
use glam::DVec2;
use rayon::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;

/// Hover radius around a county dot, in braille pixels
const DOT_PICK_PIXELS: f64 = 4.0;

/// Boundary layers loaded at startup
pub struct Boundaries {
    pub states: Layer<StateCode>,
    pub counties: Layer<CountyFips>,
    pub districts: Layer<DistrictId>,
}

impl Boundaries {
    pub fn empty() -> Self {
        Self {
            states: Layer::empty(),
            counties: Layer::empty(),
            districts: Layer::empty(),
        }
    }
}

/// Fill color of every entity that has a result in the current view
#[derive(Clone, Debug, Default)]
pub struct FillColors {
    pub states: HashMap<StateCode, Rgb>,
    pub counties: HashMap<CountyFips, Rgb>,
    pub districts: HashMap<DistrictId, Rgb>,
    /// County breakdown of the selected district, keyed by county name
    pub district_counties: HashMap<String, Rgb>,
}

/// Everything about the current view the renderer needs
#[derive(Clone, Copy)]
pub struct RenderRequest<'a> {
    pub scope: Scope,
    pub layers: LayerVisibility,
    pub colors: &'a FillColors,
    pub hover: Option<&'a HoverTarget>,
    /// County dots and the year to draw them for
    pub dots: Option<(&'a DotLayer, u16)>,
}

/// One rendered frame of the map, in character cells
pub struct MapFrame {
    pub width: usize,
    pub height: usize,
    /// Background color per cell
    fills: Vec<Option<Rgb>>,
    pub borders: BrailleCanvas,
    pub highlight: BrailleCanvas,
    pub dots: BrailleCanvas,
    dot_colors: Vec<Option<Rgb>>,
}

impl MapFrame {
    #[inline]
    pub fn fill(&self, cx: usize, cy: usize) -> Option<Rgb> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        self.fills[cy * self.width + cx]
    }

    #[inline]
    pub fn dot_color(&self, cx: usize, cy: usize) -> Option<Rgb> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        self.dot_colors[cy * self.width + cx]
    }
}

/// Choropleth renderer over the boundary layers
pub struct MapRenderer {
    boundaries: Boundaries,
}

impl MapRenderer {
    pub fn new(boundaries: Boundaries) -> Self {
        Self { boundaries }
    }

    pub fn boundaries(&self) -> &Boundaries {
        &self.boundaries
    }

    /// Check if any data is loaded
    pub fn has_data(&self) -> bool {
        !self.boundaries.states.is_empty()
    }

    /// Render fills, outlines and dots for a `width` x `height` character area
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        req: &RenderRequest,
    ) -> MapFrame {
        let mut frame = MapFrame {
            width,
            height,
            fills: vec![None; width * height],
            borders: BrailleCanvas::new(width, height),
            highlight: BrailleCanvas::new(width, height),
            dots: BrailleCanvas::new(width, height),
            dot_colors: vec![None; width * height],
        };
        if width == 0 || height == 0 {
            return frame;
        }

        // Sample each cell's center; rows are independent
        frame
            .fills
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(cy, row)| {
                for (cx, cell) in row.iter_mut().enumerate() {
                    let (lon, lat) =
                        viewport.unproject_f(cx as f64 * 2.0 + 1.0, cy as f64 * 4.0 + 2.0);
                    *cell = self.fill_at(lon, lat, req);
                }
            });

        self.draw_borders(&mut frame.borders, viewport, req);
        self.draw_highlight(&mut frame.highlight, viewport, req);
        if req.layers.county_dots {
            if let Some((dots, year)) = req.dots {
                draw_dots(&mut frame, viewport, dots.dots(), year);
            }
        }
        frame
    }

    /// Fill of the topmost visible layer at a point
    fn fill_at(&self, lon: f64, lat: f64, req: &RenderRequest) -> Option<Rgb> {
        let b = &self.boundaries;
        let colors = req.colors;
        let layers = &req.layers;

        if layers.district_counties {
            if let Some(region) = self.district_county_hit(lon, lat, req) {
                return colors.district_counties.get(&region.name).copied();
            }
        }
        if layers.counties {
            let filter = layers.county_filter;
            if let Some(region) = b
                .counties
                .hit(lon, lat, |r| filter.map_or(true, |s| r.key.in_state(s)))
            {
                return Some(colors.counties.get(&region.key).copied().unwrap_or(NO_DATA));
            }
        }
        if layers.districts {
            if let Some(region) = b.districts.hit(lon, lat, |_| true) {
                return Some(colors.districts.get(&region.key).copied().unwrap_or(NO_DATA));
            }
        }
        b.states.hit(lon, lat, |_| true).map(|region| {
            if layers.state_fill_by_result {
                colors.states.get(&region.key).copied().unwrap_or(NO_DATA)
            } else {
                BACKDROP
            }
        })
    }

    fn district_county_hit(&self, lon: f64, lat: f64, req: &RenderRequest) -> Option<&Region<CountyFips>> {
        let state = req.scope.state()?;
        let names = &req.colors.district_counties;
        self.boundaries
            .counties
            .hit(lon, lat, |r| r.key.in_state(state) && names.contains_key(&r.name))
    }

    fn draw_borders(&self, canvas: &mut BrailleCanvas, viewport: &Viewport, req: &RenderRequest) {
        let b = &self.boundaries;
        let layers = &req.layers;
        draw_layer(canvas, viewport, &b.states, |_| true);

        if layers.counties {
            let filter = layers.county_filter;
            draw_layer(canvas, viewport, &b.counties, |r| filter.map_or(true, |s| r.key.in_state(s)));
        }
        if layers.districts {
            draw_layer(canvas, viewport, &b.districts, |_| true);
        }
        if layers.district_counties {
            if let Some(state) = req.scope.state() {
                let names = &req.colors.district_counties;
                draw_layer(
                    canvas,
                    viewport,
                    &b.counties,
                    |r| r.key.in_state(state) && names.contains_key(&r.name),
                );
            }
        }
    }

    /// Hovered entity plus the selected county or district
    fn draw_highlight(&self, canvas: &mut BrailleCanvas, viewport: &Viewport, req: &RenderRequest) {
        let b = &self.boundaries;
        match req.scope {
            Scope::County { county, .. } => {
                if let Some(region) = b.counties.get(county) {
                    draw_region(canvas, viewport, region, Stroke::Thick);
                }
            }
            Scope::District { district, .. } | Scope::DistrictCounties { district, .. } => {
                if let Some(region) = b.districts.get(district) {
                    draw_region(canvas, viewport, region, Stroke::Thick);
                }
            }
            _ => {}
        }

        match req.hover {
            Some(HoverTarget::State(state)) => {
                if let Some(region) = b.states.get(*state) {
                    draw_region(canvas, viewport, region, Stroke::Thin);
                }
            }
            Some(HoverTarget::County { fips, .. }) => {
                if let Some(region) = b.counties.get(*fips) {
                    draw_region(canvas, viewport, region, Stroke::Thin);
                }
            }
            Some(HoverTarget::District(district)) => {
                if let Some(region) = b.districts.get(*district) {
                    draw_region(canvas, viewport, region, Stroke::Thin);
                }
            }
            Some(HoverTarget::DistrictCounty { district, name }) => {
                draw_layer(
                    canvas,
                    viewport,
                    &b.counties,
                    |r| r.key.in_state(district.state) && &r.name == name,
                );
            }
            None => {}
        }
    }

    /// Entity under a braille pixel, topmost visible layer first
    pub fn pick(&self, viewport: &Viewport, px: i32, py: i32, req: &RenderRequest) -> Option<HoverTarget> {
        let (lon, lat) = viewport.unproject(px, py);
        let b = &self.boundaries;
        let layers = &req.layers;

        if layers.county_dots {
            if let Some((dots, year)) = req.dots {
                let radius = DOT_PICK_PIXELS * 360.0 / (viewport.zoom * viewport.width.max(1) as f64);
                if let Some(dot) = dots.nearest(lon, lat, radius, year) {
                    return Some(HoverTarget::County {
                        fips: dot.fips,
                        name: dot.name.clone(),
                    });
                }
            }
        }
        if layers.district_counties {
            if let (Some(region), Some(district)) =
                (self.district_county_hit(lon, lat, req), req.scope.district())
            {
                return Some(HoverTarget::DistrictCounty {
                    district,
                    name: region.name.clone(),
                });
            }
        }
        if layers.counties {
            let filter = layers.county_filter;
            if let Some(region) = b
                .counties
                .hit(lon, lat, |r| filter.map_or(true, |s| r.key.in_state(s)))
            {
                return Some(HoverTarget::County {
                    fips: region.key,
                    name: region.name.clone(),
                });
            }
        }
        if layers.districts {
            if let Some(region) = b.districts.hit(lon, lat, |_| true) {
                return Some(HoverTarget::District(region.key));
            }
        }
        b.states
            .hit(lon, lat, |_| true)
            .map(|region| HoverTarget::State(region.key))
    }
}

/// Outline every on-screen region accepted by `filter`
fn draw_layer<K: Copy + Eq + Hash>(
    canvas: &mut BrailleCanvas,
    viewport: &Viewport,
    layer: &Layer<K>,
    filter: impl Fn(&Region<K>) -> bool,
) {
    let view = viewport.visible_bounds();
    for idx in layer.visible(&view) {
        let region = &layer.regions()[idx];
        if filter(region) {
            draw_region(canvas, viewport, region, Stroke::Thin);
        }
    }
}

fn draw_region<K>(canvas: &mut BrailleCanvas, viewport: &Viewport, region: &Region<K>, stroke: Stroke) {
    for ring in region.rings() {
        draw_ring(canvas, ring, viewport, stroke);
    }
}

/// Draw a ring with viewport culling
fn draw_ring(canvas: &mut BrailleCanvas, ring: &[DVec2], viewport: &Viewport, stroke: Stroke) {
    let points = ring.iter().map(|p| viewport.project(p.x, p.y));
    stroke_path(canvas, points, stroke, |a, b| {
        let jump = ((b.0 - a.0).abs() + (b.1 - a.1).abs()) as usize;
        jump < viewport.width && viewport.line_might_be_visible(a, b)
    });
}

/// Dot radius in braille pixels, by turnout
fn dot_radius(total_votes: u64) -> i32 {
    match total_votes {
        0..=24_999 => 0,
        25_000..=249_999 => 1,
        250_000..=999_999 => 2,
        _ => 3,
    }
}

/// Draw county dots; each cell takes the color of its biggest county
fn draw_dots(frame: &mut MapFrame, viewport: &Viewport, dots: &[CountyDot], year: u16) {
    let mut cell_votes = vec![0u64; frame.width * frame.height];
    for dot in dots {
        let Some(result) = dot.year(year) else {
            continue;
        };
        let (px, py) = viewport.project(dot.lon, dot.lat);
        if !viewport.is_visible(px, py) {
            continue;
        }
        let radius = dot_radius(result.total_votes);
        fill_disc(&mut frame.dots, (px, py), radius);

        let color = margin_color(Some(result.margin), result.winner);
        let (x0, x1) = ((px - radius).max(0) / 2, (px + radius).max(0) / 2);
        let (y0, y1) = ((py - radius).max(0) / 4, (py + radius).max(0) / 4);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let (cx, cy) = (cx as usize, cy as usize);
                if cx >= frame.width || cy >= frame.height {
                    continue;
                }
                let idx = cy * frame.width + cx;
                if frame.dot_colors[idx].is_none() || result.total_votes > cell_votes[idx] {
                    cell_votes[idx] = result.total_votes;
                    frame.dot_colors[idx] = Some(color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::layer::Polygon;
    use crate::nav::{Navigator, ViewKey};
    use crate::election::RaceType;

    fn square(x0: f64, y0: f64, size: f64) -> Polygon {
        Polygon {
            exterior: vec![
                DVec2::new(x0, y0),
                DVec2::new(x0 + size, y0),
                DVec2::new(x0 + size, y0 + size),
                DVec2::new(x0, y0 + size),
                DVec2::new(x0, y0),
            ],
            holes: Vec::new(),
        }
    }

    fn st(abbr: &str) -> StateCode {
        StateCode::from_abbr(abbr).unwrap()
    }

    /// Two side-by-side "states", each with one county
    fn renderer() -> MapRenderer {
        let nv = st("NV");
        let ut = st("UT");
        MapRenderer::new(Boundaries {
            states: Layer::new(vec![
                Region::new(nv, "Nevada".into(), vec![square(-110.0, 30.0, 10.0)]),
                Region::new(ut, "Utah".into(), vec![square(-100.0, 30.0, 10.0)]),
            ]),
            counties: Layer::new(vec![
                Region::new(CountyFips::parse("32003").unwrap(), "Clark".into(), vec![square(-110.0, 30.0, 10.0)]),
                Region::new(CountyFips::parse("49035").unwrap(), "Salt Lake".into(), vec![square(-100.0, 30.0, 10.0)]),
            ]),
            districts: Layer::empty(),
        })
    }

    #[test]
    fn test_national_fill_and_pick() {
        let r = renderer();
        let vp = Viewport::new(-100.0, 35.0, 10.0, 40, 40);
        let mut colors = FillColors::default();
        let blue = Rgb::new(0, 0, 200);
        colors.states.insert(st("NV"), blue);
        let nav = Navigator::new(ViewKey { race: RaceType::Senate, year: 2024 });
        let req = RenderRequest {
            scope: nav.scope(),
            layers: nav.layers(false),
            colors: &colors,
            hover: None,
            dots: None,
        };
        let frame = r.render(20, 10, &vp, &req);
        // Left half is Nevada, right half Utah without data
        assert_eq!(frame.fill(5, 5), Some(blue));
        assert_eq!(frame.fill(15, 5), Some(NO_DATA));
        assert_eq!(r.pick(&vp, 10, 20, &req), Some(HoverTarget::State(st("NV"))));
        assert_eq!(r.pick(&vp, 30, 20, &req), Some(HoverTarget::State(st("UT"))));
    }

    #[test]
    fn test_state_scope_shows_only_its_counties() {
        let r = renderer();
        let vp = Viewport::new(-100.0, 35.0, 10.0, 40, 40);
        let mut nav = Navigator::new(ViewKey { race: RaceType::Senate, year: 2024 });
        nav.click_state(st("NV"));
        let colors = FillColors::default();
        let req = RenderRequest {
            scope: nav.scope(),
            layers: nav.layers(false),
            colors: &colors,
            hover: None,
            dots: None,
        };
        let frame = r.render(20, 10, &vp, &req);
        assert_eq!(frame.fill(5, 5), Some(NO_DATA));
        assert_eq!(frame.fill(15, 5), Some(BACKDROP));
        assert!(matches!(
            r.pick(&vp, 10, 20, &req),
            Some(HoverTarget::County { ref name, .. }) if name == "Clark"
        ));
        assert_eq!(r.pick(&vp, 30, 20, &req), Some(HoverTarget::State(st("UT"))));
    }

    #[test]
    fn test_dot_radius_scales_with_turnout() {
        assert_eq!(dot_radius(1_000), 0);
        assert_eq!(dot_radius(100_000), 1);
        assert_eq!(dot_radius(4_000_000), 3);
    }
}
