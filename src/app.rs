use crate::ui;
use election_map::color::{margin_color, prediction_color, result_color};
use election_map::config::Config;
use election_map::data::{CacheKey, DataStore};
use election_map::election::RaceType;
use election_map::geo::{CountyFips, DistrictId, StateCode};
use election_map::map::{Boundaries, FillColors, MapRenderer, RenderRequest, Viewport};
use election_map::nav::{Effect, HoverTarget, LoadSlot, Navigator, Scope, ViewKey};
use election_map::panel::{Panel, PanelInputs, Tooltip};
use ratatui::layout::Rect;

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub nav: Navigator,
    pub store: DataStore,
    pub colors: FillColors,
    /// Entity under the mouse, if any
    pub hover: Option<HoverTarget>,
    /// County centroids on the national presidential map
    pub county_dots: bool,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Set once the button moves while held; a release without it is a click
    drag_moved: bool,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Map area inside its border, in terminal cells
    map_area: Rect,
}

impl App {
    pub fn new(config: Config, boundaries: Boundaries, width: u16, height: u16) -> Self {
        let map_area = ui::screen_layout(Rect::new(0, 0, width, height)).map;
        // Braille gives 2x4 resolution per character
        let viewport = Viewport::national(map_area.width as usize * 2, map_area.height as usize * 4);
        let nav = Navigator::new(ViewKey {
            race: config.race,
            year: config.start_year,
        });
        let county_dots = config.county_dots;

        let mut app = Self {
            viewport,
            map_renderer: MapRenderer::new(boundaries),
            nav,
            store: DataStore::new(config),
            colors: FillColors::default(),
            hover: None,
            county_dots,
            should_quit: false,
            last_mouse: None,
            drag_moved: false,
            mouse_pos: None,
            map_area,
        };
        app.store.execute(app.nav.initial_effects());
        if county_dots {
            app.store.request(LoadSlot::CountyDots, CacheKey::county_dots());
        }
        app.refresh();
        app
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.map_area = ui::screen_layout(Rect::new(0, 0, width, height)).map;
        self.viewport.width = self.map_area.width as usize * 2;
        self.viewport.height = self.map_area.height as usize * 4;
        self.update_hover();
    }

    /// Drain finished loads; recolor when anything landed
    pub fn tick(&mut self) {
        if self.store.poll() {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.colors = self.fill_colors();
        self.update_hover();
    }

    /// Terminal cell to braille pixel inside the map, `None` outside it
    pub fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area;
        let inside = col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height;
        inside.then(|| ((col - area.x) as i32 * 2, (row - area.y) as i32 * 4))
    }

    /// Mouse cursor in map cells, for the marker
    pub fn cursor_cell(&self) -> Option<(u16, u16)> {
        let (col, row) = self.mouse_pos?;
        self.map_pixel(col, row)?;
        Some((col - self.map_area.x, row - self.map_area.y))
    }

    pub fn render_request(&self) -> RenderRequest<'_> {
        RenderRequest {
            scope: self.nav.scope(),
            layers: self.nav.layers(self.county_dots),
            colors: &self.colors,
            hover: self.hover.as_ref(),
            dots: self.store.county_dots().map(|d| (d, self.nav.year())),
        }
    }

    /// Whatever is loaded for the current view
    pub fn panel_inputs(&self) -> PanelInputs<'_> {
        let race = self.nav.race();
        let year = self.nav.year();
        let scope = self.nav.scope();
        PanelInputs {
            national: self.store.national_year(race, year),
            state: scope
                .state()
                .filter(|_| race != RaceType::House)
                .and_then(|s| self.store.state_year(race, s, year)),
            breakdown: scope
                .district()
                .and_then(|d| self.store.district_counties(d.state)?.district(year, d)),
            dots: self.store.county_dots(),
            county_name: scope
                .county()
                .and_then(|c| self.map_renderer.boundaries().counties.get(c))
                .map(|r| r.name.as_str())
                .filter(|name| !name.is_empty()),
        }
    }

    pub fn panel(&self) -> Panel {
        Panel::build(&self.nav, &self.panel_inputs())
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        let hover = self.hover.as_ref()?;
        Some(Tooltip::build(hover, &self.nav, &self.panel_inputs()))
    }

    fn fill_colors(&self) -> FillColors {
        let race = self.nav.race();
        let year = self.nav.year();
        let inputs = self.panel_inputs();
        let mut colors = FillColors::default();

        if let Some(national) = inputs.national {
            for state in StateCode::all() {
                let color = if self.nav.is_prediction() {
                    prediction_color(national.prediction(state))
                } else {
                    result_color(national.state(state))
                };
                colors.states.insert(state, color);
            }
            if race == RaceType::House {
                for (code, result) in &national.districts {
                    match DistrictId::parse(code) {
                        Some(id) => {
                            colors.districts.insert(id, result_color(Some(result)));
                        }
                        None => log::debug!("{race:?} {year}: unknown district {code}"),
                    }
                }
            }
        }
        if let Some(state) = inputs.state {
            for (fips, result) in &state.counties {
                if let Some(fips) = CountyFips::parse(fips) {
                    colors.counties.insert(fips, result_color(Some(result)));
                }
            }
        }
        if let Some(breakdown) = inputs.breakdown {
            for (name, county) in &breakdown.counties {
                colors
                    .district_counties
                    .insert(name.clone(), margin_color(Some(county.margin), Some(county.winner)));
            }
        }
        colors
    }

    fn update_hover(&mut self) {
        let hover = self
            .mouse_pos
            .and_then(|(col, row)| self.map_pixel(col, row))
            .and_then(|(px, py)| self.map_renderer.pick(&self.viewport, px, py, &self.render_request()));
        self.hover = hover;
    }

    /// Run one navigation step: start its loads and follow a state change
    /// with the camera
    fn navigate(&mut self, step: impl FnOnce(&mut Navigator) -> Vec<Effect>) {
        let before = self.nav.scope().state();
        let effects = step(&mut self.nav);
        self.store.execute(effects);
        let after = self.nav.scope().state();
        if after != before {
            self.fly_to(after);
        }
        self.refresh();
    }

    fn fly_to(&mut self, state: Option<StateCode>) {
        match state.and_then(|s| self.map_renderer.boundaries().states.get(s)) {
            Some(region) => self.viewport.fly_to_state(region.key.abbr(), &region.bounds),
            None => {
                if let Some(state) = state {
                    log::debug!("no outline for {state}, staying national");
                }
                self.viewport = Viewport::national(self.viewport.width, self.viewport.height);
            }
        }
    }

    /// Select whatever is under a terminal cell
    pub fn click(&mut self, col: u16, row: u16) {
        let Some((px, py)) = self.map_pixel(col, row) else {
            return;
        };
        let Some(target) = self
            .map_renderer
            .pick(&self.viewport, px, py, &self.render_request())
        else {
            return;
        };
        let national = self.nav.scope() == Scope::National;
        self.navigate(|nav| match target {
            HoverTarget::State(state) => nav.click_state(state),
            // County dots sit on the national map and open their state
            HoverTarget::County { fips, .. } if national => {
                fips.state().map(|s| nav.click_state(s)).unwrap_or_default()
            }
            HoverTarget::County { fips, .. } => nav.click_county(fips),
            HoverTarget::District(district) => nav.click_district(district),
            HoverTarget::DistrictCounty { .. } => Vec::new(),
        });
    }

    pub fn back(&mut self) {
        self.navigate(|nav| {
            nav.back();
            Vec::new()
        });
    }

    /// National scope and the national camera
    pub fn reset(&mut self) {
        self.navigate(|nav| {
            nav.reset();
            Vec::new()
        });
        self.viewport = Viewport::national(self.viewport.width, self.viewport.height);
        self.update_hover();
    }

    pub fn step_year(&mut self, forward: bool) {
        self.navigate(|nav| nav.step_year(forward));
    }

    pub fn set_race(&mut self, race: RaceType) {
        self.navigate(|nav| nav.set_race(race));
    }

    pub fn switch_to_president(&mut self) {
        self.navigate(Navigator::switch_to_president);
    }

    pub fn back_to_results(&mut self) {
        self.navigate(Navigator::back_to_results);
    }

    pub fn toggle_district_counties(&mut self) {
        self.navigate(Navigator::toggle_district_counties);
    }

    pub fn toggle_county_dots(&mut self) {
        self.county_dots = !self.county_dots;
        if self.county_dots && self.store.county_dots().is_none() {
            self.store.request(LoadSlot::CountyDots, CacheKey::county_dots());
        }
        self.refresh();
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.update_hover();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.update_hover();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.update_hover();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
            self.update_hover();
        }
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
            self.update_hover();
        }
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// "United States › Nevada › NV-2"
    pub fn breadcrumb(&self) -> String {
        let mut parts = vec!["United States".to_string()];
        let scope = self.nav.scope();
        if let Some(state) = scope.state() {
            parts.push(state.name().to_string());
        }
        if let Some(county) = scope.county() {
            let name = self
                .map_renderer
                .boundaries()
                .counties
                .get(county)
                .map_or_else(|| county.to_string(), |r| r.name.clone());
            parts.push(name);
        }
        if let Some(district) = scope.district() {
            parts.push(district.label());
        }
        if matches!(scope, Scope::DistrictCounties { .. }) {
            parts.push("Counties".to_string());
        }
        parts.join(" › ")
    }

    pub fn is_loading(&self) -> bool {
        self.store.pending() > 0
    }

    /// A load the info panel is waiting on
    pub fn is_panel_loading(&self) -> bool {
        [LoadSlot::National, LoadSlot::State, LoadSlot::DistrictCounties]
            .into_iter()
            .any(|slot| self.store.is_loading(slot))
    }

    /// Button pressed: start tracking a possible drag
    pub fn begin_drag(&mut self, x: u16, y: u16) {
        self.last_mouse = Some((x, y));
        self.drag_moved = false;
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            if dx != 0 || dy != 0 {
                self.drag_moved = true;
            }
            // Scale based on zoom: less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((x, y));
    }

    /// Button released: a press that never moved is a click
    pub fn end_drag(&mut self, x: u16, y: u16) {
        let clicked = self.last_mouse.is_some() && !self.drag_moved;
        self.last_mouse = None;
        self.drag_moved = false;
        if clicked {
            self.click(x, y);
        }
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.update_hover();
    }
}
