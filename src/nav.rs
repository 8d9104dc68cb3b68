//! Drill-down navigation: National → State → County | District → district
//! county breakdown, plus the race/year axis.
//!
//! [`Navigator`] never does I/O. Each event returns the loads the caller
//! should start as [`Effect`]s, and everything the map needs to know about
//! which layers to draw is derived from the current state on demand.

use crate::election::{is_prediction_year, RaceType, LAST_OBSERVED_YEAR};
use crate::geo::{CountyFips, DistrictId, StateCode};

/// How deep the user has drilled in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    National,
    State {
        state: StateCode,
    },
    County {
        state: StateCode,
        county: CountyFips,
    },
    District {
        state: StateCode,
        district: DistrictId,
    },
    DistrictCounties {
        state: StateCode,
        district: DistrictId,
    },
}

impl Scope {
    pub fn state(&self) -> Option<StateCode> {
        match *self {
            Scope::National => None,
            Scope::State { state }
            | Scope::County { state, .. }
            | Scope::District { state, .. }
            | Scope::DistrictCounties { state, .. } => Some(state),
        }
    }

    pub fn county(&self) -> Option<CountyFips> {
        match *self {
            Scope::County { county, .. } => Some(county),
            _ => None,
        }
    }

    pub fn district(&self) -> Option<DistrictId> {
        match *self {
            Scope::District { district, .. } | Scope::DistrictCounties { district, .. } => {
                Some(district)
            }
            _ => None,
        }
    }

    /// One level up
    pub fn parent(&self) -> Scope {
        match *self {
            Scope::National | Scope::State { .. } => Scope::National,
            Scope::County { state, .. } => Scope::State { state },
            Scope::District { state, .. } => Scope::State { state },
            Scope::DistrictCounties { state, district } => Scope::District { state, district },
        }
    }
}

/// Race type and year being displayed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub race: RaceType,
    pub year: u16,
}

impl Default for ViewKey {
    fn default() -> Self {
        Self {
            race: RaceType::President,
            year: LAST_OBSERVED_YEAR,
        }
    }
}

/// Load requested by a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    LoadNational(RaceType),
    LoadState(RaceType, StateCode),
    LoadDistrictCounties(DistrictId),
}

/// Which map layers are drawn, and how, at the current scope
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerVisibility {
    /// States colored by their result; otherwise a neutral backdrop
    pub state_fill_by_result: bool,
    pub counties: bool,
    pub county_dots: bool,
    pub districts: bool,
    pub district_counties: bool,
    /// Only counties with this state FIPS prefix are drawn
    pub county_filter: Option<StateCode>,
}

/// Entity under the mouse
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoverTarget {
    State(StateCode),
    County { fips: CountyFips, name: String },
    District(DistrictId),
    /// County inside the district breakdown, keyed by name
    DistrictCounty { district: DistrictId, name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigator {
    scope: Scope,
    view: ViewKey,
    prediction: bool,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(ViewKey::default())
    }
}

impl Navigator {
    pub fn new(view: ViewKey) -> Self {
        let mut nav = Self {
            scope: Scope::National,
            view,
            prediction: false,
        };
        nav.set_year(view.year);
        nav
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn view(&self) -> ViewKey {
        self.view
    }

    pub fn race(&self) -> RaceType {
        self.view.race
    }

    pub fn year(&self) -> u16 {
        self.view.year
    }

    /// True while a forecast year is selected
    pub fn is_prediction(&self) -> bool {
        self.prediction
    }

    /// Loads needed to show the current view from scratch
    pub fn initial_effects(&self) -> Vec<Effect> {
        let mut effects = vec![Effect::LoadNational(self.view.race)];
        effects.extend(self.scope_effects());
        effects
    }

    fn scope_effects(&self) -> Option<Effect> {
        match self.scope {
            Scope::National => None,
            Scope::DistrictCounties { district, .. } => Some(Effect::LoadDistrictCounties(district)),
            _ if self.view.race == RaceType::House => None,
            other => other
                .state()
                .map(|s| Effect::LoadState(self.view.race, s)),
        }
    }

    pub fn click_state(&mut self, state: StateCode) -> Vec<Effect> {
        if self.scope.state() == Some(state) {
            self.scope = Scope::National;
            return Vec::new();
        }
        self.scope = Scope::State { state };
        // House needs only the district records already in the national file
        if self.view.race == RaceType::House {
            Vec::new()
        } else {
            vec![Effect::LoadState(self.view.race, state)]
        }
    }

    pub fn click_county(&mut self, county: CountyFips) -> Vec<Effect> {
        match self.scope {
            Scope::County { state, county: selected } if selected == county => {
                self.scope = Scope::State { state };
            }
            Scope::State { state } | Scope::County { state, .. } if county.in_state(state) => {
                self.scope = Scope::County { state, county };
            }
            _ => {}
        }
        Vec::new()
    }

    pub fn click_district(&mut self, district: DistrictId) -> Vec<Effect> {
        match self.scope.state() {
            Some(state) if state == district.state => {
                self.scope = if self.scope.district() == Some(district) {
                    Scope::State { state }
                } else {
                    Scope::District { state, district }
                };
            }
            // Another state: show its district list first
            _ => self.scope = Scope::State {
                state: district.state,
            },
        }
        Vec::new()
    }

    pub fn toggle_district_counties(&mut self) -> Vec<Effect> {
        match self.scope {
            Scope::District { state, district } => {
                self.scope = Scope::DistrictCounties { state, district };
                vec![Effect::LoadDistrictCounties(district)]
            }
            Scope::DistrictCounties { state, district } => {
                self.scope = Scope::District { state, district };
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn back(&mut self) {
        self.scope = self.scope.parent();
    }

    /// Jump straight back to the national view
    pub fn reset(&mut self) {
        self.scope = Scope::National;
    }

    pub fn set_year(&mut self, year: u16) -> Vec<Effect> {
        if is_prediction_year(year) {
            let race_changed = self.view.race != RaceType::Senate;
            self.view = ViewKey {
                race: RaceType::Senate,
                year,
            };
            self.prediction = true;
            self.scope = Scope::National;
            return if race_changed {
                vec![Effect::LoadNational(RaceType::Senate)]
            } else {
                Vec::new()
            };
        }

        let was_prediction = self.prediction;
        self.prediction = false;
        self.view.year = if self.view.race.has_year(year) {
            year
        } else {
            self.view.race.nearest_year(year)
        };
        if was_prediction {
            self.scope = Scope::National;
        }
        Vec::new()
    }

    pub fn set_race(&mut self, race: RaceType) -> Vec<Effect> {
        if self.prediction && race != RaceType::Senate {
            return Vec::new();
        }
        if race == self.view.race {
            return Vec::new();
        }
        self.view = ViewKey {
            race,
            year: race.nearest_year(self.view.year),
        };
        self.scope = Scope::National;
        vec![Effect::LoadNational(race)]
    }

    /// From a forecast year, jump to the nearest presidential results
    pub fn switch_to_president(&mut self) -> Vec<Effect> {
        let year = RaceType::President.nearest_year(self.view.year);
        self.prediction = false;
        self.scope = Scope::National;
        let changed = self.view.race != RaceType::President;
        self.view = ViewKey {
            race: RaceType::President,
            year,
        };
        if changed {
            vec![Effect::LoadNational(RaceType::President)]
        } else {
            Vec::new()
        }
    }

    /// Leave a forecast year for the latest observed results of the same race
    pub fn back_to_results(&mut self) -> Vec<Effect> {
        self.prediction = false;
        self.scope = Scope::National;
        self.view.year = self.view.race.nearest_year(LAST_OBSERVED_YEAR);
        Vec::new()
    }

    /// Previous or next year on the active race's slider
    pub fn step_year(&mut self, forward: bool) -> Vec<Effect> {
        let years = self.view.race.slider_years();
        let Some(pos) = years.iter().position(|&y| y == self.view.year) else {
            return self.set_year(self.view.race.nearest_year(self.view.year));
        };
        let next = if forward {
            years.get(pos + 1)
        } else {
            pos.checked_sub(1).and_then(|p| years.get(p))
        };
        match next {
            Some(&year) => self.set_year(year),
            None => Vec::new(),
        }
    }

    pub fn layers(&self, county_dots_enabled: bool) -> LayerVisibility {
        let race = self.view.race;
        let house = race == RaceType::House;
        let national = self.scope == Scope::National;
        let breakdown = matches!(self.scope, Scope::DistrictCounties { .. });
        let counties = !national && !house;
        LayerVisibility {
            state_fill_by_result: national && !house,
            counties,
            county_dots: national
                && county_dots_enabled
                && race == RaceType::President
                && !self.prediction,
            districts: house,
            district_counties: breakdown,
            county_filter: if counties { self.scope.state() } else { None },
        }
    }
}

/// Per-slot generation counters guarding against out-of-order responses
#[derive(Clone, Debug, Default)]
pub struct RequestTracker {
    generations: std::collections::HashMap<LoadSlot, u64>,
}

/// What a load response will be committed to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadSlot {
    National,
    State,
    DistrictCounties,
    CountyDots,
}

impl RequestTracker {
    /// Start a request for `slot`, superseding any earlier one
    pub fn begin(&mut self, slot: LoadSlot) -> u64 {
        let generation = self.generations.entry(slot).or_insert(0);
        *generation += 1;
        *generation
    }

    pub fn is_current(&self, slot: LoadSlot, generation: u64) -> bool {
        self.generations.get(&slot) == Some(&generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(abbr: &str) -> StateCode {
        StateCode::from_abbr(abbr).unwrap()
    }

    fn county(code: &str) -> CountyFips {
        CountyFips::parse(code).unwrap()
    }

    fn district(code: &str) -> DistrictId {
        DistrictId::parse(code).unwrap()
    }

    #[test]
    fn test_state_county_back_back_is_national() {
        let mut nav = Navigator::default();
        assert_eq!(
            nav.click_state(st("CA")),
            vec![Effect::LoadState(RaceType::President, st("CA"))]
        );
        assert!(nav.click_county(county("06037")).is_empty());
        assert_eq!(nav.scope().county(), Some(county("06037")));
        nav.back();
        assert_eq!(nav.scope(), Scope::State { state: st("CA") });
        nav.back();
        assert_eq!(nav.scope(), Scope::National);
        assert_eq!(nav.scope().state(), None);
        assert_eq!(nav.scope().county(), None);
        assert_eq!(nav.scope().district(), None);
    }

    #[test]
    fn test_reclick_pops_a_level() {
        let mut nav = Navigator::default();
        nav.click_state(st("TX"));
        nav.click_county(county("48201"));
        nav.click_county(county("48201"));
        assert_eq!(nav.scope(), Scope::State { state: st("TX") });
        nav.click_state(st("TX"));
        assert_eq!(nav.scope(), Scope::National);
    }

    #[test]
    fn test_county_outside_state_ignored() {
        let mut nav = Navigator::default();
        nav.click_county(county("06037"));
        assert_eq!(nav.scope(), Scope::National);
        nav.click_state(st("NV"));
        nav.click_county(county("06037"));
        assert_eq!(nav.scope(), Scope::State { state: st("NV") });
    }

    #[test]
    fn test_other_state_from_county() {
        let mut nav = Navigator::default();
        nav.click_state(st("CA"));
        nav.click_county(county("06037"));
        let effects = nav.click_state(st("OR"));
        assert_eq!(effects, vec![Effect::LoadState(RaceType::President, st("OR"))]);
        assert_eq!(nav.scope(), Scope::State { state: st("OR") });
    }

    #[test]
    fn test_district_flow() {
        let mut nav = Navigator::default();
        assert_eq!(nav.set_race(RaceType::House), vec![Effect::LoadNational(RaceType::House)]);
        nav.click_district(district("3201"));
        assert_eq!(nav.scope(), Scope::State { state: st("NV") });
        nav.click_district(district("3201"));
        assert_eq!(nav.scope().district(), Some(district("3201")));
        assert_eq!(
            nav.toggle_district_counties(),
            vec![Effect::LoadDistrictCounties(district("3201"))]
        );
        assert!(nav.layers(true).district_counties);
        nav.back();
        assert_eq!(nav.scope().district(), Some(district("3201")));
        nav.click_district(district("3202"));
        assert_eq!(nav.scope().district(), Some(district("3202")));
        nav.click_district(district("3202"));
        assert_eq!(nav.scope(), Scope::State { state: st("NV") });
        nav.back();
        assert_eq!(nav.scope(), Scope::National);
    }

    #[test]
    fn test_house_state_click_has_no_load() {
        let mut nav = Navigator::default();
        nav.set_race(RaceType::House);
        assert!(nav.click_state(st("NV")).is_empty());
    }

    #[test]
    fn test_prediction_year_forces_senate() {
        let mut nav = Navigator::default();
        nav.click_state(st("GA"));
        let effects = nav.set_year(2026);
        assert_eq!(effects, vec![Effect::LoadNational(RaceType::Senate)]);
        assert_eq!(nav.race(), RaceType::Senate);
        assert!(nav.is_prediction());
        assert_eq!(nav.scope(), Scope::National);

        // President and House are refused while forecasting
        assert!(nav.set_race(RaceType::President).is_empty());
        assert!(nav.set_race(RaceType::House).is_empty());
        assert_eq!(nav.race(), RaceType::Senate);

        nav.set_year(2022);
        assert!(!nav.is_prediction());
        assert_eq!(nav.year(), 2022);
        assert_eq!(nav.race(), RaceType::Senate);
    }

    #[test]
    fn test_leave_prediction_helpers() {
        let mut nav = Navigator::default();
        nav.set_year(2026);
        nav.back_to_results();
        assert!(!nav.is_prediction());
        assert_eq!(nav.view(), ViewKey { race: RaceType::Senate, year: 2024 });

        nav.set_year(2026);
        let effects = nav.switch_to_president();
        assert_eq!(effects, vec![Effect::LoadNational(RaceType::President)]);
        assert_eq!(nav.view(), ViewKey { race: RaceType::President, year: 2024 });
        assert!(!nav.is_prediction());
    }

    #[test]
    fn test_set_race_snaps_year() {
        let mut nav = Navigator::new(ViewKey { race: RaceType::Senate, year: 2022 });
        nav.click_state(st("AZ"));
        nav.set_race(RaceType::President);
        assert_eq!(nav.year(), 2020);
        assert_eq!(nav.scope(), Scope::National);
    }

    #[test]
    fn test_step_year() {
        let mut nav = Navigator::new(ViewKey { race: RaceType::Senate, year: 2022 });
        nav.step_year(true);
        assert_eq!(nav.year(), 2024);
        nav.step_year(true);
        assert_eq!(nav.year(), 2026);
        assert!(nav.is_prediction());
        nav.step_year(true);
        assert_eq!(nav.year(), 2026);
        nav.step_year(false);
        assert_eq!(nav.year(), 2024);
        assert!(!nav.is_prediction());
    }

    #[test]
    fn test_layer_visibility() {
        let mut nav = Navigator::default();
        let national = nav.layers(true);
        assert!(!national.counties);
        assert!(national.county_dots);
        assert!(!nav.layers(false).county_dots);

        nav.click_state(st("NV"));
        let layers = nav.layers(true);
        assert!(layers.counties);
        assert!(!layers.county_dots);
        assert!(!layers.state_fill_by_result);
        assert_eq!(layers.county_filter, Some(st("NV")));

        nav.set_race(RaceType::House);
        let layers = nav.layers(true);
        assert!(layers.districts);
        assert!(!layers.counties);
        assert!(!layers.state_fill_by_result);
    }

    #[test]
    fn test_request_tracker() {
        let mut tracker = RequestTracker::default();
        let first = tracker.begin(LoadSlot::State);
        let second = tracker.begin(LoadSlot::State);
        assert!(!tracker.is_current(LoadSlot::State, first));
        assert!(tracker.is_current(LoadSlot::State, second));
        assert!(!tracker.is_current(LoadSlot::National, second));
        let national = tracker.begin(LoadSlot::National);
        assert!(tracker.is_current(LoadSlot::National, national));
        assert!(tracker.is_current(LoadSlot::State, second));
    }
}
