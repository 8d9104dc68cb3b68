//! Info panel and hover tooltip contents.
//!
//! Each panel kind is its own variant, so the renderer matches exhaustively
//! instead of probing a record for optional fields.

use crate::election::electoral::electoral_votes;
use crate::election::{
    DistrictBreakdown, NationalYear, Nominees, Party, Prediction, Provenance,
    RaceResult, RaceType, StateYear, Winner,
};
use crate::geo::{CountyFips, DistrictId, StateCode};
use crate::map::DotLayer;
use crate::nav::{HoverTarget, Navigator, Scope};

/// Tooltip rows shown per entity
pub const TOOLTIP_ROWS: usize = 4;

/// "Joseph R. Biden" → "J. Biden", "DONALD J. TRUMP" → "D. Trump"
pub fn format_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() <= 1 {
        return name.trim().to_string();
    }
    let first = parts[0].chars().next().unwrap_or_default();
    let last = parts[parts.len() - 1];
    let mut chars = last.chars();
    let head = chars.next().unwrap_or_default();
    format!("{first}. {head}{}", chars.as_str().to_lowercase())
}

/// One candidate line in a panel or tooltip
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateLine {
    pub name: String,
    pub party: Party,
    pub votes: u64,
    pub pct: Option<f64>,
    pub winner: bool,
}

impl CandidateLine {
    /// "J. Biden (D)"
    pub fn short_label(&self) -> String {
        format!("{} ({})", format_name(&self.name), self.party.label())
    }
}

/// Candidates of a record, most votes first.
///
/// Major-party lines without a name (county rows) take the year's nominee.
pub fn candidate_lines(result: &RaceResult, nominees: Option<&Nominees>) -> Vec<CandidateLine> {
    let winner = result.winner;
    let major = [
        (
            Party::Dem,
            result.dem_candidate.clone().or_else(|| nominees.and_then(|n| n.dem.clone())),
            "Democrat",
            result.dem_votes,
            result.dem_pct,
        ),
        (
            Party::Rep,
            result.rep_candidate.clone().or_else(|| nominees.and_then(|n| n.rep.clone())),
            "Republican",
            result.rep_votes,
            result.rep_pct,
        ),
    ];
    let no_votes = result.dem_votes == 0 && result.rep_votes == 0 && result.other_candidates.is_empty();

    let mut lines = Vec::new();
    for (party, name, fallback, votes, pct) in major {
        if votes == 0 && !no_votes {
            continue;
        }
        lines.push(CandidateLine {
            name: name.unwrap_or_else(|| fallback.to_string()),
            winner: winner == Some(party.winner()),
            party,
            votes,
            pct,
        });
    }
    for c in &result.other_candidates {
        lines.push(CandidateLine {
            name: c.name.clone(),
            party: c.party.clone(),
            votes: c.votes,
            pct: Some(c.pct),
            winner: c.is_winner,
        });
    }
    // Stable: equal votes keep DEM, REP, others order
    lines.sort_by(|a, b| b.votes.cmp(&a.votes));
    lines
}

#[derive(Clone, Debug, PartialEq)]
pub struct NationalPanel {
    pub race: RaceType,
    pub year: u16,
    pub nominees: Nominees,
    pub dem_votes: u64,
    pub rep_votes: u64,
    /// States (or seats, for House) won
    pub dem_won: u32,
    pub rep_won: u32,
    pub other_won: u32,
    pub dem_electoral_votes: Option<u32>,
    pub rep_electoral_votes: Option<u32>,
    pub provenance: Provenance,
}

/// A race decided between one Democrat and one Republican
#[derive(Clone, Debug, PartialEq)]
pub struct TwoWayPanel {
    pub title: String,
    pub subtitle: String,
    pub dem: CandidateLine,
    pub rep: CandidateLine,
    pub margin_label: String,
    pub total_votes: u64,
    pub electoral_votes: Option<u8>,
    pub county_count: usize,
    pub provenance: Provenance,
}

/// A race with relevant third-party candidates
#[derive(Clone, Debug, PartialEq)]
pub struct MultiCandidatePanel {
    pub title: String,
    pub subtitle: String,
    pub candidates: Vec<CandidateLine>,
    pub margin_label: String,
    pub total_votes: u64,
    pub electoral_votes: Option<u8>,
    /// Hint that a county breakdown can be opened
    pub has_breakdown: bool,
    pub provenance: Provenance,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PredictionRow {
    pub state: StateCode,
    pub prediction: Prediction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PredictionPanel {
    pub year: u16,
    /// Selected state, if any
    pub focus: Option<PredictionRow>,
    /// Every forecast race, most competitive first
    pub races: Vec<PredictionRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistrictRow {
    pub district: DistrictId,
    pub margin_label: String,
    pub winner: Option<Winner>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistrictListPanel {
    pub state: StateCode,
    pub year: u16,
    pub districts: Vec<DistrictRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountyRow {
    pub name: String,
    pub winner: Winner,
    pub winner_name: Option<String>,
    pub margin: f64,
    pub total_votes: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistrictCountiesPanel {
    pub district: DistrictId,
    pub year: u16,
    pub counties: Vec<CountyRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Panel {
    /// Nothing loaded for this view yet, or the file has no such year
    NoData { title: String },
    National(NationalPanel),
    Major2Way(TwoWayPanel),
    MultiCandidate(MultiCandidatePanel),
    Prediction(PredictionPanel),
    DistrictList(DistrictListPanel),
    DistrictCounties(DistrictCountiesPanel),
}

/// Data currently loaded for the active view
#[derive(Clone, Copy, Debug, Default)]
pub struct PanelInputs<'a> {
    pub national: Option<&'a NationalYear>,
    pub state: Option<&'a StateYear>,
    pub breakdown: Option<&'a DistrictBreakdown>,
    pub dots: Option<&'a DotLayer>,
    /// Display name of the selected county from the boundary layer
    pub county_name: Option<&'a str>,
}

impl PanelInputs<'_> {
    /// "Washoe County", falling back to the dot layer and then the FIPS code
    fn county_title(&self, county: CountyFips) -> String {
        self.county_name
            .or_else(|| self.dots.and_then(|d| d.get(county)).map(|d| d.name.as_str()))
            .map(|name| format!("{name} County"))
            .unwrap_or_else(|| format!("County {county}"))
    }
}

fn race_subtitle(race: RaceType, year: u16) -> String {
    format!("{year} {}", race.label())
}

fn predictions_by_competitiveness(national: &NationalYear) -> Vec<PredictionRow> {
    let mut rows: Vec<PredictionRow> = national
        .predictions
        .iter()
        .filter_map(|(abbr, p)| {
            StateCode::from_abbr(abbr).map(|state| PredictionRow {
                state,
                prediction: p.clone(),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        let closeness = |r: &PredictionRow| (r.prediction.dem_win_prob - 0.5).abs();
        closeness(a).total_cmp(&closeness(b))
    });
    rows
}

fn national_panel(nav: &Navigator, national: &NationalYear) -> NationalPanel {
    let race = nav.race();
    let year = nav.year();
    let mut panel = NationalPanel {
        race,
        year,
        nominees: national.candidates.clone(),
        dem_votes: 0,
        rep_votes: 0,
        dem_won: 0,
        rep_won: 0,
        other_won: 0,
        dem_electoral_votes: None,
        rep_electoral_votes: None,
        provenance: Provenance::Real,
    };

    if let (RaceType::House, Some(summary)) = (race, national.summary) {
        panel.dem_votes = summary.dem_votes;
        panel.rep_votes = summary.rep_votes;
        panel.dem_won = summary.dem_seats;
        panel.rep_won = summary.rep_seats;
        panel.other_won = summary.other_seats;
        return panel;
    }

    let mut dem_ev = 0;
    let mut rep_ev = 0;
    for (abbr, r) in &national.states {
        panel.dem_votes += r.dem_votes;
        panel.rep_votes += r.rep_votes;
        let ev = electoral_votes(abbr, year) as u32;
        match r.winner {
            Some(Winner::Dem) => {
                panel.dem_won += 1;
                dem_ev += ev;
            }
            Some(Winner::Rep) => {
                panel.rep_won += 1;
                rep_ev += ev;
            }
            Some(Winner::Oth) => panel.other_won += 1,
            None => {}
        }
        if r.provenance == Provenance::Synthetic {
            panel.provenance = Provenance::Synthetic;
        }
    }
    if race == RaceType::President {
        panel.dem_electoral_votes = Some(dem_ev);
        panel.rep_electoral_votes = Some(rep_ev);
    }
    panel
}

/// Two-way or multi-candidate panel for a single record
fn race_panel(
    title: String,
    subtitle: String,
    result: &RaceResult,
    nominees: Option<&Nominees>,
    electoral_votes: Option<u8>,
    county_count: usize,
    has_breakdown: bool,
) -> Panel {
    let candidates = candidate_lines(result, nominees);
    let has_third_party = candidates.iter().any(|c| !c.party.is_major());
    if !has_third_party && !has_breakdown {
        let find = |party: Party| candidates.iter().find(|c| c.party == party).cloned();
        if let (Some(dem), Some(rep)) = (find(Party::Dem), find(Party::Rep)) {
            return Panel::Major2Way(TwoWayPanel {
                title,
                subtitle,
                dem,
                rep,
                margin_label: result.margin_label(),
                total_votes: result.total_votes,
                electoral_votes,
                county_count,
                provenance: result.provenance,
            });
        }
    }
    Panel::MultiCandidate(MultiCandidatePanel {
        title,
        subtitle,
        candidates,
        margin_label: result.margin_label(),
        total_votes: result.total_votes,
        electoral_votes,
        has_breakdown,
        provenance: result.provenance,
    })
}

impl Panel {
    pub fn build(nav: &Navigator, inputs: &PanelInputs) -> Panel {
        let race = nav.race();
        let year = nav.year();
        let subtitle = race_subtitle(race, year);
        let Some(national) = inputs.national else {
            return Panel::NoData { title: subtitle };
        };

        if nav.is_prediction() {
            let races = predictions_by_competitiveness(national);
            let focus = nav.scope().state().and_then(|state| {
                national.prediction(state).map(|p| PredictionRow {
                    state,
                    prediction: p.clone(),
                })
            });
            return Panel::Prediction(PredictionPanel { year, focus, races });
        }

        match nav.scope() {
            Scope::National => Panel::National(national_panel(nav, national)),
            Scope::State { state } if race == RaceType::House => {
                Panel::DistrictList(DistrictListPanel {
                    state,
                    year,
                    districts: national
                        .districts_in(state)
                        .into_iter()
                        .map(|(district, r)| DistrictRow {
                            district,
                            margin_label: r.margin_label(),
                            winner: r.winner,
                        })
                        .collect(),
                })
            }
            Scope::State { state } => match national.state(state) {
                Some(result) => race_panel(
                    state.name().to_string(),
                    subtitle,
                    result,
                    Some(&national.candidates),
                    (race == RaceType::President).then(|| electoral_votes(state.abbr(), year)),
                    inputs.state.map(|s| s.counties.len()).unwrap_or(0),
                    false,
                ),
                None => Panel::NoData {
                    title: format!("{} {subtitle}", state.name()),
                },
            },
            Scope::County { state, county } => {
                let nominees = inputs.state.map(|s| &s.candidates);
                match inputs.state.and_then(|s| s.county(county)) {
                    Some(result) => race_panel(
                        inputs.county_title(county),
                        format!("{}, {subtitle}", state.abbr()),
                        result,
                        nominees,
                        None,
                        0,
                        false,
                    ),
                    None => Panel::NoData {
                        title: inputs.county_title(county),
                    },
                }
            }
            Scope::District { district, .. } => match national.district(district) {
                Some(result) => race_panel(
                    district.label(),
                    subtitle,
                    result,
                    None,
                    None,
                    0,
                    true,
                ),
                None => Panel::NoData {
                    title: district.label(),
                },
            },
            Scope::DistrictCounties { district, .. } => {
                let counties = inputs
                    .breakdown
                    .map(|b| {
                        b.counties
                            .iter()
                            .map(|(name, c)| CountyRow {
                                name: name.clone(),
                                winner: c.winner,
                                winner_name: c.winner_name.clone(),
                                margin: c.margin,
                                total_votes: c.total_votes,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Panel::DistrictCounties(DistrictCountiesPanel {
                    district,
                    year,
                    counties,
                })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipRow {
    pub label: String,
    pub pct: Option<f64>,
    pub party: Party,
}

/// Hover card contents
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub title: String,
    pub electoral_votes: Option<u8>,
    pub rows: Vec<TooltipRow>,
    pub margin_label: Option<String>,
    pub winner: Option<Winner>,
}

impl Tooltip {
    fn titled(title: String) -> Self {
        Self {
            title,
            electoral_votes: None,
            rows: Vec::new(),
            margin_label: None,
            winner: None,
        }
    }

    fn with_result(mut self, result: &RaceResult, nominees: Option<&Nominees>) -> Self {
        self.rows = candidate_lines(result, nominees)
            .into_iter()
            .take(TOOLTIP_ROWS)
            .map(|c| TooltipRow {
                label: c.short_label(),
                pct: c.pct,
                party: c.party,
            })
            .collect();
        self.margin_label = Some(result.margin_label());
        self.winner = result.winner;
        self
    }

    /// Look the hovered entity up in whatever is loaded right now
    pub fn build(hover: &HoverTarget, nav: &Navigator, inputs: &PanelInputs) -> Tooltip {
        let race = nav.race();
        let year = nav.year();
        match hover {
            HoverTarget::State(state) => {
                let mut tip = Tooltip::titled(state.name().to_string());
                if race == RaceType::President {
                    tip.electoral_votes = Some(electoral_votes(state.abbr(), year));
                }
                let Some(national) = inputs.national else {
                    return tip;
                };
                if nav.is_prediction() {
                    if let Some(p) = national.prediction(*state) {
                        tip.rows = prediction_rows(p);
                        tip.winner = Some(p.favored());
                        tip.margin_label = Some(projected_label(p.projected_margin));
                    }
                    return tip;
                }
                match national.state(*state) {
                    Some(r) => tip.with_result(r, Some(&national.candidates)),
                    None => tip,
                }
            }
            HoverTarget::County { fips, name } => {
                let tip = Tooltip::titled(format!("{name} County"));
                if let Some(r) = inputs.state.and_then(|s| s.county(*fips)) {
                    return tip.with_result(r, inputs.state.map(|s| &s.candidates));
                }
                // National dot layer
                let dot = inputs
                    .dots
                    .and_then(|dots| dots.get(*fips))
                    .and_then(|d| d.year(year));
                match dot {
                    Some(d) => {
                        let r = RaceResult {
                            margin: d.margin,
                            winner: d.winner,
                            total_votes: d.total_votes,
                            ..RaceResult::default()
                        };
                        Tooltip {
                            margin_label: Some(r.margin_label()),
                            winner: d.winner,
                            ..tip
                        }
                    }
                    None => tip,
                }
            }
            HoverTarget::District(district) => {
                let tip = Tooltip::titled(district.label());
                match inputs.national.and_then(|n| n.district(*district)) {
                    Some(r) if race == RaceType::House => tip.with_result(r, None),
                    _ => tip,
                }
            }
            HoverTarget::DistrictCounty { district, name } => {
                let mut tip = Tooltip::titled(format!("{name} County"));
                if nav.scope().district() != Some(*district) {
                    return tip;
                }
                let county = inputs.breakdown.and_then(|b| {
                    let bare = name.strip_suffix(" County").unwrap_or(name);
                    b.counties.get(bare)
                });
                if let Some(c) = county {
                    let mut rows: Vec<_> = c.candidates.iter().collect();
                    rows.sort_by(|a, b| b.votes.cmp(&a.votes));
                    tip.rows = rows
                        .into_iter()
                        .take(TOOLTIP_ROWS)
                        .map(|c| TooltipRow {
                            label: format!("{} ({})", format_name(&c.name), c.party.label()),
                            pct: Some(c.pct),
                            party: c.party.clone(),
                        })
                        .collect();
                    tip.winner = Some(c.winner);
                    let side = match c.winner {
                        Winner::Dem => "D",
                        Winner::Rep => "R",
                        Winner::Oth => "O",
                    };
                    tip.margin_label = Some(format!("{side}+{:.1}", c.margin.abs()));
                }
                tip
            }
        }
    }
}

fn prediction_rows(p: &Prediction) -> Vec<TooltipRow> {
    let name = |n: &Option<String>, fallback: &str| {
        n.as_deref().map(format_name).unwrap_or_else(|| fallback.to_string())
    };
    vec![
        TooltipRow {
            label: format!("{} (D)", name(&p.dem_candidate, "Democrat")),
            pct: Some(p.dem_win_prob * 100.0),
            party: Party::Dem,
        },
        TooltipRow {
            label: format!("{} (R)", name(&p.rep_candidate, "Republican")),
            pct: Some(p.rep_win_prob * 100.0),
            party: Party::Rep,
        },
    ]
}

/// "D+3.5 proj." style label for a forecast margin
pub fn projected_label(margin: f64) -> String {
    let side = if margin >= 0.0 { "D" } else { "R" };
    format!("{side}+{:.1} proj.", margin.abs())
}
