use crate::app::App;
use election_map::color::{legend_label, legend_stops, Rgb, DEM_RAMP, NO_DATA, REP_RAMP, TIE};
use election_map::election::{is_prediction_year, Party, Provenance, RaceType, Winner};
use election_map::map::MapFrame;
use election_map::panel::{
    projected_label, CandidateLine, DistrictCountiesPanel, MultiCandidatePanel, NationalPanel, Panel,
    PredictionPanel, Tooltip, TwoWayPanel,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Info panel width in cells, border included
pub const PANEL_WIDTH: u16 = 38;
const TOOLTIP_WIDTH: u16 = 30;
const BORDER_COLOR: Color = Color::Rgb(0x14, 0x14, 0x18);

/// Where everything goes on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenLayout {
    pub map_block: Rect,
    /// Map drawing area inside the border
    pub map: Rect,
    pub panel: Rect,
    pub slider: Rect,
    pub legend: Rect,
    pub status: Rect,
}

fn map_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map and panel
            Constraint::Length(1), // Year slider
            Constraint::Length(1), // Legend
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(PANEL_WIDTH)])
        .split(rows[0]);

    ScreenLayout {
        map_block: main[0],
        map: map_block(String::new()).inner(main[0]),
        panel: main[1],
        slider: rows[1],
        legend: rows[2],
        status: rows[3],
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let layout = screen_layout(frame.area());

    render_map(frame, app, layout.map_block);
    render_panel(frame, app, layout.panel);
    render_slider(frame, app, layout.slider);
    render_legend(frame, app, layout.legend);
    render_status_bar(frame, app, layout.status);

    if let (Some(tooltip), Some(mouse)) = (app.tooltip(), app.mouse_pos) {
        render_tooltip(frame, &tooltip, mouse, layout.map_block);
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.nav.view();
    let block = map_block(format!(" {} {} · {} ", view.year, view.race.label(), app.breadcrumb()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Update viewport size for rendering
    let mut viewport = app.viewport.clone();
    // Braille gives 2x4 resolution per character
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let map = app.map_renderer.render(
        inner.width as usize,
        inner.height as usize,
        &viewport,
        &app.render_request(),
    );
    let widget = MapWidget {
        map,
        cursor_pos: app.cursor_cell(),
    };
    frame.render_widget(widget, inner);
}

/// Choropleth cells with braille outlines, dots and highlight on top
struct MapWidget {
    map: MapFrame,
    cursor_pos: Option<(u16, u16)>,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = self.map.width.min(area.width as usize);
        let height = self.map.height.min(area.height as usize);

        for cy in 0..height {
            for cx in 0..width {
                let cell = &mut buf[(area.x + cx as u16, area.y + cy as u16)];
                if let Some(fill) = self.map.fill(cx, cy) {
                    cell.set_bg(fill.into());
                }
                // Front to back: highlight, dots, outlines
                if let Some(ch) = self.map.highlight.glyph(cx, cy) {
                    cell.set_char(ch).set_fg(Color::White);
                } else if let Some(ch) = self.map.dots.glyph(cx, cy) {
                    let color = self.map.dot_color(cx, cy).map_or(Color::White, Color::from);
                    cell.set_char(ch).set_fg(color);
                } else if let Some(ch) = self.map.borders.glyph(cx, cy) {
                    cell.set_char(ch).set_fg(BORDER_COLOR);
                }
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

/// 1234567 → "1,234,567"
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn winner_color(winner: Option<Winner>) -> Color {
    match winner {
        Some(Winner::Dem) => DEM_RAMP[4].into(),
        Some(Winner::Rep) => REP_RAMP[4].into(),
        Some(Winner::Oth) => TIE.into(),
        None => NO_DATA.into(),
    }
}

fn party_color(party: &Party) -> Color {
    winner_color(Some(party.winner()))
}

fn dim(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

fn bold(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))
}

fn candidate_line(c: &CandidateLine) -> Line<'static> {
    let mark = if c.winner { "✓ " } else { "  " };
    let pct = c.pct.map_or_else(|| "  -  ".to_string(), |p| format!("{p:5.1}%"));
    Line::from(vec![
        Span::styled(mark, Style::default().fg(Color::Green)),
        Span::styled(c.short_label(), Style::default().fg(party_color(&c.party))),
        Span::raw(format!(" {pct} ")),
        dim(thousands(c.votes)),
    ])
}

fn provenance_line(provenance: Provenance) -> Option<Line<'static>> {
    (provenance == Provenance::Synthetic).then(|| Line::from(dim("Estimated from state baselines")))
}

fn national_lines(p: &NationalPanel) -> Vec<Line<'static>> {
    let mut lines = vec![bold(format!("{} {}", p.year, p.race.label())), Line::default()];
    if let Some(name) = &p.nominees.dem {
        lines.push(Line::from(Span::styled(
            format!("D  {name}"),
            Style::default().fg(winner_color(Some(Winner::Dem))),
        )));
    }
    if let Some(name) = &p.nominees.rep {
        lines.push(Line::from(Span::styled(
            format!("R  {name}"),
            Style::default().fg(winner_color(Some(Winner::Rep))),
        )));
    }
    if let (Some(dem), Some(rep)) = (p.dem_electoral_votes, p.rep_electoral_votes) {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            dim("Electoral votes  "),
            Span::styled(format!("D {dem}"), Style::default().fg(winner_color(Some(Winner::Dem)))),
            Span::raw("  "),
            Span::styled(format!("R {rep}"), Style::default().fg(winner_color(Some(Winner::Rep)))),
        ]));
    }
    let won = if p.race == RaceType::House {
        "Seats"
    } else {
        "States won"
    };
    lines.push(Line::from(vec![
        dim(format!("{won}  ")),
        Span::styled(format!("D {}", p.dem_won), Style::default().fg(winner_color(Some(Winner::Dem)))),
        Span::raw("  "),
        Span::styled(format!("R {}", p.rep_won), Style::default().fg(winner_color(Some(Winner::Rep)))),
        Span::raw("  "),
        dim(format!("O {}", p.other_won)),
    ]));
    lines.push(Line::default());
    lines.push(Line::from(vec![dim("D votes  "), Span::raw(thousands(p.dem_votes))]));
    lines.push(Line::from(vec![dim("R votes  "), Span::raw(thousands(p.rep_votes))]));
    lines.extend(provenance_line(p.provenance));
    lines
}

fn race_header(title: &str, subtitle: &str, electoral_votes: Option<u8>) -> Vec<Line<'static>> {
    let mut lines = vec![bold(title.to_string()), Line::from(dim(subtitle.to_string()))];
    if let Some(ev) = electoral_votes {
        lines.push(Line::from(dim(format!("{ev} electoral votes"))));
    }
    lines.push(Line::default());
    lines
}

fn two_way_lines(p: &TwoWayPanel) -> Vec<Line<'static>> {
    let mut lines = race_header(&p.title, &p.subtitle, p.electoral_votes);
    lines.push(candidate_line(&p.dem));
    lines.push(candidate_line(&p.rep));
    lines.push(Line::default());
    lines.push(Line::from(vec![dim("Margin  "), Span::raw(p.margin_label.clone())]));
    lines.push(Line::from(vec![dim("Total   "), Span::raw(thousands(p.total_votes))]));
    if p.county_count > 0 {
        lines.push(Line::from(dim(format!("{} counties reporting", p.county_count))));
    }
    lines.extend(provenance_line(p.provenance));
    lines
}

fn multi_candidate_lines(p: &MultiCandidatePanel) -> Vec<Line<'static>> {
    let mut lines = race_header(&p.title, &p.subtitle, p.electoral_votes);
    lines.extend(p.candidates.iter().map(candidate_line));
    lines.push(Line::default());
    lines.push(Line::from(vec![dim("Margin  "), Span::raw(p.margin_label.clone())]));
    lines.push(Line::from(vec![dim("Total   "), Span::raw(thousands(p.total_votes))]));
    if p.has_breakdown {
        lines.push(Line::from(dim("c: county breakdown")));
    }
    lines.extend(provenance_line(p.provenance));
    lines
}

fn prediction_lines(p: &PredictionPanel) -> Vec<Line<'static>> {
    let mut lines = vec![bold(format!("{} Senate forecast", p.year)), Line::default()];
    if let Some(focus) = &p.focus {
        let pr = &focus.prediction;
        lines.push(bold(focus.state.name()));
        if let Some(name) = &pr.dem_candidate {
            lines.push(Line::from(Span::styled(
                format!("D  {name}  {:.0}%", pr.dem_win_prob * 100.0),
                Style::default().fg(winner_color(Some(Winner::Dem))),
            )));
        }
        if let Some(name) = &pr.rep_candidate {
            lines.push(Line::from(Span::styled(
                format!("R  {name}  {:.0}%", pr.rep_win_prob * 100.0),
                Style::default().fg(winner_color(Some(Winner::Rep))),
            )));
        }
        lines.push(Line::from(dim(projected_label(pr.projected_margin))));
        lines.push(Line::default());
    }
    lines.push(Line::from(dim("Closest races")));
    for row in &p.races {
        let pr = &row.prediction;
        lines.push(Line::from(vec![
            Span::raw(format!("{:<3}", row.state.abbr())),
            Span::styled(
                format!("D {:>3.0}%  ", pr.dem_win_prob * 100.0),
                Style::default().fg(winner_color(Some(pr.favored()))),
            ),
            dim(projected_label(pr.projected_margin)),
        ]));
    }
    lines
}

fn district_counties_lines(p: &DistrictCountiesPanel) -> Vec<Line<'static>> {
    let mut lines = vec![
        bold(format!("{} by county", p.district.label())),
        Line::from(dim(format!("{} House", p.year))),
        Line::default(),
    ];
    for row in &p.counties {
        let side = if row.winner == Winner::Dem { "D" } else { "R" };
        lines.push(Line::from(vec![
            Span::raw(format!("{:<14}", row.name)),
            Span::styled(
                format!("{side}+{:<5.1}", row.margin.abs()),
                Style::default().fg(winner_color(Some(row.winner))),
            ),
            dim(format!(" {}", thousands(row.total_votes))),
        ]));
    }
    lines
}

fn panel_lines(panel: &Panel, loading: bool) -> Vec<Line<'static>> {
    match panel {
        Panel::NoData { title } => vec![
            bold(title.clone()),
            Line::default(),
            Line::from(dim(if loading { "Loading…" } else { "No data for this view" })),
        ],
        Panel::National(p) => national_lines(p),
        Panel::Major2Way(p) => two_way_lines(p),
        Panel::MultiCandidate(p) => multi_candidate_lines(p),
        Panel::Prediction(p) => prediction_lines(p),
        Panel::DistrictList(p) => {
            let mut lines = vec![
                bold(format!("{} districts", p.state.name())),
                Line::from(dim(format!("{} House", p.year))),
                Line::default(),
            ];
            lines.extend(p.districts.iter().map(|row| {
                Line::from(vec![
                    Span::raw(format!("{:<8}", row.district.label())),
                    Span::styled(row.margin_label.clone(), Style::default().fg(winner_color(row.winner))),
                ])
            }));
            lines
        }
        Panel::DistrictCounties(p) => district_counties_lines(p),
    }
}

fn render_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let paragraph = Paragraph::new(panel_lines(&app.panel(), app.is_panel_loading())).block(block);
    frame.render_widget(paragraph, area);
}

/// Years that fit in `width` cells, keeping `current` in view
pub fn slider_window(years: &[u16], current: u16, width: usize) -> &[u16] {
    let fit = (width / 5).max(1);
    if years.len() <= fit {
        return years;
    }
    let pos = years.iter().position(|&y| y == current).unwrap_or(years.len() - 1);
    let start = pos.saturating_sub(fit / 2).min(years.len() - fit);
    &years[start..start + fit]
}

fn render_slider(frame: &mut Frame, app: &App, area: Rect) {
    let years = app.nav.race().slider_years();
    let current = app.nav.year();
    let mut spans = vec![dim(" ◀ ")];
    for &year in slider_window(&years, current, area.width.saturating_sub(6) as usize) {
        let style = if year == current {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if is_prediction_year(year) {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(year.to_string(), style));
        spans.push(Span::raw(" "));
    }
    spans.push(dim("▶"));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let spans = legend_spans(app.nav.is_prediction());
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// R+40 ramp, "Even" on the tie swatch, D+40 ramp, then the no-data key
fn legend_spans(prediction: bool) -> Vec<Span<'static>> {
    let swatch = |color: Rgb| Span::styled(" ", Style::default().bg(color.into()));
    let mut spans = vec![dim(if prediction { " Projected " } else { " Margin " })];
    let stops: Vec<(i32, Rgb)> = legend_stops().collect();
    for &(m, color) in &stops {
        match m {
            -40 => {
                spans.push(Span::raw(format!("{} ", legend_label(m))));
                spans.push(swatch(color));
            }
            0 => spans.push(Span::styled(
                format!(" {} ", legend_label(m)),
                Style::default().bg(color.into()).fg(Color::White),
            )),
            40 => {
                spans.push(swatch(color));
                spans.push(Span::raw(format!(" {}", legend_label(m))));
            }
            _ => spans.push(swatch(color)),
        }
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled("  ", Style::default().bg(NO_DATA.into())));
    spans.push(dim(" no data"));
    spans
}

/// Tooltip box next to the mouse, kept inside `bounds`
fn render_tooltip(frame: &mut Frame, tooltip: &Tooltip, mouse: (u16, u16), bounds: Rect) {
    let mut lines = vec![bold(tooltip.title.clone())];
    if let Some(ev) = tooltip.electoral_votes {
        lines.push(Line::from(dim(format!("{ev} electoral votes"))));
    }
    for row in &tooltip.rows {
        let pct = row.pct.map_or_else(String::new, |p| format!(" {p:.1}%"));
        lines.push(Line::from(vec![
            Span::styled(row.label.clone(), Style::default().fg(party_color(&row.party))),
            Span::raw(pct),
        ]));
    }
    if let Some(margin) = &tooltip.margin_label {
        lines.push(Line::from(Span::styled(
            margin.clone(),
            Style::default().fg(winner_color(tooltip.winner)).add_modifier(Modifier::BOLD),
        )));
    }

    let width = TOOLTIP_WIDTH.min(bounds.width);
    let height = (lines.len() as u16 + 2).min(bounds.height);
    let right = bounds.x + bounds.width;
    let bottom = bounds.y + bounds.height;
    let x = if mouse.0 + 2 + width <= right {
        mouse.0 + 2
    } else {
        mouse.0.saturating_sub(width + 1).max(bounds.x)
    };
    let y = (mouse.1 + 1).min(bottom.saturating_sub(height)).max(bounds.y);
    let area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let loading = if app.is_loading() { "loading… " } else { "" };
    let forecast = if app.nav.is_prediction() {
        " P:president b:results"
    } else {
        ""
    };
    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(loading, Style::default().fg(Color::Magenta)),
        Span::styled(
            if app.county_dots { "[D]ots " } else { "[d]ots " },
            Style::default().fg(if app.county_dots { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            format!(
                "| 1-4:race ,/.:year c:counties esc:back hjkl:pan +/-:zoom r:reset q:quit{forecast}"
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_leaves_room_for_bars() {
        let layout = screen_layout(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.map, Rect::new(1, 1, 120 - PANEL_WIDTH - 2, 35));
        assert_eq!(layout.panel.x, 120 - PANEL_WIDTH);
        assert_eq!(layout.slider.y, 37);
        assert_eq!(layout.legend.y, 38);
        assert_eq!(layout.status.y, 39);
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(155_507_283), "155,507,283");
    }

    #[test]
    fn test_legend_labels_ends_and_middle() {
        let spans = legend_spans(false);
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        let r = text.find("R+40").unwrap();
        let even = text.find("Even").unwrap();
        let d = text.find("D+40").unwrap();
        assert!(r < even && even < d);

        let even_span = spans.iter().find(|s| s.content.contains("Even")).unwrap();
        assert_eq!(even_span.style.bg, Some(TIE.into()));
        let swatches = spans.iter().filter(|s| s.content == " ").count();
        assert_eq!(swatches, 40);
        assert!(legend_spans(true)[0].content.contains("Projected"));
    }

    #[test]
    fn test_slider_window_follows_year() {
        let years: Vec<u16> = (1976..=2026).step_by(2).collect();
        assert_eq!(slider_window(&years, 1976, 1000), &years[..]);

        let w = slider_window(&years, 1976, 25);
        assert_eq!(w, &[1976, 1978, 1980, 1982, 1984]);
        let w = slider_window(&years, 2000, 25);
        assert_eq!(w, &[1996, 1998, 2000, 2002, 2004]);
        let w = slider_window(&years, 2026, 25);
        assert_eq!(w.last(), Some(&2026));
        assert_eq!(w.len(), 5);
    }
}
