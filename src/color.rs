//! Margin-to-color scale for the choropleth and its legend.
//!
//! Two six-stop ramps (DEM blue, REP red) over the same breakpoints, each
//! starting from a purple-ish hue so close races read as contested.

use crate::election::{Prediction, RaceResult, Winner};
use ratatui::style::Color;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel linear blend, `t` in [0, 1]
    #[inline]
    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| {
            (a as f64 + (b as f64 - a as f64) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Euclidean RGB distance
    pub fn distance(self, other: Rgb) -> f64 {
        let d = |a: u8, b: u8| a as f64 - b as f64;
        (d(self.r, other.r).powi(2) + d(self.g, other.g).powi(2) + d(self.b, other.b).powi(2)).sqrt()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }
}

/// Margin magnitudes (percentage points) where each ramp color sits
pub const BREAKPOINTS: [f64; 6] = [0.0, 3.0, 8.0, 15.0, 25.0, 40.0];

pub const DEM_RAMP: [Rgb; 6] = [
    Rgb::new(0x8a, 0x5a, 0x9a),
    Rgb::new(0x74, 0x66, 0xa8),
    Rgb::new(0x5e, 0x78, 0xb8),
    Rgb::new(0x4a, 0x8e, 0xcc),
    Rgb::new(0x2a, 0x6d, 0xb8),
    Rgb::new(0x1a, 0x4a, 0x8a),
];

pub const REP_RAMP: [Rgb; 6] = [
    Rgb::new(0x9a, 0x5a, 0x8a),
    Rgb::new(0xa8, 0x5a, 0x6e),
    Rgb::new(0xb8, 0x50, 0x50),
    Rgb::new(0xcc, 0x3a, 0x3a),
    Rgb::new(0xb0, 0x20, 0x18),
    Rgb::new(0x8a, 0x10, 0x05),
];

pub const TIE: Rgb = Rgb::new(0x88, 0x56, 0xa7);
pub const NO_DATA: Rgb = Rgb::new(0x55, 0x55, 0x55);
/// Neutral fill for states behind a drilled-in view
pub const BACKDROP: Rgb = Rgb::new(0x26, 0x26, 0x2b);

/// Races closer than this are drawn as ties
pub const TIE_THRESHOLD: f64 = 0.5;

fn ramp(colors: &[Rgb; 6], magnitude: f64) -> Rgb {
    let m = magnitude.clamp(BREAKPOINTS[0], BREAKPOINTS[5]);
    for i in 1..BREAKPOINTS.len() {
        if m <= BREAKPOINTS[i] {
            let (lo, hi) = (BREAKPOINTS[i - 1], BREAKPOINTS[i]);
            return colors[i - 1].lerp(colors[i], (m - lo) / (hi - lo));
        }
    }
    colors[5]
}

/// Color for a margin and the winner's coloring bucket.
///
/// Only the magnitude of `margin` is used; the side comes from `winner`.
pub fn margin_color(margin: Option<f64>, winner: Option<Winner>) -> Rgb {
    let (Some(margin), Some(winner)) = (margin, winner) else {
        return NO_DATA;
    };
    if !margin.is_finite() {
        return NO_DATA;
    }
    let magnitude = margin.abs();
    if magnitude < TIE_THRESHOLD {
        return TIE;
    }
    match winner {
        Winner::Dem => ramp(&DEM_RAMP, magnitude),
        Winner::Rep => ramp(&REP_RAMP, magnitude),
        Winner::Oth => TIE,
    }
}

/// Fill color for a race record, no-data gray when absent or incomplete
pub fn result_color(result: Option<&RaceResult>) -> Rgb {
    let Some(r) = result else {
        return NO_DATA;
    };
    let (Some(dem), Some(rep)) = (r.dem_pct, r.rep_pct) else {
        return NO_DATA;
    };
    match r.winner {
        Some(winner) => margin_color(Some(r.margin), Some(winner)),
        None => {
            let margin = dem - rep;
            let winner = if margin > 0.0 { Winner::Dem } else { Winner::Rep };
            margin_color(Some(margin), Some(winner))
        }
    }
}

/// Forecast fill: projected margin, colored for the favored side
pub fn prediction_color(prediction: Option<&Prediction>) -> Rgb {
    match prediction {
        Some(p) => margin_color(Some(p.projected_margin), Some(p.favored())),
        None => NO_DATA,
    }
}

/// Legend swatch at a signed margin (positive = DEM)
pub fn legend_color(m: i32) -> Rgb {
    match m {
        0 => TIE,
        m if m > 0 => margin_color(Some(m as f64), Some(Winner::Dem)),
        m => margin_color(Some(m as f64), Some(Winner::Rep)),
    }
}

/// 41 stops from R+40 to D+40 in steps of 2
pub fn legend_stops() -> impl Iterator<Item = (i32, Rgb)> {
    (-40..=40).step_by(2).map(|m| (m, legend_color(m)))
}

pub fn legend_label(m: i32) -> String {
    match m {
        0 => "Even".to_string(),
        m if m > 0 => format!("D+{m}"),
        m => format!("R+{}", -m),
    }
}
