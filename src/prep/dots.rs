//! County dots: one point per county at its centroid, carrying every
//! presidential year the state files have for it.

use crate::config::Config;
use crate::data::boundaries::load_counties;
use crate::data::{read_json, write_json};
use crate::election::{CountyDot, DotYear, RaceType, StateFile};
use crate::error::Result;
use crate::geo::{CountyFips, StateCode};
use crate::map::Layer;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Per-county years from every presidential state file present
pub fn county_years(config: &Config) -> Result<HashMap<CountyFips, BTreeMap<u16, DotYear>>> {
    let mut by_county: HashMap<CountyFips, BTreeMap<u16, DotYear>> = HashMap::new();
    for state in StateCode::all() {
        let path = config.state_path(RaceType::President, state.abbr());
        if !path.exists() {
            log::debug!("no state file for {state}");
            continue;
        }
        let file: StateFile = read_json(&path)?;
        for (year, data) in &file.0 {
            let Ok(year) = year.parse::<u16>() else {
                continue;
            };
            for (fips, result) in &data.counties {
                let Some(fips) = CountyFips::parse(fips) else {
                    continue;
                };
                by_county.entry(fips).or_default().insert(
                    year,
                    DotYear {
                        total_votes: result.total_votes,
                        margin: result.margin,
                        winner: result.winner,
                    },
                );
            }
        }
    }
    Ok(by_county)
}

/// Centroid dots for every county outline; outlines without a finite centroid are dropped
pub fn build_dots(
    counties: &Layer<CountyFips>,
    years: &HashMap<CountyFips, BTreeMap<u16, DotYear>>,
) -> Vec<CountyDot> {
    counties
        .regions()
        .par_iter()
        .filter_map(|region| {
            let c = region.centroid()?;
            (c.x.is_finite() && c.y.is_finite()).then(|| CountyDot {
                fips: region.key,
                name: region.name.clone(),
                lon: c.x,
                lat: c.y,
                years: years.get(&region.key).cloned().unwrap_or_default(),
            })
        })
        .collect()
}

pub fn to_feature_collection(dots: &[CountyDot]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: dots
            .iter()
            .map(|dot| Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![dot.lon, dot.lat]))),
                id: None,
                properties: Some(dot.properties()),
                foreign_members: None,
            })
            .collect(),
        foreign_members: None,
    }
}

/// `prep county-dots`: join county centroids with the presidential state files
pub fn run(counties_path: &Path, config: &Config) -> Result<usize> {
    let counties = load_counties(counties_path)?;
    let years = county_years(config)?;
    let dots = build_dots(&counties, &years);
    let path = config.county_dots_path();
    write_json(&path, &to_feature_collection(&dots))?;
    log::info!("wrote {} county dots to {}", dots.len(), path.display());
    Ok(dots.len())
}
