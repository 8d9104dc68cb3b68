//! State, county and district outlines from GeoJSON FeatureCollections.

use super::read_geojson;
use crate::config::Config;
use crate::error::{DataError, Result};
use crate::geo::{CountyFips, DistrictId, StateCode};
use crate::map::{Boundaries, Layer, Polygon, Region};
use geojson::feature::Id;
use geojson::{Feature, GeoJson, Geometry, JsonObject, Value};
use glam::DVec2;
use std::fmt::Display;
use std::hash::Hash;
use std::path::Path;

/// Feature id, then the first property in `keys` that is present.
/// Numeric ids are stringified.
fn feature_code(feature: &Feature, keys: &[&str]) -> Option<String> {
    if let Some(id) = &feature.id {
        return Some(match id {
            Id::String(s) => s.clone(),
            Id::Number(n) => n.to_string(),
        });
    }
    let props = feature.properties.as_ref()?;
    keys.iter().find_map(|k| property_string(props, k))
}

fn property_string(props: &JsonObject, key: &str) -> Option<String> {
    match props.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn feature_name(feature: &Feature) -> Option<String> {
    let props = feature.properties.as_ref()?;
    ["name", "NAME"].iter().find_map(|k| property_string(props, k))
}

fn state_key(feature: &Feature) -> Option<StateCode> {
    feature_code(feature, &["STATEFP", "fips"])
        .and_then(|code| StateCode::from_fips(&code).or_else(|| StateCode::from_abbr(&code)))
        .or_else(|| feature_name(feature).and_then(|n| StateCode::from_name(&n)))
}

fn county_key(feature: &Feature) -> Option<CountyFips> {
    feature_code(feature, &["GEOID", "fips"]).and_then(|code| CountyFips::parse(&code))
}

fn district_key(feature: &Feature) -> Option<DistrictId> {
    let code = feature_code(feature, &["GEOID", "id"])?;
    // Numeric ids lose the leading zero of single-digit state FIPS
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit()) {
        DistrictId::parse(&format!("0{code}"))
    } else {
        DistrictId::parse(&code)
    }
}

fn to_ring(coords: &[Vec<f64>]) -> Vec<DVec2> {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| DVec2::new(c[0], c[1]))
        .collect()
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon> {
    let (exterior, holes) = rings.split_first()?;
    Some(Polygon {
        exterior: to_ring(exterior),
        holes: holes.iter().map(|h| to_ring(h)).collect(),
    })
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => out.extend(to_polygon(rings)),
        Value::MultiPolygon(polygons) => out.extend(polygons.iter().filter_map(|p| to_polygon(p))),
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

/// Build a layer from a FeatureCollection; features without a usable key
/// or polygon geometry are skipped
pub fn load_layer<K, F>(path: &Path, key_fn: F) -> Result<Layer<K>>
where
    K: Copy + Eq + Hash + Display,
    F: Fn(&Feature) -> Option<K>,
{
    let GeoJson::FeatureCollection(fc) = read_geojson(path)? else {
        return Err(DataError::GeoJson {
            path: path.to_path_buf(),
            message: "expected a FeatureCollection".to_string(),
        });
    };

    let mut regions = Vec::with_capacity(fc.features.len());
    let mut skipped = 0usize;
    for feature in &fc.features {
        let (Some(key), Some(geometry)) = (key_fn(feature), &feature.geometry) else {
            skipped += 1;
            continue;
        };
        let mut polygons = Vec::new();
        collect_polygons(geometry, &mut polygons);
        if polygons.is_empty() {
            skipped += 1;
            continue;
        }
        let name = feature_name(feature).unwrap_or_else(|| key.to_string());
        regions.push(Region::new(key, name, polygons));
    }
    if skipped > 0 {
        log::debug!("{}: skipped {skipped} features", path.display());
    }
    log::info!("{}: {} regions", path.display(), regions.len());
    Ok(Layer::new(regions))
}

/// County outlines keyed by FIPS code
pub fn load_counties(path: &Path) -> Result<Layer<CountyFips>> {
    load_layer(path, county_key)
}

fn load_or_empty<K, F>(path: &Path, key_fn: F) -> Layer<K>
where
    K: Copy + Eq + Hash + Display,
    F: Fn(&Feature) -> Option<K>,
{
    load_layer(path, key_fn).unwrap_or_else(|e| {
        log::warn!("boundaries unavailable: {e}");
        Layer::empty()
    })
}

/// All three boundary layers; a missing file leaves its layer empty
pub fn load_boundaries(config: &Config) -> Boundaries {
    Boundaries {
        states: load_or_empty(&config.states_geo_path(), state_key),
        counties: load_or_empty(&config.counties_geo_path(), county_key),
        districts: load_or_empty(&config.districts_geo_path(), district_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::scratch_dir;
    use std::fs;

    const RINGS: &str = "[[[0,0],[4,0],[4,4],[0,4],[0,0]],[[1,1],[2,1],[2,2],[1,2],[1,1]]]";
    const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[0,0],[4,0],[4,4],[0,4],[0,0]],[[1,1],[2,1],[2,2],[1,2],[1,1]]]}"#;

    fn write_collection(path: &Path, features: &[String]) {
        fs::write(
            path,
            format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(",")),
        )
        .unwrap();
    }

    #[test]
    fn test_state_layer_keys() {
        let dir = scratch_dir("boundaries-states");
        let path = dir.join("states.geojson");
        write_collection(
            &path,
            &[
                format!(r#"{{"type":"Feature","id":"32","properties":{{"name":"Nevada"}},"geometry":{SQUARE}}}"#),
                format!(r#"{{"type":"Feature","id":6,"properties":{{}},"geometry":{SQUARE}}}"#),
                format!(r#"{{"type":"Feature","properties":{{"name":"Ohio"}},"geometry":{SQUARE}}}"#),
                r#"{"type":"Feature","properties":{"name":"Atlantis"},"geometry":null}"#.to_string(),
            ],
        );
        let layer = load_layer(&path, state_key).unwrap();
        assert_eq!(layer.len(), 3);
        let nv = layer.get(StateCode::from_abbr("NV").unwrap()).unwrap();
        assert_eq!(nv.name, "Nevada");
        assert_eq!(nv.polygons[0].holes.len(), 1);
        // No name property falls back to the key
        assert_eq!(layer.get(StateCode::from_abbr("CA").unwrap()).unwrap().name, "CA");
        assert!(layer.get(StateCode::from_abbr("OH").unwrap()).is_some());
    }

    #[test]
    fn test_county_and_district_keys() {
        let dir = scratch_dir("boundaries-keys");
        let counties = dir.join("counties.geojson");
        write_collection(
            &counties,
            &[format!(
                r#"{{"type":"Feature","properties":{{"GEOID":"32003","NAME":"Clark"}},"geometry":{SQUARE}}}"#
            )],
        );
        let layer = load_layer(&counties, county_key).unwrap();
        assert_eq!(layer.regions()[0].key, CountyFips::new(32003).unwrap());
        assert_eq!(layer.regions()[0].name, "Clark");

        let districts = dir.join("districts.geojson");
        write_collection(
            &districts,
            &[
                format!(r#"{{"type":"Feature","id":601,"properties":null,"geometry":{SQUARE}}}"#),
                format!(
                    r#"{{"type":"Feature","properties":{{"GEOID":"3202"}},"geometry":{{"type":"MultiPolygon","coordinates":[{RINGS}]}}}}"#
                ),
            ],
        );
        let layer = load_layer(&districts, district_key).unwrap();
        let keys: Vec<String> = layer.regions().iter().map(|r| r.key.label()).collect();
        assert_eq!(keys, vec!["CA-1", "NV-2"]);
    }

    #[test]
    fn test_missing_files_give_empty_layers() {
        let dir = scratch_dir("boundaries-missing");
        let boundaries = load_boundaries(&Config::default().with_data_root(&dir));
        assert!(boundaries.states.is_empty());
        assert!(boundaries.counties.is_empty());
        assert!(boundaries.districts.is_empty());
    }
}
