//! Reading and writing the static data files, and loading them in the
//! background for the viewer.

pub mod boundaries;
pub mod cache;
pub mod store;

use crate::election::CountyDot;
use crate::error::{DataError, Result};
use geojson::{GeoJson, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

pub use boundaries::load_boundaries;
pub use cache::{CacheKey, CacheScope, Payload, ResultCache};
pub use store::{DataStore, LoadResponse};

/// Parse a JSON file with simd-json
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut bytes = fs::read(path).map_err(|e| DataError::io(path, e))?;
    simd_json::serde::from_slice(&mut bytes).map_err(|e| DataError::json(path, e))
}

/// Write compact JSON, creating parent directories
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| DataError::io(path, e))?;
    serde_json::to_writer(BufWriter::new(file), value).map_err(|e| DataError::json(path, e))
}

/// Parse a GeoJSON file
pub fn read_geojson(path: &Path) -> Result<GeoJson> {
    let content = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    content.parse::<GeoJson>().map_err(|e| DataError::GeoJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// County dots from a FeatureCollection of points; features without a FIPS code are skipped
pub fn load_county_dots(path: &Path) -> Result<Vec<CountyDot>> {
    let GeoJson::FeatureCollection(fc) = read_geojson(path)? else {
        return Err(DataError::GeoJson {
            path: path.to_path_buf(),
            message: "expected a FeatureCollection".to_string(),
        });
    };

    let mut dots = Vec::with_capacity(fc.features.len());
    for feature in &fc.features {
        let (Some(geometry), Some(props)) = (&feature.geometry, &feature.properties) else {
            continue;
        };
        let Value::Point(coords) = &geometry.value else {
            continue;
        };
        if coords.len() < 2 || !coords[0].is_finite() || !coords[1].is_finite() {
            continue;
        }
        if let Some(dot) = CountyDot::from_properties(props, coords[0], coords[1]) {
            dots.push(dot);
        }
    }
    Ok(dots)
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::PathBuf;

    /// Fresh per-test directory under the system temp dir
    pub fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("election-map-tests")
            .join(format!("{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::scratch_dir;
    use super::*;
    use crate::election::{NationalFile, NationalYear, RaceResult, Winner};

    #[test]
    fn test_json_write_then_read() {
        let dir = scratch_dir("json-io");
        let path = dir.join("results/senate/national.json");
        let mut file = NationalFile::default();
        let mut year = NationalYear::default();
        year.states.insert(
            "GA".into(),
            RaceResult {
                margin: 1.5,
                winner: Some(Winner::Dem),
                ..RaceResult::default()
            },
        );
        file.insert(2022, year);
        write_json(&path, &file).unwrap();

        let back: NationalFile = read_json(&path).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_json::<NationalFile>(Path::new("/nonexistent/national.json")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn test_county_dots_from_geojson() {
        let dir = scratch_dir("dots");
        let path = dir.join("county-dots.json");
        fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[-115.0,36.2]},
                 "properties":{"fips":"32003","name":"Clark","state_fips":"32",
                   "y2024_total":1000,"y2024_margin":3.5,"y2024_winner":"DEM"}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[-100.0,40.0]},
                 "properties":{"name":"No fips"}}]}"#,
        )
        .unwrap();
        let dots = load_county_dots(&path).unwrap();
        assert_eq!(dots.len(), 1);
        assert_eq!(dots[0].name, "Clark");
        assert_eq!(dots[0].year(2024).unwrap().winner, Some(Winner::Dem));
    }
}
