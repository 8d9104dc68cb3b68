use crate::election::aggregate::AggregationPolicy;
use crate::election::{RaceType, LAST_OBSERVED_YEAR};
use std::path::PathBuf;

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_ROOT: &str = "data";
/// Environment variable overriding the data directory
pub const DATA_ROOT_ENV: &str = "ELECTION_MAP_DATA";
/// Viewer log file; the terminal UI owns stdout and stderr
pub const DEFAULT_LOG_FILE: &str = "election-map.log";

/// Runtime settings shared by the viewer and the prep pipeline
#[derive(Clone, Debug)]
pub struct Config {
    pub data_root: PathBuf,
    pub start_year: u16,
    pub race: RaceType,
    /// Draw county centroids on the national presidential map
    pub county_dots: bool,
    pub policy: AggregationPolicy,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            start_year: LAST_OBSERVED_YEAR,
            race: RaceType::President,
            county_dots: true,
            policy: AggregationPolicy::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    pub fn results_dir(&self, race: RaceType) -> PathBuf {
        self.data_root.join("results").join(race.dir_name())
    }

    pub fn national_path(&self, race: RaceType) -> PathBuf {
        self.results_dir(race).join("national.json")
    }

    pub fn state_path(&self, race: RaceType, abbr: &str) -> PathBuf {
        self.results_dir(race).join("states").join(format!("{abbr}.json"))
    }

    pub fn county_dots_path(&self) -> PathBuf {
        self.results_dir(RaceType::President).join("county-dots.json")
    }

    /// County breakdown file for one state's House districts ("nv" → nv-county-results.json)
    pub fn district_counties_path(&self, abbr: &str) -> PathBuf {
        self.results_dir(RaceType::House)
            .join(format!("{}-county-results.json", abbr.to_ascii_lowercase()))
    }

    pub fn geo_dir(&self) -> PathBuf {
        self.data_root.join("geo")
    }

    pub fn states_geo_path(&self) -> PathBuf {
        self.geo_dir().join("us-states.geojson")
    }

    pub fn counties_geo_path(&self) -> PathBuf {
        self.geo_dir().join("us-counties.geojson")
    }

    pub fn districts_geo_path(&self) -> PathBuf {
        self.geo_dir().join("us-districts.geojson")
    }
}
