//! Election data model shared by the viewer and the prep pipeline.
//!
//! Everything here mirrors the static JSON files one-to-one. Readers are
//! lenient: absent or `null` numbers become 0 and absent names stay `None`,
//! so a sparse record degrades to "no data" instead of failing the whole file.

pub mod aggregate;
pub mod electoral;

use crate::geo::{CountyFips, DistrictId, StateCode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub use aggregate::NationalSummary;

/// First year covered by every race type
pub const FIRST_YEAR: u16 = 1976;
/// Last year with observed results
pub const LAST_OBSERVED_YEAR: u16 = 2024;
/// Years past the observed range that only have forecasts
pub const PREDICTION_YEARS: [u16; 1] = [2026];
/// Presidential years up to and including this one are model-generated
pub const SYNTHETIC_THROUGH: u16 = 2004;

pub fn is_prediction_year(year: u16) -> bool {
    PREDICTION_YEARS.contains(&year)
}

/// Party of a candidate as reported by the source, normalized to short codes
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Party {
    Dem,
    Rep,
    Ind,
    Lib,
    Grn,
    Other(String),
}

impl Party {
    /// Normalize raw party strings ("DEMOCRAT", "Republican", "LIBERTARIAN", "DEM" ...)
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Party::Other("OTHER".to_string());
        }
        if upper == "DEM" || upper.contains("DEMOCRAT") {
            Party::Dem
        } else if upper == "REP" || upper == "GOP" || upper.contains("REPUBLICAN") {
            Party::Rep
        } else if upper == "IND" || upper.contains("INDEPENDENT") {
            Party::Ind
        } else if upper == "LIB" || upper.contains("LIBERTARIAN") {
            Party::Lib
        } else if upper == "GRN" || upper.contains("GREEN") {
            Party::Grn
        } else {
            Party::Other(upper)
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Party::Dem => "DEM",
            Party::Rep => "REP",
            Party::Ind => "IND",
            Party::Lib => "LIB",
            Party::Grn => "GRN",
            Party::Other(code) => code,
        }
    }

    /// One-letter label shown next to candidate names
    pub fn label(&self) -> String {
        match self {
            Party::Dem => "D".into(),
            Party::Rep => "R".into(),
            Party::Ind => "I".into(),
            Party::Lib => "L".into(),
            Party::Grn => "G".into(),
            Party::Other(code) => code.chars().next().map(String::from).unwrap_or_else(|| "?".into()),
        }
    }

    /// Coloring bucket: anything but DEM/REP is OTH
    pub fn winner(&self) -> Winner {
        match self {
            Party::Dem => Winner::Dem,
            Party::Rep => Winner::Rep,
            _ => Winner::Oth,
        }
    }

    pub fn is_major(&self) -> bool {
        matches!(self, Party::Dem | Party::Rep)
    }
}

impl Default for Party {
    fn default() -> Self {
        Party::Other("OTHER".to_string())
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Party {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Party {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(Party::parse(raw.as_deref().unwrap_or("")))
    }
}

/// Map-coloring category of a race winner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Winner {
    Dem,
    Rep,
    Oth,
}

impl Winner {
    pub fn code(self) -> &'static str {
        match self {
            Winner::Dem => "DEM",
            Winner::Rep => "REP",
            Winner::Oth => "OTH",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Winner::Dem => "D",
            Winner::Rep => "R",
            Winner::Oth => "O",
        }
    }
}

impl Serialize for Winner {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Winner {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(Party::parse(&raw).winner())
    }
}

/// Office being contested
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RaceType {
    President,
    Senate,
    House,
    Governor,
}

impl RaceType {
    pub const ALL: [RaceType; 4] = [
        RaceType::President,
        RaceType::Senate,
        RaceType::House,
        RaceType::Governor,
    ];

    /// Directory name under `results/`
    pub fn dir_name(self) -> &'static str {
        match self {
            RaceType::President => "presidential",
            RaceType::Senate => "senate",
            RaceType::House => "house",
            RaceType::Governor => "governor",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RaceType::President => "President",
            RaceType::Senate => "Senate",
            RaceType::House => "House",
            RaceType::Governor => "Governor",
        }
    }

    /// Years between elections
    pub fn cycle(self) -> u16 {
        match self {
            RaceType::President => 4,
            _ => 2,
        }
    }

    /// Observed years, oldest first
    pub fn years(self) -> Vec<u16> {
        (FIRST_YEAR..=LAST_OBSERVED_YEAR)
            .step_by(self.cycle() as usize)
            .collect()
    }

    /// Years offered by the year slider, prediction years included for Senate
    pub fn slider_years(self) -> Vec<u16> {
        let mut years = self.years();
        if self == RaceType::Senate {
            years.extend(PREDICTION_YEARS);
        }
        years
    }

    /// Closest observed year; ties go to the earlier year
    pub fn nearest_year(self, year: u16) -> u16 {
        self.years()
            .into_iter()
            .min_by_key(|y| (y.abs_diff(year), *y))
            .unwrap_or(LAST_OBSERVED_YEAR)
    }

    pub fn has_year(self, year: u16) -> bool {
        self.years().contains(&year)
    }
}

impl std::str::FromStr for RaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "president" | "presidential" => Ok(RaceType::President),
            "senate" => Ok(RaceType::Senate),
            "house" => Ok(RaceType::House),
            "governor" => Ok(RaceType::Governor),
            other => Err(format!(
                "unknown race `{other}` (expected president, senate, house or governor)"
            )),
        }
    }
}

impl fmt::Display for RaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a record is observed data or model-generated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Real,
    Synthetic,
}

impl Provenance {
    pub fn for_presidential_year(year: u16) -> Self {
        if year <= SYNTHETIC_THROUGH {
            Provenance::Synthetic
        } else {
            Provenance::Real
        }
    }

    fn is_real(p: &Provenance) -> bool {
        *p == Provenance::Real
    }
}

/// Treat `null` like a missing field
pub(crate) fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// One candidate's line in a race
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub party: Party,
    #[serde(default, deserialize_with = "null_default")]
    pub votes: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub pct: f64,
    #[serde(default, rename = "isWinner", deserialize_with = "null_default")]
    pub is_winner: bool,
}

/// Result of one race in one geography for one year
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Signed, DEM-positive margin in percentage points
    #[serde(default, deserialize_with = "null_default")]
    pub margin: f64,
    #[serde(default)]
    pub winner: Option<Winner>,
    /// Raw party code of the winner when it is neither DEM nor REP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_party: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub dem_votes: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub rep_votes: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub other_votes: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub total_votes: u64,
    #[serde(default)]
    pub dem_pct: Option<f64>,
    #[serde(default)]
    pub rep_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dem_candidate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_candidate: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_default")]
    pub other_candidates: Vec<CandidateResult>,
    #[serde(default, skip_serializing_if = "Provenance::is_real")]
    pub provenance: Provenance,
}

impl RaceResult {
    /// "D+4.2" / "R+13.0" / "I+2.1"
    pub fn margin_label(&self) -> String {
        let label = match (self.winner, &self.winner_party) {
            (Some(Winner::Oth), Some(party)) => Party::parse(party).label(),
            (Some(w), _) => w.label().to_string(),
            (None, _) if self.margin >= 0.0 => "D".to_string(),
            (None, _) => "R".to_string(),
        };
        format!("{}+{:.1}", label, self.margin.abs())
    }
}

/// Major-party nominees for a year
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Nominees {
    #[serde(default)]
    pub dem: Option<String>,
    #[serde(default)]
    pub rep: Option<String>,
}

/// Forecast for a race that has not happened yet
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability in [0, 1]
    #[serde(default, deserialize_with = "null_default")]
    pub dem_win_prob: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub rep_win_prob: f64,
    /// Expected DEM-positive margin
    #[serde(default, deserialize_with = "null_default")]
    pub projected_margin: f64,
    #[serde(default)]
    pub dem_candidate: Option<String>,
    #[serde(default)]
    pub rep_candidate: Option<String>,
}

impl Prediction {
    pub fn favored(&self) -> Winner {
        if self.dem_win_prob >= self.rep_win_prob {
            Winner::Dem
        } else {
            Winner::Rep
        }
    }
}

/// One year of a race type's `national.json`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NationalYear {
    #[serde(default)]
    pub candidates: Nominees,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub states: BTreeMap<String, RaceResult>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub districts: BTreeMap<String, RaceResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<NationalSummary>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub predictions: BTreeMap<String, Prediction>,
}

impl NationalYear {
    pub fn state(&self, state: StateCode) -> Option<&RaceResult> {
        self.states.get(state.abbr())
    }

    pub fn district(&self, district: DistrictId) -> Option<&RaceResult> {
        self.districts.get(&district.code())
    }

    pub fn prediction(&self, state: StateCode) -> Option<&Prediction> {
        self.predictions.get(state.abbr())
    }

    /// Districts of one state, in district order
    pub fn districts_in(&self, state: StateCode) -> Vec<(DistrictId, &RaceResult)> {
        self.districts
            .iter()
            .filter_map(|(code, r)| DistrictId::parse(code).map(|d| (d, r)))
            .filter(|(d, _)| d.state == state)
            .collect()
    }
}

/// `results/{race}/national.json`, keyed by year
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationalFile(pub BTreeMap<String, NationalYear>);

impl NationalFile {
    pub fn year(&self, year: u16) -> Option<&NationalYear> {
        self.0.get(&year.to_string())
    }

    pub fn insert(&mut self, year: u16, data: NationalYear) {
        self.0.insert(year.to_string(), data);
    }
}

/// One year of a per-state county file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateYear {
    #[serde(default)]
    pub candidates: Nominees,
    #[serde(default)]
    pub counties: BTreeMap<String, RaceResult>,
}

impl StateYear {
    pub fn county(&self, county: CountyFips) -> Option<&RaceResult> {
        self.counties.get(&county.to_string())
    }
}

/// `results/{race}/states/{ABBR}.json`, keyed by year
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateFile(pub BTreeMap<String, StateYear>);

impl StateFile {
    pub fn year(&self, year: u16) -> Option<&StateYear> {
        self.0.get(&year.to_string())
    }

    pub fn insert(&mut self, year: u16, data: StateYear) {
        self.0.insert(year.to_string(), data);
    }
}

/// Declared candidate of a district, before county tallies
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeclaredCandidate {
    pub name: String,
    #[serde(default)]
    pub party: Party,
    #[serde(default, deserialize_with = "null_default")]
    pub incumbent: bool,
}

/// Per-county slice of a House district race
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountyBreakdown {
    #[serde(default, deserialize_with = "null_default")]
    pub total_votes: u64,
    pub winner: Winner,
    #[serde(default)]
    pub winner_name: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub margin: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub candidates: Vec<CandidateResult>,
}

/// A district's candidates plus its county breakdown
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistrictBreakdown {
    #[serde(default)]
    pub candidates: Vec<DeclaredCandidate>,
    /// Keyed by county name
    #[serde(default)]
    pub counties: BTreeMap<String, CountyBreakdown>,
}

/// `results/house/{st}-county-results.json`: year → district code → breakdown
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictCountyFile(pub BTreeMap<String, BTreeMap<String, DistrictBreakdown>>);

impl DistrictCountyFile {
    pub fn district(&self, year: u16, district: DistrictId) -> Option<&DistrictBreakdown> {
        let by_district = self.0.get(&year.to_string())?;
        // Both "3202" and "NV02" keys occur in the wild
        by_district.get(&district.code()).or_else(|| {
            by_district
                .iter()
                .find(|(k, _)| DistrictId::parse(k) == Some(district))
                .map(|(_, v)| v)
        })
    }
}

/// One year of a county dot: just enough to color it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotYear {
    pub total_votes: u64,
    pub margin: f64,
    pub winner: Option<Winner>,
}

/// County centroid with its presidential results, for the national dot layer
#[derive(Clone, Debug, PartialEq)]
pub struct CountyDot {
    pub fips: CountyFips,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub years: BTreeMap<u16, DotYear>,
}

impl CountyDot {
    pub fn year(&self, year: u16) -> Option<&DotYear> {
        self.years.get(&year)
    }

    /// Flat feature properties: `fips, name, state_fips, y{year}_total, y{year}_margin, y{year}_winner`
    pub fn properties(&self) -> serde_json::Map<String, serde_json::Value> {
        use serde_json::Value;
        let mut props = serde_json::Map::new();
        props.insert("fips".into(), Value::from(self.fips.to_string()));
        props.insert("name".into(), Value::from(self.name.clone()));
        props.insert(
            "state_fips".into(),
            Value::from(format!("{:02}", self.fips.state_fips_num())),
        );
        for (year, r) in &self.years {
            props.insert(format!("y{year}_total"), Value::from(r.total_votes));
            props.insert(format!("y{year}_margin"), Value::from(r.margin));
            if let Some(w) = r.winner {
                props.insert(format!("y{year}_winner"), Value::from(w.code()));
            }
        }
        props
    }

    /// Inverse of [`CountyDot::properties`]; `None` without a usable FIPS code
    pub fn from_properties(
        props: &serde_json::Map<String, serde_json::Value>,
        lon: f64,
        lat: f64,
    ) -> Option<Self> {
        let fips = match props.get("fips")? {
            serde_json::Value::String(s) => CountyFips::parse(s)?,
            v => CountyFips::new(u32::try_from(v.as_u64()?).ok()?)?,
        };
        let name = props
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut years = BTreeMap::new();
        for (key, value) in props {
            let Some(year) = key
                .strip_prefix('y')
                .and_then(|k| k.strip_suffix("_margin"))
                .and_then(|y| y.parse::<u16>().ok())
            else {
                continue;
            };
            let Some(margin) = value.as_f64() else {
                continue;
            };
            let total_votes = props
                .get(&format!("y{year}_total"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            let winner = props
                .get(&format!("y{year}_winner"))
                .and_then(|v| v.as_str())
                .map(|w| Party::parse(w).winner());
            years.insert(year, DotYear { total_votes, margin, winner });
        }

        Some(Self { fips, name, lon, lat, years })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_normalization() {
        assert_eq!(Party::parse("DEMOCRAT"), Party::Dem);
        assert_eq!(Party::parse("Democratic-Farmer-Labor"), Party::Dem);
        assert_eq!(Party::parse("republican"), Party::Rep);
        assert_eq!(Party::parse("LIBERTARIAN"), Party::Lib);
        assert_eq!(Party::parse("IAP"), Party::Other("IAP".into()));
        assert_eq!(Party::parse(""), Party::Other("OTHER".into()));
        assert_eq!(Party::parse("IAP").label(), "I");
        assert_eq!(Party::Lib.winner(), Winner::Oth);
    }

    #[test]
    fn test_year_ranges() {
        let pres = RaceType::President.years();
        assert_eq!(pres.first(), Some(&1976));
        assert_eq!(pres.last(), Some(&2024));
        assert_eq!(pres.len(), 13);
        assert_eq!(RaceType::Senate.years().len(), 25);
        assert!(RaceType::Senate.slider_years().contains(&2026));
        assert!(!RaceType::House.slider_years().contains(&2026));
        assert_eq!(RaceType::President.nearest_year(2026), 2024);
        assert_eq!(RaceType::President.nearest_year(2010), 2008);
        assert_eq!("Presidential".parse::<RaceType>(), Ok(RaceType::President));
        assert!("mayor".parse::<RaceType>().is_err());
    }

    #[test]
    fn test_lenient_race_result() {
        let json = r#"{"margin": null, "winner": "LIBERTARIAN", "dem_votes": null, "total_votes": 10}"#;
        let r: RaceResult = serde_json::from_str(json).unwrap();
        assert_eq!(r.margin, 0.0);
        assert_eq!(r.winner, Some(Winner::Oth));
        assert_eq!(r.dem_votes, 0);
        assert_eq!(r.total_votes, 10);
        assert!(r.dem_pct.is_none());
        assert_eq!(r.provenance, Provenance::Real);
    }

    #[test]
    fn test_national_file_lookup() {
        let json = r#"{"2024": {"candidates": {"dem": "Kamala Harris", "rep": "Donald Trump"},
            "states": {"CA": {"margin": 20.1, "winner": "DEM", "dem_pct": 58.5, "rep_pct": 38.4}}}}"#;
        let file: NationalFile = serde_json::from_str(json).unwrap();
        let year = file.year(2024).unwrap();
        let ca = year.state(StateCode::from_abbr("CA").unwrap()).unwrap();
        assert_eq!(ca.winner, Some(Winner::Dem));
        assert_eq!(ca.margin_label(), "D+20.1");
        assert!(file.year(2020).is_none());
    }

    #[test]
    fn test_district_breakdown_key_forms() {
        let json = r#"{"2024": {"NV02": {"candidates": [], "counties": {}}}}"#;
        let file: DistrictCountyFile = serde_json::from_str(json).unwrap();
        let nv2 = DistrictId::parse("3202").unwrap();
        assert!(file.district(2024, nv2).is_some());
    }

    #[test]
    fn test_county_dot_properties() {
        let mut years = BTreeMap::new();
        years.insert(
            2020,
            DotYear {
                total_votes: 4_263_443,
                margin: 43.5,
                winner: Some(Winner::Dem),
            },
        );
        let dot = CountyDot {
            fips: CountyFips::parse("06037").unwrap(),
            name: "Los Angeles".into(),
            lon: -118.2,
            lat: 34.3,
            years,
        };
        let props = dot.properties();
        assert_eq!(props["state_fips"], "06");
        assert_eq!(props["y2020_winner"], "DEM");
        let back = CountyDot::from_properties(&props, -118.2, 34.3).unwrap();
        assert_eq!(back, dot);
    }

    #[test]
    fn test_numeric_dot_fips_out_of_range() {
        let mut props = serde_json::Map::new();
        props.insert("fips".into(), serde_json::json!(6037));
        let dot = CountyDot::from_properties(&props, -118.2, 34.3).unwrap();
        assert_eq!(dot.fips, CountyFips::parse("06037").unwrap());

        // 2^32 + 6037 would wrap to a valid code under a plain cast
        props.insert("fips".into(), serde_json::json!(4_294_973_333u64));
        assert!(CountyDot::from_properties(&props, -118.2, 34.3).is_none());
    }
}
