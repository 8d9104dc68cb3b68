//! Geographic identifiers: states, counties and congressional districts.
//!
//! State FIPS codes and postal abbreviations form a bijection over the 50
//! states plus DC. Counties are 5-digit FIPS codes whose first two digits are
//! the state; districts are the state FIPS followed by a 2-digit number,
//! `00` being an at-large seat.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// (FIPS, abbreviation, name), sorted by FIPS
const STATES: [(&str, &str, &str); 51] = [
    ("01", "AL", "Alabama"),
    ("02", "AK", "Alaska"),
    ("04", "AZ", "Arizona"),
    ("05", "AR", "Arkansas"),
    ("06", "CA", "California"),
    ("08", "CO", "Colorado"),
    ("09", "CT", "Connecticut"),
    ("10", "DE", "Delaware"),
    ("11", "DC", "District of Columbia"),
    ("12", "FL", "Florida"),
    ("13", "GA", "Georgia"),
    ("15", "HI", "Hawaii"),
    ("16", "ID", "Idaho"),
    ("17", "IL", "Illinois"),
    ("18", "IN", "Indiana"),
    ("19", "IA", "Iowa"),
    ("20", "KS", "Kansas"),
    ("21", "KY", "Kentucky"),
    ("22", "LA", "Louisiana"),
    ("23", "ME", "Maine"),
    ("24", "MD", "Maryland"),
    ("25", "MA", "Massachusetts"),
    ("26", "MI", "Michigan"),
    ("27", "MN", "Minnesota"),
    ("28", "MS", "Mississippi"),
    ("29", "MO", "Missouri"),
    ("30", "MT", "Montana"),
    ("31", "NE", "Nebraska"),
    ("32", "NV", "Nevada"),
    ("33", "NH", "New Hampshire"),
    ("34", "NJ", "New Jersey"),
    ("35", "NM", "New Mexico"),
    ("36", "NY", "New York"),
    ("37", "NC", "North Carolina"),
    ("38", "ND", "North Dakota"),
    ("39", "OH", "Ohio"),
    ("40", "OK", "Oklahoma"),
    ("41", "OR", "Oregon"),
    ("42", "PA", "Pennsylvania"),
    ("44", "RI", "Rhode Island"),
    ("45", "SC", "South Carolina"),
    ("46", "SD", "South Dakota"),
    ("47", "TN", "Tennessee"),
    ("48", "TX", "Texas"),
    ("49", "UT", "Utah"),
    ("50", "VT", "Vermont"),
    ("51", "VA", "Virginia"),
    ("53", "WA", "Washington"),
    ("54", "WV", "West Virginia"),
    ("55", "WI", "Wisconsin"),
    ("56", "WY", "Wyoming"),
];

/// One of the 50 states or DC
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct StateCode(u8);

impl StateCode {
    /// Look up by postal abbreviation (case-insensitive)
    pub fn from_abbr(abbr: &str) -> Option<Self> {
        let abbr = abbr.trim();
        STATES
            .iter()
            .position(|(_, a, _)| a.eq_ignore_ascii_case(abbr))
            .map(|i| StateCode(i as u8))
    }

    /// Look up by FIPS code; accepts unpadded input like "6"
    pub fn from_fips(fips: &str) -> Option<Self> {
        let n: u32 = fips.trim().parse().ok()?;
        Self::from_fips_num(n)
    }

    pub fn from_fips_num(n: u32) -> Option<Self> {
        STATES
            .iter()
            .position(|(f, _, _)| f.parse::<u32>().ok() == Some(n))
            .map(|i| StateCode(i as u8))
    }

    /// Look up by full name ("New York")
    pub fn from_name(name: &str) -> Option<Self> {
        STATES
            .iter()
            .position(|(_, _, n)| n.eq_ignore_ascii_case(name.trim()))
            .map(|i| StateCode(i as u8))
    }

    #[inline]
    pub fn abbr(self) -> &'static str {
        STATES[self.0 as usize].1
    }

    #[inline]
    pub fn fips(self) -> &'static str {
        STATES[self.0 as usize].0
    }

    #[inline]
    pub fn fips_num(self) -> u32 {
        self.fips().parse().unwrap_or(0)
    }

    #[inline]
    pub fn name(self) -> &'static str {
        STATES[self.0 as usize].2
    }

    /// Every state in FIPS order
    pub fn all() -> impl Iterator<Item = StateCode> {
        (0..STATES.len()).map(|i| StateCode(i as u8))
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbr())
    }
}

impl Serialize for StateCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.abbr())
    }
}

impl<'de> Deserialize<'de> for StateCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        StateCode::from_abbr(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown state `{s}`")))
    }
}

/// 5-digit county FIPS code
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CountyFips(u32);

impl CountyFips {
    pub fn new(code: u32) -> Option<Self> {
        (code >= 1000 && code < 100_000).then_some(CountyFips(code))
    }

    /// Parse "06037", "6037" or a float-formatted "6037.0" as exported by spreadsheets
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_suffix(".0").unwrap_or(s);
        Self::new(s.parse().ok()?)
    }

    #[inline]
    pub fn code(self) -> u32 {
        self.0
    }

    /// State FIPS prefix as a number
    #[inline]
    pub fn state_fips_num(self) -> u32 {
        self.0 / 1000
    }

    pub fn state(self) -> Option<StateCode> {
        StateCode::from_fips_num(self.state_fips_num())
    }

    /// True when this county belongs to `state`
    pub fn in_state(self, state: StateCode) -> bool {
        self.state_fips_num() == state.fips_num()
    }
}

impl fmt::Display for CountyFips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

/// Congressional district: state + 2-digit number, 0 = at-large
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct DistrictId {
    pub state: StateCode,
    pub number: u8,
}

impl DistrictId {
    pub fn new(state: StateCode, number: u8) -> Self {
        Self { state, number }
    }

    /// Parse "3201" (FIPS form) or "NV01" (postal form)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != 4 || !s.is_ascii() {
            return None;
        }
        let (head, tail) = s.split_at(2);
        let number = tail.parse().ok()?;
        let state = if head.bytes().all(|b| b.is_ascii_digit()) {
            StateCode::from_fips(head)?
        } else {
            StateCode::from_abbr(head)?
        };
        Some(Self { state, number })
    }

    pub fn is_at_large(self) -> bool {
        self.number == 0
    }

    /// FIPS form used as map key, e.g. "3201"
    pub fn code(self) -> String {
        format!("{}{:02}", self.state.fips(), self.number)
    }

    /// Human label, e.g. "NV-1" or "WY-AL"
    pub fn label(self) -> String {
        if self.is_at_large() {
            format!("{}-AL", self.state.abbr())
        } else {
            format!("{}-{}", self.state.abbr(), self.number)
        }
    }
}

impl fmt::Display for DistrictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.state.fips(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fips_abbr_bijection() {
        for state in StateCode::all() {
            assert_eq!(StateCode::from_fips(state.fips()), Some(state));
            assert_eq!(StateCode::from_abbr(state.abbr()), Some(state));
        }
        assert_eq!(StateCode::all().count(), 51);
    }

    #[test]
    fn test_unknown_state() {
        assert!(StateCode::from_abbr("ZZ").is_none());
        assert!(StateCode::from_fips("03").is_none());
    }

    #[test]
    fn test_state_lookup_forms() {
        assert_eq!(StateCode::from_fips("6").map(|s| s.abbr()), Some("CA"));
        assert_eq!(StateCode::from_abbr("ny").map(|s| s.name()), Some("New York"));
        assert_eq!(StateCode::from_name("Nevada").map(|s| s.fips()), Some("32"));
    }

    #[test]
    fn test_county_prefix() {
        let la = CountyFips::parse("06037").unwrap();
        assert_eq!(la.to_string(), "06037");
        assert_eq!(la.state().map(|s| s.abbr()), Some("CA"));
        assert!(la.in_state(StateCode::from_abbr("CA").unwrap()));
        assert_eq!(CountyFips::parse("6037.0"), Some(la));
    }

    #[test]
    fn test_district_forms() {
        let nv1 = DistrictId::parse("3201").unwrap();
        assert_eq!(nv1.label(), "NV-1");
        assert_eq!(DistrictId::parse("NV01"), Some(nv1));
        let wy = DistrictId::parse("5600").unwrap();
        assert!(wy.is_at_large());
        assert_eq!(wy.label(), "WY-AL");
        assert_eq!(wy.code(), "5600");
        assert!(DistrictId::parse("9901").is_none());
    }
}
