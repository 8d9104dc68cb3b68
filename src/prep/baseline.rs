//! Reference figures for the years before county-level returns are available:
//! approximate presidential margins (D−R points, one per election 1976–2024),
//! typical turnout, and the number of counties to synthesize.

/// Elections covered by [`StateBaseline::margins`], in order
pub const ELECTION_YEARS: [u16; 13] = [
    1976, 1980, 1984, 1988, 1992, 1996, 2000, 2004, 2008, 2012, 2016, 2020, 2024,
];

/// Presidential nominees (Democratic, Republican) per election
pub const NOMINEES: [(u16, &str, &str); 13] = [
    (1976, "Jimmy Carter", "Gerald Ford"),
    (1980, "Jimmy Carter", "Ronald Reagan"),
    (1984, "Walter Mondale", "Ronald Reagan"),
    (1988, "Michael Dukakis", "George H.W. Bush"),
    (1992, "Bill Clinton", "George H.W. Bush"),
    (1996, "Bill Clinton", "Bob Dole"),
    (2000, "Al Gore", "George W. Bush"),
    (2004, "John Kerry", "George W. Bush"),
    (2008, "Barack Obama", "John McCain"),
    (2012, "Barack Obama", "Mitt Romney"),
    (2016, "Hillary Clinton", "Donald Trump"),
    (2020, "Joe Biden", "Donald Trump"),
    (2024, "Kamala Harris", "Donald Trump"),
];

pub struct StateBaseline {
    pub abbr: &'static str,
    /// Typical total presidential vote
    pub votes: u64,
    pub counties: u32,
    pub margins: [f64; 13],
}

const fn baseline(abbr: &'static str, votes: u64, counties: u32, margins: [f64; 13]) -> StateBaseline {
    StateBaseline {
        abbr,
        votes,
        counties,
        margins,
    }
}

/// In state FIPS order
#[rustfmt::skip]
pub const BASELINES: [StateBaseline; 51] = [
    baseline("AL", 2_300_000, 67, [-12.0, -1.0, -22.0, -20.0, -7.0, -6.0, -15.0, -26.0, -22.0, -22.0, -28.0, -25.0, -30.0]),
    baseline("AK", 360_000, 30, [-21.0, -17.0, -30.0, -22.0, -9.0, -18.0, -31.0, -26.0, -22.0, -14.0, -15.0, -10.0, -16.0]),
    baseline("AZ", 3_400_000, 15, [-12.0, -16.0, -17.0, -7.0, -2.0, -3.0, -6.0, -11.0, -9.0, -9.0, -4.0, 0.3, -6.0]),
    baseline("AR", 1_200_000, 75, [2.0, -1.0, -22.0, -14.0, 5.0, -5.0, -5.0, -10.0, -20.0, -24.0, -27.0, -28.0, -32.0]),
    baseline("CA", 17_500_000, 58, [2.0, -3.0, -16.0, -4.0, 13.0, 13.0, 12.0, 10.0, 24.0, 23.0, 30.0, 29.0, 21.0]),
    baseline("CO", 3_300_000, 64, [-12.0, -12.0, -22.0, -5.0, 4.0, 1.0, -8.0, -5.0, 9.0, 5.0, 5.0, 14.0, 2.0]),
    baseline("CT", 1_800_000, 8, [5.0, -5.0, -22.0, -5.0, 6.0, 16.0, 18.0, 10.0, 22.0, 17.0, 14.0, 20.0, 12.0]),
    baseline("DE", 500_000, 3, [3.0, -3.0, -20.0, -12.0, 6.0, 10.0, 13.0, 8.0, 25.0, 19.0, 11.0, 19.0, 10.0]),
    baseline("DC", 340_000, 1, [67.0, 58.0, 73.0, 73.0, 76.0, 76.0, 76.0, 80.0, 86.0, 84.0, 87.0, 87.0, 82.0]),
    baseline("FL", 11_100_000, 67, [-5.0, -17.0, -25.0, -22.0, 0.5, -6.0, -0.01, -5.0, -3.0, -1.0, -1.0, -3.0, -13.0]),
    baseline("GA", 5_000_000, 159, [-4.0, -12.0, -20.0, -16.0, 0.6, -1.0, -12.0, -17.0, -5.0, -8.0, -5.0, 0.2, -2.0]),
    baseline("HI", 570_000, 5, [3.0, -2.0, -12.0, 10.0, 9.0, 18.0, 18.0, 9.0, 45.0, 43.0, 32.0, 29.0, 19.0]),
    baseline("ID", 870_000, 44, [-21.0, -27.0, -40.0, -26.0, -15.0, -20.0, -39.0, -38.0, -25.0, -32.0, -32.0, -33.0, -38.0]),
    baseline("IL", 6_000_000, 102, [-3.0, -7.0, -12.0, -2.0, 13.0, 17.0, 12.0, 10.0, 25.0, 17.0, 17.0, 17.0, 7.0]),
    baseline("IN", 3_000_000, 92, [-9.0, -16.0, -24.0, -20.0, -3.0, -6.0, -16.0, -21.0, -1.0, -10.0, -19.0, -16.0, -22.0]),
    baseline("IA", 1_700_000, 99, [-2.0, -12.0, -7.0, -2.0, 6.0, 10.0, 0.3, -0.7, 10.0, 6.0, -9.0, -8.0, -13.0]),
    baseline("KS", 1_400_000, 105, [-7.0, -14.0, -28.0, -13.0, -5.0, -15.0, -21.0, -25.0, -15.0, -22.0, -21.0, -15.0, -22.0]),
    baseline("KY", 2_100_000, 120, [-1.0, -1.0, -20.0, -12.0, 3.0, 1.0, -15.0, -20.0, -16.0, -23.0, -30.0, -26.0, -32.0]),
    baseline("LA", 2_100_000, 64, [-3.0, -3.0, -22.0, -9.0, 5.0, 12.0, -8.0, -15.0, -19.0, -17.0, -20.0, -19.0, -24.0]),
    baseline("ME", 820_000, 16, [-8.0, -12.0, -22.0, -8.0, 8.0, 19.0, 5.0, 9.0, 17.0, 15.0, 3.0, 9.0, 6.0]),
    baseline("MD", 3_000_000, 24, [3.0, -3.0, -18.0, -8.0, 14.0, 16.0, 17.0, 13.0, 25.0, 26.0, 26.0, 33.0, 24.0]),
    baseline("MA", 3_600_000, 14, [14.0, -1.0, -3.0, 8.0, 13.0, 33.0, 27.0, 25.0, 26.0, 23.0, 27.0, 34.0, 26.0]),
    baseline("MI", 5_500_000, 83, [2.0, -6.0, -19.0, -8.0, 7.0, 13.0, 0.2, 3.0, 16.0, 9.0, -0.2, 3.0, -5.0]),
    baseline("MN", 3_300_000, 87, [7.0, -3.0, -3.0, 7.0, 10.0, 16.0, 2.0, 3.0, 10.0, 8.0, 1.0, 7.0, 2.0]),
    baseline("MS", 1_300_000, 82, [-2.0, -1.0, -24.0, -20.0, -2.0, -5.0, -17.0, -20.0, -14.0, -12.0, -18.0, -17.0, -22.0]),
    baseline("MO", 3_000_000, 115, [-3.0, -4.0, -22.0, -3.0, 0.1, 6.0, -3.0, -7.0, -0.1, -10.0, -19.0, -15.0, -20.0]),
    baseline("MT", 600_000, 56, [-1.0, -8.0, -22.0, -10.0, 3.0, -3.0, -25.0, -20.0, -2.0, -14.0, -20.0, -16.0, -22.0]),
    baseline("NE", 960_000, 93, [-24.0, -27.0, -39.0, -20.0, -11.0, -15.0, -33.0, -33.0, -15.0, -22.0, -25.0, -19.0, -25.0]),
    baseline("NV", 1_400_000, 17, [-4.0, -16.0, -27.0, -15.0, 3.0, -1.0, -4.0, -3.0, 12.0, 7.0, -2.0, 2.0, -3.0]),
    baseline("NH", 810_000, 10, [-4.0, -17.0, -25.0, -4.0, 5.0, 10.0, 1.0, 1.0, 10.0, 6.0, 0.4, 7.0, 2.0]),
    baseline("NJ", 4_500_000, 21, [2.0, -10.0, -22.0, -14.0, 2.0, 18.0, 16.0, 7.0, 15.0, 18.0, 14.0, 16.0, 6.0]),
    baseline("NM", 920_000, 33, [-1.0, -10.0, -22.0, -10.0, 8.0, 9.0, 0.1, 1.0, 15.0, 10.0, 8.0, 11.0, 4.0]),
    baseline("NY", 8_500_000, 62, [-4.0, -8.0, -22.0, -4.0, 16.0, 29.0, 25.0, 18.0, 27.0, 28.0, 22.0, 23.0, 12.0]),
    baseline("NC", 5_500_000, 100, [-4.0, -2.0, -24.0, -12.0, 0.6, -5.0, -13.0, -12.0, 0.3, -2.0, -4.0, -1.0, -4.0]),
    baseline("ND", 360_000, 53, [-14.0, -24.0, -32.0, -14.0, -4.0, -7.0, -28.0, -27.0, -9.0, -20.0, -36.0, -33.0, -32.0]),
    baseline("OH", 5_900_000, 88, [-1.0, -8.0, -18.0, -12.0, 2.0, 6.0, -4.0, -2.0, 5.0, 3.0, -8.0, -8.0, -11.0]),
    baseline("OK", 1_600_000, 77, [-12.0, -19.0, -30.0, -22.0, -8.0, -8.0, -22.0, -31.0, -28.0, -34.0, -36.0, -33.0, -36.0]),
    baseline("OR", 2_400_000, 36, [2.0, -4.0, -3.0, 4.0, 8.0, 7.0, 0.5, 4.0, 16.0, 12.0, 11.0, 16.0, 8.0]),
    baseline("PA", 7_000_000, 67, [-3.0, -8.0, -7.0, -4.0, 7.0, 9.0, 4.0, 3.0, 10.0, 5.0, -0.7, 1.0, -2.0]),
    baseline("RI", 510_000, 5, [9.0, -3.0, -4.0, 12.0, 14.0, 26.0, 29.0, 21.0, 28.0, 27.0, 16.0, 21.0, 15.0]),
    baseline("SC", 2_500_000, 46, [-12.0, -1.0, -24.0, -24.0, -4.0, -6.0, -16.0, -17.0, -9.0, -10.0, -14.0, -12.0, -18.0]),
    baseline("SD", 420_000, 66, [-1.0, -16.0, -30.0, -8.0, -3.0, -3.0, -22.0, -22.0, -8.0, -12.0, -30.0, -26.0, -28.0]),
    baseline("TN", 3_050_000, 95, [1.0, -1.0, -16.0, -16.0, 5.0, 3.0, -4.0, -14.0, -15.0, -20.0, -26.0, -23.0, -28.0]),
    baseline("TX", 11_300_000, 254, [-3.0, -14.0, -27.0, -13.0, -5.0, -5.0, -21.0, -23.0, -12.0, -16.0, -9.0, -6.0, -14.0]),
    baseline("UT", 1_500_000, 29, [-29.0, -46.0, -50.0, -32.0, -12.0, -22.0, -41.0, -46.0, -28.0, -48.0, -18.0, -20.0, -28.0]),
    baseline("VT", 370_000, 14, [-14.0, -4.0, -18.0, -8.0, 16.0, 13.0, 10.0, 20.0, 37.0, 36.0, 26.0, 36.0, 27.0]),
    baseline("VA", 4_500_000, 133, [-2.0, -12.0, -24.0, -16.0, 4.0, 2.0, -8.0, -8.0, 6.0, 4.0, 5.0, 10.0, 0.5]),
    baseline("WA", 4_100_000, 39, [4.0, -5.0, -8.0, 4.0, 12.0, 12.0, 6.0, 7.0, 17.0, 15.0, 16.0, 20.0, 12.0]),
    baseline("WV", 790_000, 55, [17.0, -2.0, -12.0, -5.0, 13.0, 15.0, -6.0, -13.0, -13.0, -27.0, -42.0, -39.0, -42.0]),
    baseline("WI", 3_300_000, 72, [2.0, -5.0, -9.0, -4.0, 4.0, 10.0, 0.2, 0.4, 14.0, 7.0, -0.8, 0.6, -2.0]),
    baseline("WY", 280_000, 23, [-12.0, -28.0, -40.0, -20.0, -8.0, -12.0, -40.0, -40.0, -32.0, -41.0, -46.0, -43.0, -44.0]),
];

pub fn nominees(year: u16) -> Option<(&'static str, &'static str)> {
    NOMINEES
        .iter()
        .find(|(y, _, _)| *y == year)
        .map(|&(_, dem, rep)| (dem, rep))
}

pub fn baseline_for(abbr: &str) -> Option<&'static StateBaseline> {
    BASELINES.iter().find(|b| b.abbr == abbr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::StateCode;

    #[test]
    fn test_every_state_has_a_baseline() {
        for state in StateCode::all() {
            assert!(baseline_for(state.abbr()).is_some(), "{state}");
        }
        assert_eq!(baseline_for("TX").unwrap().counties, 254);
        assert_eq!(baseline_for("AZ").unwrap().margins[11], 0.3);
    }

    #[test]
    fn test_nominees() {
        assert_eq!(nominees(1984), Some(("Walter Mondale", "Ronald Reagan")));
        assert_eq!(nominees(2026), None);
        assert!(ELECTION_YEARS.iter().all(|&y| nominees(y).is_some()));
    }
}
