//! Electoral votes per state by reapportionment era.

type EraTable = [(&'static str, u8); 51];

// 1970 census: 1972-1980
const EV_1970: EraTable = [
    ("AL", 9), ("AK", 3), ("AZ", 6), ("AR", 6), ("CA", 45), ("CO", 7), ("CT", 8),
    ("DE", 3), ("DC", 3), ("FL", 17), ("GA", 12), ("HI", 4), ("ID", 4), ("IL", 26),
    ("IN", 13), ("IA", 8), ("KS", 7), ("KY", 9), ("LA", 10), ("ME", 4), ("MD", 10),
    ("MA", 14), ("MI", 21), ("MN", 10), ("MS", 7), ("MO", 12), ("MT", 4), ("NE", 5),
    ("NV", 3), ("NH", 4), ("NJ", 17), ("NM", 4), ("NY", 41), ("NC", 13), ("ND", 3),
    ("OH", 25), ("OK", 8), ("OR", 6), ("PA", 27), ("RI", 4), ("SC", 8), ("SD", 4),
    ("TN", 10), ("TX", 26), ("UT", 4), ("VT", 3), ("VA", 12), ("WA", 9), ("WV", 6),
    ("WI", 11), ("WY", 3),
];

// 1980 census: 1984-1988
const EV_1980: EraTable = [
    ("AL", 9), ("AK", 3), ("AZ", 7), ("AR", 6), ("CA", 47), ("CO", 8), ("CT", 8),
    ("DE", 3), ("DC", 3), ("FL", 21), ("GA", 12), ("HI", 4), ("ID", 4), ("IL", 24),
    ("IN", 12), ("IA", 8), ("KS", 7), ("KY", 9), ("LA", 10), ("ME", 4), ("MD", 10),
    ("MA", 13), ("MI", 20), ("MN", 10), ("MS", 7), ("MO", 11), ("MT", 4), ("NE", 5),
    ("NV", 4), ("NH", 4), ("NJ", 16), ("NM", 5), ("NY", 36), ("NC", 13), ("ND", 3),
    ("OH", 23), ("OK", 8), ("OR", 7), ("PA", 25), ("RI", 4), ("SC", 8), ("SD", 3),
    ("TN", 11), ("TX", 29), ("UT", 5), ("VT", 3), ("VA", 12), ("WA", 10), ("WV", 6),
    ("WI", 11), ("WY", 3),
];

// 1990 census: 1992-2000
const EV_1990: EraTable = [
    ("AL", 9), ("AK", 3), ("AZ", 8), ("AR", 6), ("CA", 54), ("CO", 8), ("CT", 8),
    ("DE", 3), ("DC", 3), ("FL", 25), ("GA", 13), ("HI", 4), ("ID", 4), ("IL", 22),
    ("IN", 12), ("IA", 7), ("KS", 6), ("KY", 8), ("LA", 9), ("ME", 4), ("MD", 10),
    ("MA", 12), ("MI", 18), ("MN", 10), ("MS", 7), ("MO", 11), ("MT", 3), ("NE", 5),
    ("NV", 4), ("NH", 4), ("NJ", 15), ("NM", 5), ("NY", 33), ("NC", 14), ("ND", 3),
    ("OH", 21), ("OK", 8), ("OR", 7), ("PA", 23), ("RI", 4), ("SC", 8), ("SD", 3),
    ("TN", 11), ("TX", 32), ("UT", 5), ("VT", 3), ("VA", 13), ("WA", 11), ("WV", 5),
    ("WI", 11), ("WY", 3),
];

// 2000 census: 2004-2008
const EV_2000: EraTable = [
    ("AL", 9), ("AK", 3), ("AZ", 10), ("AR", 6), ("CA", 55), ("CO", 9), ("CT", 7),
    ("DE", 3), ("DC", 3), ("FL", 27), ("GA", 15), ("HI", 4), ("ID", 4), ("IL", 21),
    ("IN", 11), ("IA", 7), ("KS", 6), ("KY", 8), ("LA", 9), ("ME", 4), ("MD", 10),
    ("MA", 12), ("MI", 17), ("MN", 10), ("MS", 6), ("MO", 11), ("MT", 3), ("NE", 5),
    ("NV", 5), ("NH", 4), ("NJ", 15), ("NM", 5), ("NY", 31), ("NC", 15), ("ND", 3),
    ("OH", 20), ("OK", 7), ("OR", 7), ("PA", 21), ("RI", 4), ("SC", 8), ("SD", 3),
    ("TN", 11), ("TX", 34), ("UT", 5), ("VT", 3), ("VA", 13), ("WA", 11), ("WV", 5),
    ("WI", 10), ("WY", 3),
];

// 2010 census: 2012-2020
const EV_2010: EraTable = [
    ("AL", 9), ("AK", 3), ("AZ", 11), ("AR", 6), ("CA", 55), ("CO", 9), ("CT", 7),
    ("DE", 3), ("DC", 3), ("FL", 29), ("GA", 16), ("HI", 4), ("ID", 4), ("IL", 20),
    ("IN", 11), ("IA", 6), ("KS", 6), ("KY", 8), ("LA", 8), ("ME", 4), ("MD", 10),
    ("MA", 11), ("MI", 16), ("MN", 10), ("MS", 6), ("MO", 10), ("MT", 3), ("NE", 5),
    ("NV", 6), ("NH", 4), ("NJ", 14), ("NM", 5), ("NY", 29), ("NC", 15), ("ND", 3),
    ("OH", 18), ("OK", 7), ("OR", 7), ("PA", 20), ("RI", 4), ("SC", 9), ("SD", 3),
    ("TN", 11), ("TX", 38), ("UT", 6), ("VT", 3), ("VA", 13), ("WA", 12), ("WV", 5),
    ("WI", 10), ("WY", 3),
];

// 2020 census: 2024 onward
const EV_2020: EraTable = [
    ("AL", 9), ("AK", 3), ("AZ", 11), ("AR", 6), ("CA", 54), ("CO", 10), ("CT", 7),
    ("DE", 3), ("DC", 3), ("FL", 30), ("GA", 16), ("HI", 4), ("ID", 4), ("IL", 19),
    ("IN", 11), ("IA", 6), ("KS", 6), ("KY", 8), ("LA", 8), ("ME", 4), ("MD", 10),
    ("MA", 11), ("MI", 15), ("MN", 10), ("MS", 6), ("MO", 10), ("MT", 4), ("NE", 5),
    ("NV", 6), ("NH", 4), ("NJ", 14), ("NM", 5), ("NY", 28), ("NC", 16), ("ND", 3),
    ("OH", 17), ("OK", 7), ("OR", 8), ("PA", 19), ("RI", 4), ("SC", 9), ("SD", 3),
    ("TN", 11), ("TX", 40), ("UT", 6), ("VT", 3), ("VA", 13), ("WA", 12), ("WV", 4),
    ("WI", 10), ("WY", 3),
];

fn era_for(year: u16) -> &'static EraTable {
    match year {
        ..=1980 => &EV_1970,
        ..=1988 => &EV_1980,
        ..=2000 => &EV_1990,
        ..=2008 => &EV_2000,
        ..=2020 => &EV_2010,
        _ => &EV_2020,
    }
}

/// Electoral votes held by `state_abbr` in `year`; 0 for unknown states
pub fn electoral_votes(state_abbr: &str, year: u16) -> u8 {
    era_for(year)
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(state_abbr))
        .map(|&(_, ev)| ev)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_california_across_eras() {
        assert_eq!(electoral_votes("CA", 1976), 45);
        assert_eq!(electoral_votes("CA", 1984), 47);
        assert_eq!(electoral_votes("CA", 2000), 54);
        assert_eq!(electoral_votes("CA", 2008), 55);
        assert_eq!(electoral_votes("CA", 2020), 55);
        assert_eq!(electoral_votes("CA", 2024), 54);
    }

    #[test]
    fn test_unknown_state() {
        assert_eq!(electoral_votes("ZZ", 2000), 0);
        assert_eq!(electoral_votes("", 1976), 0);
    }

    #[test]
    fn test_every_era_sums_to_538() {
        for year in [1976, 1984, 1992, 2004, 2012, 2024] {
            let total: u32 = era_for(year).iter().map(|&(_, ev)| ev as u32).sum();
            assert_eq!(total, 538, "era for {year}");
        }
    }
}
