//! Presidential results files. Observed county returns cover 2008–2024 and
//! are summed into state totals; earlier elections are synthesized from the
//! state baselines with a seeded generator.

use super::baseline::{baseline_for, nominees, StateBaseline, ELECTION_YEARS};
use super::csv::CsvTable;
use super::rng::ParkMiller;
use crate::config::Config;
use crate::data::write_json;
use crate::election::aggregate::{derive_two_way, round2, AggregationPolicy};
use crate::election::{
    NationalFile, NationalYear, Nominees, Provenance, RaceResult, RaceType, StateFile, StateYear, Winner,
};
use crate::error::Result;
use crate::geo::{CountyFips, StateCode};
use std::collections::BTreeMap;
use std::path::Path;

pub const CSV_2008_2016: &str = "US_County_Level_Presidential_Results_08-16.csv";
const YEARS_2008_2016: [u16; 3] = [2008, 2012, 2016];
/// Years published one file each, in the 2020 column layout
pub const SINGLE_YEAR_FILES: [u16; 2] = [2020, 2024];

/// Turnout assumed when a state has no baseline
const FALLBACK_VOTES: u64 = 1_000_000;
const FALLBACK_COUNTIES: u32 = 50;
/// Synthetic county margins stay within this many points of zero
const COUNTY_MARGIN_CAP: f64 = 70.0;

pub fn single_year_csv(year: u16) -> String {
    format!("{year}_US_County_Level_Presidential_Results.csv")
}

/// One county's vote counts for one election
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountyTally {
    pub name: String,
    pub dem: u64,
    pub rep: u64,
    pub other: u64,
    pub total: u64,
}

impl CountyTally {
    fn add(&mut self, other: &CountyTally) {
        self.dem += other.dem;
        self.rep += other.rep;
        self.other += other.other;
        self.total += other.total;
    }

    fn result(&self, provenance: Provenance, policy: &AggregationPolicy) -> Option<RaceResult> {
        derive_two_way(self.dem, self.rep, self.other, self.total, provenance, policy)
    }
}

/// Observed returns by year and county
pub type CountyReturns = BTreeMap<u16, BTreeMap<CountyFips, CountyTally>>;

/// `fips_code, county, total_YYYY, dem_YYYY, gop_YYYY, oth_YYYY` for 2008–2016
pub fn read_multi_year(table: &CsvTable, returns: &mut CountyReturns) -> Result<()> {
    let fips_col = table.column("fips_code")?;
    let name_col = table.column("county")?;
    let mut columns = Vec::with_capacity(YEARS_2008_2016.len());
    for year in YEARS_2008_2016 {
        columns.push((
            year,
            table.column(&format!("total_{year}"))?,
            table.column(&format!("dem_{year}"))?,
            table.column(&format!("gop_{year}"))?,
            table.column(&format!("oth_{year}"))?,
        ));
    }

    for row in table.rows() {
        let Some(fips) = CountyFips::parse(row.get(fips_col)) else {
            log::warn!("line {}: skipping row without a county FIPS code", row.line());
            continue;
        };
        for &(year, total, dem, rep, other) in &columns {
            let tally = CountyTally {
                name: row.get(name_col).to_string(),
                dem: row.count(dem)?,
                rep: row.count(rep)?,
                other: row.count(other)?,
                total: row.count(total)?,
            };
            if tally.total > 0 {
                returns.entry(year).or_default().insert(fips, tally);
            }
        }
    }
    Ok(())
}

/// `county_fips, county_name, votes_dem, votes_gop, total_votes` for one year;
/// other is whatever the two majors did not take
pub fn read_single_year(table: &CsvTable, year: u16, returns: &mut CountyReturns) -> Result<()> {
    let fips_col = table.column("county_fips")?;
    let name_col = table.column("county_name")?;
    let dem_col = table.column("votes_dem")?;
    let rep_col = table.column("votes_gop")?;
    let total_col = table.column("total_votes")?;

    for row in table.rows() {
        let Some(fips) = CountyFips::parse(row.get(fips_col)) else {
            log::warn!("line {}: skipping row without a county FIPS code", row.line());
            continue;
        };
        let dem = row.count(dem_col)?;
        let rep = row.count(rep_col)?;
        let total = row.count(total_col)?;
        if total == 0 {
            continue;
        }
        returns.entry(year).or_default().insert(
            fips,
            CountyTally {
                name: row.get(name_col).to_string(),
                dem,
                rep,
                other: total.saturating_sub(dem + rep),
                total,
            },
        );
    }
    Ok(())
}

/// Read every county return file from `input_dir`
pub fn read_returns(input_dir: &Path) -> Result<CountyReturns> {
    let mut returns = CountyReturns::new();
    read_multi_year(&CsvTable::read(&input_dir.join(CSV_2008_2016))?, &mut returns)?;
    for year in SINGLE_YEAR_FILES {
        let table = CsvTable::read(&input_dir.join(single_year_csv(year)))?;
        read_single_year(&table, year, &mut returns)?;
    }
    for (year, counties) in &returns {
        log::info!("{year}: {} counties", counties.len());
    }
    Ok(returns)
}

/// Vote split for a synthetic race with the given D−R margin. Third parties
/// take 1–4 % drawn from `rng`, split evenly off both majors.
pub fn synthetic_result(margin: f64, total_votes: u64, rng: &mut ParkMiller) -> RaceResult {
    let dem_pct = 50.0 + margin / 2.0;
    let rep_pct = 50.0 - margin / 2.0;
    let spare = (100.0 - dem_pct - rep_pct).max(0.0);
    let other_pct = if spare > 0.0 {
        spare
    } else {
        rng.next_f64() * 3.0 + 1.0
    };
    let dem_pct = dem_pct - other_pct / 2.0;
    let rep_pct = rep_pct - other_pct / 2.0;
    let share = |pct: f64| (total_votes as f64 * pct.max(0.0) / 100.0).round() as u64;

    RaceResult {
        margin: round2(margin),
        winner: Some(if margin > 0.0 { Winner::Dem } else { Winner::Rep }),
        dem_votes: share(dem_pct),
        rep_votes: share(rep_pct),
        other_votes: share(other_pct),
        total_votes,
        dem_pct: Some(round2(dem_pct)),
        rep_pct: Some(round2(rep_pct)),
        provenance: Provenance::Synthetic,
        ..RaceResult::default()
    }
}

fn nominees_for(year: u16) -> Nominees {
    let (dem, rep) = nominees(year).unzip();
    Nominees {
        dem: dem.map(String::from),
        rep: rep.map(String::from),
    }
}

fn with_nominees(mut result: RaceResult, names: &Nominees) -> RaceResult {
    result.dem_candidate = names.dem.clone();
    result.rep_candidate = names.rep.clone();
    result
}

fn baseline_votes(base: Option<&StateBaseline>) -> u64 {
    base.map_or(FALLBACK_VOTES, |b| b.votes)
}

fn baseline_margin(base: Option<&StateBaseline>, year_index: usize) -> f64 {
    base.and_then(|b| b.margins.get(year_index).copied()).unwrap_or(0.0)
}

/// Statewide synthetic record
fn synthetic_state(state: StateCode, year_index: usize, rng: &mut ParkMiller) -> RaceResult {
    let base = baseline_for(state.abbr());
    let margin = baseline_margin(base, year_index);
    let turnout = 0.6 + year_index as f64 * 0.03 + rng.next_f64() * 0.05;
    let total = (baseline_votes(base) as f64 * turnout).round() as u64;
    synthetic_result(margin, total, rng)
}

/// Synthetic counties scattered around the state margin. FIPS codes are the
/// odd numbers 001, 003, ... as real county codes are.
fn synthetic_counties(
    state: StateCode,
    year_index: usize,
    rng: &mut ParkMiller,
) -> BTreeMap<String, RaceResult> {
    let base = baseline_for(state.abbr());
    let state_margin = baseline_margin(base, year_index);
    let count = base.map_or(FALLBACK_COUNTIES, |b| b.counties);
    let per_county = baseline_votes(base) as f64 / count as f64;

    let mut counties = BTreeMap::new();
    for i in 0..count {
        let urban = rng.next_f64();
        let offset = (urban - 0.5) * 40.0 + (rng.next_f64() - 0.5) * 20.0;
        let margin = (state_margin + offset).clamp(-COUNTY_MARGIN_CAP, COUNTY_MARGIN_CAP);
        let votes = (per_county * (0.3 + rng.next_f64() * 1.4) * (0.6 + year_index as f64 * 0.03)).round()
            as u64;
        let Some(fips) = CountyFips::new(state.fips_num() * 1000 + i * 2 + 1) else {
            continue;
        };
        counties.insert(fips.to_string(), synthetic_result(margin, votes, rng));
    }
    counties
}

/// Per-state totals of the observed counties
fn state_totals(counties: &BTreeMap<CountyFips, CountyTally>) -> BTreeMap<StateCode, CountyTally> {
    let mut totals: BTreeMap<StateCode, CountyTally> = BTreeMap::new();
    for (fips, tally) in counties {
        if let Some(state) = fips.state() {
            totals.entry(state).or_default().add(tally);
        }
    }
    totals
}

pub struct PresidentialOutput {
    pub national: NationalFile,
    pub states: BTreeMap<StateCode, StateFile>,
}

/// Assemble every file. The national file is generated before the state
/// files so the generator sequence is fixed. `policy` applies to observed
/// returns; synthetic splits always add up to their total.
pub fn build(returns: &CountyReturns, rng: &mut ParkMiller, policy: &AggregationPolicy) -> PresidentialOutput {
    let mut national = NationalFile::default();
    for (yi, &year) in ELECTION_YEARS.iter().enumerate() {
        let names = nominees_for(year);
        let observed = (Provenance::for_presidential_year(year) == Provenance::Real)
            .then(|| returns.get(&year).map(state_totals).unwrap_or_default());

        let mut data = NationalYear {
            candidates: names.clone(),
            ..NationalYear::default()
        };
        for state in StateCode::all() {
            let real = observed
                .as_ref()
                .and_then(|totals| totals.get(&state))
                .and_then(|t| t.result(Provenance::Real, policy));
            let result = match real {
                Some(result) => result,
                None => {
                    if observed.is_some() {
                        log::warn!("{year} {state}: no county returns, synthesizing");
                    }
                    synthetic_state(state, yi, rng)
                }
            };
            data.states.insert(state.abbr().to_string(), with_nominees(result, &names));
        }
        national.insert(year, data);
    }

    let mut states = BTreeMap::new();
    for state in StateCode::all() {
        let mut file = StateFile::default();
        for (yi, &year) in ELECTION_YEARS.iter().enumerate() {
            let counties = if Provenance::for_presidential_year(year) == Provenance::Real {
                returns
                    .get(&year)
                    .into_iter()
                    .flatten()
                    .filter(|(fips, _)| fips.in_state(state))
                    .filter_map(|(fips, tally)| Some((fips.to_string(), tally.result(Provenance::Real, policy)?)))
                    .collect()
            } else {
                synthetic_counties(state, yi, rng)
            };
            file.insert(
                year,
                StateYear {
                    candidates: nominees_for(year),
                    counties,
                },
            );
        }
        states.insert(state, file);
    }

    PresidentialOutput { national, states }
}

/// `prep presidential`: read the county CSVs in `input_dir` and write the
/// presidential national and state files under the data root
pub fn run(input_dir: &Path, config: &Config) -> Result<PresidentialOutput> {
    let returns = read_returns(input_dir)?;
    let output = build(&returns, &mut ParkMiller::default(), &config.policy);

    let race = RaceType::President;
    write_json(&config.national_path(race), &output.national)?;
    for (state, file) in &output.states {
        write_json(&config.state_path(race, state.abbr()), file)?;
    }
    log::info!(
        "wrote {} and {} state files",
        config.national_path(race).display(),
        output.states.len()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_json;
    use crate::data::testutil::scratch_dir;
    use crate::election::aggregate::Denominator;
    use std::fs;

    fn st(abbr: &str) -> StateCode {
        StateCode::from_abbr(abbr).unwrap()
    }

    fn nevada_2020() -> CountyReturns {
        let mut returns = CountyReturns::new();
        let year = returns.entry(2020).or_default();
        year.insert(
            CountyFips::new(32003).unwrap(),
            CountyTally {
                name: "Clark".into(),
                dem: 521_852,
                rep: 430_930,
                other: 20_218,
                total: 973_000,
            },
        );
        year.insert(
            CountyFips::new(32031).unwrap(),
            CountyTally {
                name: "Washoe".into(),
                dem: 128_128,
                rep: 135_118,
                other: 6_754,
                total: 270_000,
            },
        );
        returns
    }

    #[test]
    fn test_synthetic_split() {
        let mut rng = ParkMiller::default();
        let r = synthetic_result(10.0, 1_000_000, &mut rng);
        assert_eq!(r.margin, 10.0);
        assert_eq!(r.winner, Some(Winner::Dem));
        assert_eq!(r.provenance, Provenance::Synthetic);
        let other = r.other_votes as f64 / 10_000.0;
        assert!((1.0..4.0).contains(&other), "other share {other}");
        // The third-party share comes off both majors equally
        assert!((r.dem_pct.unwrap() - r.rep_pct.unwrap() - 10.0).abs() < 0.02);
        assert!(r.dem_votes + r.rep_votes + r.other_votes <= 1_000_002);

        let r = synthetic_result(-0.01, 100, &mut rng);
        assert_eq!(r.winner, Some(Winner::Rep));
        assert_eq!(r.margin, -0.01);
    }

    #[test]
    fn test_observed_years_aggregate_counties() {
        let out = build(&nevada_2020(), &mut ParkMiller::default(), &AggregationPolicy::default());
        let nv = out.national.year(2020).unwrap().state(st("NV")).unwrap();
        assert_eq!(nv.dem_votes, 649_980);
        assert_eq!(nv.rep_votes, 566_048);
        assert_eq!(nv.total_votes, 1_243_000);
        assert_eq!(nv.provenance, Provenance::Real);
        assert_eq!(nv.winner, Some(Winner::Dem));
        // (649980 - 566048) / 1243000
        assert_eq!(nv.margin, 6.75);
        assert_eq!(nv.dem_candidate.as_deref(), Some("Joe Biden"));

        let counties = &out.states[&st("NV")].year(2020).unwrap().counties;
        assert_eq!(counties.len(), 2);
        assert_eq!(counties["32031"].winner, Some(Winner::Rep));
        assert!(counties["32031"].margin < 0.0);
    }

    #[test]
    fn test_missing_observed_state_falls_back() {
        let out = build(&nevada_2020(), &mut ParkMiller::default(), &AggregationPolicy::default());
        let ca = out.national.year(2020).unwrap().state(st("CA")).unwrap();
        assert_eq!(ca.provenance, Provenance::Synthetic);
        assert_eq!(ca.margin, 29.0);
        // Observed years never get synthetic counties
        assert!(out.states[&st("CA")].year(2020).unwrap().counties.is_empty());
    }

    #[test]
    fn test_early_years_are_synthetic_and_repeatable() {
        let a = build(&CountyReturns::new(), &mut ParkMiller::default(), &AggregationPolicy::default());
        let b = build(&CountyReturns::new(), &mut ParkMiller::default(), &AggregationPolicy::default());
        assert_eq!(a.national, b.national);
        assert_eq!(a.states, b.states);

        let nv = a.national.year(1976).unwrap().state(st("NV")).unwrap();
        assert_eq!(nv.margin, -4.0);
        assert_eq!(nv.winner, Some(Winner::Rep));
        assert_eq!(nv.dem_candidate.as_deref(), Some("Jimmy Carter"));

        let counties = &a.states[&st("NV")].year(1976).unwrap().counties;
        assert_eq!(counties.len(), 17);
        assert!(counties.contains_key("32001"));
        assert!(counties.contains_key("32033"));
        assert!(counties.values().all(|c| c.margin.abs() <= 70.0));
        assert_eq!(a.states[&st("TX")].year(1988).unwrap().counties.len(), 254);
    }

    #[test]
    fn test_run_reads_csvs_and_writes_files() {
        let input = scratch_dir("prep-presidential-in");
        fs::write(
            input.join(CSV_2008_2016),
            "fips_code,county,total_2008,dem_2008,gop_2008,oth_2008,total_2012,dem_2012,gop_2012,oth_2012,total_2016,dem_2016,gop_2016,oth_2016\n\
             32003,Clark County,600000,380000,210000,10000,610000,390000,210000,10000,620000,400000,210000,10000\n",
        )
        .unwrap();
        for year in SINGLE_YEAR_FILES {
            fs::write(
                input.join(single_year_csv(year)),
                "state_name,county_fips,county_name,votes_gop,votes_dem,total_votes\n\
                 Nevada,32003,Clark County,430930,521852,973000\n",
            )
            .unwrap();
        }

        let out_dir = scratch_dir("prep-presidential-out");
        let config = Config::default().with_data_root(&out_dir);
        run(&input, &config).unwrap();

        let national: NationalFile = read_json(&config.national_path(RaceType::President)).unwrap();
        let nv = national.year(2012).unwrap().state(st("NV")).unwrap();
        assert_eq!(nv.total_votes, 610_000);
        assert_eq!(nv.provenance, Provenance::Real);
        let nv_file: StateFile = read_json(&config.state_path(RaceType::President, "NV")).unwrap();
        let clark = &nv_file.year(2024).unwrap().counties["32003"];
        assert_eq!(clark.other_votes, 20_218);
    }

    #[test]
    fn test_itemized_policy_reaches_county_percentages() {
        let mut returns = CountyReturns::new();
        returns.entry(2012).or_default().insert(
            CountyFips::new(32003).unwrap(),
            CountyTally {
                name: "Clark".into(),
                dem: 600,
                rep: 400,
                other: 0,
                total: 2000,
            },
        );
        let itemized = AggregationPolicy {
            denominator: Denominator::Itemized,
            ..AggregationPolicy::default()
        };
        let by_total = build(&returns, &mut ParkMiller::default(), &AggregationPolicy::default());
        let by_items = build(&returns, &mut ParkMiller::default(), &itemized);

        let clark = |out: &PresidentialOutput| out.states[&st("NV")].year(2012).unwrap().counties["32003"].clone();
        assert_eq!(clark(&by_total).dem_pct, Some(30.0));
        assert_eq!(clark(&by_items).dem_pct, Some(60.0));
        let nv = by_items.national.year(2012).unwrap().state(st("NV")).unwrap();
        assert_eq!(nv.dem_pct, Some(60.0));
        assert_eq!(nv.margin, 20.0);
    }

    #[test]
    fn test_run_missing_input_errors() {
        let input = scratch_dir("prep-presidential-missing");
        let config = Config::default().with_data_root(input.join("out"));
        assert!(run(&input, &config).is_err());
    }
}
