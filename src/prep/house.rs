//! House results from a candidate-level CSV (one row per candidate per district).

use super::csv::CsvTable;
use crate::config::Config;
use crate::data::{read_json, write_json};
use crate::election::aggregate::{derive_result, filter_candidates, AggregationPolicy, Tally};
use crate::election::{NationalFile, NationalSummary, NationalYear, Party, RaceType};
use crate::error::{DataError, Result};
use crate::geo::{DistrictId, StateCode};
use std::collections::BTreeMap;
use std::path::Path;

/// Raw rows of one district, in source order
#[derive(Debug, Default)]
struct DistrictRows {
    abbr: String,
    /// District number as written in the source
    district: String,
    total_votes: u64,
    tallies: Vec<Tally>,
}

/// Group rows by district. The race total comes from the district's first row.
fn group_rows(table: &CsvTable) -> Result<BTreeMap<DistrictId, DistrictRows>> {
    let state_col = table.column("state_po")?;
    let fips_col = table.column("state_fips")?;
    let district_col = table.column("district")?;
    let candidate_col = table.column("candidate")?;
    let party_col = table.column("party")?;
    let votes_col = table.column("candidatevotes")?;
    let total_col = table.column("totalvotes")?;
    let writein_col = table.column("writein")?;

    let mut districts: BTreeMap<DistrictId, DistrictRows> = BTreeMap::new();
    for row in table.rows() {
        let state = StateCode::from_fips(row.get(fips_col))
            .or_else(|| StateCode::from_abbr(row.get(state_col)))
            .ok_or_else(|| DataError::UnknownState(row.get(fips_col).to_string()))?;
        let number: u8 = row
            .get(district_col)
            .parse()
            .map_err(|_| row.bad_cell(district_col))?;
        let id = DistrictId::new(state, number);

        let entry = districts.entry(id).or_insert_with(|| DistrictRows {
            abbr: state.abbr().to_string(),
            district: row.get(district_col).to_string(),
            ..DistrictRows::default()
        });
        if entry.tallies.is_empty() && entry.total_votes == 0 {
            entry.total_votes = row.count(total_col)?;
        }

        let mut tally = Tally::new(
            row.get(candidate_col),
            Party::parse(row.get(party_col)),
            row.count(votes_col)?,
        );
        tally.write_in = row.get(writein_col).eq_ignore_ascii_case("TRUE");
        entry.tallies.push(tally);
    }
    Ok(districts)
}

/// District results and seat counts for one year
pub fn build_year(table: &CsvTable, policy: &AggregationPolicy) -> Result<NationalYear> {
    let mut year = NationalYear::default();
    let mut summary = NationalSummary::default();

    for (id, rows) in group_rows(table)? {
        let tallies = filter_candidates(rows.tallies, policy);
        let Some(mut result) = derive_result(&tallies, rows.total_votes, policy) else {
            log::warn!("{}: no candidates left after filtering", id.label());
            continue;
        };
        result.state = Some(rows.abbr);
        result.district = Some(rows.district);
        summary.record(&result);
        year.districts.insert(id.code(), result);
    }

    log::info!(
        "{} districts: {} D, {} R, {} other",
        summary.total_seats,
        summary.dem_seats,
        summary.rep_seats,
        summary.other_seats
    );
    year.summary = Some(summary);
    Ok(year)
}

/// `prep house`: add one year to `results/house/national.json`, keeping the
/// years already there
pub fn run(csv: &Path, year: u16, config: &Config) -> Result<NationalYear> {
    let table = CsvTable::read(csv)?;
    let data = build_year(&table, &config.policy)?;

    let path = config.national_path(RaceType::House);
    let mut file: NationalFile = if path.exists() {
        read_json(&path)?
    } else {
        NationalFile::default()
    };
    file.insert(year, data.clone());
    write_json(&path, &file)?;
    log::info!("wrote {year} to {}", path.display());
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::scratch_dir;
    use crate::election::Winner;
    use std::fs;

    const HEADER: &str = "year,state,state_po,state_fips,district,candidate,party,writein,candidatevotes,totalvotes";

    fn table(rows: &[&str]) -> CsvTable {
        let text = std::iter::once(HEADER).chain(rows.iter().copied()).collect::<Vec<_>>().join("\n");
        CsvTable::parse(Path::new("house.csv"), &text)
    }

    #[test]
    fn test_districts_and_summary() {
        let t = table(&[
            "2024,NEVADA,NV,32,1,DINA TITUS,DEMOCRAT,FALSE,191304,354000",
            "2024,NEVADA,NV,32,1,MARK ROBERTSON,REPUBLICAN,FALSE,162755,354000",
            r#"2024,NEVADA,NV,32,1,"SMITH, JR.",,TRUE,12,354000"#,
            "2024,NEVADA,NV,32,2,MARK AMODEI,REPUBLICAN,FALSE,240000,400000",
            "2024,NEVADA,NV,32,2,GREG KIDD,INDEPENDENT,FALSE,150000,400000",
            "2024,NEVADA,NV,32,2,WRITEIN,,TRUE,5000,400000",
            "2024,WYOMING,WY,56,0,HARRIET HAGEMAN,REPUBLICAN,FALSE,200000,270000",
            "2024,WYOMING,WY,56,0,UNDERVOTES,,FALSE,3000,270000",
            "2024,WYOMING,WY,56,0,KYLE CIER,DEMOCRAT,FALSE,60000,270000",
        ]);
        let year = build_year(&t, &AggregationPolicy::default()).unwrap();
        assert_eq!(year.districts.len(), 3);

        let nv1 = &year.districts["3201"];
        assert_eq!(nv1.winner, Some(Winner::Dem));
        assert_eq!(nv1.state.as_deref(), Some("NV"));
        assert_eq!(nv1.district.as_deref(), Some("1"));
        assert_eq!(nv1.total_votes, 354_000);
        assert!(nv1.other_candidates.is_empty());

        // Independent runner-up sets the margin; the generic write-in is dropped
        let nv2 = &year.districts["3202"];
        assert_eq!(nv2.winner, Some(Winner::Rep));
        assert_eq!(nv2.margin, -22.5);
        assert_eq!(nv2.other_candidates.len(), 1);
        assert_eq!(nv2.other_candidates[0].party, Party::Ind);
        assert_eq!(nv2.other_votes, 150_000);

        let wy = &year.districts["5600"];
        assert_eq!(wy.dem_candidate.as_deref(), Some("KYLE CIER"));

        let summary = year.summary.unwrap();
        assert_eq!(summary.total_seats, 3);
        assert_eq!(summary.dem_seats, 1);
        assert_eq!(summary.rep_seats, 2);
    }

    #[test]
    fn test_bad_district_cell() {
        let t = table(&["2024,NEVADA,NV,32,at-large,X,DEMOCRAT,FALSE,1,1"]);
        assert!(matches!(
            build_year(&t, &AggregationPolicy::default()),
            Err(DataError::BadCell { .. })
        ));
    }

    #[test]
    fn test_run_keeps_other_years() {
        let dir = scratch_dir("prep-house");
        let config = Config::default().with_data_root(dir.join("data"));
        let csv = dir.join("house.csv");
        fs::write(
            &csv,
            format!("{HEADER}\n2022,NEVADA,NV,32,3,SUSIE LEE,DEMOCRAT,FALSE,131086,251000\n"),
        )
        .unwrap();
        run(&csv, 2022, &config).unwrap();
        run(&csv, 2024, &config).unwrap();

        let file: NationalFile = read_json(&config.national_path(RaceType::House)).unwrap();
        assert!(file.year(2022).is_some());
        let nv3 = file.year(2024).unwrap().district(DistrictId::parse("NV03").unwrap()).unwrap();
        assert_eq!(nv3.dem_votes, 131_086);
    }
}
