//! County breakdowns of House districts from per-county candidate votes.

use crate::config::Config;
use crate::data::{read_json, write_json};
use crate::election::aggregate::round2;
use crate::election::{
    CandidateResult, CountyBreakdown, DeclaredCandidate, DistrictBreakdown, DistrictCountyFile, Winner,
};
use crate::error::{DataError, Result};
use crate::geo::{DistrictId, StateCode};
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::Path;

/// Votes per candidate name in one county
#[derive(Debug, Deserialize)]
pub struct CountyVotes {
    pub votes: BTreeMap<String, u64>,
}

#[derive(Debug, Deserialize)]
pub struct DistrictInput {
    pub candidates: Vec<DeclaredCandidate>,
    pub counties: BTreeMap<String, CountyVotes>,
}

/// year → district ("NV01" or "3201") → input
pub type BreakdownInput = BTreeMap<String, BTreeMap<String, DistrictInput>>;

/// One county's slice of a district. Declared order breaks ties; candidates
/// missing from the county count as zero.
pub fn county_breakdown(candidates: &[DeclaredCandidate], county: &CountyVotes) -> CountyBreakdown {
    let total: u64 = county.votes.values().sum();
    let votes_for = |c: &DeclaredCandidate| county.votes.get(&c.name).copied().unwrap_or(0);

    let mut leader: Option<&DeclaredCandidate> = None;
    let mut best = 0;
    for c in candidates {
        let v = votes_for(c);
        if v > best {
            best = v;
            leader = Some(c);
        }
    }

    let pct = |v: u64| if total > 0 { v as f64 / total as f64 * 100.0 } else { 0.0 };
    let mut ranked: Vec<(&DeclaredCandidate, u64)> = candidates.iter().map(|c| (c, votes_for(c))).collect();
    ranked.sort_by_key(|&(_, v)| Reverse(v));

    let gap = match ranked.as_slice() {
        [first, second, ..] => pct(first.1) - pct(second.1),
        [only] => pct(only.1),
        [] => 0.0,
    };
    let winner = leader.map_or(Winner::Oth, |c| c.party.winner());
    let margin = if winner == Winner::Dem { gap } else { -gap };

    CountyBreakdown {
        total_votes: total,
        winner,
        winner_name: leader.map(|c| c.name.clone()),
        margin: round2(margin),
        candidates: ranked
            .iter()
            .map(|&(c, v)| CandidateResult {
                name: c.name.clone(),
                party: c.party.clone(),
                votes: v,
                pct: round2(pct(v)),
                is_winner: leader.is_some_and(|l| l.name == c.name),
            })
            .collect(),
    }
}

/// Breakdown files grouped by state, district keys normalized to FIPS form
pub fn build(input: &BreakdownInput) -> Result<BTreeMap<StateCode, DistrictCountyFile>> {
    let mut files: BTreeMap<StateCode, DistrictCountyFile> = BTreeMap::new();
    for (year, districts) in input {
        for (key, district) in districts {
            let id = DistrictId::parse(key).ok_or_else(|| DataError::UnknownState(key.clone()))?;
            let breakdown = DistrictBreakdown {
                candidates: district.candidates.clone(),
                counties: district
                    .counties
                    .iter()
                    .map(|(name, votes)| (name.clone(), county_breakdown(&district.candidates, votes)))
                    .collect(),
            };
            files
                .entry(id.state)
                .or_default()
                .0
                .entry(year.clone())
                .or_default()
                .insert(id.code(), breakdown);
        }
    }
    Ok(files)
}

/// `prep district-counties`: write `results/house/{st}-county-results.json`
/// for every state in the input
pub fn run(input_path: &Path, config: &Config) -> Result<usize> {
    let input: BreakdownInput = read_json(input_path)?;
    let files = build(&input)?;
    for (state, file) in &files {
        let path = config.district_counties_path(state.abbr());
        write_json(&path, file)?;
        log::info!("wrote {}", path.display());
    }
    Ok(files.len())
}
