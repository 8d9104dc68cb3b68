//! Turning candidate vote tallies into [`RaceResult`] records.
//!
//! The canonical margin is the gap between the two highest vote-getters,
//! regardless of party, signed so that positive always means a Democratic
//! advantage. Percentages use the race's reported total as the denominator
//! by default, which includes write-ins and blanks that are not itemized.

use super::{CandidateResult, Party, Provenance, RaceResult, Winner};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Candidate rows that are tabulation artifacts rather than people
pub const ARTIFACT_NAMES: [&str; 9] = [
    "TOTAL",
    "BLANK VOTES",
    "UNDER VOTES",
    "OVER VOTES",
    "UNDERVOTES",
    "OVERVOTES",
    "CONTINUING BALLOTS",
    "EXHAUSTED BALLOTS",
    "INACTIVE BALLOTS",
];

/// Name used by sources for an unnamed write-in bucket
pub const GENERIC_WRITE_IN: &str = "WRITEIN";

/// Which vote count percentages are computed against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Denominator {
    /// The race's reported total, including non-itemized ballots
    #[default]
    TotalVotes,
    /// Sum of the itemized candidate rows after filtering
    Itemized,
}

/// Row filtering and display thresholds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregationPolicy {
    /// Named write-ins below this many votes are dropped
    pub write_in_floor: u64,
    /// Minor-party candidates below this many votes are left out of `other_candidates`
    pub minor_party_floor: u64,
    pub denominator: Denominator,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            write_in_floor: 1_000,
            minor_party_floor: 1_000,
            denominator: Denominator::TotalVotes,
        }
    }
}

/// One raw candidate row
#[derive(Clone, Debug, PartialEq)]
pub struct Tally {
    pub name: String,
    pub party: Party,
    pub votes: u64,
    pub write_in: bool,
}

impl Tally {
    pub fn new(name: impl Into<String>, party: Party, votes: u64) -> Self {
        Self {
            name: name.into(),
            party,
            votes,
            write_in: false,
        }
    }
}

/// Exact, case-insensitive match against [`ARTIFACT_NAMES`]
pub fn is_artifact(name: &str) -> bool {
    let upper = name.trim().to_ascii_uppercase();
    ARTIFACT_NAMES.contains(&upper.as_str())
}

/// Whether a raw row survives the filtering policy
pub fn keep_tally(tally: &Tally, policy: &AggregationPolicy) -> bool {
    if is_artifact(&tally.name) {
        return false;
    }
    if tally.write_in
        && (tally.name.trim().eq_ignore_ascii_case(GENERIC_WRITE_IN)
            || tally.votes < policy.write_in_floor)
    {
        return false;
    }
    true
}

pub fn filter_candidates(
    rows: impl IntoIterator<Item = Tally>,
    policy: &AggregationPolicy,
) -> Vec<Tally> {
    rows.into_iter().filter(|t| keep_tally(t, policy)).collect()
}

#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Derive the race record from filtered tallies.
///
/// Returns `None` for an empty candidate list; callers skip such races.
/// Ties on votes go to whichever candidate appears first in `tallies`.
pub fn derive_result(
    tallies: &[Tally],
    total_votes: u64,
    policy: &AggregationPolicy,
) -> Option<RaceResult> {
    if tallies.is_empty() {
        return None;
    }

    let mut ranked: Vec<&Tally> = tallies.iter().collect();
    // sort_by_key is stable: equal vote counts keep source order
    ranked.sort_by_key(|t| Reverse(t.votes));

    let itemized: u64 = tallies.iter().map(|t| t.votes).sum();
    let denom = match policy.denominator {
        Denominator::TotalVotes if total_votes > 0 => total_votes,
        _ => itemized,
    };
    let pct = |votes: u64| {
        if denom == 0 {
            0.0
        } else {
            votes as f64 / denom as f64 * 100.0
        }
    };

    let leader = ranked[0];
    let winner = leader.party.winner();
    let runner_up = ranked.get(1).map(|t| pct(t.votes)).unwrap_or(0.0);
    let gap = pct(leader.votes) - runner_up;
    let margin = if winner == Winner::Dem { gap } else { -gap };

    let dem = ranked.iter().find(|t| t.party == Party::Dem);
    let rep = ranked.iter().find(|t| t.party == Party::Rep);
    let dem_votes = dem.map(|t| t.votes).unwrap_or(0);
    let rep_votes = rep.map(|t| t.votes).unwrap_or(0);

    let other_votes = tallies
        .iter()
        .filter(|t| !t.party.is_major())
        .map(|t| t.votes)
        .sum();

    let other_candidates = ranked
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.party.is_major() && t.votes >= policy.minor_party_floor)
        .map(|(rank, t)| CandidateResult {
            name: t.name.clone(),
            party: t.party.clone(),
            votes: t.votes,
            pct: round2(pct(t.votes)),
            is_winner: rank == 0,
        })
        .collect();

    Some(RaceResult {
        margin: round2(margin),
        winner: Some(winner),
        winner_party: (winner == Winner::Oth).then(|| leader.party.code().to_string()),
        dem_votes,
        rep_votes,
        other_votes,
        total_votes: if total_votes > 0 { total_votes } else { itemized },
        dem_pct: Some(round2(pct(dem_votes))),
        rep_pct: Some(round2(pct(rep_votes))),
        dem_candidate: dem.map(|t| t.name.clone()),
        rep_candidate: rep.map(|t| t.name.clone()),
        other_candidates,
        ..RaceResult::default()
    })
}

/// Record for sources that only report D, R and a lumped "other" count.
///
/// The lumped bucket ranks as one finisher when computing the winner and
/// margin but is never listed in `other_candidates`. `None` when nothing was
/// cast.
pub fn derive_two_way(
    dem_votes: u64,
    rep_votes: u64,
    other_votes: u64,
    total_votes: u64,
    provenance: Provenance,
    policy: &AggregationPolicy,
) -> Option<RaceResult> {
    if total_votes == 0 && dem_votes + rep_votes + other_votes == 0 {
        return None;
    }
    let total = total_votes.max(dem_votes + rep_votes + other_votes);
    let mut tallies = vec![
        Tally::new("", Party::Dem, dem_votes),
        Tally::new("", Party::Rep, rep_votes),
    ];
    if other_votes > 0 {
        tallies.push(Tally::new("", Party::Other(Winner::Oth.code().to_string()), other_votes));
    }
    let mut result = derive_result(&tallies, total, policy)?;
    result.dem_candidate = None;
    result.rep_candidate = None;
    result.other_candidates.clear();
    result.provenance = provenance;
    Some(result)
}

/// Seats and votes won per party, accumulated once per race
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalSummary {
    #[serde(default)]
    pub dem_seats: u32,
    #[serde(default)]
    pub rep_seats: u32,
    #[serde(default)]
    pub other_seats: u32,
    #[serde(default)]
    pub total_seats: u32,
    #[serde(default)]
    pub dem_votes: u64,
    #[serde(default)]
    pub rep_votes: u64,
    #[serde(default)]
    pub other_votes: u64,
}

impl NationalSummary {
    pub fn record(&mut self, result: &RaceResult) {
        self.total_seats += 1;
        match result.winner {
            Some(Winner::Dem) => self.dem_seats += 1,
            Some(Winner::Rep) => self.rep_seats += 1,
            _ => self.other_seats += 1,
        }
        self.dem_votes += result.dem_votes;
        self.rep_votes += result.rep_votes;
        self.other_votes += result.other_votes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_with_floor(floor: u64) -> AggregationPolicy {
        AggregationPolicy {
            minor_party_floor: floor,
            ..AggregationPolicy::default()
        }
    }

    #[test]
    fn test_two_candidate_race() {
        let tallies = [
            Tally::new("Dem", Party::Dem, 600),
            Tally::new("Rep", Party::Rep, 400),
        ];
        let r = derive_result(&tallies, 1000, &AggregationPolicy::default()).unwrap();
        assert_eq!(r.winner, Some(Winner::Dem));
        assert_eq!(r.margin, 20.0);
        assert_eq!(r.dem_pct, Some(60.0));
        assert_eq!(r.rep_pct, Some(40.0));
        assert_eq!(r.other_votes, 0);
        assert!(r.other_candidates.is_empty());
    }

    #[test]
    fn test_two_way_counts() {
        let r = derive_two_way(600, 400, 0, 1000, Provenance::Real, &AggregationPolicy::default()).unwrap();
        assert_eq!(r.winner, Some(Winner::Dem));
        assert_eq!(r.margin, 20.0);
        assert_eq!(r.dem_pct, Some(60.0));
        assert_eq!(r.rep_pct, Some(40.0));
        assert!(derive_two_way(0, 0, 0, 0, Provenance::Real, &AggregationPolicy::default()).is_none());
    }

    #[test]
    fn test_two_way_other_bucket_ranks() {
        // Other beats D, so the margin is R over other
        let r = derive_two_way(100, 500, 300, 900, Provenance::Real, &AggregationPolicy::default()).unwrap();
        assert_eq!(r.winner, Some(Winner::Rep));
        assert_eq!(r.margin, -22.22);
        assert_eq!(r.other_votes, 300);
        assert!(r.other_candidates.is_empty());

        let o = derive_two_way(200, 300, 500, 1000, Provenance::Real, &AggregationPolicy::default()).unwrap();
        assert_eq!(o.winner, Some(Winner::Oth));
        assert_eq!(o.winner_party.as_deref(), Some("OTH"));
        assert_eq!(o.margin, -20.0);
        assert!(o.other_candidates.is_empty());
    }

    #[test]
    fn test_two_way_itemized_denominator() {
        let itemized = AggregationPolicy {
            denominator: Denominator::Itemized,
            ..AggregationPolicy::default()
        };
        let total = derive_two_way(600, 400, 0, 2000, Provenance::Real, &AggregationPolicy::default()).unwrap();
        let items = derive_two_way(600, 400, 0, 2000, Provenance::Real, &itemized).unwrap();
        assert_eq!(total.dem_pct, Some(30.0));
        assert_eq!(items.dem_pct, Some(60.0));
        assert_eq!(items.total_votes, 2000);
    }

    #[test]
    fn test_three_way_minor_floor() {
        let tallies = [
            Tally::new("A", Party::Dem, 500),
            Tally::new("B", Party::Rep, 450),
            Tally::new("C", Party::Ind, 50),
        ];
        let r = derive_result(&tallies, 1000, &policy_with_floor(1000)).unwrap();
        assert_eq!(r.winner, Some(Winner::Dem));
        assert_eq!(r.margin, 5.0);
        assert!(r.other_candidates.is_empty());
        // Excluded from display, still counted
        assert_eq!(r.other_votes, 50);

        let r = derive_result(&tallies, 1000, &policy_with_floor(0)).unwrap();
        assert_eq!(r.other_candidates.len(), 1);
        assert_eq!(r.other_candidates[0].pct, 5.0);
        assert!(!r.other_candidates[0].is_winner);
    }

    #[test]
    fn test_three_way_rep_leader_and_large_minor() {
        let tallies = [
            Tally::new("A", Party::Rep, 5000),
            Tally::new("B", Party::Dem, 4500),
            Tally::new("C", Party::Lib, 1500),
        ];
        let r = derive_result(&tallies, 11000, &policy_with_floor(1000)).unwrap();
        assert_eq!(r.winner, Some(Winner::Rep));
        assert!(r.margin < 0.0);
        assert_eq!(r.margin, round2(-(500.0 / 11000.0 * 100.0)));
        assert_eq!(r.other_candidates.len(), 1);
        assert_eq!(r.other_candidates[0].name, "C");
    }

    #[test]
    fn test_third_party_leader_uses_top_two() {
        let tallies = [
            Tally::new("D", Party::Dem, 300),
            Tally::new("I", Party::Ind, 450),
            Tally::new("R", Party::Rep, 250),
        ];
        let r = derive_result(&tallies, 1000, &AggregationPolicy::default()).unwrap();
        assert_eq!(r.winner, Some(Winner::Oth));
        assert_eq!(r.winner_party.as_deref(), Some("IND"));
        // 45 - 30, not dem_pct - rep_pct
        assert_eq!(r.margin, -15.0);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let tallies = [
            Tally::new("R", Party::Rep, 500),
            Tally::new("D", Party::Dem, 500),
        ];
        let r = derive_result(&tallies, 1000, &AggregationPolicy::default()).unwrap();
        assert_eq!(r.winner, Some(Winner::Rep));
        assert_eq!(r.margin, 0.0);
    }

    #[test]
    fn test_empty_race_is_skipped() {
        assert!(derive_result(&[], 100, &AggregationPolicy::default()).is_none());
    }

    #[test]
    fn test_itemized_denominator() {
        let tallies = [
            Tally::new("D", Party::Dem, 600),
            Tally::new("R", Party::Rep, 400),
        ];
        let policy = AggregationPolicy {
            denominator: Denominator::Itemized,
            ..AggregationPolicy::default()
        };
        let r = derive_result(&tallies, 2000, &policy).unwrap();
        assert_eq!(r.dem_pct, Some(60.0));
        assert_eq!(r.total_votes, 2000);
        let r = derive_result(&tallies, 2000, &AggregationPolicy::default()).unwrap();
        assert_eq!(r.dem_pct, Some(30.0));
        assert_eq!(r.margin, 10.0);
    }

    #[test]
    fn test_row_filtering() {
        let policy = AggregationPolicy::default();
        let mut generic = Tally::new("WRITEIN", Party::default(), 50_000);
        generic.write_in = true;
        let mut small = Tally::new("Jane Doe", Party::default(), 999);
        small.write_in = true;
        let mut large = Tally::new("Lisa Murkowski", Party::Rep, 90_000);
        large.write_in = true;
        let rows = vec![
            generic,
            small,
            large,
            Tally::new("Exhausted Ballots", Party::default(), 12_000),
            Tally::new("over votes", Party::default(), 10),
            Tally::new("Mary Peltola", Party::Dem, 80_000),
        ];
        let kept = filter_candidates(rows, &policy);
        let names: Vec<_> = kept.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Lisa Murkowski", "Mary Peltola"]);
    }

    #[test]
    fn test_artifact_match_is_exact() {
        assert!(is_artifact("Blank Votes"));
        assert!(!is_artifact("Total Recall"));
    }

    #[test]
    fn test_summary_counts_each_race_once() {
        let mut summary = NationalSummary::default();
        let d = derive_two_way(600, 400, 0, 1000, Provenance::Real, &AggregationPolicy::default()).unwrap();
        let r = derive_two_way(300, 700, 0, 1000, Provenance::Real, &AggregationPolicy::default()).unwrap();
        summary.record(&d);
        summary.record(&r);
        summary.record(&r);
        assert_eq!(summary.total_seats, 3);
        assert_eq!(summary.dem_seats, 1);
        assert_eq!(summary.rep_seats, 2);
        assert_eq!(summary.dem_votes, 1200);
    }
}
