//! Loaded files, keyed by what was asked for. Entries live for the session.

use crate::election::{DistrictCountyFile, NationalFile, RaceType, StateFile};
use crate::geo::StateCode;
use crate::map::DotLayer;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheScope {
    National,
    State(StateCode),
    /// House county breakdown for every district of one state
    DistrictCounties(StateCode),
    CountyDots,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub race: RaceType,
    pub scope: CacheScope,
}

impl CacheKey {
    pub fn national(race: RaceType) -> Self {
        Self { race, scope: CacheScope::National }
    }

    pub fn state(race: RaceType, state: StateCode) -> Self {
        Self { race, scope: CacheScope::State(state) }
    }

    pub fn district_counties(state: StateCode) -> Self {
        Self {
            race: RaceType::House,
            scope: CacheScope::DistrictCounties(state),
        }
    }

    pub fn county_dots() -> Self {
        Self {
            race: RaceType::President,
            scope: CacheScope::CountyDots,
        }
    }
}

/// A parsed file, shared between the cache and whoever is drawing it
#[derive(Clone)]
pub enum Payload {
    National(Arc<NationalFile>),
    State(Arc<StateFile>),
    DistrictCounties(Arc<DistrictCountyFile>),
    CountyDots(Arc<DotLayer>),
}

#[derive(Default)]
pub struct ResultCache {
    entries: HashMap<CacheKey, Payload>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&Payload> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: CacheKey, payload: Payload) {
        self.entries.insert(key, payload);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_distinguish_race_and_state() {
        let nv = StateCode::from_abbr("NV").unwrap();
        let az = StateCode::from_abbr("AZ").unwrap();
        let mut cache = ResultCache::new();
        cache.insert(
            CacheKey::state(RaceType::Senate, nv),
            Payload::State(Arc::new(StateFile::default())),
        );
        assert!(cache.contains(&CacheKey::state(RaceType::Senate, nv)));
        assert!(!cache.contains(&CacheKey::state(RaceType::Governor, nv)));
        assert!(!cache.contains(&CacheKey::state(RaceType::Senate, az)));
        assert_eq!(cache.len(), 1);
    }
}
