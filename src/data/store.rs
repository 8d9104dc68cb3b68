//! Background loading of result files into the session cache.
//!
//! Loads run on the rayon pool and report back over a channel that the UI
//! thread drains once per frame. Every response is cached, but a slot only
//! switches to it when it answers the newest request for that slot.

use super::cache::{CacheKey, CacheScope, Payload, ResultCache};
use super::{load_county_dots, read_json};
use crate::config::Config;
use crate::election::{DistrictCountyFile, NationalFile, NationalYear, RaceType, StateFile, StateYear};
use crate::error::Result;
use crate::geo::StateCode;
use crate::map::DotLayer;
use crate::nav::{Effect, LoadSlot, RequestTracker};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Completed load, sent from a worker back to the UI thread
pub struct LoadResponse {
    pub slot: LoadSlot,
    pub generation: u64,
    pub key: CacheKey,
    pub result: Result<Payload>,
}

pub struct DataStore {
    config: Config,
    cache: ResultCache,
    tracker: RequestTracker,
    /// Keys with a worker running, and the newest request waiting on each
    in_flight: HashMap<CacheKey, (LoadSlot, u64)>,
    /// What each slot currently shows
    committed: HashMap<LoadSlot, CacheKey>,
    tx: Sender<LoadResponse>,
    rx: Receiver<LoadResponse>,
}

/// Slot and cache key a navigation effect loads into
pub fn effect_target(effect: Effect) -> (LoadSlot, CacheKey) {
    match effect {
        Effect::LoadNational(race) => (LoadSlot::National, CacheKey::national(race)),
        Effect::LoadState(race, state) => (LoadSlot::State, CacheKey::state(race, state)),
        Effect::LoadDistrictCounties(district) => (
            LoadSlot::DistrictCounties,
            CacheKey::district_counties(district.state),
        ),
    }
}

fn load(path: PathBuf, scope: CacheScope) -> Result<Payload> {
    Ok(match scope {
        CacheScope::National => Payload::National(Arc::new(read_json::<NationalFile>(&path)?)),
        CacheScope::State(_) => Payload::State(Arc::new(read_json::<StateFile>(&path)?)),
        CacheScope::DistrictCounties(_) => {
            Payload::DistrictCounties(Arc::new(read_json::<DistrictCountyFile>(&path)?))
        }
        CacheScope::CountyDots => Payload::CountyDots(Arc::new(DotLayer::new(load_county_dots(&path)?))),
    })
}

impl DataStore {
    pub fn new(config: Config) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            config,
            cache: ResultCache::new(),
            tracker: RequestTracker::default(),
            in_flight: HashMap::new(),
            committed: HashMap::new(),
            tx,
            rx,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn path_for(&self, key: CacheKey) -> PathBuf {
        match key.scope {
            CacheScope::National => self.config.national_path(key.race),
            CacheScope::State(state) => self.config.state_path(key.race, state.abbr()),
            CacheScope::DistrictCounties(state) => self.config.district_counties_path(state.abbr()),
            CacheScope::CountyDots => self.config.county_dots_path(),
        }
    }

    /// Point `slot` at `key`, loading it in the background unless cached
    pub fn request(&mut self, slot: LoadSlot, key: CacheKey) {
        let generation = self.tracker.begin(slot);

        if self.cache.contains(&key) {
            self.committed.insert(slot, key);
            return;
        }

        if let Some(waiting) = self.in_flight.get_mut(&key) {
            log::debug!("{key:?} already loading");
            *waiting = (slot, generation);
            return;
        }

        self.in_flight.insert(key, (slot, generation));
        let path = self.path_for(key);
        let tx = self.tx.clone();
        log::debug!("loading {}", path.display());
        rayon::spawn(move || {
            let result = load(path, key.scope);
            // Receiver gone means the viewer is shutting down
            let _ = tx.send(LoadResponse {
                slot,
                generation,
                key,
                result,
            });
        });
    }

    /// Issue the loads a navigation transition asked for
    pub fn execute(&mut self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            let (slot, key) = effect_target(effect);
            self.request(slot, key);
        }
    }

    /// Drain finished loads; true when anything a slot shows changed
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(response) = self.rx.try_recv() {
            changed |= self.apply(response);
        }
        changed
    }

    fn apply(&mut self, response: LoadResponse) -> bool {
        let LoadResponse {
            slot,
            generation,
            key,
            result,
        } = response;
        // A re-request of the same key while loading moves the generation forward
        let generation = self
            .in_flight
            .remove(&key)
            .map_or(generation, |(_, latest)| latest);

        match result {
            Ok(payload) => {
                self.cache.insert(key, payload);
                if self.tracker.is_current(slot, generation) {
                    self.committed.insert(slot, key);
                    true
                } else {
                    log::debug!("{key:?} arrived after a newer request; cached only");
                    false
                }
            }
            Err(e) => {
                log::warn!("load failed: {e}");
                if self.tracker.is_current(slot, generation) {
                    self.committed.remove(&slot);
                    return true;
                }
                false
            }
        }
    }

    /// Loads still running
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_loading(&self, slot: LoadSlot) -> bool {
        self.in_flight.values().any(|&(s, generation)| s == slot && self.tracker.is_current(s, generation))
    }

    fn committed(&self, slot: LoadSlot, key: CacheKey) -> Option<&Payload> {
        (self.committed.get(&slot) == Some(&key))
            .then(|| self.cache.get(&key))
            .flatten()
    }

    pub fn national(&self, race: RaceType) -> Option<&NationalFile> {
        match self.committed(LoadSlot::National, CacheKey::national(race))? {
            Payload::National(file) => Some(file),
            _ => None,
        }
    }

    pub fn national_year(&self, race: RaceType, year: u16) -> Option<&NationalYear> {
        self.national(race)?.year(year)
    }

    pub fn state(&self, race: RaceType, state: StateCode) -> Option<&StateFile> {
        match self.committed(LoadSlot::State, CacheKey::state(race, state))? {
            Payload::State(file) => Some(file),
            _ => None,
        }
    }

    pub fn state_year(&self, race: RaceType, state: StateCode, year: u16) -> Option<&StateYear> {
        self.state(race, state)?.year(year)
    }

    pub fn district_counties(&self, state: StateCode) -> Option<&DistrictCountyFile> {
        match self.committed(LoadSlot::DistrictCounties, CacheKey::district_counties(state))? {
            Payload::DistrictCounties(file) => Some(file),
            _ => None,
        }
    }

    pub fn county_dots(&self) -> Option<&DotLayer> {
        match self.committed(LoadSlot::CountyDots, CacheKey::county_dots())? {
            Payload::CountyDots(layer) => Some(layer),
            _ => None,
        }
    }

    /// Block until one response arrives
    #[cfg(test)]
    fn wait(&mut self) -> bool {
        let response = self
            .rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("load timed out");
        self.apply(response)
    }
}
