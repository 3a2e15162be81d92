use std::collections::HashMap;
use twx_core::weather::StationObservations;

/// Per-station weather observations, memoized for the session.
///
/// Append-only: a station's entry is written once and never replaced or
/// evicted, so a re-selected station never triggers another fetch.
#[derive(Debug, Default)]
pub struct WeatherCache {
    stations: HashMap<String, StationObservations>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, station: &str) -> Option<&StationObservations> {
        self.stations.get(station)
    }

    pub fn contains(&self, station: &str) -> bool {
        self.stations.contains_key(station)
    }

    /// Store `observations` unless the station is already cached.
    ///
    /// Returns `true` if the entry was added.
    pub fn insert(&mut self, observations: StationObservations) -> bool {
        if self.stations.contains_key(&observations.station_id) {
            log::debug!(
                "[TWX] cache: station {} already cached, keeping first result",
                observations.station_id
            );
            return false;
        }
        log::info!(
            "[TWX] cache: cached station {} ({} rows)",
            observations.station_id,
            observations.observations.len()
        );
        self.stations
            .insert(observations.station_id.clone(), observations);
        true
    }

    /// Numeric attributes of a cached station; empty if it is not loaded.
    pub fn attributes_available(&self, station: &str) -> Vec<String> {
        self.stations
            .get(station)
            .map(StationObservations::attributes_available)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
