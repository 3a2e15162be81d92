//! Interaction state shared by the map and the chart.
//!
//! Mutation happens only through the named operations below. None of them
//! recomputes anything; the caller decides when to re-derive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use twx_utils::names::region_key;

/// One togglable metric overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Arrivals,
    Overnights,
    AverageStay,
    Beds,
    Weather,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Arrivals,
        Layer::Overnights,
        Layer::AverageStay,
        Layer::Beds,
        Layer::Weather,
    ];
}

impl FromStr for Layer {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "arrivals" => Ok(Layer::Arrivals),
            "overnights" | "overnight_stays" => Ok(Layer::Overnights),
            "average_stay" | "avg_stay" => Ok(Layer::AverageStay),
            "beds" => Ok(Layer::Beds),
            "weather" => Ok(Layer::Weather),
            other => Err(StateError::UnknownLayer(other.to_string())),
        }
    }
}

/// Rejected state transitions. The state is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    NoActiveStation,
    UnknownAttribute(String),
    UnknownCountry(String),
    UnknownLayer(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::NoActiveStation => write!(f, "no weather station is active"),
            StateError::UnknownAttribute(a) => write!(f, "unknown weather attribute '{}'", a),
            StateError::UnknownCountry(c) => write!(f, "unknown country '{}'", c),
            StateError::UnknownLayer(l) => write!(f, "unknown layer '{}'", l),
        }
    }
}

impl std::error::Error for StateError {}

/// Outcome of [`InteractionState::select_station`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationChange {
    /// A station became active; `generation` identifies this selection.
    Selected { station: String, generation: u64 },
    /// The already active station was selected again and is now inactive.
    Deselected,
}

/// Mutable interaction state of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionState {
    /// Selected region names in insertion order, trimmed.
    selected_regions: Vec<String>,
    active_country: String,
    enabled_layers: BTreeSet<Layer>,
    active_station: Option<String>,
    active_attribute: Option<String>,
    /// Bumped on every station selection change; stale fetches compare against it.
    station_generation: u64,
}

impl InteractionState {
    /// Empty selection, arrivals and overnights enabled, no station.
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            selected_regions: Vec::new(),
            active_country: country.into(),
            enabled_layers: BTreeSet::from([Layer::Arrivals, Layer::Overnights]),
            active_station: None,
            active_attribute: None,
            station_generation: 0,
        }
    }

    // ───────────────────── Regions ─────────────────────

    pub fn selected_regions(&self) -> &[String] {
        &self.selected_regions
    }

    pub fn is_selected(&self, name: &str) -> bool {
        let key = region_key(name);
        self.selected_regions.iter().any(|r| region_key(r) == key)
    }

    /// Flip membership of `name`. Returns `true` if the region is now selected.
    ///
    /// Names are compared by region key, so `"Bled "` toggles off `"bled"`.
    /// Unknown names are accepted.
    pub fn toggle_region(&mut self, name: &str) -> bool {
        let key = region_key(name);
        match self.selected_regions.iter().position(|r| region_key(r) == key) {
            Some(idx) => {
                self.selected_regions.remove(idx);
                false
            }
            None => {
                self.selected_regions.push(name.trim().to_string());
                true
            }
        }
    }

    /// Returns `true` if anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let changed = !self.selected_regions.is_empty();
        self.selected_regions.clear();
        changed
    }

    // ───────────────────── Country ─────────────────────

    pub fn active_country(&self) -> &str {
        &self.active_country
    }

    /// Replace the active country. Returns `true` if it changed.
    ///
    /// The caller guarantees `name` is a discovered country.
    pub fn set_country(&mut self, name: &str) -> bool {
        if self.active_country == name {
            return false;
        }
        self.active_country = name.to_string();
        true
    }

    // ───────────────────── Layers ─────────────────────

    pub fn enabled_layers(&self) -> &BTreeSet<Layer> {
        &self.enabled_layers
    }

    pub fn is_layer_enabled(&self, layer: Layer) -> bool {
        self.enabled_layers.contains(&layer)
    }

    /// Returns `true` if the layer set changed.
    pub fn set_layer_enabled(&mut self, layer: Layer, enabled: bool) -> bool {
        if enabled {
            self.enabled_layers.insert(layer)
        } else {
            self.enabled_layers.remove(&layer)
        }
    }

    // ───────────────────── Weather ─────────────────────

    pub fn active_station(&self) -> Option<&str> {
        self.active_station.as_deref()
    }

    pub fn active_attribute(&self) -> Option<&str> {
        self.active_attribute.as_deref()
    }

    pub fn station_generation(&self) -> u64 {
        self.station_generation
    }

    /// Select `station`, or deselect it if it is already the active one.
    pub fn select_station(&mut self, station: &str) -> StationChange {
        if self.active_station.as_deref() == Some(station) {
            self.deselect_station();
            return StationChange::Deselected;
        }
        self.active_station = Some(station.to_string());
        self.active_attribute = None;
        self.station_generation += 1;
        StationChange::Selected {
            station: station.to_string(),
            generation: self.station_generation,
        }
    }

    /// Clear the active station and attribute. Returns `true` if a station was active.
    pub fn deselect_station(&mut self) -> bool {
        if self.active_station.is_none() {
            return false;
        }
        self.active_station = None;
        self.active_attribute = None;
        self.station_generation += 1;
        true
    }

    /// True if `generation` still identifies the current selection of `station`.
    pub fn is_current_station(&self, station: &str, generation: u64) -> bool {
        self.active_station.as_deref() == Some(station) && self.station_generation == generation
    }

    /// Set the active attribute; it must be one of `available` for the active station.
    pub fn set_attribute(&mut self, name: &str, available: &[String]) -> Result<bool, StateError> {
        if self.active_station.is_none() {
            return Err(StateError::NoActiveStation);
        }
        if !available.iter().any(|a| a == name) {
            return Err(StateError::UnknownAttribute(name.to_string()));
        }
        if self.active_attribute.as_deref() == Some(name) {
            return Ok(false);
        }
        self.active_attribute = Some(name.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_region_keeps_insertion_order() {
        let mut state = InteractionState::new("Total");
        assert!(state.toggle_region("Bled"));
        assert!(state.toggle_region("Ajdovščina "));
        assert!(state.toggle_region("Piran"));
        assert_eq!(state.selected_regions(), &["Bled", "Ajdovščina", "Piran"]);

        assert!(!state.toggle_region("BLED"));
        assert!(state.toggle_region("bled"));
        assert_eq!(state.selected_regions(), &["Ajdovščina", "Piran", "bled"]);
        assert!(state.is_selected("ajdovščina"));
    }

    #[test]
    fn test_set_country_reports_change() {
        let mut state = InteractionState::new("Total");
        assert!(!state.set_country("Total"));
        assert!(state.set_country("Germany"));
        assert_eq!(state.active_country(), "Germany");
    }

    #[test]
    fn test_layers() {
        let mut state = InteractionState::new("Total");
        assert!(state.is_layer_enabled(Layer::Arrivals));
        assert!(state.set_layer_enabled(Layer::Beds, true));
        assert!(!state.set_layer_enabled(Layer::Beds, true));
        assert!(state.set_layer_enabled(Layer::Arrivals, false));
        assert!(!state.is_layer_enabled(Layer::Arrivals));
        assert_eq!("average-stay".parse::<Layer>().unwrap(), Layer::AverageStay);
        assert!("rainbow".parse::<Layer>().is_err());
    }

    #[test]
    fn test_select_station_toggles() {
        let mut state = InteractionState::new("Total");
        let first = state.select_station("LJ");
        assert_eq!(
            first,
            StationChange::Selected {
                station: "LJ".to_string(),
                generation: 1
            }
        );
        assert_eq!(state.select_station("LJ"), StationChange::Deselected);
        assert_eq!(state.active_station(), None);
        assert_eq!(state.station_generation(), 2);
    }

    #[test]
    fn test_generation_detects_superseded_selection() {
        let mut state = InteractionState::new("Total");
        let StationChange::Selected { generation: g1, .. } = state.select_station("S1") else {
            panic!("expected selection");
        };
        let StationChange::Selected { generation: g2, .. } = state.select_station("S2") else {
            panic!("expected selection");
        };
        assert!(!state.is_current_station("S1", g1));
        assert!(state.is_current_station("S2", g2));
    }

    #[test]
    fn test_set_attribute_preconditions() {
        let mut state = InteractionState::new("Total");
        let available = vec!["tavg".to_string()];
        assert_eq!(
            state.set_attribute("tavg", &available),
            Err(StateError::NoActiveStation)
        );

        state.select_station("LJ");
        assert_eq!(
            state.set_attribute("station", &available),
            Err(StateError::UnknownAttribute("station".to_string()))
        );
        assert_eq!(state.active_attribute(), None);
        assert_eq!(state.set_attribute("tavg", &available), Ok(true));
        assert_eq!(state.active_attribute(), Some("tavg"));

        state.deselect_station();
        assert_eq!(state.active_attribute(), None);
    }
}
