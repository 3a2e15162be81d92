//! Single-threaded session coordinator.
//!
//! Every mutating operation only updates state and marks the session dirty.
//! [`Session::refresh`] is the one place that recomputes, so a derived view
//! always reflects the complete state as of the last mutation.

use crate::weather_cache::WeatherCache;
use anyhow::bail;
use serde::Serialize;
use twx_core::bucket::TimeBucket;
use twx_core::weather::StationObservations;
use twx_data::aggregation::{bucket_domain, derive_view};
use twx_data::models::{DerivedView, RangeSummary};
use twx_data::range::{bucket_range, summarize_range};
use twx_data::state::{InteractionState, Layer, StateError, StationChange};
use twx_db::Database;

/// Identifies one pending station fetch.
///
/// Handed out by [`Session::select_station`] and passed back to
/// [`Session::complete_station_fetch`] with the fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub station: String,
    pub generation: u64,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FetchOutcome {
    /// Cached and activated for the current station.
    Committed,
    /// Failed for the current station; weather stays empty.
    Failed,
    /// The selection moved on, or this ticket already settled; ignored.
    Discarded,
}

type Subscriber = Box<dyn FnMut(&DerivedView)>;

pub struct Session {
    db: Database,
    state: InteractionState,
    cache: WeatherCache,
    view: Option<DerivedView>,
    dirty: bool,
    /// Generation whose fetch has already committed or failed.
    settled_generation: Option<u64>,
    subscribers: Vec<Subscriber>,
}

impl Session {
    /// Start a session on a loaded database, with the first discovered
    /// country active.
    pub fn new(db: Database) -> anyhow::Result<Self> {
        let countries = db.query_countries()?;
        let Some(country) = countries.first() else {
            bail!("tourism data has no country columns");
        };
        log::info!(
            "[TWX] session: started with {} countries, active '{}'",
            countries.len(),
            country
        );
        Ok(Self {
            state: InteractionState::new(country.as_str()),
            db,
            cache: WeatherCache::new(),
            view: None,
            dirty: true,
            settled_generation: None,
            subscribers: Vec::new(),
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark(&mut self, changed: bool) -> bool {
        self.dirty |= changed;
        changed
    }

    // ───────────────────── Interaction ─────────────────────

    pub fn toggle_region(&mut self, name: &str) -> bool {
        self.state.toggle_region(name);
        self.mark(true)
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.state.clear_selection();
        self.mark(changed)
    }

    /// Switch the active country; it must be one discovered in the tourism headers.
    pub fn set_country(&mut self, name: &str) -> anyhow::Result<bool> {
        if !self.db.query_countries()?.iter().any(|c| c == name) {
            return Err(StateError::UnknownCountry(name.to_string()).into());
        }
        let changed = self.state.set_country(name);
        Ok(self.mark(changed))
    }

    pub fn set_layer_enabled(&mut self, layer: Layer, enabled: bool) -> bool {
        let changed = self.state.set_layer_enabled(layer, enabled);
        self.mark(changed)
    }

    /// Set the active weather attribute of the active station.
    ///
    /// Fails while the station's observations are not loaded, since no
    /// attribute has been discovered yet.
    pub fn set_attribute(&mut self, name: &str) -> Result<bool, StateError> {
        let available = self
            .state
            .active_station()
            .map(|s| self.cache.attributes_available(s))
            .unwrap_or_default();
        let changed = self.state.set_attribute(name, &available)?;
        Ok(self.mark(changed))
    }

    /// Select a station, or deselect it if it is already active.
    ///
    /// Returns a ticket when the station's observations must be fetched.
    /// A cached station is activated immediately with its first attribute.
    pub fn select_station(&mut self, station: &str) -> Option<FetchTicket> {
        self.dirty = true;
        match self.state.select_station(station) {
            StationChange::Deselected => {
                log::debug!("[TWX] session: station {} deselected", station);
                None
            }
            StationChange::Selected {
                station,
                generation,
            } => {
                if self.cache.contains(&station) {
                    self.activate_first_attribute(&station);
                    None
                } else {
                    log::info!(
                        "[TWX] session: fetching station {} (generation {})",
                        station,
                        generation
                    );
                    Some(FetchTicket {
                        station,
                        generation,
                    })
                }
            }
        }
    }

    pub fn deselect_station(&mut self) -> bool {
        let changed = self.state.deselect_station();
        self.mark(changed)
    }

    fn activate_first_attribute(&mut self, station: &str) {
        let available = self.cache.attributes_available(station);
        let Some(first) = available.first() else {
            return;
        };
        if let Err(e) = self.state.set_attribute(first, &available) {
            log::debug!(
                "[TWX] session: could not activate '{}' for station {}: {}",
                first,
                station,
                e
            );
        }
    }

    /// Deliver the result of the fetch identified by `ticket`.
    ///
    /// Never returns an error: failures are reported on the log and leave the
    /// station active with no attribute and no weather series. Results of a
    /// superseded selection are dropped without touching the cache, and a
    /// ticket settles at most once.
    pub fn complete_station_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: anyhow::Result<StationObservations>,
    ) -> FetchOutcome {
        let current = self
            .state
            .is_current_station(&ticket.station, ticket.generation);
        if !current || self.settled_generation == Some(ticket.generation) {
            log::debug!(
                "[TWX] session: result for station {} (generation {}) discarded",
                ticket.station,
                ticket.generation
            );
            return FetchOutcome::Discarded;
        }
        self.settled_generation = Some(ticket.generation);
        self.dirty = true;

        match result {
            Ok(observations) => {
                self.cache.insert(observations);
                if self.state.active_attribute().is_none() {
                    self.activate_first_attribute(&ticket.station);
                }
                FetchOutcome::Committed
            }
            Err(e) => {
                log::warn!(
                    "[TWX] session: failed to load weather for station {}: {:#}",
                    ticket.station,
                    e
                );
                FetchOutcome::Failed
            }
        }
    }

    /// Parse a fetched station CSV and deliver it with [`Self::complete_station_fetch`].
    pub fn complete_station_csv(
        &mut self,
        ticket: &FetchTicket,
        body: anyhow::Result<String>,
    ) -> FetchOutcome {
        let parsed = body.and_then(|csv| StationObservations::parse_csv(&ticket.station, &csv));
        self.complete_station_fetch(ticket, parsed)
    }

    // ───────────────────── Recompute ─────────────────────

    /// Register an observer called with every freshly derived view.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&DerivedView) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Recompute the derived view if anything changed since the last refresh.
    ///
    /// Returns the new view, or `None` when the session was clean.
    pub fn refresh(&mut self) -> anyhow::Result<Option<&DerivedView>> {
        if !self.dirty {
            return Ok(None);
        }
        let station = self
            .state
            .active_station()
            .and_then(|s| self.cache.get(s));
        let view = derive_view(&self.db, &self.state, station)?;
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&view);
        }
        self.dirty = false;
        Ok(Some(&*self.view.insert(view)))
    }

    /// Current derived view, refreshing first if needed.
    pub fn view(&mut self) -> anyhow::Result<&DerivedView> {
        self.refresh()?;
        match self.view.as_ref() {
            Some(view) => Ok(view),
            None => bail!("derived view unavailable"),
        }
    }

    /// Buckets of the current domain between two labels, inclusive.
    pub fn brush_buckets(&self, from: &TimeBucket, to: &TimeBucket) -> anyhow::Result<Vec<TimeBucket>> {
        let domain = bucket_domain(&self.db)?;
        Ok(bucket_range(&domain, from, to))
    }

    /// Summarize the current view over `buckets`; `None` for an empty range.
    pub fn range_summary(
        &mut self,
        buckets: &[TimeBucket],
    ) -> anyhow::Result<Option<Vec<RangeSummary>>> {
        let view = self.view()?;
        Ok(summarize_range(buckets, &view.tourism, &view.beds))
    }
}
