//! Session coordination for the tourism/weather engine.
//!
//! A [`session::Session`] owns the raw data store, the interaction state and
//! the [`weather_cache::WeatherCache`]. Interaction handlers call its named
//! operations, which mark it dirty; [`session::Session::refresh`] recomputes
//! the derived view once and hands it to subscribers.

pub mod session;
pub mod weather_cache;

pub use session::{FetchTicket, Session};
pub use weather_cache::WeatherCache;
