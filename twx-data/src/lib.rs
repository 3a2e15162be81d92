//! Coordinated selection-and-aggregation engine.
//!
//! This crate turns the raw tables held by [`twx_db::Database`] plus the
//! current [`state::InteractionState`] into the datasets a chart draws:
//!
//! - `state`: selected regions, country, layers, weather station/attribute
//! - `aggregation`: tourism, bed and weather series derived from scratch on every call
//! - `range`: brush summaries over a contiguous bucket range
//! - `palette`: stable colour per region
//! - `models`: serializable derived outputs

pub mod aggregation;
pub mod models;
pub mod palette;
pub mod range;
pub mod state;
