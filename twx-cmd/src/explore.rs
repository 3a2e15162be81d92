//! Tourism exploration commands: countries, regions, series, brush.

use crate::source::read_source;
use crate::weather::{attach_station, StationArgs};
use crate::{DataArgs, SelectionArgs};
use anyhow::Context;
use serde::Serialize;
use twx_core::bucket::TimeBucket;
use twx_core::geometry::region_names;
use twx_data::models::{DerivedView, RangeSummary};
use twx_data::state::Layer;
use twx_db::models::RegionInfo;
use twx_db::Database;
use twx_session::session::FetchOutcome;
use twx_session::Session;
use twx_utils::names::region_key;

/// Read the tourism (and optional beds) sources into a new session.
pub async fn load_session(data: &DataArgs) -> anyhow::Result<Session> {
    let db = Database::new()?;
    let tourism = read_source(&data.tourism).await?;
    db.load_tourism(&tourism)
        .with_context(|| format!("failed to load tourism table {}", data.tourism))?;
    if let Some(beds) = data.beds.as_deref() {
        let csv = read_source(beds).await?;
        db.load_beds(&csv)
            .with_context(|| format!("failed to load beds table {}", beds))?;
    }
    Session::new(db)
}

/// Apply country, region and layer arguments in that order.
pub fn apply_selection(session: &mut Session, selection: &SelectionArgs) -> anyhow::Result<()> {
    if let Some(country) = selection.country.as_deref() {
        session.set_country(country)?;
    }
    for region in &selection.regions {
        session.toggle_region(region);
    }
    if !selection.layers.is_empty() {
        for layer in Layer::ALL {
            session.set_layer_enabled(layer, selection.layers.contains(&layer));
        }
    }
    Ok(())
}

pub async fn run_countries(data: &DataArgs) -> anyhow::Result<String> {
    let session = load_session(data).await?;
    let countries = session.db().query_countries()?;
    Ok(serde_json::to_string_pretty(&countries)?)
}

#[derive(Debug, Serialize)]
struct GeometryMatch {
    property: String,
    matched: Vec<String>,
    unmatched: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RegionsReport {
    regions: Vec<RegionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<GeometryMatch>,
}

pub async fn run_regions(data: &DataArgs, geometry: Option<&str>) -> anyhow::Result<String> {
    let session = load_session(data).await?;
    let db = session.db();
    let regions = db.query_regions()?;

    let geometry = match geometry {
        Some(location) => {
            let geojson = read_source(location).await?;
            let names = region_names(&geojson)?;
            let mut matched = Vec::new();
            let mut unmatched = Vec::new();
            for name in names.names {
                if db.query_region(&region_key(&name))?.is_some() {
                    matched.push(name);
                } else {
                    unmatched.push(name);
                }
            }
            log::info!(
                "[TWX] regions: {} geometry names matched, {} unmatched",
                matched.len(),
                unmatched.len()
            );
            Some(GeometryMatch {
                property: names.property,
                matched,
                unmatched,
            })
        }
        None => None,
    };

    Ok(serde_json::to_string_pretty(&RegionsReport { regions, geometry })?)
}

#[derive(Debug, Serialize)]
struct SeriesReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    fetch: Option<FetchOutcome>,
    #[serde(flatten)]
    view: &'a DerivedView,
}

pub async fn run_series(
    data: &DataArgs,
    selection: &SelectionArgs,
    station: &StationArgs,
) -> anyhow::Result<String> {
    let mut session = load_session(data).await?;
    apply_selection(&mut session, selection)?;
    let fetch = attach_station(&mut session, station).await?;
    let view = session.view()?;
    Ok(serde_json::to_string_pretty(&SeriesReport { fetch, view })?)
}

#[derive(Debug, Serialize)]
struct BrushReport {
    buckets: Vec<TimeBucket>,
    /// `null` for an empty range.
    summary: Option<Vec<RangeSummary>>,
}

pub async fn run_brush(
    data: &DataArgs,
    selection: &SelectionArgs,
    from: &str,
    to: &str,
) -> anyhow::Result<String> {
    let from = TimeBucket::parse(from).with_context(|| format!("invalid range start '{}'", from))?;
    let to = TimeBucket::parse(to).with_context(|| format!("invalid range end '{}'", to))?;

    let mut session = load_session(data).await?;
    apply_selection(&mut session, selection)?;
    let buckets = session.brush_buckets(&from, &to)?;
    let summary = session.range_summary(&buckets)?;
    if summary.is_none() {
        log::info!("[TWX] brush: range {}..{} selects no buckets", from, to);
    }
    Ok(serde_json::to_string_pretty(&BrushReport { buckets, summary })?)
}
