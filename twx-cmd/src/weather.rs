//! Weather station commands and station attachment for `series`.

use crate::source::read_source;
use anyhow::anyhow;
use clap::Args;
use serde::Serialize;
use twx_core::weather::StationObservations;
use twx_data::aggregation::derive_weather_series;
use twx_data::models::WeatherPoint;
use twx_data::state::StateError;
use twx_session::session::FetchOutcome;
use twx_session::Session;

/// Optional weather station overlay for `series`.
#[derive(Args, Debug, Clone, Default)]
pub struct StationArgs {
    /// Weather station to select
    #[arg(long)]
    pub station: Option<String>,

    /// Station CSV (path or URL, optionally .gz)
    #[arg(long = "weather", requires = "station")]
    pub weather: Option<String>,

    /// Weather attribute (defaults to the first discovered)
    #[arg(long, requires = "station")]
    pub attribute: Option<String>,
}

/// Select the station on `session` and feed it the fetched observations.
///
/// A failed fetch is not an error: the session keeps the station active
/// without weather, the outcome says so, and a requested attribute is
/// skipped. An unknown attribute of a loaded station is still rejected.
pub async fn attach_station(
    session: &mut Session,
    args: &StationArgs,
) -> anyhow::Result<Option<FetchOutcome>> {
    let Some(station) = args.station.as_deref() else {
        return Ok(None);
    };
    let outcome = match session.select_station(station) {
        Some(ticket) => {
            let body = match args.weather.as_deref() {
                Some(location) => read_source(location).await,
                None => Err(anyhow!("no weather source given for station {}", station)),
            };
            Some(session.complete_station_csv(&ticket, body))
        }
        None => None,
    };
    if let Some(attribute) = args.attribute.as_deref() {
        if session.cache().attributes_available(station).is_empty() {
            log::warn!(
                "[TWX] series: no weather loaded for station {}, ignoring attribute '{}'",
                station,
                attribute
            );
        } else {
            session.set_attribute(attribute)?;
        }
    }
    Ok(outcome)
}

#[derive(Debug, Serialize)]
struct WeatherReport {
    station: String,
    attributes: Vec<String>,
    attribute: String,
    series: Vec<WeatherPoint>,
}

/// Load one station file and report its attributes and one attribute series.
pub async fn run_weather(
    source: &str,
    station: &str,
    attribute: Option<&str>,
) -> anyhow::Result<String> {
    let csv = read_source(source).await?;
    let observations = StationObservations::parse_csv(station, &csv)?;
    let attributes = observations.attributes_available();

    let attribute = match attribute {
        Some(a) if observations.schema.has_attribute(a) => a.to_string(),
        Some(a) => return Err(StateError::UnknownAttribute(a.to_string()).into()),
        None => attributes
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("station {} has no attributes", station))?,
    };

    let report = WeatherReport {
        station: station.to_string(),
        series: derive_weather_series(&observations, &attribute),
        attributes,
        attribute,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn fixture(name: &str, text: &str) -> String {
        let path = std::env::temp_dir().join(format!("twx-weather-{}-{}", std::process::id(), name));
        tokio::fs::write(&path, text).await.unwrap();
        path.to_str().unwrap().to_string()
    }

    const STATION_CSV: &str = "station,date,tavg,rain\nLjubljana,2021-01-01,0.5,\nLjubljana,2021-02-01,2.0,55\n";

    #[tokio::test]
    async fn test_run_weather_defaults_to_first_attribute() {
        let path = fixture("lj.csv", STATION_CSV).await;
        let json: Value = serde_json::from_str(&run_weather(&path, "LJ", None).await.unwrap()).unwrap();
        assert_eq!(json["attribute"], "tavg");
        assert_eq!(json["series"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_run_weather_unknown_attribute() {
        let path = fixture("lj2.csv", STATION_CSV).await;
        assert!(run_weather(&path, "LJ", Some("station")).await.is_err());
    }
}
