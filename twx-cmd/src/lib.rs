//! Command implementations for the TWX CLI.
//!
//! Every command loads its sources into a fresh in-memory session, applies
//! the requested interaction steps in order, and returns pretty JSON.

use clap::{Args, Subcommand};
use twx_data::state::Layer;

pub mod explore;
pub mod source;
pub mod weather;

/// Tourism and bed sources shared by every command.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Tourism CSV (path or URL, optionally .gz)
    #[arg(short = 't', long)]
    pub tourism: String,

    /// Bed capacity CSV (path or URL, optionally .gz)
    #[arg(short = 'b', long)]
    pub beds: Option<String>,
}

/// Interaction state applied before deriving.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Country of origin (defaults to the first discovered country)
    #[arg(short = 'c', long)]
    pub country: Option<String>,

    /// Region to select; repeat for several, order is kept
    #[arg(short = 'r', long = "region")]
    pub regions: Vec<String>,

    /// Enabled layers (arrivals, overnights, average-stay, beds, weather)
    #[arg(short = 'l', long = "layer", value_delimiter = ',')]
    pub layers: Vec<Layer>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List countries discovered in the tourism headers
    Countries {
        #[command(flatten)]
        data: DataArgs,
    },

    /// List known regions, optionally matched against GeoJSON region names
    Regions {
        #[command(flatten)]
        data: DataArgs,

        /// GeoJSON FeatureCollection of region geometries
        #[arg(short = 'g', long)]
        geometry: Option<String>,
    },

    /// Derive tourism, bed and (optionally) weather series
    Series {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        station: weather::StationArgs,
    },

    /// Summarize the derived series over an inclusive bucket range
    Brush {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// First bucket of the range (e.g. 2021M03 or 2021-03)
        #[arg(long)]
        from: String,

        /// Last bucket of the range
        #[arg(long)]
        to: String,
    },

    /// Load one station file and list its attributes and series
    Weather {
        /// Station CSV (path or URL, optionally .gz)
        #[arg(short = 'w', long)]
        source: String,

        /// Station identifier
        #[arg(short = 's', long)]
        station: String,

        /// Attribute to extract (defaults to the first discovered)
        #[arg(short = 'a', long)]
        attribute: Option<String>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<String> {
    match command {
        Command::Countries { data } => explore::run_countries(&data).await,
        Command::Regions { data, geometry } => {
            explore::run_regions(&data, geometry.as_deref()).await
        }
        Command::Series {
            data,
            selection,
            station,
        } => explore::run_series(&data, &selection, &station).await,
        Command::Brush {
            data,
            selection,
            from,
            to,
        } => explore::run_brush(&data, &selection, &from, &to).await,
        Command::Weather {
            source,
            station,
            attribute,
        } => weather::run_weather(&source, &station, attribute.as_deref()).await,
    }
}
