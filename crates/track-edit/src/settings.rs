use clap::{Parser, Subcommand};
use std::path::PathBuf;
use track_edit_lib::Coordinate;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Edit - split, merge and reshape foot-path tracks with a replayable edit history
pub struct Settings {
    /// GeoJSON FeatureCollection (.geojson/.json) or GPX file to edit
    #[clap(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Storage file holding saved edit logs (defaults to the user config directory)
    #[clap(long, value_name = "FILE")]
    pub storage: Option<PathBuf>,

    /// Ignore the saved edit log and start from the original dataset
    #[clap(long, default_value = "false")]
    pub ignore_saved: bool,

    /// Write the resulting FeatureCollection to this file instead of stdout
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the current state of the dataset
    Show,

    /// Reshape a track to the coordinates given in a JSON file
    Edit {
        /// Index of the track to edit
        #[clap(short, long)]
        feature: usize,

        /// JSON file with the new coordinates (array of [lng, lat] or a GeoJSON Feature)
        #[clap(short, long, value_name = "FILE")]
        target: PathBuf,
    },

    /// Cut a track in two
    Split {
        /// Index of the track to split
        #[clap(short, long)]
        feature: usize,

        /// Index of the first point of the second half
        #[clap(short, long, required_unless_present = "at")]
        point: Option<usize>,

        /// Split at the track point nearest to this position
        #[clap(
            long,
            value_name = "LNG,LAT",
            conflicts_with = "point",
            allow_hyphen_values = true,
            value_parser = parse_lng_lat
        )]
        at: Option<Coordinate>,
    },

    /// Join tracks, in the order given, into one
    Merge {
        /// Indices of the tracks to merge; the first decides where the result goes
        #[clap(required = true, num_args = 1..)]
        features: Vec<usize>,
    },

    /// Revert the most recent operation
    Undo,

    /// Print the operation log and the shape of the history tree
    Log,

    /// Forget the saved edit log for this dataset
    Reset,
}

impl Command {
    /// Whether the command changes the edit log
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Edit { .. } | Command::Split { .. } | Command::Merge { .. } | Command::Undo
        )
    }
}

fn parse_lng_lat(value: &str) -> Result<Coordinate, String> {
    let (lng, lat) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LNG,LAT, got {value:?}"))?;
    let lng = lng.trim().parse::<f64>().map_err(|e| format!("bad longitude: {e}"))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| format!("bad latitude: {e}"))?;
    Ok(Coordinate::new(lng, lat))
}
