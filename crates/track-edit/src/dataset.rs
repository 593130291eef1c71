//! Dataset loading
//!
//! A dataset is either a GeoJSON FeatureCollection of line strings or a GPX file.
//! GPX track segments become one feature each, with `DistanceMeters` computed from
//! the points since GPX carries no distance of its own.

use crate::{CliError, snap};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use track_edit_lib::{Coordinate, Feature, FeatureCollection};

/// Key under which a dataset's edit log is stored: its file name
pub fn dataset_key(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load the base collection from a GeoJSON or GPX file
pub fn load(path: &Path) -> Result<FeatureCollection, CliError> {
    profiling::scope!("dataset::load");

    let is_gpx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"));

    let collection = if is_gpx {
        let file = std::fs::File::open(path)?;
        from_gpx(gpx::read(std::io::BufReader::new(file))?)
    } else {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)?
    };

    tracing::info!(
        path = %path.display(),
        features = collection.len(),
        points = collection.total_points(),
        "Loaded dataset"
    );
    Ok(collection)
}

/// Convert every GPX track segment into a feature
pub fn from_gpx(gpx: gpx::Gpx) -> FeatureCollection {
    let mut features = Vec::new();

    for track in gpx.tracks {
        for segment in track.segments {
            let coordinates: Vec<Coordinate> = segment
                .points
                .iter()
                .map(|waypoint| {
                    let point = waypoint.point();
                    match waypoint.elevation {
                        Some(elevation) => Coordinate::with_elevation(point.x(), point.y(), elevation),
                        None => Coordinate::new(point.x(), point.y()),
                    }
                })
                .collect();

            if coordinates.is_empty() {
                tracing::warn!(track = ?track.name, "Skipping empty track segment");
                continue;
            }

            let mut properties = Map::new();
            if let Some(name) = &track.name {
                properties.insert("name".to_string(), Value::from(name.clone()));
            }
            let mut feature = Feature::new(coordinates, properties);
            feature.set_distance_meters(snap::track_length(feature.coordinates()).round());
            features.push(feature);
        }
    }

    FeatureCollection::new(features)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EditTarget {
    Coordinates(Vec<Coordinate>),
    Feature(Feature),
}

/// Load the coordinates a track should be reshaped to
pub fn load_target(path: &Path) -> Result<Vec<Coordinate>, CliError> {
    let text = std::fs::read_to_string(path)?;
    Ok(match serde_json::from_str(&text)? {
        EditTarget::Coordinates(coordinates) => coordinates,
        EditTarget::Feature(feature) => feature.coordinates().to_vec(),
    })
}
