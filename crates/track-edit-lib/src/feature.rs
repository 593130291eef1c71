//! GeoJSON-shaped track data
//!
//! Only what the edit engine needs is modelled: a `FeatureCollection` of `LineString`
//! features with an open property map. Coordinates are opaque value tuples, compared
//! exactly; no geographic meaning is attached to them here.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

/// Reserved numeric property holding a track's length in meters
pub const DISTANCE_METERS: &str = "DistanceMeters";

/// One position of a track: `[lng, lat]` or `[lng, lat, elevation]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SmallVec<[f64; 3]>", into = "SmallVec<[f64; 3]>")]
pub struct Coordinate(SmallVec<[f64; 3]>);

impl Coordinate {
    /// Create a 2D coordinate
    pub fn new(lng: f64, lat: f64) -> Self {
        Self(SmallVec::from_slice(&[lng, lat]))
    }

    /// Create a coordinate carrying an elevation
    pub fn with_elevation(lng: f64, lat: f64, elevation: f64) -> Self {
        Self(SmallVec::from_slice(&[lng, lat, elevation]))
    }

    #[inline]
    pub fn lng(&self) -> f64 {
        self.0[0]
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.0[1]
    }

    #[inline]
    pub fn elevation(&self) -> Option<f64> {
        self.0.get(2).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<SmallVec<[f64; 3]>> for Coordinate {
    type Error = String;

    fn try_from(values: SmallVec<[f64; 3]>) -> Result<Self, Self::Error> {
        match values.len() {
            2 | 3 => Ok(Self(values)),
            n => Err(format!("coordinate must have 2 or 3 values, got {n}")),
        }
    }
}

impl From<Coordinate> for SmallVec<[f64; 3]> {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.0
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self::new(lng, lat)
    }
}

impl From<[f64; 3]> for Coordinate {
    fn from([lng, lat, elevation]: [f64; 3]) -> Self {
        Self::with_elevation(lng, lat, elevation)
    }
}

/// Feature geometry; tracks are always line strings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<Coordinate> },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// One track segment: a coordinate sequence plus its properties
///
/// Features carry no identity of their own; they are addressed by position in the
/// enclosing [`FeatureCollection`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    kind: FeatureTag,
    #[serde(default, deserialize_with = "properties_or_empty")]
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
    /// Other members such as `id` or `bbox`, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// GeoJSON allows `"properties": null`
fn properties_or_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Map<String, Value>, D::Error> {
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Feature {
    /// Create a feature from its coordinates and properties
    pub fn new(coordinates: Vec<Coordinate>, properties: Map<String, Value>) -> Self {
        Self {
            kind: FeatureTag::Feature,
            properties,
            geometry: Geometry::LineString { coordinates },
            extra: Map::new(),
        }
    }

    /// Create a feature whose only property is its distance
    pub fn with_distance(coordinates: Vec<Coordinate>, distance_meters: f64) -> Self {
        let mut feature = Self::new(coordinates, Map::new());
        feature.set_distance_meters(distance_meters);
        feature
    }

    #[inline]
    pub fn coordinates(&self) -> &[Coordinate] {
        let Geometry::LineString { coordinates } = &self.geometry;
        coordinates
    }

    #[inline]
    pub fn coordinates_mut(&mut self) -> &mut Vec<Coordinate> {
        let Geometry::LineString { coordinates } = &mut self.geometry;
        coordinates
    }

    /// Number of coordinates in the track
    #[inline]
    pub fn len(&self) -> usize {
        self.coordinates().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coordinates().is_empty()
    }

    /// The `DistanceMeters` property; missing or non-numeric values read as 0
    pub fn distance_meters(&self) -> f64 {
        self.properties
            .get(DISTANCE_METERS)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Set `DistanceMeters`, keeping whole numbers as JSON integers
    pub fn set_distance_meters(&mut self, meters: f64) {
        let value = if meters.fract() == 0.0 && meters.abs() < i64::MAX as f64 {
            Value::from(meters as i64)
        } else {
            Value::from(meters)
        };
        self.properties.insert(DISTANCE_METERS.to_string(), value);
    }
}

/// Ordered collection of features; the unit of derived state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    kind: CollectionTag,
    pub features: Vec<Feature>,
    /// Collection-level members (`name`, `crs`, `bbox`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: CollectionTag::FeatureCollection,
            features,
            extra: Map::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    /// Total number of coordinates across all features
    pub fn total_points(&self) -> usize {
        self.features.iter().map(Feature::len).sum()
    }
}
