//! Structural operators: split one feature in two, merge several into one
//!
//! Both work in place on a [`FeatureCollection`] that replay owns, and validate
//! everything before touching it, so a failing call leaves the collection as it was.

use crate::{DISTANCE_METERS, EditError, Feature, FeatureCollection, Result};
use serde_json::Map;

/// Split feature `index` before coordinate `point_index`
///
/// The feature keeps `coordinates[..point_index]`; a new feature holding
/// `coordinates[point_index..]` is inserted right after it. The new feature gets
/// `DistanceMeters = 0` and no other properties.
pub fn split(collection: &mut FeatureCollection, index: usize, point_index: usize) -> Result<()> {
    let len = collection.len();
    let feature = collection
        .features
        .get_mut(index)
        .ok_or(EditError::IndexOutOfRange { index, len })?;

    if point_index == 0 || point_index >= feature.len() {
        return Err(EditError::PointOutOfRange {
            index,
            point: point_index,
            len: feature.len(),
        });
    }

    let tail = feature.coordinates_mut().split_off(point_index);
    collection
        .features
        .insert(index + 1, Feature::with_distance(tail, 0.0));
    Ok(())
}

/// Merge the features at `indices` into one
///
/// Coordinates are concatenated and properties unioned in the order given (later
/// features win on key collisions), except `DistanceMeters`, which is summed. The
/// merged feature is placed at `indices[0]` as counted before removal, or at the
/// end when fewer features remain.
pub fn merge(collection: &mut FeatureCollection, indices: &[usize]) -> Result<()> {
    let len = collection.len();
    let Some(&first) = indices.first() else {
        return Err(EditError::MergeMismatch {
            reason: "no features selected".to_string(),
        });
    };

    let mut ascending = indices.to_vec();
    ascending.sort_unstable();
    if let Some(&index) = ascending.iter().find(|&&index| index >= len) {
        return Err(EditError::IndexOutOfRange { index, len });
    }
    if let Some(pair) = ascending.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(EditError::MergeMismatch {
            reason: format!("feature {} selected more than once", pair[0]),
        });
    }

    let mut coordinates = Vec::new();
    let mut properties = Map::new();
    let mut distance_meters = 0.0;
    for &index in indices {
        let feature = &collection.features[index];
        coordinates.extend_from_slice(feature.coordinates());
        distance_meters += feature.distance_meters();
        properties.extend(feature.properties.clone());
    }
    properties.remove(DISTANCE_METERS);

    // Remove in ascending order; each removal shifts the later targets down by one
    for (removed, index) in ascending.into_iter().enumerate() {
        collection.features.remove(index - removed);
    }

    let mut merged = Feature::new(coordinates, properties);
    merged.set_distance_meters(distance_meters);
    let position = first.min(collection.len());
    collection.features.insert(position, merged);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinate;
    use serde_json::json;

    fn coords(values: &[[f64; 2]]) -> Vec<Coordinate> {
        values.iter().copied().map(Coordinate::from).collect()
    }

    fn create_test_collection() -> FeatureCollection {
        FeatureCollection::new(vec![
            Feature::with_distance(coords(&[[0.0, 0.0], [1.0, 1.0]]), 10.0),
            Feature::with_distance(coords(&[[2.0, 2.0], [3.0, 3.0]]), 20.0),
            Feature::with_distance(coords(&[[4.0, 4.0], [5.0, 5.0], [6.0, 6.0]]), 5.5),
        ])
    }

    #[test]
    fn test_split_example() {
        let mut collection = FeatureCollection::new(vec![Feature::with_distance(
            coords(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]),
            42.0,
        )]);

        split(&mut collection, 0, 2).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].coordinates(), coords(&[[0.0, 0.0], [1.0, 1.0]]));
        assert_eq!(collection.features[1].coordinates(), coords(&[[2.0, 2.0], [3.0, 3.0]]));
        assert_eq!(collection.features[1].distance_meters(), 0.0);
        // The first half keeps its properties untouched
        assert_eq!(collection.features[0].distance_meters(), 42.0);
    }

    #[test]
    fn test_split_drops_other_properties() {
        let mut feature = Feature::with_distance(coords(&[[0.0, 0.0], [1.0, 1.0]]), 3.0);
        feature.properties.insert("name".into(), json!("ridge"));
        let mut collection = FeatureCollection::new(vec![feature]);

        split(&mut collection, 0, 1).unwrap();

        assert_eq!(collection.features[0].properties["name"], "ridge");
        assert_eq!(
            collection.features[1].properties,
            json!({ "DistanceMeters": 0 }).as_object().unwrap().clone()
        );
    }

    #[test]
    fn test_split_conserves_points() {
        let mut collection = create_test_collection();
        let before = collection.total_points();

        split(&mut collection, 2, 1).unwrap();

        assert_eq!(collection.total_points(), before);
        assert_eq!(collection.features[2].len() + collection.features[3].len(), 3);
    }

    #[test]
    fn test_split_rejects_bad_indices() {
        let mut collection = create_test_collection();

        assert!(matches!(
            split(&mut collection, 3, 1),
            Err(EditError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            split(&mut collection, 0, 0),
            Err(EditError::PointOutOfRange { point: 0, .. })
        ));
        assert!(matches!(
            split(&mut collection, 0, 2),
            Err(EditError::PointOutOfRange { point: 2, len: 2, .. })
        ));
        assert_eq!(collection, create_test_collection());
    }

    #[test]
    fn test_merge_example() {
        let mut collection = create_test_collection();
        collection.features.truncate(2);

        merge(&mut collection, &[0, 1]).unwrap();

        assert_eq!(collection.len(), 1);
        let merged = &collection.features[0];
        assert_eq!(
            merged.coordinates(),
            coords(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]])
        );
        assert_eq!(merged.distance_meters(), 30.0);
    }

    #[test]
    fn test_merge_uses_caller_order() {
        let mut collection = create_test_collection();

        merge(&mut collection, &[2, 0]).unwrap();

        // Feature 1 shifts to the front, the merged feature lands at the old index 2
        // which is clamped to the end of the shortened collection
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].coordinates(), coords(&[[2.0, 2.0], [3.0, 3.0]]));
        assert_eq!(
            collection.features[1].coordinates(),
            coords(&[[4.0, 4.0], [5.0, 5.0], [6.0, 6.0], [0.0, 0.0], [1.0, 1.0]])
        );
        assert_eq!(collection.features[1].distance_meters(), 15.5);
    }

    #[test]
    fn test_merge_position_before_removed_tail() {
        let mut collection = create_test_collection();

        merge(&mut collection, &[1, 2]).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].coordinates(), coords(&[[0.0, 0.0], [1.0, 1.0]]));
        assert_eq!(collection.features[1].len(), 5);
    }

    #[test]
    fn test_merge_property_union_later_wins() {
        let mut collection = create_test_collection();
        collection.features[0]
            .properties
            .insert("color".into(), json!("red"));
        collection.features[0]
            .properties
            .insert("surface".into(), json!("gravel"));
        collection.features[1]
            .properties
            .insert("color".into(), json!("blue"));

        merge(&mut collection, &[0, 1]).unwrap();

        let merged = &collection.features[0];
        assert_eq!(merged.properties["color"], "blue");
        assert_eq!(merged.properties["surface"], "gravel");
        assert_eq!(merged.properties[DISTANCE_METERS], 30);
    }

    #[test]
    fn test_merge_conserves_points() {
        let mut collection = create_test_collection();
        let expected: usize = [0, 2].iter().map(|&i| collection.features[i].len()).sum();

        merge(&mut collection, &[0, 2]).unwrap();

        assert_eq!(collection.features[0].len(), expected);
        assert_eq!(collection.total_points(), create_test_collection().total_points());
    }

    #[test]
    fn test_merge_rejects_invalid_selection() {
        let mut collection = create_test_collection();

        assert!(matches!(
            merge(&mut collection, &[]),
            Err(EditError::MergeMismatch { .. })
        ));
        assert!(matches!(
            merge(&mut collection, &[0, 0]),
            Err(EditError::MergeMismatch { .. })
        ));
        assert!(matches!(
            merge(&mut collection, &[1, 7]),
            Err(EditError::IndexOutOfRange { index: 7, len: 3 })
        ));
        assert_eq!(collection, create_test_collection());
    }
}
