//! Geographic helpers used when turning map positions into edit operations

use geo::{Distance, Haversine, Point};
use track_edit_lib::Coordinate;

#[inline]
fn to_point(coordinate: &Coordinate) -> Point<f64> {
    Point::new(coordinate.lng(), coordinate.lat())
}

/// Index of the track point closest to `target` (great-circle distance)
///
/// The first of several equally close points wins. Returns `None` for an empty track.
pub fn nearest_point_index(target: &Coordinate, coordinates: &[Coordinate]) -> Option<usize> {
    let target = to_point(target);
    coordinates
        .iter()
        .map(|coordinate| Haversine.distance(target, to_point(coordinate)))
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((index, distance)),
        })
        .map(|(index, _)| index)
}

/// Length of a track in meters, ignoring elevation
pub fn track_length(coordinates: &[Coordinate]) -> f64 {
    coordinates
        .windows(2)
        .map(|pair| Haversine.distance(to_point(&pair[0]), to_point(&pair[1])))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_track() -> Vec<Coordinate> {
        vec![
            Coordinate::new(5.3200, 60.3900),
            Coordinate::new(5.3250, 60.3920),
            Coordinate::new(5.3300, 60.3940),
            Coordinate::new(5.3350, 60.3960),
        ]
    }

    #[test]
    fn test_nearest_point_index() {
        let track = create_test_track();
        assert_eq!(nearest_point_index(&Coordinate::new(5.3301, 60.3939), &track), Some(2));
        assert_eq!(nearest_point_index(&Coordinate::new(5.0, 60.0), &track), Some(0));
        assert_eq!(nearest_point_index(&Coordinate::new(5.3, 60.3), &[]), None);
    }

    #[test]
    fn test_ties_pick_first() {
        let track = vec![Coordinate::new(1.0, 1.0), Coordinate::new(1.0, 1.0)];
        assert_eq!(nearest_point_index(&Coordinate::new(1.0, 1.0), &track), Some(0));
    }

    #[test]
    fn test_track_length() {
        // One degree of latitude is roughly 111 km
        let track = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)];
        let length = track_length(&track);
        assert!((length - 111_195.0).abs() < 500.0);

        assert_eq!(track_length(&track[..1]), 0.0);
    }
}
