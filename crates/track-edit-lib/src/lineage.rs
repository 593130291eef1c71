//! History-tree lineage of the current features
//!
//! The history of a session forms a tree: base features at the top, one level per
//! edit, splits fanning out and merges joining branches. Drawing it only needs the
//! depth of the newest node for every current feature, which this module derives
//! from the log alone, without touching geometry.

use crate::{EditError, Operation, Result};

/// Depth of the newest history node for every current feature position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lineage {
    depths: Vec<usize>,
}

impl Lineage {
    /// Walk `log` starting from `initial_count` base features at depth 0
    pub fn from_log(initial_count: usize, log: &[Operation]) -> Result<Self> {
        let mut depths = vec![0; initial_count];

        for op in log {
            let len = depths.len();
            let out_of_range = |index: usize| EditError::IndexOutOfRange { index, len };

            match op {
                Operation::Edit { feature_index, .. } => {
                    *depths
                        .get_mut(*feature_index)
                        .ok_or_else(|| out_of_range(*feature_index))? += 1;
                }
                Operation::Split { feature_index, .. } => {
                    let depth = *depths
                        .get(*feature_index)
                        .ok_or_else(|| out_of_range(*feature_index))?;
                    depths.insert(feature_index + 1, depth);
                    depths[*feature_index] += 1;
                }
                Operation::Merge { feature_indices } => {
                    let Some(&first) = feature_indices.first() else {
                        return Err(EditError::MergeMismatch {
                            reason: "no features selected".to_string(),
                        });
                    };
                    let mut ascending = feature_indices.clone();
                    ascending.sort_unstable();
                    if let Some(&index) = ascending.iter().find(|&&index| index >= len) {
                        return Err(out_of_range(index));
                    }
                    if let Some(pair) = ascending.windows(2).find(|pair| pair[0] == pair[1]) {
                        return Err(EditError::MergeMismatch {
                            reason: format!("feature {} selected more than once", pair[0]),
                        });
                    }

                    let mut deepest = 0;
                    for (removed, index) in ascending.into_iter().enumerate() {
                        deepest = deepest.max(depths.remove(index - removed));
                    }
                    // Same placement as the merged feature gets during replay
                    let position = first.min(depths.len());
                    depths.insert(position, deepest + 1);
                }
            }
        }

        Ok(Self { depths })
    }

    /// Depth per current feature, in feature order
    #[inline]
    pub fn depths(&self) -> &[usize] {
        &self.depths
    }

    /// Deepest node below the base features
    pub fn max_depth(&self) -> usize {
        self.depths.iter().copied().max().unwrap_or(0)
    }

    /// Rows needed to draw the tree: the dataset root, the base features and one
    /// row per level of history
    pub fn rows(&self) -> usize {
        self.max_depth() + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log() {
        let lineage = Lineage::from_log(3, &[]).unwrap();
        assert_eq!(lineage.depths(), &[0, 0, 0]);
        assert_eq!(lineage.rows(), 2);
    }

    #[test]
    fn test_edits_deepen_one_branch() {
        let log = vec![
            Operation::Edit {
                feature_index: 1,
                script: Vec::new(),
            },
            Operation::Edit {
                feature_index: 1,
                script: Vec::new(),
            },
        ];
        let lineage = Lineage::from_log(2, &log).unwrap();
        assert_eq!(lineage.depths(), &[0, 2]);
        assert_eq!(lineage.max_depth(), 2);
        assert_eq!(lineage.rows(), 4);
    }

    #[test]
    fn test_split_then_merge() {
        let log = vec![
            Operation::Split {
                feature_index: 0,
                point_index: 1,
            },
            Operation::Edit {
                feature_index: 1,
                script: Vec::new(),
            },
            Operation::Merge {
                feature_indices: vec![2, 0],
            },
        ];
        // split: [1, 0, 0]; edit: [1, 1, 0]; merge 0 and 2 (depths 1 and 0) into
        // depth 2, placed at index 2 clamped to the end
        let lineage = Lineage::from_log(2, &log).unwrap();
        assert_eq!(lineage.depths(), &[1, 2]);
    }

    #[test]
    fn test_out_of_range() {
        let log = vec![Operation::Split {
            feature_index: 4,
            point_index: 1,
        }];
        assert!(matches!(
            Lineage::from_log(2, &log),
            Err(EditError::IndexOutOfRange { index: 4, len: 2 })
        ));
    }

    #[test]
    fn test_merge_errors_match_replay() {
        use crate::{Coordinate, Feature, FeatureCollection, replay};

        let base = FeatureCollection::new(vec![
            Feature::with_distance(vec![Coordinate::new(0.0, 0.0)], 1.0),
            Feature::with_distance(vec![Coordinate::new(1.0, 1.0)], 1.0),
        ]);
        for indices in [vec![9, 9], vec![1, 1], vec![0, 5], vec![]] {
            let log = vec![Operation::Merge {
                feature_indices: indices,
            }];
            let from_lineage = Lineage::from_log(base.len(), &log).unwrap_err();
            let from_replay = replay(&base, &log).unwrap_err();
            assert_eq!(from_lineage.to_string(), from_replay.to_string());
        }
    }
}
