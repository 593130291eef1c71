//! Track Edit Library - Edit-History Engine for Track Collections
//!
//! This library keeps an append-only log of edits made to a GeoJSON collection of
//! foot-path tracks and reconstructs the current collection by replaying that log
//! over an immutable base snapshot. Edits to a single track's geometry are stored
//! as minimal edit scripts computed by a coordinate-sequence diff.
//!
//! # Architecture
//!
//! - **[`diff()`]**: Edit-distance diff between two coordinate sequences
//! - **[`apply()`]**: Replays an edit script against a coordinate sequence
//! - **[`structure`]**: Split and merge operators over a [`FeatureCollection`]
//! - **[`Engine`]**: Owns the base, the [`OperationLog`] and the cached derived state
//! - **[`Lineage`]**: Node depths of the history tree, for visualizing the log
//!
//! # Cost Model
//!
//! - **Diff**: O(M×N) time and memory for sequences of length M and N
//! - **Replay**: O(L×F) per mutation, L=log length, F=feature size; nothing is cached per
//!   operation, every mutation replays from the base

mod diff;
mod engine;
mod feature;
mod lineage;
mod operation;
mod patch;
pub mod structure;

// Public API exports
pub use diff::diff;
pub use engine::{Engine, SubscriptionId, replay};
pub use feature::{Coordinate, DISTANCE_METERS, Feature, FeatureCollection, Geometry};
pub use lineage::Lineage;
pub use operation::{EditOp, Operation, OperationLog, parse_log};
pub use patch::apply;

/// Error types for the edit-history engine
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Unknown operation kind: {0}")]
    UnknownOperationKind(String),

    #[error("Feature index {index} out of range for {len} features")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Point index {point} out of range for feature {index} with {len} coordinates")]
    PointOutOfRange {
        index: usize,
        point: usize,
        len: usize,
    },

    #[error("Malformed edit script: op {op_index} at position {position} does not fit {len} coordinates")]
    MalformedScript {
        op_index: usize,
        position: usize,
        len: usize,
    },

    #[error("Merge mismatch: {reason}")]
    MergeMismatch { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditError>;
