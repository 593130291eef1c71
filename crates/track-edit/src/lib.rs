//! Track Edit - Command-Line Application Library
//!
//! Ties the edit-history engine from `track-edit-lib` to datasets on disk: loads a
//! GeoJSON or GPX base collection, resumes the edit log saved for it, applies one
//! command and persists the log again.

mod app;
mod dataset;
mod logging;
mod settings;
mod snap;
mod storage;

pub use app::run;
pub use dataset::{dataset_key, load, load_target};
pub use logging::{LoggingGuard, setup_logging_and_profiling};
pub use settings::{Command, Settings};
pub use snap::{nearest_point_index, track_length};
pub use storage::{FileStorage, StorageBackend, StorageError, save_json_backend};

use track_edit_lib::EditError;

/// Errors reported by the command-line tool
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GPX: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("Split needs either a point index or a position")]
    MissingSplitPoint,

    #[error("Feature {index} has no coordinates to snap to")]
    EmptyFeature { index: usize },
}
