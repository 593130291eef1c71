//! Operations recorded in the edit log and their JSON form
//!
//! Operations and edit ops are closed enums in memory. On the wire they keep the
//! `{"name": ..., "args": ...}` shape that saved sessions use; unknown names are
//! rejected with [`EditError::UnknownOperationKind`] at this boundary and nowhere else.

use crate::{Coordinate, EditError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// One step of an edit script
///
/// `position` is 1-based and always refers to the original sequence the script was
/// computed against, never to the partially edited one. `Insert` also accepts
/// position 0, meaning "before the first element". See [`crate::apply`] for how
/// positions are resolved while the script runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEditOp", into = "RawEditOp")]
pub enum EditOp {
    Insert { value: Coordinate, position: usize },
    Delete { position: usize },
    Replace { value: Coordinate, position: usize },
}

impl EditOp {
    #[inline]
    pub fn position(&self) -> usize {
        match self {
            EditOp::Insert { position, .. }
            | EditOp::Delete { position }
            | EditOp::Replace { position, .. } => *position,
        }
    }
}

/// One entry of the operation log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOperation", into = "RawOperation")]
pub enum Operation {
    /// Apply an edit script to one feature's coordinates
    Edit {
        feature_index: usize,
        script: Vec<EditOp>,
    },
    /// Cut one feature in two before `point_index`
    Split {
        feature_index: usize,
        point_index: usize,
    },
    /// Join features; the order given is the concatenation order
    Merge { feature_indices: Vec<usize> },
}

/// Append-only history of operations (`undo` pops the last one)
pub type OperationLog = Vec<Operation>;

impl Operation {
    /// Wire name of the operation kind
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Edit { .. } => "edit",
            Operation::Split { .. } => "split",
            Operation::Merge { .. } => "merge",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Edit {
                feature_index,
                script,
            } => write!(f, "edit {feature_index} ({} ops)", script.len()),
            Operation::Split {
                feature_index,
                point_index,
            } => write!(f, "split {feature_index} at point {point_index}"),
            Operation::Merge { feature_indices } => write!(f, "merge {feature_indices:?}"),
        }
    }
}

/// Parse a saved log, reporting unknown operation names as such
pub fn parse_log(json: &str) -> Result<OperationLog> {
    let raw: Vec<RawOperation> = serde_json::from_str(json)?;
    raw.into_iter().map(Operation::try_from).collect()
}

#[derive(Clone, Serialize, Deserialize)]
struct RawEditOp {
    name: String,
    args: Value,
}

#[derive(Clone, Serialize, Deserialize)]
struct RawOperation {
    name: String,
    args: Value,
}

#[derive(Deserialize)]
struct RawEditArgs {
    idx: usize,
    edit: Vec<RawEditOp>,
}

#[derive(Deserialize)]
struct SplitArgs {
    idx: usize,
    #[serde(rename = "pointIdx")]
    point_idx: usize,
}

impl TryFrom<RawEditOp> for EditOp {
    type Error = EditError;

    fn try_from(raw: RawEditOp) -> Result<Self> {
        match raw.name.as_str() {
            "insert" => {
                let (value, position) = serde_json::from_value(raw.args)?;
                Ok(EditOp::Insert { value, position })
            }
            "delete" => {
                let (position,) = serde_json::from_value::<(usize,)>(raw.args)?;
                Ok(EditOp::Delete { position })
            }
            "replace" => {
                let (value, position) = serde_json::from_value(raw.args)?;
                Ok(EditOp::Replace { value, position })
            }
            _ => Err(EditError::UnknownOperationKind(raw.name)),
        }
    }
}

impl From<EditOp> for RawEditOp {
    fn from(op: EditOp) -> Self {
        let (name, args) = match op {
            EditOp::Insert { value, position } => ("insert", json!([value, position])),
            EditOp::Delete { position } => ("delete", json!([position])),
            EditOp::Replace { value, position } => ("replace", json!([value, position])),
        };
        RawEditOp {
            name: name.to_string(),
            args,
        }
    }
}

impl TryFrom<RawOperation> for Operation {
    type Error = EditError;

    fn try_from(raw: RawOperation) -> Result<Self> {
        match raw.name.as_str() {
            "edit" => {
                let args: RawEditArgs = serde_json::from_value(raw.args)?;
                let script = args
                    .edit
                    .into_iter()
                    .map(EditOp::try_from)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Operation::Edit {
                    feature_index: args.idx,
                    script,
                })
            }
            "split" => {
                let args: SplitArgs = serde_json::from_value(raw.args)?;
                Ok(Operation::Split {
                    feature_index: args.idx,
                    point_index: args.point_idx,
                })
            }
            "merge" => Ok(Operation::Merge {
                feature_indices: serde_json::from_value(raw.args)?,
            }),
            _ => Err(EditError::UnknownOperationKind(raw.name)),
        }
    }
}

impl From<Operation> for RawOperation {
    fn from(op: Operation) -> Self {
        let name = op.name().to_string();
        let args = match op {
            Operation::Edit {
                feature_index,
                script,
            } => json!({ "idx": feature_index, "edit": script }),
            Operation::Split {
                feature_index,
                point_index,
            } => json!({ "idx": feature_index, "pointIdx": point_index }),
            Operation::Merge { feature_indices } => json!(feature_indices),
        };
        RawOperation { name, args }
    }
}
