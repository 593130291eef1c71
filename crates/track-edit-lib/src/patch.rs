//! Edit script application
//!
//! Positions in a script are computed once, against the untouched source sequence.
//! While the script runs, a signed `offset` counts how far the working sequence has
//! drifted from the source: every delete shifts later positions one to the left
//! (`offset += 1`), every insert one to the right (`offset -= 1`). Resolving each
//! position through the offset keeps it pointing at the same original element for
//! the whole run, which is what makes [`crate::diff`] output replayable.

use crate::{Coordinate, EditError, EditOp, Result};

/// Apply an edit script to `source`, returning the edited sequence
///
/// - `Delete(p)` removes index `p - 1 - offset`, then `offset += 1`
/// - `Replace(v, p)` overwrites index `p - 1 - offset`
/// - `Insert(v, p)` inserts before index `p - offset`, then `offset -= 1`
///
/// Fails with [`EditError::MalformedScript`] on the first op whose resolved index
/// falls outside the working sequence; `source` is never modified.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn apply(source: &[Coordinate], script: &[EditOp]) -> Result<Vec<Coordinate>> {
    let mut result = source.to_vec();
    let mut offset: isize = 0;

    for (op_index, op) in script.iter().enumerate() {
        let malformed = |len: usize| EditError::MalformedScript {
            op_index,
            position: op.position(),
            len,
        };

        match op {
            EditOp::Delete { position } => {
                let index = resolve(*position, 1, offset, result.len())
                    .ok_or_else(|| malformed(result.len()))?;
                result.remove(index);
                offset += 1;
            }
            EditOp::Replace { value, position } => {
                let index = resolve(*position, 1, offset, result.len())
                    .ok_or_else(|| malformed(result.len()))?;
                result[index] = value.clone();
            }
            EditOp::Insert { value, position } => {
                // Inserting at the end is valid, hence `len + 1`
                let index = resolve(*position, 0, offset, result.len() + 1)
                    .ok_or_else(|| malformed(result.len()))?;
                result.insert(index, value.clone());
                offset -= 1;
            }
        }
    }

    Ok(result)
}

/// `position - shift - offset` if it lies in `0..bound`; `None` also on overflow
#[inline]
fn resolve(position: usize, shift: isize, offset: isize, bound: usize) -> Option<usize> {
    let index = isize::try_from(position)
        .ok()?
        .checked_sub(shift)?
        .checked_sub(offset)?;
    usize::try_from(index).ok().filter(|&i| i < bound)
}
