//! Coordinate sequence diff
//!
//! Classic dynamic-programming edit distance (unit cost insert, delete and substitute)
//! over exact coordinate equality. The backtrace emits ops whose positions are in the
//! source index space, so the result can be fed straight to [`crate::apply`].

use crate::{Coordinate, EditOp};

/// Compute a minimal edit script turning `source` into `target`
///
/// `apply(source, &diff(source, target))` always yields `target`, and identical
/// sequences produce an empty script.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn diff(source: &[Coordinate], target: &[Coordinate]) -> Vec<EditOp> {
    let m = source.len();
    let n = target.len();
    let table = CostTable::build(source, target);

    let mut ops = Vec::new();
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        let here = table.get(i, j);

        if i > 0 && j > 0 {
            let diagonal = table.get(i - 1, j - 1);
            if diagonal <= here
                && diagonal <= table.get(i - 1, j)
                && diagonal <= table.get(i, j - 1)
            {
                // Equal cost means the coordinates match and nothing is emitted
                if diagonal + 1 == here {
                    ops.push(EditOp::Replace {
                        value: target[j - 1].clone(),
                        position: i,
                    });
                }
                i -= 1;
                j -= 1;
                continue;
            }
        }

        if i > 0 && (j == 0 || table.get(i - 1, j) <= table.get(i, j - 1)) {
            ops.push(EditOp::Delete { position: i });
            i -= 1;
        } else {
            ops.push(EditOp::Insert {
                value: target[j - 1].clone(),
                position: i,
            });
            j -= 1;
        }
    }

    ops.reverse();
    ops
}

/// `(m+1)×(n+1)` edit distance table, row-major
struct CostTable {
    cells: Vec<usize>,
    width: usize,
}

impl CostTable {
    fn build(source: &[Coordinate], target: &[Coordinate]) -> Self {
        let width = target.len() + 1;
        let mut cells = vec![0; (source.len() + 1) * width];

        for i in 0..=source.len() {
            cells[i * width] = i;
        }
        for (j, cell) in cells.iter_mut().enumerate().take(width) {
            *cell = j;
        }

        for i in 1..=source.len() {
            for j in 1..width {
                let diagonal = cells[(i - 1) * width + j - 1];
                cells[i * width + j] = if source[i - 1] == target[j - 1] {
                    diagonal
                } else {
                    let up = cells[(i - 1) * width + j];
                    let left = cells[i * width + j - 1];
                    diagonal.min(up).min(left) + 1
                };
            }
        }

        Self { cells, width }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }
}
