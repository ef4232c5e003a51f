//! Schedule matrix
//!
//! The ordered cross product of sizes, workload kinds and repetitions.
//! Traversal is fixed: sizes outermost, then kinds, repetitions innermost.

use crate::bench::workload::{WorkloadKind, WorkloadSpec};

/// Ordered sizes x ordered kinds x repetition count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleMatrix {
    sizes: Vec<u32>,
    kinds: Vec<WorkloadKind>,
    repeat_count: u32,
}

/// Position of one cell inside a [`ScheduleMatrix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixCursor {
    pub size_idx: usize,
    pub kind_idx: usize,
    pub repetition: u32,
}

/// One (kind, size, repetition) triple in traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixCell {
    pub spec: WorkloadSpec,
    pub repetition: u32,
}

impl ScheduleMatrix {
    pub fn new(sizes: Vec<u32>, kinds: Vec<WorkloadKind>, repeat_count: u32) -> Self {
        Self {
            sizes,
            kinds,
            repeat_count,
        }
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    pub fn kinds(&self) -> &[WorkloadKind] {
        &self.kinds
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// True when the matrix has no cells at all
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty() || self.kinds.is_empty() || self.repeat_count == 0
    }

    /// Number of cells
    pub fn len(&self) -> u64 {
        self.sizes.len() as u64 * self.kinds.len() as u64 * self.repeat_count as u64
    }

    /// Cursor on the first cell, or `None` for an empty matrix
    pub fn first(&self) -> Option<MatrixCursor> {
        if self.is_empty() {
            None
        } else {
            Some(MatrixCursor {
                size_idx: 0,
                kind_idx: 0,
                repetition: 0,
            })
        }
    }

    /// Cursor on the cell after `cursor`, advancing repetition first, then
    /// kind, then size. `None` once the matrix is exhausted.
    pub fn next(&self, cursor: MatrixCursor) -> Option<MatrixCursor> {
        if cursor.repetition + 1 < self.repeat_count {
            return Some(MatrixCursor {
                repetition: cursor.repetition + 1,
                ..cursor
            });
        }
        if cursor.kind_idx + 1 < self.kinds.len() {
            return Some(MatrixCursor {
                kind_idx: cursor.kind_idx + 1,
                repetition: 0,
                ..cursor
            });
        }
        if cursor.size_idx + 1 < self.sizes.len() {
            return Some(MatrixCursor {
                size_idx: cursor.size_idx + 1,
                kind_idx: 0,
                repetition: 0,
            });
        }
        None
    }

    /// Cell under `cursor`. Panics if the cursor does not belong to this matrix.
    pub fn cell(&self, cursor: MatrixCursor) -> MatrixCell {
        MatrixCell {
            spec: WorkloadSpec::new(self.kinds[cursor.kind_idx], self.sizes[cursor.size_idx]),
            repetition: cursor.repetition,
        }
    }

    /// All cells in traversal order
    pub fn cells(&self) -> Cells<'_> {
        Cells {
            matrix: self,
            cursor: self.first(),
        }
    }
}

/// Iterator over the cells of a [`ScheduleMatrix`]
pub struct Cells<'a> {
    matrix: &'a ScheduleMatrix,
    cursor: Option<MatrixCursor>,
}

impl Iterator for Cells<'_> {
    type Item = MatrixCell;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor?;
        self.cursor = self.matrix.next(cursor);
        Some(self.matrix.cell(cursor))
    }
}
