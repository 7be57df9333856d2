//! Consistency errors raised by the partitioning core.

use crate::{CellId, NetId, Side, Weight};

/// Violations of the move-bookkeeping invariants.
///
/// None of these are recoverable: once one is returned the partition state can no
/// longer be trusted and the current run should be abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    /// A fixed cell was about to leave its locker.
    #[error("fixed cell {cell} cannot be moved")]
    FixedCellMove { cell: CellId },

    /// The cell is not a member of the list it was looked up in.
    #[error("cell {cell} is not in the list")]
    CellNotInList { cell: CellId },

    /// The cell is already a member of the list it was inserted into.
    #[error("cell {cell} is already in the list")]
    DuplicateCell { cell: CellId },

    /// The requested slot already holds a cell.
    #[error("slot {slot} is already occupied")]
    SlotOccupied { slot: usize },

    /// The requested slot holds no cell.
    #[error("slot {slot} is empty")]
    EmptySlot { slot: usize },

    /// A cell was expected in the gain list for `gain` but is missing.
    #[error("cell {cell} not found in gain bucket {gain}")]
    MissingFromBucket { cell: CellId, gain: Weight },

    /// Buckets are filled once per pass and must be drained first.
    #[error("cannot fill a non-empty bucket")]
    BucketNotEmpty,

    /// A move was requested from a side with no free cells.
    #[error("{side} bucket is empty")]
    EmptyBucket { side: Side },

    /// The cell sits on a different side than the container it was taken from.
    #[error("cell {cell} is on the {actual} side, expected {expected}")]
    WrongSide {
        cell: CellId,
        expected: Side,
        actual: Side,
    },

    /// `preset` may only be called once per side.
    #[error("{side} partition was already preset")]
    AlreadyPreset { side: Side },

    /// The cell is already held by a locker.
    #[error("cell {cell} is already assigned to a partition")]
    AlreadyAssigned { cell: CellId },

    /// A solution can only be restored once every bucket has been drained.
    #[error("buckets must be drained before restoring a solution")]
    BucketsNotDrained,

    /// A solution recorded for a different cell set.
    #[error("solution covers {recorded} cells, hypergraph has {actual}")]
    SolutionSizeMismatch { recorded: usize, actual: usize },

    #[error("unknown cell {cell}")]
    UnknownCell { cell: CellId },

    #[error("unknown net {net}")]
    UnknownNet { net: NetId },
}

pub type Result<T> = std::result::Result<T, PartitionError>;
