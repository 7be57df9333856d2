// Min-cut bisection of netlist hypergraphs using the Fiduccia-Mattheyses refinement of
// Kernighan-Lin: https://dl.acm.org/doi/10.1145/800263.809204

mod bisection;
mod bucket;
mod builder;
mod cell_list;
mod error;
mod hypergraph;
mod iteration;
mod netlist;
mod partition;
mod partition_util;
mod solution;

pub use bisection::{BisectionPartitioningConfig, BisectionReport};
pub use bucket::Bucket;
pub use builder::HypergraphBuilder;
pub use cell_list::CellList;
pub use error::{PartitionError, Result};
pub use hypergraph::{CutStats, NetlistHypergraph};
pub use iteration::{Iteration, IterationState};
pub use netlist::{Cell, Net, NetPin, Pin};
pub use partition::Partition;
pub use partition_util::InitialPartitioningMethod;
pub use solution::{CellRecord, Solution};

use std::fmt;

/// Area of a cell, used for the balance constraint.
pub type Square = i64;

/// Signed cost unit for net weights and cell gains.
pub type Weight = i64;

/// Allowed area imbalance between the two sides (10%).
pub const SQUARE_TOLERANCE: f64 = 0.1;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(u32);

        impl $name {
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            pub fn as_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Index of a cell in the hypergraph's cell arena.
    CellId
);

define_id!(
    /// Index of a net in the hypergraph's net arena.
    NetId
);

define_id!(
    /// Hypergraph-wide pin number.
    PinId
);

/// One side of the cut. `Left` is partition 0, `Right` is partition 1.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}
