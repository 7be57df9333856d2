use crate::{Bucket, Cell, CellList, Side, Square, Weight};

/// One side of the cut.
///
/// The locker holds the cells that cannot be selected this pass (fixed cells and cells
/// already moved), the bucket holds the free ones. Together they are exactly the cells
/// assigned to this side.
#[derive(Clone, Debug)]
pub struct Partition {
    side: Side,
    pub locker: CellList,
    pub bucket: Bucket,
}

impl Partition {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            locker: CellList::new(),
            bucket: Bucket::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn square(&mut self, cells: &[Cell]) -> Square {
        self.bucket.square() + self.locker.square(cells)
    }

    pub fn gain(&mut self, cells: &[Cell]) -> Weight {
        self.bucket.gain() + self.locker.gain_sum(cells)
    }
}

/// Mutable access to both partitions, `from` first.
pub(crate) fn pair_mut(
    partitions: &mut [Partition; 2],
    from: Side,
) -> (&mut Partition, &mut Partition) {
    let [left, right] = partitions;
    match from {
        Side::Left => (left, right),
        Side::Right => (right, left),
    }
}
