use crate::partition::pair_mut;
use crate::{NetlistHypergraph, PartitionError, Result, Side};
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum InitialPartitioningMethod {
    /// Every free cell is gathered on the left, then cells are flipped to the right at
    /// random until the right side is at least as large.
    #[default]
    Random,
    /// The split given by the builder is used as is.
    Preset,
}

impl NetlistHypergraph {
    pub fn partition_initial(
        &mut self,
        method: InitialPartitioningMethod,
        rng: &mut StdRng,
    ) -> Result<()> {
        match method {
            InitialPartitioningMethod::Random => self.random_distribution(rng),
            InitialPartitioningMethod::Preset => Ok(()),
        }
    }

    /// Roughly balances the two lockers by area before the first pass. Exact balance is
    /// not attempted; the passes' tolerance logic takes over from here.
    pub fn random_distribution(&mut self, rng: &mut StdRng) -> Result<()> {
        let cells = &mut self.cells;
        let (left, right) = pair_mut(&mut self.partitions, Side::Left);

        for id in right.locker.to_vec() {
            if cells[id.index()].is_fixed() {
                continue;
            }
            let pos = right
                .locker
                .find(id)
                .ok_or(PartitionError::CellNotInList { cell: id })?;
            left.locker.splice(left.locker.end(), &mut right.locker, pos, cells)?;
        }
        for id in left.locker.iter() {
            cells[id.index()].side = Side::Left;
        }

        while left.locker.square(cells) > right.locker.square(cells) {
            let mut movable = false;
            for id in left.locker.to_vec() {
                if left.locker.square(cells) <= right.locker.square(cells) {
                    break;
                }
                if cells[id.index()].is_fixed() {
                    continue;
                }
                movable = true;
                if rng.gen_bool(0.5) {
                    cells[id.index()].side = Side::Right;
                    let pos = left
                        .locker
                        .find(id)
                        .ok_or(PartitionError::CellNotInList { cell: id })?;
                    left.locker.transfer_to(pos, &mut right.locker, cells, true)?;
                }
            }
            if !movable {
                break;
            }
        }

        log::trace!(
            "random distribution: left square {}, right square {}",
            left.locker.square(cells),
            right.locker.square(cells)
        );
        Ok(())
    }
}
