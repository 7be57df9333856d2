use crate::{Cell, CellId, PartitionError, Result, Square, Weight};
use std::collections::HashMap;

/// Ordered, duplicate-free list of cell handles with O(1) membership, find and removal.
///
/// Removal leaves an empty slot behind and marks the list dirty. The slot array is
/// compacted (and the id index rebuilt) lazily, before the next traversal, size query or
/// append. Positions are raw slot indices and stay valid only until the next compaction.
///
/// The area and gain sums over the members are memoized. Plain insertions and removals
/// invalidate the memos; [`CellList::transfer_to`] keeps them up to date incrementally.
#[derive(Clone, Debug, Default)]
pub struct CellList {
    slots: Vec<Option<CellId>>,
    /// Slot of each member.
    positions: HashMap<CellId, usize>,
    dirty: bool,
    square: Option<Square>,
    gain: Option<Weight>,
}

impl CellList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(ids: impl IntoIterator<Item = CellId>) -> Result<Self> {
        let mut list = Self::new();
        for id in ids {
            list.push(id)?;
        }
        Ok(list)
    }

    /// Drops empty slots and re-indexes the remaining cells in one pass.
    fn pack(&mut self) {
        if !self.dirty {
            return;
        }
        let before = self.slots.len();
        self.slots.retain(Option::is_some);
        for (slot, id) in self.slots.iter().enumerate() {
            if let Some(id) = id {
                self.positions.insert(*id, slot);
            }
        }
        self.dirty = false;
        log::trace!("packed cell list {} -> {} slots", before, self.slots.len());
    }

    pub fn len(&mut self) -> usize {
        self.pack();
        self.slots.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// The append position.
    pub fn end(&self) -> usize {
        self.slots.len()
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.find(cell).is_some()
    }

    pub fn find(&self, cell: CellId) -> Option<usize> {
        self.positions.get(&cell).copied()
    }

    pub fn get(&self, pos: usize) -> Option<CellId> {
        self.slots.get(pos).copied().flatten()
    }

    pub fn first(&mut self) -> Option<CellId> {
        self.pack();
        self.slots.first().copied().flatten()
    }

    pub fn iter(&mut self) -> impl Iterator<Item = CellId> + '_ {
        self.pack();
        self.slots.iter().flatten().copied()
    }

    /// Snapshot of the members, for loops that move cells out of the list.
    pub fn to_vec(&mut self) -> Vec<CellId> {
        self.iter().collect()
    }

    fn attach(&mut self, pos: usize, cell: CellId) -> Result<usize> {
        if self.contains(cell) {
            return Err(PartitionError::DuplicateCell { cell });
        }
        let slot = if pos >= self.slots.len() {
            self.pack();
            self.slots.push(Some(cell));
            self.slots.len() - 1
        } else {
            if self.slots[pos].is_some() {
                return Err(PartitionError::SlotOccupied { slot: pos });
            }
            self.slots[pos] = Some(cell);
            pos
        };
        self.positions.insert(cell, slot);
        Ok(slot)
    }

    fn detach(&mut self, cell: CellId) -> Result<()> {
        let slot = self
            .find(cell)
            .ok_or(PartitionError::CellNotInList { cell })?;
        self.slots[slot] = None;
        self.positions.remove(&cell);
        self.dirty = true;
        Ok(())
    }

    fn invalidate(&mut self) {
        self.square = None;
        self.gain = None;
    }

    /// Places `cell` at `pos`. Any position at or past [`CellList::end`] appends; a
    /// position below it must be an emptied slot.
    pub fn insert(&mut self, pos: usize, cell: CellId) -> Result<usize> {
        let slot = self.attach(pos, cell)?;
        self.invalidate();
        Ok(slot)
    }

    pub fn push(&mut self, cell: CellId) -> Result<usize> {
        self.insert(self.end(), cell)
    }

    pub fn remove(&mut self, cell: CellId, cells: &[Cell]) -> Result<()> {
        if cells[cell.index()].is_fixed() {
            return Err(PartitionError::FixedCellMove { cell });
        }
        self.detach(cell)?;
        self.invalidate();
        Ok(())
    }

    /// Moves the cell at `from_pos` in `from` to `pos_to` in this list.
    pub fn splice(
        &mut self,
        pos_to: usize,
        from: &mut CellList,
        from_pos: usize,
        cells: &[Cell],
    ) -> Result<usize> {
        let cell = from
            .get(from_pos)
            .ok_or(PartitionError::EmptySlot { slot: from_pos })?;
        if cells[cell.index()].is_fixed() {
            return Err(PartitionError::FixedCellMove { cell });
        }
        from.detach(cell)?;
        let slot = self.attach(pos_to, cell)?;
        from.invalidate();
        self.invalidate();
        Ok(slot)
    }

    /// Moves every cell of `from`, in order, starting at `pos_to`.
    pub fn splice_all(&mut self, pos_to: usize, from: &mut CellList, cells: &[Cell]) -> Result<()> {
        let mut pos = pos_to;
        while let Some(cell) = from.first() {
            let from_pos = from.find(cell).ok_or(PartitionError::CellNotInList { cell })?;
            pos = self.splice(pos, from, from_pos, cells)? + 1;
        }
        Ok(())
    }

    /// Moves the cell at `pos` to the end of `to`, carrying its area from this list's
    /// memoized sum to the other's. With `update_gain` its gain is carried the same way;
    /// without it both gain memos are left alone because the caller already accounted
    /// for the gain.
    pub fn transfer_to(
        &mut self,
        pos: usize,
        to: &mut CellList,
        cells: &[Cell],
        update_gain: bool,
    ) -> Result<CellId> {
        let cell = self.get(pos).ok_or(PartitionError::EmptySlot { slot: pos })?;
        let c = &cells[cell.index()];
        if c.is_fixed() {
            return Err(PartitionError::FixedCellMove { cell });
        }

        let from_square = self.square(cells) - c.square();
        let to_square = to.square(cells) + c.square();
        let gains = if update_gain {
            Some((self.gain_sum(cells) - c.gain(), to.gain_sum(cells) + c.gain()))
        } else {
            None
        };

        self.detach(cell)?;
        to.attach(to.end(), cell)?;

        self.square = Some(from_square);
        to.square = Some(to_square);
        if let Some((from_gain, to_gain)) = gains {
            self.gain = Some(from_gain);
            to.gain = Some(to_gain);
        }
        Ok(cell)
    }

    pub fn square(&mut self, cells: &[Cell]) -> Square {
        if let Some(square) = self.square {
            return square;
        }
        let square = self.slots.iter().flatten().map(|c| cells[c.index()].square()).sum();
        self.square = Some(square);
        square
    }

    pub fn gain_sum(&mut self, cells: &[Cell]) -> Weight {
        if let Some(gain) = self.gain {
            return gain;
        }
        let gain = self.slots.iter().flatten().map(|c| cells[c.index()].gain()).sum();
        self.gain = Some(gain);
        gain
    }

    pub fn invalidate_gain(&mut self) {
        self.gain = None;
    }

    /// Adjusts the memoized gain sum. An invalidated sum is recomputed from the cells on
    /// the next read, which already reflects the change.
    pub fn increment_gain_sum(&mut self, delta: Weight) {
        if let Some(gain) = self.gain.as_mut() {
            *gain += delta;
        }
    }
}
