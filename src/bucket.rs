use crate::{Cell, CellId, CellList, PartitionError, Result, Square, Weight};
use std::collections::BTreeMap;

/// Free cells of one partition, grouped by gain.
///
/// Keys with an empty list are removed as soon as they empty, so the last key is always
/// the highest gain among the bucket's cells. The area and gain totals are maintained
/// incrementally by the callers that move cells in and out.
#[derive(Clone, Debug, Default)]
pub struct Bucket {
    lists: BTreeMap<Weight, CellList>,
    square: Square,
    gain: Weight,
}

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn square(&self) -> Square {
        self.square
    }

    pub fn gain(&self) -> Weight {
        self.gain
    }

    pub fn subtract_square(&mut self, square: Square) {
        self.square -= square;
    }

    pub fn increment_gain(&mut self, delta: Weight) {
        self.gain += delta;
    }

    /// Moves every non-fixed cell of `source` into the gain list matching its gain and
    /// unlocks it. Fixed cells stay behind in `source`.
    pub fn fill_by_gain(&mut self, source: &mut CellList, cells: &mut [Cell]) -> Result<()> {
        if !self.is_empty() {
            return Err(PartitionError::BucketNotEmpty);
        }

        self.gain = 0;
        for id in source.to_vec() {
            let cell = &mut cells[id.index()];
            if cell.is_fixed() {
                continue;
            }
            cell.locked = false;
            let gain = cell.gain;
            self.gain += gain;
            self.square += cell.square;

            let pos = source.find(id).ok_or(PartitionError::CellNotInList { cell: id })?;
            let list = self.lists.entry(gain).or_default();
            source.transfer_to(pos, list, cells, true)?;
        }
        source.invalidate_gain();
        Ok(())
    }

    pub fn max_gain(&self) -> Option<Weight> {
        self.lists.keys().next_back().copied()
    }

    /// The highest gain and the first cell listed under it.
    pub fn top(&mut self) -> Option<(Weight, CellId)> {
        let (&gain, list) = self.lists.iter_mut().next_back()?;
        list.first().map(|cell| (gain, cell))
    }

    pub fn list_mut(&mut self, gain: Weight) -> Option<&mut CellList> {
        self.lists.get_mut(&gain)
    }

    /// Drops the list for `gain` if it no longer holds any cell.
    pub fn remove_if_empty(&mut self, gain: Weight) {
        if let Some(list) = self.lists.get_mut(&gain) {
            if list.is_empty() {
                self.lists.remove(&gain);
            }
        }
    }

    /// Moves `cell` from the list for `from_gain` to the back of the list for `to_gain`.
    pub fn relocate(
        &mut self,
        cell: CellId,
        from_gain: Weight,
        to_gain: Weight,
        cells: &[Cell],
    ) -> Result<()> {
        let missing = PartitionError::MissingFromBucket {
            cell,
            gain: from_gain,
        };
        let list = self.lists.get_mut(&from_gain).ok_or(missing.clone())?;
        if !list.contains(cell) {
            return Err(missing);
        }
        list.remove(cell, cells)?;
        self.lists.entry(to_gain).or_default().push(cell)?;
        self.remove_if_empty(from_gain);
        Ok(())
    }

    /// Gain keys and their members, highest gain first.
    pub fn gains(&mut self) -> Vec<(Weight, Vec<CellId>)> {
        self.lists
            .iter_mut()
            .rev()
            .map(|(&gain, list)| (gain, list.to_vec()))
            .collect()
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.lists.values().any(|list| list.contains(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> CellId {
        CellId::from_raw(i)
    }

    fn locked_cells(gains: &[Weight]) -> Vec<Cell> {
        gains
            .iter()
            .enumerate()
            .map(|(i, &g)| {
                let mut c = Cell::new(id(i as u32));
                c.set_square(2);
                c.gain = g;
                c.locked = true;
                c
            })
            .collect()
    }

    #[test]
    fn fill_groups_by_gain() {
        let mut cells = locked_cells(&[3, -1, 3, 0]);
        cells[3].set_fixed(true);
        let mut locker = CellList::from_cells((0..4).map(id)).unwrap();
        let mut bucket = Bucket::new();

        bucket.fill_by_gain(&mut locker, &mut cells).unwrap();

        assert_eq!(locker.to_vec(), vec![id(3)]);
        assert_eq!(bucket.max_gain(), Some(3));
        assert_eq!(bucket.top(), Some((3, id(0))));
        assert_eq!(bucket.gain(), 5);
        assert_eq!(bucket.square(), 6);
        assert_eq!(
            bucket.gains(),
            vec![(3, vec![id(0), id(2)]), (-1, vec![id(1)])]
        );
        assert!(!cells[0].is_locked());
        assert!(cells[3].is_locked());
        assert_eq!(locker.gain_sum(&cells), 0);
        assert_eq!(locker.square(&cells), 2);
    }

    #[test]
    fn refill_is_rejected() {
        let mut cells = locked_cells(&[1, 2]);
        let mut first = CellList::from_cells([id(0)]).unwrap();
        let mut second = CellList::from_cells([id(1)]).unwrap();
        let mut bucket = Bucket::new();
        bucket.fill_by_gain(&mut first, &mut cells).unwrap();
        assert_eq!(
            bucket.fill_by_gain(&mut second, &mut cells),
            Err(PartitionError::BucketNotEmpty)
        );
    }

    #[test]
    fn relocate_drops_empty_key() {
        let mut cells = locked_cells(&[4, 4, 1]);
        let mut locker = CellList::from_cells((0..3).map(id)).unwrap();
        let mut bucket = Bucket::new();
        bucket.fill_by_gain(&mut locker, &mut cells).unwrap();

        bucket.relocate(id(2), 1, 6, &cells).unwrap();
        assert_eq!(bucket.gains(), vec![(6, vec![id(2)]), (4, vec![id(0), id(1)])]);

        // Same key: the cell moves to the back of its list.
        bucket.relocate(id(0), 4, 4, &cells).unwrap();
        assert_eq!(bucket.gains()[1], (4, vec![id(1), id(0)]));

        assert_eq!(
            bucket.relocate(id(1), 6, 2, &cells),
            Err(PartitionError::MissingFromBucket { cell: id(1), gain: 6 })
        );
    }

    #[test]
    fn aggregates_are_incremental() {
        let mut bucket = Bucket::new();
        bucket.increment_gain(5);
        bucket.increment_gain(-2);
        bucket.subtract_square(-4);
        assert_eq!(bucket.gain(), 3);
        assert_eq!(bucket.square(), 4);
        assert!(bucket.is_empty());
        assert_eq!(bucket.top(), None);
    }
}
