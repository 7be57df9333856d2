use crate::partition::pair_mut;
use crate::{Cell, Partition, PartitionError, Result, Side, Square, Weight};

/// Assignment of one cell at checkpoint time.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CellRecord {
    pub side: Side,
    pub gain: Weight,
}

/// Snapshot of a full cell assignment, used to roll back to the best state seen.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    records: Vec<CellRecord>,
    gain: [Weight; 2],
    square: [Square; 2],
}

impl Solution {
    /// The empty marker every comparison accepts.
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn capture(cells: &[Cell]) -> Self {
        let mut solution = Self {
            records: Vec::with_capacity(cells.len()),
            ..Self::default()
        };
        for cell in cells {
            let side = cell.side().index();
            solution.records.push(CellRecord {
                side: cell.side(),
                gain: cell.gain(),
            });
            solution.gain[side] += cell.gain();
            solution.square[side] += cell.square();
        }
        solution
    }

    /// True while either side has no recorded area: there is nothing to compare against.
    pub fn is_initial(&self) -> bool {
        self.square[0] == 0 || self.square[1] == 0
    }

    /// Larger over smaller side area, 1.0 being perfectly balanced. `None` for the
    /// initial marker.
    pub fn ratio(&self) -> Option<f64> {
        if self.is_initial() {
            return None;
        }
        let (a, b) = (self.square[0] as f64, self.square[1] as f64);
        Some(a.max(b) / a.min(b))
    }

    /// Sum of the cell gains of both sides; the quantity the passes minimize.
    pub fn cut(&self) -> Weight {
        self.gain[0] + self.gain[1]
    }

    pub fn square(&self, side: Side) -> Square {
        self.square[side.index()]
    }

    pub fn gain(&self, side: Side) -> Weight {
        self.gain[side.index()]
    }

    /// Whether a state with the given side areas and gain total should replace this one:
    /// its balance ratio must stay within `tolerance` of ours and its gain total must be
    /// strictly lower. A state with an empty side never qualifies.
    pub fn improved(&self, square0: Square, square1: Square, gain: Weight, tolerance: f64) -> bool {
        if square0 == 0 || square1 == 0 {
            return false;
        }
        let Some(ratio) = self.ratio() else {
            return true;
        };
        let (a, b) = (square0 as f64, square1 as f64);
        let new_ratio = a.max(b) / a.min(b);
        new_ratio <= ratio * (1.0 + tolerance) && gain < self.cut()
    }

    /// Restores every cell's side and gain, then moves cells whose restored side
    /// disagrees with their locker into the other locker. Gains are not recomputed.
    pub fn write_lockers(&self, cells: &mut [Cell], partitions: &mut [Partition; 2]) -> Result<()> {
        if self.records.len() != cells.len() {
            return Err(PartitionError::SolutionSizeMismatch {
                recorded: self.records.len(),
                actual: cells.len(),
            });
        }
        if partitions.iter().any(|p| !p.bucket.is_empty()) {
            return Err(PartitionError::BucketsNotDrained);
        }

        for (cell, record) in cells.iter_mut().zip(&self.records) {
            cell.side = record.side;
            cell.gain = record.gain;
        }

        let mut moved = 0;
        for side in Side::BOTH {
            let (from, to) = pair_mut(partitions, side);
            for id in from.locker.to_vec() {
                if cells[id.index()].side() == side {
                    continue;
                }
                let pos = from
                    .locker
                    .find(id)
                    .ok_or(PartitionError::CellNotInList { cell: id })?;
                from.locker.transfer_to(pos, &mut to.locker, cells, false)?;
                moved += 1;
            }
        }
        for p in partitions.iter_mut() {
            p.locker.invalidate_gain();
        }
        log::trace!("restored solution with cut {}, {} cells moved", self.cut(), moved);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellId;

    fn cells(sides: &[Side]) -> Vec<Cell> {
        sides
            .iter()
            .enumerate()
            .map(|(i, &side)| {
                let mut c = Cell::new(CellId::from_raw(i as u32));
                c.set_square(1);
                c.set_side(side);
                c.gain = i as Weight;
                c.locked = true;
                c
            })
            .collect()
    }

    #[test]
    fn capture_aggregates() {
        let cells = cells(&[Side::Left, Side::Right, Side::Right]);
        let s = Solution::capture(&cells);
        assert_eq!(s.square(Side::Left), 1);
        assert_eq!(s.square(Side::Right), 2);
        assert_eq!(s.gain(Side::Right), 3);
        assert_eq!(s.cut(), 3);
        assert_eq!(s.ratio(), Some(2.0));
        assert!(!s.is_initial());
    }

    #[test]
    fn initial_accepts_anything_balanced() {
        let s = Solution::initial();
        assert!(s.is_initial());
        assert_eq!(s.ratio(), None);
        assert!(s.improved(5, 100, 1_000, 0.1));
        // An empty side is never an improvement.
        assert!(!s.improved(0, 100, -1_000, 0.1));
    }

    #[test]
    fn improvement_needs_lower_cut_and_ratio() {
        let cells = cells(&[Side::Left, Side::Left, Side::Right, Side::Right]);
        let s = Solution::capture(&cells);
        assert_eq!(s.cut(), 6);
        assert!(s.improved(2, 2, 5, 0.1));
        assert!(!s.improved(2, 2, 6, 0.1));
        assert!(s.improved(21, 20, 5, 0.1));
        assert!(!s.improved(3, 1, 0, 0.1));
    }

    #[test]
    fn write_lockers_restores_and_is_idempotent() {
        let mut cells = cells(&[Side::Left, Side::Left, Side::Right]);
        let mut parts = [Partition::new(Side::Left), Partition::new(Side::Right)];
        parts[0].locker.push(CellId::from_raw(0)).unwrap();
        parts[0].locker.push(CellId::from_raw(1)).unwrap();
        parts[1].locker.push(CellId::from_raw(2)).unwrap();
        let best = Solution::capture(&cells);

        // Simulate a pass that moved cell 1 to the right.
        cells[1].side = Side::Right;
        cells[1].gain = -7;
        let pos = parts[0].locker.find(CellId::from_raw(1)).unwrap();
        let (l, r) = pair_mut(&mut parts, Side::Left);
        l.locker.transfer_to(pos, &mut r.locker, &cells, true).unwrap();

        best.write_lockers(&mut cells, &mut parts).unwrap();
        let left = parts[0].locker.to_vec();
        let right = parts[1].locker.to_vec();
        assert_eq!(left, vec![CellId::from_raw(0), CellId::from_raw(1)]);
        assert_eq!(right, vec![CellId::from_raw(2)]);
        assert_eq!(cells[1].gain(), 1);
        assert_eq!(parts[0].gain(&cells) + parts[1].gain(&cells), best.cut());

        best.write_lockers(&mut cells, &mut parts).unwrap();
        assert_eq!(parts[0].locker.to_vec(), left);
        assert_eq!(parts[1].locker.to_vec(), right);
    }

    #[test]
    fn write_lockers_rejects_other_graph() {
        let mut cells = cells(&[Side::Left]);
        let mut parts = [Partition::new(Side::Left), Partition::new(Side::Right)];
        assert_eq!(
            Solution::initial().write_lockers(&mut cells, &mut parts),
            Err(PartitionError::SolutionSizeMismatch {
                recorded: 0,
                actual: 1
            })
        );
    }
}
