use crate::partition::pair_mut;
use crate::{NetlistHypergraph, PartitionError, Result, Side, Solution, Weight};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IterationState {
    /// Buckets are being filled from the lockers.
    Filling,
    /// Choosing the side to move a cell from.
    Selecting,
    Moving,
    /// Comparing the current state against the best solution.
    Checkpointing,
    /// Every free cell has been moved once.
    Drained,
}

/// One Fiduccia-Mattheyses pass: every free cell is moved exactly once, highest gain
/// first, while the best intermediate assignment is checkpointed.
#[derive(Clone, Debug)]
pub struct Iteration {
    state: IterationState,
    tolerance: f64,
    improvement: Weight,
    moves: usize,
    checkpoints: Vec<Weight>,
}

impl Iteration {
    pub fn new(tolerance: f64) -> Self {
        Self {
            state: IterationState::Filling,
            tolerance,
            improvement: 0,
            moves: 0,
            checkpoints: vec![],
        }
    }

    pub fn state(&self) -> IterationState {
        self.state
    }

    /// Cut reduction between the pass's baseline and its best checkpoint. Zero or less
    /// means the pass found nothing better.
    pub fn improvement(&self) -> Weight {
        self.improvement
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Cut of every accepted checkpoint, baseline first.
    pub fn checkpoints(&self) -> &[Weight] {
        &self.checkpoints
    }

    pub fn run(&mut self, graph: &mut NetlistHypergraph) -> Result<Weight> {
        self.state = IterationState::Filling;
        {
            let cells = &mut graph.cells;
            for p in graph.partitions.iter_mut() {
                p.bucket.fill_by_gain(&mut p.locker, cells)?;
            }
        }
        graph.best_solution = Solution::capture(&graph.cells);
        self.checkpoints.push(graph.best_solution.cut());
        self.improvement = 0;
        log::trace!(
            "pass start: left square {}, right square {}, cut {}",
            graph.square(Side::Left),
            graph.square(Side::Right),
            graph.best_solution.cut()
        );

        loop {
            self.state = IterationState::Selecting;
            let Some(from) = self.select_side(graph) else {
                break;
            };

            self.state = IterationState::Moving;
            self.move_cell(graph, from)?;
            self.moves += 1;

            self.state = IterationState::Checkpointing;
            let (square0, square1) = (graph.square(Side::Left), graph.square(Side::Right));
            let gain = graph.gain(Side::Left) + graph.gain(Side::Right);
            if graph
                .best_solution
                .improved(square0, square1, gain, self.tolerance)
            {
                self.improvement += graph.best_solution.cut();
                graph.best_solution = Solution::capture(&graph.cells);
                self.improvement -= graph.best_solution.cut();
                self.checkpoints.push(graph.best_solution.cut());
                log::trace!(
                    "checkpoint after {} moves: cut {}, squares {}/{}",
                    self.moves,
                    gain,
                    square0,
                    square1
                );
            }
        }

        self.state = IterationState::Drained;
        Ok(self.improvement)
    }

    /// Side to move the next cell from, or `None` once both buckets are drained.
    ///
    /// An empty bucket forces a move from the other side, as does an area imbalance
    /// beyond the tolerance. Otherwise the side with the strictly higher top gain moves;
    /// on a tie the right side moves.
    pub fn select_side(&self, graph: &mut NetlistHypergraph) -> Option<Side> {
        let left_top = graph.partitions[0].bucket.max_gain();
        let right_top = graph.partitions[1].bucket.max_gain();
        match (left_top, right_top) {
            (None, None) => None,
            (Some(_), None) => Some(Side::Left),
            (None, Some(_)) => Some(Side::Right),
            (Some(left), Some(right)) => {
                let square0 = graph.square(Side::Left) as f64;
                let square1 = graph.square(Side::Right) as f64;
                if square0 > (1.0 + self.tolerance) * square1 {
                    Some(Side::Left)
                } else if square1 > (1.0 + self.tolerance) * square0 {
                    Some(Side::Right)
                } else if left > right {
                    Some(Side::Left)
                } else {
                    Some(Side::Right)
                }
            }
        }
    }

    /// Moves the first cell of `from`'s highest gain list to the other side's locker.
    pub fn move_cell(&self, graph: &mut NetlistHypergraph, from: Side) -> Result<()> {
        let to = from.opposite();
        let (top_gain, id) = graph.partitions[from.index()]
            .bucket
            .top()
            .ok_or(PartitionError::EmptyBucket { side: from })?;

        let cell = &mut graph.cells[id.index()];
        if cell.is_fixed() {
            return Err(PartitionError::FixedCellMove { cell: id });
        }
        if cell.side() != from {
            return Err(PartitionError::WrongSide {
                cell: id,
                expected: from,
                actual: cell.side(),
            });
        }
        let (square, gain) = (cell.square(), cell.gain());
        cell.side = to;
        cell.locked = true;

        let bucket = &mut graph.partitions[from.index()].bucket;
        bucket.subtract_square(square);
        bucket.increment_gain(-gain);
        log::trace!(
            "move {} {} -> {}, gain {}",
            graph.cells[id.index()].label(),
            from,
            to,
            gain
        );

        graph.update_gains(id)?;

        let cells = &graph.cells;
        let (source, target) = pair_mut(&mut graph.partitions, from);
        let list = source
            .bucket
            .list_mut(top_gain)
            .ok_or(PartitionError::MissingFromBucket { cell: id, gain: top_gain })?;
        let pos = list.find(id).ok_or(PartitionError::MissingFromBucket {
            cell: id,
            gain: top_gain,
        })?;
        list.transfer_to(pos, &mut target.locker, cells, false)?;
        source.bucket.remove_if_empty(top_gain);
        Ok(())
    }
}
