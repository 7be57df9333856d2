use crate::{
    Cell, CellId, Net, NetId, NetPin, Partition, PartitionError, Pin, PinId, Result, Side,
    Solution, Square, Weight,
};
use std::collections::BTreeMap;

/// Nets spanning both sides of the cut.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CutStats {
    pub nets: Vec<NetId>,
    pub total_weight: Weight,
}

impl CutStats {
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }
}

/// Owner of all cells and nets, both partitions and the best solution seen so far.
#[derive(Debug)]
pub struct NetlistHypergraph {
    pub(crate) cells: Vec<Cell>,
    pub(crate) nets: Vec<Net>,
    pub(crate) partitions: [Partition; 2],
    pub(crate) best_solution: Solution,
    preset: [bool; 2],
    pin_count: u32,
}

impl Default for NetlistHypergraph {
    fn default() -> Self {
        Self::with_capacity(0, 0)
    }
}

impl NetlistHypergraph {
    pub fn with_capacity(cells: usize, nets: usize) -> Self {
        Self {
            cells: Vec::with_capacity(cells),
            nets: Vec::with_capacity(nets),
            partitions: [Partition::new(Side::Left), Partition::new(Side::Right)],
            best_solution: Solution::initial(),
            preset: [false; 2],
            pin_count: 0,
        }
    }

    pub fn add_cell(&mut self, square: Square) -> CellId {
        let id = CellId::from_raw(self.cells.len() as u32);
        let mut cell = Cell::new(id);
        cell.set_square(square);
        self.cells.push(cell);
        id
    }

    pub fn add_net(&mut self, weight: Weight) -> NetId {
        let id = NetId::from_raw(self.nets.len() as u32);
        let mut net = Net::new(id);
        net.set_weight(weight);
        self.nets.push(net);
        id
    }

    /// Creates a pin on `cell` and registers it with `net`.
    pub fn connect(&mut self, cell: CellId, net: NetId) -> Result<PinId> {
        self.check_cell(cell)?;
        let net_ref = self
            .nets
            .get_mut(net.index())
            .ok_or(PartitionError::UnknownNet { net })?;
        let pin = Pin::new(PinId::from_raw(self.pin_count), cell, net);
        self.pin_count += 1;
        net_ref.add_pin(&pin);
        let id = pin.id();
        self.cells[cell.index()].add_pin(pin);
        Ok(id)
    }

    pub(crate) fn name_last_pin(&mut self, cell: CellId, name: impl Into<String>) {
        if let Some(pin) = self.cells[cell.index()].pins.pop() {
            let pin = pin.with_name(name);
            self.cells[cell.index()].pins.push(pin);
        }
    }

    fn check_cell(&self, cell: CellId) -> Result<()> {
        if cell.index() < self.cells.len() {
            Ok(())
        } else {
            Err(PartitionError::UnknownCell { cell })
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    /// Construction-time access to a cell's setters.
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.index()]
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    pub fn net_mut(&mut self, id: NetId) -> &mut Net {
        &mut self.nets[id.index()]
    }

    pub fn partition(&self, side: Side) -> &Partition {
        &self.partitions[side.index()]
    }

    pub fn partition_mut(&mut self, side: Side) -> &mut Partition {
        &mut self.partitions[side.index()]
    }

    pub fn best_solution(&self) -> &Solution {
        &self.best_solution
    }

    pub fn find_cell(&self, name: &str) -> Option<CellId> {
        self.cells.iter().find(|c| c.name() == Some(name)).map(Cell::id)
    }

    pub fn find_net(&self, name: &str) -> Option<NetId> {
        self.nets.iter().find(|n| n.name() == Some(name)).map(Net::id)
    }

    /// Area currently assigned to `side`, locker and bucket together.
    pub fn square(&mut self, side: Side) -> Square {
        self.partitions[side.index()].square(&self.cells)
    }

    /// Gain total of `side`, locker and bucket together.
    pub fn gain(&mut self, side: Side) -> Weight {
        self.partitions[side.index()].gain(&self.cells)
    }

    /// Seeds the locker of `side` with fixed and initially placed cells. Fixed cells get
    /// area 0 and do not count toward the balance; squares of the initial cells are
    /// kept as built.
    pub fn preset(&mut self, side: Side, fixed: &[CellId], initial: &[CellId]) -> Result<()> {
        if self.preset[side.index()] {
            return Err(PartitionError::AlreadyPreset { side });
        }
        for &id in fixed.iter().chain(initial) {
            self.check_cell(id)?;
            if self.partitions.iter().any(|p| p.locker.contains(id)) {
                return Err(PartitionError::AlreadyAssigned { cell: id });
            }
        }

        let locker = &mut self.partitions[side.index()].locker;
        for &id in fixed {
            let cell = &mut self.cells[id.index()];
            cell.set_fixed(true);
            cell.set_square(0);
            cell.set_side(side);
            locker.push(id)?;
        }
        for &id in initial {
            let cell = &mut self.cells[id.index()];
            cell.set_fixed(false);
            cell.set_side(side);
            cell.locked = true;
            locker.push(id)?;
        }
        self.preset[side.index()] = true;
        Ok(())
    }

    /// Puts every cell not yet held by a locker into the locker of its current side.
    pub fn initialize_lockers(&mut self) -> Result<()> {
        for i in 0..self.cells.len() {
            let id = CellId::from_raw(i as u32);
            if self.partitions.iter().any(|p| p.locker.contains(id)) {
                continue;
            }
            if self.partitions.iter().any(|p| p.bucket.contains(id)) {
                return Err(PartitionError::AlreadyAssigned { cell: id });
            }
            let side = self.cells[i].side();
            self.partitions[side.index()].locker.push(id)?;
            self.cells[i].locked = true;
        }
        Ok(())
    }

    pub fn reset_gains(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.gain = 0;
        }
        for p in self.partitions.iter_mut() {
            p.locker.invalidate_gain();
        }
    }

    /// Adds every net's contribution to the gain of each cell on it: for a cell on one
    /// side, the weight of the net's pins on the other side minus those on its own side,
    /// plus the net weight. Gains accumulate, so reset them before calling this again.
    pub fn fill_buckets(&mut self) {
        for net in self.nets.iter() {
            let weight = net.weight();
            let (mut left, mut right) = (0, 0);
            for pin in net.pins() {
                match self.cells[pin.cell.index()].side() {
                    Side::Left => left += weight,
                    Side::Right => right += weight,
                }
            }
            for pin in net.pins() {
                let cell = &mut self.cells[pin.cell.index()];
                cell.gain += match cell.side() {
                    Side::Left => right - left + weight,
                    Side::Right => left - right + weight,
                };
            }
        }
        for p in self.partitions.iter_mut() {
            p.locker.invalidate_gain();
        }
    }

    /// Gain of `cell` computed from scratch with the [`NetlistHypergraph::fill_buckets`]
    /// formula.
    pub fn recompute_gain(&self, cell: CellId) -> Weight {
        let side = self.cells[cell.index()].side();
        let mut gain = 0;
        for pin in self.cells[cell.index()].pins() {
            let net = &self.nets[pin.net().index()];
            let weight = net.weight();
            let same = net.dim_on(side, &self.cells) as Weight;
            let other = net.dim() as Weight - same;
            gain += (other - same) * weight + weight;
        }
        gain
    }

    /// Adds `delta` to the cell's gain and to the aggregate of the container holding it.
    pub(crate) fn increment_gain(&mut self, cell: CellId, delta: Weight) {
        let cell = &mut self.cells[cell.index()];
        cell.gain += delta;
        let partition = &mut self.partitions[cell.side().index()];
        if cell.is_locked() {
            partition.locker.increment_gain_sum(delta);
        } else {
            partition.bucket.increment_gain(delta);
        }
    }

    /// Incrementally updates gains after `moved` changed side.
    ///
    /// Every other cell on a shared net gains `-2w` if it sits on the destination side
    /// and `+2w` if it stays behind. The moved cell's gain is rebuilt as
    /// `(behind - joined) * w` per net. Free cells whose gain changed are then moved to
    /// the gain list matching their new gain.
    ///
    /// Gains for a single net of 24 pins and weight W, moving cells left to right:
    ///
    /// ```text
    ///  L   R   Gl   Gr   dMC
    /// 12  12   1W   1W    -
    /// 11  13   3W  -1W   2W
    /// 10  14   5W  -3W   2W
    ///  ..
    ///  0  24  25W -23W   2W
    /// ```
    pub(crate) fn update_gains(&mut self, moved: CellId) -> Result<()> {
        let new_side = self.cells[moved.index()].side();
        let mut previous: BTreeMap<CellId, Weight> = BTreeMap::new();

        self.cells[moved.index()].gain = 0;

        let pins: Vec<(PinId, NetId)> = self.cells[moved.index()]
            .pins()
            .iter()
            .map(|p| (p.id(), p.net()))
            .collect();
        for (own_pin, net) in pins {
            let weight = self.nets[net.index()].weight();
            let (mut joined, mut behind) = (0, 0);

            for k in 0..self.nets[net.index()].pins.len() {
                let NetPin { pin, cell: other } = self.nets[net.index()].pins[k];
                if other == moved {
                    // Further pins of the moved cell on this net moved along with it.
                    if pin != own_pin {
                        joined += 1;
                    }
                    continue;
                }
                let cell = &self.cells[other.index()];
                let delta = if cell.side() == new_side {
                    joined += 1;
                    -2 * weight
                } else {
                    behind += 1;
                    2 * weight
                };
                if !cell.is_locked() {
                    previous.entry(other).or_insert(cell.gain());
                }
                self.increment_gain(other, delta);
            }

            self.increment_gain(moved, (behind - joined) * weight);
        }

        for (id, gain) in previous {
            let cell = &self.cells[id.index()];
            let (side, new_gain) = (cell.side(), cell.gain());
            self.partitions[side.index()]
                .bucket
                .relocate(id, gain, new_gain, &self.cells)?;
        }
        Ok(())
    }

    /// Nets whose pins span both sides.
    pub fn cut_stats(&self) -> CutStats {
        let mut stats = CutStats::default();
        for net in self.nets.iter() {
            let mut sides = net.pins().iter().map(|p| self.cells[p.cell.index()].side());
            if let Some(first) = sides.next() {
                if sides.any(|s| s != first) {
                    stats.nets.push(net.id());
                    stats.total_weight += net.weight();
                }
            }
        }
        stats
    }

    /// Final members of each side in locker order, fixed cells excluded.
    pub fn placement(&mut self) -> [Vec<CellId>; 2] {
        let cells = &self.cells;
        let [left, right] = &mut self.partitions;
        [left, right].map(|p| {
            p.locker
                .iter()
                .filter(|id| !cells[id.index()].is_fixed())
                .collect()
        })
    }
}
