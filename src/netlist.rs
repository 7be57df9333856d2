use crate::{CellId, NetId, PinId, Side, Square, Weight};

/// A terminal linking exactly one cell to exactly one net. Owned by its cell.
#[derive(Clone, Debug)]
pub struct Pin {
    id: PinId,
    cell: CellId,
    net: NetId,
    name: Option<String>,
}

impl Pin {
    pub fn new(id: PinId, cell: CellId, net: NetId) -> Self {
        Self {
            id,
            cell,
            net,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> PinId {
        self.id
    }

    pub fn cell(&self) -> CellId {
        self.cell
    }

    pub fn net(&self) -> NetId {
        self.net
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A net's non-owning view of one of its pins.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct NetPin {
    pub pin: PinId,
    pub cell: CellId,
}

/// A weighted hyperedge.
#[derive(Clone, Debug)]
pub struct Net {
    id: NetId,
    name: Option<String>,
    weight: Weight,
    pub(crate) pins: Vec<NetPin>,
}

impl Net {
    pub fn new(id: NetId) -> Self {
        Self {
            id,
            name: None,
            weight: 1,
            pins: vec![],
        }
    }

    pub fn id(&self) -> NetId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn set_weight(&mut self, weight: Weight) {
        self.weight = weight;
    }

    /// Registers a pin. The pin itself lives in its cell's pin list.
    pub fn add_pin(&mut self, pin: &Pin) {
        debug_assert_eq!(pin.net(), self.id);
        self.pins.push(NetPin {
            pin: pin.id(),
            cell: pin.cell(),
        });
    }

    pub fn pins(&self) -> &[NetPin] {
        &self.pins
    }

    /// Number of pins on this net.
    pub fn dim(&self) -> usize {
        self.pins.len()
    }

    /// Number of pins whose cell currently sits on `side`.
    pub fn dim_on(&self, side: Side, cells: &[Cell]) -> usize {
        self.pins
            .iter()
            .filter(|p| cells[p.cell.index()].side() == side)
            .count()
    }
}

/// A movable or fixed unit of the hypergraph.
#[derive(Clone, Debug)]
pub struct Cell {
    id: CellId,
    name: Option<String>,
    pub(crate) square: Square,
    pub(crate) gain: Weight,
    pub(crate) fixed: bool,
    /// Set while the cell sits in a locker and is not eligible for selection.
    pub(crate) locked: bool,
    pub(crate) side: Side,
    pub(crate) pins: Vec<Pin>,
}

impl Cell {
    pub fn new(id: CellId) -> Self {
        Self {
            id,
            name: None,
            square: 0,
            gain: 0,
            fixed: false,
            locked: false,
            side: Side::Left,
            pins: vec![],
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Name for diagnostics, falling back to the id.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", self.id),
        }
    }

    pub fn square(&self) -> Square {
        self.square
    }

    pub fn set_square(&mut self, square: Square) {
        self.square = square;
    }

    pub fn gain(&self) -> Weight {
        self.gain
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Fixed cells are permanently locked.
    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
        if fixed {
            self.locked = true;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub(crate) fn add_pin(&mut self, pin: Pin) {
        debug_assert_eq!(pin.cell(), self.id);
        self.pins.push(pin);
    }
}
