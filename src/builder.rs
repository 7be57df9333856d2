use crate::{CellId, NetId, NetlistHypergraph, PinId, Side, Square, Weight};
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Assembles a [`NetlistHypergraph`] by name.
///
/// Cells start on the left side unless placed otherwise. Fixed cells keep their area.
#[derive(Default)]
pub struct HypergraphBuilder {
    graph: NetlistHypergraph,
    cells: HashMap<String, CellId>,
    nets: HashMap<String, NetId>,
}

impl HypergraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cell(&mut self, name: &str, square: Square) -> Result<CellId> {
        if self.cells.contains_key(name) {
            bail!("duplicated cell '{name}'");
        }
        if square == 0 {
            bail!("cell '{name}' has illegal square {square}");
        }
        let id = self.graph.add_cell(square);
        self.graph.cell_mut(id).set_name(name);
        self.cells.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn add_net(&mut self, name: &str, weight: Weight) -> Result<NetId> {
        if self.nets.contains_key(name) {
            bail!("duplicated net '{name}'");
        }
        let id = self.graph.add_net(weight);
        self.graph.net_mut(id).set_name(name);
        self.nets.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn connect(&mut self, net: &str, cell: &str, pin: Option<&str>) -> Result<PinId> {
        let net_id = *self.nets.get(net).with_context(|| format!("unknown net '{net}'"))?;
        let cell_id = self.cell(cell)?;
        let pin_id = self.graph.connect(cell_id, net_id)?;
        if let Some(pin) = pin {
            self.graph.name_last_pin(cell_id, pin);
        }
        Ok(pin_id)
    }

    pub fn place(&mut self, cell: &str, side: Side) -> Result<()> {
        let id = self.cell(cell)?;
        self.graph.cell_mut(id).set_side(side);
        Ok(())
    }

    /// Pins `cell` to `side` for the whole run.
    pub fn fix(&mut self, cell: &str, side: Side) -> Result<()> {
        let id = self.cell(cell)?;
        let cell = self.graph.cell_mut(id);
        cell.set_fixed(true);
        cell.set_side(side);
        Ok(())
    }

    fn cell(&self, name: &str) -> Result<CellId> {
        self.cells
            .get(name)
            .copied()
            .with_context(|| format!("unknown cell '{name}'"))
    }

    pub fn build(self) -> NetlistHypergraph {
        self.graph
    }

    pub fn deserialize_netlist<P: AsRef<Path>>(path: P) -> Result<NetlistHypergraph> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
        Self::read_netlist(BufReader::new(file))
            .with_context(|| format!("could not read netlist {}", path.display()))
    }

    /// Reads the line based netlist format:
    ///
    /// ```text
    /// <cell> <square>
    /// fixedleft <cell>
    /// fixedright <cell>
    /// <net> <weight> <cell> <pin> [<cell> <pin> ...]
    /// ```
    ///
    /// Nets are resolved after all cells have been read.
    pub fn read_netlist<R: BufRead>(reader: R) -> Result<NetlistHypergraph> {
        let mut builder = Self::new();
        let mut nets: Vec<(usize, Vec<String>)> = vec![];

        for (ln, line) in reader.lines().enumerate() {
            let ln = ln + 1;
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
                continue;
            }
            let words: Vec<&str> = line.split_ascii_whitespace().collect();
            match words.as_slice() {
                [_] => bail!("line {ln}: expected at least two fields"),
                ["fixedleft", cell] => builder
                    .fix(cell, Side::Left)
                    .with_context(|| format!("line {ln}"))?,
                ["fixedright", cell] => builder
                    .fix(cell, Side::Right)
                    .with_context(|| format!("line {ln}"))?,
                [cell, square] => {
                    let square = square
                        .parse::<Square>()
                        .with_context(|| format!("line {ln}: could not parse square of '{cell}'"))?;
                    builder
                        .add_cell(cell, square)
                        .with_context(|| format!("line {ln}"))?;
                }
                _ => nets.push((ln, words.iter().map(|w| w.to_string()).collect())),
            }
        }

        for (ln, words) in nets {
            let weight = words[1]
                .parse::<Weight>()
                .with_context(|| format!("line {ln}: could not parse weight of '{}'", words[0]))?;
            builder
                .add_net(&words[0], weight)
                .with_context(|| format!("line {ln}"))?;
            let pins = &words[2..];
            if pins.len() % 2 != 0 {
                bail!("line {ln}: net '{}' has a cell without a pin name", words[0]);
            }
            for pair in pins.chunks(2) {
                builder
                    .connect(&words[0], &pair[0], Some(pair[1].as_str()))
                    .with_context(|| format!("line {ln}"))?;
            }
        }

        log::trace!(
            "read netlist with {} cells and {} nets",
            builder.cells.len(),
            builder.nets.len()
        );
        Ok(builder.build())
    }
}
