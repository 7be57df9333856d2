use fm_bisection::{
    BisectionPartitioningConfig, CellId, HypergraphBuilder, InitialPartitioningMethod, Iteration,
    NetlistHypergraph, Side, Weight,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_graph(seed: u64, cells: usize, nets: usize) -> (NetlistHypergraph, Vec<CellId>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = NetlistHypergraph::with_capacity(cells, nets);
    let ids: Vec<CellId> = (0..cells)
        .map(|_| graph.add_cell(rng.gen_range(1..=3)))
        .collect();
    for _ in 0..nets {
        let net = graph.add_net(rng.gen_range(1..=4));
        let dim = rng.gen_range(2..=5);
        for &id in ids.choose_multiple(&mut rng, dim) {
            graph.connect(id, net).unwrap();
        }
    }
    for &id in &ids {
        if rng.gen_bool(0.5) {
            graph.cell_mut(id).set_side(Side::Right);
        }
    }
    (graph, ids)
}

/// Every cell sits in exactly one locker, the one matching its side.
fn assert_conserved(graph: &mut NetlistHypergraph, ids: &[CellId]) {
    let mut seen = HashSet::new();
    for side in Side::BOTH {
        for id in graph.partition_mut(side).locker.to_vec() {
            assert!(seen.insert(id), "{id} held twice");
            assert_eq!(graph.cell(id).side(), side, "{id}");
        }
        assert!(graph.partition_mut(side).bucket.is_empty());
    }
    assert_eq!(seen.len(), ids.len());
}

#[test]
fn partition_conserves_cells() {
    init();
    for seed in 0..8 {
        let (mut graph, ids) = random_graph(seed, 40, 60);
        graph
            .partition_bisection(&BisectionPartitioningConfig {
                rng_seed: seed,
                ..Default::default()
            })
            .unwrap();
        assert_conserved(&mut graph, &ids);
    }
}

#[test]
fn incremental_gains_match_recomputed() {
    init();
    for seed in 0..16 {
        let (mut graph, ids) = random_graph(seed, 30, 45);
        graph.initialize_lockers().unwrap();
        graph.fill_buckets();

        // After a full pass every free cell has been moved once.
        let mut pass = Iteration::new(0.1);
        pass.run(&mut graph).unwrap();
        for &id in &ids {
            assert_eq!(
                graph.cell(id).gain(),
                graph.recompute_gain(id),
                "seed {seed}, cell {id}"
            );
        }
        let sum: Weight = ids.iter().map(|&id| graph.cell(id).gain()).sum();
        assert_eq!(graph.gain(Side::Left) + graph.gain(Side::Right), sum);
    }
}

#[test]
fn repeated_pins_keep_gains_exact() {
    init();
    let netlist = "\
a 1
b 1
c 1
d 1
n1 1 a p1 a p2 b p1
n2 1 c p1 d p1
";
    let mut graph = HypergraphBuilder::read_netlist(netlist.as_bytes()).unwrap();
    let ids: Vec<CellId> = ["a", "b", "c", "d"]
        .iter()
        .map(|name| graph.find_cell(name).unwrap())
        .collect();
    graph.cell_mut(ids[2]).set_side(Side::Right);
    graph.cell_mut(ids[3]).set_side(Side::Right);
    graph.initialize_lockers().unwrap();
    graph.fill_buckets();

    Iteration::new(0.1).run(&mut graph).unwrap();
    for &id in &ids {
        assert_eq!(graph.cell(id).gain(), graph.recompute_gain(id), "cell {id}");
    }
}

#[test]
fn conserved_around_every_pass() {
    init();
    for seed in 0..4 {
        let (mut graph, ids) = random_graph(seed + 200, 30, 45);
        let fixed: Vec<CellId> = ids.iter().copied().step_by(5).collect();
        for &id in &fixed {
            graph.cell_mut(id).set_fixed(true);
        }
        graph.initialize_lockers().unwrap();
        graph.fill_buckets();

        for _ in 0..4 {
            assert_conserved(&mut graph, &ids);
            let mut pass = Iteration::new(0.1);
            pass.run(&mut graph).unwrap();
            assert_eq!(pass.moves(), ids.len() - fixed.len());
            assert_conserved(&mut graph, &ids);
            for &id in &fixed {
                for side in Side::BOTH {
                    assert!(!graph.partition(side).bucket.contains(id));
                }
            }
        }
    }
}

#[test]
fn rolled_back_gains_are_exact() {
    init();
    for seed in 0..8 {
        let (mut graph, ids) = random_graph(seed + 100, 30, 45);
        let report = graph
            .partition_bisection(&BisectionPartitioningConfig::default())
            .unwrap();
        for &id in &ids {
            assert_eq!(graph.cell(id).gain(), graph.recompute_gain(id));
        }
        assert_eq!(report.objective, graph.best_solution().cut());
    }
}

#[test]
fn fixed_cells_never_move() {
    init();
    let (mut graph, ids) = random_graph(42, 30, 50);
    let fixed: Vec<(CellId, Side)> = ids
        .iter()
        .step_by(7)
        .map(|&id| (id, graph.cell(id).side()))
        .collect();
    for &(id, _) in &fixed {
        graph.cell_mut(id).set_fixed(true);
    }

    graph
        .partition_bisection(&BisectionPartitioningConfig::default())
        .unwrap();
    for &(id, side) in &fixed {
        assert_eq!(graph.cell(id).side(), side);
        assert!(graph.partition_mut(side).locker.contains(id));
    }
    let [left, right] = graph.placement();
    for (id, _) in fixed {
        assert!(!left.contains(&id) && !right.contains(&id));
    }
}

#[test]
fn two_fixed_cells_cannot_improve() {
    init();
    let mut graph = NetlistHypergraph::default();
    let a = graph.add_cell(1);
    let b = graph.add_cell(1);
    for weight in [2, 5] {
        let net = graph.add_net(weight);
        graph.connect(a, net).unwrap();
        graph.connect(b, net).unwrap();
    }
    graph.preset(Side::Left, &[a], &[]).unwrap();
    graph.preset(Side::Right, &[b], &[]).unwrap();

    let report = graph
        .partition_bisection(&BisectionPartitioningConfig::default())
        .unwrap();
    assert_eq!(report.passes, 1);
    assert_eq!(report.improvement, 0);
    assert_eq!(graph.cell(a).side(), Side::Left);
    assert_eq!(graph.cell(b).side(), Side::Right);
    assert_eq!(report.cut.net_count(), 2);
    assert_eq!(report.cut.total_weight, 7);
}

#[test]
fn single_net_gain_table() {
    const W: Weight = 3;
    for k in 0..=12 {
        let mut graph = NetlistHypergraph::default();
        let net = graph.add_net(W);
        let ids: Vec<CellId> = (0..24).map(|_| graph.add_cell(1)).collect();
        for (i, &id) in ids.iter().enumerate() {
            graph.connect(id, net).unwrap();
            if i >= 12 - k {
                graph.cell_mut(id).set_side(Side::Right);
            }
        }
        graph.initialize_lockers().unwrap();
        graph.fill_buckets();

        let k = k as Weight;
        for &id in &ids {
            let expected = match graph.cell(id).side() {
                Side::Left => (2 * k + 1) * W,
                Side::Right => (1 - 2 * k) * W,
            };
            assert_eq!(graph.cell(id).gain(), expected, "k {k}");
        }
    }
}

#[test]
fn same_seed_same_placement() {
    init();
    let run = || {
        let (mut graph, _) = random_graph(7, 40, 60);
        graph
            .partition_bisection(&BisectionPartitioningConfig {
                rng_seed: 99,
                ..Default::default()
            })
            .unwrap();
        graph.placement()
    };
    assert_eq!(run(), run());
}

#[test]
fn netlist_round_trip_through_builder() {
    init();
    let netlist = "\
# two tight groups joined by a light net
a 1
b 1
c 1
d 1
e 1
f 1
fixedleft a
n1 5 a p1 b p1 c p1
n2 5 d p1 e p1 f p1
n3 1 c p2 d p2
";
    let mut graph = HypergraphBuilder::read_netlist(netlist.as_bytes()).unwrap();
    let report = graph
        .partition_bisection(&BisectionPartitioningConfig {
            initial_partitioning: InitialPartitioningMethod::Random,
            ..Default::default()
        })
        .unwrap();

    let a = graph.find_cell("a").unwrap();
    assert_eq!(graph.cell(a).side(), Side::Left);
    assert_eq!(report.squares[0] + report.squares[1], 6);

    let stats = graph.cut_stats();
    let weight: Weight = stats.nets.iter().map(|&n| graph.net(n).weight()).sum();
    assert_eq!(weight, stats.total_weight);
    assert_eq!(stats.total_weight, report.cut.total_weight);
}
