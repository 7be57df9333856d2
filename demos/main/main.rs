use anyhow::{Context, Result};
use fm_bisection::{BisectionPartitioningConfig, HypergraphBuilder, InitialPartitioningMethod};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time;

fn main() -> Result<()> {
    env_logger::init();
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "graphs/6.net".to_string());

    let mut graph = HypergraphBuilder::deserialize_netlist(&input)?;
    let t1 = time::Instant::now();
    let report = graph.partition_bisection(&BisectionPartitioningConfig {
        rng_seed: 2018,
        initial_partitioning: InitialPartitioningMethod::Random,
        ..Default::default()
    })?;
    println!("time: {}ms", t1.elapsed().as_millis());
    println!(
        "passes: {}, squares {} / {}, cut nets: {}, total weight: {}",
        report.passes,
        report.squares[0],
        report.squares[1],
        report.cut.net_count(),
        report.cut.total_weight
    );

    let [left, right] = graph.placement();
    for (suffix, side) in [("left", &left), ("right", &right)] {
        let path = format!("{input}_{suffix}");
        let mut out = BufWriter::new(File::create(&path).with_context(|| format!("creating {path}"))?);
        for &id in side.iter() {
            writeln!(out, "{}", graph.cell(id).label())?;
        }
    }

    let path = format!("{input}_stat");
    let mut out = BufWriter::new(File::create(&path).with_context(|| format!("creating {path}"))?);
    writeln!(out, "Nets cutting:")?;
    let mut names = Vec::with_capacity(report.cut.net_count());
    for &net in report.cut.nets.iter() {
        let name = graph.net(net).name().map(str::to_string).unwrap_or_else(|| net.to_string());
        writeln!(out, "{name}")?;
        names.push(name);
    }
    writeln!(
        out,
        "Cutting nets {} ={}, total weight is {}",
        names.join(" "),
        report.cut.net_count(),
        report.cut.total_weight
    )?;
    Ok(())
}
