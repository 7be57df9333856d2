use crate::{
    CutStats, InitialPartitioningMethod, Iteration, NetlistHypergraph, Result, Side, Square, Weight,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct BisectionPartitioningConfig {
    /// The seed for the random number generator.
    pub rng_seed: u64,
    /// What initial partitioning method to use.
    pub initial_partitioning: InitialPartitioningMethod,
    /// Allowed relative area imbalance between the two sides.
    pub square_tolerance: f64,
    /// If this is set to Some(n), at most n passes are run even if the last one still improved.
    pub max_passes: Option<u32>,
}

impl Default for BisectionPartitioningConfig {
    fn default() -> Self {
        Self {
            rng_seed: 1234,
            initial_partitioning: InitialPartitioningMethod::Random,
            square_tolerance: crate::SQUARE_TOLERANCE,
            max_passes: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BisectionReport {
    /// Number of passes run, including the final non-improving one.
    pub passes: u32,
    /// Sum of the improvements of all improving passes.
    pub improvement: Weight,
    /// Gain total of the final solution.
    pub objective: Weight,
    /// Final area of the left and right side.
    pub squares: [Square; 2],
    pub cut: CutStats,
}

impl NetlistHypergraph {
    /// Splits the graph into two parts while minimizing the edge cut cost.
    ///
    /// Cells already seeded with [`NetlistHypergraph::preset`] keep their locker; all other
    /// cells start on the side the builder gave them. Passes run until one finds no
    /// improvement, and the graph is rolled back to the best solution after every pass.
    pub fn partition_bisection(
        &mut self,
        config: &BisectionPartitioningConfig,
    ) -> Result<BisectionReport> {
        let mut rng = StdRng::seed_from_u64(config.rng_seed);

        self.initialize_lockers()?;
        self.partition_initial(config.initial_partitioning, &mut rng)?;
        self.reset_gains();
        self.fill_buckets();
        log::trace!("initial edge cut: {}", self.cut_stats().total_weight);

        let mut passes = 0;
        let mut improvement = 0;
        loop {
            let mut pass = Iteration::new(config.square_tolerance);
            let gained = pass.run(self)?;
            passes += 1;

            self.best_solution
                .write_lockers(&mut self.cells, &mut self.partitions)?;
            log::debug!(
                "pass: {}, improvement: {}, moves: {}, checkpoints: {}",
                passes,
                gained,
                pass.moves(),
                pass.checkpoints().len()
            );

            if gained <= 0 {
                break;
            }
            improvement += gained;
            if config.max_passes.is_some_and(|max| passes >= max) {
                log::debug!("stopping after {} passes", passes);
                break;
            }
        }

        let cut = self.cut_stats();
        log::info!(
            "cut nets: {}, total weight: {}, passes: {}",
            cut.net_count(),
            cut.total_weight,
            passes
        );
        Ok(BisectionReport {
            passes,
            improvement,
            objective: self.best_solution.cut(),
            squares: [self.square(Side::Left), self.square(Side::Right)],
            cut,
        })
    }
}
