//! Repeated corrupt → clean → evaluate trials over one base series.
//!
//! Trials run sequentially and share one random source. Each trial's
//! baseline is the clean branch returned by the previous trial's injection,
//! not the series the run started from, so the baseline can shrink over a
//! run if rows are dropped along the way.
//!
//! # Example
//!
//! ```ignore
//! use tick_filter_core::SimulationConfig;
//! use tick_filter_simulation::TrialRunner;
//!
//! let runner = TrialRunner::new(SimulationConfig::default().with_seed(42));
//! let outcome = runner.run(1000, &base_series);
//! println!("Mean improvement: {:.4}", outcome.aggregate.mean_improvement);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tick_filter_core::{AggregateResult, OhlcvSeries, ScoredSeries, SimulationConfig, TrialResult};

use crate::cleaner::OutlierDetector;
use crate::evaluator::evaluate;
use crate::injector::CorruptionInjector;

/// The three series of a single trial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSeries {
    pub original: OhlcvSeries,
    /// Corrupted series with detector annotations.
    pub corrupted: ScoredSeries,
    pub cleaned: ScoredSeries,
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub aggregate: AggregateResult,
    pub trials: Vec<TrialResult>,
    /// Series of the final trial; `None` when no trial ran.
    pub last_trial: Option<TrialSeries>,
}

pub struct TrialRunner {
    injector: CorruptionInjector,
    detector: OutlierDetector,
    seed: Option<u64>,
}

impl TrialRunner {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            injector: CorruptionInjector::new(config.injection),
            detector: OutlierDetector::new(config.detection),
            seed: config.trials.seed,
        }
    }

    /// Runs `n_iterations` trials with a generator seeded from the config,
    /// or from entropy when no seed is set.
    #[must_use]
    pub fn run(&self, n_iterations: usize, base: &OhlcvSeries) -> RunOutcome {
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.run_with_rng(n_iterations, base, &mut rng)
    }

    /// Runs `n_iterations` trials drawing from `rng`.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        n_iterations: usize,
        base: &OhlcvSeries,
        rng: &mut R,
    ) -> RunOutcome {
        tracing::info!(
            "Running {} iterations on {} rows of {}",
            n_iterations,
            base.len(),
            base.symbol()
        );

        let mut trials = Vec::with_capacity(n_iterations);
        let mut last_trial = None;
        let mut baseline = base.clone();

        for iteration in 0..n_iterations {
            let injection = self.injector.inject(&baseline, &mut *rng);
            let cleaning = self.detector.clean(&injection.corrupted);
            let eval = evaluate(
                injection.clean.bars(),
                cleaning.cleaned.rows(),
                cleaning.scored.rows(),
            );

            let trial = TrialResult {
                dirty_error: eval.error_dirty_pct,
                clean_error: eval.error_clean_pct,
                improvement: eval.improvement_pp,
                corrupted_rows: injection.corrupted_indices.len(),
                flagged_rows: cleaning.scored.flagged_count(),
            };

            if trial.improvement.is_finite() {
                tracing::debug!(
                    "Trial {}: dirty {:.4}%, clean {:.4}%, flagged {}",
                    iteration,
                    trial.dirty_error,
                    trial.clean_error,
                    trial.flagged_rows
                );
            } else {
                tracing::warn!(
                    "Trial {} produced a non-finite result (dirty {}, clean {})",
                    iteration,
                    trial.dirty_error,
                    trial.clean_error
                );
            }
            trials.push(trial);

            if iteration + 1 == n_iterations {
                last_trial = Some(TrialSeries {
                    original: injection.clean.clone(),
                    corrupted: cleaning.scored,
                    cleaned: cleaning.cleaned,
                });
            }
            baseline = injection.clean;
        }

        let aggregate = AggregateResult::from_trials(&trials);
        tracing::info!(
            "Finished {} iterations: mean improvement {:.4} pp",
            aggregate.iterations,
            aggregate.mean_improvement
        );

        RunOutcome {
            aggregate,
            trials,
            last_trial,
        }
    }
}
