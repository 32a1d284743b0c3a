//! The inject → clean → evaluate pipeline and the trial runner that repeats it.

pub mod cleaner;
pub mod evaluator;
pub mod injector;
pub mod runner;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cleaner::{price_changes, rolling_z_scores, Cleaning, OutlierDetector};
pub use evaluator::{evaluate, fair_value, Evaluation};
pub use injector::{CorruptionInjector, Injection};
pub use runner::{RunOutcome, TrialRunner, TrialSeries};
