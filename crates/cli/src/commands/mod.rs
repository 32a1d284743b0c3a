//! CLI commands for the bad-tick simulation.

pub mod fetch_data;
pub mod simulate;

pub use fetch_data::{run_fetch_data, FetchDataArgs};
pub use simulate::{run_simulate, SimulateArgs};
