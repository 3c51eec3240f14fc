//! Ingestion loop and the scheduler that drives it.

mod cycle;
mod scheduler;

pub use cycle::{IngestionLoop, TickOutcome, TickStats};
pub use scheduler::{Command, Scheduler};
