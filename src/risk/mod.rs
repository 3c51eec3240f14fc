//! Windowed aggregation of risk scores and the alert state machine.

mod engine;
mod window;

pub use engine::{AlertMonitor, RunState, SharedMonitor, Verdict, WindowVerdict};
pub use window::WindowAggregator;
