pub mod decision;
pub mod runner;

pub use decision::{Decision, InvalidReason, decide};
pub use runner::{RunSummary, Watcher};
