mod orchestrator;
mod runtime;
mod shutdown;
mod startup;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use orchestrator::Coordinator;
pub use types::{ComponentState, RunSummary, ShutdownReason};
