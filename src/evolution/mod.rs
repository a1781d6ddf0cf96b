pub mod launcher;
pub mod options;
pub mod stats;

pub use launcher::{EvolutionLauncher, EvolutionResult, LifeCycleState, TerminationReason};
pub use options::{EvolutionOptions, LogLevel, MutationSchedule, MutationTier};
pub use stats::GenerationStats;
