pub mod catalog;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod operators;
pub mod report;
pub mod rng;
pub mod schedule;
pub mod selection;
pub mod strategy;

// Re-export commonly used types for convenience
pub use catalog::{Event, EventCatalog, EventId};
pub use error::{OptionExt, Result, ResultExt, TimetableError};
pub use evolution::{EvolutionLauncher, EvolutionOptions, EvolutionResult};
pub use fitness::{Challenge, FitnessEvaluator};
pub use report::TimetableReport;
pub use schedule::Schedule;
