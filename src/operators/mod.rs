//! Genetic operators over [`Schedule`](crate::schedule::Schedule)s.
pub mod crossover;
pub mod mutation;

pub use crossover::CrossoverOperator;
pub use mutation::{MutationOperator, MutationReport};
