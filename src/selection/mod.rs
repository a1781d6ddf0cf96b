pub mod elitist;
pub mod rank;
pub mod selection_strategy;

pub use elitist::ElitistSelection;
pub use rank::RankBiasedSelection;
pub use selection_strategy::{compare_descending, sort_descending, SelectionStrategy};
