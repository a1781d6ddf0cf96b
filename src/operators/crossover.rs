//! Segment crossover with conflict repair.
//!
//! The event sequence is cut into segments. Child one takes its placements
//! from parent one in even segments and from parent two in odd segments;
//! child two uses the opposite roles. Events are copied in id order, and an
//! event whose preferred placement is already taken in the child falls back
//! to the other parent's placement, then to a bounded random search, and
//! finally to a forced placement. Every event of every child ends up placed.

use crate::catalog::EventId;
use crate::fitness::Challenge;
use crate::rng::RandomNumberGenerator;
use crate::schedule::{BoundedPlacementSearch, Schedule};

use super::mutation::MutationOperator;

/// Two-point crossover operator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct CrossoverOperator {
    search: BoundedPlacementSearch,
}

impl CrossoverOperator {
    pub fn new(search: BoundedPlacementSearch) -> Self {
        Self { search }
    }

    /// Crosses two parents at two random cut points.
    ///
    /// The children are complete but neither mutated nor scored.
    pub fn crossover(
        &self,
        first: &Schedule,
        second: &Schedule,
        rng: &mut RandomNumberGenerator,
    ) -> (Schedule, Schedule) {
        let events = first.event_count();
        let a = rng.gen_index(events + 1);
        let b = rng.gen_index(events + 1);
        self.crossover_at(first, second, &[a.min(b), a.max(b)], rng)
    }

    /// Crosses two parents at the given cut points.
    ///
    /// Events with an id below the first cut belong to segment 0, events
    /// between the first and second cut to segment 1, and so on.
    pub fn crossover_at(
        &self,
        first: &Schedule,
        second: &Schedule,
        cuts: &[usize],
        rng: &mut RandomNumberGenerator,
    ) -> (Schedule, Schedule) {
        debug_assert_eq!(first.event_count(), second.event_count());
        debug_assert_eq!(first.layout(), second.layout());

        let mut cuts = cuts.to_vec();
        cuts.sort_unstable();
        let first_preferred =
            |event: EventId| cuts.iter().filter(|&&cut| cut <= event).count() % 2 == 0;

        let child_one = self.recombine(first, second, &first_preferred, rng);
        let child_two = self.recombine(second, first, &first_preferred, rng);
        (child_one, child_two)
    }

    /// Full crossover step: recombine, mutate each child, score each child.
    pub fn offspring<C>(
        &self,
        first: &Schedule,
        second: &Schedule,
        mutation: &MutationOperator,
        mutation_probability: f64,
        challenge: &C,
        rng: &mut RandomNumberGenerator,
    ) -> (Schedule, Schedule)
    where
        C: Challenge + ?Sized,
    {
        let (mut child_one, mut child_two) = self.crossover(first, second, rng);
        mutation.mutate(&mut child_one, mutation_probability, challenge, rng);
        mutation.mutate(&mut child_two, mutation_probability, challenge, rng);
        (child_one, child_two)
    }

    fn recombine<F>(
        &self,
        preferred: &Schedule,
        fallback: &Schedule,
        prefers_first: &F,
        rng: &mut RandomNumberGenerator,
    ) -> Schedule
    where
        F: Fn(EventId) -> bool,
    {
        let mut child = Schedule::empty_like(preferred);

        for event in 0..child.event_count() {
            let duration = child.duration(event);
            let (primary, secondary) = if prefers_first(event) {
                (preferred, fallback)
            } else {
                (fallback, preferred)
            };

            let start = [primary.start_of(event), secondary.start_of(event)]
                .into_iter()
                .flatten()
                .find(|&start| child.is_free(start, duration))
                .unwrap_or_else(|| {
                    self.search
                        .find_in_any_block(&child, duration, None, rng)
                        .start()
                });

            child.place(event, start);
        }

        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EventCatalog;
    use crate::fitness::FitnessEvaluator;

    #[test]
    fn test_conflicting_event_falls_back() {
        let catalog = EventCatalog::from_durations(1, 1, 48, &[4, 4]).unwrap();
        let first = Schedule::from_starts(&catalog, &[0, 10]).unwrap();
        // In the second parent event 1 sits where event 0 sits in the first.
        let second = Schedule::from_starts(&catalog, &[30, 0]).unwrap();
        let operator = CrossoverOperator::default();
        let mut rng = RandomNumberGenerator::from_seed(5);

        let (child, _) = operator.crossover_at(&first, &second, &[1], &mut rng);

        // Event 0 comes from the first parent, event 1 prefers slot 0 from
        // the second parent, finds it taken and falls back to slot 10.
        assert_eq!(child.start_of(0), Some(0));
        assert_eq!(child.start_of(1), Some(10));
        assert!(!child.has_overlap());
    }

    #[test]
    fn test_unresolvable_conflict_is_forced() {
        let catalog = EventCatalog::from_durations(1, 1, 4, &[4, 4]).unwrap();
        let first = Schedule::from_starts(&catalog, &[0, 0]).unwrap();
        let second = first.clone();
        let operator = CrossoverOperator::new(BoundedPlacementSearch::new(3));
        let mut rng = RandomNumberGenerator::from_seed(5);

        let (one, two) = operator.crossover(&first, &second, &mut rng);
        for child in [one, two] {
            assert!(child.is_complete());
            assert!(child.has_overlap());
            assert!(child.is_consistent());
        }
    }

    #[test]
    fn test_offspring_are_scored() {
        let catalog = EventCatalog::from_durations(2, 5, 48, &[4, 6, 8, 2, 3]).unwrap();
        let evaluator = FitnessEvaluator::new(&catalog);
        let search = BoundedPlacementSearch::default();
        let mut rng = RandomNumberGenerator::from_seed(21);
        let first = Schedule::random(&catalog, &search, &mut rng);
        let second = Schedule::random(&catalog, &search, &mut rng);

        let (one, two) = CrossoverOperator::default().offspring(
            &first,
            &second,
            &MutationOperator::default(),
            0.5,
            &evaluator,
            &mut rng,
        );

        for child in [one, two] {
            assert!(child.is_complete());
            assert!(child.is_consistent());
            assert_eq!(child.fitness(), evaluator.score(&child));
        }
    }
}
