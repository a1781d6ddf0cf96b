use timetabler::{
    catalog::EventCatalog,
    error::TimetableError,
    fitness::{Challenge, FitnessEvaluator},
    operators::{CrossoverOperator, MutationOperator},
    rng::RandomNumberGenerator,
    schedule::{BoundedPlacementSearch, Schedule},
};

fn single_block(durations: &[usize]) -> EventCatalog {
    EventCatalog::from_durations(1, 1, 48, durations).unwrap()
}

fn starts(schedule: &Schedule) -> Vec<Option<usize>> {
    (0..schedule.event_count())
        .map(|event| schedule.start_of(event))
        .collect()
}

#[test]
fn test_packed_block_earns_only_edge_credits() {
    let catalog = single_block(&[2, 4, 1]);
    let evaluator = FitnessEvaluator::new(&catalog);
    let schedule = Schedule::from_starts(&catalog, &[0, 2, 6]).unwrap();

    let breakdown = evaluator.breakdown(&schedule);

    assert_eq!(breakdown.shared_slots, 0);
    // Only the block start and the slot after the last event are free neighbours.
    assert_eq!(breakdown.boundary_credits, 2);
    assert_eq!(breakdown.validity, 20.0);
    assert!(breakdown.total >= 0.0);
}

#[test]
fn test_forced_overlap_scores_lower() {
    let catalog = single_block(&[2, 4, 1]);
    let evaluator = FitnessEvaluator::new(&catalog);
    let mut valid = Schedule::from_starts(&catalog, &[0, 2, 6]).unwrap();
    let mut overlapping = Schedule::from_starts(&catalog, &[0, 1, 6]).unwrap();

    let valid_score = evaluator.evaluate(&mut valid);
    let overlapping_score = evaluator.evaluate(&mut overlapping);

    assert!(overlapping.has_overlap());
    assert!(overlapping_score < valid_score);
    assert!(overlapping_score < 0.0);
}

#[test]
fn test_overlap_loses_to_any_spread() {
    let catalog = single_block(&[24, 23, 1]);
    let evaluator = FitnessEvaluator::new(&catalog);
    // Fills the whole day, the worst spread an overlap-free schedule can have.
    let mut packed = Schedule::from_starts(&catalog, &[0, 24, 47]).unwrap();
    // Clustered mid-day but double-booked.
    let mut clustered = Schedule::from_starts(&catalog, &[12, 12, 20]).unwrap();

    let packed_score = evaluator.evaluate(&mut packed);
    let clustered_score = evaluator.evaluate(&mut clustered);

    assert!(!packed.has_overlap());
    assert!(evaluator.breakdown(&clustered).spread > evaluator.breakdown(&packed).spread);
    assert!(clustered_score < packed_score);
}

#[test]
fn test_crossover_with_fixed_cut() {
    let catalog = single_block(&[2, 2, 2, 2]);
    let first = Schedule::from_starts(&catalog, &[0, 4, 8, 12]).unwrap();
    let second = Schedule::from_starts(&catalog, &[20, 24, 28, 32]).unwrap();
    let crossover = CrossoverOperator::new(BoundedPlacementSearch::default());
    let mut rng = RandomNumberGenerator::from_seed(17);

    let (child_one, child_two) = crossover.crossover_at(&first, &second, &[2], &mut rng);

    assert_eq!(
        starts(&child_one),
        vec![Some(0), Some(4), Some(28), Some(32)]
    );
    assert_eq!(
        starts(&child_two),
        vec![Some(20), Some(24), Some(8), Some(12)]
    );
    assert!(child_one.is_consistent());
    assert!(child_two.is_consistent());
}

#[test]
fn test_certain_mutation_moves_single_event() {
    let catalog = single_block(&[4]);
    let evaluator = FitnessEvaluator::new(&catalog);
    let mutation = MutationOperator::default();

    for seed in 0..20 {
        let mut rng = RandomNumberGenerator::from_seed(seed);
        let mut schedule = Schedule::from_starts(&catalog, &[10]).unwrap();
        evaluator.evaluate(&mut schedule);

        let report = mutation.mutate(&mut schedule, 1.0, &evaluator, &mut rng);

        assert!(report.applied);
        assert_ne!(schedule.start_of(0), Some(10));
        assert!(schedule.is_consistent());
        assert_eq!(schedule.fitness(), evaluator.score(&schedule));
    }
}

#[test]
fn test_structural_properties_hold_through_operators() {
    let catalog = EventCatalog::from_durations(3, 5, 48, &[12, 8, 8, 4, 6, 2, 12, 4, 4, 6]).unwrap();
    let evaluator = FitnessEvaluator::new(&catalog);
    let search = BoundedPlacementSearch::default();
    let crossover = CrossoverOperator::new(search);
    let mutation = MutationOperator::new(search);
    let mut rng = RandomNumberGenerator::from_seed(2024);

    for _ in 0..25 {
        let first = Schedule::random(&catalog, &search, &mut rng);
        let second = Schedule::random(&catalog, &search, &mut rng);
        for schedule in [&first, &second] {
            assert!(schedule.is_complete());
            assert!(schedule.is_consistent());
        }

        let (mut one, two) =
            crossover.offspring(&first, &second, &mutation, 0.4, &evaluator, &mut rng);
        for child in [&one, &two] {
            assert!(child.is_complete());
            assert!(child.is_consistent());
            assert_eq!(child.fitness(), evaluator.score(child));
        }

        mutation.mutate(&mut one, 1.0, &evaluator, &mut rng);
        assert!(one.is_complete());
        assert!(one.is_consistent());
        assert_eq!(one.event_count(), catalog.len());
        assert_eq!(one.durations(), catalog.durations());
        let occupied: usize = (0..one.total_slots())
            .map(|slot| one.occupants(slot).len())
            .sum();
        assert_eq!(occupied, catalog.total_duration());
    }
}

#[test]
fn test_fitness_is_idempotent() {
    let catalog = EventCatalog::from_durations(2, 5, 48, &[4, 6, 8, 2, 3]).unwrap();
    let evaluator = FitnessEvaluator::new(&catalog);
    let mut rng = RandomNumberGenerator::from_seed(9);
    let mut schedule = Schedule::random(&catalog, &BoundedPlacementSearch::default(), &mut rng);

    let first = evaluator.evaluate(&mut schedule);
    let second = evaluator.evaluate(&mut schedule);
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn test_moves_keep_grid_and_placement_in_step() {
    let catalog = EventCatalog::from_durations(1, 2, 8, &[4]).unwrap();
    let mut schedule = Schedule::from_starts(&catalog, &[0]).unwrap();

    schedule.move_event(0, 2).unwrap();
    assert_eq!(schedule.start_of(0), Some(2));
    assert!(!schedule.is_occupied(0));
    assert!(schedule.is_consistent());

    // A start whose span would run into the next day is refused.
    let crossing = schedule.move_event(0, 6);
    assert!(matches!(crossing, Err(TimetableError::MalformedInput(_))));
    assert_eq!(schedule.start_of(0), Some(2));
    assert!(!schedule.is_occupied(8));
    assert!(schedule.is_consistent());

    assert!(Schedule::from_starts(&catalog, &[6]).is_err());
}
