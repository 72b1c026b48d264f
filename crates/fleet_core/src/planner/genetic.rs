//! Approximate assignment: a genetic algorithm over fixed-length
//! chromosomes, one drone per delivery.
//!
//! Operators are ordinary functions collected in a [`Toolbox`] of function
//! pointers; the solver runs simple generational replacement (tournament
//! selection, two-point crossover, shuffle-index mutation) while tracking
//! the best individual ever seen. Fitness is a deterministic forward
//! simulation of the chromosome using the simplified energy term
//! `distance · (1 + 0.1 · payload)` and a zone check that ignores activity
//! windows.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::geometry::distance;
use crate::planner::types::{AssignmentPair, DeliverySnapshot, DroneSnapshot};
use crate::world::NoFlyZone;

/// Fitness reward per completed delivery.
const COMPLETION_REWARD: f64 = 100.0;
/// Fitness penalty per unit of energy spent.
const ENERGY_PENALTY: f64 = 0.1;
/// Fitness penalty per constraint violation.
const VIOLATION_PENALTY: f64 = 1000.0;

/// GA parameters, defaulted to the planner's standard configuration.
#[derive(Debug, Clone)]
pub struct GaConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Per-pair crossover probability.
    pub crossover_prob: f64,
    /// Per-individual mutation probability.
    pub mutation_prob: f64,
    /// Per-gene shuffle probability inside a mutation.
    pub gene_shuffle_prob: f64,
    pub tournament_size: usize,
    /// When false, the fitness capacity check looks up the drone positioned
    /// at the delivery's index; when true, the drone selected by the gene.
    pub capacity_by_gene: bool,
    /// RNG seed; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 50,
            crossover_prob: 0.7,
            mutation_prob: 0.2,
            gene_shuffle_prob: 0.1,
            tournament_size: 3,
            capacity_by_gene: false,
            seed: None,
        }
    }
}

/// One chromosome: gene `i` names the drone (by fleet index) serving
/// delivery `i`. `fitness` is `None` until evaluated or after an operator
/// invalidated it.
#[derive(Debug, Clone)]
pub struct Individual {
    pub genes: Vec<usize>,
    pub fitness: Option<f64>,
}

fn fitness_of(individual: &Individual) -> f64 {
    individual.fitness.unwrap_or(f64::NEG_INFINITY)
}

/// The genetic operators as plain function references.
pub struct Toolbox {
    pub select: fn(&mut StdRng, &[Individual], usize) -> Individual,
    pub mate: fn(&mut StdRng, &mut [usize], &mut [usize]),
    pub mutate: fn(&mut StdRng, &mut [usize], f64),
}

impl Default for Toolbox {
    fn default() -> Self {
        Self {
            select: tournament_select,
            mate: two_point_crossover,
            mutate: shuffle_indices_mutation,
        }
    }
}

/// Tournament selection: the fittest of `size` uniform picks.
pub fn tournament_select(rng: &mut StdRng, population: &[Individual], size: usize) -> Individual {
    let mut best = population[rng.gen_range(0..population.len())].clone();
    for _ in 1..size.max(1) {
        let contender = &population[rng.gen_range(0..population.len())];
        if fitness_of(contender) > fitness_of(&best) {
            best = contender.clone();
        }
    }
    best
}

/// Two-point crossover: swap the gene segment between two cut points.
pub fn two_point_crossover(rng: &mut StdRng, a: &mut [usize], b: &mut [usize]) {
    let size = a.len().min(b.len());
    if size < 2 {
        return;
    }
    let mut lo = rng.gen_range(1..=size);
    let mut hi = rng.gen_range(1..=size - 1);
    if hi >= lo {
        hi += 1;
    } else {
        std::mem::swap(&mut lo, &mut hi);
    }
    for i in lo..hi {
        std::mem::swap(&mut a[i], &mut b[i]);
    }
}

/// Shuffle-index mutation: each gene swaps places with another uniformly
/// chosen position with probability `indpb`.
pub fn shuffle_indices_mutation(rng: &mut StdRng, genes: &mut [usize], indpb: f64) {
    let size = genes.len();
    if size < 2 {
        return;
    }
    for i in 0..size {
        if rng.gen::<f64>() < indpb {
            let mut j = rng.gen_range(0..size - 1);
            if j >= i {
                j += 1;
            }
            genes.swap(i, j);
        }
    }
}

/// Per-chromosome fitness decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessBreakdown {
    pub completed: usize,
    pub energy: f64,
    pub violations: usize,
    pub score: f64,
}

/// Deterministic forward simulation of a chromosome.
///
/// Deliveries are visited in index order; each drone carries a running
/// `(position, battery, payload)` seeded from its start position and full
/// battery. A delivery is rejected (one violation) when it overruns the
/// capacity check, when the straight-line energy exceeds the running
/// battery, or when its target lies inside any zone.
pub fn evaluate_chromosome(
    genes: &[usize],
    drones: &[DroneSnapshot],
    deliveries: &[DeliverySnapshot],
    zones: &[NoFlyZone],
    capacity_by_gene: bool,
) -> FitnessBreakdown {
    let mut completed = 0usize;
    let mut energy_total = 0.0f64;
    let mut violations = 0usize;

    let mut states: Vec<_> = drones
        .iter()
        .map(|d| (d.start_position, d.battery_capacity, 0.0f64))
        .collect();

    for (delivery_idx, &gene) in genes.iter().enumerate() {
        let delivery = &deliveries[delivery_idx];
        // Historical quirk kept by default: the capacity bound comes from
        // the drone positioned at the delivery's index, not the gene's
        // drone. Past the fleet size the gene's drone is the bound.
        let capacity = if capacity_by_gene {
            drones[gene].max_weight
        } else {
            drones
                .get(delivery_idx)
                .map_or(drones[gene].max_weight, |d| d.max_weight)
        };
        let (position, battery, payload) = &mut states[gene];

        if *payload + delivery.weight > capacity {
            violations += 1;
            continue;
        }

        let leg = distance(*position, delivery.position);
        let energy = leg * (1.0 + 0.1 * *payload);
        if energy > *battery {
            violations += 1;
            continue;
        }

        if zones.iter().any(|zone| zone.contains_point(delivery.position)) {
            violations += 1;
            continue;
        }

        *position = delivery.position;
        *battery -= energy;
        *payload += delivery.weight;
        energy_total += energy;
        completed += 1;
    }

    let score = COMPLETION_REWARD * completed as f64
        - ENERGY_PENALTY * energy_total
        - VIOLATION_PENALTY * violations as f64;
    FitnessBreakdown {
        completed,
        energy: energy_total,
        violations,
        score,
    }
}

/// Result of a GA run: the decoded best chromosome and its fitness.
#[derive(Debug, Clone)]
pub struct GaOutcome {
    pub pairs: Vec<AssignmentPair>,
    pub fitness: f64,
    pub completed: usize,
    pub violations: usize,
}

/// Population-based assignment solver.
pub struct GaSolver {
    config: GaConfig,
    toolbox: Toolbox,
}

impl GaSolver {
    pub fn new(config: GaConfig) -> Self {
        Self {
            config,
            toolbox: Toolbox::default(),
        }
    }

    pub fn with_toolbox(config: GaConfig, toolbox: Toolbox) -> Self {
        Self { config, toolbox }
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Run the GA and decode the best chromosome seen across all
    /// generations. `None` only when there is no fleet to assign to.
    pub fn optimize(
        &self,
        drones: &[DroneSnapshot],
        deliveries: &[DeliverySnapshot],
        zones: &[NoFlyZone],
    ) -> Option<GaOutcome> {
        if drones.is_empty() {
            return None;
        }
        if deliveries.is_empty() {
            return Some(GaOutcome {
                pairs: Vec::new(),
                fitness: 0.0,
                completed: 0,
                violations: 0,
            });
        }

        let cfg = &self.config;
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let evaluate = |genes: &[usize]| {
            evaluate_chromosome(genes, drones, deliveries, zones, cfg.capacity_by_gene).score
        };

        let mut population: Vec<Individual> = (0..cfg.population_size.max(1))
            .map(|_| {
                let genes: Vec<usize> = (0..deliveries.len())
                    .map(|_| rng.gen_range(0..drones.len()))
                    .collect();
                let fitness = Some(evaluate(&genes));
                Individual { genes, fitness }
            })
            .collect();

        let mut best = population
            .iter()
            .max_by(|a, b| fitness_of(a).total_cmp(&fitness_of(b)))
            .cloned()
            .unwrap_or_else(|| population[0].clone());

        for generation in 0..cfg.generations {
            let mut offspring: Vec<Individual> = (0..population.len())
                .map(|_| (self.toolbox.select)(&mut rng, &population, cfg.tournament_size))
                .collect();

            for i in (1..offspring.len()).step_by(2) {
                if rng.gen::<f64>() < cfg.crossover_prob {
                    let (left, right) = offspring.split_at_mut(i);
                    (self.toolbox.mate)(&mut rng, &mut left[i - 1].genes, &mut right[0].genes);
                    left[i - 1].fitness = None;
                    right[0].fitness = None;
                }
            }

            for individual in &mut offspring {
                if rng.gen::<f64>() < cfg.mutation_prob {
                    (self.toolbox.mutate)(&mut rng, &mut individual.genes, cfg.gene_shuffle_prob);
                    individual.fitness = None;
                }
            }

            for individual in &mut offspring {
                if individual.fitness.is_none() {
                    individual.fitness = Some(evaluate(&individual.genes));
                }
            }

            population = offspring;
            if let Some(generation_best) = population
                .iter()
                .max_by(|a, b| fitness_of(a).total_cmp(&fitness_of(b)))
            {
                if fitness_of(generation_best) > fitness_of(&best) {
                    best = generation_best.clone();
                }
            }
            debug!(generation, best_fitness = fitness_of(&best), "generation complete");
        }

        let breakdown =
            evaluate_chromosome(&best.genes, drones, deliveries, zones, cfg.capacity_by_gene);
        let pairs = best
            .genes
            .iter()
            .enumerate()
            .map(|(delivery_idx, &gene)| AssignmentPair {
                delivery_id: deliveries[delivery_idx].delivery_id.clone(),
                drone_id: drones[gene].drone_id.clone(),
            })
            .collect();

        Some(GaOutcome {
            pairs,
            fitness: breakdown.score,
            completed: breakdown.completed,
            violations: breakdown.violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn drone(id: &str, max_weight: f64, battery: f64, start: Point) -> DroneSnapshot {
        DroneSnapshot {
            drone_id: id.to_owned(),
            max_weight,
            battery_capacity: battery,
            speed: 10.0,
            start_position: start,
            position: start,
            battery,
            payload: 0.0,
        }
    }

    fn delivery(id: &str, position: Point, weight: f64) -> DeliverySnapshot {
        DeliverySnapshot {
            delivery_id: id.to_owned(),
            position,
            weight,
            priority: 3,
            window_start: now() - Duration::hours(1),
            window_end: now() + Duration::hours(1),
        }
    }

    #[test]
    fn crossover_and_mutation_preserve_the_gene_multiset() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut a = vec![0, 1, 2, 3, 4, 5];
        let mut b = vec![5, 4, 3, 2, 1, 0];
        two_point_crossover(&mut rng, &mut a, &mut b);
        let mut merged: Vec<usize> = a.iter().chain(b.iter()).copied().collect();
        merged.sort_unstable();
        assert_eq!(merged, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);

        let mut genes = vec![9, 8, 7, 6];
        shuffle_indices_mutation(&mut rng, &mut genes, 1.0);
        let mut sorted = genes.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![6, 7, 8, 9]);
    }

    #[test]
    fn full_tournament_returns_the_fittest_individual() {
        let mut rng = StdRng::seed_from_u64(3);
        let population: Vec<Individual> = (0..5)
            .map(|i| Individual {
                genes: vec![i],
                fitness: Some(i as f64),
            })
            .collect();
        // With tournament size far above the population, the maximum is
        // sampled with overwhelming probability; use a fixed seed to pin it.
        let winner = tournament_select(&mut rng, &population, 64);
        assert_eq!(winner.fitness, Some(4.0));
    }

    #[test]
    fn capacity_violation_drags_fitness_below_minus_nine_hundred() {
        let drones = vec![drone("D1", 10.0, 1000.0, Point::new(0.0, 0.0))];
        let deliveries = vec![
            delivery("A", Point::new(2.0, 0.0), 6.0),
            delivery("B", Point::new(3.0, 0.0), 6.0),
        ];
        // Both genes on the single drone: the second delivery must violate.
        let breakdown = evaluate_chromosome(&[0, 0], &drones, &deliveries, &[], false);
        assert_eq!(breakdown.violations, 1);
        assert_eq!(breakdown.completed, 1);
        assert!(breakdown.score < COMPLETION_REWARD - VIOLATION_PENALTY + 1.0);
        assert!(breakdown.score < -900.0);
    }

    #[test]
    fn deliveries_inside_a_zone_count_as_violations_regardless_of_activity() {
        let drones = vec![drone("D1", 10.0, 1000.0, Point::new(0.0, 0.0))];
        let deliveries = vec![delivery("A", Point::new(3.0, 3.0), 1.0)];
        // Zone long expired; fitness still refuses targets inside it.
        let zone = NoFlyZone::new(
            "Z1",
            vec![
                Point::new(2.0, 2.0),
                Point::new(4.0, 2.0),
                Point::new(4.0, 4.0),
                Point::new(2.0, 4.0),
            ],
            now() - Duration::hours(10),
            now() - Duration::hours(9),
        );
        let breakdown = evaluate_chromosome(&[0], &drones, &deliveries, &[zone], false);
        assert_eq!(breakdown.violations, 1);
        assert_eq!(breakdown.completed, 0);
    }

    #[test]
    fn capacity_lookup_flag_switches_between_positional_and_gene() {
        // Drone 0 cannot carry the package, drone 1 can. Gene says drone 1,
        // but the positional lookup consults drone 0's limit.
        let drones = vec![
            drone("D1", 0.5, 1000.0, Point::new(0.0, 0.0)),
            drone("D2", 10.0, 1000.0, Point::new(0.0, 0.0)),
        ];
        let deliveries = vec![delivery("A", Point::new(2.0, 0.0), 1.0)];

        let positional = evaluate_chromosome(&[1], &drones, &deliveries, &[], false);
        assert_eq!(positional.violations, 1);

        let by_gene = evaluate_chromosome(&[1], &drones, &deliveries, &[], true);
        assert_eq!(by_gene.violations, 0);
        assert_eq!(by_gene.completed, 1);
    }

    #[test]
    fn fixed_seed_makes_the_run_deterministic() {
        let drones = vec![
            drone("D1", 10.0, 1000.0, Point::new(0.0, 0.0)),
            drone("D2", 10.0, 1000.0, Point::new(10.0, 10.0)),
        ];
        let deliveries = vec![
            delivery("A", Point::new(2.0, 0.0), 1.0),
            delivery("B", Point::new(9.0, 9.0), 2.0),
            delivery("C", Point::new(5.0, 5.0), 3.0),
        ];
        let config = GaConfig {
            population_size: 30,
            generations: 10,
            seed: Some(42),
            ..Default::default()
        };
        let first = GaSolver::new(config.clone())
            .optimize(&drones, &deliveries, &[])
            .expect("outcome");
        let second = GaSolver::new(config)
            .optimize(&drones, &deliveries, &[])
            .expect("outcome");
        assert_eq!(first.pairs, second.pairs);
        assert_eq!(first.fitness, second.fitness);
    }
}
