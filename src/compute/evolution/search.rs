//! Generational genetic algorithm over tile genotypes.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::schema::{
    Candidate, Constraints, EvolutionConfig, EvolutionConfigError, EvolutionHistory,
    EvolutionPhase, EvolutionProgress, EvolutionResult, EvolutionStats, Grid, SelectionMethod,
    StopReason, TileGenes,
};

use super::fitness::FitnessEvaluator;
use super::genome::GenomeRng;

/// Evolution engine that runs the search.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    constraints: Constraints,
    seed: u64,
    rng: GenomeRng,
    evaluator: FitnessEvaluator,
    population: Vec<Candidate>,
    best: Option<Candidate>,
    history: EvolutionHistory,
    generation: usize,
    phase: EvolutionPhase,
    stagnation_count: usize,
    next_id: u64,
}

impl EvolutionEngine {
    /// Create a new evolution engine for `grid`.
    pub fn new(config: EvolutionConfig, grid: Arc<Grid>) -> Result<Self, EvolutionConfigError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let constraints = grid.constraints();
        let evaluator = FitnessEvaluator::new(grid, config.fitness.clone());

        Ok(Self {
            config,
            constraints,
            seed,
            rng: GenomeRng::new(seed),
            evaluator,
            population: Vec::new(),
            best: None,
            history: EvolutionHistory::default(),
            generation: 0,
            phase: EvolutionPhase::Initializing,
            stagnation_count: 0,
            next_id: 0,
        })
    }

    /// Seed the random generator was started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        self.evaluator.grid()
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Current population.
    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    /// Best candidate seen so far, across all generations.
    pub fn best(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    pub fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Initialize the population.
    pub fn initialize(&mut self) {
        self.phase = EvolutionPhase::Initializing;
        self.population.clear();
        self.best = None;
        self.history = EvolutionHistory::default();
        self.generation = 0;
        self.stagnation_count = 0;

        for _ in 0..self.config.population.size {
            let genotype = self
                .rng
                .random_genotype(&self.constraints, &self.config.genotype);
            let id = self.next_id();

            self.population.push(Candidate {
                id,
                genotype,
                fitness: 0.0,
                generation: 0,
                parents: Vec::new(),
            });
        }
    }

    /// Evaluate all candidates in the population, then record the generation.
    fn evaluate_population(&mut self) {
        self.phase = EvolutionPhase::Evaluating;
        let evaluator = &self.evaluator;

        // Parallel evaluation
        self.population.par_iter_mut().for_each(|candidate| {
            candidate.fitness = evaluator.evaluate(&candidate.genotype);
        });

        self.record_generation();
    }

    /// Update best-ever tracking and history from the evaluated population.
    fn record_generation(&mut self) {
        let Some(gen_best) = self
            .population
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        else {
            return;
        };

        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| gen_best.fitness > best.fitness);
        if improved {
            self.best = Some(gen_best.clone());
            self.stagnation_count = 0;
        } else {
            self.stagnation_count += 1;
        }

        let gen_best = gen_best.fitness;
        let count = self.population.len() as f64;
        let avg_fitness = self.population.iter().map(|c| c.fitness).sum::<f64>() / count;
        let variance = self
            .population
            .iter()
            .map(|c| (c.fitness - avg_fitness).powi(2))
            .sum::<f64>()
            / count;
        let best_ever = self.best.as_ref().map_or(gen_best, |b| b.fitness);

        self.history.best_fitness.push(gen_best);
        self.history.avg_fitness.push(avg_fitness);
        self.history.fitness_std.push(variance.sqrt());
        self.history.best_ever.push(best_ever);

        log::debug!(
            "Generation {}: best = {:.2}, avg = {:.2}, best ever = {:.2}",
            self.generation,
            gen_best,
            avg_fitness,
            best_ever
        );
    }

    /// Produce the next generation from the evaluated population.
    fn step_generation(&mut self) {
        let ga_config = self.config.algorithm.clone();

        // Sort by fitness (descending)
        self.phase = EvolutionPhase::Selecting;
        self.population
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let mut next_gen = Vec::with_capacity(self.config.population.size);

        // Elitism: keep best individuals
        for elite in self.population.iter().take(ga_config.elitism) {
            let mut elite = elite.clone();
            elite.generation = self.generation + 1;
            next_gen.push(elite);
        }

        // Children are built from raw genes first and repaired afterwards.
        let mut offspring: Vec<(Vec<TileGenes>, [u64; 2])> =
            Vec::with_capacity(self.config.population.size - next_gen.len());

        while next_gen.len() + offspring.len() < self.config.population.size {
            self.phase = EvolutionPhase::Selecting;
            let idx1 = self.select_index(&ga_config.selection);
            let idx2 = self.select_index(&ga_config.selection);

            self.phase = EvolutionPhase::Recombining;
            let parent1 = &self.population[idx1];
            let parent2 = &self.population[idx2];

            let mut genes = if self.rng.chance(ga_config.crossover_rate) {
                self.rng.crossover(
                    &parent1.genotype,
                    &parent2.genotype,
                    &self.config.genotype,
                )
            } else {
                parent1.genotype.to_genes()
            };

            self.rng.mutate(
                &mut genes,
                ga_config.mutation_rate,
                ga_config.mutation_strength,
                &self.constraints,
                &self.config.genotype,
            );

            offspring.push((genes, [parent1.id, parent2.id]));
        }

        self.phase = EvolutionPhase::Repairing;
        for (genes, parents) in offspring {
            let genotype = self.rng.repair_genotype(genes, &self.constraints);
            debug_assert!(genotype.is_valid(&self.constraints));

            let id = self.next_id();
            next_gen.push(Candidate {
                id,
                genotype,
                fitness: 0.0,
                generation: self.generation + 1,
                parents: parents.to_vec(),
            });
        }

        self.population = next_gen;
        self.generation += 1;
    }

    /// Select a parent index using the specified method.
    ///
    /// Tournament and rank-based selection expect the population sorted by
    /// descending fitness.
    fn select_index(&mut self, method: &SelectionMethod) -> usize {
        let len = self.population.len();
        match method {
            SelectionMethod::Tournament { size } => {
                let mut best_idx = self.rng.index(len);
                for _ in 1..*size {
                    let idx = self.rng.index(len);
                    if self.population[idx].fitness > self.population[best_idx].fitness {
                        best_idx = idx;
                    }
                }
                best_idx
            }
            SelectionMethod::RankBased => {
                // Rank-based: probability proportional to rank
                let total_rank: usize = (1..=len).sum();
                let mut target = self.rng.index(total_rank);
                for i in 0..len {
                    let rank = len - i;
                    if target < rank {
                        return i;
                    }
                    target -= rank;
                }
                0
            }
            SelectionMethod::RouletteWheel => {
                // Fitness proportionate
                let total_fitness: f64 = self.population.iter().map(|c| c.fitness.max(0.0)).sum();
                if total_fitness <= 0.0 {
                    return self.rng.index(len);
                }

                let target = self.rng.unit() * total_fitness;
                let mut cumulative = 0.0;
                for (i, candidate) in self.population.iter().enumerate() {
                    cumulative += candidate.fitness.max(0.0);
                    if cumulative > target {
                        return i;
                    }
                }
                len - 1
            }
        }
    }

    /// Get current progress.
    pub fn progress(&self) -> EvolutionProgress {
        let avg_fitness = self.history.avg_fitness.last().copied().unwrap_or(0.0);
        let generation_best = self.history.best_fitness.last().copied().unwrap_or(0.0);

        EvolutionProgress {
            generation: self.generation,
            total_generations: self.config.population.max_generations,
            best_fitness: self.best.as_ref().map_or(0.0, |b| b.fitness),
            avg_fitness,
            generation_best,
            stagnation_count: self.stagnation_count,
            phase: self.phase,
        }
    }

    /// Check if evolution should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.generation + 1 >= self.config.population.max_generations {
            return Some(StopReason::MaxGenerations);
        }

        if let Some(limit) = self.config.population.stagnation_limit
            && self.stagnation_count >= limit
        {
            return Some(StopReason::Stagnation);
        }

        None
    }

    /// Run evolution with progress callback.
    pub fn run_with_callback<F>(&mut self, callback: F) -> EvolutionResult
    where
        F: Fn(&EvolutionProgress),
    {
        let start_time = Instant::now();
        log::info!(
            "Starting evolution: population {}, {} generations, seed {}",
            self.config.population.size,
            self.config.population.max_generations,
            self.seed
        );

        // Initialize and evaluate generation 0
        self.initialize();
        self.evaluate_population();
        callback(&self.progress());

        // Evolution loop
        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }

            self.step_generation();
            self.evaluate_population();
            callback(&self.progress());
        };

        self.phase = EvolutionPhase::Terminated;

        let elapsed = start_time.elapsed().as_secs_f64();
        let generations = self.generation + 1;
        let total_evaluations = generations as u64 * self.config.population.size as u64;

        let best = self
            .best
            .clone()
            .expect("an evaluated population always has a best candidate");

        log::info!(
            "Evolution finished after {} generations ({:?}): best fitness {:.2}",
            generations,
            stop_reason,
            best.fitness
        );

        EvolutionResult {
            stats: EvolutionStats {
                generations,
                total_evaluations,
                best_fitness: best.fitness,
                final_avg_fitness: self.history.avg_fitness.last().copied().unwrap_or(0.0),
                elapsed_seconds: elapsed,
                evaluations_per_second: total_evaluations as f64 / elapsed.max(f64::EPSILON),
                random_seed: self.seed,
                stop_reason,
            },
            best,
            history: self.history.clone(),
        }
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> EvolutionResult {
        self.run_with_callback(|_| {})
    }
}
