//! Evolution configuration and result types for the slicing search.

use serde::{Deserialize, Serialize};

use super::Genotype;

/// Top-level configuration for the evolutionary search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Selection, crossover and mutation settings.
    #[serde(default)]
    pub algorithm: GeneticAlgorithmConfig,
    /// Shape of randomly generated genotypes.
    #[serde(default)]
    pub genotype: GenotypeConfig,
    /// Scoring constants.
    #[serde(default)]
    pub fitness: FitnessConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Population and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of individuals in population.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Number of evaluated generations, counting the initial one.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Stop if the best fitness has not improved for N generations.
    #[serde(default)]
    pub stagnation_limit: Option<usize>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            max_generations: default_max_generations(),
            stagnation_limit: None,
        }
    }
}

fn default_population_size() -> usize {
    50
}
fn default_max_generations() -> usize {
    300
}

/// Genetic algorithm operator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticAlgorithmConfig {
    /// Selection method.
    #[serde(default)]
    pub selection: SelectionMethod,
    /// Probability that a child is produced by crossover (0.0-1.0).
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f32,
    /// Per-tile mutation probability (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f32,
    /// Standard deviation of coordinate noise, relative to the axis length.
    #[serde(default = "default_mutation_strength")]
    pub mutation_strength: f32,
    /// Number of best individuals copied unchanged into the next generation.
    #[serde(default = "default_elitism")]
    pub elitism: usize,
}

impl Default for GeneticAlgorithmConfig {
    fn default() -> Self {
        Self {
            selection: SelectionMethod::default(),
            crossover_rate: default_crossover_rate(),
            mutation_rate: default_mutation_rate(),
            mutation_strength: default_mutation_strength(),
            elitism: default_elitism(),
        }
    }
}

fn default_crossover_rate() -> f32 {
    0.2
}
fn default_mutation_rate() -> f32 {
    0.15
}
fn default_mutation_strength() -> f32 {
    0.1
}
fn default_elitism() -> usize {
    2
}

/// Parent selection method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method")]
pub enum SelectionMethod {
    /// Tournament selection among `size` (at least 2) random candidates.
    Tournament {
        #[serde(default = "default_tournament_size")]
        size: usize,
    },
    /// Rank-based selection.
    RankBased,
    /// Roulette wheel (fitness-proportionate) selection.
    RouletteWheel,
}

impl Default for SelectionMethod {
    fn default() -> Self {
        Self::Tournament {
            size: default_tournament_size(),
        }
    }
}

fn default_tournament_size() -> usize {
    3
}

/// Settings for randomly generated genotypes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenotypeConfig {
    /// Inclusive bounds on the number of tiles per genotype.
    #[serde(default = "default_tile_count_bounds")]
    pub tile_count_bounds: (usize, usize),
}

impl Default for GenotypeConfig {
    fn default() -> Self {
        Self {
            tile_count_bounds: default_tile_count_bounds(),
        }
    }
}

fn default_tile_count_bounds() -> (usize, usize) {
    (1, 100)
}

/// Scoring constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessConfig {
    /// Points per cell of a tile that satisfies the ingredient minimum.
    #[serde(default = "default_base_points")]
    pub base_points: f64,
    /// Factor applied to a cell each time a later tile overlaps it.
    #[serde(default = "default_overlap_decay")]
    pub overlap_decay: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            base_points: default_base_points(),
            overlap_decay: default_overlap_decay(),
        }
    }
}

fn default_base_points() -> f64 {
    10.0
}
fn default_overlap_decay() -> f64 {
    0.2
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// An individual in the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique identifier.
    pub id: u64,
    /// The tiles.
    pub genotype: Genotype,
    /// Fitness score.
    pub fitness: f64,
    /// Generation created.
    pub generation: usize,
    /// Parent IDs.
    pub parents: Vec<u64>,
}

/// Progress update emitted once per evaluated generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Current generation number (0 is the initial population).
    pub generation: usize,
    /// Total generations planned.
    pub total_generations: usize,
    /// Best fitness seen so far.
    pub best_fitness: f64,
    /// Average fitness of current population.
    pub avg_fitness: f64,
    /// Best fitness this generation.
    pub generation_best: f64,
    /// Generations since last improvement.
    pub stagnation_count: usize,
    /// Current phase of the algorithm.
    pub phase: EvolutionPhase,
}

/// Per-generation statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    /// Best fitness per generation.
    pub best_fitness: Vec<f64>,
    /// Average fitness per generation.
    pub avg_fitness: Vec<f64>,
    /// Standard deviation per generation.
    pub fitness_std: Vec<f64>,
    /// Best fitness seen up to and including each generation.
    pub best_ever: Vec<f64>,
}

/// Current phase of evolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvolutionPhase {
    /// Building the initial population.
    #[default]
    Initializing,
    /// Scoring candidates.
    Evaluating,
    /// Ranking and picking parents.
    Selecting,
    /// Crossover and mutation.
    Recombining,
    /// Turning raw child genes into valid tiles.
    Repairing,
    /// Evolution complete.
    Terminated,
}

/// Final result of an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Best candidate seen across all generations.
    pub best: Candidate,
    /// Statistics from the run.
    pub stats: EvolutionStats,
    /// Full history for analysis.
    pub history: EvolutionHistory,
}

/// Statistics from an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Evaluated generations, counting the initial one.
    pub generations: usize,
    /// Total evaluations performed.
    pub total_evaluations: u64,
    /// Best fitness achieved.
    pub best_fitness: f64,
    /// Average fitness of final population.
    pub final_avg_fitness: f64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Evaluations per second.
    pub evaluations_per_second: f64,
    /// Seed the run was started from.
    pub random_seed: u64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Generation budget exhausted.
    MaxGenerations,
    /// Stagnation limit hit.
    Stagnation,
}

// ============================================================================
// Validation
// ============================================================================

/// Evolution configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionConfigError {
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("At least one generation is required")]
    NoGenerations,
    #[error("Invalid {name}: {value} must lie in [0, 1]")]
    InvalidRate { name: &'static str, value: f32 },
    #[error("Mutation strength must be finite and non-negative, got {0}")]
    InvalidStrength(f32),
    #[error("Elitism ({elitism}) must be smaller than the population size ({size})")]
    TooManyElites { elitism: usize, size: usize },
    #[error("Tournament size must be at least 2, got {0}")]
    TournamentTooSmall(usize),
    #[error("Invalid tile count bounds: {0}")]
    InvalidTileCountBounds(String),
    #[error("Invalid fitness constants: {0}")]
    InvalidFitness(String),
}

impl EvolutionConfig {
    /// Validate evolution configuration.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        if self.population.size < 2 {
            return Err(EvolutionConfigError::PopulationTooSmall);
        }
        if self.population.max_generations == 0 {
            return Err(EvolutionConfigError::NoGenerations);
        }

        let check_rate = |value: f32, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(EvolutionConfigError::InvalidRate { name, value })
            }
        };
        check_rate(self.algorithm.crossover_rate, "crossover_rate")?;
        check_rate(self.algorithm.mutation_rate, "mutation_rate")?;

        let strength = self.algorithm.mutation_strength;
        if !strength.is_finite() || strength < 0.0 {
            return Err(EvolutionConfigError::InvalidStrength(strength));
        }

        if self.algorithm.elitism >= self.population.size {
            return Err(EvolutionConfigError::TooManyElites {
                elitism: self.algorithm.elitism,
                size: self.population.size,
            });
        }

        if let SelectionMethod::Tournament { size } = self.algorithm.selection
            && size < 2
        {
            return Err(EvolutionConfigError::TournamentTooSmall(size));
        }

        let (min_tiles, max_tiles) = self.genotype.tile_count_bounds;
        if min_tiles == 0 || min_tiles > max_tiles {
            return Err(EvolutionConfigError::InvalidTileCountBounds(format!(
                "need 1 <= min ({min_tiles}) <= max ({max_tiles})"
            )));
        }

        let base = self.fitness.base_points;
        if !base.is_finite() || base <= 0.0 {
            return Err(EvolutionConfigError::InvalidFitness(format!(
                "base_points {base} must be positive"
            )));
        }
        // A decayed cell must stay positive and below its previous value.
        let decay = self.fitness.overlap_decay;
        if !(decay > 0.0 && decay < 1.0) {
            return Err(EvolutionConfigError::InvalidFitness(format!(
                "overlap_decay {decay} must lie in (0, 1)"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population.max_generations, 300);
        assert_eq!(config.genotype.tile_count_bounds, (1, 100));
        assert_eq!(config.fitness.base_points, 10.0);
        assert_eq!(config.fitness.overlap_decay, 0.2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EvolutionConfig = serde_json::from_str(
            r#"{ "population": { "size": 12 }, "algorithm": { "selection": { "method": "RankBased" } } }"#,
        )
        .unwrap();

        assert_eq!(config.population.size, 12);
        assert_eq!(config.population.max_generations, 300);
        assert_eq!(config.algorithm.selection, SelectionMethod::RankBased);
        assert_eq!(config.algorithm.elitism, 2);
        assert!(config.random_seed.is_none());
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = EvolutionConfig::default();
        config.population.size = 1;
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::PopulationTooSmall)
        ));

        let mut config = EvolutionConfig::default();
        config.algorithm.mutation_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::InvalidRate {
                name: "mutation_rate",
                ..
            })
        ));

        let mut config = EvolutionConfig::default();
        config.algorithm.elitism = config.population.size;
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::TooManyElites { .. })
        ));

        let mut config = EvolutionConfig::default();
        config.genotype.tile_count_bounds = (0, 10);
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::InvalidTileCountBounds(_))
        ));

        let mut config = EvolutionConfig::default();
        config.fitness.overlap_decay = 1.0;
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::InvalidFitness(_))
        ));

        for size in [0, 1] {
            let mut config = EvolutionConfig::default();
            config.algorithm.selection = SelectionMethod::Tournament { size };
            assert!(matches!(
                config.validate(),
                Err(EvolutionConfigError::TournamentTooSmall(s)) if s == size
            ));
        }

        let mut config = EvolutionConfig::default();
        config.algorithm.selection = SelectionMethod::Tournament { size: 2 };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let config = EvolutionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.population.size, config.population.size);
        assert_eq!(parsed.algorithm.selection, config.algorithm.selection);
    }
}
