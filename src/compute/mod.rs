//! Compute module - Search and scoring.

pub mod evolution;

pub use evolution::{EvolutionEngine, FitnessEvaluator, GenomeRng};
