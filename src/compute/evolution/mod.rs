//! Evolutionary search for grid slicings.
//!
//! # Overview
//!
//! - **Genome Operations** (`genome`): random tiles, repair, crossover, mutation
//! - **Fitness** (`fitness`): coverage score with overlap decay
//! - **Search** (`search`): generational genetic algorithm with best-ever tracking
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pizza_slicer::compute::evolution::EvolutionEngine;
//! use pizza_slicer::schema::{EvolutionConfig, Grid};
//!
//! let grid = Arc::new(Grid::from_file("example.in").unwrap());
//! let mut engine = EvolutionEngine::new(EvolutionConfig::default(), grid).unwrap();
//! let result = engine.run_with_callback(|progress| {
//!     println!("Generation {}: best fitness = {:.1}",
//!         progress.generation, progress.best_fitness);
//! });
//!
//! println!("Best fitness: {:.1}", result.best.fitness);
//! ```
//!
//! # Randomness
//!
//! The engine owns a single seeded [`GenomeRng`] and passes it by `&mut` to
//! every generation, repair, selection, crossover and mutation call. These
//! run sequentially; fitness evaluation is deterministic and is the only
//! parallel phase.

mod fitness;
mod genome;
mod search;

pub use fitness::{FitnessEvaluator, FitnessReport, TileScore};
pub use genome::GenomeRng;
pub use search::EvolutionEngine;
