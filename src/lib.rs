//! Pizza slicing - evolutionary search for rectangular grid partitions.
//!
//! Given a grid of tomato and mushroom cells, find a set of rectangular
//! slices that each hold a minimum number of both ingredients and stay
//! within a maximum area, covering as much of the grid as possible. The
//! problem is NP-hard; this crate searches it with a generational genetic
//! algorithm.
//!
//! # Architecture
//!
//! - `schema`: Grid input, tiles, genotypes, configuration and result types
//! - `compute`: Tile generation and repair, fitness, and the search engine
//! - `report`: Text rendering of a slicing
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pizza_slicer::{EvolutionConfig, EvolutionEngine, Grid, SlicingReport};
//!
//! let grid = Arc::new(Grid::parse("3 5 1 6\nTTTTT\nTMMMT\nTTTTT\n").unwrap());
//! let mut engine = EvolutionEngine::new(EvolutionConfig::default(), Arc::clone(&grid)).unwrap();
//! let result = engine.run();
//!
//! println!("{}", SlicingReport::new(&grid, &result.best.genotype));
//! println!("Best fitness: {:.1}", result.best.fitness);
//! ```

pub mod compute;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use compute::{EvolutionEngine, FitnessEvaluator, GenomeRng};
pub use report::SlicingReport;
pub use schema::{Constraints, EvolutionConfig, Genotype, Grid, Tile};
