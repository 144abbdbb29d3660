//! Quick evolution performance test

use std::sync::Arc;
use std::time::Instant;

use pizza_slicer::{
    EvolutionConfig, EvolutionEngine, Grid,
    schema::{GeneticAlgorithmConfig, PopulationConfig, SelectionMethod},
};

/// Deterministic striped grid in the input format.
fn grid(size: usize) -> Arc<Grid> {
    let mut input = format!("{size} {size} 1 6\n");
    for y in 0..size {
        let line: String = (0..size)
            .map(|x| if (x * 7 + y * 3) % 5 < 2 { 'M' } else { 'T' })
            .collect();
        input.push_str(&line);
        input.push('\n');
    }
    Arc::new(Grid::parse(&input).expect("generated grid is well formed"))
}

fn main() {
    println!("=== Evolution Performance Test ===\n");

    // Test different grid sizes
    for grid_size in [16, 64, 256] {
        println!("Grid size: {}x{}", grid_size, grid_size);

        let config = EvolutionConfig {
            population: PopulationConfig {
                size: 50,
                max_generations: 30,
                ..Default::default()
            },
            algorithm: GeneticAlgorithmConfig {
                mutation_rate: 0.2,
                mutation_strength: 0.1,
                crossover_rate: 0.6,
                elitism: 2,
                selection: SelectionMethod::Tournament { size: 3 },
            },
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(config, grid(grid_size)).expect("valid configuration");
        let result = engine.run();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!("  Generations:    {}", result.stats.generations);
        println!("  Evaluations:    {}", total_evals);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", evals_per_sec);
        println!("  Best fitness:   {:.2}", result.stats.best_fitness);
        println!();
    }

    println!("=== Scalability Test (fixed 64x64 grid) ===\n");

    // Test different population sizes
    for pop_size in [10, 20, 40, 80] {
        let config = EvolutionConfig {
            population: PopulationConfig {
                size: pop_size,
                max_generations: 20,
                ..Default::default()
            },
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(config, grid(64)).expect("valid configuration");
        let result = engine.run();
        let elapsed = start.elapsed();

        let total_evals = result.stats.total_evaluations;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!(
            "Population {}: {} evals in {:.2}s ({:.1} evals/sec)",
            pop_size,
            total_evals,
            elapsed.as_secs_f64(),
            evals_per_sec
        );
    }
}
