//! Pizza slicer CLI - Search a slicing for an input grid.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use pizza_slicer::{
    EvolutionConfig, EvolutionEngine, SlicingReport,
    schema::{EvolutionProgress, Grid},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).is_some_and(|a| a == "--example") {
        print_example_config();
        return;
    }

    let input = match args.get(1) {
        Some(path) if !path.trim().is_empty() => path,
        _ => {
            eprintln!("Usage: {} <input> [config.json]", args[0]);
            eprintln!();
            eprintln!("Search a slicing for the grid described in <input>.");
            eprintln!();
            eprintln!("Arguments:");
            eprintln!("  input        Path to the problem file");
            eprintln!("  config.json  Evolution configuration (default: built-in)");
            eprintln!();
            eprintln!("Print the default configuration with --example.");
            std::process::exit(1);
        }
    };

    let config = match args.get(2) {
        Some(path) => load_config(Path::new(path)),
        None => EvolutionConfig::default(),
    };

    let grid = Grid::from_file(input).unwrap_or_else(|e| {
        eprintln!("Error reading input: {}", e);
        std::process::exit(1);
    });

    println!("Pizza Slicer");
    println!("============");
    println!("Grid: {}x{}", grid.width(), grid.height());
    println!("Ingredients per slice: {}", grid.min_ingredients());
    println!("Max slice: {}", grid.max_slice_area());
    println!(
        "Population: {}, generations: {}",
        config.population.size, config.population.max_generations
    );
    println!();

    let grid = Arc::new(grid);
    let mut engine = EvolutionEngine::new(config, Arc::clone(&grid)).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    let result = engine.run_with_callback(report_progress);

    let details = engine.evaluator().evaluate_detailed(&result.best.genotype);
    for (index, score) in details.tiles.iter().enumerate() {
        log::debug!(
            "Slice {index} {}: {} cells, {} tomatoes, {} mushrooms, {:.1} points per cell",
            score.tile,
            score.area,
            score.counts.tomatoes,
            score.counts.mushrooms,
            score.base_points
        );
    }

    let report = SlicingReport::new(&grid, &result.best.genotype);
    println!();
    print!("{}", report);
    println!();
    println!("Best fitness: {:.2}", result.best.fitness);
    println!("Slices: {}", result.best.genotype.len());
    println!("Coverage: {:.1}%", report.coverage() * 100.0);
    println!(
        "Scoring cells: {}/{}",
        details.scoring_cells,
        grid.cell_count()
    );
    println!(
        "Time: {:.2}s ({} generations, {:.1} evals/s, seed {})",
        result.stats.elapsed_seconds,
        result.stats.generations,
        result.stats.evaluations_per_second,
        result.stats.random_seed
    );
}

/// Print progress every 10% of the generation budget.
fn report_progress(progress: &EvolutionProgress) {
    let every = (progress.total_generations / 10).max(1);
    if (progress.generation + 1) % every == 0 {
        println!(
            "  Generation {}/{}: best={:.2}, avg={:.2}",
            progress.generation + 1,
            progress.total_generations,
            progress.best_fitness,
            progress.avg_fitness
        );
    }
}

fn load_config(path: &Path) -> EvolutionConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    })
}

fn print_example_config() {
    match serde_json::to_string_pretty(&EvolutionConfig::default()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}
