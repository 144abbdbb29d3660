//! Fitness evaluation for candidate slicings.
//!
//! Tiles are scored in genotype order over a per-cell accumulator. A tile
//! that holds enough of both ingredients is worth `base_points` per cell.
//! The first tile to touch a cell sets its value; each later tile touching
//! an already positive cell multiplies it by `overlap_decay` instead, so
//! overlap is costly but never fatal. Fitness is the accumulator sum.
//! Tiles hanging over the grid edge only count the cells on the grid.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::schema::{FitnessConfig, Genotype, Grid, IngredientCounts, Tile};

/// Evaluates genotypes against a shared grid.
///
/// Holds no mutable state and draws no randomness, so one evaluator can
/// score many genotypes in parallel.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    grid: Arc<Grid>,
    config: FitnessConfig,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(grid: Arc<Grid>, config: FitnessConfig) -> Self {
        Self { grid, config }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Per-cell points a tile with `counts` earns before overlap.
    #[inline]
    pub fn base_points(&self, counts: &IngredientCounts) -> f64 {
        if counts.satisfies(self.grid.min_ingredients()) {
            self.config.base_points
        } else {
            0.0
        }
    }

    /// Score a genotype.
    pub fn evaluate(&self, genotype: &Genotype) -> f64 {
        self.accumulate(genotype, |_| {}).iter().sum()
    }

    /// Score a genotype and report what each tile contributed.
    pub fn evaluate_detailed(&self, genotype: &Genotype) -> FitnessReport {
        let mut tiles = Vec::with_capacity(genotype.len());
        let accumulator = self.accumulate(genotype, |score| tiles.push(score));

        FitnessReport {
            fitness: accumulator.iter().sum(),
            scoring_cells: accumulator.iter().filter(|&&v| v > 0.0).count(),
            tiles,
        }
    }

    fn accumulate(&self, genotype: &Genotype, mut on_tile: impl FnMut(TileScore)) -> Vec<f64> {
        let width = self.grid.width();
        let decay = self.config.overlap_decay;
        let mut accumulator = vec![0.0f64; self.grid.cell_count()];

        for (index, tile) in genotype.iter().enumerate() {
            let counts = self.grid.counts(tile);
            let base = self.base_points(&counts);

            log::trace!(
                "Tile {index} is {} cells wide and has {} tomatoes and {} mushrooms: base points = {base:.2}",
                tile.area(),
                counts.tomatoes,
                counts.mushrooms,
            );

            if let Some(cells) = self.grid.clip(tile) {
                for y in cells.start_y()..=cells.end_y() {
                    let row =
                        &mut accumulator[y * width + cells.start_x()..=y * width + cells.end_x()];
                    for cell in row {
                        *cell = if *cell > 0.0 { *cell * decay } else { base };
                    }
                }
            }

            on_tile(TileScore::new(tile, counts, base));
        }

        accumulator
    }
}

/// Contribution of a single tile, before overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileScore {
    pub tile: Tile,
    pub area: usize,
    pub counts: IngredientCounts,
    pub base_points: f64,
}

impl TileScore {
    fn new(tile: &Tile, counts: IngredientCounts, base_points: f64) -> Self {
        Self {
            tile: *tile,
            area: tile.area(),
            counts,
            base_points,
        }
    }
}

/// Detailed evaluation of one genotype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessReport {
    /// Total fitness.
    pub fitness: f64,
    /// Cells holding a positive score.
    pub scoring_cells: usize,
    /// Per-tile scores in genotype order.
    pub tiles: Vec<TileScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3 rows x 5 columns, one mushroom block in the middle row.
    fn example_grid() -> Arc<Grid> {
        Arc::new(Grid::parse("3 5 1 6\nTTTTT\nTMMMT\nTTTTT\n").unwrap())
    }

    fn evaluator() -> FitnessEvaluator {
        FitnessEvaluator::new(example_grid(), FitnessConfig::default())
    }

    fn tile(sx: usize, sy: usize, ex: usize, ey: usize) -> Tile {
        Tile::new(sx, sy, ex, ey).unwrap()
    }

    #[test]
    fn test_whole_grid_tile() {
        let fitness = evaluator().evaluate(&Genotype::single(tile(0, 0, 4, 2)));
        assert!((fitness - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_tile_without_mushroom_scores_zero() {
        let fitness = evaluator().evaluate(&Genotype::single(tile(0, 0, 4, 0)));
        assert_eq!(fitness, 0.0);
    }

    #[test]
    fn test_overlap_decay() {
        let eval = evaluator();
        let slice = tile(0, 0, 1, 1);
        let alone = eval.evaluate(&Genotype::single(slice));
        assert!((alone - 40.0).abs() < 1e-9);

        let doubled = Genotype::new(vec![slice, slice]).unwrap();
        // Per cell: 10 then 0.2 * 10.
        assert!((eval.evaluate(&doubled) - 4.0 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_compounds_for_three_tiles() {
        let eval = evaluator();
        let slice = tile(0, 0, 1, 1);
        let tripled = Genotype::new(vec![slice; 3]).unwrap();
        assert!((eval.evaluate(&tripled) - 4.0 * 10.0 * 0.2 * 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_later_tile_cannot_raise_cell() {
        let eval = evaluator();
        // Scores zero, so the cells stay unclaimed and the good tile wins.
        let barren = tile(0, 0, 1, 0);
        let good = tile(0, 0, 1, 1);
        let genotype = Genotype::new(vec![barren, good]).unwrap();
        assert!((eval.evaluate(&genotype) - 40.0).abs() < 1e-9);

        // Good tile first: the barren tile decays the shared row.
        let genotype = Genotype::new(vec![good, barren]).unwrap();
        assert!((eval.evaluate(&genotype) - (20.0 + 2.0 * 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_tiles_add_up() {
        let eval = evaluator();
        let genotype = Genotype::new(vec![tile(0, 0, 1, 2), tile(2, 0, 4, 1)]).unwrap();
        assert!((eval.evaluate(&genotype) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_ingredients_threshold() {
        let grid = Arc::new(Grid::parse("2 3 2 6\nTMT\nTTT\n").unwrap());
        let eval = FitnessEvaluator::new(grid, FitnessConfig::default());
        // Only one mushroom in the whole grid.
        assert_eq!(eval.evaluate(&Genotype::single(tile(0, 0, 2, 1))), 0.0);
    }

    #[test]
    fn test_detailed_report() {
        let eval = evaluator();
        let genotype = Genotype::new(vec![tile(0, 0, 1, 1), tile(0, 0, 4, 0)]).unwrap();
        let report = eval.evaluate_detailed(&genotype);

        assert_eq!(report.tiles.len(), 2);
        assert_eq!(report.tiles[0].area, 4);
        assert_eq!(
            report.tiles[0].counts,
            IngredientCounts {
                tomatoes: 3,
                mushrooms: 1
            }
        );
        assert_eq!(report.tiles[0].base_points, 10.0);
        assert_eq!(report.tiles[1].base_points, 0.0);
        assert_eq!(report.scoring_cells, 4);
        assert!((report.fitness - eval.evaluate(&genotype)).abs() < 1e-9);
    }

    #[test]
    fn test_tiles_beyond_grid_edge() {
        let eval = evaluator();
        // Deserialized genotypes carry no grid bounds.
        let genotype: Genotype = serde_json::from_str("[[3,1,9,7],[5,0,6,1]]").unwrap();

        let report = eval.evaluate_detailed(&genotype);
        assert!((report.fitness - 40.0).abs() < 1e-9);
        assert_eq!(report.scoring_cells, 4);
        assert_eq!(report.tiles[1].base_points, 0.0);
    }

    #[test]
    fn test_custom_constants() {
        let config = FitnessConfig {
            base_points: 1.0,
            overlap_decay: 0.5,
        };
        let eval = FitnessEvaluator::new(example_grid(), config);
        let slice = tile(0, 0, 1, 1);
        let doubled = Genotype::new(vec![slice, slice]).unwrap();
        assert!((eval.evaluate(&doubled) - 2.0).abs() < 1e-9);
    }
}
