//! Human-readable rendering of a slicing.
//!
//! Lists every tile with its bounds, then draws the grid with each cell
//! labelled by the tile that claims it and its ingredient. A cell belongs
//! to the first tile in genotype order that covers it, the same priority
//! the fitness function uses.

use std::fmt;

use crate::schema::{Genotype, Grid};

/// A genotype rendered against its grid.
pub struct SlicingReport<'a> {
    grid: &'a Grid,
    genotype: &'a Genotype,
}

impl<'a> SlicingReport<'a> {
    pub fn new(grid: &'a Grid, genotype: &'a Genotype) -> Self {
        Self { grid, genotype }
    }

    /// Index of the claiming tile for every cell, row-major.
    pub fn claims(&self) -> Vec<Option<usize>> {
        let width = self.grid.width();
        let mut claims = vec![None; self.grid.cell_count()];

        for (index, tile) in self.genotype.iter().enumerate() {
            for y in tile.start_y()..=tile.end_y().min(self.grid.height() - 1) {
                for x in tile.start_x()..=tile.end_x().min(width - 1) {
                    claims[y * width + x].get_or_insert(index);
                }
            }
        }
        claims
    }

    /// Fraction of cells covered by at least one tile.
    pub fn coverage(&self) -> f64 {
        let covered = self.claims().iter().filter(|c| c.is_some()).count();
        covered as f64 / self.grid.cell_count() as f64
    }
}

impl fmt::Display for SlicingReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, tile) in self.genotype.iter().enumerate() {
            writeln!(f, "Slice {index}: {tile}")?;
        }

        let width = self.grid.width();
        let claims = self.claims();
        for y in 0..self.grid.height() {
            for (x, ingredient) in self.grid.row(y).iter().enumerate() {
                let label = match claims[y * width + x] {
                    Some(index) => format!("{index} ({ingredient})"),
                    None => format!("- ({ingredient})"),
                };
                write!(f, "|{label:>10}|")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Tile;

    fn grid() -> Grid {
        Grid::parse("2 3 1 6\nTMT\nMTM\n").unwrap()
    }

    #[test]
    fn test_first_tile_claims_cell() {
        let grid = grid();
        let genotype = Genotype::new(vec![
            Tile::new(0, 0, 1, 1).unwrap(),
            Tile::new(1, 0, 2, 0).unwrap(),
        ])
        .unwrap();

        let report = SlicingReport::new(&grid, &genotype);
        assert_eq!(
            report.claims(),
            vec![Some(0), Some(0), Some(1), Some(0), Some(0), None]
        );
        assert!((report.coverage() - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_render() {
        let grid = grid();
        let genotype = Genotype::single(Tile::new(0, 0, 1, 0).unwrap());
        let rendered = SlicingReport::new(&grid, &genotype).to_string();

        let expected = "Slice 0: (0, 0) (1, 0)\n\
                        |     0 (T)||     0 (M)||     - (T)|\n\
                        |     - (M)||     - (T)||     - (M)|\n";
        assert_eq!(rendered, expected);
    }
}
