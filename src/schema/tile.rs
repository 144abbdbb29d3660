//! Tile and genotype types: the chromosome of the slicing search.
//!
//! A [`Tile`] is an inclusive rectangle over the grid. It is a `Copy`
//! value: crossover, mutation and repair always build new tiles. Bounds
//! that a tile must respect live in a separate [`Constraints`] value which
//! every generation and repair call receives explicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw coordinate genes `[start_x, start_y, end_x, end_y]`.
///
/// Recombination works on raw genes, which may be inverted or out of
/// bounds. They only become a [`Tile`] through repair.
pub type TileGenes = [usize; 4];

/// Limits every tile of a run must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    /// Largest valid column index (`width - 1`).
    pub max_x: usize,
    /// Largest valid row index (`height - 1`).
    pub max_y: usize,
    /// Largest allowed tile area in cells.
    pub max_area: usize,
}

/// An axis-aligned rectangle with inclusive bounds.
///
/// `start <= end` holds on both axes for every constructed tile. Area and
/// grid bounds are checked separately by [`Tile::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Tile {
    start_x: usize,
    start_y: usize,
    end_x: usize,
    end_y: usize,
}

impl Tile {
    /// Create a tile, rejecting inverted bounds.
    pub fn new(
        start_x: usize,
        start_y: usize,
        end_x: usize,
        end_y: usize,
    ) -> Result<Self, TileError> {
        if start_x > end_x || start_y > end_y {
            return Err(TileError::Inverted {
                start: (start_x, start_y),
                end: (end_x, end_y),
            });
        }
        Ok(Self::from_ordered(start_x, start_y, end_x, end_y))
    }

    /// Create a tile from a gene slice. Exactly four genes are required.
    pub fn from_genes(genes: &[usize]) -> Result<Self, TileError> {
        match *genes {
            [start_x, start_y, end_x, end_y] => Self::new(start_x, start_y, end_x, end_y),
            _ => Err(TileError::WrongGeneCount(genes.len())),
        }
    }

    /// Build from bounds the caller already ordered.
    pub(crate) fn from_ordered(start_x: usize, start_y: usize, end_x: usize, end_y: usize) -> Self {
        debug_assert!(start_x <= end_x && start_y <= end_y);
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }

    #[inline]
    pub fn start_x(&self) -> usize {
        self.start_x
    }

    #[inline]
    pub fn start_y(&self) -> usize {
        self.start_y
    }

    #[inline]
    pub fn end_x(&self) -> usize {
        self.end_x
    }

    #[inline]
    pub fn end_y(&self) -> usize {
        self.end_y
    }

    /// Coordinates as genes.
    #[inline]
    pub fn genes(&self) -> TileGenes {
        [self.start_x, self.start_y, self.end_x, self.end_y]
    }

    /// Number of columns covered.
    #[inline]
    pub fn width(&self) -> usize {
        self.end_x - self.start_x + 1
    }

    /// Number of rows covered.
    #[inline]
    pub fn height(&self) -> usize {
        self.end_y - self.start_y + 1
    }

    /// Number of cells covered.
    #[inline]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Whether the tile lies inside the grid and respects the area limit.
    pub fn is_valid(&self, constraints: &Constraints) -> bool {
        self.start_x <= self.end_x
            && self.start_y <= self.end_y
            && self.end_x <= constraints.max_x
            && self.end_y <= constraints.max_y
            && self.area() <= constraints.max_area
    }

    /// Clip the tile into the grid described by `constraints`.
    pub fn clamped(&self, constraints: &Constraints) -> Self {
        let end_x = self.end_x.min(constraints.max_x);
        let end_y = self.end_y.min(constraints.max_y);
        Self::from_ordered(
            self.start_x.min(end_x),
            self.start_y.min(end_y),
            end_x,
            end_y,
        )
    }
}

impl TryFrom<Vec<usize>> for Tile {
    type Error = TileError;

    fn try_from(genes: Vec<usize>) -> Result<Self, Self::Error> {
        Self::from_genes(&genes)
    }
}

impl From<Tile> for Vec<usize> {
    fn from(tile: Tile) -> Self {
        tile.genes().to_vec()
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) ({}, {})",
            self.start_x, self.start_y, self.end_x, self.end_y
        )
    }
}

/// A candidate partition: a non-empty, ordered sequence of tiles.
///
/// Order is priority. Earlier tiles claim a cell first when tiles overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct Genotype {
    tiles: Vec<Tile>,
}

impl Genotype {
    /// Create a genotype. At least one tile is required.
    pub fn new(tiles: Vec<Tile>) -> Result<Self, TileError> {
        if tiles.is_empty() {
            return Err(TileError::EmptyGenotype);
        }
        Ok(Self { tiles })
    }

    /// Genotype holding a single tile.
    pub fn single(tile: Tile) -> Self {
        Self { tiles: vec![tile] }
    }

    /// Build from tiles the caller guarantees to be non-empty.
    pub(crate) fn from_nonempty(tiles: Vec<Tile>) -> Self {
        debug_assert!(!tiles.is_empty(), "genotype built without tiles");
        Self { tiles }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always `false`; provided for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    /// Copy out the genes of every tile, in order.
    pub fn to_genes(&self) -> Vec<TileGenes> {
        self.tiles.iter().map(Tile::genes).collect()
    }

    /// Whether every tile satisfies `constraints`.
    pub fn is_valid(&self, constraints: &Constraints) -> bool {
        self.tiles.iter().all(|t| t.is_valid(constraints))
    }
}

impl TryFrom<Vec<Tile>> for Genotype {
    type Error = TileError;

    fn try_from(tiles: Vec<Tile>) -> Result<Self, Self::Error> {
        Self::new(tiles)
    }
}

impl From<Genotype> for Vec<Tile> {
    fn from(genotype: Genotype) -> Self {
        genotype.tiles
    }
}

impl<'a> IntoIterator for &'a Genotype {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

/// Structural construction errors for tiles and genotypes.
///
/// These signal a logic defect in the caller. Generation and repair never
/// produce them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileError {
    #[error("A tile must contain exactly four genes, got {0}")]
    WrongGeneCount(usize),
    #[error("Tile start {start:?} lies after its end {end:?}")]
    Inverted {
        start: (usize, usize),
        end: (usize, usize),
    },
    #[error("A genotype must contain at least one tile")]
    EmptyGenotype,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> Constraints {
        Constraints {
            max_x: 4,
            max_y: 2,
            max_area: 6,
        }
    }

    #[test]
    fn test_three_genes_rejected() {
        assert_eq!(
            Tile::from_genes(&[0, 1, 2]),
            Err(TileError::WrongGeneCount(3))
        );
        assert_eq!(
            Tile::try_from(vec![0, 1, 2]),
            Err(TileError::WrongGeneCount(3))
        );
    }

    #[test]
    fn test_five_genes_rejected() {
        assert_eq!(
            Tile::from_genes(&[0, 0, 1, 1, 1]),
            Err(TileError::WrongGeneCount(5))
        );
    }

    #[test]
    fn test_inverted_rejected() {
        assert!(matches!(
            Tile::new(3, 0, 1, 0),
            Err(TileError::Inverted { .. })
        ));
        assert!(matches!(
            Tile::new(0, 2, 0, 1),
            Err(TileError::Inverted { .. })
        ));
    }

    #[test]
    fn test_area_and_dimensions() {
        let tile = Tile::new(1, 0, 3, 1).unwrap();
        assert_eq!(tile.width(), 3);
        assert_eq!(tile.height(), 2);
        assert_eq!(tile.area(), 6);
        assert_eq!(tile.genes(), [1, 0, 3, 1]);
    }

    #[test]
    fn test_validity() {
        let c = constraints();
        assert!(Tile::new(0, 0, 2, 1).unwrap().is_valid(&c));
        // Area 9 > 6
        assert!(!Tile::new(0, 0, 2, 2).unwrap().is_valid(&c));
        // Outside the grid
        assert!(!Tile::new(5, 0, 5, 0).unwrap().is_valid(&c));
    }

    #[test]
    fn test_clamped() {
        let c = constraints();
        let tile = Tile::new(3, 1, 9, 7).unwrap().clamped(&c);
        assert_eq!(tile.genes(), [3, 1, 4, 2]);

        let outside = Tile::new(7, 5, 9, 7).unwrap().clamped(&c);
        assert_eq!(outside.genes(), [4, 2, 4, 2]);
    }

    #[test]
    fn test_empty_genotype_rejected() {
        assert_eq!(Genotype::new(Vec::new()), Err(TileError::EmptyGenotype));
    }

    #[test]
    fn test_serialization() {
        let genotype = Genotype::new(vec![
            Tile::new(0, 0, 1, 1).unwrap(),
            Tile::new(2, 0, 4, 1).unwrap(),
        ])
        .unwrap();

        let json = serde_json::to_string(&genotype).unwrap();
        assert_eq!(json, "[[0,0,1,1],[2,0,4,1]]");

        let parsed: Genotype = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, genotype);

        assert!(serde_json::from_str::<Tile>("[0,0,1]").is_err());
        assert!(serde_json::from_str::<Genotype>("[]").is_err());
    }
}
