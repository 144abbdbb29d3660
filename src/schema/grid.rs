//! The ingredient grid and its slicing constraints.
//!
//! Input format (whitespace separated):
//!
//! ```text
//! 3 5 1 6
//! TTTTT
//! TMMMT
//! TTTTT
//! ```
//!
//! The header holds the row count, column count, the minimum number of
//! each ingredient per slice and the maximum slice area. Exactly `rows`
//! lines of `columns` symbols follow. `x` indexes columns and `y` rows.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Constraints, Tile};

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ingredient {
    Tomato,
    Mushroom,
}

impl Ingredient {
    /// Parse an input symbol.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'T' => Some(Self::Tomato),
            'M' => Some(Self::Mushroom),
            _ => None,
        }
    }

    /// Symbol used in input and rendered output.
    pub fn symbol(self) -> char {
        match self {
            Self::Tomato => 'T',
            Self::Mushroom => 'M',
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Ingredient counts inside a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientCounts {
    pub tomatoes: usize,
    pub mushrooms: usize,
}

impl IngredientCounts {
    /// Whether both ingredients reach `min` cells.
    #[inline]
    pub fn satisfies(&self, min: usize) -> bool {
        self.tomatoes >= min && self.mushrooms >= min
    }
}

/// Immutable ingredient grid shared by every fitness evaluation.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    min_ingredients: usize,
    max_slice_area: usize,
    /// Row-major cells.
    cells: Vec<Ingredient>,
    /// Tomato count of `[0, x) x [0, y)` at `y * (width + 1) + x`.
    tomato_prefix: Vec<usize>,
}

impl Grid {
    /// Build a grid from rows of ingredients.
    pub fn new(
        rows: Vec<Vec<Ingredient>>,
        min_ingredients: usize,
        max_slice_area: usize,
    ) -> Result<Self, ProblemError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(ProblemError::EmptyGrid);
        }
        if max_slice_area == 0 {
            return Err(ProblemError::ZeroSliceArea);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(ProblemError::RowLength {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }

        let tomato_prefix = build_prefix(&cells, width, height);

        Ok(Self {
            width,
            height,
            min_ingredients,
            max_slice_area,
            cells,
            tomato_prefix,
        })
    }

    /// Parse the textual input format.
    pub fn parse(input: &str) -> Result<Self, ProblemError> {
        let mut lines = input.lines().map(str::trim).filter(|l| !l.is_empty());

        let mut header: Vec<&str> = Vec::with_capacity(4);
        while header.len() < 4 {
            match lines.next() {
                Some(line) => header.extend(line.split_whitespace()),
                None => break,
            }
        }
        if header.len() > 4 {
            return Err(ProblemError::TrailingHeaderToken(header[4].to_string()));
        }

        let rows = header_value(&header, 0, "rows")?;
        let columns = header_value(&header, 1, "columns")?;
        let min_ingredients = header_value(&header, 2, "min_ingredients")?;
        let max_slice_area = header_value(&header, 3, "max_slice_area")?;

        if rows == 0 || columns == 0 {
            return Err(ProblemError::EmptyGrid);
        }

        let mut grid_rows = Vec::with_capacity(rows);
        for (row, line) in lines.enumerate() {
            let parsed = line
                .chars()
                .enumerate()
                .map(|(column, symbol)| {
                    Ingredient::from_symbol(symbol).ok_or(ProblemError::UnknownIngredient {
                        row,
                        column,
                        symbol,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if parsed.len() != columns {
                return Err(ProblemError::RowLength {
                    row,
                    expected: columns,
                    found: parsed.len(),
                });
            }
            grid_rows.push(parsed);
        }

        if grid_rows.len() != rows {
            return Err(ProblemError::RowCount {
                expected: rows,
                found: grid_rows.len(),
            });
        }

        Self::new(grid_rows, min_ingredients, max_slice_area)
    }

    /// Read and parse an input file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProblemError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| ProblemError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&input)
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Minimum cells of each ingredient a slice needs to score.
    #[inline]
    pub fn min_ingredients(&self) -> usize {
        self.min_ingredients
    }

    /// Maximum cells a slice may cover.
    #[inline]
    pub fn max_slice_area(&self) -> usize {
        self.max_slice_area
    }

    /// One row of cells.
    pub fn row(&self, y: usize) -> &[Ingredient] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Bounds every tile generated for this grid must respect.
    pub fn constraints(&self) -> Constraints {
        Constraints {
            max_x: self.width - 1,
            max_y: self.height - 1,
            max_area: self.max_slice_area,
        }
    }

    /// Part of `tile` that lies on the grid, or `None` if they are disjoint.
    pub fn clip(&self, tile: &Tile) -> Option<Tile> {
        if tile.start_x() >= self.width || tile.start_y() >= self.height {
            return None;
        }
        Some(Tile::from_ordered(
            tile.start_x(),
            tile.start_y(),
            tile.end_x().min(self.width - 1),
            tile.end_y().min(self.height - 1),
        ))
    }

    /// Count ingredients inside `tile` in constant time.
    ///
    /// Cells beyond the grid edge are not counted.
    pub fn counts(&self, tile: &Tile) -> IngredientCounts {
        let Some(tile) = self.clip(tile) else {
            return IngredientCounts::default();
        };

        let stride = self.width + 1;
        let at = |x: usize, y: usize| self.tomato_prefix[y * stride + x];
        let (x0, y0) = (tile.start_x(), tile.start_y());
        let (x1, y1) = (tile.end_x() + 1, tile.end_y() + 1);

        let tomatoes = at(x1, y1) + at(x0, y0) - at(x0, y1) - at(x1, y0);
        IngredientCounts {
            tomatoes,
            mushrooms: tile.area() - tomatoes,
        }
    }
}

impl FromStr for Grid {
    type Err = ProblemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Summed-area table of tomato cells.
fn build_prefix(cells: &[Ingredient], width: usize, height: usize) -> Vec<usize> {
    let stride = width + 1;
    let mut prefix = vec![0usize; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0;
        for x in 0..width {
            if cells[y * width + x] == Ingredient::Tomato {
                row_sum += 1;
            }
            prefix[(y + 1) * stride + x + 1] = prefix[y * stride + x + 1] + row_sum;
        }
    }
    prefix
}

fn header_value(tokens: &[&str], index: usize, name: &'static str) -> Result<usize, ProblemError> {
    let token = tokens
        .get(index)
        .ok_or(ProblemError::MissingToken(name))?;
    token.parse().map_err(|_| ProblemError::InvalidNumber {
        name,
        value: token.to_string(),
    })
}

/// Errors raised while loading the problem input.
#[derive(Debug, thiserror::Error)]
pub enum ProblemError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Missing header value: {0}")]
    MissingToken(&'static str),
    #[error("Header value {name} is not a non-negative integer: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("Unexpected token after header: {0:?}")]
    TrailingHeaderToken(String),
    #[error("Grid must have at least one row and one column")]
    EmptyGrid,
    #[error("Maximum slice area must be non-zero")]
    ZeroSliceArea,
    #[error("Expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("Row {row} has {found} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown ingredient {symbol:?} at row {row}, column {column}")]
    UnknownIngredient {
        row: usize,
        column: usize,
        symbol: char,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EXAMPLE: &str = "3 5 1 6\nTTTTT\nTMMMT\nTTTTT\n";

    #[test]
    fn test_parse_example() {
        let grid = Grid::parse(EXAMPLE).unwrap();
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.min_ingredients(), 1);
        assert_eq!(grid.max_slice_area(), 6);
        assert_eq!(grid.row(1)[1], Ingredient::Mushroom);
        assert_eq!(grid.row(1)[0], Ingredient::Tomato);
        assert_eq!(
            grid.constraints(),
            Constraints {
                max_x: 4,
                max_y: 2,
                max_area: 6
            }
        );
    }

    #[test]
    fn test_header_split_across_lines() {
        let grid: Grid = "3 5\n1\n6\nTTTTT\nTMMMT\nTTTTT".parse().unwrap();
        assert_eq!(grid.cell_count(), 15);
    }

    #[test]
    fn test_counts_match_brute_force() {
        let grid = Grid::parse(EXAMPLE).unwrap();
        for sy in 0..3 {
            for ey in sy..3 {
                for sx in 0..5 {
                    for ex in sx..5 {
                        let tile = Tile::new(sx, sy, ex, ey).unwrap();
                        let mut expected = IngredientCounts::default();
                        for y in sy..=ey {
                            for x in sx..=ex {
                                match grid.row(y)[x] {
                                    Ingredient::Tomato => expected.tomatoes += 1,
                                    Ingredient::Mushroom => expected.mushrooms += 1,
                                }
                            }
                        }
                        assert_eq!(grid.counts(&tile), expected, "tile {tile}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_clip_to_grid() {
        let grid = Grid::parse(EXAMPLE).unwrap();
        let overhang = Tile::new(3, 1, 9, 7).unwrap();
        assert_eq!(grid.clip(&overhang), Some(Tile::new(3, 1, 4, 2).unwrap()));
        assert_eq!(
            grid.counts(&overhang),
            IngredientCounts {
                tomatoes: 3,
                mushrooms: 1
            }
        );

        let outside = Tile::new(5, 0, 6, 1).unwrap();
        assert_eq!(grid.clip(&outside), None);
        assert_eq!(grid.counts(&outside), IngredientCounts::default());
    }

    #[test]
    fn test_missing_header_value() {
        assert!(matches!(
            Grid::parse("3 5 1"),
            Err(ProblemError::MissingToken("max_slice_area"))
        ));
    }

    #[test]
    fn test_malformed_number() {
        assert!(matches!(
            Grid::parse("3 x 1 6\nTTTTT"),
            Err(ProblemError::InvalidNumber { name: "columns", .. })
        ));
    }

    #[test]
    fn test_row_count_mismatch() {
        assert!(matches!(
            Grid::parse("3 5 1 6\nTTTTT\nTMMMT\n"),
            Err(ProblemError::RowCount {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_row_length_mismatch() {
        assert!(matches!(
            Grid::parse("2 5 1 6\nTTTTT\nTMMT\n"),
            Err(ProblemError::RowLength {
                row: 1,
                expected: 5,
                found: 4
            })
        ));
    }

    #[test]
    fn test_unknown_ingredient() {
        assert!(matches!(
            Grid::parse("1 3 1 6\nTXM\n"),
            Err(ProblemError::UnknownIngredient {
                row: 0,
                column: 1,
                symbol: 'X'
            })
        ));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(matches!(
            Grid::parse("0 5 1 6\n"),
            Err(ProblemError::EmptyGrid)
        ));
        assert!(matches!(
            Grid::parse("1 2 1 0\nTM\n"),
            Err(ProblemError::ZeroSliceArea)
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();

        let grid = Grid::from_file(file.path()).unwrap();
        assert_eq!(grid.row(1), &[
            Ingredient::Tomato,
            Ingredient::Mushroom,
            Ingredient::Mushroom,
            Ingredient::Mushroom,
            Ingredient::Tomato,
        ]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Grid::from_file(dir.path().join("absent.in"));
        assert!(matches!(result, Err(ProblemError::Io { .. })));
    }
}
