//! Genome manipulation utilities for evolutionary search.
//!
//! Provides random generation, repair, crossover, and mutation operations.
//! Every operation draws from the [`GenomeRng`] it is called on; the engine
//! owns exactly one and only uses it from the sequential phases.

use crate::schema::{Constraints, Genotype, GenotypeConfig, Tile, TileGenes};
use rand::prelude::*;

/// One row or column removed from a tile's edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShrinkMove {
    StartX,
    EndX,
    StartY,
    EndY,
}

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a random valid tile.
    ///
    /// Corners are drawn uniformly (start first, then end between start and
    /// the grid edge); the result is then repaired down to the area limit.
    pub fn random_tile(&mut self, constraints: &Constraints) -> Tile {
        let start_x = self.rng.gen_range(0..=constraints.max_x);
        let start_y = self.rng.gen_range(0..=constraints.max_y);
        let end_x = self.rng.gen_range(start_x..=constraints.max_x);
        let end_y = self.rng.gen_range(start_y..=constraints.max_y);

        self.repair(
            Tile::from_ordered(start_x, start_y, end_x, end_y),
            constraints,
        )
    }

    /// Generate a random genotype of independently generated tiles.
    pub fn random_genotype(
        &mut self,
        constraints: &Constraints,
        config: &GenotypeConfig,
    ) -> Genotype {
        let (min_tiles, max_tiles) = config.tile_count_bounds;
        let count = self.rng.gen_range(min_tiles.max(1)..=max_tiles.max(1));
        let tiles = (0..count).map(|_| self.random_tile(constraints)).collect();
        Genotype::from_nonempty(tiles)
    }

    /// Shrink a tile until it fits `constraints`.
    ///
    /// Each step removes one edge row or column chosen uniformly among the
    /// edges that can still move, so area strictly decreases and the tile
    /// never inverts. Valid tiles are returned unchanged.
    pub fn repair(&mut self, tile: Tile, constraints: &Constraints) -> Tile {
        if tile.is_valid(constraints) {
            return tile;
        }

        let mut tile = tile.clamped(constraints);
        while tile.area() > constraints.max_area {
            let shrunk = self.shrink_once(tile);
            // A 1x1 tile cannot shrink; it always fits once max_area >= 1.
            if shrunk == tile {
                break;
            }
            tile = shrunk;
        }
        tile
    }

    /// Apply one random shrink move. A 1x1 tile is returned as is.
    pub fn shrink_once(&mut self, tile: Tile) -> Tile {
        let mut moves = Vec::with_capacity(4);
        if tile.start_x() < tile.end_x() {
            moves.extend([ShrinkMove::StartX, ShrinkMove::EndX]);
        }
        if tile.start_y() < tile.end_y() {
            moves.extend([ShrinkMove::StartY, ShrinkMove::EndY]);
        }

        let [mut start_x, mut start_y, mut end_x, mut end_y] = tile.genes();
        match moves.choose(&mut self.rng) {
            Some(ShrinkMove::StartX) => start_x += 1,
            Some(ShrinkMove::EndX) => end_x -= 1,
            Some(ShrinkMove::StartY) => start_y += 1,
            Some(ShrinkMove::EndY) => end_y -= 1,
            None => return tile,
        }
        Tile::from_ordered(start_x, start_y, end_x, end_y)
    }

    /// Turn raw genes into a valid tile.
    ///
    /// Inverted axes are swapped, coordinates clipped to the grid, and the
    /// area repaired.
    pub fn repair_genes(&mut self, genes: TileGenes, constraints: &Constraints) -> Tile {
        let [x0, y0, x1, y1] = genes;
        let tile = Tile::from_ordered(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1));
        self.repair(tile, constraints)
    }

    /// Repair every tile of a child and admit it as a genotype.
    pub fn repair_genotype(&mut self, genes: Vec<TileGenes>, constraints: &Constraints) -> Genotype {
        let tiles = genes
            .into_iter()
            .map(|g| self.repair_genes(g, constraints))
            .collect();
        Genotype::from_nonempty(tiles)
    }

    /// Perform crossover between two genotypes.
    ///
    /// Either exchanges tile sub-sequences or coordinate genes, with equal
    /// odds. When both parents hold a tile count inside
    /// `config.tile_count_bounds`, so does the child.
    pub fn crossover(
        &mut self,
        parent1: &Genotype,
        parent2: &Genotype,
        config: &GenotypeConfig,
    ) -> Vec<TileGenes> {
        let (min_tiles, max_tiles) = config.tile_count_bounds;
        let mut child = if self.rng.gen_bool(0.5) {
            self.sequence_crossover(parent1, parent2, min_tiles, max_tiles)
        } else {
            self.gene_crossover(parent1, parent2)
        };
        child.truncate(max_tiles.max(1));
        child
    }

    /// Head of parent 1 followed by a tail of parent 2.
    ///
    /// Cut points are drawn so the child length lands in
    /// `[min_tiles, max_tiles]` whenever the parents together hold enough
    /// tiles. The head always keeps at least one tile.
    fn sequence_crossover(
        &mut self,
        parent1: &Genotype,
        parent2: &Genotype,
        min_tiles: usize,
        max_tiles: usize,
    ) -> Vec<TileGenes> {
        let (len1, len2) = (parent1.len(), parent2.len());

        let head_hi = len1.min(max_tiles).max(1);
        let head_lo = min_tiles.saturating_sub(len2).clamp(1, head_hi);
        let head = self.rng.gen_range(head_lo..=head_hi);

        let tail_hi = len2.min(max_tiles.saturating_sub(head));
        let tail_lo = min_tiles.saturating_sub(head).min(tail_hi);
        let tail = self.rng.gen_range(tail_lo..=tail_hi);

        parent1.tiles()[..head]
            .iter()
            .chain(&parent2.tiles()[len2 - tail..])
            .map(Tile::genes)
            .collect()
    }

    /// Uniform exchange of coordinates between aligned tiles.
    ///
    /// Surplus tiles of the longer parent are kept as they are. Mixed genes
    /// can invert a tile; repair fixes that later.
    fn gene_crossover(&mut self, parent1: &Genotype, parent2: &Genotype) -> Vec<TileGenes> {
        let mut child: Vec<TileGenes> = parent1
            .iter()
            .zip(parent2.iter())
            .map(|(a, b)| {
                let (a, b) = (a.genes(), b.genes());
                std::array::from_fn(|k| if self.rng.gen_bool(0.5) { a[k] } else { b[k] })
            })
            .collect();

        let longer = if parent1.len() >= parent2.len() {
            parent1
        } else {
            parent2
        };
        child.extend(longer.tiles()[child.len()..].iter().map(Tile::genes));
        child
    }

    /// Mutate a child's raw genes.
    ///
    /// Each tile is perturbed with probability `rate`. With probability
    /// `rate * 0.1` a random tile is appended, and with the same probability
    /// one is removed, both within the tile count bounds.
    pub fn mutate(
        &mut self,
        genes: &mut Vec<TileGenes>,
        rate: f32,
        strength: f32,
        constraints: &Constraints,
        config: &GenotypeConfig,
    ) {
        for tile in genes.iter_mut() {
            if self.rng.r#gen::<f32>() < rate {
                self.perturb_tile(tile, strength, constraints);
            }
        }

        let (min_tiles, max_tiles) = config.tile_count_bounds;
        if self.rng.r#gen::<f32>() < rate * 0.1 && genes.len() < max_tiles {
            genes.push(self.random_tile(constraints).genes());
        }
        if self.rng.r#gen::<f32>() < rate * 0.1 && genes.len() > min_tiles.max(1) {
            let idx = self.rng.gen_range(0..genes.len());
            genes.remove(idx);
        }
    }

    /// Gaussian noise on all four coordinates.
    fn perturb_tile(&mut self, genes: &mut TileGenes, strength: f32, constraints: &Constraints) {
        let limits = [
            constraints.max_x,
            constraints.max_y,
            constraints.max_x,
            constraints.max_y,
        ];
        for (gene, max) in genes.iter_mut().zip(limits) {
            *gene = self.gaussian_mutate(*gene, strength, max);
        }
    }

    /// Gaussian mutation of a coordinate in `[0, max]`.
    pub fn gaussian_mutate(&mut self, value: usize, strength: f32, max: usize) -> usize {
        let noise: f32 = self.rng.sample(rand_distr::StandardNormal);
        let delta = (noise * strength * (max + 1) as f32).round() as i64;
        (value as i64 + delta).clamp(0, max as i64) as usize
    }

    /// Uniform index in `0..len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.rng.r#gen()
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.rng.r#gen::<f32>() < p
    }
}
