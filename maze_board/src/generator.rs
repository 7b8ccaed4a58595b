//! Tools to generate random mazes of different sizes.

use itertools::Itertools;
use rand::prelude::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{Maze, Tile, MIN_SIDE_LENGTH};

/// Fraction of interior cells that become walls.
pub const WALL_DENSITY: f64 = 0.25;

/// A maze generator producing mazes of a fixed size with a chosen number of
/// waypoints.
///
/// Walls are placed independently at [`WALL_DENSITY`], so generated mazes are
/// not guaranteed to be solvable. An unreachable waypoint is a legitimate
/// input for the search algorithms, which report it as a missing path.
#[derive(Debug)]
pub struct Generator {
    rng: rand_pcg::Pcg64Mcg,
    rows: usize,
    columns: usize,
}

impl Generator {
    /// Creates a new generator with a random state.
    ///
    /// # Panics
    /// Panics if either dimension is less than `3`.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self::with_rng(rand_pcg::Pcg64Mcg::from_entropy(), rows, columns)
    }

    /// Creates a new generator initialized with `seed`.
    ///
    /// The same seed produces the same sequence of mazes.
    ///
    /// # Panics
    /// Panics if either dimension is less than `3`.
    pub fn from_seed(seed: u128, rows: usize, columns: usize) -> Self {
        Self::with_rng(rand_pcg::Pcg64Mcg::new(seed), rows, columns)
    }

    fn with_rng(rng: rand_pcg::Pcg64Mcg, rows: usize, columns: usize) -> Self {
        assert!(
            rows >= MIN_SIDE_LENGTH && columns >= MIN_SIDE_LENGTH,
            "generated mazes must be at least {MIN_SIDE_LENGTH}x{MIN_SIDE_LENGTH}"
        );
        Self { rng, rows, columns }
    }

    /// Generates a new maze with `waypoint_count` waypoints.
    ///
    /// # Panics
    /// Panics if fewer than `waypoint_count + 1` cells stay open, which can
    /// only happen for tiny dimensions combined with large waypoint counts.
    pub fn generate(&mut self, waypoint_count: usize) -> Maze {
        let mut tiles = vec![vec![Tile::Wall; self.columns]; self.rows];

        // Carve the interior, keeping the border walls.
        for (row, column) in (1..self.rows - 1).cartesian_product(1..self.columns - 1) {
            if !self.rng.gen_bool(WALL_DENSITY) {
                tiles[row][column] = Tile::Open;
            }
        }

        let open_cells: Vec<(usize, usize)> = (1..self.rows - 1)
            .cartesian_product(1..self.columns - 1)
            .filter(|&(row, column)| tiles[row][column] == Tile::Open)
            .collect();
        assert!(
            open_cells.len() > waypoint_count,
            "not enough open cells for a start and {waypoint_count} waypoints"
        );

        let chosen: Vec<&(usize, usize)> = open_cells
            .choose_multiple(&mut self.rng, waypoint_count + 1)
            .collect();
        let &(start_row, start_column) = chosen[0];
        tiles[start_row][start_column] = Tile::Start;
        for &&(row, column) in &chosen[1..] {
            tiles[row][column] = Tile::Waypoint;
        }

        log::debug!(
            "generated {}x{} maze with {} waypoints",
            self.rows,
            self.columns,
            waypoint_count
        );

        Maze::from_tiles(tiles).expect("generated tiles to form a valid maze")
    }
}
