//! Search algorithms collecting the waypoints of a [`Maze`](maze_board::Maze).
//!
//! Three solvers share one state and transition model: moves go between
//! 4-adjacent navigable cells at unit cost. [`BreadthFirst`] and [`AStar`]
//! stop at the first waypoint they reach and serve the single-objective case.
//! [`MultiGoal`] searches the product space of cell and remaining waypoints
//! and returns a path stepping on every waypoint, guided by a minimum
//! spanning tree heuristic over the waypoints still missing. All solvers
//! report an unreachable goal as `None` rather than a partial path.

mod a_star;
mod bfs;
pub mod heuristic;
mod multi_goal;
pub mod util;

use getset::Getters;
use maze_board::{Maze, Position};

pub use a_star::AStar;
pub use bfs::BreadthFirst;
pub use multi_goal::{MultiGoal, FAST_WEIGHT};

/// A search algorithm producing a path through a maze.
pub trait Solver {
    /// Searches `maze` from its start cell for a path reaching the solver's
    /// goal.
    ///
    /// Returns `None` if the frontier is exhausted before a goal state is
    /// reached, i.e. there is no path. This is the only failure mode; it is
    /// never conflated with an empty path.
    fn solve(&mut self, maze: &Maze) -> Option<Path>;
}

/// A path through a maze.
///
/// Contains every cell the path visits in order, from the start cell to the
/// final waypoint, both included. A path is never empty; the shortest
/// possible path is the start cell alone, when there is nothing left to
/// collect.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Path {
    /// The cells of the path in visiting order.
    #[getset(get = "pub")]
    cells: Vec<Position>,
}

impl Path {
    /// Creates a new path from the cells it visits.
    pub fn new(cells: Vec<Position>) -> Self {
        debug_assert!(!cells.is_empty());
        Self { cells }
    }

    /// Returns the number of cells on the path.
    ///
    /// This counts cells, not moves; a path of `n` cells makes `n - 1` moves.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Checks if the path has no cells. Always false for paths built through
    /// [`Path::new`].
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the first cell of the path.
    pub fn start(&self) -> Position {
        self.cells[0]
    }

    /// Returns the last cell of the path.
    pub fn end(&self) -> Position {
        self.cells[self.cells.len() - 1]
    }
}
