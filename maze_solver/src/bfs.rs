use maze_board::{Maze, Position};

use crate::util::VisitedNodes;
use crate::{Path, Solver};

/// Finds a shortest path to the closest waypoint by visiting all reachable
/// cells in order of moves needed to reach them.
#[derive(Debug, Clone)]
pub struct BreadthFirst {
    /// Manages knowledge of visited cells.
    visited_nodes: VisitedNodes<Position>,
}

impl Solver for BreadthFirst {
    fn solve(&mut self, maze: &Maze) -> Option<Path> {
        let start = maze.start();
        if maze.is_waypoint(start) {
            return Some(Path::new(vec![start]));
        }

        self.visited_nodes.clear();
        self.visited_nodes.add_start(start);

        // All cells reached with the current number of moves; the next
        // generation is collected while expanding them.
        let mut current_move_cells = vec![start];
        let mut next_move_cells: Vec<Position> = Vec::with_capacity(64);

        let mut move_n = 0;
        while !current_move_cells.is_empty() {
            for &cell in &current_move_cells {
                if let Some(reached) = self.expand(maze, cell, move_n, &mut next_move_cells) {
                    return Some(self.visited_nodes.path_to(&reached));
                }
            }
            move_n += 1;
            current_move_cells.clear();
            std::mem::swap(&mut current_move_cells, &mut next_move_cells);
        }

        // Every reachable cell has been expanded without finding a waypoint.
        None
    }
}

impl BreadthFirst {
    /// Create a new solver which uses a breadth first search to find an
    /// optimal path to the closest waypoint.
    pub fn new() -> Self {
        Self {
            visited_nodes: VisitedNodes::with_capacity(4096),
        }
    }

    /// Expands all unseen cells reachable from `from` and adds them to
    /// `self.visited_nodes`.
    ///
    /// `moves` is the number of moves needed to reach `from`. The expanded
    /// cells are pushed into `next_cells`, except for a waypoint, which ends
    /// the search and is returned instead.
    fn expand(
        &mut self,
        maze: &Maze,
        from: Position,
        moves: usize,
        next_cells: &mut Vec<Position>,
    ) -> Option<Position> {
        for neighbor in maze.neighbors(from) {
            // Mark the cell as visited and continue with the next one if it
            // has been reached before.
            if self
                .visited_nodes
                .add_node(neighbor, from, moves + 1)
                .was_discarded()
            {
                continue;
            }

            if maze.is_waypoint(neighbor) {
                return Some(neighbor);
            }

            next_cells.push(neighbor);
        }

        None
    }
}

impl Default for BreadthFirst {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use maze_board::{Maze, Position};

    use super::BreadthFirst;
    use crate::Solver;

    #[test]
    fn solves_a_straight_corridor() {
        let maze: Maze = "%%%%%%%\n\
                          %P   .%\n\
                          %%%%%%%"
            .parse()
            .unwrap();
        let path = BreadthFirst::new().solve(&maze).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.start(), maze.start());
        assert_eq!(path.end(), Position::new(1, 5));
        assert_eq!(maze.validate_path(path.cells()), Ok(()));
    }

    #[test]
    fn takes_the_detour_around_a_wall() {
        // The wall below the start row forces the path right, down and back
        // left: 6 moves instead of the Manhattan distance of 2.
        let maze: Maze = "%%%%%\n\
                          %P  %\n\
                          %%% %\n\
                          %.  %\n\
                          %%%%%"
            .parse()
            .unwrap();
        let path = BreadthFirst::new().solve(&maze).unwrap();
        assert_eq!(path.len(), 7);
        assert_eq!(maze.validate_path(path.cells()), Ok(()));
    }

    #[test]
    fn stops_at_the_closest_waypoint() {
        let maze: Maze = "%%%%%%%%\n\
                          %.  P .%\n\
                          %%%%%%%%"
            .parse()
            .unwrap();
        let path = BreadthFirst::new().solve(&maze).unwrap();
        assert_eq!(path.end(), Position::new(1, 6));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn reports_unreachable_waypoints() {
        let maze: Maze = "%%%%%%%\n\
                          %P  %.%\n\
                          %%%%%%%"
            .parse()
            .unwrap();
        assert_eq!(BreadthFirst::new().solve(&maze), None);
    }

    #[test]
    fn no_waypoints_means_no_path() {
        let maze: Maze = "%%%%%\n\
                          %P  %\n\
                          %%%%%"
            .parse()
            .unwrap();
        assert_eq!(BreadthFirst::new().solve(&maze), None);
    }
}
