use std::cmp::Reverse;

use fxhash::FxBuildHasher;
use maze_board::{Maze, Position};
use priority_queue::PriorityQueue;

use crate::util::VisitedNodes;
use crate::{Path, Solver};

/// A solver using the [A*](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// search algorithm to find a shortest path to the closest waypoint.
///
/// The minimum Manhattan distance to any waypoint is used as an admissible
/// heuristic to prioritize the frontier: it never overestimates the moves
/// still needed, so the first waypoint popped from the frontier closes an
/// optimal path.
#[derive(Debug)]
pub struct AStar {
    visited_nodes: VisitedNodes<Position>,
}

impl AStar {
    /// Creates a new `AStar` solver.
    pub fn new() -> Self {
        Self {
            visited_nodes: VisitedNodes::with_capacity(4096),
        }
    }
}

impl Solver for AStar {
    fn solve(&mut self, maze: &Maze) -> Option<Path> {
        let start = maze.start();
        if maze.is_waypoint(start) {
            return Some(Path::new(vec![start]));
        }

        // The estimate is undefined without waypoints, and there is nothing
        // to reach anyway.
        let closest_waypoint =
            |pos: Position| maze.waypoints().iter().map(|&w| pos.manhattan(w)).min();
        let start_estimate = closest_waypoint(start)?;

        self.visited_nodes.clear();
        self.visited_nodes.add_start(start);

        // Create a queue holding the not yet expanded cells.
        let mut open_list =
            PriorityQueue::<Position, MoveCounter, FxBuildHasher>::with_capacity_and_hasher(
                4096,
                Default::default(),
            );
        open_list.push(start, MoveCounter::new(0, start_estimate));

        // Expand the search tree until a waypoint is popped.
        while let Some((cell, prio)) = open_list.pop() {
            if maze.is_waypoint(cell) {
                return Some(self.visited_nodes.path_to(&cell));
            }

            let moves_from_start = prio.from_start() + 1;
            for neighbor in maze.neighbors(cell) {
                if self
                    .visited_nodes
                    .add_node(neighbor, cell, moves_from_start)
                    .was_discarded()
                {
                    // This cell has already been reached with a shorter path.
                    continue;
                }

                let estimate = closest_waypoint(neighbor)
                    .expect("a maze with waypoints has a closest waypoint");
                open_list.push_increase(neighbor, MoveCounter::new(moves_from_start, estimate));
            }
        }

        None
    }
}

impl Default for AStar {
    fn default() -> Self {
        AStar::new()
    }
}

/// Used to hold the moves needed to reach a cell and the estimated number of
/// moves from there to the closest waypoint.
///
/// `MoveCounter`s are ordered from high to low by the estimated total number
/// of moves from the start to a waypoint, so the priority queue pops the
/// cheapest cell first. If the totals are the same, the counter with the
/// higher `from_start` value is considered higher in the ordering and its
/// cell, being closer to a goal, is expanded first.
///
/// ```txt
/// MoveCounter(total, from_start)
///
/// MoveCounter(10, 3) < MoveCounter(10, 5) = MoveCounter(10, 5) < MoveCounter(5, 2)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MoveCounter {
    // Reordering these fields changes the derived `Ord` and `PartialOrd`
    // implementations.
    total: Reverse<usize>,
    from_start: usize,
}

impl MoveCounter {
    pub fn new(from_start: usize, to_waypoint: usize) -> Self {
        Self {
            total: Reverse(from_start + to_waypoint),
            from_start,
        }
    }

    pub fn from_start(&self) -> usize {
        self.from_start
    }
}

#[cfg(test)]
mod tests {
    use maze_board::Maze;
    use priority_queue::PriorityQueue;

    use super::{AStar, MoveCounter};
    use crate::{BreadthFirst, Solver};

    #[test]
    fn move_counter_ordering() {
        // naming scheme: total_fromStart
        let ten_five_1 = MoveCounter::new(5, 5);
        let ten_five_2 = MoveCounter::new(5, 5);
        let ten_three = MoveCounter::new(3, 7);
        let five_two = MoveCounter::new(2, 3);
        let mut sorted = vec![
            five_two.clone(),
            ten_five_1.clone(),
            ten_three.clone(),
            ten_five_2.clone(),
        ];
        sorted.sort();

        assert_eq!(vec![ten_three, ten_five_1, ten_five_2, five_two], sorted)
    }

    #[test]
    fn move_counter_priority_queue() {
        let mut queue = PriorityQueue::new();
        queue.push("first", MoveCounter::new(3, 7));
        queue.push("second", MoveCounter::new(2, 3));
        queue.push("third", MoveCounter::new(5, 5));
        queue.push("fourth", MoveCounter::new(4, 6));

        let sorted = queue.into_sorted_vec();
        assert_eq!(vec!["second", "third", "fourth", "first"], sorted)
    }

    #[test]
    fn takes_the_detour_around_a_wall() {
        let maze: Maze = "%%%%%\n\
                          %P  %\n\
                          %%% %\n\
                          %.  %\n\
                          %%%%%"
            .parse()
            .unwrap();
        let path = AStar::new().solve(&maze).unwrap();
        assert_eq!(path.len(), 7);
        assert_eq!(maze.validate_path(path.cells()), Ok(()));
    }

    #[test]
    fn matches_breadth_first_path_lengths() {
        // A* must return optimal paths, so its path length has to equal the
        // breadth-first one on any single-waypoint maze.
        let mazes = [
            "%%%%%%%\n%P   .%\n%%%%%%%",
            "%%%%%%%\n%P    %\n% %%% %\n% %.% %\n% % % %\n%     %\n%%%%%%%",
            "%%%%%%%%%\n%   %   %\n% P % . %\n%   %   %\n%   %   %\n%%  %  %%\n%       %\n%%%%%%%%%",
        ];
        for text in mazes {
            let maze: Maze = text.parse().unwrap();
            let bfs_path = BreadthFirst::new().solve(&maze).unwrap();
            let astar_path = AStar::new().solve(&maze).unwrap();
            assert_eq!(astar_path.len(), bfs_path.len());
            assert_eq!(maze.validate_path(astar_path.cells()), Ok(()));
        }
    }

    #[test]
    fn explores_fewer_states_than_breadth_first() {
        let text = "%%%%%%%%%\n\
                    %P      %\n\
                    %       %\n\
                    %       %\n\
                    %      .%\n\
                    %%%%%%%%%";
        let bfs_maze: Maze = text.parse().unwrap();
        BreadthFirst::new().solve(&bfs_maze).unwrap();

        let astar_maze: Maze = text.parse().unwrap();
        AStar::new().solve(&astar_maze).unwrap();

        assert!(astar_maze.states_explored() <= bfs_maze.states_explored());
    }

    #[test]
    fn reports_unreachable_waypoints() {
        let maze: Maze = "%%%%%%%\n\
                          %P  %.%\n\
                          %%%%%%%"
            .parse()
            .unwrap();
        assert_eq!(AStar::new().solve(&maze), None);
    }
}
