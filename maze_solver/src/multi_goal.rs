use std::cmp::Reverse;

use float_ord::FloatOrd;
use fxhash::FxBuildHasher;
use log::debug;
use maze_board::{Maze, Position};
use priority_queue::PriorityQueue;

use crate::heuristic::MstCache;
use crate::util::{StateKey, VisitedNodes, WaypointIndex, WaypointSet};
use crate::{Path, Solver};

/// The heuristic weight used by [`MultiGoal::fast`].
pub const FAST_WEIGHT: f64 = 2.66;

/// A solver collecting every waypoint of a maze on one path.
///
/// Runs A* over the product space of cell and remaining waypoints: stepping
/// onto a waypoint that is still missing removes it from the successor's
/// remaining set, stepping onto anything else (including an already collected
/// waypoint) keeps the set. A state with an empty remaining set is a goal.
///
/// The frontier is ordered by moves taken plus the heuristic: the Manhattan
/// distance to the closest remaining waypoint plus the minimum spanning tree
/// weight of the remaining set, served by an [`MstCache`] scoped to the solve
/// call. With the default weight of 1 the heuristic stays a lower bound and
/// the returned path is optimal. [`MultiGoal::fast`] multiplies the heuristic
/// by [`FAST_WEIGHT`], trading optimality for fewer expanded states.
#[derive(Debug)]
pub struct MultiGoal {
    weight: f64,
    visited_nodes: VisitedNodes<SearchState>,
}

/// A cell paired with the waypoints still missing from the path that reached
/// it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct SearchState {
    position: Position,
    remaining: WaypointSet,
}

impl StateKey for SearchState {
    fn position(&self) -> Position {
        self.position
    }
}

impl MultiGoal {
    /// Creates a solver returning optimal paths.
    pub fn new() -> Self {
        Self::with_weight(1.0)
    }

    /// Creates a solver trading path length for speed.
    ///
    /// The inflated heuristic makes the search greedy: it expands far fewer
    /// states on waypoint-heavy mazes but may return a path up to the weight
    /// factor longer than optimal.
    pub fn fast() -> Self {
        Self::with_weight(FAST_WEIGHT)
    }

    /// Creates a solver with a custom heuristic weight.
    ///
    /// # Panics
    /// Panics if `weight` is less than `1`, which would just slow the search
    /// down without improving the result.
    pub fn with_weight(weight: f64) -> Self {
        assert!(weight >= 1.0, "heuristic weight must be at least 1");
        Self {
            weight,
            visited_nodes: VisitedNodes::with_capacity(65536),
        }
    }

    /// Returns the weighted estimate of the moves still needed from `pos`
    /// with `remaining` left to collect.
    fn estimate(
        &self,
        pos: Position,
        remaining: WaypointSet,
        index: &WaypointIndex,
        cache: &mut MstCache,
    ) -> f64 {
        if remaining.is_empty() {
            return 0.0;
        }
        let closest = remaining
            .indices()
            .map(|i| pos.manhattan(index.position(i)))
            .min()
            .expect("a non-empty remaining set has a closest waypoint");
        self.weight * (closest + cache.get_or_compute(remaining)) as f64
    }
}

impl Solver for MultiGoal {
    fn solve(&mut self, maze: &Maze) -> Option<Path> {
        let index = WaypointIndex::new(maze);
        let mut cache = MstCache::new(&index);

        // A waypoint on the start cell is collected before the first move.
        let mut remaining = index.full_set();
        if let Some(start_index) = index.index_of(maze.start()) {
            remaining = remaining.remove(start_index);
        }
        let start = SearchState {
            position: maze.start(),
            remaining,
        };

        self.visited_nodes.clear();
        self.visited_nodes.add_start(start);

        // Create a queue holding the not yet expanded states.
        let mut open_list =
            PriorityQueue::<SearchState, CostEstimate, FxBuildHasher>::with_capacity_and_hasher(
                65536,
                Default::default(),
            );
        let start_estimate = self.estimate(start.position, start.remaining, &index, &mut cache);
        open_list.push(start, CostEstimate::new(0, start_estimate));

        // Expand the search tree until a state with nothing left to collect
        // is popped; the frontier order guarantees no cheaper way to finish
        // is still open at that point.
        while let Some((state, prio)) = open_list.pop() {
            if state.remaining.is_empty() {
                let path = self.visited_nodes.path_to(&state);
                debug!(
                    "collected {} waypoints in {} moves, {} distinct remaining sets",
                    index.len(),
                    path.len() - 1,
                    cache.computations()
                );
                return Some(path);
            }

            let moves_from_start = prio.from_start() + 1;
            for neighbor in maze.neighbors(state.position) {
                let remaining = match index.index_of(neighbor) {
                    Some(i) if state.remaining.contains(i) => state.remaining.remove(i),
                    _ => state.remaining,
                };
                let successor = SearchState {
                    position: neighbor,
                    remaining,
                };

                if self
                    .visited_nodes
                    .add_node(successor, state, moves_from_start)
                    .was_discarded()
                {
                    // This state has already been reached with a shorter path.
                    continue;
                }

                let estimate = self.estimate(neighbor, remaining, &index, &mut cache);
                open_list.push_increase(successor, CostEstimate::new(moves_from_start, estimate));
            }
        }

        None
    }
}

impl Default for MultiGoal {
    fn default() -> Self {
        MultiGoal::new()
    }
}

/// Used to hold the moves needed to reach a state and the weighted estimate
/// of the moves from there to collecting the last waypoint.
///
/// `CostEstimate`s are ordered from high to low by the estimated total, so
/// the priority queue pops the cheapest state first. If the totals are the
/// same, the state with the higher `from_start` value is considered higher
/// in the ordering and, being closer to finishing, is expanded first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CostEstimate {
    // Reordering these fields changes the derived `Ord` and `PartialOrd`
    // implementations.
    total: Reverse<FloatOrd<f64>>,
    from_start: usize,
}

impl CostEstimate {
    fn new(from_start: usize, estimate: f64) -> Self {
        Self {
            total: Reverse(FloatOrd(from_start as f64 + estimate)),
            from_start,
        }
    }

    fn from_start(&self) -> usize {
        self.from_start
    }
}
