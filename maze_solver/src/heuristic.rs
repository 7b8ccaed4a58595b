//! The minimum spanning tree heuristic guiding the multi-goal search.
//!
//! For a state that still has to collect the waypoint set `S`, the moves left
//! are at least the Manhattan distance to the closest member of `S` plus the
//! weight of the minimum spanning tree of `S` under Manhattan distances: any
//! tour touching every waypoint contains a spanning tree, and Manhattan
//! distance never overestimates the moves between two cells. The same
//! remaining set recurs across many search states, so [`MstCache`] memoizes
//! the tree weight per set within one search run.

use fxhash::FxHashMap;
use itertools::Itertools;
use maze_board::Position;

use crate::util::{WaypointIndex, WaypointSet};

/// Union-find over point indices.
///
/// `find` flattens the path to the root while resolving it, `union` reports
/// whether the two trees were actually merged.
#[derive(Debug)]
struct UnionFind {
    parents: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parents: (0..len).collect(),
        }
    }

    fn find(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parents[root] != root {
            root = self.parents[root];
        }
        let mut current = node;
        while self.parents[current] != root {
            current = std::mem::replace(&mut self.parents[current], root);
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }
        self.parents[root_b] = root_a;
        true
    }
}

/// Returns the weight of the minimum spanning tree of the complete graph over
/// `points` with Manhattan distances as edge weights.
///
/// Empty and single-point inputs weigh 0. Duplicate points are joined by
/// zero-weight edges first and cannot contribute twice. The edges are
/// processed in ascending weight order and joined through a union-find, so
/// the result does not depend on how ties between equal-weight edges are
/// ordered.
pub fn mst_weight(points: &[Position]) -> usize {
    if points.len() < 2 {
        return 0;
    }

    let mut edges: Vec<(usize, usize, usize)> = (0..points.len())
        .tuple_combinations()
        .map(|(a, b)| (points[a].manhattan(points[b]), a, b))
        .collect();
    edges.sort_unstable();

    let mut components = UnionFind::new(points.len());
    let mut weight = 0;
    let mut joined = 0;
    for (edge_weight, a, b) in edges {
        if components.union(a, b) {
            weight += edge_weight;
            joined += 1;
            if joined == points.len() - 1 {
                break;
            }
        }
    }

    weight
}

/// Memoizes [`mst_weight`] per remaining-waypoint set.
///
/// Waypoint coordinates are fixed for the lifetime of a maze, so a computed
/// weight stays valid for the whole search run the cache belongs to. The
/// cache is created per search invocation and dropped with it.
#[derive(Debug)]
pub struct MstCache<'a> {
    index: &'a WaypointIndex,
    cached: FxHashMap<WaypointSet, usize>,
    computations: usize,
}

impl<'a> MstCache<'a> {
    /// Creates an empty cache over the waypoints in `index`.
    pub fn new(index: &'a WaypointIndex) -> Self {
        Self {
            index,
            cached: FxHashMap::default(),
            computations: 0,
        }
    }

    /// Returns the MST weight of `remaining`, computing it at most once per
    /// distinct set.
    pub fn get_or_compute(&mut self, remaining: WaypointSet) -> usize {
        if let Some(&weight) = self.cached.get(&remaining) {
            return weight;
        }
        let weight = mst_weight(&self.index.positions(remaining));
        self.computations += 1;
        self.cached.insert(remaining, weight);
        weight
    }

    /// Returns how many sets were actually computed instead of served from
    /// the cache.
    pub fn computations(&self) -> usize {
        self.computations
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use maze_board::{Maze, Position};

    use super::{mst_weight, MstCache};
    use crate::util::WaypointIndex;

    fn cells(coordinates: &[(u16, u16)]) -> Vec<Position> {
        coordinates.iter().map(|&c| Position::from(c)).collect()
    }

    #[test]
    fn trivial_sets_weigh_nothing() {
        assert_eq!(mst_weight(&[]), 0);
        assert_eq!(mst_weight(&cells(&[(3, 4)])), 0);
    }

    #[test]
    fn collinear_waypoints() {
        // Two unit-weight edges of length 2 each.
        let points = cells(&[(1, 1), (1, 3), (1, 5)]);
        assert_eq!(mst_weight(&points), 4);
    }

    #[test]
    fn square_of_waypoints() {
        // Three sides of the square connect all four corners.
        let points = cells(&[(0, 0), (0, 2), (2, 0), (2, 2)]);
        assert_eq!(mst_weight(&points), 6);
    }

    #[test]
    fn weight_is_order_invariant() {
        let points = cells(&[(4, 1), (0, 0), (2, 7), (9, 3), (5, 5)]);
        let expected = mst_weight(&points);
        for permutation in points.iter().copied().permutations(points.len()) {
            assert_eq!(mst_weight(&permutation), expected);
        }
    }

    #[test]
    fn duplicates_do_not_add_weight() {
        let points = cells(&[(1, 1), (1, 1), (1, 4)]);
        assert_eq!(mst_weight(&points), 3);
    }

    #[test]
    fn cache_computes_each_set_once() {
        let maze: Maze = "%%%%%%%\n\
                          %P. ..%\n\
                          %%%%%%%"
            .parse()
            .unwrap();
        let index = WaypointIndex::new(&maze);
        let mut cache = MstCache::new(&index);

        let full = index.full_set();
        let first = cache.get_or_compute(full);
        assert_eq!(cache.computations(), 1);
        assert_eq!(cache.get_or_compute(full), first);
        assert_eq!(cache.computations(), 1);

        let smaller = full.remove(0);
        cache.get_or_compute(smaller);
        assert_eq!(cache.computations(), 2);
        cache.get_or_compute(smaller);
        cache.get_or_compute(full);
        assert_eq!(cache.computations(), 2);
    }

    /// Breadth-first distance between two cells of `maze`, ignoring the
    /// exploration counter. Test scaffolding for the admissibility check.
    fn grid_distance(maze: &Maze, from: Position, to: Position) -> usize {
        let mut seen = std::collections::HashMap::new();
        seen.insert(from, 0usize);
        let mut frontier = vec![from];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &cell in &frontier {
                let moves = seen[&cell];
                for neighbor in maze.neighbors(cell) {
                    if !seen.contains_key(&neighbor) {
                        seen.insert(neighbor, moves + 1);
                        next.push(neighbor);
                    }
                }
            }
            frontier = next;
        }
        seen[&to]
    }

    #[test]
    fn mst_weight_never_exceeds_the_optimal_tour() {
        // Brute force the optimal tour over all waypoint orders with real
        // grid distances; the MST weight has to stay a lower bound.
        let maze: Maze = "%%%%%%%%\n\
                          %P   . %\n\
                          % %%%% %\n\
                          % .    %\n\
                          % %% %%%\n\
                          %    . %\n\
                          %%%%%%%%"
            .parse()
            .unwrap();
        let waypoints = maze.waypoints().to_vec();

        let optimal_tour = waypoints
            .iter()
            .copied()
            .permutations(waypoints.len())
            .map(|order| {
                let mut cost = grid_distance(&maze, maze.start(), order[0]);
                for legs in order.windows(2) {
                    cost += grid_distance(&maze, legs[0], legs[1]);
                }
                cost
            })
            .min()
            .unwrap();

        assert!(mst_weight(&waypoints) <= optimal_tour);
    }

    #[test]
    fn cached_weights_match_direct_computation() {
        let maze: Maze = "%%%%%%%\n\
                          %P....%\n\
                          %%%%%%%"
            .parse()
            .unwrap();
        let index = WaypointIndex::new(&maze);
        let mut cache = MstCache::new(&index);

        let full = index.full_set();
        assert_eq!(cache.get_or_compute(full), mst_weight(maze.waypoints()));
        // (1,2) through (1,5): dropping one end shortens the chain by an edge.
        assert_eq!(cache.get_or_compute(full.remove(0)), 2);
    }
}
