//! Bookkeeping shared by the search algorithms.

use std::collections::hash_map::Entry;
use std::hash::Hash;

use fxhash::FxHashMap;
use indexmap::IndexSet;
use maze_board::{Maze, Position};

use crate::Path;

/// The possible outcomes when trying to add a node to [`VisitedNodes`].
pub(crate) enum AddNodeOutcome {
    /// The added node was previously unknown and has been added.
    New,
    /// The node has been seen before but is worse than the newly added one.
    WorseKnown,
    /// The node has been seen before and can be reached with fewer moves. The
    /// new node has been discarded.
    BetterKnown,
}

impl AddNodeOutcome {
    /// Returns `true` if the node has been added to `VisitedNodes`.
    pub fn was_added(&self) -> bool {
        match self {
            AddNodeOutcome::New => true,
            AddNodeOutcome::WorseKnown => true,
            AddNodeOutcome::BetterKnown => false,
        }
    }

    /// Returns `true` if the node has been discarded.
    pub fn was_discarded(&self) -> bool {
        !self.was_added()
    }
}

/// A key identifying one search state.
///
/// The solvers differ in what a state is: the single-goal searches walk plain
/// cells, the multi-goal search walks cells paired with the waypoints still
/// missing. Both kinds of key expose the cell they sit on so a finished
/// search can be turned back into a sequence of cells.
pub trait StateKey: Copy + Eq + Hash {
    /// Returns the maze cell this state sits on.
    fn position(&self) -> Position;
}

impl StateKey for Position {
    fn position(&self) -> Position {
        *self
    }
}

/// A visited search state: the best known number of moves to reach it and the
/// state it was reached from.
#[derive(Debug, Clone)]
struct VisitedNode<K> {
    moves_to_reach: usize,
    /// `None` marks the state the search started from.
    previous: Option<K>,
}

/// Stores search states and the best known way to reach them, like nodes in a
/// tree.
///
/// This wraps a map from state keys to [`VisitedNode`]s and provides the
/// add-node discipline the solvers share: a state is only (re)recorded when
/// it has never been seen or when the new way to reach it is strictly
/// shorter. [`path_to`](VisitedNodes::path_to) turns the recorded
/// predecessors back into a [`Path`].
#[derive(Debug, Clone)]
pub(crate) struct VisitedNodes<K> {
    nodes: FxHashMap<K, VisitedNode<K>>,
}

impl<K: StateKey> VisitedNodes<K> {
    /// Creates a new `VisitedNodes` with the given `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Removes all stored nodes.
    pub fn clear(&mut self) {
        self.nodes.clear()
    }

    /// Records `state` as the state the search starts from.
    pub fn add_start(&mut self, state: K) {
        self.nodes.insert(
            state,
            VisitedNode {
                moves_to_reach: 0,
                previous: None,
            },
        );
    }

    /// Adds a node for `state`, reached from `from` in `moves` moves.
    ///
    /// If there's already a node for `state` that can be reached with fewer
    /// or equally many moves, the new node is discarded. Otherwise the new
    /// node replaces the known one.
    pub fn add_node(&mut self, state: K, from: K, moves: usize) -> AddNodeOutcome {
        match self.nodes.entry(state) {
            Entry::Occupied(occupied) if occupied.get().moves_to_reach <= moves => {
                AddNodeOutcome::BetterKnown
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(VisitedNode {
                    moves_to_reach: moves,
                    previous: Some(from),
                });
                AddNodeOutcome::WorseKnown
            }
            Entry::Vacant(vacant) => {
                vacant.insert(VisitedNode {
                    moves_to_reach: moves,
                    previous: Some(from),
                });
                AddNodeOutcome::New
            }
        }
    }

    /// Returns the shortest known path to `state`.
    ///
    /// The path contains one cell per state on the way, start included, so
    /// its length is the number of moves to reach `state` plus one.
    ///
    /// # Panics
    /// Panics if `state` or one of its recorded predecessors has not been
    /// visited.
    pub fn path_to(&self, state: &K) -> Path {
        let mut cells = Vec::with_capacity(32);
        let mut current = *state;

        loop {
            let node = self
                .nodes
                .get(&current)
                .expect("Failed to find a supposed predecessor state");
            cells.push(current.position());
            match node.previous {
                Some(previous) => current = previous,
                None => break,
            }
        }

        cells.reverse();
        Path::new(cells)
    }
}

/// The waypoints a search state still has to collect, stored as a bit mask
/// over the indices of a [`WaypointIndex`].
///
/// The mask is canonical: two states with the same remaining waypoints
/// compare and hash equal no matter in which order the waypoints were
/// collected. Removal returns a new set, so sets shrink monotonically along
/// any search path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaypointSet {
    bits: u64,
}

impl WaypointSet {
    /// The largest number of waypoints a set can hold.
    pub const MAX_WAYPOINTS: usize = u64::BITS as usize;

    /// Returns the set containing the indices `0..len`.
    pub fn full(len: usize) -> Self {
        assert!(len <= Self::MAX_WAYPOINTS);
        if len == Self::MAX_WAYPOINTS {
            Self { bits: u64::MAX }
        } else {
            Self {
                bits: (1 << len) - 1,
            }
        }
    }

    /// Returns the empty set.
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Checks if no waypoints are left.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns the number of waypoints in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Checks if the waypoint with `index` is in the set.
    pub fn contains(&self, index: usize) -> bool {
        self.bits & (1 << index) != 0
    }

    /// Returns the set without the waypoint at `index`.
    ///
    /// Removing an index that is not in the set returns the set unchanged.
    #[must_use]
    pub fn remove(&self, index: usize) -> Self {
        Self {
            bits: self.bits & !(1 << index),
        }
    }

    /// Iterates over the indices in the set, in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        let bits = self.bits;
        (0..Self::MAX_WAYPOINTS).filter(move |index| bits & (1 << index) != 0)
    }
}

/// Assigns every waypoint of a maze a stable index.
///
/// The indices follow the maze's waypoint order, which is deterministic for a
/// given maze file, and are what [`WaypointSet`] masks refer to.
#[derive(Debug, Clone)]
pub struct WaypointIndex {
    waypoints: IndexSet<Position>,
}

impl WaypointIndex {
    /// Creates the index for the waypoints of `maze`.
    ///
    /// # Panics
    /// Panics if the maze has more waypoints than a [`WaypointSet`] can hold.
    pub fn new(maze: &Maze) -> Self {
        let waypoints: IndexSet<Position> = maze.waypoints().iter().copied().collect();
        assert!(
            waypoints.len() <= WaypointSet::MAX_WAYPOINTS,
            "mazes with more than {} waypoints are not supported, this one has {}",
            WaypointSet::MAX_WAYPOINTS,
            waypoints.len()
        );
        Self { waypoints }
    }

    /// Returns the number of indexed waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Checks if the maze had no waypoints at all.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Returns the set of all indexed waypoints.
    pub fn full_set(&self) -> WaypointSet {
        WaypointSet::full(self.len())
    }

    /// Returns the index of the waypoint at `pos`, if `pos` is a waypoint.
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.waypoints.get_index_of(&pos)
    }

    /// Returns the cell of the waypoint with `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn position(&self, index: usize) -> Position {
        *self
            .waypoints
            .get_index(index)
            .expect("waypoint index out of range")
    }

    /// Returns the cells of the waypoints in `set`.
    pub fn positions(&self, set: WaypointSet) -> Vec<Position> {
        set.indices().map(|index| self.position(index)).collect()
    }
}

#[cfg(test)]
mod tests {
    use maze_board::{Maze, Position};

    use super::{VisitedNodes, WaypointIndex, WaypointSet};

    #[test]
    fn add_node_keeps_the_shorter_way() {
        let mut nodes = VisitedNodes::with_capacity(8);
        let start = Position::new(1, 1);
        let middle = Position::new(1, 2);
        let end = Position::new(1, 3);

        nodes.add_start(start);
        assert!(nodes.add_node(middle, start, 1).was_added());
        assert!(nodes.add_node(end, middle, 2).was_added());
        // A longer or equally long way to a known state is discarded.
        assert!(nodes.add_node(middle, end, 3).was_discarded());
        assert!(nodes.add_node(middle, start, 1).was_discarded());

        let path = nodes.path_to(&end);
        assert_eq!(path.cells(), &vec![start, middle, end]);
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn path_to_start_is_a_single_cell() {
        let mut nodes = VisitedNodes::with_capacity(8);
        let start = Position::new(2, 2);
        nodes.add_start(start);
        assert_eq!(nodes.path_to(&start).cells(), &vec![start]);
    }

    #[test]
    fn waypoint_set_operations() {
        let full = WaypointSet::full(3);
        assert_eq!(full.len(), 3);
        assert!(!full.is_empty());
        assert!(full.contains(0) && full.contains(1) && full.contains(2));
        assert!(!full.contains(3));

        let without_one = full.remove(1);
        assert_eq!(without_one.len(), 2);
        assert!(!without_one.contains(1));
        assert_eq!(without_one.indices().collect::<Vec<_>>(), vec![0, 2]);
        // Removal is order-independent: the mask stays canonical.
        assert_eq!(full.remove(1).remove(2), full.remove(2).remove(1));
        // Removing an absent index is a no-op.
        assert_eq!(without_one.remove(1), without_one);

        assert!(without_one.remove(0).remove(2).is_empty());
        assert_eq!(WaypointSet::empty(), WaypointSet::full(0));
    }

    #[test]
    fn waypoint_set_capacity_edge() {
        let all = WaypointSet::full(WaypointSet::MAX_WAYPOINTS);
        assert_eq!(all.len(), WaypointSet::MAX_WAYPOINTS);
        assert!(all.contains(WaypointSet::MAX_WAYPOINTS - 1));
    }

    #[test]
    fn index_follows_maze_order() {
        let maze: Maze = "%%%%%\n\
                          %. .%\n\
                          %P..%\n\
                          %%%%%"
            .parse()
            .unwrap();
        let index = WaypointIndex::new(&maze);

        assert_eq!(index.len(), 4);
        assert_eq!(index.index_of(Position::new(1, 1)), Some(0));
        assert_eq!(index.index_of(Position::new(1, 3)), Some(1));
        assert_eq!(index.index_of(Position::new(2, 2)), Some(2));
        assert_eq!(index.index_of(Position::new(2, 3)), Some(3));
        assert_eq!(index.index_of(Position::new(2, 1)), None);
        assert_eq!(index.position(2), Position::new(2, 2));

        let set = index.full_set().remove(1).remove(3);
        assert_eq!(
            index.positions(set),
            vec![Position::new(1, 1), Position::new(2, 2)]
        );
    }
}
