#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! Basic components to represent and inspect ASCII mazes.
//!
//! A maze is a rectangular grid of cells read from a text file. Walls are `%`,
//! the single start cell is `P`, waypoints are `.` and every other cell is open
//! floor. The border of the grid must consist entirely of walls, which keeps
//! all movement inside the grid. A path through the maze moves between
//! 4-adjacent open cells and is complete once it has stepped on every waypoint.
//!
//! The main type is [`Maze`]. It answers navigability and neighbor queries for
//! the search algorithms, hands out the start cell and the waypoint list, and
//! counts how many states a search explored through its
//! [`Maze::neighbors`] method. [`Maze::validate_path`] checks a finished path
//! against the maze rules. Random mazes can be built with the
//! [`generator`] module.

mod draw;
pub mod generator;
mod positions;

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::Path as FilePath;
use std::str::FromStr;
use std::{fmt, fs, io};

use thiserror::Error;

pub use crate::draw::draw_maze;
pub use crate::positions::{Position, PositionEncoding};

/// The character marking a wall cell in a maze file.
pub const WALL: char = '%';
/// The character marking the start cell in a maze file.
pub const START: char = 'P';
/// The character marking a waypoint cell in a maze file.
pub const WAYPOINT: char = '.';
/// The character marking an open floor cell in a maze file.
pub const OPEN: char = ' ';

/// The smallest allowed maze dimension in both directions.
pub const MIN_SIDE_LENGTH: usize = 3;

/// The largest maze dimension encodable in a [`Position`].
const MAX_SIDE_LENGTH: usize = 1 << (PositionEncoding::BITS / 2);

/// A single cell of a maze.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tile {
    /// A wall, cannot be entered.
    Wall,
    /// Open floor.
    Open,
    /// The cell the search starts from.
    Start,
    /// A cell every valid path has to visit.
    Waypoint,
}

impl Tile {
    /// Returns the maze file character for this tile.
    pub fn to_char(self) -> char {
        match self {
            Tile::Wall => WALL,
            Tile::Open => OPEN,
            Tile::Start => START,
            Tile::Waypoint => WAYPOINT,
        }
    }

    fn from_char(character: char) -> Option<Self> {
        match character {
            WALL => Some(Tile::Wall),
            OPEN => Some(Tile::Open),
            START => Some(Tile::Start),
            WAYPOINT => Some(Tile::Waypoint),
            _ => None,
        }
    }
}

/// Errors found while reading a maze from a file or building one from tiles.
#[derive(Debug, Error)]
pub enum MazeError {
    /// The maze file could not be read.
    #[error("failed to read maze file: {0}")]
    Io(#[from] io::Error),
    /// Not all rows of the maze have the same length.
    #[error("all maze rows must have length {expected}, row {row} has length {len}")]
    RaggedRows {
        /// Index of the offending row.
        row: usize,
        /// Length of the offending row.
        len: usize,
        /// Length of the first row.
        expected: usize,
    },
    /// The maze is smaller than [`MIN_SIDE_LENGTH`] in one direction.
    #[error("maze dimensions ({rows}, {columns}) must be at least ({MIN_SIDE_LENGTH}, {MIN_SIDE_LENGTH})")]
    TooSmall {
        /// Number of rows in the maze.
        rows: usize,
        /// Number of columns in the maze.
        columns: usize,
    },
    /// The maze is too large to encode its cells in a [`Position`].
    #[error("maze dimensions ({rows}, {columns}) exceed the supported maximum of {MAX_SIDE_LENGTH}")]
    TooLarge {
        /// Number of rows in the maze.
        rows: usize,
        /// Number of columns in the maze.
        columns: usize,
    },
    /// A cell on the border of the maze is not a wall.
    #[error("maze borders may only contain wall cells, found an open cell at ({row}, {column})")]
    UnenclosedBorder {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        column: usize,
    },
    /// A character in the maze file is not part of the legend.
    #[error("unknown maze character {character:?} at ({row}, {column})")]
    UnknownCharacter {
        /// The offending character.
        character: char,
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        column: usize,
    },
    /// The maze does not contain exactly one start cell.
    #[error("maze must contain exactly one start cell, found {0}")]
    StartCount(usize),
}

/// Rule violations found by [`Maze::validate_path`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path contains no cells.
    #[error("path must not be empty")]
    Empty,
    /// Two consecutive path cells are not 4-adjacent.
    #[error("path cell {index} ({to:?}) must be exactly one move away from the previous cell ({from:?})")]
    DisconnectedStep {
        /// Index of the second cell of the offending pair.
        index: usize,
        /// The cell the step came from.
        from: Position,
        /// The cell the step went to.
        to: Position,
    },
    /// A path cell is a wall or outside the maze.
    #[error("path cell {index} ({position:?}) is not a navigable maze cell")]
    NotNavigable {
        /// Index of the offending cell.
        index: usize,
        /// The offending cell.
        position: Position,
    },
    /// The last path cell is not a waypoint.
    #[error("last path cell ({position:?}) must be a waypoint")]
    EndsOffWaypoint {
        /// The final cell of the path.
        position: Position,
    },
    /// The path revisits a cell without collecting a waypoint in between.
    #[error("path segment [{from_index} : {to_index}] contains no waypoints")]
    UselessSegment {
        /// Index of the first visit.
        from_index: usize,
        /// Index of the repeated visit.
        to_index: usize,
    },
    /// A waypoint of the maze does not appear on the path.
    #[error("waypoint ({position:?}) was never visited")]
    MissedWaypoint {
        /// The missed waypoint.
        position: Position,
    },
}

/// A maze the search algorithms run on.
///
/// Owns the grid, the start cell and the waypoint list, all immutable for the
/// lifetime of the maze. The only mutable piece is the exploration counter,
/// which [`neighbors`](Maze::neighbors) bumps on every call as a measure of
/// how many states a search expanded. The counter lives in a [`Cell`] so the
/// maze can be shared immutably with a running search; `Cell` not being `Sync`
/// also rules out two searches sharing one maze across threads.
#[derive(Clone, PartialEq, Eq)]
pub struct Maze {
    tiles: Vec<Vec<Tile>>,
    start: Position,
    waypoints: Vec<Position>,
    states_explored: Cell<usize>,
}

impl Maze {
    /// Reads a maze from the file at `path`.
    pub fn from_file<P: AsRef<FilePath>>(path: P) -> Result<Self, MazeError> {
        fs::read_to_string(path)?.parse()
    }

    /// Builds a maze from a tile grid.
    ///
    /// The grid has to follow the same rules as a maze file: rectangular, at
    /// least 3x3, walls all around the border and exactly one start cell.
    /// Waypoints are collected in row-major order, which keeps their indices
    /// stable for a given maze.
    pub fn from_tiles(tiles: Vec<Vec<Tile>>) -> Result<Self, MazeError> {
        let rows = tiles.len();
        let columns = tiles.first().map_or(0, Vec::len);

        if let Some((row, len)) = tiles
            .iter()
            .enumerate()
            .find_map(|(i, r)| (r.len() != columns).then(|| (i, r.len())))
        {
            return Err(MazeError::RaggedRows {
                row,
                len,
                expected: columns,
            });
        }
        if rows < MIN_SIDE_LENGTH || columns < MIN_SIDE_LENGTH {
            return Err(MazeError::TooSmall { rows, columns });
        }
        if rows > MAX_SIDE_LENGTH || columns > MAX_SIDE_LENGTH {
            return Err(MazeError::TooLarge { rows, columns });
        }

        let mut start = None;
        let mut start_count = 0;
        let mut waypoints = Vec::new();
        for (row, tile_row) in tiles.iter().enumerate() {
            for (column, &tile) in tile_row.iter().enumerate() {
                let on_border =
                    row == 0 || row == rows - 1 || column == 0 || column == columns - 1;
                if on_border && tile != Tile::Wall {
                    return Err(MazeError::UnenclosedBorder { row, column });
                }
                let pos = Position::new(row as PositionEncoding, column as PositionEncoding);
                match tile {
                    Tile::Start => {
                        start = Some(pos);
                        start_count += 1;
                    }
                    Tile::Waypoint => waypoints.push(pos),
                    Tile::Wall | Tile::Open => {}
                }
            }
        }

        let start = match (start, start_count) {
            (Some(start), 1) => start,
            _ => return Err(MazeError::StartCount(start_count)),
        };

        log::debug!(
            "built {}x{} maze with start at {:?} and {} waypoints",
            rows,
            columns,
            start,
            waypoints.len()
        );

        Ok(Self {
            tiles,
            start,
            waypoints,
            states_explored: Cell::new(0),
        })
    }

    /// Returns the number of rows in the maze.
    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    /// Returns the number of columns in the maze.
    pub fn columns(&self) -> usize {
        self.tiles[0].len()
    }

    /// Returns the cell the search starts from.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Returns the waypoints of the maze in row-major order.
    pub fn waypoints(&self) -> &[Position] {
        &self.waypoints
    }

    /// Returns the tile at `pos`.
    pub fn tile(&self, pos: Position) -> Tile {
        self.tiles[pos.row() as usize][pos.column() as usize]
    }

    /// Checks if `pos` is a waypoint cell.
    pub fn is_waypoint(&self, pos: Position) -> bool {
        self.tile(pos) == Tile::Waypoint
    }

    /// Checks if the cell at (`row`, `column`) can be moved to.
    ///
    /// Cells outside the maze are not navigable.
    pub fn navigable(&self, row: usize, column: usize) -> bool {
        row < self.rows() && column < self.columns() && self.tiles[row][column] != Tile::Wall
    }

    /// Returns the navigable cells 4-adjacent to `pos`.
    ///
    /// Calling this counts as exploring one search state and increments the
    /// counter behind [`states_explored`](Maze::states_explored).
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        self.states_explored.set(self.states_explored.get() + 1);

        let row = pos.row() as usize;
        let column = pos.column() as usize;
        let candidates = [
            (Some(row + 1), Some(column)),
            (row.checked_sub(1), Some(column)),
            (Some(row), Some(column + 1)),
            (Some(row), column.checked_sub(1)),
        ];

        candidates
            .iter()
            .filter_map(|&(row, column)| match (row, column) {
                (Some(row), Some(column)) if self.navigable(row, column) => Some(Position::new(
                    row as PositionEncoding,
                    column as PositionEncoding,
                )),
                _ => None,
            })
            .collect()
    }

    /// Returns how many states have been explored on this maze so far.
    pub fn states_explored(&self) -> usize {
        self.states_explored.get()
    }

    /// Resets the exploration counter, e.g. between two searches on the same
    /// maze instance.
    pub fn reset_states_explored(&self) {
        self.states_explored.set(0);
    }

    /// Checks a finished path against the maze rules.
    ///
    /// A valid path is non-empty, moves only between 4-adjacent navigable
    /// cells, ends on a waypoint, visits every waypoint of the maze and never
    /// revisits a cell without collecting at least one waypoint in between.
    pub fn validate_path(&self, cells: &[Position]) -> Result<(), PathError> {
        if cells.is_empty() {
            return Err(PathError::Empty);
        }

        for (index, window) in cells.windows(2).enumerate() {
            if window[0].manhattan(window[1]) != 1 {
                return Err(PathError::DisconnectedStep {
                    index: index + 1,
                    from: window[0],
                    to: window[1],
                });
            }
        }

        for (index, &pos) in cells.iter().enumerate() {
            if !self.navigable(pos.row() as usize, pos.column() as usize) {
                return Err(PathError::NotNavigable { index, position: pos });
            }
        }

        let last = *cells.last().expect("validated path to be non-empty");
        if !self.is_waypoint(last) {
            return Err(PathError::EndsOffWaypoint { position: last });
        }

        // A repeated cell is only allowed if the loop between the two visits
        // collected at least one waypoint.
        let mut last_seen = HashMap::new();
        for (index, &pos) in cells.iter().enumerate() {
            if let Some(&from_index) = last_seen.get(&pos) {
                if !cells[from_index..index].iter().any(|&p| self.is_waypoint(p)) {
                    return Err(PathError::UselessSegment {
                        from_index,
                        to_index: index,
                    });
                }
            }
            last_seen.insert(pos, index);
        }

        let visited: HashSet<Position> = cells.iter().copied().collect();
        for &waypoint in &self.waypoints {
            if !visited.contains(&waypoint) {
                return Err(PathError::MissedWaypoint { position: waypoint });
            }
        }

        Ok(())
    }
}

impl FromStr for Maze {
    type Err = MazeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();

        let mut tiles = Vec::with_capacity(lines.len());
        for (row, line) in lines.iter().enumerate() {
            let mut tile_row = Vec::with_capacity(line.len());
            for (column, character) in line.chars().enumerate() {
                match Tile::from_char(character) {
                    Some(tile) => tile_row.push(tile),
                    None => {
                        return Err(MazeError::UnknownCharacter {
                            character,
                            row,
                            column,
                        })
                    }
                }
            }
            tiles.push(tile_row);
        }

        Self::from_tiles(tiles)
    }
}

impl fmt::Debug for Maze {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", draw_maze(self, None))
    }
}
