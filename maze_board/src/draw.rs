use std::collections::HashSet;

use crate::{Maze, Position, PositionEncoding, Tile};

/// The character a path cell is drawn with.
pub const PATH_OVERLAY: char = '*';

/// Creates a string representation of a maze, optionally with a path overlay.
///
/// Cells are drawn with their maze file characters. Path cells are drawn as
/// `*` where they cross open floor; the start and waypoint characters win over
/// the overlay so the cells a path is judged by stay visible.
pub fn draw_maze(maze: &Maze, path: Option<&[Position]>) -> String {
    let on_path: HashSet<Position> = path.unwrap_or_default().iter().copied().collect();

    let mut output = String::with_capacity(maze.rows() * (maze.columns() + 1));
    for row in 0..maze.rows() {
        for column in 0..maze.columns() {
            let pos = Position::new(row as PositionEncoding, column as PositionEncoding);
            let character = match maze.tile(pos) {
                Tile::Open if on_path.contains(&pos) => PATH_OVERLAY,
                tile => tile.to_char(),
            };
            output.push(character);
        }
        output.push('\n');
    }

    output
}
