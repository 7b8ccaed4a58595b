use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use maze_board::{draw_maze, Maze};
use maze_solver::{AStar, BreadthFirst, MultiGoal, Solver};

/// Solve ASCII mazes with single- and multi-waypoint search.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// The maze file to solve.
    maze: PathBuf,

    /// The search algorithm to run.
    #[arg(short, long, value_enum, default_value_t = Method::Multi)]
    method: Method,

    /// Render the maze with the found path overlaid.
    #[arg(long)]
    show: bool,

    /// Skip checking the returned path against the maze rules.
    #[arg(long)]
    no_validate: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Method {
    /// Breadth-first search to the closest waypoint.
    Bfs,
    /// A* to the closest waypoint.
    Astar,
    /// Optimal A* collecting every waypoint.
    Multi,
    /// Weighted A* collecting every waypoint, suboptimal but faster.
    Fast,
}

impl Method {
    fn solver(self) -> Box<dyn Solver> {
        match self {
            Method::Bfs => Box::new(BreadthFirst::new()),
            Method::Astar => Box::new(AStar::new()),
            Method::Multi => Box::new(MultiGoal::new()),
            Method::Fast => Box::new(MultiGoal::fast()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let maze = Maze::from_file(&args.maze)
        .with_context(|| format!("failed to load maze {}", args.maze.display()))?;

    let path = match args.method.solver().solve(&maze) {
        Some(path) => path,
        None => bail!("no path through {} was found", args.maze.display()),
    };

    if !args.no_validate {
        // A rejected path would be a solver bug, not a maze problem.
        maze.validate_path(path.cells())
            .context("the returned path breaks the maze rules")?;
    }

    println!("path length: {}", path.len());
    println!("states explored: {}", maze.states_explored());
    if args.show {
        print!("{}", draw_maze(&maze, Some(path.cells())));
    }

    Ok(())
}
