//! JSON maze files: a top-level array of rows of `0` (road) and `1` (wall) markers.

use std::{
    fs,
    path::{Path, PathBuf},
};

use maze_chase_core::MazeError;
use maze_chase_round::MazeSource;
use maze_chase_world::Grid;

/// Maze source that rereads its file whenever a new round is laid out.
#[derive(Clone, Debug)]
pub(crate) struct MazeFile {
    path: PathBuf,
}

impl MazeFile {
    /// Loads the grid stored at `path` and remembers the path for restarts.
    pub(crate) fn open(path: &Path) -> Result<(Self, Grid), MazeError> {
        let source = Self {
            path: path.to_path_buf(),
        };
        let grid = source.read()?;
        Ok((source, grid))
    }

    fn read(&self) -> Result<Grid, MazeError> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|error| MazeError::Source(format!("{}: {error}", self.path.display())))?;
        parse(&contents).map_err(|error| annotate(error, &self.path))
    }
}

impl MazeSource for MazeFile {
    fn next_grid(&mut self, columns: u32, rows: u32) -> Result<Grid, MazeError> {
        let grid = self.read()?;
        grid.ensure_dimensions(columns, rows)?;
        Ok(grid)
    }
}

/// Parses the JSON marker matrix into a validated grid.
pub(crate) fn parse(contents: &str) -> Result<Grid, MazeError> {
    let rows: Vec<Vec<i64>> = serde_json::from_str(contents).map_err(|error| {
        MazeError::Source(format!("maze is not an array of marker rows: {error}"))
    })?;
    Grid::from_markers(&rows)
}

fn annotate(error: MazeError, path: &Path) -> MazeError {
    match error {
        MazeError::Source(message) => MazeError::Source(format!("{}: {message}", path.display())),
        other => other,
    }
}
