//! Walkability grid loaded once per round, plus the facts derived from it.

use maze_chase_core::{CellCoord, CellKind, GridView, InvalidMaze, MazeError};
use rand::{seq::SliceRandom, Rng};

const ROAD_MARKER: i64 = 0;
const WALL_MARKER: i64 = 1;

/// Rectangular walkability grid whose border holds exactly one road cell.
///
/// The grid is validated on load and never mutated afterwards. The unique
/// exit and the list of road cells are computed once so that spawn and coin
/// placement can sample them without rescanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
    exit: CellCoord,
    roads: Vec<CellCoord>,
}

impl Grid {
    /// Validates a row-major matrix of cell kinds and builds the grid.
    ///
    /// Fails with [`MazeError::InvalidMaze`] when the matrix is empty, ragged,
    /// or its border does not contain exactly one road cell.
    pub fn load<R>(rows: &[R]) -> Result<Self, MazeError>
    where
        R: AsRef<[CellKind]>,
    {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if rows.is_empty() || width == 0 {
            return Err(InvalidMaze::Empty.into());
        }

        let columns = u32::try_from(width).map_err(|_| InvalidMaze::TooLarge(width))?;
        let row_count = u32::try_from(rows.len()).map_err(|_| InvalidMaze::TooLarge(rows.len()))?;

        let mut cells = Vec::with_capacity(width.saturating_mul(rows.len()));
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(InvalidMaze::Ragged {
                    row: index,
                    expected: width,
                    found: row.len(),
                }
                .into());
            }
            cells.extend_from_slice(row);
        }

        let view = GridView::new(&cells, columns, row_count);
        let exits: Vec<CellCoord> = border_cells(columns, row_count)
            .filter(|cell| view.is_walkable(*cell))
            .collect();
        let exit = match exits.as_slice() {
            [exit] => *exit,
            other => return Err(InvalidMaze::ExitCount { found: other.len() }.into()),
        };

        let roads = (0..row_count)
            .flat_map(|row| (0..columns).map(move |column| CellCoord::new(column, row)))
            .filter(|cell| view.is_walkable(*cell))
            .collect();

        Ok(Self {
            columns,
            rows: row_count,
            cells,
            exit,
            roads,
        })
    }

    /// Builds a grid from integer markers where `0` is road and `1` is wall.
    pub fn from_markers<R>(rows: &[R]) -> Result<Self, MazeError>
    where
        R: AsRef<[i64]>,
    {
        let mut kinds = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let mut converted = Vec::with_capacity(row.as_ref().len());
            for (column, &value) in row.as_ref().iter().enumerate() {
                let kind = match value {
                    ROAD_MARKER => CellKind::Road,
                    WALL_MARKER => CellKind::Wall,
                    _ => {
                        return Err(InvalidMaze::UnknownMarker {
                            row: row_index,
                            column,
                            value,
                        }
                        .into())
                    }
                };
                converted.push(kind);
            }
            kinds.push(converted);
        }
        Self::load(&kinds)
    }

    /// Returns the unique border road cell.
    #[must_use]
    pub const fn find_exit(&self) -> CellCoord {
        self.exit
    }

    /// Bounds-checked walkability predicate.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.view().is_walkable(cell)
    }

    /// Uniformly samples one road cell.
    pub fn random_road_cell<R>(&self, rng: &mut R) -> Result<CellCoord, MazeError>
    where
        R: Rng + ?Sized,
    {
        self.roads
            .choose(rng)
            .copied()
            .ok_or(MazeError::NoRoadCells)
    }

    /// Every road cell in row-major order.
    #[must_use]
    pub fn road_cells(&self) -> &[CellCoord] {
        &self.roads
    }

    /// Provides the `(columns, rows)` dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Captures a borrowed view suitable for pathfinding.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.columns, self.rows)
    }

    /// Fails unless the grid has the provided dimensions.
    pub fn ensure_dimensions(&self, columns: u32, rows: u32) -> Result<(), MazeError> {
        if (self.columns, self.rows) == (columns, rows) {
            Ok(())
        } else {
            Err(InvalidMaze::DimensionMismatch {
                expected_columns: columns,
                expected_rows: rows,
                found_columns: self.columns,
                found_rows: self.rows,
            }
            .into())
        }
    }
}

fn border_cells(columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
    (0..rows)
        .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
        .filter(move |cell| {
            cell.row() == 0
                || cell.column() == 0
                || cell.row() + 1 == rows
                || cell.column() + 1 == columns
        })
}
