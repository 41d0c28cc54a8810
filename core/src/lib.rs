#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Chase engine.
//!
//! This crate defines the message surface that connects the round
//! controller, the authoritative world, and pure systems. Drivers submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots such as [`GridView`] and [`ActorSnapshot`], and
//! respond exclusively with new command batches.

mod config;

use std::{sync::Arc, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{ChaseConfig, ConfigError, PlannerConfig, PlannerMode};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the player start moving one cell in the given direction.
    StepPlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the adversary start moving into the provided cell.
    StepAdversary {
        /// Neighboring cell proposed by the planner.
        to: CellCoord,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Wall-clock time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Ends the session from a terminal round state.
    Quit,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a fresh round was laid out and is now playing.
    RoundStarted {
        /// Identifier of the new round.
        round: RoundId,
        /// Unique border exit of the round's grid.
        exit: CellCoord,
        /// Cell the player spawned on.
        player_spawn: CellCoord,
        /// Cell the adversary spawned on.
        adversary_spawn: CellCoord,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clamped duration consumed by the tick.
        dt: Duration,
    },
    /// Confirms that an actor began travelling between two neighboring cells.
    MoveStarted {
        /// Actor that started moving.
        actor: Actor,
        /// Cell the actor is leaving.
        from: CellCoord,
        /// Cell the actor will occupy once the tween completes.
        to: CellCoord,
    },
    /// Confirms that an actor completed its tween and committed a new cell.
    ActorArrived {
        /// Actor that arrived.
        actor: Actor,
        /// Cell now occupied by the actor.
        cell: CellCoord,
    },
    /// Reports that the player picked up a coin.
    CoinCollected {
        /// Identifier of the collected coin.
        coin: CoinId,
        /// Cell the coin was placed on.
        cell: CellCoord,
    },
    /// Reports the first transition out of [`RoundState::Playing`].
    RoundEnded {
        /// Identifier of the round that ended.
        round: RoundId,
        /// Terminal outcome of the round.
        outcome: RoundOutcome,
        /// Statistics frozen at the moment the round ended.
        stats: RoundStats,
    },
    /// Announces that the session was closed by an explicit quit.
    SessionTerminated,
}

/// Cardinal movement directions available to both actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Neighbor expansion order used by searches: up, down, left, right.
    pub const SEARCH_ORDER: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Determines the direction that leads from `from` to an adjacent `to`.
    ///
    /// Returns `None` unless the cells are exactly one orthogonal step apart.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Self::East)
            } else {
                Some(Self::West)
            }
        } else if to.row() > from.row() {
            Some(Self::South)
        } else {
            Some(Self::North)
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether `other` is one orthogonal step away.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Neighbor in the given direction, if it lies inside a `columns`×`rows` grid.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
        };
        let (column, row) = (column?, row?);
        (column < columns && row < rows).then_some(CellCoord::new(column, row))
    }
}

/// Walkability marker of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Impassable cell.
    Wall,
    /// Walkable cell.
    Road,
}

impl CellKind {
    /// Reports whether actors may enter cells of this kind.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Road)
    }
}

/// Read-only view into a dense row-major walkability grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [CellKind],
    columns: u32,
    rows: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [CellKind], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Provides the `(columns, rows)` dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Dense cells stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &'a [CellKind] {
        self.cells
    }

    /// Kind of the provided cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Bounds-checked walkability predicate.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.kind(cell).map_or(false, CellKind::is_walkable)
    }

    /// Walkable neighbors of `cell` in [`Direction::SEARCH_ORDER`].
    pub fn walkable_neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + 'a {
        let view = *self;
        Direction::SEARCH_ORDER
            .into_iter()
            .filter_map(move |direction| cell.step(direction, view.columns, view.rows))
            .filter(move |neighbor| view.is_walkable(*neighbor))
    }

    /// Row-major offset of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            row.checked_mul(width)?.checked_add(column)
        } else {
            None
        }
    }

    /// Copies the view into a cheaply clonable grid that may cross threads.
    #[must_use]
    pub fn to_shared(&self) -> SharedGrid {
        SharedGrid {
            cells: Arc::from(self.cells),
            columns: self.columns,
            rows: self.rows,
        }
    }
}

/// Owned, reference-counted copy of a walkability grid.
#[derive(Clone, Debug)]
pub struct SharedGrid {
    cells: Arc<[CellKind]>,
    columns: u32,
    rows: u32,
}

impl SharedGrid {
    /// Borrows the shared grid as a [`GridView`].
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.columns, self.rows)
    }
}

/// The two actors taking part in a chase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Actor {
    /// Actor steered by player input.
    Player,
    /// Actor steered by the planner.
    Adversary,
}

/// Monotonic identifier assigned to each round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoundId(u32);

impl RoundId {
    /// Creates a new round identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier of the round that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Unique identifier assigned to a coin within a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoinId(u32);

impl CoinId {
    /// Creates a new coin identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Lifecycle of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    /// Actors move and terminal predicates are evaluated every tick.
    Playing,
    /// The player reached the exit.
    Victory,
    /// The adversary caught the player.
    Defeat,
    /// The session was closed from a terminal state.
    Terminated,
}

impl RoundState {
    /// Reports whether the round ended and awaits a restart or quit signal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

/// Terminal outcome of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// The player reached the exit.
    Victory,
    /// The adversary caught the player.
    Defeat,
}

impl From<RoundOutcome> for RoundState {
    fn from(outcome: RoundOutcome) -> Self {
        match outcome {
            RoundOutcome::Victory => Self::Victory,
            RoundOutcome::Defeat => Self::Defeat,
        }
    }
}

/// Score and coin bookkeeping for a round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundStats {
    /// Points earned from collected coins.
    pub score: u32,
    /// Number of coins collected so far.
    pub coins_collected: u32,
    /// Number of coins seeded at round start.
    pub coins_total: u32,
    /// Clamped simulation time spent playing.
    pub elapsed: Duration,
}

/// Immutable representation of an actor's tween state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Actor described by the snapshot.
    pub actor: Actor,
    /// Last committed cell.
    pub cell: CellCoord,
    /// Cell being travelled to, when a tween is in flight.
    pub target: Option<CellCoord>,
    /// Top-left pixel position used for rendering.
    pub position: Vec2,
    /// Tween progress in `0.0..=1.0`.
    pub progress: f32,
}

impl ActorSnapshot {
    /// Reports whether the actor is currently tweening between cells.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.target.is_some()
    }
}

/// Immutable representation of a coin used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoinSnapshot {
    /// Identifier of the coin.
    pub id: CoinId,
    /// Cell the coin was placed on.
    pub cell: CellCoord,
    /// Pixel center of the coin.
    pub center: Vec2,
    /// Whether the player already picked the coin up.
    pub collected: bool,
}

/// Everything an external renderer or HUD needs to present one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    /// Identifier of the current round.
    pub round: RoundId,
    /// Lifecycle state of the round.
    pub state: RoundState,
    /// Player tween state.
    pub player: ActorSnapshot,
    /// Adversary tween state.
    pub adversary: ActorSnapshot,
    /// Unique border exit.
    pub exit: CellCoord,
    /// Coins seeded this round, in identifier order.
    pub coins: Vec<CoinSnapshot>,
    /// Live statistics while playing, the frozen copy afterwards.
    pub stats: RoundStats,
    /// Whether `stats` is the frozen end-of-round snapshot.
    pub frozen: bool,
}

/// Reasons a maze is rejected at load or reset time.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    /// The grid is malformed or violates the single-exit invariant.
    #[error("invalid maze: {0}")]
    InvalidMaze(#[from] InvalidMaze),
    /// The grid has no road cell to place anything on.
    #[error("maze contains no road cells")]
    NoRoadCells,
    /// The external maze source could not produce a grid.
    #[error("maze source failed: {0}")]
    Source(String),
    /// Not enough distinct non-exit road cells for both spawns.
    #[error("maze needs {required} non-exit road cells for spawning, found {available}")]
    NotEnoughRoadCells {
        /// Cells required for spawn placement.
        required: usize,
        /// Cells available for spawn placement.
        available: usize,
    },
}

/// Specific structural defects that make a grid unusable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidMaze {
    /// The grid has no rows or its first row has no columns.
    #[error("grid is empty")]
    Empty,
    /// A row's length differs from the first row's length.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Offending row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// The border does not contain exactly one road cell.
    #[error("border must contain exactly one exit, found {found}")]
    ExitCount {
        /// Number of road cells found on the border.
        found: usize,
    },
    /// A dimension does not fit the coordinate range.
    #[error("grid dimension {0} exceeds the supported range")]
    TooLarge(usize),
    /// A replacement grid does not match the dimensions of the round it replaces.
    #[error("grid is {found_columns}x{found_rows}, expected {expected_columns}x{expected_rows}")]
    DimensionMismatch {
        /// Columns of the previous grid.
        expected_columns: u32,
        /// Rows of the previous grid.
        expected_rows: u32,
        /// Columns of the replacement grid.
        found_columns: u32,
        /// Rows of the replacement grid.
        found_rows: u32,
    },
    /// A source marker is neither road nor wall.
    #[error("unknown marker {value} at row {row}, column {column}")]
    UnknownMarker {
        /// Row of the marker.
        row: usize,
        /// Column of the marker.
        column: usize,
        /// Raw marker value.
        value: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn direction_between_neighbors() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(
            Direction::between(origin, CellCoord::new(3, 2)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::between(origin, CellCoord::new(4, 3)),
            Some(Direction::East)
        );
        assert_eq!(
            Direction::between(origin, CellCoord::new(3, 4)),
            Some(Direction::South)
        );
        assert_eq!(
            Direction::between(origin, CellCoord::new(2, 3)),
            Some(Direction::West)
        );
        assert_eq!(Direction::between(origin, origin), None);
        assert_eq!(Direction::between(origin, CellCoord::new(4, 4)), None);
    }

    #[test]
    fn step_stays_inside_bounds() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::North, 3, 3), None);
        assert_eq!(corner.step(Direction::West, 3, 3), None);
        assert_eq!(
            corner.step(Direction::East, 3, 3),
            Some(CellCoord::new(1, 0))
        );

        let far = CellCoord::new(2, 2);
        assert_eq!(far.step(Direction::South, 3, 3), None);
        assert_eq!(far.step(Direction::East, 3, 3), None);
    }

    #[test]
    fn grid_view_is_bounds_checked() {
        let cells = [
            CellKind::Wall,
            CellKind::Road,
            CellKind::Road,
            CellKind::Wall,
        ];
        let view = GridView::new(&cells, 2, 2);

        assert!(view.is_walkable(CellCoord::new(1, 0)));
        assert!(!view.is_walkable(CellCoord::new(0, 0)));
        assert!(!view.is_walkable(CellCoord::new(2, 0)));
        assert!(!view.is_walkable(CellCoord::new(0, 5)));
    }

    #[test]
    fn walkable_neighbors_follow_search_order() {
        let cells = [CellKind::Road; 9];
        let view = GridView::new(&cells, 3, 3);

        let neighbors: Vec<_> = view.walkable_neighbors(CellCoord::new(1, 1)).collect();

        assert_eq!(
            neighbors,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(1, 2),
                CellCoord::new(0, 1),
                CellCoord::new(2, 1),
            ]
        );
    }

    #[test]
    fn shared_grid_preserves_contents() {
        let cells = [CellKind::Road, CellKind::Wall];
        let shared = GridView::new(&cells, 2, 1).to_shared();
        let view = shared.view();

        assert_eq!(view.dimensions(), (2, 1));
        assert_eq!(view.kind(CellCoord::new(1, 0)), Some(CellKind::Wall));
    }

    #[test]
    fn maze_error_wraps_structural_defects() {
        let error = MazeError::from(InvalidMaze::ExitCount { found: 2 });
        assert_eq!(
            error.to_string(),
            "invalid maze: border must contain exactly one exit, found 2"
        );
    }
}
