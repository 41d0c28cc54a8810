#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round orchestration that drives the world and the adversary planner.
//!
//! Each call to [`RoundController::tick`] applies the player's intent, lets
//! the planner propose an adversary step, advances the simulation clock and
//! records the resulting events. End-of-round screens are served by the same
//! entry point: while a round is over the controller only listens for the
//! restart and quit signals.

use std::{mem, time::Duration};

use maze_chase_core::{
    ChaseConfig, Command, Direction, Event, FrameSnapshot, MazeError, RoundState,
};
use maze_chase_system_planner::{PlanWorker, Planner, ThreadWorker};
use maze_chase_world::{self as world, query, Grid, SetupError, World};
use tracing::{info, warn};

/// External collaborator that produces a replacement grid on restart.
pub trait MazeSource {
    /// Produces a grid with the provided dimensions.
    fn next_grid(&mut self, columns: u32, rows: u32) -> Result<Grid, MazeError>;
}

/// Replays the same grid on every restart.
#[derive(Clone, Debug)]
pub struct StaticMaze {
    grid: Grid,
}

impl StaticMaze {
    /// Wraps the grid handed out on every restart.
    #[must_use]
    pub const fn new(grid: Grid) -> Self {
        Self { grid }
    }
}

impl MazeSource for StaticMaze {
    fn next_grid(&mut self, columns: u32, rows: u32) -> Result<Grid, MazeError> {
        self.grid.ensure_dimensions(columns, rows)?;
        Ok(self.grid.clone())
    }
}

/// Player input sampled for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Direction the player wants to step in, if any.
    pub intent: Option<Direction>,
    /// Requests a fresh round from an end-of-round screen.
    pub restart: bool,
    /// Requests that the session ends from an end-of-round screen.
    pub quit: bool,
}

impl FrameInput {
    /// Input that only carries a movement intent.
    #[must_use]
    pub const fn step(direction: Direction) -> Self {
        Self {
            intent: Some(direction),
            restart: false,
            quit: false,
        }
    }

    /// Input that only carries the restart signal.
    #[must_use]
    pub const fn restart() -> Self {
        Self {
            intent: None,
            restart: true,
            quit: false,
        }
    }

    /// Input that only carries the quit signal.
    #[must_use]
    pub const fn quit() -> Self {
        Self {
            intent: None,
            restart: false,
            quit: true,
        }
    }
}

/// Whether the session continues after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The session keeps running, either playing or on an end-of-round screen.
    Running,
    /// The session was closed by an explicit quit.
    Terminated,
}

/// Owns the world, the planner and the maze source for one session.
#[derive(Debug)]
pub struct RoundController<S, W = ThreadWorker> {
    world: World,
    planner: Planner<W>,
    source: S,
    pending: Vec<Event>,
    recent: Vec<Event>,
}

impl<S: MazeSource> RoundController<S, ThreadWorker> {
    /// Lays out the first round on `grid` with the configured planner.
    pub fn new(config: ChaseConfig, grid: Grid, source: S) -> Result<Self, SetupError> {
        let planner = Planner::from_config(&config.planner);
        Self::with_planner(config, grid, source, planner)
    }
}

impl<S: MazeSource, W: PlanWorker> RoundController<S, W> {
    /// Lays out the first round on `grid` around an explicit planner.
    pub fn with_planner(
        config: ChaseConfig,
        grid: Grid,
        source: S,
        planner: Planner<W>,
    ) -> Result<Self, SetupError> {
        let mut events = Vec::new();
        let world = World::new(config, grid, &mut events)?;
        Ok(Self {
            world,
            planner,
            source,
            recent: events.clone(),
            pending: events,
        })
    }

    /// Runs one iteration of the update loop.
    ///
    /// Fails only when a restart was requested and the maze source could not
    /// supply a usable grid; the finished round stays on screen in that case.
    pub fn tick(&mut self, dt: Duration, input: FrameInput) -> Result<Status, MazeError> {
        self.recent.clear();

        match query::state(&self.world) {
            RoundState::Terminated => Ok(Status::Terminated),
            RoundState::Victory | RoundState::Defeat => self.end_screen(input),
            RoundState::Playing => {
                self.play(dt, input);
                Ok(Status::Running)
            }
        }
    }

    fn play(&mut self, dt: Duration, input: FrameInput) {
        let events = mem::take(&mut self.pending);
        let mut commands = Vec::new();

        if let Some(direction) = input.intent {
            commands.push(Command::StepPlayer { direction });
        }
        let adversary = query::adversary(&self.world);
        let target = query::player(&self.world).cell;
        self.planner.handle(
            &events,
            &adversary,
            target,
            query::grid(&self.world).view(),
            &mut commands,
        );
        commands.push(Command::Tick { dt });

        for command in commands {
            world::apply(&mut self.world, command, &mut self.recent);
        }
        self.pending.extend_from_slice(&self.recent);
    }

    fn end_screen(&mut self, input: FrameInput) -> Result<Status, MazeError> {
        if input.quit {
            world::apply(&mut self.world, Command::Quit, &mut self.recent);
            self.pending.extend_from_slice(&self.recent);
            return Ok(Status::Terminated);
        }
        if !input.restart {
            return Ok(Status::Running);
        }

        let (columns, rows) = query::grid(&self.world).dimensions();
        let restarted = self
            .source
            .next_grid(columns, rows)
            .and_then(|grid| world::reset(&mut self.world, grid, &mut self.recent));
        if let Err(error) = &restarted {
            warn!(%error, "restart failed");
        }
        restarted?;

        info!(round = query::round(&self.world).get(), "round restarted");
        self.pending.extend_from_slice(&self.recent);
        Ok(Status::Running)
    }

    /// Read-only access to the world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Events produced by the most recent call to [`Self::tick`].
    #[must_use]
    pub fn recent_events(&self) -> &[Event] {
        &self.recent
    }

    /// Everything a renderer or HUD needs to present the current tick.
    #[must_use]
    pub fn frame(&self) -> FrameSnapshot {
        query::frame(&self.world)
    }

    /// Current lifecycle state of the round.
    #[must_use]
    pub fn state(&self) -> RoundState {
        query::state(&self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[i64]]) -> Grid {
        Grid::from_markers(rows).expect("valid grid")
    }

    #[test]
    fn static_maze_checks_dimensions() {
        let mut source = StaticMaze::new(grid(&[&[1, 1, 1], &[1, 0, 0], &[1, 1, 1]]));

        assert!(source.next_grid(3, 3).is_ok());
        assert!(matches!(
            source.next_grid(5, 5),
            Err(MazeError::InvalidMaze(_))
        ));
    }

    #[test]
    fn frame_input_helpers_set_a_single_signal() {
        assert_eq!(
            FrameInput::step(Direction::West),
            FrameInput {
                intent: Some(Direction::West),
                ..FrameInput::default()
            }
        );
        assert!(FrameInput::restart().restart && !FrameInput::restart().quit);
        assert!(FrameInput::quit().quit && FrameInput::quit().intent.is_none());
    }
}
