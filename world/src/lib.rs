#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state for Maze Chase.
//!
//! The world owns the grid, both movers, the coin ledger and the round
//! lifecycle. Drivers mutate it exclusively through [`apply`] and [`reset`],
//! and read it through the [`query`] module.

mod coins;
mod grid;
mod mover;

use std::time::Duration;

use maze_chase_core::{
    Actor, CellCoord, ChaseConfig, Command, ConfigError, Direction, Event, MazeError, RoundId,
    RoundOutcome, RoundState, RoundStats,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::coins::CoinLedger;

pub use grid::Grid;
pub use mover::{Mover, PixelLayout};

const SPAWN_COUNT: usize = 2;

/// Reasons the first round of a world cannot be laid out.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SetupError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The initial grid cannot host a round.
    #[error(transparent)]
    Maze(#[from] MazeError),
}

/// Represents the authoritative Maze Chase round state.
#[derive(Debug)]
pub struct World {
    config: ChaseConfig,
    layout: PixelLayout,
    rng: ChaCha8Rng,
    round: RoundId,
    grid: Grid,
    player: Mover,
    adversary: Mover,
    coins: CoinLedger,
    state: RoundState,
    live: RoundStats,
    frozen: Option<RoundStats>,
}

impl World {
    /// Validates the configuration and lays out the first round on `grid`.
    ///
    /// Emits [`Event::RoundStarted`] for round 1 on success.
    pub fn new(
        config: ChaseConfig,
        grid: Grid,
        out_events: &mut Vec<Event>,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let layout = PixelLayout::from_config(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let plan = RoundPlan::draw(&grid, &config, &layout, &mut rng)?;

        let mut world = Self {
            player: Mover::new(layout, config.player_speed, plan.player_spawn),
            adversary: Mover::new(layout, config.adversary_speed, plan.adversary_spawn),
            live: RoundStats {
                coins_total: plan.coins.total(),
                ..RoundStats::default()
            },
            coins: plan.coins,
            config,
            layout,
            rng,
            round: RoundId::new(1),
            grid,
            state: RoundState::Playing,
            frozen: None,
        };
        world.announce_round(out_events);
        Ok(world)
    }

    fn install(&mut self, grid: Grid, plan: RoundPlan) {
        self.round = self.round.next();
        self.grid = grid;
        self.player.place(plan.player_spawn);
        self.adversary.place(plan.adversary_spawn);
        self.live = RoundStats {
            coins_total: plan.coins.total(),
            ..RoundStats::default()
        };
        self.coins = plan.coins;
        self.state = RoundState::Playing;
        self.frozen = None;
    }

    fn announce_round(&self, out_events: &mut Vec<Event>) {
        info!(
            round = self.round.get(),
            exit = ?self.grid.find_exit(),
            player = ?self.player.cell(),
            adversary = ?self.adversary.cell(),
            coins = self.live.coins_total,
            "round started"
        );
        out_events.push(Event::RoundStarted {
            round: self.round,
            exit: self.grid.find_exit(),
            player_spawn: self.player.cell(),
            adversary_spawn: self.adversary.cell(),
        });
    }

    fn step_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.state != RoundState::Playing || self.player.is_moving() {
            trace!(?direction, "player step ignored");
            return;
        }

        let (columns, rows) = self.grid.dimensions();
        let from = self.player.cell();
        let Some(to) = from
            .step(direction, columns, rows)
            .filter(|cell| self.grid.is_walkable(*cell))
        else {
            trace!(?direction, ?from, "player step blocked");
            return;
        };

        if self.player.start_move(to) {
            out_events.push(Event::MoveStarted {
                actor: Actor::Player,
                from,
                to,
            });
        }
    }

    fn step_adversary(&mut self, to: CellCoord, out_events: &mut Vec<Event>) {
        let from = self.adversary.cell();
        let admissible = self.state == RoundState::Playing
            && !self.adversary.is_moving()
            && from.is_adjacent(to)
            && self.grid.is_walkable(to);
        if !admissible {
            trace!(?from, ?to, "adversary step dropped");
            return;
        }

        if self.adversary.start_move(to) {
            out_events.push(Event::MoveStarted {
                actor: Actor::Adversary,
                from,
                to,
            });
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.state != RoundState::Playing {
            return;
        }

        let dt = dt.min(self.config.max_tick());
        self.live.elapsed = self.live.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        for (actor, mover) in [
            (Actor::Player, &mut self.player),
            (Actor::Adversary, &mut self.adversary),
        ] {
            if let Some(cell) = mover.advance(dt) {
                out_events.push(Event::ActorArrived { actor, cell });
            }
        }

        let mut collected = Vec::new();
        self.coins.collect_near(
            self.player.center(),
            self.config.pickup_radius(),
            &mut collected,
        );
        for (coin, cell) in collected {
            self.live.coins_collected = self.live.coins_collected.saturating_add(1);
            self.live.score = self.live.score.saturating_add(self.config.coin_value);
            debug!(coin = coin.get(), ?cell, score = self.live.score, "coin collected");
            out_events.push(Event::CoinCollected { coin, cell });
        }

        if let Some(outcome) = self.evaluate_outcome() {
            self.end_round(outcome, out_events);
        }
    }

    fn evaluate_outcome(&self) -> Option<RoundOutcome> {
        let player = self.player.cell();
        if player == self.grid.find_exit() {
            Some(RoundOutcome::Victory)
        } else if player == self.adversary.cell() {
            Some(RoundOutcome::Defeat)
        } else {
            None
        }
    }

    fn end_round(&mut self, outcome: RoundOutcome, out_events: &mut Vec<Event>) {
        let stats = self.live;
        self.state = outcome.into();
        self.frozen = Some(stats);

        info!(
            round = self.round.get(),
            ?outcome,
            score = stats.score,
            coins = stats.coins_collected,
            "round ended"
        );
        out_events.push(Event::RoundEnded {
            round: self.round,
            outcome,
            stats,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StepPlayer { direction } => world.step_player(direction, out_events),
        Command::StepAdversary { to } => world.step_adversary(to, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::Quit => {
            if world.state.is_terminal() {
                world.state = RoundState::Terminated;
                info!(round = world.round.get(), "session terminated");
                out_events.push(Event::SessionTerminated);
            } else {
                trace!(state = ?world.state, "quit ignored");
            }
        }
    }
}

/// Replaces the grid and lays out a fresh round on it.
///
/// The replacement must have the same dimensions as the current grid. On
/// failure the world is left untouched, so the caller may keep presenting
/// the previous round.
pub fn reset(world: &mut World, grid: Grid, out_events: &mut Vec<Event>) -> Result<(), MazeError> {
    let (columns, rows) = world.grid.dimensions();
    grid.ensure_dimensions(columns, rows)?;

    let plan = RoundPlan::draw(&grid, &world.config, &world.layout, &mut world.rng)?;
    world.install(grid, plan);
    world.announce_round(out_events);
    Ok(())
}

struct RoundPlan {
    player_spawn: CellCoord,
    adversary_spawn: CellCoord,
    coins: CoinLedger,
}

impl RoundPlan {
    fn draw(
        grid: &Grid,
        config: &ChaseConfig,
        layout: &PixelLayout,
        rng: &mut ChaCha8Rng,
    ) -> Result<Self, MazeError> {
        let exit = grid.find_exit();
        let available = grid
            .road_cells()
            .iter()
            .filter(|cell| **cell != exit)
            .count();
        if grid.road_cells().is_empty() {
            return Err(MazeError::NoRoadCells);
        }
        if available < SPAWN_COUNT {
            return Err(MazeError::NotEnoughRoadCells {
                required: SPAWN_COUNT,
                available,
            });
        }

        let player_spawn = loop {
            let cell = grid.random_road_cell(rng)?;
            if cell != exit {
                break cell;
            }
        };
        let adversary_spawn = loop {
            let cell = grid.random_road_cell(rng)?;
            if cell != exit && cell != player_spawn {
                break cell;
            }
        };

        let occupied = [player_spawn, adversary_spawn, exit];
        let coins = CoinLedger::seed(grid, &occupied, config.coin_count, layout, rng);

        Ok(Self {
            player_spawn,
            adversary_spawn,
            coins,
        })
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_chase_core::{
        Actor, ActorSnapshot, CellCoord, ChaseConfig, CoinSnapshot, FrameSnapshot, RoundId,
        RoundState, RoundStats,
    };

    use super::{Grid, PixelLayout, World};

    /// Identifier of the current round.
    #[must_use]
    pub fn round(world: &World) -> RoundId {
        world.round
    }

    /// Lifecycle state of the current round.
    #[must_use]
    pub fn state(world: &World) -> RoundState {
        world.state
    }

    /// Grid the current round is played on.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Unique border exit of the current grid.
    #[must_use]
    pub fn exit(world: &World) -> CellCoord {
        world.grid.find_exit()
    }

    /// Tween state of the player.
    #[must_use]
    pub fn player(world: &World) -> ActorSnapshot {
        world.player.snapshot(Actor::Player)
    }

    /// Tween state of the adversary.
    #[must_use]
    pub fn adversary(world: &World) -> ActorSnapshot {
        world.adversary.snapshot(Actor::Adversary)
    }

    /// Coins seeded this round, in identifier order.
    #[must_use]
    pub fn coins(world: &World) -> Vec<CoinSnapshot> {
        world.coins.snapshots()
    }

    /// Frozen statistics once the round ended, live statistics otherwise.
    #[must_use]
    pub fn stats(world: &World) -> RoundStats {
        world.frozen.unwrap_or(world.live)
    }

    /// Statistics captured when the round left [`RoundState::Playing`].
    #[must_use]
    pub fn frozen_stats(world: &World) -> Option<RoundStats> {
        world.frozen
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &ChaseConfig {
        &world.config
    }

    /// Pixel layout shared by both movers.
    #[must_use]
    pub fn layout(world: &World) -> PixelLayout {
        world.layout
    }

    /// Everything a renderer or HUD needs to present the current tick.
    #[must_use]
    pub fn frame(world: &World) -> FrameSnapshot {
        FrameSnapshot {
            round: world.round,
            state: world.state,
            player: player(world),
            adversary: adversary(world),
            exit: exit(world),
            coins: coins(world),
            stats: stats(world),
            frozen: world.frozen.is_some(),
        }
    }
}
