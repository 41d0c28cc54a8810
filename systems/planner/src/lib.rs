#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adversary planning system that decides when to search and proposes steps.
//!
//! The planner reacts to world events, reads the adversary's snapshot and the
//! grid, and answers exclusively with [`Command::StepAdversary`]. It never
//! mutates the world and never blocks on a background search.

mod worker;

use std::time::Duration;

use maze_chase_core::{
    ActorSnapshot, CellCoord, Command, Event, GridView, PlannerConfig, PlannerMode, RoundId,
    SharedGrid,
};
use maze_chase_system_pathfinding::Pathfinder;
use tracing::{debug, trace};

pub use worker::{
    plan_channel, InlineWorker, PlanRequest, PlanSender, PlanTicket, PlanWorker, ThreadWorker,
    TicketState,
};

/// Planning policy selected by configuration.
#[derive(Debug)]
pub enum Planner<W = ThreadWorker> {
    /// Searches synchronously on every tick while the adversary is idle.
    Immediate(ImmediatePlanner),
    /// Searches in the background at most once per interval.
    Throttled(ThrottledPlanner<W>),
}

impl Planner<ThreadWorker> {
    /// Builds the configured policy, resolving throttled plans on background threads.
    #[must_use]
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::with_worker(config, ThreadWorker)
    }
}

impl<W: PlanWorker> Planner<W> {
    /// Builds the configured policy around the provided worker.
    ///
    /// The worker is dropped unused when the immediate policy is selected.
    #[must_use]
    pub fn with_worker(config: &PlannerConfig, worker: W) -> Self {
        match config.mode {
            PlannerMode::Immediate => Self::Immediate(ImmediatePlanner::default()),
            PlannerMode::Throttled => {
                Self::Throttled(ThrottledPlanner::new(config.interval(), worker))
            }
        }
    }

    /// Consumes world events and snapshots to emit adversary step commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        adversary: &ActorSnapshot,
        target: CellCoord,
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        match self {
            Self::Immediate(planner) => planner.handle(events, adversary, target, grid, out),
            Self::Throttled(planner) => planner.handle(events, adversary, target, grid, out),
        }
    }
}

/// Pure system that plans synchronously whenever the adversary is idle.
#[derive(Debug, Default)]
pub struct ImmediatePlanner {
    pathfinder: Pathfinder,
    active: bool,
}

impl ImmediatePlanner {
    /// Consumes world events and snapshots to emit adversary step commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        adversary: &ActorSnapshot,
        target: CellCoord,
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::RoundStarted { .. } => self.active = true,
                Event::RoundEnded { .. } | Event::SessionTerminated => self.active = false,
                _ => {}
            }
        }

        if !self.active || adversary.is_moving() {
            return;
        }

        let step = self.pathfinder.next_step(grid, adversary.cell, target);
        if step != adversary.cell {
            out.push(Command::StepAdversary { to: step });
        }
    }
}

/// System that rate-limits searches and hands them to a [`PlanWorker`].
///
/// At most one request is outstanding at a time. A new request is submitted
/// once the accumulated simulation time reaches the interval, and the
/// accumulator restarts only when an answer is consumed. Answers are read
/// while the adversary is idle, exactly once, and only applied to the round
/// they were requested for.
#[derive(Debug)]
pub struct ThrottledPlanner<W> {
    worker: W,
    interval: Duration,
    accumulator: Duration,
    round: Option<RoundId>,
    grid: Option<SharedGrid>,
    outstanding: Option<PlanTicket>,
}

impl<W: PlanWorker> ThrottledPlanner<W> {
    /// Creates a planner that submits at most one request per `interval`.
    #[must_use]
    pub fn new(interval: Duration, worker: W) -> Self {
        Self {
            worker,
            interval,
            accumulator: Duration::ZERO,
            round: None,
            grid: None,
            outstanding: None,
        }
    }

    /// Worker that resolves this planner's requests.
    #[must_use]
    pub const fn worker(&self) -> &W {
        &self.worker
    }

    /// Reports whether a request is awaiting its answer.
    #[must_use]
    pub fn has_outstanding(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Consumes world events and snapshots to emit adversary step commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        adversary: &ActorSnapshot,
        target: CellCoord,
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::RoundStarted { round, .. } => {
                    self.cancel();
                    self.round = Some(*round);
                }
                Event::RoundEnded { .. } | Event::SessionTerminated => {
                    self.cancel();
                    self.round = None;
                }
                Event::TimeAdvanced { dt } => {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                }
                _ => {}
            }
        }

        let Some(round) = self.round else {
            return;
        };
        if adversary.is_moving() {
            return;
        }

        if let Some(ticket) = &self.outstanding {
            match ticket.poll() {
                TicketState::Pending => {}
                TicketState::Ready(result) => {
                    let issued_for = ticket.round();
                    self.outstanding = None;
                    self.accumulator = Duration::ZERO;
                    Self::apply_result(round, issued_for, result, adversary, grid, out);
                }
            }
            return;
        }

        if self.accumulator >= self.interval {
            let shared = self.grid.get_or_insert_with(|| grid.to_shared()).clone();
            debug!(round = round.get(), from = ?adversary.cell, to = ?target, "plan requested");
            self.outstanding = Some(self.worker.submit(PlanRequest {
                round,
                grid: shared,
                from: adversary.cell,
                to: target,
            }));
        }
    }

    fn apply_result(
        round: RoundId,
        issued_for: RoundId,
        result: Option<CellCoord>,
        adversary: &ActorSnapshot,
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        if issued_for != round {
            debug!(
                issued_for = issued_for.get(),
                round = round.get(),
                "stale plan discarded"
            );
            return;
        }

        match result {
            Some(step) if step != adversary.cell && grid.is_walkable(step) => {
                out.push(Command::StepAdversary { to: step });
            }
            Some(step) => trace!(?step, "plan proposes no move"),
            None => debug!(round = round.get(), "plan unavailable"),
        }
    }

    fn cancel(&mut self) {
        if self.outstanding.take().is_some() {
            debug!("outstanding plan abandoned");
        }
        self.accumulator = Duration::ZERO;
        self.grid = None;
    }
}
