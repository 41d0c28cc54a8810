//! One-shot plan requests and the workers that resolve them.

use std::{
    sync::mpsc::{self, Receiver, SyncSender, TryRecvError},
    thread,
};

use maze_chase_core::{CellCoord, RoundId, SharedGrid};
use maze_chase_system_pathfinding::Pathfinder;
use tracing::warn;

/// Everything a worker needs to compute one adversary step.
#[derive(Clone, Debug)]
pub struct PlanRequest {
    /// Round the request belongs to.
    pub round: RoundId,
    /// Grid of that round.
    pub grid: SharedGrid,
    /// Committed cell of the adversary.
    pub from: CellCoord,
    /// Committed cell of the player.
    pub to: CellCoord,
}

/// Readiness of a [`PlanTicket`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketState {
    /// The worker has not answered yet.
    Pending,
    /// The worker answered; `None` means no plan is available.
    Ready(Option<CellCoord>),
}

/// Receiving half of a one-shot plan handoff.
#[derive(Debug)]
pub struct PlanTicket {
    round: RoundId,
    receiver: Receiver<Option<CellCoord>>,
}

impl PlanTicket {
    /// Round the ticket was issued for.
    #[must_use]
    pub const fn round(&self) -> RoundId {
        self.round
    }

    /// Non-blocking readiness check.
    ///
    /// A sender dropped without answering counts as a failed plan and is
    /// reported as `Ready(None)`.
    #[must_use]
    pub fn poll(&self) -> TicketState {
        match self.receiver.try_recv() {
            Ok(result) => TicketState::Ready(result),
            Err(TryRecvError::Empty) => TicketState::Pending,
            Err(TryRecvError::Disconnected) => TicketState::Ready(None),
        }
    }
}

/// Sending half of a one-shot plan handoff.
#[derive(Debug)]
pub struct PlanSender {
    sender: SyncSender<Option<CellCoord>>,
}

impl PlanSender {
    /// Delivers the result. Nobody is told if the ticket was already dropped.
    pub fn fulfil(self, result: Option<CellCoord>) {
        let _ = self.sender.try_send(result);
    }
}

/// Creates a connected sender and ticket for the provided round.
#[must_use]
pub fn plan_channel(round: RoundId) -> (PlanSender, PlanTicket) {
    let (sender, receiver) = mpsc::sync_channel(1);
    (PlanSender { sender }, PlanTicket { round, receiver })
}

/// Transport that resolves plan requests without blocking the caller.
pub trait PlanWorker {
    /// Starts resolving `request` and hands back the ticket for its answer.
    fn submit(&mut self, request: PlanRequest) -> PlanTicket;
}

/// Resolves every request on its own short-lived background thread.
#[derive(Debug, Default)]
pub struct ThreadWorker;

impl PlanWorker for ThreadWorker {
    fn submit(&mut self, request: PlanRequest) -> PlanTicket {
        let (sender, ticket) = plan_channel(request.round);
        let spawned = thread::Builder::new()
            .name("maze-chase-planner".to_owned())
            .spawn(move || {
                let mut pathfinder = Pathfinder::default();
                let step = pathfinder.next_step(request.grid.view(), request.from, request.to);
                sender.fulfil(Some(step));
            });
        if let Err(error) = spawned {
            warn!(%error, "failed to spawn planner thread");
        }
        ticket
    }
}

/// Resolves requests synchronously inside `submit`.
#[derive(Debug, Default)]
pub struct InlineWorker {
    pathfinder: Pathfinder,
}

impl PlanWorker for InlineWorker {
    fn submit(&mut self, request: PlanRequest) -> PlanTicket {
        let (sender, ticket) = plan_channel(request.round);
        let step = self
            .pathfinder
            .next_step(request.grid.view(), request.from, request.to);
        sender.fulfil(Some(step));
        ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_is_pending_until_fulfilled() {
        let (sender, ticket) = plan_channel(RoundId::new(3));
        assert_eq!(ticket.poll(), TicketState::Pending);

        sender.fulfil(Some(CellCoord::new(1, 2)));

        assert_eq!(ticket.poll(), TicketState::Ready(Some(CellCoord::new(1, 2))));
        assert_eq!(ticket.round(), RoundId::new(3));
    }

    #[test]
    fn dropped_sender_reads_as_no_plan() {
        let (sender, ticket) = plan_channel(RoundId::new(1));
        drop(sender);

        assert_eq!(ticket.poll(), TicketState::Ready(None));
    }

    #[test]
    fn fulfilling_a_dropped_ticket_is_silent() {
        let (sender, ticket) = plan_channel(RoundId::new(1));
        drop(ticket);

        sender.fulfil(None);
    }
}
