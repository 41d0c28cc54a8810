//! Headless player input: idle, scripted intents, or an exit-seeking autopilot.

use anyhow::{bail, Result};
use maze_chase_core::{Direction, FrameSnapshot, GridView};
use maze_chase_system_pathfinding::Pathfinder;

/// Produces the player's movement intent for each tick.
#[derive(Debug)]
pub(crate) enum Pilot {
    /// Never moves.
    Idle,
    /// Replays a fixed list of intents, one per tick on which the player is idle.
    Scripted {
        /// Intents in replay order; `None` waits for one idle tick.
        moves: Vec<Option<Direction>>,
        /// Index of the next intent to replay.
        cursor: usize,
    },
    /// Walks toward the exit using the same search as the adversary.
    Autopilot(Pathfinder),
}

impl Pilot {
    /// Parses a script of `U`, `D`, `L`, `R` and `.` (wait) characters.
    ///
    /// Whitespace is ignored and letters are case-insensitive.
    pub(crate) fn scripted(script: &str) -> Result<Self> {
        let mut moves = Vec::with_capacity(script.len());
        for (position, symbol) in script.chars().enumerate() {
            let intent = match symbol.to_ascii_uppercase() {
                'U' => Some(Direction::North),
                'D' => Some(Direction::South),
                'L' => Some(Direction::West),
                'R' => Some(Direction::East),
                '.' => None,
                other if other.is_whitespace() => continue,
                other => bail!("unexpected move '{other}' at position {position}"),
            };
            moves.push(intent);
        }
        Ok(Self::Scripted { moves, cursor: 0 })
    }

    /// Builds a pilot that heads for the exit.
    pub(crate) fn autopilot() -> Self {
        Self::Autopilot(Pathfinder::default())
    }

    /// Chooses the intent for the upcoming tick.
    pub(crate) fn intent(
        &mut self,
        frame: &FrameSnapshot,
        grid: GridView<'_>,
    ) -> Option<Direction> {
        if frame.player.is_moving() {
            return None;
        }

        match self {
            Self::Idle => None,
            Self::Scripted { moves, cursor } => {
                let intent = moves.get(*cursor).copied().flatten();
                *cursor = cursor.saturating_add(1);
                intent
            }
            Self::Autopilot(pathfinder) => {
                let step = pathfinder.next_step(grid, frame.player.cell, frame.exit);
                Direction::between(frame.player.cell, step)
            }
        }
    }

    /// Rewinds scripted input so every round replays the same moves.
    pub(crate) fn rewind(&mut self) {
        if let Self::Scripted { cursor, .. } = self {
            *cursor = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use maze_chase_core::{
        Actor, ActorSnapshot, CellCoord, CellKind, RoundId, RoundState, RoundStats,
    };

    use super::*;

    fn actor(actor: Actor, cell: CellCoord) -> ActorSnapshot {
        ActorSnapshot {
            actor,
            cell,
            target: None,
            position: Vec2::ZERO,
            progress: 0.0,
        }
    }

    fn frame(player: CellCoord) -> FrameSnapshot {
        FrameSnapshot {
            round: RoundId::new(1),
            state: RoundState::Playing,
            player: actor(Actor::Player, player),
            adversary: actor(Actor::Adversary, CellCoord::new(0, 0)),
            exit: CellCoord::new(4, 0),
            coins: Vec::new(),
            stats: RoundStats::default(),
            frozen: false,
        }
    }

    #[test]
    fn script_replays_on_idle_ticks() {
        let cells = [CellKind::Road; 5];
        let grid = GridView::new(&cells, 5, 1);
        let mut pilot = Pilot::scripted("r . l").expect("valid script");

        let mut moving = frame(CellCoord::new(1, 0));
        moving.player.target = Some(CellCoord::new(2, 0));
        assert_eq!(pilot.intent(&moving, grid), None);

        let idle = frame(CellCoord::new(1, 0));
        assert_eq!(pilot.intent(&idle, grid), Some(Direction::East));
        assert_eq!(pilot.intent(&idle, grid), None);
        assert_eq!(pilot.intent(&idle, grid), Some(Direction::West));
        assert_eq!(pilot.intent(&idle, grid), None);

        pilot.rewind();
        assert_eq!(pilot.intent(&idle, grid), Some(Direction::East));
    }

    #[test]
    fn script_rejects_unknown_symbols() {
        let error = Pilot::scripted("UDX").expect_err("X is not a move");

        assert!(error.to_string().contains("'X' at position 2"));
    }

    #[test]
    fn autopilot_heads_for_the_exit() {
        let cells = [CellKind::Road; 5];
        let grid = GridView::new(&cells, 5, 1);
        let mut pilot = Pilot::autopilot();

        assert_eq!(
            pilot.intent(&frame(CellCoord::new(1, 0)), grid),
            Some(Direction::East)
        );
        assert_eq!(pilot.intent(&frame(CellCoord::new(4, 0)), grid), None);
    }
}
