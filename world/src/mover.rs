//! Tween state converting discrete cell transitions into pixel motion.

use std::time::Duration;

use glam::Vec2;
use maze_chase_core::{Actor, ActorSnapshot, CellCoord, ChaseConfig};

/// Maps grid cells onto canonical pixel positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelLayout {
    tile_size: f32,
    padding: f32,
}

impl PixelLayout {
    /// Creates a layout with the provided cell edge length and padding.
    #[must_use]
    pub const fn new(tile_size: f32, padding: f32) -> Self {
        Self { tile_size, padding }
    }

    /// Derives the layout from the session configuration.
    #[must_use]
    pub fn from_config(config: &ChaseConfig) -> Self {
        Self::new(config.tile_size, config.padding)
    }

    /// Edge length of a cell in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Canonical top-left pixel position of the cell.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            cell.column() as f32 * self.tile_size + self.padding,
            cell.row() as f32 * self.tile_size + self.padding,
        )
    }

    /// Pixel center of the cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.cell_origin(cell) + Vec2::splat(self.tile_size * 0.5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Moving {
        target: CellCoord,
        start: Vec2,
        end: Vec2,
        progress: f32,
    },
}

/// Smooth grid mover with a single pending target cell.
///
/// While idle the pixel position equals the canonical position of the
/// committed cell. While moving it lies on the segment between the start and
/// end pixels, and arrival snaps it exactly onto the end pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Mover {
    layout: PixelLayout,
    speed: f32,
    cell: CellCoord,
    position: Vec2,
    phase: Phase,
}

impl Mover {
    /// Creates an idle mover placed on `cell`, travelling at `speed` pixels per second.
    #[must_use]
    pub fn new(layout: PixelLayout, speed: f32, cell: CellCoord) -> Self {
        Self {
            layout,
            speed,
            cell,
            position: layout.cell_origin(cell),
            phase: Phase::Idle,
        }
    }

    /// Snaps the mover onto `cell`, discarding any tween in flight.
    pub fn place(&mut self, cell: CellCoord) {
        self.cell = cell;
        self.position = self.layout.cell_origin(cell);
        self.phase = Phase::Idle;
    }

    /// Starts travelling toward `target`.
    ///
    /// Returns `false` without touching any state if a move is already in
    /// flight.
    #[must_use]
    pub fn start_move(&mut self, target: CellCoord) -> bool {
        if self.is_moving() {
            return false;
        }

        self.phase = Phase::Moving {
            target,
            start: self.position,
            end: self.layout.cell_origin(target),
            progress: 0.0,
        };
        true
    }

    /// Advances the tween by `dt`, returning the committed cell on arrival.
    pub fn advance(&mut self, dt: Duration) -> Option<CellCoord> {
        let Phase::Moving {
            target,
            start,
            end,
            progress,
        } = self.phase
        else {
            return None;
        };

        let seconds = dt.as_secs_f32();
        if seconds <= 0.0 {
            return None;
        }

        let progress = progress + self.speed * seconds / self.layout.tile_size();
        if progress >= 1.0 {
            self.cell = target;
            self.position = end;
            self.phase = Phase::Idle;
            return Some(target);
        }

        self.position = start + (end - start) * progress;
        self.phase = Phase::Moving {
            target,
            start,
            end,
            progress,
        };
        None
    }

    /// Last committed cell.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Cell being travelled to, if a tween is in flight.
    #[must_use]
    pub const fn target(&self) -> Option<CellCoord> {
        match self.phase {
            Phase::Idle => None,
            Phase::Moving { target, .. } => Some(target),
        }
    }

    /// Current top-left pixel position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current pixel center.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::splat(self.layout.tile_size() * 0.5)
    }

    /// Tween progress in `0.0..=1.0`; idle movers report `0.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        match self.phase {
            Phase::Idle => 0.0,
            Phase::Moving { progress, .. } => progress,
        }
    }

    /// Reports whether a tween is in flight.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        matches!(self.phase, Phase::Moving { .. })
    }

    /// Captures the mover's state for the provided actor role.
    #[must_use]
    pub fn snapshot(&self, actor: Actor) -> ActorSnapshot {
        ActorSnapshot {
            actor,
            cell: self.cell,
            target: self.target(),
            position: self.position,
            progress: self.progress(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: PixelLayout = PixelLayout::new(32.0, 0.0);

    fn mover_at(column: u32, row: u32) -> Mover {
        Mover::new(LAYOUT, 160.0, CellCoord::new(column, row))
    }

    #[test]
    fn new_mover_sits_on_canonical_position() {
        let mover = mover_at(2, 3);
        assert_eq!(mover.position(), Vec2::new(64.0, 96.0));
        assert!(!mover.is_moving());
    }

    #[test]
    fn padding_offsets_both_axes() {
        let layout = PixelLayout::new(10.0, 4.0);
        assert_eq!(layout.cell_origin(CellCoord::new(1, 2)), Vec2::new(14.0, 24.0));
        assert_eq!(layout.cell_center(CellCoord::new(0, 0)), Vec2::new(9.0, 9.0));
    }

    #[test]
    fn start_move_is_rejected_while_moving() {
        let mut mover = mover_at(1, 1);
        assert!(mover.start_move(CellCoord::new(2, 1)));
        let before = mover.clone();

        assert!(!mover.start_move(CellCoord::new(1, 2)));
        assert_eq!(mover, before);
    }

    #[test]
    fn advance_interpolates_linearly() {
        let mut mover = mover_at(0, 0);
        assert!(mover.start_move(CellCoord::new(1, 0)));

        // 160 px/s for 0.1 s covers half of a 32 px cell.
        assert_eq!(mover.advance(Duration::from_millis(100)), None);

        assert!((mover.progress() - 0.5).abs() < 1e-6);
        assert!((mover.position().x - 16.0).abs() < 1e-4);
        assert_eq!(mover.position().y, 0.0);
        assert_eq!(mover.cell(), CellCoord::new(0, 0));
    }

    #[test]
    fn advance_zero_changes_nothing() {
        let mut idle = mover_at(3, 3);
        let idle_before = idle.clone();
        assert_eq!(idle.advance(Duration::ZERO), None);
        assert_eq!(idle, idle_before);

        let mut moving = mover_at(3, 3);
        assert!(moving.start_move(CellCoord::new(3, 4)));
        let _ = moving.advance(Duration::from_millis(50));
        let moving_before = moving.clone();
        assert_eq!(moving.advance(Duration::ZERO), None);
        assert_eq!(moving, moving_before);
    }

    #[test]
    fn large_dt_lands_exactly_on_target() {
        let mut mover = mover_at(4, 4);
        assert!(mover.start_move(CellCoord::new(4, 3)));

        assert_eq!(
            mover.advance(Duration::from_secs(10)),
            Some(CellCoord::new(4, 3))
        );

        assert_eq!(mover.cell(), CellCoord::new(4, 3));
        assert_eq!(mover.position(), LAYOUT.cell_origin(CellCoord::new(4, 3)));
        assert!(!mover.is_moving());
        assert_eq!(mover.target(), None);
    }

    #[test]
    fn position_stays_between_endpoints_while_moving() {
        let mut mover = mover_at(5, 5);
        assert!(mover.start_move(CellCoord::new(4, 5)));
        let start = LAYOUT.cell_origin(CellCoord::new(5, 5));
        let end = LAYOUT.cell_origin(CellCoord::new(4, 5));

        while mover.is_moving() {
            let _ = mover.advance(Duration::from_millis(7));
            let x = mover.position().x;
            assert!(x <= start.x && x >= end.x, "x = {x} left the segment");
            assert_eq!(mover.position().y, start.y);
        }
        assert_eq!(mover.position(), end);
    }

    #[test]
    fn place_clears_tween() {
        let mut mover = mover_at(0, 0);
        assert!(mover.start_move(CellCoord::new(0, 1)));
        let _ = mover.advance(Duration::from_millis(30));

        mover.place(CellCoord::new(6, 2));

        assert!(!mover.is_moving());
        assert_eq!(mover.cell(), CellCoord::new(6, 2));
        assert_eq!(mover.position(), LAYOUT.cell_origin(CellCoord::new(6, 2)));
        assert_eq!(mover.progress(), 0.0);
    }

    #[test]
    fn snapshot_reports_target_only_while_moving() {
        let mut mover = mover_at(1, 1);
        assert_eq!(mover.snapshot(Actor::Player).target, None);

        assert!(mover.start_move(CellCoord::new(1, 2)));
        let snapshot = mover.snapshot(Actor::Player);
        assert_eq!(snapshot.target, Some(CellCoord::new(1, 2)));
        assert!(snapshot.is_moving());
    }
}
