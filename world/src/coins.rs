//! Coin placement and pickup bookkeeping for a single round.

use glam::Vec2;
use maze_chase_core::{CellCoord, CoinId, CoinSnapshot};
use rand::{seq::SliceRandom, Rng};

use crate::{grid::Grid, mover::PixelLayout};

#[derive(Clone, Debug, PartialEq)]
struct Coin {
    id: CoinId,
    cell: CellCoord,
    center: Vec2,
    collected: bool,
}

/// Coins seeded at round start. A collected coin never comes back until the
/// ledger is rebuilt for the next round.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CoinLedger {
    coins: Vec<Coin>,
}

impl CoinLedger {
    /// Places up to `count` coins on distinct road cells not listed in `occupied`.
    pub(crate) fn seed<R>(
        grid: &Grid,
        occupied: &[CellCoord],
        count: u32,
        layout: &PixelLayout,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut free: Vec<CellCoord> = grid
            .road_cells()
            .iter()
            .copied()
            .filter(|cell| !occupied.contains(cell))
            .collect();
        let wanted = usize::try_from(count).unwrap_or(usize::MAX).min(free.len());
        let (chosen, _) = free.partial_shuffle(rng, wanted);

        Self::from_cells(chosen, layout)
    }

    fn from_cells(cells: &[CellCoord], layout: &PixelLayout) -> Self {
        let coins = cells
            .iter()
            .zip(0_u32..)
            .map(|(&cell, index)| Coin {
                id: CoinId::new(index),
                cell,
                center: layout.cell_center(cell),
                collected: false,
            })
            .collect();
        Self { coins }
    }

    /// Marks every uncollected coin within `radius` of `point` as collected.
    ///
    /// Newly collected coins are appended to `out`; coins collected on an
    /// earlier call are never reported again.
    pub(crate) fn collect_near(
        &mut self,
        point: Vec2,
        radius: f32,
        out: &mut Vec<(CoinId, CellCoord)>,
    ) {
        for coin in self.coins.iter_mut().filter(|coin| !coin.collected) {
            if coin.center.distance(point) <= radius {
                coin.collected = true;
                out.push((coin.id, coin.cell));
            }
        }
    }

    pub(crate) fn total(&self) -> u32 {
        u32::try_from(self.coins.len()).unwrap_or(u32::MAX)
    }

    pub(crate) fn snapshots(&self) -> Vec<CoinSnapshot> {
        self.coins
            .iter()
            .map(|coin| CoinSnapshot {
                id: coin.id,
                cell: coin.cell,
                center: coin.center,
                collected: coin.collected,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const LAYOUT: PixelLayout = PixelLayout::new(32.0, 0.0);

    fn open_grid() -> Grid {
        let rows: [&[i64]; 5] = [
            &[1, 1, 1, 1, 1],
            &[1, 0, 0, 0, 1],
            &[1, 0, 0, 0, 1],
            &[1, 0, 0, 0, 1],
            &[1, 1, 0, 1, 1],
        ];
        Grid::from_markers(&rows).expect("valid grid")
    }

    #[test]
    fn coin_is_collected_exactly_once() {
        let mut ledger = CoinLedger::from_cells(&[CellCoord::new(2, 2)], &LAYOUT);
        let radius = 0.48 * LAYOUT.tile_size();
        let near_center = LAYOUT.cell_center(CellCoord::new(2, 2)) + Vec2::new(10.0, 0.0);

        let mut collected = Vec::new();
        ledger.collect_near(near_center, radius, &mut collected);
        ledger.collect_near(near_center, radius, &mut collected);
        ledger.collect_near(near_center, radius, &mut collected);

        assert_eq!(collected, vec![(CoinId::new(0), CellCoord::new(2, 2))]);
        assert!(ledger.snapshots()[0].collected);
    }

    #[test]
    fn coin_outside_radius_stays() {
        let mut ledger = CoinLedger::from_cells(&[CellCoord::new(2, 2)], &LAYOUT);
        let radius = 0.48 * LAYOUT.tile_size();
        let far = LAYOUT.cell_center(CellCoord::new(2, 2)) + Vec2::new(16.0, 0.0);

        let mut collected = Vec::new();
        ledger.collect_near(far, radius, &mut collected);

        assert!(collected.is_empty());
        assert!(!ledger.snapshots()[0].collected);
    }

    #[test]
    fn seed_skips_occupied_cells() {
        let grid = open_grid();
        let occupied = [CellCoord::new(1, 1), CellCoord::new(3, 3), grid.find_exit()];
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let ledger = CoinLedger::seed(&grid, &occupied, 100, &LAYOUT, &mut rng);

        assert_eq!(ledger.total(), 7);
        let mut cells: Vec<_> = ledger.snapshots().iter().map(|coin| coin.cell).collect();
        assert!(cells.iter().all(|cell| !occupied.contains(cell)));
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 7, "coins must sit on distinct cells");
    }

    #[test]
    fn seed_respects_requested_count() {
        let grid = open_grid();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let ledger = CoinLedger::seed(&grid, &[], 4, &LAYOUT, &mut rng);

        assert_eq!(ledger.total(), 4);
    }
}
