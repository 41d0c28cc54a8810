#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* search over uniform-cost four-directional grids.
//!
//! The search only ever answers one question: which neighbouring cell should
//! an actor standing on `start` enter next to approach `goal`. When the goal
//! cannot be reached, the search falls back to the discovered cell with the
//! lowest `f = g + h` and steps toward that surrogate instead.

use std::{cmp::Reverse, collections::BinaryHeap};

use maze_chase_core::{CellCoord, GridView};

/// Computes the first step of a shortest path from `start` toward `goal`.
///
/// Allocates fresh scratch buffers; callers planning every tick should keep a
/// [`Pathfinder`] around instead.
#[must_use]
pub fn next_step(grid: GridView<'_>, start: CellCoord, goal: CellCoord) -> CellCoord {
    Pathfinder::default().next_step(grid, start, goal)
}

/// Reusable A* planner that keeps its scratch buffers between searches.
#[derive(Debug, Default)]
pub struct Pathfinder {
    g_scores: Vec<u32>,
    came_from: Vec<Option<CellCoord>>,
    discovered: Vec<CellCoord>,
    open: BinaryHeap<Reverse<OpenEntry>>,
}

/// Open-set entry ordered by `f`, then `g`, then row-major position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: u32,
    g: u32,
    row: u32,
    column: u32,
}

impl OpenEntry {
    fn new(cell: CellCoord, g: u32, goal: CellCoord) -> Self {
        Self {
            f: g.saturating_add(cell.manhattan_distance(goal)),
            g,
            row: cell.row(),
            column: cell.column(),
        }
    }

    const fn cell(&self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}

impl Pathfinder {
    /// Computes the first step of a shortest path from `start` toward `goal`.
    ///
    /// Returns `start` when it already equals `goal`, when `start` lies
    /// outside the grid, or when no other cell is reachable from it. Any
    /// other result is a walkable neighbour of `start`.
    pub fn next_step(
        &mut self,
        grid: GridView<'_>,
        start: CellCoord,
        goal: CellCoord,
    ) -> CellCoord {
        if start == goal {
            return start;
        }
        let Some(start_index) = grid.index(start) else {
            return start;
        };

        let (columns, rows) = grid.dimensions();
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        self.prepare(cell_count);
        self.g_scores[start_index] = 0;
        self.discovered.push(start);
        self.open.push(Reverse(OpenEntry::new(start, 0, goal)));

        while let Some(Reverse(entry)) = self.open.pop() {
            let cell = entry.cell();
            let Some(index) = grid.index(cell) else {
                continue;
            };
            if entry.g > self.g_scores[index] {
                continue;
            }
            if cell == goal {
                return self.first_step(grid, start, goal);
            }

            let g = entry.g.saturating_add(1);
            for neighbor in grid.walkable_neighbors(cell) {
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };
                let known = self.g_scores[neighbor_index];
                if g >= known {
                    continue;
                }
                if known == u32::MAX {
                    self.discovered.push(neighbor);
                }
                self.g_scores[neighbor_index] = g;
                self.came_from[neighbor_index] = Some(cell);
                self.open.push(Reverse(OpenEntry::new(neighbor, g, goal)));
            }
        }

        let surrogate = self.surrogate(grid, start, goal);
        self.first_step(grid, start, surrogate)
    }

    fn prepare(&mut self, cell_count: usize) {
        self.g_scores.clear();
        self.g_scores.resize(cell_count, u32::MAX);
        self.came_from.clear();
        self.came_from.resize(cell_count, None);
        self.discovered.clear();
        self.open.clear();
    }

    /// Lowest `f` among discovered cells other than `start`; ties prefer the
    /// smaller heuristic, then the earlier discovery.
    ///
    /// `start` is excluded on purpose: with a consistent heuristic it always
    /// holds the minimum `f`, so including it would leave a walled-off
    /// adversary standing still instead of closing in.
    fn surrogate(&self, grid: GridView<'_>, start: CellCoord, goal: CellCoord) -> CellCoord {
        self.discovered
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != start)
            .filter_map(|(order, cell)| {
                let g = *self.g_scores.get(grid.index(*cell)?)?;
                let h = cell.manhattan_distance(goal);
                Some(((g.saturating_add(h), h, order), *cell))
            })
            .min_by_key(|(key, _)| *key)
            .map_or(start, |(_, cell)| cell)
    }

    fn first_step(&self, grid: GridView<'_>, start: CellCoord, target: CellCoord) -> CellCoord {
        let mut current = target;
        while let Some(parent) = grid
            .index(current)
            .and_then(|index| self.came_from.get(index).copied().flatten())
        {
            if parent == start {
                return current;
            }
            current = parent;
        }
        start
    }
}
