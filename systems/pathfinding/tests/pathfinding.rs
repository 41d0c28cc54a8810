use std::collections::VecDeque;

use maze_chase_core::{CellCoord, CellKind, GridView};
use maze_chase_system_pathfinding::{next_step, Pathfinder};
use proptest::prelude::*;

fn parse(rows: &[&str]) -> (Vec<CellKind>, u32, u32) {
    let cells = rows
        .iter()
        .flat_map(|row| row.chars())
        .map(|marker| if marker == '#' { CellKind::Wall } else { CellKind::Road })
        .collect();
    (cells, rows[0].len() as u32, rows.len() as u32)
}

/// Breadth-first distances from `goal`, used as the optimality oracle.
fn distances_to(grid: GridView<'_>, goal: CellCoord) -> Vec<Option<u32>> {
    let mut distances = vec![None; grid.cells().len()];
    let Some(goal_index) = grid.index(goal) else {
        return distances;
    };
    if !grid.is_walkable(goal) {
        return distances;
    }
    distances[goal_index] = Some(0);
    let mut queue = VecDeque::from([goal]);
    while let Some(cell) = queue.pop_front() {
        let distance = distances[grid.index(cell).expect("in bounds")].expect("visited");
        for neighbor in grid.walkable_neighbors(cell) {
            let index = grid.index(neighbor).expect("in bounds");
            if distances[index].is_none() {
                distances[index] = Some(distance + 1);
                queue.push_back(neighbor);
            }
        }
    }
    distances
}

#[test]
fn adjacent_target_in_walled_room_is_entered_directly() {
    let (cells, columns, rows) = parse(&["#####", "#...#", "#...#", "#....", "#####"]);
    let grid = GridView::new(&cells, columns, rows);
    let adversary = CellCoord::new(2, 2);
    let player = CellCoord::new(3, 2);

    let step = next_step(grid, adversary, player);

    assert_eq!(step, player);
    assert_eq!(
        step.manhattan_distance(player) + 1,
        adversary.manhattan_distance(player)
    );
}

#[test]
fn follows_the_only_open_corridor() {
    let (cells, columns, rows) = parse(&["#######", "#.....#", "#####.#", "#.....#", "#.#####"]);
    let grid = GridView::new(&cells, columns, rows);
    let mut cell = CellCoord::new(1, 1);
    let goal = CellCoord::new(1, 3);
    let mut route = vec![cell];

    while cell != goal && route.len() < 32 {
        cell = next_step(grid, cell, goal);
        route.push(cell);
    }

    assert_eq!(cell, goal);
    assert_eq!(route.len() - 1, 10);
    assert_eq!(route[1], CellCoord::new(2, 1));
    assert!(route.contains(&CellCoord::new(5, 2)));
}

#[test]
fn unreachable_goal_steps_toward_closest_surrogate() {
    let (cells, columns, rows) = parse(&["#######", "#..#..#", "#..#...", "#######"]);
    let grid = GridView::new(&cells, columns, rows);

    let step = next_step(grid, CellCoord::new(1, 1), CellCoord::new(5, 1));

    assert_eq!(step, CellCoord::new(2, 1));
}

#[test]
fn unreachable_goal_behind_wall_target_still_moves() {
    let (cells, columns, rows) = parse(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
    let grid = GridView::new(&cells, columns, rows);

    let step = next_step(grid, CellCoord::new(1, 1), CellCoord::new(2, 2));

    assert!(step.is_adjacent(CellCoord::new(1, 1)));
    assert!(grid.is_walkable(step));
}

#[test]
fn sealed_start_stays_put() {
    let (cells, columns, rows) = parse(&["#####", "#.#.#", "#####"]);
    let grid = GridView::new(&cells, columns, rows);
    let start = CellCoord::new(1, 1);

    assert_eq!(next_step(grid, start, CellCoord::new(3, 1)), start);
}

#[test]
fn results_are_reproducible() {
    let (cells, columns, rows) = parse(&[
        "#########",
        "#.......#",
        "#.#.#.#.#",
        "#.......#",
        "#.#.#.#.#",
        "#.......#",
        "#########",
    ]);
    let grid = GridView::new(&cells, columns, rows);
    let mut pathfinder = Pathfinder::default();
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(7, 5);

    let first = pathfinder.next_step(grid, start, goal);
    for _ in 0..8 {
        assert_eq!(pathfinder.next_step(grid, start, goal), first);
        assert_eq!(next_step(grid, start, goal), first);
    }
}

fn arbitrary_grid() -> impl Strategy<Value = (Vec<CellKind>, u32, u32)> {
    (2_u32..8, 2_u32..8).prop_flat_map(|(columns, rows)| {
        let len = (columns * rows) as usize;
        proptest::collection::vec(prop::bool::weighted(0.7), len).prop_map(move |roads| {
            let cells = roads
                .into_iter()
                .map(|road| if road { CellKind::Road } else { CellKind::Wall })
                .collect();
            (cells, columns, rows)
        })
    })
}

proptest! {
    #[test]
    fn repeated_steps_follow_a_shortest_path(
        (cells, columns, rows) in arbitrary_grid(),
        start_pick in any::<prop::sample::Index>(),
        goal_pick in any::<prop::sample::Index>(),
    ) {
        let grid = GridView::new(&cells, columns, rows);
        let roads: Vec<CellCoord> = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| CellCoord::new(column, row)))
            .filter(|cell| grid.is_walkable(*cell))
            .collect();
        prop_assume!(!roads.is_empty());

        let start = *start_pick.get(&roads);
        let goal = *goal_pick.get(&roads);
        let distances = distances_to(grid, goal);
        let mut pathfinder = Pathfinder::default();

        match distances[grid.index(start).expect("in bounds")] {
            Some(expected) => {
                let mut cell = start;
                let mut steps = 0;
                while cell != goal {
                    let next = pathfinder.next_step(grid, cell, goal);
                    prop_assert!(next.is_adjacent(cell));
                    prop_assert!(grid.is_walkable(next));
                    cell = next;
                    steps += 1;
                    prop_assert!(steps <= expected);
                }
                prop_assert_eq!(steps, expected);
            }
            None => {
                let next = pathfinder.next_step(grid, start, goal);
                let has_exit = grid.walkable_neighbors(start).next().is_some();
                if has_exit {
                    prop_assert!(next.is_adjacent(start));
                    prop_assert!(grid.is_walkable(next));
                } else {
                    prop_assert_eq!(next, start);
                }
            }
        }
    }
}
