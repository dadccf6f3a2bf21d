use std::collections::VecDeque;

use crate::board::Cell;
use crate::session::Session;
use crate::session::random::UniformSource;

const STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

fn is_ripe(cell: &Cell) -> bool {
    matches!(cell, Cell::Tree(tree) if tree.is_mature() && !tree.is_spoiled())
}

/// Pick the autopilot's next move.
///
/// Walks the shortest safe path toward the nearest ripe tree, never
/// stepping onto a pond or spoiled fruit. With nothing ripe in reach it
/// wanders to a random safe neighbor. Returns `None` when boxed in.
pub fn next_step<R>(session: &Session, rng: &mut R) -> Option<(i32, i32)>
where
    R: UniformSource + ?Sized,
{
    if let Some(step) = step_toward_ripe(session) {
        return Some(step);
    }

    let (px, py) = session.player().position();
    let safe: Vec<(i32, i32)> = STEPS
        .iter()
        .map(|&(dx, dy)| (px + dx, py + dy))
        .filter(|&(x, y)| matches!(session.grid().get(x, y), Some(cell) if !cell.is_deadly()))
        .collect();
    if safe.is_empty() {
        None
    } else {
        Some(safe[rng.below(safe.len())])
    }
}

/// First step of a breadth-first path to the closest ripe tree.
fn step_toward_ripe(session: &Session) -> Option<(i32, i32)> {
    let grid = session.grid();
    let width = grid.width();
    let start = session.player().position();
    let index = |(x, y): (i32, i32)| y as usize * width + x as usize;

    // For each visited cell, the first step taken from the start to reach it.
    let mut first_step: Vec<Option<(i32, i32)>> = vec![None; width * grid.height()];
    let mut visited = vec![false; width * grid.height()];
    visited[index(start)] = true;

    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        for (dx, dy) in STEPS {
            let next = (pos.0 + dx, pos.1 + dy);
            let Some(cell) = grid.get(next.0, next.1) else {
                continue;
            };
            if cell.is_deadly() || visited[index(next)] {
                continue;
            }
            visited[index(next)] = true;

            let step = if pos == start {
                next
            } else {
                first_step[index(pos)]?
            };
            if is_ripe(cell) {
                return Some(step);
            }
            first_step[index(next)] = Some(step);
            queue.push_back(next);
        }
    }

    None
}
