//! Breadth-first reachability search from the player to the goal.
//!
//! Wall and pit cells are dead ends: the search may reach them but never
//! expands their neighbours, so any path found crosses only empty cells.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{Direction, PieceKind, Position, board::Board};

/// Returns `true` if the goal can be reached from the player's position.
pub fn is_solvable(board: &Board) -> bool {
    shortest_path(board).is_some()
}

/// Finds a shortest path from the player to the goal.
///
/// The returned path starts at the player's position and ends on the goal.
/// Returns `None` if every route is blocked by the wall, the pit or the
/// board edge.
pub fn shortest_path(board: &Board) -> Option<Vec<Position>> {
    let start = board.player();
    let mut queue = VecDeque::from([start]);
    let mut visited: HashSet<Position> = HashSet::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }

        match board.piece_at(current) {
            Some(PieceKind::Goal) => return reconstruct_path(&came_from, start, current),
            Some(kind) if kind.is_obstacle() => continue,
            _ => {}
        }

        for next in board.neighbors(current) {
            if visited.contains(&next) {
                continue;
            }
            came_from.entry(next).or_insert(current);
            queue.push_back(next);
        }
    }

    None
}

/// Same as [`shortest_path`], expressed as the moves that walk it.
pub fn shortest_route(board: &Board) -> Option<Vec<Direction>> {
    let path = shortest_path(board)?;
    path.windows(2)
        .map(|step| direction_between(step[0], step[1]))
        .collect()
}

fn reconstruct_path(
    came_from: &HashMap<Position, Position>,
    start: Position,
    goal: Position,
) -> Option<Vec<Position>> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = *came_from.get(&current)?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

/// Converts a move between two adjacent positions into a direction.
fn direction_between(src: Position, dst: Position) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .find(|direction| src.offset(*direction) == Some(dst))
}
