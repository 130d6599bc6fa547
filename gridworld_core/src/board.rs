use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{Direction, PieceKind, Position, Symbol, error::BoardError, map::Grid};

/// Current piece placement for one episode.
///
/// The player is tracked on its own; goal, pit and wall live in a
/// position-keyed map. Only the player ever moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    player: Position,
    pieces: HashMap<Position, PieceKind>,
}

impl Board {
    /// Builds a board from explicit placements.
    ///
    /// All four positions must be in bounds and pairwise distinct.
    pub fn new(
        width: usize,
        height: usize,
        player: Position,
        goal: Position,
        pit: Position,
        wall: Position,
    ) -> Result<Self, BoardError> {
        let placements = [
            (PieceKind::Goal, goal),
            (PieceKind::Pit, pit),
            (PieceKind::Wall, wall),
            (PieceKind::Player, player),
        ];
        for (kind, position) in placements {
            if position.x >= width || position.y >= height {
                return Err(BoardError::OutOfBounds {
                    kind,
                    position,
                    width,
                    height,
                });
            }
        }
        for (i, (first, a)) in placements.iter().enumerate() {
            if let Some((second, _)) = placements[i + 1..].iter().find(|(_, b)| b == a) {
                return Err(BoardError::Overlap {
                    first: *first,
                    second: *second,
                    position: *a,
                });
            }
        }
        Ok(Self::from_parts(
            width,
            height,
            player,
            HashMap::from([
                (goal, PieceKind::Goal),
                (pit, PieceKind::Pit),
                (wall, PieceKind::Wall),
            ]),
        ))
    }

    /// Assembles a board without validation. Callers guarantee distinct,
    /// in-bounds placements.
    pub(crate) fn from_parts(
        width: usize,
        height: usize,
        player: Position,
        pieces: HashMap<Position, PieceKind>,
    ) -> Self {
        Board {
            width,
            height,
            player,
            pieces,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn player(&self) -> Position {
        self.player
    }

    /// The non-player pieces keyed by position.
    pub fn pieces(&self) -> &HashMap<Position, PieceKind> {
        &self.pieces
    }

    pub(crate) fn set_player(&mut self, position: Position) {
        debug_assert!(self.is_in_bounds(position));
        self.player = position;
    }

    /// Returns the non-player piece at `position`, if any.
    pub fn piece_at(&self, position: Position) -> Option<PieceKind> {
        self.pieces.get(&position).copied()
    }

    /// Returns where `kind` currently sits.
    pub fn position_of(&self, kind: PieceKind) -> Option<Position> {
        if kind == PieceKind::Player {
            return Some(self.player);
        }
        self.pieces
            .iter()
            .find_map(|(position, k)| (*k == kind).then_some(*position))
    }

    #[inline]
    pub fn is_in_bounds(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Yields the in-bounds orthogonal neighbours of `position`, in
    /// [`Direction::ALL`] order.
    pub fn neighbors(&self, position: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| position.offset(direction))
            .filter(|next| self.is_in_bounds(*next))
    }

    /// Renders the board into a grid of symbols, one per cell.
    pub fn render(&self) -> Grid<Symbol> {
        Grid::from_generator(self.width, self.height, |position| {
            match (position == self.player, self.piece_at(position)) {
                (true, Some(_)) => Symbol::Overlap,
                (true, None) => Symbol::Player,
                (false, Some(kind)) => kind.symbol(),
                (false, None) => Symbol::Empty,
            }
        })
    }

    /// Encodes the board as one-hot occupancy planes.
    pub fn observe(&self) -> Observation {
        let planes = PieceKind::ALL.map(|kind| {
            let mut plane: Grid<u8> = Grid::new(self.width, self.height);
            if let Some(position) = self.position_of(kind) {
                plane[position] = 1;
            }
            plane
        });
        Observation { planes }
    }
}

/// Prints one row per line, e.g. `PW\n+-`.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.render();
        for (y, row) in grid.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for symbol in row {
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}

/// A stack of one-hot occupancy grids, one per piece kind, in
/// [`PieceKind::ALL`] order (goal, pit, wall, player).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    planes: [Grid<u8>; 4],
}

impl Observation {
    pub fn plane(&self, kind: PieceKind) -> &Grid<u8> {
        let index = match kind {
            PieceKind::Goal => 0,
            PieceKind::Pit => 1,
            PieceKind::Wall => 2,
            PieceKind::Player => 3,
        };
        &self.planes[index]
    }

    /// Shape as `(planes, height, width)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        let first = &self.planes[0];
        (self.planes.len(), first.height(), first.width())
    }

    /// Flattens the planes into a single plane-major vector.
    pub fn flatten(&self) -> Vec<u8> {
        self.planes
            .iter()
            .flat_map(|plane| plane.as_slice().iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    fn two_by_two() -> Board {
        // P+
        // W-
        Board::new(2, 2, p(0, 0), p(1, 0), p(1, 1), p(0, 1)).unwrap()
    }

    #[test]
    fn test_render() {
        let board = two_by_two();
        assert_eq!(
            board.render().to_rows(),
            vec![
                vec![Symbol::Player, Symbol::Goal],
                vec![Symbol::Wall, Symbol::Pit],
            ]
        );
        assert_eq!(board.to_string(), "P+\nW-");
    }

    #[test]
    fn test_render_overlap() {
        let mut board = two_by_two();
        board.set_player(p(1, 0));
        assert_eq!(board.to_string(), ".X\nW-");
    }

    #[test]
    fn test_render_is_idempotent() {
        let board = Board::new(4, 3, p(0, 0), p(3, 2), p(1, 1), p(2, 0)).unwrap();
        assert_eq!(board.render(), board.render());
        assert_eq!(board.to_string(), "P.W.\n.-..\n...+");
    }

    #[test]
    fn test_piece_lookup() {
        let board = two_by_two();
        assert_eq!(board.piece_at(p(1, 0)), Some(PieceKind::Goal));
        assert_eq!(board.piece_at(p(0, 0)), None);
        assert_eq!(board.position_of(PieceKind::Wall), Some(p(0, 1)));
        assert_eq!(board.position_of(PieceKind::Player), Some(p(0, 0)));
        assert_eq!(board.pieces().len(), 3);
    }

    #[test]
    fn test_in_bounds() {
        let board = Board::new(3, 2, p(0, 0), p(1, 0), p(2, 0), p(0, 1)).unwrap();
        assert!(board.is_in_bounds(p(2, 1)));
        assert!(!board.is_in_bounds(p(3, 1)));
        assert!(!board.is_in_bounds(p(2, 2)));
    }

    #[test]
    fn test_neighbors_stay_in_bounds() {
        let board = two_by_two();
        let corner: Vec<_> = board.neighbors(p(0, 0)).collect();
        assert_eq!(corner, vec![p(0, 1), p(1, 0)]);

        let board = Board::new(3, 3, p(1, 1), p(0, 0), p(2, 2), p(2, 0)).unwrap();
        assert_eq!(board.neighbors(p(1, 1)).count(), 4);
        assert_eq!(board.neighbors(p(2, 2)).count(), 2);
    }

    #[test]
    fn test_rejects_overlapping_pieces() {
        let err = Board::new(2, 2, p(0, 0), p(1, 0), p(1, 0), p(0, 1)).unwrap_err();
        assert_eq!(
            err,
            BoardError::Overlap {
                first: PieceKind::Goal,
                second: PieceKind::Pit,
                position: p(1, 0),
            }
        );
    }

    #[test]
    fn test_rejects_out_of_bounds_piece() {
        let err = Board::new(2, 2, p(0, 2), p(1, 0), p(1, 1), p(0, 1)).unwrap_err();
        assert!(matches!(
            err,
            BoardError::OutOfBounds {
                kind: PieceKind::Player,
                ..
            }
        ));
    }

    #[test]
    fn test_observation_planes() {
        let obs = two_by_two().observe();
        assert_eq!(obs.shape(), (4, 2, 2));
        assert_eq!(obs.plane(PieceKind::Goal).to_rows(), vec![vec![0, 1], vec![0, 0]]);
        assert_eq!(obs.plane(PieceKind::Pit).to_rows(), vec![vec![0, 0], vec![0, 1]]);
        assert_eq!(obs.plane(PieceKind::Wall).to_rows(), vec![vec![0, 0], vec![1, 0]]);
        assert_eq!(obs.plane(PieceKind::Player).to_rows(), vec![vec![1, 0], vec![0, 0]]);
        assert_eq!(
            obs.flatten(),
            vec![0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 0]
        );
    }
}
