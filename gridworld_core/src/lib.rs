use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::EnvError;

pub mod board;
pub mod config;
pub mod environment;
pub mod error;
pub mod map;
pub mod solver;

/// Represents a 2D coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Returns the position one unit away in `direction`.
    ///
    /// Returns `None` if the step would leave the non-negative quadrant. The
    /// upper bounds are the board's business.
    pub fn offset(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        Some(Position {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single-step move of the player.
///
/// The canonical action order is Up, Down, Left, Right, i.e. indices 0 to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector `(dx, dy)`; `y` grows downwards.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Decodes an integer action index.
    pub fn from_index(index: usize) -> Result<Self, EnvError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| EnvError::InvalidAction(format!("action index {index} not in 0..=3")))
    }

    pub const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// The short token used by text front-ends.
    pub const fn token(self) -> char {
        match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
            Direction::Left => 'l',
            Direction::Right => 'r',
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = EnvError;

    fn try_from(token: char) -> Result<Self, Self::Error> {
        match token {
            'u' => Ok(Direction::Up),
            'd' => Ok(Direction::Down),
            'l' => Ok(Direction::Left),
            'r' => Ok(Direction::Right),
            other => Err(EnvError::InvalidAction(format!(
                "direction must be one of u, d, l, r, got: {other:?}"
            ))),
        }
    }
}

impl FromStr for Direction {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(token), None) => Direction::try_from(token),
            _ => Err(EnvError::InvalidAction(format!(
                "direction must be one of u, d, l, r, got: {s:?}"
            ))),
        }
    }
}

/// The four kinds of piece placed on every board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Goal,
    Pit,
    Wall,
    Player,
}

impl PieceKind {
    /// Canonical placement order used by reset and by observation planes.
    pub const ALL: [PieceKind; 4] = [
        PieceKind::Goal,
        PieceKind::Pit,
        PieceKind::Wall,
        PieceKind::Player,
    ];

    /// Whether the piece stops both movement and reachability search.
    pub const fn is_obstacle(self) -> bool {
        matches!(self, PieceKind::Wall | PieceKind::Pit)
    }

    pub const fn symbol(self) -> Symbol {
        match self {
            PieceKind::Goal => Symbol::Goal,
            PieceKind::Pit => Symbol::Pit,
            PieceKind::Wall => Symbol::Wall,
            PieceKind::Player => Symbol::Player,
        }
    }
}

/// What a single rendered cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Symbol {
    #[default]
    Empty,
    Goal,
    /// The player shares the cell with another piece.
    Overlap,
    Pit,
    Player,
    Wall,
}

impl Symbol {
    pub const fn as_char(self) -> char {
        match self {
            Symbol::Empty => '.',
            Symbol::Goal => '+',
            Symbol::Overlap => 'X',
            Symbol::Pit => '-',
            Symbol::Player => 'P',
            Symbol::Wall => 'W',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
