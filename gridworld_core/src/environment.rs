use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::{
    Direction, PieceKind, Position, Symbol,
    board::{Board, Observation},
    config::{GridConfig, PIECE_COUNT},
    error::{BoardError, ConfigError, EnvError},
    map::Grid,
    solver,
};

/// Reward for stepping onto the goal.
pub const GOAL_REWARD: i32 = 10;
/// Reward for stepping into the pit.
pub const PIT_REWARD: i32 = -10;
/// Cost of every other move, including bumps into the wall or the edge.
pub const STEP_PENALTY: i32 = -1;

/// Generic episodic environment interface.
pub trait Environment {
    type Observation;
    type Action;
    type Info;

    /// Starts a new episode. A seed reseeds the environment's random source
    /// first, so the same seed always yields the same initial board.
    fn reset(&mut self, seed: Option<u64>) -> (Self::Observation, Self::Info);

    /// Applies one action to the running episode.
    fn step(
        &mut self,
        action: Self::Action,
    ) -> Result<Step<Self::Observation, Self::Info>, EnvError>;

    /// Every action the environment accepts, in canonical index order.
    fn action_space(&self) -> &[Self::Action];

    /// Observation shape as `(planes, height, width)`.
    fn observation_space(&self) -> (usize, usize, usize);
}

/// Result of a single [`Environment::step`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step<O, I> {
    pub observation: O,
    pub reward: i32,
    pub terminated: bool,
    /// There is no step limit, so this is always `false`.
    pub truncated: bool,
    pub info: I,
}

/// Auxiliary step information. Carries nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepInfo {}

/// Where the environment is in its episode lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeStatus {
    /// Constructed, no board yet.
    NotStarted,
    Active,
    Terminated,
}

/// How a move was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Target was off the board or the wall; the player stayed put.
    Blocked,
    Moved,
    ReachedGoal,
    FellInPit,
}

impl MoveOutcome {
    pub const fn reward(self) -> i32 {
        match self {
            MoveOutcome::Blocked | MoveOutcome::Moved => STEP_PENALTY,
            MoveOutcome::ReachedGoal => GOAL_REWARD,
            MoveOutcome::FellInPit => PIT_REWARD,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, MoveOutcome::ReachedGoal | MoveOutcome::FellInPit)
    }
}

/// A grid world with one player, one goal, one pit and one wall.
///
/// Every board produced by [`reset`](Environment::reset) is solvable: the goal
/// can be reached from the player's start without crossing the wall or the
/// pit. The environment owns its random source; nothing is global.
#[derive(Debug)]
pub struct GridWorld {
    width: usize,
    height: usize,
    rng: StdRng,
    board: Option<Board>,
    status: EpisodeStatus,
    steps: usize,
    episode_return: i32,
    last_outcome: Option<MoveOutcome>,
}

impl GridWorld {
    /// Creates an environment seeded from the operating system.
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        Self::from_config(&GridConfig::new(width, height))
    }

    pub fn square(size: usize) -> Result<Self, ConfigError> {
        Self::from_config(&GridConfig::square(size))
    }

    pub fn from_config(config: &GridConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config.width, config.height, rng)
    }

    /// Creates an environment drawing from the given random source.
    pub fn with_rng(width: usize, height: usize, rng: StdRng) -> Result<Self, ConfigError> {
        GridConfig::new(width, height).validate()?;
        Ok(GridWorld {
            width,
            height,
            rng,
            board: None,
            status: EpisodeStatus::NotStarted,
            steps: 0,
            episode_return: 0,
            last_outcome: None,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    /// The current board, once an episode has started.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Steps taken in the current episode.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Sum of rewards in the current episode.
    pub fn episode_return(&self) -> i32 {
        self.episode_return
    }

    pub fn last_outcome(&self) -> Option<MoveOutcome> {
        self.last_outcome
    }

    /// Renders the current board.
    pub fn render(&self) -> Result<Grid<Symbol>, EnvError> {
        self.board
            .as_ref()
            .map(Board::render)
            .ok_or(EnvError::NotReset)
    }

    /// Installs a hand-built board and starts an episode on it.
    ///
    /// The board is not checked for solvability.
    pub fn load_board(&mut self, board: Board) -> Result<Observation, EnvError> {
        if board.width() != self.width || board.height() != self.height {
            return Err(BoardError::SizeMismatch {
                width: self.width,
                height: self.height,
                found_width: board.width(),
                found_height: board.height(),
            }
            .into());
        }
        let observation = board.observe();
        self.start_episode(board);
        Ok(observation)
    }

    fn start_episode(&mut self, board: Board) {
        self.board = Some(board);
        self.status = EpisodeStatus::Active;
        self.steps = 0;
        self.episode_return = 0;
        self.last_outcome = None;
    }

    /// Draws four distinct cells by rejection sampling and assigns them to
    /// goal, pit, wall and player, in that order.
    fn sample_board(&mut self) -> Board {
        let mut cells: Vec<Position> = Vec::with_capacity(PIECE_COUNT);
        while cells.len() < PIECE_COUNT {
            let candidate = Position {
                x: self.rng.random_range(0..self.width),
                y: self.rng.random_range(0..self.height),
            };
            if !cells.contains(&candidate) {
                cells.push(candidate);
            }
        }
        let pieces = HashMap::from([
            (cells[0], PieceKind::Goal),
            (cells[1], PieceKind::Pit),
            (cells[2], PieceKind::Wall),
        ]);
        Board::from_parts(self.width, self.height, cells[3], pieces)
    }
}

/// Moves the player on `board` and reports what happened.
///
/// The wall is impassable, like the board edge.
fn resolve_move(board: &mut Board, direction: Direction) -> MoveOutcome {
    let target = board
        .player()
        .offset(direction)
        .filter(|target| board.is_in_bounds(*target));
    let Some(target) = target else {
        return MoveOutcome::Blocked;
    };

    let outcome = match board.piece_at(target) {
        Some(PieceKind::Wall) => return MoveOutcome::Blocked,
        Some(PieceKind::Goal) => MoveOutcome::ReachedGoal,
        Some(PieceKind::Pit) => MoveOutcome::FellInPit,
        Some(PieceKind::Player) | None => MoveOutcome::Moved,
    };
    board.set_player(target);
    outcome
}

impl Environment for GridWorld {
    type Observation = Observation;
    type Action = Direction;
    type Info = StepInfo;

    /// Samples boards until one passes the reachability check.
    ///
    /// There is no attempt cap. Any board of at least four cells has solvable
    /// placements (e.g. goal next to player), so the loop ends with
    /// probability one; on small boards it usually takes a handful of tries.
    fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let mut attempts = 0usize;
        let board = loop {
            attempts += 1;
            let candidate = self.sample_board();
            if solver::is_solvable(&candidate) {
                break candidate;
            }
        };
        debug!(
            attempts,
            width = self.width,
            height = self.height,
            "sampled solvable board"
        );

        let observation = board.observe();
        self.start_episode(board);
        (observation, StepInfo::default())
    }

    /// Moves the player one cell.
    ///
    /// Only valid while the episode is active: stepping before the first
    /// reset or after termination is an error and leaves the state untouched.
    fn step(&mut self, direction: Direction) -> Result<Step<Observation, StepInfo>, EnvError> {
        match self.status {
            EpisodeStatus::NotStarted => return Err(EnvError::NotReset),
            EpisodeStatus::Terminated => return Err(EnvError::EpisodeTerminated),
            EpisodeStatus::Active => {}
        }
        let board = self.board.as_mut().ok_or(EnvError::NotReset)?;

        let outcome = resolve_move(board, direction);
        let observation = board.observe();
        let reward = outcome.reward();
        let terminated = outcome.is_terminal();

        self.steps += 1;
        self.episode_return += reward;
        self.last_outcome = Some(outcome);
        trace!(?direction, ?outcome, reward, "step");

        if terminated {
            self.status = EpisodeStatus::Terminated;
            info!(
                steps = self.steps,
                episode_return = self.episode_return,
                ?outcome,
                "episode terminated"
            );
        }

        Ok(Step {
            observation,
            reward,
            terminated,
            truncated: false,
            info: StepInfo::default(),
        })
    }

    fn action_space(&self) -> &[Direction] {
        &Direction::ALL
    }

    fn observation_space(&self) -> (usize, usize, usize) {
        (PieceKind::ALL.len(), self.height, self.width)
    }
}
