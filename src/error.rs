use thiserror::Error;

/// Errors returned by game state transitions and solver runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("row/col out of range: ({row}, {col})")]
    OutOfBounds { row: i32, col: i32 },
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: u8, col: u8 },
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("game is already over")]
    GameOver,
    #[error("it is not {0}'s turn")]
    WrongTurn(&'static str),
    #[error("no legal move available")]
    NoLegalMove,
    #[error("search gave up after {nodes} nodes")]
    SearchBudgetExceeded { nodes: u64 },
    #[error("no solution exists")]
    NoSolution,
}

pub type Result<T> = std::result::Result<T, PuzzleError>;

impl PuzzleError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        Self::IllegalMove(msg.into())
    }
}
