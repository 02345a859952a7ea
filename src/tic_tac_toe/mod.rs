//! 5x5 tic-tac-toe where five in a row wins. The human plays X, the computer O.

pub mod board;
pub mod evaluate;
pub mod game;
pub mod search;
pub mod selector;

pub use board::{Board, Player};
pub use game::{GameInstance, GameState, MoveRecord, Outcome};
pub use search::{SearchProfile, SearchResult, Searcher};
pub use selector::{Algorithm, MoveSelector};
