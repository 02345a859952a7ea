use serde::Serialize;

use super::board::{BOARD_WIDTH, Board, NUM_CELLS, Player};
use super::search::SearchProfile;
use super::selector::{Algorithm, MoveSelector, selector_for};
use crate::error::{PuzzleError, Result};
use crate::timing::timed;
use crate::types::Position;

pub const HUMAN: Player = Player::X;
pub const COMPUTER: Player = Player::O;

/// One entry of the move list posted with the game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub row: u8,
    pub col: u8,
    pub player: Player,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Snapshot returned to the page after every action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Vec<u8>,
    pub current_player: Player,
    pub is_game_over: bool,
    pub winner: Option<Player>,
    pub is_draw: bool,
    /// Result from the human player's side once the game is over.
    pub outcome: Option<Outcome>,
    pub last_move: Option<MoveRecord>,
}

pub struct GameInstance {
    board: Board,
    pub current_player: Player,
    pub is_game_over: bool,
    history: Vec<MoveRecord>,
    selector: Box<dyn MoveSelector>,
}

impl GameInstance {
    pub fn new(selector: Box<dyn MoveSelector>) -> Self {
        Self {
            board: Board::new(),
            current_player: HUMAN,
            is_game_over: false,
            history: Vec::new(),
            selector,
        }
    }

    pub fn with_algorithm(algorithm: Algorithm, seed: u64) -> Self {
        Self::new(selector_for(
            algorithm,
            seed,
            SearchProfile::minimax(),
            SearchProfile::alpha_beta(),
        ))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn algorithm(&self) -> Algorithm {
        self.selector.algorithm()
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn place(&mut self, row: u8, col: u8) -> Result<()> {
        if self.is_game_over {
            return Err(PuzzleError::GameOver);
        }
        if self.current_player != HUMAN {
            return Err(PuzzleError::WrongTurn("the player"));
        }

        let pos = row_col_to_pos(row, col)?;
        self.apply_move(pos, HUMAN, None, None)
    }

    pub fn do_ai_move(&mut self) -> Result<Position> {
        if self.is_game_over {
            return Err(PuzzleError::GameOver);
        }
        if self.current_player != COMPUTER {
            return Err(PuzzleError::WrongTurn("the computer"));
        }

        let algorithm = self.selector.algorithm();
        let board = self.board;
        let selector = &mut self.selector;
        let run = timed(algorithm.name(), || selector.select_move(&board, COMPUTER));
        let selected = run.output.ok_or(PuzzleError::NoLegalMove)?;
        if !self.board.is_empty(selected) {
            return Err(PuzzleError::illegal(format!(
                "{} selected an occupied or out-of-range cell {selected}",
                algorithm.name()
            )));
        }

        self.apply_move(selected, COMPUTER, Some(algorithm.name()), Some(run.elapsed_ms))?;
        Ok(Position::from_index(selected, BOARD_WIDTH))
    }

    pub fn winner(&self) -> Option<Player> {
        self.board.winner()
    }

    pub fn is_draw(&self) -> bool {
        self.winner().is_none() && self.board.is_full()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.winner() {
            Some(HUMAN) => Some(Outcome::Win),
            Some(_) => Some(Outcome::Loss),
            None if self.board.is_full() => Some(Outcome::Draw),
            None => None,
        }
    }

    pub fn to_game_state(&self) -> GameState {
        GameState {
            board: self.board.to_array().to_vec(),
            current_player: self.current_player,
            is_game_over: self.is_game_over,
            winner: self.winner(),
            is_draw: self.is_draw(),
            outcome: self.outcome(),
            last_move: self.history.last().cloned(),
        }
    }

    fn apply_move(
        &mut self,
        pos: usize,
        player: Player,
        algorithm: Option<&'static str>,
        time_taken_ms: Option<f64>,
    ) -> Result<()> {
        self.board.place(pos, player)?;

        let Position { row, col } = Position::from_index(pos, BOARD_WIDTH);
        self.history.push(MoveRecord {
            row,
            col,
            player,
            algorithm,
            time_taken_ms,
        });
        self.current_player = player.opponent();

        if self.board.has_won(player) || self.board.is_full() {
            self.is_game_over = true;
            log::debug!("game over after {} moves: {:?}", self.history.len(), self.outcome());
        }
        Ok(())
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board, current_player: Player) {
        self.board = board;
        self.current_player = current_player;
        self.is_game_over = false;
        self.history.clear();
    }
}

fn row_col_to_pos(row: u8, col: u8) -> Result<usize> {
    if row as usize >= BOARD_WIDTH || col as usize >= BOARD_WIDTH {
        return Err(PuzzleError::OutOfBounds {
            row: row as i32,
            col: col as i32,
        });
    }
    let pos = row as usize * BOARD_WIDTH + col as usize;
    debug_assert!(pos < NUM_CELLS);
    Ok(pos)
}
