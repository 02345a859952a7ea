use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};

pub const BOARD_WIDTH: usize = 5;
pub const NUM_CELLS: usize = BOARD_WIDTH * BOARD_WIDTH;
pub const CENTER: usize = 12;
const FULL_MASK: u32 = (1 << NUM_CELLS) - 1;

/// Five rows, five columns and the two long diagonals.
pub const WIN_LINES: [u32; 12] = build_win_lines();

const fn build_win_lines() -> [u32; 12] {
    let mut lines = [0u32; 12];
    let mut i = 0;
    while i < BOARD_WIDTH {
        let mut j = 0;
        while j < BOARD_WIDTH {
            lines[i] |= 1 << (i * BOARD_WIDTH + j);
            lines[BOARD_WIDTH + i] |= 1 << (j * BOARD_WIDTH + i);
            j += 1;
        }
        lines[10] |= 1 << (i * BOARD_WIDTH + i);
        lines[11] |= 1 << (i * BOARD_WIDTH + (BOARD_WIDTH - 1 - i));
        i += 1;
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }
}

/// 5x5 board as two bitboards, bit `row * 5 + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    x: u32,
    o: u32,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses 25 cells of `X`, `O`, or `.`/`-`/`_` for empty. Whitespace is ignored.
    pub fn parse(cells: &str) -> Result<Self> {
        let mut board = Self::new();
        let mut idx = 0;
        for ch in cells.chars().filter(|c| !c.is_whitespace()) {
            if idx >= NUM_CELLS {
                return Err(PuzzleError::invalid("board has more than 25 cells"));
            }
            match ch {
                'X' | 'x' => board.x |= 1 << idx,
                'O' | 'o' => board.o |= 1 << idx,
                '.' | '-' | '_' => {}
                other => {
                    return Err(PuzzleError::invalid(format!("unexpected cell {other:?}")));
                }
            }
            idx += 1;
        }
        if idx != NUM_CELLS {
            return Err(PuzzleError::invalid(format!(
                "board must have 25 cells, got {idx}"
            )));
        }
        Ok(board)
    }

    pub fn cell(&self, idx: usize) -> Option<Player> {
        if idx >= NUM_CELLS {
            return None;
        }
        let bit = 1u32 << idx;
        if self.x & bit != 0 {
            Some(Player::X)
        } else if self.o & bit != 0 {
            Some(Player::O)
        } else {
            None
        }
    }

    pub fn is_empty(&self, idx: usize) -> bool {
        idx < NUM_CELLS && self.empty_mask() & (1 << idx) != 0
    }

    pub fn stones(&self, player: Player) -> u32 {
        match player {
            Player::X => self.x,
            Player::O => self.o,
        }
    }

    pub fn empty_mask(&self) -> u32 {
        FULL_MASK & !(self.x | self.o)
    }

    /// Empty cells in ascending index order.
    pub fn empty_cells(&self) -> Vec<usize> {
        let mut mask = self.empty_mask();
        let mut out = Vec::with_capacity(mask.count_ones() as usize);
        while mask != 0 {
            out.push(mask.trailing_zeros() as usize);
            mask &= mask - 1;
        }
        out
    }

    pub fn empty_count(&self) -> u32 {
        self.empty_mask().count_ones()
    }

    pub fn place(&mut self, idx: usize, player: Player) -> Result<()> {
        if idx >= NUM_CELLS {
            return Err(PuzzleError::OutOfBounds {
                row: (idx / BOARD_WIDTH) as i32,
                col: (idx % BOARD_WIDTH) as i32,
            });
        }
        if !self.is_empty(idx) {
            return Err(PuzzleError::Occupied {
                row: (idx / BOARD_WIDTH) as u8,
                col: (idx % BOARD_WIDTH) as u8,
            });
        }
        *self = self.with(idx, player);
        Ok(())
    }

    /// Copy of the board with `player` on `idx`. Caller checks the cell is empty.
    pub fn with(&self, idx: usize, player: Player) -> Self {
        let bit = 1u32 << idx;
        match player {
            Player::X => Self {
                x: self.x | bit,
                o: self.o,
            },
            Player::O => Self {
                x: self.x,
                o: self.o | bit,
            },
        }
    }

    pub fn has_won(&self, player: Player) -> bool {
        let stones = self.stones(player);
        WIN_LINES.iter().any(|&line| stones & line == line)
    }

    pub fn winner(&self) -> Option<Player> {
        [Player::X, Player::O]
            .into_iter()
            .find(|&player| self.has_won(player))
    }

    pub fn is_full(&self) -> bool {
        self.empty_mask() == 0
    }

    /// Empty cells that would complete a line for `player`, ascending.
    pub fn winning_cells(&self, player: Player) -> Vec<usize> {
        let stones = self.stones(player);
        let empty = self.empty_mask();
        let mut mask = 0u32;
        for line in WIN_LINES {
            let missing = line & !stones;
            if missing.count_ones() == 1 && missing & empty != 0 {
                mask |= missing;
            }
        }

        let mut out = Vec::new();
        while mask != 0 {
            out.push(mask.trailing_zeros() as usize);
            mask &= mask - 1;
        }
        out
    }

    /// Row-major cells where 0=empty, 1=X, 2=O.
    pub fn to_array(&self) -> [u8; NUM_CELLS] {
        let mut cells = [0u8; NUM_CELLS];
        for (idx, cell) in cells.iter_mut().enumerate() {
            *cell = match self.cell(idx) {
                None => 0,
                Some(Player::X) => 1,
                Some(Player::O) => 2,
            };
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_lines_cover_rows_columns_and_diagonals() {
        assert_eq!(WIN_LINES[0], 0b11111);
        assert_eq!(WIN_LINES[5], (1 << 0) | (1 << 5) | (1 << 10) | (1 << 15) | (1 << 20));
        assert_eq!(WIN_LINES[10], (1 << 0) | (1 << 6) | (1 << 12) | (1 << 18) | (1 << 24));
        assert_eq!(WIN_LINES[11], (1 << 4) | (1 << 8) | (1 << 12) | (1 << 16) | (1 << 20));
        assert!(WIN_LINES.iter().all(|line| line.count_ones() == 5));
    }

    #[test]
    fn parse_and_detect_row_win() {
        let board = Board::parse(
            "XXXXX
             OOOO.
             .....
             .....
             .....",
        )
        .unwrap();

        assert_eq!(board.winner(), Some(Player::X));
        assert!(!board.has_won(Player::O));
        assert_eq!(board.empty_count(), 16);
    }

    #[test]
    fn anti_diagonal_counts_as_win() {
        let mut board = Board::new();
        for idx in [4, 8, 12, 16, 20] {
            board.place(idx, Player::O).unwrap();
        }

        assert_eq!(board.winner(), Some(Player::O));
    }

    #[test]
    fn four_of_five_is_not_a_win_and_reports_completing_cell() {
        let board = Board::parse(
            "X....
             .X...
             .....
             ...X.
             ....X",
        )
        .unwrap();

        assert_eq!(board.winner(), None);
        assert_eq!(board.winning_cells(Player::X), vec![CENTER]);
        assert!(board.winning_cells(Player::O).is_empty());
    }

    #[test]
    fn place_rejects_occupied_and_out_of_range_cells() {
        let mut board = Board::new();
        board.place(0, Player::X).unwrap();

        assert_eq!(
            board.place(0, Player::O).unwrap_err(),
            PuzzleError::Occupied { row: 0, col: 0 }
        );
        assert!(board.place(NUM_CELLS, Player::O).is_err());
        assert_eq!(board.to_array()[0], 1);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(Board::parse("XO").is_err());
        assert!(Board::parse(&".".repeat(26)).is_err());
        assert!(Board::parse(&"?".repeat(25)).is_err());
    }
}
