use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{PuzzleError, Result};
use crate::types::Position;

pub const MAX_QUEENS: u8 = 16;
pub const CLASSIC_SIZE: u8 = 8;

/// All 92 solutions of the 8x8 board, in lexicographic order.
static CLASSIC_SOLUTIONS: Lazy<Vec<Solution>> = Lazy::new(|| enumerate(CLASSIC_SIZE));

/// `cols[row]` is the column of the queen in that row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Solution {
    pub cols: Vec<u8>,
}

impl Solution {
    pub fn size(&self) -> u8 {
        self.cols.len() as u8
    }

    pub fn positions(&self) -> Vec<Position> {
        self.cols
            .iter()
            .enumerate()
            .map(|(row, &col)| Position::new(row as u8, col))
            .collect()
    }

    /// Builds a solution from arbitrary placements, one queen per row required.
    pub fn from_positions(n: u8, queens: &[Position]) -> Option<Self> {
        if queens.len() != n as usize {
            return None;
        }
        let mut cols = vec![None; n as usize];
        for queen in queens {
            let slot = cols.get_mut(queen.row as usize)?;
            if slot.is_some() || queen.col >= n {
                return None;
            }
            *slot = Some(queen.col);
        }
        cols.into_iter()
            .collect::<Option<Vec<u8>>>()
            .map(|cols| Self { cols })
    }
}

fn attacks(a: Position, b: Position) -> bool {
    a.row == b.row
        || a.col == b.col
        || (a.row as i32 - b.row as i32).abs() == (a.col as i32 - b.col as i32).abs()
}

/// No queen in `others` shares a row, column or diagonal with `(row, col)`.
pub fn is_safe(row: u8, col: u8, others: &[Position]) -> bool {
    let pos = Position::new(row, col);
    others.iter().all(|&other| other == pos || !attacks(pos, other))
}

pub fn is_valid_solution(n: u8, queens: &[Position]) -> bool {
    if queens.len() != n as usize {
        return false;
    }
    queens.iter().enumerate().all(|(i, &a)| {
        a.row < n && a.col < n && queens[i + 1..].iter().all(|&b| !attacks(a, b))
    })
}

fn check_size(n: u8) -> Result<()> {
    if n == 0 || n > MAX_QUEENS {
        return Err(PuzzleError::invalid(format!(
            "board size must be between 1 and {MAX_QUEENS}, got {n}"
        )));
    }
    Ok(())
}

struct Placement {
    n: u8,
    cols: u32,
    // Indexed by row + col.
    rising: u32,
    // Indexed by row - col + n - 1.
    falling: u32,
    current: Vec<u8>,
}

impl Placement {
    fn new(n: u8) -> Self {
        Self {
            n,
            cols: 0,
            rising: 0,
            falling: 0,
            current: Vec::with_capacity(n as usize),
        }
    }

    fn masks(&self, row: u8, col: u8) -> (u32, u32, u32) {
        (
            1 << col,
            1 << (row + col),
            1 << (row + self.n - 1 - col),
        )
    }

    fn free(&self, row: u8, col: u8) -> bool {
        let (c, r, f) = self.masks(row, col);
        self.cols & c == 0 && self.rising & r == 0 && self.falling & f == 0
    }

    fn toggle(&mut self, row: u8, col: u8) {
        let (c, r, f) = self.masks(row, col);
        self.cols ^= c;
        self.rising ^= r;
        self.falling ^= f;
    }

    /// Visits every solution; `visit` returns `false` to stop early.
    fn search(&mut self, row: u8, visit: &mut impl FnMut(&[u8]) -> bool) -> bool {
        if row == self.n {
            return visit(&self.current);
        }
        for col in 0..self.n {
            if !self.free(row, col) {
                continue;
            }
            self.toggle(row, col);
            self.current.push(col);
            let keep_going = self.search(row + 1, visit);
            self.current.pop();
            self.toggle(row, col);
            if !keep_going {
                return false;
            }
        }
        true
    }
}

fn enumerate(n: u8) -> Vec<Solution> {
    let mut solutions = Vec::new();
    Placement::new(n).search(0, &mut |cols| {
        solutions.push(Solution {
            cols: cols.to_vec(),
        });
        true
    });
    solutions
}

/// Every solution for an `n`x`n` board, in lexicographic column order.
pub fn solve_all(n: u8) -> Result<Vec<Solution>> {
    check_size(n)?;
    if n == CLASSIC_SIZE {
        return Ok(CLASSIC_SOLUTIONS.clone());
    }
    let solutions = enumerate(n);
    log::debug!("{n}-queens has {} solutions", solutions.len());
    Ok(solutions)
}

pub fn first_solution(n: u8) -> Result<Option<Solution>> {
    check_size(n)?;
    let mut first = None;
    Placement::new(n).search(0, &mut |cols| {
        first = Some(Solution {
            cols: cols.to_vec(),
        });
        false
    });
    Ok(first)
}

/// 1-based position of an 8x8 solution in the lexicographic ordering.
pub fn solution_number(solution: &Solution) -> Option<usize> {
    if solution.size() != CLASSIC_SIZE {
        return None;
    }
    CLASSIC_SOLUTIONS
        .binary_search(solution)
        .ok()
        .map(|idx| idx + 1)
}

/// Outcome of submitting a full board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub solution_number: usize,
    pub already_found: bool,
}

/// Interactive 8x8 board: the player places queens until all eight are safe.
#[derive(Debug, Clone, Default)]
pub struct QueensGame {
    queens: Vec<Position>,
    found: Vec<usize>,
}

impl QueensGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queens(&self) -> &[Position] {
        &self.queens
    }

    /// Removes the queen at `(row, col)` or places a new one there.
    /// Returns `true` when a queen now occupies the square.
    pub fn toggle(&mut self, row: u8, col: u8) -> Result<bool> {
        if row >= CLASSIC_SIZE || col >= CLASSIC_SIZE {
            return Err(PuzzleError::OutOfBounds {
                row: row as i32,
                col: col as i32,
            });
        }

        let pos = Position::new(row, col);
        if let Some(idx) = self.queens.iter().position(|&q| q == pos) {
            self.queens.remove(idx);
            return Ok(false);
        }
        if self.queens.len() == CLASSIC_SIZE as usize {
            return Err(PuzzleError::illegal("all queens are already placed"));
        }
        if !is_safe(row, col, &self.queens) {
            return Err(PuzzleError::illegal(format!(
                "a queen at ({row}, {col}) would be under attack"
            )));
        }

        self.queens.push(pos);
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.queens.clear();
    }

    pub fn is_complete(&self) -> bool {
        is_valid_solution(CLASSIC_SIZE, &self.queens)
    }

    /// Records the current board and reports which of the 92 solutions it is.
    pub fn submit(&mut self) -> Result<Submission> {
        if self.queens.len() != CLASSIC_SIZE as usize {
            return Err(PuzzleError::illegal(format!(
                "place all {CLASSIC_SIZE} queens before submitting"
            )));
        }
        let number = Solution::from_positions(CLASSIC_SIZE, &self.queens)
            .filter(|_| self.is_complete())
            .and_then(|solution| solution_number(&solution))
            .ok_or_else(|| PuzzleError::illegal("queens are attacking each other"))?;

        let already_found = self.found.contains(&number);
        if !already_found {
            self.found.push(number);
        }
        Ok(Submission {
            solution_number: number,
            already_found,
        })
    }

    pub fn found_solutions(&self) -> &[usize] {
        &self.found
    }
}
