use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::types::Position;

pub const MIN_SIZE: u8 = 5;
pub const MAX_SIZE: u8 = 8;
pub const DEFAULT_SIZE: u8 = 8;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KnightAlgorithm {
    #[default]
    Warnsdorff,
    Backtracking,
}

impl KnightAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Warnsdorff => "warnsdorff",
            Self::Backtracking => "backtracking",
        }
    }
}

/// Candidate order for the backtracking search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveOrdering {
    /// Offsets in their fixed order.
    Fixed,
    /// Fewest onward moves first.
    #[default]
    Warnsdorff,
}

/// Visited squares of a square board, at most 8x8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnightBoard {
    size: u8,
    visited: u64,
    move_numbers: [u8; 64],
}

impl KnightBoard {
    pub fn new(size: u8) -> Result<Self> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(PuzzleError::invalid(format!(
                "board size must be between {MIN_SIZE} and {MAX_SIZE}, got {size}"
            )));
        }
        Ok(Self {
            size,
            visited: 0,
            move_numbers: [0; 64],
        })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn square_count(&self) -> usize {
        self.size as usize * self.size as usize
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        let size = self.size as i32;
        (0..size).contains(&row) && (0..size).contains(&col)
    }

    pub fn is_visited(&self, pos: Position) -> bool {
        self.visited & self.bit(pos) != 0
    }

    pub fn visited_count(&self) -> usize {
        self.visited.count_ones() as usize
    }

    /// 1-based visiting order of `pos`, 0 when unvisited.
    pub fn move_number(&self, pos: Position) -> u8 {
        self.move_numbers[pos.index(self.size as usize)]
    }

    /// Row-major move numbers, 0 for unvisited squares.
    pub fn to_array(&self) -> Vec<u8> {
        self.move_numbers[..self.square_count()].to_vec()
    }

    /// Replays `tour`, numbering squares in visiting order.
    pub fn from_tour(tour: &Tour) -> Result<Self> {
        let mut board = Self::new(tour.size)?;
        let mut prev: Option<Position> = None;
        for pos in tour.squares() {
            let pos = board.checked(pos.row as i32, pos.col as i32)?;
            if board.is_visited(pos) {
                return Err(PuzzleError::illegal(format!("{pos:?} is visited twice")));
            }
            if let Some(prev) = prev
                && !is_knight_move(prev, pos)
            {
                return Err(PuzzleError::illegal(format!(
                    "{prev:?} to {pos:?} is not a knight move"
                )));
            }
            board.visit(pos);
            prev = Some(pos);
        }
        Ok(board)
    }

    fn visit(&mut self, pos: Position) {
        self.visited |= self.bit(pos);
        self.move_numbers[pos.index(self.size as usize)] = self.visited_count() as u8;
    }

    fn unvisit(&mut self, pos: Position) {
        self.visited &= !self.bit(pos);
        self.move_numbers[pos.index(self.size as usize)] = 0;
    }

    fn bit(&self, pos: Position) -> u64 {
        1u64 << pos.index(self.size as usize)
    }

    /// Unvisited knight moves from `pos`, in offset order.
    pub fn moves_from(&self, pos: Position) -> Vec<Position> {
        KNIGHT_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| {
                let row = pos.row as i32 + dr;
                let col = pos.col as i32 + dc;
                self.contains(row, col)
                    .then(|| Position::new(row as u8, col as u8))
            })
            .filter(|&next| !self.is_visited(next))
            .collect()
    }

    pub fn onward_degree(&self, pos: Position) -> usize {
        self.moves_from(pos).len()
    }

    fn checked(&self, row: i32, col: i32) -> Result<Position> {
        if !self.contains(row, col) {
            return Err(PuzzleError::OutOfBounds { row, col });
        }
        Ok(Position::new(row as u8, col as u8))
    }
}

pub fn is_knight_move(from: Position, to: Position) -> bool {
    let dr = (from.row as i32 - to.row as i32).abs();
    let dc = (from.col as i32 - to.col as i32).abs();
    (dr == 1 && dc == 2) || (dr == 2 && dc == 1)
}

/// A knight path: the start square followed by every square moved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub size: u8,
    pub start: Position,
    pub moves: Vec<Position>,
}

impl Tour {
    pub fn squares(&self) -> impl Iterator<Item = Position> + '_ {
        std::iter::once(self.start).chain(self.moves.iter().copied())
    }

    pub fn is_complete(&self) -> bool {
        self.moves.len() + 1 == self.size as usize * self.size as usize
    }
}

/// Every square at most once, consecutive squares a knight move apart.
/// Complete tours additionally cover the whole board.
pub fn is_valid_path(tour: &Tour) -> bool {
    KnightBoard::from_tour(tour).is_ok()
}

pub fn is_valid_tour(tour: &Tour) -> bool {
    tour.is_complete() && is_valid_path(tour)
}

/// Greedy tour. May stop short of a full tour when it runs out of moves.
pub fn solve_warnsdorff(size: u8, start: Position) -> Result<Tour> {
    let mut board = KnightBoard::new(size)?;
    let start = board.checked(start.row as i32, start.col as i32)?;
    board.visit(start);

    let mut current = start;
    let mut moves = Vec::with_capacity(board.square_count() - 1);
    while moves.len() + 1 < board.square_count() {
        let next = board
            .moves_from(current)
            .into_iter()
            .min_by_key(|&candidate| board.onward_degree(candidate));
        let Some(next) = next else {
            log::debug!(
                "warnsdorff stuck after {} squares from {start:?}",
                board.visited_count()
            );
            break;
        };
        board.visit(next);
        moves.push(next);
        current = next;
    }

    Ok(Tour { size, start, moves })
}

struct Backtracker {
    board: KnightBoard,
    ordering: MoveOrdering,
    path: Vec<Position>,
    nodes: u64,
    node_budget: u64,
}

impl Backtracker {
    fn search(&mut self, current: Position) -> Result<bool> {
        if self.board.visited_count() == self.board.square_count() {
            return Ok(true);
        }

        let mut candidates = self.board.moves_from(current);
        if self.ordering == MoveOrdering::Warnsdorff {
            // Stable sort keeps offset order between equal degrees.
            candidates.sort_by_key(|&next| self.board.onward_degree(next));
        }

        for next in candidates {
            self.nodes += 1;
            if self.nodes > self.node_budget {
                return Err(PuzzleError::SearchBudgetExceeded {
                    nodes: self.node_budget,
                });
            }

            self.board.visit(next);
            self.path.push(next);
            if self.search(next)? {
                return Ok(true);
            }
            self.board.unvisit(next);
            self.path.pop();
        }

        Ok(false)
    }
}

/// Exhaustive depth-first search bounded by `node_budget` placements.
pub fn solve_backtracking(
    size: u8,
    start: Position,
    ordering: MoveOrdering,
    node_budget: u64,
) -> Result<Tour> {
    let mut board = KnightBoard::new(size)?;
    let start = board.checked(start.row as i32, start.col as i32)?;
    board.visit(start);

    let mut search = Backtracker {
        board,
        ordering,
        path: Vec::with_capacity(board.square_count()),
        nodes: 0,
        node_budget,
    };

    let found = search.search(start)?;
    log::debug!("backtracking from {start:?} explored {} nodes", search.nodes);
    if !found {
        return Err(PuzzleError::NoSolution);
    }

    Ok(Tour {
        size,
        start,
        moves: search.path,
    })
}

/// Interactive tour: pick a start square, then hop between unvisited squares.
#[derive(Debug, Clone)]
pub struct TourGame {
    board: KnightBoard,
    current: Option<Position>,
    history: Vec<Position>,
}

impl TourGame {
    pub fn new(size: u8) -> Result<Self> {
        Ok(Self {
            board: KnightBoard::new(size)?,
            current: None,
            history: Vec::new(),
        })
    }

    pub fn board(&self) -> &KnightBoard {
        &self.board
    }

    pub fn current(&self) -> Option<Position> {
        self.current
    }

    pub fn history(&self) -> &[Position] {
        &self.history
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn start(&mut self, row: i32, col: i32) -> Result<()> {
        if self.current.is_some() {
            return Err(PuzzleError::illegal("tour has already started"));
        }
        let pos = self.board.checked(row, col)?;
        self.board.visit(pos);
        self.current = Some(pos);
        self.history.push(pos);
        Ok(())
    }

    pub fn make_move(&mut self, row: i32, col: i32) -> Result<()> {
        let current = self
            .current
            .ok_or_else(|| PuzzleError::illegal("tour has not started"))?;
        if self.is_complete() {
            return Err(PuzzleError::GameOver);
        }

        let pos = self.board.checked(row, col)?;
        if self.board.is_visited(pos) {
            return Err(PuzzleError::illegal(format!(
                "square ({row}, {col}) was already visited"
            )));
        }
        if !is_knight_move(current, pos) {
            return Err(PuzzleError::illegal(format!(
                "({row}, {col}) is not a knight move away"
            )));
        }

        self.board.visit(pos);
        self.current = Some(pos);
        self.history.push(pos);
        log::trace!("knight moved to {pos:?} ({} visited)", self.history.len());
        Ok(())
    }

    pub fn possible_moves(&self) -> Vec<Position> {
        self.current
            .map(|pos| self.board.moves_from(pos))
            .unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        self.board.visited_count() == self.board.square_count()
    }

    /// Started, not complete, and no move left.
    pub fn is_stuck(&self) -> bool {
        self.current.is_some() && !self.is_complete() && self.possible_moves().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: u64 = 5_000_000;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn warnsdorff_completes_from_corner() {
        let tour = solve_warnsdorff(8, pos(0, 0)).unwrap();

        assert!(tour.is_complete());
        assert!(is_valid_tour(&tour));
    }

    #[test]
    fn warnsdorff_output_is_always_a_valid_path() {
        for size in MIN_SIZE..=MAX_SIZE {
            for row in 0..size {
                for col in 0..size {
                    let tour = solve_warnsdorff(size, pos(row, col)).unwrap();
                    assert!(is_valid_path(&tour), "{size}x{size} from ({row}, {col})");
                }
            }
        }
    }

    #[test]
    fn backtracking_visits_every_square_once() {
        crate::init_test_logger();
        for start in [pos(0, 0), pos(3, 3), pos(0, 1), pos(7, 7)] {
            let tour = solve_backtracking(8, start, MoveOrdering::Warnsdorff, BUDGET).unwrap();

            assert!(is_valid_tour(&tour), "from {start:?}");
            let mut seen: Vec<_> = tour.squares().map(|p| p.index(8)).collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), 64);
        }
    }

    #[test]
    fn fixed_order_backtracking_solves_small_board() {
        let tour = solve_backtracking(5, pos(0, 0), MoveOrdering::Fixed, BUDGET).unwrap();

        assert_eq!(tour.moves.len(), 24);
        assert!(is_valid_tour(&tour));
    }

    #[test]
    fn odd_board_from_wrong_colour_has_no_tour() {
        let err = solve_backtracking(5, pos(0, 1), MoveOrdering::Fixed, BUDGET).unwrap_err();

        assert_eq!(err, PuzzleError::NoSolution);
    }

    #[test]
    fn backtracking_respects_node_budget() {
        let err = solve_backtracking(7, pos(0, 1), MoveOrdering::Warnsdorff, 1_000).unwrap_err();

        assert_eq!(err, PuzzleError::SearchBudgetExceeded { nodes: 1_000 });
    }

    #[test]
    fn invalid_board_size_and_start_are_rejected() {
        assert!(solve_warnsdorff(4, pos(0, 0)).is_err());
        assert!(solve_warnsdorff(9, pos(0, 0)).is_err());
        assert!(matches!(
            solve_warnsdorff(8, pos(8, 0)),
            Err(PuzzleError::OutOfBounds { row: 8, col: 0 })
        ));
    }

    #[test]
    fn game_accepts_l_shaped_moves_only() {
        let mut game = TourGame::new(8).unwrap();
        game.start(0, 0).unwrap();

        assert_eq!(game.board().move_number(pos(0, 0)), 1);
        game.make_move(2, 1).unwrap();
        assert_eq!(game.current(), Some(pos(2, 1)));
        assert_eq!(game.board().move_number(pos(2, 1)), 2);
        assert_eq!(game.move_count(), 2);

        assert!(game.make_move(3, 2).is_err());
        assert!(game.make_move(2, 3).is_err());
        assert!(game.make_move(0, 0).is_err());
        assert!(game.make_move(8, 8).is_err());
        assert!(game.make_move(-1, -1).is_err());
        assert_eq!(game.move_count(), 2);
    }

    #[test]
    fn game_cannot_start_twice_or_move_before_start() {
        let mut game = TourGame::new(8).unwrap();

        assert!(game.make_move(2, 1).is_err());
        game.start(4, 4).unwrap();
        assert!(game.start(0, 0).is_err());
        assert_eq!(game.possible_moves().len(), 8);
    }

    #[test]
    fn replaying_a_solver_tour_completes_the_game() {
        let tour = solve_warnsdorff(8, pos(0, 0)).unwrap();
        let mut game = TourGame::new(8).unwrap();
        game.start(0, 0).unwrap();

        for step in &tour.moves {
            game.make_move(step.row as i32, step.col as i32).unwrap();
        }

        assert!(game.is_complete());
        assert!(!game.is_stuck());
        assert_eq!(game.board().to_array().iter().max(), Some(&64));
    }

    #[test]
    fn possible_moves_skip_visited_and_off_board_squares() {
        let mut game = TourGame::new(5).unwrap();
        game.start(0, 0).unwrap();
        game.make_move(2, 1).unwrap();
        game.make_move(0, 2).unwrap();
        game.make_move(1, 0).unwrap();

        // (1, 0) only reaches (0, 2), (2, 2) and (3, 1).
        assert!(!game.is_stuck());
        assert_eq!(game.possible_moves(), vec![pos(3, 1), pos(2, 2)]);
    }

    #[test]
    fn game_reports_stuck_at_dead_end() {
        let mut game = TourGame::new(5).unwrap();
        game.start(0, 0).unwrap();
        for (row, col) in [(2, 1), (1, 3), (3, 2), (4, 0)] {
            game.make_move(row, col).unwrap();
        }

        // (4, 0) only reaches (2, 1) and (3, 2).
        assert!(game.possible_moves().is_empty());
        assert!(game.is_stuck());
        assert!(!game.is_complete());
        assert!(game.make_move(2, 1).is_err());
        assert_eq!(game.move_count(), 5);
    }

    #[test]
    fn from_tour_numbers_squares_and_rejects_broken_paths() {
        let tour = Tour {
            size: 5,
            start: pos(0, 0),
            moves: vec![pos(2, 1), pos(4, 2)],
        };
        let board = KnightBoard::from_tour(&tour).unwrap();
        assert_eq!(board.move_number(pos(0, 0)), 1);
        assert_eq!(board.move_number(pos(4, 2)), 3);
        assert_eq!(board.move_number(pos(1, 1)), 0);

        let broken = Tour {
            moves: vec![pos(1, 1)],
            ..tour.clone()
        };
        assert!(matches!(KnightBoard::from_tour(&broken), Err(PuzzleError::IllegalMove(_))));

        let revisit = Tour {
            moves: vec![pos(2, 1), pos(0, 0)],
            ..tour
        };
        assert!(!is_valid_path(&revisit));
    }
}
