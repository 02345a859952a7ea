//! Browser bindings. Options come in as plain JS objects and results go back
//! as plain JS objects with camelCase fields.

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use crate::config::{HanoiOptions, KnightOptions, QueensOptions, TicTacToeOptions, TspOptions};
use crate::hanoi::{self, HanoiMove, Towers};
use crate::knights_tour::{self, KnightAlgorithm, Tour, TourGame};
use crate::queens::{self, QueensGame, Solution, Submission};
use crate::tic_tac_toe::selector::selector_for;
use crate::tic_tac_toe::{GameInstance, GameState};
use crate::timing::{Timed, timed};
use crate::tsp::{GeneticParams, Route, RouteComparison, TspAlgorithm, TspGame};
use crate::types::Position;

#[wasm_bindgen(js_name = "wasmReady")]
pub fn wasm_ready() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HanoiReport {
    pub disks: u8,
    pub pegs: u8,
    pub moves: Vec<HanoiMove>,
    pub move_count: usize,
    pub min_moves_three_pegs: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnightReport {
    pub tour: Tour,
    pub complete: bool,
    /// Move number per square, row-major; 0 for unvisited.
    pub board: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueensReport {
    pub size: u8,
    pub count: usize,
    pub solutions: Vec<Solution>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TspReport {
    pub home: usize,
    pub selected: Vec<usize>,
    pub distances: Vec<Vec<u32>>,
    pub route: Route,
    pub route_label: String,
}

pub fn solve_hanoi(options: &HanoiOptions) -> crate::Result<Timed<HanoiReport>> {
    options.validate()?;
    let run = timed(options.algorithm.name(), || hanoi::solve(options.algorithm, options.disks));
    Ok(run.transpose()?.map(|moves| HanoiReport {
        disks: options.disks,
        pegs: options.algorithm.pegs(),
        move_count: moves.len(),
        min_moves_three_pegs: hanoi::min_moves_three_pegs(options.disks),
        moves,
    }))
}

pub fn solve_knights_tour(options: &KnightOptions) -> crate::Result<Timed<KnightReport>> {
    options.validate()?;
    let run = timed(options.algorithm.name(), || match options.algorithm {
        KnightAlgorithm::Warnsdorff => knights_tour::solve_warnsdorff(options.size, options.start),
        KnightAlgorithm::Backtracking => knights_tour::solve_backtracking(
            options.size,
            options.start,
            options.ordering,
            options.node_budget,
        ),
    });
    let run = run.transpose()?;
    let board = knights_tour::KnightBoard::from_tour(&run.output)?.to_array();
    Ok(run.map(|tour| KnightReport {
        complete: tour.is_complete(),
        tour,
        board,
    }))
}

pub fn solve_queens(options: &QueensOptions) -> crate::Result<Timed<QueensReport>> {
    options.validate()?;
    let name = if options.first_only { "first" } else { "all" };
    let run = timed(name, || {
        if options.first_only {
            queens::first_solution(options.size).map(|first| first.into_iter().collect::<Vec<_>>())
        } else {
            queens::solve_all(options.size)
        }
    });
    Ok(run.transpose()?.map(|solutions: Vec<Solution>| QueensReport {
        size: options.size,
        count: solutions.len(),
        solutions,
    }))
}

pub fn solve_tsp(options: &TspOptions) -> crate::Result<Timed<TspReport>> {
    let mut game = options.build_game()?;
    let run = game.solve(options.algorithm, &options.genetic)?;
    Ok(run.map(|route| TspReport {
        home: game.home(),
        selected: game.selected().to_vec(),
        distances: game.matrix().rows(),
        route_label: route.describe(),
        route,
    }))
}

fn options_from<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsError::new(&err.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsError::new(&err.to_string()))
}

#[wasm_bindgen(js_name = "hanoiSolve")]
pub fn hanoi_solve(options: JsValue) -> Result<JsValue, JsError> {
    let options: HanoiOptions = options_from(options)?;
    to_js(&solve_hanoi(&options)?)
}

#[wasm_bindgen(js_name = "knightsTourSolve")]
pub fn knights_tour_solve(options: JsValue) -> Result<JsValue, JsError> {
    let options: KnightOptions = options_from(options)?;
    to_js(&solve_knights_tour(&options)?)
}

#[wasm_bindgen(js_name = "queensSolutions")]
pub fn queens_solutions(options: JsValue) -> Result<JsValue, JsError> {
    let options: QueensOptions = options_from(options)?;
    to_js(&solve_queens(&options)?)
}

#[wasm_bindgen(js_name = "tspSolve")]
pub fn tsp_solve(options: JsValue) -> Result<JsValue, JsError> {
    let options: TspOptions = options_from(options)?;
    to_js(&solve_tsp(&options)?)
}

/// Human (X) against the configured computer player (O).
#[wasm_bindgen]
pub struct TicTacToeGame {
    inner: GameInstance,
}

impl TicTacToeGame {
    pub fn from_options(options: &TicTacToeOptions) -> crate::Result<Self> {
        options.validate()?;
        let selector = selector_for(
            options.algorithm,
            options.seed,
            options.minimax,
            options.alpha_beta,
        );
        Ok(Self {
            inner: GameInstance::new(selector),
        })
    }

    pub fn game_state(&self) -> GameState {
        self.inner.to_game_state()
    }
}

#[wasm_bindgen]
impl TicTacToeGame {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<TicTacToeGame, JsError> {
        let options: TicTacToeOptions = options_from(options)?;
        Ok(Self::from_options(&options)?)
    }

    pub fn place(&mut self, row: u8, col: u8) -> Result<JsValue, JsError> {
        self.inner.place(row, col)?;
        to_js(&self.game_state())
    }

    #[wasm_bindgen(js_name = "aiMove")]
    pub fn ai_move(&mut self) -> Result<JsValue, JsError> {
        self.inner.do_ai_move()?;
        to_js(&self.game_state())
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.game_state())
    }

    /// Every move so far, with the computer's per-move solver time.
    pub fn history(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.history())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HanoiState {
    /// Disks per peg, bottom first.
    pub pegs: Vec<Vec<u8>>,
    pub move_count: usize,
    pub min_moves_three_pegs: u64,
    pub last_move: Option<HanoiMove>,
    pub is_solved: bool,
}

/// Hand-played tower. Frame–Stewart options give four pegs.
#[wasm_bindgen]
pub struct HanoiGame {
    towers: Towers,
    disks: u8,
}

impl HanoiGame {
    pub fn from_options(options: &HanoiOptions) -> crate::Result<Self> {
        options.validate()?;
        Ok(Self {
            towers: Towers::new(options.disks, options.algorithm.pegs())?,
            disks: options.disks,
        })
    }

    pub fn apply_move(&mut self, from: u8, to: u8) -> crate::Result<HanoiState> {
        self.towers.move_disk(from, to)?;
        Ok(self.hanoi_state())
    }

    pub fn hanoi_state(&self) -> HanoiState {
        HanoiState {
            pegs: (0..self.towers.peg_count())
                .map(|peg| self.towers.peg(peg).to_vec())
                .collect(),
            move_count: self.towers.move_count(),
            min_moves_three_pegs: hanoi::min_moves_three_pegs(self.disks),
            last_move: self.towers.history().last().copied(),
            is_solved: self.towers.is_solved(),
        }
    }
}

#[wasm_bindgen]
impl HanoiGame {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<HanoiGame, JsError> {
        let options: HanoiOptions = options_from(options)?;
        Ok(Self::from_options(&options)?)
    }

    #[wasm_bindgen(js_name = "moveDisk")]
    pub fn move_disk(&mut self, from: u8, to: u8) -> Result<JsValue, JsError> {
        to_js(&self.apply_move(from, to)?)
    }

    #[wasm_bindgen(js_name = "isSolved")]
    pub fn is_solved(&self) -> bool {
        self.towers.is_solved()
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.hanoi_state())
    }

    pub fn history(&self) -> Result<JsValue, JsError> {
        to_js(&self.towers.history())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnightState {
    pub size: u8,
    /// Move number per square, row-major; 0 for unvisited.
    pub board: Vec<u8>,
    pub current: Option<Position>,
    pub possible_moves: Vec<Position>,
    pub move_count: usize,
    pub is_complete: bool,
    pub is_stuck: bool,
}

#[wasm_bindgen]
pub struct KnightsTourGame {
    inner: TourGame,
}

impl KnightsTourGame {
    pub fn with_size(size: u8) -> crate::Result<Self> {
        Ok(Self {
            inner: TourGame::new(size)?,
        })
    }

    pub fn knight_state(&self) -> KnightState {
        let board = self.inner.board();
        KnightState {
            size: board.size(),
            board: board.to_array(),
            current: self.inner.current(),
            possible_moves: self.inner.possible_moves(),
            move_count: self.inner.move_count(),
            is_complete: self.inner.is_complete(),
            is_stuck: self.inner.is_stuck(),
        }
    }
}

#[wasm_bindgen]
impl KnightsTourGame {
    #[wasm_bindgen(constructor)]
    pub fn new(size: u8) -> Result<KnightsTourGame, JsError> {
        Ok(Self::with_size(size)?)
    }

    pub fn start(&mut self, row: i32, col: i32) -> Result<JsValue, JsError> {
        self.inner.start(row, col)?;
        to_js(&self.knight_state())
    }

    #[wasm_bindgen(js_name = "makeMove")]
    pub fn make_move(&mut self, row: i32, col: i32) -> Result<JsValue, JsError> {
        self.inner.make_move(row, col)?;
        to_js(&self.knight_state())
    }

    #[wasm_bindgen(js_name = "possibleMoves")]
    pub fn possible_moves(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.possible_moves())
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.knight_state())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueensState {
    pub queens: Vec<Position>,
    pub is_complete: bool,
    /// Solution numbers submitted so far, in submission order.
    pub found_solutions: Vec<usize>,
}

/// The 8x8 board the player fills one queen at a time.
#[wasm_bindgen]
#[derive(Default)]
pub struct QueensBoard {
    inner: QueensGame,
}

impl QueensBoard {
    pub fn queens_state(&self) -> QueensState {
        QueensState {
            queens: self.inner.queens().to_vec(),
            is_complete: self.inner.is_complete(),
            found_solutions: self.inner.found_solutions().to_vec(),
        }
    }

    pub fn submit_board(&mut self) -> crate::Result<Submission> {
        self.inner.submit()
    }
}

#[wasm_bindgen]
impl QueensBoard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> QueensBoard {
        Self::default()
    }

    pub fn toggle(&mut self, row: u8, col: u8) -> Result<JsValue, JsError> {
        self.inner.toggle(row, col)?;
        to_js(&self.queens_state())
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn submit(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.submit_board()?)
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.queens_state())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TspState {
    pub home: usize,
    pub selected: Vec<usize>,
    pub distances: Vec<Vec<u32>>,
}

/// City map for the route game. Nothing is selected unless the options list cities.
#[wasm_bindgen]
pub struct TspMap {
    inner: TspGame,
    algorithm: TspAlgorithm,
    genetic: GeneticParams,
}

impl TspMap {
    pub fn from_options(options: &TspOptions) -> crate::Result<Self> {
        let inner = if options.selected.is_some() {
            options.build_game()?
        } else {
            options.build_map()?
        };
        Ok(Self {
            inner,
            algorithm: options.algorithm,
            genetic: options.genetic,
        })
    }

    pub fn tsp_state(&self) -> TspState {
        TspState {
            home: self.inner.home(),
            selected: self.inner.selected().to_vec(),
            distances: self.inner.matrix().rows(),
        }
    }

    pub fn solve_selection(&mut self) -> crate::Result<Timed<Route>> {
        self.inner.solve(self.algorithm, &self.genetic)
    }

    pub fn compare_route(&self, order: &[usize]) -> crate::Result<RouteComparison> {
        self.inner.submit_route(order)
    }
}

#[wasm_bindgen]
impl TspMap {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<TspMap, JsError> {
        let options: TspOptions = options_from(options)?;
        Ok(Self::from_options(&options)?)
    }

    #[wasm_bindgen(js_name = "toggleCity")]
    pub fn toggle_city(&mut self, city: usize) -> Result<JsValue, JsError> {
        self.inner.toggle_city(city)?;
        to_js(&self.tsp_state())
    }

    #[wasm_bindgen(js_name = "clearSelection")]
    pub fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }

    /// Runs the configured algorithm on the current selection.
    pub fn solve(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.solve_selection()?)
    }

    /// `order` is an array of city indices, home excluded.
    #[wasm_bindgen(js_name = "submitRoute")]
    pub fn submit_route(&self, order: JsValue) -> Result<JsValue, JsError> {
        let order: Vec<usize> =
            serde_wasm_bindgen::from_value(order).map_err(|err| JsError::new(&err.to_string()))?;
        to_js(&self.compare_route(&order)?)
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.tsp_state())
    }
}
