use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::board::{Board, Player};
use super::search::{SearchProfile, Searcher, shortcut_move};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Algorithm {
    Random,
    Greedy,
    #[default]
    Minimax,
    #[serde(alias = "alphabeta")]
    AlphaBeta,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Greedy => "greedy",
            Self::Minimax => "minimax",
            Self::AlphaBeta => "alphabeta",
        }
    }
}

pub trait MoveSelector: Send {
    fn select_move(&mut self, board: &Board, me: Player) -> Option<usize>;

    fn algorithm(&self) -> Algorithm;
}

#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: SmallRng,
}

impl RandomSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MoveSelector for RandomSelector {
    fn select_move(&mut self, board: &Board, _me: Player) -> Option<usize> {
        board.empty_cells().choose(&mut self.rng).copied()
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Random
    }
}

/// Win, block, centre, otherwise a random empty cell.
#[derive(Debug, Clone)]
pub struct GreedySelector {
    rng: SmallRng,
}

impl GreedySelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MoveSelector for GreedySelector {
    fn select_move(&mut self, board: &Board, me: Player) -> Option<usize> {
        shortcut_move(board, me).or_else(|| board.empty_cells().choose(&mut self.rng).copied())
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Greedy
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MinimaxSelector {
    profile: SearchProfile,
}

impl MinimaxSelector {
    pub fn new(profile: SearchProfile) -> Self {
        Self { profile }
    }
}

impl MoveSelector for MinimaxSelector {
    fn select_move(&mut self, board: &Board, me: Player) -> Option<usize> {
        if let Some(cell) = shortcut_move(board, me) {
            return Some(cell);
        }
        let mut searcher = Searcher::new(me, self.profile);
        let result = searcher.minimax_root(board)?;
        log::debug!("minimax picked {} (score {}, {} nodes)", result.cell, result.score, result.nodes);
        Some(result.cell)
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Minimax
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AlphaBetaSelector {
    profile: SearchProfile,
}

impl AlphaBetaSelector {
    pub fn new(profile: SearchProfile) -> Self {
        Self { profile }
    }
}

impl MoveSelector for AlphaBetaSelector {
    fn select_move(&mut self, board: &Board, me: Player) -> Option<usize> {
        let empty = board.empty_cells();
        if let [only] = empty.as_slice() {
            return Some(*only);
        }
        if let Some(cell) = shortcut_move(board, me) {
            return Some(cell);
        }
        let mut searcher = Searcher::new(me, self.profile);
        let result = searcher.alpha_beta_root(board)?;
        log::debug!("alpha-beta picked {} (score {}, {} nodes)", result.cell, result.score, result.nodes);
        Some(result.cell)
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::AlphaBeta
    }
}

pub fn selector_for(
    algorithm: Algorithm,
    seed: u64,
    minimax: SearchProfile,
    alpha_beta: SearchProfile,
) -> Box<dyn MoveSelector> {
    match algorithm {
        Algorithm::Random => Box::new(RandomSelector::new(seed)),
        Algorithm::Greedy => Box::new(GreedySelector::new(seed)),
        Algorithm::Minimax => Box::new(MinimaxSelector::new(minimax)),
        Algorithm::AlphaBeta => Box::new(AlphaBetaSelector::new(alpha_beta)),
    }
}
