use serde::{Deserialize, Serialize};

use super::board::{Board, CENTER, Player};
use super::evaluate::evaluate;

const MIN_SCORE: i32 = -1_000_000;
const MAX_SCORE: i32 = 1_000_000;

/// Depth cap and scoring shared by minimax and alpha-beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchProfile {
    /// Plies searched below the root move.
    pub max_depth: u8,
    /// Score of a win found at depth 0; each ply deeper costs one point.
    pub win_score: i32,
    /// Score depth-capped leaves with the line evaluator instead of 0.
    pub static_eval: bool,
}

impl SearchProfile {
    pub const fn minimax() -> Self {
        Self {
            max_depth: 2,
            win_score: 10,
            static_eval: false,
        }
    }

    pub const fn alpha_beta() -> Self {
        Self {
            max_depth: 3,
            win_score: 100,
            static_eval: true,
        }
    }
}

impl Default for SearchProfile {
    fn default() -> Self {
        Self::minimax()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub cell: usize,
    pub score: i32,
    pub nodes: u64,
}

/// Immediate win, else block the opponent's immediate win, else the centre.
pub fn shortcut_move(board: &Board, me: Player) -> Option<usize> {
    let win_now = board.winning_cells(me).first().copied();
    win_now
        .or_else(|| board.winning_cells(me.opponent()).first().copied())
        .or_else(|| board.is_empty(CENTER).then_some(CENTER))
}

pub struct Searcher {
    me: Player,
    profile: SearchProfile,
    nodes: u64,
}

impl Searcher {
    pub fn new(me: Player, profile: SearchProfile) -> Self {
        Self {
            me,
            profile,
            nodes: 0,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Plain minimax over every empty cell. Ties go to the lowest index.
    pub fn minimax_root(&mut self, board: &Board) -> Option<SearchResult> {
        self.nodes = 0;
        let mut best: Option<(usize, i32)> = None;

        for cell in board.empty_cells() {
            let score = self.minimax(&board.with(cell, self.me), 0, false);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((cell, score));
            }
        }

        best.map(|(cell, score)| SearchResult {
            cell,
            score,
            nodes: self.nodes,
        })
    }

    /// Alpha-beta with the running best as the root window, so it agrees
    /// with [`Searcher::minimax_root`] on both move and score.
    pub fn alpha_beta_root(&mut self, board: &Board) -> Option<SearchResult> {
        self.nodes = 0;
        let mut best: Option<(usize, i32)> = None;

        for cell in board.empty_cells() {
            let alpha = best.map_or(MIN_SCORE, |(_, score)| score);
            let score = self.alpha_beta(&board.with(cell, self.me), 0, alpha, MAX_SCORE, false);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((cell, score));
            }
        }

        best.map(|(cell, score)| SearchResult {
            cell,
            score,
            nodes: self.nodes,
        })
    }

    fn terminal_score(&self, board: &Board, depth: u8) -> Option<i32> {
        let depth = i32::from(depth);
        if board.has_won(self.me) {
            return Some(self.profile.win_score - depth);
        }
        if board.has_won(self.me.opponent()) {
            return Some(depth - self.profile.win_score);
        }
        if board.is_full() {
            return Some(0);
        }
        None
    }

    fn leaf_score(&self, board: &Board) -> i32 {
        if self.profile.static_eval {
            evaluate(board, self.me)
        } else {
            0
        }
    }

    fn minimax(&mut self, board: &Board, depth: u8, maximizing: bool) -> i32 {
        self.nodes += 1;
        if let Some(score) = self.terminal_score(board, depth) {
            return score;
        }
        if depth >= self.profile.max_depth {
            return self.leaf_score(board);
        }

        let mover = if maximizing { self.me } else { self.me.opponent() };
        let scores = board
            .empty_cells()
            .into_iter()
            .map(|cell| self.minimax(&board.with(cell, mover), depth + 1, !maximizing));

        if maximizing {
            scores.fold(MIN_SCORE, i32::max)
        } else {
            scores.fold(MAX_SCORE, i32::min)
        }
    }

    fn alpha_beta(
        &mut self,
        board: &Board,
        depth: u8,
        alpha: i32,
        beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes += 1;
        if let Some(score) = self.terminal_score(board, depth) {
            return score;
        }
        if depth >= self.profile.max_depth {
            return self.leaf_score(board);
        }

        let mut alpha = alpha;
        let mut beta = beta;

        if maximizing {
            let mut best = MIN_SCORE;
            for cell in board.empty_cells() {
                let score = self.alpha_beta(&board.with(cell, self.me), depth + 1, alpha, beta, false);
                best = best.max(score);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = MAX_SCORE;
            for cell in board.empty_cells() {
                let score = self.alpha_beta(
                    &board.with(cell, self.me.opponent()),
                    depth + 1,
                    alpha,
                    beta,
                    true,
                );
                best = best.min(score);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(cells: &str) -> Board {
        Board::parse(cells).unwrap()
    }

    fn sample_boards() -> Vec<Board> {
        vec![
            board(
                "X....
                 .....
                 ..O..
                 .....
                 ....X",
            ),
            board(
                "XX.O.
                 .O...
                 ..X..
                 .....
                 O...X",
            ),
            board(
                "XOXO.
                 OXOX.
                 XOXO.
                 .....
                 .....",
            ),
            board(
                "XXOOX
                 OOXXO
                 XXOO.
                 OOXX.
                 X..O.",
            ),
        ]
    }

    #[test]
    fn minimax_and_alpha_beta_agree_on_value_and_move() {
        for profile in [SearchProfile::minimax(), SearchProfile::alpha_beta()] {
            for b in sample_boards() {
                let plain = Searcher::new(Player::O, profile).minimax_root(&b).unwrap();
                let pruned = Searcher::new(Player::O, profile).alpha_beta_root(&b).unwrap();

                assert_eq!(plain.score, pruned.score, "{profile:?} {b:?}");
                assert_eq!(plain.cell, pruned.cell, "{profile:?} {b:?}");
            }
        }
    }

    #[test]
    fn alpha_beta_visits_fewer_nodes() {
        let b = sample_boards().remove(0);
        let profile = SearchProfile::alpha_beta();

        let mut plain = Searcher::new(Player::O, profile);
        plain.minimax_root(&b).unwrap();
        let mut pruned = Searcher::new(Player::O, profile);
        pruned.alpha_beta_root(&b).unwrap();

        assert!(pruned.nodes() < plain.nodes());
    }

    #[test]
    fn search_takes_immediate_win_with_top_score() {
        let b = board(
            "OOOO.
             XXX..
             X....
             .....
             .....",
        );
        let result = Searcher::new(Player::O, SearchProfile::minimax())
            .minimax_root(&b)
            .unwrap();

        assert_eq!(result.cell, 4);
        assert_eq!(result.score, 10);
    }

    #[test]
    fn search_blocks_forced_loss() {
        let b = board(
            "XXXX.
             OO...
             O....
             .....
             .....",
        );
        let result = Searcher::new(Player::O, SearchProfile::minimax())
            .alpha_beta_root(&b)
            .unwrap();

        assert_eq!(result.cell, 4);
    }

    #[test]
    fn full_board_has_no_move() {
        let b = board(
            "XXOOX
             OOXXO
             XXOOX
             OOXXO
             XOXOX",
        );

        assert!(Searcher::new(Player::O, SearchProfile::minimax()).minimax_root(&b).is_none());
    }

    #[test]
    fn shortcut_prefers_win_then_block_then_centre() {
        let win_and_block = board(
            "XXXX.
             OOOO.
             .....
             .....
             .....",
        );
        assert_eq!(shortcut_move(&win_and_block, Player::O), Some(9));
        assert_eq!(shortcut_move(&win_and_block, Player::X), Some(4));

        let block = board(
            "XXXX.
             O....
             .....
             .....
             .....",
        );
        assert_eq!(shortcut_move(&block, Player::O), Some(4));
        assert_eq!(shortcut_move(&Board::new(), Player::O), Some(CENTER));

        let centre_taken = board(
            "X....
             .....
             ..X..
             .....
             .....",
        );
        assert_eq!(shortcut_move(&centre_taken, Player::O), None);
    }
}
