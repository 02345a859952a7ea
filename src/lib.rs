//! Game state and solvers for the puzzle arcade pages: Tower of Hanoi,
//! Knight's Tour, N-Queens, 5x5 Tic-Tac-Toe and the Traveling Salesman.
//!
//! Built as an `rlib` for native tests and as a `cdylib` for the browser,
//! where [`api`] is the exported surface.

pub mod api;
pub mod config;
pub mod error;
pub mod hanoi;
pub mod knights_tour;
pub mod queens;
pub mod tic_tac_toe;
pub mod timing;
pub mod tsp;
pub mod types;

pub use error::{PuzzleError, Result};

#[cfg(test)]
pub(crate) fn init_test_logger() {
    #[cfg(not(target_arch = "wasm32"))]
    let _ = env_logger::builder().is_test(true).try_init();
}
