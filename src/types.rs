use serde::{Deserialize, Serialize};

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub(crate) fn index(self, width: usize) -> usize {
        self.row as usize * width + self.col as usize
    }

    pub(crate) fn from_index(idx: usize, width: usize) -> Self {
        Self {
            row: (idx / width) as u8,
            col: (idx % width) as u8,
        }
    }
}

/// One algorithm-time sample, as posted to the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingSample {
    pub algorithm: String,
    pub elapsed_ms: f64,
}
