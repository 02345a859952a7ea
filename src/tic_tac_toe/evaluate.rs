use super::board::{Board, Player, WIN_LINES};

fn line_score(own: u32, empty: u32) -> i32 {
    match (own, empty) {
        (5, _) => 100,
        (4, 1) => 50,
        (3, 2) => 10,
        (2, 3) => 5,
        _ => 0,
    }
}

/// Static score from `me`'s point of view, summed over the twelve lines.
pub fn evaluate(board: &Board, me: Player) -> i32 {
    let mine = board.stones(me);
    let theirs = board.stones(me.opponent());
    let empty = board.empty_mask();

    WIN_LINES
        .iter()
        .map(|&line| {
            let open = (empty & line).count_ones();
            line_score((mine & line).count_ones(), open)
                - line_score((theirs & line).count_ones(), open)
        })
        .sum()
}
