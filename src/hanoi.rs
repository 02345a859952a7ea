use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};

pub const MAX_DISKS: u8 = 20;
const PEG_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Moving `disk` (1 = smallest) from peg `from` to peg `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HanoiMove {
    pub disk: u8,
    pub from: u8,
    pub to: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HanoiAlgorithm {
    #[default]
    Recursive,
    Iterative,
    FrameStewart,
}

impl HanoiAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Recursive => "recursive",
            Self::Iterative => "iterative",
            Self::FrameStewart => "frameStewart",
        }
    }

    pub fn pegs(self) -> u8 {
        match self {
            Self::Recursive | Self::Iterative => 3,
            Self::FrameStewart => 4,
        }
    }
}

pub fn peg_label(peg: u8) -> char {
    PEG_LABELS.get(peg as usize).copied().unwrap_or('?')
}

pub fn min_moves_three_pegs(disks: u8) -> u64 {
    1u64.checked_shl(u32::from(disks)).map_or(u64::MAX, |v| v - 1)
}

/// Runs `algorithm` from the first peg to the last one.
pub fn solve(algorithm: HanoiAlgorithm, disks: u8) -> Result<Vec<HanoiMove>> {
    let moves = match algorithm {
        HanoiAlgorithm::Recursive => solve_recursive(disks, 0, 2, 1)?,
        HanoiAlgorithm::Iterative => solve_iterative(disks, 0, 2, 1)?,
        HanoiAlgorithm::FrameStewart => solve_frame_stewart(disks, 0, 3, 1, 2)?,
    };
    log::trace!("{} produced {} moves for {disks} disks", algorithm.name(), moves.len());
    Ok(moves)
}

pub fn solve_recursive(disks: u8, from: u8, to: u8, via: u8) -> Result<Vec<HanoiMove>> {
    check_disks(disks)?;
    let mut moves = Vec::with_capacity(min_moves_three_pegs(disks) as usize);
    three_pegs(disks, 0, from, to, via, &mut moves);
    Ok(moves)
}

fn three_pegs(n: u8, offset: u8, from: u8, to: u8, via: u8, out: &mut Vec<HanoiMove>) {
    if n == 0 {
        return;
    }
    three_pegs(n - 1, offset, from, via, to, out);
    out.push(HanoiMove {
        disk: n + offset,
        from,
        to,
    });
    three_pegs(n - 1, offset, via, to, from, out);
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    n: u8,
    from: u8,
    to: u8,
    via: u8,
    stage: u8,
}

/// Same move order as [`solve_recursive`], driven by an explicit stack.
pub fn solve_iterative(disks: u8, from: u8, to: u8, via: u8) -> Result<Vec<HanoiMove>> {
    check_disks(disks)?;
    let mut moves = Vec::new();

    let mut stack = vec![Frame {
        n: disks,
        from,
        to,
        via,
        stage: 0,
    }];

    while let Some(top) = stack.last_mut() {
        if top.n == 1 {
            moves.push(HanoiMove {
                disk: 1,
                from: top.from,
                to: top.to,
            });
            stack.pop();
            continue;
        }

        let current = *top;
        match current.stage {
            0 => {
                top.stage = 1;
                stack.push(Frame {
                    n: current.n - 1,
                    from: current.from,
                    to: current.via,
                    via: current.to,
                    stage: 0,
                });
            }
            1 => {
                moves.push(HanoiMove {
                    disk: current.n,
                    from: current.from,
                    to: current.to,
                });
                top.stage = 2;
                stack.push(Frame {
                    n: current.n - 1,
                    from: current.via,
                    to: current.to,
                    via: current.from,
                    stage: 0,
                });
            }
            _ => {
                stack.pop();
            }
        }
    }

    Ok(moves)
}

/// Four-peg Frame–Stewart split: `k = floor(n - sqrt(2n + 1) + 1)`.
pub fn frame_stewart_split(n: u8) -> u8 {
    if n < 2 {
        return 0;
    }
    let n_f = f64::from(n);
    let k = (n_f - (2.0 * n_f + 1.0).sqrt() + 1.0).floor();
    (k.max(0.0) as u8).min(n - 1)
}

pub fn solve_frame_stewart(
    disks: u8,
    from: u8,
    to: u8,
    via1: u8,
    via2: u8,
) -> Result<Vec<HanoiMove>> {
    check_disks(disks)?;
    let mut moves = Vec::new();
    four_pegs(disks, 0, from, to, via1, via2, &mut moves);
    Ok(moves)
}

fn four_pegs(n: u8, offset: u8, from: u8, to: u8, via1: u8, via2: u8, out: &mut Vec<HanoiMove>) {
    match n {
        0 => {}
        1 => out.push(HanoiMove {
            disk: offset + 1,
            from,
            to,
        }),
        _ => {
            let k = frame_stewart_split(n);
            four_pegs(k, offset, from, via1, to, via2, out);
            // The k smallest disks sit on via1, so the rest only has three pegs.
            three_pegs(n - k, offset + k, from, to, via2, out);
            four_pegs(k, offset, via1, to, from, via2, out);
        }
    }
}

fn check_disks(disks: u8) -> Result<()> {
    if disks == 0 || disks > MAX_DISKS {
        return Err(PuzzleError::invalid(format!(
            "disk count must be between 1 and {MAX_DISKS}, got {disks}"
        )));
    }
    Ok(())
}

/// Playable tower state. Disks start on the first peg and must end on the last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Towers {
    disks: u8,
    pegs: Vec<Vec<u8>>,
    history: Vec<HanoiMove>,
}

impl Towers {
    pub fn new(disks: u8, pegs: u8) -> Result<Self> {
        check_disks(disks)?;
        if !(3..=4).contains(&pegs) {
            return Err(PuzzleError::invalid(format!(
                "peg count must be 3 or 4, got {pegs}"
            )));
        }

        let mut stacks = vec![Vec::new(); pegs as usize];
        stacks[0] = (1..=disks).rev().collect();
        Ok(Self {
            disks,
            pegs: stacks,
            history: Vec::new(),
        })
    }

    pub fn peg_count(&self) -> u8 {
        self.pegs.len() as u8
    }

    /// Disks on `peg`, bottom first.
    pub fn peg(&self, peg: u8) -> &[u8] {
        self.pegs.get(peg as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn top(&self, peg: u8) -> Option<u8> {
        self.peg(peg).last().copied()
    }

    pub fn move_disk(&mut self, from: u8, to: u8) -> Result<HanoiMove> {
        let count = self.peg_count();
        if from >= count || to >= count {
            return Err(PuzzleError::invalid(format!("peg index out of range: {from} -> {to}")));
        }
        if from == to {
            return Err(PuzzleError::illegal("source and target peg are the same"));
        }

        let disk = self
            .top(from)
            .ok_or_else(|| PuzzleError::illegal(format!("peg {} is empty", peg_label(from))))?;
        if let Some(top) = self.top(to)
            && top < disk
        {
            return Err(PuzzleError::illegal(
                "cannot place a larger disk on a smaller one",
            ));
        }

        self.pegs[from as usize].pop();
        self.pegs[to as usize].push(disk);
        let mv = HanoiMove { disk, from, to };
        self.history.push(mv);
        Ok(mv)
    }

    /// Replays solver output, stopping at the first illegal move.
    pub fn apply_all(&mut self, moves: &[HanoiMove]) -> Result<()> {
        for mv in moves {
            if self.top(mv.from) != Some(mv.disk) {
                return Err(PuzzleError::illegal(format!(
                    "disk {} is not on top of peg {}",
                    mv.disk,
                    peg_label(mv.from)
                )));
            }
            self.move_disk(mv.from, mv.to)?;
        }
        Ok(())
    }

    pub fn is_solved(&self) -> bool {
        self.pegs
            .last()
            .is_some_and(|target| target.len() == self.disks as usize)
    }

    pub fn history(&self) -> &[HanoiMove] {
        &self.history
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(disks: u8, pegs: u8, moves: &[HanoiMove]) -> Towers {
        let mut towers = Towers::new(disks, pegs).unwrap();
        towers.apply_all(moves).unwrap();
        towers
    }

    #[test]
    fn recursive_solution_has_minimal_length_and_is_legal() {
        for disks in 1..=10 {
            let moves = solve_recursive(disks, 0, 2, 1).unwrap();

            assert_eq!(moves.len() as u64, min_moves_three_pegs(disks));
            assert!(replay(disks, 3, &moves).is_solved());
        }
    }

    #[test]
    fn iterative_matches_recursive_move_for_move() {
        for disks in 1..=12 {
            assert_eq!(
                solve_iterative(disks, 0, 2, 1).unwrap(),
                solve_recursive(disks, 0, 2, 1).unwrap()
            );
        }
    }

    #[test]
    fn three_disk_sequence_is_the_textbook_one() {
        let moves: Vec<(u8, u8, u8)> = solve_recursive(3, 0, 2, 1)
            .unwrap()
            .into_iter()
            .map(|m| (m.disk, m.from, m.to))
            .collect();

        assert_eq!(
            moves,
            vec![
                (1, 0, 2),
                (2, 0, 1),
                (1, 2, 1),
                (3, 0, 2),
                (1, 1, 0),
                (2, 1, 2),
                (1, 0, 2)
            ]
        );
    }

    #[test]
    fn split_point_follows_floor_formula() {
        assert_eq!(frame_stewart_split(1), 0);
        assert_eq!(frame_stewart_split(2), 0);
        assert_eq!(frame_stewart_split(3), 1);
        assert_eq!(frame_stewart_split(4), 2);
        assert_eq!(frame_stewart_split(6), 3);
        assert_eq!(frame_stewart_split(10), 6);
    }

    #[test]
    fn frame_stewart_is_legal_and_never_longer_than_three_pegs() {
        for disks in 1..=12 {
            let moves = solve_frame_stewart(disks, 0, 3, 1, 2).unwrap();
            let towers = replay(disks, 4, &moves);

            assert!(towers.is_solved(), "{disks} disks not solved");
            assert!(moves.len() as u64 <= min_moves_three_pegs(disks));
        }
        assert_eq!(solve_frame_stewart(4, 0, 3, 1, 2).unwrap().len(), 9);
    }

    #[test]
    fn larger_disk_on_smaller_is_rejected() {
        let mut towers = Towers::new(3, 3).unwrap();
        towers.move_disk(0, 1).unwrap();

        let err = towers.move_disk(0, 1).unwrap_err();

        assert!(matches!(err, PuzzleError::IllegalMove(_)));
        assert_eq!(towers.peg(0), &[3, 2]);
        assert_eq!(towers.move_count(), 1);
    }

    #[test]
    fn empty_peg_and_same_peg_moves_are_rejected() {
        let mut towers = Towers::new(3, 4).unwrap();

        assert!(towers.move_disk(2, 0).is_err());
        assert!(towers.move_disk(0, 0).is_err());
        assert!(towers.move_disk(0, 9).is_err());
        assert!(!towers.is_solved());
    }

    #[test]
    fn solve_rejects_out_of_range_disk_counts() {
        assert!(solve(HanoiAlgorithm::Recursive, 0).is_err());
        assert!(solve(HanoiAlgorithm::Iterative, MAX_DISKS + 1).is_err());
        assert_eq!(solve(HanoiAlgorithm::FrameStewart, 5).unwrap().len(), 13);
    }

    #[test]
    fn peg_level_solvers_refuse_oversized_towers() {
        assert!(matches!(
            solve_recursive(64, 0, 2, 1),
            Err(PuzzleError::InvalidArgument(_))
        ));
        assert!(solve_iterative(MAX_DISKS + 1, 0, 2, 1).is_err());
        assert!(solve_frame_stewart(64, 0, 3, 1, 2).is_err());
        assert!(solve_iterative(0, 0, 2, 1).is_err());
        assert_eq!(solve_recursive(MAX_DISKS, 0, 2, 1).unwrap().len(), (1 << 20) - 1);
    }
}
