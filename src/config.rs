//! Options objects passed from the page. Missing fields take their defaults.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer};

use crate::error::{PuzzleError, Result};
use crate::hanoi::{self, HanoiAlgorithm};
use crate::knights_tour::{self, KnightAlgorithm, MoveOrdering};
use crate::queens;
use crate::tic_tac_toe::{Algorithm, SearchProfile};
use crate::tsp::{self, DistanceMatrix, GeneticParams, TspAlgorithm, TspGame};
use crate::types::Position;

pub const DEFAULT_NODE_BUDGET: u64 = 5_000_000;
/// Deeper searches take seconds per move on a mostly empty 5x5 board.
pub const MAX_SEARCH_DEPTH: u8 = 5;
/// Listing every solution past this size does not fit in a page.
pub const MAX_LISTED_QUEENS: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HanoiOptions {
    pub disks: u8,
    pub algorithm: HanoiAlgorithm,
}

impl Default for HanoiOptions {
    fn default() -> Self {
        Self {
            disks: 3,
            algorithm: HanoiAlgorithm::default(),
        }
    }
}

impl HanoiOptions {
    pub fn validate(&self) -> Result<()> {
        if !(1..=hanoi::MAX_DISKS).contains(&self.disks) {
            return Err(PuzzleError::invalid(format!(
                "disks must be between 1 and {}, got {}",
                hanoi::MAX_DISKS,
                self.disks
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KnightOptions {
    pub size: u8,
    pub start: Position,
    pub algorithm: KnightAlgorithm,
    pub ordering: MoveOrdering,
    pub node_budget: u64,
}

impl Default for KnightOptions {
    fn default() -> Self {
        Self {
            size: knights_tour::DEFAULT_SIZE,
            start: Position::new(0, 0),
            algorithm: KnightAlgorithm::default(),
            ordering: MoveOrdering::default(),
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }
}

impl KnightOptions {
    pub fn validate(&self) -> Result<()> {
        if !(knights_tour::MIN_SIZE..=knights_tour::MAX_SIZE).contains(&self.size) {
            return Err(PuzzleError::invalid(format!(
                "board size must be between {} and {}, got {}",
                knights_tour::MIN_SIZE,
                knights_tour::MAX_SIZE,
                self.size
            )));
        }
        if self.start.row >= self.size || self.start.col >= self.size {
            return Err(PuzzleError::OutOfBounds {
                row: i32::from(self.start.row),
                col: i32::from(self.start.col),
            });
        }
        if self.node_budget == 0 {
            return Err(PuzzleError::invalid("node budget must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueensOptions {
    pub size: u8,
    /// Stop at the first solution instead of listing all of them.
    pub first_only: bool,
}

impl Default for QueensOptions {
    fn default() -> Self {
        Self {
            size: queens::CLASSIC_SIZE,
            first_only: false,
        }
    }
}

impl QueensOptions {
    pub fn validate(&self) -> Result<()> {
        let limit = if self.first_only {
            queens::MAX_QUEENS
        } else {
            MAX_LISTED_QUEENS
        };
        if !(1..=limit).contains(&self.size) {
            return Err(PuzzleError::invalid(format!(
                "board size must be between 1 and {limit}, got {}",
                self.size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TicTacToeOptions {
    pub algorithm: Algorithm,
    pub seed: u64,
    pub minimax: SearchProfile,
    #[serde(deserialize_with = "alpha_beta_profile")]
    pub alpha_beta: SearchProfile,
}

/// `SearchProfile` fields with the alpha-beta values as their defaults.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AlphaBetaFields {
    max_depth: u8,
    win_score: i32,
    static_eval: bool,
}

impl Default for AlphaBetaFields {
    fn default() -> Self {
        let SearchProfile {
            max_depth,
            win_score,
            static_eval,
        } = SearchProfile::alpha_beta();
        Self {
            max_depth,
            win_score,
            static_eval,
        }
    }
}

fn alpha_beta_profile<'de, D>(deserializer: D) -> std::result::Result<SearchProfile, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = AlphaBetaFields::deserialize(deserializer)?;
    Ok(SearchProfile {
        max_depth: fields.max_depth,
        win_score: fields.win_score,
        static_eval: fields.static_eval,
    })
}

impl Default for TicTacToeOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            seed: 0,
            minimax: SearchProfile::minimax(),
            alpha_beta: SearchProfile::alpha_beta(),
        }
    }
}

impl TicTacToeOptions {
    pub fn validate(&self) -> Result<()> {
        for (name, profile) in [("minimax", self.minimax), ("alphaBeta", self.alpha_beta)] {
            if profile.max_depth > MAX_SEARCH_DEPTH {
                return Err(PuzzleError::invalid(format!(
                    "{name} depth must be at most {MAX_SEARCH_DEPTH}, got {}",
                    profile.max_depth
                )));
            }
            if profile.win_score <= i32::from(profile.max_depth) + 1 {
                return Err(PuzzleError::invalid(format!(
                    "{name} win score must exceed the search depth"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TspOptions {
    pub cities: usize,
    pub seed: u64,
    /// Random when absent.
    pub home: Option<usize>,
    /// Every city except home when absent.
    pub selected: Option<Vec<usize>>,
    /// Replaces the random map when present.
    pub distances: Option<Vec<Vec<u32>>>,
    pub algorithm: TspAlgorithm,
    pub genetic: GeneticParams,
}

impl Default for TspOptions {
    fn default() -> Self {
        Self {
            cities: tsp::game::DEFAULT_CITY_COUNT,
            seed: 0,
            home: None,
            selected: None,
            distances: None,
            algorithm: TspAlgorithm::default(),
            genetic: GeneticParams::default(),
        }
    }
}

impl TspOptions {
    pub fn validate(&self) -> Result<()> {
        if self.distances.is_none() && !(1..=tsp::MAX_CITIES).contains(&self.cities) {
            return Err(PuzzleError::invalid(format!(
                "city count must be between 1 and {}, got {}",
                tsp::MAX_CITIES,
                self.cities
            )));
        }
        self.genetic.validate()
    }

    /// Map and home city described by these options, nothing selected.
    pub fn build_map(&self) -> Result<TspGame> {
        self.validate()?;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let matrix = match &self.distances {
            Some(rows) => DistanceMatrix::from_rows(rows)?,
            None => DistanceMatrix::random(self.cities, &mut rng)?,
        };
        let home = match self.home {
            Some(home) => home,
            None => rng.gen_range(0..matrix.size()),
        };

        TspGame::with_matrix(matrix, home, rng.r#gen())
    }

    /// Map, home city and selection described by these options.
    pub fn build_game(&self) -> Result<TspGame> {
        let mut game = self.build_map()?;
        let home = game.home();
        let selected = match &self.selected {
            Some(cities) => cities.clone(),
            None => (0..game.matrix().size()).filter(|&c| c != home).collect(),
        };
        game.matrix().check_cities(home, &selected)?;
        for city in selected {
            game.toggle_city(city)?;
        }
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::value::{Error, MapDeserializer};

    fn from_pairs<'a, T: Deserialize<'a>>(pairs: Vec<(&'a str, &'a str)>) -> T {
        let de: MapDeserializer<'_, _, Error> = MapDeserializer::new(pairs.into_iter());
        T::deserialize(de).unwrap()
    }

    #[test]
    fn defaults_match_the_pages() {
        let hanoi = HanoiOptions::default();
        assert_eq!(hanoi.disks, 3);
        assert_eq!(hanoi.algorithm, HanoiAlgorithm::Recursive);

        let knight = KnightOptions::default();
        assert_eq!(knight.size, 8);
        assert_eq!(knight.node_budget, DEFAULT_NODE_BUDGET);

        let ttt = TicTacToeOptions::default();
        assert_eq!(ttt.minimax, SearchProfile::minimax());
        assert_eq!(ttt.alpha_beta, SearchProfile::alpha_beta());

        let tsp = TspOptions::default();
        assert_eq!(tsp.cities, 10);
        assert_eq!(tsp.genetic.population_size, 50);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let queens: QueensOptions = from_pairs(vec![]);
        assert_eq!(queens, QueensOptions::default());

        let ttt: TicTacToeOptions = from_pairs(vec![("algorithm", "alphabeta")]);
        assert_eq!(ttt.algorithm, Algorithm::AlphaBeta);
        assert_eq!(ttt.alpha_beta, SearchProfile::alpha_beta());
    }

    #[test]
    fn partial_alpha_beta_profile_keeps_alpha_beta_defaults() {
        let de: MapDeserializer<'_, _, Error> =
            MapDeserializer::new(vec![("maxDepth", 4u8)].into_iter());
        let profile = alpha_beta_profile(de).unwrap();

        assert_eq!(profile.max_depth, 4);
        assert_eq!(profile.win_score, 100);
        assert!(profile.static_eval);

        let de: MapDeserializer<'_, _, Error> =
            MapDeserializer::new(Vec::<(&str, u8)>::new().into_iter());
        assert_eq!(alpha_beta_profile(de).unwrap(), SearchProfile::alpha_beta());

        let de: MapDeserializer<'_, _, Error> =
            MapDeserializer::new(vec![("staticEval", false)].into_iter());
        let profile = alpha_beta_profile(de).unwrap();
        assert_eq!(profile.max_depth, 3);
        assert!(!profile.static_eval);
    }

    #[test]
    fn out_of_range_options_are_rejected() {
        assert!(HanoiOptions { disks: 0, ..HanoiOptions::default() }.validate().is_err());
        assert!(HanoiOptions { disks: 21, ..HanoiOptions::default() }.validate().is_err());
        assert!(
            KnightOptions {
                start: Position::new(5, 0),
                size: 5,
                ..KnightOptions::default()
            }
            .validate()
            .is_err()
        );
        assert!(QueensOptions { size: 14, first_only: false }.validate().is_err());
        assert!(QueensOptions { size: 14, first_only: true }.validate().is_ok());

        let deep = TicTacToeOptions {
            minimax: SearchProfile {
                max_depth: 9,
                ..SearchProfile::minimax()
            },
            ..TicTacToeOptions::default()
        };
        assert!(deep.validate().is_err());
    }

    #[test]
    fn tsp_options_build_a_game_with_the_selection() {
        let options = TspOptions {
            seed: 8,
            home: Some(3),
            selected: Some(vec![0, 5, 7]),
            ..TspOptions::default()
        };
        let game = options.build_game().unwrap();

        assert_eq!(game.home(), 3);
        assert_eq!(game.selected(), &[0, 5, 7]);
        assert_eq!(game.matrix().size(), 10);

        let everything = TspOptions::default().build_game().unwrap();
        assert_eq!(everything.selected().len(), 9);

        let blank = TspOptions::default().build_map().unwrap();
        assert!(blank.selected().is_empty());
        assert_eq!(blank.home(), everything.home());

        let bad = TspOptions {
            home: Some(2),
            selected: Some(vec![2]),
            ..TspOptions::default()
        };
        assert!(bad.build_game().is_err());
    }

    #[test]
    fn tsp_options_reject_overlong_legs() {
        let far = u32::MAX / 2;
        let options = TspOptions {
            distances: Some(vec![vec![0, far], vec![far, 0]]),
            home: Some(0),
            ..TspOptions::default()
        };

        assert!(matches!(
            options.build_game(),
            Err(PuzzleError::InvalidArgument(_))
        ));
    }
}
