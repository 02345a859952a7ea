use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::{DistanceMatrix, GeneticParams, Route, TspAlgorithm, city_label, exact, solve};
use crate::error::{PuzzleError, Result};
use crate::timing::{Timed, timed};

pub const DEFAULT_CITY_COUNT: usize = 10;

/// Player's route next to the shortest one for the same selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteComparison {
    pub player: Route,
    pub optimal: Route,
    pub extra_distance: u32,
    pub is_optimal: bool,
}

/// Pick cities on a random map, then try to beat the solvers.
pub struct TspGame {
    matrix: DistanceMatrix,
    home: usize,
    selected: Vec<usize>,
    rng: SmallRng,
}

impl TspGame {
    pub fn new(cities: usize, seed: u64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let matrix = DistanceMatrix::random(cities, &mut rng)?;
        let home = rng.gen_range(0..cities);
        log::debug!("new map with {cities} cities, home {}", city_label(home));
        Ok(Self {
            matrix,
            home,
            selected: Vec::new(),
            rng,
        })
    }

    pub fn with_matrix(matrix: DistanceMatrix, home: usize, seed: u64) -> Result<Self> {
        matrix.check_cities(home, &[])?;
        Ok(Self {
            matrix,
            home,
            selected: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    pub fn home(&self) -> usize {
        self.home
    }

    /// Selected cities in the order they were picked.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Adds or removes `city` from the selection. Returns whether it is now selected.
    pub fn toggle_city(&mut self, city: usize) -> Result<bool> {
        if city >= self.matrix.size() {
            return Err(PuzzleError::invalid(format!("city {city} is out of range")));
        }
        if city == self.home {
            return Err(PuzzleError::invalid("the home city is always part of the route"));
        }
        if let Some(slot) = self.selected.iter().position(|&c| c == city) {
            self.selected.remove(slot);
            Ok(false)
        } else {
            self.selected.push(city);
            Ok(true)
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn solve(&mut self, algorithm: TspAlgorithm, genetic: &GeneticParams) -> Result<Timed<Route>> {
        let Self {
            matrix,
            home,
            selected,
            rng,
        } = self;
        timed(algorithm.name(), || solve(algorithm, matrix, *home, selected, genetic, rng)).transpose()
    }

    /// Scores a visiting order for the current selection against the optimum.
    pub fn submit_route(&self, order: &[usize]) -> Result<RouteComparison> {
        if self.selected.is_empty() {
            return Err(PuzzleError::invalid("select at least one city first"));
        }
        let player = Route::closed(&self.matrix, self.home, order);
        if !player.visits_exactly(self.home, &self.selected) {
            return Err(PuzzleError::illegal(
                "route must visit every selected city exactly once",
            ));
        }

        let optimal = exact::held_karp(&self.matrix, self.home, &self.selected)?;
        let extra_distance = player.distance.saturating_sub(optimal.distance);
        Ok(RouteComparison {
            is_optimal: extra_distance == 0,
            extra_distance,
            player,
            optimal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsp::MAX_LEG_DISTANCE;
    use crate::tsp::fixtures::square;

    #[test]
    fn new_game_has_random_home_within_map() {
        let game = TspGame::new(DEFAULT_CITY_COUNT, 17).unwrap();

        assert_eq!(game.matrix().size(), 10);
        assert!(game.home() < 10);
        assert!(game.selected().is_empty());
    }

    #[test]
    fn toggling_selects_and_deselects() {
        let mut game = TspGame::with_matrix(square(), 0, 0).unwrap();

        assert!(game.toggle_city(2).unwrap());
        assert!(game.toggle_city(1).unwrap());
        assert_eq!(game.selected(), &[2, 1]);
        assert!(!game.toggle_city(2).unwrap());
        assert_eq!(game.selected(), &[1]);
        assert!(game.toggle_city(0).is_err());
        assert!(game.toggle_city(4).is_err());
    }

    #[test]
    fn submitted_route_is_compared_with_optimum() {
        let mut game = TspGame::with_matrix(square(), 0, 0).unwrap();
        for city in [1, 2, 3] {
            game.toggle_city(city).unwrap();
        }

        let crossed = game.submit_route(&[2, 1, 3]).unwrap();
        assert_eq!(crossed.player.distance, 48);
        assert_eq!(crossed.optimal.distance, 40);
        assert_eq!(crossed.extra_distance, 8);
        assert!(!crossed.is_optimal);

        assert!(game.submit_route(&[1, 2, 3]).unwrap().is_optimal);
        assert!(game.submit_route(&[1, 2]).is_err());
        assert!(game.submit_route(&[1, 2, 3, 1]).is_err());
    }

    #[test]
    fn overlong_submitted_route_is_rejected() {
        let longest = MAX_LEG_DISTANCE;
        let matrix = DistanceMatrix::from_rows(&[
            vec![0, longest, longest],
            vec![longest, 0, longest],
            vec![longest, longest, 0],
        ])
        .unwrap();
        let mut game = TspGame::with_matrix(matrix, 0, 0).unwrap();
        game.toggle_city(1).unwrap();
        game.toggle_city(2).unwrap();
        let looping: Vec<usize> = (0..64).map(|i| 1 + i % 2).collect();

        let err = game.submit_route(&looping).unwrap_err();
        assert!(matches!(err, PuzzleError::IllegalMove(_)));
    }

    #[test]
    fn every_algorithm_solves_the_selection() {
        crate::init_test_logger();
        let mut game = TspGame::new(DEFAULT_CITY_COUNT, 2).unwrap();
        let home = game.home();
        for city in (0..10).filter(|&c| c != home).take(6) {
            game.toggle_city(city).unwrap();
        }
        let selected = game.selected().to_vec();
        let params = GeneticParams::default();
        let optimum = game.solve(TspAlgorithm::DynamicProgramming, &params).unwrap();

        for algorithm in [
            TspAlgorithm::BruteForce,
            TspAlgorithm::Genetic,
            TspAlgorithm::NearestNeighbour,
            TspAlgorithm::TwoOpt,
        ] {
            let run = game.solve(algorithm, &params).unwrap();
            assert_eq!(run.algorithm, algorithm.name());
            assert!(run.output.visits_exactly(home, &selected));
            if algorithm.is_exact() {
                assert_eq!(run.output.distance, optimum.output.distance);
            } else {
                assert!(run.output.distance >= optimum.output.distance);
            }
        }
    }
}
