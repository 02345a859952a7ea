//! Traveling salesman over a symmetric integer distance matrix.
//!
//! Routes are closed: they start at the home city, visit each selected city
//! once and come back home. Cities are indices, labelled `A`, `B`, ... for
//! display.

pub mod exact;
pub mod game;
pub mod genetic;
pub mod heuristics;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};

pub use game::{RouteComparison, TspGame};
pub use genetic::GeneticParams;

pub const MIN_DISTANCE: u32 = 50;
pub const MAX_DISTANCE: u32 = 100;
pub const MAX_CITIES: usize = 26;
/// Longest accepted leg. A closed tour has at most `MAX_CITIES` legs, so any
/// tour length fits in a `u32`.
pub const MAX_LEG_DISTANCE: u32 = u32::MAX / MAX_CITIES as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TspAlgorithm {
    #[serde(alias = "bruteforce")]
    BruteForce,
    #[default]
    #[serde(alias = "dynamic")]
    DynamicProgramming,
    Genetic,
    NearestNeighbour,
    TwoOpt,
}

impl TspAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::BruteForce => "bruteforce",
            Self::DynamicProgramming => "dynamic",
            Self::Genetic => "genetic",
            Self::NearestNeighbour => "nearestNeighbour",
            Self::TwoOpt => "twoOpt",
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, Self::BruteForce | Self::DynamicProgramming)
    }
}

pub fn city_label(city: usize) -> char {
    if city < MAX_CITIES {
        (b'A' + city as u8) as char
    } else {
        '?'
    }
}

/// Symmetric distances with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceMatrix {
    size: usize,
    distances: Vec<u32>,
}

impl DistanceMatrix {
    /// Uniform integer distances in `MIN_DISTANCE..=MAX_DISTANCE`.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self> {
        check_size(size)?;
        let mut matrix = Self {
            size,
            distances: vec![0; size * size],
        };
        for i in 0..size {
            for j in i + 1..size {
                let d = rng.gen_range(MIN_DISTANCE..=MAX_DISTANCE);
                matrix.distances[i * size + j] = d;
                matrix.distances[j * size + i] = d;
            }
        }
        Ok(matrix)
    }

    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self> {
        let size = rows.len();
        check_size(size)?;
        if rows.iter().any(|row| row.len() != size) {
            return Err(PuzzleError::invalid("distance matrix must be square"));
        }
        for i in 0..size {
            if rows[i][i] != 0 {
                return Err(PuzzleError::invalid(format!(
                    "distance from {} to itself must be 0",
                    city_label(i)
                )));
            }
            for j in i + 1..size {
                if rows[i][j] > MAX_LEG_DISTANCE {
                    return Err(PuzzleError::invalid(format!(
                        "distance {}-{} must be at most {MAX_LEG_DISTANCE}, got {}",
                        city_label(i),
                        city_label(j),
                        rows[i][j]
                    )));
                }
                if rows[i][j] != rows[j][i] {
                    return Err(PuzzleError::invalid(format!(
                        "distance {}-{} is not symmetric",
                        city_label(i),
                        city_label(j)
                    )));
                }
            }
        }
        Ok(Self {
            size,
            distances: rows.concat(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn distance(&self, from: usize, to: usize) -> u32 {
        self.distances[from * self.size + to]
    }

    pub fn rows(&self) -> Vec<Vec<u32>> {
        self.distances
            .chunks(self.size)
            .map(<[u32]>::to_vec)
            .collect()
    }

    /// Total length of consecutive legs, saturating for paths longer than a tour.
    pub fn route_distance(&self, stops: &[usize]) -> u32 {
        stops
            .windows(2)
            .map(|leg| self.distance(leg[0], leg[1]))
            .fold(0, u32::saturating_add)
    }

    /// Checks that `cities` are distinct, in range, and exclude `home`.
    pub fn check_cities(&self, home: usize, cities: &[usize]) -> Result<()> {
        if home >= self.size {
            return Err(PuzzleError::invalid(format!("home city {home} is out of range")));
        }
        let mut seen = vec![false; self.size];
        seen[home] = true;
        for &city in cities {
            if city >= self.size {
                return Err(PuzzleError::invalid(format!("city {city} is out of range")));
            }
            if seen[city] {
                return Err(PuzzleError::invalid(format!(
                    "city {} is listed twice or is the home city",
                    city_label(city)
                )));
            }
            seen[city] = true;
        }
        Ok(())
    }
}

fn check_size(size: usize) -> Result<()> {
    if size == 0 || size > MAX_CITIES {
        return Err(PuzzleError::invalid(format!(
            "city count must be between 1 and {MAX_CITIES}, got {size}"
        )));
    }
    Ok(())
}

/// Closed tour: `stops` starts and ends at the home city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub stops: Vec<usize>,
    pub distance: u32,
}

impl Route {
    /// Home, then `order`, then home again.
    pub fn closed(matrix: &DistanceMatrix, home: usize, order: &[usize]) -> Self {
        let mut stops = Vec::with_capacity(order.len() + 2);
        stops.push(home);
        stops.extend_from_slice(order);
        if !order.is_empty() {
            stops.push(home);
        }
        let distance = matrix.route_distance(&stops);
        Self { stops, distance }
    }

    pub fn home(&self) -> Option<usize> {
        self.stops.first().copied()
    }

    /// Stops between the two visits of the home city.
    pub fn order(&self) -> &[usize] {
        match self.stops.len() {
            0..=2 => &[],
            n => &self.stops[1..n - 1],
        }
    }

    /// e.g. `A-C-B-A`.
    pub fn describe(&self) -> String {
        self.stops
            .iter()
            .map(|&city| city_label(city).to_string())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Starts and ends at `home` and visits exactly `cities`, once each.
    pub fn visits_exactly(&self, home: usize, cities: &[usize]) -> bool {
        if cities.is_empty() {
            return self.stops == [home];
        }
        if self.stops.first() != Some(&home) || self.stops.last() != Some(&home) {
            return false;
        }
        let mut visited = self.order().to_vec();
        let mut expected = cities.to_vec();
        visited.sort_unstable();
        expected.sort_unstable();
        visited == expected
    }
}

/// Runs one solver over `cities` starting from `home`.
pub fn solve<R: Rng + ?Sized>(
    algorithm: TspAlgorithm,
    matrix: &DistanceMatrix,
    home: usize,
    cities: &[usize],
    params: &GeneticParams,
    rng: &mut R,
) -> Result<Route> {
    matrix.check_cities(home, cities)?;
    match algorithm {
        TspAlgorithm::BruteForce => exact::brute_force(matrix, home, cities),
        TspAlgorithm::DynamicProgramming => exact::held_karp(matrix, home, cities),
        TspAlgorithm::Genetic => genetic::genetic(matrix, home, cities, params, rng),
        TspAlgorithm::NearestNeighbour => Ok(heuristics::nearest_neighbour(matrix, home, cities)),
        TspAlgorithm::TwoOpt => {
            let start = heuristics::nearest_neighbour(matrix, home, cities);
            Ok(heuristics::two_opt(matrix, start))
        }
    }
}
