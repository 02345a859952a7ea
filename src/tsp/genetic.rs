use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{DistanceMatrix, Route};
use crate::error::{PuzzleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneticParams {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.01,
        }
    }
}

impl GeneticParams {
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(PuzzleError::invalid("population size must be at least 2"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(PuzzleError::invalid(format!(
                "mutation rate must be within 0..=1, got {}",
                self.mutation_rate
            )));
        }
        Ok(())
    }
}

/// Evolves visiting orders with roulette selection, ordered crossover and
/// swap mutation. Returns the shortest order seen in any generation.
pub fn genetic<R: Rng + ?Sized>(
    matrix: &DistanceMatrix,
    home: usize,
    cities: &[usize],
    params: &GeneticParams,
    rng: &mut R,
) -> Result<Route> {
    params.validate()?;
    if cities.len() < 3 {
        return Ok(Route::closed(matrix, home, cities));
    }

    let length = |order: &[usize]| {
        matrix.distance(home, order[0])
            + matrix.route_distance(order)
            + matrix.distance(order[order.len() - 1], home)
    };

    let mut population: Vec<Vec<usize>> = (0..params.population_size)
        .map(|_| {
            let mut order = cities.to_vec();
            order.shuffle(rng);
            order
        })
        .collect();

    let mut best = population[0].clone();
    let mut best_length = length(&best);

    for generation in 0..params.generations {
        let lengths: Vec<u32> = population.iter().map(|order| length(order)).collect();
        if let Some((i, &shortest)) = lengths.iter().enumerate().min_by_key(|&(_, &l)| l)
            && shortest < best_length
        {
            best_length = shortest;
            best.clone_from(&population[i]);
            log::trace!("generation {generation}: new best {best_length}");
        }

        let fitness: Vec<f64> = lengths.iter().map(|&l| 1.0 / f64::from(l.max(1))).collect();
        let mut next = Vec::with_capacity(population.len());
        while next.len() < population.len() {
            let a = &population[roulette(&fitness, rng)];
            let b = &population[roulette(&fitness, rng)];
            for mut child in [ordered_crossover(a, b, rng), ordered_crossover(b, a, rng)] {
                swap_mutation(&mut child, params.mutation_rate, rng);
                next.push(child);
            }
        }
        next.truncate(population.len());
        population = next;
    }

    if let Some(shortest) = population.iter().min_by_key(|order| length(order))
        && length(shortest) < best_length
    {
        best.clone_from(shortest);
    }

    Ok(Route::closed(matrix, home, &best))
}

/// Picks an index with probability proportional to its fitness.
fn roulette<R: Rng + ?Sized>(fitness: &[f64], rng: &mut R) -> usize {
    let total: f64 = fitness.iter().sum();
    let mut pick = rng.gen_range(0.0..total);
    for (i, f) in fitness.iter().enumerate() {
        if pick < *f {
            return i;
        }
        pick -= f;
    }
    fitness.len() - 1
}

/// Copies a random slice of `first` in place, then fills the other slots
/// with the remaining cities in the order they appear in `second`.
fn ordered_crossover<R: Rng + ?Sized>(first: &[usize], second: &[usize], rng: &mut R) -> Vec<usize> {
    let n = first.len();
    let a = rng.gen_range(0..n);
    let b = rng.gen_range(0..n);
    let (start, end) = if a <= b { (a, b + 1) } else { (b, a + 1) };

    let kept = &first[start..end];
    let mut filler = second.iter().filter(|city| !kept.contains(city));
    (0..n)
        .map(|i| {
            if (start..end).contains(&i) {
                first[i]
            } else {
                filler.next().copied().unwrap_or(first[i])
            }
        })
        .collect()
}

fn swap_mutation<R: Rng + ?Sized>(order: &mut [usize], rate: f64, rng: &mut R) {
    for i in 0..order.len() {
        if rng.gen_bool(rate) {
            let j = rng.gen_range(0..order.len());
            order.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsp::exact::held_karp;
    use crate::tsp::fixtures::seeded;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn is_permutation_of(order: &[usize], cities: &[usize]) -> bool {
        let mut a = order.to_vec();
        let mut b = cities.to_vec();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    #[test]
    fn crossover_children_are_permutations() {
        let mut rng = SmallRng::seed_from_u64(9);
        let first = [1, 2, 3, 4, 5, 6];
        let second = [6, 4, 2, 5, 3, 1];

        for _ in 0..100 {
            let child = ordered_crossover(&first, &second, &mut rng);
            assert!(is_permutation_of(&child, &first), "{child:?}");
        }
    }

    #[test]
    fn mutation_keeps_every_city() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut order = vec![1, 2, 3, 4, 5];
        swap_mutation(&mut order, 1.0, &mut rng);

        assert!(is_permutation_of(&order, &[1, 2, 3, 4, 5]));
    }

    #[test]
    fn roulette_favours_fitter_individuals() {
        let mut rng = SmallRng::seed_from_u64(11);
        let fitness = [0.1, 10.0];
        let fit_picks = (0..1000).filter(|_| roulette(&fitness, &mut rng) == 1).count();

        assert!(fit_picks > 900);
    }

    #[test]
    fn genetic_route_is_valid_and_not_shorter_than_optimum() {
        let cities: Vec<usize> = (1..10).collect();
        for seed in 0..5 {
            let matrix = seeded(10, seed);
            let mut rng = SmallRng::seed_from_u64(seed);
            let route = genetic(&matrix, 0, &cities, &GeneticParams::default(), &mut rng).unwrap();
            let optimum = held_karp(&matrix, 0, &cities).unwrap();

            assert!(route.visits_exactly(0, &cities));
            assert!(route.distance >= optimum.distance);
            assert_eq!(route.distance, matrix.route_distance(&route.stops));
        }
    }

    #[test]
    fn same_seed_gives_same_route() {
        let matrix = seeded(8, 4);
        let cities: Vec<usize> = (1..8).collect();
        let params = GeneticParams::default();

        let a = genetic(&matrix, 0, &cities, &params, &mut SmallRng::seed_from_u64(1)).unwrap();
        let b = genetic(&matrix, 0, &cities, &params, &mut SmallRng::seed_from_u64(1)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let matrix = seeded(5, 0);
        let params = GeneticParams {
            mutation_rate: 1.5,
            ..GeneticParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(0);

        assert!(genetic(&matrix, 0, &[1, 2, 3, 4], &params, &mut rng).is_err());
    }
}
