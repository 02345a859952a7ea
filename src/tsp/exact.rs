use super::{DistanceMatrix, Route};
use crate::error::{PuzzleError, Result};

/// Largest selection brute force will enumerate (10! orders).
pub const MAX_BRUTE_FORCE_CITIES: usize = 10;
/// Largest selection for the bitmask DP table.
pub const MAX_DP_CITIES: usize = 16;

const UNREACHED: u32 = u32::MAX;

/// Tries every visiting order. Ties go to the lexicographically first order.
pub fn brute_force(matrix: &DistanceMatrix, home: usize, cities: &[usize]) -> Result<Route> {
    if cities.len() > MAX_BRUTE_FORCE_CITIES {
        return Err(PuzzleError::invalid(format!(
            "brute force handles at most {MAX_BRUTE_FORCE_CITIES} cities, got {}",
            cities.len()
        )));
    }

    let mut order = cities.to_vec();
    order.sort_unstable();
    let mut best_order = order.clone();
    let mut best = tour_length(matrix, home, &order);
    let mut checked = 1u64;

    while next_permutation(&mut order) {
        checked += 1;
        let length = tour_length(matrix, home, &order);
        if length < best {
            best = length;
            best_order.copy_from_slice(&order);
        }
    }
    log::debug!("brute force checked {checked} orders, best {best}");

    Ok(Route::closed(matrix, home, &best_order))
}

/// Held-Karp dynamic programming over subsets of `cities`.
pub fn held_karp(matrix: &DistanceMatrix, home: usize, cities: &[usize]) -> Result<Route> {
    let k = cities.len();
    if k > MAX_DP_CITIES {
        return Err(PuzzleError::invalid(format!(
            "dynamic programming handles at most {MAX_DP_CITIES} cities, got {k}"
        )));
    }
    if k == 0 {
        return Ok(Route::closed(matrix, home, &[]));
    }

    // cost[mask * k + j]: shortest path from home through `mask`, ending at j.
    let full = (1usize << k) - 1;
    let mut cost = vec![UNREACHED; (full + 1) * k];
    let mut parent = vec![u8::MAX; (full + 1) * k];

    for (j, &city) in cities.iter().enumerate() {
        cost[(1 << j) * k + j] = matrix.distance(home, city);
    }

    for mask in 1..=full {
        for j in 0..k {
            let here = cost[mask * k + j];
            if mask & (1 << j) == 0 || here == UNREACHED {
                continue;
            }
            for next in 0..k {
                if mask & (1 << next) != 0 {
                    continue;
                }
                let grown = mask | (1 << next);
                let candidate = here + matrix.distance(cities[j], cities[next]);
                let slot = grown * k + next;
                if candidate < cost[slot] {
                    cost[slot] = candidate;
                    parent[slot] = j as u8;
                }
            }
        }
    }

    let Some((mut last, _)) = (0..k)
        .map(|j| (j, cost[full * k + j] + matrix.distance(cities[j], home)))
        .min_by_key(|&(_, total)| total)
    else {
        return Err(PuzzleError::NoSolution);
    };

    let mut order = Vec::with_capacity(k);
    let mut mask = full;
    loop {
        order.push(cities[last]);
        let prev = parent[mask * k + last];
        mask &= !(1 << last);
        if prev == u8::MAX {
            break;
        }
        last = prev as usize;
    }
    order.reverse();

    Ok(Route::closed(matrix, home, &order))
}

fn tour_length(matrix: &DistanceMatrix, home: usize, order: &[usize]) -> u32 {
    let (Some(&first), Some(&last)) = (order.first(), order.last()) else {
        return 0;
    };
    matrix.distance(home, first) + matrix.route_distance(order) + matrix.distance(last, home)
}

/// Steps `items` to the next lexicographic permutation; false once it wraps.
fn next_permutation(items: &mut [usize]) -> bool {
    let Some(pivot) = items.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let Some(swap) = items.iter().rposition(|&x| x > items[pivot]) else {
        return false;
    };
    items.swap(pivot, swap);
    items[pivot + 1..].reverse();
    true
}
