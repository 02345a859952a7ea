use super::{DistanceMatrix, Route};

/// Greedy tour: always drive to the closest unvisited city.
///
/// Ties go to whichever city appears first in `cities`.
pub fn nearest_neighbour(matrix: &DistanceMatrix, home: usize, cities: &[usize]) -> Route {
    let mut remaining = cities.to_vec();
    let mut order = Vec::with_capacity(cities.len());
    let mut current = home;

    while !remaining.is_empty() {
        let Some((slot, _)) = remaining
            .iter()
            .enumerate()
            .min_by_key(|&(_, &city)| matrix.distance(current, city))
        else {
            break;
        };
        current = remaining.remove(slot);
        order.push(current);
    }

    Route::closed(matrix, home, &order)
}

/// Reverses segments while that shortens the tour. The home city at both
/// ends never moves.
pub fn two_opt(matrix: &DistanceMatrix, route: Route) -> Route {
    let mut stops = route.stops;
    if stops.len() < 4 {
        let distance = matrix.route_distance(&stops);
        return Route { stops, distance };
    }

    let last = stops.len() - 1;
    let mut improved = true;
    let mut passes = 0u32;
    while improved {
        improved = false;
        passes += 1;
        for i in 1..last - 1 {
            for j in i + 1..last {
                let before = matrix.distance(stops[i - 1], stops[i])
                    + matrix.distance(stops[j], stops[j + 1]);
                let after = matrix.distance(stops[i - 1], stops[j])
                    + matrix.distance(stops[i], stops[j + 1]);
                if after < before {
                    stops[i..=j].reverse();
                    improved = true;
                }
            }
        }
    }
    log::trace!("2-opt settled after {passes} passes");

    let distance = matrix.route_distance(&stops);
    Route { stops, distance }
}
