//! Greedy reassignment pass run after the hyena search.
//!
//! Every served stop is handed out again, closest to the depot first, to
//! the first vehicle that can still take it. Each vehicle is then reordered
//! by nearest neighbour from the depot when that order stays feasible.

use crate::evaluation::is_insertion_feasible;
use crate::instance::Instance;
use crate::models::{Route, Solution};

/// Reassigns the stops of `solution` over the same number of vehicles.
///
/// Paired stops travel together, pickup first. Returns `None` when some
/// stop fits no vehicle. The result is not evaluated.
pub fn greedy_reassign(solution: &Solution, instance: &Instance) -> Option<Solution> {
    let slots = solution.num_routes();
    if slots == 0 {
        return None;
    }

    let mut stops: Vec<usize> = solution
        .routes()
        .iter()
        .flat_map(|r| r.stops().iter().copied())
        .collect();
    stops.sort_by(|&a, &b| {
        instance
            .distance(0, a)
            .total_cmp(&instance.distance(0, b))
            .then(a.cmp(&b))
    });

    let capacity = instance.capacity();
    let mut vehicles: Vec<Vec<usize>> = vec![Vec::new(); slots];
    let mut placed = vec![false; instance.num_locations()];

    for s in stops {
        if placed[s] {
            continue;
        }
        let unit = visit_unit(s, instance);
        let slot = vehicles.iter().position(|v| {
            let mut trial = v.clone();
            trial.extend_from_slice(&unit);
            is_insertion_feasible(&trial, instance, capacity)
        })?;
        vehicles[slot].extend_from_slice(&unit);
        for u in unit {
            placed[u] = true;
        }
    }

    let routes = vehicles
        .into_iter()
        .map(|assigned| {
            let reordered = nearest_neighbor_order(&assigned, instance);
            if is_insertion_feasible(&reordered, instance, capacity) {
                Route::from_valid(reordered, instance)
            } else {
                Route::from_valid(assigned, instance)
            }
        })
        .collect();
    Some(Solution::from_valid_routes(routes))
}

/// Orders `stops` by repeatedly visiting the closest remaining stop,
/// starting from the depot.
pub fn nearest_neighbor_order(stops: &[usize], instance: &Instance) -> Vec<usize> {
    let mut remaining = stops.to_vec();
    let mut order = Vec::with_capacity(stops.len());
    let mut current = 0;
    while let Some(next) = instance.distances().nearest_neighbor(current, &remaining) {
        if let Some(k) = remaining.iter().position(|&r| r == next) {
            remaining.swap_remove(k);
        }
        order.push(next);
        current = next;
    }
    order
}

/// A stop alone, or its pickup/delivery pair in pickup-first order.
fn visit_unit(stop: usize, instance: &Instance) -> Vec<usize> {
    let loc = instance.location(stop);
    match loc.pair() {
        Some(sibling) if loc.is_pickup() => vec![stop, sibling],
        Some(sibling) => vec![sibling, stop],
        None => vec![stop],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{line_instance, line_seed};
    use crate::models::{Location, TimeWindow};

    #[test]
    fn test_nearest_neighbor_order() {
        let locs = vec![
            Location::depot(0.0, 0.0),
            Location::new(1, 10.0, 0.0).with_pickup(1.0, 0.0),
            Location::new(2, 1.0, 0.0).with_pickup(1.0, 0.0),
            Location::new(3, 5.0, 0.0).with_pickup(1.0, 0.0),
        ];
        let inst = Instance::new(locs, 10.0).expect("instance");
        assert_eq!(nearest_neighbor_order(&[1, 2, 3], &inst), vec![2, 3, 1]);
        assert!(nearest_neighbor_order(&[], &inst).is_empty());
    }

    #[test]
    fn test_greedy_reassign_covers_and_is_feasible() {
        let inst = line_instance(12, 10.0);
        let seed = line_seed(&inst, 4);
        let out = greedy_reassign(&seed, &inst).expect("fits");
        assert_eq!(out.num_routes(), 4);
        assert!(out.covers_all(inst.num_locations()));
        assert!(out.is_feasible());
    }

    #[test]
    fn test_greedy_fills_first_vehicle_first() {
        let inst = line_instance(6, 100.0);
        let seed = line_seed(&inst, 3);
        let out = greedy_reassign(&seed, &inst).expect("fits");
        assert_eq!(out.route(0).len(), 6);
        assert!(out.route(1).is_empty());
        assert!(out.route(2).is_empty());
    }

    #[test]
    fn test_greedy_none_when_capacity_too_small() {
        // total pickup 1+2+3 = 6 does not fit one vehicle of 4
        let locs = vec![
            Location::depot(0.0, 0.0),
            Location::new(1, 1.0, 0.0).with_pickup(1.0, 0.0),
            Location::new(2, 2.0, 0.0).with_pickup(2.0, 0.0),
            Location::new(3, 3.0, 0.0).with_pickup(3.0, 0.0),
        ];
        let inst = Instance::new(locs, 4.0).expect("instance");
        let crammed = Solution::from_index_sequences(&[vec![1, 2, 3]], &inst).expect("sol");
        assert!(greedy_reassign(&crammed, &inst).is_none());
    }

    #[test]
    fn test_greedy_keeps_pairs_together() {
        let tw = TimeWindow::new(0.0, 1000.0).expect("tw");
        let locs = vec![
            Location::depot(0.0, 0.0),
            Location::new(1, 9.0, 0.0)
                .with_pickup(2.0, 0.0)
                .with_time_window(tw)
                .with_pair(2),
            Location::new(2, 1.0, 0.0)
                .with_delivery(2.0, 0.0)
                .with_time_window(tw)
                .with_pair(1),
            Location::new(3, 4.0, 0.0).with_pickup(1.0, 0.0),
        ];
        let inst = Instance::new(locs, 5.0).expect("instance");
        let seed = Solution::from_index_sequences(&[vec![1, 2], vec![3]], &inst).expect("sol");
        let out = greedy_reassign(&seed, &inst).expect("fits");
        assert!(out.covers_all(inst.num_locations()));
        let r = out.route(0).stops();
        let p = r.iter().position(|&s| s == 1).expect("pickup");
        let d = r.iter().position(|&s| s == 2).expect("delivery");
        assert!(p < d);
        assert!(out.is_feasible());
    }
}
