//! Hard feasibility gate.

use crate::instance::Instance;

const EPS: f64 = 1e-9;

/// Returns `true` if the stop sequence satisfies every hard constraint.
///
/// Walks the route once from the depot:
///
/// - **Time**: the clock starts at 0, advances by travel time, is raised to
///   the stop's earliest arrival, and must not exceed its latest arrival;
///   then service time is added. The return to the depot must respect the
///   depot's window.
/// - **Load**: the vehicle leaves loaded with the goods for its unpaired
///   delivery stops. Each stop unloads its delivery demand, then loads its
///   pickup demand. The load may never exceed `capacity` nor go negative.
/// - **Pairs**: a paired stop's sibling must be on the same route, pickup
///   first.
///
/// This is a yes/no gate used before committing a mutation. It stops at the
/// first violation. Ranking of infeasible candidates goes through the
/// penalized [`Evaluator`](super::Evaluator) instead.
pub fn is_insertion_feasible(stops: &[usize], instance: &Instance, capacity: f64) -> bool {
    if stops.is_empty() {
        return true;
    }
    if instance.has_pairs() && !pairs_respected(stops, instance) {
        return false;
    }

    let mut load = departure_load(stops, instance);
    if load > capacity + EPS {
        return false;
    }

    let mut clock = 0.0;
    let mut prev = 0;
    for &s in stops {
        let loc = instance.location(s);

        if loc.is_delivery() {
            load -= loc.delivery_demand();
            if load < -EPS {
                return false;
            }
        }
        if loc.is_pickup() {
            load += loc.pickup_demand();
            if load > capacity + EPS {
                return false;
            }
        }

        clock += instance.travel_time(prev, s);
        let tw = loc.time_window();
        clock = clock.max(tw.ready());
        if tw.is_violated(clock) {
            return false;
        }
        clock += loc.service_time();
        prev = s;
    }

    clock += instance.travel_time(prev, 0);
    !instance.depot().time_window().is_violated(clock)
}

/// Load on board when leaving the depot.
///
/// Sum of the delivery demand of every unpaired delivery stop.
pub(crate) fn departure_load(stops: &[usize], instance: &Instance) -> f64 {
    stops
        .iter()
        .map(|&s| instance.location(s))
        .filter(|l| l.is_delivery() && l.pair().is_none())
        .map(|l| l.delivery_demand())
        .sum()
}

/// Every paired stop has its sibling on the route, pickup before delivery.
pub(crate) fn pairs_respected(stops: &[usize], instance: &Instance) -> bool {
    stops.iter().enumerate().all(|(pos, &s)| {
        let loc = instance.location(s);
        let Some(sibling) = loc.pair() else {
            return true;
        };
        match stops.iter().position(|&x| x == sibling) {
            Some(sib_pos) if loc.is_pickup() => pos < sib_pos,
            Some(sib_pos) => sib_pos < pos,
            None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, TimeWindow};

    fn tw(a: f64, b: f64) -> TimeWindow {
        TimeWindow::new(a, b).expect("tw")
    }

    /// Depot at origin and four pickup stops on the x-axis.
    fn line_instance(capacity: f64) -> Instance {
        let mut locs = vec![Location::depot(0.0, 0.0)];
        for (i, d) in [(1, 0.0), (2, 5.0), (3, 3.0), (4, 2.0)] {
            locs.push(
                Location::new(i, i as f64, 0.0)
                    .with_pickup(d, 0.0)
                    .with_time_window(tw(0.0, 1000.0)),
            );
        }
        Instance::new(locs, capacity).expect("instance")
    }

    #[test]
    fn test_empty_route_feasible() {
        let inst = line_instance(10.0);
        assert!(is_insertion_feasible(&[], &inst, 10.0));
    }

    #[test]
    fn test_capacity_exact_limit() {
        let inst = line_instance(10.0);
        assert!(is_insertion_feasible(&[1, 2, 3, 4], &inst, 10.0));
        assert!(!is_insertion_feasible(&[1, 2, 3, 4], &inst, 9.0));
    }

    #[test]
    fn test_time_window_hard_fail() {
        let locs = vec![
            Location::depot(0.0, 0.0),
            Location::new(1, 10.0, 0.0).with_pickup(1.0, 5.0),
            Location::new(2, 20.0, 0.0)
                .with_pickup(1.0, 0.0)
                .with_time_window(tw(0.0, 19.0)),
        ];
        let inst = Instance::new(locs, 10.0).expect("instance");
        // arrive at 2 at t=10+5+10=25 > 19
        assert!(!is_insertion_feasible(&[1, 2], &inst, 10.0));
        // direct: arrive at 20 > 19 still
        assert!(!is_insertion_feasible(&[2], &inst, 10.0));
    }

    #[test]
    fn test_waiting_then_service() {
        let locs = vec![
            Location::depot(0.0, 0.0),
            Location::new(1, 1.0, 0.0)
                .with_pickup(1.0, 2.0)
                .with_time_window(tw(50.0, 60.0)),
            Location::new(2, 2.0, 0.0)
                .with_pickup(1.0, 0.0)
                .with_time_window(tw(0.0, 52.0)),
        ];
        let inst = Instance::new(locs, 10.0).expect("instance");
        // wait until 50, serve until 52, arrive at 2 at 53
        assert!(!is_insertion_feasible(&[1, 2], &inst, 10.0));
        assert!(is_insertion_feasible(&[2, 1], &inst, 10.0));
    }

    #[test]
    fn test_depot_return_window() {
        let locs = vec![
            Location::depot(0.0, 0.0).with_time_window(tw(0.0, 15.0)),
            Location::new(1, 10.0, 0.0).with_pickup(1.0, 0.0),
        ];
        let inst = Instance::new(locs, 10.0).expect("instance");
        assert!(!is_insertion_feasible(&[1], &inst, 10.0));
    }

    #[test]
    fn test_delivery_load_starts_on_board() {
        let locs = vec![
            Location::depot(0.0, 0.0),
            Location::new(1, 1.0, 0.0).with_delivery(6.0, 0.0),
            Location::new(2, 2.0, 0.0).with_pickup(8.0, 0.0),
        ];
        let inst = Instance::new(locs, 10.0).expect("instance");
        // leave with 6, drop to 0, pick 8
        assert!(is_insertion_feasible(&[1, 2], &inst, 10.0));
        // leave with 6, pick 8 -> 14
        assert!(!is_insertion_feasible(&[2, 1], &inst, 10.0));
    }

    #[test]
    fn test_pair_precedence_and_colocation() {
        let locs = vec![
            Location::depot(0.0, 0.0),
            Location::new(1, 1.0, 0.0).with_pickup(3.0, 0.0).with_pair(2),
            Location::new(2, 2.0, 0.0).with_delivery(3.0, 0.0).with_pair(1),
            Location::new(3, 3.0, 0.0).with_pickup(1.0, 0.0),
        ];
        let inst = Instance::new(locs, 10.0).expect("instance");
        assert!(is_insertion_feasible(&[1, 3, 2], &inst, 10.0));
        assert!(!is_insertion_feasible(&[2, 1], &inst, 10.0));
        assert!(!is_insertion_feasible(&[1, 3], &inst, 10.0));
        assert!(!is_insertion_feasible(&[2], &inst, 10.0));
    }
}
