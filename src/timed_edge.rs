use serde::{Deserialize, Serialize};

use crate::geometry::{euclidean, Segment};
use crate::interval::Interval;

/// An edge of the roadmap together with the set of time intervals during
/// which it is free of dynamic obstacles (§4.6). `availability` is always
/// sorted and pairwise disjoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedEdge {
    pub geometry: Segment,
    pub length: f64,
    /// Base traversal cost, equal to `length` unless overridden.
    pub cost: f64,
    pub always_available: bool,
    pub availability: Vec<Interval>,
}

impl TimedEdge {
    pub fn new(geometry: Segment, availability: Vec<Interval>, always_available: bool) -> Self {
        let length = euclidean(geometry.0, geometry.1);
        TimedEdge {
            geometry,
            length,
            cost: length,
            always_available,
            availability,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// §4.6: the cost of traversing this edge if the whole of
    /// `query_interval` falls inside a single availability window
    /// (`a_m.covers(J)`), or `f64::INFINITY` if none does. Availability is
    /// sorted, so this is a binary search for the first window whose right
    /// bound is `>= query_interval.left`, followed by a coverage check.
    pub fn cost(&self, query_interval: &Interval) -> f64 {
        if self.always_available {
            return self.cost;
        }

        let idx = self
            .availability
            .partition_point(|w| w.right < query_interval.left);

        match self.availability.get(idx) {
            Some(window) if window.covers(query_interval) => self.cost,
            _ => f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_available_edge_has_finite_cost_anywhere() {
        let edge = TimedEdge::new(((0.0, 0.0), (3.0, 4.0)), vec![], true);
        assert_eq!(edge.length, 5.0);
        assert_eq!(edge.cost(&Interval::new(1e6, 2e6)), 5.0);
    }

    #[test]
    fn windowed_edge_is_infinite_outside_availability() {
        let edge = TimedEdge::new(
            ((0.0, 0.0), (0.0, 10.0)),
            vec![Interval::new(0.0, 10.0), Interval::new(20.0, 70.0)],
            false,
        );
        assert_eq!(edge.cost(&Interval::new(30.0, 31.0)), 10.0);
        assert_eq!(edge.cost(&Interval::new(11.0, 19.0)), f64::INFINITY);
    }

    #[test]
    fn query_interval_extending_past_window_boundary_is_unavailable() {
        let edge = TimedEdge::new(
            ((0.0, 0.0), (1.0, 0.0)),
            vec![Interval::new(0.0, 10.0)],
            false,
        );
        assert_eq!(edge.cost(&Interval::new(10.0, 15.0)), f64::INFINITY);
    }

    #[test]
    fn query_interval_fully_covered_by_a_window_is_available() {
        let edge = TimedEdge::new(
            ((0.0, 0.0), (1.0, 0.0)),
            vec![Interval::new(0.0, 10.0)],
            false,
        );
        assert_eq!(edge.cost(&Interval::new(2.0, 8.0)), 1.0);
        assert_eq!(edge.cost(&Interval::new(0.0, 10.0)), 1.0);
    }

    #[test]
    fn cost_override_is_respected() {
        let edge = TimedEdge::new(((0.0, 0.0), (1.0, 0.0)), vec![], true).with_cost(42.0);
        assert_eq!(edge.cost(&Interval::new(0.0, 1.0)), 42.0);
    }
}
