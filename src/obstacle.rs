use serde::{Deserialize, Serialize};

use crate::geometry::Shape;
use crate::interval::Interval;
use crate::recurrence::Recurrence;

/// A static or time-varying obstacle: a geometric footprint inflated by a
/// safety radius, active either permanently or during one or more
/// (optionally periodic) occurrences of a base interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub shape: Shape,
    pub radius: f64,
    /// Absent means permanently active.
    pub interval: Option<Interval>,
    pub recurrence: Recurrence,
}

impl Obstacle {
    pub fn new(shape: Shape, radius: f64) -> Self {
        Obstacle {
            shape,
            radius,
            interval: None,
            recurrence: Recurrence::None,
        }
    }

    pub fn with_interval(mut self, interval: Interval, recurrence: Recurrence) -> Self {
        if let Some(period) = Some(recurrence.period_secs()).filter(|p| *p > 0.0) {
            assert!(
                interval.length() <= period,
                "each occurrence must fit within its recurrence period"
            );
        }
        self.interval = Some(interval);
        self.recurrence = recurrence;
        self
    }

    /// §4.2(a): permanently active obstacles have no interval.
    pub fn is_permanent(&self) -> bool {
        self.interval.is_none()
    }

    /// §4.2: is the obstacle active at instant `t`?
    pub fn is_active_at(&self, t: f64) -> bool {
        let interval = match self.interval {
            None => return true,
            Some(interval) => interval,
        };

        let period = self.recurrence.period_secs();
        if period == 0.0 {
            return interval.contains(t);
        }

        if t < interval.left {
            return false;
        }
        let k = ((t - interval.left) / period).floor();
        interval.shift(k * period).contains(t)
    }

    /// §4.2: is the obstacle active at any point during query interval `q`?
    pub fn is_active_during(&self, q: &Interval) -> bool {
        let interval = match self.interval {
            None => return true,
            Some(interval) => interval,
        };

        let period = self.recurrence.period_secs();
        if period == 0.0 {
            return interval.overlaps(q);
        }

        if q.right < interval.left {
            return false;
        }

        let k_lo = ((q.left - interval.left) / period).floor();
        let k_hi = ((q.right - interval.left) / period).floor();

        if k_hi > k_lo {
            // An entire repetition boundary lies inside q: some occurrence must be active.
            return true;
        }

        let k_lo = k_lo.max(0.0);
        interval.shift(k_lo * period).overlaps(q)
    }

    /// §4.3 step 3: the active interval of the occurrence containing (or
    /// nearest following) `q.left`, used to decide static-vs-dynamic
    /// classification. Returns `None` for permanently-active obstacles
    /// (callers should treat those as static directly).
    pub fn occurrence_covering(&self, t: f64) -> Option<Interval> {
        let interval = self.interval?;
        let period = self.recurrence.period_secs();
        if period == 0.0 {
            return Some(interval);
        }

        let k = ((t - interval.left) / period).floor().max(0.0);
        Some(interval.shift(k * period))
    }

    /// §4.5 step 3: emits the `(start, end)` pair of every occurrence of
    /// this obstacle's active interval that overlaps `q`.
    pub fn occurrences_overlapping(&self, q: &Interval) -> Vec<(f64, f64)> {
        let interval = match self.interval {
            None => return vec![],
            Some(interval) => interval,
        };

        let period = self.recurrence.period_secs();
        if period == 0.0 {
            return if interval.overlaps(q) {
                vec![(interval.left, interval.right)]
            } else {
                vec![]
            };
        }

        let k_lo = ((q.left - interval.left) / period).floor();
        let k_hi = ((q.right - interval.left) / period).floor();

        let k_lo_clamped = k_lo.max(0.0) as i64;
        let k_hi_clamped = k_hi.max(0.0) as i64;

        let mut out = vec![];
        for k in k_lo_clamped..=k_hi_clamped {
            let shifted = interval.shift(k as f64 * period);
            if shifted.overlaps(q) {
                out.push((shifted.left, shifted.right));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;

    fn point_obstacle() -> Obstacle {
        Obstacle::new(Shape::Point((50.0, 50.0)), 10.0)
    }

    #[test]
    fn permanent_obstacle_always_active() {
        let o = point_obstacle();
        assert!(o.is_permanent());
        assert!(o.is_active_at(0.0));
        assert!(o.is_active_at(1e9));
    }

    #[test]
    fn non_recurring_interval_bounds() {
        let o = point_obstacle().with_interval(Interval::new(10.0, 20.0), Recurrence::None);
        assert!(!o.is_active_at(9.999));
        assert!(o.is_active_at(10.0));
        assert!(o.is_active_at(20.0));
        assert!(!o.is_active_at(20.001));
    }

    #[test]
    fn minutely_recurrence_repeats() {
        // spec scenario 4: point obstacle radius 10, interval=[10,20], recurrence minutely
        let o = point_obstacle().with_interval(Interval::new(10.0, 20.0), Recurrence::Minutely);
        assert!(o.is_active_at(15.0));
        assert!(!o.is_active_at(25.0));
        assert!(o.is_active_at(70.0)); // 60 + [10,20]
        assert!(o.is_active_at(80.0));
        assert!(!o.is_active_at(90.0));
        assert!(o.is_active_at(130.0)); // 120 + [10,20]
    }

    #[test]
    fn is_active_during_detects_boundary_crossing() {
        let o = point_obstacle().with_interval(Interval::new(10.0, 20.0), Recurrence::Minutely);
        // query interval spans two full periods -> must report active
        assert!(o.is_active_during(&Interval::new(0.0, 200.0)));
        // query interval strictly inside a free gap
        assert!(!o.is_active_during(&Interval::new(25.0, 65.0)));
    }

    #[test]
    fn occurrence_covering_returns_shifted_bounds() {
        let o = point_obstacle().with_interval(Interval::new(10.0, 20.0), Recurrence::Minutely);
        let occ = o.occurrence_covering(75.0).unwrap();
        assert_eq!(occ.left, 70.0);
        assert_eq!(occ.right, 80.0);
    }

    #[test]
    fn occurrences_overlapping_matches_spec_scenario_4() {
        let o = point_obstacle().with_interval(Interval::new(10.0, 20.0), Recurrence::Minutely);
        let q = Interval::new(0.0, 200.0);
        let occs = o.occurrences_overlapping(&q);
        assert_eq!(
            occs,
            vec![(10.0, 20.0), (70.0, 80.0), (130.0, 140.0), (190.0, 200.0)]
        );
    }
}
