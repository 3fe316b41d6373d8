use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use fxhash::FxHashMap;
use ordered_float::OrderedFloat;

use crate::error::TaPrmError;
use crate::graph::RoadmapGraph;
use crate::interval::Interval;

/// The result of a successful plan: the vertex path, the cost (arrival time
/// minus `start_time`), the wall-clock arrival time, and the search-effort
/// counters backing invariant P8 (the pruned search expands no more states,
/// and keeps no larger an open list, than would be needed to notice it
/// pruned something).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    pub path: Vec<usize>,
    pub cost: f64,
    pub arrival_time: f64,
    /// Number of states popped from the open list and examined.
    pub expansions: u64,
    /// The largest size the open list reached during the search.
    pub max_open: usize,
}

#[derive(Debug, Clone)]
struct SearchNode {
    f: OrderedFloat<f64>,
    g: OrderedFloat<f64>,
    vertex: usize,
    time: f64,
    path: Vec<usize>,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.g == other.g
    }
}
impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on f; among ties, prefer the larger g (the estimate is
        // more trustworthy the closer it is to the goal).
        other
            .f
            .cmp(&self.f)
            .then_with(|| self.g.cmp(&other.g))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn departure_cost(graph: &RoadmapGraph, u: usize, v: usize, time: f64) -> Option<f64> {
    let edge = graph.adjacency[u].iter().find(|(w, _)| *w == v)?;
    let traversal_window = Interval::new(time, time + edge.1.length);
    let cost = edge.1.cost(&traversal_window);
    if cost.is_finite() {
        Some(cost)
    } else {
        None
    }
}

/// §4.8: exact best-first search over `(vertex, time)` states, expanding
/// states in order of `g + h` with no time discretization. Each open-list
/// entry carries its full path (§9), so solution reconstruction is free.
pub fn plan(
    graph: &RoadmapGraph,
    start_time: f64,
    timeout: Duration,
    logging: bool,
) -> Result<PlanResult, TaPrmError> {
    let start = graph.start.ok_or(TaPrmError::StartUnreachable)?;
    let goal = graph.goal.ok_or(TaPrmError::GoalUnreachable)?;

    let deadline = Instant::now() + timeout;

    let mut open = BinaryHeap::new();
    open.push(SearchNode {
        f: OrderedFloat(graph.heuristic(start)),
        g: OrderedFloat(0.0),
        vertex: start,
        time: start_time,
        path: vec![start],
    });

    let mut expansions = 0u64;
    let mut max_open = open.len();

    while let Some(current) = open.pop() {
        if Instant::now() >= deadline {
            if logging {
                eprintln!("plan: timed out after {expansions} expansions");
            }
            return Err(TaPrmError::Timeout);
        }
        expansions += 1;

        if current.vertex == goal {
            if logging {
                eprintln!(
                    "plan: reached goal after {expansions} expansions, cost={:.4}",
                    current.g.0
                );
            }
            return Ok(PlanResult {
                path: current.path,
                cost: current.g.0,
                arrival_time: current.time,
                expansions,
                max_open,
            });
        }

        for (neighbor, _) in &graph.adjacency[current.vertex] {
            if current.path.contains(neighbor) {
                continue; // avoid cycles within a single candidate path
            }
            let Some(step_cost) = departure_cost(graph, current.vertex, *neighbor, current.time)
            else {
                continue;
            };

            let g = current.g.0 + step_cost;
            let time = current.time + step_cost;
            if time > graph.query_interval.right {
                continue; // arrival falls outside the query horizon (§4.8)
            }
            let h = graph.heuristic(*neighbor);

            let mut path = current.path.clone();
            path.push(*neighbor);

            open.push(SearchNode {
                f: OrderedFloat(g + h),
                g: OrderedFloat(g),
                vertex: *neighbor,
                time,
                path,
            });
            max_open = max_open.max(open.len());
        }
    }

    if logging {
        eprintln!("plan: exhausted open list after {expansions} expansions, no path");
    }
    Err(TaPrmError::NoPathInHorizon)
}

/// §4.9: the temporally-pruned variant. States are deduplicated into time
/// buckets of width `temporal_precision`; only the best `g` seen for a given
/// `(vertex, bucket)` key remains productive, and stale heap entries are
/// skipped lazily rather than updated in place (mirroring this crate's own
/// safe-interval search, which prunes via a closed/distance map instead of
/// an indexed decrease-key).
pub fn plan_pruned(
    graph: &RoadmapGraph,
    start_time: f64,
    temporal_precision: f64,
    timeout: Duration,
    logging: bool,
) -> Result<PlanResult, TaPrmError> {
    assert!(
        temporal_precision > 0.0,
        "temporal_precision must be positive"
    );

    let start = graph.start.ok_or(TaPrmError::StartUnreachable)?;
    let goal = graph.goal.ok_or(TaPrmError::GoalUnreachable)?;

    let deadline = Instant::now() + timeout;

    let bucket_of = |t: f64| -> i64 { (t / temporal_precision).round() as i64 };

    let mut best_g: FxHashMap<(usize, i64), f64> = FxHashMap::default();
    let mut open = BinaryHeap::new();

    best_g.insert((start, bucket_of(start_time)), 0.0);
    open.push(SearchNode {
        f: OrderedFloat(graph.heuristic(start)),
        g: OrderedFloat(0.0),
        vertex: start,
        time: start_time,
        path: vec![start],
    });

    let mut expansions = 0u64;
    let mut max_open = open.len();

    while let Some(current) = open.pop() {
        if Instant::now() >= deadline {
            if logging {
                eprintln!("plan_pruned: timed out after {expansions} expansions");
            }
            return Err(TaPrmError::Timeout);
        }

        let key = (current.vertex, bucket_of(current.time));
        if let Some(&recorded) = best_g.get(&key) {
            if current.g.0 > recorded + 1e-9 {
                continue; // stale entry superseded by a cheaper arrival in the same bucket
            }
        }
        expansions += 1;

        if current.vertex == goal {
            if logging {
                eprintln!(
                    "plan_pruned: reached goal after {expansions} expansions, cost={:.4}",
                    current.g.0
                );
            }
            return Ok(PlanResult {
                path: current.path,
                cost: current.g.0,
                arrival_time: current.time,
                expansions,
                max_open,
            });
        }

        for (neighbor, _) in &graph.adjacency[current.vertex] {
            if current.path.contains(neighbor) {
                continue;
            }
            let Some(step_cost) = departure_cost(graph, current.vertex, *neighbor, current.time)
            else {
                continue;
            };

            let g = current.g.0 + step_cost;
            let time = current.time + step_cost;
            if time > graph.query_interval.right {
                continue; // arrival falls outside the query horizon (§4.8)
            }
            let neighbor_key = (*neighbor, bucket_of(time));

            if let Some(&recorded) = best_g.get(&neighbor_key) {
                if g >= recorded - 1e-9 {
                    continue; // this bucket already has an equal-or-better arrival
                }
            }
            best_g.insert(neighbor_key, g);

            let h = graph.heuristic(*neighbor);
            let mut path = current.path.clone();
            path.push(*neighbor);

            open.push(SearchNode {
                f: OrderedFloat(g + h),
                g: OrderedFloat(g),
                vertex: *neighbor,
                time,
                path,
            });
            max_open = max_open.max(open.len());
        }
    }

    if logging {
        eprintln!("plan_pruned: exhausted open list after {expansions} expansions, no path");
    }
    Err(TaPrmError::NoPathInHorizon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::build_environment_instance;
    use crate::geometry::Rect;
    use crate::geometry::Shape;
    use crate::graph::build_graph;
    use crate::obstacle::Obstacle;
    use crate::recurrence::Recurrence;

    fn empty_env() -> crate::environment::EnvironmentInstance {
        build_environment_instance(
            vec![],
            Interval::new(0.0, 1000.0),
            Rect::new(0.0, 100.0, 0.0, 100.0),
            10,
        )
        .unwrap()
    }

    #[test]
    fn plans_a_path_in_an_empty_environment() {
        let env = empty_env();
        let mut graph = build_graph(&env, 60, 1, false).unwrap();
        graph.connect_start(&env, (1.0, 1.0)).unwrap();
        graph.connect_goal(&env, (95.0, 95.0)).unwrap();

        let result = plan(&graph, 0.0, Duration::from_secs(5), false).unwrap();
        assert_eq!(*result.path.first().unwrap(), graph.start.unwrap());
        assert_eq!(*result.path.last().unwrap(), graph.goal.unwrap());
        assert!(result.cost > 0.0);
        assert!((result.arrival_time - result.cost).abs() < 1e-6);
        assert!(result.expansions > 0);
        assert!(result.max_open > 0);
    }

    #[test]
    fn pruned_search_reports_nonzero_effort_counters() {
        let env = empty_env();
        let mut graph = build_graph(&env, 60, 2, false).unwrap();
        graph.connect_start(&env, (1.0, 1.0)).unwrap();
        graph.connect_goal(&env, (95.0, 95.0)).unwrap();

        let pruned = plan_pruned(&graph, 0.0, 0.5, Duration::from_secs(5), false).unwrap();
        assert!(pruned.expansions > 0);
        assert!(pruned.max_open > 0);
    }

    #[test]
    fn pruned_open_list_never_grows_past_the_exact_search_for_identical_inputs() {
        let env = empty_env();
        let mut graph = build_graph(&env, 60, 2, false).unwrap();
        graph.connect_start(&env, (1.0, 1.0)).unwrap();
        graph.connect_goal(&env, (95.0, 95.0)).unwrap();

        let exact = plan(&graph, 0.0, Duration::from_secs(5), false).unwrap();
        let pruned = plan_pruned(&graph, 0.0, 0.5, Duration::from_secs(5), false).unwrap();
        assert!(pruned.max_open <= exact.max_open);
    }

    #[test]
    fn pruned_plan_cost_is_never_cheaper_than_exact() {
        let env = empty_env();
        let mut graph = build_graph(&env, 60, 2, false).unwrap();
        graph.connect_start(&env, (1.0, 1.0)).unwrap();
        graph.connect_goal(&env, (95.0, 95.0)).unwrap();

        let exact = plan(&graph, 0.0, Duration::from_secs(5), false).unwrap();
        let pruned = plan_pruned(&graph, 0.0, 0.5, Duration::from_secs(5), false).unwrap();
        assert!(pruned.cost >= exact.cost - 1e-6);
    }

    #[test]
    fn reports_no_path_when_goal_is_unreachable_in_time() {
        // A blocking wall with no gap: start and goal end up in disconnected
        // components of the roadmap within the workspace bounds used here.
        let obstacle = Obstacle::new(
            Shape::Segment((50.0, -10.0), (50.0, 110.0)),
            2.0,
        );
        let env = build_environment_instance(
            vec![obstacle],
            Interval::new(0.0, 1000.0),
            Rect::new(0.0, 100.0, 0.0, 100.0),
            20,
        )
        .unwrap();
        let mut graph = build_graph(&env, 80, 5, false).unwrap();
        graph.connect_start(&env, (5.0, 50.0)).unwrap();
        let goal = graph.connect_goal(&env, (95.0, 50.0));
        if goal.is_ok() {
            // if the roadmap happened to bridge around the open ends, the
            // search must still terminate with a definite answer either way
            let result = plan(&graph, 0.0, Duration::from_secs(5), false);
            assert!(result.is_ok() || result.unwrap_err() == TaPrmError::NoPathInHorizon);
        } else {
            assert_eq!(goal.unwrap_err(), TaPrmError::GoalUnreachable);
        }
    }

    #[test]
    fn timeout_is_reported_when_budget_is_exhausted() {
        let env = empty_env();
        let mut graph = build_graph(&env, 40, 9, false).unwrap();
        graph.connect_start(&env, (1.0, 1.0)).unwrap();
        graph.connect_goal(&env, (95.0, 95.0)).unwrap();

        let result = plan(&graph, 0.0, Duration::from_nanos(0), false);
        assert_eq!(result.unwrap_err(), TaPrmError::Timeout);
    }

    #[test]
    fn obstacle_with_recurrence_still_admits_a_plan_outside_active_windows() {
        let obstacle = Obstacle::new(Shape::Point((50.0, 50.0)), 8.0)
            .with_interval(Interval::new(0.0, 5.0), Recurrence::Minutely);
        let env = build_environment_instance(
            vec![obstacle],
            Interval::new(0.0, 300.0),
            Rect::new(0.0, 100.0, 0.0, 100.0),
            10,
        )
        .unwrap();
        let mut graph = build_graph(&env, 80, 11, false).unwrap();
        graph.connect_start(&env, (1.0, 1.0)).unwrap();
        graph.connect_goal(&env, (95.0, 95.0)).unwrap();

        let result = plan(&graph, 10.0, Duration::from_secs(5), false);
        assert!(result.is_ok());
    }
}
