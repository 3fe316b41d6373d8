use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentInstance;
use crate::error::TaPrmError;
use crate::geometry::{euclidean, Point2};
use crate::interval::Interval;
use crate::timed_edge::TimedEdge;

const UNIT_BALL_VOLUME_2D: f64 = std::f64::consts::PI;
const DIMENSION: f64 = 2.0;

/// §4.7: the PRM* asymptotic-optimality connection radius constant, derived
/// from the free-space volume of the environment.
fn gamma_prm(free_volume: f64) -> f64 {
    2.0 * (1.0 + 1.0 / DIMENSION).powf(1.0 / DIMENSION)
        * (free_volume / UNIT_BALL_VOLUME_2D).powf(1.0 / DIMENSION)
        + 1e-10
}

fn connection_radius(gamma: f64, n: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    gamma * ((n as f64).ln() / n as f64).powf(1.0 / DIMENSION)
}

/// A sampled, time-aware probabilistic roadmap: vertices with positions,
/// undirected edges carrying per-window availability, and an optionally
/// connected start/goal pair (§3, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapGraph {
    pub vertices: Vec<Point2>,
    pub adjacency: Vec<Vec<(usize, TimedEdge)>>,
    pub neighbor_radius: f64,
    /// The query horizon `Q` this roadmap was built against; the search
    /// uses `query_interval.right` to enforce §4.8's `t_k <= Q.r` bound.
    pub query_interval: Interval,
    pub start: Option<usize>,
    pub goal: Option<usize>,
}

impl RoadmapGraph {
    /// Straight-line distance heuristic to `goal`, admissible for any metric
    /// edge cost bounded below by Euclidean length (§4.8).
    pub fn heuristic(&self, vertex: usize) -> f64 {
        match self.goal {
            Some(goal) => euclidean(self.vertices[vertex], self.vertices[goal]),
            None => 0.0,
        }
    }

    fn try_connect(
        &self,
        env: &EnvironmentInstance,
        a: Point2,
        b: Point2,
    ) -> Option<TimedEdge> {
        let (free, cells) = env.static_collision_free_segment((a, b));
        if !free {
            return None;
        }
        let (always, blocked, intervals) = env.free_intervals_segment((a, b), &cells);
        if blocked {
            return None;
        }
        Some(TimedEdge::new((a, b), intervals, always))
    }

    fn add_bidirectional_edge(&mut self, u: usize, v: usize, edge: TimedEdge) {
        let reverse = TimedEdge {
            geometry: (edge.geometry.1, edge.geometry.0),
            ..edge.clone()
        };
        self.adjacency[u].push((v, edge));
        self.adjacency[v].push((u, reverse));
    }

    /// §4.7: connects a new point into the roadmap as vertex `index`,
    /// returning the number of edges added.
    fn connect_new_vertex(
        &mut self,
        env: &EnvironmentInstance,
        point: Point2,
        index: usize,
    ) -> usize {
        let mut added = 0;
        for other in 0..index {
            if euclidean(point, self.vertices[other]) > self.neighbor_radius {
                continue;
            }
            if let Some(edge) = self.try_connect(env, point, self.vertices[other]) {
                self.add_bidirectional_edge(index, other, edge);
                added += 1;
            }
        }
        added
    }
}

/// §4.7: builds a roadmap with `num_samples` collision-free vertices drawn
/// uniformly from the workspace, connected by the PRM* radius rule. Set
/// `logging` to trace sampling progress to stderr (mirrors the original's
/// own `logging`/`quiet` constructor kwargs; no logging crate involved).
pub fn build_graph(
    env: &EnvironmentInstance,
    num_samples: usize,
    seed: u64,
    logging: bool,
) -> Result<RoadmapGraph, TaPrmError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let free_volume = env.static_free_area();
    let gamma = gamma_prm(free_volume);
    let neighbor_radius = connection_radius(gamma, num_samples.max(2));

    if logging {
        eprintln!(
            "build_graph: free_volume={free_volume:.2} gamma={gamma:.4} neighbor_radius={neighbor_radius:.4}"
        );
    }

    let mut graph = RoadmapGraph {
        vertices: vec![],
        adjacency: vec![],
        neighbor_radius,
        query_interval: env.query_interval,
        start: None,
        goal: None,
    };

    let max_rejections = num_samples.saturating_mul(200).max(10_000);
    let mut rejections = 0;

    while graph.vertices.len() < num_samples {
        let x = rng.gen_range(env.workspace.x0..=env.workspace.x1);
        let y = rng.gen_range(env.workspace.y0..=env.workspace.y1);

        if !env.static_collision_free((x, y), false) {
            rejections += 1;
            if rejections > max_rejections {
                if logging {
                    eprintln!(
                        "build_graph: giving up after {rejections} rejections at {} vertices",
                        graph.vertices.len()
                    );
                }
                break;
            }
            continue;
        }

        let index = graph.vertices.len();
        graph.vertices.push((x, y));
        graph.adjacency.push(vec![]);
        let added = graph.connect_new_vertex(env, (x, y), index);
        if logging {
            eprintln!("build_graph: vertex {index} at ({x:.2},{y:.2}) connected to {added} neighbors");
        }
    }

    if graph.vertices.is_empty() {
        return Err(TaPrmError::GraphTooSparse);
    }

    Ok(graph)
}

impl RoadmapGraph {
    /// §4.7: connects `point` as the dedicated start vertex.
    pub fn connect_start(
        &mut self,
        env: &EnvironmentInstance,
        point: Point2,
    ) -> Result<usize, TaPrmError> {
        if !env.static_collision_free(point, false) {
            return Err(TaPrmError::StartUnreachable);
        }
        let index = self.vertices.len();
        self.vertices.push(point);
        self.adjacency.push(vec![]);
        let added = self.connect_new_vertex(env, point, index);
        if added == 0 {
            self.vertices.pop();
            self.adjacency.pop();
            return Err(TaPrmError::StartUnreachable);
        }
        self.start = Some(index);
        Ok(index)
    }

    /// §4.7: connects `point` as the dedicated goal vertex.
    pub fn connect_goal(
        &mut self,
        env: &EnvironmentInstance,
        point: Point2,
    ) -> Result<usize, TaPrmError> {
        if !env.static_collision_free(point, false) {
            return Err(TaPrmError::GoalUnreachable);
        }
        let index = self.vertices.len();
        self.vertices.push(point);
        self.adjacency.push(vec![]);
        let added = self.connect_new_vertex(env, point, index);
        if added == 0 {
            self.vertices.pop();
            self.adjacency.pop();
            return Err(TaPrmError::GoalUnreachable);
        }
        self.goal = Some(index);
        Ok(index)
    }

    /// Sum of edge lengths along a vertex path, ignoring availability.
    pub fn path_length(&self, path: &[usize]) -> f64 {
        path.windows(2)
            .map(|w| euclidean(self.vertices[w[0]], self.vertices[w[1]]))
            .sum()
    }
}
