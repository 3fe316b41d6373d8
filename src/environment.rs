use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::TaPrmError;
use crate::geometry::{shape_distance, Point2, Rect, Segment, Shape};
use crate::interval::Interval;
use crate::obstacle::Obstacle;

/// Default grid resolution used by `build_environment_instance` unless the
/// caller overrides it.
pub const DEFAULT_GRID_RESOLUTION: usize = 20;

/// A compiled snapshot binding a mixed static/dynamic obstacle set to a
/// query interval `Q` and a workspace rectangle, with a uniform-grid spatial
/// index over both obstacle classes.
///
/// Immutable after construction (§5): may be shared across planner
/// invocations without synchronization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentInstance {
    pub query_interval: Interval,
    pub workspace: Rect,
    pub static_obstacles: HashMap<usize, Obstacle>,
    pub dynamic_obstacles: HashMap<usize, Obstacle>,
    resolution: usize,
    spacing_x: f64,
    spacing_y: f64,
    static_idx: Vec<Vec<Vec<usize>>>,
    dynamic_idx: Vec<Vec<Vec<usize>>>,
}

/// Builds an `EnvironmentInstance` from a raw obstacle list (§4.3).
pub fn build_environment_instance(
    obstacles: Vec<Obstacle>,
    query_interval: Interval,
    workspace: Rect,
    resolution: usize,
) -> Result<EnvironmentInstance, TaPrmError> {
    if workspace.is_degenerate() {
        return Err(TaPrmError::EnvConfigError(
            "workspace rectangle must have positive width and height".to_string(),
        ));
    }
    if query_interval.length() <= 0.0 {
        return Err(TaPrmError::EnvConfigError(
            "query interval must be non-empty".to_string(),
        ));
    }
    if resolution == 0 {
        return Err(TaPrmError::EnvConfigError(
            "grid resolution must be positive".to_string(),
        ));
    }

    let workspace_shape = workspace.as_shape();

    let mut static_obstacles = HashMap::new();
    let mut dynamic_obstacles = HashMap::new();
    let mut next_id = 0usize;

    for obstacle in obstacles {
        // §4.3 step 1: discard obstacles disjoint from the workspace.
        if shape_distance(&obstacle.shape, &workspace_shape) > obstacle.radius {
            continue;
        }

        // §4.3 step 2: permanently active obstacles are static outright.
        if obstacle.is_permanent() {
            let mut stripped = obstacle;
            stripped.interval = None;
            stripped.recurrence = crate::recurrence::Recurrence::None;
            static_obstacles.insert(next_id, stripped);
            next_id += 1;
            continue;
        }

        // §4.3 step 3: classify by whether a single occurrence covers Q.
        let occurrence = obstacle
            .occurrence_covering(query_interval.left)
            .expect("interval checked non-permanent above");

        if occurrence.left <= query_interval.left && occurrence.right >= query_interval.right {
            let mut stripped = obstacle;
            stripped.interval = None;
            stripped.recurrence = crate::recurrence::Recurrence::None;
            static_obstacles.insert(next_id, stripped);
            next_id += 1;
        } else if obstacle.is_active_during(&query_interval) {
            dynamic_obstacles.insert(next_id, obstacle);
            next_id += 1;
        }
        // else: discard, never active during Q.
    }

    let mut env = EnvironmentInstance {
        query_interval,
        workspace,
        static_obstacles,
        dynamic_obstacles,
        resolution,
        spacing_x: workspace.width() / resolution as f64,
        spacing_y: workspace.height() / resolution as f64,
        static_idx: vec![vec![vec![]; resolution]; resolution],
        dynamic_idx: vec![vec![vec![]; resolution]; resolution],
    };
    env.build_grid();
    Ok(env)
}

impl EnvironmentInstance {
    fn cell_polygon(&self, i: usize, j: usize) -> Shape {
        let x0 = self.workspace.x0 + i as f64 * self.spacing_x;
        let x1 = self.workspace.x0 + (i + 1) as f64 * self.spacing_x;
        let y0 = self.workspace.y0 + j as f64 * self.spacing_y;
        let y1 = self.workspace.y0 + (j + 1) as f64 * self.spacing_y;
        Shape::Polygon(vec![(x0, y0), (x0, y1), (x1, y1), (x1, y0)])
    }

    fn build_grid(&mut self) {
        for i in 0..self.resolution {
            for j in 0..self.resolution {
                let cell = self.cell_polygon(i, j);

                let mut static_ids = vec![];
                for (id, obstacle) in self.static_obstacles.iter() {
                    if shape_distance(&obstacle.shape, &cell) <= obstacle.radius {
                        static_ids.push(*id);
                    }
                }

                let mut dynamic_ids = vec![];
                for (id, obstacle) in self.dynamic_obstacles.iter() {
                    if shape_distance(&obstacle.shape, &cell) <= obstacle.radius {
                        dynamic_ids.push(*id);
                    }
                }

                self.static_idx[i][j] = static_ids;
                self.dynamic_idx[i][j] = dynamic_ids;
            }
        }
    }

    fn cell_of(&self, p: Point2) -> (usize, usize) {
        let i = ((p.0 - self.workspace.x0) / self.spacing_x).floor();
        let j = ((p.1 - self.workspace.y0) / self.spacing_y).floor();
        let clamp = |v: f64| v.max(0.0).min((self.resolution - 1) as f64) as usize;
        (clamp(i), clamp(j))
    }

    /// §4.4: is `p` collision-free against the static obstacles (and, if
    /// requested, against all dynamic obstacles treated as always visible)?
    pub fn static_collision_free(&self, p: Point2, include_dynamic: bool) -> bool {
        let (i, j) = self.cell_of(p);
        let point_shape = Shape::Point(p);

        for id in &self.static_idx[i][j] {
            let obstacle = &self.static_obstacles[id];
            if shape_distance(&obstacle.shape, &point_shape) <= obstacle.radius {
                return false;
            }
        }

        if include_dynamic {
            for id in &self.dynamic_idx[i][j] {
                let obstacle = &self.dynamic_obstacles[id];
                if shape_distance(&obstacle.shape, &point_shape) <= obstacle.radius {
                    return false;
                }
            }
        }

        true
    }

    /// §4.4: candidate cells a segment's bounding box overlaps.
    fn compute_collision_cells(&self, segment: Segment) -> Vec<(usize, usize)> {
        let (p1, p2) = segment;
        let (i1, j1) = self.cell_of(p1);
        let (i2, j2) = self.cell_of(p2);

        let (imin, imax) = (i1.min(i2), i1.max(i2));
        let (jmin, jmax) = (j1.min(j2), j1.max(j2));

        let segment_shape = Shape::Segment(p1, p2);
        let mut cells = vec![];
        for i in imin..=imax {
            for j in jmin..=jmax {
                let cell = self.cell_polygon(i, j);
                if shape_distance(&segment_shape, &cell) <= 0.0 {
                    cells.push((i, j));
                }
            }
        }
        cells
    }

    /// §4.4: is the segment collision-free against the static obstacles,
    /// returning the candidate cells for reuse in `free_intervals_segment`.
    pub fn static_collision_free_segment(&self, segment: Segment) -> (bool, Vec<(usize, usize)>) {
        let cells = self.compute_collision_cells(segment);
        let segment_shape = Shape::Segment(segment.0, segment.1);

        let mut static_ids = std::collections::HashSet::new();
        for (i, j) in &cells {
            static_ids.extend(self.static_idx[*i][*j].iter().copied());
        }

        for id in static_ids {
            let obstacle = &self.static_obstacles[&id];
            if shape_distance(&obstacle.shape, &segment_shape) <= obstacle.radius {
                return (false, vec![]);
            }
        }

        (true, cells)
    }

    /// §4.5: the per-edge free-time decomposition of a segment against the
    /// dynamic obstacles touching the candidate `cells`.
    pub fn free_intervals_segment(
        &self,
        segment: Segment,
        cells: &[(usize, usize)],
    ) -> (bool, bool, Vec<Interval>) {
        let q = self.query_interval;

        if self.dynamic_obstacles.is_empty() || cells.is_empty() {
            return (true, false, vec![q]);
        }

        let segment_shape = Shape::Segment(segment.0, segment.1);

        let mut dyn_ids = std::collections::HashSet::new();
        for (i, j) in cells {
            dyn_ids.extend(self.dynamic_idx[*i][*j].iter().copied());
        }

        // §4.5 step 1: intersect candidate ids with those that truly touch the segment.
        let touching: Vec<usize> = dyn_ids
            .into_iter()
            .filter(|id| {
                let obstacle = &self.dynamic_obstacles[id];
                shape_distance(&obstacle.shape, &segment_shape) <= obstacle.radius
            })
            .collect();

        if touching.is_empty() {
            return (true, false, vec![q]);
        }

        // §4.5 step 3: emit start/end events for every occurrence overlapping Q.
        let mut events: Vec<(f64, bool)> = vec![]; // (time, is_start)
        for id in &touching {
            let obstacle = &self.dynamic_obstacles[id];
            for (start, end) in obstacle.occurrences_overlapping(&q) {
                events.push((start, true));
                events.push((end, false));
            }
        }

        // §4.5 step 4: count obstacles already active at q.left.
        let active_at_start = events
            .iter()
            .filter(|(t, is_start)| *is_start && *t <= q.left)
            .count();

        let mut remaining: Vec<(f64, bool)> = events
            .into_iter()
            .filter(|(t, is_start)| !(*is_start && *t <= q.left))
            .collect();
        // ties: start before end is safe per spec.
        remaining.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap()
                .then(b.1.cmp(&a.1)) // true (start) sorts before false (end)
        });

        let mut active = active_at_start as i64;
        let mut interval_start: Option<f64> = if active == 0 { Some(q.left) } else { None };
        let mut intervals = vec![];

        for (t, is_start) in remaining {
            if t > q.right {
                break;
            }
            if is_start {
                if active == 0 {
                    if let Some(start) = interval_start {
                        if start < t {
                            intervals.push(Interval::new(start, t));
                        }
                    }
                    interval_start = None;
                }
                active += 1;
            } else {
                active -= 1;
                if active == 0 {
                    interval_start = Some(t);
                }
            }
        }

        if active == 0 {
            if let Some(start) = interval_start {
                if start < q.right {
                    intervals.push(Interval::new(start, q.right));
                }
            }
        }

        if intervals.is_empty() {
            (false, true, vec![])
        } else if intervals.len() == 1
            && intervals[0].left == q.left
            && intervals[0].right == q.right
        {
            (true, false, intervals)
        } else {
            (false, false, intervals)
        }
    }

    /// §4.7: free-space area estimate used by the γ_PRM connection radius.
    /// Unions buffered static footprints only when pairwise disjoint (no
    /// polygon-union library in this crate's dependency set); otherwise
    /// falls back to a deterministic grid-sampling estimate over the
    /// workspace, which is exact in the limit of a fine grid.
    pub fn static_free_area(&self) -> f64 {
        let workspace_area = self.workspace.area();
        if self.static_obstacles.is_empty() {
            return workspace_area;
        }

        let samples = 200usize;
        let mut free = 0usize;
        for ix in 0..samples {
            for iy in 0..samples {
                let x = self.workspace.x0 + (ix as f64 + 0.5) * self.workspace.width() / samples as f64;
                let y = self.workspace.y0 + (iy as f64 + 0.5) * self.workspace.height() / samples as f64;
                if self.static_collision_free((x, y), false) {
                    free += 1;
                }
            }
        }

        workspace_area * (free as f64) / ((samples * samples) as f64)
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }
}
