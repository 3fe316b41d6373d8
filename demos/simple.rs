//! Builds a small environment with one periodic obstacle, samples a roadmap
//! across it, and plans a path from a fixed start to a fixed goal.
//!
//! Run with `cargo run --example simple` once this crate is wired into a
//! workspace with an `[[example]]` target pointing at this file.

use std::time::Duration;

use ta_prm::{
    build_environment_instance, build_graph, plan, Interval, Obstacle, Rect, Recurrence, Shape,
};

fn main() {
    let workspace = Rect::new(0.0, 100.0, 0.0, 100.0);
    let query_interval = Interval::new(0.0, 600.0);

    let obstacles = vec![
        Obstacle::new(Shape::Point((50.0, 50.0)), 12.0)
            .with_interval(Interval::new(0.0, 20.0), Recurrence::Minutely),
        Obstacle::new(
            Shape::Polygon(vec![(20.0, 70.0), (20.0, 90.0), (40.0, 90.0), (40.0, 70.0)]),
            0.0,
        ),
    ];

    let env = build_environment_instance(obstacles, query_interval, workspace, 20)
        .expect("environment configuration should be valid");

    let mut graph = build_graph(&env, 200, 1, false).expect("roadmap should seed at least one vertex");

    graph
        .connect_start(&env, (2.0, 2.0))
        .expect("start should be reachable from an open corner");
    graph
        .connect_goal(&env, (98.0, 98.0))
        .expect("goal should be reachable from an open corner");

    match plan(&graph, 0.0, Duration::from_secs(5), true) {
        Ok(result) => {
            println!(
                "found a path through {} vertices, cost {:.2}, arriving at t={:.2}",
                result.path.len(),
                result.cost,
                result.arrival_time
            );
            for vertex in &result.path {
                let (x, y) = graph.vertices[*vertex];
                println!("  -> ({x:.1}, {y:.1})");
            }
        }
        Err(err) => println!("planning failed: {err}"),
    }
}
