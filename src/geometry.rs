use nalgebra::{Isometry2, Point2 as NaPoint2};
use ncollide2d::query;
use ncollide2d::shape::{Ball, ConvexPolygon, Segment as NaSegment, Shape as NaShape};
use serde::{Deserialize, Serialize};

/// A plain 2D point, independent of the collision-geometry backend.
pub type Point2 = (f64, f64);

/// A straight line segment between two points.
pub type Segment = (Point2, Point2);

/// An axis-aligned workspace rectangle `[x0,x1] x [y0,y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Rect { x0, x1, y0, y1 }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.x0 < self.x1) || !(self.y0 < self.y1)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn contains(&self, p: Point2) -> bool {
        p.0 >= self.x0 && p.0 <= self.x1 && p.1 >= self.y0 && p.1 <= self.y1
    }

    fn corners(&self) -> Vec<Point2> {
        vec![
            (self.x0, self.y0),
            (self.x0, self.y1),
            (self.x1, self.y1),
            (self.x1, self.y0),
        ]
    }

    pub fn as_shape(&self) -> Shape {
        Shape::Polygon(self.corners())
    }
}

/// The geometric footprint of an obstacle, before its safety radius is
/// applied as a Minkowski margin on distance queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Point(Point2),
    Segment(Point2, Point2),
    Polygon(Vec<Point2>),
}

/// A degenerate ball radius passed to ncollide2d in place of an exact point;
/// obstacle/query radii are applied afterwards as the Minkowski margin, so
/// this only needs to be small relative to any meaningful safety radius.
const POINT_EPSILON: f64 = 1e-9;

fn na_point(p: Point2) -> NaPoint2<f64> {
    NaPoint2::new(p.0, p.1)
}

fn to_ncollide(shape: &Shape) -> (Isometry2<f64>, Box<dyn NaShape<f64>>) {
    match shape {
        Shape::Point(p) => (
            Isometry2::translation(p.0, p.1),
            Box::new(Ball::new(POINT_EPSILON)),
        ),
        Shape::Segment(a, b) => (
            Isometry2::identity(),
            Box::new(NaSegment::new(na_point(*a), na_point(*b))),
        ),
        Shape::Polygon(points) => {
            let na_points: Vec<NaPoint2<f64>> = points.iter().map(|p| na_point(*p)).collect();
            let poly = ConvexPolygon::try_from_points(&na_points)
                .expect("obstacle polygon must be convex with at least 3 vertices");
            (Isometry2::identity(), Box::new(poly))
        }
    }
}

/// Euclidean distance between the two footprints (surface to surface, 0 if
/// they overlap). This is the single primitive every collision query in the
/// crate is built on: "footprint `a` buffered by radius `r` intersects `b`"
/// is exactly `shape_distance(a, b) <= r`.
pub fn shape_distance(a: &Shape, b: &Shape) -> f64 {
    let (iso_a, shape_a) = to_ncollide(a);
    let (iso_b, shape_b) = to_ncollide(b);
    query::distance(&iso_a, shape_a.as_ref(), &iso_b, shape_b.as_ref())
}

pub fn euclidean(a: Point2, b: Point2) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
