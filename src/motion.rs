use grid_util::point::Point;
use std::f64::consts::SQRT_2;

/// A single legal step on the grid and what it costs, in cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub dx: i32,
    pub dy: i32,
    pub cost: f64,
}

impl Motion {
    const fn new(dx: i32, dy: i32, cost: f64) -> Motion {
        Motion { dx, dy, cost }
    }

    /// The cell reached by taking this step from `from`, [None] on integer overflow.
    pub fn apply(&self, from: &Point) -> Option<Point> {
        Some(Point::new(
            from.x.checked_add(self.dx)?,
            from.y.checked_add(self.dy)?,
        ))
    }

    /// Finds the motion that moves `from` onto `to`, if they are neighbours.
    pub fn between(from: &Point, to: &Point) -> Option<Motion> {
        MOTION_MODEL
            .iter()
            .find(|m| m.apply(from) == Some(*to))
            .copied()
    }
}

/// The 8-connected motion model. The order is the expansion order of the
/// depth-first search, so changing it changes which path is found.
pub const MOTION_MODEL: [Motion; 8] = [
    Motion::new(1, 0, 1.0),
    Motion::new(0, 1, 1.0),
    Motion::new(-1, 0, 1.0),
    Motion::new(0, -1, 1.0),
    Motion::new(-1, -1, SQRT_2),
    Motion::new(-1, 1, SQRT_2),
    Motion::new(1, -1, SQRT_2),
    Motion::new(1, 1, SQRT_2),
];
