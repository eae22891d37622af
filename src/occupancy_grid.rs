use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::motion::MOTION_MODEL;
use crate::N_SMALLVEC_SIZE;
use core::fmt;
use grid_util::grid::{BoolGrid, ValueGrid};
use grid_util::point::Point;
use itertools::{iproduct, Itertools, MinMaxResult};
use log::{debug, info};
use num_traits::ToPrimitive;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

/// Rounds half-way cases to the even neighbour, matching how the bounding box
/// and cell indices of a map have always been computed.
fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// [OccupancyGrid] discretizes the bounding box of a set of obstacle points into
/// cells of size `resolution`. A cell is occupied ([true] in the [BoolGrid]) when
/// its center lies within `clearance_radius` of any obstacle point. Connected
/// components of the free cells are kept in a [UnionFind] structure so that
/// reachability can be answered without searching.
///
/// The grid is built once and never mutated afterwards, so it can be shared
/// read-only between threads.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    resolution: f64,
    clearance_radius: f64,
    width_x: usize,
    width_y: usize,
    occupied: BoolGrid,
    occupied_count: usize,
    components: UnionFind<usize>,
}

impl OccupancyGrid {
    /// Builds the grid from parallel lists of obstacle coordinates.
    pub fn build(
        obstacle_x: &[f64],
        obstacle_y: &[f64],
        resolution: f64,
        clearance_radius: f64,
    ) -> Result<OccupancyGrid> {
        Self::from_config(
            obstacle_x,
            obstacle_y,
            &PlannerConfig::new(resolution, clearance_radius),
        )
    }

    pub fn from_config(
        obstacle_x: &[f64],
        obstacle_y: &[f64],
        config: &PlannerConfig,
    ) -> Result<OccupancyGrid> {
        config.validate()?;
        if obstacle_x.len() != obstacle_y.len() {
            return Err(PlannerError::MismatchedObstacles {
                x_len: obstacle_x.len(),
                y_len: obstacle_y.len(),
            });
        }
        if obstacle_x.is_empty() {
            return Err(PlannerError::EmptyObstacles);
        }
        if let Some(index) = obstacle_x
            .iter()
            .zip(obstacle_y)
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(PlannerError::NonFiniteObstacle { index });
        }

        let resolution = config.resolution;
        let too_large = || PlannerError::GridTooLarge {
            width_x: span(obstacle_x) / resolution,
            width_y: span(obstacle_y) / resolution,
        };
        let (min_x, max_x) = rounded_extent(obstacle_x).ok_or_else(too_large)?;
        let (min_y, max_y) = rounded_extent(obstacle_y).ok_or_else(too_large)?;
        let (width_x, width_y) = match (
            cell_count(min_x, max_x, resolution),
            cell_count(min_y, max_y, resolution),
        ) {
            (Some(w), Some(h)) if w.checked_mul(h).is_some() => (w, h),
            _ => return Err(too_large()),
        };

        let mut grid = OccupancyGrid {
            min_x,
            min_y,
            max_x,
            max_y,
            resolution,
            clearance_radius: config.clearance_radius,
            width_x,
            width_y,
            occupied: BoolGrid::new(width_x, width_y, false),
            occupied_count: 0,
            components: UnionFind::new(0),
        };
        grid.mark_obstacles(obstacle_x, obstacle_y);
        grid.components = grid.generate_components();
        info!(
            "Built {}x{} occupancy grid over [{}, {}) x [{}, {}) with {} occupied cells",
            width_x, width_y, min_x, max_x, min_y, max_y, grid.occupied_count
        );
        Ok(grid)
    }

    /// Marks every cell whose center is within the clearance radius of some obstacle.
    /// Checks every obstacle against every cell; there is no spatial index.
    fn mark_obstacles(&mut self, obstacle_x: &[f64], obstacle_y: &[f64]) {
        for (ix, iy) in iproduct!(0..self.width_x as i32, 0..self.width_y as i32) {
            let x = self.x_position(ix);
            let y = self.y_position(iy);
            let blocked = obstacle_x
                .iter()
                .zip(obstacle_y)
                .any(|(ox, oy)| (ox - x).hypot(oy - y) <= self.clearance_radius);
            if blocked {
                self.occupied.set(ix, iy, true);
                self.occupied_count += 1;
            }
        }
    }

    /// Links every feasible cell to its feasible forward neighbours. The backward
    /// half of the 8-neighbourhood is covered when those cells are visited.
    /// Runs on every build, whether or not the planner prechecks reachability.
    fn generate_components(&self) -> UnionFind<usize> {
        debug!("Generating connected components");
        let mut components = UnionFind::new(self.width_x * self.width_y);
        for (ix, iy) in iproduct!(0..self.width_x as i32, 0..self.width_y as i32) {
            if !self.in_bounds_and_free(ix, iy) {
                continue;
            }
            let cell = Point::new(ix, iy);
            let Some(cell_ix) = self.dense_key(&cell) else {
                continue;
            };
            [(1, 0), (0, 1), (1, 1), (1, -1)]
                .into_iter()
                .map(|(dx, dy)| Point::new(ix + dx, iy + dy))
                .filter(|p| self.in_bounds_and_free(p.x, p.y))
                .filter_map(|p| self.dense_key(&p))
                .for_each(|n_ix| {
                    components.union(cell_ix, n_ix);
                });
        }
        components
    }

    /// Converts a world coordinate to a cell index along one axis.
    /// Returns [None] if the index does not fit in an [i32].
    pub fn to_index(&self, coord: f64, min: i32) -> Option<i32> {
        round_half_even((coord - f64::from(min)) / self.resolution).to_i32()
    }

    /// Converts a cell index along one axis back to a world coordinate.
    pub fn to_position(&self, index: i32, min: i32) -> f64 {
        f64::from(index) * self.resolution + f64::from(min)
    }

    pub fn x_index(&self, x: f64) -> Option<i32> {
        self.to_index(x, self.min_x)
    }

    pub fn y_index(&self, y: f64) -> Option<i32> {
        self.to_index(y, self.min_y)
    }

    pub fn x_position(&self, ix: i32) -> f64 {
        self.to_position(ix, self.min_x)
    }

    pub fn y_position(&self, iy: i32) -> f64 {
        self.to_position(iy, self.min_y)
    }

    /// Snaps a world position to its cell.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<Point> {
        Some(Point::new(self.x_index(x)?, self.y_index(y)?))
    }

    /// The world position of a cell's center.
    pub fn cell_position(&self, cell: &Point) -> (f64, f64) {
        (self.x_position(cell.x), self.y_position(cell.y))
    }

    /// Integer identity of a cell, unique among cells of the occupancy table.
    pub fn grid_key(&self, cell: &Point) -> i64 {
        i64::from(cell.y) * self.width_x as i64 + i64::from(cell.x)
    }

    /// The grid key as an offset into dense per-cell storage, [None] outside the table.
    pub(crate) fn dense_key(&self, cell: &Point) -> Option<usize> {
        if self.in_table(cell.x, cell.y) {
            Some(cell.y as usize * self.width_x + cell.x as usize)
        } else {
            None
        }
    }

    fn in_table(&self, ix: i32, iy: i32) -> bool {
        ix >= 0 && iy >= 0 && (ix as usize) < self.width_x && (iy as usize) < self.width_y
    }

    /// Whether the cell lies inside `[min_x, max_x) x [min_y, max_y)` and is not
    /// blocked. Cells beyond the occupancy table are never free.
    pub fn in_bounds_and_free(&self, ix: i32, iy: i32) -> bool {
        let px = self.x_position(ix);
        let py = self.y_position(iy);
        if px < f64::from(self.min_x)
            || py < f64::from(self.min_y)
            || px >= f64::from(self.max_x)
            || py >= f64::from(self.max_y)
        {
            return false;
        }
        self.in_table(ix, iy) && !self.occupied.get(ix, iy)
    }

    /// Whether the cell is blocked by an obstacle. Cells outside the table are not occupied.
    pub fn is_occupied(&self, ix: i32, iy: i32) -> bool {
        self.in_table(ix, iy) && self.occupied.get(ix, iy)
    }

    /// Feasible successors of `pos` with their step cost, in motion-model order.
    pub fn neighborhood_points_and_cost(
        &self,
        pos: &Point,
    ) -> SmallVec<[(Point, f64); N_SMALLVEC_SIZE]> {
        MOTION_MODEL
            .iter()
            .filter_map(|m| m.apply(pos).map(|p| (p, m.cost)))
            .filter(|(p, _)| self.in_bounds_and_free(p.x, p.y))
            .collect()
    }

    /// Checks whether a search from `start` can reach `goal`. The start cell itself
    /// is always expanded, so it only has to touch the goal's component through
    /// itself or one of its feasible neighbours.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        if start == goal {
            return true;
        }
        if !self.in_bounds_and_free(goal.x, goal.y) {
            return false;
        }
        let Some(goal_ix) = self.dense_key(goal) else {
            return false;
        };
        std::iter::once(*start)
            .filter(|p| self.in_bounds_and_free(p.x, p.y))
            .chain(
                self.neighborhood_points_and_cost(start)
                    .into_iter()
                    .map(|(p, _)| p),
            )
            .filter_map(|p| self.dense_key(&p))
            .any(|ix| self.components.equiv(ix, goal_ix))
    }

    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        !self.reachable(start, goal)
    }

    pub fn min_x(&self) -> i32 {
        self.min_x
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn max_x(&self) -> i32 {
        self.max_x
    }

    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn clearance_radius(&self) -> f64 {
        self.clearance_radius
    }

    pub fn width_x(&self) -> usize {
        self.width_x
    }

    pub fn width_y(&self) -> usize {
        self.width_y
    }

    pub fn cell_count(&self) -> usize {
        self.width_x * self.width_y
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied_count
    }
}

/// Rounded `(min, max)` of one coordinate list, [None] if it is empty or
/// the span does not fit in an [i32].
fn rounded_extent(values: &[f64]) -> Option<(i32, i32)> {
    let (lo, hi) = match values.iter().copied().minmax() {
        MinMaxResult::NoElements => return None,
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    let lo = round_half_even(lo).to_i32()?;
    let hi = round_half_even(hi).to_i32()?;
    hi.checked_sub(lo)?;
    Some((lo, hi))
}

fn span(values: &[f64]) -> f64 {
    match values.iter().copied().minmax() {
        MinMaxResult::MinMax(lo, hi) => hi - lo,
        _ => 0.0,
    }
}

/// Number of cells spanning `[min, max)`, [None] if it does not fit in an [i32].
fn cell_count(min: i32, max: i32, resolution: f64) -> Option<usize> {
    let width = round_half_even(f64::from(max - min) / resolution).to_i32()?;
    usize::try_from(width).ok()
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Grid:")?;
        for iy in (0..self.width_y as i32).rev() {
            let values = (0..self.width_x as i32)
                .map(|ix| self.occupied.get(ix, iy) as i32)
                .collect::<Vec<i32>>();
            writeln!(f, "{:?}", values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Obstacle at the origin plus a far corner that only serves to size the grid.
    fn single_obstacle(radius: f64) -> OccupancyGrid {
        OccupancyGrid::build(&[0.0, 10.0], &[0.0, 10.0], 1.0, radius).unwrap()
    }

    #[test]
    fn bounding_box_and_widths() {
        let grid = OccupancyGrid::build(&[-10.2, 59.6], &[-9.7, 60.4], 2.0, 1.0).unwrap();
        assert_eq!((grid.min_x(), grid.max_x()), (-10, 60));
        assert_eq!((grid.min_y(), grid.max_y()), (-10, 60));
        assert_eq!((grid.width_x(), grid.width_y()), (35, 35));
        assert_eq!(grid.cell_count(), 35 * 35);
    }

    #[test]
    fn rounding_is_half_to_even() {
        // (3 - 0) / 2 = 1.5 rounds to 2, (5 - 0) / 2 = 2.5 rounds to 2
        let grid = OccupancyGrid::build(&[0.0, 3.0], &[0.0, 5.0], 2.0, 0.0).unwrap();
        assert_eq!((grid.width_x(), grid.width_y()), (2, 2));
        assert_eq!(grid.x_index(1.0), Some(0));
        assert_eq!(grid.x_index(3.0), Some(2));
        assert_eq!(grid.x_index(4.2), Some(2));
        let grid = OccupancyGrid::build(&[0.5, 3.0], &[1.5, 5.0], 1.0, 0.0).unwrap();
        assert_eq!((grid.min_x(), grid.min_y()), (0, 2));
    }

    #[test]
    fn index_position_round_trip() {
        let grid = OccupancyGrid::build(&[-3.0, 7.0], &[2.0, 11.0], 0.3, 0.0).unwrap();
        for ix in 0..grid.width_x() as i32 {
            assert_eq!(grid.x_index(grid.x_position(ix)), Some(ix));
        }
        for iy in 0..grid.width_y() as i32 {
            assert_eq!(grid.y_index(grid.y_position(iy)), Some(iy));
        }
    }

    #[test]
    fn occupancy_boundary_at_clearance_radius() {
        let grid = single_obstacle(2.0);
        // Exactly at the radius counts as occupied
        assert!(grid.is_occupied(2, 0));
        assert!(grid.is_occupied(0, 2));
        assert!(grid.is_occupied(1, 1));
        assert!(!grid.is_occupied(2, 1));
        assert!(!grid.is_occupied(3, 0));

        let grid = single_obstacle(2.0 - 1e-9);
        assert!(!grid.is_occupied(2, 0));
        assert!(grid.is_occupied(1, 1));

        let grid = single_obstacle(2.0 + 1e-9);
        assert!(grid.is_occupied(2, 0));
        assert!(!grid.is_occupied(2, 1));
    }

    #[test]
    fn occupancy_matches_brute_force() {
        let ox = [1.0, 4.5, 7.0, 0.0, 9.0];
        let oy = [2.0, 4.0, 8.5, 0.0, 9.0];
        let grid = OccupancyGrid::build(&ox, &oy, 0.5, 1.2).unwrap();
        let mut count = 0;
        for ix in 0..grid.width_x() as i32 {
            for iy in 0..grid.width_y() as i32 {
                let (x, y) = grid.cell_position(&Point::new(ix, iy));
                let expected = ox
                    .iter()
                    .zip(oy.iter())
                    .any(|(a, b)| ((a - x).powi(2) + (b - y).powi(2)).sqrt() <= 1.2);
                assert_eq!(grid.is_occupied(ix, iy), expected);
                count += expected as usize;
            }
        }
        assert_eq!(grid.occupied_count(), count);
    }

    #[test]
    fn bounds_checks() {
        let grid = single_obstacle(0.0);
        assert!(!grid.in_bounds_and_free(0, 0));
        assert!(grid.in_bounds_and_free(1, 0));
        assert!(grid.in_bounds_and_free(9, 9));
        assert!(!grid.in_bounds_and_free(10, 9));
        assert!(!grid.in_bounds_and_free(-1, 5));
        assert!(!grid.in_bounds_and_free(5, -1));
    }

    #[test]
    fn table_edge_is_not_free_when_width_rounds_down() {
        // 5 / 2 = 2.5 rounds to 2 cells, but index 2 still lies below max_x
        let grid = OccupancyGrid::build(&[0.0, 5.0], &[0.0, 5.0], 2.0, 0.0).unwrap();
        assert_eq!(grid.width_x(), 2);
        assert!(grid.x_position(2) < f64::from(grid.max_x()));
        assert!(!grid.in_bounds_and_free(2, 1));
        assert!(grid.in_bounds_and_free(1, 1));
    }

    #[test]
    fn grid_keys_are_unique() {
        let grid = OccupancyGrid::build(&[0.0, 6.0], &[0.0, 4.0], 1.0, 0.0).unwrap();
        let mut keys = Vec::new();
        for ix in 0..grid.width_x() as i32 {
            for iy in 0..grid.width_y() as i32 {
                let p = Point::new(ix, iy);
                assert_eq!(grid.dense_key(&p).map(|k| k as i64), Some(grid.grid_key(&p)));
                keys.push(grid.grid_key(&p));
            }
        }
        let n = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), n);
    }

    #[test]
    fn construction_errors() {
        assert!(matches!(
            OccupancyGrid::build(&[], &[], 1.0, 0.0),
            Err(PlannerError::EmptyObstacles)
        ));
        assert!(matches!(
            OccupancyGrid::build(&[0.0, 1.0], &[0.0], 1.0, 0.0),
            Err(PlannerError::MismatchedObstacles { x_len: 2, y_len: 1 })
        ));
        assert!(matches!(
            OccupancyGrid::build(&[0.0], &[0.0], 0.0, 0.0),
            Err(PlannerError::InvalidResolution(_))
        ));
        assert!(matches!(
            OccupancyGrid::build(&[0.0], &[0.0], -1.0, 0.0),
            Err(PlannerError::InvalidResolution(_))
        ));
        assert!(matches!(
            OccupancyGrid::build(&[0.0, f64::NAN], &[0.0, 1.0], 1.0, 0.0),
            Err(PlannerError::NonFiniteObstacle { index: 1 })
        ));
        assert!(matches!(
            OccupancyGrid::build(&[0.0, 1e12], &[0.0, 1.0], 1.0, 0.0),
            Err(PlannerError::GridTooLarge { .. })
        ));
    }

    /// Tests whether cells are correctly mapped to different connected components
    #[test]
    fn test_component_generation() {
        // Obstacles form a full-height wall at x = 3 on a 7x7 grid.
        let mut ox = vec![0.0, 7.0];
        let mut oy = vec![-2.0, 5.0];
        for y in -2..=5 {
            ox.push(3.0);
            oy.push(f64::from(y));
        }
        let grid = OccupancyGrid::build(&ox, &oy, 1.0, 0.0).unwrap();
        let left = grid.cell_at(1.0, 1.0).unwrap();
        let right = grid.cell_at(5.0, 1.0).unwrap();
        let left_top = grid.cell_at(2.0, 4.0).unwrap();
        assert!(grid.unreachable(&left, &right));
        assert!(grid.reachable(&left, &left_top));
    }

    #[test]
    fn components_cover_whole_table() {
        let grid = single_obstacle(0.0);
        let last = Point::new(grid.width_x() as i32 - 1, grid.width_y() as i32 - 1);
        assert!(grid.reachable(&Point::new(1, 0), &last));
        assert!(grid.reachable(&Point::new(0, 9), &Point::new(9, 0)));
    }

    #[test]
    fn reachable_from_blocked_start() {
        let grid = single_obstacle(0.0);
        let start = Point::new(0, 0);
        assert!(!grid.in_bounds_and_free(0, 0));
        assert!(grid.reachable(&start, &Point::new(5, 5)));
        assert!(grid.reachable(&start, &start));
        assert!(grid.unreachable(&Point::new(-5, -5), &Point::new(5, 5)));
        assert!(grid.unreachable(&Point::new(1, 1), &Point::new(0, 0)));
    }

    #[test]
    fn neighbourhood_follows_motion_order() {
        let grid = single_obstacle(0.0);
        let n = grid.neighborhood_points_and_cost(&Point::new(1, 1));
        let points: Vec<Point> = n.iter().map(|(p, _)| *p).collect();
        // (0, 0) is the obstacle
        assert_eq!(
            points,
            vec![
                Point::new(2, 1),
                Point::new(1, 2),
                Point::new(0, 1),
                Point::new(1, 0),
                Point::new(0, 2),
                Point::new(2, 0),
                Point::new(2, 2),
            ]
        );
    }
}
