#![allow(dead_code)]

use grid_dfs_planner::occupancy_grid::OccupancyGrid;
use grid_util::point::Point;

/// Obstacle points of the walled demo map: a 70 x 70 border with four blocks inside.
pub fn demo_environment() -> (Vec<f64>, Vec<f64>) {
    let mut ox = Vec::new();
    let mut oy = Vec::new();
    let mut push = |x: i32, y: i32| {
        ox.push(f64::from(x));
        oy.push(f64::from(y));
    };
    for i in -10..60 {
        push(i, -10);
        push(60, i);
    }
    for i in -10..61 {
        push(i, 60);
        push(-10, i);
    }
    for i in 40..55 {
        for j in 5..15 {
            push(i, j);
        }
    }
    for i in 0..40 {
        for j in 20..25 {
            push(j, i);
        }
    }
    for i in 0..30 {
        for j in 40..45 {
            push(j, 58 - i);
        }
    }
    for i in 0..20 {
        for j in 35..40 {
            push(i, j);
        }
    }
    (ox, oy)
}

/// Obstacle points of a square room with walls at 0 and `size + 1` on both axes.
pub fn walled_square(size: i32) -> (Vec<f64>, Vec<f64>) {
    let mut ox = Vec::new();
    let mut oy = Vec::new();
    for i in 0..=size + 1 {
        let v = f64::from(i);
        let wall = f64::from(size + 1);
        ox.extend([v, v, 0.0, wall]);
        oy.extend([0.0, wall, v, v]);
    }
    (ox, oy)
}

pub fn visualize_grid(grid: &OccupancyGrid, start: &Point, end: &Point) {
    for y in (0..grid.width_y() as i32).rev() {
        for x in 0..grid.width_x() as i32 {
            let p = Point::new(x, y);
            if *start == p {
                print!("S");
            } else if *end == p {
                print!("G");
            } else if grid.is_occupied(x, y) {
                print!("#");
            } else {
                print!(".");
            }
        }
        println!();
    }
}
