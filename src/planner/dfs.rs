use grid_util::point::Point;
use log::{debug, info, trace, warn};

use super::node::{ClosedSet, SearchNode};
use super::{ExhaustReason, ExpansionObserver, NoopObserver, Path, PlanOutcome, SearchStats};
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::occupancy_grid::OccupancyGrid;

/// Depth-first planner over an [OccupancyGrid].
///
/// The frontier is a stack: the most recently discovered cell is expanded next,
/// and neighbours are discovered in [MOTION_MODEL](crate::motion::MOTION_MODEL)
/// order. A cell is discovered at most once, and the first path that reaches the
/// goal is returned. That path is generally not the cheapest one.
///
/// Planning borrows the planner immutably, so one planner can serve several
/// threads; each call keeps its own frontier and closed set.
#[derive(Clone, Debug)]
pub struct DepthFirstPlanner {
    grid: OccupancyGrid,
    config: PlannerConfig,
}

impl DepthFirstPlanner {
    pub fn new(
        obstacle_x: &[f64],
        obstacle_y: &[f64],
        resolution: f64,
        clearance_radius: f64,
    ) -> Result<DepthFirstPlanner> {
        Self::with_config(
            obstacle_x,
            obstacle_y,
            PlannerConfig::new(resolution, clearance_radius),
        )
    }

    pub fn with_config(
        obstacle_x: &[f64],
        obstacle_y: &[f64],
        config: PlannerConfig,
    ) -> Result<DepthFirstPlanner> {
        let grid = OccupancyGrid::from_config(obstacle_x, obstacle_y, &config)?;
        Ok(DepthFirstPlanner { grid, config })
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans between two world positions. See [plan_with_observer](Self::plan_with_observer).
    pub fn plan(&self, start_x: f64, start_y: f64, goal_x: f64, goal_y: f64) -> PlanOutcome {
        self.plan_with_observer(start_x, start_y, goal_x, goal_y, &mut NoopObserver)
    }

    /// Snaps start and goal to cells and searches between them, reporting every
    /// expanded node to `observer`. Start and goal are not validated: a blocked or
    /// out-of-bounds endpoint simply leads to [PlanOutcome::Exhausted].
    pub fn plan_with_observer<O>(
        &self,
        start_x: f64,
        start_y: f64,
        goal_x: f64,
        goal_y: f64,
        observer: &mut O,
    ) -> PlanOutcome
    where
        O: ExpansionObserver + ?Sized,
    {
        match (
            self.grid.cell_at(start_x, start_y),
            self.grid.cell_at(goal_x, goal_y),
        ) {
            (Some(start), Some(goal)) => self.plan_cells(start, goal, observer),
            _ => {
                warn!(
                    "Start ({}, {}) or goal ({}, {}) has no cell index",
                    start_x, start_y, goal_x, goal_y
                );
                PlanOutcome::Exhausted(SearchStats {
                    reason: Some(ExhaustReason::OutOfRange),
                    ..SearchStats::default()
                })
            }
        }
    }

    /// Searches between two cells given in grid-index space.
    pub fn plan_cells<O>(&self, start: Point, goal: Point, observer: &mut O) -> PlanOutcome
    where
        O: ExpansionObserver + ?Sized,
    {
        debug!("Planning from {:?} to {:?}", start, goal);
        if self.config.component_precheck && self.grid.unreachable(&start, &goal) {
            info!("{:?} is not reachable from {:?}", goal, start);
            return PlanOutcome::Exhausted(SearchStats {
                reason: Some(ExhaustReason::Unreachable),
                ..SearchStats::default()
            });
        }
        self.search(start, goal, observer)
    }

    fn search<O>(&self, start: Point, goal: Point, observer: &mut O) -> PlanOutcome
    where
        O: ExpansionObserver + ?Sized,
    {
        // The start is only seeded on the frontier; it enters the closed set
        // like any other cell if a neighbour rediscovers it.
        let mut arena = vec![SearchNode::start(start)];
        let mut frontier: Vec<usize> = vec![0];
        let mut closed = ClosedSet::for_grid(&self.grid, self.config.dense_closed_limit);
        let mut stats = SearchStats::default();

        while let Some(current_ix) = frontier.pop() {
            if let Some(limit) = self.config.max_expansions {
                if stats.expansions >= limit {
                    info!("Expansion limit of {} reached", limit);
                    return exhausted(stats, &closed, ExhaustReason::ExpansionLimit);
                }
            }
            let current = arena[current_ix];
            stats.expansions += 1;

            let position = self.grid.cell_position(&current.cell);
            trace!("Expanding {:?} at {:?}", current.cell, position);
            if !observer.on_expand(position) {
                info!("Search cancelled after {} expansions", stats.expansions);
                return exhausted(stats, &closed, ExhaustReason::Cancelled);
            }

            if current.cell == goal {
                stats.discovered = closed.len();
                info!(
                    "Reached {:?} after {} expansions with cost {}",
                    goal, stats.expansions, current.cost
                );
                let goal_node = SearchNode {
                    cell: goal,
                    cost: current.cost,
                    parent_key: current.parent_key,
                    parent: current.parent,
                };
                return PlanOutcome::Found(self.final_path(&arena, &closed, &goal_node, stats));
            }

            let current_key = self.grid.dense_key(&current.cell);
            for (cell, step_cost) in self.grid.neighborhood_points_and_cost(&current.cell) {
                let Some(key) = self.grid.dense_key(&cell) else {
                    continue;
                };
                if closed.contains(key) {
                    continue;
                }
                let node_ix = arena.len();
                arena.push(SearchNode {
                    cell,
                    cost: current.cost + step_cost,
                    parent_key: current_key,
                    parent: Some(current_ix),
                });
                closed.insert(key, node_ix);
                frontier.push(node_ix);
            }
        }
        info!(
            "Frontier is empty after {} expansions, no path to {:?}",
            stats.expansions, goal
        );
        exhausted(stats, &closed, ExhaustReason::FrontierEmpty)
    }

    /// Walks back from the goal to the start. The goal's predecessor is the node
    /// closed under its parent key, which differs from the discovering node when
    /// the start cell was rediscovered; parent links are followed from there.
    fn final_path(
        &self,
        arena: &[SearchNode],
        closed: &ClosedSet,
        goal: &SearchNode,
        stats: SearchStats,
    ) -> Path {
        let predecessor = goal
            .parent_key
            .and_then(|key| closed.get(key))
            .or(goal.parent);
        let cells: Vec<Point> = std::iter::once(goal.cell)
            .chain(
                std::iter::successors(predecessor.map(|ix| &arena[ix]), |node| {
                    node.parent.map(|ix| &arena[ix])
                })
                .map(|node| node.cell),
            )
            .collect();
        let waypoints = cells
            .iter()
            .map(|cell| self.grid.cell_position(cell))
            .collect();
        Path {
            waypoints,
            cells,
            cost: goal.cost,
            stats,
        }
    }
}

fn exhausted(mut stats: SearchStats, closed: &ClosedSet, reason: ExhaustReason) -> PlanOutcome {
    stats.discovered = closed.len();
    stats.reason = Some(reason);
    PlanOutcome::Exhausted(stats)
}
