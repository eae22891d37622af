use grid_util::point::Point;

pub mod dfs;
pub mod node;

pub use dfs::DepthFirstPlanner;
pub use node::SearchNode;

/// Receives the world position of every node the planner expands, before the
/// goal test. Returning [false] stops the search, which then reports
/// [ExhaustReason::Cancelled].
pub trait ExpansionObserver {
    fn on_expand(&mut self, position: (f64, f64)) -> bool;
}

impl<F> ExpansionObserver for F
where
    F: FnMut((f64, f64)) -> bool,
{
    fn on_expand(&mut self, position: (f64, f64)) -> bool {
        self(position)
    }
}

/// Observer that ignores every expansion.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ExpansionObserver for NoopObserver {
    fn on_expand(&mut self, _: (f64, f64)) -> bool {
        true
    }
}

/// Why a search ended without reaching the goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExhaustReason {
    /// Every cell reachable from the start was expanded
    FrontierEmpty,
    /// The observer asked to stop
    Cancelled,
    /// The configured expansion budget ran out
    ExpansionLimit,
    /// The component precheck ruled the goal out before searching
    Unreachable,
    /// Start or goal cannot be represented as a cell index
    OutOfRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Number of nodes taken off the frontier
    pub expansions: usize,
    /// Number of cells recorded in the closed set
    pub discovered: usize,
    pub reason: Option<ExhaustReason>,
}

/// A path found by the planner, ordered from goal to start.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// World positions of the cells, goal first
    pub waypoints: Vec<(f64, f64)>,
    /// Grid cells, goal first
    pub cells: Vec<Point>,
    /// Accumulated step cost of the goal node in cell units. Less than the sum
    /// over `cells` when the path runs through a rediscovered start cell.
    pub cost: f64,
    pub stats: SearchStats,
}

impl Path {
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The waypoints reversed into travel order.
    pub fn start_to_goal(&self) -> Vec<(f64, f64)> {
        self.waypoints.iter().rev().copied().collect()
    }

    /// Separate x and y coordinate lists, goal first.
    pub fn split_xy(&self) -> (Vec<f64>, Vec<f64>) {
        self.waypoints.iter().copied().unzip()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlanOutcome {
    Found(Path),
    Exhausted(SearchStats),
}

impl PlanOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, PlanOutcome::Found(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            PlanOutcome::Found(path) => Some(path),
            PlanOutcome::Exhausted(_) => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            PlanOutcome::Found(path) => Some(path),
            PlanOutcome::Exhausted(_) => None,
        }
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            PlanOutcome::Found(path) => &path.stats,
            PlanOutcome::Exhausted(stats) => stats,
        }
    }
}
