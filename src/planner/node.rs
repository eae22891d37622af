use fxhash::FxHashMap;
use grid_util::point::Point;
use std::collections::hash_map::Entry::{Occupied, Vacant};

use crate::occupancy_grid::OccupancyGrid;

/// A cell discovered by the search. Nodes live in an arena and refer to their
/// parent both by closed-set key and by arena index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchNode {
    pub cell: Point,
    /// Sum of step costs from the start. Does not influence node selection.
    pub cost: f64,
    /// Closed-set key of the cell that discovered this one. [None] for the start
    /// and for parents outside the occupancy table.
    pub parent_key: Option<usize>,
    /// Arena index of the node that discovered this one, [None] for the start.
    pub parent: Option<usize>,
}

impl SearchNode {
    pub fn start(cell: Point) -> SearchNode {
        SearchNode {
            cell,
            cost: 0.0,
            parent_key: None,
            parent: None,
        }
    }
}

/// Maps grid keys of discovered cells to arena indices. Entries are never
/// overwritten once present.
pub(crate) enum ClosedSet {
    Dense(Vec<Option<usize>>),
    Sparse(FxHashMap<usize, usize>),
}

impl ClosedSet {
    /// Dense storage when the table has at most `dense_limit` cells, a hash map otherwise.
    pub fn for_grid(grid: &OccupancyGrid, dense_limit: usize) -> ClosedSet {
        if grid.cell_count() <= dense_limit {
            ClosedSet::Dense(vec![None; grid.cell_count()])
        } else {
            ClosedSet::Sparse(FxHashMap::default())
        }
    }

    pub fn contains(&self, key: usize) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: usize) -> Option<usize> {
        match self {
            ClosedSet::Dense(slots) => slots.get(key).copied().flatten(),
            ClosedSet::Sparse(map) => map.get(&key).copied(),
        }
    }

    /// Records `node` under `key` unless the key is already closed. Returns
    /// whether the node was inserted.
    pub fn insert(&mut self, key: usize, node: usize) -> bool {
        match self {
            ClosedSet::Dense(slots) => match slots.get_mut(key) {
                Some(slot) if slot.is_none() => {
                    *slot = Some(node);
                    true
                }
                _ => false,
            },
            ClosedSet::Sparse(map) => match map.entry(key) {
                Vacant(e) => {
                    e.insert(node);
                    true
                }
                Occupied(_) => false,
            },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ClosedSet::Dense(slots) => slots.iter().filter(|s| s.is_some()).count(),
            ClosedSet::Sparse(map) => map.len(),
        }
    }
}
