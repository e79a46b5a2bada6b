#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid A* search used by enemies to chase the player.
//!
//! The search expands the four orthogonal neighbours of a cell with a unit
//! step cost and estimates the remaining cost with the straight-line distance
//! to the goal. Open and closed membership is keyed by cell position alone: a
//! cheaper route to a cell already in the open set re-parents the existing
//! node in place instead of inserting a duplicate.
//!
//! Among open nodes with equal `f`, the one inserted first is expanded first.
//! Insertion order follows [`labyrinth_world::grid::NEIGHBOR_ORDER`], which
//! makes the returned path fully deterministic for a given grid, start and
//! goal. Paths are shortest in step count, but which of several equally short
//! paths is returned depends on that order rather than on any geometric
//! preference.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, VecDeque},
};

use labyrinth_core::CellCoord;
use labyrinth_world::grid::GridWorld;
use tracing::trace;

/// Ordered cells leading from (but excluding) a start cell to a goal.
///
/// An empty path means no move is possible this tick, either because the goal
/// is unreachable or because the start already is the goal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    cells: VecDeque<CellCoord>,
}

impl Path {
    /// Creates an empty path.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a path from an ordered list of cells.
    #[must_use]
    pub fn from_cells(cells: Vec<CellCoord>) -> Self {
        Self {
            cells: cells.into(),
        }
    }

    /// Number of steps remaining on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path has no remaining steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Next cell to step onto.
    #[must_use]
    pub fn first(&self) -> Option<CellCoord> {
        self.cells.front().copied()
    }

    /// Final cell of the path.
    #[must_use]
    pub fn last(&self) -> Option<CellCoord> {
        self.cells.back().copied()
    }

    /// Removes and returns the next cell to step onto.
    pub fn pop_front(&mut self) -> Option<CellCoord> {
        self.cells.pop_front()
    }

    /// Iterator over the remaining cells in travel order.
    pub fn iter(&self) -> impl Iterator<Item = &CellCoord> {
        self.cells.iter()
    }

    /// Copies the remaining cells into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<CellCoord> {
        self.cells.iter().copied().collect()
    }
}

/// Anything that can plan a path across a [`GridWorld`].
///
/// Navigation is generic over this seam so alternative planners, or
/// instrumented ones in tests, can be swapped in.
pub trait PathPlanner {
    /// Plans a path from `start` to `goal`, returning an empty path when none
    /// exists.
    fn find_path(&mut self, start: CellCoord, goal: CellCoord, grid: &GridWorld) -> Path;
}

/// Straight-line distance between two cells, used as the A* heuristic.
#[must_use]
pub fn heuristic(from: CellCoord, to: CellCoord) -> f64 {
    from.euclidean_distance(to)
}

/// Counters describing the most recent search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes moved from the open set to the closed set.
    pub expanded: usize,
    /// Nodes created, including the start node.
    pub inserted: usize,
    /// Open nodes whose cost was lowered through a cheaper parent.
    pub reparented: usize,
}

/// Reusable A* planner.
///
/// Buffers are kept between searches so repeated planning does not
/// reallocate.
#[derive(Debug, Default)]
pub struct AStar {
    nodes: Vec<SearchNode>,
    index: HashMap<CellCoord, usize>,
    open: BinaryHeap<OpenEntry>,
    stats: SearchStats,
}

impl AStar {
    /// Creates a planner with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters gathered during the most recent call to `find_path`.
    #[must_use]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.open.clear();
        self.stats = SearchStats::default();
    }

    fn insert(&mut self, position: CellCoord, parent: Option<usize>, g: u32, goal: CellCoord) {
        let h = heuristic(position, goal);
        let node = self.nodes.len();
        let f = f64::from(g) + h;
        self.nodes.push(SearchNode {
            position,
            parent,
            g,
            h,
            f,
            closed: false,
        });
        let _ = self.index.insert(position, node);
        self.open.push(OpenEntry { f, node });
        self.stats.inserted += 1;
    }

    fn search(&mut self, start: CellCoord, goal: CellCoord, grid: &GridWorld) -> Option<usize> {
        self.insert(start, None, 0, goal);

        while let Some(OpenEntry { node: current, .. }) = self.open.pop() {
            if self.nodes[current].closed {
                continue;
            }
            self.nodes[current].closed = true;
            self.stats.expanded += 1;

            let position = self.nodes[current].position;
            if position == goal {
                return Some(current);
            }

            let g = self.nodes[current].g.saturating_add(1);
            for neighbor in grid.neighbors(position) {
                match self.index.get(&neighbor).copied() {
                    Some(existing_index) => {
                        let existing = &mut self.nodes[existing_index];
                        if existing.closed || g >= existing.g {
                            continue;
                        }

                        existing.g = g;
                        existing.f = f64::from(g) + existing.h;
                        existing.parent = Some(current);
                        self.open.push(OpenEntry {
                            f: existing.f,
                            node: existing_index,
                        });
                        self.stats.reparented += 1;
                    }
                    None => self.insert(neighbor, Some(current), g, goal),
                }
            }
        }

        None
    }

    fn reconstruct(&self, goal_node: usize) -> Path {
        let mut cells = Vec::new();
        let mut cursor = Some(goal_node);
        while let Some(index) = cursor {
            let node = &self.nodes[index];
            if node.parent.is_none() {
                break;
            }
            cells.push(node.position);
            cursor = node.parent;
        }
        cells.reverse();
        Path::from_cells(cells)
    }
}

impl PathPlanner for AStar {
    fn find_path(&mut self, start: CellCoord, goal: CellCoord, grid: &GridWorld) -> Path {
        self.reset();
        if start == goal || grid.is_blocked(goal) {
            return Path::empty();
        }

        let path = match self.search(start, goal, grid) {
            Some(goal_node) => self.reconstruct(goal_node),
            None => Path::empty(),
        };
        trace!(
            ?start,
            ?goal,
            steps = path.len(),
            expanded = self.stats.expanded,
            "path search finished"
        );
        path
    }
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    position: CellCoord,
    parent: Option<usize>,
    g: u32,
    h: f64,
    f: f64,
    closed: bool,
}

/// Heap entry ordered so that the smallest `f`, then the earliest inserted
/// node, is popped first.
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.node.cmp(&self.node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::Entry;

    fn bfs_distances(grid: &GridWorld, start: CellCoord) -> HashMap<CellCoord, u32> {
        let mut distances = HashMap::new();
        let mut queue = VecDeque::new();
        let _ = distances.insert(start, 0);
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            let next = distances[&cell] + 1;
            for neighbor in grid.neighbors(cell) {
                if let Entry::Vacant(slot) = distances.entry(neighbor) {
                    let _ = slot.insert(next);
                    queue.push_back(neighbor);
                }
            }
        }
        distances
    }

    #[test]
    fn heap_pops_lowest_f_then_earliest_node() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry { f: 3.0, node: 0 });
        heap.push(OpenEntry { f: 2.0, node: 2 });
        heap.push(OpenEntry { f: 2.0, node: 1 });

        assert_eq!(heap.pop().map(|entry| entry.node), Some(1));
        assert_eq!(heap.pop().map(|entry| entry.node), Some(2));
        assert_eq!(heap.pop().map(|entry| entry.node), Some(0));
    }

    #[test]
    fn closed_nodes_hold_minimal_cost() {
        let walls = [
            CellCoord::new(2, 0),
            CellCoord::new(2, 1),
            CellCoord::new(2, 2),
            CellCoord::new(4, 2),
            CellCoord::new(4, 3),
            CellCoord::new(4, 4),
        ];
        let grid = GridWorld::new(7, 6, walls);
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(6, 0);
        let mut planner = AStar::new();

        let path = planner.find_path(start, goal, &grid);
        assert!(!path.is_empty());

        let distances = bfs_distances(&grid, start);
        for node in &planner.nodes {
            let shortest = distances[&node.position];
            if node.closed {
                assert_eq!(node.g, shortest, "closed node {:?}", node.position);
            } else {
                assert!(node.g >= shortest, "open node {:?}", node.position);
            }
            assert!((node.f - (f64::from(node.g) + node.h)).abs() < 1e-9);
        }
    }

    #[test]
    fn open_set_never_holds_duplicate_positions() {
        let walls = [
            CellCoord::new(1, 1),
            CellCoord::new(2, 1),
            CellCoord::new(3, 1),
            CellCoord::new(1, 2),
        ];
        let grid = GridWorld::new(5, 4, walls);
        let mut planner = AStar::new();

        let first = planner.find_path(CellCoord::new(0, 0), CellCoord::new(2, 3), &grid);
        let positions: Vec<_> = planner.nodes.iter().map(|node| node.position).collect();
        let mut unique = positions.clone();
        unique.sort();
        unique.dedup();

        assert_eq!(positions.len(), unique.len(), "no duplicate nodes");
        assert_eq!(first.len(), 5);
        assert_eq!(planner.last_stats().inserted, planner.nodes.len());
    }

    #[test]
    fn start_equal_to_goal_is_empty() {
        let grid = GridWorld::open(3, 3);
        let mut planner = AStar::new();

        let path = planner.find_path(CellCoord::new(1, 1), CellCoord::new(1, 1), &grid);

        assert!(path.is_empty());
    }

    #[test]
    fn blocked_goal_is_rejected_without_search() {
        let grid = GridWorld::new(3, 3, [CellCoord::new(2, 2)]);
        let mut planner = AStar::new();

        let path = planner.find_path(CellCoord::new(0, 0), CellCoord::new(2, 2), &grid);

        assert!(path.is_empty());
        assert_eq!(planner.last_stats(), SearchStats::default());
    }
}
