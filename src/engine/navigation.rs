// Flowfield pathfinding for group movement.
//
// Layer 1: NavigationGrid — static walkability + traversal cost per tile.
// Layer 2: FlowField — Dijkstra integration field + gradient directions.
//
// The integration pass is driven by PriorityQueue<Frontier>: each iteration
// settles the cheapest open cell. Stale entries (a cell re-queued with a
// lower cost) are skipped when they surface instead of being decreased in place.

use std::cmp::Ordering;

use bevy_ecs::prelude::*;
use glam::{UVec2, Vec2, Vec3};

use super::priority_queue::PriorityQueue;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of grid cells along X.
pub const GRID_WIDTH: u32 = 100;
/// Number of grid cells along Z.
pub const GRID_HEIGHT: u32 = 100;
/// World units per cell. Cell (cx, cz) covers [cx - WORLD_HALF .. cx+1 - WORLD_HALF].
pub const CELL_SIZE: f32 = 1.0;
/// World runs from -WORLD_HALF to +WORLD_HALF on both X and Z.
pub const WORLD_HALF: f32 = 50.0;

/// Grid cell containing a world-space position (XZ plane) on a
/// `width` x `height` grid anchored at -WORLD_HALF. `None` outside the grid.
fn cell_at(pos: Vec3, width: u32, height: u32) -> Option<UVec2> {
    let x = (pos.x + WORLD_HALF) / CELL_SIZE;
    let z = (pos.z + WORLD_HALF) / CELL_SIZE;
    if x < 0.0 || z < 0.0 {
        return None;
    }
    let cx = x as u32;
    let cz = z as u32;
    if cx >= width || cz >= height {
        return None;
    }
    Some(UVec2::new(cx, cz))
}

// ============================================================================
// NAVIGATION GRID
// ============================================================================

/// Static tile walkability and step cost.
pub struct NavigationGrid {
    /// True if units can walk through this cell.
    pub walkable: Vec<bool>,
    /// Cost of stepping INTO this cell. Never below 1.
    pub cost: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl NavigationGrid {
    /// Fully open grid, every cell walkable at cost 1.
    ///
    /// Panics if either dimension is zero.
    pub fn new_open(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "navigation grid needs at least one cell");
        let size = (width * height) as usize;
        Self {
            walkable: vec![true; size],
            cost: vec![1; size],
            width,
            height,
        }
    }

    /// Convert a world-space position (XZ plane) to the grid cell that contains it.
    /// Returns `None` if the position is outside the grid.
    pub fn world_to_cell(&self, pos: Vec3) -> Option<UVec2> {
        cell_at(pos, self.width, self.height)
    }

    /// Like `world_to_cell` but clamps to grid bounds instead of returning None.
    pub fn world_to_cell_clamped(&self, pos: Vec3) -> UVec2 {
        let cx = ((pos.x + WORLD_HALF) / CELL_SIZE).max(0.0) as u32;
        let cz = ((pos.z + WORLD_HALF) / CELL_SIZE).max(0.0) as u32;
        UVec2::new(cx.min(self.width - 1), cz.min(self.height - 1))
    }

    /// World-space center of a grid cell (y=0, on the ground plane).
    pub fn cell_center(&self, cell: UVec2) -> Vec3 {
        Vec3::new(
            cell.x as f32 * CELL_SIZE - WORLD_HALF + CELL_SIZE * 0.5,
            0.0,
            cell.y as f32 * CELL_SIZE - WORLD_HALF + CELL_SIZE * 0.5,
        )
    }

    pub fn contains(&self, cell: UVec2) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Cells outside the grid are a caller bug; in release builds an
    /// x past the edge would alias into the next row.
    #[inline]
    fn idx(&self, cell: UVec2) -> usize {
        debug_assert!(
            self.contains(cell),
            "cell {:?} outside {}x{} grid",
            cell,
            self.width,
            self.height
        );
        (cell.y * self.width + cell.x) as usize
    }

    pub fn is_walkable(&self, cell: UVec2) -> bool {
        self.walkable[self.idx(cell)]
    }

    pub fn set_blocked(&mut self, cell: UVec2) {
        let i = self.idx(cell);
        self.walkable[i] = false;
    }

    /// Set the step cost of a cell (clamped to at least 1).
    pub fn set_cost(&mut self, cell: UVec2, cost: u8) {
        let i = self.idx(cell);
        self.cost[i] = cost.max(1);
    }
}

// ============================================================================
// FLOW FIELD
// ============================================================================

/// Pre-computed per-cell movement directions toward a single goal.
///
/// Built once per group order. All units in the group read from this
/// to get their desired velocity, making the per-unit query cost O(1).
#[derive(Resource)]
pub struct FlowField {
    /// Normalized XZ direction each cell should move in to reach the goal.
    /// Vec2::ZERO means "at goal" or "unreachable".
    pub directions: Vec<Vec2>,

    /// Accumulated path cost to the goal. `u32::MAX` = unreachable.
    pub integration: Vec<u32>,

    pub width: u32,
    pub height: u32,
    pub goal_cell: UVec2,
}

impl FlowField {
    /// Sample the flow direction for a given grid cell.
    #[inline]
    pub fn sample_cell(&self, cell: UVec2) -> Vec2 {
        let idx = (cell.y * self.width + cell.x) as usize;
        self.directions.get(idx).copied().unwrap_or(Vec2::ZERO)
    }

    /// True if the cell is the goal or within one unit-cost step of it.
    #[inline]
    pub fn near_goal(&self, cell: UVec2) -> bool {
        let idx = (cell.y * self.width + cell.x) as usize;
        self.integration.get(idx).copied().unwrap_or(u32::MAX) <= 1
    }

    /// Grid cell under a world position, `None` outside the field.
    pub fn world_to_cell(&self, pos: Vec3) -> Option<UVec2> {
        cell_at(pos, self.width, self.height)
    }

    pub fn reachable_cells(&self) -> usize {
        self.integration.iter().filter(|&&c| c != u32::MAX).count()
    }
}

// ============================================================================
// DIJKSTRA FRONTIER
// ============================================================================

/// Open-set entry. Ordered by cost, then by cell index so that equal-cost
/// cells settle in a deterministic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frontier {
    cost: u32,
    idx: u32,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.idx.cmp(&other.idx))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// FLOWFIELD COMPUTATION
// ============================================================================

/// Compute a flowfield for the given goal world position.
///
/// Algorithm:
/// 1. Dijkstra (4-connected) from goal outward. Stepping into a cell costs
///    that cell's `cost`.
/// 2. Gradient pass: for each cell, find the 8-connected neighbor with the
///    smallest integration value and point toward it.
pub fn compute_flowfield(grid: &NavigationGrid, goal_world: Vec3) -> FlowField {
    let goal_cell = grid.world_to_cell_clamped(goal_world);
    let size = (grid.width * grid.height) as usize;
    let mut integration = vec![u32::MAX; size];
    let mut frontier = PriorityQueue::new();

    let goal_idx = grid.idx(goal_cell);
    if grid.walkable[goal_idx] {
        integration[goal_idx] = 0;
        frontier.enqueue(Frontier {
            cost: 0,
            idx: goal_idx as u32,
        });
    } else {
        log::warn!("flowfield goal {:?} is not walkable; field is empty", goal_cell);
    }

    let mut settled = 0usize;
    while let Ok(Frontier { cost, idx }) = frontier.dequeue() {
        if cost > integration[idx as usize] {
            continue;
        }
        settled += 1;
        let pos = UVec2::new(idx % grid.width, idx / grid.width);
        for nb in cardinal_neighbors(pos, grid.width, grid.height) {
            let ni = grid.idx(nb);
            if !grid.walkable[ni] {
                continue;
            }
            let next = cost.saturating_add(grid.cost[ni].max(1) as u32);
            if next < integration[ni] {
                integration[ni] = next;
                frontier.enqueue(Frontier {
                    cost: next,
                    idx: ni as u32,
                });
            }
        }
    }

    // Gradient pass: for each non-goal cell, find the 8-connected neighbor
    // with the lowest integration value and compute a direction toward it.
    let mut directions = vec![Vec2::ZERO; size];
    for cz in 0..grid.height {
        for cx in 0..grid.width {
            let idx = (cz * grid.width + cx) as usize;
            let cost = integration[idx];
            if cost == u32::MAX || cost == 0 {
                // Unreachable → no direction. At goal → stop.
                continue;
            }

            let pos = UVec2::new(cx, cz);
            let mut best_cost = cost;
            let mut best_dir = Vec2::ZERO;

            for nb in all_neighbors(pos, grid.width, grid.height) {
                let ni = (nb.y * grid.width + nb.x) as usize;
                if integration[ni] < best_cost {
                    best_cost = integration[ni];
                    let dx = nb.x as f32 - cx as f32;
                    let dz = nb.y as f32 - cz as f32;
                    // dx,dz are within {-1,0,1}², so only diagonals need scaling.
                    let len = (dx * dx + dz * dz).sqrt();
                    best_dir = Vec2::new(dx / len, dz / len);
                }
            }

            directions[idx] = best_dir;
        }
    }

    log::debug!(
        "flowfield to {:?}: {} cells settled of {}",
        goal_cell,
        settled,
        size
    );

    FlowField {
        directions,
        integration,
        width: grid.width,
        height: grid.height,
        goal_cell,
    }
}

// ============================================================================
// NEIGHBOR ITERATORS
// ============================================================================

/// The four cardinal (N/S/E/W) grid neighbors of a cell, clamped to bounds.
fn cardinal_neighbors(pos: UVec2, w: u32, h: u32) -> impl Iterator<Item = UVec2> {
    let (x, z) = (pos.x as i32, pos.y as i32);
    let (wi, hi) = (w as i32, h as i32);
    [(x - 1, z), (x + 1, z), (x, z - 1), (x, z + 1)]
        .into_iter()
        .filter(move |&(nx, nz)| nx >= 0 && nz >= 0 && nx < wi && nz < hi)
        .map(|(nx, nz)| UVec2::new(nx as u32, nz as u32))
}

/// All eight (cardinal + diagonal) neighbors, clamped to bounds.
/// Used for gradient computation so directions can point diagonally.
fn all_neighbors(pos: UVec2, w: u32, h: u32) -> impl Iterator<Item = UVec2> {
    let (x, z) = (pos.x as i32, pos.y as i32);
    let (wi, hi) = (w as i32, h as i32);
    [
        (-1, -1), (0, -1), (1, -1),
        (-1,  0),          (1,  0),
        (-1,  1), (0,  1), (1,  1),
    ]
    .into_iter()
    .filter(move |&(dx, dz)| {
        let nx = x + dx;
        let nz = z + dz;
        nx >= 0 && nz >= 0 && nx < wi && nz < hi
    })
    .map(move |(dx, dz)| UVec2::new((x + dx) as u32, (z + dz) as u32))
}
