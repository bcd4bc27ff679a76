// Headless demo: a wave of units is scheduled at random positions, appears
// over time, and walks a Dijkstra flowfield around a wall to the goal.
// Run with RUST_LOG=debug to see the scheduler and flowfield at work.

use bevy_ecs::prelude::*;
use glam::{UVec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use flume_frontier::engine::navigation::{
    compute_flowfield, NavigationGrid, GRID_HEIGHT, GRID_WIDTH, WORLD_HALF,
};
use flume_frontier::engine::scheduler::SpawnScheduler;
use flume_frontier::engine::systems::build_schedule;
use flume_frontier::engine::{GameClock, SpawnSettings, UnitAgent};

// ============================================================================
// CONFIG
// ============================================================================

struct DemoConfig {
    /// Fixed simulation step in seconds.
    tick_dt: f32,
    /// Hard stop for the demo loop.
    max_ticks: u32,
    wave_size: u32,
    /// Seconds between consecutive spawns in the wave.
    spawn_spacing: f32,
    goal: UVec2,
    /// Cost of the swamp strip the flowfield should prefer to avoid.
    swamp_cost: u8,
    /// Unit walking speed in world units per second.
    unit_speed: f32,
    /// Seconds before a unit that never reached the goal is removed.
    unit_lifetime: f32,
    seed: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tick_dt: 1.0 / 30.0,
            max_ticks: 30 * 60,
            wave_size: 64,
            spawn_spacing: 0.25,
            goal: UVec2::new(85, 50),
            swamp_cost: 8,
            unit_speed: 4.0,
            unit_lifetime: 30.0,
            seed: 0x5EED,
        }
    }
}

// ============================================================================
// WORLD SETUP
// ============================================================================

/// Open grid with a vertical wall (gap at the middle) and a swamp strip.
fn build_grid(config: &DemoConfig) -> NavigationGrid {
    let mut grid = NavigationGrid::new_open(GRID_WIDTH, GRID_HEIGHT);
    for z in 0..GRID_HEIGHT {
        if !(45..55).contains(&z) {
            grid.set_blocked(UVec2::new(60, z));
        }
    }
    for z in 20..80 {
        for x in 30..34 {
            grid.set_cost(UVec2::new(x, z), config.swamp_cost);
        }
    }
    grid
}

fn schedule_wave(config: &DemoConfig, grid: &NavigationGrid, scheduler: &mut SpawnScheduler) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut scheduled = 0;
    while scheduled < config.wave_size {
        let pos = Vec3::new(
            rng.gen_range(-WORLD_HALF + 2.0..-20.0),
            0.0,
            rng.gen_range(-WORLD_HALF + 2.0..WORLD_HALF - 2.0),
        );
        let Some(cell) = grid.world_to_cell(pos) else { continue };
        if !grid.is_walkable(cell) {
            continue;
        }
        // Scheduled out of order on purpose; the queue sorts them by time.
        let slot = (config.wave_size - 1 - scheduled) as f32;
        if scheduler.schedule(slot * config.spawn_spacing, pos).is_none() {
            log::warn!("spawn slot {} dropped", slot);
        }
        scheduled += 1;
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() {
    env_logger::init();

    let config = DemoConfig::default();
    let grid = build_grid(&config);
    let field = compute_flowfield(&grid, grid.cell_center(config.goal));
    log::info!(
        "flowfield ready: goal {:?}, {} reachable cells",
        field.goal_cell,
        field.reachable_cells()
    );

    let mut scheduler = SpawnScheduler::new();
    schedule_wave(&config, &grid, &mut scheduler);
    log::info!(
        "{} spawns scheduled, first at t={:?}",
        scheduler.pending(),
        scheduler.next_due()
    );

    let mut world = World::new();
    world.insert_resource(GameClock::default());
    world.insert_resource(SpawnSettings {
        unit_speed: config.unit_speed,
        unit_lifetime: config.unit_lifetime,
    });
    world.insert_resource(field);
    world.insert_resource(scheduler);
    let mut schedule = build_schedule();

    let mut units = world.query::<&UnitAgent>();
    for tick in 1..=config.max_ticks {
        world.resource_mut::<GameClock>().advance(config.tick_dt);
        schedule.run(&mut world);

        let alive = units.iter(&world).count();
        let pending = world.resource::<SpawnScheduler>().pending();
        if tick % 30 == 0 {
            log::info!(
                "t={:.1}s | units: {} | pending spawns: {}",
                world.resource::<GameClock>().elapsed,
                alive,
                pending
            );
        }
        if alive == 0 && pending == 0 {
            log::info!("wave cleared after {} ticks", tick);
            return;
        }
    }

    let remaining = units.iter(&world).count();
    log::warn!("demo stopped with {} units still walking", remaining);
}
