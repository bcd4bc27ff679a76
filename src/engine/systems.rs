// ECS systems for updating game state
// Systems operate on entities with specific component combinations

use bevy_ecs::prelude::*;

use super::components::*;
use super::navigation::FlowField;
use super::scheduler::SpawnScheduler;

/// Turn every spawn whose time has come into a unit entity.
pub fn spawn_due_system(
    mut commands: Commands,
    clock: Res<GameClock>,
    settings: Res<SpawnSettings>,
    mut scheduler: ResMut<SpawnScheduler>,
) {
    for spawn in scheduler.pop_due(clock.elapsed) {
        commands.spawn((
            Transform::from_position(spawn.position),
            Velocity::default(),
            UnitAgent {
                max_speed: settings.unit_speed,
            },
            Lifetime {
                remaining: settings.unit_lifetime,
            },
        ));
    }
}

/// Point each unit's velocity along the flowfield.
pub fn steering_system(
    field: Res<FlowField>,
    mut query: Query<(&Transform, &mut Velocity, &UnitAgent)>,
) {
    for (transform, mut velocity, agent) in query.iter_mut() {
        let dir = field
            .world_to_cell(transform.position)
            .map(|cell| field.sample_cell(cell))
            .unwrap_or_default();
        velocity.linear = glam::Vec3::new(dir.x, 0.0, dir.y) * agent.max_speed;
    }
}

/// Apply velocity * delta to position
pub fn movement_system(clock: Res<GameClock>, mut query: Query<(&mut Transform, &Velocity)>) {
    for (mut transform, velocity) in query.iter_mut() {
        transform.position += velocity.linear * clock.delta;
    }
}

/// Despawn units that reached the goal.
pub fn arrival_system(
    mut commands: Commands,
    field: Res<FlowField>,
    query: Query<(Entity, &Transform), With<UnitAgent>>,
) {
    for (entity, transform) in query.iter() {
        if let Some(cell) = field.world_to_cell(transform.position) {
            if field.near_goal(cell) {
                log::trace!("{:?} arrived at {:?}", entity, cell);
                commands.entity(entity).despawn();
            }
        }
    }
}

/// Decrease lifetime and despawn entities when lifetime expires
pub fn lifetime_system(
    mut commands: Commands,
    clock: Res<GameClock>,
    mut query: Query<(Entity, &mut Lifetime)>,
) {
    for (entity, mut lifetime) in query.iter_mut() {
        lifetime.remaining -= clock.delta;
        if lifetime.remaining <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// The per-tick schedule: spawn, steer, move, then retire arrived/expired units.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            spawn_due_system,
            steering_system,
            movement_system,
            arrival_system,
            lifetime_system,
        )
            .chain(),
    );
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::navigation::{compute_flowfield, NavigationGrid, GRID_HEIGHT, GRID_WIDTH};
    use glam::{UVec2, Vec3};

    fn world_with_goal(goal: UVec2) -> (World, Vec3) {
        let grid = NavigationGrid::new_open(GRID_WIDTH, GRID_HEIGHT);
        let goal_world = grid.cell_center(goal);
        let mut world = World::new();
        world.insert_resource(GameClock::default());
        world.insert_resource(SpawnSettings::default());
        world.insert_resource(SpawnScheduler::new());
        world.insert_resource(compute_flowfield(&grid, goal_world));
        (world, goal_world)
    }

    fn tick(world: &mut World, schedule: &mut Schedule, dt: f32) {
        world.resource_mut::<GameClock>().advance(dt);
        schedule.run(world);
    }

    fn unit_count(world: &mut World) -> usize {
        world.query::<&UnitAgent>().iter(world).count()
    }

    #[test]
    fn test_spawns_appear_when_due() {
        let (mut world, _) = world_with_goal(UVec2::new(50, 50));
        {
            let mut sched = world.resource_mut::<SpawnScheduler>();
            sched.schedule(0.25, Vec3::new(-20.0, 0.0, -20.0));
            sched.schedule(1.0, Vec3::new(20.0, 0.0, 20.0));
        }
        let mut schedule = build_schedule();

        tick(&mut world, &mut schedule, 0.1);
        assert_eq!(unit_count(&mut world), 0);
        tick(&mut world, &mut schedule, 0.2);
        assert_eq!(unit_count(&mut world), 1);
        for _ in 0..8 {
            tick(&mut world, &mut schedule, 0.1);
        }
        assert_eq!(unit_count(&mut world), 2);
        assert_eq!(world.resource::<SpawnScheduler>().pending(), 0);
    }

    #[test]
    fn test_units_walk_to_goal_and_despawn() {
        let (mut world, goal) = world_with_goal(UVec2::new(60, 50));
        world
            .resource_mut::<SpawnScheduler>()
            .schedule(0.0, goal + Vec3::new(-10.0, 0.0, 0.0));
        let mut schedule = build_schedule();

        tick(&mut world, &mut schedule, 0.1);
        assert_eq!(unit_count(&mut world), 1);
        let start_x = world.query::<&Transform>().single(&world).position.x;
        tick(&mut world, &mut schedule, 0.1);
        let next_x = world.query::<&Transform>().single(&world).position.x;
        assert!(next_x > start_x, "unit should move toward the goal");

        // 10 units at 4 u/s is well under 5 seconds.
        for _ in 0..50 {
            tick(&mut world, &mut schedule, 0.1);
        }
        assert_eq!(unit_count(&mut world), 0);
    }

    #[test]
    fn test_lifetime_expires() {
        let (mut world, _) = world_with_goal(UVec2::new(50, 50));
        world.spawn(Lifetime { remaining: 0.3 });
        let mut schedule = build_schedule();
        for _ in 0..2 {
            tick(&mut world, &mut schedule, 0.1);
        }
        assert_eq!(world.query::<&Lifetime>().iter(&world).count(), 1);
        for _ in 0..2 {
            tick(&mut world, &mut schedule, 0.1);
        }
        assert_eq!(world.query::<&Lifetime>().iter(&world).count(), 0);
    }

    #[test]
    fn test_spawned_units_use_settings() {
        let (mut world, _) = world_with_goal(UVec2::new(50, 50));
        world.insert_resource(SpawnSettings {
            unit_speed: 7.5,
            unit_lifetime: 2.0,
        });
        world
            .resource_mut::<SpawnScheduler>()
            .schedule(0.0, Vec3::new(-30.0, 0.0, -30.0));
        let mut schedule = build_schedule();
        tick(&mut world, &mut schedule, 0.5);

        let agent = *world.query::<&UnitAgent>().single(&world);
        assert_eq!(agent.max_speed, 7.5);
        let lifetime = *world.query::<&Lifetime>().single(&world);
        assert!(lifetime.remaining <= 2.0 && lifetime.remaining > 1.0);
    }
}
