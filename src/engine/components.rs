// Core ECS components and resources for the engine

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Position of an entity in 3D space
#[derive(Component, Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position }
    }
}

/// Velocity of an entity in 3D space (units per second)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
}

/// Movement parameters for flowfield-driven units.
#[derive(Component, Debug, Clone, Copy)]
pub struct UnitAgent {
    pub max_speed: f32,
}

/// Seconds until the entity is despawned regardless of where it is.
#[derive(Component, Debug, Clone, Copy)]
pub struct Lifetime {
    pub remaining: f32,
}

/// Fixed-step simulation clock.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GameClock {
    /// Seconds since the simulation started.
    pub elapsed: f32,
    /// Length of the current tick in seconds.
    pub delta: f32,
}

impl GameClock {
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += delta;
    }
}

/// Stats given to units the scheduler spawns.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SpawnSettings {
    /// World units per second.
    pub unit_speed: f32,
    /// Seconds before an unarrived unit is despawned.
    pub unit_lifetime: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            unit_speed: 4.0,
            unit_lifetime: 30.0,
        }
    }
}
