use crate::components::{Collider, LevelEntity, Player, Position, Role};
use crate::enums::{DeathCause, EntityRole};
use crate::plugins::interaction::ContactPair;
use crate::plugins::presentation::PresentationCommand;
use crate::plugins::respawn::{raise_death, LevelBounds, ResetBroadcast};
use crate::plugins::simulation::{FrameClock, SimulationSet};
use crate::tuning::SimulationTuning;
use bevy::prelude::*;
use std::time::Duration;

/// Static point in a wall that fires projectiles across the level
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct EmissionPoint;

/// Projectile moving horizontally at a constant speed
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub velocity_x: f32,
}

/// Interval timer shared by every emission point of the level
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct HazardEmitter {
    pub accumulated: Duration,
    pub interval: Duration,
}

impl HazardEmitter {
    pub fn new(interval: Duration) -> Self {
        Self {
            accumulated: Duration::ZERO,
            interval,
        }
    }

    /// Accumulates `delta`; true when a spawn pass is due. The overflow is carried.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.accumulated += delta;
        if self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            true
        } else {
            false
        }
    }
}

/// Vertical alignment test on rounded coordinates, band edges included
pub fn in_spawn_band(player_y: f32, emitter_y: f32, band: f32) -> bool {
    let player_y = player_y.round();
    let emitter_y = emitter_y.round();
    player_y >= emitter_y && player_y <= emitter_y + band
}

/// Spawn position and horizontal velocity for a projectile leaving `emitter`.
///
/// Emitters on the left half fire right, the others fire left.
pub fn projectile_launch(emitter: Vec2, level_width: f32, tuning: &SimulationTuning) -> (Vec2, f32) {
    let direction = if emitter.x < level_width / 2.0 { 1.0 } else { -1.0 };
    let spawn = Vec2::new(emitter.x + direction * tuning.tile_size, emitter.y.round());
    (spawn, direction * tuning.projectile_speed)
}

/// Plugin for arrow walls, spikes and projectile lifetime
pub struct HazardPlugin;

impl Plugin for HazardPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameClock>()
            .init_resource::<SimulationTuning>()
            .add_event::<ResetBroadcast>()
            .add_event::<PresentationCommand>()
            .add_systems(
                Update,
                (emit_projectiles, advance_projectiles)
                    .chain()
                    .in_set(SimulationSet::Hazards),
            )
            .add_systems(Update, retire_projectiles.in_set(SimulationSet::ResetReaction));
    }
}

/// Fires from aligned emission points each time the interval elapses
fn emit_projectiles(
    mut commands: Commands,
    clock: Res<FrameClock>,
    tuning: Res<SimulationTuning>,
    emitter: Option<ResMut<HazardEmitter>>,
    bounds: Option<Res<LevelBounds>>,
    player_query: Query<&Position, With<Player>>,
    emission_points: Query<&Position, With<EmissionPoint>>,
) {
    let (Some(mut emitter), Some(bounds)) = (emitter, bounds) else {
        return;
    };
    if !emitter.tick(clock.delta) {
        return;
    }
    let Ok(player) = player_query.get_single() else {
        return;
    };

    for point in emission_points.iter() {
        if !in_spawn_band(player.y, point.y, tuning.tile_size) {
            continue;
        }

        let (spawn, velocity_x) = projectile_launch(point.as_vec2(), bounds.width, &tuning);
        commands.spawn((
            Projectile { velocity_x },
            Role(EntityRole::Projectile),
            Position::from(spawn),
            Collider::new(tuning.tile_size, tuning.tile_size / 4.0),
            LevelEntity,
        ));
        debug!("Projectile fired from ({}, {})", point.x, point.y);
    }
}

/// Moves projectiles horizontally and culls the ones that left the level
fn advance_projectiles(
    mut commands: Commands,
    clock: Res<FrameClock>,
    bounds: Option<Res<LevelBounds>>,
    mut query: Query<(Entity, &Projectile, &mut Position)>,
) {
    let delta_time = clock.delta_seconds();
    for (entity, projectile, mut position) in query.iter_mut() {
        position.x += projectile.velocity_x * delta_time;

        if bounds.as_ref().is_some_and(|b| !b.contains(position.as_vec2())) {
            commands.entity(entity).despawn();
        }
    }
}

/// Removes every live projectile on reset
fn retire_projectiles(
    mut commands: Commands,
    mut resets: EventReader<ResetBroadcast>,
    query: Query<Entity, With<Projectile>>,
    mut presentation: EventWriter<PresentationCommand>,
) {
    if resets.read().count() == 0 {
        return;
    }

    for entity in query.iter() {
        commands.entity(entity).despawn();
        presentation.send(PresentationCommand::DestroyVisual { entity });
    }
}

fn destroy_projectile(world: &mut World, projectile: Entity) {
    if world.despawn(projectile) {
        world.send_event(PresentationCommand::DestroyVisual { entity: projectile });
    }
}

/// Projectile side of a projectile/terrain contact
pub fn projectile_hits_terrain(world: &mut World, pair: &ContactPair) {
    destroy_projectile(world, pair.this);
}

/// Projectile side of a player/projectile contact
pub fn projectile_hits_player(world: &mut World, pair: &ContactPair) {
    destroy_projectile(world, pair.this);
}

/// Player side of a player/projectile contact
pub fn player_hit_by_projectile(world: &mut World, _pair: &ContactPair) {
    raise_death(world, DeathCause::Projectile);
}

/// Player side of a player/spike contact
pub fn player_hits_spike(world: &mut World, _pair: &ContactPair) {
    raise_death(world, DeathCause::Spike);
}
