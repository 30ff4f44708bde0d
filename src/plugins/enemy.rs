use crate::components::{Player, Position, Velocity};
use crate::enums::{AbilityTrait, ContactSide, DeathCause, EnemyState};
use crate::plugins::ability::AbilityLoadout;
use crate::plugins::interaction::ContactPair;
use crate::plugins::presentation::PresentationCommand;
use crate::plugins::respawn::{raise_death, ResetBroadcast};
use crate::plugins::simulation::SimulationSet;
use crate::tuning::SimulationTuning;
use bevy::prelude::*;

/// Enemy component - idle/chase behavior around a fixed origin
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Enemy {
    pub origin: Vec2,
    pub detection_radius: f32,
    pub chase_speed: f32,
    pub facing_left: bool,
    pub state: EnemyState,
}

impl Enemy {
    pub fn new(origin: Vec2, tuning: &SimulationTuning) -> Self {
        Self {
            origin,
            detection_radius: tuning.enemy_detection_radius,
            chase_speed: tuning.enemy_chase_speed,
            facing_left: false,
            state: EnemyState::Idle,
        }
    }
}

/// Plugin for enemy behavior and enemy contact resolution
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationTuning>()
            .add_event::<ResetBroadcast>()
            .add_event::<PresentationCommand>()
            .add_systems(Update, update_enemy_behavior.in_set(SimulationSet::Enemies))
            .add_systems(
                Update,
                return_enemies_to_origin.in_set(SimulationSet::ResetReaction),
            );
    }
}

/// One behavior step for an enemy at `position` with the player at `player`
pub fn enemy_step(
    enemy: &mut Enemy,
    position: Vec2,
    velocity: &mut Velocity,
    player: Vec2,
    idle_decel: f32,
) {
    let offset = player - position;
    enemy.state = if offset.length() < enemy.detection_radius {
        EnemyState::Chasing
    } else {
        EnemyState::Idle
    };

    match enemy.state {
        EnemyState::Chasing => {
            let chase = offset.normalize_or_zero() * enemy.chase_speed;
            velocity.x = chase.x;
            velocity.y = chase.y;
            if chase.x != 0.0 {
                enemy.facing_left = chase.x < 0.0;
            }
        }
        EnemyState::Idle => {
            velocity.x = toward_zero(velocity.x, idle_decel);
            velocity.y = toward_zero(velocity.y, idle_decel);
        }
    }
}

fn toward_zero(value: f32, step: f32) -> f32 {
    if value > 0.0 {
        (value - step).max(0.0)
    } else {
        (value + step).min(0.0)
    }
}

/// Runs the idle/chase step for every enemy against the player
fn update_enemy_behavior(
    tuning: Res<SimulationTuning>,
    player_query: Query<&Position, With<Player>>,
    mut enemy_query: Query<(&mut Enemy, &Position, &mut Velocity), Without<Player>>,
) {
    let Ok(player) = player_query.get_single() else {
        return;
    };

    for (mut enemy, position, mut velocity) in enemy_query.iter_mut() {
        let before = enemy.state;
        enemy_step(
            &mut enemy,
            position.as_vec2(),
            &mut velocity,
            player.as_vec2(),
            tuning.enemy_idle_decel,
        );
        if enemy.state != before {
            debug!("Enemy at {:?} now {:?}", enemy.origin, enemy.state);
        }
    }
}

/// True when the player lands on the enemy's up side with a stomping ability
pub fn is_stomp(world: &World, player: Entity, enemy_side: ContactSide) -> bool {
    if enemy_side != ContactSide::Up {
        return false;
    }
    let (Some(loadout), Some(tuning)) = (
        world.get::<AbilityLoadout>(player),
        world.get_resource::<SimulationTuning>(),
    ) else {
        return false;
    };
    loadout.descriptor(tuning).grants(AbilityTrait::Stomp)
}

/// Player side of a player/enemy contact: bounce on a stomp, die otherwise
pub fn player_touches_enemy(world: &mut World, pair: &ContactPair) {
    if !is_stomp(world, pair.this, pair.other_side) {
        raise_death(world, DeathCause::Enemy);
        return;
    }

    let bounce = match (
        world.get::<AbilityLoadout>(pair.this),
        world.get_resource::<SimulationTuning>(),
    ) {
        (Some(loadout), Some(tuning)) => {
            loadout.descriptor(tuning).jump_force * tuning.stomp_bounce_factor
        }
        _ => return,
    };
    if let Some(mut velocity) = world.get_mut::<Velocity>(pair.this) {
        velocity.y = -bounce;
    }
}

/// Enemy side of a player/enemy contact: removed for good on a stomp
pub fn enemy_touched_by_player(world: &mut World, pair: &ContactPair) {
    if !is_stomp(world, pair.other, pair.this_side) {
        return;
    }

    world.despawn(pair.this);
    world.send_event(PresentationCommand::DestroyVisual { entity: pair.this });
    info!("Enemy {:?} stomped", pair.this);
}

/// Sends surviving enemies back to where they spawned on reset
fn return_enemies_to_origin(
    mut resets: EventReader<ResetBroadcast>,
    mut enemy_query: Query<(&mut Enemy, &mut Position, &mut Velocity)>,
) {
    if resets.read().count() == 0 {
        return;
    }

    for (mut enemy, mut position, mut velocity) in enemy_query.iter_mut() {
        *position = Position::from(enemy.origin);
        *velocity = Velocity::default();
        enemy.state = EnemyState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Role;
    use crate::enums::{AbilitySlot, ContactEvent, EntityRole};
    use crate::plugins::interaction::{ContactReport, InteractionRegistry};
    use crate::plugins::respawn::DeathSignal;
    use crate::plugins::simulation::SimulationPlugin;
    use std::time::Duration;

    fn enemy_at(origin: Vec2) -> Enemy {
        Enemy::new(origin, &SimulationTuning::default())
    }

    #[test]
    fn test_enemy_chases_inside_detection_radius() {
        let mut enemy = enemy_at(Vec2::new(500.0, 100.0));
        let mut velocity = Velocity::default();

        enemy_step(
            &mut enemy,
            Vec2::new(500.0, 100.0),
            &mut velocity,
            Vec2::new(300.0, 100.0),
            0.5,
        );

        assert_eq!(enemy.state, EnemyState::Chasing);
        assert_eq!(velocity, Velocity::new(-100.0, 0.0));
        assert!(enemy.facing_left);
    }

    #[test]
    fn test_enemy_idles_at_exact_radius() {
        let mut enemy = enemy_at(Vec2::ZERO);
        enemy.state = EnemyState::Chasing;
        let mut velocity = Velocity::new(100.0, 0.0);

        enemy_step(
            &mut enemy,
            Vec2::ZERO,
            &mut velocity,
            Vec2::new(300.0, 0.0),
            0.5,
        );

        assert_eq!(enemy.state, EnemyState::Idle);
        assert_eq!(velocity.x, 99.5);
    }

    #[test]
    fn test_idle_decel_approaches_zero_from_both_signs() {
        let mut enemy = enemy_at(Vec2::ZERO);
        let mut velocity = Velocity::new(-1.2, 0.3);
        let far = Vec2::new(5000.0, 0.0);

        enemy_step(&mut enemy, Vec2::ZERO, &mut velocity, far, 0.5);
        assert!((velocity.x + 0.7).abs() < 1e-5);
        assert_eq!(velocity.y, 0.0);

        for _ in 0..5 {
            enemy_step(&mut enemy, Vec2::ZERO, &mut velocity, far, 0.5);
        }
        assert_eq!(velocity, Velocity::default());
    }

    fn contact_world(slot: AbilitySlot) -> (World, InteractionRegistry, Entity, Entity) {
        let mut world = World::new();
        world.insert_resource(SimulationTuning::default());
        world.init_resource::<Events<DeathSignal>>();
        world.init_resource::<Events<PresentationCommand>>();

        let mut loadout = AbilityLoadout::with_unlocked(Duration::from_millis(1000), &[slot]);
        loadout.advance(Duration::from_millis(1000));
        while loadout.current() != slot {
            loadout.switch_to_next();
            loadout.advance(Duration::from_millis(1000));
        }

        let player = world
            .spawn((
                Player,
                Role(EntityRole::Player),
                Velocity::new(0.0, 300.0),
                loadout,
            ))
            .id();
        let enemy = world.spawn(Role(EntityRole::Enemy)).id();

        let mut registry = InteractionRegistry::default();
        registry
            .register_pair(
                EntityRole::Player,
                EntityRole::Enemy,
                ContactEvent::CollideWithEnemy,
                ContactEvent::CollideWithPlayer,
                player_touches_enemy,
                enemy_touched_by_player,
            )
            .unwrap();
        (world, registry, player, enemy)
    }

    #[test]
    fn test_stomp_from_above_removes_enemy_and_bounces() {
        let (mut world, registry, player, enemy) = contact_world(AbilitySlot::Stomp);

        registry.dispatch(
            &mut world,
            &ContactReport {
                a: player,
                b: enemy,
                a_side: ContactSide::Down,
            },
        );

        assert!(world.get_entity(enemy).is_none());
        assert_eq!(world.get::<Velocity>(player).unwrap().y, -750.0);
        assert!(world.resource::<Events<DeathSignal>>().is_empty());
    }

    #[test]
    fn test_landing_on_enemy_without_stomp_is_lethal() {
        let (mut world, registry, player, enemy) = contact_world(AbilitySlot::Climb);

        registry.dispatch(
            &mut world,
            &ContactReport {
                a: player,
                b: enemy,
                a_side: ContactSide::Down,
            },
        );

        assert!(world.get_entity(enemy).is_some());
        assert_eq!(world.resource::<Events<DeathSignal>>().len(), 1);
    }

    #[test]
    fn test_side_contact_with_stomp_is_lethal() {
        let (mut world, registry, player, enemy) = contact_world(AbilitySlot::Stomp);

        registry.dispatch(
            &mut world,
            &ContactReport {
                a: enemy,
                b: player,
                a_side: ContactSide::Left,
            },
        );

        assert!(world.get_entity(enemy).is_some());
        assert_eq!(world.get::<Velocity>(player).unwrap().y, 300.0);
        assert_eq!(world.resource::<Events<DeathSignal>>().len(), 1);
    }

    #[test]
    fn test_survivors_return_to_origin_on_reset() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins((SimulationPlugin::manual(), EnemyPlugin));

        let enemy = app
            .world
            .spawn((
                enemy_at(Vec2::new(400.0, 200.0)),
                Position::new(350.0, 260.0),
                Velocity::new(-100.0, 0.0),
            ))
            .id();

        app.world.send_event(ResetBroadcast {
            respawn: Vec2::new(64.0, 64.0),
        });
        app.update();

        assert_eq!(
            *app.world.get::<Position>(enemy).unwrap(),
            Position::new(400.0, 200.0)
        );
        assert_eq!(*app.world.get::<Velocity>(enemy).unwrap(), Velocity::default());
        assert_eq!(app.world.get::<Enemy>(enemy).unwrap().state, EnemyState::Idle);
    }

    #[test]
    fn test_enemy_system_follows_player() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins((SimulationPlugin::manual(), EnemyPlugin));

        app.world.spawn((Player, Position::new(100.0, 200.0)));
        let enemy = app
            .world
            .spawn((
                enemy_at(Vec2::new(200.0, 200.0)),
                Position::new(200.0, 200.0),
                Velocity::default(),
            ))
            .id();

        app.update();

        let state = app.world.get::<Enemy>(enemy).unwrap();
        assert_eq!(state.state, EnemyState::Chasing);
        assert_eq!(app.world.get::<Velocity>(enemy).unwrap().x, -100.0);
    }
}
