use crate::components::{Collider, ContactState, Position, Terrain, Velocity};
use crate::plugins::simulation::{FrameClock, SimulationSet};
use crate::tuning::SimulationTuning;
use bevy::prelude::*;

/// Host physics stand-in: gravity, velocity integration and terrain push-out
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameClock>()
            .init_resource::<SimulationTuning>()
            .add_systems(
                Update,
                (apply_gravity, integrate_velocity, resolve_terrain)
                    .chain()
                    .in_set(SimulationSet::Physics),
            );
    }
}

/// Gravity applies to bodies that track terrain contact (the player), capped
/// at terminal velocity for the step that moves them
fn apply_gravity(
    clock: Res<FrameClock>,
    tuning: Res<SimulationTuning>,
    mut query: Query<&mut Velocity, With<ContactState>>,
) {
    let delta_time = clock.delta_seconds();
    for mut velocity in query.iter_mut() {
        velocity.y = (velocity.y + tuning.gravity * delta_time).min(tuning.terminal_velocity);
    }
}

/// Integrate velocity to update position each step
fn integrate_velocity(clock: Res<FrameClock>, mut query: Query<(&mut Position, &Velocity)>) {
    let delta_time = clock.delta_seconds();
    for (mut position, velocity) in query.iter_mut() {
        position.x += velocity.x * delta_time;
        position.y += velocity.y * delta_time;
    }
}

/// Pushes bodies out of terrain and records which sides touched it
fn resolve_terrain(
    mut bodies: Query<(&mut Position, &mut Velocity, &Collider, &mut ContactState), Without<Terrain>>,
    terrain: Query<(&Position, &Collider), With<Terrain>>,
) {
    for (mut position, mut velocity, collider, mut contact) in bodies.iter_mut() {
        *contact = ContactState::default();

        for (terrain_pos, terrain_collider) in terrain.iter() {
            let Some(push) = penetration(
                collider.bounds(&position),
                terrain_collider.bounds(terrain_pos),
            ) else {
                continue;
            };

            position.x += push.x;
            position.y += push.y;

            if push.y < 0.0 {
                contact.grounded = true;
                velocity.y = velocity.y.min(0.0);
            } else if push.y > 0.0 {
                velocity.y = velocity.y.max(0.0);
            } else if push.x > 0.0 {
                contact.wall_left = true;
            } else if push.x < 0.0 {
                contact.wall_right = true;
            }
        }
    }
}

/// Minimum translation moving box `a` out of box `b`, boxes as (left, top, right, bottom)
pub fn penetration(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> Option<Vec2> {
    let (a_left, a_top, a_right, a_bottom) = a;
    let (b_left, b_top, b_right, b_bottom) = b;

    let overlap_x = a_right.min(b_right) - a_left.max(b_left);
    let overlap_y = a_bottom.min(b_bottom) - a_top.max(b_top);
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return None;
    }

    let a_center = Vec2::new((a_left + a_right) / 2.0, (a_top + a_bottom) / 2.0);
    let b_center = Vec2::new((b_left + b_right) / 2.0, (b_top + b_bottom) / 2.0);

    if overlap_y <= overlap_x {
        let direction = if a_center.y < b_center.y { -1.0 } else { 1.0 };
        Some(Vec2::new(0.0, overlap_y * direction))
    } else {
        let direction = if a_center.x < b_center.x { -1.0 } else { 1.0 };
        Some(Vec2::new(overlap_x * direction, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(PhysicsPlugin);
        app.insert_resource(FrameClock::from_millis(100));
        app
    }

    #[test]
    fn test_gravity_accumulates_for_player_bodies() {
        let mut app = test_app();
        let body = app
            .world
            .spawn((
                Position::new(0.0, 0.0),
                Velocity::default(),
                Collider::new(32.0, 64.0),
                ContactState::default(),
            ))
            .id();

        app.update();
        app.update();

        let velocity = app.world.get::<Velocity>(body).unwrap();
        assert!((velocity.y - 240.0).abs() < 0.01, "got {}", velocity.y);
    }

    #[test]
    fn test_gravity_never_pushes_past_terminal_velocity() {
        let mut app = test_app();
        app.insert_resource(FrameClock::from_millis(500));
        let body = app
            .world
            .spawn((
                Position::new(0.0, 0.0),
                Velocity::new(0.0, 790.0),
                Collider::new(32.0, 64.0),
                ContactState::default(),
            ))
            .id();

        app.update();

        assert_eq!(app.world.get::<Velocity>(body).unwrap().y, 800.0);
        assert_eq!(app.world.get::<Position>(body).unwrap().y, 400.0);
    }

    #[test]
    fn test_bodies_without_contact_state_float() {
        let mut app = test_app();
        let body = app
            .world
            .spawn((Position::new(0.0, 0.0), Velocity::new(50.0, 0.0)))
            .id();

        app.update();

        let position = app.world.get::<Position>(body).unwrap();
        assert!((position.x - 5.0).abs() < 0.001);
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn test_landing_on_terrain_sets_grounded() {
        let mut app = test_app();
        app.world.spawn((
            Terrain,
            Position::new(0.0, 116.0),
            Collider::new(400.0, 32.0),
        ));
        let body = app
            .world
            .spawn((
                Position::new(0.0, 60.0),
                Velocity::new(0.0, 200.0),
                Collider::new(32.0, 64.0),
                ContactState::default(),
            ))
            .id();

        app.update();

        let contact = app.world.get::<ContactState>(body).unwrap();
        assert!(contact.grounded);
        assert_eq!(app.world.get::<Velocity>(body).unwrap().y, 0.0);
        let position = app.world.get::<Position>(body).unwrap();
        assert!((position.y - 68.0).abs() < 0.001, "got {}", position.y);
    }

    #[test]
    fn test_pushing_into_wall_sets_wall_flag() {
        let mut app = test_app();
        app.world.spawn((
            Terrain,
            Position::new(100.0, 0.0),
            Collider::new(32.0, 400.0),
        ));
        let body = app
            .world
            .spawn((
                Position::new(66.0, 0.0),
                Velocity::new(300.0, 0.0),
                Collider::new(32.0, 64.0),
                ContactState::default(),
            ))
            .id();

        app.update();

        let contact = app.world.get::<ContactState>(body).unwrap();
        assert!(contact.wall_right);
        assert!(!contact.wall_left);
        assert!(!contact.grounded);
    }

    #[test]
    fn test_penetration_prefers_shallow_axis() {
        let a = (0.0, 0.0, 32.0, 64.0);
        let below = (-100.0, 60.0, 100.0, 100.0);
        assert_eq!(penetration(a, below), Some(Vec2::new(0.0, -4.0)));

        let apart = (40.0, 0.0, 60.0, 64.0);
        assert_eq!(penetration(a, apart), None);
    }

    #[test]
    fn test_deterministic_physics() {
        let run_simulation = || {
            let mut app = test_app();
            let body = app
                .world
                .spawn((
                    Position::new(100.0, 200.0),
                    Velocity::new(50.0, -100.0),
                    Collider::new(32.0, 64.0),
                    ContactState::default(),
                ))
                .id();
            for _ in 0..10 {
                app.update();
            }
            *app.world.get::<Position>(body).unwrap()
        };

        assert_eq!(run_simulation(), run_simulation());
    }
}
