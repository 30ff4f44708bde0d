use crate::components::{Collider, Position, Role};
use crate::enums::{AbilitySlot, AnimationKey, EntityRole};
use crate::plugins::level::PlayerView;
use bevy::prelude::*;

/// Commands the simulation issues to the renderer. Nothing waits on them.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum PresentationCommand {
    PlayAnimation {
        entity: Entity,
        animation: AnimationKey,
    },
    SetAlpha {
        entity: Entity,
        alpha: f32,
    },
    DestroyVisual {
        entity: Entity,
    },
}

/// Animation currently shown for an entity
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub current: AnimationKey,
}

/// Camera target component - marks the camera entity
#[derive(Component)]
pub struct GameCamera;

/// Renderer side of the presentation sink: colored quads, alpha, camera follow
pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PresentationCommand>()
            .init_resource::<PlayerView>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                PostUpdate,
                (
                    attach_visuals_system,
                    apply_presentation_commands,
                    sync_transform_system,
                    camera_follow_system,
                )
                    .chain(),
            );
    }
}

/// Spawns the follow camera
fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2dBundle::default(), GameCamera));
}

pub fn skin_color(slot: AbilitySlot) -> Color {
    match slot {
        AbilitySlot::Climb => Color::rgb(0.95, 0.85, 0.2),
        AbilitySlot::Boost => Color::rgb(0.6, 0.3, 0.8),
        AbilitySlot::Stomp => Color::rgb(0.2, 0.4, 0.9),
    }
}

fn role_color(role: EntityRole) -> Color {
    match role {
        EntityRole::Player => skin_color(AbilitySlot::Climb),
        EntityRole::Enemy => Color::rgb(0.85, 0.85, 0.95),
        EntityRole::Checkpoint => Color::rgb(0.5, 0.5, 0.5),
        EntityRole::AbilityPickup => Color::rgb(0.9, 0.4, 0.7),
        EntityRole::TimeBonus => Color::rgb(0.3, 0.9, 0.6),
        EntityRole::EndLevel => Color::rgba(1.0, 1.0, 1.0, 0.0),
        EntityRole::Spike => Color::rgb(0.8, 0.1, 0.1),
        EntityRole::Projectile => Color::rgb(0.6, 0.4, 0.2),
        EntityRole::Terrain => Color::rgb(0.25, 0.25, 0.3),
    }
}

/// Gives every new body a sprite sized to its collider
fn attach_visuals_system(
    mut commands: Commands,
    query: Query<(Entity, &Collider, &Role, &Position), Added<Collider>>,
) {
    for (entity, collider, role, position) in query.iter() {
        commands.entity(entity).insert(SpriteBundle {
            sprite: Sprite {
                color: role_color(role.0),
                custom_size: Some(Vec2::new(collider.width, collider.height)),
                ..default()
            },
            transform: Transform::from_xyz(position.x, -position.y, 0.0),
            ..default()
        });
    }
}

/// Applies skin, alpha and destroy commands to sprites
fn apply_presentation_commands(
    mut commands: Commands,
    mut events: EventReader<PresentationCommand>,
    mut sprites: Query<&mut Sprite>,
) {
    for command in events.read() {
        match *command {
            PresentationCommand::PlayAnimation { entity, animation } => {
                if let Ok(mut sprite) = sprites.get_mut(entity) {
                    match animation {
                        AnimationKey::Skin(slot) => sprite.color = skin_color(slot),
                        AnimationKey::CheckpointLit => sprite.color = Color::rgb(0.2, 0.9, 0.3),
                    }
                }
                if let Some(mut entity_commands) = commands.get_entity(entity) {
                    entity_commands.insert(AnimationState { current: animation });
                }
            }
            PresentationCommand::SetAlpha { entity, alpha } => {
                if let Ok(mut sprite) = sprites.get_mut(entity) {
                    sprite.color.set_a(alpha);
                }
            }
            PresentationCommand::DestroyVisual { entity } => {
                debug!("Visual destroyed for {:?}", entity);
            }
        }
    }
}

/// Maps simulation coordinates (y down) onto the renderer (y up)
fn sync_transform_system(mut query: Query<(&Position, &mut Transform)>) {
    for (position, mut transform) in query.iter_mut() {
        transform.translation.x = position.x;
        transform.translation.y = -position.y;
    }
}

/// Centers the camera on the player
fn camera_follow_system(
    view: Res<PlayerView>,
    mut camera_query: Query<&mut Transform, With<GameCamera>>,
) {
    let Ok(mut camera_transform) = camera_query.get_single_mut() else {
        return;
    };
    camera_transform.translation.x = view.position.x;
    camera_transform.translation.y = -view.position.y;
}
