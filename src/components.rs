use crate::enums::EntityRole;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Position component - world coordinates of the body center, y grows downward
#[derive(Component, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Velocity component - pixels per second, negative y is up
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Collider component - axis-aligned bounding box centered on the position
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Collider {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Returns (left, top, right, bottom) for a body at `position`
    pub fn bounds(&self, position: &Position) -> (f32, f32, f32, f32) {
        let cx = position.x + self.offset_x;
        let cy = position.y + self.offset_y;
        (
            cx - self.width / 2.0,
            cy - self.height / 2.0,
            cx + self.width / 2.0,
            cy + self.height / 2.0,
        )
    }
}

/// Contact flags written by the physics host each step
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct ContactState {
    pub grounded: bool,
    pub wall_left: bool,
    pub wall_right: bool,
}

/// Role used by the interaction registry to route contacts
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Role(pub EntityRole);

/// Player marker component
#[derive(Component)]
pub struct Player;

/// Player intent component - logical input for the current step
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct PlayerIntent {
    pub move_left: bool,
    pub move_right: bool,
    pub jump_held: bool,
    /// Jump went down this step
    pub jump_pressed: bool,
    /// Action went down this step
    pub action_pressed: bool,
}

/// Remaining and maximum jumps before the player must touch ground again
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct JumpBudget {
    pub remaining: u32,
    pub max: u32,
}

impl JumpBudget {
    pub fn full(max: u32) -> Self {
        Self {
            remaining: max,
            max,
        }
    }
}

/// Static level terrain, solid to the player and lethal to projectiles
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Terrain;

/// Static spike hazard
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Spike;

/// Marks everything the level orchestrator spawned, for teardown
#[derive(Component)]
pub struct LevelEntity;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(100.0, 200.0);
        assert_eq!(pos.x, 100.0);
        assert_eq!(pos.y, 200.0);
        assert_eq!(pos.as_vec2(), Vec2::new(100.0, 200.0));
    }

    #[test]
    fn test_velocity_default() {
        let vel = Velocity::default();
        assert_eq!(vel.x, 0.0);
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn test_collider_bounds() {
        let collider = Collider::new(32.0, 64.0);
        let bounds = collider.bounds(&Position::new(100.0, 100.0));
        assert_eq!(bounds, (84.0, 68.0, 116.0, 132.0));
    }

    #[test]
    fn test_jump_budget_full() {
        let budget = JumpBudget::full(2);
        assert_eq!(budget.remaining, 2);
        assert_eq!(budget.max, 2);
    }

    #[test]
    fn test_contact_state_default() {
        let contact = ContactState::default();
        assert!(!contact.grounded);
        assert!(!contact.wall_left);
        assert!(!contact.wall_right);
    }
}
