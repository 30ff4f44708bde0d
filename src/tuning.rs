use crate::enums::{AbilitySlot, AbilityTrait, SLOT_COUNT};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable tuning record for one ability slot
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityDescriptor {
    /// Horizontal speed in pixels per second
    pub speed: f32,
    /// Upward velocity applied on jump
    pub jump_force: f32,
    /// Jumps available between ground contacts
    pub jump_budget: u32,
    #[serde(default)]
    pub special: Option<AbilityTrait>,
}

impl AbilityDescriptor {
    pub fn grants(&self, special: AbilityTrait) -> bool {
        self.special == Some(special)
    }
}

/// Gameplay tuning, fixed when a level is composed.
///
/// Every field falls back to its default, so a level file only needs to list
/// the values it overrides.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationTuning {
    pub abilities: [AbilityDescriptor; SLOT_COUNT],
    pub ability_cooldown_ms: u64,
    pub terminal_velocity: f32,
    pub climb_speed: f32,
    pub gravity: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub invulnerability_ms: u64,
    pub flicker_interval_ms: u64,
    pub enemy_width: f32,
    pub enemy_height: f32,
    pub enemy_detection_radius: f32,
    pub enemy_chase_speed: f32,
    /// Subtracted from each idle enemy velocity axis per step
    pub enemy_idle_decel: f32,
    pub stomp_bounce_factor: f32,
    pub hazard_interval_ms: u64,
    pub projectile_speed: f32,
    pub tile_size: f32,
    pub time_bonus_ms: u64,
}

impl Default for SimulationTuning {
    fn default() -> Self {
        Self {
            abilities: [
                AbilityDescriptor {
                    speed: 300.0,
                    jump_force: 450.0,
                    jump_budget: 1,
                    special: Some(AbilityTrait::WallClimb),
                },
                AbilityDescriptor {
                    speed: 450.0,
                    jump_force: 450.0,
                    jump_budget: 2,
                    special: None,
                },
                AbilityDescriptor {
                    speed: 300.0,
                    jump_force: 500.0,
                    jump_budget: 1,
                    special: Some(AbilityTrait::Stomp),
                },
            ],
            ability_cooldown_ms: 1000,
            terminal_velocity: 800.0,
            climb_speed: 200.0,
            gravity: 1200.0,
            player_width: 32.0,
            player_height: 64.0,
            invulnerability_ms: 600,
            flicker_interval_ms: 100,
            enemy_width: 32.0,
            enemy_height: 64.0,
            enemy_detection_radius: 300.0,
            enemy_chase_speed: 100.0,
            enemy_idle_decel: 0.5,
            stomp_bounce_factor: 1.5,
            hazard_interval_ms: 1000,
            projectile_speed: 250.0,
            tile_size: 32.0,
            time_bonus_ms: 5000,
        }
    }
}

impl SimulationTuning {
    pub fn ability(&self, slot: AbilitySlot) -> &AbilityDescriptor {
        &self.abilities[slot.index()]
    }

    pub fn ability_cooldown(&self) -> Duration {
        Duration::from_millis(self.ability_cooldown_ms)
    }

    pub fn invulnerability(&self) -> Duration {
        Duration::from_millis(self.invulnerability_ms)
    }

    pub fn flicker_interval(&self) -> Duration {
        Duration::from_millis(self.flicker_interval_ms)
    }

    pub fn hazard_interval(&self) -> Duration {
        Duration::from_millis(self.hazard_interval_ms)
    }

    pub fn time_bonus(&self) -> Duration {
        Duration::from_millis(self.time_bonus_ms)
    }
}
