use crate::enums::AbilitySlot;
use crate::tuning::SimulationTuning;
use bevy::prelude::Vec2;
use serde::{Deserialize, Serialize};

/// Object layer names the level orchestrator understands
pub mod layers {
    pub const PLAYER: &str = "player";
    pub const CHECKPOINTS: &str = "checkpoints";
    pub const ENEMIES: &str = "enemies";
    pub const ARROW_WALLS: &str = "arrow_walls";
    pub const SPIKES: &str = "spikes";
    pub const TERRAIN: &str = "terrain";
    pub const ABILITY_PICKUPS: &str = "ability_pickups";
    pub const TIME_BONUSES: &str = "time_bonuses";
    pub const END_LEVEL: &str = "end_level";
}

/// Level data structure matching JSON format
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub id: String,
    /// Map extent in pixels
    pub width: f32,
    pub height: f32,
    pub layers: Vec<ObjectLayer>,
    /// Abilities the player already owns when the level starts
    #[serde(default)]
    pub unlocked_abilities: Vec<AbilitySlot>,
    /// Level loaded when the end trigger is reached
    #[serde(default)]
    pub next_level: Option<String>,
    #[serde(default)]
    pub tuning: SimulationTuning,
}

/// Named list of map objects
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectLayer {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

/// One object of a layer, positioned by its center
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    /// Slot granted by an ability pickup
    #[serde(default)]
    pub ability: Option<AbilitySlot>,
}

impl MapObject {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            width: 0.0,
            height: 0.0,
            ability: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl LevelData {
    /// Objects of the named layer, empty when the layer is absent
    pub fn layer(&self, name: &str) -> &[MapObject] {
        self.find_layer(name)
            .map(|layer| layer.objects.as_slice())
            .unwrap_or(&[])
    }

    pub fn find_layer(&self, name: &str) -> Option<&ObjectLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Player spawn location, if the level declares one
    pub fn player_spawn(&self) -> Option<Vec2> {
        self.layer(layers::PLAYER).first().map(MapObject::position)
    }
}
