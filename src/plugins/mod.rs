pub mod ability;
pub mod broad_phase;
pub mod collectible;
pub mod enemy;
pub mod hazard;
pub mod interaction;
pub mod level;
pub mod movement;
pub mod physics;
pub mod presentation;
pub mod respawn;
pub mod simulation;

pub use ability::AbilityPlugin;
pub use broad_phase::BroadPhasePlugin;
pub use enemy::EnemyPlugin;
pub use hazard::HazardPlugin;
pub use interaction::InteractionPlugin;
pub use level::LevelPlugin;
pub use movement::MovementPlugin;
pub use physics::PhysicsPlugin;
pub use presentation::PresentationPlugin;
pub use respawn::RespawnPlugin;
pub use simulation::SimulationPlugin;

use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;

/// Every headless gameplay plugin, in no particular order (the system sets
/// fix the frame order). Rendering is added separately with
/// [`PresentationPlugin`].
#[derive(Default)]
pub struct GameplayPlugins {
    pub simulation: SimulationPlugin,
}

impl GameplayPlugins {
    /// Frame clock stepped by hand instead of following `Time`
    pub fn manual() -> Self {
        Self {
            simulation: SimulationPlugin::manual(),
        }
    }
}

impl PluginGroup for GameplayPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(self.simulation)
            .add(InteractionPlugin)
            .add(BroadPhasePlugin)
            .add(MovementPlugin)
            .add(AbilityPlugin)
            .add(EnemyPlugin)
            .add(HazardPlugin)
            .add(PhysicsPlugin)
            .add(RespawnPlugin)
            .add(LevelPlugin)
    }
}
