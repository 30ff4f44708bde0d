use crate::components::Position;
use crate::enums::{AbilitySlot, AnimationKey, ContactEvent, EntityRole};
use crate::plugins::ability::AbilityLoadout;
use crate::plugins::interaction::ContactPair;
use crate::plugins::level::{CurrentLevel, LevelComplete};
use crate::plugins::presentation::PresentationCommand;
use crate::plugins::respawn::RespawnPoint;
use crate::plugins::simulation::LevelChrono;
use crate::tuning::SimulationTuning;
use bevy::prelude::*;

/// What touching a collectible does
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectibleKind {
    /// Moves the respawn point, can be touched again
    Checkpoint,
    AbilityPickup(AbilitySlot),
    /// Takes time off the level chrono
    TimeBonus,
    EndLevel,
}

impl CollectibleKind {
    /// Consumed collectibles disappear on first touch
    pub fn is_consumed(self) -> bool {
        matches!(
            self,
            CollectibleKind::AbilityPickup(_) | CollectibleKind::TimeBonus
        )
    }

    /// Event tag for the player side of the contact
    pub fn contact_event(self) -> ContactEvent {
        match self {
            CollectibleKind::Checkpoint => ContactEvent::CollideWithCheckpoint,
            CollectibleKind::AbilityPickup(_) => ContactEvent::CollideWithAbilityPickup,
            CollectibleKind::TimeBonus => ContactEvent::CollideWithTimeBonus,
            CollectibleKind::EndLevel => ContactEvent::CollideWithEndLevel,
        }
    }

    pub fn role(self) -> EntityRole {
        match self {
            CollectibleKind::Checkpoint => EntityRole::Checkpoint,
            CollectibleKind::AbilityPickup(_) => EntityRole::AbilityPickup,
            CollectibleKind::TimeBonus => EntityRole::TimeBonus,
            CollectibleKind::EndLevel => EntityRole::EndLevel,
        }
    }
}

/// Collectible component
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub collected: bool,
}

impl Collectible {
    pub fn new(kind: CollectibleKind) -> Self {
        Self {
            kind,
            collected: false,
        }
    }
}

/// Player side of a contact with any collectible
pub fn player_collects(world: &mut World, pair: &ContactPair) {
    let Some(collectible) = world.get::<Collectible>(pair.other).copied() else {
        return;
    };

    match collectible.kind {
        CollectibleKind::Checkpoint => reach_checkpoint(world, pair.other, collectible.collected),
        CollectibleKind::AbilityPickup(slot) => unlock_ability(world, pair.this, slot),
        CollectibleKind::TimeBonus => collect_time_bonus(world),
        CollectibleKind::EndLevel if !collectible.collected => reach_end_level(world),
        CollectibleKind::EndLevel => {}
    }
}

/// Collectible side: marks it collected and removes consumed kinds
pub fn collectible_touched(world: &mut World, pair: &ContactPair) {
    let Some(mut collectible) = world.get_mut::<Collectible>(pair.this) else {
        return;
    };
    collectible.collected = true;
    let kind = collectible.kind;

    if kind.is_consumed() {
        world.despawn(pair.this);
        world.send_event(PresentationCommand::DestroyVisual { entity: pair.this });
    }
}

fn reach_checkpoint(world: &mut World, checkpoint: Entity, already_lit: bool) {
    let Some(origin) = world.get::<Position>(checkpoint).map(Position::as_vec2) else {
        return;
    };

    let moved = world
        .get_resource_mut::<RespawnPoint>()
        .is_some_and(|mut respawn| respawn.on_checkpoint_contact(origin));
    if moved {
        info!("Checkpoint reached at ({}, {})", origin.x, origin.y);
    }

    if !already_lit {
        world.send_event(PresentationCommand::PlayAnimation {
            entity: checkpoint,
            animation: AnimationKey::CheckpointLit,
        });
    }
}

fn unlock_ability(world: &mut World, player: Entity, slot: AbilitySlot) {
    if let Some(mut loadout) = world.get_mut::<AbilityLoadout>(player) {
        if loadout.unlock(slot) {
            info!("Unlocked ability {:?}", slot);
        }
    }
}

fn collect_time_bonus(world: &mut World) {
    let bonus = world
        .get_resource::<SimulationTuning>()
        .map(SimulationTuning::time_bonus)
        .unwrap_or_default();
    if let Some(mut chrono) = world.get_resource_mut::<LevelChrono>() {
        chrono.apply_bonus(bonus);
        debug!("Time bonus, chrono now {:?}", chrono.elapsed);
    }
}

fn reach_end_level(world: &mut World) {
    let time = match world.get_resource_mut::<LevelChrono>() {
        Some(mut chrono) => {
            chrono.stop();
            chrono.elapsed
        }
        None => Default::default(),
    };
    let Some(current) = world.get_resource::<CurrentLevel>() else {
        warn!("End of level reached with no current level");
        return;
    };

    let complete = LevelComplete {
        level_id: current.level_id.clone(),
        next_level: current.level_data.next_level.clone(),
        time,
    };
    info!("Level {} complete in {:?}", complete.level_id, time);
    world.send_event(complete);
}
