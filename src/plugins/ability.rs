use crate::components::{JumpBudget, Player, PlayerIntent};
use crate::enums::{AbilitySlot, AnimationKey, SLOT_COUNT};
use crate::plugins::presentation::PresentationCommand;
use crate::plugins::simulation::{FrameClock, SimulationSet};
use crate::tuning::{AbilityDescriptor, SimulationTuning};
use bevy::prelude::*;
use std::time::Duration;

/// Ability state machine - active slot, unlocked slots and the switch cooldown
#[derive(Component, Clone, Debug, PartialEq)]
pub struct AbilityLoadout {
    current: AbilitySlot,
    unlocked: [bool; SLOT_COUNT],
    since_switch: Duration,
    cooldown: Duration,
}

impl AbilityLoadout {
    /// Only the default slot unlocked; the cooldown starts counting now
    pub fn new(cooldown: Duration) -> Self {
        let mut unlocked = [false; SLOT_COUNT];
        unlocked[AbilitySlot::Climb.index()] = true;
        Self {
            current: AbilitySlot::Climb,
            unlocked,
            since_switch: Duration::ZERO,
            cooldown,
        }
    }

    pub fn with_unlocked(cooldown: Duration, slots: &[AbilitySlot]) -> Self {
        let mut loadout = Self::new(cooldown);
        for slot in slots {
            loadout.unlock(*slot);
        }
        loadout
    }

    pub fn current(&self) -> AbilitySlot {
        self.current
    }

    /// Tuning of the active ability
    pub fn descriptor<'a>(&self, tuning: &'a SimulationTuning) -> &'a AbilityDescriptor {
        tuning.ability(self.current)
    }

    pub fn is_unlocked(&self, slot: AbilitySlot) -> bool {
        self.unlocked[slot.index()]
    }

    /// Unlocks a slot without changing the active one. Returns true the first time.
    pub fn unlock(&mut self, slot: AbilitySlot) -> bool {
        let newly = !self.unlocked[slot.index()];
        self.unlocked[slot.index()] = true;
        newly
    }

    pub fn advance(&mut self, delta: Duration) {
        self.since_switch = (self.since_switch + delta).min(self.cooldown);
    }

    pub fn cooldown_elapsed(&self) -> bool {
        self.since_switch >= self.cooldown
    }

    /// Moves to the next unlocked slot in cyclic order.
    ///
    /// Returns the new slot, or `None` while cooling down or when no other
    /// slot is unlocked.
    pub fn switch_to_next(&mut self) -> Option<AbilitySlot> {
        if !self.cooldown_elapsed() {
            return None;
        }

        let start = self.current.index();
        let next = (1..=SLOT_COUNT)
            .map(|step| (start + step) % SLOT_COUNT)
            .find(|&index| self.unlocked[index])?;

        if next == start {
            return None;
        }

        self.current = AbilitySlot::from_index(next)?;
        self.since_switch = Duration::ZERO;
        Some(self.current)
    }

    /// Back to the default slot, restarting the cooldown. Unlocks are kept.
    pub fn reset_to_default(&mut self) {
        self.current = AbilitySlot::Climb;
        self.since_switch = Duration::ZERO;
    }
}

/// Plugin for ability switching
pub struct AbilityPlugin;

impl Plugin for AbilityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameClock>()
            .init_resource::<SimulationTuning>()
            .add_event::<PresentationCommand>()
            .add_systems(Update, switch_ability_system.in_set(SimulationSet::Abilities));
    }
}

/// Advances the cooldown and switches ability on an action press
fn switch_ability_system(
    clock: Res<FrameClock>,
    tuning: Res<SimulationTuning>,
    mut query: Query<(Entity, &PlayerIntent, &mut AbilityLoadout, &mut JumpBudget), With<Player>>,
    mut presentation: EventWriter<PresentationCommand>,
) {
    for (entity, intent, mut loadout, mut budget) in query.iter_mut() {
        loadout.advance(clock.delta);

        if !intent.action_pressed {
            continue;
        }

        let Some(slot) = loadout.switch_to_next() else {
            debug!("Ability switch ignored");
            continue;
        };

        // Keep the budget within the new ability's maximum
        let max = tuning.ability(slot).jump_budget;
        budget.max = max;
        budget.remaining = budget.remaining.min(max);

        presentation.send(PresentationCommand::PlayAnimation {
            entity,
            animation: AnimationKey::Skin(slot),
        });
        info!("Switched ability to {:?}", slot);
    }
}
