use crate::components::{ContactState, JumpBudget, Player, PlayerIntent, Velocity};
use crate::enums::{AbilityTrait, LogicalButton};
use crate::plugins::ability::AbilityLoadout;
use crate::plugins::simulation::SimulationSet;
use crate::tuning::{AbilityDescriptor, SimulationTuning};
use bevy::prelude::*;

/// Keys bound to each logical button
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct ControlBindings {
    pub bindings: Vec<(LogicalButton, KeyCode)>,
}

impl Default for ControlBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (LogicalButton::Jump, KeyCode::Space),
                (LogicalButton::Jump, KeyCode::Up),
                (LogicalButton::Left, KeyCode::Left),
                (LogicalButton::Left, KeyCode::A),
                (LogicalButton::Left, KeyCode::Q),
                (LogicalButton::Right, KeyCode::Right),
                (LogicalButton::Right, KeyCode::D),
                (LogicalButton::Action, KeyCode::E),
                (LogicalButton::Action, KeyCode::ShiftLeft),
            ],
        }
    }
}

impl ControlBindings {
    fn keys(&self, button: LogicalButton) -> impl Iterator<Item = KeyCode> + '_ {
        self.bindings
            .iter()
            .filter(move |(bound, _)| *bound == button)
            .map(|(_, key)| *key)
    }

    pub fn is_down(&self, keyboard: &Input<KeyCode>, button: LogicalButton) -> bool {
        keyboard.any_pressed(self.keys(button))
    }

    pub fn just_pressed(&self, keyboard: &Input<KeyCode>, button: LogicalButton) -> bool {
        keyboard.any_just_pressed(self.keys(button))
    }
}

/// Plugin for input sampling and the player movement controller
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ControlBindings>()
            .init_resource::<SimulationTuning>()
            .add_systems(Update, sample_input_system.in_set(SimulationSet::Input))
            .add_systems(Update, apply_movement_system.in_set(SimulationSet::Movement));
    }
}

/// Translate keyboard state into PlayerIntent. Without a keyboard the intent
/// is left as whatever was written last.
fn sample_input_system(
    keyboard: Option<Res<Input<KeyCode>>>,
    bindings: Res<ControlBindings>,
    mut query: Query<&mut PlayerIntent, With<Player>>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };

    for mut intent in query.iter_mut() {
        intent.move_left = bindings.is_down(&keyboard, LogicalButton::Left);
        intent.move_right = bindings.is_down(&keyboard, LogicalButton::Right);
        intent.jump_held = bindings.is_down(&keyboard, LogicalButton::Jump);
        intent.jump_pressed = bindings.just_pressed(&keyboard, LogicalButton::Jump);
        intent.action_pressed = bindings.just_pressed(&keyboard, LogicalButton::Action);
    }
}

/// Applies the movement step with the active ability
fn apply_movement_system(
    tuning: Res<SimulationTuning>,
    mut query: Query<
        (
            &PlayerIntent,
            &ContactState,
            &AbilityLoadout,
            &mut JumpBudget,
            &mut Velocity,
        ),
        With<Player>,
    >,
) {
    for (intent, contact, loadout, mut budget, mut velocity) in query.iter_mut() {
        let ability = loadout.descriptor(&tuning);
        movement_step(
            intent,
            contact,
            ability,
            &tuning,
            &mut budget,
            &mut velocity,
        );
    }
}

/// One movement-controller step: run, jump, climb assist, then fall clamp
pub fn movement_step(
    intent: &PlayerIntent,
    contact: &ContactState,
    ability: &AbilityDescriptor,
    tuning: &SimulationTuning,
    budget: &mut JumpBudget,
    velocity: &mut Velocity,
) {
    velocity.x = match (intent.move_left, intent.move_right) {
        (true, false) => -ability.speed,
        (false, true) => ability.speed,
        _ => 0.0,
    };

    // Refill before spending so a grounded jump always starts from a full budget
    budget.max = ability.jump_budget;
    if contact.grounded {
        budget.remaining = budget.max;
    }
    if intent.jump_pressed && budget.remaining > 0 {
        budget.remaining -= 1;
        velocity.y = -ability.jump_force;
    }

    let pressing_into_wall =
        (contact.wall_left && intent.move_left) || (contact.wall_right && intent.move_right);
    if ability.grants(AbilityTrait::WallClimb) && pressing_into_wall {
        velocity.y = -tuning.climb_speed;
    }

    velocity.y = velocity.y.min(tuning.terminal_velocity);
}
