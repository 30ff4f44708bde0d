use crate::components::{JumpBudget, Player, Position, Velocity};
use crate::enums::{AbilitySlot, AnimationKey, DeathCause, LifePhase};
use crate::plugins::ability::AbilityLoadout;
use crate::plugins::presentation::PresentationCommand;
use crate::plugins::simulation::{FrameClock, SimulationSet};
use crate::tuning::SimulationTuning;
use bevy::prelude::*;

/// Where the player comes back after dying
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct RespawnPoint(pub Vec2);

impl RespawnPoint {
    /// Last checkpoint wins. Returns true when the point moved.
    pub fn on_checkpoint_contact(&mut self, origin: Vec2) -> bool {
        let moved = self.0 != origin;
        self.0 = origin;
        moved
    }
}

/// Map extents used for the out-of-bounds test
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct LevelBounds {
    pub width: f32,
    pub height: f32,
}

impl LevelBounds {
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Life cycle of the player as driven by death signals
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct RespawnState {
    pub phase: LifePhase,
    pub deaths: u32,
}

/// Raised by anything lethal to the player
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct DeathSignal {
    pub cause: DeathCause,
}

/// Sent once per reset so every subsystem can return to its baseline
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct ResetBroadcast {
    pub respawn: Vec2,
}

/// Post-respawn grace window, with the flicker cue it drives
#[derive(Component, Clone, Debug)]
pub struct Invulnerable {
    pub window: Timer,
    pub flicker: Timer,
    pub visible: bool,
}

impl Invulnerable {
    pub fn new(tuning: &SimulationTuning) -> Self {
        Self {
            window: Timer::new(tuning.invulnerability(), TimerMode::Once),
            flicker: Timer::new(tuning.flicker_interval(), TimerMode::Repeating),
            visible: false,
        }
    }
}

/// Plugin for checkpoints, death handling and the reset broadcast
pub struct RespawnPlugin;

impl Plugin for RespawnPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameClock>()
            .init_resource::<SimulationTuning>()
            .init_resource::<RespawnPoint>()
            .init_resource::<RespawnState>()
            .add_event::<DeathSignal>()
            .add_event::<ResetBroadcast>()
            .add_event::<PresentationCommand>()
            .add_systems(
                Update,
                (detect_out_of_bounds, process_death_signals)
                    .chain()
                    .in_set(SimulationSet::Respawn),
            )
            .add_systems(
                Update,
                (complete_reset, tick_invulnerability)
                    .chain()
                    .in_set(SimulationSet::Settle),
            );
    }
}

/// Raise a death signal from inside a contact callback
pub fn raise_death(world: &mut World, cause: DeathCause) {
    world.send_event(DeathSignal { cause });
}

/// Raises a death signal when the player leaves the level extents
fn detect_out_of_bounds(
    bounds: Option<Res<LevelBounds>>,
    player_query: Query<&Position, With<Player>>,
    mut deaths: EventWriter<DeathSignal>,
) {
    let Some(bounds) = bounds else {
        return;
    };

    for position in player_query.iter() {
        if !bounds.contains(position.as_vec2()) {
            deaths.send(DeathSignal {
                cause: DeathCause::OutOfBounds,
            });
        }
    }
}

/// Restores the player to the respawn point with ground-ability defaults
pub fn reset_player(
    respawn: Vec2,
    tuning: &SimulationTuning,
    position: &mut Position,
    velocity: &mut Velocity,
    loadout: &mut AbilityLoadout,
    budget: &mut JumpBudget,
) {
    *velocity = Velocity::default();
    loadout.reset_to_default();
    *budget = JumpBudget::full(tuning.ability(AbilitySlot::Climb).jump_budget);
    *position = Position::from(respawn);
}

/// Turns the first death signal of a frame into a single reset
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
fn process_death_signals(
    mut commands: Commands,
    mut deaths: EventReader<DeathSignal>,
    mut state: ResMut<RespawnState>,
    respawn: Res<RespawnPoint>,
    tuning: Res<SimulationTuning>,
    mut player_query: Query<
        (
            Entity,
            &mut Position,
            &mut Velocity,
            &mut AbilityLoadout,
            &mut JumpBudget,
            Option<&Invulnerable>,
        ),
        With<Player>,
    >,
    mut broadcast: EventWriter<ResetBroadcast>,
    mut presentation: EventWriter<PresentationCommand>,
) {
    let Some(cause) = deaths.read().map(|signal| signal.cause).next() else {
        return;
    };
    // Later signals of the same frame collapse into this reset
    deaths.clear();

    if state.phase == LifePhase::Resetting {
        debug!("Death signal ignored while resetting");
        return;
    }

    let Ok((entity, mut position, mut velocity, mut loadout, mut budget, invulnerable)) =
        player_query.get_single_mut()
    else {
        warn!("Player not found for reset");
        return;
    };

    if invulnerable.is_some() {
        debug!("Death signal ({:?}) ignored while invulnerable", cause);
        return;
    }

    state.phase = LifePhase::Resetting;
    state.deaths += 1;

    reset_player(
        respawn.0,
        &tuning,
        &mut position,
        &mut velocity,
        &mut loadout,
        &mut budget,
    );
    commands.entity(entity).insert(Invulnerable::new(&tuning));
    presentation.send(PresentationCommand::PlayAnimation {
        entity,
        animation: AnimationKey::Skin(loadout.current()),
    });
    presentation.send(PresentationCommand::SetAlpha { entity, alpha: 0.0 });
    broadcast.send(ResetBroadcast { respawn: respawn.0 });

    info!(
        "Player died ({:?}), respawning at ({}, {})",
        cause, respawn.0.x, respawn.0.y
    );
}

/// Ends the resetting phase once every reset reaction has run
fn complete_reset(mut state: ResMut<RespawnState>) {
    if state.phase == LifePhase::Resetting {
        state.phase = LifePhase::Alive;
    }
}

/// Counts down the grace window and toggles alpha every flicker interval
fn tick_invulnerability(
    mut commands: Commands,
    clock: Res<FrameClock>,
    mut query: Query<(Entity, &mut Invulnerable)>,
    mut presentation: EventWriter<PresentationCommand>,
) {
    for (entity, mut invulnerable) in query.iter_mut() {
        invulnerable.window.tick(clock.delta);

        if invulnerable.window.finished() {
            commands.entity(entity).remove::<Invulnerable>();
            presentation.send(PresentationCommand::SetAlpha { entity, alpha: 1.0 });
            continue;
        }

        invulnerable.flicker.tick(clock.delta);
        if invulnerable.flicker.times_finished_this_tick() % 2 == 1 {
            invulnerable.visible = !invulnerable.visible;
            let alpha = if invulnerable.visible { 1.0 } else { 0.0 };
            presentation.send(PresentationCommand::SetAlpha { entity, alpha });
        }
    }
}
