use bevy::prelude::*;
use std::time::Duration;

/// Fixed per-frame order of the gameplay simulation
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Clock,
    Level,
    Input,
    Movement,
    Abilities,
    Enemies,
    Hazards,
    Physics,
    BroadPhase,
    Dispatch,
    Respawn,
    ResetReaction,
    Settle,
}

/// Step duration shared by every gameplay system this frame
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    pub delta: Duration,
}

impl FrameClock {
    pub fn from_millis(millis: u64) -> Self {
        Self {
            delta: Duration::from_millis(millis),
        }
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Elapsed play time for the current level
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct LevelChrono {
    pub elapsed: Duration,
    pub running: bool,
}

impl LevelChrono {
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    pub fn tick(&mut self, delta: Duration) {
        if self.running {
            self.elapsed += delta;
        }
    }

    /// Takes a bonus off the clock, never below zero
    pub fn apply_bonus(&mut self, bonus: Duration) {
        self.elapsed = self.elapsed.saturating_sub(bonus);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }
}

/// Plugin owning the frame clock, the level chrono and the system-set order.
///
/// With `drive_from_time` the frame clock follows Bevy's `Time`; without it
/// the clock only changes when something writes the resource, which is how
/// tests step the simulation deterministically.
pub struct SimulationPlugin {
    pub drive_from_time: bool,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            drive_from_time: true,
        }
    }
}

impl SimulationPlugin {
    pub fn manual() -> Self {
        Self {
            drive_from_time: false,
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameClock>()
            .init_resource::<LevelChrono>()
            .configure_sets(
                Update,
                (
                    SimulationSet::Clock,
                    SimulationSet::Level,
                    SimulationSet::Input,
                    SimulationSet::Movement,
                    SimulationSet::Abilities,
                    SimulationSet::Enemies,
                    SimulationSet::Hazards,
                    SimulationSet::Physics,
                    SimulationSet::BroadPhase,
                    SimulationSet::Dispatch,
                    SimulationSet::Respawn,
                    SimulationSet::ResetReaction,
                    SimulationSet::Settle,
                )
                    .chain(),
            )
            // Entities spawned by one stage are visible to the stages after it
            .add_systems(
                Update,
                (
                    apply_deferred
                        .after(SimulationSet::Level)
                        .before(SimulationSet::Input),
                    apply_deferred
                        .after(SimulationSet::Hazards)
                        .before(SimulationSet::Physics),
                    apply_deferred
                        .after(SimulationSet::Respawn)
                        .before(SimulationSet::ResetReaction),
                ),
            );

        if self.drive_from_time {
            app.add_systems(
                Update,
                (sync_frame_clock, tick_level_chrono)
                    .chain()
                    .in_set(SimulationSet::Clock),
            );
        } else {
            app.add_systems(Update, tick_level_chrono.in_set(SimulationSet::Clock));
        }
    }
}

/// Copies the frame delta from Time
fn sync_frame_clock(time: Res<Time>, mut clock: ResMut<FrameClock>) {
    clock.delta = time.delta();
}

/// Advances the level timer while it runs
fn tick_level_chrono(clock: Res<FrameClock>, mut chrono: ResMut<LevelChrono>) {
    chrono.tick(clock.delta);
}
