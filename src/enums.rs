use serde::{Deserialize, Serialize};

/// Number of ability slots the player can cycle through
pub const SLOT_COUNT: usize = 3;

/// Ability slot - the player's movement modes, in cycle order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbilitySlot {
    /// Default mode, can climb walls
    Climb,
    /// Faster run and a double jump
    Boost,
    /// Kills enemies by landing on them
    Stomp,
}

impl AbilitySlot {
    pub const ALL: [AbilitySlot; SLOT_COUNT] =
        [AbilitySlot::Climb, AbilitySlot::Boost, AbilitySlot::Stomp];

    pub fn index(self) -> usize {
        match self {
            AbilitySlot::Climb => 0,
            AbilitySlot::Boost => 1,
            AbilitySlot::Stomp => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Special capability granted by an ability on top of its tuning
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityTrait {
    WallClimb,
    Stomp,
}

/// Role an entity plays in contact routing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityRole {
    Player,
    Enemy,
    Checkpoint,
    AbilityPickup,
    TimeBonus,
    EndLevel,
    Spike,
    Projectile,
    Terrain,
}

/// Name of a contact event, as seen from the side receiving it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactEvent {
    CollideWithPlayer,
    CollideWithEnemy,
    CollideWithCheckpoint,
    CollideWithAbilityPickup,
    CollideWithTimeBonus,
    CollideWithEndLevel,
    CollideWithSpike,
    CollideWithProjectile,
    CollideWithTerrain,
}

/// Side of an entity's body that is being touched
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactSide {
    Up,
    Down,
    Left,
    Right,
}

impl ContactSide {
    pub fn opposite(self) -> Self {
        match self {
            ContactSide::Up => ContactSide::Down,
            ContactSide::Down => ContactSide::Up,
            ContactSide::Left => ContactSide::Right,
            ContactSide::Right => ContactSide::Left,
        }
    }
}

/// Enemy behavior state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EnemyState {
    #[default]
    Idle,
    Chasing,
}

/// Player life cycle as seen by the respawn manager
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LifePhase {
    #[default]
    Alive,
    Resetting,
}

/// What killed the player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathCause {
    Enemy,
    Spike,
    Projectile,
    OutOfBounds,
}

/// Logical input buttons exposed by the input source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalButton {
    Jump,
    Left,
    Right,
    Action,
}

/// Animation keys understood by the presentation sink
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationKey {
    /// Player skin for the active ability
    Skin(AbilitySlot),
    /// Checkpoint flag after activation
    CheckpointLit,
}
