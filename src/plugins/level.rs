use crate::components::{
    Collider, ContactState, JumpBudget, LevelEntity, Player, PlayerIntent, Position, Role, Spike,
    Terrain, Velocity,
};
use crate::enums::{AbilitySlot, ContactEvent, EntityRole};
use crate::level::{layers, LevelData, MapObject};
use crate::plugins::ability::AbilityLoadout;
use crate::plugins::collectible::{collectible_touched, player_collects, Collectible, CollectibleKind};
use crate::plugins::enemy::{enemy_touched_by_player, player_touches_enemy, Enemy};
use crate::plugins::hazard::{
    player_hit_by_projectile, player_hits_spike, projectile_hits_player, projectile_hits_terrain,
    EmissionPoint, HazardEmitter,
};
use crate::plugins::interaction::{ignore_contact, InteractionError, InteractionRegistry};
use crate::plugins::respawn::{LevelBounds, RespawnPoint, RespawnState};
use crate::plugins::simulation::{LevelChrono, SimulationSet};
use crate::tuning::SimulationTuning;
use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Resource to track current level
#[derive(Resource, Clone, Debug)]
pub struct CurrentLevel {
    pub level_id: String,
    pub level_data: LevelData,
}

/// Level waiting to be composed at the start of the next frame
#[derive(Resource, Clone, Debug)]
pub struct PendingLevel(pub LevelData);

/// Directory next levels are resolved against
#[derive(Resource, Clone, Debug, Default)]
pub struct LevelDirectory(pub PathBuf);

impl LevelDirectory {
    pub fn level_path(&self, level_id: &str) -> PathBuf {
        self.0.join(format!("{}.json", level_id))
    }
}

/// Read-only view of the player for camera and UI
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct PlayerView {
    pub position: Vec2,
    pub ability: AbilitySlot,
}

impl Default for PlayerView {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            ability: AbilitySlot::Climb,
        }
    }
}

/// Fired once when the player reaches the end of a level
#[derive(Event, Clone, Debug, PartialEq)]
pub struct LevelComplete {
    pub level_id: String,
    pub next_level: Option<String>,
    pub time: Duration,
}

/// Level loading errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelLoadError {
    #[error("Level file not found: {0}")]
    FileNotFound(String),
    #[error("IO error reading level file {0}: {1}")]
    IoError(String, String),
    #[error("Failed to parse level file {0}: {1}")]
    ParseError(String, String),
    #[error("Level {level} is missing the {layer} layer")]
    MissingLayer { level: String, layer: String },
    #[error("Level validation error: {0}")]
    ValidationError(String),
    #[error("Contact wiring failed: {0}")]
    Wiring(#[from] InteractionError),
}

/// Plugin composing levels and moving between them
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LevelComplete>()
            .init_resource::<PlayerView>()
            .init_resource::<LevelDirectory>()
            .add_systems(Update, compose_pending_level.in_set(SimulationSet::Level))
            .add_systems(
                Update,
                (advance_to_next_level, publish_player_view).in_set(SimulationSet::Settle),
            );
    }
}

/// Load level from JSON file
pub fn load_level_from_file(path: impl AsRef<Path>) -> Result<LevelData, LevelLoadError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    if !path.exists() {
        return Err(LevelLoadError::FileNotFound(display));
    }

    let contents =
        fs::read_to_string(path).map_err(|e| LevelLoadError::IoError(display.clone(), e.to_string()))?;

    let level_data: LevelData = serde_json::from_str(&contents)
        .map_err(|e| LevelLoadError::ParseError(display, e.to_string()))?;

    validate_level_data(&level_data)?;

    Ok(level_data)
}

/// Validate level data for required fields and valid values
pub fn validate_level_data(level: &LevelData) -> Result<(), LevelLoadError> {
    if level.id.is_empty() {
        return Err(LevelLoadError::ValidationError(
            "Level ID cannot be empty".to_string(),
        ));
    }

    if level.width <= 0.0 || level.height <= 0.0 {
        return Err(LevelLoadError::ValidationError(format!(
            "Level {} must have positive extents",
            level.id
        )));
    }

    if level.player_spawn().is_none() {
        return Err(LevelLoadError::MissingLayer {
            level: level.id.clone(),
            layer: layers::PLAYER.to_string(),
        });
    }

    for (i, terrain) in level.layer(layers::TERRAIN).iter().enumerate() {
        if terrain.width <= 0.0 || terrain.height <= 0.0 {
            return Err(LevelLoadError::ValidationError(format!(
                "Terrain {} has invalid dimensions",
                i
            )));
        }
    }

    for (i, pickup) in level.layer(layers::ABILITY_PICKUPS).iter().enumerate() {
        if pickup.ability.is_none() {
            return Err(LevelLoadError::ValidationError(format!(
                "Ability pickup {} has no ability",
                i
            )));
        }
    }

    Ok(())
}

/// Every contact pair the gameplay reacts to
pub fn build_interaction_registry() -> Result<InteractionRegistry, InteractionError> {
    let mut registry = InteractionRegistry::default();

    registry.register_pair(
        EntityRole::Player,
        EntityRole::Enemy,
        ContactEvent::CollideWithEnemy,
        ContactEvent::CollideWithPlayer,
        player_touches_enemy,
        enemy_touched_by_player,
    )?;

    // The pickup slot plays no part in routing
    for kind in [
        CollectibleKind::Checkpoint,
        CollectibleKind::AbilityPickup(AbilitySlot::Climb),
        CollectibleKind::TimeBonus,
        CollectibleKind::EndLevel,
    ] {
        registry.register_pair(
            EntityRole::Player,
            kind.role(),
            kind.contact_event(),
            ContactEvent::CollideWithPlayer,
            player_collects,
            collectible_touched,
        )?;
    }

    registry.register_pair(
        EntityRole::Player,
        EntityRole::Spike,
        ContactEvent::CollideWithSpike,
        ContactEvent::CollideWithPlayer,
        player_hits_spike,
        ignore_contact,
    )?;
    registry.register_pair(
        EntityRole::Player,
        EntityRole::Projectile,
        ContactEvent::CollideWithProjectile,
        ContactEvent::CollideWithPlayer,
        player_hit_by_projectile,
        projectile_hits_player,
    )?;
    registry.register_pair(
        EntityRole::Projectile,
        EntityRole::Terrain,
        ContactEvent::CollideWithTerrain,
        ContactEvent::CollideWithProjectile,
        projectile_hits_terrain,
        ignore_contact,
    )?;

    Ok(registry)
}

/// Collider for a map object, one tile when the object has no size
fn object_collider(object: &MapObject, tuning: &SimulationTuning) -> Collider {
    let width = if object.width > 0.0 { object.width } else { tuning.tile_size };
    let height = if object.height > 0.0 { object.height } else { tuning.tile_size };
    Collider::new(width, height)
}

/// Spawns every level entity and installs the per-level resources
pub fn compose_level(commands: &mut Commands, level: &LevelData) -> Result<(), LevelLoadError> {
    validate_level_data(level)?;
    let registry = build_interaction_registry()?;
    let tuning = level.tuning.clone();

    let spawn = level.player_spawn().ok_or_else(|| LevelLoadError::MissingLayer {
        level: level.id.clone(),
        layer: layers::PLAYER.to_string(),
    })?;

    commands.spawn((
        Player,
        Role(EntityRole::Player),
        Position::from(spawn),
        Velocity::default(),
        Collider::new(tuning.player_width, tuning.player_height),
        ContactState::default(),
        PlayerIntent::default(),
        AbilityLoadout::with_unlocked(tuning.ability_cooldown(), &level.unlocked_abilities),
        JumpBudget::full(tuning.ability(AbilitySlot::Climb).jump_budget),
        LevelEntity,
    ));

    for object in level.layer(layers::ENEMIES) {
        commands.spawn((
            Enemy::new(object.position(), &tuning),
            Role(EntityRole::Enemy),
            Position::from(object.position()),
            Velocity::default(),
            Collider::new(tuning.enemy_width, tuning.enemy_height),
            LevelEntity,
        ));
    }

    let collectibles = level
        .layer(layers::CHECKPOINTS)
        .iter()
        .map(|object| (object, CollectibleKind::Checkpoint))
        .chain(level.layer(layers::ABILITY_PICKUPS).iter().filter_map(|object| {
            object
                .ability
                .map(|slot| (object, CollectibleKind::AbilityPickup(slot)))
        }))
        .chain(
            level
                .layer(layers::TIME_BONUSES)
                .iter()
                .map(|object| (object, CollectibleKind::TimeBonus)),
        )
        .chain(
            level
                .layer(layers::END_LEVEL)
                .iter()
                .map(|object| (object, CollectibleKind::EndLevel)),
        );
    for (object, kind) in collectibles {
        commands.spawn((
            Collectible::new(kind),
            Role(kind.role()),
            Position::from(object.position()),
            object_collider(object, &tuning),
            LevelEntity,
        ));
    }

    for object in level.layer(layers::SPIKES) {
        commands.spawn((
            Spike,
            Role(EntityRole::Spike),
            Position::from(object.position()),
            object_collider(object, &tuning),
            LevelEntity,
        ));
    }

    for object in level.layer(layers::TERRAIN) {
        commands.spawn((
            Terrain,
            Role(EntityRole::Terrain),
            Position::from(object.position()),
            object_collider(object, &tuning),
            LevelEntity,
        ));
    }

    for object in level.layer(layers::ARROW_WALLS) {
        commands.spawn((EmissionPoint, Position::from(object.position()), LevelEntity));
    }

    let mut chrono = LevelChrono::default();
    chrono.restart();

    commands.insert_resource(HazardEmitter::new(tuning.hazard_interval()));
    commands.insert_resource(RespawnPoint(spawn));
    commands.insert_resource(RespawnState::default());
    commands.insert_resource(LevelBounds {
        width: level.width,
        height: level.height,
    });
    commands.insert_resource(chrono);
    commands.insert_resource(registry);
    commands.insert_resource(tuning);
    commands.insert_resource(CurrentLevel {
        level_id: level.id.clone(),
        level_data: level.clone(),
    });

    Ok(())
}

/// Tears down the previous level and composes the pending one
fn compose_pending_level(
    mut commands: Commands,
    pending: Option<Res<PendingLevel>>,
    level_entities: Query<Entity, With<LevelEntity>>,
) {
    let Some(pending) = pending else {
        return;
    };
    commands.remove_resource::<PendingLevel>();

    // Validate before tearing anything down so a bad level leaves the old one playable
    if let Err(e) = validate_level_data(&pending.0) {
        error!("Failed to compose level {}: {}", pending.0.id, e);
        return;
    }

    for entity in level_entities.iter() {
        commands.entity(entity).despawn();
    }

    match compose_level(&mut commands, &pending.0) {
        Ok(()) => info!("Loaded level: {}", pending.0.id),
        Err(e) => error!("Failed to compose level {}: {}", pending.0.id, e),
    }
}

/// Queues the next level after a level-complete signal
fn advance_to_next_level(
    mut commands: Commands,
    mut completions: EventReader<LevelComplete>,
    directory: Res<LevelDirectory>,
) {
    for complete in completions.read() {
        let Some(next) = &complete.next_level else {
            info!("Level {} was the last one", complete.level_id);
            continue;
        };

        let path = directory.level_path(next);
        match load_level_from_file(&path) {
            Ok(level) => {
                info!("Transitioning to level: {}", next);
                commands.insert_resource(PendingLevel(level));
            }
            Err(e) => {
                error!("Failed to load level {}: {}", next, e);
            }
        }
    }
}

/// Copies player position and ability into PlayerView
fn publish_player_view(
    mut view: ResMut<PlayerView>,
    player_query: Query<(&Position, &AbilityLoadout), With<Player>>,
) {
    if let Ok((position, loadout)) = player_query.get_single() {
        view.position = position.as_vec2();
        view.ability = loadout.current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::ObjectLayer;
    use crate::plugins::simulation::SimulationPlugin;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn layer(name: &str, objects: Vec<MapObject>) -> ObjectLayer {
        ObjectLayer {
            name: name.to_string(),
            objects,
        }
    }

    fn create_test_level() -> LevelData {
        let mut pickup = MapObject::at(600.0, 300.0);
        pickup.ability = Some(AbilitySlot::Boost);
        let mut floor = MapObject::at(960.0, 1064.0);
        floor.width = 1920.0;
        floor.height = 32.0;

        LevelData {
            id: "test_level".to_string(),
            width: 1920.0,
            height: 1080.0,
            layers: vec![
                layer(layers::PLAYER, vec![MapObject::at(100.0, 500.0)]),
                layer(layers::ENEMIES, vec![MapObject::at(1200.0, 500.0)]),
                layer(layers::CHECKPOINTS, vec![MapObject::at(800.0, 500.0)]),
                layer(layers::ABILITY_PICKUPS, vec![pickup]),
                layer(layers::TERRAIN, vec![floor]),
                layer(layers::ARROW_WALLS, vec![MapObject::at(16.0, 400.0)]),
                layer(layers::END_LEVEL, vec![MapObject::at(1880.0, 1000.0)]),
            ],
            unlocked_abilities: vec![],
            next_level: None,
            tuning: SimulationTuning::default(),
        }
    }

    fn write_level(dir: &Path, level: &LevelData) -> PathBuf {
        let path = dir.join(format!("{}.json", level.id));
        fs::write(&path, serde_json::to_string(level).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_level_from_file() {
        let level = create_test_level();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&level).unwrap()).unwrap();

        let loaded = load_level_from_file(file.path()).unwrap();
        assert_eq!(loaded, level);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_level_from_file("definitely/not/here.json");
        assert!(matches!(result, Err(LevelLoadError::FileNotFound(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ \"id\": \"broken\", ").unwrap();

        let result = load_level_from_file(file.path());
        assert!(matches!(result, Err(LevelLoadError::ParseError(_, _))));
    }

    #[test]
    fn test_validation_rejects_bad_levels() {
        let mut level = create_test_level();
        level.width = 0.0;
        assert!(matches!(
            validate_level_data(&level),
            Err(LevelLoadError::ValidationError(_))
        ));

        let mut level = create_test_level();
        level.layers.retain(|layer| layer.name != layers::PLAYER);
        assert_eq!(
            validate_level_data(&level),
            Err(LevelLoadError::MissingLayer {
                level: "test_level".to_string(),
                layer: "player".to_string(),
            })
        );

        let mut level = create_test_level();
        level.layers[3].objects[0].ability = None;
        assert!(validate_level_data(&level).is_err());
    }

    #[test]
    fn test_registry_wires_every_gameplay_pair() {
        let registry = build_interaction_registry().unwrap();

        assert_eq!(registry.len(), 8);
        assert!(registry.is_registered(EntityRole::Enemy, EntityRole::Player));
        assert!(registry.is_registered(EntityRole::Player, EntityRole::EndLevel));
        assert!(registry.is_registered(EntityRole::Terrain, EntityRole::Projectile));
        assert!(!registry.is_registered(EntityRole::Enemy, EntityRole::Projectile));
    }

    fn level_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins((SimulationPlugin::manual(), LevelPlugin));
        app
    }

    #[test]
    fn test_pending_level_is_composed() {
        let mut app = level_app();
        let mut level = create_test_level();
        level.unlocked_abilities = vec![AbilitySlot::Boost];
        app.insert_resource(PendingLevel(level));

        app.update();

        assert!(app.world.get_resource::<PendingLevel>().is_none());
        assert_eq!(
            app.world.resource::<CurrentLevel>().level_id,
            "test_level"
        );
        assert_eq!(
            app.world.resource::<RespawnPoint>().0,
            Vec2::new(100.0, 500.0)
        );
        assert!(app.world.resource::<LevelChrono>().running);
        assert_eq!(app.world.resource::<InteractionRegistry>().len(), 8);

        let mut players = app.world.query_filtered::<&AbilityLoadout, With<Player>>();
        let loadout = players.single(&app.world);
        assert!(loadout.is_unlocked(AbilitySlot::Boost));
        assert_eq!(loadout.current(), AbilitySlot::Climb);

        let mut collectibles = app.world.query::<&Collectible>();
        let kinds: Vec<_> = collectibles.iter(&app.world).map(|c| c.kind).collect();
        assert_eq!(kinds.len(), 3);
        assert!(kinds.contains(&CollectibleKind::AbilityPickup(AbilitySlot::Boost)));

        assert_eq!(app.world.resource::<PlayerView>().position, Vec2::new(100.0, 500.0));
    }

    #[test]
    fn test_invalid_pending_level_keeps_current_one() {
        let mut app = level_app();
        app.insert_resource(PendingLevel(create_test_level()));
        app.update();

        let mut broken = create_test_level();
        broken.id = "broken".to_string();
        broken.layers.retain(|layer| layer.name != layers::PLAYER);
        app.insert_resource(PendingLevel(broken));
        app.update();

        assert_eq!(app.world.resource::<CurrentLevel>().level_id, "test_level");
        let mut players = app.world.query_filtered::<Entity, With<Player>>();
        assert_eq!(players.iter(&app.world).count(), 1);
    }

    #[test]
    fn test_level_complete_loads_next_level() {
        let dir = TempDir::new().unwrap();
        let mut second = create_test_level();
        second.id = "second".to_string();
        second.layers[0].objects[0] = MapObject::at(300.0, 300.0);
        write_level(dir.path(), &second);

        let mut app = level_app();
        app.insert_resource(LevelDirectory(dir.path().to_path_buf()));
        app.insert_resource(PendingLevel(create_test_level()));
        app.update();

        app.world.send_event(LevelComplete {
            level_id: "test_level".to_string(),
            next_level: Some("second".to_string()),
            time: Duration::from_secs(30),
        });
        app.update();
        app.update();

        assert_eq!(app.world.resource::<CurrentLevel>().level_id, "second");
        assert_eq!(app.world.resource::<RespawnPoint>().0, Vec2::new(300.0, 300.0));
        let mut players = app.world.query_filtered::<&Position, With<Player>>();
        let positions: Vec<_> = players.iter(&app.world).copied().collect();
        assert_eq!(positions, vec![Position::new(300.0, 300.0)]);
    }

    #[test]
    fn test_missing_next_level_keeps_current_level() {
        let dir = TempDir::new().unwrap();
        let mut app = level_app();
        app.insert_resource(LevelDirectory(dir.path().to_path_buf()));
        app.insert_resource(PendingLevel(create_test_level()));
        app.update();

        app.world.send_event(LevelComplete {
            level_id: "test_level".to_string(),
            next_level: Some("nowhere".to_string()),
            time: Duration::from_secs(30),
        });
        app.update();
        app.update();

        assert_eq!(app.world.resource::<CurrentLevel>().level_id, "test_level");
        assert!(app.world.get_resource::<PendingLevel>().is_none());
    }
}
