use ability_platformer::plugins::level::{load_level_from_file, LevelDirectory, PendingLevel};
use ability_platformer::plugins::{GameplayPlugins, PresentationPlugin};
use bevy::prelude::*;
use std::path::PathBuf;

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("levels/level1.json"));

    let level = match load_level_from_file(&path) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    let directory = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(GameplayPlugins::default())
        .add_plugins(PresentationPlugin)
        .insert_resource(LevelDirectory(directory))
        .insert_resource(PendingLevel(level))
        .run();
}
