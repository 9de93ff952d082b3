use std::env;
use std::path::Path;

use engine::{LoopConfig, Vec2};
use tracing::warn;

pub(crate) const WORLD_FILE_ENV_VAR: &str = "ISURV_WORLD";
pub(crate) const DEFAULT_WORLD_FILE: &str = "region_1.json";
pub(crate) const DIALOGUES_FILE: &str = "dialogues.json";
pub(crate) const HUB_NPCS_FILE: &str = "hub_npcs.json";
pub(crate) const NEW_GAME_FILE: &str = "new_game.json";

/// Exploration constants. Distances are world units, speed is per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ExplorationTuning {
    pub(crate) move_speed: f32,
    pub(crate) player_half_extent: f32,
    pub(crate) interaction_radius: f32,
    pub(crate) spawn: Vec2,
}

impl Default for ExplorationTuning {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            player_half_extent: 20.0,
            interaction_radius: 80.0,
            spawn: Vec2::new(1000.0, 1000.0),
        }
    }
}

pub(crate) fn loop_config() -> LoopConfig {
    LoopConfig {
        window_title: "Infinite Survival".to_string(),
        ..LoopConfig::default()
    }
}

pub(crate) fn resolve_world_file_name() -> String {
    match env::var(WORLD_FILE_ENV_VAR) {
        Ok(value) => world_file_name_or_default(&value),
        Err(env::VarError::NotPresent) => DEFAULT_WORLD_FILE.to_string(),
        Err(err) => {
            warn!(
                env_var = WORLD_FILE_ENV_VAR,
                error = %err,
                "unable to read world env var; falling back to default"
            );
            DEFAULT_WORLD_FILE.to_string()
        }
    }
}

/// Accepts bare file names only; anything that could escape the content
/// directory falls back to the default world.
fn world_file_name_or_default(raw: &str) -> String {
    let trimmed = raw.trim();
    let is_bare_name = !trimmed.is_empty()
        && Path::new(trimmed).file_name().and_then(|name| name.to_str()) == Some(trimmed)
        && trimmed != ".."
        && trimmed != ".";
    if is_bare_name {
        trimmed.to_string()
    } else {
        warn!(
            env_var = WORLD_FILE_ENV_VAR,
            value = raw,
            "invalid world file name; falling back to default"
        );
        DEFAULT_WORLD_FILE.to_string()
    }
}
