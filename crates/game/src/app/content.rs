use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use engine::{parse_hex_color, read_json_file, JsonFileError, Rect, Rgba, Vec2};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use super::config::{ExplorationTuning, DIALOGUES_FILE, HUB_NPCS_FILE, NEW_GAME_FILE};
use super::gameplay::{
    hits_any_wall, DialogueGraph, DialogueNode, EntityKind, HubNpc, World, WorldEntity,
};
use super::session::{Item, PlayerProfile};

#[derive(Debug, Error)]
pub(crate) enum ContentError {
    #[error(transparent)]
    Json(#[from] JsonFileError),
    #[error("duplicate {kind} id '{id}' in {path}")]
    DuplicateId {
        path: PathBuf,
        kind: &'static str,
        id: String,
    },
    #[error("invalid value in {path} at {field}: {message}")]
    InvalidValue {
        path: PathBuf,
        field: String,
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct WorldDef {
    id: String,
    name: String,
    width: f32,
    height: f32,
    #[serde(default)]
    entities: Vec<EntityDef>,
    #[serde(default)]
    walls: Vec<WallDef>,
}

#[derive(Debug, Deserialize)]
struct EntityDef {
    id: String,
    name: String,
    kind: EntityKind,
    x: f32,
    y: f32,
    color: String,
    radius: f32,
    #[serde(default)]
    dialogue_id: Option<String>,
    #[serde(default)]
    interactable: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct WallDef {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Debug, Deserialize)]
struct HubNpcDef {
    id: String,
    name: String,
    role: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    personality: String,
    color: String,
    dialogue_id: String,
    #[serde(default)]
    recruited_dialogue_id: Option<String>,
    #[serde(default)]
    stats: BTreeMap<String, i32>,
}

/// Starting profile for a fresh session.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NewGame {
    pub(crate) player: PlayerProfile,
    #[serde(default)]
    pub(crate) inventory: Vec<Item>,
}

pub(crate) struct GameContent {
    pub(crate) world: World,
    pub(crate) dialogues: DialogueGraph,
    pub(crate) hub_npcs: Vec<HubNpc>,
    pub(crate) new_game: NewGame,
}

pub(crate) fn load_game_content(
    base_dir: &Path,
    world_file: &str,
    tuning: &ExplorationTuning,
) -> Result<GameContent, ContentError> {
    let world_path = base_dir.join(world_file);
    let world = world_from_def(&world_path, read_json_file(&world_path)?)?;
    validate_spawn(&world_path, &world, tuning)?;

    let dialogues_path = base_dir.join(DIALOGUES_FILE);
    let dialogues = dialogue_graph_from_nodes(&dialogues_path, read_json_file(&dialogues_path)?)?;

    let hub_npcs_path = base_dir.join(HUB_NPCS_FILE);
    let hub_npcs = hub_npcs_from_defs(&hub_npcs_path, read_json_file(&hub_npcs_path)?)?;

    let new_game_path = base_dir.join(NEW_GAME_FILE);
    let new_game: NewGame = read_json_file(&new_game_path)?;

    warn_dangling_references(&world, &dialogues, &hub_npcs);
    info!(
        world = %world.id,
        entity_count = world.entities.len(),
        wall_count = world.walls.len(),
        dialogue_count = dialogues.len(),
        hub_npc_count = hub_npcs.len(),
        "content_loaded"
    );

    Ok(GameContent {
        world,
        dialogues,
        hub_npcs,
        new_game,
    })
}

fn invalid(path: &Path, field: impl Into<String>, message: impl Into<String>) -> ContentError {
    ContentError::InvalidValue {
        path: path.to_path_buf(),
        field: field.into(),
        message: message.into(),
    }
}

fn parse_color(path: &Path, field: String, raw: &str) -> Result<Rgba, ContentError> {
    parse_hex_color(raw)
        .ok_or_else(|| invalid(path, field, format!("expected #rrggbb color, got '{raw}'")))
}

fn world_from_def(path: &Path, def: WorldDef) -> Result<World, ContentError> {
    if !(def.width.is_finite() && def.width > 0.0) {
        return Err(invalid(path, "width", format!("expected positive, got {}", def.width)));
    }
    if !(def.height.is_finite() && def.height > 0.0) {
        return Err(invalid(path, "height", format!("expected positive, got {}", def.height)));
    }

    let mut seen = HashSet::new();
    let mut entities = Vec::with_capacity(def.entities.len());
    for (index, entity) in def.entities.into_iter().enumerate() {
        if !seen.insert(entity.id.clone()) {
            return Err(ContentError::DuplicateId {
                path: path.to_path_buf(),
                kind: "entity",
                id: entity.id,
            });
        }
        let position = Vec2::new(entity.x, entity.y);
        if !position.is_finite() {
            return Err(invalid(path, format!("entities[{index}]"), "position must be finite"));
        }
        if !(entity.radius.is_finite() && entity.radius > 0.0) {
            return Err(invalid(
                path,
                format!("entities[{index}].radius"),
                format!("expected positive, got {}", entity.radius),
            ));
        }
        let color = parse_color(path, format!("entities[{index}].color"), &entity.color)?;
        entities.push(WorldEntity {
            id: entity.id,
            name: entity.name,
            kind: entity.kind,
            position,
            color,
            radius: entity.radius,
            dialogue_id: entity.dialogue_id,
            interactable: entity.interactable,
        });
    }

    let mut walls = Vec::with_capacity(def.walls.len());
    for (index, wall) in def.walls.iter().enumerate() {
        let values = [wall.x, wall.y, wall.w, wall.h];
        if values.iter().any(|value| !value.is_finite()) || wall.w < 0.0 || wall.h < 0.0 {
            return Err(invalid(
                path,
                format!("walls[{index}]"),
                "expected finite position and non-negative size",
            ));
        }
        walls.push(Rect::new(wall.x, wall.y, wall.w, wall.h));
    }

    Ok(World {
        id: def.id,
        name: def.name,
        width: def.width,
        height: def.height,
        entities,
        walls,
    })
}

/// The player must start inside the region and clear of every wall.
fn validate_spawn(path: &Path, world: &World, tuning: &ExplorationTuning) -> Result<(), ContentError> {
    let spawn = tuning.spawn;
    let half_extent = tuning.player_half_extent;
    let inside = spawn.x >= half_extent
        && spawn.x <= world.width - half_extent
        && spawn.y >= half_extent
        && spawn.y <= world.height - half_extent;
    if !inside {
        return Err(invalid(
            path,
            "spawn",
            format!(
                "({}, {}) lies outside the {}x{} region",
                spawn.x, spawn.y, world.width, world.height
            ),
        ));
    }
    if hits_any_wall(spawn, half_extent, &world.walls) {
        return Err(invalid(
            path,
            "spawn",
            format!("({}, {}) is covered by a wall", spawn.x, spawn.y),
        ));
    }
    Ok(())
}

fn dialogue_graph_from_nodes(
    path: &Path,
    nodes: Vec<DialogueNode>,
) -> Result<DialogueGraph, ContentError> {
    DialogueGraph::from_nodes(nodes).map_err(|id| ContentError::DuplicateId {
        path: path.to_path_buf(),
        kind: "dialogue",
        id,
    })
}

fn hub_npcs_from_defs(path: &Path, defs: Vec<HubNpcDef>) -> Result<Vec<HubNpc>, ContentError> {
    let mut seen = HashSet::new();
    let mut npcs = Vec::with_capacity(defs.len());
    for (index, def) in defs.into_iter().enumerate() {
        if !seen.insert(def.id.clone()) {
            return Err(ContentError::DuplicateId {
                path: path.to_path_buf(),
                kind: "hub npc",
                id: def.id,
            });
        }
        let color = parse_color(path, format!("[{index}].color"), &def.color)?;
        npcs.push(HubNpc {
            id: def.id,
            name: def.name,
            role: def.role,
            description: def.description,
            personality: def.personality,
            color,
            dialogue_id: def.dialogue_id,
            recruited_dialogue_id: def.recruited_dialogue_id,
            stats: def.stats,
        });
    }
    Ok(npcs)
}

// Broken links degrade to no-ops at runtime, so they only warn here.
fn warn_dangling_references(world: &World, dialogues: &DialogueGraph, hub_npcs: &[HubNpc]) {
    for (node_id, next_id) in dialogues.dangling_links() {
        warn!(node = %node_id, next_id = %next_id, "dialogue_link_dangling");
    }
    for entity in &world.entities {
        if let Some(dialogue_id) = entity.dialogue_link() {
            if !dialogues.contains(dialogue_id) {
                warn!(entity = %entity.id, dialogue_id, "entity_dialogue_dangling");
            }
        }
    }
    for npc in hub_npcs {
        let ids = std::iter::once(npc.dialogue_id.as_str())
            .chain(npc.recruited_dialogue_id.as_deref());
        for dialogue_id in ids {
            if !dialogues.contains(dialogue_id) {
                warn!(npc = %npc.id, dialogue_id, "hub_npc_dialogue_dangling");
            }
        }
    }
}
