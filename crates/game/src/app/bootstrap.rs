use std::cell::RefCell;
use std::rc::Rc;

use engine::{resolve_app_paths, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{self, ExplorationTuning};
use super::content::{load_game_content, ContentError};
use super::gameplay;
use super::save::SaveStore;
use super::session::{GameSession, WELCOME_NOTICE};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) hub: Box<dyn Scene>,
    pub(crate) explore: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Infinite Survival Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        content_dir = %paths.base_content_dir.display(),
        saves_dir = %paths.saves_dir.display(),
        "startup_paths"
    );

    let world_file = config::resolve_world_file_name();
    let tuning = ExplorationTuning::default();
    let content = load_game_content(&paths.base_content_dir, &world_file, &tuning)?;

    let mut session = GameSession::new(
        content.new_game.player,
        content.new_game.inventory,
        SaveStore::in_dir(&paths.saves_dir),
    );
    session.refresh_save_meta();
    session.notify(WELCOME_NOTICE);

    let scenes = gameplay::build_scene_pair(
        content.world,
        content.dialogues,
        content.hub_npcs,
        Rc::new(RefCell::new(session)),
        tuning,
    );

    Ok(AppWiring {
        config: config::loop_config(),
        hub: scenes.hub,
        explore: scenes.explore,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
