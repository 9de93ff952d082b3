mod dialogue;
mod explore_scene;
mod exploration;
mod hub;
mod hub_scene;
mod hud;
mod interaction;
mod movement;
mod overlays;
mod proximity;
mod settings;
mod world;

use std::cell::RefCell;
use std::rc::Rc;

use engine::Scene;

pub(crate) use dialogue::{DialogueAction, DialogueActionSink, DialogueGraph, DialogueNode};
pub(crate) use hub::HubNpc;
pub(crate) use movement::hits_any_wall;
pub(crate) use world::{EntityKind, World, WorldEntity};

use self::explore_scene::ExploreScene;
use self::exploration::ExplorationState;
use self::hub::HubState;
use self::hub_scene::HubScene;
use super::config::ExplorationTuning;
use super::session::GameSession;

pub(crate) struct ScenePair {
    pub(crate) hub: Box<dyn Scene>,
    pub(crate) explore: Box<dyn Scene>,
}

/// Builds the hub and exploration scenes over one shared session.
pub(crate) fn build_scene_pair(
    world: World,
    dialogues: DialogueGraph,
    hub_npcs: Vec<HubNpc>,
    session: Rc<RefCell<GameSession>>,
    tuning: ExplorationTuning,
) -> ScenePair {
    let dialogues = Rc::new(dialogues);
    let exploration = ExplorationState::new(Rc::new(world), Rc::clone(&dialogues), tuning);
    let hub = HubState::new(Rc::new(hub_npcs), dialogues);
    ScenePair {
        hub: Box::new(HubScene::new(hub, Rc::clone(&session))),
        explore: Box::new(ExploreScene::new(exploration, session)),
    }
}
