use std::collections::BTreeMap;
use std::rc::Rc;

use engine::Rgba;
use tracing::warn;

use super::dialogue::{DialogueActionSink, DialogueGraph, DialogueNode, DialogueWalker, SelectOutcome};
use super::overlays::{CancelOutcome, Overlays};
use crate::app::session::TeammateRoster;

/// A potential teammate waiting in the hub.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HubNpc {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) role: String,
    pub(crate) description: String,
    pub(crate) personality: String,
    pub(crate) color: Rgba,
    pub(crate) dialogue_id: String,
    pub(crate) recruited_dialogue_id: Option<String>,
    pub(crate) stats: BTreeMap<String, i32>,
}

impl HubNpc {
    /// Dialogue to open for this NPC given the current roster.
    pub(crate) fn talk_dialogue_id(&self, roster: &TeammateRoster) -> &str {
        match &self.recruited_dialogue_id {
            Some(recruited) if roster.contains(&self.id) => recruited,
            _ => &self.dialogue_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TalkOutcome {
    Opened { npc_id: String, node_id: String },
    MissingDialogue { npc_id: String, dialogue_id: String },
    Ignored,
}

pub(crate) struct HubState {
    npcs: Rc<Vec<HubNpc>>,
    graph: Rc<DialogueGraph>,
    walker: DialogueWalker,
    speaker: Option<usize>,
    overlays: Overlays,
}

impl HubState {
    pub(crate) fn new(npcs: Rc<Vec<HubNpc>>, graph: Rc<DialogueGraph>) -> Self {
        Self {
            npcs,
            graph,
            walker: DialogueWalker::default(),
            speaker: None,
            overlays: Overlays::default(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.walker.close();
        self.speaker = None;
        self.overlays.close_all();
    }

    pub(crate) fn npcs(&self) -> &[HubNpc] {
        &self.npcs
    }

    pub(crate) fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub(crate) fn is_dialogue_open(&self) -> bool {
        self.walker.is_open()
    }

    pub(crate) fn is_blocked(&self) -> bool {
        self.walker.is_open() || self.overlays.any_open()
    }

    pub(crate) fn current_dialogue(&self) -> Option<&DialogueNode> {
        self.walker.current_node(&self.graph)
    }

    /// NPC whose conversation is currently open.
    pub(crate) fn speaking_npc(&self) -> Option<&HubNpc> {
        if !self.walker.is_open() {
            return None;
        }
        self.speaker.and_then(|index| self.npcs.get(index))
    }

    /// Opens the dialogue of NPC `index`, using its recruited variant when
    /// the NPC already belongs to `roster`.
    pub(crate) fn talk(&mut self, index: usize, roster: &TeammateRoster) -> TalkOutcome {
        if self.is_blocked() {
            return TalkOutcome::Ignored;
        }
        let Some(npc) = self.npcs.get(index) else {
            return TalkOutcome::Ignored;
        };
        let dialogue_id = npc.talk_dialogue_id(roster);
        if self.walker.open(&self.graph, dialogue_id) {
            self.speaker = Some(index);
            TalkOutcome::Opened {
                npc_id: npc.id.clone(),
                node_id: dialogue_id.to_string(),
            }
        } else {
            warn!(npc = %npc.id, dialogue_id, "hub_dialogue_missing");
            TalkOutcome::MissingDialogue {
                npc_id: npc.id.clone(),
                dialogue_id: dialogue_id.to_string(),
            }
        }
    }

    pub(crate) fn select_option(
        &mut self,
        index: usize,
        sink: &mut dyn DialogueActionSink,
    ) -> SelectOutcome {
        if self.overlays.any_open() {
            return SelectOutcome::Ignored;
        }
        self.walker.select_option(&self.graph, index, sink)
    }

    pub(crate) fn cancel(&mut self) -> CancelOutcome {
        self.overlays.cancel(&mut self.walker)
    }

    pub(crate) fn toggle_status(&mut self) {
        self.overlays.toggle_status();
    }
}
