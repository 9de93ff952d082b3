use std::rc::Rc;

use engine::Vec2;

use super::dialogue::{DialogueActionSink, DialogueGraph, DialogueNode, DialogueWalker, SelectOutcome};
use super::interaction::{dispatch_interaction, InteractionOutcome};
use super::movement::{clamp_to_region, step_player, HeldDirections};
use super::overlays::{CancelOutcome, Overlays};
use super::proximity::{LinearProximity, ProximityQuery, ProximitySet};
use super::world::{World, WorldEntity};
use crate::app::config::ExplorationTuning;

/// Simulation state of one exploration run.
///
/// The player position and dialogue cursor have a single writer each: the
/// methods below. Proximity is recomputed after every committed move, so
/// [`ExplorationState::interact`] always sees the set produced by the most
/// recent tick.
pub(crate) struct ExplorationState {
    world: Rc<World>,
    graph: Rc<DialogueGraph>,
    tuning: ExplorationTuning,
    proximity_query: Box<dyn ProximityQuery>,
    player_position: Vec2,
    proximity: ProximitySet,
    walker: DialogueWalker,
    overlays: Overlays,
}

impl ExplorationState {
    pub(crate) fn new(world: Rc<World>, graph: Rc<DialogueGraph>, tuning: ExplorationTuning) -> Self {
        let mut state = Self {
            world,
            graph,
            tuning,
            proximity_query: Box::new(LinearProximity),
            player_position: Vec2::default(),
            proximity: ProximitySet::default(),
            walker: DialogueWalker::default(),
            overlays: Overlays::default(),
        };
        state.player_position = state.spawn_position();
        state.refresh_proximity();
        state
    }

    pub(crate) fn with_proximity_query(mut self, query: Box<dyn ProximityQuery>) -> Self {
        self.proximity_query = query;
        self.refresh_proximity();
        self
    }

    /// Back to the spawn point with every panel closed.
    pub(crate) fn reset(&mut self) {
        self.player_position = self.spawn_position();
        self.walker.close();
        self.overlays.close_all();
        self.refresh_proximity();
    }

    // Loaded content never needs the clamp; tuning built in code may.
    fn spawn_position(&self) -> Vec2 {
        clamp_to_region(self.tuning.spawn, self.tuning.player_half_extent, &self.world)
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn player_position(&self) -> Vec2 {
        self.player_position
    }

    pub(crate) fn tuning(&self) -> &ExplorationTuning {
        &self.tuning
    }

    pub(crate) fn proximity(&self) -> &ProximitySet {
        &self.proximity
    }

    pub(crate) fn nearby_entities(&self) -> impl Iterator<Item = &WorldEntity> {
        self.proximity.entities(&self.world)
    }

    pub(crate) fn interaction_target(&self) -> Option<&WorldEntity> {
        self.proximity.first_interactable(&self.world)
    }

    pub(crate) fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub(crate) fn is_dialogue_open(&self) -> bool {
        self.walker.is_open()
    }

    pub(crate) fn current_dialogue(&self) -> Option<&DialogueNode> {
        self.walker.current_node(&self.graph)
    }

    /// True while a dialogue or any overlay suspends movement.
    pub(crate) fn is_blocked(&self) -> bool {
        self.walker.is_open() || self.overlays.any_open()
    }

    /// Runs one movement tick. Returns whether the position changed.
    pub(crate) fn tick(&mut self, held: HeldDirections) -> bool {
        if self.is_blocked() || !held.any() {
            return false;
        }
        let next = step_player(self.player_position, held, &self.world, &self.tuning);
        if next == self.player_position {
            return false;
        }
        self.player_position = next;
        self.refresh_proximity();
        true
    }

    /// Ignored while blocked.
    pub(crate) fn interact(&mut self) -> InteractionOutcome {
        if self.is_blocked() {
            return InteractionOutcome::Nothing;
        }
        dispatch_interaction(&self.world, &self.proximity, &self.graph, &mut self.walker)
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

    fn refresh_proximity(&mut self) {
        self.proximity.recompute(
            self.proximity_query.as_ref(),
            &self.world,
            self.player_position,
            self.tuning.interaction_radius,
        );
    }
}
