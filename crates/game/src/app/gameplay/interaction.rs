use tracing::{debug, warn};

use super::dialogue::{DialogueGraph, DialogueWalker};
use super::proximity::ProximitySet;
use super::world::{EntityKind, World};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InteractionOutcome {
    /// No interactable entity nearby, or the target has nothing to say.
    Nothing,
    ExitRequested { entity_id: String },
    DialogueOpened { entity_id: String, node_id: String },
    MissingDialogue { entity_id: String, dialogue_id: String },
}

/// Resolves an interaction against the first interactable entity of
/// `proximity` and opens its dialogue on `walker` when one exists.
pub(crate) fn dispatch_interaction(
    world: &World,
    proximity: &ProximitySet,
    graph: &DialogueGraph,
    walker: &mut DialogueWalker,
) -> InteractionOutcome {
    let Some(target) = proximity.first_interactable(world) else {
        return InteractionOutcome::Nothing;
    };

    if target.kind == EntityKind::Exit {
        return InteractionOutcome::ExitRequested {
            entity_id: target.id.clone(),
        };
    }

    let Some(dialogue_id) = target.dialogue_link() else {
        debug!(entity = %target.id, kind = target.kind.as_token(), "interaction_without_effect");
        return InteractionOutcome::Nothing;
    };

    if walker.open(graph, dialogue_id) {
        InteractionOutcome::DialogueOpened {
            entity_id: target.id.clone(),
            node_id: dialogue_id.to_string(),
        }
    } else {
        warn!(entity = %target.id, dialogue_id, "interaction_dialogue_missing");
        InteractionOutcome::MissingDialogue {
            entity_id: target.id.clone(),
            dialogue_id: dialogue_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::Vec2;

    use super::*;
    use crate::app::gameplay::dialogue::DialogueNode;
    use crate::app::gameplay::proximity::LinearProximity;
    use crate::app::gameplay::world::WorldEntity;

    fn entity(id: &str, kind: EntityKind, dialogue_id: Option<&str>, interactable: bool) -> WorldEntity {
        WorldEntity {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            position: Vec2::new(1000.0, 1000.0),
            color: [255, 255, 255, 255],
            radius: 10.0,
            dialogue_id: dialogue_id.map(str::to_string),
            interactable,
        }
    }

    fn setup(entities: Vec<WorldEntity>) -> (World, ProximitySet, DialogueGraph) {
        let world = World {
            id: "test".to_string(),
            name: "test".to_string(),
            width: 2000.0,
            height: 2000.0,
            entities,
            walls: Vec::new(),
        };
        let mut proximity = ProximitySet::default();
        proximity.recompute(&LinearProximity, &world, Vec2::new(1000.0, 1000.0), 80.0);
        let graph = DialogueGraph::from_nodes(vec![DialogueNode {
            id: "hello".to_string(),
            speaker_name: "npc".to_string(),
            text: "hi".to_string(),
            avatar_ref: None,
            options: Vec::new(),
        }])
        .expect("graph");
        (world, proximity, graph)
    }

    #[test]
    fn non_interactable_entities_are_skipped() {
        let (world, proximity, graph) = setup(vec![
            entity("enemy", EntityKind::Enemy, Some("hello"), false),
            entity("npc", EntityKind::Npc, Some("hello"), true),
        ]);
        let mut walker = DialogueWalker::default();

        let outcome = dispatch_interaction(&world, &proximity, &graph, &mut walker);

        assert_eq!(
            outcome,
            InteractionOutcome::DialogueOpened {
                entity_id: "npc".to_string(),
                node_id: "hello".to_string()
            }
        );
        assert!(walker.is_open());
    }

    #[test]
    fn exit_takes_priority_over_its_dialogue_link() {
        let (world, proximity, graph) =
            setup(vec![entity("exit", EntityKind::Exit, Some("hello"), true)]);
        let mut walker = DialogueWalker::default();

        let outcome = dispatch_interaction(&world, &proximity, &graph, &mut walker);

        assert_eq!(
            outcome,
            InteractionOutcome::ExitRequested {
                entity_id: "exit".to_string()
            }
        );
        assert!(!walker.is_open());
    }

    #[test]
    fn missing_dialogue_is_a_no_op() {
        let (world, proximity, graph) =
            setup(vec![entity("npc", EntityKind::Npc, Some("absent"), true)]);
        let mut walker = DialogueWalker::default();

        let outcome = dispatch_interaction(&world, &proximity, &graph, &mut walker);

        assert!(matches!(outcome, InteractionOutcome::MissingDialogue { .. }));
        assert!(!walker.is_open());
    }

    #[test]
    fn only_first_interactable_is_considered() {
        let (world, proximity, graph) = setup(vec![
            entity("item", EntityKind::Item, None, true),
            entity("npc", EntityKind::Npc, Some("hello"), true),
        ]);
        let mut walker = DialogueWalker::default();

        let outcome = dispatch_interaction(&world, &proximity, &graph, &mut walker);

        assert_eq!(outcome, InteractionOutcome::Nothing);
        assert!(!walker.is_open());
    }

    #[test]
    fn empty_proximity_does_nothing() {
        let (world, _, graph) = setup(vec![entity("npc", EntityKind::Npc, Some("hello"), true)]);
        let mut walker = DialogueWalker::default();

        let outcome =
            dispatch_interaction(&world, &ProximitySet::default(), &graph, &mut walker);

        assert_eq!(outcome, InteractionOutcome::Nothing);
    }
}
