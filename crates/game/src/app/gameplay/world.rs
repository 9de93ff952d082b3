use engine::{Rect, Rgba, Vec2};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum EntityKind {
    Npc,
    Enemy,
    Item,
    Exit,
}

impl EntityKind {
    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::Npc => "npc",
            Self::Enemy => "enemy",
            Self::Item => "item",
            Self::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WorldEntity {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) kind: EntityKind,
    pub(crate) position: Vec2,
    pub(crate) color: Rgba,
    pub(crate) radius: f32,
    pub(crate) dialogue_id: Option<String>,
    pub(crate) interactable: bool,
}

impl WorldEntity {
    /// Dialogue link, treating an empty id as absent.
    pub(crate) fn dialogue_link(&self) -> Option<&str> {
        self.dialogue_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// One explorable region. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct World {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) entities: Vec<WorldEntity>,
    pub(crate) walls: Vec<Rect>,
}

impl World {
    pub(crate) fn entity(&self, index: usize) -> Option<&WorldEntity> {
        self.entities.get(index)
    }

    #[cfg(test)]
    pub(crate) fn find_entity(&self, id: &str) -> Option<&WorldEntity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub(crate) fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, dialogue_id: Option<&str>) -> WorldEntity {
        WorldEntity {
            id: id.to_string(),
            name: id.to_string(),
            kind: EntityKind::Npc,
            position: Vec2::new(0.0, 0.0),
            color: [255, 255, 255, 255],
            radius: 10.0,
            dialogue_id: dialogue_id.map(str::to_string),
            interactable: true,
        }
    }

    #[test]
    fn empty_dialogue_id_is_treated_as_absent() {
        assert_eq!(entity("a", Some("")).dialogue_link(), None);
        assert_eq!(entity("a", None).dialogue_link(), None);
        assert_eq!(entity("a", Some("intro_npc")).dialogue_link(), Some("intro_npc"));
    }

    #[test]
    fn find_entity_by_id() {
        let world = World {
            id: "w".to_string(),
            name: "w".to_string(),
            width: 100.0,
            height: 100.0,
            entities: vec![entity("a", None), entity("b", None)],
            walls: Vec::new(),
        };
        assert_eq!(world.find_entity("b").map(|e| e.id.as_str()), Some("b"));
        assert!(world.find_entity("c").is_none());
        assert_eq!(world.bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }
}
