use engine::Vec2;

use super::world::{World, WorldEntity};

/// Finds entity indices within `radius` of a point.
///
/// Implementations must report exactly the entities whose center lies at a
/// distance strictly below `radius`, in world order. Entity radius plays no
/// part.
pub(crate) trait ProximityQuery {
    fn entities_within(&self, world: &World, position: Vec2, radius: f32, out: &mut Vec<usize>);
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LinearProximity;

impl ProximityQuery for LinearProximity {
    fn entities_within(&self, world: &World, position: Vec2, radius: f32, out: &mut Vec<usize>) {
        out.clear();
        out.extend(
            world
                .entities
                .iter()
                .enumerate()
                .filter(|(_, entity)| position.distance(entity.position) < radius)
                .map(|(index, _)| index),
        );
    }
}

/// Entities near the player as of the last committed position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ProximitySet {
    indices: Vec<usize>,
}

impl ProximitySet {
    pub(crate) fn recompute(
        &mut self,
        query: &dyn ProximityQuery,
        world: &World,
        position: Vec2,
        radius: f32,
    ) {
        query.entities_within(world, position, radius, &mut self.indices);
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub(crate) fn entities<'w>(&'w self, world: &'w World) -> impl Iterator<Item = &'w WorldEntity> {
        self.indices.iter().filter_map(|index| world.entity(*index))
    }

    pub(crate) fn first_interactable<'w>(&'w self, world: &'w World) -> Option<&'w WorldEntity> {
        self.entities(world).find(|entity| entity.interactable)
    }
}
