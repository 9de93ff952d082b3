use engine::{InputAction, InputSnapshot, Rect, Vec2};

use super::world::World;
use crate::app::config::ExplorationTuning;

/// Directions held during one tick. Opposite directions cancel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct HeldDirections {
    pub(crate) up: bool,
    pub(crate) down: bool,
    pub(crate) left: bool,
    pub(crate) right: bool,
}

impl HeldDirections {
    pub(crate) fn from_snapshot(input: &InputSnapshot) -> Self {
        Self {
            up: input.is_down(InputAction::MoveUp),
            down: input.is_down(InputAction::MoveDown),
            left: input.is_down(InputAction::MoveLeft),
            right: input.is_down(InputAction::MoveRight),
        }
    }

    pub(crate) fn any(self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Advances `position` by one tick. Each held direction moves its axis by
/// the full speed, so diagonals are not normalized. The candidate is
/// clamped to the region and rejected outright if the player box strictly
/// overlaps any wall; a rejected tick returns `position` unchanged.
pub(crate) fn step_player(
    position: Vec2,
    held: HeldDirections,
    world: &World,
    tuning: &ExplorationTuning,
) -> Vec2 {
    let speed = tuning.move_speed;
    let half_extent = tuning.player_half_extent;

    let mut candidate = position;
    if held.up {
        candidate.y -= speed;
    }
    if held.down {
        candidate.y += speed;
    }
    if held.left {
        candidate.x -= speed;
    }
    if held.right {
        candidate.x += speed;
    }

    let candidate = clamp_to_region(candidate, half_extent, world);
    if hits_any_wall(candidate, half_extent, &world.walls) {
        return position;
    }
    candidate
}

/// Pulls `position` into `[h, W-h] x [h, H-h]`.
pub(crate) fn clamp_to_region(position: Vec2, half_extent: f32, world: &World) -> Vec2 {
    Vec2::new(
        clamp_axis(position.x, half_extent, world.width - half_extent),
        clamp_axis(position.y, half_extent, world.height - half_extent),
    )
}

pub(crate) fn hits_any_wall(center: Vec2, half_extent: f32, walls: &[Rect]) -> bool {
    let hitbox = Rect::from_center(center, half_extent);
    walls.iter().any(|wall| wall.overlaps(&hitbox))
}

// Degenerate ranges (region narrower than the player) pin to `max`.
fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}
