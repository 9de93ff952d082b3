use std::cell::RefCell;
use std::rc::Rc;

use engine::{InputSnapshot, Rect, Rgba, Scene, SceneCommand, SceneKey, SceneWorld, Shape, Vec2};
use tracing::info;

use super::exploration::ExplorationState;
use super::hud;
use super::interaction::InteractionOutcome;
use super::movement::HeldDirections;
use super::settings::{apply_settings_input, SettingsOutcome};
use super::world::EntityKind;
use crate::app::save::now_timestamp_ms;
use crate::app::session::GameSession;

const CLEAR_COLOR: Rgba = [10, 10, 12, 255];
const GROUND_COLOR: Rgba = [28, 28, 34, 255];
const WALL_COLOR: Rgba = [75, 85, 99, 255];
const WALL_OUTLINE_COLOR: Rgba = [107, 114, 128, 255];
const PLAYER_COLOR: Rgba = [59, 130, 246, 255];
const PLAYER_OUTLINE_COLOR: Rgba = [255, 255, 255, 255];
const NEARBY_OUTLINE_COLOR: Rgba = [250, 250, 250, 255];
const EXIT_GLOW_COLOR: Rgba = [168, 85, 247, 96];
const BLOCKED_DIM_COLOR: Rgba = [0, 0, 0, 150];

pub(crate) struct ExploreScene {
    state: ExplorationState,
    session: Rc<RefCell<GameSession>>,
    window_size: (u32, u32),
}

impl ExploreScene {
    pub(crate) fn new(state: ExplorationState, session: Rc<RefCell<GameSession>>) -> Self {
        Self {
            state,
            session,
            window_size: (0, 0),
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &ExplorationState {
        &self.state
    }

    fn handle_settings(&mut self, input: &InputSnapshot) -> Option<SceneCommand> {
        if !self.state.overlays().is_settings_open() {
            return None;
        }
        match apply_settings_input(input, &self.session) {
            SettingsOutcome::Loaded => Some(SceneCommand::SwitchTo(SceneKey::Hub)),
            SettingsOutcome::Quit => Some(SceneCommand::Quit),
            SettingsOutcome::Stay => None,
        }
    }
}

impl Scene for ExploreScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.state.reset();
        world.set_clear_color(CLEAR_COLOR);
        world.camera_mut().position = self.state.player_position();
        info!(
            world = %self.state.world().id,
            entity_count = self.state.world().entities.len(),
            spawn_x = self.state.player_position().x,
            spawn_y = self.state.player_position().y,
            "exploration_started"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        self.window_size = input.window_size();
        self.session.borrow_mut().tick(fixed_dt_seconds);

        if input.cancel_pressed() {
            let outcome = self.state.cancel();
            info!(?outcome, "exploration_cancel");
        }
        if input.status_pressed() {
            self.state.toggle_status();
        }
        if let Some(command) = self.handle_settings(input) {
            return command;
        }

        if let Some(index) = input.option_pressed() {
            if self.state.is_dialogue_open() {
                let mut session = self.session.borrow_mut();
                self.state.select_option(index, &mut *session);
            }
        }

        if input.interact_pressed() {
            match self.state.interact() {
                InteractionOutcome::ExitRequested { entity_id } => {
                    info!(entity = %entity_id, "exploration_exit");
                    return SceneCommand::SwitchTo(SceneKey::Hub);
                }
                InteractionOutcome::DialogueOpened { entity_id, node_id } => {
                    info!(entity = %entity_id, node = %node_id, "exploration_interaction");
                }
                InteractionOutcome::MissingDialogue { .. } | InteractionOutcome::Nothing => {}
            }
        }

        self.state.tick(HeldDirections::from_snapshot(input));
        world.camera_mut().position = self.state.player_position();
        SceneCommand::None
    }

    fn render(&mut self, world: &mut SceneWorld) {
        world.clear_shapes();
        let region = self.state.world();
        world.push_shape(Shape::filled_rect(region.bounds(), GROUND_COLOR));
        for wall in &region.walls {
            world.push_shape(Shape::filled_rect(*wall, WALL_COLOR).with_outline(WALL_OUTLINE_COLOR));
        }

        let nearby = self.state.proximity().indices();
        for (index, entity) in region.entities.iter().enumerate() {
            if entity.kind == EntityKind::Exit {
                world.push_shape(Shape::circle(
                    entity.position,
                    entity.radius * 1.5,
                    Some(EXIT_GLOW_COLOR),
                    None,
                ));
            }
            let outline = (entity.interactable && nearby.contains(&index))
                .then_some(NEARBY_OUTLINE_COLOR);
            world.push_shape(Shape::circle(
                entity.position,
                entity.radius,
                Some(entity.color),
                outline,
            ));
        }

        let player = Rect::from_center(
            self.state.player_position(),
            self.state.tuning().player_half_extent,
        );
        world.push_shape(Shape::filled_rect(player, PLAYER_COLOR).with_outline(PLAYER_OUTLINE_COLOR));

        if self.state.is_blocked() {
            let (width, height) = self.window_size;
            let camera = world.camera().position;
            world.push_shape(Shape::filled_rect(
                screen_cover(camera, width as f32, height as f32),
                BLOCKED_DIM_COLOR,
            ));
        }
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        self.state.reset();
        world.clear_shapes();
        info!(world = %self.state.world().id, "exploration_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let session = self.session.borrow();
        let body = if self.state.overlays().is_settings_open() {
            hud::settings_line(session.save_meta(), now_timestamp_ms())
        } else if self.state.overlays().is_status_open() {
            hud::status_line(&session)
        } else if let Some(node) = self.state.current_dialogue() {
            hud::dialogue_line(node)
        } else {
            hud::exploration_line(
                &self.state.world().name,
                self.state.player_position(),
                self.state.nearby_entities(),
                self.state.interaction_target(),
            )
        };
        Some(hud::with_notice(&session, body))
    }
}

/// World-space rectangle covering a `width` x `height` window centered on
/// `camera`.
pub(crate) fn screen_cover(camera: Vec2, width: f32, height: f32) -> Rect {
    Rect::new(camera.x - width * 0.5, camera.y - height * 0.5, width, height)
}
