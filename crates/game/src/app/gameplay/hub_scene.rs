use std::cell::RefCell;
use std::rc::Rc;

use engine::{InputSnapshot, Rgba, Scene, SceneCommand, SceneKey, SceneWorld, Shape, Vec2};
use tracing::info;

use super::explore_scene::screen_cover;
use super::hub::{HubState, TalkOutcome};
use super::hud;
use super::settings::{apply_settings_input, SettingsOutcome};
use crate::app::save::now_timestamp_ms;
use crate::app::session::GameSession;

const CLEAR_COLOR: Rgba = [17, 24, 39, 255];
const NPC_SPACING: f32 = 160.0;
const NPC_RADIUS: f32 = 36.0;
const NPC_ROW_Y: f32 = -60.0;
const RECRUITED_OUTLINE_COLOR: Rgba = [250, 204, 21, 255];
const PORTAL_POSITION: Vec2 = Vec2::new(0.0, 140.0);
const PORTAL_RADIUS: f32 = 48.0;
const PORTAL_COLOR: Rgba = [168, 85, 247, 200];
const BLOCKED_DIM_COLOR: Rgba = [0, 0, 0, 150];

/// The social hub: talk to potential teammates, manage saves, enter the map.
pub(crate) struct HubScene {
    hub: HubState,
    session: Rc<RefCell<GameSession>>,
    window_size: (u32, u32),
}

impl HubScene {
    pub(crate) fn new(hub: HubState, session: Rc<RefCell<GameSession>>) -> Self {
        Self {
            hub,
            session,
            window_size: (0, 0),
        }
    }

    #[cfg(test)]
    pub(crate) fn hub(&self) -> &HubState {
        &self.hub
    }

    fn npc_position(index: usize, count: usize) -> Vec2 {
        let offset = index as f32 - (count.saturating_sub(1)) as f32 * 0.5;
        Vec2::new(offset * NPC_SPACING, NPC_ROW_Y)
    }
}

impl Scene for HubScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.hub.reset();
        world.set_clear_color(CLEAR_COLOR);
        world.camera_mut().position = Vec2::default();
        info!(npc_count = self.hub.npcs().len(), "hub_loaded");
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        _world: &mut SceneWorld,
    ) -> SceneCommand {
        self.window_size = input.window_size();
        self.session.borrow_mut().tick(fixed_dt_seconds);

        if input.cancel_pressed() {
            let outcome = self.hub.cancel();
            info!(?outcome, "hub_cancel");
        }
        if input.status_pressed() {
            self.hub.toggle_status();
        }

        if self.hub.overlays().is_settings_open() {
            return match apply_settings_input(input, &self.session) {
                SettingsOutcome::Loaded => {
                    self.hub.reset();
                    SceneCommand::None
                }
                SettingsOutcome::Quit => SceneCommand::Quit,
                SettingsOutcome::Stay => SceneCommand::None,
            };
        }

        if let Some(index) = input.option_pressed() {
            if self.hub.is_dialogue_open() {
                let mut session = self.session.borrow_mut();
                self.hub.select_option(index, &mut *session);
            } else {
                let session = self.session.borrow();
                if let TalkOutcome::Opened { npc_id, node_id } = self.hub.talk(index, session.roster())
                {
                    info!(npc = %npc_id, node = %node_id, "hub_talk");
                }
            }
        }

        if input.confirm_pressed() && !self.hub.is_blocked() {
            info!("hub_enter_map");
            return SceneCommand::HardResetTo(SceneKey::Explore);
        }

        SceneCommand::None
    }

    fn render(&mut self, world: &mut SceneWorld) {
        world.clear_shapes();
        world.push_shape(Shape::circle(
            PORTAL_POSITION,
            PORTAL_RADIUS,
            Some(PORTAL_COLOR),
            None,
        ));

        let session = self.session.borrow();
        let count = self.hub.npcs().len();
        for (index, npc) in self.hub.npcs().iter().enumerate() {
            let outline = session
                .roster()
                .contains(&npc.id)
                .then_some(RECRUITED_OUTLINE_COLOR);
            world.push_shape(Shape::circle(
                Self::npc_position(index, count),
                NPC_RADIUS,
                Some(npc.color),
                outline,
            ));
        }

        if self.hub.is_blocked() {
            let (width, height) = self.window_size;
            world.push_shape(Shape::filled_rect(
                screen_cover(world.camera().position, width as f32, height as f32),
                BLOCKED_DIM_COLOR,
            ));
        }
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        self.hub.reset();
        world.clear_shapes();
        info!("hub_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let session = self.session.borrow();
        let body = if self.hub.overlays().is_settings_open() {
            hud::settings_line(session.save_meta(), now_timestamp_ms())
        } else if self.hub.overlays().is_status_open() {
            hud::status_line(&session)
        } else if let Some(node) = self.hub.current_dialogue() {
            match self.hub.speaking_npc() {
                Some(npc) => format!("{} | {}", hud::dialogue_line(node), hud::npc_card(npc)),
                None => hud::dialogue_line(node),
            }
        } else {
            hud::hub_line(self.hub.npcs(), session.roster())
        };
        Some(hud::with_notice(&session, body))
    }
}
