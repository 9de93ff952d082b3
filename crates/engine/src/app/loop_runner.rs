use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::StartupError;

use super::input::ActionStates;
use super::scene::SceneMachine;
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand, SceneKey};

/// Number of dialogue option keys (`1`..`9`) the collector recognizes.
pub const MAX_OPTION_KEYS: usize = 9;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Infinite Survival".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    hub: Box<dyn Scene>,
    explore: Box<dyn Scene>,
    initial_scene: SceneKey,
) -> Result<(), AppError> {
    let mut scenes = SceneMachine::new(hub, explore, initial_scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let mut input_collector = InputCollector::new(config.window_width, config.window_height);
    scenes.load_active();
    info!(scene = ?scenes.active_scene(), "scene_loaded");

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_held_actions();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        let command = scenes.update_active(fixed_dt_seconds, &input_snapshot);

                        let switched = match command {
                            SceneCommand::SwitchTo(next_scene) => scenes.switch_to(next_scene),
                            SceneCommand::HardResetTo(next_scene) => {
                                scenes.hard_reset_to(next_scene);
                                true
                            }
                            SceneCommand::Quit => {
                                info!(reason = "scene_command", "shutdown_requested");
                                window_target.exit();
                                break;
                            }
                            SceneCommand::None => false,
                        };
                        if switched {
                            info!(scene = ?scenes.active_scene(), "scene_switched");
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    scenes.render_active();
                    if let Err(error) = renderer.render_world(scenes.active_world()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    let next_title = scenes.debug_title_active();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scenes.shutdown_all();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Tracks whether a discrete key is held so a press yields exactly one edge.
#[derive(Debug, Default, Clone, Copy)]
struct EdgeKey {
    is_down: bool,
    pressed_edge: bool,
}

impl EdgeKey {
    fn handle(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.is_down {
                    self.pressed_edge = true;
                }
                self.is_down = true;
            }
            ElementState::Released => self.is_down = false,
        }
    }

    fn take(&mut self) -> bool {
        let was_pressed = self.pressed_edge;
        self.pressed_edge = false;
        was_pressed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiscreteKey {
    Interact,
    Cancel,
    Confirm,
    Status,
    Save,
    Load,
    Delete,
    Quit,
    Option(usize),
}

#[derive(Debug, Default)]
struct InputCollector {
    action_states: ActionStates,
    interact: EdgeKey,
    cancel: EdgeKey,
    confirm: EdgeKey,
    status: EdgeKey,
    save: EdgeKey,
    load: EdgeKey,
    delete: EdgeKey,
    quit: EdgeKey,
    options: [EdgeKey; MAX_OPTION_KEYS],
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
        if let Some(key) = discrete_key(key_event.physical_key) {
            self.handle_discrete_key_state(key, key_event.state);
        }
    }

    fn handle_discrete_key_state(&mut self, key: DiscreteKey, state: ElementState) {
        let edge = match key {
            DiscreteKey::Interact => &mut self.interact,
            DiscreteKey::Cancel => &mut self.cancel,
            DiscreteKey::Confirm => &mut self.confirm,
            DiscreteKey::Status => &mut self.status,
            DiscreteKey::Save => &mut self.save,
            DiscreteKey::Load => &mut self.load,
            DiscreteKey::Delete => &mut self.delete,
            DiscreteKey::Quit => &mut self.quit,
            DiscreteKey::Option(index) => match self.options.get_mut(index) {
                Some(edge) => edge,
                None => return,
            },
        };
        edge.handle(state);
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            _ => {}
        }
    }

    fn release_held_actions(&mut self) {
        self.action_states = ActionStates::default();
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let option_pressed = self.options.iter_mut().position(|edge| edge.pressed_edge);
        for edge in &mut self.options {
            edge.take();
        }
        InputSnapshot::new(
            self.quit.take(),
            self.action_states,
            self.interact.take(),
            self.cancel.take(),
            self.confirm.take(),
            self.status.take(),
            self.save.take(),
            self.load.take(),
            self.delete.take(),
            option_pressed,
            self.window_width,
            self.window_height,
        )
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }
}

fn discrete_key(key: PhysicalKey) -> Option<DiscreteKey> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let key = match code {
        KeyCode::KeyE | KeyCode::Space => DiscreteKey::Interact,
        KeyCode::Escape => DiscreteKey::Cancel,
        KeyCode::Enter | KeyCode::NumpadEnter => DiscreteKey::Confirm,
        KeyCode::Tab | KeyCode::KeyC => DiscreteKey::Status,
        KeyCode::F5 => DiscreteKey::Save,
        KeyCode::F9 => DiscreteKey::Load,
        KeyCode::Delete => DiscreteKey::Delete,
        KeyCode::KeyQ => DiscreteKey::Quit,
        KeyCode::Digit1 | KeyCode::Numpad1 => DiscreteKey::Option(0),
        KeyCode::Digit2 | KeyCode::Numpad2 => DiscreteKey::Option(1),
        KeyCode::Digit3 | KeyCode::Numpad3 => DiscreteKey::Option(2),
        KeyCode::Digit4 | KeyCode::Numpad4 => DiscreteKey::Option(3),
        KeyCode::Digit5 | KeyCode::Numpad5 => DiscreteKey::Option(4),
        KeyCode::Digit6 | KeyCode::Numpad6 => DiscreteKey::Option(5),
        KeyCode::Digit7 | KeyCode::Numpad7 => DiscreteKey::Option(6),
        KeyCode::Digit8 | KeyCode::Numpad8 => DiscreteKey::Option(7),
        KeyCode::Digit9 | KeyCode::Numpad9 => DiscreteKey::Option(8),
        _ => return None,
    };
    Some(key)
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
