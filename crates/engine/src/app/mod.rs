mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig, MAX_OPTION_KEYS};
pub use rendering::{parse_hex_color, world_to_screen_px, Renderer, Rgba, Viewport};
pub use scene::{
    Camera2D, InputSnapshot, Rect, Scene, SceneCommand, SceneKey, SceneWorld, Shape, ShapeKind,
    Vec2,
};
