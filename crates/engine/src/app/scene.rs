use super::input::{ActionStates, InputAction};
use super::rendering::Rgba;

const DEFAULT_CLEAR_COLOR: Rgba = [0, 0, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Hub,
    Explore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    HardResetTo(SceneKey),
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    quit_pressed: bool,
    actions: ActionStates,
    interact_pressed: bool,
    cancel_pressed: bool,
    confirm_pressed: bool,
    status_pressed: bool,
    save_pressed: bool,
    load_pressed: bool,
    delete_pressed: bool,
    option_pressed: Option<usize>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_pressed: bool,
        actions: ActionStates,
        interact_pressed: bool,
        cancel_pressed: bool,
        confirm_pressed: bool,
        status_pressed: bool,
        save_pressed: bool,
        load_pressed: bool,
        delete_pressed: bool,
        option_pressed: Option<usize>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_pressed,
            actions,
            interact_pressed,
            cancel_pressed,
            confirm_pressed,
            status_pressed,
            save_pressed,
            load_pressed,
            delete_pressed,
            option_pressed,
            window_width,
            window_height,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_interact_pressed(mut self, interact_pressed: bool) -> Self {
        self.interact_pressed = interact_pressed;
        self
    }

    pub fn with_cancel_pressed(mut self, cancel_pressed: bool) -> Self {
        self.cancel_pressed = cancel_pressed;
        self
    }

    pub fn with_confirm_pressed(mut self, confirm_pressed: bool) -> Self {
        self.confirm_pressed = confirm_pressed;
        self
    }

    pub fn with_status_pressed(mut self, status_pressed: bool) -> Self {
        self.status_pressed = status_pressed;
        self
    }

    pub fn with_save_pressed(mut self, save_pressed: bool) -> Self {
        self.save_pressed = save_pressed;
        self
    }

    pub fn with_load_pressed(mut self, load_pressed: bool) -> Self {
        self.load_pressed = load_pressed;
        self
    }

    pub fn with_delete_pressed(mut self, delete_pressed: bool) -> Self {
        self.delete_pressed = delete_pressed;
        self
    }

    pub fn with_quit_pressed(mut self, quit_pressed: bool) -> Self {
        self.quit_pressed = quit_pressed;
        self
    }

    pub fn with_option_pressed(mut self, option_pressed: Option<usize>) -> Self {
        self.option_pressed = option_pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn interact_pressed(&self) -> bool {
        self.interact_pressed
    }

    pub fn cancel_pressed(&self) -> bool {
        self.cancel_pressed
    }

    pub fn confirm_pressed(&self) -> bool {
        self.confirm_pressed
    }

    pub fn status_pressed(&self) -> bool {
        self.status_pressed
    }

    pub fn save_pressed(&self) -> bool {
        self.save_pressed
    }

    pub fn load_pressed(&self) -> bool {
        self.load_pressed
    }

    pub fn delete_pressed(&self) -> bool {
        self.delete_pressed
    }

    pub fn quit_pressed(&self) -> bool {
        self.quit_pressed
    }

    /// Zero-based option index chosen this tick, if any.
    pub fn option_pressed(&self) -> Option<usize> {
        self.option_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

/// World units map 1:1 to pixels; `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, half_extent: f32) -> Self {
        Self {
            x: center.x - half_extent,
            y: center.y - half_extent,
            w: half_extent * 2.0,
            h: half_extent * 2.0,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Rect(Rect),
    Circle { center: Vec2, radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub fill: Option<Rgba>,
    pub outline: Option<Rgba>,
}

impl Shape {
    pub fn filled_rect(rect: Rect, fill: Rgba) -> Self {
        Self {
            kind: ShapeKind::Rect(rect),
            fill: Some(fill),
            outline: None,
        }
    }

    pub fn circle(center: Vec2, radius: f32, fill: Option<Rgba>, outline: Option<Rgba>) -> Self {
        Self {
            kind: ShapeKind::Circle { center, radius },
            fill,
            outline,
        }
    }

    pub fn with_outline(mut self, outline: Rgba) -> Self {
        self.outline = Some(outline);
        self
    }
}

/// Per-scene render state. Scenes rebuild the shape list in
/// [`Scene::render`]; the renderer draws it in push order.
#[derive(Debug)]
pub struct SceneWorld {
    camera: Camera2D,
    clear_color: Rgba,
    shapes: Vec<Shape>,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self {
            camera: Camera2D::default(),
            clear_color: DEFAULT_CLEAR_COLOR,
            shapes: Vec::new(),
        }
    }
}

impl SceneWorld {
    pub fn clear(&mut self) {
        self.camera = Camera2D::default();
        self.clear_color = DEFAULT_CLEAR_COLOR;
        self.shapes.clear();
    }

    pub fn clear_shapes(&mut self) {
        self.shapes.clear();
    }

    pub fn push_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn clear_color(&self) -> Rgba {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Rgba) {
        self.clear_color = color;
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }
}

pub(crate) struct SceneMachine {
    hub: SceneRuntime,
    explore: SceneRuntime,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(hub: Box<dyn Scene>, explore: Box<dyn Scene>, active_scene: SceneKey) -> Self {
        Self {
            hub: SceneRuntime::new(hub),
            explore: SceneRuntime::new(explore),
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self) {
        self.load_scene_if_needed(self.active_scene);
    }

    pub(crate) fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        let runtime = self.active_runtime_mut();
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.update(fixed_dt_seconds, input, world)
    }

    pub(crate) fn render_active(&mut self) {
        let runtime = self.active_runtime_mut();
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.render(world);
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.active_runtime_ref().world
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        let runtime = self.active_runtime_ref();
        runtime.scene.debug_title(&runtime.world)
    }

    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        self.load_scene_if_needed(next_scene);
        self.active_scene = next_scene;
        true
    }

    pub(crate) fn hard_reset_to(&mut self, next_scene: SceneKey) -> bool {
        let runtime = self.runtime_mut(next_scene);
        if runtime.is_loaded {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.unload(world);
        }
        runtime.world.clear();
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(world);
        }
        runtime.is_loaded = true;
        let changed = self.active_scene != next_scene;
        self.active_scene = next_scene;
        changed
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in [&mut self.hub, &mut self.explore] {
            if runtime.is_loaded {
                let (scene, world) = (&mut runtime.scene, &mut runtime.world);
                scene.unload(world);
                runtime.world.clear();
                runtime.is_loaded = false;
            }
        }
    }

    fn load_scene_if_needed(&mut self, key: SceneKey) {
        if self.runtime_ref(key).is_loaded {
            return;
        }
        let runtime = self.runtime_mut(key);
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(world);
        }
        runtime.is_loaded = true;
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        self.runtime_mut(self.active_scene)
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        self.runtime_ref(self.active_scene)
    }

    fn runtime_mut(&mut self, key: SceneKey) -> &mut SceneRuntime {
        match key {
            SceneKey::Hub => &mut self.hub,
            SceneKey::Explore => &mut self.explore,
        }
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        match key {
            SceneKey::Hub => &self.hub,
            SceneKey::Explore => &self.explore,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Counters {
        loads: Cell<u32>,
        unloads: Cell<u32>,
        updates: Cell<u32>,
    }

    struct CountingScene {
        counters: Rc<Counters>,
        offset_x: f32,
    }

    impl Scene for CountingScene {
        fn load(&mut self, world: &mut SceneWorld) {
            self.counters.loads.set(self.counters.loads.get() + 1);
            self.offset_x = 0.0;
            world.camera_mut().position = Vec2::default();
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            _input: &InputSnapshot,
            world: &mut SceneWorld,
        ) -> SceneCommand {
            self.counters.updates.set(self.counters.updates.get() + 1);
            self.offset_x += 1.0;
            world.camera_mut().position.x = self.offset_x;
            SceneCommand::None
        }

        fn render(&mut self, world: &mut SceneWorld) {
            world.clear_shapes();
            world.push_shape(Shape::filled_rect(
                Rect::new(self.offset_x, 0.0, 1.0, 1.0),
                [255, 255, 255, 255],
            ));
        }

        fn unload(&mut self, _world: &mut SceneWorld) {
            self.counters.unloads.set(self.counters.unloads.get() + 1);
        }
    }

    fn counting_pair() -> (SceneMachine, Rc<Counters>, Rc<Counters>) {
        let hub = Rc::new(Counters::default());
        let explore = Rc::new(Counters::default());
        let machine = SceneMachine::new(
            Box::new(CountingScene {
                counters: Rc::clone(&hub),
                offset_x: 0.0,
            }),
            Box::new(CountingScene {
                counters: Rc::clone(&explore),
                offset_x: 0.0,
            }),
            SceneKey::Hub,
        );
        (machine, hub, explore)
    }

    #[test]
    fn rect_overlap_is_strict() {
        let wall = Rect::new(500.0, 500.0, 200.0, 200.0);
        let touching_right = Rect::new(700.0, 550.0, 40.0, 40.0);
        let touching_top = Rect::new(550.0, 460.0, 40.0, 40.0);
        let inside = Rect::new(650.0, 650.0, 40.0, 40.0);

        assert!(!wall.overlaps(&touching_right));
        assert!(!wall.overlaps(&touching_top));
        assert!(wall.overlaps(&inside));
        assert!(inside.overlaps(&wall));
    }

    #[test]
    fn rect_from_center_uses_half_extent() {
        let rect = Rect::from_center(Vec2::new(650.0, 650.0), 20.0);
        assert_eq!(rect, Rect::new(630.0, 630.0, 40.0, 40.0));
        assert_eq!(rect.right(), 670.0);
        assert_eq!(rect.bottom(), 670.0);
    }

    #[test]
    fn vec2_distance_is_euclidean() {
        let a = Vec2::new(1000.0, 1000.0);
        let b = Vec2::new(1003.0, 1004.0);
        assert!((a.distance(b) - 5.0).abs() < 0.0001);
    }

    #[test]
    fn snapshot_builders_set_edges() {
        let snapshot = InputSnapshot::empty()
            .with_interact_pressed(true)
            .with_option_pressed(Some(2))
            .with_action_down(InputAction::MoveRight, true);

        assert!(snapshot.interact_pressed());
        assert!(!snapshot.cancel_pressed());
        assert_eq!(snapshot.option_pressed(), Some(2));
        assert!(snapshot.is_down(InputAction::MoveRight));
        assert!(!snapshot.is_down(InputAction::MoveLeft));
    }

    #[test]
    fn switch_loads_target_once_and_preserves_state() {
        let (mut machine, hub, explore) = counting_pair();
        machine.load_active();
        let _ = machine.update_active(1.0 / 60.0, &InputSnapshot::empty());

        assert!(machine.switch_to(SceneKey::Explore));
        assert!(machine.switch_to(SceneKey::Hub));
        assert!(machine.switch_to(SceneKey::Explore));

        assert_eq!(hub.loads.get(), 1);
        assert_eq!(explore.loads.get(), 1);
        assert!(!machine.switch_to(SceneKey::Explore));
        assert_eq!(machine.active_scene(), SceneKey::Explore);

        assert!(machine.switch_to(SceneKey::Hub));
        assert_eq!(machine.active_world().camera().position.x, 1.0);
    }

    #[test]
    fn inactive_scene_does_not_advance() {
        let (mut machine, hub, explore) = counting_pair();
        machine.load_active();
        assert!(machine.switch_to(SceneKey::Explore));
        for _ in 0..5 {
            let _ = machine.update_active(1.0 / 60.0, &InputSnapshot::empty());
        }

        assert_eq!(explore.updates.get(), 5);
        assert_eq!(hub.updates.get(), 0);
    }

    #[test]
    fn hard_reset_reloads_target_scene() {
        let (mut machine, _hub, explore) = counting_pair();
        machine.load_active();
        assert!(machine.switch_to(SceneKey::Explore));
        let _ = machine.update_active(1.0 / 60.0, &InputSnapshot::empty());
        assert_eq!(machine.active_world().camera().position.x, 1.0);

        assert!(!machine.hard_reset_to(SceneKey::Explore));
        assert_eq!(explore.loads.get(), 2);
        assert_eq!(explore.unloads.get(), 1);
        assert_eq!(machine.active_world().camera().position.x, 0.0);
    }

    #[test]
    fn render_rebuilds_shape_list() {
        let (mut machine, _hub, _explore) = counting_pair();
        machine.load_active();
        machine.render_active();
        machine.render_active();
        assert_eq!(machine.active_world().shape_count(), 1);
    }

    #[test]
    fn shutdown_unloads_only_loaded_scenes() {
        let (mut machine, hub, explore) = counting_pair();
        machine.load_active();
        machine.shutdown_all();

        assert_eq!(hub.unloads.get(), 1);
        assert_eq!(explore.unloads.get(), 0);
    }
}
