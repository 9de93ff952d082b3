use crate::app::{Camera2D, Vec2};

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Maps a world point to screen pixels with the camera at the viewport
/// center. Both spaces grow downward in `y`.
pub fn world_to_screen_px(world: Vec2, camera: &Camera2D, viewport: Viewport) -> (f32, f32) {
    let x = world.x - camera.position.x + viewport.width as f32 * 0.5;
    let y = world.y - camera.position.y + viewport.height as f32 * 0.5;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_position_maps_to_viewport_center() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let camera = Camera2D {
            position: Vec2::new(1000.0, 1000.0),
        };
        let (x, y) = world_to_screen_px(Vec2::new(1000.0, 1000.0), &camera, viewport);
        assert_eq!((x, y), (400.0, 300.0));
    }

    #[test]
    fn y_axis_points_down() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let camera = Camera2D::default();
        let (x, y) = world_to_screen_px(Vec2::new(12.0, 40.0), &camera, viewport);
        assert_eq!(x, 412.0);
        assert_eq!(y, 340.0);
    }
}
