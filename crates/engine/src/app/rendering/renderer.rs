use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{Camera2D, Rect, SceneWorld, Shape, ShapeKind, Vec2};

use super::{world_to_screen_px, Rgba, Viewport};

const VIEW_CULL_PADDING_PX: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let viewport = self.viewport;
        let frame = self.pixels.frame_mut();
        draw_shapes(frame, viewport, world);
        self.pixels.render()
    }
}

fn draw_shapes(frame: &mut [u8], viewport: Viewport, world: &SceneWorld) {
    clear_frame(frame, world.clear_color());
    let camera = world.camera();
    for shape in world.shapes() {
        draw_shape(frame, viewport, camera, shape);
    }
}

fn draw_shape(frame: &mut [u8], viewport: Viewport, camera: &Camera2D, shape: &Shape) {
    match shape.kind {
        ShapeKind::Rect(rect) => {
            let Some(screen) = rect_to_screen(rect, camera, viewport) else {
                return;
            };
            if let Some(fill) = shape.fill {
                fill_rect(frame, viewport, screen, fill);
            }
            if let Some(outline) = shape.outline {
                outline_rect(frame, viewport, screen, outline);
            }
        }
        ShapeKind::Circle { center, radius } => {
            if radius <= 0.0 || !is_circle_visible(center, radius, camera, viewport) {
                return;
            }
            let (cx, cy) = world_to_screen_px(center, camera, viewport);
            if let Some(fill) = shape.fill {
                fill_circle(frame, viewport, cx, cy, radius, fill);
            }
            if let Some(outline) = shape.outline {
                outline_circle(frame, viewport, cx, cy, radius, outline);
            }
        }
    }
}

fn rect_to_screen(rect: Rect, camera: &Camera2D, viewport: Viewport) -> Option<ScreenRectPx> {
    let (x0, y0) = world_to_screen_px(Vec2::new(rect.x, rect.y), camera, viewport);
    let (x1, y1) = world_to_screen_px(Vec2::new(rect.right(), rect.bottom()), camera, viewport);
    if x1 < -VIEW_CULL_PADDING_PX
        || y1 < -VIEW_CULL_PADDING_PX
        || x0 > viewport.width as f32 + VIEW_CULL_PADDING_PX
        || y0 > viewport.height as f32 + VIEW_CULL_PADDING_PX
    {
        return None;
    }
    let screen = ScreenRectPx {
        left: x0.round() as i32,
        right: x1.round() as i32 - 1,
        top: y0.round() as i32,
        bottom: y1.round() as i32 - 1,
    };
    if screen.right < screen.left || screen.bottom < screen.top {
        return None;
    }
    Some(screen)
}

fn is_circle_visible(center: Vec2, radius: f32, camera: &Camera2D, viewport: Viewport) -> bool {
    let (cx, cy) = world_to_screen_px(center, camera, viewport);
    let reach = radius + VIEW_CULL_PADDING_PX;
    cx + reach >= 0.0
        && cy + reach >= 0.0
        && cx - reach <= viewport.width as f32
        && cy - reach <= viewport.height as f32
}

fn clear_frame(frame: &mut [u8], color: Rgba) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

fn fill_rect(frame: &mut [u8], viewport: Viewport, screen: ScreenRectPx, color: Rgba) {
    let left = screen.left.max(0);
    let top = screen.top.max(0);
    let right = screen.right.min(viewport.width as i32 - 1);
    let bottom = screen.bottom.min(viewport.height as i32 - 1);
    for y in top..=bottom {
        for x in left..=right {
            blend_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
        }
    }
}

fn outline_rect(frame: &mut [u8], viewport: Viewport, screen: ScreenRectPx, color: Rgba) {
    let width = viewport.width as usize;
    for x in screen.left..=screen.right {
        blend_pixel_rgba_clipped(frame, width, x, screen.top, color);
        blend_pixel_rgba_clipped(frame, width, x, screen.bottom, color);
    }
    for y in (screen.top + 1)..screen.bottom {
        blend_pixel_rgba_clipped(frame, width, screen.left, y, color);
        blend_pixel_rgba_clipped(frame, width, screen.right, y, color);
    }
}

fn fill_circle(frame: &mut [u8], viewport: Viewport, cx: f32, cy: f32, radius: f32, color: Rgba) {
    let radius_sq = radius * radius;
    let top = ((cy - radius).floor() as i32).max(0);
    let bottom = ((cy + radius).ceil() as i32).min(viewport.height as i32 - 1);
    let left = ((cx - radius).floor() as i32).max(0);
    let right = ((cx + radius).ceil() as i32).min(viewport.width as i32 - 1);
    for y in top..=bottom {
        let dy = y as f32 + 0.5 - cy;
        for x in left..=right {
            let dx = x as f32 + 0.5 - cx;
            if dx * dx + dy * dy <= radius_sq {
                blend_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
            }
        }
    }
}

fn outline_circle(
    frame: &mut [u8],
    viewport: Viewport,
    cx: f32,
    cy: f32,
    radius: f32,
    color: Rgba,
) {
    let outer_sq = radius * radius;
    let inner = (radius - 2.0).max(0.0);
    let inner_sq = inner * inner;
    let top = ((cy - radius).floor() as i32).max(0);
    let bottom = ((cy + radius).ceil() as i32).min(viewport.height as i32 - 1);
    let left = ((cx - radius).floor() as i32).max(0);
    let right = ((cx + radius).ceil() as i32).min(viewport.width as i32 - 1);
    for y in top..=bottom {
        let dy = y as f32 + 0.5 - cy;
        for x in left..=right {
            let dx = x as f32 + 0.5 - cx;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= outer_sq && dist_sq > inner_sq {
                blend_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
            }
        }
    }
}

fn blend_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: Rgba) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    let dst = &mut frame[byte_offset..end];
    let alpha = color[3] as u32;
    if alpha == 255 {
        dst.copy_from_slice(&color);
        return;
    }
    for channel in 0..3 {
        let blended = (color[channel] as u32 * alpha + dst[channel] as u32 * (255 - alpha)) / 255;
        dst[channel] = blended as u8;
    }
    dst[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba = [255, 255, 255, 255];

    fn blank_frame(viewport: Viewport) -> Vec<u8> {
        vec![0; viewport.width as usize * viewport.height as usize * 4]
    }

    fn pixel_at(frame: &[u8], viewport: Viewport, x: usize, y: usize) -> Rgba {
        let offset = (y * viewport.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn blend_out_of_bounds_is_ignored() {
        let viewport = Viewport {
            width: 4,
            height: 4,
        };
        let mut frame = blank_frame(viewport);
        blend_pixel_rgba_clipped(&mut frame, 4, -1, 0, WHITE);
        blend_pixel_rgba_clipped(&mut frame, 4, 4, 0, WHITE);
        blend_pixel_rgba_clipped(&mut frame, 4, 0, 4, WHITE);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn half_alpha_blends_toward_background() {
        let viewport = Viewport {
            width: 1,
            height: 1,
        };
        let mut frame = blank_frame(viewport);
        blend_pixel_rgba_clipped(&mut frame, 1, 0, 0, [255, 0, 0, 128]);
        let pixel = pixel_at(&frame, viewport, 0, 0);
        assert_eq!(pixel[0], 128);
        assert_eq!(pixel[1], 0);
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn rect_shape_fills_screen_pixels_under_camera() {
        let viewport = Viewport {
            width: 20,
            height: 20,
        };
        let mut frame = blank_frame(viewport);
        let mut world = SceneWorld::default();
        world.camera_mut().position = Vec2::new(100.0, 100.0);
        world.push_shape(Shape::filled_rect(Rect::new(100.0, 100.0, 2.0, 2.0), WHITE));

        draw_shapes(&mut frame, viewport, &world);

        assert_eq!(pixel_at(&frame, viewport, 10, 10), WHITE);
        assert_eq!(pixel_at(&frame, viewport, 11, 11), WHITE);
        assert_eq!(pixel_at(&frame, viewport, 12, 12), [0, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, viewport, 9, 10), [0, 0, 0, 255]);
    }

    #[test]
    fn offscreen_rect_is_culled() {
        let viewport = Viewport {
            width: 20,
            height: 20,
        };
        let camera = Camera2D::default();
        assert_eq!(
            rect_to_screen(Rect::new(500.0, 500.0, 10.0, 10.0), &camera, viewport),
            None
        );
    }

    #[test]
    fn circle_fill_covers_center_not_corners() {
        let viewport = Viewport {
            width: 21,
            height: 21,
        };
        let mut frame = blank_frame(viewport);
        let mut world = SceneWorld::default();
        world.push_shape(Shape::circle(Vec2::new(0.5, 0.5), 5.0, Some(WHITE), None));

        draw_shapes(&mut frame, viewport, &world);

        assert_eq!(pixel_at(&frame, viewport, 10, 10), WHITE);
        assert_eq!(pixel_at(&frame, viewport, 6, 6), [0, 0, 0, 255]);
    }
}
