use std::collections::HashSet;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use tracing::warn;
use winit::window::Window;

use crate::app::camera::Camera;
use crate::app::entity::{BoundingShape, Entity, RenderKind, Rgba};
use crate::app::math::Vec2;
use crate::app::resources::ResourceStore;
use crate::app::scene::SceneWorld;

use super::draw::{
    blit_scaled, ellipse_outline, fill_ellipse, fill_rect, rect_outline,
};
use super::text::{draw_outlined_text, draw_text, line_advance, text_width};

const CLEAR_COLOR: Rgba = [16, 18, 40, 255];
const OUTLINE_COLOR: Rgba = [0, 0, 0, 255];
const DEBUG_SHAPE_COLOR: Rgba = [255, 170, 0, 255];
const VIEWPORT_OUTLINE_COLOR: Rgba = [255, 170, 0, 255];
const HUD_BAND_COLOR: Rgba = [0, 0, 0, 204];
const HUD_TEXT_COLOR: Rgba = [255, 200, 0, 255];
const PAUSE_BAND_COLOR: Rgba = [77, 77, 77, 204];
const PAUSE_BORDER_COLOR: Rgba = [128, 128, 128, 255];
const PAUSE_TEXT_COLOR: Rgba = [255, 255, 255, 255];
const PANEL_BG_COLOR: Rgba = [26, 26, 26, 204];
const PANEL_BORDER_COLOR: Rgba = [72, 72, 72, 255];
const PANEL_TEXT_COLOR: Rgba = [48, 200, 72, 255];
const PAUSE_BAND_HEIGHT: i32 = 32;
const PAUSE_LABEL: &str = "PAUSE";

/// Loop-owned frame context the pipeline needs besides the world itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInfo {
    pub debug: u8,
    pub paused: bool,
    pub fps: u32,
}

/// Layer-ordered, camera-aware rasterizer into an off-screen RGBA buffer,
/// presented scaled to the window surface.
pub struct Renderer {
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
    default_camera: Option<Camera>,
    warned_missing_images: HashSet<String>,
    rendered_last_frame: usize,
}

impl Renderer {
    pub fn new(window: Arc<Window>, buffer_width: u32, buffer_height: u32) -> Result<Self, Error> {
        let surface_size = window.inner_size();
        let surface =
            SurfaceTexture::new(surface_size.width, surface_size.height, Arc::clone(&window));
        let pixels = Pixels::new(buffer_width, buffer_height, surface)?;
        Ok(Self {
            pixels,
            buffer_width,
            buffer_height,
            default_camera: None,
            warned_missing_images: HashSet::new(),
            rendered_last_frame: 0,
        })
    }

    /// Fallback camera used when the active scene does not expose one.
    pub fn set_default_camera(&mut self, camera: Camera) {
        self.default_camera = Some(camera);
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub fn rendered_last_frame(&self) -> usize {
        self.rendered_last_frame
    }

    /// Copy of the composited buffer, for screenshot serialization.
    pub fn snapshot_rgba(&self) -> (u32, u32, Vec<u8>) {
        (
            self.buffer_width,
            self.buffer_height,
            self.pixels.frame().to_vec(),
        )
    }

    /// Compose the scene into the off-screen buffer and present it scaled.
    /// A world with rendering suspended skips the frame entirely.
    pub fn render_world(
        &mut self,
        world: &SceneWorld,
        resources: &mut ResourceStore,
        info: &FrameInfo,
    ) -> Result<(), Error> {
        if world.render_suspended() {
            return Ok(());
        }
        let frame = self.pixels.frame_mut();
        self.rendered_last_frame = compose_frame(
            frame,
            self.buffer_width,
            self.buffer_height,
            world,
            resources,
            self.default_camera.as_ref(),
            &mut self.warned_missing_images,
            info,
        );
        self.pixels.render()
    }
}

/// Pure composition pass, separated from surface presentation so it can be
/// exercised against a plain buffer. Returns the number of entities drawn.
#[allow(clippy::too_many_arguments)]
pub fn compose_frame(
    frame: &mut [u8],
    width: u32,
    height: u32,
    world: &SceneWorld,
    resources: &mut ResourceStore,
    default_camera: Option<&Camera>,
    warned_missing_images: &mut HashSet<String>,
    info: &FrameInfo,
) -> usize {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&CLEAR_COLOR);
    }

    let camera_offset = world
        .active_camera()
        .or(default_camera)
        .map(|camera| -camera.position)
        .unwrap_or(Vec2::ZERO);

    let mut rendered = 0usize;
    for layer in world.layers().layers() {
        let offset = if layer.fixed { Vec2::ZERO } else { camera_offset };
        for id in layer.entities() {
            let Some(entity) = world.entity_by_id(id) else {
                continue;
            };
            draw_entity(frame, width, height, entity, offset, resources, warned_missing_images);
            rendered += 1;
            if info.debug >= 2 {
                draw_bounding_outline(frame, width, height, entity, offset);
            }
            if info.debug >= 3 {
                draw_entity_debug_panel(frame, width, height, entity, offset);
            }
        }
    }

    if info.debug >= 2 {
        rect_outline(frame, width, height, 0, 0, width as i32, height as i32, VIEWPORT_OUTLINE_COLOR);
    }
    if info.paused {
        draw_pause_banner(frame, width, height);
    }
    if info.debug > 0 {
        draw_hud(frame, width, height, info, world.entity_count(), rendered);
    }

    rendered
}

fn draw_entity(
    frame: &mut [u8],
    width: u32,
    height: u32,
    entity: &Entity,
    offset: Vec2,
    resources: &mut ResourceStore,
    warned_missing_images: &mut HashSet<String>,
) {
    let x = (entity.position.x + offset.x).round() as i32;
    let y = (entity.position.y + offset.y).round() as i32;
    let w = entity.size.x.round() as i32;
    let h = entity.size.y.round() as i32;

    match &entity.render {
        RenderKind::Filled => draw_filled_shape(frame, width, height, entity, x, y, w, h),
        RenderKind::Image(key) => match resources.image(key) {
            Ok(image) => {
                let dest_w = (entity.size.x * entity.scale).round() as i32;
                let dest_h = (entity.size.y * entity.scale).round() as i32;
                blit_scaled(
                    frame, width, height, x, y, dest_w, dest_h, &image.rgba, image.width,
                    image.height,
                );
            }
            Err(error) => {
                if warned_missing_images.insert(key.clone()) {
                    warn!(entity = %entity.name, error = %error, "image_unavailable");
                }
                draw_filled_shape(frame, width, height, entity, x, y, w, h);
            }
        },
        RenderKind::Text(content) => {
            let scale = (entity.scale.round() as i32).max(1);
            draw_outlined_text(
                frame,
                width,
                height,
                x,
                y,
                content,
                entity.color,
                OUTLINE_COLOR,
                1,
                scale,
            );
        }
    }
}

fn draw_filled_shape(
    frame: &mut [u8],
    width: u32,
    height: u32,
    entity: &Entity,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
) {
    match entity.bounding.shape {
        BoundingShape::Rectangle => {
            fill_rect(frame, width, height, x, y, w, h, entity.color);
            rect_outline(frame, width, height, x, y, w, h, OUTLINE_COLOR);
        }
        BoundingShape::Circle => {
            fill_ellipse(frame, width, height, x, y, w, h, entity.color);
            ellipse_outline(frame, width, height, x, y, w, h, OUTLINE_COLOR);
        }
    }
}

fn draw_bounding_outline(frame: &mut [u8], width: u32, height: u32, entity: &Entity, offset: Vec2) {
    let rect = entity.bounding.rect;
    let x = (rect.x + offset.x).round() as i32;
    let y = (rect.y + offset.y).round() as i32;
    let w = rect.w.round() as i32;
    let h = rect.h.round() as i32;
    match entity.bounding.shape {
        BoundingShape::Rectangle => rect_outline(frame, width, height, x, y, w, h, DEBUG_SHAPE_COLOR),
        BoundingShape::Circle => ellipse_outline(frame, width, height, x, y, w, h, DEBUG_SHAPE_COLOR),
    }
}

fn draw_entity_debug_panel(frame: &mut [u8], width: u32, height: u32, entity: &Entity, offset: Vec2) {
    let lines = entity_debug_lines(entity);
    let panel_x =
        (entity.position.x + entity.size.x + entity.debug_info_offset.x + offset.x).round() as i32;
    let panel_y = (entity.position.y + entity.debug_info_offset.y + offset.y).round() as i32;
    let panel_w = lines
        .iter()
        .map(|line| text_width(line, 1))
        .max()
        .unwrap_or(0)
        + 8;
    let panel_h = lines.len() as i32 * line_advance(1) + 6;

    fill_rect(frame, width, height, panel_x, panel_y, panel_w, panel_h, PANEL_BG_COLOR);
    rect_outline(frame, width, height, panel_x, panel_y, panel_w, panel_h, PANEL_BORDER_COLOR);
    let mut text_y = panel_y + 4;
    for line in &lines {
        draw_text(frame, width, height, panel_x + 4, text_y, line, PANEL_TEXT_COLOR, 1);
        text_y += line_advance(1);
    }
}

fn entity_debug_lines(entity: &Entity) -> Vec<String> {
    vec![
        format!("NAME:{}", entity.name),
        format!("POS:{:.2},{:.2}", entity.position.x, entity.position.y),
        format!("SIZE:{:.2},{:.2}", entity.size.x, entity.size.y),
        format!("VEL:{:.2},{:.2}", entity.speed.x, entity.speed.y),
        format!("L/P:{}/{}", entity.layer, entity.priority),
    ]
}

fn draw_pause_banner(frame: &mut [u8], width: u32, height: u32) {
    let band_y = height as i32 / 2;
    fill_rect(frame, width, height, 0, band_y, width as i32, PAUSE_BAND_HEIGHT, PAUSE_BAND_COLOR);
    rect_outline(
        frame,
        width,
        height,
        -2,
        band_y,
        width as i32 + 4,
        PAUSE_BAND_HEIGHT,
        PAUSE_BORDER_COLOR,
    );
    let label_scale = 2;
    let label_x = (width as i32 - text_width(PAUSE_LABEL, label_scale)) / 2;
    let label_y = band_y + (PAUSE_BAND_HEIGHT - 5 * label_scale) / 2;
    draw_outlined_text(
        frame,
        width,
        height,
        label_x,
        label_y,
        PAUSE_LABEL,
        PAUSE_TEXT_COLOR,
        OUTLINE_COLOR,
        1,
        label_scale,
    );
}

fn draw_hud(frame: &mut [u8], width: u32, height: u32, info: &FrameInfo, objects: usize, rendered: usize) {
    let band_h = line_advance(1) + 8;
    let band_y = height as i32 - band_h;
    fill_rect(frame, width, height, 0, band_y, width as i32, band_h, HUD_BAND_COLOR);
    let line = format_debug_hud(info.debug, info.fps, objects, rendered);
    draw_text(frame, width, height, 4, band_y + 4, &line, HUD_TEXT_COLOR, 1);
}

/// The one-line HUD summary shown whenever the debug level is non-zero.
pub fn format_debug_hud(debug: u8, fps: u32, objects: usize, rendered: usize) -> String {
    let level = if debug == 0 {
        "off".to_string()
    } else {
        debug.to_string()
    };
    format!("dbg:{level} | FPS:{fps} | Objects:{objects} | Rendered:{rendered}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::entity::PhysicKind;
    use crate::app::math::Rect;

    const W: u32 = 64;
    const H: u32 = 48;

    fn buffer() -> Vec<u8> {
        vec![0u8; (W * H * 4) as usize]
    }

    fn pixel(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * W + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn compose(world: &SceneWorld, info: &FrameInfo) -> (Vec<u8>, usize) {
        let mut frame = buffer();
        let mut resources = ResourceStore::new();
        let mut warned = HashSet::new();
        let rendered = compose_frame(
            &mut frame,
            W,
            H,
            world,
            &mut resources,
            None,
            &mut warned,
            info,
        );
        (frame, rendered)
    }

    fn solid_block(name: &str, x: f32, y: f32, color: Rgba) -> Entity {
        Entity::named(name)
            .with_kind(PhysicKind::Static)
            .with_position(x, y)
            .with_size(8.0, 8.0)
            .with_color(color)
    }

    #[test]
    fn empty_world_clears_to_background() {
        let world = SceneWorld::new();
        let (frame, rendered) = compose(&world, &FrameInfo::default());
        assert_eq!(rendered, 0);
        assert_eq!(pixel(&frame, 0, 0), CLEAR_COLOR);
        assert_eq!(pixel(&frame, W - 1, H - 1), CLEAR_COLOR);
    }

    #[test]
    fn entities_draw_in_layer_priority_order() {
        let mut world = SceneWorld::new();
        // Same spot; the later layer must win the pixel.
        world.add_entity(solid_block("below", 10.0, 10.0, [10, 0, 0, 255]).with_layer(1));
        world.add_entity(solid_block("above", 10.0, 10.0, [0, 10, 0, 255]).with_layer(5));
        let (frame, rendered) = compose(&world, &FrameInfo::default());
        assert_eq!(rendered, 2);
        assert_eq!(pixel(&frame, 14, 14), [0, 10, 0, 255]);
    }

    #[test]
    fn camera_translation_shifts_non_fixed_layers_only() {
        let mut world = SceneWorld::new();
        let target = world.add_entity(solid_block("world_block", 30.0, 20.0, [200, 0, 0, 255]));
        world.add_entity(
            solid_block("hud_block", 2.0, 2.0, [0, 0, 200, 255])
                .with_layer(10)
                .with_fixed(true),
        );
        let mut camera = Camera::named("cam")
            .with_target(target)
            .with_view(Rect::new(0.0, 0.0, W as f32, H as f32));
        camera.position = Vec2::new(10.0, 5.0);
        world.add_camera(camera);

        let (frame, _) = compose(&world, &FrameInfo::default());
        // World block shifted by -camera.position: (30-10, 20-5).
        assert_eq!(pixel(&frame, 24, 19), [200, 0, 0, 255]);
        assert_eq!(pixel(&frame, 34, 24), CLEAR_COLOR);
        // Fixed HUD layer ignores the camera.
        assert_eq!(pixel(&frame, 4, 4), [0, 0, 200, 255]);
    }

    #[test]
    fn default_camera_applies_when_scene_has_none() {
        let mut world = SceneWorld::new();
        world.add_entity(solid_block("block", 30.0, 20.0, [200, 0, 0, 255]));

        let mut frame = buffer();
        let mut resources = ResourceStore::new();
        let mut warned = HashSet::new();
        let mut fallback = Camera::named("default");
        fallback.position = Vec2::new(10.0, 5.0);
        compose_frame(
            &mut frame,
            W,
            H,
            &world,
            &mut resources,
            Some(&fallback),
            &mut warned,
            &FrameInfo::default(),
        );
        assert_eq!(pixel(&frame, 24, 19), [200, 0, 0, 255]);
    }

    #[test]
    fn missing_image_falls_back_to_filled_shape_and_warns_once() {
        let mut world = SceneWorld::new();
        world.add_entity(
            solid_block("sprite", 10.0, 10.0, [9, 9, 9, 255])
                .with_render(RenderKind::Image("images/nope".to_string())),
        );

        let mut frame = buffer();
        let mut resources = ResourceStore::new();
        let mut warned = HashSet::new();
        for _ in 0..3 {
            compose_frame(
                &mut frame,
                W,
                H,
                &world,
                &mut resources,
                None,
                &mut warned,
                &FrameInfo::default(),
            );
        }
        assert_eq!(warned.len(), 1);
        assert_eq!(pixel(&frame, 14, 14), [9, 9, 9, 255]);
    }

    #[test]
    fn pause_banner_darkens_the_center_band() {
        let world = SceneWorld::new();
        let (frame, _) = compose(
            &world,
            &FrameInfo {
                paused: true,
                ..FrameInfo::default()
            },
        );
        let banner = pixel(&frame, W / 2, H / 2 + 2);
        assert_ne!(banner, CLEAR_COLOR);
    }

    #[test]
    fn hud_band_appears_only_with_debug_enabled() {
        let world = SceneWorld::new();
        let (plain, _) = compose(&world, &FrameInfo::default());
        let (debugged, _) = compose(
            &world,
            &FrameInfo {
                debug: 1,
                ..FrameInfo::default()
            },
        );
        assert_eq!(pixel(&plain, 2, H - 4), CLEAR_COLOR);
        assert_ne!(pixel(&debugged, 2, H - 4), CLEAR_COLOR);
    }

    #[test]
    fn viewport_outline_appears_at_debug_two() {
        let world = SceneWorld::new();
        let (frame, _) = compose(
            &world,
            &FrameInfo {
                debug: 2,
                ..FrameInfo::default()
            },
        );
        assert_eq!(pixel(&frame, 0, 0), VIEWPORT_OUTLINE_COLOR);
        assert_eq!(pixel(&frame, W - 1, 0), VIEWPORT_OUTLINE_COLOR);
    }

    #[test]
    fn hud_line_formats_levels_and_counts() {
        assert_eq!(
            format_debug_hud(0, 60, 12, 11),
            "dbg:off | FPS:60 | Objects:12 | Rendered:11"
        );
        assert_eq!(
            format_debug_hud(3, 59, 2, 2),
            "dbg:3 | FPS:59 | Objects:2 | Rendered:2"
        );
    }

    #[test]
    fn text_entities_render_glyph_pixels() {
        let mut world = SceneWorld::new();
        world.add_entity(
            Entity::named("score")
                .with_kind(PhysicKind::Static)
                .with_position(4.0, 4.0)
                .with_fixed(true)
                .with_layer(20)
                .with_color([255, 255, 255, 255])
                .with_render(RenderKind::Text("00123".to_string())),
        );
        let (frame, rendered) = compose(&world, &FrameInfo::default());
        assert_eq!(rendered, 1);
        let any_white = frame
            .chunks_exact(4)
            .any(|px| *px == [255, 255, 255, 255]);
        assert!(any_white);
    }
}
