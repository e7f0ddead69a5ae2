use tracing::trace;

use super::entity::EntityId;
use super::math::{Rect, Vec2};

/// Margin removed from the viewport for the camera's own nominal size; used
/// only when drawing the camera's debug outline.
const VIEW_SIZE_MARGIN: f32 = 20.0;

/// A following camera: first-order exponential smoothing toward keeping the
/// tracked entity centered in the view.
#[derive(Debug, Clone)]
pub struct Camera {
    pub name: String,
    pub position: Vec2,
    pub size: Vec2,
    /// Weak reference by id; the target may have been removed, in which case
    /// the camera simply stops moving.
    pub tracked: Option<EntityId>,
    /// Fraction of the positional gap closed per unit time, in (0, 1].
    /// 1.0 with small dt approximates a snap-to-target camera.
    pub tween_factor: f32,
    pub view: Rect,
}

impl Camera {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            tracked: None,
            tween_factor: 1.0,
            view: Rect::default(),
        }
    }

    pub fn with_target(mut self, target: EntityId) -> Self {
        self.tracked = Some(target);
        self
    }

    pub fn with_tween(mut self, tween_factor: f32) -> Self {
        self.tween_factor = tween_factor;
        self
    }

    pub fn with_view(mut self, view: Rect) -> Self {
        self.set_view(view);
        self
    }

    pub fn set_view(&mut self, view: Rect) {
        self.view = view;
        self.size = Vec2::new(view.w - VIEW_SIZE_MARGIN, view.h - VIEW_SIZE_MARGIN);
    }

    /// Close a `tween_factor * dt/1000` fraction of the gap toward the
    /// screen-centering offset from the target position.
    pub fn update(&mut self, dt_ms: f32, target_position: Vec2) {
        let rate = self.tween_factor * dt_ms / 1000.0;
        self.position.x += (target_position.x - self.view.w / 2.0 - self.position.x) * rate;
        self.position.y += (target_position.y - self.view.h / 2.0 - self.position.y) * rate;
    }
}

/// Advance a camera against an optional resolved target position. A missing
/// target is a traced no-op, never an error.
pub(crate) fn follow_target(camera: &mut Camera, dt_ms: f32, target: Option<Vec2>) {
    match target {
        Some(position) => camera.update(dt_ms, position),
        None => trace!(camera = %camera.name, "camera_target_missing"),
    }
}
