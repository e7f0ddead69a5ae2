use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::trace;

use super::entity::{Entity, EntityId, PhysicKind, Rgba};
use super::math::{Rect, Vec2};

/// Reflected velocities below this magnitude snap to exact rest.
pub const STICKY_THRESHOLD: f32 = 0.004;
/// Upper bound applied to speed and acceleration components.
const COMPONENT_LIMIT: f32 = 0.5;
/// Width of the normalized band inside which a contact counts as a corner.
const CORNER_BAND: f32 = 0.1;

const COLLIDING_TINT: Rgba = [224, 48, 48, 255];
const CLEAR_TINT: Rgba = [48, 200, 72, 255];
const OBSTACLE_TINT: Rgba = [72, 72, 72, 255];

/// Collision detection and response over a scene's entity set.
///
/// Obstacles are the static list plus kinematic members of the integration
/// list; only `Dynamic` entities are ever the moving side of a pair. The
/// broad phase is the full dynamic x obstacle cross product — no spatial
/// index at the entity counts this engine targets.
#[derive(Debug)]
pub struct CollisionSystem {
    integrated: Vec<EntityId>,
    statics: Vec<EntityId>,
    rng: Pcg32,
}

/// Immutable per-pass snapshot of one obstacle. Resolution never mutates the
/// obstacle side, so a copy of its bounds and elasticity is all it needs.
#[derive(Debug, Clone, Copy)]
struct ObstacleView {
    id: EntityId,
    bounds: Rect,
    elasticity: f32,
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self::seeded(Pcg32::from_rng(&mut rand::rng()))
    }

    /// Deterministic corner tie-breaking for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::seeded(Pcg32::seed_from_u64(seed))
    }

    fn seeded(rng: Pcg32) -> Self {
        Self {
            integrated: Vec::new(),
            statics: Vec::new(),
            rng,
        }
    }

    /// Register an entity with the collision pass. Callers must not register
    /// the same entity twice (no de-duplication; a double registration would
    /// double-integrate it).
    ///
    /// Panics on a non-positive mass or degenerate size: those are setup
    /// errors that would otherwise surface as NaNs mid-frame.
    pub fn add_collider(&mut self, entity: &Entity) {
        assert!(
            entity.mass > 0.0,
            "collider '{}' must have positive mass",
            entity.name
        );
        assert!(
            entity.size.x > 0.0 && entity.size.y > 0.0,
            "collider '{}' must have a non-degenerate size",
            entity.name
        );
        match entity.kind {
            PhysicKind::Static => self.statics.push(entity.id),
            PhysicKind::Dynamic | PhysicKind::Kinematic => self.integrated.push(entity.id),
        }
    }

    pub fn remove_collider(&mut self, id: EntityId) {
        self.integrated.retain(|candidate| *candidate != id);
        self.statics.retain(|candidate| *candidate != id);
    }

    pub fn clear(&mut self) {
        self.integrated.clear();
        self.statics.clear();
    }

    pub fn collider_count(&self) -> usize {
        self.integrated.len() + self.statics.len()
    }

    /// One full physics frame: integrate, resolve, commit.
    pub fn step(
        &mut self,
        entities: &mut HashMap<EntityId, Entity>,
        viewport: Rect,
        dt_ms: f32,
        debug: u8,
    ) {
        self.integrate_all(entities, dt_ms);
        self.collide(entities, viewport, debug);
    }

    /// Advance kinematics of every registered collider into `new_position`.
    /// Bounding boxes stay at the pre-move `position` until the collision
    /// pass commits; the narrow phase depends on that ordering.
    pub fn integrate_all(&self, entities: &mut HashMap<EntityId, Entity>, dt_ms: f32) {
        for id in self.integrated.iter().chain(self.statics.iter()) {
            if let Some(entity) = entities.get_mut(id) {
                integrate(entity, dt_ms);
            }
        }
    }

    /// Resolve overlaps for every dynamic entity against every obstacle, then
    /// commit `new_position` into `position`.
    pub fn collide(&mut self, entities: &mut HashMap<EntityId, Entity>, viewport: Rect, debug: u8) {
        let obstacles: Vec<ObstacleView> = self
            .statics
            .iter()
            .chain(self.integrated.iter().filter(|id| {
                matches!(
                    entities.get(*id).map(|e| e.kind),
                    Some(PhysicKind::Kinematic)
                )
            }))
            .filter_map(|id| {
                entities.get(id).map(|e| ObstacleView {
                    id: *id,
                    bounds: e.bounding.rect,
                    elasticity: e.elasticity,
                })
            })
            .collect();

        let mut obstacle_tints: Vec<(EntityId, Rgba)> = Vec::new();

        for id in &self.integrated {
            let Some(dynamic) = entities.get_mut(id) else {
                continue;
            };
            if dynamic.kind != PhysicKind::Dynamic {
                continue;
            }

            if dynamic.constrain_to_viewport {
                constrain_to_viewport(dynamic, viewport);
            }

            for obstacle in &obstacles {
                if obstacle.id == *id {
                    continue;
                }
                dynamic.contact = Default::default();
                if dynamic.bounding.rect.intersects(&obstacle.bounds) {
                    compute_restitution(dynamic, obstacle, &mut self.rng);
                    trace!(
                        entity = %dynamic.name,
                        x = dynamic.new_position.x,
                        y = dynamic.new_position.y,
                        top = dynamic.contact.top,
                        bottom = dynamic.contact.bottom,
                        left = dynamic.contact.left,
                        right = dynamic.contact.right,
                        "collision"
                    );
                    if debug >= 1 {
                        dynamic.color = COLLIDING_TINT;
                        obstacle_tints.push((obstacle.id, COLLIDING_TINT));
                    }
                } else if debug > 2 {
                    dynamic.color = CLEAR_TINT;
                    obstacle_tints.push((obstacle.id, OBSTACLE_TINT));
                }
            }
        }

        for (id, tint) in obstacle_tints {
            if let Some(obstacle) = entities.get_mut(&id) {
                obstacle.color = tint;
            }
        }

        // Commit: the staged positions become visible only now.
        for id in &self.integrated {
            if let Some(entity) = entities.get_mut(id) {
                entity.position = entity.new_position;
                entity.bounding.update(entity.position, entity.size);
            }
        }
    }
}

/// Advance one entity's kinematics by `dt_ms` into its staging position.
pub fn integrate(entity: &mut Entity, dt_ms: f32) {
    match entity.kind {
        PhysicKind::Dynamic => {
            entity.acceleration = limit_components(entity.acceleration, COMPONENT_LIMIT);
            entity.speed += (entity.acceleration + entity.gravity) * dt_ms * entity.mass;
            entity.speed = limit_components(entity.speed, COMPONENT_LIMIT);
            entity.speed = entity.speed * entity.friction;
            entity.new_position += entity.speed * dt_ms;
        }
        PhysicKind::Kinematic => {
            entity.acceleration = limit_components(entity.acceleration, COMPONENT_LIMIT);
            entity.speed += entity.acceleration * dt_ms * entity.mass;
            entity.speed = limit_components(entity.speed, COMPONENT_LIMIT);
            entity.speed = entity.speed * entity.friction;
            entity.new_position += entity.speed * dt_ms;
        }
        PhysicKind::Static => {
            entity.new_position = entity.position;
        }
    }
    entity.bounding.update(entity.position, entity.size);
}

/// Upper bound only: negative components pass through. Reflected speeds
/// (see the side cases below) rely on surviving this limiter.
fn limit_components(v: Vec2, max: f32) -> Vec2 {
    Vec2::new(v.x.min(max), v.y.min(max))
}

/// Clamp a staged position to the viewport edges. Horizontal clamps leave
/// `speed.x` alone; vertical clamps zero `speed.y` — an intentional
/// asymmetry carried from the original response code.
fn constrain_to_viewport(entity: &mut Entity, viewport: Rect) {
    if entity.new_position.x < viewport.x {
        entity.new_position.x = viewport.x;
    }
    if entity.new_position.y < viewport.y {
        entity.new_position.y = viewport.y;
        entity.speed.y = 0.0;
    }
    if entity.new_position.x > viewport.w - entity.size.x {
        entity.new_position.x = viewport.w - entity.size.x;
    }
    if entity.new_position.y >= viewport.h - entity.size.y {
        entity.new_position.y = viewport.h - entity.size.y;
        entity.speed.y = 0.0;
    }
}

/// Side-resolution between a dynamic entity and one obstacle.
///
/// Contact flags name the side of the dynamic entity that touched: pushed
/// out to the obstacle's right edge means its left side made contact.
fn compute_restitution(dynamic: &mut Entity, obstacle: &ObstacleView, rng: &mut Pcg32) {
    let center = dynamic.center();
    let half_w = obstacle.bounds.w * 0.5;
    let half_h = obstacle.bounds.h * 0.5;
    let obstacle_center_x = obstacle.bounds.x + half_w;
    let obstacle_center_y = obstacle.bounds.y + half_h;

    // Normalized entry direction from the dynamic entity toward the obstacle.
    let dx = (obstacle_center_x - center.x) / half_w;
    let dy = (obstacle_center_y - center.y) / half_h;
    let restitution = dynamic.elasticity.min(obstacle.elasticity);

    if (dx.abs() - dy.abs()).abs() < CORNER_BAND {
        // Corner entry: push out on both axes, then reflect the incoming
        // velocity on exactly one randomly chosen axis.
        let incoming = dynamic.speed;

        if dx < 0.0 {
            dynamic.new_position.x = obstacle.bounds.right();
            dynamic.contact.left = true;
        } else {
            dynamic.new_position.x = obstacle.bounds.x - dynamic.size.x;
            dynamic.contact.right = true;
        }
        if dy < 0.0 {
            dynamic.new_position.y = obstacle.bounds.bottom();
            dynamic.contact.top = true;
        } else {
            dynamic.new_position.y = obstacle.bounds.y - dynamic.size.y;
            dynamic.contact.bottom = true;
        }
        dynamic.speed = Vec2::ZERO;
        dynamic.acceleration = Vec2::ZERO;

        if rng.random_bool(0.5) {
            dynamic.speed.x = -incoming.x * restitution;
            if dynamic.speed.x.abs() < STICKY_THRESHOLD {
                dynamic.speed.x = 0.0;
                dynamic.acceleration.x = 0.0;
            }
        } else {
            dynamic.speed.y = -incoming.y * restitution;
            if dynamic.speed.y.abs() < STICKY_THRESHOLD {
                dynamic.speed.y = 0.0;
                dynamic.acceleration.y = 0.0;
            }
        }
    } else if dx.abs() > dy.abs() {
        // Side entry: x-axis only. The obstacle's elasticity alone scales
        // the reflection here, unlike the corner case.
        if dx < 0.0 {
            dynamic.new_position.x = obstacle.bounds.right();
            dynamic.contact.left = true;
        } else {
            dynamic.new_position.x = obstacle.bounds.x - dynamic.size.x;
            dynamic.contact.right = true;
        }
        dynamic.speed.x = -dynamic.speed.x * obstacle.elasticity;
        if dynamic.speed.x.abs() < STICKY_THRESHOLD {
            dynamic.speed.x = 0.0;
            dynamic.acceleration.x = 0.0;
        }
    } else {
        // Top/bottom entry: y-axis only.
        if dy < 0.0 {
            dynamic.new_position.y = obstacle.bounds.bottom();
            dynamic.contact.top = true;
        } else {
            dynamic.new_position.y = obstacle.bounds.y - dynamic.size.y;
            dynamic.contact.bottom = true;
        }
        dynamic.speed.y = -dynamic.speed.y * obstacle.elasticity;
        if dynamic.speed.y.abs() < STICKY_THRESHOLD {
            dynamic.speed.y = 0.0;
            dynamic.acceleration.y = 0.0;
        }
    }
}
