use super::math::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Physic integration class for an entity.
///
/// Only `Dynamic` integrates gravity and only `Dynamic` is the moving side of
/// a collision pair; `Static` never moves at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicKind {
    Static,
    Kinematic,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundingShape {
    Rectangle,
    Circle,
}

/// Bounding volume kept in sync with the owning entity's position and size.
///
/// Overlap testing is axis-aligned rectangle overlap for both shapes; the
/// shape selects the debug outline and the filled-draw form.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub rect: Rect,
    pub shape: BoundingShape,
}

impl BoundingBox {
    pub fn new(shape: BoundingShape) -> Self {
        Self {
            rect: Rect::default(),
            shape,
        }
    }

    pub fn update(&mut self, position: Vec2, size: Vec2) {
        self.rect = Rect::new(position.x, position.y, size.x, size.y);
    }
}

/// How an entity is put on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderKind {
    /// Filled bounding shape with a one-pixel outline.
    Filled,
    /// Image blit resolved through the resource store by key.
    Image(String),
    /// Outlined glyph string.
    Text(String),
}

pub type Rgba = [u8; 4];

/// Which side of a dynamic entity made contact during the last collision
/// scan. Reset per tested obstacle pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactSides {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl ContactSides {
    pub fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

/// The simulation unit: a flat bag of kinematic, physical and render
/// attributes. Built fluently, then added to exactly one scene world.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub kind: PhysicKind,

    pub position: Vec2,
    /// Staging buffer written by integration and collision resolution,
    /// committed back to `position` at the end of the collision pass.
    pub new_position: Vec2,
    pub size: Vec2,
    pub speed: Vec2,
    pub acceleration: Vec2,
    pub gravity: Vec2,
    pub mass: f32,
    pub friction: f32,
    pub elasticity: f32,

    pub bounding: BoundingBox,
    pub contact: ContactSides,
    pub constrain_to_viewport: bool,

    pub layer: i32,
    pub priority: i32,
    /// Entities on a fixed layer ignore camera translation.
    pub fixed: bool,
    pub color: Rgba,
    pub render: RenderKind,
    pub scale: f32,
    pub debug_info_offset: Vec2,
}

impl Entity {
    pub fn named(name: &str) -> Self {
        Self {
            id: EntityId(0),
            name: name.to_string(),
            kind: PhysicKind::Dynamic,
            position: Vec2::ZERO,
            new_position: Vec2::ZERO,
            size: Vec2::ZERO,
            speed: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            gravity: Vec2::ZERO,
            mass: 1.0,
            friction: 0.13,
            elasticity: 0.98,
            bounding: BoundingBox::new(BoundingShape::Rectangle),
            contact: ContactSides::default(),
            constrain_to_viewport: false,
            layer: 0,
            priority: 0,
            fixed: false,
            color: [255, 255, 255, 255],
            render: RenderKind::Filled,
            scale: 1.0,
            debug_info_offset: Vec2::new(10.0, 10.0),
        }
    }

    pub fn with_kind(mut self, kind: PhysicKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self.new_position = self.position;
        self.bounding.update(self.position, self.size);
        self
    }

    pub fn with_size(mut self, w: f32, h: f32) -> Self {
        self.size = Vec2::new(w, h);
        self.bounding.update(self.position, self.size);
        self
    }

    pub fn with_velocity(mut self, dx: f32, dy: f32) -> Self {
        self.speed = Vec2::new(dx, dy);
        self
    }

    pub fn with_acceleration(mut self, ax: f32, ay: f32) -> Self {
        self.acceleration = Vec2::new(ax, ay);
        self
    }

    pub fn with_gravity(mut self, gx: f32, gy: f32) -> Self {
        self.gravity = Vec2::new(gx, gy);
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn with_bounding_shape(mut self, shape: BoundingShape) -> Self {
        self.bounding.shape = shape;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_render(mut self, render: RenderKind) -> Self {
        self.render = render;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_viewport_constraint(mut self, constrained: bool) -> Self {
        self.constrain_to_viewport = constrained;
        self
    }

    pub fn with_debug_info_offset(mut self, x: f32, y: f32) -> Self {
        self.debug_info_offset = Vec2::new(x, y);
        self
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size.scale(0.5)
    }

    /// Teleport, keeping the staging buffer and bounding box in sync.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.new_position = self.position;
        self.bounding.update(self.position, self.size);
    }

    pub fn set_text(&mut self, content: String) {
        self.render = RenderKind::Text(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_ids_are_unique_and_increasing() {
        let mut allocator = EntityIdAllocator::default();
        assert_eq!(allocator.allocate(), EntityId(0));
        assert_eq!(allocator.allocate(), EntityId(1));
        assert_eq!(allocator.allocate(), EntityId(2));
    }

    #[test]
    fn builder_keeps_bounding_box_in_sync() {
        let e = Entity::named("wall")
            .with_position(4.0, 8.0)
            .with_size(16.0, 32.0);
        assert_eq!(e.bounding.rect, Rect::new(4.0, 8.0, 16.0, 32.0));
        assert_eq!(e.new_position, Vec2::new(4.0, 8.0));
    }

    #[test]
    fn builder_order_does_not_matter_for_bounds() {
        let sized_first = Entity::named("a").with_size(10.0, 10.0).with_position(5.0, 5.0);
        let placed_first = Entity::named("b").with_position(5.0, 5.0).with_size(10.0, 10.0);
        assert_eq!(sized_first.bounding.rect, placed_first.bounding.rect);
    }

    #[test]
    fn center_is_position_plus_half_size() {
        let e = Entity::named("ball").with_position(10.0, 20.0).with_size(8.0, 4.0);
        assert_eq!(e.center(), Vec2::new(14.0, 22.0));
    }

    #[test]
    fn move_to_updates_staging_and_bounds() {
        let mut e = Entity::named("ball").with_size(8.0, 8.0);
        e.move_to(100.0, 50.0);
        assert_eq!(e.position, Vec2::new(100.0, 50.0));
        assert_eq!(e.new_position, Vec2::new(100.0, 50.0));
        assert_eq!(e.bounding.rect.x, 100.0);
        assert_eq!(e.bounding.rect.y, 50.0);
    }

    #[test]
    fn defaults_match_documented_physical_parameters() {
        let e = Entity::named("thing");
        assert_eq!(e.kind, PhysicKind::Dynamic);
        assert_eq!(e.mass, 1.0);
        assert!((e.friction - 0.13).abs() < f32::EPSILON);
        assert!((e.elasticity - 0.98).abs() < f32::EPSILON);
        assert!(!e.contact.any());
    }
}
