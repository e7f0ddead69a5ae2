mod camera;
mod entity;
mod input;
mod layer;
mod loop_runner;
mod math;
mod metrics;
mod physics;
mod rendering;
mod resources;
mod scene;

pub use camera::Camera;
pub use entity::{
    BoundingBox, BoundingShape, ContactSides, Entity, EntityId, EntityIdAllocator, PhysicKind,
    RenderKind, Rgba,
};
pub use input::{
    key_code_from_name, key_code_name, ActionStates, InputSnapshot, KeyBinding, KeyBindings,
    BINDING_COUNT,
};
pub use layer::{Layer, LayerSet};
pub use loop_runner::{run_app, run_app_with_machine, AppError, LoopConfig, MAX_DEBUG_LEVEL};
pub use math::{Rect, Vec2};
pub use metrics::FpsCounter;
pub use physics::{integrate, CollisionSystem, STICKY_THRESHOLD};
pub use rendering::{compose_frame, format_debug_hud, FrameInfo, Renderer};
pub use resources::{ImageResource, ResourceError, ResourceStore};
pub use scene::{Scene, SceneCommand, SceneMachine, SceneWorld, Tick};
