pub mod app;

pub use app::{
    compose_frame, format_debug_hud, integrate, key_code_from_name, key_code_name, run_app,
    run_app_with_machine, ActionStates, AppError, BoundingBox, BoundingShape, Camera,
    CollisionSystem, ContactSides, Entity, EntityId, EntityIdAllocator, FpsCounter, FrameInfo,
    ImageResource, InputSnapshot, KeyBinding, KeyBindings, Layer, LayerSet, LoopConfig, PhysicKind,
    Rect, RenderKind, Renderer, ResourceError, ResourceStore, Rgba, Scene, SceneCommand,
    SceneMachine, SceneWorld, Tick, Vec2, BINDING_COUNT, MAX_DEBUG_LEVEL, STICKY_THRESHOLD,
};
