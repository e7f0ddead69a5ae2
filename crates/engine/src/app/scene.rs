use std::collections::HashMap;

use tracing::{error, info, warn};

use super::camera::{follow_target, Camera};
use super::entity::{Entity, EntityId, EntityIdAllocator};
use super::input::InputSnapshot;
use super::layer::LayerSet;
use super::math::Rect;
use super::physics::CollisionSystem;
use super::resources::ResourceStore;

/// What a scene asks the loop to do after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(String),
    Quit,
}

/// Per-frame simulation context handed to scene updates.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    pub dt_ms: f32,
    pub viewport: Rect,
    pub debug: u8,
}

/// A named game state. `initialize` registers resources, `create` builds the
/// entity set (exactly once, on first activation), `dispose` runs when the
/// scene is switched away from, and `input`/`update` run every frame while
/// active.
pub trait Scene {
    fn name(&self) -> &str;
    fn initialize(&mut self, resources: &mut ResourceStore);
    fn create(&mut self, world: &mut SceneWorld, resources: &mut ResourceStore, uid: u64);
    fn dispose(&mut self, world: &mut SceneWorld);
    fn input(&mut self, world: &mut SceneWorld, input: &InputSnapshot);
    fn update(&mut self, world: &mut SceneWorld, tick: &Tick) -> SceneCommand;
    fn render(&mut self, _world: &SceneWorld) {}
}

/// Entity storage for one scene: the name-unique entity map, the layer set
/// driving draw order, the cameras and the collision system.
#[derive(Debug)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: HashMap<EntityId, Entity>,
    names: HashMap<String, EntityId>,
    layers: LayerSet,
    cameras: Vec<Camera>,
    active_camera: Option<usize>,
    collision: CollisionSystem,
    render_suspended: bool,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWorld {
    pub fn new() -> Self {
        Self {
            allocator: EntityIdAllocator::default(),
            entities: HashMap::new(),
            names: HashMap::new(),
            layers: LayerSet::default(),
            cameras: Vec::new(),
            active_camera: None,
            collision: CollisionSystem::new(),
            render_suspended: false,
        }
    }

    /// Deterministic collision tie-breaking for tests.
    pub fn with_collision_seed(seed: u64) -> Self {
        let mut world = Self::new();
        world.collision = CollisionSystem::with_seed(seed);
        world
    }

    /// Add an entity to the map and its layer bucket. A live entity with the
    /// same name is replaced entirely (map, layers, collider lists).
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        if self.names.contains_key(&entity.name) {
            warn!(name = %entity.name, "entity_name_replaced");
            self.remove_entity(&entity.name.clone());
        }
        let id = self.allocator.allocate();
        entity.id = id;
        self.layers
            .insert(id, entity.layer, entity.priority, entity.fixed);
        self.names.insert(entity.name.clone(), id);
        self.entities.insert(id, entity);
        id
    }

    /// Add an entity and register it with the collision pass in one go.
    pub fn add_collidable_entity(&mut self, entity: Entity) -> EntityId {
        let id = self.add_entity(entity);
        if let Some(entity) = self.entities.get(&id) {
            self.collision.add_collider(entity);
        }
        id
    }

    /// Remove an entity from the map, its layer bucket and the collider
    /// lists in one step, so the render pass can never see a half-removed
    /// entity.
    pub fn remove_entity(&mut self, name: &str) -> bool {
        let Some(id) = self.names.remove(name) else {
            return false;
        };
        self.layers.remove(id);
        self.collision.remove_collider(id);
        self.entities.remove(&id);
        true
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.names.get(name).and_then(|id| self.entities.get(id))
    }

    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        let id = self.names.get(name)?;
        self.entities.get_mut(id)
    }

    pub fn entity_by_id(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_by_id_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    /// The first camera added becomes the active one.
    pub fn add_camera(&mut self, camera: Camera) {
        if self.active_camera.is_none() {
            self.active_camera = Some(self.cameras.len());
        }
        self.cameras.push(camera);
    }

    pub fn active_camera(&self) -> Option<&Camera> {
        self.active_camera.and_then(|index| self.cameras.get(index))
    }

    pub fn activate_camera(&mut self, name: &str) -> bool {
        match self.cameras.iter().position(|camera| camera.name == name) {
            Some(index) => {
                self.active_camera = Some(index);
                true
            }
            None => {
                error!(camera = name, "camera_missing");
                false
            }
        }
    }

    /// Suspend or resume the render pass around bulk entity mutations.
    pub fn suspend_rendering(&mut self, suspended: bool) {
        self.render_suspended = suspended;
    }

    pub fn render_suspended(&self) -> bool {
        self.render_suspended
    }

    pub fn collider_count(&self) -> usize {
        self.collision.collider_count()
    }

    /// One physics frame: integrate, resolve collisions, commit positions,
    /// then advance every camera toward its tracked entity.
    pub fn step_physics(&mut self, tick: &Tick) {
        self.collision
            .step(&mut self.entities, tick.viewport, tick.dt_ms, tick.debug);
        for camera in &mut self.cameras {
            let target = camera
                .tracked
                .and_then(|id| self.entities.get(&id))
                .map(|entity| entity.position);
            follow_target(camera, tick.dt_ms, target);
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.names.clear();
        self.layers.clear();
        self.cameras.clear();
        self.active_camera = None;
        self.collision.clear();
        self.render_suspended = false;
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    created: bool,
}

/// Named scene registry with exactly one active scene.
///
/// `create` runs once per scene, on first activation; revisits run
/// `initialize` only, so a scene's entities survive being switched away
/// from and back to.
pub struct SceneMachine {
    states: HashMap<String, SceneRuntime>,
    active: Option<String>,
    next_uid: u64,
}

impl Default for SceneMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneMachine {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            active: None,
            next_uid: 0,
        }
    }

    /// Register a scene; when `make_default` it is initialized, created and
    /// activated immediately.
    pub fn add(&mut self, scene: Box<dyn Scene>, make_default: bool, resources: &mut ResourceStore) {
        let name = scene.name().to_string();
        info!(scene = %name, default = make_default, "scene_registered");
        self.states.insert(
            name.clone(),
            SceneRuntime {
                scene,
                world: SceneWorld::new(),
                created: false,
            },
        );
        if make_default {
            self.activate(&name, resources);
        }
    }

    /// Switch to a registered scene by name. An unknown name is logged and
    /// ignored; the current scene stays active.
    pub fn switch_state(&mut self, name: &str, resources: &mut ResourceStore) {
        if !self.states.contains_key(name) {
            error!(scene = name, "state_missing");
            return;
        }
        if let Some(active) = self.active.take() {
            if let Some(runtime) = self.states.get_mut(&active) {
                runtime.scene.dispose(&mut runtime.world);
            }
        }
        self.activate(name, resources);
        info!(scene = name, "scene_switched");
    }

    fn activate(&mut self, name: &str, resources: &mut ResourceStore) {
        let uid = self.next_uid;
        if let Some(runtime) = self.states.get_mut(name) {
            runtime.scene.initialize(resources);
            if !runtime.created {
                runtime.scene.create(&mut runtime.world, resources, uid);
                runtime.created = true;
                self.next_uid = self.next_uid.saturating_add(1);
            }
            self.active = Some(name.to_string());
        }
    }

    pub fn active_scene(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_world(&self) -> Option<&SceneWorld> {
        let active = self.active.as_ref()?;
        self.states.get(active).map(|runtime| &runtime.world)
    }

    pub fn active_world_mut(&mut self) -> Option<&mut SceneWorld> {
        let active = self.active.as_ref()?;
        self.states.get_mut(active).map(|runtime| &mut runtime.world)
    }

    /// Delegate input to the active scene.
    pub fn input(&mut self, snapshot: &InputSnapshot) {
        if let Some(runtime) = self.active_runtime_mut() {
            runtime.scene.input(&mut runtime.world, snapshot);
        }
    }

    /// Delegate the update to the active scene.
    pub fn update(&mut self, tick: &Tick) -> SceneCommand {
        match self.active_runtime_mut() {
            Some(runtime) => runtime.scene.update(&mut runtime.world, tick),
            None => SceneCommand::None,
        }
    }

    /// Give the active scene its pre-draw hook.
    pub fn render(&mut self) {
        if let Some(runtime) = self.active_runtime_mut() {
            runtime.scene.render(&runtime.world);
        }
    }

    /// Dispose every created scene; used on shutdown.
    pub fn dispose_all(&mut self) {
        for runtime in self.states.values_mut() {
            if runtime.created {
                runtime.scene.dispose(&mut runtime.world);
            }
        }
        self.active = None;
    }

    fn active_runtime_mut(&mut self) -> Option<&mut SceneRuntime> {
        let active = self.active.as_ref()?;
        self.states.get_mut(active)
    }
}
