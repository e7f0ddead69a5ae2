use engine::{
    Camera, Entity, InputSnapshot, KeyBinding, PhysicKind, Rect, RenderKind, ResourceStore, Scene,
    SceneCommand, SceneWorld, Tick,
};
use rand::Rng;
use tracing::{info, warn};

const PLAYER_NAME: &str = "player";
const SCORE_NAME: &str = "score";
const ENEMY_PREFIX: &str = "enemy_";
const WAVE_SIZE: u32 = 10;
const FIRE_WAVE_SIZE: u32 = 5;
const PLAYER_IMAGE_KEY: &str = "images/player_ball";
const ENEMY_IMAGE_KEY: &str = "images/enemy_ball";
const WALL_THICKNESS: f32 = 4.0;
const PLAY_AREA: Rect = Rect::new(0.0, 0.0, 320.0, 240.0);

/// The bouncing-balls playground: a player, four static walls, a wave of
/// dynamic balls and a HUD score line, with a soft-tween camera on the
/// player.
pub struct PlayScene {
    uid: u64,
    score: u32,
    spawned: u32,
    images_available: bool,
    switch_to_title: bool,
}

impl PlayScene {
    pub fn new() -> Self {
        Self {
            uid: 0,
            score: 0,
            spawned: 0,
            images_available: false,
            switch_to_title: false,
        }
    }

    fn spawn_wave(&mut self, world: &mut SceneWorld, count: u32) {
        // Bulk mutation: keep the render pass away until the wave is in.
        world.suspend_rendering(true);
        let mut rng = rand::rng();
        for _ in 0..count {
            self.spawned += 1;
            let name = format!("{ENEMY_PREFIX}{}", self.spawned);
            let render = if self.images_available {
                RenderKind::Image(ENEMY_IMAGE_KEY.to_string())
            } else {
                RenderKind::Filled
            };
            let enemy = Entity::named(&name)
                .with_size(16.0, 16.0)
                .with_position(
                    rng.random_range(WALL_THICKNESS..PLAY_AREA.w - 24.0),
                    rng.random_range(WALL_THICKNESS..PLAY_AREA.h - 24.0),
                )
                .with_velocity(
                    rng.random_range(-0.2..0.2f32),
                    rng.random_range(-0.2..0.2f32),
                )
                .with_color([
                    rng.random_range(64u8..=255),
                    32,
                    rng.random_range(64u8..=255),
                    255,
                ])
                .with_friction(1.0)
                .with_elasticity(1.0)
                .with_layer(1)
                .with_priority(self.spawned as i32)
                .with_bounding_shape(engine::BoundingShape::Circle)
                .with_render(render);
            world.add_collidable_entity(enemy);
        }
        world.suspend_rendering(false);
    }

    fn remove_enemies(&self, world: &mut SceneWorld, limit: Option<u32>) -> u32 {
        let mut doomed: Vec<String> = world
            .entity_names()
            .filter(|name| name.starts_with(ENEMY_PREFIX))
            .map(str::to_string)
            .collect();
        doomed.sort();
        if let Some(limit) = limit {
            doomed.truncate(limit as usize);
        }
        world.suspend_rendering(true);
        let mut removed = 0;
        for name in doomed {
            if world.remove_entity(&name) {
                removed += 1;
            }
        }
        world.suspend_rendering(false);
        removed
    }

    fn add_walls(&self, world: &mut SceneWorld) {
        let walls = [
            ("wall_top", 0.0, 0.0, PLAY_AREA.w, WALL_THICKNESS),
            (
                "wall_bottom",
                0.0,
                PLAY_AREA.h - WALL_THICKNESS,
                PLAY_AREA.w,
                WALL_THICKNESS,
            ),
            ("wall_left", 0.0, 0.0, WALL_THICKNESS, PLAY_AREA.h),
            (
                "wall_right",
                PLAY_AREA.w - WALL_THICKNESS,
                0.0,
                WALL_THICKNESS,
                PLAY_AREA.h,
            ),
        ];
        for (name, x, y, w, h) in walls {
            world.add_collidable_entity(
                Entity::named(name)
                    .with_kind(PhysicKind::Static)
                    .with_position(x, y)
                    .with_size(w, h)
                    .with_elasticity(1.0)
                    .with_color([96, 96, 112, 255])
                    .with_layer(1),
            );
        }
    }
}

impl Default for PlayScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for PlayScene {
    fn name(&self) -> &str {
        "play"
    }

    fn initialize(&mut self, resources: &mut ResourceStore) {
        resources.register(PLAYER_IMAGE_KEY, "res/images/blue-ball-24x24.png");
        resources.register(ENEMY_IMAGE_KEY, "res/images/red-ball-16x16.png");
    }

    fn create(&mut self, world: &mut SceneWorld, resources: &mut ResourceStore, uid: u64) {
        self.uid = uid;
        self.score = 0;
        self.spawned = 0;

        // Ball art is optional; plain shapes stand in when it is absent.
        self.images_available = match resources.image(PLAYER_IMAGE_KEY) {
            Ok(_) => true,
            Err(error) => {
                warn!(error = %error, "ball_art_missing");
                false
            }
        };

        self.add_walls(world);

        let player_render = if self.images_available {
            RenderKind::Image(PLAYER_IMAGE_KEY.to_string())
        } else {
            RenderKind::Filled
        };
        let player = world.add_collidable_entity(
            Entity::named(PLAYER_NAME)
                .with_size(24.0, 24.0)
                .with_position(PLAY_AREA.w / 2.0 - 12.0, PLAY_AREA.h / 2.0 - 12.0)
                .with_color([48, 200, 72, 255])
                .with_friction(0.98)
                .with_elasticity(0.98)
                .with_scale(0.95)
                .with_layer(10)
                .with_priority(100)
                .with_viewport_constraint(true)
                .with_bounding_shape(engine::BoundingShape::Circle)
                .with_render(player_render),
        );

        world.add_entity(
            Entity::named(SCORE_NAME)
                .with_kind(PhysicKind::Static)
                .with_position(12.0, 12.0)
                .with_fixed(true)
                .with_layer(20)
                .with_color([255, 255, 255, 255])
                .with_render(RenderKind::Text("00000".to_string())),
        );

        world.add_camera(
            Camera::named("cam01")
                .with_target(player)
                .with_tween(0.02)
                .with_view(PLAY_AREA),
        );

        self.spawn_wave(world, WAVE_SIZE);
        info!(uid, entity_count = world.entity_count(), "play_created");
    }

    fn dispose(&mut self, world: &mut SceneWorld) {
        info!(entity_count = world.entity_count(), "play_disposed");
    }

    fn input(&mut self, world: &mut SceneWorld, input: &InputSnapshot) {
        if let Some(player) = world.entity_mut(PLAYER_NAME) {
            if input.is_down(KeyBinding::Left) {
                player.speed.x = -0.1;
            }
            if input.is_down(KeyBinding::Right) {
                player.speed.x = 0.1;
            }
            if input.is_down(KeyBinding::Up) {
                player.speed.y = -0.1;
            }
            if input.is_down(KeyBinding::Down) {
                player.speed.y = 0.1;
            }
        }

        if input.was_pressed(KeyBinding::Fire1) {
            self.spawn_wave(world, FIRE_WAVE_SIZE);
        }
        if input.was_pressed(KeyBinding::Fire2) {
            self.remove_enemies(world, Some(FIRE_WAVE_SIZE));
        }
        if input.was_pressed(KeyBinding::Reset) {
            self.remove_enemies(world, None);
            self.spawn_wave(world, WAVE_SIZE);
            self.score = 0;
        }
        if input.was_pressed(KeyBinding::Fire4) {
            self.switch_to_title = true;
        }
    }

    fn update(&mut self, world: &mut SceneWorld, tick: &Tick) -> SceneCommand {
        world.step_physics(tick);

        self.score = self.score.wrapping_add(1) % 100_000;
        let score_line = format!("{:05}", self.score);
        if let Some(score) = world.entity_mut(SCORE_NAME) {
            score.set_text(score_line);
        }

        if self.switch_to_title {
            self.switch_to_title = false;
            return SceneCommand::SwitchTo("title".to_string());
        }
        SceneCommand::None
    }
}

/// Attract screen: static text on a fixed layer, switches into the
/// playground on FIRE1.
pub struct TitleScene {
    start_requested: bool,
}

impl TitleScene {
    pub fn new() -> Self {
        Self {
            start_requested: false,
        }
    }
}

impl Default for TitleScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for TitleScene {
    fn name(&self) -> &str {
        "title"
    }

    fn initialize(&mut self, _resources: &mut ResourceStore) {}

    fn create(&mut self, world: &mut SceneWorld, _resources: &mut ResourceStore, uid: u64) {
        world.add_entity(
            Entity::named("title_text")
                .with_kind(PhysicKind::Static)
                .with_position(104.0, 80.0)
                .with_fixed(true)
                .with_layer(20)
                .with_scale(2.0)
                .with_color([255, 200, 0, 255])
                .with_render(RenderKind::Text("BOUNCE".to_string())),
        );
        world.add_entity(
            Entity::named("hint_text")
                .with_kind(PhysicKind::Static)
                .with_position(76.0, 140.0)
                .with_fixed(true)
                .with_layer(20)
                .with_priority(1)
                .with_color([200, 200, 200, 255])
                .with_render(RenderKind::Text("PRESS FIRE1 TO PLAY".to_string())),
        );
        info!(uid, "title_created");
    }

    fn dispose(&mut self, _world: &mut SceneWorld) {}

    fn input(&mut self, _world: &mut SceneWorld, input: &InputSnapshot) {
        if input.was_pressed(KeyBinding::Fire1) {
            self.start_requested = true;
        }
    }

    fn update(&mut self, _world: &mut SceneWorld, _tick: &Tick) -> SceneCommand {
        if self.start_requested {
            self.start_requested = false;
            return SceneCommand::SwitchTo("play".to_string());
        }
        SceneCommand::None
    }
}
