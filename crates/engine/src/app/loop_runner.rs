use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, WindowBuilder};

use super::input::{ActionStates, InputSnapshot, KeyBinding, KeyBindings, BINDING_COUNT};
use super::math::Rect;
use super::metrics::FpsCounter;
use super::rendering::{FrameInfo, Renderer};
use super::resources::ResourceStore;
use super::scene::{Scene, SceneCommand, SceneMachine, Tick};

pub const MAX_DEBUG_LEVEL: u8 = 5;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    /// Logical off-screen buffer size; the window is this times the scale.
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub pixel_scale: f32,
    pub target_fps: u32,
    pub debug_level: u8,
    pub fullscreen: bool,
    pub screenshot_dir: PathBuf,
    pub bindings: KeyBindings,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Game".to_string(),
            viewport_width: 320,
            viewport_height: 240,
            pixel_scale: 2.0,
            target_fps: 60,
            debug_level: 0,
            fullscreen: false,
            screenshot_dir: PathBuf::from("screenshots"),
            bindings: KeyBindings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

#[derive(Debug, Error)]
enum ScreenshotError {
    #[error("failed to create screenshot directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("render buffer size did not match the viewport")]
    BufferMismatch,
    #[error("failed to encode screenshot: {0}")]
    Encode(#[from] image::ImageError),
}

/// Register the given scenes (activating `default_scene`) and run the frame
/// loop until an exit is requested.
pub fn run_app(
    config: LoopConfig,
    scenes: Vec<Box<dyn Scene>>,
    default_scene: &str,
) -> Result<(), AppError> {
    let mut resources = ResourceStore::new();
    let mut machine = SceneMachine::new();
    for scene in scenes {
        let is_default = scene.name() == default_scene;
        machine.add(scene, is_default, &mut resources);
    }
    run_app_with_machine(config, machine, resources)
}

/// The single-threaded cooperative loop: input snapshot, state update,
/// render, then sleep to pace to the target frame interval. Exit requests
/// are polled at the top of each frame only.
pub fn run_app_with_machine(
    config: LoopConfig,
    mut machine: SceneMachine,
    mut resources: ResourceStore,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window_width = (config.viewport_width as f64 * config.pixel_scale as f64).max(1.0);
    let window_height = (config.viewport_height as f64 * config.pixel_scale as f64).max(1.0);
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(window_width, window_height))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    if config.fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, config.viewport_width, config.viewport_height)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let viewport = Rect::new(
        0.0,
        0.0,
        config.viewport_width as f32,
        config.viewport_height as f32,
    );
    let target_frame = target_frame_duration(config.target_fps);
    let mut collector = InputCollector::new(&config.bindings);
    let mut debug = config.debug_level.min(MAX_DEBUG_LEVEL);
    let mut paused = false;
    let mut fullscreen = config.fullscreen;
    let mut exit_requested = false;
    let mut fps_counter = FpsCounter::new();
    let mut previous_frame = Instant::now();
    let mut screenshot_index = 0u32;

    let debug_level = debug;
    info!(
        title = %config.window_title,
        viewport_width = config.viewport_width,
        viewport_height = config.viewport_height,
        pixel_scale = config.pixel_scale,
        target_fps = config.target_fps,
        debug = debug_level,
        "loop_config"
    );

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize_surface(new_size.width, new_size.height)
                        {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        collector.handle_key_event(&event);
                    }
                    WindowEvent::RedrawRequested => {
                        // Exit is polled here, at the top of the frame, never
                        // mid-frame.
                        if exit_requested {
                            info!(reason = "scene_request", "shutdown_requested");
                            window_target.exit();
                            return;
                        }

                        let frame_start = Instant::now();
                        let elapsed_ms = frame_start
                            .saturating_duration_since(previous_frame)
                            .as_secs_f32()
                            * 1000.0;
                        previous_frame = frame_start;

                        let snapshot = collector.snapshot();
                        if snapshot.quit_requested() {
                            exit_requested = true;
                        }
                        if snapshot.was_pressed(KeyBinding::Pause) {
                            paused = !paused;
                            info!(paused, "pause_toggled");
                        }
                        if snapshot.was_pressed(KeyBinding::Debug) {
                            debug = cycle_debug_level(debug);
                            let debug_level = debug;
                            info!(debug = debug_level, "debug_level");
                        }
                        if snapshot.was_pressed(KeyBinding::Fullscreen) {
                            fullscreen = !fullscreen;
                            window_for_loop.set_fullscreen(if fullscreen {
                                Some(Fullscreen::Borderless(None))
                            } else {
                                None
                            });
                        }
                        if snapshot.was_pressed(KeyBinding::Screenshot) {
                            if let Some(world) = machine.active_world_mut() {
                                world.suspend_rendering(true);
                            }
                            match save_screenshot(
                                &config.screenshot_dir,
                                &config.window_title,
                                screenshot_index,
                                &renderer,
                            ) {
                                Ok(path) => {
                                    screenshot_index = screenshot_index.wrapping_add(1);
                                    info!(path = %path.display(), "screenshot_saved");
                                }
                                Err(error) => error!(error = %error, "screenshot_failed"),
                            }
                            if let Some(world) = machine.active_world_mut() {
                                world.suspend_rendering(false);
                            }
                        }

                        if !paused {
                            machine.input(&snapshot);
                            let tick = Tick {
                                dt_ms: elapsed_ms,
                                viewport,
                                debug,
                            };
                            match machine.update(&tick) {
                                SceneCommand::SwitchTo(name) => {
                                    machine.switch_state(&name, &mut resources);
                                }
                                SceneCommand::Quit => exit_requested = true,
                                SceneCommand::None => {}
                            }
                        }

                        machine.render();
                        if let Some(world) = machine.active_world() {
                            let info = FrameInfo {
                                debug,
                                paused,
                                fps: fps_counter.fps(),
                            };
                            if let Err(error) = renderer.render_world(world, &mut resources, &info)
                            {
                                warn!(error = %error, "renderer_draw_failed");
                                window_target.exit();
                            }
                        }

                        if let Some(fps) = fps_counter.record_frame(Instant::now()) {
                            info!(
                                fps,
                                scene = machine.active_scene().unwrap_or("none"),
                                entity_count =
                                    machine.active_world().map(|w| w.entity_count()).unwrap_or(0),
                                rendered = renderer.rendered_last_frame(),
                                "loop_metrics"
                            );
                        }

                        // Pace to the target interval, corrected by what this
                        // frame already cost.
                        let frame_cost = frame_start.elapsed();
                        let sleep = pace_sleep(frame_cost, target_frame);
                        if sleep > Duration::ZERO {
                            thread::sleep(sleep);
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                machine.dispose_all();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Collects raw key events between frames and folds them into per-binding
/// held state plus single-frame pressed edges.
struct InputCollector {
    bindings_by_code: HashMap<KeyCode, KeyBinding>,
    states: ActionStates,
    pressed_edges: [bool; BINDING_COUNT],
    quit_requested: bool,
}

impl InputCollector {
    fn new(bindings: &KeyBindings) -> Self {
        let mut bindings_by_code = HashMap::new();
        for binding in KeyBinding::ALL {
            if let Some(code) = bindings.code_for(binding) {
                bindings_by_code.insert(code, binding);
            }
        }
        Self {
            bindings_by_code,
            states: ActionStates::default(),
            pressed_edges: [false; BINDING_COUNT],
            quit_requested: false,
        }
    }

    fn handle_key_event(&mut self, event: &winit::event::KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(binding) = self.bindings_by_code.get(&code).copied() else {
            return;
        };
        let is_pressed = event.state == ElementState::Pressed;
        self.handle_binding_state(binding, is_pressed);
    }

    fn handle_binding_state(&mut self, binding: KeyBinding, is_pressed: bool) {
        if is_pressed && !self.states.is_down(binding) {
            self.pressed_edges[binding.index()] = true;
        }
        self.states.set(binding, is_pressed);
        if binding == KeyBinding::Quit && is_pressed {
            self.quit_requested = true;
        }
    }

    fn snapshot(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(self.quit_requested, self.states, self.pressed_edges);
        self.pressed_edges = [false; BINDING_COUNT];
        snapshot
    }
}

fn target_frame_duration(target_fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / target_fps.max(1) as f64)
}

/// Remaining sleep after subtracting the measured frame cost.
fn pace_sleep(frame_cost: Duration, target_frame: Duration) -> Duration {
    target_frame.saturating_sub(frame_cost)
}

fn cycle_debug_level(debug: u8) -> u8 {
    if debug < MAX_DEBUG_LEVEL {
        debug + 1
    } else {
        0
    }
}

fn screenshot_file_name(title: &str, nanos: u128, index: u32) -> String {
    format!("{title}-sc-{nanos}-{index}.png")
}

fn save_screenshot(
    dir: &Path,
    title: &str,
    index: u32,
    renderer: &Renderer,
) -> Result<PathBuf, ScreenshotError> {
    std::fs::create_dir_all(dir).map_err(|source| ScreenshotError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let (width, height, rgba) = renderer.snapshot_rgba();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or(0);
    let path = dir.join(screenshot_file_name(title, nanos, index));
    let buffer =
        image::RgbaImage::from_raw(width, height, rgba).ok_or(ScreenshotError::BufferMismatch)?;
    buffer.save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_frame_duration_is_the_fps_reciprocal() {
        assert!((target_frame_duration(60).as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
        assert!((target_frame_duration(30).as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn zero_fps_falls_back_to_one() {
        assert_eq!(target_frame_duration(0), Duration::from_secs(1));
    }

    #[test]
    fn pace_sleep_subtracts_frame_cost() {
        let target = Duration::from_millis(16);
        assert_eq!(
            pace_sleep(Duration::from_millis(6), target),
            Duration::from_millis(10)
        );
    }

    #[test]
    fn pace_sleep_is_zero_when_over_budget() {
        let target = Duration::from_millis(16);
        assert_eq!(pace_sleep(Duration::from_millis(40), target), Duration::ZERO);
    }

    #[test]
    fn debug_level_cycles_through_zero_to_five() {
        let mut level = 0u8;
        let mut seen = Vec::new();
        for _ in 0..7 {
            level = cycle_debug_level(level);
            seen.push(level);
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 0, 1]);
    }

    #[test]
    fn pause_key_is_edge_triggered_per_snapshot() {
        let mut collector = InputCollector::new(&KeyBindings::default());
        collector.handle_binding_state(KeyBinding::Pause, true);

        let first = collector.snapshot();
        let second = collector.snapshot();
        assert!(first.was_pressed(KeyBinding::Pause));
        assert!(!second.was_pressed(KeyBinding::Pause));
        // The key is still held even though the edge was consumed.
        assert!(second.is_down(KeyBinding::Pause));
    }

    #[test]
    fn held_key_does_not_retrigger_without_release() {
        let mut collector = InputCollector::new(&KeyBindings::default());
        collector.handle_binding_state(KeyBinding::Debug, true);
        assert!(collector.snapshot().was_pressed(KeyBinding::Debug));

        collector.handle_binding_state(KeyBinding::Debug, true);
        assert!(!collector.snapshot().was_pressed(KeyBinding::Debug));

        collector.handle_binding_state(KeyBinding::Debug, false);
        collector.handle_binding_state(KeyBinding::Debug, true);
        assert!(collector.snapshot().was_pressed(KeyBinding::Debug));
    }

    #[test]
    fn directional_keys_report_held_state() {
        let mut collector = InputCollector::new(&KeyBindings::default());
        collector.handle_binding_state(KeyBinding::Left, true);
        collector.handle_binding_state(KeyBinding::Up, true);
        let snapshot = collector.snapshot();
        assert!(snapshot.is_down(KeyBinding::Left));
        assert!(snapshot.is_down(KeyBinding::Up));
        assert!(!snapshot.is_down(KeyBinding::Right));

        collector.handle_binding_state(KeyBinding::Left, false);
        assert!(!collector.snapshot().is_down(KeyBinding::Left));
    }

    #[test]
    fn quit_key_requests_exit_persistently() {
        let mut collector = InputCollector::new(&KeyBindings::default());
        collector.handle_binding_state(KeyBinding::Quit, true);
        collector.handle_binding_state(KeyBinding::Quit, false);
        assert!(collector.snapshot().quit_requested());
        assert!(collector.snapshot().quit_requested());
    }

    #[test]
    fn screenshot_file_name_carries_title_stamp_and_index() {
        assert_eq!(
            screenshot_file_name("Bounce", 12345, 2),
            "Bounce-sc-12345-2.png"
        );
    }

    #[test]
    fn config_default_matches_original_surface() {
        let config = LoopConfig::default();
        assert_eq!(config.viewport_width, 320);
        assert_eq!(config.viewport_height, 240);
        assert!((config.pixel_scale - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.target_fps, 60);
    }
}
