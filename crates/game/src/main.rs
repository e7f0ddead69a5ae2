use std::path::{Path, PathBuf};

use engine::{run_app, LoopConfig, Scene, MAX_DEBUG_LEVEL};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod keymap;
mod scenes;

use scenes::{PlayScene, TitleScene};

const KEYMAP_FILE: &str = "keybindings.json";

fn main() {
    init_tracing();
    info!("=== Bounce Startup ===");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = parse_args(&args, LoopConfig::default());
    config.window_title = "Bounce".to_string();
    config.screenshot_dir = PathBuf::from("screenshots");
    config.bindings = keymap::load_or_create(Path::new(KEYMAP_FILE));

    let scenes: Vec<Box<dyn Scene>> = vec![
        Box::new(TitleScene::new()),
        Box::new(PlayScene::new()),
    ];
    if let Err(err) = run_app(config, scenes, "title") {
        error!(error = %err, "startup_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// `key=value` command-line arguments in the original framework's shape:
/// `w=`/`width=`, `h=`/`height=`, `s=`/`scale=`, `d=`/`debug=` (0..=5),
/// `fps=`, `f=`/`fullscreen=` (`on`/`off`). Unknown keys and unparsable
/// values are warned about and skipped.
fn parse_args(args: &[String], mut config: LoopConfig) -> LoopConfig {
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            warn!(argument = %arg, "argument_ignored");
            continue;
        };
        match key.to_lowercase().as_str() {
            "w" | "width" => apply_parsed(value, arg, |width| config.viewport_width = width),
            "h" | "height" => apply_parsed(value, arg, |height| config.viewport_height = height),
            "s" | "scale" => apply_parsed(value, arg, |scale: f32| config.pixel_scale = scale),
            "fps" => apply_parsed(value, arg, |fps| config.target_fps = fps),
            "d" | "debug" => apply_parsed(value, arg, |debug: u8| {
                config.debug_level = if debug <= MAX_DEBUG_LEVEL { debug } else { 0 };
            }),
            "f" | "fullscreen" => config.fullscreen = value.eq_ignore_ascii_case("on"),
            _ => warn!(argument = %arg, "argument_ignored"),
        }
    }
    config
}

fn apply_parsed<T: std::str::FromStr>(value: &str, raw: &str, mut apply: impl FnMut(T)) {
    match value.parse::<T>() {
        Ok(parsed) => apply(parsed),
        Err(_) => warn!(argument = %raw, "argument_invalid"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn empty_args_keep_defaults() {
        let config = parse_args(&[], LoopConfig::default());
        assert_eq!(config.viewport_width, 320);
        assert_eq!(config.viewport_height, 240);
        assert_eq!(config.target_fps, 60);
        assert!(!config.fullscreen);
    }

    #[test]
    fn size_scale_and_fps_are_parsed() {
        let config = parse_args(
            &args(&["w=640", "h=480", "s=1.5", "fps=30"]),
            LoopConfig::default(),
        );
        assert_eq!(config.viewport_width, 640);
        assert_eq!(config.viewport_height, 480);
        assert!((config.pixel_scale - 1.5).abs() < f32::EPSILON);
        assert_eq!(config.target_fps, 30);
    }

    #[test]
    fn long_key_spellings_work_too() {
        let config = parse_args(
            &args(&["width=400", "height=300", "scale=3", "debug=2"]),
            LoopConfig::default(),
        );
        assert_eq!(config.viewport_width, 400);
        assert_eq!(config.viewport_height, 300);
        assert!((config.pixel_scale - 3.0).abs() < f32::EPSILON);
        assert_eq!(config.debug_level, 2);
    }

    #[test]
    fn out_of_range_debug_level_resets_to_zero() {
        let config = parse_args(&args(&["d=9"]), LoopConfig::default());
        assert_eq!(config.debug_level, 0);
        let config = parse_args(&args(&["d=5"]), LoopConfig::default());
        assert_eq!(config.debug_level, 5);
    }

    #[test]
    fn fullscreen_accepts_on_and_off() {
        let on = parse_args(&args(&["f=on"]), LoopConfig::default());
        assert!(on.fullscreen);
        let off = parse_args(&args(&["fullscreen=off"]), LoopConfig::default());
        assert!(!off.fullscreen);
    }

    #[test]
    fn malformed_arguments_are_skipped() {
        let config = parse_args(
            &args(&["w=abc", "bogus", "nope=1", "h=200"]),
            LoopConfig::default(),
        );
        assert_eq!(config.viewport_width, 320);
        assert_eq!(config.viewport_height, 200);
    }
}
