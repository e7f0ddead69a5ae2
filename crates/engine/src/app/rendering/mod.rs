mod draw;
mod renderer;
mod text;

pub use renderer::{compose_frame, format_debug_hud, FrameInfo, Renderer};
