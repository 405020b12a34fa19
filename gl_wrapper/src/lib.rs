pub mod api;
pub mod geometry;
pub mod program;
#[cfg(any(test, feature = "recording"))]
pub mod recording;
pub mod renderer;
