pub mod app;
pub mod args;
pub mod config;
pub mod frame;
pub mod input;
pub mod logging;
pub mod mesh;
pub mod shaders;
pub mod window;
