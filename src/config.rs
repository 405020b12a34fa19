use crate::args::Args;
use crate::shaders::FileShaders;

/// OpenGL version requested from the driver, always a core profile.
pub const GL_VERSION: (u8, u8) = (3, 3);

/// Pale cyan.
pub const CLEAR_COLOR: [f32; 3] = [0.5, 0.8, 0.8];

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub gl_version: (u8, u8),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub clear_color: [f32; 3],
    /// `None` uses the embedded shaders.
    pub shader_files: Option<FileShaders>,
    pub log_filter: Option<String>,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let shader_files = match (args.vertex_shader, args.fragment_shader) {
            (Some(vertex), Some(fragment)) => Some(FileShaders { vertex, fragment }),
            _ => None,
        };

        Self {
            window: WindowConfig {
                width: args.width,
                height: args.height,
                title: args.title,
                gl_version: GL_VERSION,
            },
            clear_color: CLEAR_COLOR,
            shader_files,
            log_filter: args.log,
        }
    }
}
