//! Where the GLSL for the quad program comes from.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Provides the source text of the two program stages.
pub trait ShaderSource {
    fn vertex(&self) -> Result<Cow<'_, str>, ShaderSourceError>;
    fn fragment(&self) -> Result<Cow<'_, str>, ShaderSourceError>;
}

/// Pass-through vertex stage and a solid orange fragment stage, compiled
/// into the binary.
#[derive(Debug, Copy, Clone, Default)]
pub struct EmbeddedShaders;

impl ShaderSource for EmbeddedShaders {
    fn vertex(&self) -> Result<Cow<'_, str>, ShaderSourceError> {
        Ok(Cow::Borrowed(include_str!("gl_shaders/quad.vert")))
    }

    fn fragment(&self) -> Result<Cow<'_, str>, ShaderSourceError> {
        Ok(Cow::Borrowed(include_str!("gl_shaders/solid.frag")))
    }
}

/// Reads both stages from disk every time they are requested.
#[derive(Debug, Clone)]
pub struct FileShaders {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl FileShaders {
    fn read(path: &Path) -> Result<Cow<'static, str>, ShaderSourceError> {
        std::fs::read_to_string(path)
            .map(Cow::Owned)
            .map_err(|source| ShaderSourceError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl ShaderSource for FileShaders {
    fn vertex(&self) -> Result<Cow<'_, str>, ShaderSourceError> {
        Self::read(&self.vertex)
    }

    fn fragment(&self) -> Result<Cow<'_, str>, ShaderSourceError> {
        Self::read(&self.fragment)
    }
}

#[derive(Debug, Error)]
pub enum ShaderSourceError {
    #[error("Could not read shader {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}
