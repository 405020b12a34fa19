use thiserror::Error;

use crate::config::AppConfig;
use crate::frame::{FrameLoop, SetupError};
use crate::shaders::{EmbeddedShaders, ShaderSource};
use crate::window::{GlPlatform, WindowError};

/// Status the process exits with after a fatal error.
pub const FAILURE_EXIT_CODE: i32 = -1;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error("Failed to present frame: {0}")]
    Present(glutin::error::Error),
}

/// Status to exit with once `run` has returned.
pub fn exit_code(result: &Result<u64, AppError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => FAILURE_EXIT_CODE,
    }
}

/// Opens the window, builds the GPU resources and renders until the window is
/// closed. Returns the number of frames drawn.
pub fn run(config: &AppConfig) -> Result<u64, AppError> {
    let (mut platform, gl) = GlPlatform::bootstrap(&config.window)?;

    let shaders: &dyn ShaderSource = match &config.shader_files {
        Some(files) => {
            log::info!(
                "loading shaders from {:?} and {:?}",
                files.vertex,
                files.fragment
            );
            files
        }
        None => &EmbeddedShaders,
    };

    let mut frame_loop = FrameLoop::new(gl, shaders, config.clear_color, platform.size())?;

    let frames = frame_loop.run(&mut platform).map_err(AppError::Present)?;
    log::info!("window closed after {frames} frames, shutting down");

    // GPU resources go first, while the context is still alive.
    drop(frame_loop);
    drop(platform);

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_wrapper::program::PBError;

    #[test]
    fn clean_shutdown_exits_with_zero() {
        assert_eq!(exit_code(&Ok(0)), 0);
        assert_eq!(exit_code(&Ok(1200)), 0);
    }

    #[test]
    fn missing_backend_is_fatal() {
        let result = Err(AppError::from(WindowError::EventLoop(
            "Failed to initialize any backend!".to_string(),
        )));

        assert_eq!(exit_code(&result), FAILURE_EXIT_CODE);
        assert_eq!(exit_code(&result), -1);
    }

    #[test]
    fn missing_framebuffer_config_is_fatal() {
        let result = Err(AppError::from(WindowError::NoConfig));

        assert_eq!(exit_code(&result), -1);
    }

    #[test]
    fn setup_failure_is_fatal() {
        let result = Err(AppError::from(SetupError::from(PBError::Linking(
            "oops".to_string(),
        ))));

        assert_eq!(exit_code(&result), -1);
    }
}
