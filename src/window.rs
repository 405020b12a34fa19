use std::any::Any;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasRawWindowHandle;
use thiserror::Error;
use winit::dpi::{PhysicalSize, Size};
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use gl_wrapper::api::{LoadError, NativeGl};

use crate::config::WindowConfig;
use crate::frame::{Platform, WindowSignal};

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("Failed to initialize windowing: {0}")]
    EventLoop(String),
    #[error("Failed to create window: {0}")]
    Display(String),
    #[error("Failed to create window: display offered no OpenGL framebuffer configs")]
    NoConfig,
    #[error("Failed to create window: display did not return one")]
    NoWindow,
    #[error("Window has a zero-sized surface")]
    ZeroSize,
    #[error("Failed to create window surface: {0}")]
    Surface(glutin::error::Error),
    #[error("Failed to create OpenGL context: {0}")]
    Context(glutin::error::Error),
    #[error("Failed to make OpenGL context current: {0}")]
    MakeCurrent(glutin::error::Error),
    #[error(transparent)]
    Loader(#[from] LoadError),
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &Config) -> Result<Self, WindowError> {
        let (width, height): (u32, u32) = window.inner_size().into();
        let raw_window_handle = window.raw_window_handle();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            NonZeroU32::new(width).ok_or(WindowError::ZeroSize)?,
            NonZeroU32::new(height).ok_or(WindowError::ZeroSize)?,
        );

        let surface = unsafe {
            config
                .display()
                .create_window_surface(config, &attrs)
                .map_err(WindowError::Surface)?
        };

        Ok(Self { window, surface })
    }
}

/// A winit window with a current OpenGL context, presented by swapping the
/// surface's buffers.
pub struct GlPlatform {
    gl_context: PossiblyCurrentContext,
    gl_window: GlWindow,
    event_loop: EventLoop<()>,
}

impl GlPlatform {
    /// Opens the window, makes a core profile context of the requested version
    /// current on it and loads the GL functions.
    pub fn bootstrap(config: &WindowConfig) -> Result<(Self, NativeGl), WindowError> {
        // winit panics instead of returning an error when no backend is available.
        let event_loop = quietly(EventLoop::new)
            .map_err(|payload| WindowError::EventLoop(panic_message(payload.as_ref())))?;
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(
                config.width,
                config.height,
            )))
            .with_title(&config.title);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let template = ConfigTemplateBuilder::new();

        let built = quietly(|| {
            display_builder.build(&event_loop, template, |configs| first_config(configs))
        });
        let (window, gl_config) = match built {
            Ok(result) => result.map_err(|e| WindowError::Display(e.to_string()))?,
            Err(payload) => return Err(config_panic_error(payload)),
        };

        let window = window.ok_or(WindowError::NoWindow)?;
        let handle = window.raw_window_handle();
        let gl_display = gl_config.display();

        let (major, minor) = config.gl_version;
        let context_attr = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(handle));

        let gl_window = GlWindow::new(window, &gl_config)?;

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attr) }
            .map_err(WindowError::Context)?
            .make_current(&gl_window.surface)
            .map_err(WindowError::MakeCurrent)?;

        let gl = unsafe {
            NativeGl::load_with(|s| match CString::new(s) {
                Ok(name) => gl_display.get_proc_address(name.as_c_str()).cast(),
                Err(_) => std::ptr::null(),
            })
        }?;

        let platform = Self {
            gl_context,
            gl_window,
            event_loop,
        };

        let (width, height) = platform.size();
        log::info!(
            "opened {width}x{height} window \"{}\" with OpenGL {major}.{minor} core",
            config.title
        );

        Ok((platform, gl))
    }

    pub fn size(&self) -> (u32, u32) {
        self.gl_window.window.inner_size().into()
    }
}

/// Raised from the config picker, which has to return a config.
struct NoConfig;

fn first_config<C>(mut configs: impl Iterator<Item = C>) -> C {
    configs
        .next()
        .unwrap_or_else(|| panic::panic_any(NoConfig))
}

fn config_panic_error(payload: Box<dyn Any + Send>) -> WindowError {
    if payload.is::<NoConfig>() {
        WindowError::NoConfig
    } else {
        WindowError::Display(panic_message(payload.as_ref()))
    }
}

/// Runs `f`, catching a panic without printing it through the panic hook.
fn quietly<T>(f: impl FnOnce() -> T) -> Result<T, Box<dyn Any + Send>> {
    static HOOK: Mutex<()> = Mutex::new(());

    let _swap = HOOK.lock().unwrap_or_else(PoisonError::into_inner);
    let hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(hook);

    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Platform for GlPlatform {
    type Error = glutin::error::Error;

    fn present(&mut self) -> Result<(), Self::Error> {
        self.gl_window.surface.swap_buffers(&self.gl_context)
    }

    fn poll_events(&mut self, signals: &mut Vec<WindowSignal>) {
        let gl_window = &self.gl_window;
        let gl_context = &self.gl_context;

        // Exiting right away makes winit dispatch what is pending and return.
        self.event_loop
            .run_return(|event, _window_target, control_flow| {
                control_flow.set_exit();

                if let Event::WindowEvent { event, .. } = event {
                    match event {
                        WindowEvent::Resized(size) => {
                            if let (Some(width), Some(height)) =
                                (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                            {
                                gl_window.surface.resize(gl_context, width, height);
                            }
                            signals.push(WindowSignal::Resized {
                                width: size.width,
                                height: size.height,
                            });
                        }
                        WindowEvent::CloseRequested => signals.push(WindowSignal::CloseRequested),
                        WindowEvent::KeyboardInput { input, .. } => {
                            if let Some(key) = input.virtual_keycode {
                                signals.push(WindowSignal::Key {
                                    key,
                                    state: input.state,
                                });
                            }
                        }
                        _ => (),
                    }
                }
            });
    }
}
