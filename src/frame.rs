use thiserror::Error;
use winit::event::{ElementState, VirtualKeyCode};

use gl_wrapper::api::GlApi;
use gl_wrapper::geometry::{GBError, Geometry};
use gl_wrapper::program::{PBError, Program, ProgramBuilder};
use gl_wrapper::renderer::{GlRenderer, Viewport};

use crate::input::InputState;
use crate::mesh::build_quad;
use crate::shaders::{ShaderSource, ShaderSourceError};

/// Window events the frame loop reacts to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WindowSignal {
    CloseRequested,
    Resized { width: u32, height: u32 },
    Key {
        key: VirtualKeyCode,
        state: ElementState,
    },
}

/// The presentation side of a window: swapping buffers and pumping events.
pub trait Platform {
    type Error: std::error::Error;

    fn present(&mut self) -> Result<(), Self::Error>;

    /// Appends every event that arrived since the last poll to `signals`.
    fn poll_events(&mut self, signals: &mut Vec<WindowSignal>);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    ShaderSource(#[from] ShaderSourceError),
    #[error(transparent)]
    Program(#[from] PBError),
    #[error("Could not upload quad: {0}")]
    Geometry(#[from] GBError),
}

/// Owns every GPU resource of the program and draws it once per iteration.
pub struct FrameLoop<G: GlApi> {
    renderer: GlRenderer<G>,
    quad: Geometry<G>,
    program: Program<G>,
    input: InputState,
    clear_color: [f32; 3],
    should_close: bool,
    signals: Vec<WindowSignal>,
}

impl<G: GlApi> FrameLoop<G> {
    /// Sets the viewport to the full `size`, uploads the quad and builds the
    /// shader program from `shaders`.
    pub fn new(
        gl: G,
        shaders: &dyn ShaderSource,
        clear_color: [f32; 3],
        size: (u32, u32),
    ) -> Result<Self, SetupError> {
        let mut renderer = GlRenderer::new(gl.clone());
        renderer.resize(size.0, size.1);

        let quad = build_quad(&gl)?;
        log::debug!(
            "uploaded quad: {} vertices, {} indices",
            quad.vertices(),
            quad.indices()
        );

        let vert = shaders.vertex()?;
        let frag = shaders.fragment()?;
        let program = ProgramBuilder::new(&vert, &frag).build(&gl)?;
        log::debug!("linked shader program {}", program.get_id());

        Ok(Self {
            renderer,
            quad,
            program,
            input: InputState::default(),
            clear_color,
            should_close: false,
            signals: Vec::new(),
        })
    }

    pub fn state(&self) -> LoopState {
        if self.should_close {
            LoopState::Closing
        } else {
            LoopState::Running
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.renderer.viewport()
    }

    /// Iterates until the window is asked to close, returning the number of
    /// frames drawn.
    pub fn run<P: Platform>(&mut self, platform: &mut P) -> Result<u64, P::Error> {
        let mut frames = 0;

        while self.state() == LoopState::Running {
            self.iterate(platform)?;
            frames += 1;
        }

        Ok(frames)
    }

    /// One frame: input check, draw, present, then event processing.
    pub fn iterate<P: Platform>(&mut self, platform: &mut P) -> Result<(), P::Error> {
        self.process_input();

        let [r, g, b] = self.clear_color;
        self.renderer.clear_color(r, g, b);
        self.renderer.draw(&self.quad, &self.program);

        platform.present()?;

        let mut signals = std::mem::take(&mut self.signals);
        platform.poll_events(&mut signals);
        for signal in signals.drain(..) {
            self.handle(signal);
        }
        self.signals = signals;

        Ok(())
    }

    fn process_input(&mut self) {
        if self.input.escape_pressed() {
            log::debug!("escape pressed, closing");
            self.should_close = true;
        }
    }

    fn handle(&mut self, signal: WindowSignal) {
        match signal {
            WindowSignal::CloseRequested => self.should_close = true,
            WindowSignal::Resized { width, height } => {
                // minimized
                if width != 0 && height != 0 {
                    self.renderer.resize(width, height);
                }
            }
            WindowSignal::Key { key, state } => self.input.key(key, state),
        }
    }
}
