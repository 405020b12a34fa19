//! Headless [`GlApi`] that records every call instead of talking to a driver.
//!
//! Shader compilation is emulated: a source compiles when it starts with a
//! `#version` directive and defines `main`. A program links when a compiled
//! vertex and fragment shader are attached, unless linking was made to fail
//! with [`RecordingGl::fail_link`].

use gl::types::{GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLuint};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CStr;
use std::rc::Rc;

use crate::api::GlApi;

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    GenBuffer(GLuint),
    DeleteBuffer(GLuint),
    BindBuffer { target: GLenum, buffer: GLuint },
    BufferData { target: GLenum, data: Vec<u8>, usage: GLenum },
    GenVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    BindVertexArray(GLuint),
    VertexAttribPointer { index: GLuint, size: GLint, stride: GLsizei, offset: usize },
    EnableVertexAttribArray(GLuint),
    CreateShader { kind: GLenum, shader: GLuint },
    ShaderSource { shader: GLuint, source: String },
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader { program: GLuint, shader: GLuint },
    LinkProgram(GLuint),
    UseProgram(GLuint),
    DeleteProgram(GLuint),
    Viewport { x: GLint, y: GLint, width: GLsizei, height: GLsizei },
    ClearColor([GLfloat; 4]),
    Clear(GLbitfield),
    DrawElements { mode: GLenum, count: GLsizei, index_type: GLenum, offset: usize },
}

#[derive(Default)]
struct ShaderState {
    kind: GLenum,
    source: String,
    compiled: bool,
}

#[derive(Default)]
struct ProgramState {
    shaders: Vec<GLuint>,
    linked: bool,
}

#[derive(Default)]
struct State {
    calls: Vec<GlCall>,
    next_id: GLuint,
    shaders: HashMap<GLuint, ShaderState>,
    programs: HashMap<GLuint, ProgramState>,
    fail_link: bool,
}

impl State {
    fn next_id(&mut self) -> GLuint {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct RecordingGl {
    state: Rc<RefCell<State>>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following link fail with a canned info log.
    pub fn fail_link(&self) {
        self.state.borrow_mut().fail_link = true;
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Contents of the last upload to `target`.
    pub fn buffer_bytes(&self, target: GLenum) -> Vec<u8> {
        self.state
            .borrow()
            .calls
            .iter()
            .rev()
            .find_map(|c| match c {
                GlCall::BufferData { target: t, data, .. } if *t == target => Some(data.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn buffer_floats(&self, target: GLenum) -> Vec<f32> {
        self.buffer_bytes(target)
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    pub fn buffer_indices(&self, target: GLenum) -> Vec<u32> {
        self.buffer_bytes(target)
            .chunks_exact(4)
            .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn compiles(source: &str) -> bool {
    source.trim_start().starts_with("#version") && source.contains("void main")
}

impl GlApi for RecordingGl {
    fn gen_buffer(&self) -> GLuint {
        let id = self.state.borrow_mut().next_id();
        self.record(GlCall::GenBuffer(id));
        id
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        self.record(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        self.record(GlCall::BufferData {
            target,
            data: data.to_vec(),
            usage,
        });
    }

    fn gen_vertex_array(&self) -> GLuint {
        let id = self.state.borrow_mut().next_id();
        self.record(GlCall::GenVertexArray(id));
        id
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        self.record(GlCall::DeleteVertexArray(vao));
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        self.record(GlCall::BindVertexArray(vao));
    }

    fn vertex_attrib_pointer(&self, index: GLuint, size: GLint, stride: GLsizei, offset: usize) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        let mut state = self.state.borrow_mut();
        let shader = state.next_id();
        state.shaders.insert(
            shader,
            ShaderState {
                kind,
                ..Default::default()
            },
        );
        state.calls.push(GlCall::CreateShader { kind, shader });
        shader
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        let source = source.to_string_lossy().to_string();
        let mut state = self.state.borrow_mut();
        if let Some(s) = state.shaders.get_mut(&shader) {
            s.source = source.clone();
        }
        state.calls.push(GlCall::ShaderSource { shader, source });
    }

    fn compile_shader(&self, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        if let Some(s) = state.shaders.get_mut(&shader) {
            s.compiled = compiles(&s.source);
        }
        state.calls.push(GlCall::CompileShader(shader));
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        if self.compile_status(shader) {
            String::new()
        } else {
            "0:1(1): error: syntax error, unexpected end of file".to_string()
        }
    }

    fn delete_shader(&self, shader: GLuint) {
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let program = state.next_id();
        state.programs.insert(program, ProgramState::default());
        state.calls.push(GlCall::CreateProgram(program));
        program
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        if let Some(p) = state.programs.get_mut(&program) {
            p.shaders.push(shader);
        }
        state.calls.push(GlCall::AttachShader { program, shader });
    }

    fn link_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        let attached = state
            .programs
            .get(&program)
            .map(|p| p.shaders.clone())
            .unwrap_or_default();

        let has_stage = |kind: GLenum| {
            attached.iter().any(|id| {
                state
                    .shaders
                    .get(id)
                    .map_or(false, |s| s.kind == kind && s.compiled)
            })
        };
        let linked =
            !state.fail_link && has_stage(gl::VERTEX_SHADER) && has_stage(gl::FRAGMENT_SHADER);

        if let Some(p) = state.programs.get_mut(&program) {
            p.linked = linked;
        }
        state.calls.push(GlCall::LinkProgram(program));
    }

    fn link_status(&self, program: GLuint) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: GLuint) -> String {
        if self.link_status(program) {
            String::new()
        } else {
            "error: linking with uncompiled/unspecialized shader".to_string()
        }
    }

    fn use_program(&self, program: GLuint) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: GLuint) {
        self.record(GlCall::DeleteProgram(program));
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: GLbitfield) {
        self.record(GlCall::Clear(mask));
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, index_type: GLenum, offset: usize) {
        self.record(GlCall::DrawElements {
            mode,
            count,
            index_type,
            offset,
        });
    }
}
