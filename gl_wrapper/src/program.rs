use gl::types::{GLenum, GLuint};
use std::ffi::CString;
use std::fmt;
use thiserror::Error;

use crate::api::GlApi;

const EMPTY_LOG: &str = "(driver returned an empty info log)";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

pub struct ProgramBuilder<'a> {
    vert: &'a str,
    frag: &'a str,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(vert_src: &'a str, frag_src: &'a str) -> Self {
        Self {
            vert: vert_src,
            frag: frag_src,
        }
    }

    /// Compiles both stages and links them.
    ///
    /// Stage objects are deleted before returning, whatever the outcome.
    pub fn build<G: GlApi>(self, gl: &G) -> Result<Program<G>, PBError> {
        let vert_src =
            CString::new(self.vert).map_err(|_| PBError::InvalidSource(ShaderStage::Vertex))?;
        let frag_src =
            CString::new(self.frag).map_err(|_| PBError::InvalidSource(ShaderStage::Fragment))?;

        let vert = compile(gl, ShaderStage::Vertex, &vert_src)?;
        let frag = match compile(gl, ShaderStage::Fragment, &frag_src) {
            Ok(frag) => frag,
            Err(e) => {
                gl.delete_shader(vert);
                return Err(e);
            }
        };

        let program = gl.create_program();
        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !gl.link_status(program) {
            let log = non_empty(gl.program_info_log(program));
            gl.delete_program(program);

            return Err(PBError::Linking(log));
        }

        Ok(Program {
            gl: gl.clone(),
            id: program,
        })
    }
}

fn compile<G: GlApi>(gl: &G, stage: ShaderStage, src: &CString) -> Result<GLuint, PBError> {
    let shader = gl.create_shader(stage.gl_enum());
    gl.shader_source(shader, src);
    gl.compile_shader(shader);

    if !gl.compile_status(shader) {
        let log = non_empty(gl.shader_info_log(shader));
        gl.delete_shader(shader);

        return Err(PBError::Compilation { stage, log });
    }

    Ok(shader)
}

fn non_empty(log: String) -> String {
    if log.trim().is_empty() {
        EMPTY_LOG.to_string()
    } else {
        log
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PBError {
    #[error("{0} shader source contains a nul byte")]
    InvalidSource(ShaderStage),
    #[error("{stage} shader failed to compile:\n{log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("shader program failed to link:\n{0}")]
    Linking(String),
}

pub struct Program<G: GlApi> {
    gl: G,
    id: GLuint,
}

impl<G: GlApi> Program<G> {
    pub fn get_id(&self) -> GLuint {
        self.id
    }
}

impl<G: GlApi> Drop for Program<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.id)
    }
}
