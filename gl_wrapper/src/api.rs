use gl::types::{GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLuint};
use std::ffi::{c_char, c_void, CStr};
use thiserror::Error;

/// The subset of OpenGL this crate drives.
///
/// Every wrapper type keeps a clone of the api it was created with and uses it
/// to release its handles on drop, so implementors should be cheap to clone.
pub trait GlApi: Clone {
    fn gen_buffer(&self) -> GLuint;
    fn delete_buffer(&self, buffer: GLuint);
    fn bind_buffer(&self, target: GLenum, buffer: GLuint);
    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum);

    fn gen_vertex_array(&self) -> GLuint;
    fn delete_vertex_array(&self, vao: GLuint);
    fn bind_vertex_array(&self, vao: GLuint);
    /// Float attribute, never normalized. `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer(&self, index: GLuint, size: GLint, stride: GLsizei, offset: usize);
    fn enable_vertex_attrib_array(&self, index: GLuint);

    fn create_shader(&self, kind: GLenum) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &CStr);
    fn compile_shader(&self, shader: GLuint);
    fn compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn link_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn clear_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat);
    fn clear(&self, mask: GLbitfield);
    /// `offset` is the byte offset into the bound element buffer.
    fn draw_elements(&self, mode: GLenum, count: GLsizei, index_type: GLenum, offset: usize);
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to load OpenGL function {0}")]
    MissingFunction(&'static str),
}

/// `GlApi` backed by the global function pointers of the `gl` crate.
///
/// Only obtainable through [`NativeGl::load_with`], which guarantees every
/// entry point used below has been resolved.
#[derive(Debug, Clone, Copy)]
pub struct NativeGl {
    _loaded: (),
}

impl NativeGl {
    /// Loads GL function pointers through `loader`.
    ///
    /// # Safety
    ///
    /// A GL context must be current on the calling thread, and must stay
    /// current for as long as the returned value (or anything built from it)
    /// is used.
    pub unsafe fn load_with<F>(loader: F) -> Result<Self, LoadError>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let required: [(&'static str, bool); 25] = [
            ("glGenBuffers", gl::GenBuffers::is_loaded()),
            ("glDeleteBuffers", gl::DeleteBuffers::is_loaded()),
            ("glBindBuffer", gl::BindBuffer::is_loaded()),
            ("glBufferData", gl::BufferData::is_loaded()),
            ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
            ("glDeleteVertexArrays", gl::DeleteVertexArrays::is_loaded()),
            ("glBindVertexArray", gl::BindVertexArray::is_loaded()),
            ("glVertexAttribPointer", gl::VertexAttribPointer::is_loaded()),
            (
                "glEnableVertexAttribArray",
                gl::EnableVertexAttribArray::is_loaded(),
            ),
            ("glCreateShader", gl::CreateShader::is_loaded()),
            ("glShaderSource", gl::ShaderSource::is_loaded()),
            ("glCompileShader", gl::CompileShader::is_loaded()),
            ("glGetShaderiv", gl::GetShaderiv::is_loaded()),
            ("glGetShaderInfoLog", gl::GetShaderInfoLog::is_loaded()),
            ("glDeleteShader", gl::DeleteShader::is_loaded()),
            ("glCreateProgram", gl::CreateProgram::is_loaded()),
            ("glAttachShader", gl::AttachShader::is_loaded()),
            ("glLinkProgram", gl::LinkProgram::is_loaded()),
            ("glGetProgramiv", gl::GetProgramiv::is_loaded()),
            ("glGetProgramInfoLog", gl::GetProgramInfoLog::is_loaded()),
            ("glUseProgram", gl::UseProgram::is_loaded()),
            ("glDeleteProgram", gl::DeleteProgram::is_loaded()),
            ("glViewport", gl::Viewport::is_loaded()),
            ("glClear", gl::Clear::is_loaded() && gl::ClearColor::is_loaded()),
            ("glDrawElements", gl::DrawElements::is_loaded()),
        ];

        if let Some((name, _)) = required.iter().find(|(_, loaded)| !loaded) {
            return Err(LoadError::MissingFunction(*name));
        }

        Ok(Self { _loaded: () })
    }
}

/// Trims an info log buffer at the first nul and converts it to a string.
fn log_to_string(mut buf: Vec<u8>) -> String {
    if let Some(end) = buf.iter().position(|b| *b == 0) {
        buf.truncate(end);
    }

    String::from_utf8_lossy(&buf).trim_end().to_string()
}

impl GlApi for NativeGl {
    fn gen_buffer(&self) -> GLuint {
        let mut id = 0;
        unsafe { gl::GenBuffers(1, (&mut id) as *mut u32) };
        id
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, (&buffer) as *const u32) }
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        unsafe { gl::BindBuffer(target, buffer) }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        unsafe {
            gl::BufferData(
                target,
                data.len() as isize,
                data.as_ptr() as *const c_void,
                usage,
            )
        }
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut id = 0;
        unsafe { gl::GenVertexArrays(1, (&mut id) as *mut u32) };
        id
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, (&vao) as *const u32) }
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn vertex_attrib_pointer(&self, index: GLuint, size: GLint, stride: GLsizei, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                size,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        unsafe {
            gl::ShaderSource(
                shader,
                1,
                (&source.as_ptr()) as *const *const c_char,
                std::ptr::null(),
            )
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        let mut success: i32 = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, (&mut success) as *mut i32) };
        success == gl::TRUE as i32
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut len: i32 = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, (&mut len) as *mut i32) };

        let mut buf = vec![0_u8; len.max(1) as usize];
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                buf.len() as i32,
                std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_char,
            )
        };

        log_to_string(buf)
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn link_status(&self, program: GLuint) -> bool {
        let mut success: i32 = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, (&mut success) as *mut i32) };
        success == gl::TRUE as i32
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut len: i32 = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, (&mut len) as *mut i32) };

        let mut buf = vec![0_u8; len.max(1) as usize];
        unsafe {
            gl::GetProgramInfoLog(
                program,
                buf.len() as i32,
                std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_char,
            )
        };

        log_to_string(buf)
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn clear_color(&self, r: GLfloat, g: GLfloat, b: GLfloat, a: GLfloat) {
        unsafe { gl::ClearColor(r, g, b, a) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) }
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, index_type: GLenum, offset: usize) {
        unsafe { gl::DrawElements(mode, count, index_type, offset as *const c_void) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_log_is_cut_at_nul() {
        let buf = b"0:1(1): error: syntax error\n\0\0garbage".to_vec();

        assert_eq!(log_to_string(buf), "0:1(1): error: syntax error");
    }

    #[test]
    fn empty_info_log() {
        assert_eq!(log_to_string(vec![0]), "");
    }
}
