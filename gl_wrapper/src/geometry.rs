use gl::types::GLuint;
use thiserror::Error;

use crate::api::GlApi;

/// Builds an indexed mesh: one interleaved float vertex buffer plus a `u32`
/// element buffer, both bound to a fresh vertex array.
pub struct GeometryBuilder<'a> {
    attributes: Vec<VertexAttribute>,
    data: &'a [f32],
    indices: &'a [u32],
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(data: &'a [f32], indices: &'a [u32]) -> Self {
        Self {
            data,
            indices,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attr: VertexAttribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn build<G: GlApi>(self, gl: &G) -> Result<Geometry<G>, GBError> {
        let total_len: usize = self.attributes.iter().map(|a| a.size()).sum();

        if total_len == 0 || self.data.is_empty() || self.data.len() % total_len != 0 {
            return Err(GBError::InvalidDataLength);
        }

        let vertices = self.data.len() / total_len;

        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(GBError::InvalidIndexCount(self.indices.len()));
        }

        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertices) {
            return Err(GBError::IndexOutOfRange { index, vertices });
        }

        let vao = gl.gen_vertex_array();
        let vbo = gl.gen_buffer();
        let ebo = gl.gen_buffer();

        gl.bind_vertex_array(vao);

        gl.bind_buffer(gl::ARRAY_BUFFER, vbo);
        gl.buffer_data(
            gl::ARRAY_BUFFER,
            bytemuck::cast_slice(self.data),
            gl::STATIC_DRAW,
        );

        gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
        gl.buffer_data(
            gl::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(self.indices),
            gl::STATIC_DRAW,
        );

        let stride = (total_len * std::mem::size_of::<f32>()) as i32;
        let mut offset = 0;

        for (i, attr) in self.attributes.iter().enumerate() {
            gl.vertex_attrib_pointer(
                i as u32,
                attr.size() as i32,
                stride,
                offset * std::mem::size_of::<f32>(),
            );
            offset += attr.size();
            gl.enable_vertex_attrib_array(i as u32);
        }

        // The element buffer binding is VAO state, so only the array buffer is unbound.
        gl.bind_vertex_array(0);
        gl.bind_buffer(gl::ARRAY_BUFFER, 0);

        Ok(Geometry {
            gl: gl.clone(),
            vao,
            vbo,
            ebo,
            vertices,
            indices: self.indices.len(),
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GBError {
    #[error("Invalid data length for given attributes")]
    InvalidDataLength,
    #[error("Index count {0} does not describe whole triangles")]
    InvalidIndexCount(usize),
    #[error("Index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
}

#[derive(Debug, Copy, Clone)]
pub enum VertexAttribute {
    Float,
    Vec2,
    Vec3,
}

impl VertexAttribute {
    pub fn size(&self) -> usize {
        match self {
            VertexAttribute::Float => 1,
            VertexAttribute::Vec2 => 2,
            VertexAttribute::Vec3 => 3,
        }
    }
}

pub struct Geometry<G: GlApi> {
    gl: G,
    vao: GLuint,
    vbo: GLuint,
    ebo: GLuint,
    vertices: usize,
    indices: usize,
}

impl<G: GlApi> Geometry<G> {
    pub fn vao(&self) -> GLuint {
        self.vao
    }

    pub fn vertices(&self) -> usize {
        self.vertices
    }

    pub fn indices(&self) -> usize {
        self.indices
    }
}

impl<G: GlApi> Drop for Geometry<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.ebo);
        self.gl.delete_buffer(self.vbo);
        self.gl.delete_vertex_array(self.vao);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{GlCall, RecordingGl};

    #[rustfmt::skip]
    const TRIANGLE: [f32; 9] = [
        0.0, 0.5, 0.0,
        -0.5, -0.5, 0.0,
        0.5, -0.5, 0.0,
    ];

    #[test]
    fn uploads_vertices_and_indices() {
        let gl = RecordingGl::new();

        let geometry = GeometryBuilder::new(&TRIANGLE, &[0, 1, 2])
            .with_attribute(VertexAttribute::Vec3)
            .build(&gl)
            .unwrap();

        assert_eq!(geometry.vertices(), 3);
        assert_eq!(geometry.indices(), 3);
        assert_eq!(gl.buffer_floats(gl::ARRAY_BUFFER), TRIANGLE.to_vec());
        assert_eq!(gl.buffer_indices(gl::ELEMENT_ARRAY_BUFFER), vec![0, 1, 2]);

        let calls = gl.calls();
        assert!(calls.contains(&GlCall::VertexAttribPointer {
            index: 0,
            size: 3,
            stride: 12,
            offset: 0,
        }));
        assert!(calls.contains(&GlCall::EnableVertexAttribArray(0)));
    }

    #[test]
    fn interleaved_attribute_offsets() {
        let gl = RecordingGl::new();
        let data = [0.0; 10];

        let _geometry = GeometryBuilder::new(&data, &[0, 1, 1])
            .with_attribute(VertexAttribute::Vec2)
            .with_attribute(VertexAttribute::Vec3)
            .build(&gl)
            .unwrap();

        let pointers: Vec<_> = gl
            .calls()
            .into_iter()
            .filter(|c| matches!(c, GlCall::VertexAttribPointer { .. }))
            .collect();

        assert_eq!(
            pointers,
            vec![
                GlCall::VertexAttribPointer {
                    index: 0,
                    size: 2,
                    stride: 20,
                    offset: 0,
                },
                GlCall::VertexAttribPointer {
                    index: 1,
                    size: 3,
                    stride: 20,
                    offset: 8,
                },
            ]
        );
    }

    #[test]
    fn element_buffer_stays_bound_to_vao() {
        let gl = RecordingGl::new();

        let geometry = GeometryBuilder::new(&TRIANGLE, &[0, 1, 2])
            .with_attribute(VertexAttribute::Vec3)
            .build(&gl)
            .unwrap();

        let calls = gl.calls();
        let unbind_vao = calls
            .iter()
            .position(|c| *c == GlCall::BindVertexArray(0))
            .unwrap();

        assert!(calls[..unbind_vao].contains(&GlCall::BindVertexArray(geometry.vao())));
        assert!(!calls.contains(&GlCall::BindBuffer {
            target: gl::ELEMENT_ARRAY_BUFFER,
            buffer: 0,
        }));
    }

    #[test]
    fn rejects_bad_data() {
        let gl = RecordingGl::new();

        let err = GeometryBuilder::new(&[0.0; 4], &[0, 1, 0])
            .with_attribute(VertexAttribute::Vec3)
            .build(&gl)
            .err();
        assert_eq!(err, Some(GBError::InvalidDataLength));

        let err = GeometryBuilder::new(&TRIANGLE, &[0, 1])
            .with_attribute(VertexAttribute::Vec3)
            .build(&gl)
            .err();
        assert_eq!(err, Some(GBError::InvalidIndexCount(2)));

        let err = GeometryBuilder::new(&TRIANGLE, &[0, 1, 3])
            .with_attribute(VertexAttribute::Vec3)
            .build(&gl)
            .err();
        assert_eq!(
            err,
            Some(GBError::IndexOutOfRange {
                index: 3,
                vertices: 3
            })
        );

        assert!(gl.calls().is_empty());
    }

    #[test]
    fn drop_releases_buffers() {
        let gl = RecordingGl::new();

        let geometry = GeometryBuilder::new(&TRIANGLE, &[0, 1, 2])
            .with_attribute(VertexAttribute::Float)
            .with_attribute(VertexAttribute::Vec2)
            .build(&gl)
            .unwrap();
        let vao = geometry.vao();

        drop(geometry);

        let calls = gl.calls();
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, GlCall::DeleteBuffer(_)))
                .count(),
            2
        );
        assert_eq!(calls.last(), Some(&GlCall::DeleteVertexArray(vao)));
    }
}
