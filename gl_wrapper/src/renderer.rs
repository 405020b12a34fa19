use crate::api::GlApi;
use crate::geometry::Geometry;
use crate::program::Program;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

pub struct GlRenderer<G: GlApi> {
    gl: G,
    viewport: Viewport,
}

impl<G: GlApi> GlRenderer<G> {
    pub fn new(gl: G) -> Self {
        Self {
            gl,
            viewport: Viewport::default(),
        }
    }

    /// Activates `program`, binds the geometry's vertex array and draws all of
    /// its indices as triangles.
    pub fn draw(&mut self, geometry: &Geometry<G>, program: &Program<G>) {
        self.gl.use_program(program.get_id());
        self.gl.bind_vertex_array(geometry.vao());
        self.gl.draw_elements(
            gl::TRIANGLES,
            geometry.indices() as i32,
            gl::UNSIGNED_INT,
            0,
        );
    }

    /// Maps rendering to the whole `width` x `height` surface. GL takes signed
    /// sizes, so sides past `i32::MAX` are clamped.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport {
            x: 0,
            y: 0,
            width,
            height,
        };
        self.gl.viewport(0, 0, gl_size(width), gl_size(height));
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clear_color(&self, r: f32, g: f32, b: f32) {
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear(gl::COLOR_BUFFER_BIT);
    }
}

fn gl_size(side: u32) -> i32 {
    i32::try_from(side).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryBuilder, VertexAttribute};
    use crate::program::ProgramBuilder;
    use crate::recording::{GlCall, RecordingGl};

    #[test]
    fn resize_covers_whole_surface() {
        let gl = RecordingGl::new();
        let mut renderer = GlRenderer::new(gl.clone());

        renderer.resize(800, 600);
        renderer.resize(1024, 300);

        assert_eq!(
            renderer.viewport(),
            Viewport {
                x: 0,
                y: 0,
                width: 1024,
                height: 300
            }
        );
        assert_eq!(
            gl.calls().last(),
            Some(&GlCall::Viewport {
                x: 0,
                y: 0,
                width: 1024,
                height: 300
            })
        );
    }

    #[test]
    fn oversized_resize_is_clamped() {
        let gl = RecordingGl::new();
        let mut renderer = GlRenderer::new(gl.clone());

        renderer.resize(u32::MAX, 2_147_483_648);

        assert_eq!(
            gl.calls(),
            vec![GlCall::Viewport {
                x: 0,
                y: 0,
                width: i32::MAX,
                height: i32::MAX
            }]
        );
        assert_eq!(renderer.viewport().width, u32::MAX);
    }

    #[test]
    fn clear_is_opaque() {
        let gl = RecordingGl::new();
        let renderer = GlRenderer::new(gl.clone());

        renderer.clear_color(0.5, 0.8, 0.8);

        assert_eq!(
            gl.calls(),
            vec![
                GlCall::ClearColor([0.5, 0.8, 0.8, 1.0]),
                GlCall::Clear(gl::COLOR_BUFFER_BIT)
            ]
        );
    }

    #[test]
    fn draw_binds_and_draws_indices() {
        let gl = RecordingGl::new();
        let geometry = GeometryBuilder::new(&[0.0; 8], &[0, 1, 3, 1, 2, 3])
            .with_attribute(VertexAttribute::Vec2)
            .build(&gl)
            .unwrap();
        let program = ProgramBuilder::new(
            "#version 330 core\nvoid main() {}",
            "#version 330 core\nvoid main() {}",
        )
        .build(&gl)
        .unwrap();
        let mut renderer = GlRenderer::new(gl.clone());
        gl.clear_calls();

        renderer.draw(&geometry, &program);

        assert_eq!(
            gl.calls(),
            vec![
                GlCall::UseProgram(program.get_id()),
                GlCall::BindVertexArray(geometry.vao()),
                GlCall::DrawElements {
                    mode: gl::TRIANGLES,
                    count: 6,
                    index_type: gl::UNSIGNED_INT,
                    offset: 0,
                },
            ]
        );
    }
}
