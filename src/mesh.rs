use gl_wrapper::api::GlApi;
use gl_wrapper::geometry::{GBError, Geometry, GeometryBuilder, VertexAttribute};

/// Corners of the quad in normalized device coordinates, three floats each.
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 12] = [
    0.5, 0.5, 0.0,   // top right
    0.5, -0.5, 0.0,  // bottom right
    -0.5, -0.5, 0.0, // bottom left
    -0.5, 0.5, 0.0,  // top left
];

/// Two triangles sharing the top right to bottom left diagonal.
#[rustfmt::skip]
pub const QUAD_INDICES: [u32; 6] = [
    0, 1, 3,
    1, 2, 3,
];

/// Uploads the quad with its position bound to attribute 0.
pub fn build_quad<G: GlApi>(gl: &G) -> Result<Geometry<G>, GBError> {
    GeometryBuilder::new(&QUAD_VERTICES, &QUAD_INDICES)
        .with_attribute(VertexAttribute::Vec3)
        .build(gl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_wrapper::recording::{GlCall, RecordingGl};
    use std::collections::HashSet;

    fn edges(triangle: &[u32]) -> Vec<(u32, u32)> {
        let mut edges = vec![
            (triangle[0], triangle[1]),
            (triangle[1], triangle[2]),
            (triangle[2], triangle[0]),
        ];
        for e in edges.iter_mut() {
            if e.0 > e.1 {
                *e = (e.1, e.0);
            }
        }
        edges
    }

    #[test]
    fn uploads_literal_quad() {
        let gl = RecordingGl::new();

        let quad = build_quad(&gl).unwrap();

        assert_eq!(quad.vertices(), 4);
        assert_eq!(quad.indices(), 6);
        assert_eq!(
            gl.buffer_floats(gl::ARRAY_BUFFER),
            vec![0.5, 0.5, 0.0, 0.5, -0.5, 0.0, -0.5, -0.5, 0.0, -0.5, 0.5, 0.0]
        );
        assert_eq!(
            gl.buffer_indices(gl::ELEMENT_ARRAY_BUFFER),
            vec![0, 1, 3, 1, 2, 3]
        );
        assert!(gl.calls().contains(&GlCall::VertexAttribPointer {
            index: 0,
            size: 3,
            stride: 12,
            offset: 0,
        }));
    }

    #[test]
    fn triangles_share_only_the_diagonal() {
        let (first, second) = QUAD_INDICES.split_at(3);

        let a: HashSet<_> = edges(first).into_iter().collect();
        let b: HashSet<_> = edges(second).into_iter().collect();

        assert_eq!(a.intersection(&b).collect::<Vec<_>>(), vec![&(1, 3)]);

        let used: HashSet<_> = QUAD_INDICES.iter().collect();
        assert_eq!(used.len(), 4);
    }

    #[test]
    fn diagonal_splits_the_quad() {
        let corner = |i: u32| {
            let i = i as usize * 3;
            (QUAD_VERTICES[i], QUAD_VERTICES[i + 1])
        };

        // 1 and 3 are opposite corners, 0 and 2 lie on either side of them.
        let (b, d) = (corner(1), corner(3));
        assert_eq!((b.0 + d.0, b.1 + d.1), (0.0, 0.0));

        let side = |p: (f32, f32)| (d.0 - b.0) * (p.1 - b.1) - (d.1 - b.1) * (p.0 - b.0);
        assert!(side(corner(0)) * side(corner(2)) < 0.0);
    }
}
