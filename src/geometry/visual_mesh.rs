use crate::math::{Point, Point2, Real, Vector};

/// A renderable triangle mesh with per-vertex attributes and a bounding
/// sphere radius.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VisualMesh {
    /// The vertex positions.
    pub vertices: Vec<Point>,
    /// The per-vertex (face) normals.
    pub normals: Vec<Vector>,
    /// The per-vertex texture coordinates.
    pub texcoords: Vec<Point2>,
    /// The triangle index buffer.
    pub indices: Vec<[u32; 3]>,
    /// Radius of a sphere centered at the origin containing the mesh.
    pub bounding_radius: Real,
}

impl VisualMesh {
    /// The mesh of a die: a `[-1, 1]³` cube with flat-shaded faces and
    /// texture coordinates addressing one face each of a 4×3 atlas.
    ///
    /// The buffers are constants; every call returns the same data.
    pub fn unit_die() -> Self {
        const A: Real = 1.0;

        let vertices = vec![
            // -y face
            Point::new(-A, -A, -A),
            Point::new(A, -A, -A),
            Point::new(A, -A, A),
            Point::new(-A, -A, A),
            // +y face
            Point::new(A, A, -A),
            Point::new(-A, A, -A),
            Point::new(-A, A, A),
            Point::new(A, A, A),
            // -x face
            Point::new(-A, A, -A),
            Point::new(-A, -A, -A),
            Point::new(-A, -A, A),
            Point::new(-A, A, A),
            // +x face
            Point::new(A, -A, -A),
            Point::new(A, A, -A),
            Point::new(A, A, A),
            Point::new(A, -A, A),
            // -z face
            Point::new(A, -A, -A),
            Point::new(-A, -A, -A),
            Point::new(-A, A, -A),
            Point::new(A, A, -A),
            // +z face
            Point::new(-A, -A, A),
            Point::new(A, -A, A),
            Point::new(A, A, A),
            Point::new(-A, A, A),
        ];

        let normals = vec![
            Vector::new(0.0, -1.0, 0.0),
            Vector::new(0.0, -1.0, 0.0),
            Vector::new(0.0, -1.0, 0.0),
            Vector::new(0.0, -1.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(-1.0, 0.0, 0.0),
            Vector::new(-1.0, 0.0, 0.0),
            Vector::new(-1.0, 0.0, 0.0),
            Vector::new(-1.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, 0.0, -1.0),
            Vector::new(0.0, 0.0, -1.0),
            Vector::new(0.0, 0.0, -1.0),
            Vector::new(0.0, 0.0, -1.0),
            Vector::new(0.0, 0.0, 1.0),
            Vector::new(0.0, 0.0, 1.0),
            Vector::new(0.0, 0.0, 1.0),
            Vector::new(0.0, 0.0, 1.0),
        ];

        let texcoords = vec![
            Point2::new(0.25, 0.0),
            Point2::new(0.5, 0.0),
            Point2::new(0.5, 0.3333),
            Point2::new(0.25, 0.3333),
            Point2::new(0.25, 0.6666),
            Point2::new(0.5, 0.6666),
            Point2::new(0.5, 1.0),
            Point2::new(0.25, 1.0),
            Point2::new(0.0, 0.3333),
            Point2::new(0.25, 0.3333),
            Point2::new(0.25, 0.6666),
            Point2::new(0.0, 0.6666),
            Point2::new(0.5, 0.3333),
            Point2::new(0.75, 0.3333),
            Point2::new(0.75, 0.6666),
            Point2::new(0.5, 0.6666),
            Point2::new(0.25, 0.3333),
            Point2::new(0.5, 0.3333),
            Point2::new(0.5, 0.6666),
            Point2::new(0.25, 0.6666),
            Point2::new(0.75, 0.3333),
            Point2::new(1.0, 0.3333),
            Point2::new(1.0, 0.6666),
            Point2::new(0.75, 0.6666),
        ];

        let indices = vec![
            [0, 1, 2],
            [0, 2, 3],
            [4, 5, 6],
            [4, 6, 7],
            [8, 9, 10],
            [8, 10, 11],
            [12, 13, 14],
            [12, 14, 15],
            [16, 17, 18],
            [16, 18, 19],
            [20, 21, 22],
            [20, 22, 23],
        ];

        Self {
            vertices,
            normals,
            texcoords,
            indices,
            // Slightly above the circumscribed sphere of the cube.
            bounding_radius: 1.1 * (3.0 as Real).sqrt() * A,
        }
    }
}
