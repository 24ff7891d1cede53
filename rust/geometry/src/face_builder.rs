// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Procedural face construction
//!
//! Appends planar faces to a mesh whose base arrays are already filled in.
//! Each face is fan-triangulated from its first vertex and emitted as a single
//! face element with (point, normal, color) index triples. Every polygon side
//! becomes a two-point polyline sharing the face color. Planarity and winding
//! are not checked: the caller supplies consistent indices.

use crate::channels::{Presence, Rgba};
use crate::mesh::{Mesh, MeshElement, SelectionBits, Winding};
use nalgebra::{Point3, Vector3};

/// Append one planar polygon (3 or more point indices, in winding order).
///
/// Fewer than three points produce nothing.
pub fn add_planar_face(mesh: &mut Mesh, points: &[u32], normal: u32, color: u32) {
    if points.len() < 3 {
        return;
    }

    // Faces carry normals and colors, polylines carry colors.
    mesh.channels.faces.normals = Presence::Present;
    mesh.channels.faces.colors = Presence::Present;
    mesh.channels.lines.colors = Presence::Present;

    let triangle_count = points.len() - 2;
    let mut indices = Vec::with_capacity(triangle_count * 9);
    for i in 1..points.len() - 1 {
        for p in [points[0], points[i], points[i + 1]] {
            indices.extend_from_slice(&[p, normal, color]);
        }
    }
    mesh.face_elements.push(MeshElement::new(indices));
    pad_bits(&mut mesh.face_elements_bits, mesh.face_elements.len() - 1);
    mesh.face_elements_bits
        .push(SelectionBits::FACE_HAS_MEASUREMENT_DATA | SelectionBits::FACE_PLANAR);

    for i in 0..points.len() {
        let start = points[i];
        let end = points[(i + 1) % points.len()];
        mesh.polyline_elements
            .push(MeshElement::new(vec![start, color, end, color]));
        pad_bits(&mut mesh.polyline_elements_bits, mesh.polyline_elements.len() - 1);
        mesh.polyline_elements_bits
            .push(SelectionBits::EDGE_HAS_MEASUREMENT_DATA);
    }
}

/// Append a planar quadrilateral: two triangles {0,1,2} and {0,2,3} plus four edges.
#[inline]
pub fn add_quad_face(mesh: &mut Mesh, quad: [u32; 4], normal: u32, color: u32) {
    add_planar_face(mesh, &quad, normal, color);
}

/// Untagged elements created earlier keep a zero tag so bits stay aligned.
fn pad_bits(bits: &mut Vec<SelectionBits>, len: usize) {
    if bits.len() < len {
        bits.resize(len, SelectionBits::NONE);
    }
}

/// Corner indices of each box side, counter-clockwise seen from outside.
const BOX_SIDES: [([u32; 4], [f32; 3]); 6] = [
    ([0, 3, 2, 1], [0.0, 0.0, -1.0]),
    ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
    ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
    ([3, 7, 6, 2], [0.0, 1.0, 0.0]),
    ([0, 4, 7, 3], [-1.0, 0.0, 0.0]),
    ([1, 2, 6, 5], [1.0, 0.0, 0.0]),
];

/// Build a closed axis-aligned box between `min` and `max`.
///
/// Sides are emitted in the order -Z, +Z, -Y, +Y, -X, +X and take their
/// color from `side_colors` in the same order.
pub fn build_box(min: Point3<f32>, max: Point3<f32>, side_colors: [Rgba; 6]) -> Mesh {
    let mut mesh = Mesh::new();
    mesh.points = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    mesh.colors = side_colors.to_vec();
    mesh.winding = Winding::CounterClockwise;
    mesh.manifold = true;

    for (side, (corners, [nx, ny, nz])) in BOX_SIDES.iter().enumerate() {
        mesh.normals.push(Vector3::new(*nx, *ny, *nz));
        add_quad_face(&mut mesh, *corners, side as u32, side as u32);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ElementKind;

    fn quad_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        mesh.normals = vec![Vector3::z()];
        mesh.colors = vec![Rgba::WHITE];
        mesh
    }

    #[test]
    fn test_quad_appends_one_face_and_four_edges() {
        let mut mesh = quad_mesh();
        add_quad_face(&mut mesh, [0, 1, 2, 3], 0, 0);

        assert_eq!(mesh.face_elements.len(), 1);
        assert_eq!(mesh.face_elements[0].indices.len(), 6 * 3);
        assert_eq!(mesh.polyline_elements.len(), 4);
        for edge in &mesh.polyline_elements {
            assert_eq!(edge.indices.len(), 2 * 2);
        }
        assert_eq!(mesh.face_elements_bits.len(), 1);
        assert_eq!(mesh.polyline_elements_bits.len(), 4);
    }

    #[test]
    fn test_quad_fans_from_first_vertex() {
        let mut mesh = quad_mesh();
        add_quad_face(&mut mesh, [10, 11, 12, 13], 7, 9);

        let indices = &mesh.face_elements[0].indices;
        let points: Vec<u32> = indices.chunks_exact(3).map(|t| t[0]).collect();
        assert_eq!(points, vec![10, 11, 12, 10, 12, 13]);
        assert!(indices.chunks_exact(3).all(|t| t[1] == 7 && t[2] == 9));
    }

    #[test]
    fn test_quad_tags() {
        let mut mesh = quad_mesh();
        add_quad_face(&mut mesh, [0, 1, 2, 3], 0, 0);

        let face_bits = mesh.face_elements_bits[0];
        assert!(face_bits.contains(SelectionBits::FACE_HAS_MEASUREMENT_DATA));
        assert!(face_bits.contains(SelectionBits::FACE_PLANAR));
        assert!(mesh
            .polyline_elements_bits
            .iter()
            .all(|b| *b == SelectionBits::EDGE_HAS_MEASUREMENT_DATA));
    }

    #[test]
    fn test_edges_walk_the_boundary() {
        let mut mesh = quad_mesh();
        add_quad_face(&mut mesh, [0, 1, 2, 3], 0, 5);

        let edges: Vec<(u32, u32)> = mesh
            .polyline_elements
            .iter()
            .map(|e| (e.indices[0], e.indices[2]))
            .collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert!(mesh
            .polyline_elements
            .iter()
            .all(|e| e.indices[1] == 5 && e.indices[3] == 5));
    }

    #[test]
    fn test_degenerate_polygon_is_ignored() {
        let mut mesh = quad_mesh();
        add_planar_face(&mut mesh, &[0, 1], 0, 0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_pentagon_fan() {
        let mut mesh = quad_mesh();
        add_planar_face(&mut mesh, &[0, 1, 2, 3, 4], 0, 0);
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(mesh.polyline_elements.len(), 5);
    }

    #[test]
    fn test_box_is_closed() {
        let mesh = build_box(
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, 1.0),
            [Rgba::WHITE; 6],
        );
        assert_eq!(mesh.points.len(), 8);
        assert_eq!(mesh.normals.len(), 6);
        assert_eq!(mesh.elements(ElementKind::Face).len(), 6);
        assert_eq!(mesh.elements(ElementKind::Line).len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.manifold);

        // Every undirected box edge is shared by exactly two sides.
        let mut counts = std::collections::BTreeMap::new();
        for e in &mesh.polyline_elements {
            let (a, b) = (e.indices[0], e.indices[2]);
            *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 12);
        assert!(counts.values().all(|c| *c == 2));
    }

    #[test]
    fn test_box_triangles_face_outward() {
        let mesh = build_box(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 3.0, 4.0),
            [Rgba::BLACK; 6],
        );
        for face in &mesh.face_elements {
            for tri in face.indices.chunks_exact(9) {
                let a = mesh.points[tri[0] as usize];
                let b = mesh.points[tri[3] as usize];
                let c = mesh.points[tri[6] as usize];
                let n = mesh.normals[tri[1] as usize];
                let geometric = (b - a).cross(&(c - a));
                assert!(geometric.dot(&n) > 0.0, "triangle faces inward");
            }
        }
    }
}
