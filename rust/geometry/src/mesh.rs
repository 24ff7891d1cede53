// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! A [`Mesh`] owns one set of base arrays (points, normals, colors, UVs) and
//! three independent element lists that index into them: faces, polylines and
//! points. Face element indices are grouped per vertex in the order
//! point, normal, UV, color, where only channels present for faces take a slot.
//! Polyline and point elements use point, color (when present for that kind).

use crate::channels::{Presence, Rgba};
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Selection tags assignable to individual mesh elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SelectionBits(u8);

impl SelectionBits {
    pub const NONE: SelectionBits = SelectionBits(0);
    pub const FACE_HAS_MEASUREMENT_DATA: SelectionBits = SelectionBits(1 << 0);
    pub const FACE_PLANAR: SelectionBits = SelectionBits(1 << 1);
    pub const EDGE_HAS_MEASUREMENT_DATA: SelectionBits = SelectionBits(1 << 2);

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, other: SelectionBits) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SelectionBits {
    type Output = SelectionBits;

    fn bitor(self, rhs: SelectionBits) -> SelectionBits {
        SelectionBits(self.0 | rhs.0)
    }
}

impl BitOrAssign for SelectionBits {
    fn bitor_assign(&mut self, rhs: SelectionBits) {
        self.0 |= rhs.0;
    }
}

/// Face winding, if known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Winding {
    Clockwise,
    #[default]
    CounterClockwise,
}

impl Winding {
    /// Parse the patch spelling (`"clockwise"` / `"counterclockwise"`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "clockwise" => Some(Winding::Clockwise),
            "counterclockwise" | "counter-clockwise" => Some(Winding::CounterClockwise),
            _ => None,
        }
    }
}

/// The three independent element lists of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Face,
    Line,
    Point,
}

impl ElementKind {
    pub const ALL: [ElementKind; 3] = [ElementKind::Face, ElementKind::Line, ElementKind::Point];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Face => "faces",
            ElementKind::Line => "lines",
            ElementKind::Point => "points",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional channel presence for one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementChannels {
    pub normals: Presence,
    pub uvs: Presence,
    pub colors: Presence,
}

impl ElementChannels {
    /// Number of index slots one vertex occupies in an element's index stream.
    #[inline]
    pub fn stride(&self) -> usize {
        1 + self.normals.is_present() as usize
            + self.uvs.is_present() as usize
            + self.colors.is_present() as usize
    }
}

/// Channel presence for faces, lines and points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeshChannels {
    pub faces: ElementChannels,
    pub lines: ElementChannels,
    pub points: ElementChannels,
}

impl MeshChannels {
    pub fn get(&self, kind: ElementKind) -> &ElementChannels {
        match kind {
            ElementKind::Face => &self.faces,
            ElementKind::Line => &self.lines,
            ElementKind::Point => &self.points,
        }
    }

    pub fn get_mut(&mut self, kind: ElementKind) -> &mut ElementChannels {
        match kind {
            ElementKind::Face => &mut self.faces,
            ElementKind::Line => &mut self.lines,
            ElementKind::Point => &mut self.points,
        }
    }
}

/// One face, polyline or point element: an index stream into the base arrays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeshElement {
    pub indices: Vec<u32>,
}

impl MeshElement {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }
}

/// Mesh with shared base arrays and face/polyline/point elements
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub points: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub colors: Vec<Rgba>,
    pub uvs: Vec<Point2<f32>>,

    pub face_elements: Vec<MeshElement>,
    pub polyline_elements: Vec<MeshElement>,
    pub point_elements: Vec<MeshElement>,

    /// Per-element selection tags, parallel to the element lists (may be shorter).
    pub face_elements_bits: Vec<SelectionBits>,
    pub polyline_elements_bits: Vec<SelectionBits>,
    pub point_elements_bits: Vec<SelectionBits>,

    pub channels: MeshChannels,
    pub winding: Winding,
    pub two_sided: bool,
    pub manifold: bool,
}

impl Mesh {
    /// Create a new empty mesh with no optional channels
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements of the given kind.
    pub fn elements(&self, kind: ElementKind) -> &[MeshElement] {
        match kind {
            ElementKind::Face => &self.face_elements,
            ElementKind::Line => &self.polyline_elements,
            ElementKind::Point => &self.point_elements,
        }
    }

    /// Number of triangles across all face elements
    pub fn triangle_count(&self) -> usize {
        let stride = self.channels.faces.stride();
        self.face_elements
            .iter()
            .map(|e| e.indices.len() / (stride * 3))
            .sum()
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// True when no element of any kind exists.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.face_elements.is_empty()
            && self.polyline_elements.is_empty()
            && self.point_elements.is_empty()
    }

    /// Axis-aligned bounds of the base points
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.channels, MeshChannels::default());
        assert!(mesh.bounds().is_none());
    }

    #[test]
    fn test_selection_bits() {
        let bits = SelectionBits::FACE_HAS_MEASUREMENT_DATA | SelectionBits::FACE_PLANAR;
        assert!(bits.contains(SelectionBits::FACE_PLANAR));
        assert!(!bits.contains(SelectionBits::EDGE_HAS_MEASUREMENT_DATA));
        assert_eq!(bits.bits(), 0b011);
    }

    #[test]
    fn test_stride_follows_presence() {
        let mut channels = ElementChannels::default();
        assert_eq!(channels.stride(), 1);
        channels.normals = Presence::Present;
        channels.colors = Presence::Present;
        assert_eq!(channels.stride(), 3);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::new();
        mesh.points = vec![
            Point3::new(-1.0, 2.0, 0.0),
            Point3::new(3.0, -4.0, 5.0),
        ];
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(-1.0, -4.0, 0.0));
        assert_eq!(max, Point3::new(3.0, 2.0, 5.0));
    }

    #[test]
    fn test_winding_parse() {
        assert_eq!(Winding::parse("clockwise"), Some(Winding::Clockwise));
        assert_eq!(Winding::parse("CounterClockwise"), Some(Winding::CounterClockwise));
        assert_eq!(Winding::parse("sideways"), None);
    }
}
