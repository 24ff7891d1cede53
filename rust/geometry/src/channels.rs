// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel assembly
//!
//! Patch payloads carry geometry as flat number lists (`[x, y, z, x, y, z, ...]`).
//! The functions here group consecutive values into typed tuples. Grouping is
//! purely positional: the first `arity` values form the first tuple, and so on.
//! A list whose length is not a multiple of the arity does not assemble at all;
//! callers treat that as "channel absent", never as a hard error.

use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// The data streams a mesh element can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Normal,
    Color,
    Uv,
}

impl Channel {
    /// Number of values that make up one entry of this channel.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            Channel::Position | Channel::Normal => 3,
            Channel::Color => 4,
            Channel::Uv => 2,
        }
    }

    /// Key used for this channel in patch payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Position => "position",
            Channel::Normal => "normal",
            Channel::Color => "rgba",
            Channel::Uv => "uv",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an optional channel is carried by an element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Presence {
    #[default]
    Absent,
    Present,
}

impl Presence {
    #[inline]
    pub fn from_bool(present: bool) -> Self {
        if present {
            Presence::Present
        } else {
            Presence::Absent
        }
    }

    #[inline]
    pub fn is_present(self) -> bool {
        matches!(self, Presence::Present)
    }
}

/// RGBA color with components in the 0-1 range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Normalize 0-255 components to 0-1. Values are divided, not clamped.
    #[inline]
    pub fn from_255(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: (r / 255.0) as f32,
            g: (g / 255.0) as f32,
            b: (b / 255.0) as f32,
            a: (a / 255.0) as f32,
        }
    }

    /// Opaque color from 0-255 RGB components.
    #[inline]
    pub fn opaque_255(r: f64, g: f64, b: f64) -> Self {
        Self::from_255(r, g, b, 255.0)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// Group `values` into fixed-size tuples.
///
/// Returns `None` when the length is not a multiple of `N`. An empty input
/// assembles into an empty collection.
pub fn group<const N: usize>(values: &[f64]) -> Option<Vec<[f64; N]>> {
    if N == 0 || values.len() % N != 0 {
        return None;
    }
    Some(
        values
            .chunks_exact(N)
            .map(|chunk| {
                let mut tuple = [0.0; N];
                tuple.copy_from_slice(chunk);
                tuple
            })
            .collect(),
    )
}

/// Assemble `[x, y, z, ...]` into points.
pub fn assemble_points(values: &[f64]) -> Option<Vec<Point3<f32>>> {
    group::<3>(values).map(|tuples| {
        tuples
            .into_iter()
            .map(|[x, y, z]| Point3::new(x as f32, y as f32, z as f32))
            .collect()
    })
}

/// Assemble `[nx, ny, nz, ...]` into normals. Normals are not re-normalized.
pub fn assemble_normals(values: &[f64]) -> Option<Vec<Vector3<f32>>> {
    group::<3>(values).map(|tuples| {
        tuples
            .into_iter()
            .map(|[x, y, z]| Vector3::new(x as f32, y as f32, z as f32))
            .collect()
    })
}

/// Assemble `[r, g, b, a, ...]` into raw color tuples (no range handling).
pub fn assemble_colors(values: &[f64]) -> Option<Vec<[f64; 4]>> {
    group::<4>(values)
}

/// Assemble `[u, v, ...]` into texture coordinates.
pub fn assemble_uvs(values: &[f64]) -> Option<Vec<Point2<f32>>> {
    group::<2>(values).map(|tuples| {
        tuples
            .into_iter()
            .map(|[u, v]| Point2::new(u as f32, v as f32))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_group_is_positional() {
        let tuples = group::<3>(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(tuples, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_group_rejects_partial_tuple() {
        assert!(group::<3>(&[1.0, 2.0, 3.0, 4.0]).is_none());
        assert!(assemble_colors(&[255.0, 0.0, 0.0]).is_none());
        assert!(assemble_uvs(&[0.5]).is_none());
    }

    #[test]
    fn test_empty_input_assembles_empty() {
        assert_eq!(assemble_points(&[]).unwrap().len(), 0);
    }

    #[test]
    fn test_colors_are_left_raw() {
        let colors = assemble_colors(&[255.0, 128.0, 0.0, 300.0]).unwrap();
        assert_eq!(colors, vec![[255.0, 128.0, 0.0, 300.0]]);
    }

    #[test]
    fn test_points_and_uvs() {
        let points = assemble_points(&[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(points, vec![Point3::new(0.0, 1.0, 2.0)]);

        let uvs = assemble_uvs(&[0.25, 0.75, 1.0, 0.0]).unwrap();
        assert_eq!(uvs.len(), 2);
        assert_relative_eq!(uvs[0].y, 0.75);
    }

    #[test]
    fn test_color_normalization() {
        let red = Rgba::opaque_255(255.0, 0.0, 0.0);
        assert_relative_eq!(red.r, 1.0);
        assert_relative_eq!(red.g, 0.0);
        assert_relative_eq!(red.b, 0.0);

        let black = Rgba::opaque_255(0.0, 0.0, 0.0);
        assert_eq!((black.r, black.g, black.b), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_channel_arity() {
        assert_eq!(Channel::Position.arity(), 3);
        assert_eq!(Channel::Normal.arity(), 3);
        assert_eq!(Channel::Color.arity(), 4);
        assert_eq!(Channel::Uv.arity(), 2);
    }
}
