// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera description stored as a model's default view.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Camera projection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Projection {
    /// Projection has not been set; equivalent to having no camera.
    #[default]
    Invalid,
    Perspective,
    Orthographic,
}

impl Projection {
    /// Map the viewer's projection code: 0 orthographic, 1 perspective.
    ///
    /// Any other code leaves the projection unset.
    pub fn from_viewer_code(code: i64) -> Self {
        match code {
            0 => Projection::Orthographic,
            1 => Projection::Perspective,
            _ => Projection::Invalid,
        }
    }
}

/// Position, target, up vector, field size and projection of a view.
///
/// The default value is all zeros with an [`Projection::Invalid`] projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub projection: Projection,
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up_vector: Vector3<f64>,
    pub field_width: f64,
    pub field_height: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Projection::Invalid,
            position: Point3::origin(),
            target: Point3::origin(),
            up_vector: Vector3::zeros(),
            field_width: 0.0,
            field_height: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_codes() {
        assert_eq!(Projection::from_viewer_code(0), Projection::Orthographic);
        assert_eq!(Projection::from_viewer_code(1), Projection::Perspective);
        assert_eq!(Projection::from_viewer_code(2), Projection::Invalid);
        assert_eq!(Projection::from_viewer_code(-1), Projection::Invalid);
    }

    #[test]
    fn test_default_camera_is_zeroed() {
        let camera = Camera::default();
        assert_eq!(camera.projection, Projection::Invalid);
        assert_eq!(camera.field_width, 0.0);
        assert_eq!(camera.up_vector, Vector3::zeros());
    }
}
