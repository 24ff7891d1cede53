// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `defaultCamera`: replace the model's default camera.

use super::{decoded, SceneContext};
use crate::report::SectionReport;
use scpatch_core::{CameraRecord, Decoded, Vec3};
use scpatch_geometry::{Point3, Vector3};
use scpatch_scene::{Camera, Projection};

/// Build a camera from a record; absent fields are zero.
pub fn camera_from_record(record: &CameraRecord) -> Camera {
    let point = |v: Vec3| Point3::new(v.x, v.y, v.z);
    Camera {
        projection: record
            .projection
            .map(Projection::from_viewer_code)
            .unwrap_or_default(),
        position: point(record.position),
        target: point(record.target),
        up_vector: Vector3::new(record.up.x, record.up.y, record.up.z),
        field_width: record.width,
        field_height: record.height,
    }
}

pub fn apply(
    records: &[Decoded<CameraRecord>],
    ctx: &mut SceneContext<'_>,
    report: &mut SectionReport,
) {
    for (index, record) in records.iter().enumerate() {
        let Some(record) = decoded(index, record, report) else {
            continue;
        };
        if record.near_limit.is_some() || record.camera_flags.is_some() {
            tracing::debug!(
                near_limit = ?record.near_limit,
                camera_flags = ?record.camera_flags,
                "Camera near limit and flags are not applied"
            );
        }
        let camera = camera_from_record(record);
        if camera.projection == Projection::Invalid {
            report.note(format!("record {index}: projection is unset"));
        }
        ctx.model.set_default_camera(camera);
        tracing::debug!(projection = ?camera.projection, "Replaced default camera");
        report.applied += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_mapping() {
        let record = CameraRecord {
            position: Vec3 { x: 1.0, y: 2.0, z: 3.0 },
            target: Vec3::default(),
            up: Vec3 { x: 0.0, y: 0.0, z: 1.0 },
            width: 4.0,
            height: 5.0,
            projection: Some(0),
            ..Default::default()
        };
        let camera = camera_from_record(&record);
        assert_eq!(camera.projection, Projection::Orthographic);
        assert_eq!(camera.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.up_vector.z, 1.0);
        assert_eq!((camera.field_width, camera.field_height), (4.0, 5.0));
    }

    #[test]
    fn test_projection_codes() {
        let mut record = CameraRecord::default();
        assert_eq!(camera_from_record(&record).projection, Projection::Invalid);
        record.projection = Some(1);
        assert_eq!(camera_from_record(&record).projection, Projection::Perspective);
        record.projection = Some(7);
        assert_eq!(camera_from_record(&record).projection, Projection::Invalid);
    }
}
