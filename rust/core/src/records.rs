// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed records of each section.
//!
//! Every record decodes independently: a bad record becomes a
//! [`RecordError`] in its slot and its neighbours are unaffected.

use crate::error::RecordError;
use scpatch_geometry::Winding;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Outcome of decoding one record.
pub type Decoded<T> = std::result::Result<T, RecordError>;

/// `{nodeId, <name>: <value>}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRecord {
    pub node_id: u32,
    pub name: String,
    pub value: String,
    /// Keys after the attribute key; ignored.
    pub extra_keys: Vec<String>,
}

/// `{nodeId, nodeName}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRenameRecord {
    pub node_id: u32,
    pub node_name: String,
}

/// Which instances a color record targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorTarget {
    /// `scInstanceId`
    Instance(u32),
    /// `nodeIds`; recognized, never applied.
    Batch(Vec<u32>),
}

/// `{nodeId, color: {r, g, b}, scInstanceId}` with components in 0-255.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorRecord {
    /// Only used for logging.
    pub node_id: Option<u32>,
    pub color: [f64; 3],
    pub target: ColorTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Default camera description; missing fields decode as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraRecord {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub width: f64,
    pub height: f64,
    /// Viewer code: 0 orthographic, 1 perspective.
    pub projection: Option<i64>,
    /// Reserved, not applied.
    pub near_limit: Option<f64>,
    /// Reserved, not applied.
    pub camera_flags: Option<i64>,
}

/// Flat channel arrays for one element kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelSet {
    #[serde(default)]
    pub position: Vec<f64>,
    pub normal: Option<Vec<f64>>,
    pub rgba: Option<Vec<f64>>,
    pub uv: Option<Vec<f64>>,
}

/// Mesh to inject under `parentNodeId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshRecord {
    pub node_id: u32,
    pub parent_node_id: u32,
    #[serde(default)]
    pub faces: Option<ChannelSet>,
    #[serde(default)]
    pub lines: Option<ChannelSet>,
    #[serde(default)]
    pub points: Option<ChannelSet>,
    #[serde(default, deserialize_with = "winding")]
    pub winding: Winding,
    #[serde(default, deserialize_with = "flag")]
    pub is_two_sided: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_manifold: bool,
}

fn object(record: &Value) -> Decoded<&Map<String, Value>> {
    record.as_object().ok_or(RecordError::NotAnObject)
}

fn node_id(map: &Map<String, Value>, field: &'static str) -> Decoded<u32> {
    let value = map.get(field).ok_or(RecordError::MissingField(field))?;
    as_u32(value).ok_or_else(|| RecordError::invalid(field, "is not a non-negative integer"))
}

fn as_u32(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|v| u32::try_from(v).ok())
}

pub(crate) fn decode_attribute(record: &Value) -> Decoded<AttributeRecord> {
    let map = object(record)?;
    let node_id = node_id(map, "nodeId")?;

    let mut keys = map.iter().filter(|(k, _)| k.as_str() != "nodeId");
    let (name, value) = keys.next().ok_or(RecordError::NoAttribute)?;
    let value = value
        .as_str()
        .ok_or_else(|| RecordError::invalid(name.as_str(), "is not a string"))?;

    Ok(AttributeRecord {
        node_id,
        name: name.clone(),
        value: value.to_string(),
        extra_keys: keys.map(|(k, _)| k.clone()).collect(),
    })
}

pub(crate) fn decode_rename(record: &Value) -> Decoded<NodeRenameRecord> {
    let map = object(record)?;
    let node_id = node_id(map, "nodeId")?;
    let node_name = map
        .get("nodeName")
        .ok_or(RecordError::MissingField("nodeName"))?
        .as_str()
        .ok_or_else(|| RecordError::invalid("nodeName", "is not a string"))?;
    Ok(NodeRenameRecord {
        node_id,
        node_name: node_name.to_string(),
    })
}

pub(crate) fn decode_color(record: &Value) -> Decoded<ColorRecord> {
    let map = object(record)?;

    let color = map.get("color").ok_or(RecordError::MissingField("color"))?;
    let color = object(color).map_err(|_| RecordError::invalid("color", "is not an object"))?;
    let mut rgb = [0.0; 3];
    for (slot, key) in rgb.iter_mut().zip(["r", "g", "b"]) {
        *slot = color
            .get(key)
            .ok_or_else(|| RecordError::invalid("color", format!("has no `{key}` component")))?
            .as_f64()
            .ok_or_else(|| RecordError::invalid("color", format!("`{key}` is not a number")))?;
    }

    let target = if let Some(ids) = map.get("nodeIds") {
        let ids = ids
            .as_array()
            .ok_or_else(|| RecordError::invalid("nodeIds", "is not an array"))?;
        let ids = ids
            .iter()
            .map(as_u32)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| RecordError::invalid("nodeIds", "holds a non-integer id"))?;
        ColorTarget::Batch(ids)
    } else {
        ColorTarget::Instance(node_id(map, "scInstanceId")?)
    };

    let node_id = match map.get("nodeId") {
        Some(v) => Some(as_u32(v).ok_or_else(|| {
            RecordError::invalid("nodeId", "is not a non-negative integer")
        })?),
        None => None,
    };

    Ok(ColorRecord {
        node_id,
        color: rgb,
        target,
    })
}

pub(crate) fn decode_camera(record: &Value) -> Decoded<CameraRecord> {
    object(record)?;
    CameraRecord::deserialize(record).map_err(|e| RecordError::Malformed(e.to_string()))
}

pub(crate) fn decode_mesh(record: &Value) -> Decoded<MeshRecord> {
    let map = object(record)?;
    node_id(map, "nodeId")?;
    node_id(map, "parentNodeId")?;

    // Channel data may sit under a nested `mesh` object; its keys win.
    let merged = match map.get("mesh") {
        Some(Value::Object(nested)) => {
            let mut merged: Map<String, Value> = map
                .iter()
                .filter(|(k, _)| k.as_str() != "mesh")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            for (k, v) in nested {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        }
        Some(_) => return Err(RecordError::invalid("mesh", "is not an object")),
        None => record.clone(),
    };

    MeshRecord::deserialize(&merged).map_err(|e| RecordError::Malformed(e.to_string()))
}

/// Accepts `0`/`1` as well as booleans. `null` reads as absent.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
    })
}

fn winding<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Winding, D::Error> {
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(Winding::default());
    };
    Winding::parse(&text).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "unknown winding {text:?}, expected \"clockwise\" or \"counterclockwise\""
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_pair() {
        let rec = decode_attribute(&json!({"nodeId": 6, "Material": "Inconel"})).unwrap();
        assert_eq!(rec.node_id, 6);
        assert_eq!(rec.name, "Material");
        assert_eq!(rec.value, "Inconel");
        assert!(rec.extra_keys.is_empty());
    }

    #[test]
    fn test_attribute_extra_keys_reported() {
        let rec = decode_attribute(&json!({"nodeId": 2, "A": "1", "B": "2", "C": 3})).unwrap();
        assert_eq!(rec.name, "A");
        assert_eq!(rec.extra_keys, vec!["B".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_attribute_invalid() {
        assert_eq!(
            decode_attribute(&json!({"nodeId": 2})),
            Err(RecordError::NoAttribute)
        );
        assert!(matches!(
            decode_attribute(&json!({"nodeId": 2, "Weight": 12})),
            Err(RecordError::InvalidField { .. })
        ));
        assert_eq!(
            decode_attribute(&json!({"Material": "Steel"})),
            Err(RecordError::MissingField("nodeId"))
        );
        assert!(matches!(
            decode_attribute(&json!({"nodeId": -1, "Material": "Steel"})),
            Err(RecordError::InvalidField { .. })
        ));
        assert_eq!(decode_attribute(&json!([1, 2])), Err(RecordError::NotAnObject));
    }

    #[test]
    fn test_rename() {
        let rec = decode_rename(&json!({"nodeId": 3, "nodeName": "Housing"})).unwrap();
        assert_eq!(rec.node_name, "Housing");
        assert_eq!(
            decode_rename(&json!({"nodeId": 3})),
            Err(RecordError::MissingField("nodeName"))
        );
    }

    #[test]
    fn test_color_single() {
        let rec = decode_color(&json!({
            "nodeId": 9,
            "color": {"r": 255, "g": 127.5, "b": 0},
            "scInstanceId": 4
        }))
        .unwrap();
        assert_eq!(rec.node_id, Some(9));
        assert_eq!(rec.color, [255.0, 127.5, 0.0]);
        assert_eq!(rec.target, ColorTarget::Instance(4));
    }

    #[test]
    fn test_color_batch() {
        let rec = decode_color(&json!({"nodeIds": [1, 2], "color": {"r": 0, "g": 0, "b": 0}}))
            .unwrap();
        assert_eq!(rec.target, ColorTarget::Batch(vec![1, 2]));
        assert_eq!(rec.node_id, None);
    }

    #[test]
    fn test_color_missing_instance() {
        assert_eq!(
            decode_color(&json!({"nodeId": 1, "color": {"r": 0, "g": 0, "b": 0}})),
            Err(RecordError::MissingField("scInstanceId"))
        );
        assert!(matches!(
            decode_color(&json!({"scInstanceId": 1, "color": {"r": 0, "g": 0}})),
            Err(RecordError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_camera_defaults_to_zero() {
        let rec = decode_camera(&json!({
            "position": {"x": 1.0, "y": 2.0},
            "projection": 1,
            "className": "Communicator.Camera"
        }))
        .unwrap();
        assert_eq!(rec.position, Vec3 { x: 1.0, y: 2.0, z: 0.0 });
        assert_eq!(rec.up, Vec3::default());
        assert_eq!(rec.width, 0.0);
        assert_eq!(rec.projection, Some(1));
        assert_eq!(rec.near_limit, None);
    }

    #[test]
    fn test_camera_wrong_type() {
        assert!(matches!(
            decode_camera(&json!({"width": "wide"})),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn test_mesh_flat() {
        let rec = decode_mesh(&json!({
            "nodeId": 20,
            "parentNodeId": 2,
            "faces": {"position": [0, 0, 0, 1, 0, 0, 0, 1, 0], "normal": [0, 0, 1, 0, 0, 1, 0, 0, 1]},
            "winding": "clockwise",
            "isTwoSided": 1,
            "isManifold": false
        }))
        .unwrap();
        assert_eq!(rec.node_id, 20);
        assert_eq!(rec.parent_node_id, 2);
        let faces = rec.faces.unwrap();
        assert_eq!(faces.position.len(), 9);
        assert!(faces.normal.is_some());
        assert!(faces.rgba.is_none());
        assert_eq!(rec.winding, Winding::Clockwise);
        assert!(rec.is_two_sided);
        assert!(!rec.is_manifold);
        assert!(rec.lines.is_none());
    }

    #[test]
    fn test_mesh_nested() {
        let rec = decode_mesh(&json!({
            "nodeId": 20,
            "parentNodeId": 2,
            "mesh": {"points": {"position": [1, 2, 3]}, "isManifold": true}
        }))
        .unwrap();
        assert_eq!(rec.points.unwrap().position, vec![1.0, 2.0, 3.0]);
        assert!(rec.is_manifold);
        assert_eq!(rec.winding, Winding::CounterClockwise);
    }

    #[test]
    fn test_mesh_null_flags_are_defaults() {
        let rec = decode_mesh(&json!({
            "nodeId": 20,
            "parentNodeId": 2,
            "points": {"position": [1, 2, 3]},
            "winding": null,
            "isTwoSided": null,
            "isManifold": null
        }))
        .unwrap();
        assert_eq!(rec.winding, Winding::CounterClockwise);
        assert!(!rec.is_two_sided);
        assert!(!rec.is_manifold);
    }

    #[test]
    fn test_mesh_errors() {
        assert_eq!(
            decode_mesh(&json!({"nodeId": 20})),
            Err(RecordError::MissingField("parentNodeId"))
        );
        assert!(matches!(
            decode_mesh(&json!({"nodeId": 1, "parentNodeId": 0, "winding": "sideways"})),
            Err(RecordError::Malformed(_))
        ));
        assert!(matches!(
            decode_mesh(&json!({"nodeId": 1, "parentNodeId": 0, "mesh": 3})),
            Err(RecordError::InvalidField { .. })
        ));
    }
}
