// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Patch document: an ordered list of named sections.
//!
//! ```json
//! {
//!   "attributes":    [{"nodeId": 6, "Material": "Inconel"}],
//!   "nodeNames":     [{"nodeId": 6, "nodeName": "Turbine blade"}],
//!   "colors":        [{"nodeId": 6, "color": {"r": 255, "g": 0, "b": 0}, "scInstanceId": 2}],
//!   "defaultCamera": {"position": {"x": 0, "y": 0, "z": 10}, "projection": 1},
//!   "meshes":        [{"nodeId": 30, "parentNodeId": 2, "faces": {"position": [...]}}]
//! }
//! ```
//!
//! The text is compacted, parsed once and every top-level key is decoded
//! into a [`Section`] in document order.

use crate::compact::Compacted;
use crate::error::{Error, Result};
use crate::records::{
    decode_attribute, decode_camera, decode_color, decode_mesh, decode_rename, AttributeRecord,
    CameraRecord, ColorRecord, Decoded, MeshRecord, NodeRenameRecord,
};
use serde_json::{Map, Value};

/// Recognized section names.
pub mod names {
    pub const ATTRIBUTES: &str = "attributes";
    pub const NODE_NAMES: &str = "nodeNames";
    pub const COLORS: &str = "colors";
    pub const DEFAULT_CAMERA: &str = "defaultCamera";
    pub const MESHES: &str = "meshes";
}

/// One decoded top-level section.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Attributes(Vec<Decoded<AttributeRecord>>),
    NodeNames(Vec<Decoded<NodeRenameRecord>>),
    Colors(Vec<Decoded<ColorRecord>>),
    DefaultCamera(Vec<Decoded<CameraRecord>>),
    Meshes(Vec<Decoded<MeshRecord>>),
    /// Unrecognized key; reported and skipped.
    Unknown(String),
    /// Recognized key whose value is neither an array nor null.
    Malformed { name: String, reason: String },
}

impl Section {
    /// Document key this section was decoded from.
    pub fn name(&self) -> &str {
        match self {
            Section::Attributes(_) => names::ATTRIBUTES,
            Section::NodeNames(_) => names::NODE_NAMES,
            Section::Colors(_) => names::COLORS,
            Section::DefaultCamera(_) => names::DEFAULT_CAMERA,
            Section::Meshes(_) => names::MESHES,
            Section::Unknown(name) | Section::Malformed { name, .. } => name.as_str(),
        }
    }

    /// Number of records, valid or not.
    pub fn len(&self) -> usize {
        match self {
            Section::Attributes(r) => r.len(),
            Section::NodeNames(r) => r.len(),
            Section::Colors(r) => r.len(),
            Section::DefaultCamera(r) => r.len(),
            Section::Meshes(r) => r.len(),
            Section::Unknown(_) | Section::Malformed { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn decode(name: &str, value: &Value) -> Self {
        match name {
            names::ATTRIBUTES => records(name, value, decode_attribute, Section::Attributes),
            names::NODE_NAMES => records(name, value, decode_rename, Section::NodeNames),
            names::COLORS => records(name, value, decode_color, Section::Colors),
            names::DEFAULT_CAMERA => match value {
                // A bare camera object is a one-record section.
                Value::Object(_) => Section::DefaultCamera(vec![decode_camera(value)]),
                _ => records(name, value, decode_camera, Section::DefaultCamera),
            },
            names::MESHES => records(name, value, decode_mesh, Section::Meshes),
            other => Section::Unknown(other.to_string()),
        }
    }
}

fn records<T>(
    name: &str,
    value: &Value,
    decode: fn(&Value) -> Decoded<T>,
    wrap: fn(Vec<Decoded<T>>) -> Section,
) -> Section {
    match value {
        Value::Array(items) => wrap(items.iter().map(decode).collect()),
        Value::Null => wrap(Vec::new()),
        other => Section::Malformed {
            name: name.to_string(),
            reason: format!("expected an array, found {}", kind_of(other)),
        },
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A decoded patch document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchDocument {
    pub sections: Vec<Section>,
}

impl PatchDocument {
    /// Parse raw patch text.
    pub fn parse(text: &str) -> Result<Self> {
        let compacted = Compacted::new(text);
        let value: Value = serde_json::from_str(compacted.as_str()).map_err(|e| {
            let offset = compacted.offset_of(e.line(), e.column());
            Error::Parse {
                position: compacted.position(offset),
                message: e.to_string(),
            }
        })?;
        match value {
            Value::Object(map) => Ok(Self::from_map(&map)),
            other => Err(Error::InvalidDocument(format!(
                "expected an object of sections, found {}",
                kind_of(&other)
            ))),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            sections: map
                .iter()
                .map(|(name, value)| Section::decode(name, value))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl std::str::FromStr for PatchDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
