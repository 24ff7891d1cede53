// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene store operations.

use crate::keys::{InclusionKey, InstanceKey, MaterialKey, MeshKey, NodeId};

/// Result type alias for scene store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the model store and the assembly tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced node does not exist in the assembly tree.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The node exists but is not a body instance node.
    #[error("node {0} is not a body instance")]
    NotABodyInstance(NodeId),

    /// The tree already has a root node.
    #[error("assembly tree already has root node {0}")]
    RootExists(NodeId),

    /// A node id was used twice while loading a tree.
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("mesh not found: {0}")]
    MeshNotFound(MeshKey),

    #[error("material not found: {0}")]
    MaterialNotFound(MaterialKey),

    #[error("instance not found: {0}")]
    InstanceNotFound(InstanceKey),

    #[error("inclusion not found: {0}")]
    InclusionNotFound(InclusionKey),

    /// The editable tree document is structurally invalid.
    #[error("invalid assembly tree document: {0}")]
    InvalidTree(String),

    /// The compact stream is not one this store wrote.
    #[error("invalid model stream: {0}")]
    InvalidStream(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stream encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),
}
