// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editable assembly tree: a rooted hierarchy of named nodes carrying
//! attributes, optional generic ids, and body instances that point at mesh
//! instances of a model.

use crate::error::{Error, Result};
use crate::keys::{InstanceInc, NodeId};
use crate::model::{Model, ModelStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type tag of a node attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttributeType {
    #[default]
    Undefined,
    Int,
    Float,
    Time,
    String,
    Ignored,
}

impl AttributeType {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeType::Undefined => "undefined",
            AttributeType::Int => "int",
            AttributeType::Float => "float",
            AttributeType::Time => "time",
            AttributeType::String => "string",
            AttributeType::Ignored => "ignored",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "undefined" => AttributeType::Undefined,
            "int" => AttributeType::Int,
            "float" => AttributeType::Float,
            "time" => AttributeType::Time,
            "string" => AttributeType::String,
            "ignored" => AttributeType::Ignored,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeType,
    pub value: String,
}

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeKind {
    /// Grouping node.
    #[default]
    Assembly,
    /// Leaf node placing a mesh instance; unbound until a key is set.
    BodyInstance { mesh_instance: Option<InstanceInc> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    pub generic_id: Option<String>,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub attributes: Vec<Attribute>,
}

impl Node {
    fn new(id: NodeId, parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            id,
            parent,
            name: String::new(),
            generic_id: None,
            kind,
            children: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn is_body_instance(&self) -> bool {
        matches!(self.kind, NodeKind::BodyInstance { .. })
    }
}

/// Tree operations the patch engine performs.
pub trait SceneGraph {
    /// Create the root node. Fails if a root already exists.
    fn create_root(&mut self) -> Result<NodeId>;

    /// Create an assembly child under `parent`.
    fn create_child(&mut self, parent: NodeId) -> Result<NodeId>;

    fn set_node_name(&mut self, node: NodeId, name: &str) -> Result<()>;

    /// Attach an attribute. An existing attribute of the same name is replaced.
    fn add_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        kind: AttributeType,
        value: &str,
    ) -> Result<()>;

    fn set_generic_id(&mut self, node: NodeId, generic_id: &str) -> Result<()>;

    /// Create an unbound body instance node under `parent`.
    fn create_body_instance(&mut self, parent: NodeId) -> Result<NodeId>;

    /// Bind a body instance node to a mesh instance.
    fn set_body_instance_mesh_instance(&mut self, node: NodeId, key: InstanceInc) -> Result<()>;

    /// Whether `node` exists.
    fn contains(&self, node: NodeId) -> bool;
}

/// Rooted node hierarchy with dense, never reused ids.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssemblyTree {
    root: Option<NodeId>,
    nodes: BTreeMap<NodeId, Node>,
    next_id: NodeId,
}

impl AssemblyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// New tree with a root node carrying `name`.
    pub fn with_root(name: &str) -> Self {
        let mut tree = Self::new();
        let root = tree.allocate(None, NodeKind::Assembly);
        tree.root = Some(root);
        if let Some(node) = tree.nodes.get_mut(&root) {
            node.name = name.to_string();
        }
        tree
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `id` whose generic id equals `generic_id`.
    pub fn find_child_by_generic_id(&self, id: NodeId, generic_id: &str) -> Option<NodeId> {
        self.nodes.get(&id)?.children.iter().copied().find(|c| {
            self.nodes
                .get(c)
                .and_then(|n| n.generic_id.as_deref())
                .is_some_and(|g| g == generic_id)
        })
    }

    /// Write the tree into `model`, replacing any tree stored there before.
    ///
    /// Body instances must reference instances and inclusions that exist in
    /// the model.
    pub fn serialize_to_model(&self, model: &mut Model) -> Result<()> {
        for node in self.nodes.values() {
            if let NodeKind::BodyInstance {
                mesh_instance: Some(key),
            } = node.kind
            {
                model.inclusion_name(key.inclusion)?;
                if model.instance_data(key.instance).is_none() {
                    return Err(Error::InstanceNotFound(key.instance));
                }
            }
        }
        model.set_assembly(self.clone());
        tracing::debug!(model = model.name(), nodes = self.nodes.len(), "Serialized assembly tree");
        Ok(())
    }

    fn allocate(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, parent, kind));
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(id);
        }
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))
    }

    /// Insert a node read back from a persisted document.
    pub(crate) fn insert_loaded(&mut self, node: Node) -> Result<()> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(Error::DuplicateNode(id));
        }
        match node.parent {
            None if self.root.is_some() => {
                return Err(Error::InvalidTree(format!(
                    "node {id} has no parent but the tree already has a root"
                )))
            }
            None => self.root = Some(id),
            Some(parent) => self.node_mut(parent)?.children.push(id),
        }
        self.next_id = self.next_id.max(id.saturating_add(1));
        self.nodes.insert(id, node);
        Ok(())
    }

    pub(crate) fn push_loaded_attribute(&mut self, id: NodeId, attribute: Attribute) -> Result<()> {
        self.node_mut(id)?.attributes.push(attribute);
        Ok(())
    }
}

impl SceneGraph for AssemblyTree {
    fn create_root(&mut self) -> Result<NodeId> {
        if let Some(root) = self.root {
            return Err(Error::RootExists(root));
        }
        let root = self.allocate(None, NodeKind::Assembly);
        self.root = Some(root);
        Ok(root)
    }

    fn create_child(&mut self, parent: NodeId) -> Result<NodeId> {
        self.node_mut(parent)?;
        Ok(self.allocate(Some(parent), NodeKind::Assembly))
    }

    fn set_node_name(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.node_mut(node)?.name = name.to_string();
        Ok(())
    }

    fn add_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        kind: AttributeType,
        value: &str,
    ) -> Result<()> {
        let node = self.node_mut(node)?;
        let attribute = Attribute {
            name: name.to_string(),
            kind,
            value: value.to_string(),
        };
        match node.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => *existing = attribute,
            None => node.attributes.push(attribute),
        }
        Ok(())
    }

    fn set_generic_id(&mut self, node: NodeId, generic_id: &str) -> Result<()> {
        self.node_mut(node)?.generic_id = Some(generic_id.to_string());
        Ok(())
    }

    fn create_body_instance(&mut self, parent: NodeId) -> Result<NodeId> {
        self.node_mut(parent)?;
        Ok(self.allocate(
            Some(parent),
            NodeKind::BodyInstance {
                mesh_instance: None,
            },
        ))
    }

    fn set_body_instance_mesh_instance(&mut self, node: NodeId, key: InstanceInc) -> Result<()> {
        let target = self.node_mut(node)?;
        match &mut target.kind {
            NodeKind::BodyInstance { mesh_instance } => {
                *mesh_instance = Some(key);
                Ok(())
            }
            NodeKind::Assembly => Err(Error::NotABodyInstance(node)),
        }
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{InclusionKey, InstanceKey};

    #[test]
    fn test_root_and_children() {
        let mut tree = AssemblyTree::new();
        let root = tree.create_root().unwrap();
        let a = tree.create_child(root).unwrap();
        let b = tree.create_child(root).unwrap();

        assert_eq!(root, 0);
        assert_eq!(tree.node(root).unwrap().children, vec![a, b]);
        assert_eq!(tree.node(b).unwrap().parent, Some(root));
        assert!(matches!(tree.create_root(), Err(Error::RootExists(0))));
    }

    #[test]
    fn test_child_of_missing_parent() {
        let mut tree = AssemblyTree::with_root("model");
        assert!(matches!(
            tree.create_child(42),
            Err(Error::NodeNotFound(42))
        ));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_attribute_replaced_by_name() {
        let mut tree = AssemblyTree::with_root("model");
        tree.add_attribute(0, "Material", AttributeType::String, "Steel")
            .unwrap();
        tree.add_attribute(0, "Weight", AttributeType::String, "12")
            .unwrap();
        tree.add_attribute(0, "Material", AttributeType::String, "Inconel")
            .unwrap();

        let node = tree.node(0).unwrap();
        assert_eq!(node.attributes.len(), 2);
        assert_eq!(node.attribute("Material").unwrap().value, "Inconel");
        assert_eq!(node.attributes[0].name, "Material");
    }

    #[test]
    fn test_body_instance_binding() {
        let mut tree = AssemblyTree::with_root("model");
        let body = tree.create_body_instance(0).unwrap();
        let key = InstanceInc::new(InclusionKey(0), InstanceKey(3));

        tree.set_body_instance_mesh_instance(body, key).unwrap();
        assert_eq!(
            tree.node(body).unwrap().kind,
            NodeKind::BodyInstance {
                mesh_instance: Some(key)
            }
        );
        assert!(matches!(
            tree.set_body_instance_mesh_instance(0, key),
            Err(Error::NotABodyInstance(0))
        ));
    }

    #[test]
    fn test_find_child_by_generic_id() {
        let mut tree = AssemblyTree::with_root("model");
        let a = tree.create_child(0).unwrap();
        let b = tree.create_child(0).unwrap();
        tree.set_generic_id(b, "7").unwrap();

        assert_eq!(tree.find_child_by_generic_id(0, "7"), Some(b));
        assert_eq!(tree.find_child_by_generic_id(0, "8"), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_serialize_rejects_dangling_instance() {
        let mut model = Model::new("model");
        let inclusion = model.include_self();
        let mut tree = AssemblyTree::with_root("model");
        let body = tree.create_body_instance(0).unwrap();
        tree.set_body_instance_mesh_instance(body, InstanceInc::new(inclusion, InstanceKey(0)))
            .unwrap();

        assert!(matches!(
            tree.serialize_to_model(&mut model),
            Err(Error::InstanceNotFound(_))
        ));
        assert!(model.assembly().is_none());
    }

    #[test]
    fn test_serialize_stores_tree() {
        let mut model = Model::new("model");
        let inclusion = model.include_self();
        let mesh = model.insert_mesh(scpatch_geometry::build_box(
            scpatch_geometry::Point3::new(0.0, 0.0, 0.0),
            scpatch_geometry::Point3::new(1.0, 1.0, 1.0),
            [scpatch_geometry::Rgba::WHITE; 6],
        ));
        let instance = model.instance(mesh).unwrap();

        let mut tree = AssemblyTree::with_root("model");
        let body = tree.create_body_instance(0).unwrap();
        tree.set_body_instance_mesh_instance(body, InstanceInc::new(inclusion, instance))
            .unwrap();
        tree.serialize_to_model(&mut model).unwrap();

        assert_eq!(model.assembly(), Some(&tree));
    }
}
