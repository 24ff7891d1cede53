// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XML form of the assembly tree.
//!
//! ```xml
//! <AssemblyTree version="1">
//!   <Node id="0" name="model">
//!     <Attribute name="Material" type="string" value="Inconel"/>
//!     <BodyInstance id="4" name="" inclusion="0" instance="2"/>
//!   </Node>
//! </AssemblyTree>
//! ```
//!
//! Children are written in creation order, so writing the same tree twice
//! yields identical bytes.

use crate::assembly_tree::{AssemblyTree, Attribute, AttributeType, Node, NodeKind};
use crate::error::{Error, Result};
use crate::keys::{InclusionKey, InstanceInc, InstanceKey, NodeId};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

const FORMAT_VERSION: &str = "1";

impl AssemblyTree {
    /// Serialize the tree to an XML document.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut element = BytesStart::new("AssemblyTree");
        element.push_attribute(("version", FORMAT_VERSION));
        match self.root() {
            Some(root) => {
                writer.write_event(Event::Start(element))?;
                write_node(&mut writer, self, root)?;
                writer.write_event(Event::End(BytesEnd::new("AssemblyTree")))?;
            }
            None => writer.write_event(Event::Empty(element))?,
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::InvalidTree(format!("non UTF-8 output: {e}")))
    }

    /// Parse a document written by [`AssemblyTree::to_xml`].
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut tree = AssemblyTree::new();
        // Open node elements, innermost last.
        let mut open: Vec<NodeId> = Vec::new();
        let mut saw_tree_element = false;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    if let Some(id) = read_element(&mut tree, e, &open, &mut saw_tree_element)? {
                        open.push(id);
                    }
                }
                Event::Empty(ref e) => {
                    read_element(&mut tree, e, &open, &mut saw_tree_element)?;
                }
                Event::End(ref e) => {
                    if matches!(e.name().as_ref(), b"Node" | b"BodyInstance") {
                        open.pop();
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_tree_element {
            return Err(Error::InvalidTree(
                "missing <AssemblyTree> element".to_string(),
            ));
        }
        Ok(tree)
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, tree: &AssemblyTree, id: NodeId) -> Result<()> {
    let node = tree.node(id).ok_or(Error::NodeNotFound(id))?;
    let tag = match node.kind {
        NodeKind::Assembly => "Node",
        NodeKind::BodyInstance { .. } => "BodyInstance",
    };

    let id_text = node.id.to_string();
    let mut element = BytesStart::new(tag);
    element.push_attribute(("id", id_text.as_str()));
    element.push_attribute(("name", node.name.as_str()));
    if let Some(generic_id) = &node.generic_id {
        element.push_attribute(("genericId", generic_id.as_str()));
    }
    if let NodeKind::BodyInstance {
        mesh_instance: Some(key),
    } = node.kind
    {
        let inclusion = key.inclusion.to_string();
        let instance = key.instance.to_string();
        element.push_attribute(("inclusion", inclusion.as_str()));
        element.push_attribute(("instance", instance.as_str()));
    }

    if node.attributes.is_empty() && node.children.is_empty() {
        writer.write_event(Event::Empty(element))?;
        return Ok(());
    }

    writer.write_event(Event::Start(element))?;
    for attribute in &node.attributes {
        let mut entry = BytesStart::new("Attribute");
        entry.push_attribute(("name", attribute.name.as_str()));
        entry.push_attribute(("type", attribute.kind.as_str()));
        entry.push_attribute(("value", attribute.value.as_str()));
        writer.write_event(Event::Empty(entry))?;
    }
    for &child in &node.children {
        write_node(writer, tree, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Apply one element to the tree; returns the node id when the element is a node.
fn read_element(
    tree: &mut AssemblyTree,
    e: &BytesStart<'_>,
    open: &[NodeId],
    saw_tree_element: &mut bool,
) -> Result<Option<NodeId>> {
    let attrs = read_attributes(e)?;
    match e.name().as_ref() {
        b"AssemblyTree" => {
            let version = lookup(&attrs, "version").unwrap_or_default();
            if version != FORMAT_VERSION {
                return Err(Error::InvalidTree(format!(
                    "unsupported version {version:?}"
                )));
            }
            *saw_tree_element = true;
            Ok(None)
        }
        tag @ (b"Node" | b"BodyInstance") => {
            if !*saw_tree_element {
                return Err(Error::InvalidTree(
                    "node outside of <AssemblyTree>".to_string(),
                ));
            }
            let kind = if tag == b"BodyInstance" {
                let inclusion = lookup(&attrs, "inclusion").map(parse_u32).transpose()?;
                let instance = lookup(&attrs, "instance").map(parse_u32).transpose()?;
                let mesh_instance = match (inclusion, instance) {
                    (Some(inclusion), Some(instance)) => Some(InstanceInc::new(
                        InclusionKey(inclusion),
                        InstanceKey(instance),
                    )),
                    (None, None) => None,
                    _ => {
                        return Err(Error::InvalidTree(
                            "body instance needs both inclusion and instance".to_string(),
                        ))
                    }
                };
                NodeKind::BodyInstance { mesh_instance }
            } else {
                NodeKind::Assembly
            };

            let id = lookup(&attrs, "id")
                .map(parse_u32)
                .transpose()?
                .ok_or_else(|| Error::InvalidTree("node without id".to_string()))?;
            let node = Node {
                id,
                parent: open.last().copied(),
                name: lookup(&attrs, "name").unwrap_or_default().to_string(),
                generic_id: lookup(&attrs, "genericId").map(str::to_string),
                kind,
                children: Vec::new(),
                attributes: Vec::new(),
            };
            tree.insert_loaded(node)?;
            Ok(Some(id))
        }
        b"Attribute" => {
            let owner = open
                .last()
                .copied()
                .ok_or_else(|| Error::InvalidTree("attribute outside of a node".to_string()))?;
            let name = lookup(&attrs, "name")
                .ok_or_else(|| Error::InvalidTree("attribute without name".to_string()))?;
            let type_name = lookup(&attrs, "type").unwrap_or("undefined");
            let kind = AttributeType::parse(type_name).ok_or_else(|| {
                Error::InvalidTree(format!("unknown attribute type {type_name:?}"))
            })?;
            tree.push_loaded_attribute(
                owner,
                Attribute {
                    name: name.to_string(),
                    kind,
                    value: lookup(&attrs, "value").unwrap_or_default().to_string(),
                },
            )?;
            Ok(None)
        }
        other => Err(Error::InvalidTree(format!(
            "unexpected element <{}>",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn read_attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        out.push((key, value));
    }
    Ok(out)
}

fn lookup<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_u32(value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| Error::InvalidTree(format!("expected an unsigned integer, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly_tree::SceneGraph;

    fn sample_tree() -> AssemblyTree {
        let mut tree = AssemblyTree::with_root("sample");
        let a = tree.create_child(0).unwrap();
        tree.set_node_name(a, "Bracket & Bolt").unwrap();
        tree.add_attribute(a, "Material", AttributeType::String, "Inconel \"718\"")
            .unwrap();
        let b = tree.create_child(0).unwrap();
        tree.set_generic_id(b, "6").unwrap();
        let body = tree.create_body_instance(b).unwrap();
        tree.set_body_instance_mesh_instance(
            body,
            InstanceInc::new(InclusionKey(0), InstanceKey(2)),
        )
        .unwrap();
        tree.create_body_instance(a).unwrap();
        tree
    }

    #[test]
    fn test_xml_round_trip() {
        let tree = sample_tree();
        let xml = tree.to_xml().unwrap();
        let parsed = AssemblyTree::from_xml(&xml).unwrap();

        assert_eq!(parsed, tree);
        assert_eq!(parsed.to_xml().unwrap(), xml);
    }

    #[test]
    fn test_xml_escapes_values() {
        let xml = sample_tree().to_xml().unwrap();
        assert!(xml.contains("Bracket &amp; Bolt"));
        assert!(xml.contains("genericId=\"6\""));
        assert!(xml.contains("<BodyInstance id=\"3\" name=\"\" inclusion=\"0\" instance=\"2\"/>"));
    }

    #[test]
    fn test_empty_tree() {
        let xml = AssemblyTree::new().to_xml().unwrap();
        let parsed = AssemblyTree::from_xml(&xml).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed.root(), None);
    }

    #[test]
    fn test_ids_continue_after_load() {
        let mut parsed = AssemblyTree::from_xml(&sample_tree().to_xml().unwrap()).unwrap();
        let next = parsed.create_child(0).unwrap();
        assert_eq!(next, 5);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = AssemblyTree::from_xml(r#"<AssemblyTree version="9"/>"#).unwrap_err();
        assert!(matches!(err, Error::InvalidTree(_)));
    }

    #[test]
    fn test_rejects_attribute_outside_node() {
        let xml = r#"<AssemblyTree version="1"><Attribute name="a" type="string" value="b"/></AssemblyTree>"#;
        assert!(matches!(
            AssemblyTree::from_xml(xml),
            Err(Error::InvalidTree(_))
        ));
    }

    #[test]
    fn test_rejects_second_root() {
        let xml = r#"<AssemblyTree version="1"><Node id="0" name="a"/><Node id="1" name="b"/></AssemblyTree>"#;
        assert!(matches!(
            AssemblyTree::from_xml(xml),
            Err(Error::InvalidTree(_))
        ));
    }
}
