//! In-memory scene graph
//!
//! A complete [`SceneGraph`] implementation backed by ordinary maps. The
//! test suite builds source scenes against it, and hosts without a live
//! node database can use it to stage conversions.

use super::value::AttrValue;
use super::{Plug, SceneError, SceneGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind tag used for binding containers.
pub const BINDING_KIND: &str = "shadingEngine";

/// An attribute slot holds a literal or an incoming connection, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum AttrSlot {
    Value(AttrValue),
    Link(Plug),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneNode {
    kind: String,
    attrs: BTreeMap<String, AttrSlot>,
    /// Assigned geometry, only meaningful for binding containers.
    members: Vec<String>,
}

/// Map-backed scene graph with name-keyed nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryScene {
    nodes: BTreeMap<String, SceneNode>,
    next_suffix: u32,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node with an explicit name and kind. Test scaffolding.
    pub fn add_node(&mut self, name: &str, kind: &str) {
        self.nodes.insert(
            name.to_string(),
            SceneNode {
                kind: kind.to_string(),
                attrs: BTreeMap::new(),
                members: Vec::new(),
            },
        );
    }

    /// Set a literal attribute, creating the slot if needed.
    pub fn with_attr(&mut self, node: &str, attr: &str, value: AttrValue) -> &mut Self {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attrs.insert(attr.to_string(), AttrSlot::Value(value));
        }
        self
    }

    fn unique_name(&mut self, base: &str) -> String {
        if !self.nodes.contains_key(base) {
            return base.to_string();
        }
        loop {
            self.next_suffix += 1;
            let candidate = format!("{}{}", base, self.next_suffix);
            if !self.nodes.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn node(&self, name: &str) -> Result<&SceneNode, SceneError> {
        self.nodes
            .get(name)
            .ok_or_else(|| SceneError::UnknownNode(name.to_string()))
    }

    fn node_mut(&mut self, name: &str) -> Result<&mut SceneNode, SceneError> {
        self.nodes
            .get_mut(name)
            .ok_or_else(|| SceneError::UnknownNode(name.to_string()))
    }
}

impl SceneGraph for MemoryScene {
    fn create_node(&mut self, kind: &str) -> Result<String, SceneError> {
        let name = self.unique_name(kind);
        self.add_node(&name, kind);
        Ok(name)
    }

    fn rename_node(&mut self, name: &str, new_name: &str) -> Result<String, SceneError> {
        let node = self
            .nodes
            .remove(name)
            .ok_or_else(|| SceneError::UnknownNode(name.to_string()))?;
        let actual = self.unique_name(new_name);
        self.nodes.insert(actual.clone(), node);

        // Rewrite links and memberships that referenced the old name.
        for n in self.nodes.values_mut() {
            for slot in n.attrs.values_mut() {
                if let AttrSlot::Link(plug) = slot {
                    if plug.node == name {
                        plug.node = actual.clone();
                    }
                }
            }
            for m in n.members.iter_mut() {
                if m == name {
                    *m = actual.clone();
                }
            }
        }
        Ok(actual)
    }

    fn delete_node(&mut self, name: &str) -> Result<(), SceneError> {
        self.nodes
            .remove(name)
            .ok_or_else(|| SceneError::UnknownNode(name.to_string()))?;
        for node in self.nodes.values_mut() {
            node.attrs.retain(|_, slot| match slot {
                AttrSlot::Link(plug) => plug.node != name,
                AttrSlot::Value(_) => true,
            });
            node.members.retain(|m| m != name);
        }
        Ok(())
    }

    fn node_exists(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    fn node_kind(&self, name: &str) -> Result<String, SceneError> {
        Ok(self.node(name)?.kind.clone())
    }

    fn list_nodes(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    fn list_nodes_of_kind(&self, kinds: &[&str]) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|(_, n)| kinds.contains(&n.kind.as_str()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn list_attrs(&self, node: &str) -> Result<Vec<String>, SceneError> {
        Ok(self.node(node)?.attrs.keys().cloned().collect())
    }

    fn get_attr(&self, node: &str, attr: &str) -> Result<AttrValue, SceneError> {
        match self.node(node)?.attrs.get(attr) {
            Some(AttrSlot::Value(v)) => Ok(v.clone()),
            _ => Err(SceneError::MissingAttr {
                node: node.to_string(),
                attr: attr.to_string(),
            }),
        }
    }

    fn set_attr(&mut self, node: &str, attr: &str, value: AttrValue) -> Result<(), SceneError> {
        self.node_mut(node)?
            .attrs
            .insert(attr.to_string(), AttrSlot::Value(value));
        Ok(())
    }

    fn connect(
        &mut self,
        src: &str,
        src_plug: &str,
        dst: &str,
        dst_plug: &str,
    ) -> Result<(), SceneError> {
        if !self.nodes.contains_key(src) {
            return Err(SceneError::UnknownNode(src.to_string()));
        }
        if src == dst {
            return Err(SceneError::InvalidConnection(format!(
                "cannot connect {} to itself",
                src
            )));
        }
        let link = AttrSlot::Link(Plug::new(src, src_plug));
        self.node_mut(dst)?.attrs.insert(dst_plug.to_string(), link);
        Ok(())
    }

    fn connection_source(&self, node: &str, attr: &str) -> Result<Option<Plug>, SceneError> {
        match self.node(node)?.attrs.get(attr) {
            Some(AttrSlot::Link(plug)) => Ok(Some(plug.clone())),
            _ => Ok(None),
        }
    }

    fn create_binding(&mut self, name: &str) -> Result<String, SceneError> {
        let actual = self.unique_name(name);
        self.add_node(&actual, BINDING_KIND);
        Ok(actual)
    }

    fn bindings_of(&self, material: &str) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.kind == BINDING_KIND)
            .filter(|(_, n)| {
                n.attrs.values().any(|slot| match slot {
                    AttrSlot::Link(plug) => plug.node == material,
                    AttrSlot::Value(_) => false,
                })
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn members(&self, container: &str) -> Vec<String> {
        self.nodes
            .get(container)
            .map(|n| n.members.clone())
            .unwrap_or_default()
    }

    fn assign(&mut self, geometry: &str, container: &str) -> Result<(), SceneError> {
        if self.node(container)?.kind != BINDING_KIND {
            return Err(SceneError::NotABinding(container.to_string()));
        }
        for node in self.nodes.values_mut() {
            node.members.retain(|m| m != geometry);
        }
        self.node_mut(container)?.members.push(geometry.to_string());
        Ok(())
    }
}
