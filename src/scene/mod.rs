//! Scene graph access layer
//!
//! The conversion engine never owns graph storage. Everything it observes
//! or mutates goes through the [`SceneGraph`] trait, which the hosting
//! application implements over its own node database. [`memory::MemoryScene`]
//! is a self-contained implementation used by the test suite and by hosts
//! that want to stage a conversion outside a live scene.

pub mod memory;
pub mod value;

pub use memory::MemoryScene;
pub use value::AttrValue;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One end of a connection: a node name plus an attribute (plug) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plug {
    pub node: String,
    pub attr: String,
}

impl Plug {
    pub fn new(node: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attr: attr.into(),
        }
    }
}

impl fmt::Display for Plug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.attr)
    }
}

/// Failures reported by the host graph.
///
/// Any facade call may fail on a stale name or a missing attribute; the
/// engine treats these as non-fatal and isolates them per attribute or per
/// entity.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("node {0} does not exist")]
    UnknownNode(String),

    #[error("there is no {attr} field on {node}")]
    MissingAttr { node: String, attr: String },

    #[error("{0} is not a binding container")]
    NotABinding(String),

    #[error("invalid connection: {0}")]
    InvalidConnection(String),
}

/// Capability interface onto the hosting application's scene graph.
///
/// Node kinds are open strings at this level; the conversion layer narrows
/// them to its own closed enumeration. Binding containers associate a
/// material with the renderable geometry it governs and are created and
/// queried through dedicated calls because hosts store them outside the
/// regular node table.
pub trait SceneGraph {
    /// Create a node of the given kind. The host picks a unique name.
    fn create_node(&mut self, kind: &str) -> Result<String, SceneError>;

    /// Rename a node, returning the actual (possibly uniquified) new name.
    fn rename_node(&mut self, name: &str, new_name: &str) -> Result<String, SceneError>;

    /// Delete a node and every connection that references it.
    fn delete_node(&mut self, name: &str) -> Result<(), SceneError>;

    fn node_exists(&self, name: &str) -> bool;

    fn node_kind(&self, name: &str) -> Result<String, SceneError>;

    /// All node names, in a stable order.
    fn list_nodes(&self) -> Vec<String>;

    /// Node names whose kind matches any of `kinds`.
    fn list_nodes_of_kind(&self, kinds: &[&str]) -> Vec<String>;

    /// Attribute names present on a node.
    fn list_attrs(&self, node: &str) -> Result<Vec<String>, SceneError>;

    /// Literal value of an attribute. Fails if the attribute is absent or
    /// currently driven by a connection with no stored literal.
    fn get_attr(&self, node: &str, attr: &str) -> Result<AttrValue, SceneError>;

    fn set_attr(&mut self, node: &str, attr: &str, value: AttrValue) -> Result<(), SceneError>;

    /// Connect `src.src_plug -> dst.dst_plug`, replacing any existing
    /// producer on the destination (fan-in is 1).
    fn connect(
        &mut self,
        src: &str,
        src_plug: &str,
        dst: &str,
        dst_plug: &str,
    ) -> Result<(), SceneError>;

    /// The producer feeding an attribute, if any.
    fn connection_source(&self, node: &str, attr: &str) -> Result<Option<Plug>, SceneError>;

    /// Create a binding container with the desired name.
    fn create_binding(&mut self, name: &str) -> Result<String, SceneError>;

    /// Binding containers fed by the given material.
    fn bindings_of(&self, material: &str) -> Vec<String>;

    /// Geometry currently assigned to a binding container.
    fn members(&self, container: &str) -> Vec<String>;

    /// Assign geometry to a container, removing it from any other.
    fn assign(&mut self, geometry: &str, container: &str) -> Result<(), SceneError>;
}
