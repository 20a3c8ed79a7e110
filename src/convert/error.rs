//! Conversion error taxonomy
//!
//! Most failures are isolated to a single attribute or entity and end up in
//! the audit log rather than propagating. Only structural problems (a cycle
//! in the shading graph) abort the conversion of a top-level entity.

use crate::scene::SceneError;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A queried attribute does not exist on the source node.
    #[error("there is no {node}.{attr} field in this node")]
    MissingAttr { node: String, attr: String },

    /// A rule has no output translation entry for the requested plug.
    #[error("no output mapping for {kind} plug {plug}")]
    UnmappedPlug { kind: String, plug: String },

    /// A node already mid-resolution was resolved again.
    #[error("cyclic shading graph detected at {0}")]
    Cycle(String),

    /// An attribute held a value shape the rule cannot interpret.
    #[error("unexpected value in {node}.{attr}")]
    BadValue { node: String, attr: String },

    #[error(transparent)]
    Scene(#[from] SceneError),
}
