//! Shading graph converter between the Arnold-style source schema and the
//! RadeonProRender target schema.
//!
//! The [`scene`] module is the host facade: everything the converter does
//! to a scene goes through the [`scene::SceneGraph`] trait, with
//! [`scene::MemoryScene`] as the built-in map-backed implementation. The
//! [`convert`] module holds the engine itself, and [`launcher`] the batch
//! render driver used for regression scenes.

pub mod convert;
pub mod launcher;
pub mod scene;

pub use convert::{convert_and_clean, AuditLog, Converter, RunSummary};
pub use scene::{AttrValue, MemoryScene, Plug, SceneError, SceneGraph};
