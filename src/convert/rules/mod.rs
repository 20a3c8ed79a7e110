//! Conversion rule set
//!
//! One rule per recognized source kind, grouped by rule class. Every rule
//! follows the same shape: allocate target node(s) named after the source,
//! resolve a fixed set of attributes through value resolution, and return a
//! [`Conversion`](super::Conversion) carrying the output plug translation
//! for that kind.

pub mod lights;
pub mod materials;
pub mod math;
pub mod textures;
