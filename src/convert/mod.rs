//! Conversion engine
//!
//! Rewrites a shading/lighting graph authored against the Arnold-style
//! source schema into the RadeonProRender target schema, through the
//! [`SceneGraph`] facade. The engine walks the graph on demand: the
//! orchestrator feeds it root entities, each rule resolves its attributes,
//! and connected attributes recurse through the dispatcher with the
//! identity cache guaranteeing one target node per source node.

pub mod audit;
pub mod cache;
pub mod colortemp;
pub mod env;
pub mod error;
pub mod kind;
pub mod orchestrator;
pub mod rules;

pub use audit::AuditLog;
pub use cache::{Conversion, IdentityCache, PlugMap};
pub use error::{ConvertError, ConvertResult};
pub use kind::{LightKind, NodeKind};
pub use orchestrator::{convert_and_clean, RunSummary};

use crate::scene::{AttrValue, Plug, SceneGraph};
use env::EnvironmentRegistry;

/// Drives one conversion run over a host scene graph.
///
/// Holds the only shared mutable state of a run: the identity cache, the
/// environment singleton registry and the audit sink. Discard the converter
/// after the run; a stale cache referencing renamed or deleted targets is a
/// correctness hazard.
pub struct Converter<'a, G: SceneGraph> {
    scene: &'a mut G,
    cache: IdentityCache,
    env: EnvironmentRegistry,
    audit: AuditLog,
    summary: RunSummary,
}

impl<'a, G: SceneGraph> Converter<'a, G> {
    pub fn new(scene: &'a mut G, audit: AuditLog) -> Self {
        Self {
            scene,
            cache: IdentityCache::new(),
            env: EnvironmentRegistry::new(),
            audit,
            summary: RunSummary::default(),
        }
    }

    /// The audit sink, readable after a run when it is a memory sink.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Direct access to the underlying scene, mainly for hosts that
    /// interleave their own edits between conversion and cleanup.
    pub fn scene(&mut self) -> &mut G {
        self.scene
    }

    // ---- allocation and audit framing ---------------------------------

    /// Allocate a target node named after its source with a suffix.
    pub(crate) fn allocate(
        &mut self,
        kind: &str,
        source: &str,
        suffix: &str,
    ) -> ConvertResult<String> {
        let created = self.scene.create_node(kind)?;
        let name = self.scene.rename_node(&created, &format!("{}{}", source, suffix))?;
        Ok(name)
    }

    /// Opens the audit stanza for one node conversion.
    pub(crate) fn begin_entry(&mut self, source: &str, target: &str) {
        let source_kind = self.scene.node_kind(source).unwrap_or_default();
        let target_kind = self.scene.node_kind(target).unwrap_or_default();
        self.audit.found(source, &source_kind, target, &target_kind);
    }

    pub(crate) fn end_entry(&mut self, source: &str) {
        self.audit.finished(source);
    }

    // ---- value resolution ----------------------------------------------

    /// Literal attribute read, with the miss recorded in the audit log.
    pub(crate) fn get_property(&mut self, node: &str, attr: &str) -> ConvertResult<AttrValue> {
        match self.scene.get_attr(node, attr) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.audit.failure(format!(
                    "There is no {}.{} field in this node. Check the field and try again.",
                    node, attr
                ));
                Err(err.into())
            }
        }
    }

    /// Scalar read defaulting to 0.0 when absent or connection-driven.
    pub(crate) fn scalar(&mut self, node: &str, attr: &str) -> f32 {
        self.scene
            .get_attr(node, attr)
            .ok()
            .and_then(|v| v.as_scalar())
            .unwrap_or(0.0)
    }

    /// Best-effort literal write, audit-logged either way.
    pub(crate) fn set_property(&mut self, node: &str, attr: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.scene.set_attr(node, attr, value.clone()) {
            Ok(()) => self.audit.set_value(value, node, attr),
            Err(_) => self.audit.failure(format!(
                "Set value {} to {}.{} is failed. Check the values and their boundaries.",
                value, node, attr
            )),
        }
    }

    /// Create a live connection, forcing literal color-space interpretation
    /// on file producers first (color-managed reads would otherwise apply
    /// the transform twice in the target schema).
    pub(crate) fn connect_property(
        &mut self,
        src: &str,
        src_attr: &str,
        dst: &str,
        dst_attr: &str,
    ) {
        if self.scene.node_kind(src).as_deref() == Ok("file") {
            self.set_property(src, "ignoreColorSpaceFileRules", 1);
        }
        match self.scene.connect(src, src_attr, dst, dst_attr) {
            Ok(()) => self
                .audit
                .connected(Plug::new(src, src_attr), Plug::new(dst, dst_attr)),
            Err(_) => self.audit.failure(format!(
                "Connection {}.{} to {}.{} is failed.",
                src, src_attr, dst, dst_attr
            )),
        }
    }

    /// Whether the source attribute is driven by an upstream producer.
    pub(crate) fn has_connection(&self, node: &str, attr: &str) -> bool {
        matches!(self.scene.connection_source(node, attr), Ok(Some(_)))
    }

    /// Resolve one target attribute from one source attribute: literal copy
    /// when unconnected, live rewired connection when connected.
    ///
    /// Per-attribute failures are logged and leave the target at its
    /// default. Only structural cycle errors propagate, aborting the
    /// current top-level entity.
    pub(crate) fn copy_property(
        &mut self,
        target: &str,
        source: &str,
        target_attr: &str,
        source_attr: &str,
    ) -> ConvertResult<()> {
        let producer = match self.scene.connection_source(source, source_attr) {
            Ok(producer) => producer,
            Err(_) => {
                self.audit.failure(format!(
                    "There is no {}.{} field in this node. Check the field and try again.",
                    source, source_attr
                ));
                return Ok(());
            }
        };

        match producer {
            None => {
                if let Ok(value) = self.get_property(source, source_attr) {
                    self.set_property(target, target_attr, value);
                    self.audit.property(source, source_attr, target, target_attr);
                }
            }
            Some(plug) => {
                if self.scene.node_kind(&plug.node).as_deref() == Ok("file") {
                    self.set_property(&plug.node, "ignoreColorSpaceFileRules", 1);
                }
                match self.convert_node(&plug.node, &plug.attr) {
                    Ok(translated) => {
                        self.connect_property(&translated.node, &translated.attr, target, target_attr);
                    }
                    Err(err @ ConvertError::Cycle(_)) => return Err(err),
                    Err(err) => self.audit.failure(format!(
                        "Error while copying from {}.{} to {}.{}: {}",
                        source, source_attr, target, target_attr, err
                    )),
                }
            }
        }
        Ok(())
    }

    // ---- dispatch ------------------------------------------------------

    /// Convert a source node on demand and translate the requested output
    /// plug. Memoized: repeated requests for the same source node reuse the
    /// record created by the first, whatever plug they ask for.
    ///
    /// An empty `requested` plug means "combined output" and returns the
    /// bare target node; the orchestrator uses this for bound materials.
    pub fn convert_node(&mut self, source: &str, requested: &str) -> ConvertResult<Plug> {
        if let Some(done) = self.cache.get(source) {
            let conversion = done.clone();
            return self.output_plug(&conversion, source, requested);
        }

        let kind_name = self.scene.node_kind(source)?;
        self.cache.begin(source)?;

        let result = match NodeKind::from_name(&kind_name) {
            NodeKind::AmbientOcclusion => self.convert_ambient_occlusion(source),
            NodeKind::CarPaint => self.convert_car_paint(source),
            NodeKind::Flat => self.convert_flat(source),
            NodeKind::MixShader => self.convert_mix_shader(source),
            NodeKind::ShadowMatte => self.convert_shadow_matte(source),
            NodeKind::StandardSurface => self.convert_standard_surface(source),
            NodeKind::StandardVolume => self.convert_standard_volume(source),
            NodeKind::PlaceholderMaterial(_) => self.convert_placeholder_material(source),
            NodeKind::Bump2d => self.convert_bump2d(source),
            NodeKind::AiBump2d | NodeKind::AiBump3d => self.convert_source_bump(source),
            NodeKind::NormalMap => self.convert_normal_map(source, "strength"),
            NodeKind::VectorMap => self.convert_normal_map(source, "scale"),
            NodeKind::Add => self.convert_binary_arithmetic(source, 0, "input1", "input2"),
            NodeKind::Subtract => self.convert_subtract(source),
            NodeKind::Multiply => self.convert_binary_arithmetic(source, 2, "input1", "input2"),
            NodeKind::Divide => self.convert_binary_arithmetic(source, 3, "input1", "input2"),
            NodeKind::Abs => self.convert_unary_arithmetic(source, 20, "input"),
            NodeKind::Atan => self.convert_binary_arithmetic(source, 18, "x", "y"),
            NodeKind::Cross => self.convert_cross(source),
            NodeKind::Dot => self.convert_dot(source),
            NodeKind::Pow => self.convert_binary_arithmetic(source, 15, "base", "exponent"),
            NodeKind::Trigo => self.convert_trigo(source),
            NodeKind::MultiplyDivide => self.convert_multiply_divide(source),
            NodeKind::Image => self.convert_image(source),
            NodeKind::Noise => self.convert_noise(source),
            NodeKind::CellNoise => self.convert_cell_noise(source),
            NodeKind::FacingRatio => self.convert_facing_ratio(source),
            NodeKind::ThinFilm => self.convert_thin_film(source),
            NodeKind::ColorConvert => self.convert_color_convert(source),
            NodeKind::Curvature => self.convert_curvature(source),
            NodeKind::Blackbody => self.convert_blackbody(source),
            NodeKind::Unsupported(_) => self.convert_unsupported_node(source, requested),
            NodeKind::Foreign(_) => self.convert_foreign_node(source, requested),
        };

        match result {
            Ok(conversion) => {
                self.cache.finish(source, conversion.clone());
                self.output_plug(&conversion, source, requested)
            }
            Err(err) => {
                self.cache.abort(source);
                Err(err)
            }
        }
    }

    fn output_plug(
        &mut self,
        conversion: &Conversion,
        source: &str,
        requested: &str,
    ) -> ConvertResult<Plug> {
        if requested.is_empty() {
            return Ok(Plug::new(conversion.target.clone(), ""));
        }
        match conversion.plugs.translate(requested) {
            Some(attr) => Ok(Plug::new(conversion.target.clone(), attr)),
            None => {
                let kind = self.scene.node_kind(source).unwrap_or_default();
                Err(ConvertError::UnmappedPlug {
                    kind,
                    plug: requested.to_string(),
                })
            }
        }
    }
}
