//! Material rules
//!
//! Materials are the conversion roots: the orchestrator asks for their
//! combined output and they pull their whole upstream graph in through
//! attribute resolution. Assigned materials also create the binding the
//! orchestrator later moves geometry onto, and pick up displacement from
//! their source binding.

use crate::convert::cache::{Conversion, PlugMap};
use crate::convert::colortemp::temperature_to_rgb;
use crate::convert::error::{ConvertError, ConvertResult};
use crate::convert::Converter;
use crate::scene::SceneGraph;

const OCCLUSION_OUT: &[(&str, &str)] = &[
    ("outColor", "output"),
    ("outColorR", "outputR"),
    ("outColorG", "outputG"),
    ("outColorB", "outputB"),
];

/// Producer kinds that never take part in attribute resolution.
const PASSIVE_PRODUCERS: &[&str] = &["materialInfo", "defaultShaderList", "shadingEngine"];

/// Combined (vector-valued) output plugs of the target schema.
fn is_combined_plug(attr: &str) -> bool {
    matches!(attr, "out" | "outColor" | "output" | "outValue" | "outHsv" | "outRgb")
}

impl<G: SceneGraph> Converter<'_, G> {
    /// Whether the material drives a binding that actually has geometry.
    pub(crate) fn is_assigned(&self, source: &str) -> bool {
        self.scene
            .bindings_of(source)
            .iter()
            .any(|sg| !self.scene.members(sg).is_empty())
    }

    /// Create the binding for a converted material and wire its combined
    /// output into the binding's shader slot.
    fn bind_material(&mut self, target: &str, shader_attr: &str) -> ConvertResult<String> {
        let sg = self.scene.create_binding(&format!("{}SG", target))?;
        self.connect_property(target, "outColor", &sg, shader_attr);
        Ok(sg)
    }

    /// First file-kind producer feeding any attribute of a node.
    fn file_producer(&self, node: &str) -> Option<String> {
        let attrs = self.scene.list_attrs(node).ok()?;
        for attr in attrs {
            if let Ok(Some(plug)) = self.scene.connection_source(node, &attr) {
                if self.scene.node_kind(&plug.node).as_deref() == Ok("file") {
                    return Some(plug.node);
                }
            }
        }
        None
    }

    /// Carry displacement from the source material's binding onto the
    /// target. A displacement shader in between contributes its scale when
    /// the target has a slot for it.
    fn convert_displacement(
        &mut self,
        source: &str,
        target: &str,
        enable_attr: &str,
        map_attr: &str,
        scale_attr: Option<&str>,
    ) -> ConvertResult<()> {
        for sg in self.scene.bindings_of(source) {
            let Ok(Some(plug)) = self.scene.connection_source(&sg, "displacementShader") else {
                continue;
            };
            match self.scene.node_kind(&plug.node).as_deref() {
                Ok("file") => {
                    self.set_property(target, enable_attr, 1);
                    self.connect_property(&plug.node, "outColor", target, map_attr);
                }
                Ok("displacementShader") => {
                    if let Some(file) = self.file_producer(&plug.node) {
                        self.set_property(target, enable_attr, 1);
                        self.connect_property(&file, "outColor", target, map_attr);
                        if let Some(scale_attr) = scale_attr {
                            self.copy_property(target, &plug.node, scale_attr, "scale")?;
                        }
                    }
                }
                _ => {}
            }
            break;
        }
        Ok(())
    }

    /// A lobe is enabled whenever its weight can contribute: any nonzero
    /// literal (sign included) or a live producer.
    fn default_enable(&mut self, target: &str, source: &str, enable_attr: &str, weight_attr: &str) {
        let enabled =
            self.scalar(source, weight_attr) != 0.0 || self.has_connection(source, weight_attr);
        self.set_property(target, enable_attr, if enabled { 1 } else { 0 });
    }

    pub(crate) fn convert_flat(&mut self, source: &str) -> ConvertResult<Conversion> {
        let assigned = self.is_assigned(source);
        let target = self.allocate("RPRFlatColorMaterial", source, "_rpr")?;
        self.begin_entry(source, &target);

        if assigned {
            self.bind_material(&target, "surfaceShader")?;
        }
        self.copy_property(&target, source, "color", "color")?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    pub(crate) fn convert_mix_shader(&mut self, source: &str) -> ConvertResult<Conversion> {
        let assigned = self.is_assigned(source);
        let target = self.allocate("RPRBlendMaterial", source, "_rpr")?;
        self.begin_entry(source, &target);

        if assigned {
            self.bind_material(&target, "surfaceShader")?;
        }
        self.copy_property(&target, source, "color0", "shader1")?;
        self.copy_property(&target, source, "color1", "shader2")?;
        self.copy_property(&target, source, "weight", "mix")?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    pub(crate) fn convert_standard_surface(&mut self, source: &str) -> ConvertResult<Conversion> {
        let assigned = self.is_assigned(source);
        let target = self.allocate("RPRUberMaterial", source, "_rpr")?;
        self.begin_entry(source, &target);

        if assigned {
            self.bind_material(&target, "surfaceShader")?;
            self.convert_displacement(
                source,
                &target,
                "displacementEnable",
                "displacementMap",
                Some("displacementMax"),
            )?;
        }

        self.default_enable(&target, source, "diffuse", "base");
        self.default_enable(&target, source, "reflections", "specular");
        self.default_enable(&target, source, "refraction", "transmission");
        self.default_enable(&target, source, "sssEnable", "subsurface");
        self.default_enable(&target, source, "emissive", "emission");
        self.default_enable(&target, source, "clearCoat", "coat");

        self.copy_property(&target, source, "diffuseColor", "baseColor")?;
        self.copy_property(&target, source, "diffuseWeight", "base")?;
        self.copy_property(&target, source, "diffuseRoughness", "diffuseRoughness")?;

        self.copy_property(&target, source, "reflectColor", "specularColor")?;
        self.copy_property(&target, source, "reflectWeight", "specular")?;
        self.copy_property(&target, source, "reflectRoughness", "specularRoughness")?;
        self.copy_property(&target, source, "reflectAnisotropy", "specularAnisotropy")?;
        self.copy_property(&target, source, "reflectAnisotropyRotation", "specularRotation")?;
        self.copy_property(&target, source, "reflectIOR", "specularIOR")?;

        if self.scalar(source, "metalness") != 0.0 || self.has_connection(source, "metalness") {
            self.set_property(&target, "diffuse", 1);
            self.set_property(&target, "reflections", 1);
            self.set_property(&target, "reflectMetalMaterial", 1);
            self.set_property(&target, "reflectWeight", 1.0);
            self.copy_property(&target, source, "reflectMetalness", "metalness")?;
            self.copy_property(&target, source, "diffuseColor", "baseColor")?;
            self.copy_property(&target, source, "reflectColor", "baseColor")?;
        }

        self.copy_property(&target, source, "refractColor", "transmissionColor")?;
        self.copy_property(&target, source, "refractWeight", "transmission")?;
        self.copy_property(&target, source, "refractRoughness", "transmissionExtraRoughness")?;
        self.copy_property(&target, source, "refractThinSurface", "thinWalled")?;

        self.copy_property(&target, source, "volumeScatter", "subsurfaceColor")?;
        self.copy_property(&target, source, "sssWeight", "subsurface")?;
        self.copy_property(&target, source, "backscatteringWeight", "subsurface")?;
        self.copy_property(&target, source, "subsurfaceRadius", "subsurfaceRadius")?;
        if self.scalar(source, "subsurface") != 0.0 {
            self.set_property(&target, "diffuse", 1);
            self.set_property(&target, "diffuseWeight", 1.0);
            self.set_property(&target, "separateBackscatterColor", 0);
            self.set_property(&target, "multipleScattering", 0);
            self.set_property(&target, "backscatteringWeight", 0.75);
        }

        self.copy_property(&target, source, "coatColor", "coatColor")?;
        self.copy_property(&target, source, "coatTransmissionColor", "coatColor")?;
        self.copy_property(&target, source, "coatWeight", "coat")?;
        self.copy_property(&target, source, "coatRoughness", "coatRoughness")?;
        self.copy_property(&target, source, "coatIor", "coatIOR")?;
        self.copy_property(&target, source, "coatNormal", "coatNormal")?;
        self.set_property(&target, "coatThickness", 1.5);

        self.copy_property(&target, source, "emissiveColor", "emissionColor")?;
        self.copy_property(&target, source, "emissiveWeight", "emission")?;

        self.convert_opacity(source, &target)?;

        if self.has_connection(source, "normalCamera") {
            self.set_property(&target, "normalMapEnable", 1);
            self.copy_property(&target, source, "normalMap", "normalCamera")?;
            for (weight_attr, normal_attr) in [
                ("base", "diffuseNormal"),
                ("specular", "reflectNormal"),
                ("transmission", "refractNormal"),
                ("coat", "coatNormal"),
            ] {
                if self.scalar(source, weight_attr) != 0.0 {
                    self.copy_property(&target, source, normal_attr, "normalCamera")?;
                }
            }
        }

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    /// Opacity inverts into a transparency level. A mapped opacity needs a
    /// reversing arithmetic node in between; a literal one is folded here.
    fn convert_opacity(&mut self, source: &str, target: &str) -> ConvertResult<()> {
        if self.has_connection(source, "opacity") {
            let arith = self.allocate("RPRArithmetic", source, "_opacity")?;
            self.set_property(&arith, "operation", 1);
            self.set_property(&arith, "inputA", [1.0, 1.0, 1.0]);
            self.copy_property(&arith, source, "inputB", "opacity")?;
            self.connect_property(&arith, "outX", target, "transparencyLevel");
            self.set_property(target, "transparencyEnable", 1);
            return Ok(());
        }
        if let Ok(opacity) = self.scene.get_attr(source, "opacity") {
            if opacity.as_vector() != Some([1.0, 1.0, 1.0]) {
                self.set_property(target, "transparencyLevel", 1.0 - opacity.max_component());
                self.set_property(target, "transparencyEnable", 1);
            }
        }
        Ok(())
    }

    pub(crate) fn convert_car_paint(&mut self, source: &str) -> ConvertResult<Conversion> {
        let assigned = self.is_assigned(source);
        let target = self.allocate("RPRUberMaterial", source, "_rpr")?;
        self.begin_entry(source, &target);

        if assigned {
            self.bind_material(&target, "surfaceShader")?;
        }

        self.default_enable(&target, source, "diffuse", "base");
        self.default_enable(&target, source, "reflections", "specular");
        self.default_enable(&target, source, "clearCoat", "coat");

        self.copy_property(&target, source, "diffuseColor", "baseColor")?;
        self.copy_property(&target, source, "diffuseWeight", "base")?;
        self.copy_property(&target, source, "diffuseRoughness", "baseRoughness")?;

        self.copy_property(&target, source, "reflectColor", "specularColor")?;
        self.copy_property(&target, source, "reflectWeight", "specular")?;
        self.copy_property(&target, source, "reflectRoughness", "specularRoughness")?;
        self.copy_property(&target, source, "reflectIOR", "specularIOR")?;

        self.copy_property(&target, source, "coatColor", "coatColor")?;
        self.copy_property(&target, source, "coatWeight", "coat")?;
        self.copy_property(&target, source, "coatRoughness", "coatRoughness")?;
        self.copy_property(&target, source, "coatIor", "coatIOR")?;

        if self.has_connection(source, "coatNormal") {
            self.set_property(&target, "normalMapEnable", 1);
            self.copy_property(&target, source, "normalMap", "coatNormal")?;
            self.set_property(&target, "useShaderNormal", 1);
            self.set_property(&target, "reflectUseShaderNormal", 1);
            self.set_property(&target, "refractUseShaderNormal", 1);
            self.set_property(&target, "coatUseShaderNormal", 1);
        }

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    pub(crate) fn convert_shadow_matte(&mut self, source: &str) -> ConvertResult<Conversion> {
        let assigned = self.is_assigned(source);
        let target = self.allocate("RPRShadowCatcherMaterial", source, "_rpr")?;
        self.begin_entry(source, &target);

        if assigned {
            self.bind_material(&target, "surfaceShader")?;
            self.convert_displacement(source, &target, "useDispMap", "dispMap", None)?;
        }

        self.copy_property(&target, source, "shadowColor", "shadowColor")?;
        if self.has_connection(source, "shadowOpacity") {
            let arith = self.allocate("RPRArithmetic", source, "_opacity")?;
            self.set_property(&arith, "operation", 1);
            self.set_property(&arith, "inputA", [1.0, 1.0, 1.0]);
            self.copy_property(&arith, source, "inputBX", "shadowOpacity")?;
            self.connect_property(&arith, "outX", &target, "shadowTransp");
        } else {
            let transp = 1.0 - self.scalar(source, "shadowOpacity");
            self.set_property(&target, "shadowTransp", transp);
        }
        self.copy_property(&target, source, "bgColor", "backgroundColor")?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    pub(crate) fn convert_standard_volume(&mut self, source: &str) -> ConvertResult<Conversion> {
        let assigned = self.is_assigned(source);
        let target = self.allocate("RPRVolumeMaterial", source, "_rpr")?;
        self.begin_entry(source, &target);

        if assigned {
            self.bind_material(&target, "volumeShader")?;
        }
        self.copy_property(&target, source, "scatterColor", "scatterColor")?;
        self.copy_property(&target, source, "emissionColor", "emissionColor")?;
        self.copy_property(&target, source, "transmissionColor", "transparent")?;
        self.copy_property(&target, source, "density", "density")?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    /// Occlusion is a texture in both schemas, but an assigned source
    /// occlusion acts as a material; it then gets a carrier material with
    /// the probe feeding its diffuse color.
    pub(crate) fn convert_ambient_occlusion(&mut self, source: &str) -> ConvertResult<Conversion> {
        if self.is_assigned(source) {
            let target = self.allocate("RPRUberMaterial", source, "_rpr")?;
            self.begin_entry(source, &target);
            self.bind_material(&target, "surfaceShader")?;

            let probe = self.allocate("RPRAmbientOcclusion", source, "_ao")?;
            self.connect_property(&probe, "output", &target, "diffuseColor");
            self.copy_property(&probe, source, "occludedColor", "white")?;
            self.copy_property(&probe, source, "unoccludedColor", "black")?;
            self.copy_property(&probe, source, "radius", "falloff")?;

            self.end_entry(source);
            Ok(Conversion::new(target, PlugMap::Same))
        } else {
            let target = self.allocate("RPRAmbientOcclusion", source, "_rpr")?;
            self.begin_entry(source, &target);

            self.copy_property(&target, source, "occludedColor", "white")?;
            self.copy_property(&target, source, "unoccludedColor", "black")?;
            self.copy_property(&target, source, "radius", "falloff")?;

            self.end_entry(source);
            Ok(Conversion::new(target, PlugMap::Table(OCCLUSION_OUT)))
        }
    }

    /// Blackbody radiator approximated by a pure emitter with the
    /// temperature folded into a literal color.
    pub(crate) fn convert_blackbody(&mut self, source: &str) -> ConvertResult<Conversion> {
        let target = self.allocate("RPRUberMaterial", source, "_rpr")?;
        self.begin_entry(source, &target);

        self.set_property(&target, "diffuse", 0);
        self.set_property(&target, "emissive", 1);
        let rgb = temperature_to_rgb(self.scalar(source, "temperature") as f64);
        self.set_property(&target, "emissiveColor", rgb);
        self.copy_property(&target, source, "emissiveIntensity", "intensity")?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    /// Stand-in for source materials with no target counterpart: a plain
    /// green material keeps the assignment visible in renders.
    pub(crate) fn convert_placeholder_material(&mut self, source: &str) -> ConvertResult<Conversion> {
        let assigned = self.is_assigned(source);
        let target = self.allocate("RPRUberMaterial", source, "_UNSUPPORTED_MATERIAL")?;
        self.begin_entry(source, &target);
        self.audit.failure(format!(
            "Material {} is not supported, a stand-in material is created instead.",
            source
        ));

        if assigned {
            self.bind_material(&target, "surfaceShader")?;
        }
        self.set_property(&target, "diffuseColor", [0.0, 1.0, 0.0]);

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    /// Stand-in for unrecognized non-material source nodes: a pass-through
    /// arithmetic that keeps up to two upstream producers alive so the
    /// graph downstream of the gap still evaluates.
    pub(crate) fn convert_unsupported_node(
        &mut self,
        source: &str,
        requested: &str,
    ) -> ConvertResult<Conversion> {
        let target = self.allocate("RPRArithmetic", source, "_UNSUPPORTED_NODE")?;
        self.begin_entry(source, &target);
        self.audit.failure(format!(
            "Node {} is not supported, a pass-through node is created instead.",
            source
        ));
        self.set_property(&target, "operation", 0);

        let mut slot = 0;
        for attr in self.scene.list_attrs(source)? {
            let Ok(Some(plug)) = self.scene.connection_source(source, &attr) else {
                continue;
            };
            if slot >= 2 {
                self.audit.failure(format!(
                    "Connection {} to {}.{} is dropped, the pass-through node is full.",
                    plug, source, attr
                ));
                continue;
            }
            match self.convert_node(&plug.node, &plug.attr) {
                Ok(translated) => {
                    let input = match (slot, is_combined_plug(&translated.attr)) {
                        (0, true) => "inputA",
                        (0, false) => "inputAX",
                        (1, true) => "inputB",
                        _ => "inputBX",
                    };
                    self.connect_property(&translated.node, &translated.attr, &target, input);
                    slot += 1;
                }
                Err(err @ ConvertError::Cycle(_)) => return Err(err),
                Err(err) => self.audit.failure(format!(
                    "Error while carrying {}.{} through {}: {}",
                    source, attr, target, err
                )),
            }
        }

        let vector_out = self
            .scene
            .get_attr(source, requested)
            .map(|v| v.is_vector())
            .unwrap_or(requested == "outColor");
        self.end_entry(source);
        Ok(Conversion::new(
            target,
            if vector_out { PlugMap::Fixed("out") } else { PlugMap::Fixed("outX") },
        ))
    }

    /// Nodes that already exist in the target schema stay in place; only
    /// their upstream producers are rewired to converted counterparts.
    pub(crate) fn convert_foreign_node(
        &mut self,
        source: &str,
        requested: &str,
    ) -> ConvertResult<Conversion> {
        self.begin_entry(source, source);

        for attr in self.scene.list_attrs(source)? {
            if attr == requested || attr == "message" {
                continue;
            }
            let Ok(Some(plug)) = self.scene.connection_source(source, &attr) else {
                continue;
            };
            let kind = self.scene.node_kind(&plug.node).unwrap_or_default();
            if PASSIVE_PRODUCERS.contains(&kind.as_str()) {
                continue;
            }
            match self.convert_node(&plug.node, &plug.attr) {
                Ok(translated) => {
                    if translated.node != plug.node || translated.attr != plug.attr {
                        self.connect_property(&translated.node, &translated.attr, source, &attr);
                    }
                }
                Err(err @ ConvertError::Cycle(_)) => return Err(err),
                Err(err) => self.audit.failure(format!(
                    "Error while rewiring {}.{}: {}",
                    source, attr, err
                )),
            }
        }

        self.end_entry(source);
        Ok(Conversion::new(source.to_string(), PlugMap::Same))
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::{AuditLog, Converter};
    use crate::scene::{AttrValue, MemoryScene, SceneGraph};

    fn assign_material(scene: &mut MemoryScene, material: &str, geometry: &str) -> String {
        let sg = scene.create_binding(&format!("{}SG", material)).unwrap();
        scene
            .connect(material, "outColor", &sg, "surfaceShader")
            .unwrap();
        scene.add_node(geometry, "mesh");
        scene.assign(geometry, &sg).unwrap();
        sg
    }

    #[test]
    fn test_flat_material_creates_binding_when_assigned() {
        let mut scene = MemoryScene::new();
        scene.add_node("flat", "aiFlat");
        scene.with_attr("flat", "color", AttrValue::Vector([0.2, 0.3, 0.4]));
        assign_material(&mut scene, "flat", "plane");

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        let plug = conv.convert_node("flat", "").unwrap();
        assert_eq!(plug.node, "flat_rpr");

        assert_eq!(scene.node_kind("flat_rpr").unwrap(), "RPRFlatColorMaterial");
        assert_eq!(
            scene.get_attr("flat_rpr", "color").unwrap(),
            AttrValue::Vector([0.2, 0.3, 0.4])
        );
        assert_eq!(scene.bindings_of("flat_rpr").len(), 1);
    }

    #[test]
    fn test_unassigned_material_gets_no_binding() {
        let mut scene = MemoryScene::new();
        scene.add_node("flat", "aiFlat");
        scene.with_attr("flat", "color", AttrValue::Vector([1.0, 1.0, 1.0]));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_node("flat", "").unwrap();
        assert!(scene.bindings_of("flat_rpr").is_empty());
    }

    #[test]
    fn test_negative_weight_still_enables_lobe() {
        let mut scene = MemoryScene::new();
        scene.add_node("mat", "aiStandardSurface");
        scene.with_attr("mat", "base", AttrValue::Float(-0.5));
        scene.with_attr("mat", "specular", AttrValue::Float(0.0));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_node("mat", "").unwrap();

        assert_eq!(scene.get_attr("mat_rpr", "diffuse").unwrap(), AttrValue::Int(1));
        assert_eq!(scene.get_attr("mat_rpr", "reflections").unwrap(), AttrValue::Int(0));
    }

    #[test]
    fn test_metalness_forces_metal_path() {
        let mut scene = MemoryScene::new();
        scene.add_node("mat", "aiStandardSurface");
        scene.with_attr("mat", "metalness", AttrValue::Float(0.8));
        scene.with_attr("mat", "baseColor", AttrValue::Vector([0.9, 0.7, 0.3]));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_node("mat", "").unwrap();

        assert_eq!(scene.get_attr("mat_rpr", "reflectMetalMaterial").unwrap(), AttrValue::Int(1));
        assert_eq!(scene.get_attr("mat_rpr", "reflectMetalness").unwrap(), AttrValue::Float(0.8));
        assert_eq!(
            scene.get_attr("mat_rpr", "reflectColor").unwrap(),
            AttrValue::Vector([0.9, 0.7, 0.3])
        );
    }

    #[test]
    fn test_literal_opacity_becomes_transparency() {
        let mut scene = MemoryScene::new();
        scene.add_node("mat", "aiStandardSurface");
        scene.with_attr("mat", "opacity", AttrValue::Vector([0.25, 0.5, 0.75]));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_node("mat", "").unwrap();

        assert_eq!(scene.get_attr("mat_rpr", "transparencyLevel").unwrap(), AttrValue::Float(0.25));
        assert_eq!(scene.get_attr("mat_rpr", "transparencyEnable").unwrap(), AttrValue::Int(1));
    }

    #[test]
    fn test_mapped_opacity_goes_through_reversal() {
        let mut scene = MemoryScene::new();
        scene.add_node("tex", "file");
        scene.add_node("mat", "aiStandardSurface");
        scene.connect("tex", "outColor", "mat", "opacity").unwrap();

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_node("mat", "").unwrap();

        let plug = scene
            .connection_source("mat_rpr", "transparencyLevel")
            .unwrap()
            .unwrap();
        assert_eq!(plug.node, "mat_opacity");
        assert_eq!(plug.attr, "outX");
        assert_eq!(scene.get_attr("mat_opacity", "operation").unwrap(), AttrValue::Int(1));
        assert!(scene.connection_source("mat_opacity", "inputB").unwrap().is_some());
    }

    #[test]
    fn test_mix_shader_blends_converted_materials() {
        let mut scene = MemoryScene::new();
        scene.add_node("a", "aiFlat");
        scene.with_attr("a", "color", AttrValue::Vector([1.0, 0.0, 0.0]));
        scene.add_node("b", "aiFlat");
        scene.with_attr("b", "color", AttrValue::Vector([0.0, 0.0, 1.0]));
        scene.add_node("mix", "aiMixShader");
        scene.with_attr("mix", "mix", AttrValue::Float(0.5));
        scene.connect("a", "outColor", "mix", "shader1").unwrap();
        scene.connect("b", "outColor", "mix", "shader2").unwrap();

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_node("mix", "").unwrap();

        assert_eq!(scene.node_kind("mix_rpr").unwrap(), "RPRBlendMaterial");
        let plug = scene.connection_source("mix_rpr", "color0").unwrap().unwrap();
        assert_eq!(plug.node, "a_rpr");
        assert_eq!(scene.get_attr("mix_rpr", "weight").unwrap(), AttrValue::Float(0.5));
    }

    #[test]
    fn test_shadow_matte_transparency_and_background() {
        let mut scene = MemoryScene::new();
        scene.add_node("matte", "aiShadowMatte");
        scene.with_attr("matte", "shadowOpacity", AttrValue::Float(0.8));
        scene.with_attr("matte", "backgroundColor", AttrValue::Vector([0.1, 0.1, 0.1]));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_node("matte", "").unwrap();

        assert_eq!(scene.node_kind("matte_rpr").unwrap(), "RPRShadowCatcherMaterial");
        let transp = scene.get_attr("matte_rpr", "shadowTransp").unwrap();
        match transp {
            AttrValue::Float(f) => assert!((f - 0.2).abs() < 1e-6),
            other => panic!("unexpected value {:?}", other),
        }
        assert_eq!(
            scene.get_attr("matte_rpr", "bgColor").unwrap(),
            AttrValue::Vector([0.1, 0.1, 0.1])
        );
    }

    #[test]
    fn test_displacement_carried_from_binding() {
        let mut scene = MemoryScene::new();
        scene.add_node("mat", "aiStandardSurface");
        let sg = assign_material(&mut scene, "mat", "rock");

        scene.add_node("disp", "displacementShader");
        scene.with_attr("disp", "scale", AttrValue::Float(2.0));
        scene.add_node("height", "file");
        scene.connect("height", "outColor", "disp", "displacement").unwrap();
        scene.connect("disp", "displacement", &sg, "displacementShader").unwrap();

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_node("mat", "").unwrap();

        assert_eq!(scene.get_attr("mat_rpr", "displacementEnable").unwrap(), AttrValue::Int(1));
        let plug = scene.connection_source("mat_rpr", "displacementMap").unwrap().unwrap();
        assert_eq!(plug.node, "height");
        assert_eq!(scene.get_attr("mat_rpr", "displacementMax").unwrap(), AttrValue::Float(2.0));
    }

    #[test]
    fn test_assigned_occlusion_becomes_material() {
        let mut scene = MemoryScene::new();
        scene.add_node("ao", "aiAmbientOcclusion");
        scene.with_attr("ao", "white", AttrValue::Vector([1.0, 1.0, 1.0]));
        scene.with_attr("ao", "black", AttrValue::Vector([0.0, 0.0, 0.0]));
        scene.with_attr("ao", "falloff", AttrValue::Float(1.0));
        assign_material(&mut scene, "ao", "floor");

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        let plug = conv.convert_node("ao", "").unwrap();
        assert_eq!(scene.node_kind(&plug.node).unwrap(), "RPRUberMaterial");

        let diffuse = scene.connection_source("ao_rpr", "diffuseColor").unwrap().unwrap();
        assert_eq!(diffuse.node, "ao_ao");
        assert_eq!(diffuse.attr, "output");
    }

    #[test]
    fn test_unassigned_occlusion_keeps_plug_table() {
        let mut scene = MemoryScene::new();
        scene.add_node("ao", "aiAmbientOcclusion");
        scene.with_attr("ao", "falloff", AttrValue::Float(1.0));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        let plug = conv.convert_node("ao", "outColorR").unwrap();
        assert_eq!(plug.node, "ao_rpr");
        assert_eq!(plug.attr, "outputR");
        assert_eq!(scene.node_kind("ao_rpr").unwrap(), "RPRAmbientOcclusion");
    }

    #[test]
    fn test_blackbody_emits_temperature_color() {
        let mut scene = MemoryScene::new();
        scene.add_node("bb", "aiBlackbody");
        scene.with_attr("bb", "temperature", AttrValue::Float(6600.0));
        scene.with_attr("bb", "intensity", AttrValue::Float(2.0));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_node("bb", "").unwrap();

        assert_eq!(scene.get_attr("bb_rpr", "diffuse").unwrap(), AttrValue::Int(0));
        assert_eq!(scene.get_attr("bb_rpr", "emissive").unwrap(), AttrValue::Int(1));
        match scene.get_attr("bb_rpr", "emissiveColor").unwrap() {
            AttrValue::Vector(rgb) => assert_eq!(rgb[0], 1.0),
            other => panic!("unexpected value {:?}", other),
        }
        assert_eq!(scene.get_attr("bb_rpr", "emissiveIntensity").unwrap(), AttrValue::Float(2.0));
    }

    #[test]
    fn test_placeholder_material_is_green_standin() {
        let mut scene = MemoryScene::new();
        scene.add_node("toon", "aiToon");
        assign_material(&mut scene, "toon", "character");

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        let plug = conv.convert_node("toon", "").unwrap();
        assert_eq!(plug.node, "toon_UNSUPPORTED_MATERIAL");
        assert_eq!(
            scene.get_attr("toon_UNSUPPORTED_MATERIAL", "diffuseColor").unwrap(),
            AttrValue::Vector([0.0, 1.0, 0.0])
        );
        assert_eq!(scene.bindings_of("toon_UNSUPPORTED_MATERIAL").len(), 1);
    }

    #[test]
    fn test_unsupported_node_routes_by_value_shape() {
        let mut scene = MemoryScene::new();
        scene.add_node("vec", "aiAdd");
        scene.with_attr("vec", "input1", AttrValue::Vector([1.0, 2.0, 3.0]));
        scene.with_attr("vec", "input2", AttrValue::Vector([0.0, 0.0, 0.0]));
        scene.add_node("sca", "aiAbs");
        scene.with_attr("sca", "input", AttrValue::Float(-1.0));
        scene.add_node("extra", "aiAbs");
        scene.with_attr("extra", "input", AttrValue::Float(4.0));

        scene.add_node("weird", "aiWeirdThing");
        scene.with_attr("weird", "outColor", AttrValue::Vector([0.0, 0.0, 0.0]));
        scene.connect("vec", "outColor", "weird", "aFirst").unwrap();
        scene.connect("sca", "outColorR", "weird", "bSecond").unwrap();
        scene.connect("extra", "outColorR", "weird", "cThird").unwrap();

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        let plug = conv.convert_node("weird", "outColor").unwrap();
        assert_eq!(plug.node, "weird_UNSUPPORTED_NODE");
        assert_eq!(plug.attr, "out");
        assert!(conv.audit().lines().iter().any(|l| l.contains("dropped")));

        assert_eq!(
            scene.get_attr("weird_UNSUPPORTED_NODE", "operation").unwrap(),
            AttrValue::Int(0)
        );
        // Vector producer lands on the compound slot, scalar on the channel
        // slot, the third connection is dropped.
        let a = scene.connection_source("weird_UNSUPPORTED_NODE", "inputA").unwrap().unwrap();
        assert_eq!((a.node.as_str(), a.attr.as_str()), ("vec_rpr", "out"));
        let b = scene.connection_source("weird_UNSUPPORTED_NODE", "inputBX").unwrap().unwrap();
        assert_eq!((b.node.as_str(), b.attr.as_str()), ("sca_rpr", "outX"));
        assert!(!scene.node_exists("extra_rpr"));
    }

    #[test]
    fn test_foreign_node_rewired_in_place() {
        let mut scene = MemoryScene::new();
        scene.add_node("up", "aiAdd");
        scene.with_attr("up", "input1", AttrValue::Float(1.0));
        scene.with_attr("up", "input2", AttrValue::Float(2.0));
        scene.add_node("ramp", "ramp");
        scene.connect("up", "outColor", "ramp", "colorEntryList").unwrap();

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        let plug = conv.convert_node("ramp", "outColor").unwrap();
        assert_eq!(plug.node, "ramp");
        assert_eq!(plug.attr, "outColor");

        let rewired = scene.connection_source("ramp", "colorEntryList").unwrap().unwrap();
        assert_eq!(rewired.node, "up_rpr");
        assert_eq!(rewired.attr, "out");
    }
}
