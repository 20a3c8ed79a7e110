//! Texture, bump and lookup node rules

use crate::convert::cache::{Conversion, PlugMap};
use crate::convert::error::{ConvertError, ConvertResult};
use crate::convert::Converter;
use crate::scene::SceneGraph;

const NORMAL_OUT: &[(&str, &str)] = &[
    ("outNormal", "out"),
    ("outNormalX", "outX"),
    ("outNormalY", "outY"),
    ("outNormalZ", "outZ"),
];

const VALUE_OUT: &[(&str, &str)] = &[
    ("outValue", "out"),
    ("outValueX", "outX"),
    ("outValueY", "outY"),
    ("outValueZ", "outZ"),
];

const FACING_RATIO_OUT: &[(&str, &str)] = &[
    ("message", "out"),
    ("outTransparency", "out"),
    ("outTransparencyR", "outX"),
    ("outTransparencyG", "outY"),
    ("outTransparencyB", "outZ"),
    ("outValue", "outX"),
];

/// Fresnel has a single output; every requested channel collapses onto it.
const THIN_FILM_OUT: &[(&str, &str)] = &[
    ("outColor", "out"),
    ("outColorR", "out"),
    ("outColorG", "out"),
    ("outColorB", "out"),
];

const OCCLUSION_OUT: &[(&str, &str)] = &[
    ("outColor", "output"),
    ("outColorR", "outputR"),
    ("outColorG", "outputG"),
    ("outColorB", "outputB"),
];

const RGB_OUT: &[(&str, &str)] = &[
    ("outColor", "outRgb"),
    ("outColorR", "outRgbR"),
    ("outColorG", "outRgbG"),
    ("outColorB", "outRgbB"),
];

const HSV_OUT: &[(&str, &str)] = &[
    ("outColor", "outHsv"),
    ("outColorR", "outHsvH"),
    ("outColorG", "outHsvS"),
    ("outColorB", "outHsvV"),
];

/// Placement plugs wired from a 2d texture placement node into a file node.
const PLACEMENT_PLUGS: &[(&str, &str)] = &[
    ("coverage", "coverage"),
    ("translateFrame", "translateFrame"),
    ("rotateFrame", "rotateFrame"),
    ("mirrorU", "mirrorU"),
    ("mirrorV", "mirrorV"),
    ("stagger", "stagger"),
    ("wrapU", "wrapU"),
    ("wrapV", "wrapV"),
    ("repeatUV", "repeatUV"),
    ("offset", "offset"),
    ("rotateUV", "rotateUV"),
    ("noiseUV", "noiseUV"),
    ("vertexUvOne", "vertexUvOne"),
    ("vertexUvTwo", "vertexUvTwo"),
    ("vertexUvThree", "vertexUvThree"),
    ("vertexCameraOne", "vertexCameraOne"),
    ("outUV", "uv"),
    ("outUvFilterSize", "uvFilterSize"),
];

impl<G: SceneGraph> Converter<'_, G> {
    /// Connect the upstream image producer into a bump/normal target, but
    /// only when one is attached; an unconnected slot stays unconnected.
    fn connect_bump_image(&mut self, source: &str, source_attr: &str, target: &str) {
        if let Ok(Some(plug)) = self.scene().connection_source(source, source_attr) {
            if self.scene().node_kind(&plug.node).as_deref() == Ok("file") {
                self.connect_property(&plug.node, "outColor", target, "color");
            }
        }
    }

    /// Schema-neutral bump node: the interpolation switch selects between a
    /// height-bump target and a tangent-space normal target.
    pub(crate) fn convert_bump2d(&mut self, source: &str) -> ConvertResult<Conversion> {
        let bump_interp = self.scalar(source, "bumpInterp") as i32;
        let target_kind = if bump_interp == 0 { "RPRBump" } else { "RPRNormal" };

        let target = self.allocate(target_kind, source, "_rpr")?;
        self.begin_entry(source, &target);

        self.connect_bump_image(source, "bumpValue", &target);
        self.copy_property(&target, source, "strength", "bumpDepth")?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Table(NORMAL_OUT)))
    }

    /// Source-schema 2d/3d bump nodes, which share their attribute layout.
    pub(crate) fn convert_source_bump(&mut self, source: &str) -> ConvertResult<Conversion> {
        let target = self.allocate("RPRBump", source, "_rpr")?;
        self.begin_entry(source, &target);

        self.connect_bump_image(source, "bumpMap", &target);
        self.copy_property(&target, source, "strength", "bumpHeight")?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Table(VALUE_OUT)))
    }

    /// Normal and vector displacement maps; they differ only in the name of
    /// the strength attribute on the source side.
    pub(crate) fn convert_normal_map(
        &mut self,
        source: &str,
        strength_attr: &str,
    ) -> ConvertResult<Conversion> {
        let target = self.allocate("RPRNormal", source, "_rpr")?;
        self.begin_entry(source, &target);

        if self.has_connection(source, "input") {
            self.copy_property(&target, source, "color", "input")?;
        } else {
            self.copy_property(&target, source, "color", "normal")?;
        }
        self.copy_property(&target, source, "strength", strength_attr)?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Table(VALUE_OUT)))
    }

    /// Image node: a color-managed file read plus the standard placement
    /// rig. Output plug names carry over unchanged.
    pub(crate) fn convert_image(&mut self, source: &str) -> ConvertResult<Conversion> {
        let target = self.allocate("file", source, "_rpr")?;
        self.begin_entry(source, &target);

        let placement = self.scene().create_node("place2dTexture")?;
        for (src_plug, dst_plug) in PLACEMENT_PLUGS {
            self.connect_property(&placement, src_plug, &target, dst_plug);
        }

        if let Ok(path) = self.get_property(source, "filename") {
            self.set_property(&target, "fileTextureName", path);
        }
        if let Ok(space) = self.get_property(source, "colorSpace") {
            self.set_property(&target, "colorSpace", space);
        }
        self.copy_property(&target, source, "useFrameExtension", "useFrameExtension")?;
        self.copy_property(&target, source, "frameExtension", "frame")?;
        self.copy_property(
            &target,
            source,
            "ignoreColorSpaceFileRules",
            "ignoreColorSpaceFileRules",
        )?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    pub(crate) fn convert_noise(&mut self, source: &str) -> ConvertResult<Conversion> {
        let target = self.allocate("noise", source, "_rpr")?;
        self.begin_entry(source, &target);

        let placement = self.scene().create_node("place2dTexture")?;
        self.connect_property(&placement, "outUV", &target, "uv");
        self.connect_property(&placement, "outUvFilterSize", &target, "uvFilterSize");

        self.copy_property(&target, source, "frequencyRatio", "octaves")?;
        self.copy_property(&target, source, "frequency", "octaves")?;
        self.copy_property(&target, source, "threshold", "distortion")?;
        self.copy_property(&target, source, "ratio", "lacunarity")?;
        self.copy_property(&target, source, "amplitude", "amplitude")?;
        self.copy_property(&target, source, "defaultColor", "color1")?;
        self.copy_property(&target, source, "colorGain", "color1")?;
        self.copy_property(&target, source, "colorOffset", "color2")?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    pub(crate) fn convert_cell_noise(&mut self, source: &str) -> ConvertResult<Conversion> {
        let target = self.allocate("noise", source, "_rpr")?;
        self.begin_entry(source, &target);

        let placement = self.scene().create_node("place2dTexture")?;
        self.connect_property(&placement, "outUV", &target, "uv");
        self.connect_property(&placement, "outUvFilterSize", &target, "uvFilterSize");

        self.copy_property(&target, source, "frequencyRatio", "octaves")?;
        self.copy_property(&target, source, "frequency", "octaves")?;
        self.copy_property(&target, source, "ratio", "lacunarity")?;
        self.copy_property(&target, source, "amplitude", "amplitude")?;
        self.copy_property(&target, source, "defaultColor", "color")?;
        self.copy_property(&target, source, "colorGain", "color")?;
        self.copy_property(&target, source, "colorOffset", "palette")?;
        self.copy_property(&target, source, "density", "density")?;
        self.copy_property(&target, source, "randomness", "randomness")?;

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Same))
    }

    /// Facing ratio becomes an incident-angle lookup.
    pub(crate) fn convert_facing_ratio(&mut self, source: &str) -> ConvertResult<Conversion> {
        let target = self.allocate("RPRLookup", source, "_rpr")?;
        self.begin_entry(source, &target);
        self.set_property(&target, "type", 3);
        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Table(FACING_RATIO_OUT)))
    }

    /// Thin film approximated by a fresnel with the mean of the three film
    /// interface IORs.
    pub(crate) fn convert_thin_film(&mut self, source: &str) -> ConvertResult<Conversion> {
        let target = self.allocate("RPRFresnel", source, "_rpr")?;
        self.begin_entry(source, &target);

        let ior = (self.scalar(source, "iorMedium")
            + self.scalar(source, "iorFilm")
            + self.scalar(source, "iorInternal"))
            / 3.0;
        self.set_property(&target, "ior", ior);

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Table(THIN_FILM_OUT)))
    }

    /// Color space conversion supports the two directions the target schema
    /// has utility nodes for; anything else is a bad-value failure.
    pub(crate) fn convert_color_convert(&mut self, source: &str) -> ConvertResult<Conversion> {
        let from = self.scalar(source, "from") as i32;
        let to = self.scalar(source, "to") as i32;

        let (kind, input_attr, out) = match (from, to) {
            (0, 1) => ("rgbToHsv", "inRgb", HSV_OUT),
            (1, 0) => ("hsvToRgb", "inHsv", RGB_OUT),
            _ => {
                return Err(ConvertError::BadValue {
                    node: source.to_string(),
                    attr: "from".to_string(),
                })
            }
        };

        let target = self.allocate(kind, source, "_rpr")?;
        self.begin_entry(source, &target);
        self.copy_property(&target, source, input_attr, "input")?;
        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Table(out)))
    }

    /// Curvature approximated by an inverted ambient occlusion probe.
    pub(crate) fn convert_curvature(&mut self, source: &str) -> ConvertResult<Conversion> {
        let target = self.allocate("RPRAmbientOcclusion", source, "_rpr")?;
        self.begin_entry(source, &target);

        self.set_property(&target, "side", 1);
        self.set_property(&target, "occludedColor", [1.0, 1.0, 1.0]);
        self.set_property(&target, "unoccludedColor", [0.0, 0.0, 0.0]);
        if !self.has_connection(source, "radius") {
            let radius = self.scalar(source, "radius") / 100.0;
            self.set_property(&target, "radius", radius);
        }

        self.end_entry(source);
        Ok(Conversion::new(target, PlugMap::Table(OCCLUSION_OUT)))
    }
}
