//! Light and environment rules
//!
//! Lights are converted eagerly by the orchestrator rather than pulled in
//! through attribute resolution. Dome lights, procedural skies and
//! atmosphere nodes collapse onto the scene-wide environment singletons;
//! repeated sources merge, last writer wins per attribute.

use crate::convert::error::ConvertResult;
use crate::convert::kind::LightKind;
use crate::convert::Converter;
use crate::scene::SceneGraph;

const TRANSFORM_ATTRS: &[&str] = &[
    "translateX",
    "translateY",
    "translateZ",
    "rotateX",
    "rotateY",
    "rotateZ",
    "scaleX",
    "scaleY",
    "scaleZ",
];

impl<G: SceneGraph> Converter<'_, G> {
    pub(crate) fn convert_light(&mut self, source: &str, kind: LightKind) -> ConvertResult<()> {
        match kind {
            LightKind::SkyDome => self.convert_sky_dome(source),
            LightKind::Photometric => self.convert_photometric_light(source),
            LightKind::Area => self.convert_area_light(source),
            LightKind::Mesh => self.convert_mesh_light(source),
        }
    }

    /// Sky-type environment nodes, converted ahead of the lights proper.
    pub(crate) fn convert_environment(&mut self, source: &str) -> ConvertResult<()> {
        match self.scene.node_kind(source)?.as_str() {
            "aiPhysicalSky" => self.convert_physical_sky(source),
            _ => self.convert_sky(source),
        }
    }

    fn copy_transform(&mut self, target: &str, source: &str, attrs: &[&str]) -> ConvertResult<()> {
        for attr in attrs {
            self.copy_property(target, source, attr, attr)?;
        }
        Ok(())
    }

    /// Image path of a file node feeding the given attribute, if any.
    fn image_path(&mut self, source: &str, attr: &str) -> Option<String> {
        let plug = self.scene.connection_source(source, attr).ok()??;
        if self.scene.node_kind(&plug.node).as_deref() != Ok("file") {
            return None;
        }
        self.scene
            .get_attr(&plug.node, "fileTextureName")
            .ok()?
            .as_str()
            .map(str::to_string)
    }

    fn convert_sky_dome(&mut self, source: &str) -> ConvertResult<()> {
        let ibl = self.env.ibl(self.scene)?;
        self.begin_entry(source, &ibl);

        // Exposure folds into the intensity in stops.
        let intensity =
            self.scalar(source, "intensity") * 2.0_f32.powf(self.scalar(source, "exposure"));
        self.set_property(&ibl, "intensity", intensity);
        // The dome image faces the opposite way in the target schema.
        let rotate = self.scalar(source, "rotateY") + 180.0;
        self.set_property(&ibl, "rotateY", rotate);
        if let Some(path) = self.image_path(source, "color") {
            self.set_property(&ibl, "filePath", path);
        }

        self.end_entry(source);
        Ok(())
    }

    fn convert_sky(&mut self, source: &str) -> ConvertResult<()> {
        let ibl = self.env.ibl(self.scene)?;
        self.begin_entry(source, &ibl);

        self.copy_property(&ibl, source, "intensity", "intensity")?;
        if let Some(path) = self.image_path(source, "color") {
            self.set_property(&ibl, "filePath", path);
        }

        self.end_entry(source);
        Ok(())
    }

    fn convert_physical_sky(&mut self, source: &str) -> ConvertResult<()> {
        let sky = self.env.sky(self.scene)?;
        self.begin_entry(source, &sky);

        self.copy_property(&sky, source, "turbidity", "turbidity")?;
        self.copy_property(&sky, source, "intensity", "intensity")?;
        self.copy_property(&sky, source, "altitude", "elevation")?;
        self.copy_property(&sky, source, "azimuth", "azimuth")?;
        self.copy_property(&sky, source, "groundColor", "groundAlbedo")?;
        self.copy_property(&sky, source, "sunDiskSize", "sunSize")?;

        self.end_entry(source);
        Ok(())
    }

    fn convert_photometric_light(&mut self, source: &str) -> ConvertResult<()> {
        let target = self.allocate("RPRIES", source, "_rpr")?;
        self.begin_entry(source, &target);

        self.copy_transform(
            &target,
            source,
            &["translateX", "translateY", "translateZ", "scaleX", "scaleY", "scaleZ"],
        )?;
        // Profiles point down the other axis in the target schema.
        let rotate = self.scalar(source, "rotateX") + 90.0;
        self.set_property(&target, "rotateX", rotate);
        self.copy_property(&target, source, "rotateY", "rotateY")?;
        self.copy_property(&target, source, "rotateZ", "rotateZ")?;

        self.copy_property(&target, source, "color", "color")?;
        let intensity =
            self.scalar(source, "intensity") * (self.scalar(source, "exposure") + 5.0) / 500.0;
        self.set_property(&target, "intensity", intensity);
        self.copy_property(&target, source, "iesFile", "aiFilename")?;

        self.end_entry(source);
        Ok(())
    }

    fn convert_area_light(&mut self, source: &str) -> ConvertResult<()> {
        let target = self.allocate("RPRPhysicalLight", source, "_rpr")?;
        self.begin_entry(source, &target);

        self.copy_transform(&target, source, TRANSFORM_ATTRS)?;
        self.copy_property(&target, source, "lightIntensity", "intensity")?;
        self.copy_property(&target, source, "colorPicker", "color")?;
        self.copy_property(&target, source, "luminousEfficacy", "exposure")?;

        self.end_entry(source);
        Ok(())
    }

    fn convert_mesh_light(&mut self, source: &str) -> ConvertResult<()> {
        let target = self.allocate("RPRPhysicalLight", source, "_rpr")?;
        self.begin_entry(source, &target);

        self.set_property(&target, "lightType", 0);
        self.set_property(&target, "areaLightShape", 4);
        self.copy_transform(&target, source, TRANSFORM_ATTRS)?;
        self.copy_property(&target, source, "lightIntensity", "intensity")?;
        self.copy_property(&target, source, "colorPicker", "color")?;
        self.copy_property(&target, source, "luminousEfficacy", "aiExposure")?;
        if self.scalar(source, "aiUseColorTemperature") != 0.0 {
            self.set_property(&target, "colorMode", 1);
            self.copy_property(&target, source, "temperature", "aiColorTemperature")?;
        }
        self.copy_property(&target, source, "shadowsEnabled", "aiCastShadows")?;
        self.copy_property(&target, source, "shadowsSoftness", "aiShadowDensity")?;

        self.end_entry(source);
        Ok(())
    }

    /// Atmosphere nodes merge into the singleton scene volume.
    pub(crate) fn convert_atmosphere(&mut self, source: &str) -> ConvertResult<()> {
        let kind = self.scene.node_kind(source)?;
        let volume = self.env.volume(self.scene)?;
        self.begin_entry(source, &volume);

        self.set_property(&volume, "multiscatter", 0);
        if kind == "aiFog" {
            self.copy_property(&volume, source, "emissionColor", "color")?;
            if let Some(color) = self.scene.get_attr(source, "color").ok().and_then(|v| v.as_vector())
            {
                let density = (color[0] + color[1] + color[2]) / 3.0;
                self.set_property(&volume, "density", density);
            }
        } else {
            self.copy_property(&volume, source, "scatterColor", "rgbDensity")?;
            self.copy_property(&volume, source, "transmissionColor", "rgbDensity")?;
            self.copy_property(&volume, source, "scatteringDirection", "eccentricity")?;
            let density = self.scalar(source, "scatteringAmount") / 10.0;
            self.set_property(&volume, "density", density);
        }

        self.end_entry(source);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::env::{IBL_NAME, SKY_NAME};
    use crate::convert::kind::LightKind;
    use crate::convert::{AuditLog, Converter};
    use crate::scene::{AttrValue, MemoryScene, SceneGraph};

    #[test]
    fn test_sky_dome_folds_exposure_and_flips_rotation() {
        let mut scene = MemoryScene::new();
        scene.add_node("dome", "aiSkyDomeLight");
        scene.with_attr("dome", "intensity", AttrValue::Float(2.0));
        scene.with_attr("dome", "exposure", AttrValue::Float(1.0));
        scene.with_attr("dome", "rotateY", AttrValue::Float(30.0));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_light("dome", LightKind::SkyDome).unwrap();

        assert_eq!(scene.get_attr(IBL_NAME, "intensity").unwrap(), AttrValue::Float(4.0));
        assert_eq!(scene.get_attr(IBL_NAME, "rotateY").unwrap(), AttrValue::Float(210.0));
    }

    #[test]
    fn test_repeated_domes_merge_into_one_ibl() {
        let mut scene = MemoryScene::new();
        for (name, intensity) in [("domeA", 1.0), ("domeB", 3.0)] {
            scene.add_node(name, "aiSkyDomeLight");
            scene.with_attr(name, "intensity", AttrValue::Float(intensity));
            scene.with_attr(name, "exposure", AttrValue::Float(0.0));
        }

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_light("domeA", LightKind::SkyDome).unwrap();
        conv.convert_light("domeB", LightKind::SkyDome).unwrap();

        assert_eq!(scene.list_nodes_of_kind(&["RPRIBL"]).len(), 1);
        // Last writer wins.
        assert_eq!(scene.get_attr(IBL_NAME, "intensity").unwrap(), AttrValue::Float(3.0));
    }

    #[test]
    fn test_dome_image_becomes_environment_path() {
        let mut scene = MemoryScene::new();
        scene.add_node("env", "file");
        scene.with_attr("env", "fileTextureName", AttrValue::Str("studio.hdr".into()));
        scene.add_node("dome", "aiSkyDomeLight");
        scene.with_attr("dome", "intensity", AttrValue::Float(1.0));
        scene.with_attr("dome", "exposure", AttrValue::Float(0.0));
        scene.connect("env", "outColor", "dome", "color").unwrap();

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_light("dome", LightKind::SkyDome).unwrap();

        assert_eq!(
            scene.get_attr(IBL_NAME, "filePath").unwrap(),
            AttrValue::Str("studio.hdr".into())
        );
    }

    #[test]
    fn test_physical_sky_singleton() {
        let mut scene = MemoryScene::new();
        for (name, elevation) in [("skyA", 20.0), ("skyB", 45.0)] {
            scene.add_node(name, "aiPhysicalSky");
            scene.with_attr(name, "elevation", AttrValue::Float(elevation));
            scene.with_attr(name, "turbidity", AttrValue::Float(3.0));
        }

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_environment("skyA").unwrap();
        conv.convert_environment("skyB").unwrap();

        assert_eq!(scene.list_nodes_of_kind(&["RPRSky"]).len(), 1);
        assert_eq!(scene.get_attr(SKY_NAME, "altitude").unwrap(), AttrValue::Float(45.0));
    }

    #[test]
    fn test_photometric_light_offsets_and_intensity() {
        let mut scene = MemoryScene::new();
        scene.add_node("ies", "aiPhotometricLight");
        scene.with_attr("ies", "rotateX", AttrValue::Float(-90.0));
        scene.with_attr("ies", "intensity", AttrValue::Float(1000.0));
        scene.with_attr("ies", "exposure", AttrValue::Float(0.0));
        scene.with_attr("ies", "aiFilename", AttrValue::Str("lamp.ies".into()));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_light("ies", LightKind::Photometric).unwrap();

        assert_eq!(scene.node_kind("ies_rpr").unwrap(), "RPRIES");
        assert_eq!(scene.get_attr("ies_rpr", "rotateX").unwrap(), AttrValue::Float(0.0));
        assert_eq!(scene.get_attr("ies_rpr", "intensity").unwrap(), AttrValue::Float(10.0));
        assert_eq!(
            scene.get_attr("ies_rpr", "iesFile").unwrap(),
            AttrValue::Str("lamp.ies".into())
        );
    }

    #[test]
    fn test_mesh_light_color_temperature_mode() {
        let mut scene = MemoryScene::new();
        scene.add_node("lamp", "aiMeshLight");
        scene.with_attr("lamp", "intensity", AttrValue::Float(5.0));
        scene.with_attr("lamp", "aiUseColorTemperature", AttrValue::Bool(true));
        scene.with_attr("lamp", "aiColorTemperature", AttrValue::Float(4500.0));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_light("lamp", LightKind::Mesh).unwrap();

        assert_eq!(scene.get_attr("lamp_rpr", "areaLightShape").unwrap(), AttrValue::Int(4));
        assert_eq!(scene.get_attr("lamp_rpr", "colorMode").unwrap(), AttrValue::Int(1));
        assert_eq!(scene.get_attr("lamp_rpr", "temperature").unwrap(), AttrValue::Float(4500.0));
    }

    #[test]
    fn test_fog_derives_density_from_color() {
        let mut scene = MemoryScene::new();
        scene.add_node("fog", "aiFog");
        scene.with_attr("fog", "color", AttrValue::Vector([0.3, 0.6, 0.9]));

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_atmosphere("fog").unwrap();

        let volumes = scene.list_nodes_of_kind(&["RPRVolumeMaterial"]);
        assert_eq!(volumes.len(), 1);
        match scene.get_attr(&volumes[0], "density").unwrap() {
            AttrValue::Float(f) => assert!((f - 0.6).abs() < 1e-6),
            other => panic!("unexpected value {:?}", other),
        }
        assert_eq!(scene.get_attr(&volumes[0], "multiscatter").unwrap(), AttrValue::Int(0));
    }

    #[test]
    fn test_atmosphere_volume_merges_into_one_volume() {
        let mut scene = MemoryScene::new();
        for name in ["atmoA", "atmoB"] {
            scene.add_node(name, "aiAtmosphereVolume");
            scene.with_attr(name, "scatteringAmount", AttrValue::Float(2.0));
            scene.with_attr(name, "rgbDensity", AttrValue::Vector([0.5, 0.5, 0.5]));
        }

        let mut conv = Converter::new(&mut scene, AuditLog::memory());
        conv.convert_atmosphere("atmoA").unwrap();
        conv.convert_atmosphere("atmoB").unwrap();

        assert_eq!(scene.list_nodes_of_kind(&["RPRVolumeMaterial"]).len(), 1);
    }
}
