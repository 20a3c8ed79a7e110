//! Environment singleton registry
//!
//! Only one image-based light, one procedural sky and one atmosphere volume
//! may exist scene-wide in the target schema. The registry hands out the
//! persistent instance for each, creating it lazily on first use, so that
//! repeated source environment nodes merge into the same target instead of
//! allocating duplicates. Scoped to one run, like the identity cache.

use crate::scene::{AttrValue, SceneError, SceneGraph};

/// Canonical name of the image-based light node.
pub const IBL_NAME: &str = "RPRIBL";
/// Canonical name of the procedural sky node.
pub const SKY_NAME: &str = "RPRSky";

/// Dome radius applied when the IBL node is first created.
const IBL_SCALE: f32 = 1001.256_637_061_44;
/// Extent of the geometry carrying the atmosphere volume material.
const VOLUME_SCALE: f32 = 2000.0;

#[derive(Debug, Default)]
pub struct EnvironmentRegistry {
    ibl: Option<String>,
    sky: Option<String>,
    volume: Option<String>,
}

impl EnvironmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The singleton image-based light, created on first request.
    pub fn ibl<G: SceneGraph>(&mut self, scene: &mut G) -> Result<String, SceneError> {
        if let Some(name) = &self.ibl {
            return Ok(name.clone());
        }
        // A previous run may have left the node behind; adopt it.
        let name = if scene.node_exists(IBL_NAME) {
            IBL_NAME.to_string()
        } else {
            let created = scene.create_node("RPRIBL")?;
            let created = scene.rename_node(&created, IBL_NAME)?;
            scene.set_attr(&created, "scaleX", AttrValue::Float(IBL_SCALE))?;
            scene.set_attr(&created, "scaleY", AttrValue::Float(IBL_SCALE))?;
            scene.set_attr(&created, "scaleZ", AttrValue::Float(IBL_SCALE))?;
            created
        };
        self.ibl = Some(name.clone());
        Ok(name)
    }

    /// The singleton sky node, created on first request.
    pub fn sky<G: SceneGraph>(&mut self, scene: &mut G) -> Result<String, SceneError> {
        if let Some(name) = &self.sky {
            return Ok(name.clone());
        }
        let name = if scene.node_exists(SKY_NAME) {
            SKY_NAME.to_string()
        } else {
            let created = scene.create_node("RPRSky")?;
            scene.rename_node(&created, SKY_NAME)?
        };
        self.sky = Some(name.clone());
        Ok(name)
    }

    /// The singleton atmosphere volume material, with its carrier geometry
    /// and binding, created on first request.
    pub fn volume<G: SceneGraph>(&mut self, scene: &mut G) -> Result<String, SceneError> {
        if let Some(name) = &self.volume {
            return Ok(name.clone());
        }
        let material = scene.create_node("RPRVolumeMaterial")?;
        let sg = scene.create_binding(&format!("{}SG", material))?;
        scene.connect(&material, "outColor", &sg, "volumeShader")?;

        let carrier = scene.create_node("mesh")?;
        let carrier = scene.rename_node(&carrier, "Volume")?;
        scene.set_attr(&carrier, "scaleX", AttrValue::Float(VOLUME_SCALE))?;
        scene.set_attr(&carrier, "scaleY", AttrValue::Float(VOLUME_SCALE))?;
        scene.set_attr(&carrier, "scaleZ", AttrValue::Float(VOLUME_SCALE))?;
        scene.assign(&carrier, &sg)?;

        self.volume = Some(material.clone());
        Ok(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;

    #[test]
    fn test_ibl_created_once() {
        let mut scene = MemoryScene::new();
        let mut env = EnvironmentRegistry::new();

        let first = env.ibl(&mut scene).unwrap();
        let second = env.ibl(&mut scene).unwrap();
        assert_eq!(first, second);
        assert_eq!(scene.list_nodes_of_kind(&["RPRIBL"]).len(), 1);
        assert_eq!(
            scene.get_attr(&first, "scaleX").unwrap(),
            AttrValue::Float(1001.256_637_061_44)
        );
    }

    #[test]
    fn test_existing_ibl_is_adopted() {
        let mut scene = MemoryScene::new();
        scene.add_node(IBL_NAME, "RPRIBL");

        let mut env = EnvironmentRegistry::new();
        let name = env.ibl(&mut scene).unwrap();
        assert_eq!(name, IBL_NAME);
        assert_eq!(scene.list_nodes_of_kind(&["RPRIBL"]).len(), 1);
    }

    #[test]
    fn test_volume_has_carrier_and_binding() {
        let mut scene = MemoryScene::new();
        let mut env = EnvironmentRegistry::new();

        let material = env.volume(&mut scene).unwrap();
        let bindings = scene.bindings_of(&material);
        assert_eq!(bindings.len(), 1);
        assert_eq!(scene.members(&bindings[0]), vec!["Volume".to_string()]);

        // Second request reuses the same material.
        assert_eq!(env.volume(&mut scene).unwrap(), material);
    }
}
