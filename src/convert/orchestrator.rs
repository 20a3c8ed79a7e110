//! Scene-level conversion driver
//!
//! Walks the host scene in a fixed order: atmosphere first, then sky
//! environments, lights, and finally the assigned materials, which pull
//! their upstream texture graphs in on demand. Every top-level entity is
//! fault isolated; a failed conversion is logged and skipped, the run
//! continues. Cleanup of the source nodes is a separate pass so hosts can
//! inspect or render before discarding the originals.

use serde::Serialize;
use std::collections::BTreeSet;

use super::error::ConvertError;
use super::kind::{is_source_kind, LightKind, NodeKind};
use super::Converter;
use crate::scene::SceneGraph;

const ATMOSPHERE_KINDS: &[&str] = &["aiAtmosphereVolume", "aiFog"];
const SKY_KINDS: &[&str] = &["aiPhysicalSky", "aiSky"];

const RENDER_GLOBALS: &str = "defaultRenderGlobals";
const TARGET_GLOBALS: &str = "RadeonProRenderGlobals";
const TARGET_RENDERER: &str = "FireRender";

/// Tally of one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub environments: usize,
    pub lights: usize,
    pub materials: usize,
    pub failures: usize,
    pub removed: usize,
}

impl<G: SceneGraph> Converter<'_, G> {
    /// Convert everything the scene binds or lights with, then point the
    /// render globals at the target renderer.
    pub fn convert_scene(&mut self) -> RunSummary {
        let started = std::time::Instant::now();
        self.audit.begin_run();
        log::info!("starting scene conversion");

        for node in self.scene.list_nodes_of_kind(ATMOSPHERE_KINDS) {
            match self.convert_atmosphere(&node) {
                Ok(()) => self.summary.environments += 1,
                Err(err) => self.note_failure(&node, err),
            }
        }
        for node in self.scene.list_nodes_of_kind(SKY_KINDS) {
            match self.convert_environment(&node) {
                Ok(()) => self.summary.environments += 1,
                Err(err) => self.note_failure(&node, err),
            }
        }
        for node in self.scene.list_nodes_of_kind(LightKind::SOURCE_KINDS) {
            let Ok(kind) = self.scene.node_kind(&node) else {
                continue;
            };
            let Some(light) = LightKind::from_name(&kind) else {
                continue;
            };
            match self.convert_light(&node, light) {
                Ok(()) => self.summary.lights += 1,
                Err(err) => self.note_failure(&node, err),
            }
        }

        let mut shadow_matte = false;
        let mut converted: Vec<(String, String)> = Vec::new();
        for node in self.scene.list_nodes() {
            let Ok(kind) = self.scene.node_kind(&node) else {
                continue;
            };
            if !is_source_kind(&kind) || !NodeKind::from_name(&kind).is_material() {
                continue;
            }
            if !self.is_assigned(&node) {
                continue;
            }
            if kind == "aiShadowMatte" {
                shadow_matte = true;
            }
            match self.convert_node(&node, "") {
                Ok(plug) => {
                    self.summary.materials += 1;
                    converted.push((node, plug.node));
                }
                Err(err) => self.note_failure(&node, err),
            }
        }

        for (source, target) in converted {
            self.rebind(&source, &target);
        }

        self.configure_render_globals(shadow_matte);
        log::info!(
            "scene conversion done in {:.2?}: {} materials, {} lights, {} environments, {} failures",
            started.elapsed(),
            self.summary.materials,
            self.summary.lights,
            self.summary.environments,
            self.summary.failures
        );
        self.summary.clone()
    }

    /// Delete the source-schema nodes and the bindings of source materials.
    /// Converted nodes and geometry stay untouched.
    pub fn clean_scene(&mut self) -> RunSummary {
        let mut doomed = BTreeSet::new();
        for node in self.scene.list_nodes() {
            let Ok(kind) = self.scene.node_kind(&node) else {
                continue;
            };
            if !is_source_kind(&kind) {
                continue;
            }
            if NodeKind::from_name(&kind).is_material() {
                doomed.extend(self.scene.bindings_of(&node));
            }
            doomed.insert(node);
        }

        for node in doomed {
            match self.scene.delete_node(&node) {
                Ok(()) => self.summary.removed += 1,
                Err(err) => log::warn!("could not delete {}: {}", node, err),
            }
        }
        log::debug!("cleanup removed {} nodes", self.summary.removed);
        self.summary.clone()
    }

    /// The run tally so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    fn note_failure(&mut self, node: &str, err: ConvertError) {
        self.summary.failures += 1;
        self.audit
            .failure(format!("Conversion of {} failed: {}", node, err));
    }

    /// Move geometry from the source material's bindings onto the binding
    /// created for its converted counterpart.
    fn rebind(&mut self, source: &str, target: &str) {
        let Some(new_sg) = self.scene.bindings_of(target).into_iter().next() else {
            return;
        };
        let mut members = Vec::new();
        for sg in self.scene.bindings_of(source) {
            members.extend(self.scene.members(&sg));
        }
        for geometry in members {
            if let Err(err) = self.scene.assign(&geometry, &new_sg) {
                self.audit.failure(format!(
                    "Could not move {} to {}: {}",
                    geometry, new_sg, err
                ));
            }
        }
    }

    fn ensure_node(&mut self, name: &str, kind: &str) -> String {
        if self.scene.node_exists(name) {
            return name.to_string();
        }
        let created = self
            .scene
            .create_node(kind)
            .and_then(|n| self.scene.rename_node(&n, name));
        match created {
            Ok(n) => n,
            Err(_) => name.to_string(),
        }
    }

    fn configure_render_globals(&mut self, shadow_matte: bool) {
        let globals = self.ensure_node(RENDER_GLOBALS, RENDER_GLOBALS);
        self.set_property(&globals, "currentRenderer", TARGET_RENDERER);
        self.set_property(&globals, "imageFormat", 8);

        // Shadow catchers only composite correctly with these AOVs on.
        if shadow_matte {
            let globals = self.ensure_node(TARGET_GLOBALS, TARGET_GLOBALS);
            self.set_property(&globals, "aovOpacity", 1);
            self.set_property(&globals, "aovBackground", 1);
            self.set_property(&globals, "aovShadowCatcher", 1);
        }
    }
}

/// Convenience entry point: convert, then clean, in one call.
pub fn convert_and_clean<G: SceneGraph>(scene: &mut G, audit: super::AuditLog) -> RunSummary {
    let mut converter = Converter::new(scene, audit);
    converter.convert_scene();
    converter.clean_scene()
}
