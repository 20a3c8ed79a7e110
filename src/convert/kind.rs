//! Source node kind recognition
//!
//! The host graph tags nodes with open-ended kind strings. Dispatch narrows
//! them to this closed enumeration so the rule table is an exhaustive match
//! with compile-time coverage, plus catch-all arms for the two fallback
//! paths: unknown kinds inside the source namespace and schema-neutral
//! utility kinds that exist unmodified on both sides.

/// Prefix marking nodes that belong to the source schema.
pub const SOURCE_PREFIX: &str = "ai";

/// Source material kinds with no specific rule; they convert to a visibly
/// distinct placeholder material instead of the arithmetic fallback.
const PLACEHOLDER_MATERIALS: &[&str] = &[
    "aiLayerShader",
    "aiMatte",
    "aiPassthrough",
    "aiRaySwitch",
    "aiStandardHair",
    "aiSwitch",
    "aiToon",
    "aiTwoSided",
    "aiUtility",
    "aiWireframe",
];

/// Recognized source node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    // Materials
    AmbientOcclusion,
    CarPaint,
    Flat,
    MixShader,
    ShadowMatte,
    StandardSurface,
    StandardVolume,
    /// A known material kind that only gets the placeholder conversion.
    PlaceholderMaterial(String),

    // Bump / normal utilities
    Bump2d,
    AiBump2d,
    AiBump3d,
    NormalMap,
    VectorMap,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Abs,
    Atan,
    Cross,
    Dot,
    Pow,
    Trigo,
    MultiplyDivide,

    // Textures and lookups
    Image,
    Noise,
    CellNoise,
    FacingRatio,
    ThinFilm,
    ColorConvert,
    Curvature,
    Blackbody,

    /// Unrecognized kind inside the source namespace.
    Unsupported(String),
    /// Kind outside the source namespace, already valid in the target.
    Foreign(String),
}

impl NodeKind {
    pub fn from_name(kind: &str) -> NodeKind {
        match kind {
            "aiAmbientOcclusion" => NodeKind::AmbientOcclusion,
            "aiCarPaint" => NodeKind::CarPaint,
            "aiFlat" => NodeKind::Flat,
            "aiMixShader" => NodeKind::MixShader,
            "aiShadowMatte" => NodeKind::ShadowMatte,
            "aiStandardSurface" => NodeKind::StandardSurface,
            "aiStandardVolume" => NodeKind::StandardVolume,
            "bump2d" => NodeKind::Bump2d,
            "aiBump2d" => NodeKind::AiBump2d,
            "aiBump3d" => NodeKind::AiBump3d,
            "aiNormalMap" => NodeKind::NormalMap,
            "aiVectorMap" => NodeKind::VectorMap,
            "aiAdd" => NodeKind::Add,
            "aiSubtract" => NodeKind::Subtract,
            "aiMultiply" => NodeKind::Multiply,
            "aiDivide" => NodeKind::Divide,
            "aiAbs" => NodeKind::Abs,
            "aiAtan" => NodeKind::Atan,
            "aiCross" => NodeKind::Cross,
            "aiDot" => NodeKind::Dot,
            "aiPow" => NodeKind::Pow,
            "aiTrigo" => NodeKind::Trigo,
            "multiplyDivide" => NodeKind::MultiplyDivide,
            "aiImage" => NodeKind::Image,
            "aiNoise" => NodeKind::Noise,
            "aiCellNoise" => NodeKind::CellNoise,
            "aiFacingRatio" => NodeKind::FacingRatio,
            "aiThinFilm" => NodeKind::ThinFilm,
            "aiColorConvert" => NodeKind::ColorConvert,
            "aiCurvature" => NodeKind::Curvature,
            "aiBlackbody" => NodeKind::Blackbody,
            other if PLACEHOLDER_MATERIALS.contains(&other) => {
                NodeKind::PlaceholderMaterial(other.to_string())
            }
            other if is_source_kind(other) => NodeKind::Unsupported(other.to_string()),
            other => NodeKind::Foreign(other.to_string()),
        }
    }

    /// Whether this kind is a material that may carry a geometry binding.
    pub fn is_material(&self) -> bool {
        matches!(
            self,
            NodeKind::AmbientOcclusion
                | NodeKind::CarPaint
                | NodeKind::Flat
                | NodeKind::MixShader
                | NodeKind::ShadowMatte
                | NodeKind::StandardSurface
                | NodeKind::StandardVolume
                | NodeKind::PlaceholderMaterial(_)
        )
    }
}

/// Whether a kind string belongs to the source schema namespace.
pub fn is_source_kind(kind: &str) -> bool {
    kind.starts_with(SOURCE_PREFIX)
}

/// Light kinds; lights convert through their own table because they are
/// transform-bearing and never appear as upstream value producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Area,
    Mesh,
    Photometric,
    SkyDome,
}

impl LightKind {
    pub const SOURCE_KINDS: &'static [&'static str] = &[
        "aiAreaLight",
        "aiMeshLight",
        "aiPhotometricLight",
        "aiSkyDomeLight",
    ];

    pub fn from_name(kind: &str) -> Option<LightKind> {
        match kind {
            "aiAreaLight" => Some(LightKind::Area),
            "aiMeshLight" => Some(LightKind::Mesh),
            "aiPhotometricLight" => Some(LightKind::Photometric),
            "aiSkyDomeLight" => Some(LightKind::SkyDome),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_kinds() {
        assert_eq!(
            NodeKind::from_name("aiStandardSurface"),
            NodeKind::StandardSurface
        );
        assert_eq!(NodeKind::from_name("bump2d"), NodeKind::Bump2d);
        assert_eq!(NodeKind::from_name("multiplyDivide"), NodeKind::MultiplyDivide);
    }

    #[test]
    fn test_placeholder_material_kinds() {
        assert_eq!(
            NodeKind::from_name("aiToon"),
            NodeKind::PlaceholderMaterial("aiToon".to_string())
        );
        assert!(NodeKind::from_name("aiToon").is_material());
    }

    #[test]
    fn test_fallback_split_on_namespace() {
        assert_eq!(
            NodeKind::from_name("aiSomethingNew"),
            NodeKind::Unsupported("aiSomethingNew".to_string())
        );
        assert_eq!(
            NodeKind::from_name("ramp"),
            NodeKind::Foreign("ramp".to_string())
        );
    }

    #[test]
    fn test_light_kinds() {
        assert_eq!(LightKind::from_name("aiSkyDomeLight"), Some(LightKind::SkyDome));
        assert_eq!(LightKind::from_name("aiStandardSurface"), None);
    }
}
