use std::path::{Path, PathBuf};

use crate::{
    error::SceneError, light::LightingSetup, material::MaterialEntry, registry::TextureSource,
    shader_state::DrawDescriptor,
};

/// Scene content: which textures and materials exist, how the scene is lit
/// and the objects drawn every frame, in order.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SceneDescription {
    /// Directory texture paths are relative to.
    #[serde(skip)]
    pub base_dir: PathBuf,
    #[serde(default)]
    pub textures: Vec<TextureSource>,
    #[serde(default)]
    pub materials: Vec<MaterialEntry>,
    #[serde(default)]
    pub lights: LightingSetup,
    #[serde(default)]
    pub objects: Vec<DrawDescriptor>,
}

impl SceneDescription {
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut description = Self::from_json_str(&json)?;
        description.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gpu::PrimitiveMesh, shader_state::Surface};

    #[test]
    fn parses_description() {
        let description = SceneDescription::from_json_str(
            r#"{
                "textures": [{ "path": "textures/marble.png", "tag": "marbleFloor" }],
                "materials": [{
                    "tag": "default",
                    "diffuse": [1.0, 1.0, 1.0],
                    "specular": [0.4, 0.4, 0.4],
                    "shininess": 32.0
                }],
                "objects": [{
                    "mesh": "plane",
                    "transform": { "scale": [20.0, 1.0, 10.0] },
                    "surface": { "texture": { "tag": "marbleFloor", "uv_scale": [5.0, 5.0] } },
                    "material": "default"
                }, {
                    "mesh": "tapered_cylinder",
                    "surface": { "color": [0.9, 0.9, 0.9, 1.0] }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(description.textures[0].tag, "marbleFloor");
        assert_eq!(description.materials[0].shininess, 32.0);
        assert_eq!(description.lights, LightingSetup::default());
        assert_eq!(description.objects.len(), 2);
        assert_eq!(description.objects[1].mesh, PrimitiveMesh::TaperedCylinder);
        assert_eq!(
            description.objects[1].surface,
            Surface::Color([0.9, 0.9, 0.9, 1.0])
        );
    }

    #[test]
    fn paths_resolve_next_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, "{}").unwrap();

        let description = SceneDescription::from_path(&path).unwrap();

        assert_eq!(description.base_dir, dir.path());
        assert!(description.objects.is_empty());
    }

    #[test]
    fn bundled_demo_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/breakfast.json");

        let description = SceneDescription::from_path(&path).unwrap();

        assert_eq!(description.textures.len(), 4);
        assert!(description.base_dir.ends_with("demos"));
        assert!(
            description
                .objects
                .iter()
                .filter_map(|object| object.material.as_deref())
                .all(|tag| description.materials.iter().any(|m| m.tag == tag))
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SceneDescription::from_path("no/such/scene.json").unwrap_err();
        assert!(matches!(err, SceneError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = SceneDescription::from_json_str("{ \"objects\": 3 }").unwrap_err();
        assert!(matches!(err, SceneError::Description(_)));
    }
}
