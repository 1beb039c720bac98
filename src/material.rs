use crate::error::MaterialError;

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct MaterialEntry {
    pub tag: String,
    #[serde(rename = "diffuse")]
    pub diffuse_color: [f32; 3],
    #[serde(rename = "specular")]
    pub specular_color: [f32; 3],
    pub shininess: f32,
}

/// Surface materials addressed by tag. Definitions are immutable once added;
/// when a tag is defined twice the first definition is the one resolved.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<MaterialEntry>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(
        &mut self,
        tag: impl Into<String>,
        diffuse_color: [f32; 3],
        specular_color: [f32; 3],
        shininess: f32,
    ) -> Result<(), MaterialError> {
        self.insert(MaterialEntry {
            tag: tag.into(),
            diffuse_color,
            specular_color,
            shininess,
        })
    }

    pub fn insert(&mut self, material: MaterialEntry) -> Result<(), MaterialError> {
        if !material.shininess.is_finite() || material.shininess < 0.0 {
            return Err(MaterialError::InvalidShininess {
                tag: material.tag,
                shininess: material.shininess,
            });
        }

        if self.resolve(&material.tag).is_some() {
            log::warn!(
                "Material \"{}\" is already defined, the new definition will never be resolved",
                material.tag
            );
        }

        self.materials.push(material);
        Ok(())
    }

    /// First material defined under `tag`, if any.
    pub fn resolve(&self, tag: &str) -> Option<&MaterialEntry> {
        self.materials.iter().find(|material| material.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialEntry> {
        self.materials.iter()
    }
}
