use std::fmt;

use cgmath::SquareMatrix;
use strum::IntoEnumIterator;

/// Number of point light slots the shader program declares.
pub const POINT_LIGHT_SLOTS: usize = 4;

/// Per-light uniform members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
pub enum LightField {
    #[strum(serialize = "bActive")]
    Active,
    #[strum(serialize = "direction")]
    Direction,
    #[strum(serialize = "position")]
    Position,
    #[strum(serialize = "ambient")]
    Ambient,
    #[strum(serialize = "diffuse")]
    Diffuse,
    #[strum(serialize = "specular")]
    Specular,
    #[strum(serialize = "cutOff")]
    CutOff,
    #[strum(serialize = "outerCutOff")]
    OuterCutOff,
    #[strum(serialize = "constant")]
    Constant,
    #[strum(serialize = "linear")]
    Linear,
    #[strum(serialize = "quadratic")]
    Quadratic,
}

impl LightField {
    fn kind(self) -> UniformKind {
        match self {
            LightField::Active => UniformKind::Bool,
            LightField::Direction
            | LightField::Position
            | LightField::Ambient
            | LightField::Diffuse
            | LightField::Specular => UniformKind::Vec3,
            LightField::CutOff
            | LightField::OuterCutOff
            | LightField::Constant
            | LightField::Linear
            | LightField::Quadratic => UniformKind::Float,
        }
    }
}

/// The uniforms the scene shader program understands. Every write goes
/// through this table, so a misspelled uniform is a compile error instead of
/// a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformName {
    Model,
    ObjectColor,
    ObjectTexture,
    UseTexture,
    UseLighting,
    UvScale,
    MaterialDiffuse,
    MaterialSpecular,
    MaterialShininess,
    DirectionalLight(LightField),
    PointLight(usize, LightField),
    SpotLight(LightField),
}

impl UniformName {
    /// All names the shader declares, in the order the uniform block is laid out.
    pub fn all() -> Vec<UniformName> {
        let mut names = vec![
            UniformName::Model,
            UniformName::ObjectColor,
            UniformName::ObjectTexture,
            UniformName::UseTexture,
            UniformName::UseLighting,
            UniformName::UvScale,
            UniformName::MaterialDiffuse,
            UniformName::MaterialSpecular,
            UniformName::MaterialShininess,
        ];

        names.extend(LightField::iter().map(UniformName::DirectionalLight));
        for index in 0..POINT_LIGHT_SLOTS {
            names.extend(LightField::iter().map(|field| UniformName::PointLight(index, field)));
        }
        names.extend(LightField::iter().map(UniformName::SpotLight));

        names.retain(UniformName::is_declared);
        names
    }

    /// Whether the shader program actually declares this uniform.
    pub fn is_declared(&self) -> bool {
        match *self {
            UniformName::DirectionalLight(field) => matches!(
                field,
                LightField::Active
                    | LightField::Direction
                    | LightField::Ambient
                    | LightField::Diffuse
                    | LightField::Specular
            ),
            UniformName::PointLight(index, field) => {
                index < POINT_LIGHT_SLOTS
                    && matches!(
                        field,
                        LightField::Active
                            | LightField::Position
                            | LightField::Ambient
                            | LightField::Diffuse
                            | LightField::Specular
                    )
            }
            _ => true,
        }
    }

    pub fn kind(&self) -> UniformKind {
        match self {
            UniformName::Model => UniformKind::Mat4,
            UniformName::ObjectColor => UniformKind::Vec4,
            UniformName::ObjectTexture => UniformKind::Int,
            UniformName::UseTexture | UniformName::UseLighting => UniformKind::Bool,
            UniformName::UvScale => UniformKind::Vec2,
            UniformName::MaterialDiffuse | UniformName::MaterialSpecular => UniformKind::Vec3,
            UniformName::MaterialShininess => UniformKind::Float,
            UniformName::DirectionalLight(field)
            | UniformName::PointLight(_, field)
            | UniformName::SpotLight(field) => field.kind(),
        }
    }

    /// The identifier used by the shader source.
    pub fn shader_name(&self) -> String {
        match self {
            UniformName::Model => "model".to_string(),
            UniformName::ObjectColor => "objectColor".to_string(),
            UniformName::ObjectTexture => "objectTexture".to_string(),
            UniformName::UseTexture => "bUseTexture".to_string(),
            UniformName::UseLighting => "bUseLighting".to_string(),
            UniformName::UvScale => "UVscale".to_string(),
            UniformName::MaterialDiffuse => "material.diffuseColor".to_string(),
            UniformName::MaterialSpecular => "material.specularColor".to_string(),
            UniformName::MaterialShininess => "material.shininess".to_string(),
            UniformName::DirectionalLight(field) => {
                format!("directionalLight.{}", <&str>::from(*field))
            }
            UniformName::PointLight(index, field) => {
                format!("pointLights[{index}].{}", <&str>::from(*field))
            }
            UniformName::SpotLight(field) => format!("spotLight.{}", <&str>::from(*field)),
        }
    }
}

impl fmt::Display for UniformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shader_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum UniformKind {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::From)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([[f32; 4]; 4]),
}

impl From<cgmath::Matrix4<f32>> for UniformValue {
    fn from(matrix: cgmath::Matrix4<f32>) -> Self {
        UniformValue::Mat4(matrix.into())
    }
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Bool(_) => UniformKind::Bool,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    fn zeroed(kind: UniformKind) -> Self {
        match kind {
            UniformKind::Bool => UniformValue::Bool(false),
            UniformKind::Int => UniformValue::Int(0),
            UniformKind::Float => UniformValue::Float(0.0),
            UniformKind::Vec2 => UniformValue::Vec2([0.0; 2]),
            UniformKind::Vec3 => UniformValue::Vec3([0.0; 3]),
            UniformKind::Vec4 => UniformValue::Vec4([0.0; 4]),
            UniformKind::Mat4 => UniformValue::Mat4([[0.0; 4]; 4]),
        }
    }

    // (alignment, size); vec3 occupies a full vec4
    pub fn layout(&self) -> (usize, usize) {
        match self {
            UniformValue::Bool(_) | UniformValue::Int(_) | UniformValue::Float(_) => (4, 4),
            UniformValue::Vec2(_) => (8, 8),
            UniformValue::Vec3(_) | UniformValue::Vec4(_) => (16, 16),
            UniformValue::Mat4(_) => (16, 64),
        }
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        let start = buf.len();

        match self {
            // booleans are 32-bit in uniform memory
            UniformValue::Bool(b) => {
                buf.extend_from_slice(bytemuck::bytes_of(&u32::from(*b)));
            }
            UniformValue::Int(i) => {
                buf.extend_from_slice(bytemuck::bytes_of(i));
            }
            UniformValue::Float(f) => {
                buf.extend_from_slice(bytemuck::bytes_of(f));
            }
            UniformValue::Vec2(v) => {
                buf.extend_from_slice(bytemuck::bytes_of(v));
            }
            UniformValue::Vec3(v) => {
                let padded: [f32; 4] = [v[0], v[1], v[2], 0.0];
                buf.extend_from_slice(bytemuck::bytes_of(&padded));
            }
            UniformValue::Vec4(v) => {
                buf.extend_from_slice(bytemuck::bytes_of(v));
            }
            UniformValue::Mat4(m) => {
                buf.extend_from_slice(bytemuck::cast_slice(&m[..].concat()));
            }
        }

        let (_, size) = self.layout();
        debug_assert_eq!(buf.len(), start + size);
    }
}

/// Name-keyed write access to the active shader program.
pub trait UniformSink {
    fn set_uniform(&mut self, name: UniformName, value: UniformValue);
}

#[derive(Debug, Clone)]
pub struct UniformField {
    pub name: UniformName,
    pub value: UniformValue,
}

impl UniformField {
    pub fn new(name: UniformName, value: impl Into<UniformValue>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// CPU-side copy of the shader's uniform state. Values persist until
/// overwritten; [`UniformBlock::cast`] packs the current state for upload.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    fields: Vec<UniformField>,
}

impl UniformBlock {
    pub fn from_fields(fields: Vec<UniformField>) -> Self {
        Self { fields }
    }

    /// The block the scene shader declares, with neutral starting values.
    pub fn standard() -> Self {
        let fields = UniformName::all()
            .into_iter()
            .map(|name| {
                let value: UniformValue = match name {
                    UniformName::Model => cgmath::Matrix4::<f32>::identity().into(),
                    UniformName::ObjectColor => UniformValue::Vec4([1.0; 4]),
                    UniformName::UvScale => UniformValue::Vec2([1.0; 2]),
                    UniformName::MaterialDiffuse => UniformValue::Vec3([1.0; 3]),
                    other => UniformValue::zeroed(other.kind()),
                };
                UniformField { name, value }
            })
            .collect();

        Self { fields }
    }

    pub fn get(&self, name: UniformName) -> Option<&UniformValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    pub fn cast(&self) -> Vec<u8> {
        let mut buf = vec![];
        let mut struct_align = 1;

        for field in &self.fields {
            let (align, _) = field.value.layout();

            struct_align = std::cmp::max(struct_align, align);

            let new_len = buf.len().next_multiple_of(align);
            buf.resize(new_len, 0);

            field.value.write_to(&mut buf);
        }

        let final_len = buf.len().next_multiple_of(struct_align);
        buf.resize(final_len, 0);

        buf
    }
}

impl Default for UniformBlock {
    fn default() -> Self {
        Self::standard()
    }
}

impl UniformSink for UniformBlock {
    fn set_uniform(&mut self, name: UniformName, value: UniformValue) {
        if name.kind() != value.kind() {
            log::error!(
                "Rejected {} value for uniform {} (expects {})",
                value.kind(),
                name,
                name.kind()
            );
            return;
        }

        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => field.value = value,
            None => log::error!("Uniform {} is not declared by this block", name),
        }
    }
}
