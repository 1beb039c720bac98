use cgmath::{Deg, Matrix4, Vector3};

use crate::uniform::{UniformName, UniformSink};

/// Placement of one object for one draw: scale, rotation about each axis in
/// degrees, and world position.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Transform {
    pub scale: [f32; 3],
    #[serde(rename = "rotation")]
    pub rotation_degrees: [f32; 3],
    pub position: [f32; 3],
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: [1.0, 1.0, 1.0],
        rotation_degrees: [0.0, 0.0, 0.0],
        position: [0.0, 0.0, 0.0],
    };

    pub fn new(scale: [f32; 3], rotation_degrees: [f32; 3], position: [f32; 3]) -> Self {
        Self {
            scale,
            rotation_degrees,
            position,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Model matrix for `transform`: scale, then rotate about X, Y and Z in that
/// order, then translate.
pub fn compose(transform: &Transform) -> Matrix4<f32> {
    let [sx, sy, sz] = transform.scale;
    let [rx, ry, rz] = transform.rotation_degrees;

    let scale = Matrix4::from_nonuniform_scale(sx, sy, sz);
    let rotation_x = Matrix4::from_angle_x(Deg(rx));
    let rotation_y = Matrix4::from_angle_y(Deg(ry));
    let rotation_z = Matrix4::from_angle_z(Deg(rz));
    let translation = Matrix4::from_translation(Vector3::from(transform.position));

    translation * rotation_z * rotation_y * rotation_x * scale
}

/// Composes `transform` and writes it to the model uniform.
pub fn upload(sink: &mut impl UniformSink, transform: &Transform) -> Matrix4<f32> {
    let model = compose(transform);
    sink.set_uniform(UniformName::Model, model.into());
    model
}
