use crate::uniform::{LightField, POINT_LIGHT_SLOTS, UniformName, UniformSink};

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LightColors {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DirectionalLight {
    pub direction: [f32; 3],
    #[serde(flatten)]
    pub colors: LightColors,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PointLight {
    pub position: [f32; 3],
    #[serde(flatten)]
    pub colors: LightColors,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SpotLight {
    pub position: [f32; 3],
    pub direction: [f32; 3],
    #[serde(flatten)]
    pub colors: LightColors,
    /// Inner cone half-angle in degrees.
    pub cut_off: f32,
    /// Outer cone half-angle in degrees.
    pub outer_cut_off: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

/// The lights of a scene. Slots are positional: point light `i` always
/// lands in `pointLights[i]`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LightingSetup {
    #[serde(default)]
    pub directional: Option<DirectionalLight>,
    #[serde(default)]
    pub point_lights: [Option<PointLight>; POINT_LIGHT_SLOTS],
    #[serde(default)]
    pub spot_light: Option<SpotLight>,
}

impl LightingSetup {
    pub fn none() -> Self {
        Self {
            directional: None,
            point_lights: [None; POINT_LIGHT_SLOTS],
            spot_light: None,
        }
    }
}

impl Default for LightingSetup {
    /// Daylight through a window plus a warm overhead fill light.
    fn default() -> Self {
        let mut point_lights = [None; POINT_LIGHT_SLOTS];
        point_lights[0] = Some(PointLight {
            position: [0.0, 5.0, 1.0],
            colors: LightColors {
                ambient: [0.1, 0.09, 0.08],
                diffuse: [0.6, 0.5, 0.4],
                specular: [0.4, 0.3, 0.2],
            },
        });

        Self {
            directional: Some(DirectionalLight {
                direction: [-0.3, -1.0, -0.3],
                colors: LightColors {
                    ambient: [0.2, 0.2, 0.2],
                    diffuse: [0.5, 0.5, 0.5],
                    specular: [0.7, 0.7, 0.7],
                },
            }),
            point_lights,
            spot_light: None,
        }
    }
}

/// Pushes a [`LightingSetup`] into the shader.
pub struct LightConfigurator;

impl LightConfigurator {
    /// Turns lighting on, clears every light slot, then fills and activates
    /// the slots `setup` uses. Clearing first keeps slots used by an earlier
    /// configuration from staying lit.
    pub fn configure(sink: &mut impl UniformSink, setup: &LightingSetup) {
        sink.set_uniform(UniformName::UseLighting, true.into());

        sink.set_uniform(UniformName::SpotLight(LightField::Active), false.into());
        for index in 0..POINT_LIGHT_SLOTS {
            sink.set_uniform(UniformName::PointLight(index, LightField::Active), false.into());
        }
        sink.set_uniform(UniformName::DirectionalLight(LightField::Active), false.into());

        if let Some(light) = &setup.directional {
            let slot = UniformName::DirectionalLight;
            sink.set_uniform(slot(LightField::Direction), light.direction.into());
            upload_colors(sink, slot, &light.colors);
            sink.set_uniform(slot(LightField::Active), true.into());
        }

        for (index, light) in setup.point_lights.iter().enumerate() {
            let Some(light) = light else {
                continue;
            };
            let slot = |field| UniformName::PointLight(index, field);
            sink.set_uniform(slot(LightField::Position), light.position.into());
            upload_colors(sink, slot, &light.colors);
            sink.set_uniform(slot(LightField::Active), true.into());
        }

        if let Some(light) = &setup.spot_light {
            let slot = UniformName::SpotLight;
            sink.set_uniform(slot(LightField::Position), light.position.into());
            sink.set_uniform(slot(LightField::Direction), light.direction.into());
            upload_colors(sink, slot, &light.colors);
            // the shader compares against cosines
            sink.set_uniform(
                slot(LightField::CutOff),
                light.cut_off.to_radians().cos().into(),
            );
            sink.set_uniform(
                slot(LightField::OuterCutOff),
                light.outer_cut_off.to_radians().cos().into(),
            );
            sink.set_uniform(slot(LightField::Constant), light.constant.into());
            sink.set_uniform(slot(LightField::Linear), light.linear.into());
            sink.set_uniform(slot(LightField::Quadratic), light.quadratic.into());
            sink.set_uniform(slot(LightField::Active), true.into());
        }

        log::debug!(
            "Configured lighting: directional: {}, point lights: {}, spot light: {}",
            setup.directional.is_some(),
            setup.point_lights.iter().flatten().count(),
            setup.spot_light.is_some()
        );
    }

    /// Turns the lighting model off; objects render with flat color.
    pub fn disable(sink: &mut impl UniformSink) {
        sink.set_uniform(UniformName::UseLighting, false.into());
    }
}

fn upload_colors(
    sink: &mut impl UniformSink,
    slot: impl Fn(LightField) -> UniformName,
    colors: &LightColors,
) {
    sink.set_uniform(slot(LightField::Ambient), colors.ambient.into());
    sink.set_uniform(slot(LightField::Diffuse), colors.diffuse.into());
    sink.set_uniform(slot(LightField::Specular), colors.specular.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testing::RecordingContext, uniform::UniformValue};

    fn is_active_flag(name: &UniformName) -> bool {
        matches!(
            name,
            UniformName::DirectionalLight(LightField::Active)
                | UniformName::PointLight(_, LightField::Active)
                | UniformName::SpotLight(LightField::Active)
        )
    }

    #[test]
    fn only_used_point_lights_are_active() {
        let mut ctx = RecordingContext::default();

        LightConfigurator::configure(&mut ctx, &LightingSetup::default());

        assert_eq!(ctx.value(UniformName::UseLighting), Some(UniformValue::Bool(true)));
        assert_eq!(
            ctx.value(UniformName::PointLight(0, LightField::Active)),
            Some(UniformValue::Bool(true))
        );
        for index in 1..POINT_LIGHT_SLOTS {
            assert_eq!(
                ctx.value(UniformName::PointLight(index, LightField::Active)),
                Some(UniformValue::Bool(false))
            );
        }
        assert_eq!(
            ctx.value(UniformName::SpotLight(LightField::Active)),
            Some(UniformValue::Bool(false))
        );
        assert_eq!(
            ctx.value(UniformName::DirectionalLight(LightField::Direction)),
            Some(UniformValue::Vec3([-0.3, -1.0, -0.3]))
        );
    }

    #[test]
    fn deactivation_precedes_activation() {
        let mut ctx = RecordingContext::default();

        LightConfigurator::configure(&mut ctx, &LightingSetup::default());

        let flags: Vec<_> = ctx
            .uniform_writes()
            .into_iter()
            .filter(|(name, _)| is_active_flag(name))
            .collect();

        let first_activation = flags
            .iter()
            .position(|(_, value)| *value == UniformValue::Bool(true))
            .unwrap();
        let cleared = &flags[..first_activation];

        assert_eq!(cleared.len(), POINT_LIGHT_SLOTS + 2);
        assert!(flags[first_activation..]
            .iter()
            .all(|(_, value)| *value == UniformValue::Bool(true)));
    }

    #[test]
    fn reconfiguring_clears_stale_slots() {
        let mut ctx = RecordingContext::default();

        let mut busy = LightingSetup::default();
        busy.point_lights[3] = busy.point_lights[0];
        LightConfigurator::configure(&mut ctx, &busy);
        assert_eq!(
            ctx.value(UniformName::PointLight(3, LightField::Active)),
            Some(UniformValue::Bool(true))
        );

        LightConfigurator::configure(&mut ctx, &LightingSetup::default());

        assert_eq!(
            ctx.value(UniformName::PointLight(3, LightField::Active)),
            Some(UniformValue::Bool(false))
        );
    }

    #[test]
    fn spot_light_cut_offs_are_uploaded_as_cosines() {
        let mut ctx = RecordingContext::default();
        let mut setup = LightingSetup::none();
        setup.spot_light = Some(SpotLight {
            position: [0.0, 4.0, 0.0],
            direction: [0.0, -1.0, 0.0],
            colors: LightColors {
                ambient: [0.0; 3],
                diffuse: [1.0; 3],
                specular: [1.0; 3],
            },
            cut_off: 60.0,
            outer_cut_off: 90.0,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        });

        LightConfigurator::configure(&mut ctx, &setup);

        let Some(UniformValue::Float(cut_off)) = ctx.value(UniformName::SpotLight(LightField::CutOff))
        else {
            panic!("cut off not uploaded");
        };
        approx::assert_abs_diff_eq!(cut_off, 0.5, epsilon = 1e-5);
        assert_eq!(
            ctx.value(UniformName::SpotLight(LightField::Active)),
            Some(UniformValue::Bool(true))
        );
        assert_eq!(
            ctx.value(UniformName::DirectionalLight(LightField::Active)),
            Some(UniformValue::Bool(false))
        );
    }

    #[test]
    fn setup_deserializes_from_json() {
        let setup: LightingSetup = serde_json::from_str(
            r#"{
                "directional": {
                    "direction": [0.0, -1.0, 0.0],
                    "ambient": [0.1, 0.1, 0.1],
                    "diffuse": [0.5, 0.5, 0.5],
                    "specular": [0.2, 0.2, 0.2]
                }
            }"#,
        )
        .unwrap();

        assert!(setup.directional.is_some());
        assert!(setup.point_lights.iter().all(Option::is_none));
        assert!(setup.spot_light.is_none());
    }
}
