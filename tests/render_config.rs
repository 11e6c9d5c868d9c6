use dicom_render_config::{
    LightingChannel, OutOfRangeError, Quantity, RenderConfigModel, RenderFrame, RenderMode,
};
use pretty_assertions::assert_eq;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

fn channel_value(model: &RenderConfigModel, channel: LightingChannel) -> f32 {
    let lighting = model.effective_lighting();
    match channel {
        LightingChannel::Ambient => lighting.ambient,
        LightingChannel::Diffuse => lighting.diffuse,
        LightingChannel::Specular => lighting.specular,
    }
}

#[test]
fn every_valid_threshold_is_stored() {
    let mut model = RenderConfigModel::new();
    for v in 1..=255 {
        model.set_threshold(v).unwrap();
        assert_eq!(i32::from(model.threshold()), v);
    }
}

#[test]
fn invalid_threshold_leaves_state_unchanged() {
    let mut model = RenderConfigModel::new();
    model.set_threshold(77).unwrap();
    let before = model.clone();

    for v in [i32::MIN, -1, 0, 256, 1000, i32::MAX] {
        assert_eq!(
            model.set_threshold(v),
            Err(OutOfRangeError {
                quantity: Quantity::Threshold,
                value: v,
                min: 1,
                max: 255,
            })
        );
        assert_eq!(model, before);
    }
}

#[test]
fn every_valid_coefficient_is_scaled() {
    let mut model = RenderConfigModel::new();
    for channel in LightingChannel::ALL {
        for c in 0..=10 {
            model.set_lighting_coefficient(channel, c).unwrap();
            assert!(close(channel_value(&model, channel), c as f32 / 10.0));
            assert_eq!(i32::from(model.lighting_coefficient(channel)), c);
        }
    }
}

#[test]
fn invalid_coefficient_leaves_state_unchanged() {
    let mut model = RenderConfigModel::new();
    let before = model.clone();
    for channel in LightingChannel::ALL {
        for c in [-1, 11, 255] {
            let error = model.set_lighting_coefficient(channel, c).unwrap_err();
            assert_eq!(error.quantity, Quantity::Lighting(channel));
            assert_eq!(model, before);
        }
    }
}

#[test]
fn coefficients_are_independent() {
    let mut model = RenderConfigModel::new();
    model
        .set_lighting_coefficient(LightingChannel::Diffuse, 9)
        .unwrap();
    assert_eq!(model.lighting_coefficient(LightingChannel::Ambient), 4);
    assert_eq!(model.lighting_coefficient(LightingChannel::Diffuse), 9);
    assert_eq!(model.lighting_coefficient(LightingChannel::Specular), 2);
}

#[test]
fn transfer_functions_ignore_other_state() {
    let mut model = RenderConfigModel::new();
    let color = model.color_transfer_function().clone();
    let scalar_opacity = model.scalar_opacity_transfer_function().clone();
    let gradient_opacity = model.gradient_opacity_transfer_function().clone();

    model.set_mode(RenderMode::Surface);
    model.set_threshold(200).unwrap();
    model
        .set_lighting_coefficient(LightingChannel::Specular, 10)
        .unwrap();

    assert_eq!(model.color_transfer_function(), &color);
    assert_eq!(model.scalar_opacity_transfer_function(), &scalar_opacity);
    assert_eq!(model.gradient_opacity_transfer_function(), &gradient_opacity);
}

#[test]
fn fixed_control_points() {
    let model = RenderConfigModel::new();

    let color: Vec<_> = model
        .color_transfer_function()
        .points()
        .iter()
        .map(|p| (p.scalar, p.outputs))
        .collect();
    assert_eq!(
        color,
        vec![
            (0.0, [0.0, 0.0, 0.0]),
            (500.0, [1.0, 0.5, 0.3]),
            (1000.0, [1.0, 0.5, 0.3]),
            (1150.0, [1.0, 1.0, 0.9]),
        ]
    );

    let opacity: Vec<_> = model
        .scalar_opacity_transfer_function()
        .points()
        .iter()
        .map(|p| (p.scalar, p.outputs[0]))
        .collect();
    assert_eq!(
        opacity,
        vec![(0.0, 0.0), (500.0, 1.0), (1000.0, 0.7), (1150.0, 0.03)]
    );

    let gradient: Vec<_> = model
        .gradient_opacity_transfer_function()
        .points()
        .iter()
        .map(|p| (p.scalar, p.outputs[0]))
        .collect();
    assert_eq!(gradient, vec![(0.0, 0.0), (90.0, 0.5), (100.0, 1.0)]);
}

#[test]
fn mode_switch_is_idempotent() {
    let mut once = RenderConfigModel::new();
    once.set_mode(RenderMode::Surface);
    once.set_mode(RenderMode::RayCast);

    let mut twice = once.clone();
    twice.set_mode(RenderMode::RayCast);

    assert_eq!(once, twice);
    assert!(twice.is_ray_cast_mode_active());
    assert!(!twice.is_surface_mode_active());
}

#[test]
fn mode_switch_keeps_threshold_and_lighting() {
    let mut model = RenderConfigModel::new();
    model.set_mode(RenderMode::Surface);
    model.set_threshold(120).unwrap();
    model
        .set_lighting_coefficient(LightingChannel::Ambient, 7)
        .unwrap();

    model.set_mode(RenderMode::RayCast);
    model.set_mode(RenderMode::Surface);

    assert_eq!(model.threshold(), 120);
    assert_eq!(model.lighting_coefficient(LightingChannel::Ambient), 7);
    assert_eq!(model.frame(), RenderFrame::Surface { iso_value: 120 });
}

#[test]
fn sampling_examples() {
    let model = RenderConfigModel::new();
    assert!(close(
        model.scalar_opacity_transfer_function().value_at(750.0),
        0.85
    ));

    let gradient = model.gradient_opacity_transfer_function();
    assert_eq!(gradient.value_at(-5.0), 0.0);
    assert_eq!(gradient.value_at(500.0), 1.0);

    let color = model.color_transfer_function();
    assert_eq!(color.sample(-1.0), [0.0, 0.0, 0.0]);
    assert_eq!(color.sample(5000.0), [1.0, 1.0, 0.9]);
}

#[test]
fn ray_cast_frame_carries_lighting() {
    let mut model = RenderConfigModel::new();
    model
        .set_lighting_coefficient(LightingChannel::Specular, 5)
        .unwrap();
    match model.frame() {
        RenderFrame::RayCast(property) => {
            assert_eq!(property.lighting, model.effective_lighting());
            assert!(close(property.lighting.specular, 0.5));
        }
        frame => panic!("unexpected frame {frame:?}"),
    }
}
