mod common;

use approx::assert_relative_eq;
use common::test_utils::{TestScene, object, scene};
use tri_ngin::{
    KeyCode, Point3, Vector3,
    camera::Camera,
    flow::command_for_key,
    pipelines::light::BlendMode,
    scene::{SceneCommand, ViewAxis},
};

fn three() -> TestScene {
    scene(vec![
        object("a", [0.0, 0.0, 0.0], 1.0),
        object("b", [1.0, 0.0, 0.0], 1.0),
        object("c", [2.0, 0.0, 0.0], 0.5),
    ])
}

fn highlighted(scene: &TestScene) -> Vec<usize> {
    scene
        .objects()
        .iter()
        .enumerate()
        .filter(|(_, o)| o.transform.highlighted)
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn at_most_one_object_is_highlighted() {
    let mut scene = three();
    let commands = [
        SceneCommand::SelectNext,
        SceneCommand::SelectNext,
        SceneCommand::SelectPrevious,
        SceneCommand::Deselect,
        SceneCommand::SelectPrevious,
        SceneCommand::SelectNext,
    ];
    for command in commands {
        scene.apply(command);
        let lit = highlighted(&scene);
        assert!(lit.len() <= 1);
        assert_eq!(lit.first().copied(), scene.selected());
    }
}

#[test]
fn selection_wraps_both_ways() {
    let mut scene = three();
    scene.select_previous();
    assert_eq!(scene.selected(), Some(2));
    scene.select_next();
    assert_eq!(scene.selected(), Some(0));
}

#[test]
fn selecting_out_of_range_changes_nothing() {
    let mut scene = three();
    scene.select(1);
    scene.select(9);
    assert_eq!(scene.selected(), Some(1));
    assert_eq!(highlighted(&scene), vec![1]);
}

#[test]
fn empty_scene_has_nothing_to_select() {
    let mut scene = scene(Vec::new());
    scene.apply(SceneCommand::SelectNext);
    scene.apply(SceneCommand::SelectPrevious);
    assert_eq!(scene.selected(), None);
}

#[test]
fn moves_only_touch_the_selection() {
    let mut scene = three();
    scene.apply(SceneCommand::TranslateSelected {
        axis: ViewAxis::Right,
        sign: 1.0,
    });
    assert!(
        scene
            .objects()
            .iter()
            .all(|o| o.transform.translation == Vector3::new(0.0, 0.0, 0.0))
    );

    scene.select(1);
    scene.apply(SceneCommand::TranslateSelected {
        axis: ViewAxis::Up,
        sign: -1.0,
    });
    let moved = scene.objects()[1].transform.translation;
    assert_relative_eq!(moved.y, -scene.view_delta(), epsilon = 1e-6);
    assert_eq!(scene.objects()[0].transform.translation, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn reset_transforms_keeps_the_selection() {
    let mut scene = three();
    scene.select(2);
    scene.apply(SceneCommand::RotateSelected {
        axis: ViewAxis::Forward,
        sign: 1.0,
    });
    scene.apply(SceneCommand::TranslateSelected {
        axis: ViewAxis::Forward,
        sign: 1.0,
    });
    scene.apply(SceneCommand::ResetTransforms);

    let transform = &scene.objects()[2].transform;
    assert_eq!(transform.translation, Vector3::new(0.0, 0.0, 0.0));
    assert_relative_eq!(transform.x_axis().x, 1.0, epsilon = 1e-6);
    assert_eq!(scene.selected(), Some(2));
    assert!(transform.highlighted);
}

#[test]
fn camera_moves_and_resets() {
    let mut scene = three();
    scene.apply(SceneCommand::Dolly { sign: 1.0 });
    scene.apply(SceneCommand::Strafe { sign: -1.0 });
    scene.apply(SceneCommand::Pitch { sign: 1.0 });
    assert_ne!(scene.camera, Camera::default());

    scene.apply(SceneCommand::ResetView);
    assert_eq!(scene.camera, Camera::default());
    assert_eq!(scene.camera.eye, Point3::new(0.5, 0.5, -0.5));
}

#[test]
fn dolly_moves_eye_and_center_together() {
    let mut scene = three();
    let before = scene.camera;
    scene.apply(SceneCommand::Dolly { sign: 1.0 });
    let delta = scene.view_delta();
    assert_relative_eq!(scene.camera.eye.z, before.eye.z + delta, epsilon = 1e-6);
    assert_relative_eq!(scene.camera.center.z, before.center.z + delta, epsilon = 1e-6);
}

#[test]
fn pitch_keeps_up_perpendicular_to_the_view() {
    use tri_ngin::InnerSpace;

    let mut scene = three();
    for _ in 0..25 {
        scene.apply(SceneCommand::Pitch { sign: 1.0 });
    }
    let camera = scene.camera;
    assert_relative_eq!(camera.up.magnitude(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(camera.up.dot(camera.look_direction()), 0.0, epsilon = 1e-5);
}

#[test]
fn blend_mode_toggle_command() {
    let mut scene = three();
    assert_eq!(scene.blend_mode, BlendMode::Modulate);
    scene.apply(SceneCommand::ToggleBlendMode);
    assert_eq!(scene.blend_mode, BlendMode::Replace);
}

#[test]
fn keys_drive_the_scene() {
    let mut scene = three();
    for key in [KeyCode::ArrowRight, KeyCode::ArrowRight] {
        if let Some(command) = command_for_key(key, false) {
            scene.apply(command);
        }
    }
    assert_eq!(scene.selected(), Some(1));

    if let Some(command) = command_for_key(KeyCode::KeyB, false) {
        scene.apply(command);
    }
    assert_eq!(scene.blend_mode, BlendMode::Replace);
}

fn assert_point_eq(a: Point3<f32>, b: Point3<f32>) {
    assert_relative_eq!(a.x, b.x, epsilon = 1e-6);
    assert_relative_eq!(a.y, b.y, epsilon = 1e-6);
    assert_relative_eq!(a.z, b.z, epsilon = 1e-6);
}

#[test]
fn camera_keys_move_eye_and_center() {
    let d = 0.01;
    let eye = Point3::from(Camera::DEFAULT_EYE);
    let center = Point3::from(Camera::DEFAULT_CENTER);
    // the default camera looks down +z with +y up, so look × up is -x
    let right = Vector3::new(-1.0, 0.0, 0.0);
    let up = Vector3::new(0.0, 1.0, 0.0);
    let forward = Vector3::new(0.0, 0.0, 1.0);
    let zero = Vector3::new(0.0, 0.0, 0.0);

    let cases = [
        (KeyCode::KeyA, false, right * d, right * d),
        (KeyCode::KeyD, false, right * -d, right * -d),
        (KeyCode::KeyQ, false, up * d, up * d),
        (KeyCode::KeyE, false, up * -d, up * -d),
        (KeyCode::KeyW, false, forward * d, forward * d),
        (KeyCode::KeyS, false, forward * -d, forward * -d),
        (KeyCode::KeyA, true, zero, right * d),
        (KeyCode::KeyD, true, zero, right * -d),
        (KeyCode::KeyW, true, zero, up * -d),
        (KeyCode::KeyS, true, zero, up * d),
    ];
    for (key, shift, eye_offset, center_offset) in cases {
        let mut scene = three();
        let command = command_for_key(key, shift).unwrap();
        scene.apply(command);
        assert_point_eq(scene.camera.eye, eye + eye_offset);
        assert_point_eq(scene.camera.center, center + center_offset);
    }
}

#[test]
fn roll_keys_tilt_up_sideways() {
    let mut scene = three();
    scene.apply(command_for_key(KeyCode::KeyQ, true).unwrap());
    // Q leans up away from look × up, i.e. towards +x
    assert!(scene.camera.up.x > 0.0);
    assert_point_eq(scene.camera.eye, Point3::from(Camera::DEFAULT_EYE));

    let mut scene = three();
    scene.apply(command_for_key(KeyCode::KeyE, true).unwrap());
    assert!(scene.camera.up.x < 0.0);
}
