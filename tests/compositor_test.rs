mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use common::test_utils::{draws, final_depth_write, object, scene, textured};
use tri_ngin::{
    Matrix4, Point3, Rad, Vector3, Vector4,
    camera::{Camera, Projection},
    render::{DrawOp, FrameCompositor, FramePlan, FrameRecorder, back_to_front, partition},
    resources::texture::TextureResource,
};

#[test]
fn partition_covers_every_object_once() {
    let objects = vec![
        object("a", [0.0, 0.0, 0.0], 1.0),
        object("b", [0.0, 0.0, 1.0], 0.5),
        object("c", [0.0, 0.0, 2.0], 1.0),
        object("d", [0.0, 0.0, 3.0], 0.0),
    ];
    let plan = partition(&objects);
    assert_eq!(
        plan,
        FramePlan {
            opaque: vec![0, 2],
            transparent: vec![1, 3],
        }
    );
}

#[test]
fn material_alpha_overrides_an_opaque_hint() {
    let texture = Arc::new(TextureResource::pending("wood.jpg"));
    let mut translucent = textured("t", [0.0, 0.0, 0.0], texture, false);
    assert!(!translucent.is_transparent());
    translucent.material.alpha = 0.9;
    assert!(translucent.is_transparent());
}

#[test]
fn transparent_objects_sort_far_to_near() {
    let objects = vec![
        object("near", [0.0, 0.0, 1.0], 0.5),
        object("far", [0.0, 0.0, 5.0], 0.5),
        object("mid", [0.0, 0.0, 3.0], 0.5),
    ];
    let order = back_to_front(&objects, &[0, 1, 2], Point3::new(0.0, 0.0, 0.0));
    assert_eq!(order, vec![1, 2, 0]);
}

#[test]
fn equal_distances_keep_scene_order() {
    let objects = vec![
        object("left", [-1.0, 0.0, 0.0], 0.5),
        object("right", [1.0, 0.0, 0.0], 0.5),
        object("up", [0.0, 1.0, 0.0], 0.5),
    ];
    let eye = Point3::new(0.0, 0.0, 0.0);
    for _ in 0..10 {
        assert_eq!(back_to_front(&objects, &[0, 1, 2], eye), vec![0, 1, 2]);
    }
}

#[test]
fn sort_uses_translated_centers() {
    let mut objects = vec![
        object("a", [0.0, 0.0, 1.0], 0.5),
        object("b", [0.0, 0.0, 2.0], 0.5),
    ];
    objects[0].transform.translate([0.0, 0.0, 4.0].into());
    let order = back_to_front(&objects, &[0, 1], Point3::new(0.0, 0.0, 0.0));
    assert_eq!(order, vec![0, 1]);
}

#[test]
fn opaque_pass_writes_depth_and_transparent_pass_does_not() {
    let mut scene = scene(vec![
        object("glass", [0.5, 0.5, 0.6], 0.5),
        object("floor", [0.5, 0.0, 0.5], 1.0),
        object("wall", [0.5, 0.5, 1.0], 1.0),
    ]);
    scene.camera.eye = Point3::new(0.5, 0.5, -0.5);

    let compositor = FrameCompositor::default();
    let mut recorder = FrameRecorder::new();
    let plan = compositor.render_frame(&scene, &mut recorder);

    assert_eq!(plan.opaque, vec![1, 2]);
    assert_eq!(plan.transparent, vec![0]);
    assert_eq!(
        draws(&recorder),
        vec![("floor", true), ("wall", true), ("glass", false)]
    );
    assert_eq!(final_depth_write(&recorder), Some(true));
}

#[test]
fn frame_without_transparency_never_disables_depth_writes() {
    let scene = scene(vec![
        object("a", [0.0, 0.0, 1.0], 1.0),
        object("b", [0.0, 0.0, 2.0], 1.0),
    ]);
    let mut recorder = FrameRecorder::new();
    FrameCompositor::default().render_frame(&scene, &mut recorder);

    assert!(
        recorder
            .ops
            .iter()
            .all(|op| !matches!(op, DrawOp::DepthWrite(false)))
    );
    assert_eq!(draws(&recorder), vec![("a", true), ("b", true)]);
}

#[test]
fn two_transparent_objects_draw_back_to_front() {
    // A is farther from the default eye (0.5, 0.5, -0.5) than B
    let scene = scene(vec![
        object("A", [0.5, 0.5, 0.8], 0.5),
        object("B", [0.5, 0.5, 0.2], 0.5),
    ]);
    let mut recorder = FrameRecorder::new();
    FrameCompositor::default().render_frame(&scene, &mut recorder);
    assert_eq!(draws(&recorder), vec![("A", false), ("B", false)]);
}

#[test]
fn empty_scene_still_begins_a_frame() {
    let scene = scene(Vec::new());
    let mut recorder = FrameRecorder::new();
    let plan = FrameCompositor::default().render_frame(&scene, &mut recorder);

    assert!(plan.opaque.is_empty() && plan.transparent.is_empty());
    assert!(matches!(recorder.ops.first(), Some(DrawOp::BeginFrame(_))));
    assert_eq!(recorder.object_count(), 0);
}

#[test]
fn every_draw_binds_object_and_texture_first() {
    let scene = scene(vec![
        object("a", [0.0, 0.0, 1.0], 1.0),
        object("b", [0.0, 0.0, 2.0], 0.3),
    ]);
    let mut recorder = FrameRecorder::new();
    FrameCompositor::default().render_frame(&scene, &mut recorder);

    let ops = &recorder.ops;
    for (i, op) in ops.iter().enumerate() {
        if let DrawOp::Draw { triangles, .. } = op {
            assert_eq!(*triangles, 1);
            assert!(matches!(ops[i - 1], DrawOp::Texture(_)));
            assert!(matches!(ops[i - 2], DrawOp::Object(_)));
        }
    }
    assert_eq!(recorder.object_count(), 2);
}

#[test]
fn pending_and_untextured_objects_bind_the_fallback() {
    let pending = Arc::new(TextureResource::pending("late.jpg"));
    let ready = Arc::new(TextureResource::pending("early.jpg"));
    ready.complete(7, 4, 4);

    let scene = scene(vec![
        textured("pending", [0.0, 0.0, 1.0], pending, false),
        textured("ready", [0.0, 0.0, 2.0], ready, false),
        object("plain", [0.0, 0.0, 3.0], 1.0),
    ]);
    let mut recorder = FrameRecorder::new();
    FrameCompositor::default().render_frame(&scene, &mut recorder);

    let bindings: Vec<Option<u32>> = recorder
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Texture(binding) => Some(match binding {
                tri_ngin::resources::texture::TextureBinding::Ready(id) => Some(**id),
                tri_ngin::resources::texture::TextureBinding::Fallback => None,
            }),
            _ => None,
        })
        .collect();
    assert_eq!(bindings, vec![None, Some(7), None]);
}

#[test]
fn object_uniforms_carry_the_model_and_material() {
    let mut scene = scene(vec![object("a", [0.0, 0.0, 1.0], 1.0)]);
    scene.select(0);
    let mut recorder = FrameRecorder::new();
    FrameCompositor::default().render_frame(&scene, &mut recorder);

    let uniforms = recorder
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Object(uniforms) => Some(*uniforms),
            _ => None,
        })
        .expect("one object was drawn");
    assert_eq!(uniforms.model, scene.objects()[0].transform.compose());
    assert_eq!(uniforms.material, scene.objects()[0].material);
}

fn assert_matrix_eq(a: Matrix4<f32>, b: Matrix4<f32>) {
    let a: [[f32; 4]; 4] = a.into();
    let b: [[f32; 4]; 4] = b.into();
    for (col_a, col_b) in a.iter().zip(b.iter()) {
        for (x, y) in col_a.iter().zip(col_b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-5);
        }
    }
}

#[test]
fn pvm_is_projection_then_view_then_model() {
    let mut scene = scene(vec![object("a", [0.2, 0.1, 1.0], 1.0)]);
    scene.select(0);
    scene.translate_selected(Vector3::new(0.3, -0.2, 0.5));
    scene.rotate_selected(Vector3::unit_y(), Rad(0.7));
    scene.camera = Camera::new([1.0, 2.0, -3.0], [0.5, 0.5, 0.5], [0.0, 1.0, 0.0]);

    let mut recorder = FrameRecorder::new();
    FrameCompositor::default().render_frame(&scene, &mut recorder);
    let uniforms = recorder
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Object(uniforms) => Some(*uniforms),
            _ => None,
        })
        .expect("one object was drawn");

    let model = scene.objects()[0].transform.compose();
    let expected = Projection::default().calc_matrix() * scene.camera.view_matrix() * model;
    assert_matrix_eq(uniforms.pvm, expected);
}

#[test]
fn default_projection_is_a_square_right_angle_frustum() {
    let projection = Projection::default();
    assert_eq!(projection.aspect, 1.0);
    assert_relative_eq!(projection.fovy.0, std::f32::consts::FRAC_PI_2);
    assert_eq!(projection.znear, 0.1);
    assert_eq!(projection.zfar, 10.0);

    // a point on the near plane maps to depth 0 and one on the far plane to depth 1
    let m = projection.calc_matrix();
    let near = m * Vector4::new(0.0, 0.0, -0.1, 1.0);
    let far = m * Vector4::new(0.0, 0.0, -10.0, 1.0);
    assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
    assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    // 90° vertical field of view: the frustum edge at distance 1 sits at y = 1
    let edge = m * Vector4::new(0.0, 1.0, -1.0, 1.0);
    assert_relative_eq!(edge.y / edge.w, 1.0, epsilon = 1e-5);
}

#[test]
fn overlapping_quads_seen_from_the_origin() {
    let mut scene = scene(vec![
        object("B", [0.0, 0.0, 3.0], 0.5),
        object("A", [0.0, 0.0, 5.0], 0.5),
    ]);
    scene.camera = Camera::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]);

    let mut recorder = FrameRecorder::new();
    let plan = FrameCompositor::default().render_frame(&scene, &mut recorder);
    assert_eq!(plan.transparent, vec![1, 0]);
    assert_eq!(draws(&recorder), vec![("A", false), ("B", false)]);
}
