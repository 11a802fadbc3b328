//! Frame composition: pass partitioning, transparency ordering and the draw contract.
//!
//! [`FrameCompositor::render_frame`] walks a [`SceneState`] once per frame and
//! drives a [`RenderContract`]:
//!
//! 1. bind the frame uniforms (eye, light, blend mode)
//! 2. enable depth writes and draw every opaque object in scene order
//! 3. disable depth writes and draw every transparent object back to front
//! 4. re-enable depth writes
//!
//! Transparent objects are ordered by the squared distance from the eye to
//! their translated centroid. That single proxy point is exact for convex,
//! well separated objects and can misorder interpenetrating or concave ones.
//!
//! # Key types
//!
//! - [`RenderContract`] is the GPU-facing interface the compositor drives
//! - [`FrameRecorder`] implements it by recording [`DrawOp`]s for later replay
//! - [`FramePlan`] is the pass assignment and draw order of one frame

use cgmath::{EuclideanSpace, Matrix4, MetricSpace, Point3};

use crate::{
    camera::Projection,
    data_structures::{material::Material, object::RenderableObject},
    pipelines::light::{BlendMode, Light},
    resources::texture::TextureBinding,
    scene::SceneState,
};

/// State bound once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub eye: Point3<f32>,
    pub light: Light,
    pub blend_mode: BlendMode,
}

/// State bound once per drawn object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectUniforms {
    pub model: Matrix4<f32>,
    pub pvm: Matrix4<f32>,
    pub material: Material,
}

/// Everything the compositor needs from a graphics backend.
///
/// `'s` is the lifetime of the scene being drawn, so implementations may keep
/// references to geometry and textures until the frame is submitted.
pub trait RenderContract<'s> {
    type Geometry: 's;
    type Texture: 's;

    fn begin_frame(&mut self, frame: &FrameUniforms);

    /// Depth testing stays enabled; this only toggles writing to the depth buffer.
    fn set_depth_write(&mut self, enabled: bool);

    fn bind_object(&mut self, uniforms: &ObjectUniforms);

    fn bind_texture(&mut self, texture: TextureBinding<'s, Self::Texture>);

    fn draw(&mut self, geometry: &'s Self::Geometry, triangles: u32);
}

/// Which objects were drawn in which pass, in draw order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FramePlan {
    pub opaque: Vec<usize>,
    pub transparent: Vec<usize>,
}

/// Split object indices into the opaque and transparent pass, keeping scene order.
pub fn partition<G, T>(objects: &[RenderableObject<G, T>]) -> FramePlan {
    let (transparent, opaque): (Vec<usize>, Vec<usize>) = (0..objects.len()).partition(|&i| objects[i].is_transparent());
    FramePlan {
        opaque,
        transparent,
    }
}

/// Sort `indices` farthest-first by squared distance from `eye` to each object's
/// translated centroid. The sort is stable, so equal distances keep their order.
pub fn back_to_front<G, T>(
    objects: &[RenderableObject<G, T>],
    indices: &[usize],
    eye: Point3<f32>,
) -> Vec<usize> {
    let mut keyed: Vec<(usize, f32)> = indices
        .iter()
        .map(|&i| {
            let center = Point3::from_vec(objects[i].transform.world_center());
            (i, eye.distance2(center))
        })
        .collect();
    keyed.sort_by(|a, b| b.1.total_cmp(&a.1));
    keyed.into_iter().map(|(i, _)| i).collect()
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameCompositor {
    pub projection: Projection,
}

impl FrameCompositor {
    pub fn new(projection: Projection) -> Self {
        Self { projection }
    }

    /// Draw one frame of `scene` into `target`. Never fails: objects whose texture
    /// is not ready are drawn with the fallback texture.
    pub fn render_frame<'s, R: RenderContract<'s>>(
        &self,
        scene: &'s SceneState<R::Geometry, R::Texture>,
        target: &mut R,
    ) -> FramePlan {
        let camera = &scene.camera;
        let pv = self.projection.calc_matrix() * camera.view_matrix();

        target.begin_frame(&FrameUniforms {
            eye: camera.eye,
            light: scene.light,
            blend_mode: scene.blend_mode,
        });

        let objects = scene.objects();
        let mut plan = partition(objects);
        plan.transparent = back_to_front(objects, &plan.transparent, camera.eye);

        target.set_depth_write(true);
        for &i in &plan.opaque {
            draw_object(&objects[i], &pv, target);
        }

        if !plan.transparent.is_empty() {
            target.set_depth_write(false);
            for &i in &plan.transparent {
                draw_object(&objects[i], &pv, target);
            }
            target.set_depth_write(true);
        }

        log::trace!(
            "Frame composed: {} opaque, {} transparent",
            plan.opaque.len(),
            plan.transparent.len()
        );
        plan
    }
}

fn draw_object<'s, R: RenderContract<'s>>(
    object: &'s RenderableObject<R::Geometry, R::Texture>,
    pv: &Matrix4<f32>,
    target: &mut R,
) {
    let model = object.transform.compose();
    target.bind_object(&ObjectUniforms {
        model,
        pvm: *pv * model,
        material: object.material,
    });
    target.bind_texture(object.texture_binding());
    target.draw(&object.geometry, object.triangles);
}

/// One recorded call on a [`RenderContract`].
#[derive(Debug)]
pub enum DrawOp<'s, G, T> {
    BeginFrame(FrameUniforms),
    DepthWrite(bool),
    Object(ObjectUniforms),
    Texture(TextureBinding<'s, T>),
    Draw { geometry: &'s G, triangles: u32 },
}

/// A [`RenderContract`] that records the frame instead of drawing it.
///
/// The wgpu backend replays the recording once all uniforms are known, which
/// lets it upload every per-object uniform in a single buffer write.
#[derive(Debug)]
pub struct FrameRecorder<'s, G, T> {
    pub ops: Vec<DrawOp<'s, G, T>>,
}

impl<'s, G, T> FrameRecorder<'s, G, T> {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn object_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Object(_)))
            .count()
    }
}

impl<'s, G, T> Default for FrameRecorder<'s, G, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s, G: 's, T: 's> RenderContract<'s> for FrameRecorder<'s, G, T> {
    type Geometry = G;
    type Texture = T;

    fn begin_frame(&mut self, frame: &FrameUniforms) {
        self.ops.push(DrawOp::BeginFrame(*frame));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.ops.push(DrawOp::DepthWrite(enabled));
    }

    fn bind_object(&mut self, uniforms: &ObjectUniforms) {
        self.ops.push(DrawOp::Object(*uniforms));
    }

    fn bind_texture(&mut self, texture: TextureBinding<'s, T>) {
        self.ops.push(DrawOp::Texture(texture));
    }

    fn draw(&mut self, geometry: &'s G, triangles: u32) {
        self.ops.push(DrawOp::Draw {
            geometry,
            triangles,
        });
    }
}
