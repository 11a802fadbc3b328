//! Mutable scene state: objects, camera, light, blend mode and selection.
//!
//! Input handling mutates the scene between frames through `&mut SceneState`
//! (see [`SceneState::apply`]); the compositor only ever reads it.

use cgmath::{Rad, Vector3};

use crate::{
    camera::Camera,
    data_structures::object::RenderableObject,
    pipelines::light::{BlendMode, Light},
};

/// Rotation applied per manipulation step.
pub const ROTATE_STEP: Rad<f32> = Rad(std::f32::consts::PI / 50.0);

/// Axis of the camera frame used for object and camera manipulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewAxis {
    /// [`Camera::right`]
    Right,
    /// [`Camera::up`]
    Up,
    /// [`Camera::look_direction`]
    Forward,
}

/// Every mutation the viewer's input layer can request.
///
/// `sign` fields are `1.0` or `-1.0` and pick the direction along the axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneCommand {
    SelectNext,
    SelectPrevious,
    Deselect,
    Strafe { sign: f32 },
    Dolly { sign: f32 },
    Rise { sign: f32 },
    Yaw { sign: f32 },
    Pitch { sign: f32 },
    Roll { sign: f32 },
    ResetView,
    TranslateSelected { axis: ViewAxis, sign: f32 },
    RotateSelected { axis: ViewAxis, sign: f32 },
    ResetTransforms,
    ToggleBlendMode,
}

pub struct SceneState<G, T> {
    pub camera: Camera,
    pub light: Light,
    pub blend_mode: BlendMode,
    objects: Vec<RenderableObject<G, T>>,
    selected: Option<usize>,
    view_delta: f32,
}

impl<G, T> SceneState<G, T> {
    /// `view_delta` is the step length of a single camera or object move.
    pub fn new(objects: Vec<RenderableObject<G, T>>, view_delta: f32) -> Self {
        Self {
            camera: Camera::default(),
            light: Light::default(),
            blend_mode: BlendMode::default(),
            objects,
            selected: None,
            view_delta,
        }
    }

    pub fn objects(&self) -> &[RenderableObject<G, T>] {
        &self.objects
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut RenderableObject<G, T>> {
        self.objects.get_mut(index)
    }

    pub fn view_delta(&self) -> f32 {
        self.view_delta
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Highlight `index` and un-highlight the previous selection.
    pub fn select(&mut self, index: usize) {
        if index >= self.objects.len() {
            log::warn!("Cannot select object {}, the scene has {}", index, self.objects.len());
            return;
        }
        self.clear_selection();
        self.objects[index].transform.highlighted = true;
        self.selected = Some(index);
        log::debug!("Selected {}", self.objects[index].name);
    }

    pub fn select_next(&mut self) {
        if self.objects.is_empty() {
            return;
        }
        let next = self.selected.map_or(0, |i| (i + 1) % self.objects.len());
        self.select(next);
    }

    pub fn select_previous(&mut self) {
        if self.objects.is_empty() {
            return;
        }
        let previous = match self.selected {
            Some(i) if i > 0 => i - 1,
            _ => self.objects.len() - 1,
        };
        self.select(previous);
    }

    pub fn clear_selection(&mut self) {
        if let Some(object) = self.selected.take().and_then(|i| self.objects.get_mut(i)) {
            object.transform.highlighted = false;
        }
    }

    pub fn translate_selected(&mut self, offset: Vector3<f32>) {
        if let Some(object) = self.selected.and_then(|i| self.objects.get_mut(i)) {
            object.transform.translate(offset);
        }
    }

    pub fn rotate_selected(&mut self, axis: Vector3<f32>, angle: Rad<f32>) {
        if let Some(object) = self.selected.and_then(|i| self.objects.get_mut(i)) {
            object.transform.rotate(axis, angle);
        }
    }

    /// Zero translation and world axes for every object. Selection is untouched.
    pub fn reset_transforms(&mut self) {
        self.objects.iter_mut().for_each(|o| o.transform.reset());
    }

    pub fn toggle_blend_mode(&mut self) {
        self.blend_mode = self.blend_mode.toggled();
        log::info!("Blend mode is now {:?}", self.blend_mode);
    }

    fn view_axis(&self, axis: ViewAxis) -> Vector3<f32> {
        match axis {
            ViewAxis::Right => self.camera.right(),
            ViewAxis::Up => self.camera.up,
            ViewAxis::Forward => self.camera.look_direction(),
        }
    }

    pub fn apply(&mut self, command: SceneCommand) {
        let delta = self.view_delta;
        match command {
            SceneCommand::SelectNext => self.select_next(),
            SceneCommand::SelectPrevious => self.select_previous(),
            SceneCommand::Deselect => self.clear_selection(),
            SceneCommand::Strafe { sign } => self.camera.strafe(sign * delta),
            SceneCommand::Dolly { sign } => self.camera.dolly(sign * delta),
            SceneCommand::Rise { sign } => self.camera.rise(sign * delta),
            SceneCommand::Yaw { sign } => self.camera.yaw(sign * delta),
            SceneCommand::Pitch { sign } => self.camera.pitch(sign * delta),
            SceneCommand::Roll { sign } => self.camera.roll(sign * delta),
            SceneCommand::ResetView => self.camera.reset(),
            SceneCommand::TranslateSelected { axis, sign } => {
                let offset = self.view_axis(axis) * (sign * delta);
                self.translate_selected(offset);
            }
            SceneCommand::RotateSelected { axis, sign } => {
                let axis = self.view_axis(axis);
                self.rotate_selected(axis, ROTATE_STEP * sign);
            }
            SceneCommand::ResetTransforms => self.reset_transforms(),
            SceneCommand::ToggleBlendMode => self.toggle_blend_mode(),
        }
    }
}
