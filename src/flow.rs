//! Viewer event loop.
//!
//! [`Viewer`] is the winit application: it opens the window, creates the GPU
//! [`Context`], loads the scene and starts its textures loading, then redraws
//! continuously. Keyboard input is translated into [`SceneCommand`]s by
//! [`command_for_key`] and applied to the scene between frames.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and loads everything (blocking on the tokio
//!    runtime natively, via a user event on the web)
//! 2. `window_event` handles keys, resizes and redraws
//! 3. every redraw composes the frame, presents it and requests the next one

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    camera::{Camera, Projection},
    config::ViewerConfig,
    context::{Context, GpuScene},
    render::FrameCompositor,
    resources::{build_scene, load_scene, mesh::upload_mesh, texture::TextureLoader},
    scene::{SceneCommand, ViewAxis},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Map a key press to a scene command. Shift turns camera moves into turns
/// and object moves into rotations.
pub fn command_for_key(key: KeyCode, shift: bool) -> Option<SceneCommand> {
    let command = match (key, shift) {
        (KeyCode::ArrowRight | KeyCode::ArrowDown, _) => SceneCommand::SelectNext,
        (KeyCode::ArrowLeft | KeyCode::ArrowUp, _) => SceneCommand::SelectPrevious,
        (KeyCode::Space, _) => SceneCommand::Deselect,
        (KeyCode::Escape, _) => SceneCommand::ResetView,
        (KeyCode::Backspace, _) => SceneCommand::ResetTransforms,
        (KeyCode::KeyB, _) => SceneCommand::ToggleBlendMode,

        // right is look × up, which points to screen left
        (KeyCode::KeyA, false) => SceneCommand::Strafe { sign: 1.0 },
        (KeyCode::KeyD, false) => SceneCommand::Strafe { sign: -1.0 },
        (KeyCode::KeyA, true) => SceneCommand::Yaw { sign: 1.0 },
        (KeyCode::KeyD, true) => SceneCommand::Yaw { sign: -1.0 },
        (KeyCode::KeyW, false) => SceneCommand::Dolly { sign: 1.0 },
        (KeyCode::KeyS, false) => SceneCommand::Dolly { sign: -1.0 },
        (KeyCode::KeyW, true) => SceneCommand::Pitch { sign: -1.0 },
        (KeyCode::KeyS, true) => SceneCommand::Pitch { sign: 1.0 },
        (KeyCode::KeyQ, false) => SceneCommand::Rise { sign: 1.0 },
        (KeyCode::KeyE, false) => SceneCommand::Rise { sign: -1.0 },
        (KeyCode::KeyQ, true) => SceneCommand::Roll { sign: -1.0 },
        (KeyCode::KeyE, true) => SceneCommand::Roll { sign: 1.0 },

        (key, shift) => {
            let (axis, sign) = match key {
                KeyCode::KeyK => (ViewAxis::Right, -1.0),
                KeyCode::Semicolon => (ViewAxis::Right, 1.0),
                KeyCode::KeyO => (ViewAxis::Up, 1.0),
                KeyCode::KeyL => (ViewAxis::Up, -1.0),
                KeyCode::KeyI => (ViewAxis::Forward, -1.0),
                KeyCode::KeyP => (ViewAxis::Forward, 1.0),
                _ => return None,
            };
            if shift {
                SceneCommand::RotateSelected { axis, sign }
            } else {
                SceneCommand::TranslateSelected { axis, sign }
            }
        }
    };
    Some(command)
}

/// Everything that exists once loading finished.
pub struct ViewerState {
    pub(crate) ctx: Context,
    pub scene: GpuScene,
    pub compositor: FrameCompositor,
    is_surface_configured: bool,
}

impl ViewerState {
    async fn load(
        window: Arc<Window>,
        config: ViewerConfig,
        #[cfg(not(target_arch = "wasm32"))] runtime: tokio::runtime::Handle,
    ) -> anyhow::Result<Self> {
        let mut ctx = Context::new(window).await?;
        ctx.renderer.clear_colour = config.clear_colour();

        let sets = load_scene(&config.scene_file).await?;
        let loader = TextureLoader::new(
            ctx.texture_uploader(),
            #[cfg(not(target_arch = "wasm32"))]
            runtime,
        );
        let device = ctx.device();
        let mut scene = build_scene(
            &sets,
            |i, set| upload_mesh(device, &format!("set {i}"), set),
            |name| loader.request(name),
        );
        scene.camera = Camera::from(&config.camera);
        scene.light = config.light;
        scene.blend_mode = config.blend_mode;
        log::info!(
            "Scene ready: {} objects, step {}",
            scene.objects().len(),
            scene.view_delta()
        );

        let compositor = FrameCompositor::new(Projection {
            aspect: ctx.aspect(),
            ..Projection::default()
        });

        Ok(Self {
            ctx,
            scene,
            compositor,
            is_surface_configured: true,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.is_surface_configured = self.ctx.resize(width, height);
        if self.is_surface_configured {
            self.compositor.projection.aspect = self.ctx.aspect();
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // keep redrawing so textures show up as soon as they settle
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }
        self.ctx.render(&self.scene, &self.compositor)
    }
}

pub(crate) enum ViewerEvent {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    Loaded(Box<anyhow::Result<ViewerState>>),
}

pub struct Viewer {
    config: ViewerConfig,
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<ViewerEvent>,
    state: Option<ViewerState>,
    shift: bool,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl Viewer {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            state: None,
            shift: false,
            last_time: Instant::now(),
            error: None,
        })
    }

    fn loaded(&mut self, event_loop: &ActiveEventLoop, result: anyhow::Result<ViewerState>) {
        match result {
            Ok(mut state) => {
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Cannot start the viewer: {:#}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler<ViewerEvent> for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(self.config.title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.loaded(event_loop, Err(e.into()));
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let handle = self.async_runtime.handle().clone();
            let result = self
                .async_runtime
                .block_on(ViewerState::load(window, self.config.clone(), handle));
            self.loaded(event_loop, result);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = ViewerState::load(window, config).await;
                if proxy.send_event(ViewerEvent::Loaded(Box::new(result))).is_err() {
                    log::error!("Event loop closed before the viewer finished loading");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Loaded(result) => self.loaded(event_loop, *result),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift = modifiers.state().shift_key();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if let Some(command) = command_for_key(code, self.shift) {
                    log::debug!("{:?}", command);
                    state.scene.apply(command);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                log::trace!("Frame time {:?}", dt);

                match state.render() {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Open a window and view the scene named in `config` until it is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut viewer = Viewer::new(&event_loop, config)?;
    event_loop.run_app(&mut viewer)?;

    match viewer.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(ViewerConfig::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_turns_camera_moves_into_turns() {
        assert_eq!(
            command_for_key(KeyCode::KeyA, false),
            Some(SceneCommand::Strafe { sign: 1.0 })
        );
        assert_eq!(
            command_for_key(KeyCode::KeyA, true),
            Some(SceneCommand::Yaw { sign: 1.0 })
        );
        assert_eq!(
            command_for_key(KeyCode::KeyW, true),
            Some(SceneCommand::Pitch { sign: -1.0 })
        );
        assert_eq!(
            command_for_key(KeyCode::KeyE, true),
            Some(SceneCommand::Roll { sign: 1.0 })
        );
    }

    #[test]
    fn shift_turns_object_moves_into_rotations() {
        assert_eq!(
            command_for_key(KeyCode::Semicolon, false),
            Some(SceneCommand::TranslateSelected {
                axis: ViewAxis::Right,
                sign: 1.0
            })
        );
        assert_eq!(
            command_for_key(KeyCode::KeyO, true),
            Some(SceneCommand::RotateSelected {
                axis: ViewAxis::Up,
                sign: 1.0
            })
        );
    }

    #[test]
    fn selection_keys_ignore_shift() {
        for shift in [false, true] {
            assert_eq!(
                command_for_key(KeyCode::ArrowRight, shift),
                Some(SceneCommand::SelectNext)
            );
            assert_eq!(
                command_for_key(KeyCode::Space, shift),
                Some(SceneCommand::Deselect)
            );
        }
    }

    #[test]
    fn unmapped_keys_do_nothing() {
        assert_eq!(command_for_key(KeyCode::KeyZ, false), None);
        assert_eq!(command_for_key(KeyCode::F1, true), None);
    }
}
