//! The windowed demo: event handling, fixed-timestep simulation, picking.
//!
//! [`StrataApp`] implements winit's `ApplicationHandler`. `resumed` builds
//! the window, GPU backend, and world; `RedrawRequested` runs the
//! fixed-timestep loop (camera motion and `World::update` per tick), applies
//! pending dig/place clicks, refreshes the picked-face highlight, and
//! submits the frame.

use std::sync::Arc;

use glam::Vec3;
use strata_config::Config;
use strata_render::{WgpuBackend, init_render_context_blocking};
use strata_terrain::{TerrainGenerator, TerrainPalette, TerrainParams};
use strata_voxel::BlockId;
use strata_world::{StreamConfig, World, WorldConfig};
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::KeyCode;
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use crate::camera::FlyCamera;
use crate::game_loop::GameLoop;
use crate::input::InputState;
use crate::palette::{Palette, demo_palette};

/// How far the crosshair ray reaches, in world units.
const PICK_RANGE: f32 = 8.0;
/// Highlight key for the crosshair pick.
const PICK_HIGHLIGHT: &str = "picked";
/// Title bar refresh interval, in frames.
const TITLE_INTERVAL: u64 = 30;

pub struct StrataApp {
    config: Config,
    window: Option<Arc<Window>>,
    world: Option<World<WgpuBackend>>,
    palette: Option<Palette>,
    camera: FlyCamera,
    input: InputState,
    game_loop: GameLoop,
    pointer_grabbed: bool,
}

impl StrataApp {
    pub fn new(config: Config) -> Self {
        let camera = FlyCamera::new(
            Vec3::new(0.5, 24.5, 0.5),
            config.graphics.fov_degrees,
            config.window.width as f32 / config.window.height.max(1) as f32,
        );
        Self {
            config,
            window: None,
            world: None,
            palette: None,
            camera,
            input: InputState::new(),
            game_loop: GameLoop::new(),
            pointer_grabbed: false,
        }
    }

    fn window_attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width as f64,
                self.config.window.height as f64,
            ))
    }

    fn grab_pointer(&mut self, grab: bool) {
        let Some(window) = &self.window else {
            return;
        };
        if grab {
            // Locked is unsupported on some platforms; Confined still keeps
            // the cursor in the window.
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
                .is_ok();
            window.set_cursor_visible(!grabbed);
            self.pointer_grabbed = grabbed;
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
            self.pointer_grabbed = false;
            self.input.clear_transient();
        }
    }

    /// Applies pending clicks and refreshes the crosshair highlight.
    fn apply_picking(&mut self) {
        let Some(world) = &mut self.world else {
            return;
        };
        let Some(palette) = self.palette else {
            return;
        };

        let dig = self.pointer_grabbed && self.input.take_dig();
        let place = self.pointer_grabbed && self.input.take_place();

        let hit = world.cast_ray(self.camera.position, self.camera.forward(), PICK_RANGE);
        if let Some(hit) = hit {
            if dig {
                world.set_block(hit.position, BlockId::AIR);
            } else if place {
                world.set_block(hit.position + hit.face.step(), palette.stone);
            }
        }

        // Re-pick after an edit so the highlight tracks the new surface.
        match world.cast_ray(self.camera.position, self.camera.forward(), PICK_RANGE) {
            Some(hit) => world.add_highlight(PICK_HIGHLIGHT, &hit),
            None => world.remove_highlight(PICK_HIGHLIGHT),
        }
    }

    fn refresh_title(&self) {
        if !self.config.debug.show_stats {
            return;
        }
        let (Some(window), Some(world)) = (&self.window, &self.world) else {
            return;
        };
        let stats = world.stats();
        window.set_title(&format!(
            "{} — {} chunks, {} slots, {} meshes live",
            self.config.window.title,
            world.loaded_chunks(),
            stats.slots_in_use,
            world.gpu().stats().meshes_created - world.gpu().stats().meshes_freed,
        ));
    }
}

impl ApplicationHandler for StrataApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(self.window_attributes()) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let context = match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(context) => context,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let (registry, palette, layers) = match demo_palette() {
            Ok(parts) => parts,
            Err(e) => {
                error!("Block palette registration failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let backend = match WgpuBackend::new(
            context,
            &layers,
            self.config.world.shadow_slots,
            self.config.graphics.shadow_resolution,
        ) {
            Ok(backend) => backend,
            Err(e) => {
                error!("Render backend initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let generator = TerrainGenerator::new(
            TerrainParams {
                seed: self.config.world.seed,
                ..TerrainParams::default()
            },
            TerrainPalette {
                surface: palette.grass,
                subsurface: palette.stone,
            },
        );
        let world_config = WorldConfig {
            stream: StreamConfig {
                load_radius: self.config.world.load_radius,
                evict_radius: self.config.world.evict_radius,
            },
            stage_budget: self.config.world.stage_budget,
            shadow_slots: self.config.world.shadow_slots,
        };

        let size = window.inner_size();
        self.camera.set_aspect(size.width, size.height);
        self.camera.speed = self.config.graphics.camera_speed;
        self.camera.sensitivity = self.config.graphics.mouse_sensitivity;

        self.world = Some(World::new(registry, generator, world_config, backend));
        self.palette = Some(palette);
        self.window = Some(window);

        info!(
            seed = self.config.world.seed,
            load_radius = self.config.world.load_radius,
            evict_radius = self.config.world.evict_radius,
            "World initialized"
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.camera.set_aspect(size.width, size.height);
                if let Some(world) = &mut self.world {
                    world.gpu_mut().resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed()
                    && event.physical_key == winit::keyboard::PhysicalKey::Code(KeyCode::Escape)
                {
                    self.grab_pointer(false);
                }
                self.input.process_key(&event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if !self.pointer_grabbed {
                    if state.is_pressed() {
                        self.grab_pointer(true);
                    }
                } else {
                    self.input.process_mouse_button(button, state);
                }
            }
            WindowEvent::RedrawRequested => {
                let camera = &mut self.camera;
                let input = &mut self.input;
                let world = &mut self.world;
                let pointer_grabbed = self.pointer_grabbed;

                self.game_loop.tick(|dt| {
                    if pointer_grabbed {
                        let delta = input.take_mouse_delta();
                        camera.look(delta.x, delta.y);
                        camera.advance(input.movement_axes(), dt as f32);
                    }
                    if let Some(world) = world {
                        world.update(camera.position);
                    }
                });

                self.apply_picking();

                if let Some(world) = &mut self.world {
                    world.render(self.camera.view_proj());
                }

                if self.game_loop.frame_count().is_multiple_of(TITLE_INTERVAL) {
                    self.refresh_title();
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event
            && self.pointer_grabbed
        {
            self.input.accumulate_mouse_motion(dx, dy);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
