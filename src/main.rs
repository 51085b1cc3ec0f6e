//! Interactive demo: a model, a fly camera, and 2D overlays.
//!
//! Controls: hold the left mouse button to look around, W/A/S/D/Space/LeftCtrl
//! move, Q/E spin the model, Tab switches rasterizer, Z shows the depth
//! buffer, Escape quits.

use anyhow::{Context, Result};

use softy::colors;
use softy::font::{draw_text, Font};
use softy::geometry::{Aabb, Rect};
use softy::input::{InputEvent, Key};
use softy::logging::{init_logging, LoggingConfig};
use softy::math::Vec2;
use softy::memory::{Arena, Memory};
use softy::render::{blit, draw_rect_outline, fill_rect, DepthBuffer, RasterizerType};
use softy::window::{FrameLimiter, Window};
use softy::{Bitmap, Camera, Model, Renderer, Scene};

/// Model spin in radians per second while Q or E is held.
const SPIN_SPEED: f32 = 1.5;

fn main() {
    init_logging(LoggingConfig::default());
    let config = softy::config::RenderConfig::from_env();

    if let Err(e) = run(config) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(config: softy::config::RenderConfig) -> Result<()> {
    let mut memory = Memory::new(config.permanent_arena_bytes, config.frame_arena_bytes);

    let mut scene = Scene::new();
    let model = match &config.model_path {
        Some(path) => Model::from_obj(path, &mut memory.permanent)
            .with_context(|| format!("loading model {}", path.display()))?,
        None => {
            let mut cube = Model::cube(&mut memory.permanent)?;
            cube.transform_mut().set_scale_uniform(10.0);
            cube
        }
    };
    scene.add(model);

    let font = match &config.font_path {
        Some(path) => Some(
            Font::from_file(path, config.font_size)
                .with_context(|| format!("loading font {}", path.display()))?,
        ),
        None => {
            log::info!("no font configured, HUD goes to the window title");
            None
        }
    };
    let overlay = checker_overlay(64, 8)?;

    let mut window = Window::new("softy", config.width, config.height).map_err(anyhow::Error::msg)?;
    let mut limiter = FrameLimiter::new(&window, config.target_fps);

    let mut camera = Camera::new(
        config.camera_start,
        config.camera_speed,
        config.mouse_sensitivity,
        config.projection(),
    );
    let mut renderer = Renderer::from_config(&config);
    let mut pixels = vec![0u8; config.width as usize * config.height as usize * 4];
    let mut bouncer = Bouncer::new(Vec2::new(120.0, 90.0), Vec2::new(180.0, 120.0), 60.0);

    let mut spin = 0.0;
    let mut show_depth = false;
    let mut fps = config.target_fps as f32;

    'running: loop {
        let dt = limiter.wait_and_get_delta(&window);
        if dt > 0.0 {
            fps = fps * 0.9 + (1.0 / dt) * 0.1;
        }

        for event in window.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => break 'running,
                InputEvent::Resized { width, height } => {
                    window.resize(width, height).map_err(anyhow::Error::msg)?;
                    pixels.resize(width as usize * height as usize * 4, 0);
                    let depth_bytes = width as usize * height as usize * 4;
                    if depth_bytes > memory.frame.capacity() {
                        log::info!("growing frame arena to {depth_bytes} bytes");
                        memory.frame = Arena::new("frame", depth_bytes);
                    }
                }
                InputEvent::KeyDown(Key::Tab) => {
                    let next = match renderer.rasterizer_type() {
                        RasterizerType::Scanline => RasterizerType::EdgeFunction,
                        RasterizerType::EdgeFunction => RasterizerType::Scanline,
                    };
                    renderer.set_rasterizer_type(next);
                }
                InputEvent::KeyDown(Key::Z) => show_depth = !show_depth,
                InputEvent::KeyDown(Key::Q) => spin = SPIN_SPEED,
                InputEvent::KeyDown(Key::E) => spin = -SPIN_SPEED,
                InputEvent::KeyUp(Key::Q | Key::E) => spin = 0.0,
                _ => {}
            }
            camera.handle_input_event(&event, dt);
        }

        camera.integrate(dt);
        for model in &mut scene.models {
            model.transform_mut().spin(spin * dt);
        }

        let (width, height) = (window.width(), window.height());
        memory.reset_frame();
        let mut frame = Bitmap::new(width, height, 4, pixels.as_mut_slice())?;

        let stats = renderer.render_frame(&mut frame, &camera, &scene, &mut memory)?;
        if show_depth {
            let plane = memory.frame.slice_mut(stats.depth)?;
            DepthBuffer::new(plane, width, height)?.visualize(&mut frame)?;
        }

        bouncer.step(dt, &frame.aabb());
        let rect = bouncer.rect();
        fill_rect(&mut frame, None, 0xFF80_00FF, &rect)?;
        draw_rect_outline(&mut frame, None, &rect.aabb(), colors::WHITE)?;
        blit(
            &mut frame,
            None,
            &overlay,
            None,
            Vec2::new(width as f32 - 48.0, 48.0),
            0xC0FF_FFFF,
        )?;

        let position = camera.position();
        let hud = [
            format!("{fps:.0} fps  {} triangles", stats.triangles),
            format!(
                "camera {:.1} {:.1} {:.1}",
                position.x, position.y, position.z
            ),
            format!("{} rasterizer", renderer.rasterizer_type()),
        ];
        match &font {
            Some(font) => {
                let mut baseline = 8.0 + font.ascent();
                for line in &hud {
                    draw_text(&mut frame, None, font, line, colors::YELLOW, Vec2::new(8.0, baseline))?;
                    baseline += font.line_height();
                }
            }
            None => window.set_title(&format!("softy | {}", hud.join(" | "))),
        }

        window.present(&frame).map_err(anyhow::Error::msg)?;
    }

    log::info!("bye");
    Ok(())
}

/// A 4-channel checkerboard with a transparent border, blitted as an overlay.
fn checker_overlay(size: u32, cell: u32) -> softy::Result<Bitmap> {
    let pixels: Vec<u32> = (0..size * size)
        .map(|i| {
            let (x, y) = (i % size, i / size);
            if x < 2 || y < 2 || x >= size - 2 || y >= size - 2 {
                0
            } else if (x / cell + y / cell) % 2 == 0 {
                colors::WHITE
            } else {
                colors::argb(0xFF, 0x20, 0x60, 0xC0)
            }
        })
        .collect();
    Bitmap::from_argb(size, size, &pixels)
}

/// A rectangle bouncing off the edges of the screen.
struct Bouncer {
    center: Vec2,
    velocity: Vec2,
    size: f32,
}

impl Bouncer {
    fn new(center: Vec2, velocity: Vec2, size: f32) -> Self {
        Self {
            center,
            velocity,
            size,
        }
    }

    fn step(&mut self, dt: f32, bounds: &Aabb) {
        self.center = self.center + self.velocity * dt;
        let half = self.size / 2.0;
        let min = bounds.min + Vec2::new(half, half);
        let max = bounds.max - Vec2::new(half, half);

        if self.center.x < min.x || self.center.x > max.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.center.y < min.y || self.center.y > max.y {
            self.velocity.y = -self.velocity.y;
        }
        self.center = self.center.max(min).min(max.max(min));
    }

    fn rect(&self) -> Rect {
        Rect::new(self.center, self.size, self.size)
    }
}
