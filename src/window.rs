//! SDL2 presentation window.
//!
//! Owns the OS window and a streaming ARGB8888 texture the finished frame is
//! uploaded to, and translates SDL events into [`InputEvent`]s. Nothing
//! else in the crate touches SDL.

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton as SdlMouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::WindowContext;

use crate::bitmap::Bitmap;
use crate::input::{InputEvent, Key, MouseButton};

/// Sleeps away the rest of each frame to hold a target frame rate.
pub struct FrameLimiter {
    frame_ms: u64,
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window, target_fps: u32) -> Self {
        Self {
            frame_ms: 1000 / u64::from(target_fps.max(1)),
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Waits if necessary to maintain the frame rate and returns the seconds
    /// elapsed since the previous call.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> f32 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < self.frame_ms {
            std::thread::sleep(std::time::Duration::from_millis(self.frame_ms - delta_time));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time as f32 / 1000.0
    }
}

pub struct Window {
    // Dropped before `texture_creator`, which it borrows from.
    texture: Texture<'static>,
    texture_creator: Box<TextureCreator<WindowContext>>,
    canvas: Canvas<sdl2::video::Window>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;
        let texture = Self::create_texture(&texture_creator, width, height)?;

        log::info!("window {width}x{height} opened");
        Ok(Self {
            texture,
            texture_creator,
            canvas,
            event_pump,
            timer_subsystem,
            width,
            height,
        })
    }

    fn create_texture(
        creator: &TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Texture<'static>, String> {
        // SAFETY: the creator is boxed, so its address is stable, and the
        // `Window` drops the texture before the creator.
        let creator: &'static TextureCreator<WindowContext> = unsafe { &*(creator as *const _) };
        creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())
    }

    /// Drains pending SDL events.
    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.event_pump.poll_iter().filter_map(translate).collect()
    }

    /// Uploads a 4-channel bitmap of the window's size and shows it.
    pub fn present<B: AsRef<[u8]>>(&mut self, frame: &Bitmap<B>) -> Result<(), String> {
        if frame.channels() != 4 || frame.width() != self.width || frame.height() != self.height {
            return Err(format!(
                "frame {}x{}x{} does not match window {}x{}",
                frame.width(),
                frame.height(),
                frame.channels(),
                self.width,
                self.height
            ));
        }
        self.texture
            .update(None, frame.data(), frame.pitch())
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas.copy(&self.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    /// Recreates the streaming texture for a new window size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.texture = Self::create_texture(&self.texture_creator, width, height)?;
        self.width = width;
        self.height = height;
        log::debug!("window resized to {width}x{height}");
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.canvas.window_mut().set_title(title) {
            log::warn!("could not set window title: {e}");
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}

fn translate(event: Event) -> Option<InputEvent> {
    match event {
        Event::Quit { .. } => Some(InputEvent::Quit),
        Event::KeyDown {
            keycode: Some(keycode),
            repeat: false,
            ..
        } => Some(InputEvent::KeyDown(key(keycode))),
        Event::KeyUp {
            keycode: Some(keycode),
            ..
        } => Some(InputEvent::KeyUp(key(keycode))),
        Event::MouseButtonDown { mouse_btn, .. } => {
            mouse_button(mouse_btn).map(InputEvent::MouseButtonDown)
        }
        Event::MouseButtonUp { mouse_btn, .. } => {
            mouse_button(mouse_btn).map(InputEvent::MouseButtonUp)
        }
        Event::MouseMotion { xrel, yrel, .. } => Some(InputEvent::MouseMotion {
            dx: xrel as f32,
            dy: yrel as f32,
        }),
        Event::Window {
            win_event: WindowEvent::Resized(w, h),
            ..
        } => Some(InputEvent::Resized {
            width: w.max(1) as u32,
            height: h.max(1) as u32,
        }),
        _ => None,
    }
}

fn key(keycode: Keycode) -> Key {
    match keycode {
        Keycode::W => Key::W,
        Keycode::A => Key::A,
        Keycode::S => Key::S,
        Keycode::D => Key::D,
        Keycode::Q => Key::Q,
        Keycode::E => Key::E,
        Keycode::Z => Key::Z,
        Keycode::Tab => Key::Tab,
        Keycode::Space => Key::Space,
        Keycode::LCtrl => Key::LeftCtrl,
        Keycode::Escape => Key::Escape,
        _ => Key::Other,
    }
}

fn mouse_button(button: SdlMouseButton) -> Option<MouseButton> {
    match button {
        SdlMouseButton::Left => Some(MouseButton::Left),
        SdlMouseButton::Middle => Some(MouseButton::Middle),
        SdlMouseButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}
