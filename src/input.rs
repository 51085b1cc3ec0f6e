//! Platform-neutral input events.
//!
//! The window layer translates its native events into [`InputEvent`]s so
//! the camera and the demo loop never see SDL types.

/// Keys the engine reacts to. Everything else maps to [`Key::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    /// Switches the active rasterizer in the demo.
    Tab,
    /// Toggles the depth visualization in the demo.
    Z,
    Space,
    LeftCtrl,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseButtonDown(MouseButton),
    MouseButtonUp(MouseButton),
    /// Relative pointer motion in pixels.
    MouseMotion { dx: f32, dy: f32 },
    Resized { width: u32, height: u32 },
    Quit,
}
