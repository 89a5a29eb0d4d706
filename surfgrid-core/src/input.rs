use glam::Vec2;

/// Keys the viewer reacts to. Everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key
{
  W,
  A,
  S,
  D,
  X,
  Space,
  Left,
  Right,
  Up,
  Down,
  P,
  Tab,
  C,
  F,
  T,
  V,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction
{
  Press,
  Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton
{
  Left,
  Middle,
  Right,
}

/// One discrete input occurrence, queued by the platform layer and
/// consumed at the top of the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent
{
  Key
  {
    key: Key,
    action: KeyAction,
  },
  MouseDown
  {
    button: MouseButton,
    position: Vec2,
  },
  MouseUp
  {
    button: MouseButton,
    position: Vec2,
  },
  CursorMoved
  {
    position: Vec2,
  },
  Scroll
  {
    lines: f32,
  },
  Resized
  {
    width: u32,
    height: u32,
  },
}

impl InputEvent
{
  pub fn press(key: Key) -> Self
  {
    InputEvent::Key { key, action: KeyAction::Press }
  }

  pub fn repeat(key: Key) -> Self
  {
    InputEvent::Key { key, action: KeyAction::Repeat }
  }
}
