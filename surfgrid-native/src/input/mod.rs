use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use surfgrid_core::{InputEvent, Key, KeyAction, MouseButton};

// pixels per scroll line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f32 = 40.0;

/// Collects window events between frames.
///
/// The event loop pushes as events arrive; the frame drains the queue
/// before rendering so the scene sees input in arrival order.
pub struct InputQueue
{
  events: Vec<InputEvent>,
  cursor: Vec2,
}

impl InputQueue
{
  pub fn new() -> Self
  {
    Self { events: Vec::new(), cursor: Vec2::ZERO }
  }

  pub fn handle_event(&mut self, event: &WindowEvent)
  {
    match event
    {
      WindowEvent::KeyboardInput { event, .. } =>
      {
        if event.state != ElementState::Pressed
        {
          return;
        }

        let key = match event.physical_key
        {
          PhysicalKey::Code(code) => map_key(code),
          PhysicalKey::Unidentified(_) => Key::Other,
        };
        if key == Key::Other
        {
          return;
        }

        let action = if event.repeat { KeyAction::Repeat } else { KeyAction::Press };
        self.events.push(InputEvent::Key { key, action });
      }

      WindowEvent::CursorMoved { position, .. } =>
      {
        self.cursor = Vec2::new(position.x as f32, position.y as f32);
        self.events.push(InputEvent::CursorMoved { position: self.cursor });
      }

      WindowEvent::MouseInput { state, button, .. } =>
      {
        let Some(button) = map_button(*button)
        else
        {
          return;
        };

        let position = self.cursor;
        self.events.push(match state
        {
          ElementState::Pressed => InputEvent::MouseDown { button, position },
          ElementState::Released => InputEvent::MouseUp { button, position },
        });
      }

      WindowEvent::MouseWheel { delta, .. } =>
      {
        let lines = match delta
        {
          MouseScrollDelta::LineDelta(_, y) => *y,
          MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
        };
        if lines != 0.0
        {
          self.events.push(InputEvent::Scroll { lines });
        }
      }

      WindowEvent::Resized(size) =>
      {
        self.events.push(InputEvent::Resized { width: size.width, height: size.height });
      }

      _ =>
      {}
    }
  }

  /// Hand over everything queued since the last frame.
  pub fn drain(&mut self) -> std::vec::Drain<'_, InputEvent>
  {
    self.events.drain(..)
  }
}

fn map_key(code: KeyCode) -> Key
{
  match code
  {
    KeyCode::KeyW => Key::W,
    KeyCode::KeyA => Key::A,
    KeyCode::KeyS => Key::S,
    KeyCode::KeyD => Key::D,
    KeyCode::KeyX => Key::X,
    KeyCode::Space => Key::Space,
    KeyCode::ArrowLeft => Key::Left,
    KeyCode::ArrowRight => Key::Right,
    KeyCode::ArrowUp => Key::Up,
    KeyCode::ArrowDown => Key::Down,
    KeyCode::KeyP => Key::P,
    KeyCode::Tab => Key::Tab,
    KeyCode::KeyC => Key::C,
    KeyCode::KeyF => Key::F,
    KeyCode::KeyT => Key::T,
    KeyCode::KeyV => Key::V,
    _ => Key::Other,
  }
}

fn map_button(button: WinitButton) -> Option<MouseButton>
{
  match button
  {
    WinitButton::Left => Some(MouseButton::Left),
    WinitButton::Middle => Some(MouseButton::Middle),
    WinitButton::Right => Some(MouseButton::Right),
    _ => None,
  }
}

#[cfg(test)]
mod tests
{
  use winit::dpi::PhysicalSize;

  use super::*;

  #[test]
  fn viewer_keys_map_and_others_do_not()
  {
    assert_eq!(map_key(KeyCode::KeyW), Key::W);
    assert_eq!(map_key(KeyCode::Tab), Key::Tab);
    assert_eq!(map_key(KeyCode::ArrowDown), Key::Down);
    assert_eq!(map_key(KeyCode::KeyQ), Key::Other);
  }

  #[test]
  fn back_and_forward_buttons_are_ignored()
  {
    assert_eq!(map_button(WinitButton::Right), Some(MouseButton::Right));
    assert_eq!(map_button(WinitButton::Back), None);
  }

  #[test]
  fn resize_is_queued_and_drained_once()
  {
    let mut queue = InputQueue::new();
    queue.handle_event(&WindowEvent::Resized(PhysicalSize::new(640, 480)));

    let drained: Vec<_> = queue.drain().collect();
    assert_eq!(drained, vec![InputEvent::Resized { width: 640, height: 480 }]);
    assert_eq!(queue.drain().count(), 0);
  }
}
