use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Context;
use winit::{
  application::ApplicationHandler,
  dpi::LogicalSize,
  event::WindowEvent,
  event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
  window::{Window, WindowId},
};

use surfgrid_core::{BackendError, Scene, ViewerConfig};

use crate::input::InputQueue;
use crate::renderer::{load_texture_dir, GuiRenderer, WgpuBackend};

const BUILTIN_SHADER: &str = include_str!("../shaders/surface.wgsl");

pub fn run(config: ViewerConfig) -> anyhow::Result<()>
{
  let event_loop = EventLoop::new().context("failed to create event loop")?;
  let mut app = SurfgridApp::new(config);

  event_loop.run_app(&mut app).context("event loop terminated abnormally")?;

  match app.failure.take()
  {
    Some(e) => Err(e),
    None => Ok(()),
  }
}

/// Everything that only exists once a window does.
struct Viewer
{
  window: Arc<Window>,
  backend: WgpuBackend,
  gui: GuiRenderer,
  scene: Scene,
}

struct SurfgridApp
{
  config: ViewerConfig,
  viewer: Option<Viewer>,
  input: InputQueue,
  failure: Option<anyhow::Error>,
}

impl SurfgridApp
{
  fn new(config: ViewerConfig) -> Self
  {
    Self { config, viewer: None, input: InputQueue::new(), failure: None }
  }

  fn init_viewer(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()>
  {
    if self.viewer.is_some()
    {
      return Ok(());
    }

    let window_config = &self.config.window;
    let attrs = Window::default_attributes()
      .with_title(window_config.title.as_str())
      .with_inner_size(LogicalSize::new(window_config.width, window_config.height));
    let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);

    let mut backend = pollster::block_on(WgpuBackend::new(window.clone()))?;
    let gui = GuiRenderer::new(backend.device(), backend.format(), &window);

    let shader = shader_source(&self.config)?;
    let size = window.inner_size();
    let mut scene = Scene::bootstrap(&mut backend, &self.config, &shader, size.width, size.height)?;

    if let Some(dir) = &self.config.textures_dir
    {
      scene.set_textures(load_texture_dir(&mut backend, dir));
    }

    window.request_redraw();
    self.viewer = Some(Viewer { window, backend, gui, scene });
    Ok(())
  }

  fn handle_window_event(&mut self, elwt: &ActiveEventLoop, window_id: WindowId, event: WindowEvent)
  {
    let Some(viewer) = &mut self.viewer
    else
    {
      return;
    };
    if viewer.window.id() != window_id
    {
      return;
    }

    viewer.gui.handle_event(&viewer.window, &event);
    self.input.handle_event(&event);

    match event
    {
      WindowEvent::CloseRequested =>
      {
        elwt.exit();
      }

      WindowEvent::Resized(size) =>
      {
        viewer.backend.resize(size.width, size.height);
        viewer.window.request_redraw();
      }

      WindowEvent::RedrawRequested =>
      {
        if let Err(e) = self.frame()
        {
          self.fail(elwt, e);
        }
      }

      _ =>
      {}
    }
  }

  fn frame(&mut self) -> anyhow::Result<()>
  {
    let Some(viewer) = &mut self.viewer
    else
    {
      return Ok(());
    };

    for event in self.input.drain()
    {
      viewer.scene.handle_input(event);
    }

    match viewer.scene.render(&mut viewer.backend)
    {
      Ok(()) =>
      {}
      Err(BackendError::FrameUnavailable(reason)) =>
      {
        log::warn!("skipping frame: {reason}");
        viewer.window.request_redraw();
        return Ok(());
      }
      Err(e) => return Err(e.into()),
    }

    let lines = viewer.scene.status_lines();
    let overlay = viewer.gui.status_overlay(&viewer.window, &lines);
    viewer.backend.present(&mut viewer.gui, &viewer.window, overlay)?;

    // the wave surface animates, so keep drawing
    viewer.window.request_redraw();
    Ok(())
  }

  fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error)
  {
    log::error!("{error:#}");
    self.failure.get_or_insert(error);
    event_loop.exit();
  }
}

impl ApplicationHandler for SurfgridApp
{
  fn resumed(&mut self, event_loop: &ActiveEventLoop)
  {
    event_loop.set_control_flow(ControlFlow::Wait);

    if let Err(e) = self.init_viewer(event_loop)
    {
      self.fail(event_loop, e);
    }
  }

  fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent)
  {
    self.handle_window_event(event_loop, window_id, event);
  }
}

fn shader_source(config: &ViewerConfig) -> anyhow::Result<Cow<'static, str>>
{
  match &config.shader_path
  {
    Some(path) =>
    {
      log::info!("loading shader from {}", path.display());
      let source = std::fs::read_to_string(path).with_context(|| format!("failed to read shader {}", path.display()))?;
      Ok(Cow::Owned(source))
    }
    None => Ok(Cow::Borrowed(BUILTIN_SHADER)),
  }
}
