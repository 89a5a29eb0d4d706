use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3};

use crate::backend::{NamedTexture, ProgramHandle, RenderBackend};
use crate::camera::Camera;
use crate::config::{SurfaceConfig, ViewerConfig};
use crate::entity::SurfaceEntity;
use crate::error::{BackendError, Result};
use crate::input::{InputEvent, Key, KeyAction, MouseButton};
use crate::mesh::RESTART_INDEX;
use crate::modes::{Cycle, RasterMode};
use crate::transform::{self, ProjectionMode};

//
// ──────────────────────────────────────────────────────────────
//   Controls
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls
{
  pub move_speed: f32,
  pub light_speed: f32,
  pub zoom_step: f32,
}

impl Default for Controls
{
  fn default() -> Self
  {
    Self { move_speed: 0.02, light_speed: 0.02, zoom_step: 0.1 }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(usize);

//
// ──────────────────────────────────────────────────────────────
//   Scene
//
//   Owns the camera, the projection and every entity. View and
//   projection flow one way: scene → entities. Frame order is
//   input → propagate → draw.
// ──────────────────────────────────────────────────────────────
//

pub struct Scene
{
  camera: Camera,
  controls: Controls,

  projection_mode: ProjectionMode,
  projection: Mat4,
  raster_mode: RasterMode,
  width: u32,
  height: u32,

  entities: Vec<SurfaceEntity>,
  active: Option<usize>,

  light_position: Vec3,
  light_marker: Option<SurfaceEntity>,
  light_marker_offset: Vec3,
  light_marker_scale: f32,

  textures: Vec<NamedTexture>,
  texture_index: usize,

  drag_origin: Option<Vec2>,
}

impl Scene
{
  pub fn new(camera: Camera, width: u32, height: u32) -> Self
  {
    let projection_mode = ProjectionMode::Perspective;

    Self {
      camera,
      controls: Controls::default(),
      projection_mode,
      projection: transform::projection_matrix(projection_mode, width, height),
      raster_mode: RasterMode::Fill,
      width,
      height,
      entities: Vec::new(),
      active: None,
      light_position: Vec3::ZERO,
      light_marker: None,
      light_marker_offset: Vec3::ZERO,
      light_marker_scale: 1.0,
      textures: Vec::new(),
      texture_index: 0,
      drag_origin: None,
    }
  }

  /// Build the default viewer scene: floor, main surface and light marker.
  ///
  /// Creates the shader program and configures the strip restart index
  /// before any entity exists, so every entity shares one program handle.
  pub fn bootstrap<B: RenderBackend + ?Sized>(
    backend: &mut B,
    config: &ViewerConfig,
    shader_source: &str,
    width: u32,
    height: u32,
  ) -> Result<Self>
  {
    let program = backend.create_program(shader_source)?;
    backend.set_restart_index(RESTART_INDEX)?;

    let cam = &config.camera;
    let camera = Camera::default()
      .with_position(cam.position)
      .with_azimuth(cam.azimuth_deg.to_radians())
      .with_zenith(cam.zenith_deg.to_radians())
      .with_radius(cam.radius)
      .with_first_person(cam.first_person);

    let mut scene = Scene::new(camera, width, height);
    scene.controls =
      Controls { move_speed: cam.move_speed, light_speed: config.light.move_speed, zoom_step: cam.zoom_step };
    scene.raster_mode = config.raster_mode;
    scene.set_projection_mode(config.projection);

    scene.add_entity(build_entity(backend, program, &config.floor)?);
    let main = scene.add_entity(build_entity(backend, program, &config.surface)?);
    scene.set_active(main);

    let marker = build_entity(backend, program, &config.light_marker)?;
    scene.set_light_marker(marker, config.light_marker.offset, config.light_marker.scale);
    scene.set_light_position(config.light.position);

    log::info!("scene ready with {} surfaces", scene.entities.len());
    Ok(scene)
  }

  //
  // ── Entities ───────────────────────────────────────────────
  //

  pub fn add_entity(&mut self, mut entity: SurfaceEntity) -> EntityId
  {
    entity.set_view_matrix(self.camera.view_matrix());
    entity.set_projection_matrix(self.projection);
    self.entities.push(entity);
    EntityId(self.entities.len() - 1)
  }

  pub fn entity(&self, id: EntityId) -> Option<&SurfaceEntity>
  {
    self.entities.get(id.0)
  }

  pub fn entities(&self) -> &[SurfaceEntity]
  {
    &self.entities
  }

  /// Entity that mode and texture keys apply to.
  pub fn set_active(&mut self, id: EntityId)
  {
    if id.0 < self.entities.len()
    {
      self.active = Some(id.0);
      self.apply_texture();
    }
  }

  pub fn active_entity(&self) -> Option<&SurfaceEntity>
  {
    self.active.and_then(|i| self.entities.get(i))
  }

  fn active_entity_mut(&mut self) -> Option<&mut SurfaceEntity>
  {
    self.active.and_then(|i| self.entities.get_mut(i))
  }

  //
  // ── Light ──────────────────────────────────────────────────
  //

  /// Marker drawn at the light position plus `offset`, scaled uniformly by
  /// `scale`. Any transform the marker already carries is replaced.
  pub fn set_light_marker(&mut self, mut marker: SurfaceEntity, offset: Vec3, scale: f32)
  {
    marker.set_view_matrix(self.camera.view_matrix());
    marker.set_projection_matrix(self.projection);
    self.light_marker = Some(marker);
    self.light_marker_offset = offset;
    self.light_marker_scale = scale;
    self.place_light_marker();
  }

  pub fn light_marker(&self) -> Option<&SurfaceEntity>
  {
    self.light_marker.as_ref()
  }

  pub fn light_position(&self) -> Vec3
  {
    self.light_position
  }

  pub fn set_light_position(&mut self, position: Vec3)
  {
    self.light_position = position;
    self.place_light_marker();
  }

  fn place_light_marker(&mut self)
  {
    let scale = self.light_marker_scale;

    if let Some(marker) = &mut self.light_marker
    {
      marker.reset_transform();
      marker.translate(self.light_position + self.light_marker_offset);
      marker.scale(Vec3::splat(scale));
    }
  }

  //
  // ── Textures ───────────────────────────────────────────────
  //

  /// Replace the texture set; the last one becomes current.
  pub fn set_textures(&mut self, textures: Vec<NamedTexture>)
  {
    self.texture_index = textures.len().saturating_sub(1);
    self.textures = textures;
    self.apply_texture();
  }

  pub fn current_texture(&self) -> Option<&NamedTexture>
  {
    self.textures.get(self.texture_index)
  }

  pub fn next_texture(&mut self)
  {
    if self.textures.is_empty()
    {
      return;
    }

    self.texture_index = (self.texture_index + 1) % self.textures.len();
    self.apply_texture();

    log::info!("texture: {}", self.textures[self.texture_index].name);
  }

  fn apply_texture(&mut self)
  {
    let handle = self.current_texture().map(|t| t.handle);

    if let (Some(handle), Some(entity)) = (handle, self.active_entity_mut())
    {
      entity.set_texture(Some(handle));
    }
  }

  //
  // ── Camera & projection ────────────────────────────────────
  //

  pub fn camera(&self) -> Camera
  {
    self.camera
  }

  pub fn set_camera(&mut self, camera: Camera)
  {
    self.camera = camera;
    self.propagate_transforms();
  }

  pub fn controls(&self) -> Controls
  {
    self.controls
  }

  pub fn projection_mode(&self) -> ProjectionMode
  {
    self.projection_mode
  }

  pub fn projection_matrix(&self) -> Mat4
  {
    self.projection
  }

  pub fn set_projection_mode(&mut self, mode: ProjectionMode)
  {
    self.projection_mode = mode;
    self.update_projection();
  }

  pub fn toggle_projection(&mut self)
  {
    self.set_projection_mode(self.projection_mode.toggled());
    log::info!("projection: {}", self.projection_mode);
  }

  pub fn size(&self) -> (u32, u32)
  {
    (self.width, self.height)
  }

  /// Track the window size. Zero-sized (minimised) windows are ignored.
  pub fn resize(&mut self, width: u32, height: u32)
  {
    if width == 0 || height == 0
    {
      return;
    }

    self.width = width;
    self.height = height;
    self.update_projection();
  }

  fn update_projection(&mut self)
  {
    self.projection = transform::projection_matrix(self.projection_mode, self.width, self.height);
    self.propagate_transforms();
  }

  /// Push the current view and projection into every entity.
  pub fn propagate_transforms(&mut self)
  {
    let view = self.camera.view_matrix();
    let projection = self.projection;

    for entity in self.entities.iter_mut().chain(self.light_marker.iter_mut())
    {
      entity.set_view_matrix(view);
      entity.set_projection_matrix(projection);
    }
  }

  //
  // ── Modes ──────────────────────────────────────────────────
  //

  pub fn raster_mode(&self) -> RasterMode
  {
    self.raster_mode
  }

  pub fn cycle_raster_mode(&mut self)
  {
    self.raster_mode = self.raster_mode.next();
    log::info!("polygon mode: {}", self.raster_mode);
  }

  pub fn cycle_color_mode(&mut self)
  {
    if let Some(entity) = self.active_entity_mut()
    {
      entity.set_color_mode(entity.color_mode().next());
      log::info!("color mode: {}", entity.color_mode());

      if entity.color_mode().samples_texture() && entity.texture().is_none()
      {
        log::info!("no texture loaded, texture mode draws untextured");
      }
    }
  }

  pub fn cycle_func_type(&mut self)
  {
    if let Some(entity) = self.active_entity_mut()
    {
      entity.set_func_type(entity.func_type().next());
      log::info!("function type: {}", entity.func_type());
    }
  }

  pub fn toggle_camera_mode(&mut self)
  {
    let first_person = !self.camera.is_first_person();
    self.set_camera(self.camera.with_first_person(first_person));
    log::info!("camera: {}", if first_person { "first person" } else { "orbit" });
  }

  //
  // ── Input ──────────────────────────────────────────────────
  //

  pub fn handle_input(&mut self, event: InputEvent)
  {
    match event
    {
      InputEvent::Key { key, action } =>
      {
        if action == KeyAction::Press
        {
          self.on_key_press(key);
        }
        self.move_camera(key);
        self.move_light(key);
      }

      InputEvent::MouseDown { button: MouseButton::Left, position } =>
      {
        self.drag_origin = Some(position);
      }

      InputEvent::MouseUp { button: MouseButton::Left, position } =>
      {
        if self.drag_origin.is_some()
        {
          self.rotate_camera(position);
        }
        self.drag_origin = None;
      }

      InputEvent::CursorMoved { position } =>
      {
        if self.drag_origin.is_some()
        {
          self.rotate_camera(position);
        }
      }

      InputEvent::Scroll { lines } => self.zoom(lines),

      InputEvent::Resized { width, height } => self.resize(width, height),

      _ =>
      {}
    }
  }

  fn on_key_press(&mut self, key: Key)
  {
    match key
    {
      Key::P => self.cycle_raster_mode(),
      Key::Tab => self.toggle_projection(),
      Key::C => self.cycle_color_mode(),
      Key::F => self.cycle_func_type(),
      Key::T => self.next_texture(),
      Key::V => self.toggle_camera_mode(),
      _ =>
      {}
    }
  }

  fn move_camera(&mut self, key: Key)
  {
    let speed = self.controls.move_speed;

    let camera = match key
    {
      Key::W => self.camera.forward(speed),
      Key::S => self.camera.backward(speed),
      Key::A => self.camera.left(speed),
      Key::D => self.camera.right(speed),
      Key::Space => self.camera.up(speed),
      Key::X => self.camera.down(speed),
      _ => return,
    };

    log::trace!("camera at {:?}", camera.position());
    self.set_camera(camera);
  }

  fn move_light(&mut self, key: Key)
  {
    let speed = self.controls.light_speed;

    let direction = match key
    {
      Key::Right => Vec3::new(speed, 0.0, 0.0),
      Key::Left => Vec3::new(-speed, 0.0, 0.0),
      Key::Up => Vec3::new(0.0, speed, 0.0),
      Key::Down => Vec3::new(0.0, -speed, 0.0),
      _ => return,
    };

    self.set_light_position(self.light_position + direction);
    log::trace!("light at {:?}", self.light_position);
  }

  fn rotate_camera(&mut self, position: Vec2)
  {
    let Some(origin) = self.drag_origin
    else
    {
      return;
    };

    let delta_az = PI * (origin.x - position.x) / self.width.max(1) as f32;
    let delta_zen = PI * (origin.y - position.y) / self.height.max(1) as f32;

    self.drag_origin = Some(position);
    self.set_camera(self.camera.add_azimuth(delta_az).add_zenith(delta_zen));
  }

  fn zoom(&mut self, lines: f32)
  {
    if lines == 0.0 || self.camera.is_first_person()
    {
      return;
    }

    let factor = (1.0 - lines * self.controls.zoom_step).max(0.1);
    self.set_camera(self.camera.mul_radius(factor));
  }

  //
  // ── Frame ──────────────────────────────────────────────────
  //

  /// Clear, set the raster mode and draw the light marker followed by every
  /// entity in insertion order.
  pub fn render<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> Result<(), BackendError>
  {
    self.propagate_transforms();

    backend.set_viewport(self.width, self.height);
    backend.clear_frame()?;
    backend.set_raster_mode(self.raster_mode);

    if let Some(marker) = &mut self.light_marker
    {
      marker.set_light_position(self.light_position);
      marker.draw(backend)?;
    }

    for entity in &mut self.entities
    {
      entity.set_light_position(self.light_position);
      entity.draw(backend)?;
    }

    Ok(())
  }

  /// Overlay text describing the current toggles.
  pub fn status_lines(&self) -> Vec<String>
  {
    let mut lines = vec![format!("[TAB] Projection type: {}", self.projection_mode)];

    if let Some(entity) = self.active_entity()
    {
      lines.push(format!("[F] Function type: {}", entity.func_type()));
      lines.push(format!("[C] Color mode: {}", entity.color_mode()));
    }

    lines.push(format!("[P] Polygon mode: {}", self.raster_mode));
    lines.push(format!(
      "[T] Texture: {}",
      self.current_texture().map(|t| t.name.as_str()).unwrap_or("none")
    ));
    lines.push(format!(
      "[V] Camera: {}",
      if self.camera.is_first_person() { "first person" } else { "orbit" }
    ));

    lines
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Entity construction from config
// ──────────────────────────────────────────────────────────────
//

fn build_entity<B: RenderBackend + ?Sized>(
  backend: &mut B,
  program: ProgramHandle,
  config: &SurfaceConfig,
) -> Result<SurfaceEntity>
{
  let mut entity =
    SurfaceEntity::new(backend, program, config.cols, config.rows, config.topology, config.func_type)?;

  let [r, g, b] = config.color;
  entity.set_color(r, g, b);
  entity.set_color_mode(config.color_mode);
  entity.set_enable_lighting(config.lighting);
  entity.translate(config.offset);
  entity.scale(Vec3::splat(config.scale));

  Ok(entity)
}

//
// ──────────────────────────────────────────────────────────────
//   Tests
// ──────────────────────────────────────────────────────────────
//
