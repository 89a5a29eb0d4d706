use std::time::{Duration, Instant};

use glam::{Mat4, Vec3};

use crate::backend::{uniforms, MeshHandle, ProgramHandle, RenderBackend, TextureHandle};
use crate::error::{BackendError, Result};
use crate::mesh::{GridMesh, Topology};
use crate::modes::{Cycle, ColorMode, FuncType};
use crate::transform;

//
// ──────────────────────────────────────────────────────────────
//   Shadow wiring (optional)
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings
{
  pub shadow_map: TextureHandle,
  pub light_view_proj: Mat4,
}

//
// ──────────────────────────────────────────────────────────────
//   SurfaceEntity
// ──────────────────────────────────────────────────────────────
//

/// A displaced grid plus its transform and appearance.
///
/// The mesh is fixed at construction. View and projection are pushed in by
/// the owning scene before each draw.
pub struct SurfaceEntity
{
  mesh: GridMesh,
  mesh_handle: MeshHandle,
  program: ProgramHandle,

  model: Mat4,
  view: Mat4,
  projection: Mat4,

  color: Vec3,
  func_type: FuncType,
  color_mode: ColorMode,
  texture: Option<TextureHandle>,

  enable_lighting: bool,
  light_position: Vec3,

  shadow: Option<ShadowSettings>,
  enable_shadows: bool,

  created: Instant,
}

impl SurfaceEntity
{
  /// Generate a `cols x rows` grid and upload it through `backend`.
  pub fn new<B: RenderBackend + ?Sized>(
    backend: &mut B,
    program: ProgramHandle,
    cols: u32,
    rows: u32,
    topology: Topology,
    func_type: FuncType,
  ) -> Result<Self>
  {
    let mesh = GridMesh::generate(cols, rows, topology)?;
    let mesh_handle = backend.upload_mesh(&mesh)?;

    Ok(Self {
      mesh,
      mesh_handle,
      program,
      model: Mat4::IDENTITY,
      view: Mat4::IDENTITY,
      projection: Mat4::IDENTITY,
      color: Vec3::new(0.5, 0.5, 0.5),
      func_type,
      color_mode: ColorMode::Color,
      texture: None,
      enable_lighting: true,
      light_position: Vec3::ZERO,
      shadow: None,
      enable_shadows: false,
      created: Instant::now(),
    })
  }

  //
  // ── Model transform (right-multiplied, order matters) ──────
  //

  pub fn translate(&mut self, offset: Vec3)
  {
    self.model *= transform::translation(offset);
  }

  pub fn rotate(&mut self, angle: f32, axis: Vec3)
  {
    self.model *= transform::rotation(angle, axis);
  }

  pub fn scale(&mut self, factors: Vec3)
  {
    self.model *= transform::scaling(factors);
  }

  pub fn reset_transform(&mut self)
  {
    self.model = Mat4::IDENTITY;
  }

  pub fn model_matrix(&self) -> Mat4
  {
    self.model
  }

  //
  // ── Per-frame matrices ─────────────────────────────────────
  //

  pub fn set_view_matrix(&mut self, view: Mat4)
  {
    self.view = view;
  }

  pub fn set_projection_matrix(&mut self, projection: Mat4)
  {
    self.projection = projection;
  }

  pub fn view_matrix(&self) -> Mat4
  {
    self.view
  }

  pub fn projection_matrix(&self) -> Mat4
  {
    self.projection
  }

  //
  // ── Appearance ─────────────────────────────────────────────
  //

  pub fn set_color(&mut self, r: f32, g: f32, b: f32)
  {
    self.color = Vec3::new(r, g, b);
  }

  pub fn color(&self) -> Vec3
  {
    self.color
  }

  pub fn set_func_type(&mut self, func_type: FuncType)
  {
    self.func_type = func_type;
  }

  pub fn func_type(&self) -> FuncType
  {
    self.func_type
  }

  pub fn set_color_mode(&mut self, color_mode: ColorMode)
  {
    self.color_mode = color_mode;
  }

  pub fn color_mode(&self) -> ColorMode
  {
    self.color_mode
  }

  /// Bind `texture` for future draws. The caller keeps it alive.
  pub fn set_texture(&mut self, texture: Option<TextureHandle>)
  {
    self.texture = texture;
  }

  pub fn texture(&self) -> Option<TextureHandle>
  {
    self.texture
  }

  pub fn set_enable_lighting(&mut self, enable: bool)
  {
    self.enable_lighting = enable;
  }

  pub fn lighting_enabled(&self) -> bool
  {
    self.enable_lighting
  }

  pub fn set_light_position(&mut self, position: Vec3)
  {
    self.light_position = position;
  }

  pub fn light_position(&self) -> Vec3
  {
    self.light_position
  }

  pub fn set_shadow_map(&mut self, shadow: Option<ShadowSettings>)
  {
    self.shadow = shadow;
  }

  pub fn set_enable_shadows(&mut self, enable: bool)
  {
    self.enable_shadows = enable;
  }

  //
  // ── Mesh ───────────────────────────────────────────────────
  //

  pub fn mesh(&self) -> &GridMesh
  {
    &self.mesh
  }

  pub fn topology(&self) -> Topology
  {
    self.mesh.topology()
  }

  /// Time since construction; drives animated function types.
  pub fn elapsed(&self) -> Duration
  {
    self.created.elapsed()
  }

  //
  // ── Draw ───────────────────────────────────────────────────
  //

  pub fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B) -> Result<(), BackendError>
  {
    backend.use_program(self.program)?;

    backend.set_uniform(uniforms::MODEL_MAT, self.model.into())?;
    backend.set_uniform(uniforms::VIEW_MAT, self.view.into())?;
    backend.set_uniform(uniforms::PROJ_MAT, self.projection.into())?;

    backend.set_uniform(uniforms::COLOR, self.color.into())?;
    backend.set_uniform(uniforms::FUNC_TYPE, (self.func_type.ordinal() as i32).into())?;
    backend.set_uniform(uniforms::COLOR_MODE, (self.color_mode.ordinal() as i32).into())?;
    backend.set_uniform(uniforms::TIME, self.elapsed().as_secs_f32().into())?;

    backend.set_uniform(uniforms::ENABLE_LIGHTING, self.enable_lighting.into())?;
    backend.set_uniform(uniforms::LIGHT_POSITION, self.light_position.into())?;

    // Missing texture is a soft failure: the shader samples its fallback.
    if let Some(texture) = self.texture
    {
      backend.bind_texture(texture, uniforms::TEXTURE_SAMPLER)?;
    }

    self.bind_shadow(backend)?;

    backend.bind_and_draw_mesh(self.mesh_handle, self.mesh.topology(), self.program)
  }

  fn bind_shadow<B: RenderBackend + ?Sized>(&self, backend: &mut B) -> Result<(), BackendError>
  {
    match self.shadow
    {
      Some(shadow) if self.enable_shadows =>
      {
        backend.set_uniform(uniforms::ENABLE_SHADOWS, true.into())?;
        backend.set_uniform(uniforms::LIGHT_VP_MAT, shadow.light_view_proj.into())?;
        backend.bind_texture(shadow.shadow_map, uniforms::SHADOW_MAP_SAMPLER)
      }
      _ => backend.set_uniform(uniforms::ENABLE_SHADOWS, false.into()),
    }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Tests
// ──────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests
{
  use super::*;
  use crate::backend::UniformValue;
  use crate::error::Error;
  use crate::error::MeshError;
  use crate::mesh::RESTART_INDEX;
  use crate::testing::{Call, RecordingBackend};

  fn entity(backend: &mut RecordingBackend, topology: Topology) -> SurfaceEntity
  {
    let program = backend.create_program("").unwrap();
    SurfaceEntity::new(backend, program, 4, 3, topology, FuncType::Grid).unwrap()
  }

  #[test]
  fn construction_uploads_the_generated_mesh()
  {
    let mut backend = RecordingBackend::new();
    let e = entity(&mut backend, Topology::TriangleList);

    assert_eq!(e.mesh().vertex_count(), 20);
    assert!(backend.calls.contains(&Call::UploadMesh { vertices: 20, indices: 72 }));
  }

  #[test]
  fn construction_fails_fast_on_bad_grid()
  {
    let mut backend = RecordingBackend::new();
    let program = backend.create_program("").unwrap();

    let result = SurfaceEntity::new(&mut backend, program, 300, 300, Topology::TriangleStrip, FuncType::Grid);

    assert!(matches!(result, Err(Error::Mesh(MeshError::RestartCollision { .. }))));
    assert!(!backend.calls.iter().any(|c| matches!(c, Call::UploadMesh { .. })));
  }

  #[test]
  fn transforms_compose_in_call_order()
  {
    let mut backend = RecordingBackend::new();
    let v = Vec3::new(1.0, 2.0, 3.0);
    let s = Vec3::splat(2.0);

    let mut a = entity(&mut backend, Topology::TriangleList);
    a.translate(v);
    a.scale(s);

    let mut b = entity(&mut backend, Topology::TriangleList);
    b.scale(s);
    b.translate(v);

    assert_ne!(a.model_matrix(), b.model_matrix());
    assert_eq!(a.model_matrix(), Mat4::from_translation(v) * Mat4::from_scale(s));
    assert_eq!(b.model_matrix(), Mat4::from_scale(s) * Mat4::from_translation(v));
  }

  #[test]
  fn rotate_right_multiplies()
  {
    let mut backend = RecordingBackend::new();
    let mut e = entity(&mut backend, Topology::TriangleList);

    e.translate(Vec3::X);
    e.rotate(std::f32::consts::FRAC_PI_2, Vec3::Z);

    let p = e.model_matrix().transform_point3(Vec3::X);
    assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));

    e.reset_transform();
    assert_eq!(e.model_matrix(), Mat4::IDENTITY);
  }

  #[test]
  fn draw_sends_all_uniforms_then_one_draw()
  {
    let mut backend = RecordingBackend::new();
    let mut e = entity(&mut backend, Topology::TriangleList);

    e.set_color(1.0, 1.0, 0.0);
    e.set_func_type(FuncType::Sphere);
    e.set_color_mode(ColorMode::Depth);
    e.set_view_matrix(Mat4::from_translation(Vec3::Z));
    e.set_light_position(Vec3::new(1.5, 0.0, 1.5));
    backend.clear();

    e.draw(&mut backend).unwrap();

    assert_eq!(backend.draws().len(), 1);
    assert_eq!(backend.uniform_at_draw(0, uniforms::COLOR), Some(UniformValue::Float3(Vec3::new(1.0, 1.0, 0.0))));
    assert_eq!(backend.uniform_at_draw(0, uniforms::FUNC_TYPE), Some(UniformValue::Int(2)));
    assert_eq!(backend.uniform_at_draw(0, uniforms::COLOR_MODE), Some(UniformValue::Int(4)));
    assert_eq!(
      backend.uniform_at_draw(0, uniforms::VIEW_MAT),
      Some(UniformValue::Mat4(Mat4::from_translation(Vec3::Z)))
    );
    assert_eq!(
      backend.uniform_at_draw(0, uniforms::LIGHT_POSITION),
      Some(UniformValue::Float3(Vec3::new(1.5, 0.0, 1.5)))
    );
    assert_eq!(backend.uniform_at_draw(0, uniforms::ENABLE_LIGHTING), Some(UniformValue::Int(1)));
    assert_eq!(backend.uniform_at_draw(0, uniforms::ENABLE_SHADOWS), Some(UniformValue::Int(0)));
    assert!(matches!(backend.uniform_at_draw(0, uniforms::TIME), Some(UniformValue::Float(t)) if t >= 0.0));
    assert!(matches!(backend.calls.first(), Some(Call::UseProgram(_))));
  }

  #[test]
  fn texture_mode_without_texture_still_draws()
  {
    let mut backend = RecordingBackend::new();
    let mut e = entity(&mut backend, Topology::TriangleList);
    e.set_color_mode(ColorMode::Texture);

    e.draw(&mut backend).unwrap();

    assert_eq!(backend.draws().len(), 1);
    assert!(!backend.calls.iter().any(|c| matches!(c, Call::BindTexture(..))));
  }

  #[test]
  fn bound_texture_is_bound_on_draw()
  {
    let mut backend = RecordingBackend::new();
    let mut e = entity(&mut backend, Topology::TriangleList);
    e.set_texture(Some(TextureHandle(7)));

    e.draw(&mut backend).unwrap();

    assert!(backend.calls.contains(&Call::BindTexture(TextureHandle(7), uniforms::TEXTURE_SAMPLER.to_string())));
  }

  #[test]
  fn shadow_map_only_binds_when_enabled()
  {
    let mut backend = RecordingBackend::new();
    let mut e = entity(&mut backend, Topology::TriangleList);
    let light_vp = Mat4::from_scale(Vec3::splat(0.5));

    e.set_shadow_map(Some(ShadowSettings { shadow_map: TextureHandle(3), light_view_proj: light_vp }));
    e.draw(&mut backend).unwrap();
    assert!(!backend.calls.iter().any(|c| matches!(c, Call::BindTexture(..))));

    backend.clear();
    e.set_enable_shadows(true);
    e.draw(&mut backend).unwrap();

    assert_eq!(backend.uniform_at_draw(0, uniforms::ENABLE_SHADOWS), Some(UniformValue::Int(1)));
    assert_eq!(backend.uniform_at_draw(0, uniforms::LIGHT_VP_MAT), Some(UniformValue::Mat4(light_vp)));
    assert!(backend
      .calls
      .contains(&Call::BindTexture(TextureHandle(3), uniforms::SHADOW_MAP_SAMPLER.to_string())));
  }

  #[test]
  fn strip_draw_requires_restart_index()
  {
    let mut backend = RecordingBackend::new();
    let e = entity(&mut backend, Topology::TriangleStrip);

    assert_eq!(e.draw(&mut backend), Err(BackendError::RestartIndexNotConfigured));

    backend.set_restart_index(RESTART_INDEX).unwrap();
    assert!(e.draw(&mut backend).is_ok());
  }
}
