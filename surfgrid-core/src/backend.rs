//! Boundary between the scene model and a concrete graphics API.
//!
//! The backend owns every GPU object. The core only ever holds `Copy`
//! handles to them, so an entity referencing a texture never controls its
//! lifetime.

use glam::{Mat4, Vec3};

use crate::error::BackendError;
use crate::mesh::{GridMesh, Topology};
use crate::modes::RasterMode;

//
// ──────────────────────────────────────────────────────────────
//   Shader interface names
// ──────────────────────────────────────────────────────────────
//

pub mod uniforms
{
  pub const MODEL_MAT: &str = "uModelMat";
  pub const VIEW_MAT: &str = "uViewMat";
  pub const PROJ_MAT: &str = "uProjMat";
  pub const COLOR: &str = "uColor";
  pub const FUNC_TYPE: &str = "uFuncType";
  pub const COLOR_MODE: &str = "uColorMode";
  pub const TIME: &str = "uTime";
  pub const ENABLE_LIGHTING: &str = "uEnableLighting";
  pub const LIGHT_POSITION: &str = "uLightPosition";
  pub const LIGHT_VP_MAT: &str = "uLightVPMat";
  pub const ENABLE_SHADOWS: &str = "uEnableShadows";

  pub const TEXTURE_SAMPLER: &str = "uTexture";
  pub const SHADOW_MAP_SAMPLER: &str = "uShadowMap";
}

//
// ──────────────────────────────────────────────────────────────
//   Handles
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// A texture handle paired with the name it was loaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTexture
{
  pub name: String,
  pub handle: TextureHandle,
}

//
// ──────────────────────────────────────────────────────────────
//   Uniform values
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue
{
  Mat4(Mat4),
  Float(f32),
  Float3(Vec3),
  Int(i32),
}

impl From<Mat4> for UniformValue
{
  fn from(value: Mat4) -> Self
  {
    UniformValue::Mat4(value)
  }
}

impl From<f32> for UniformValue
{
  fn from(value: f32) -> Self
  {
    UniformValue::Float(value)
  }
}

impl From<Vec3> for UniformValue
{
  fn from(value: Vec3) -> Self
  {
    UniformValue::Float3(value)
  }
}

impl From<i32> for UniformValue
{
  fn from(value: i32) -> Self
  {
    UniformValue::Int(value)
  }
}

impl From<bool> for UniformValue
{
  fn from(value: bool) -> Self
  {
    UniformValue::Int(value as i32)
  }
}

//
// ──────────────────────────────────────────────────────────────
//   RenderBackend
// ──────────────────────────────────────────────────────────────
//

/// Operations the scene issues against the graphics API.
///
/// All calls happen on the thread that owns the render loop. Uniform values
/// persist until overwritten; texture bindings apply to the next
/// `bind_and_draw_mesh` only.
pub trait RenderBackend
{
  /// Compile and link a shader program. Called once during bootstrap.
  fn create_program(&mut self, source: &str) -> Result<ProgramHandle, BackendError>;

  /// Copy a generated mesh into backend-owned vertex and index buffers.
  fn upload_mesh(&mut self, mesh: &GridMesh) -> Result<MeshHandle, BackendError>;

  /// Start a frame by clearing colour and depth.
  fn clear_frame(&mut self) -> Result<(), BackendError>;

  fn set_viewport(&mut self, width: u32, height: u32);

  fn set_raster_mode(&mut self, mode: RasterMode);

  /// Index value that restarts a strip. Must be set before any strip mesh is drawn.
  fn set_restart_index(&mut self, value: u32) -> Result<(), BackendError>;

  fn use_program(&mut self, program: ProgramHandle) -> Result<(), BackendError>;

  fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), BackendError>;

  fn bind_texture(&mut self, texture: TextureHandle, sampler: &str) -> Result<(), BackendError>;

  fn bind_and_draw_mesh(
    &mut self,
    mesh: MeshHandle,
    topology: Topology,
    program: ProgramHandle,
  ) -> Result<(), BackendError>;
}
