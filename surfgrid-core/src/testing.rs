//! In-memory `RenderBackend` that records every call, for unit tests.

use crate::backend::{MeshHandle, ProgramHandle, RenderBackend, TextureHandle, UniformValue};
use crate::error::BackendError;
use crate::mesh::{GridMesh, Topology, RESTART_INDEX};
use crate::modes::RasterMode;

#[derive(Debug, Clone, PartialEq)]
pub enum Call
{
  CreateProgram,
  UploadMesh
  {
    vertices: u32,
    indices: u32,
  },
  ClearFrame,
  SetViewport(u32, u32),
  SetRasterMode(RasterMode),
  SetRestartIndex(u32),
  UseProgram(ProgramHandle),
  SetUniform(String, UniformValue),
  BindTexture(TextureHandle, String),
  Draw(MeshHandle, Topology, ProgramHandle),
}

#[derive(Debug, Default)]
pub struct RecordingBackend
{
  pub calls: Vec<Call>,
  pub fail_program: bool,
  restart_index: Option<u32>,
  next_program: u32,
  next_mesh: u32,
}

impl RecordingBackend
{
  pub fn new() -> Self
  {
    Self::default()
  }

  pub fn draws(&self) -> Vec<MeshHandle>
  {
    self
      .calls
      .iter()
      .filter_map(|c| match c
      {
        Call::Draw(mesh, _, _) => Some(*mesh),
        _ => None,
      })
      .collect()
  }

  /// Last value written to `name` before the draw at position `draw_index`.
  pub fn uniform_at_draw(&self, draw_index: usize, name: &str) -> Option<UniformValue>
  {
    let mut seen_draws = 0;
    let mut value = None;

    for call in &self.calls
    {
      match call
      {
        Call::Draw(..) if seen_draws == draw_index => return value,
        Call::Draw(..) =>
        {
          seen_draws += 1;
          value = None;
        }
        Call::SetUniform(n, v) if n == name => value = Some(*v),
        _ =>
        {}
      }
    }

    None
  }

  pub fn clear(&mut self)
  {
    self.calls.clear();
  }
}

impl RenderBackend for RecordingBackend
{
  fn create_program(&mut self, _source: &str) -> Result<ProgramHandle, BackendError>
  {
    if self.fail_program
    {
      return Err(BackendError::ShaderLoad("forced failure".to_string()));
    }

    self.calls.push(Call::CreateProgram);
    self.next_program += 1;
    Ok(ProgramHandle(self.next_program - 1))
  }

  fn upload_mesh(&mut self, mesh: &GridMesh) -> Result<MeshHandle, BackendError>
  {
    self.calls.push(Call::UploadMesh { vertices: mesh.vertex_count(), indices: mesh.index_count() });
    self.next_mesh += 1;
    Ok(MeshHandle(self.next_mesh - 1))
  }

  fn clear_frame(&mut self) -> Result<(), BackendError>
  {
    self.calls.push(Call::ClearFrame);
    Ok(())
  }

  fn set_viewport(&mut self, width: u32, height: u32)
  {
    self.calls.push(Call::SetViewport(width, height));
  }

  fn set_raster_mode(&mut self, mode: RasterMode)
  {
    self.calls.push(Call::SetRasterMode(mode));
  }

  fn set_restart_index(&mut self, value: u32) -> Result<(), BackendError>
  {
    if value != RESTART_INDEX
    {
      return Err(BackendError::UnsupportedRestartIndex(value));
    }
    self.restart_index = Some(value);
    self.calls.push(Call::SetRestartIndex(value));
    Ok(())
  }

  fn use_program(&mut self, program: ProgramHandle) -> Result<(), BackendError>
  {
    self.calls.push(Call::UseProgram(program));
    Ok(())
  }

  fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), BackendError>
  {
    self.calls.push(Call::SetUniform(name.to_string(), value));
    Ok(())
  }

  fn bind_texture(&mut self, texture: TextureHandle, sampler: &str) -> Result<(), BackendError>
  {
    self.calls.push(Call::BindTexture(texture, sampler.to_string()));
    Ok(())
  }

  fn bind_and_draw_mesh(
    &mut self,
    mesh: MeshHandle,
    topology: Topology,
    program: ProgramHandle,
  ) -> Result<(), BackendError>
  {
    if topology == Topology::TriangleStrip && self.restart_index.is_none()
    {
      return Err(BackendError::RestartIndexNotConfigured);
    }

    self.calls.push(Call::Draw(mesh, topology, program));
    Ok(())
  }
}
