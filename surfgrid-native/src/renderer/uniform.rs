use glam::Mat4;
use surfgrid_core::backend::uniforms;
use surfgrid_core::{BackendError, UniformValue};

//
// ──────────────────────────────────────────────────────────────
//   Surface Uniform (GPU side)
//
//   WGSL layout (surface.wgsl):
//     model          : mat4x4<f32>   offset   0
//     view           : mat4x4<f32>   offset  64
//     proj           : mat4x4<f32>   offset 128
//     light_vp       : mat4x4<f32>   offset 192
//     color          : vec3<f32>     offset 256
//     func_type      : i32           offset 268
//     light_position : vec3<f32>     offset 272
//     color_mode     : i32           offset 284
//     time           : f32           offset 288
//     enable_lighting: i32           offset 292
//     enable_shadows : i32           offset 296
//     _pad           : i32           offset 300
//   Total: 304 bytes
// ──────────────────────────────────────────────────────────────
//

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniform
{
  pub model: [[f32; 4]; 4],
  pub view: [[f32; 4]; 4],
  pub proj: [[f32; 4]; 4],
  pub light_vp: [[f32; 4]; 4],
  pub color: [f32; 3],
  pub func_type: i32,
  pub light_position: [f32; 3],
  pub color_mode: i32,
  pub time: f32,
  pub enable_lighting: i32,
  pub enable_shadows: i32,
  pub _pad: i32,
}

// Catch CPU/GPU layout mismatches at compile time
const _: () = assert!(std::mem::size_of::<SurfaceUniform>() == 304);

impl Default for SurfaceUniform
{
  fn default() -> Self
  {
    let identity = Mat4::IDENTITY.to_cols_array_2d();

    Self {
      model: identity,
      view: identity,
      proj: identity,
      light_vp: identity,
      color: [1.0, 1.0, 1.0],
      func_type: 0,
      light_position: [0.0; 3],
      color_mode: 0,
      time: 0.0,
      enable_lighting: 0,
      enable_shadows: 0,
      _pad: 0,
    }
  }
}

impl SurfaceUniform
{
  /// Write one named shader uniform into the block.
  pub fn apply(&mut self, name: &str, value: UniformValue) -> Result<(), BackendError>
  {
    match (name, value)
    {
      (uniforms::MODEL_MAT, UniformValue::Mat4(m)) => self.model = m.to_cols_array_2d(),
      (uniforms::VIEW_MAT, UniformValue::Mat4(m)) => self.view = m.to_cols_array_2d(),
      (uniforms::PROJ_MAT, UniformValue::Mat4(m)) => self.proj = m.to_cols_array_2d(),
      (uniforms::LIGHT_VP_MAT, UniformValue::Mat4(m)) => self.light_vp = m.to_cols_array_2d(),
      (uniforms::COLOR, UniformValue::Float3(v)) => self.color = v.to_array(),
      (uniforms::LIGHT_POSITION, UniformValue::Float3(v)) => self.light_position = v.to_array(),
      (uniforms::FUNC_TYPE, UniformValue::Int(i)) => self.func_type = i,
      (uniforms::COLOR_MODE, UniformValue::Int(i)) => self.color_mode = i,
      (uniforms::ENABLE_LIGHTING, UniformValue::Int(i)) => self.enable_lighting = i,
      (uniforms::ENABLE_SHADOWS, UniformValue::Int(i)) => self.enable_shadows = i,
      (uniforms::TIME, UniformValue::Float(t)) => self.time = t,
      _ => return Err(mismatch(name)),
    }

    Ok(())
  }
}

fn mismatch(name: &str) -> BackendError
{
  let expected = match name
  {
    uniforms::MODEL_MAT | uniforms::VIEW_MAT | uniforms::PROJ_MAT | uniforms::LIGHT_VP_MAT => "mat4",
    uniforms::COLOR | uniforms::LIGHT_POSITION => "float3",
    uniforms::FUNC_TYPE | uniforms::COLOR_MODE | uniforms::ENABLE_LIGHTING | uniforms::ENABLE_SHADOWS => "int",
    uniforms::TIME => "float",
    _ => return BackendError::UnknownUniform(name.to_string()),
  };

  BackendError::UniformType { name: name.to_string(), expected }
}

#[cfg(test)]
mod tests
{
  use glam::Vec3;

  use super::*;

  #[test]
  fn named_uniforms_land_in_their_fields()
  {
    let mut block = SurfaceUniform::default();

    block.apply(uniforms::COLOR, Vec3::new(1.0, 0.5, 0.0).into()).unwrap();
    block.apply(uniforms::COLOR_MODE, 3_i32.into()).unwrap();
    block.apply(uniforms::TIME, 2.5_f32.into()).unwrap();

    assert_eq!(block.color, [1.0, 0.5, 0.0]);
    assert_eq!(block.color_mode, 3);
    assert_eq!(block.time, 2.5);
  }

  #[test]
  fn wrong_type_and_unknown_name_are_errors()
  {
    let mut block = SurfaceUniform::default();

    assert_eq!(
      block.apply(uniforms::TIME, 1_i32.into()),
      Err(BackendError::UniformType { name: uniforms::TIME.to_string(), expected: "float" })
    );
    assert_eq!(
      block.apply("uNope", 1_i32.into()),
      Err(BackendError::UnknownUniform("uNope".to_string()))
    );
  }
}
