use std::fmt;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

//
// ──────────────────────────────────────────────────────────────
//   Projection constants
// ──────────────────────────────────────────────────────────────
//

pub const FOV_Y_DEGREES: f32 = 70.0;
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 100.0;

/// Half of the orthographic view volume height, in world units.
pub const ORTHO_HALF_HEIGHT: f32 = 5.0;

//
// ──────────────────────────────────────────────────────────────
//   Projection mode
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionMode
{
  Perspective,
  Orthographic,
}

impl ProjectionMode
{
  pub fn toggled(self) -> Self
  {
    match self
    {
      ProjectionMode::Perspective => ProjectionMode::Orthographic,
      ProjectionMode::Orthographic => ProjectionMode::Perspective,
    }
  }
}

impl fmt::Display for ProjectionMode
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
  {
    match self
    {
      ProjectionMode::Perspective => f.write_str("perspective"),
      ProjectionMode::Orthographic => f.write_str("orthogonal"),
    }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Projection builders (right-handed, depth range [0, 1])
// ──────────────────────────────────────────────────────────────
//

/// Width over height, with a zero height treated as one pixel.
pub fn aspect_ratio(width: u32, height: u32) -> f32
{
  width.max(1) as f32 / height.max(1) as f32
}

pub fn projection_matrix(mode: ProjectionMode, width: u32, height: u32) -> Mat4
{
  let aspect = aspect_ratio(width, height);

  match mode
  {
    ProjectionMode::Perspective => perspective(aspect),
    ProjectionMode::Orthographic => orthographic(aspect),
  }
}

pub fn perspective(aspect: f32) -> Mat4
{
  Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR)
}

pub fn orthographic(aspect: f32) -> Mat4
{
  let half_w = ORTHO_HALF_HEIGHT * aspect;
  Mat4::orthographic_rh(-half_w, half_w, -ORTHO_HALF_HEIGHT, ORTHO_HALF_HEIGHT, Z_NEAR, Z_FAR)
}

//
// ──────────────────────────────────────────────────────────────
//   Elementary model transforms
// ──────────────────────────────────────────────────────────────
//

pub fn translation(offset: Vec3) -> Mat4
{
  Mat4::from_translation(offset)
}

/// Rotation of `angle` radians about `axis`. A zero axis yields identity.
pub fn rotation(angle: f32, axis: Vec3) -> Mat4
{
  match axis.try_normalize()
  {
    Some(axis) => Mat4::from_axis_angle(axis, angle),
    None => Mat4::IDENTITY,
  }
}

pub fn scaling(factors: Vec3) -> Mat4
{
  Mat4::from_scale(factors)
}

//
// ──────────────────────────────────────────────────────────────
//   Tests
// ──────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests
{
  use glam::Vec4;

  use super::*;

  #[test]
  fn toggle_twice_reproduces_perspective()
  {
    let mode = ProjectionMode::Perspective;
    let original = projection_matrix(mode, 1280, 720);

    let ortho = projection_matrix(mode.toggled(), 1280, 720);
    let back = projection_matrix(mode.toggled().toggled(), 1280, 720);

    assert_ne!(original, ortho);
    assert_eq!(original, back);
  }

  #[test]
  fn orthographic_maps_half_height_to_clip_edge()
  {
    let proj = projection_matrix(ProjectionMode::Orthographic, 200, 100);

    let top = proj * Vec4::new(0.0, ORTHO_HALF_HEIGHT, -1.0, 1.0);
    let right = proj * Vec4::new(2.0 * ORTHO_HALF_HEIGHT, 0.0, -1.0, 1.0);

    assert!((top.y / top.w - 1.0).abs() < 1e-5);
    assert!((right.x / right.w - 1.0).abs() < 1e-5);
  }

  #[test]
  fn perspective_depth_spans_near_to_far()
  {
    let proj = perspective(1.0);

    let near = proj * Vec4::new(0.0, 0.0, -Z_NEAR, 1.0);
    let far = proj * Vec4::new(0.0, 0.0, -Z_FAR, 1.0);

    assert!((near.z / near.w).abs() < 1e-4);
    assert!((far.z / far.w - 1.0).abs() < 1e-4);
  }

  #[test]
  fn zero_height_does_not_divide_by_zero()
  {
    assert_eq!(aspect_ratio(640, 0), 640.0);
    assert!(projection_matrix(ProjectionMode::Perspective, 640, 0).is_finite());
  }

  #[test]
  fn rotation_about_zero_axis_is_identity()
  {
    assert_eq!(rotation(1.0, Vec3::ZERO), Mat4::IDENTITY);
  }
}
