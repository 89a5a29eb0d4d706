use glam::{Mat4, Vec3, Vec4};

//
// ──────────────────────────────────────────────────────────────
//   Camera (azimuth/zenith, Z-up right-hand rule)
//
//   Coordinate system:
//     X → right
//     Y → forward (in-plane)
//     Z → up (normal to XY ground)
//
//   View direction:
//     azimuth = horizontal angle (radians, from +X towards +Y)
//     zenith  = angle above the XY plane (radians)
//
//   First-person: the eye is `position`, looking along the view
//   direction. Orbit: the eye sits `radius` behind `position`
//   and looks at it.
//
//   Every operation returns a new Camera; nothing mutates in place.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera
{
  position: Vec3,
  azimuth: f32,
  zenith: f32,
  radius: f32,
  first_person: bool,
}

//
// ──────────────────────────────────────────────────────────────
//   Constants
// ──────────────────────────────────────────────────────────────
//

pub const ZENITH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01; // just short of straight up/down
pub const RADIUS_MIN: f32 = 0.1;

impl Default for Camera
{
  fn default() -> Self
  {
    Self { position: Vec3::ZERO, azimuth: 0.0, zenith: 0.0, radius: 1.0, first_person: true }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Builders
// ──────────────────────────────────────────────────────────────
//

impl Camera
{
  #[must_use]
  pub fn with_position(self, position: Vec3) -> Self
  {
    Self { position, ..self }
  }

  #[must_use]
  pub fn with_azimuth(self, azimuth: f32) -> Self
  {
    Self { azimuth, ..self }
  }

  #[must_use]
  pub fn with_zenith(self, zenith: f32) -> Self
  {
    Self { zenith: clamp_zenith(zenith), ..self }
  }

  #[must_use]
  pub fn with_radius(self, radius: f32) -> Self
  {
    Self { radius: radius.max(RADIUS_MIN), ..self }
  }

  #[must_use]
  pub fn with_first_person(self, first_person: bool) -> Self
  {
    Self { first_person, ..self }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Navigation
// ──────────────────────────────────────────────────────────────
//

impl Camera
{
  /// Move along the horizontal part of the view direction.
  #[must_use]
  pub fn forward(self, distance: f32) -> Self
  {
    self.translated(horizontal_forward(self.azimuth) * distance)
  }

  #[must_use]
  pub fn backward(self, distance: f32) -> Self
  {
    self.forward(-distance)
  }

  /// Strafe left, perpendicular to forward, in the XY plane.
  #[must_use]
  pub fn left(self, distance: f32) -> Self
  {
    self.translated(horizontal_left(self.azimuth) * distance)
  }

  #[must_use]
  pub fn right(self, distance: f32) -> Self
  {
    self.left(-distance)
  }

  #[must_use]
  pub fn up(self, distance: f32) -> Self
  {
    self.translated(Vec3::Z * distance)
  }

  #[must_use]
  pub fn down(self, distance: f32) -> Self
  {
    self.up(-distance)
  }

  #[must_use]
  pub fn add_azimuth(self, delta: f32) -> Self
  {
    Self { azimuth: self.azimuth + delta, ..self }
  }

  #[must_use]
  pub fn add_zenith(self, delta: f32) -> Self
  {
    Self { zenith: clamp_zenith(self.zenith + delta), ..self }
  }

  /// Multiplicative zoom: `factor` > 1 moves the orbit eye away.
  #[must_use]
  pub fn mul_radius(self, factor: f32) -> Self
  {
    self.with_radius(self.radius * factor)
  }

  fn translated(self, offset: Vec3) -> Self
  {
    Self { position: self.position + offset, ..self }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Queries
// ──────────────────────────────────────────────────────────────
//

impl Camera
{
  pub fn position(&self) -> Vec3
  {
    self.position
  }

  pub fn azimuth(&self) -> f32
  {
    self.azimuth
  }

  pub fn zenith(&self) -> f32
  {
    self.zenith
  }

  pub fn radius(&self) -> f32
  {
    self.radius
  }

  pub fn is_first_person(&self) -> bool
  {
    self.first_person
  }

  /// Unit view direction from azimuth and zenith.
  pub fn view_direction(&self) -> Vec3
  {
    view_direction(self.azimuth, self.zenith)
  }

  /// World-space eye position.
  pub fn eye(&self) -> Vec3
  {
    if self.first_person
    {
      self.position
    }
    else
    {
      self.position - self.view_direction() * self.radius
    }
  }

  /// World → camera space. Built fresh on every call.
  pub fn view_matrix(&self) -> Mat4
  {
    build_view_matrix(self.eye(), self.view_direction())
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Spherical → cartesian helpers
// ──────────────────────────────────────────────────────────────
//

fn clamp_zenith(zenith: f32) -> f32
{
  zenith.clamp(-ZENITH_LIMIT, ZENITH_LIMIT)
}

fn view_direction(azimuth: f32, zenith: f32) -> Vec3
{
  let cos_zen = zenith.cos();
  Vec3::new(azimuth.cos() * cos_zen, azimuth.sin() * cos_zen, zenith.sin())
}

fn horizontal_forward(azimuth: f32) -> Vec3
{
  Vec3::new(azimuth.cos(), azimuth.sin(), 0.0)
}

fn horizontal_left(azimuth: f32) -> Vec3
{
  // forward rotated +90° about Z
  Vec3::new(-azimuth.sin(), azimuth.cos(), 0.0)
}

//
// ──────────────────────────────────────────────────────────────
//   Matrix builder
// ──────────────────────────────────────────────────────────────
//

/// Rotation into the camera basis composed with the inverse eye translation.
fn build_view_matrix(eye: Vec3, dir: Vec3) -> Mat4
{
  let back = -dir;
  let right = dir.cross(Vec3::Z).normalize();
  let up = back.cross(right);

  let rotation =
    Mat4::from_cols(right.extend(0.0), up.extend(0.0), back.extend(0.0), Vec4::W).transpose();

  rotation * Mat4::from_translation(-eye)
}

//
// ──────────────────────────────────────────────────────────────
//   Tests
// ──────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests
{
  use std::f32::consts::{FRAC_PI_2, PI};

  use super::*;

  const EPS: f32 = 1e-5;

  fn start() -> Camera
  {
    Camera::default()
      .with_position(Vec3::new(0.0, -3.0, 1.0))
      .with_azimuth(FRAC_PI_2)
      .with_zenith((-15.0_f32).to_radians())
  }

  #[test]
  fn forward_returns_new_camera_and_leaves_original_untouched()
  {
    let before = start();
    let snapshot = before;

    let after = before.forward(0.5);

    assert_eq!(before, snapshot);
    assert_ne!(after, before);
  }

  #[test]
  fn forward_moves_exactly_d_in_the_horizontal_plane()
  {
    let cam = start().with_azimuth(0.3).with_zenith(0.8);
    let moved = cam.forward(2.0);

    let delta = moved.position() - cam.position();
    let expected = Vec3::new(0.3_f32.cos(), 0.3_f32.sin(), 0.0) * 2.0;

    assert!(delta.abs_diff_eq(expected, EPS));
    assert!((delta.length() - 2.0).abs() < EPS);
    assert_eq!(delta.z, 0.0);
  }

  #[test]
  fn backward_undoes_forward()
  {
    let cam = start();
    let round_trip = cam.forward(1.25).backward(1.25);
    assert!(round_trip.position().abs_diff_eq(cam.position(), EPS));
  }

  #[test]
  fn strafe_is_perpendicular_to_forward()
  {
    let cam = start().with_azimuth(1.1);

    let fwd = cam.forward(1.0).position() - cam.position();
    let left = cam.left(1.0).position() - cam.position();
    let right = cam.right(1.0).position() - cam.position();

    assert!(fwd.dot(left).abs() < EPS);
    assert!(left.abs_diff_eq(-right, EPS));
    assert_eq!(left.z, 0.0);
    // left is counter-clockwise from forward when seen from above
    assert!(fwd.cross(left).z > 0.0);
  }

  #[test]
  fn up_and_down_move_along_world_z_only()
  {
    let cam = start().with_zenith(0.7);
    let up = cam.up(0.4);

    assert!((up.position() - cam.position()).abs_diff_eq(Vec3::new(0.0, 0.0, 0.4), EPS));
    assert!(up.down(0.4).position().abs_diff_eq(cam.position(), EPS));
  }

  #[test]
  fn add_azimuth_zero_is_a_no_op()
  {
    let cam = start();
    assert_eq!(cam.add_azimuth(0.0), cam);
  }

  #[test]
  fn zenith_never_reaches_the_pole()
  {
    let up = start().add_zenith(10.0);
    let down = start().add_zenith(-10.0);

    assert_eq!(up.zenith(), ZENITH_LIMIT);
    assert_eq!(down.zenith(), -ZENITH_LIMIT);
    assert!(up.view_matrix().is_finite());
    assert!(down.view_matrix().is_finite());
  }

  #[test]
  fn view_matrix_moves_eye_to_origin_and_looks_down_negative_z()
  {
    let cam = start();
    let view = cam.view_matrix();

    let eye = view.transform_point3(cam.eye());
    assert!(eye.abs_diff_eq(Vec3::ZERO, EPS));

    let ahead = view.transform_point3(cam.eye() + cam.view_direction() * 3.0);
    assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), EPS));
  }

  #[test]
  fn view_matrix_matches_look_to()
  {
    let cam = start().with_azimuth(2.2).with_zenith(-0.4);
    let expected = Mat4::look_to_rh(cam.eye(), cam.view_direction(), Vec3::Z);
    assert!(cam.view_matrix().abs_diff_eq(expected, EPS));
  }

  #[test]
  fn view_matrix_follows_every_update()
  {
    let cam = start();
    let turned = cam.add_azimuth(PI / 3.0);
    assert_ne!(cam.view_matrix(), turned.view_matrix());
  }

  #[test]
  fn orbit_eye_sits_behind_the_target()
  {
    let cam = start().with_first_person(false).with_radius(4.0);

    assert!(((cam.eye() - cam.position()).length() - 4.0).abs() < EPS);

    let target_in_view = cam.view_matrix().transform_point3(cam.position());
    assert!(target_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -4.0), 1e-4));
  }

  #[test]
  fn radius_is_clamped()
  {
    let cam = start().with_radius(1.0).mul_radius(0.0);
    assert_eq!(cam.radius(), RADIUS_MIN);
    assert_eq!(cam.mul_radius(2.0).radius(), RADIUS_MIN * 2.0);
  }
}
