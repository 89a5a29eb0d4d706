use std::fmt;

use serde::{Deserialize, Serialize};

//
// ──────────────────────────────────────────────────────────────
//   Cycle: fixed-order enumerations stepped with wrap-around
// ──────────────────────────────────────────────────────────────
//

pub trait Cycle: Copy + PartialEq + 'static
{
  /// Every variant, in cycling order.
  const ALL: &'static [Self];

  fn ordinal(self) -> usize
  {
    Self::ALL.iter().position(|&v| v == self).unwrap_or(0)
  }

  fn next(self) -> Self
  {
    Self::ALL[(self.ordinal() + 1) % Self::ALL.len()]
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Function type (shader-side displacement)
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FuncType
{
  Grid,
  Wave,
  Sphere,
  Cylinder,
  Hourglass,
  SphericalHourglass,
  Tent,
}

impl Cycle for FuncType
{
  const ALL: &'static [Self] = &[
    FuncType::Grid,
    FuncType::Wave,
    FuncType::Sphere,
    FuncType::Cylinder,
    FuncType::Hourglass,
    FuncType::SphericalHourglass,
    FuncType::Tent,
  ];
}

impl fmt::Display for FuncType
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
  {
    let label = match self
    {
      FuncType::Grid => "GRID",
      FuncType::Wave => "WAVE",
      FuncType::Sphere => "SPHERE",
      FuncType::Cylinder => "CYLINDER",
      FuncType::Hourglass => "HOURGLASS",
      FuncType::SphericalHourglass => "SPHERICAL_HOURGLASS",
      FuncType::Tent => "TENT",
    };
    f.write_str(label)
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Colour mode (shader-side colour source)
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode
{
  Color,
  Texture,
  Normal,
  Uv,
  Depth,
  Position,
  LightDistance,
}

impl ColorMode
{
  pub fn samples_texture(self) -> bool
  {
    self == ColorMode::Texture
  }
}

impl Cycle for ColorMode
{
  const ALL: &'static [Self] = &[
    ColorMode::Color,
    ColorMode::Texture,
    ColorMode::Normal,
    ColorMode::Uv,
    ColorMode::Depth,
    ColorMode::Position,
    ColorMode::LightDistance,
  ];
}

impl fmt::Display for ColorMode
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
  {
    let label = match self
    {
      ColorMode::Color => "COLOR",
      ColorMode::Texture => "TEXTURE",
      ColorMode::Normal => "NORMAL",
      ColorMode::Uv => "UV",
      ColorMode::Depth => "DEPTH",
      ColorMode::Position => "POSITION",
      ColorMode::LightDistance => "LIGHT_DISTANCE",
    };
    f.write_str(label)
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Raster (polygon) mode
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RasterMode
{
  Line,
  Point,
  Fill,
}

impl Cycle for RasterMode
{
  const ALL: &'static [Self] = &[RasterMode::Line, RasterMode::Point, RasterMode::Fill];
}

impl fmt::Display for RasterMode
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
  {
    let label = match self
    {
      RasterMode::Line => "LINE",
      RasterMode::Point => "POINT",
      RasterMode::Fill => "FILL",
    };
    f.write_str(label)
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Tests
// ──────────────────────────────────────────────────────────────
//
