use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Deserializer};

use crate::error::{ConfigError, Result};
use crate::mesh::{GridMesh, Topology};
use crate::modes::{ColorMode, FuncType, RasterMode};
use crate::transform::ProjectionMode;

//
// ──────────────────────────────────────────────────────────────
//   ViewerConfig
//
//   Loaded from an optional JSON file. Every field has a default,
//   so `{}` is a valid config. A surface section only overrides the
//   fields it names; the rest keep that surface's own default.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig
{
  pub window: WindowConfig,
  pub camera: CameraConfig,
  pub light: LightConfig,
  #[serde(deserialize_with = "floor_section")]
  pub floor: SurfaceConfig,
  #[serde(deserialize_with = "surface_section")]
  pub surface: SurfaceConfig,
  #[serde(deserialize_with = "light_marker_section")]
  pub light_marker: SurfaceConfig,
  pub projection: ProjectionMode,
  pub raster_mode: RasterMode,
  pub textures_dir: Option<PathBuf>,
  pub shader_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig
{
  pub title: String,
  pub width: u32,
  pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig
{
  pub position: Vec3,
  pub azimuth_deg: f32,
  pub zenith_deg: f32,
  pub radius: f32,
  pub first_person: bool,
  /// World units per key event.
  pub move_speed: f32,
  /// Multiplicative radius change per scroll line.
  pub zoom_step: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig
{
  pub position: Vec3,
  pub move_speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig
{
  pub cols: u32,
  pub rows: u32,
  pub topology: Topology,
  pub func_type: FuncType,
  pub color_mode: ColorMode,
  pub color: [f32; 3],
  pub scale: f32,
  pub offset: Vec3,
  pub lighting: bool,
}

//
// ──────────────────────────────────────────────────────────────
//   Defaults
// ──────────────────────────────────────────────────────────────
//

impl Default for ViewerConfig
{
  fn default() -> Self
  {
    Self {
      window: WindowConfig::default(),
      camera: CameraConfig::default(),
      light: LightConfig::default(),
      floor: SurfaceConfig::floor(),
      surface: SurfaceConfig::main_surface(),
      light_marker: SurfaceConfig::light_marker(),
      projection: ProjectionMode::Perspective,
      raster_mode: RasterMode::Fill,
      textures_dir: Some(PathBuf::from("textures")),
      shader_path: None,
    }
  }
}

impl Default for WindowConfig
{
  fn default() -> Self
  {
    Self { title: "surfgrid".to_string(), width: 1280, height: 720 }
  }
}

impl Default for CameraConfig
{
  fn default() -> Self
  {
    Self {
      position: Vec3::new(0.0, -3.0, 1.0),
      azimuth_deg: 90.0,
      zenith_deg: -15.0,
      radius: 3.0,
      first_person: true,
      move_speed: 0.02,
      zoom_step: 0.1,
    }
  }
}

impl Default for LightConfig
{
  fn default() -> Self
  {
    Self { position: Vec3::new(1.5, 0.0, 1.5), move_speed: 0.02 }
  }
}

impl Default for SurfaceConfig
{
  fn default() -> Self
  {
    Self {
      cols: 10,
      rows: 10,
      topology: Topology::TriangleList,
      func_type: FuncType::Grid,
      color_mode: ColorMode::Color,
      color: [0.5, 0.5, 0.5],
      scale: 1.0,
      offset: Vec3::ZERO,
      lighting: true,
    }
  }
}

impl SurfaceConfig
{
  /// Flat strip-topology floor under the scene.
  pub fn floor() -> Self
  {
    Self { topology: Topology::TriangleStrip, scale: 4.0, ..Self::default() }
  }

  /// Textured yellow sphere resting on the floor.
  pub fn main_surface() -> Self
  {
    Self {
      cols: 100,
      rows: 100,
      func_type: FuncType::Sphere,
      color_mode: ColorMode::Texture,
      color: [1.0, 1.0, 0.0],
      offset: Vec3::new(0.0, 0.0, 1.0),
      ..Self::default()
    }
  }

  /// Small unlit sphere drawn at the light. `offset` is relative to the light.
  pub fn light_marker() -> Self
  {
    Self {
      cols: 50,
      rows: 50,
      func_type: FuncType::Sphere,
      color: [1.0, 1.0, 1.0],
      scale: 0.1,
      lighting: false,
      ..Self::default()
    }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Surface sections
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SurfaceOverlay
{
  cols: Option<u32>,
  rows: Option<u32>,
  topology: Option<Topology>,
  func_type: Option<FuncType>,
  color_mode: Option<ColorMode>,
  color: Option<[f32; 3]>,
  scale: Option<f32>,
  offset: Option<Vec3>,
  lighting: Option<bool>,
}

impl SurfaceOverlay
{
  fn over(self, base: SurfaceConfig) -> SurfaceConfig
  {
    SurfaceConfig {
      cols: self.cols.unwrap_or(base.cols),
      rows: self.rows.unwrap_or(base.rows),
      topology: self.topology.unwrap_or(base.topology),
      func_type: self.func_type.unwrap_or(base.func_type),
      color_mode: self.color_mode.unwrap_or(base.color_mode),
      color: self.color.unwrap_or(base.color),
      scale: self.scale.unwrap_or(base.scale),
      offset: self.offset.unwrap_or(base.offset),
      lighting: self.lighting.unwrap_or(base.lighting),
    }
  }
}

fn floor_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SurfaceConfig, D::Error>
{
  Ok(SurfaceOverlay::deserialize(deserializer)?.over(SurfaceConfig::floor()))
}

fn surface_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SurfaceConfig, D::Error>
{
  Ok(SurfaceOverlay::deserialize(deserializer)?.over(SurfaceConfig::main_surface()))
}

fn light_marker_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SurfaceConfig, D::Error>
{
  Ok(SurfaceOverlay::deserialize(deserializer)?.over(SurfaceConfig::light_marker()))
}

//
// ──────────────────────────────────────────────────────────────
//   Loading
// ──────────────────────────────────────────────────────────────
//

impl ViewerConfig
{
  /// Parse and validate. Every surface grid must be generatable.
  pub fn from_json(json: &str) -> Result<Self, ConfigError>
  {
    let config: Self = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: &Path) -> Result<Self>
  {
    let json = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;

    let config = Self::from_json(&json)?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
  }

  fn validate(&self) -> Result<(), ConfigError>
  {
    let sections = [("floor", &self.floor), ("surface", &self.surface), ("light_marker", &self.light_marker)];

    for (section, surface) in sections
    {
      GridMesh::check_dimensions(surface.cols, surface.rows, surface.topology)
        .map_err(|source| ConfigError::Mesh { section, source })?;
    }

    Ok(())
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
  use crate::error::{Error, MeshError};

  #[test]
  fn empty_object_gives_defaults()
  {
    assert_eq!(ViewerConfig::from_json("{}").unwrap(), ViewerConfig::default());
  }

  #[test]
  fn partial_sections_keep_other_defaults()
  {
    let config = ViewerConfig::from_json(
      r#"{
        "surface": { "cols": 20, "topology": "strip", "func_type": "wave" },
        "camera": { "move_speed": 0.5 },
        "projection": "orthographic"
      }"#,
    )
    .unwrap();

    assert_eq!(config.surface.cols, 20);
    assert_eq!(config.surface.rows, 100);
    assert_eq!(config.surface.topology, Topology::TriangleStrip);
    assert_eq!(config.surface.func_type, FuncType::Wave);
    assert_eq!(config.surface.color_mode, ColorMode::Texture);
    assert_eq!(config.camera.move_speed, 0.5);
    assert_eq!(config.camera.azimuth_deg, 90.0);
    assert_eq!(config.projection, ProjectionMode::Orthographic);
  }

  #[test]
  fn unknown_topology_is_rejected()
  {
    let err = ViewerConfig::from_json(r#"{ "floor": { "topology": "fan" } }"#).unwrap_err();
    assert!(err.to_string().contains("parse"));
    assert!(format!("{:?}", err).contains("fan"));
  }

  #[test]
  fn unknown_field_is_rejected()
  {
    assert!(ViewerConfig::from_json(r#"{ "colour": 1 }"#).is_err());
  }

  #[test]
  fn partial_surface_section_keeps_its_role_defaults()
  {
    let config = ViewerConfig::from_json(r#"{ "surface": { "cols": 50 } }"#).unwrap();
    let expected = SurfaceConfig { cols: 50, ..SurfaceConfig::main_surface() };
    assert_eq!(config.surface, expected);
    assert_eq!(config.surface.func_type, FuncType::Sphere);
    assert_eq!(config.surface.offset, Vec3::new(0.0, 0.0, 1.0));

    let config = ViewerConfig::from_json(r#"{ "light_marker": { "color": [1.0, 0.0, 0.0] } }"#).unwrap();
    assert_eq!(config.light_marker.scale, 0.1);
    assert!(!config.light_marker.lighting);

    let config = ViewerConfig::from_json(r#"{ "floor": { "scale": 2.0 } }"#).unwrap();
    assert_eq!(config.floor.topology, Topology::TriangleStrip);
  }

  #[test]
  fn unknown_surface_field_is_rejected()
  {
    assert!(ViewerConfig::from_json(r#"{ "surface": { "radius": 2.0 } }"#).is_err());
  }

  #[test]
  fn ungeneratable_grid_names_its_section()
  {
    let err = ViewerConfig::from_json(r#"{ "floor": { "cols": 0 } }"#).unwrap_err();
    assert!(matches!(
      err,
      ConfigError::Mesh { section: "floor", source: MeshError::ZeroDimension { cols: 0, rows: 10 } }
    ));

    let err = ViewerConfig::from_json(r#"{ "surface": { "cols": 255, "rows": 256, "topology": "strip" } }"#)
      .unwrap_err();
    assert!(matches!(err, ConfigError::Mesh { section: "surface", source: MeshError::RestartCollision { .. } }));
  }

  #[test]
  fn missing_file_reports_path()
  {
    let err = ViewerConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Io { .. })));
    assert!(err.to_string().contains("/definitely/not/here.json"));
  }
}
