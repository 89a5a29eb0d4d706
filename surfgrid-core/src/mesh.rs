use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MeshError;

//
// ──────────────────────────────────────────────────────────────
//   Constants
// ──────────────────────────────────────────────────────────────
//

/// Index value that ends one strip and starts the next.
///
/// Matches the implicit restart value of 16-bit strip index buffers, so a
/// strip mesh can never address more than `RESTART_INDEX` vertices.
pub const RESTART_INDEX: u32 = 0xFFFF;

//
// ──────────────────────────────────────────────────────────────
//   Vertex layout: [u, v]  (parametric, displaced in the shader)
// ──────────────────────────────────────────────────────────────
//

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex
{
  pub uv: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<GridVertex>() == 8);

//
// ──────────────────────────────────────────────────────────────
//   Topology
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Topology
{
  TriangleList,
  TriangleStrip,
}

impl Topology
{
  pub fn name(self) -> &'static str
  {
    match self
    {
      Topology::TriangleList => "triangles",
      Topology::TriangleStrip => "strip",
    }
  }
}

impl fmt::Display for Topology
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
  {
    f.write_str(self.name())
  }
}

impl FromStr for Topology
{
  type Err = MeshError;

  fn from_str(s: &str) -> Result<Self, Self::Err>
  {
    match s.trim().to_ascii_lowercase().as_str()
    {
      "triangles" | "list" | "triangle-list" => Ok(Topology::TriangleList),
      "strip" | "triangle-strip" => Ok(Topology::TriangleStrip),
      _ => Err(MeshError::UnsupportedTopology(s.to_string())),
    }
  }
}

impl TryFrom<String> for Topology
{
  type Error = MeshError;

  fn try_from(value: String) -> Result<Self, Self::Error>
  {
    value.parse()
  }
}

impl From<Topology> for String
{
  fn from(value: Topology) -> Self
  {
    value.name().to_string()
  }
}

//
// ──────────────────────────────────────────────────────────────
//   GridMesh
// ──────────────────────────────────────────────────────────────
//

/// CPU-side grid of `cols x rows` cells.
///
/// Vertices are row-major: row `i`, column `j` sits at
/// `i * (cols + 1) + j` with `uv = (j / cols, i / rows)`.
/// Immutable once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh
{
  cols: u32,
  rows: u32,
  topology: Topology,
  vertices: Vec<GridVertex>,
  indices: Vec<u32>,
}

impl GridMesh
{
  pub fn generate(cols: u32, rows: u32, topology: Topology) -> Result<Self, MeshError>
  {
    Self::check_dimensions(cols, rows, topology)?;

    let vertices = build_vertices(cols, rows);
    let indices = match topology
    {
      Topology::TriangleList => build_list_indices(cols, rows),
      Topology::TriangleStrip => build_strip_indices(cols, rows),
    };

    log::debug!(
      "generated {}x{} {} grid: {} vertices, {} indices",
      cols,
      rows,
      topology,
      vertices.len(),
      indices.len()
    );

    Ok(Self { cols, rows, topology, vertices, indices })
  }

  /// Whether a `cols x rows` grid of this topology can be generated.
  pub fn check_dimensions(cols: u32, rows: u32, topology: Topology) -> Result<(), MeshError>
  {
    validate(cols, rows, topology)
  }

  pub fn cols(&self) -> u32
  {
    self.cols
  }

  pub fn rows(&self) -> u32
  {
    self.rows
  }

  pub fn topology(&self) -> Topology
  {
    self.topology
  }

  pub fn vertices(&self) -> &[GridVertex]
  {
    &self.vertices
  }

  pub fn indices(&self) -> &[u32]
  {
    &self.indices
  }

  pub fn vertex_count(&self) -> u32
  {
    self.vertices.len() as u32
  }

  pub fn index_count(&self) -> u32
  {
    self.indices.len() as u32
  }

  /// 16-bit copy of the index buffer.
  ///
  /// Returns `None` when a real index does not fit, which can only happen for
  /// large triangle-list meshes. Strip meshes always fit.
  pub fn indices_u16(&self) -> Option<Vec<u16>>
  {
    self.indices.iter().map(|&i| u16::try_from(i).ok()).collect()
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Validation
// ──────────────────────────────────────────────────────────────
//

fn validate(cols: u32, rows: u32, topology: Topology) -> Result<(), MeshError>
{
  if cols == 0 || rows == 0
  {
    return Err(MeshError::ZeroDimension { cols, rows });
  }

  let vertices = (cols as u64 + 1) * (rows as u64 + 1);

  let index_count = match topology
  {
    Topology::TriangleList => 6 * cols as u64 * rows as u64,
    Topology::TriangleStrip => rows as u64 * (2 * (cols as u64 + 1) + 1),
  };

  if topology == Topology::TriangleStrip && vertices > RESTART_INDEX as u64
  {
    return Err(MeshError::RestartCollision { cols, rows, vertices, restart: RESTART_INDEX });
  }

  if vertices > u32::MAX as u64 || index_count > u32::MAX as u64
  {
    return Err(MeshError::TooLarge { cols, rows });
  }

  Ok(())
}

//
// ──────────────────────────────────────────────────────────────
//   Geometry builders
// ──────────────────────────────────────────────────────────────
//

fn build_vertices(cols: u32, rows: u32) -> Vec<GridVertex>
{
  let mut vertices = Vec::with_capacity(((cols + 1) * (rows + 1)) as usize);

  for i in 0..=rows
  {
    let v = i as f32 / rows as f32;
    for j in 0..=cols
    {
      let u = j as f32 / cols as f32;
      vertices.push(GridVertex { uv: [u, v] });
    }
  }

  vertices
}

fn build_list_indices(cols: u32, rows: u32) -> Vec<u32>
{
  let stride = cols + 1;
  let mut indices = Vec::with_capacity((6 * cols * rows) as usize);

  for i in 0..rows
  {
    let row = i * stride;
    let next_row = row + stride;

    for j in 0..cols
    {
      indices.extend_from_slice(&[row + j, next_row + j, row + j + 1]);
      indices.extend_from_slice(&[row + j + 1, next_row + j, next_row + j + 1]);
    }
  }

  indices
}

fn build_strip_indices(cols: u32, rows: u32) -> Vec<u32>
{
  let stride = cols + 1;
  let mut indices = Vec::with_capacity((rows * (2 * stride + 1)) as usize);

  for i in 0..rows
  {
    let row = i * stride;

    for j in 0..=cols
    {
      indices.push(row + j);
      indices.push(row + stride + j);
    }

    indices.push(RESTART_INDEX);
  }

  indices
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

  #[test]
  fn list_grid_2x2_has_expected_counts_and_corners()
  {
    let mesh = GridMesh::generate(2, 2, Topology::TriangleList).unwrap();

    assert_eq!(mesh.vertex_count(), 9);
    assert_eq!(mesh.index_count(), 24);
    assert_eq!(mesh.vertices()[0].uv, [0.0, 0.0]);
    assert_eq!(mesh.vertices()[8].uv, [1.0, 1.0]);
  }

  #[test]
  fn list_grid_counts_and_bounds_hold_for_many_sizes()
  {
    for (cols, rows) in [(1, 1), (1, 7), (5, 1), (3, 4), (16, 9), (100, 100)]
    {
      let mesh = GridMesh::generate(cols, rows, Topology::TriangleList).unwrap();
      let vertex_count = (cols + 1) * (rows + 1);

      assert_eq!(mesh.vertex_count(), vertex_count);
      assert_eq!(mesh.index_count(), 6 * cols * rows);
      assert!(mesh.indices().iter().all(|&i| i < vertex_count), "{cols}x{rows}");
    }
  }

  #[test]
  fn list_cell_uses_documented_winding()
  {
    let mesh = GridMesh::generate(1, 1, Topology::TriangleList).unwrap();
    assert_eq!(mesh.indices(), &[0, 2, 1, 1, 2, 3]);
  }

  #[test]
  fn vertices_are_row_major_uv()
  {
    let mesh = GridMesh::generate(4, 2, Topology::TriangleList).unwrap();

    // row 1, column 3
    let v = mesh.vertices()[1 * 5 + 3].uv;
    assert_eq!(v, [0.75, 0.5]);
    assert!(mesh.vertices().iter().all(|v| (0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1])));
  }

  #[test]
  fn strip_grid_1x1_sequence()
  {
    let mesh = GridMesh::generate(1, 1, Topology::TriangleStrip).unwrap();
    assert_eq!(mesh.indices(), &[0, 2, 1, 3, RESTART_INDEX]);
  }

  #[test]
  fn strip_restart_closes_every_row()
  {
    for (cols, rows) in [(1, 1), (2, 3), (7, 5), (50, 20)]
    {
      let mesh = GridMesh::generate(cols, rows, Topology::TriangleStrip).unwrap();
      let segment = (2 * (cols + 1) + 1) as usize;

      assert_eq!(mesh.index_count(), rows * (2 * (cols + 1) + 1));

      let restarts = mesh.indices().iter().filter(|&&i| i == RESTART_INDEX).count();
      assert_eq!(restarts, rows as usize);

      for chunk in mesh.indices().chunks(segment)
      {
        assert_eq!(*chunk.last().unwrap(), RESTART_INDEX);
        assert!(chunk[..segment - 1].iter().all(|&i| i < mesh.vertex_count()));
      }
    }
  }

  #[test]
  fn strip_at_restart_limit_is_accepted()
  {
    // 255 * 257 = 65535 vertices, the last one is index 65534
    let mesh = GridMesh::generate(254, 256, Topology::TriangleStrip).unwrap();
    assert_eq!(mesh.vertex_count(), RESTART_INDEX);
    assert!(mesh.indices_u16().is_some());
  }

  #[test]
  fn strip_past_restart_limit_is_rejected()
  {
    let err = GridMesh::generate(255, 256, Topology::TriangleStrip).unwrap_err();
    assert!(matches!(err, MeshError::RestartCollision { vertices: 65792, .. }));

    // the same size is fine as a triangle list
    assert!(GridMesh::generate(255, 256, Topology::TriangleList).is_ok());
  }

  #[test]
  fn zero_sized_grid_is_rejected()
  {
    assert_eq!(
      GridMesh::generate(0, 3, Topology::TriangleList),
      Err(MeshError::ZeroDimension { cols: 0, rows: 3 })
    );
    assert!(GridMesh::generate(3, 0, Topology::TriangleStrip).is_err());
  }

  #[test]
  fn oversized_list_grid_is_rejected()
  {
    let err = GridMesh::generate(u32::MAX, 2, Topology::TriangleList).unwrap_err();
    assert_eq!(err, MeshError::TooLarge { cols: u32::MAX, rows: 2 });
  }

  #[test]
  fn topology_parses_known_names_only()
  {
    assert_eq!("triangles".parse::<Topology>(), Ok(Topology::TriangleList));
    assert_eq!("Strip".parse::<Topology>(), Ok(Topology::TriangleStrip));
    assert_eq!(
      "fan".parse::<Topology>(),
      Err(MeshError::UnsupportedTopology("fan".to_string()))
    );
  }

  #[test]
  fn large_list_mesh_does_not_fit_u16()
  {
    let mesh = GridMesh::generate(300, 300, Topology::TriangleList).unwrap();
    assert!(mesh.indices_u16().is_none());
  }
}
