use std::collections::HashMap;

use surfgrid_core::{GridVertex, RasterMode, Topology};

use super::depth::DEPTH_FORMAT;

//
// ──────────────────────────────────────────────────────────────
//   Surface program: one shader, one pipeline per
//   (topology, raster mode) the device supports
// ──────────────────────────────────────────────────────────────
//

pub struct SurfaceProgram
{
  pipelines: HashMap<(Topology, RasterMode), wgpu::RenderPipeline>,
}

pub struct ProgramLayouts<'a>
{
  pub uniform: &'a wgpu::BindGroupLayout,
  pub texture: &'a wgpu::BindGroupLayout,
  pub shadow: &'a wgpu::BindGroupLayout,
}

impl SurfaceProgram
{
  pub fn create(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layouts: ProgramLayouts<'_>,
    source: &str,
  ) -> Self
  {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: Some("Surface Shader"),
      source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("Surface Pipeline Layout"),
      // 0: per-draw uniforms, 1: colour texture, 2: shadow map
      bind_group_layouts: &[layouts.uniform, layouts.texture, layouts.shadow],
      push_constant_ranges: &[],
    });

    let mut pipelines = HashMap::new();

    for topology in [Topology::TriangleList, Topology::TriangleStrip]
    {
      for raster in supported_raster_modes(device.features())
      {
        let pipeline = create_surface_pipeline(device, format, &layout, &shader, topology, raster);
        pipelines.insert((topology, raster), pipeline);
      }
    }

    Self { pipelines }
  }

  /// Pipeline for the requested modes, falling back to fill.
  pub fn pipeline(&self, topology: Topology, raster: RasterMode) -> Option<&wgpu::RenderPipeline>
  {
    self
      .pipelines
      .get(&(topology, raster))
      .or_else(|| self.pipelines.get(&(topology, RasterMode::Fill)))
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Device capabilities
// ──────────────────────────────────────────────────────────────
//

pub fn raster_mode_supported(features: wgpu::Features, mode: RasterMode) -> bool
{
  match mode
  {
    RasterMode::Fill => true,
    RasterMode::Line => features.contains(wgpu::Features::POLYGON_MODE_LINE),
    RasterMode::Point => features.contains(wgpu::Features::POLYGON_MODE_POINT),
  }
}

fn supported_raster_modes(features: wgpu::Features) -> Vec<RasterMode>
{
  [RasterMode::Fill, RasterMode::Line, RasterMode::Point]
    .into_iter()
    .filter(|&m| raster_mode_supported(features, m))
    .collect()
}

fn polygon_mode(mode: RasterMode) -> wgpu::PolygonMode
{
  match mode
  {
    RasterMode::Fill => wgpu::PolygonMode::Fill,
    RasterMode::Line => wgpu::PolygonMode::Line,
    RasterMode::Point => wgpu::PolygonMode::Point,
  }
}

fn primitive_topology(topology: Topology) -> (wgpu::PrimitiveTopology, Option<wgpu::IndexFormat>)
{
  match topology
  {
    Topology::TriangleList => (wgpu::PrimitiveTopology::TriangleList, None),
    // 16-bit strip indices restart on 0xFFFF
    Topology::TriangleStrip => (wgpu::PrimitiveTopology::TriangleStrip, Some(wgpu::IndexFormat::Uint16)),
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Pipeline
// ──────────────────────────────────────────────────────────────
//

fn create_surface_pipeline(
  device: &wgpu::Device,
  format: wgpu::TextureFormat,
  layout: &wgpu::PipelineLayout,
  shader: &wgpu::ShaderModule,
  topology: Topology,
  raster: RasterMode,
) -> wgpu::RenderPipeline
{
  let (primitive, strip_index_format) = primitive_topology(topology);
  let label = format!("Surface Pipeline ({topology}, {raster})");

  device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
    label: Some(&label),
    layout: Some(layout),
    vertex: wgpu::VertexState {
      module: shader,
      entry_point: Some("vs_main"),
      buffers: &[wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<GridVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![
          0 => Float32x2,  // uv
        ],
      }],
      compilation_options: wgpu::PipelineCompilationOptions::default(),
    },
    fragment: Some(wgpu::FragmentState {
      module: shader,
      entry_point: Some("fs_main"),
      targets: &[Some(wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
      })],
      compilation_options: wgpu::PipelineCompilationOptions::default(),
    }),
    primitive: wgpu::PrimitiveState {
      topology: primitive,
      strip_index_format,
      front_face: wgpu::FrontFace::Ccw,
      cull_mode: None, // open surfaces are seen from both sides
      unclipped_depth: false,
      polygon_mode: polygon_mode(raster),
      conservative: false,
    },
    depth_stencil: Some(wgpu::DepthStencilState {
      format: DEPTH_FORMAT,
      depth_write_enabled: true,
      depth_compare: wgpu::CompareFunction::Less,
      stencil: wgpu::StencilState::default(),
      bias: wgpu::DepthBiasState::default(),
    }),
    multisample: wgpu::MultisampleState::default(),
    multiview: None,
    cache: None,
  })
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn fill_is_always_supported()
  {
    assert!(raster_mode_supported(wgpu::Features::empty(), RasterMode::Fill));
    assert!(!raster_mode_supported(wgpu::Features::empty(), RasterMode::Line));
    assert!(raster_mode_supported(wgpu::Features::POLYGON_MODE_POINT, RasterMode::Point));
  }

  #[test]
  fn strips_use_16_bit_restart_format()
  {
    assert_eq!(primitive_topology(Topology::TriangleStrip).1, Some(wgpu::IndexFormat::Uint16));
    assert_eq!(primitive_topology(Topology::TriangleList).1, None);
  }
}
