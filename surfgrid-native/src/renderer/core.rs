use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::Context;
use wgpu::util::DeviceExt;
use winit::window::Window;

use surfgrid_core::backend::uniforms;
use surfgrid_core::{
  BackendError, GridMesh, MeshHandle, ProgramHandle, RasterMode, RenderBackend, TextureHandle, Topology,
  UniformValue, RESTART_INDEX,
};

use super::depth::DepthResources;
use super::gui::GuiRenderer;
use super::pipeline::{raster_mode_supported, ProgramLayouts, SurfaceProgram};
use super::uniform::SurfaceUniform;

//
// ──────────────────────────────────────────────────────────────
//   Constants
// ──────────────────────────────────────────────────────────────
//

/// Uniform slots in the per-frame dynamic-offset buffer.
pub const MAX_DRAWS_PER_FRAME: usize = 64;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.02, g: 0.02, b: 0.03, a: 1.0 };

//
// ──────────────────────────────────────────────────────────────
//   GPU-side records
// ──────────────────────────────────────────────────────────────
//

struct GpuMesh
{
  vertex_buffer: wgpu::Buffer,
  index_buffer: wgpu::Buffer,
  index_count: u32,
  index_format: wgpu::IndexFormat,
  topology: Topology,
}

/// One recorded `bind_and_draw_mesh`, replayed when the frame is presented.
struct DrawCall
{
  mesh: usize,
  program: usize,
  topology: Topology,
  raster: RasterMode,
  texture: Option<usize>,
}

struct Frame
{
  surface_texture: wgpu::SurfaceTexture,
  view: wgpu::TextureView,
  draws: Vec<DrawCall>,
  uniforms: Vec<SurfaceUniform>,
}

//
// ──────────────────────────────────────────────────────────────
//   WgpuBackend
// ──────────────────────────────────────────────────────────────
//

pub struct WgpuBackend
{
  surface: wgpu::Surface<'static>,
  device: wgpu::Device,
  queue: wgpu::Queue,
  config: wgpu::SurfaceConfiguration,
  depth: DepthResources,
  features: wgpu::Features,

  uniform_buffer: wgpu::Buffer,
  uniform_stride: u64,
  uniform_layout: wgpu::BindGroupLayout,
  uniform_bind_group: wgpu::BindGroup,

  texture_layout: wgpu::BindGroupLayout,
  sampler: wgpu::Sampler,
  white: wgpu::BindGroup,
  textures: Vec<wgpu::BindGroup>,

  // bound when shadows are off; nothing here renders a shadow map yet
  shadow_layout: wgpu::BindGroupLayout,
  unshadowed: wgpu::BindGroup,

  meshes: Vec<GpuMesh>,
  programs: Vec<SurfaceProgram>,

  viewport: (u32, u32),
  raster_mode: RasterMode,
  restart_index: Option<u32>,
  pending: SurfaceUniform,
  pending_texture: Option<usize>,
  frame: Option<Frame>,
}

impl WgpuBackend
{
  pub async fn new(window: Arc<Window>) -> anyhow::Result<Self>
  {
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(window.clone()).context("failed to create window surface")?;

    let adapter = request_adapter(&instance, &surface).await?;
    let (device, queue) = request_device(&adapter).await?;
    let features = device.features();

    let config = configure_surface(&window, &surface, &adapter, &device)?;
    let depth = DepthResources::create(&device, &config);

    let uniform_stride = wgpu::util::align_to(
      std::mem::size_of::<SurfaceUniform>() as u64,
      device.limits().min_uniform_buffer_offset_alignment as u64,
    );
    let (uniform_buffer, uniform_layout, uniform_bind_group) = create_uniform_resources(&device, uniform_stride);

    let texture_layout = create_texture_layout(&device);
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
      label: Some("Surface Sampler"),
      address_mode_u: wgpu::AddressMode::Repeat,
      address_mode_v: wgpu::AddressMode::Repeat,
      mag_filter: wgpu::FilterMode::Linear,
      min_filter: wgpu::FilterMode::Linear,
      ..Default::default()
    });
    let white = upload_rgba(&device, &queue, &texture_layout, &sampler, "White Texture", 1, 1, &[255; 4]);

    let shadow_layout = create_shadow_layout(&device);
    let unshadowed = create_unshadowed_map(&device, &queue, &shadow_layout);

    log::info!(
      "wgpu ready: {} ({:?}), surface {:?} {}x{}",
      adapter.get_info().name,
      adapter.get_info().backend,
      config.format,
      config.width,
      config.height
    );

    Ok(Self {
      surface,
      device,
      queue,
      viewport: (config.width, config.height),
      config,
      depth,
      features,
      uniform_buffer,
      uniform_stride,
      uniform_layout,
      uniform_bind_group,
      texture_layout,
      sampler,
      white,
      textures: Vec::new(),
      shadow_layout,
      unshadowed,
      meshes: Vec::new(),
      programs: Vec::new(),
      raster_mode: RasterMode::Fill,
      restart_index: None,
      pending: SurfaceUniform::default(),
      pending_texture: None,
      frame: None,
    })
  }

  pub fn device(&self) -> &wgpu::Device
  {
    &self.device
  }

  pub fn format(&self) -> wgpu::TextureFormat
  {
    self.config.format
  }

  pub fn resize(&mut self, width: u32, height: u32)
  {
    if width == 0 || height == 0
    {
      return;
    }

    self.config.width = width;
    self.config.height = height;
    self.surface.configure(&self.device, &self.config);
    self.depth = DepthResources::create(&self.device, &self.config);
  }

  /// Upload tightly packed RGBA8 pixels as a sampleable texture.
  pub fn create_texture_rgba(
    &mut self,
    name: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
  ) -> Result<TextureHandle, BackendError>
  {
    let max = self.device.limits().max_texture_dimension_2d;
    if width == 0 || height == 0 || width > max || height > max
    {
      return Err(BackendError::BufferAllocation(format!("texture {name} is {width}x{height}, limit {max}")));
    }
    if rgba.len() != (width as usize) * (height as usize) * 4
    {
      return Err(BackendError::BufferAllocation(format!(
        "texture {name}: {} bytes for {width}x{height} RGBA",
        rgba.len()
      )));
    }

    let (bind_group, error) = self.with_error_scope(|device, queue| {
      upload_rgba(device, queue, &self.texture_layout, &self.sampler, name, width, height, rgba)
    });
    if let Some(e) = error
    {
      return Err(BackendError::BufferAllocation(e.to_string()));
    }

    self.textures.push(bind_group);
    Ok(TextureHandle((self.textures.len() - 1) as u32))
  }

  /// Replay the recorded draws, draw the overlay and present.
  pub fn present(
    &mut self,
    gui: &mut GuiRenderer,
    window: &Window,
    full_output: egui::FullOutput,
  ) -> Result<(), BackendError>
  {
    let frame = self.frame.take().ok_or(BackendError::NoActiveFrame)?;

    for (slot, block) in frame.uniforms.iter().enumerate()
    {
      self.queue.write_buffer(&self.uniform_buffer, slot as u64 * self.uniform_stride, bytemuck::bytes_of(block));
    }

    let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
      label: Some("Surface Encoder"),
    });

    self.record_surface_pass(&mut encoder, &frame);
    gui.render(&self.device, &self.queue, &mut encoder, window, &frame.view, full_output);

    self.queue.submit(Some(encoder.finish()));
    frame.surface_texture.present();
    Ok(())
  }

  fn record_surface_pass(&self, encoder: &mut wgpu::CommandEncoder, frame: &Frame)
  {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
      label: Some("Surface Pass"),
      color_attachments: &[Some(wgpu::RenderPassColorAttachment {
        view: &frame.view,
        resolve_target: None,
        ops: wgpu::Operations { load: wgpu::LoadOp::Clear(CLEAR_COLOR), store: wgpu::StoreOp::Store },
        depth_slice: None,
      })],
      depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
        view: &self.depth.view,
        depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
        stencil_ops: None,
      }),
      ..Default::default()
    });

    let width = self.viewport.0.min(self.config.width);
    let height = self.viewport.1.min(self.config.height);
    if width > 0 && height > 0
    {
      pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
    }

    for (slot, draw) in frame.draws.iter().enumerate()
    {
      let (Some(program), Some(mesh)) = (self.programs.get(draw.program), self.meshes.get(draw.mesh))
      else
      {
        continue;
      };
      let Some(pipeline) = program.pipeline(draw.topology, draw.raster)
      else
      {
        continue;
      };

      let offset = (slot as u64 * self.uniform_stride) as u32;

      pass.set_pipeline(pipeline);
      pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
      pass.set_bind_group(1, self.texture_group(draw.texture), &[]);
      pass.set_bind_group(2, &self.unshadowed, &[]);
      pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
      pass.set_index_buffer(mesh.index_buffer.slice(..), mesh.index_format);
      pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
  }

  fn texture_group(&self, texture: Option<usize>) -> &wgpu::BindGroup
  {
    texture.and_then(|i| self.textures.get(i)).unwrap_or(&self.white)
  }

  /// Run `f` inside validation and out-of-memory scopes and report the first error.
  fn with_error_scope<T>(&self, f: impl FnOnce(&wgpu::Device, &wgpu::Queue) -> T) -> (T, Option<wgpu::Error>)
  {
    self.device.push_error_scope(wgpu::ErrorFilter::Validation);
    self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

    let value = f(&self.device, &self.queue);

    let out_of_memory = pollster::block_on(self.device.pop_error_scope());
    let validation = pollster::block_on(self.device.pop_error_scope());

    (value, out_of_memory.or(validation))
  }
}

//
// ──────────────────────────────────────────────────────────────
//   RenderBackend
// ──────────────────────────────────────────────────────────────
//

impl RenderBackend for WgpuBackend
{
  fn create_program(&mut self, source: &str) -> Result<ProgramHandle, BackendError>
  {
    let layouts =
      ProgramLayouts { uniform: &self.uniform_layout, texture: &self.texture_layout, shadow: &self.shadow_layout };
    let format = self.config.format;

    let (program, error) =
      self.with_error_scope(|device, _| SurfaceProgram::create(device, format, layouts, source));
    if let Some(e) = error
    {
      return Err(BackendError::ShaderLoad(e.to_string()));
    }

    self.programs.push(program);
    Ok(ProgramHandle((self.programs.len() - 1) as u32))
  }

  fn upload_mesh(&mut self, mesh: &GridMesh) -> Result<MeshHandle, BackendError>
  {
    let strip_indices;
    let (contents, index_format): (&[u8], wgpu::IndexFormat) = match mesh.topology()
    {
      Topology::TriangleStrip =>
      {
        strip_indices = mesh.indices_u16().ok_or_else(|| {
          BackendError::BufferAllocation(format!(
            "{}x{} strip mesh does not fit 16-bit indices",
            mesh.cols(),
            mesh.rows()
          ))
        })?;
        (bytemuck::cast_slice(&strip_indices), wgpu::IndexFormat::Uint16)
      }
      Topology::TriangleList => (bytemuck::cast_slice(mesh.indices()), wgpu::IndexFormat::Uint32),
    };

    let ((vertex_buffer, index_buffer), error) = self.with_error_scope(|device, _| {
      let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Surface Vertex Buffer"),
        contents: bytemuck::cast_slice(mesh.vertices()),
        usage: wgpu::BufferUsages::VERTEX,
      });
      let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Surface Index Buffer"),
        contents,
        usage: wgpu::BufferUsages::INDEX,
      });
      (vertex_buffer, index_buffer)
    });
    if let Some(e) = error
    {
      return Err(BackendError::BufferAllocation(e.to_string()));
    }

    self.meshes.push(GpuMesh {
      vertex_buffer,
      index_buffer,
      index_count: mesh.index_count(),
      index_format,
      topology: mesh.topology(),
    });

    log::debug!(
      "uploaded {}x{} {} mesh: {} vertices, {} indices",
      mesh.cols(),
      mesh.rows(),
      mesh.topology(),
      mesh.vertex_count(),
      mesh.index_count()
    );
    Ok(MeshHandle((self.meshes.len() - 1) as u32))
  }

  fn clear_frame(&mut self) -> Result<(), BackendError>
  {
    let surface_texture = match self.surface.get_current_texture()
    {
      Ok(texture) => texture,
      Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) =>
      {
        self.surface.configure(&self.device, &self.config);
        self.surface.get_current_texture().map_err(|e| BackendError::FrameUnavailable(e.to_string()))?
      }
      Err(e) => return Err(BackendError::FrameUnavailable(e.to_string())),
    };

    let view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());

    if self.frame.replace(Frame { surface_texture, view, draws: Vec::new(), uniforms: Vec::new() }).is_some()
    {
      log::debug!("previous frame discarded without presenting");
    }

    self.pending_texture = None;
    Ok(())
  }

  fn set_viewport(&mut self, width: u32, height: u32)
  {
    self.viewport = (width, height);
  }

  fn set_raster_mode(&mut self, mode: RasterMode)
  {
    if mode != self.raster_mode && !raster_mode_supported(self.features, mode)
    {
      log::warn!("{mode} polygon mode is not supported by this device, drawing filled");
    }
    self.raster_mode = mode;
  }

  fn set_restart_index(&mut self, value: u32) -> Result<(), BackendError>
  {
    if value != RESTART_INDEX
    {
      return Err(BackendError::UnsupportedRestartIndex(value));
    }
    self.restart_index = Some(value);
    Ok(())
  }

  fn use_program(&mut self, program: ProgramHandle) -> Result<(), BackendError>
  {
    lookup("program", program.0, self.programs.len()).map(|_| ())
  }

  fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), BackendError>
  {
    self.pending.apply(name, value)
  }

  fn bind_texture(&mut self, texture: TextureHandle, sampler: &str) -> Result<(), BackendError>
  {
    let index = lookup("texture", texture.0, self.textures.len())?;
    colour_sampler(sampler, texture.0)?;
    self.pending_texture = Some(index);
    Ok(())
  }

  fn bind_and_draw_mesh(
    &mut self,
    mesh: MeshHandle,
    topology: Topology,
    program: ProgramHandle,
  ) -> Result<(), BackendError>
  {
    let mesh_index = lookup("mesh", mesh.0, self.meshes.len())?;
    let program_index = lookup("program", program.0, self.programs.len())?;

    if topology == Topology::TriangleStrip && self.restart_index.is_none()
    {
      return Err(BackendError::RestartIndexNotConfigured);
    }

    let uploaded = self.meshes[mesh_index].topology;
    if uploaded != topology
    {
      log::warn!("mesh {} was uploaded as {uploaded}, not {topology}", mesh.0);
    }

    let frame = self.frame.as_mut().ok_or(BackendError::NoActiveFrame)?;
    if frame.draws.len() >= MAX_DRAWS_PER_FRAME
    {
      return Err(BackendError::FrameFull(MAX_DRAWS_PER_FRAME));
    }

    frame.uniforms.push(self.pending);
    frame.draws.push(DrawCall {
      mesh: mesh_index,
      program: program_index,
      topology: uploaded,
      raster: self.raster_mode,
      texture: self.pending_texture.take(),
    });

    Ok(())
  }
}

fn lookup(kind: &'static str, id: u32, len: usize) -> Result<usize, BackendError>
{
  let index = id as usize;
  if index < len
  {
    Ok(index)
  }
  else
  {
    Err(BackendError::UnknownHandle { kind, id })
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Initialization Helpers
// ──────────────────────────────────────────────────────────────
//

async fn request_adapter(instance: &wgpu::Instance, surface: &wgpu::Surface<'_>) -> anyhow::Result<wgpu::Adapter>
{
  instance
    .request_adapter(&wgpu::RequestAdapterOptions {
      power_preference: wgpu::PowerPreference::HighPerformance,
      compatible_surface: Some(surface),
      force_fallback_adapter: false,
    })
    .await
    .context("no suitable GPU adapter found")
}

async fn request_device(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)>
{
  // wireframe and point modes are optional; without them the viewer draws filled
  let optional = wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::POLYGON_MODE_POINT;
  let required_features = adapter.features() & optional;

  adapter
    .request_device(&wgpu::DeviceDescriptor {
      label: Some("Surfgrid Device"),
      required_features,
      ..Default::default()
    })
    .await
    .context("failed to create device")
}

fn configure_surface(
  window: &Window,
  surface: &wgpu::Surface<'_>,
  adapter: &wgpu::Adapter,
  device: &wgpu::Device,
) -> anyhow::Result<wgpu::SurfaceConfiguration>
{
  let size = window.inner_size();
  let caps = surface.get_capabilities(adapter);
  let format = caps
    .formats
    .iter()
    .copied()
    .find(|f| f.is_srgb())
    .or_else(|| caps.formats.first().copied())
    .context("surface reports no texture formats")?;

  let config = wgpu::SurfaceConfiguration {
    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
    format,
    width: size.width.max(1),
    height: size.height.max(1),
    present_mode: wgpu::PresentMode::Fifo,
    alpha_mode: wgpu::CompositeAlphaMode::Auto,
    view_formats: vec![],
    desired_maximum_frame_latency: 2,
  };

  surface.configure(device, &config);
  Ok(config)
}

fn create_uniform_resources(
  device: &wgpu::Device,
  stride: u64,
) -> (wgpu::Buffer, wgpu::BindGroupLayout, wgpu::BindGroup)
{
  let block_size = NonZeroU64::new(std::mem::size_of::<SurfaceUniform>() as u64);

  let buffer = device.create_buffer(&wgpu::BufferDescriptor {
    label: Some("Surface Uniform Buffer"),
    size: stride * MAX_DRAWS_PER_FRAME as u64,
    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    mapped_at_creation: false,
  });

  let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
    label: Some("Surface Uniform BGL"),
    entries: &[wgpu::BindGroupLayoutEntry {
      binding: 0,
      visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
      ty: wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: true,
        min_binding_size: block_size,
      },
      count: None,
    }],
  });

  let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
    label: Some("Surface Uniform BG"),
    layout: &layout,
    entries: &[wgpu::BindGroupEntry {
      binding: 0,
      resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding { buffer: &buffer, offset: 0, size: block_size }),
    }],
  });

  (buffer, layout, bind_group)
}

fn create_texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout
{
  device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
    label: Some("Surface Texture BGL"),
    entries: &[
      wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
          sample_type: wgpu::TextureSampleType::Float { filterable: true },
          view_dimension: wgpu::TextureViewDimension::D2,
          multisampled: false,
        },
        count: None,
      },
      wgpu::BindGroupLayoutEntry {
        binding: 1,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
      },
    ],
  })
}

fn create_shadow_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout
{
  device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
    label: Some("Shadow Map BGL"),
    entries: &[
      wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
          sample_type: wgpu::TextureSampleType::Depth,
          view_dimension: wgpu::TextureViewDimension::D2,
          multisampled: false,
        },
        count: None,
      },
      wgpu::BindGroupLayoutEntry {
        binding: 1,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
        count: None,
      },
    ],
  })
}

/// A 1x1 depth map cleared to the far plane, so every comparison passes.
fn create_unshadowed_map(device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup
{
  let texture = device.create_texture(&wgpu::TextureDescriptor {
    label: Some("Unshadowed Depth"),
    size: wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
    mip_level_count: 1,
    sample_count: 1,
    dimension: wgpu::TextureDimension::D2,
    format: wgpu::TextureFormat::Depth32Float,
    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
    view_formats: &[],
  });
  let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

  let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Unshadowed Clear") });
  encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
    label: Some("Unshadowed Clear Pass"),
    color_attachments: &[],
    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
      view: &view,
      depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
      stencil_ops: None,
    }),
    ..Default::default()
  });
  queue.submit(Some(encoder.finish()));

  let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
    label: Some("Shadow Sampler"),
    mag_filter: wgpu::FilterMode::Linear,
    min_filter: wgpu::FilterMode::Linear,
    compare: Some(wgpu::CompareFunction::LessEqual),
    ..Default::default()
  });

  device.create_bind_group(&wgpu::BindGroupDescriptor {
    label: Some("Unshadowed BG"),
    layout,
    entries: &[
      wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
      wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&sampler) },
    ],
  })
}

/// Uploaded textures are colour only, so the shadow map sampler cannot take them.
fn colour_sampler(sampler: &str, id: u32) -> Result<(), BackendError>
{
  match sampler
  {
    uniforms::TEXTURE_SAMPLER => Ok(()),
    uniforms::SHADOW_MAP_SAMPLER => Err(BackendError::SamplerMismatch { sampler: sampler.to_string(), id }),
    other => Err(BackendError::UnknownSampler(other.to_string())),
  }
}

#[allow(clippy::too_many_arguments)]
fn upload_rgba(
  device: &wgpu::Device,
  queue: &wgpu::Queue,
  layout: &wgpu::BindGroupLayout,
  sampler: &wgpu::Sampler,
  label: &str,
  width: u32,
  height: u32,
  rgba: &[u8],
) -> wgpu::BindGroup
{
  let texture = device.create_texture_with_data(
    queue,
    &wgpu::TextureDescriptor {
      label: Some(label),
      size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
      mip_level_count: 1,
      sample_count: 1,
      dimension: wgpu::TextureDimension::D2,
      format: wgpu::TextureFormat::Rgba8UnormSrgb,
      usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
      view_formats: &[],
    },
    wgpu::util::TextureDataOrder::LayerMajor,
    rgba,
  );

  let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

  device.create_bind_group(&wgpu::BindGroupDescriptor {
    label: Some(label),
    layout,
    entries: &[
      wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
      wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(sampler) },
    ],
  })
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn handle_lookup_rejects_out_of_range_ids()
  {
    assert_eq!(lookup("mesh", 2, 3), Ok(2));
    assert_eq!(lookup("mesh", 3, 3), Err(BackendError::UnknownHandle { kind: "mesh", id: 3 }));
  }

  #[test]
  fn colour_textures_are_refused_as_shadow_maps()
  {
    assert_eq!(colour_sampler(uniforms::TEXTURE_SAMPLER, 0), Ok(()));
    assert_eq!(
      colour_sampler(uniforms::SHADOW_MAP_SAMPLER, 4),
      Err(BackendError::SamplerMismatch { sampler: uniforms::SHADOW_MAP_SAMPLER.to_string(), id: 4 })
    );
    assert_eq!(colour_sampler("uBump", 0), Err(BackendError::UnknownSampler("uBump".to_string())));
  }

  #[test]
  fn uniform_stride_respects_offset_alignment()
  {
    let stride = wgpu::util::align_to(std::mem::size_of::<SurfaceUniform>() as u64, 256);
    assert_eq!(stride, 512);
    assert_eq!(stride % 256, 0);
  }
}
