use thiserror::Error;

//
// ──────────────────────────────────────────────────────────────
//   Mesh construction errors
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError
{
  #[error("grid must have at least one cell in each direction (got {cols}x{rows})")]
  ZeroDimension
  {
    cols: u32,
    rows: u32,
  },

  #[error(
    "strip grid {cols}x{rows} needs {vertices} vertices, which collides with restart index {restart}"
  )]
  RestartCollision
  {
    cols: u32,
    rows: u32,
    vertices: u64,
    restart: u32,
  },

  #[error("grid {cols}x{rows} is too large to index with 32-bit indices")]
  TooLarge
  {
    cols: u32,
    rows: u32,
  },

  #[error("unsupported topology '{0}' (expected 'triangles' or 'strip')")]
  UnsupportedTopology(String),
}

//
// ──────────────────────────────────────────────────────────────
//   Renderer backend errors
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError
{
  #[error("shader program failed to load: {0}")]
  ShaderLoad(String),

  #[error("buffer allocation failed: {0}")]
  BufferAllocation(String),

  #[error("unknown uniform '{0}'")]
  UnknownUniform(String),

  #[error("uniform '{name}' expects {expected}")]
  UniformType
  {
    name: String,
    expected: &'static str,
  },

  #[error("unknown texture sampler '{0}'")]
  UnknownSampler(String),

  #[error("texture {id} cannot be bound to '{sampler}': shadow maps must be depth textures")]
  SamplerMismatch
  {
    sampler: String,
    id: u32,
  },

  #[error("unknown {kind} handle {id}")]
  UnknownHandle
  {
    kind: &'static str,
    id: u32,
  },

  #[error("strip topology drawn before the restart index was configured")]
  RestartIndexNotConfigured,

  #[error("restart index {0} is not supported by this backend")]
  UnsupportedRestartIndex(u32),

  #[error("frame unavailable: {0}")]
  FrameUnavailable(String),

  #[error("draw issued outside of a frame")]
  NoActiveFrame,

  #[error("too many draw calls in one frame (limit {0})")]
  FrameFull(usize),
}

//
// ──────────────────────────────────────────────────────────────
//   Configuration errors
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
pub enum ConfigError
{
  #[error("failed to read config file {path}")]
  Io
  {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config")]
  Parse(#[from] serde_json::Error),

  #[error("invalid {section} grid")]
  Mesh
  {
    section: &'static str,
    #[source]
    source: MeshError,
  },
}

//
// ──────────────────────────────────────────────────────────────
//   Umbrella error
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
pub enum Error
{
  #[error(transparent)]
  Mesh(#[from] MeshError),

  #[error(transparent)]
  Backend(#[from] BackendError),

  #[error(transparent)]
  Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
