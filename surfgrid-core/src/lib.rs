//! Scene model for the surfgrid viewer.
//!
//! Grid generation, the camera, model/view/projection plumbing and input
//! dispatch live here. Everything that touches a GPU sits behind
//! [`backend::RenderBackend`].

pub mod backend;
pub mod camera;
pub mod config;
pub mod entity;
pub mod error;
pub mod input;
pub mod mesh;
pub mod modes;
pub mod scene;
pub mod transform;

#[cfg(test)]
mod testing;

pub use backend::{MeshHandle, NamedTexture, ProgramHandle, RenderBackend, TextureHandle, UniformValue};
pub use camera::Camera;
pub use config::ViewerConfig;
pub use entity::{ShadowSettings, SurfaceEntity};
pub use error::{BackendError, ConfigError, Error, MeshError, Result};
pub use input::{InputEvent, Key, KeyAction, MouseButton};
pub use mesh::{GridMesh, GridVertex, Topology, RESTART_INDEX};
pub use modes::{ColorMode, Cycle, FuncType, RasterMode};
pub use scene::{Controls, EntityId, Scene};
pub use transform::ProjectionMode;
