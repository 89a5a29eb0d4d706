mod core;
mod depth;
mod gui;
mod pipeline;
mod texture;
mod uniform;

pub use self::core::WgpuBackend;
pub use gui::GuiRenderer;
pub use texture::load_texture_dir;
