mod app;
mod input;
mod renderer;

use std::path::PathBuf;

use surfgrid_core::ViewerConfig;

fn main() -> anyhow::Result<()>
{
  // wgpu validation errors and warnings appear in the console.
  // RUST_LOG=wgpu=debug for more verbose GPU output.
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,wgpu_hal=off,naga=warn")).init();

  let config = match std::env::args().nth(1).map(PathBuf::from)
  {
    Some(path) => ViewerConfig::load(&path)?,
    None =>
    {
      log::info!("no config file given, using built-in defaults");
      ViewerConfig::default()
    }
  };

  app::run(config)
}
