use std::path::{Path, PathBuf};

use surfgrid_core::NamedTexture;

use super::core::WgpuBackend;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga"];

/// Upload every image in `dir`, ordered by file name.
///
/// A missing directory or an undecodable file is logged and skipped; the
/// viewer runs with whatever loaded.
pub fn load_texture_dir(backend: &mut WgpuBackend, dir: &Path) -> Vec<NamedTexture>
{
  let paths = match image_paths(dir)
  {
    Ok(paths) => paths,
    Err(e) =>
    {
      log::warn!("texture directory {} unavailable: {e}", dir.display());
      return Vec::new();
    }
  };

  let mut textures = Vec::with_capacity(paths.len());

  for path in paths
  {
    let name = texture_name(&path);

    let image = match image::open(&path)
    {
      Ok(image) => image.to_rgba8(),
      Err(e) =>
      {
        log::warn!("skipping texture {}: {e}", path.display());
        continue;
      }
    };

    match backend.create_texture_rgba(&name, image.width(), image.height(), image.as_raw())
    {
      Ok(handle) =>
      {
        log::debug!("loaded texture {name} ({}x{})", image.width(), image.height());
        textures.push(NamedTexture { name, handle });
      }
      Err(e) => log::warn!("skipping texture {}: {e}", path.display()),
    }
  }

  log::info!("{} texture(s) loaded from {}", textures.len(), dir.display());
  textures
}

fn image_paths(dir: &Path) -> std::io::Result<Vec<PathBuf>>
{
  let mut paths = Vec::new();

  for entry in std::fs::read_dir(dir)?
  {
    let path = entry?.path();
    if path.is_file() && has_image_extension(&path)
    {
      paths.push(path);
    }
  }

  paths.sort();
  Ok(paths)
}

fn has_image_extension(path: &Path) -> bool
{
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
    .unwrap_or(false)
}

fn texture_name(path: &Path) -> String
{
  path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn only_image_files_are_picked_up()
  {
    assert!(has_image_extension(Path::new("textures/brick.png")));
    assert!(has_image_extension(Path::new("textures/EARTH.JPG")));
    assert!(!has_image_extension(Path::new("textures/readme.txt")));
    assert!(!has_image_extension(Path::new("textures/noext")));
  }

  #[test]
  fn texture_is_named_after_its_file_stem()
  {
    assert_eq!(texture_name(Path::new("textures/moon.jpeg")), "moon");
  }

  #[test]
  fn missing_directory_is_an_io_error()
  {
    assert!(image_paths(Path::new("definitely/not/a/texture/dir")).is_err());
  }
}
