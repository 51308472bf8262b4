use crate::error::{Error, Result};
use image::ExtendedColorType;
use log::info;
use std::path::Path;

/// Saves tightly packed RGB8 rows (top row first) as an image; the format
/// follows the file extension.
pub fn save_rgb8<P: AsRef<Path>>(
    pixels: &[u8],
    width: usize,
    height: usize,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    image::save_buffer(
        path,
        pixels,
        width as u32,
        height as u32,
        ExtendedColorType::Rgb8,
    )
    .map_err(|source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved {}x{} image to {:?}", width, height, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_png_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let pixels = vec![255, 0, 0, 0, 255, 0];
        save_rgb8(&pixels, 2, 1, &path).unwrap();

        let img = image::open(&path).unwrap().into_rgb8();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0]);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(
            save_rgb8(&[0, 0, 0], 1, 1, &path),
            Err(Error::ImageSave { .. })
        ));
    }
}
