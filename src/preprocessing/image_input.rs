/// Loads the grayscale source image and its region-of-interest mask

use image::{ImageError, ImageReader};
use na::DMatrix;
use std::path::Path;
use tracing::info;

use crate::{
    GrayscaleImage, Mask,
    analysis::SELECTED,
    error::{Error, Result},
};

/// Read an image from disk and reduce it to a single luma channel.
///
/// Parameters
/// - `path` - The path to the image to read
///
/// Returns
/// - A row-major (height x width) matrix of gray levels
pub fn grayscale_from_image(path: &Path) -> Result<DMatrix<u8>> {
    let not_found = |source: ImageError| Error::NotFound {
        path: path.to_path_buf(),
        source,
    };

    let image = ImageReader::open(path)
        .map_err(|err| not_found(ImageError::IoError(err)))?
        .with_guessed_format()
        .map_err(|err| not_found(ImageError::IoError(err)))?
        .decode()
        .map_err(not_found)?
        .into_luma8();

    let (nrows, ncols) = (image.height() as usize, image.width() as usize);

    Ok(DMatrix::from_fn(nrows, ncols, |r, c| {
        image.get_pixel(c as u32, r as u32).0[0]
    }))
}

/// Load the source image and mask, refusing pairs of different shapes.
///
/// Parameters
/// - `image_path` - The grayscale source image
/// - `mask_path` - The mask; pixels equal to 255 form the region of interest
pub fn load_images(image_path: &Path, mask_path: &Path) -> Result<(GrayscaleImage, Mask)> {
    let image = grayscale_from_image(image_path)?;
    let mask = grayscale_from_image(mask_path)?;

    if image.shape() != mask.shape() {
        return Err(Error::ShapeMismatch {
            image: image.shape(),
            mask: mask.shape(),
        });
    }

    let roi_pixels = mask.iter().filter(|&&m| m == SELECTED).count();
    info!(
        "Loaded {}x{} image with {} region-of-interest pixels",
        image.ncols(),
        image.nrows(),
        roi_pixels
    );

    Ok((image, mask))
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf};

    use image::{GrayImage, Luma, Rgb, RgbImage};
    use rand::Rng;

    use super::*;

    /// Unique scratch directory for a single test
    fn scratch_dir() -> PathBuf {
        let id: u64 = rand::rng().random();
        let dir = env::temp_dir().join(format!("fat-threshold-{id:016x}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_gray(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        GrayImage::from_fn(width, height, |x, y| Luma([(x * 10 + y) as u8]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_load_matching_pair() {
        let dir = scratch_dir();
        let image_path = write_gray(&dir, "image.png", 3, 2);
        let mask_path = write_gray(&dir, "mask.png", 3, 2);

        let (image, mask) = load_images(&image_path, &mask_path).unwrap();

        assert_eq!(image.shape(), (2, 3));
        assert_eq!(mask.shape(), (2, 3));
        // row = y, column = x
        assert_eq!(image[(1, 2)], 21);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_shape_mismatch() {
        let dir = scratch_dir();
        let image_path = write_gray(&dir, "image.png", 3, 2);
        let mask_path = write_gray(&dir, "mask.png", 2, 3);

        let err = load_images(&image_path, &mask_path).unwrap_err();

        assert!(matches!(
            err,
            Error::ShapeMismatch {
                image: (2, 3),
                mask: (3, 2)
            }
        ));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = scratch_dir();
        let image_path = write_gray(&dir, "image.png", 2, 2);
        let mask_path = dir.join("missing.png");

        let err = load_images(&image_path, &mask_path).unwrap_err();

        match &err {
            Error::NotFound { path, .. } => assert_eq!(path, &mask_path),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(err.to_string().contains("missing.png"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_undecodable_file() {
        let dir = scratch_dir();
        let image_path = dir.join("garbage.png");
        fs::write(&image_path, b"definitely not a png").unwrap();
        let mask_path = write_gray(&dir, "mask.png", 2, 2);

        let err = load_images(&image_path, &mask_path).unwrap_err();

        assert!(matches!(err, Error::NotFound { .. }));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_color_image_reduced_to_luma() {
        let dir = scratch_dir();
        let path = dir.join("color.png");
        RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let gray = grayscale_from_image(&path).unwrap();

        assert!(gray.iter().all(|&v| v == 255));

        fs::remove_dir_all(dir).unwrap();
    }
}
