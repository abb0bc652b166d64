use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use ndarray::Array4;

use crate::category::Category;

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decodes an uploaded file. Only JPEG and PNG are accepted, for every
/// category.
pub fn decode_upload(bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
    let format = image::guess_format(bytes)
        .map_err(|_| PreprocessError::UnsupportedFormat("unrecognised file".to_string()))?;

    match format {
        ImageFormat::Jpeg | ImageFormat::Png => {}
        other => return Err(PreprocessError::UnsupportedFormat(format!("{:?}", other))),
    }

    Ok(image::load_from_memory_with_format(bytes, format)?)
}

/// Turns a decoded image into the `(1, H, W, 3)` tensor the category's model
/// takes: exact resize to the category resolution, RGB, values in `[0, 1]`.
pub fn preprocess(image: &DynamicImage, category: Category) -> Array4<f32> {
    let size = category.resolution();

    let resized = if image.dimensions() == (size, size) {
        image.to_rgb8()
    } else {
        image.resize_exact(size, size, FilterType::CatmullRom).to_rgb8()
    };

    let side = size as usize;
    Array4::from_shape_fn((1, side, side, 3), |(_, y, x, c)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    })
}
