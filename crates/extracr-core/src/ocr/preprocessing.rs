//! Image preprocessing for OCR.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::PreprocessConfig;

/// Image preprocessor for the OCR pipeline: grayscale, smoothing, adaptive
/// threshold and upscaling.
pub struct ImagePreprocessor {
    /// Gaussian blur sigma (0 disables).
    blur_sigma: f32,
    /// Adaptive threshold neighbourhood size.
    block_size: u32,
    /// Constant subtracted from the local mean.
    offset: i32,
    /// Final upscale factor.
    scale: f32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::from_config(&PreprocessConfig::default())
    }

    pub fn from_config(config: &PreprocessConfig) -> Self {
        Self {
            blur_sigma: config.blur_sigma,
            block_size: config.threshold_block_size.max(3) | 1,
            offset: config.threshold_offset,
            scale: config.scale,
        }
    }

    /// Set the upscale factor.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Decode an image file and prepare it for recognition.
    pub fn preprocess(&self, path: &Path) -> Result<DynamicImage, OcrError> {
        let image = image::open(path)
            .map_err(|e| OcrError::InvalidImage(format!("{}: {}", path.display(), e)))?;
        self.enhance(&image)
    }

    /// Binarize and upscale an already decoded image.
    pub fn enhance(&self, image: &DynamicImage) -> Result<DynamicImage, OcrError> {
        let mut gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::Preprocessing("image has no pixels".to_string()));
        }
        debug!("Preprocessing {}x{} image", width, height);

        if self.blur_sigma > 0.0 {
            gray = image::imageops::blur(&gray, self.blur_sigma);
        }

        let binary = self.adaptive_threshold(&gray);

        let (new_width, new_height) = self.scaled_dimensions(width, height);
        if (new_width, new_height) == (width, height) {
            return Ok(DynamicImage::ImageLuma8(binary));
        }

        let resized = image::imageops::resize(&binary, new_width, new_height, FilterType::CatmullRom);
        Ok(DynamicImage::ImageLuma8(resized))
    }

    fn scaled_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.scale <= 0.0 {
            return (width, height);
        }
        let new_width = (width as f32 * self.scale).round() as u32;
        let new_height = (height as f32 * self.scale).round() as u32;
        (new_width.max(1), new_height.max(1))
    }

    /// Mean-based adaptive threshold over a `block_size` neighbourhood, using a
    /// summed-area table so the cost does not depend on the block size.
    fn adaptive_threshold(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let (w, h) = (width as usize, height as usize);

        let mut integral = vec![0u64; (w + 1) * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0u64;
            for x in 0..w {
                row_sum += image.get_pixel(x as u32, y as u32)[0] as u64;
                integral[(y + 1) * (w + 1) + x + 1] = integral[y * (w + 1) + x + 1] + row_sum;
            }
        }

        let half_block = (self.block_size / 2) as usize;
        let mut result = GrayImage::new(width, height);

        for y in 0..h {
            let y0 = y.saturating_sub(half_block);
            let y1 = (y + half_block + 1).min(h);
            for x in 0..w {
                let x0 = x.saturating_sub(half_block);
                let x1 = (x + half_block + 1).min(w);

                let sum = integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
                    - integral[y0 * (w + 1) + x1]
                    - integral[y1 * (w + 1) + x0];
                let count = ((y1 - y0) * (x1 - x0)) as u64;

                let threshold = (sum / count) as i32 - self.offset;
                let pixel_value = image.get_pixel(x as u32, y as u32)[0] as i32;

                let output = if pixel_value > threshold { 255 } else { 0 };
                result.put_pixel(x as u32, y as u32, Luma([output]));
            }
        }

        result
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}
