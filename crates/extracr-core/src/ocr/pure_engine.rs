//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{join_lines, OcrResult, TextBox, TextRecognizer};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in the configuration.
    pub fn from_config(config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = config.detection_path();
        let rec_path = config.recognition_path();
        let dict_path = config.dictionary_path();

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self { engine, config })
    }
}

impl TextRecognizer for PureOcrEngine {
    fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!("Recognizing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                TextBox {
                    bbox: polygon_to_bbox(&r.bounding_box),
                    text,
                    confidence: r.confidence,
                }
            })
            .collect();

        let text = join_lines(&boxes, self.config.row_tolerance);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "OCR complete: {} text boxes in {}ms",
            boxes.len(),
            processing_time_ms
        );

        Ok(OcrResult {
            boxes,
            text,
            processing_time_ms,
            image_size: (width, height),
        })
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
