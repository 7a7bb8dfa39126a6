//! Image preprocessing and text recognition.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::extract::rules::split_lines;

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f32, f32) {
        let x = (self.bbox[0] + self.bbox[2] + self.bbox[4] + self.bbox[6]) / 4.0;
        let y = (self.bbox[1] + self.bbox[3] + self.bbox[5] + self.bbox[7]) / 4.0;
        (x, y)
    }

    /// Get the height of the axis-aligned bounding rectangle.
    pub fn height(&self) -> f32 {
        let (_, min_y, _, max_y) = self.rect();
        max_y - min_y
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Detected and recognized text boxes.
    pub boxes: Vec<TextBox>,

    /// Full text as one uniform block, one line per visual row.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Create an empty result.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            text: String::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        }
    }
}

/// A text recognition engine.
pub trait TextRecognizer {
    /// Recognize text boxes in a preprocessed image.
    fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;

    /// Recognize an image and return its normalized text block.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        Ok(normalize_recognized_text(&self.process(image)?.text))
    }
}

/// Trim every line and drop the empty ones.
pub fn normalize_recognized_text(text: &str) -> String {
    split_lines(text)
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join boxes into reading-order text, one line per visual row.
///
/// A box joins the current row when its vertical center lies within
/// `tolerance` times the median box height of the row's first box. Rows are
/// ordered left to right and joined with single spaces.
pub fn join_lines(boxes: &[TextBox], tolerance: f32) -> String {
    if boxes.is_empty() {
        return String::new();
    }

    let mut heights: Vec<f32> = boxes.iter().map(TextBox::height).collect();
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let max_gap = (heights[heights.len() / 2] * tolerance).max(1.0);

    let mut ordered: Vec<&TextBox> = boxes.iter().collect();
    ordered.sort_by(|a, b| {
        a.center()
            .1
            .partial_cmp(&b.center().1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut rows: Vec<Vec<&TextBox>> = Vec::new();
    for b in ordered {
        match rows.last_mut() {
            Some(row) if (b.center().1 - row[0].center().1).abs() <= max_gap => row.push(b),
            _ => rows.push(vec![b]),
        }
    }

    rows.into_iter()
        .map(|mut row| {
            row.sort_by(|a, b| {
                a.rect()
                    .0
                    .partial_cmp(&b.rect().0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            row.iter()
                .map(|b| b.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
