//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ExtractionError;
use crate::models::document::ROW_LABEL_KEY;

/// Environment variable overriding [`StoreConfig::database_path`].
pub const DATABASE_ENV: &str = "EXTRACR_DATABASE";

/// Environment variable overriding [`OcrConfig::model_dir`].
pub const MODEL_DIR_ENV: &str = "EXTRACR_MODEL_DIR";

/// Main configuration for the extracr pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtracrConfig {
    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Image preprocessing configuration.
    pub preprocess: PreprocessConfig,

    /// Document store configuration.
    pub store: StoreConfig,

    /// Balance sheet parsing configuration.
    pub balance_sheet: BalanceSheetConfig,

    /// Batch ingestion configuration.
    pub ingest: IngestConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` markers emitted for characters outside the dictionary.
    pub keep_unk: bool,

    /// Fraction of the median box height within which boxes share a line.
    pub row_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
            row_tolerance: 0.5,
        }
    }
}

impl OcrConfig {
    pub fn detection_path(&self) -> PathBuf {
        self.model_dir.join(&self.detection_model)
    }

    pub fn recognition_path(&self) -> PathBuf {
        self.model_dir.join(&self.recognition_model)
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.model_dir.join(&self.dictionary)
    }
}

/// Image preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Gaussian blur sigma applied before thresholding (0 disables).
    pub blur_sigma: f32,

    /// Neighbourhood size for adaptive thresholding (odd).
    pub threshold_block_size: u32,

    /// Constant subtracted from the local mean.
    pub threshold_offset: i32,

    /// Upscale factor applied after binarization.
    pub scale: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            threshold_block_size: 31,
            threshold_offset: 2,
            scale: 1.25,
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("extracr.db"),
        }
    }
}

/// Balance sheet parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceSheetConfig {
    /// Period identifiers, most recent first.
    pub periods: [String; 2],
}

impl Default for BalanceSheetConfig {
    fn default() -> Self {
        Self {
            periods: ["2022".to_string(), "2021".to_string()],
        }
    }
}

impl BalanceSheetConfig {
    pub fn validate(&self) -> Result<(), ExtractionError> {
        validate_periods(&self.periods)
    }
}

/// Periods become row keys next to `label`, so they must be non-empty,
/// distinct and not `label`.
pub fn validate_periods(periods: &[String; 2]) -> Result<(), ExtractionError> {
    let invalid = |reason: &str| ExtractionError::InvalidPeriods {
        periods: periods.clone(),
        reason: reason.to_string(),
    };

    if periods.iter().any(|p| p.trim().is_empty()) {
        return Err(invalid("period identifiers must not be empty"));
    }
    if periods[0] == periods[1] {
        return Err(invalid("period identifiers must differ"));
    }
    if periods.iter().any(|p| p == ROW_LABEL_KEY) {
        return Err(invalid("\"label\" is reserved for the row caption"));
    }
    Ok(())
}

/// Batch ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Image extensions picked up when scanning directories.
    pub extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: ["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl IngestConfig {
    /// Whether a path carries one of the configured image extensions.
    pub fn accepts(&self, path: &std::path::Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
    }
}

impl ExtracrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check settings that deserialize but cannot be used.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        self.balance_sheet.validate()
    }

    /// Apply `EXTRACR_DATABASE` / `EXTRACR_MODEL_DIR` overrides.
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(
            std::env::var_os(DATABASE_ENV).map(PathBuf::from),
            std::env::var_os(MODEL_DIR_ENV).map(PathBuf::from),
        );
        self
    }

    fn apply_overrides(&mut self, database: Option<PathBuf>, model_dir: Option<PathBuf>) {
        if let Some(path) = database {
            self.store.database_path = path;
        }
        if let Some(dir) = model_dir {
            self.ocr.model_dir = dir;
        }
    }
}
