//! Ingestion pipeline: preprocess, recognize, extract fields, store.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{IngestError, OcrError};
use crate::extract::DocumentParser;
use crate::models::document::FieldMap;
use crate::ocr::{ImagePreprocessor, TextRecognizer};
use crate::store::DocumentStore;

/// A successfully ingested image.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    /// Store-assigned id.
    pub id: i64,
    /// Input path.
    pub path: PathBuf,
    /// Fields extracted at ingestion.
    pub fields: FieldMap,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub ingested: Vec<IngestedDocument>,
    pub failed: Vec<IngestError>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.ingested.len() + self.failed.len()
    }
}

/// Runs images through preprocessing, recognition and field extraction and
/// inserts one record per image.
pub struct IngestPipeline<R, S> {
    preprocessor: ImagePreprocessor,
    recognizer: R,
    store: S,
    parser: DocumentParser,
}

impl<R: TextRecognizer, S: DocumentStore> IngestPipeline<R, S> {
    pub fn new(preprocessor: ImagePreprocessor, recognizer: R, store: S) -> Self {
        Self {
            preprocessor,
            recognizer,
            store,
            parser: DocumentParser::new(),
        }
    }

    pub fn with_parser(mut self, parser: DocumentParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Ingest a single image.
    pub fn ingest(&mut self, path: &Path) -> Result<IngestedDocument, IngestError> {
        let start = Instant::now();

        let image = self.preprocessor.preprocess(path).map_err(|e| match e {
            OcrError::InvalidImage(reason) | OcrError::Preprocessing(reason) => {
                IngestError::InputUnreadable {
                    path: path.to_path_buf(),
                    reason,
                }
            }
            other => IngestError::Recognition {
                path: path.to_path_buf(),
                source: other,
            },
        })?;

        let text = self
            .recognizer
            .recognize(&image)
            .map_err(|source| IngestError::Recognition {
                path: path.to_path_buf(),
                source,
            })?;

        if text.trim().is_empty() {
            return Err(IngestError::NoTextDetected {
                path: path.to_path_buf(),
            });
        }

        let fields = self.parser.fields(&text);
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let id = self
            .store
            .insert(&filename, &text, &fields)
            .map_err(|source| IngestError::Store {
                path: path.to_path_buf(),
                source,
            })?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Saved OCR (id={}) for {} with {} fields in {}ms",
            id,
            path.display(),
            fields.len(),
            processing_time_ms
        );

        Ok(IngestedDocument {
            id,
            path: path.to_path_buf(),
            fields,
            processing_time_ms,
        })
    }

    /// Ingest every path. A failing item is recorded and the batch moves on.
    /// `on_item` sees each outcome as it happens.
    pub fn ingest_batch<F>(&mut self, paths: &[PathBuf], mut on_item: F) -> BatchReport
    where
        F: FnMut(&Path, &Result<IngestedDocument, IngestError>),
    {
        let mut report = BatchReport::default();

        for path in paths {
            let result = self.ingest(path);
            on_item(path, &result);

            match result {
                Ok(doc) => report.ingested.push(doc),
                Err(e) => {
                    warn!("{}", e);
                    report.failed.push(e);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrResult;
    use crate::store::{DocumentSelector, SqliteStore};
    use image::{DynamicImage, GrayImage, Luma};

    /// Returns canned text per call, in order.
    struct ScriptedRecognizer {
        texts: std::cell::RefCell<Vec<&'static str>>,
    }

    impl ScriptedRecognizer {
        fn new(mut texts: Vec<&'static str>) -> Self {
            texts.reverse();
            Self {
                texts: std::cell::RefCell::new(texts),
            }
        }
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
            let mut result = OcrResult::empty(image.width(), image.height());
            result.text = self.texts.borrow_mut().pop().unwrap_or_default().to_string();
            Ok(result)
        }
    }

    fn write_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 8, Luma([200])))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_ingest_stores_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "invoice.png");

        let recognizer = ScriptedRecognizer::new(vec!["  Invoice No: 12345 \n\nContact: a@b.com"]);
        let store = SqliteStore::open_in_memory().unwrap();
        let mut pipeline = IngestPipeline::new(ImagePreprocessor::new(), recognizer, store);

        let doc = pipeline.ingest(&path).unwrap();
        assert_eq!(doc.fields.get_text("invoice_no"), Some("12345"));

        let stored = pipeline.store().fetch(DocumentSelector::Id(doc.id)).unwrap().unwrap();
        assert_eq!(stored.filename, "invoice.png");
        assert_eq!(stored.raw_text, "Invoice No: 12345\nContact: a@b.com");
        assert_eq!(stored.fields["emails"], serde_json::json!(["a@b.com"]));
    }

    #[test]
    fn test_no_text_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "blank.png");

        let recognizer = ScriptedRecognizer::new(vec!["  \n "]);
        let store = SqliteStore::open_in_memory().unwrap();
        let mut pipeline = IngestPipeline::new(ImagePreprocessor::new(), recognizer, store);

        let err = pipeline.ingest(&path).unwrap_err();
        assert!(matches!(err, IngestError::NoTextDetected { .. }));
        assert!(pipeline.store().fetch(DocumentSelector::Latest).unwrap().is_none());
    }

    #[test]
    fn test_batch_continues_after_failures() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.jpg");
        std::fs::write(&broken, b"garbage").unwrap();
        let first = write_image(dir.path(), "first.png");
        let second = write_image(dir.path(), "second.png");

        // broken.jpg never reaches the recognizer
        let recognizer = ScriptedRecognizer::new(vec!["Total: 10", "Total: 20"]);
        let store = SqliteStore::open_in_memory().unwrap();
        let mut pipeline = IngestPipeline::new(ImagePreprocessor::new(), recognizer, store);

        let mut seen = Vec::new();
        let report = pipeline.ingest_batch(&[broken.clone(), first, second], |path, result| {
            seen.push((path.to_path_buf(), result.is_ok()));
        });

        assert_eq!(report.total(), 3);
        assert_eq!(report.ingested.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0], IngestError::InputUnreadable { .. }));
        assert_eq!(report.failed[0].path(), broken.as_path());
        assert_eq!(seen.len(), 3);
        assert!(!seen[0].1);

        let latest = pipeline.into_store().fetch(DocumentSelector::Latest).unwrap().unwrap();
        assert_eq!(latest.filename, "second.png");
        assert_eq!(latest.fields["total"], serde_json::json!("20"));
    }
}
