use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::types::OcrEngine;
use super::ExtractionError;

/// Tesseract driven through its command-line binary.
///
/// Each call writes the image to a temporary file and reads the recognised
/// text from stdout, the same contract `pytesseract`-style wrappers use.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
    lang: String,
    /// Page segmentation mode (`--psm`), engine default when `None`.
    psm: Option<u8>,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractCli {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            lang: "eng".to_string(),
            psm: None,
            tessdata_dir: None,
        }
    }

    /// Set language(s) for OCR (e.g., "eng", "eng+hin")
    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }

    pub fn with_psm(mut self, psm: Option<u8>) -> Self {
        self.psm = psm;
        self
    }

    pub fn with_tessdata_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.tessdata_dir = dir;
        self
    }

    /// Run `tesseract --version` to confirm the binary can be launched.
    pub fn version(&self) -> Result<String, ExtractionError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .map_err(|e| self.spawn_error(e))?;
        // Older releases print the version banner on stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn build_args(&self, image_path: &Path) -> Vec<String> {
        let mut args = vec![
            image_path.to_string_lossy().into_owned(),
            "stdout".to_string(),
            "-l".to_string(),
            self.lang.clone(),
        ];
        if let Some(psm) = self.psm {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        if let Some(dir) = &self.tessdata_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.to_string_lossy().into_owned());
        }
        args
    }

    fn spawn_error(&self, err: std::io::Error) -> ExtractionError {
        match err.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                tracing::error!(
                    command = %self.command.display(),
                    error = %err,
                    "Tesseract is not installed or not in PATH"
                );
                ExtractionError::EngineNotAvailable(format!(
                    "cannot run '{}': {err}",
                    self.command.display()
                ))
            }
            _ => ExtractionError::Io(err),
        }
    }
}

impl OcrEngine for TesseractCli {
    fn recognize_text(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut image_file = tempfile::Builder::new().prefix("rxscan-ocr-").tempfile()?;
        image_file.write_all(image_bytes)?;
        image_file.flush()?;

        let args = self.build_args(image_file.path());
        tracing::debug!(command = %self.command.display(), ?args, "Running Tesseract");

        let output = Command::new(&self.command)
            .args(&args)
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(classify_failure(&stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// Missing language data is a configuration problem, anything else is
/// specific to the image.
fn classify_failure(stderr: &str) -> ExtractionError {
    let lowered = stderr.to_lowercase();
    if lowered.contains("failed loading language")
        || lowered.contains("error opening data file")
        || lowered.contains("could not initialize tesseract")
    {
        ExtractionError::EngineNotAvailable(stderr.to_string())
    } else {
        ExtractionError::OcrProcessing(stderr.to_string())
    }
}

/// What a [`MockOcrEngine`] does when called.
#[derive(Debug, Clone)]
enum MockOutcome {
    Text(String),
    Unavailable,
    Fails(String),
}

/// Mock OCR engine for unit testing without Tesseract.
#[derive(Debug, Clone)]
pub struct MockOcrEngine {
    outcome: MockOutcome,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            outcome: MockOutcome::Text(text.to_string()),
        }
    }

    /// Behaves like an uninstalled engine.
    pub fn unavailable() -> Self {
        Self {
            outcome: MockOutcome::Unavailable,
        }
    }

    /// Fails every image with a processing error.
    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: MockOutcome::Fails(reason.to_string()),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize_text(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        match &self.outcome {
            MockOutcome::Text(text) => Ok(text.clone()),
            MockOutcome::Unavailable => Err(ExtractionError::EngineNotAvailable(
                "mock engine not installed".into(),
            )),
            MockOutcome::Fails(reason) => Err(ExtractionError::OcrProcessing(reason.clone())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
