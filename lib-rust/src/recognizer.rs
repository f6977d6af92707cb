use crate::config::DecoderConfig;
use crate::error::{Error, Result};
use crate::util::command_to_string;
use image::GrayImage;
use std::process::Command;
use tempfile::NamedTempFile;

/// Turns a grayscale banner crop into raw, possibly multi-line text.
///
/// Implementations are free to fail; a failure only skips the file being
/// processed.
pub trait Recognizer {
    fn recognize(&mut self, image: &GrayImage) -> Result<String>;
}

impl<R: Recognizer + ?Sized> Recognizer for Box<R> {
    fn recognize(&mut self, image: &GrayImage) -> Result<String> {
        (**self).recognize(image)
    }
}

/// Runs the `tesseract` executable once per image.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    pub exe: String,
    pub language: String,
    pub page_seg_mode: u32,
}

impl TesseractCli {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            exe: config.tesseract_exe.clone(),
            language: config.language.clone(),
            page_seg_mode: config.page_seg_mode,
        }
    }

    /// Verifies the executable can be started, returning its version line.
    pub fn check(&self) -> Result<String> {
        let output = Command::new(&self.exe)
            .arg("--version")
            .output()
            .map_err(|e| {
                Error::setup(format!(
                    "tesseract not found ({}): {}. See https://github.com/tesseract-ocr/tesseract",
                    self.exe, e
                ))
            })?;

        // Older releases print the version on stderr
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        let version = text.lines().next().unwrap_or_default().trim().to_string();
        log::info!("[tesseract] using {}", version);
        Ok(version)
    }

    fn command(&self, input: &std::path::Path) -> Command {
        let mut cmd = Command::new(&self.exe);
        cmd.arg(input)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_seg_mode.to_string());
        cmd
    }
}

impl Recognizer for TesseractCli {
    fn recognize(&mut self, image: &GrayImage) -> Result<String> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::recognition("banner crop is empty"));
        }

        let input = NamedTempFile::with_suffix(".png")?;
        image
            .save(input.path())
            .map_err(|e| Error::recognition(format!("cannot stage image for tesseract: {}", e)))?;

        let mut cmd = self.command(input.path());
        log::trace!("[tesseract] command:\n{}", command_to_string(&cmd));

        let output = cmd
            .output()
            .map_err(|e| Error::recognition(format!("cannot run {}: {}", self.exe, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::recognition(format!(
                "Tesseract failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        log::debug!("[tesseract] extracted_text={:?}", text);
        Ok(text)
    }
}
