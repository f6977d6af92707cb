//! In-process recognition through libtesseract, enabled with the `tesseract`
//! cargo feature. The default build uses [`crate::recognizer::TesseractCli`].

use crate::config::DecoderConfig;
use crate::error::{Error, ErrorKind, NoneError, Result};
use crate::recognizer::Recognizer;
use image::GrayImage;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tesseract::Tesseract;

/// Attempts to download the latest traineddata file from Github
pub fn download_tesseract_traineddata(download_path: &Path) -> Result<()> {
    // Download latest from Github
    let filename = download_path
        .file_name()
        .ok_or(NoneError)?
        .to_str()
        .ok_or(NoneError)?;
    let url = format!(
        "https://github.com/tesseract-ocr/tessdata/raw/4.00/{}",
        filename
    );
    let body = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;

    // Automatically create needed directories
    fs::create_dir_all(download_path.parent().ok_or(NoneError)?)?;

    // Write to file
    let mut file = File::create(download_path)?;
    Ok(file.write_all(body.as_ref())?)
}

/// Initialize a Tesseract instance, automatically downloading traineddata if needed
pub fn init_tesseract(datapath: Option<&str>, language: Option<&str>) -> Result<Tesseract> {
    let datapath = match datapath {
        Some(datapath) => PathBuf::from(datapath),
        None => default_datapath()?,
    };
    let datapath_str = datapath.to_string_lossy().into_owned();
    let language = language.unwrap_or("eng");
    log::debug!("[tesseract] using datapath {}", datapath_str);
    log::debug!("[tesseract] using language {}", language);

    // Check for trainedata and try downloading if needed
    let traineddata_path = datapath.join(format!("{}.traineddata", language));
    if !traineddata_path.exists() {
        log::info!(
            "[tesseract] could not find traineddata at {}",
            traineddata_path.display()
        );
        log::info!("[tesseract] downloading traineddata...");
        download_tesseract_traineddata(&traineddata_path)
            .map_err(|e| e.context("cannot download traineddata"))?;
        log::info!("[tesseract] traineddata downloaded!");
    } else {
        log::debug!("[tesseract] found traineddata");
    }

    Ok(Tesseract::new(Some(&datapath_str), Some(language))?)
}

/// Traineddata lives next to the executable unless told otherwise.
fn default_datapath() -> Result<PathBuf> {
    let current_exe = std::env::current_exe()?;
    Ok(current_exe.parent().ok_or(NoneError)?.to_path_buf())
}

/// Recognizer backed by a long-lived libtesseract handle.
///
/// The tesseract builder API consumes the handle on every call, and a failed
/// call does not hand it back; in that case the next image re-initializes it.
pub struct TesseractApi {
    datapath: Option<String>,
    language: String,
    page_seg_mode: u32,
    model: Option<Tesseract>,
}

impl TesseractApi {
    pub fn new(config: &DecoderConfig, datapath: Option<String>) -> Result<Self> {
        let model = init_tesseract(datapath.as_deref(), Some(&config.language))?;
        Ok(Self {
            datapath,
            language: config.language.clone(),
            page_seg_mode: config.page_seg_mode,
            model: Some(model),
        })
    }

    fn take_model(&mut self) -> Result<Tesseract> {
        match self.model.take() {
            Some(model) => Ok(model),
            // re-init failures are per-file
            None => init_tesseract(self.datapath.as_deref(), Some(&self.language))
                .map_err(|e| e.with_kind(ErrorKind::Recognition)),
        }
    }
}

impl Recognizer for TesseractApi {
    fn recognize(&mut self, image: &GrayImage) -> Result<String> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::recognition("banner crop is empty"));
        }

        let channels = 1;
        let width = image.width() as i32;
        let height = image.height() as i32;

        let model = self.take_model()?;
        let model = model
            .set_variable("tessedit_pageseg_mode", &self.page_seg_mode.to_string())
            .map_err(|e| Error::recognition(format!("cannot set page mode: {:?}", e)))?;
        let mut model = model
            .set_frame(image.as_raw(), width, height, channels, width * channels)?
            .set_source_resolution(96);
        let text = model.get_text()?;
        self.model = Some(model);

        log::debug!("[tesseract] extracted_text={:?}", text);
        Ok(text)
    }
}
