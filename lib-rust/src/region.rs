use crate::config::DecoderConfig;
use crate::error::{Error, Result};
use crate::sampler::Frame;
use image::imageops::{self, FilterType};
use image::GrayImage;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Extension of the debug crop written next to a still. Must never be one of
/// the media extensions.
pub const DEBUG_CROP_SUFFIX: &str = "banner.png";

/// Defines a rectangle within a frame
/// - Units are pixels
/// - Origin is top-left (0, 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The rows covering the bottom `fraction` of a `width`x`height` frame.
pub fn banner_rect(width: u32, height: u32, fraction: f64) -> Rect {
    let roi_height = ((height as f64 * fraction) as u32).min(height);
    Rect {
        x: 0,
        y: height - roi_height,
        width,
        height: roi_height,
    }
}

/// Dimensions after the mandatory downscale of oversized frames, or `None`
/// when the frame is small enough to crop as-is.
pub fn downscaled_size(width: u32, height: u32, config: &DecoderConfig) -> Option<(u32, u32)> {
    if width <= config.max_frame_width {
        return None;
    }
    let aspect_ratio = height as f64 / width as f64;
    let new_height = (config.resized_width as f64 * aspect_ratio) as u32;
    Some((config.resized_width, new_height.max(1)))
}

/// The frame the banner is cropped from: the input itself, or a copy resized
/// to `config.resized_width` (keeping aspect ratio) when it is wider than
/// `config.max_frame_width`.
pub fn working_frame<'a>(frame: &'a Frame, config: &DecoderConfig) -> Cow<'a, Frame> {
    let (width, height) = frame.dimensions();
    log::debug!("[region] image original dimension: {}x{}", width, height);

    match downscaled_size(width, height, config) {
        Some((new_width, new_height)) => {
            log::debug!(
                "[region] image resized dimension: {}x{}",
                new_width,
                new_height
            );
            Cow::Owned(imageops::resize(
                frame,
                new_width,
                new_height,
                FilterType::Triangle,
            ))
        }
        None => Cow::Borrowed(frame),
    }
}

/// Crops the banner strip and converts it to grayscale for the recognizer.
///
/// When `debug_path` is given, the colour crop is saved there first.
pub fn extract_region(
    frame: &Frame,
    config: &DecoderConfig,
    debug_path: Option<&Path>,
) -> Result<GrayImage> {
    let working = working_frame(frame, config);
    let rect = banner_rect(
        working.width(),
        working.height(),
        config.roi_height_fraction,
    );
    log::debug!("[region] banner crop: {:?}", rect);
    if rect.width == 0 || rect.height == 0 {
        return Err(Error::decode(format!(
            "banner crop is empty for a {}x{} frame",
            working.width(),
            working.height()
        )));
    }

    let roi = imageops::crop_imm(&*working, rect.x, rect.y, rect.width, rect.height);
    let roi = roi.to_image();

    if let Some(path) = debug_path {
        roi.save(path).map_err(|e| {
            Error::from_std(crate::error::ErrorKind::Io, e)
                .context(format!("cannot write debug crop {}", path.display()))
        })?;
        log::debug!("[region] debug crop saved to {}", path.display());
    }

    Ok(imageops::grayscale(&roi))
}

/// Where the debug crop for a still is written: `<dir>/<stem>.banner.png`.
pub fn debug_crop_path(media_path: &Path) -> PathBuf {
    let stem = media_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    media_path.with_file_name(format!("{}.{}", stem, DEBUG_CROP_SUFFIX))
}
