use crate::error::{Error, Result};
use crate::rename::RenameMode;

/// Fraction of the frame height, measured from the bottom, that holds the banner.
pub const DEFAULT_ROI_HEIGHT_FRACTION: f64 = 0.15;

/// Video frames are inspected at multiples of this index.
pub const DEFAULT_FRAME_INTERVAL: u32 = 30;

/// Frames wider than this are downscaled before cropping; Tesseract is much
/// less reliable on very large inputs.
pub const DEFAULT_MAX_FRAME_WIDTH: u32 = 2592;

/// Target width when a frame is downscaled.
pub const DEFAULT_RESIZED_WIDTH: u32 = 1280;

/// Tesseract `--psm 6`: assume a single uniform block of text.
pub const DEFAULT_PAGE_SEG_MODE: u32 = 6;

/// Everything a decoding run needs, from sampling through renaming.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct DecoderConfig {
    #[builder(default = "DEFAULT_ROI_HEIGHT_FRACTION")]
    pub roi_height_fraction: f64,

    #[builder(default = "DEFAULT_FRAME_INTERVAL")]
    pub frame_interval: u32,

    #[builder(default = "DEFAULT_MAX_FRAME_WIDTH")]
    pub max_frame_width: u32,

    #[builder(default = "DEFAULT_RESIZED_WIDTH")]
    pub resized_width: u32,

    /// Path to the FFMPEG executable (defaults to "ffmpeg" command in system PATH)
    #[builder(default = "\"ffmpeg\".into()", setter(into))]
    pub ffmpeg_exe: String,

    /// Path to the Tesseract executable (defaults to "tesseract" command in system PATH)
    #[builder(default = "\"tesseract\".into()", setter(into))]
    pub tesseract_exe: String,

    #[builder(default = "\"eng\".into()", setter(into))]
    pub language: String,

    #[builder(default = "DEFAULT_PAGE_SEG_MODE")]
    pub page_seg_mode: u32,

    /// Save the colour banner crop of every still next to the source file.
    #[builder(default = "false")]
    pub write_debug_crops: bool,

    /// Camera id used when none can be read from the banner.
    #[builder(default, setter(into, strip_option))]
    pub fallback_camera_id: Option<String>,

    #[builder(default)]
    pub mode: RenameMode,
}

impl DecoderConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(fraction) = self.roi_height_fraction {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(format!(
                    "roi_height_fraction must be in (0, 1], got {}",
                    fraction
                ));
            }
        }
        if let Some(0) = self.frame_interval {
            return Err("frame_interval must be at least 1".into());
        }
        let max = self.max_frame_width.unwrap_or(DEFAULT_MAX_FRAME_WIDTH);
        let resized = self.resized_width.unwrap_or(DEFAULT_RESIZED_WIDTH);
        if resized == 0 || resized > max {
            return Err(format!(
                "resized_width must be in 1..={}, got {}",
                max, resized
            ));
        }
        Ok(())
    }
}

impl DecoderConfig {
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::default()
    }

    /// The fallback camera id, treating an empty string as "not supplied".
    pub fn fallback_camera_id(&self) -> Option<&str> {
        self.fallback_camera_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            roi_height_fraction: DEFAULT_ROI_HEIGHT_FRACTION,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            max_frame_width: DEFAULT_MAX_FRAME_WIDTH,
            resized_width: DEFAULT_RESIZED_WIDTH,
            ffmpeg_exe: "ffmpeg".into(),
            tesseract_exe: "tesseract".into(),
            language: "eng".into(),
            page_seg_mode: DEFAULT_PAGE_SEG_MODE,
            write_debug_crops: false,
            fallback_camera_id: None,
            mode: RenameMode::default(),
        }
    }
}

impl DecoderConfigBuilder {
    /// Like `build`, but reports failures as a setup [`Error`].
    pub fn finish(&self) -> Result<DecoderConfig> {
        self.build().map_err(Error::setup)
    }
}
