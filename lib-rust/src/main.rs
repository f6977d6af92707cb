use camtrap_banner::{
    config::DecoderConfig,
    error::Result,
    logging::init_logging,
    pipeline::{report_line, run_batch, SEPARATOR},
    recognizer::{Recognizer, TesseractCli},
    rename::RenameMode,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Extract and rename picture and video files with date/time extracted from banner
#[derive(Parser, Debug)]
#[command(name = "camtrap-banner", version, about)]
struct Args {
    /// Directory with media files (.avi, .mp4, .jpg, .jpeg)
    #[arg(short, long = "directory")]
    directory: PathBuf,

    /// Camera id to use when none can be read from the banner
    #[arg(long = "cam-id")]
    cam_id: Option<String>,

    /// Rename files (default is to only show the new names)
    #[arg(long)]
    rename: bool,

    /// Verbose logging; also saves the banner crop of each picture
    #[arg(long)]
    debug: bool,

    /// Fraction of the frame height, from the bottom, holding the banner
    #[arg(long = "roi", default_value_t = camtrap_banner::config::DEFAULT_ROI_HEIGHT_FRACTION)]
    roi_height_fraction: f64,

    /// ffmpeg executable used to decode videos
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: String,

    /// tesseract executable used for text recognition
    #[arg(long, default_value = "tesseract")]
    tesseract: String,

    /// Tesseract language
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Use the linked libtesseract instead of the executable, loading
    /// traineddata from this directory
    #[cfg(feature = "tesseract")]
    #[arg(long = "tessdata")]
    tessdata: Option<String>,
}

impl Args {
    fn config(&self) -> Result<DecoderConfig> {
        let mut builder = DecoderConfig::builder();
        builder
            .roi_height_fraction(self.roi_height_fraction)
            .ffmpeg_exe(self.ffmpeg.as_str())
            .tesseract_exe(self.tesseract.as_str())
            .language(self.lang.as_str())
            .write_debug_crops(self.debug)
            .mode(if self.rename {
                RenameMode::Execute
            } else {
                RenameMode::DryRun
            });
        if let Some(cam_id) = &self.cam_id {
            builder.fallback_camera_id(cam_id.as_str());
        }
        builder.finish()
    }

    #[cfg(feature = "tesseract")]
    fn recognizer(&self, config: &DecoderConfig) -> Result<Box<dyn Recognizer>> {
        if let Some(tessdata) = &self.tessdata {
            let api = camtrap_banner::tesseract::TesseractApi::new(config, Some(tessdata.clone()))?;
            return Ok(Box::new(api));
        }
        cli_recognizer(config)
    }

    #[cfg(not(feature = "tesseract"))]
    fn recognizer(&self, config: &DecoderConfig) -> Result<Box<dyn Recognizer>> {
        cli_recognizer(config)
    }
}

fn cli_recognizer(config: &DecoderConfig) -> Result<Box<dyn Recognizer>> {
    let cli = TesseractCli::new(config);
    cli.check()?;
    Ok(Box::new(cli))
}

fn run(args: &Args) -> Result<()> {
    let config = args.config()?;
    log::debug!("[main] {:?}", config);

    let mut recognizer = args.recognizer(&config)?;

    run_batch(&args.directory, &config, &mut recognizer, |result| {
        println!("{}", report_line(result));
        println!("{}", SEPARATOR);
    })?;

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.message);
            ExitCode::FAILURE
        }
    }
}
