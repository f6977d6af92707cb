use crate::config::DecoderConfig;
use crate::error::{Error, Result};
use crate::ffmpeg::VideoDecoder;
use crate::media::{MediaFile, MediaKind};
use image::RgbImage;

/// A single decoded colour image, either a whole still or one video frame.
pub type Frame = RgbImage;

/// Produces the one frame banner decoding will run on.
///
/// - Stills are loaded whole.
/// - Videos are decoded from frame 0 and the first frame whose index is a
///   multiple of `config.frame_interval` is kept. Only that one frame is ever
///   inspected; a video whose banner is unreadable there yields no record.
pub fn sample(media: &MediaFile, config: &DecoderConfig) -> Result<Frame> {
    match media.kind {
        MediaKind::Still => load_still(media),
        MediaKind::Video => sample_video(media, config),
    }
}

fn load_still(media: &MediaFile) -> Result<Frame> {
    let image = image::open(&media.path).map_err(|e| {
        Error::decode(format!(
            "ImageLoadError: unable to load {}: {}",
            media.path.display(),
            e
        ))
    })?;
    let frame = image.to_rgb8();
    let (width, height) = frame.dimensions();
    log::debug!("[sampler] loaded still {}x{}", width, height);
    Ok(frame)
}

fn sample_video(media: &MediaFile, config: &DecoderConfig) -> Result<Frame> {
    let mut decoder = VideoDecoder::open(&media.path, &config.ffmpeg_exe)?;

    let mut failure = None;
    let frames = std::iter::from_fn(|| match decoder.read_next() {
        Ok(frame) => frame,
        Err(e) => {
            failure = Some(e);
            None
        }
    });
    let picked = select_sample(frames, config.frame_interval);

    let frames_read = decoder.frames_read();
    let ffmpeg_error = decoder.last_error().map(str::to_string);
    decoder.release();

    if let Some(e) = failure {
        return Err(e);
    }

    match picked {
        Some((index, frame)) => {
            log::debug!(
                "[sampler] picked frame {} ({}x{})",
                index,
                frame.width(),
                frame.height()
            );
            Ok(frame)
        }
        None => Err(Error::decode(match ffmpeg_error {
            Some(message) => format!(
                "NoFrameDecoded after {} frame(s): {}",
                frames_read, message
            ),
            None => format!("NoFrameDecoded after {} frame(s)", frames_read),
        })),
    }
}

/// Returns the first item (and its index) whose index is a multiple of
/// `interval`. Consumes the iterator only up to that item.
///
/// An `interval` of 0 is treated as 1.
pub fn select_sample<I>(frames: I, interval: u32) -> Option<(usize, I::Item)>
where
    I: IntoIterator,
{
    let interval = interval.max(1) as usize;
    frames
        .into_iter()
        .enumerate()
        .find(|(index, _)| index % interval == 0)
}
