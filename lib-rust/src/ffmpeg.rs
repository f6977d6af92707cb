use crate::error::{Error, Result};
use crate::sampler::Frame;
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, OutputVideoFrame};
use ffmpeg_sidecar::iter::FfmpegIterator;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// A sequential frame stream from one video file, backed by an ffmpeg
/// child process.
///
/// The child is killed and reaped by [`VideoDecoder::release`], which also
/// runs on drop. Breaking out of a read loop early, returning an error, or
/// finishing the stream all release the process before the next file is
/// opened.
pub struct VideoDecoder {
    path: PathBuf,
    child: Option<FfmpegChild>,
    events: Option<FfmpegIterator>,
    frames_read: u64,
    last_error: Option<String>,
}

impl VideoDecoder {
    /// Spawns ffmpeg on `path`, producing raw `rgb24` frames on stdout.
    ///
    /// Equivalent to:
    ///
    /// ```sh
    /// ffmpeg -hide_banner -i "clip.mp4" -f rawvideo -pix_fmt rgb24 -
    /// ```
    pub fn open(path: &Path, ffmpeg_exe: &str) -> Result<Self> {
        let input = path.to_string_lossy();
        log::debug!("[ffmpeg] exe: {}", ffmpeg_exe);
        log::debug!("[ffmpeg] input: {}", input);

        let mut child = FfmpegCommand::new_with_path(ffmpeg_exe)
            .hide_banner()
            .input(&*input)
            .rawvideo()
            .spawn()
            .map_err(|e| Error::decode(format!("cannot spawn {}: {}", ffmpeg_exe, e)))?;

        let events = match child.iter() {
            Ok(events) => events,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::decode(format!("cannot read ffmpeg output: {}", e)));
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            child: Some(child),
            events: Some(events),
            frames_read: 0,
            last_error: None,
        })
    }

    /// Decodes the next frame, or `Ok(None)` at end of stream.
    pub fn read_next(&mut self) -> Result<Option<Frame>> {
        let events = match self.events.as_mut() {
            Some(events) => events,
            None => return Ok(None),
        };

        for event in events {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    self.frames_read += 1;
                    return frame_from_output(frame).map(Some);
                }
                FfmpegEvent::Error(message) => {
                    log::debug!("[ffmpeg] {}", message);
                    self.last_error = Some(message);
                }
                FfmpegEvent::Log(_, line) => log::trace!("[ffmpeg] {}", line),
                _ => {}
            }
        }

        log::debug!(
            "[ffmpeg] end of stream after {} frame(s): {}",
            self.frames_read,
            self.path.display()
        );
        self.events = None;
        Ok(None)
    }

    /// Number of frames handed out so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// The last error ffmpeg reported on stderr, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Stops ffmpeg and waits for it to exit. Safe to call more than once.
    pub fn release(&mut self) {
        self.events = None;
        if let Some(mut child) = self.child.take() {
            // ffmpeg may already have exited at end of stream
            let _ = child.kill();
            match child.wait() {
                Ok(status) => log::debug!(
                    "[ffmpeg] released {} ({})",
                    self.path.display(),
                    status
                ),
                Err(e) => log::warn!(
                    "[ffmpeg] could not reap decoder for {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
    }

    pub fn is_released(&self) -> bool {
        self.child.is_none()
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        self.release();
    }
}

/// Converts a raw ffmpeg output frame into an RGB image.
pub fn frame_from_output(frame: OutputVideoFrame) -> Result<Frame> {
    let data = match frame.pix_fmt.as_str() {
        "rgb24" => frame.data,
        "rgba" | "rgb32" => rgba32_to_rgb24(&frame.data),
        other => {
            return Err(Error::decode(format!(
                "unsupported pixel format from ffmpeg: {}",
                other
            )))
        }
    };
    RgbImage::from_raw(frame.width, frame.height, data).ok_or_else(|| {
        Error::decode(format!(
            "ffmpeg frame buffer does not match {}x{}",
            frame.width, frame.height
        ))
    })
}

/// Drops the alpha channel of a packed RGBA buffer.
pub fn rgba32_to_rgb24(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() * 3 / 4);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}
