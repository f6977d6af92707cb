//! Reads the date/time banner burned into the bottom of camera-trap photos
//! and videos, and renames each file after it:
//! `YYYY-MM-DD_HHMMSS_CAMERA-ID_ORIGINAL-NAME`.
//!
//! Pipeline, one file at a time:
//!
//! media -> [`sampler`] -> [`region`] -> [`recognizer`] -> [`banner`] -> [`rename`]

#[macro_use]
extern crate derive_builder;
#[macro_use]
extern crate lazy_static;

pub mod banner;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod logging;
pub mod media;
pub mod pipeline;
pub mod recognizer;
pub mod region;
pub mod rename;
pub mod sampler;
#[cfg(feature = "tesseract")]
pub mod tesseract;
pub mod util;

#[cfg(test)]
mod tests;
