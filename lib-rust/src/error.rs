use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failure, used by the batch driver to decide
/// whether to skip one file or abort the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecoverable before any file is processed (missing input directory,
    /// recognizer not installed, invalid configuration).
    Setup,
    /// The media file could not be opened or decoded.
    Decode,
    /// The text recognizer failed or returned unusable output.
    Recognition,
    /// The rename target is already occupied.
    RenameCollision,
    Io,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Setup => "setup error",
            ErrorKind::Decode => "decode error",
            ErrorKind::Recognition => "recognition error",
            ErrorKind::RenameCollision => "rename collision",
            ErrorKind::Io => "io error",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl Error {
    /// Wrap any standard Error into a library Error.
    /// Similar to [`anyhow`](https://github.com/dtolnay/anyhow/blob/master/src/error.rs#L88).
    pub fn from_std<E>(kind: ErrorKind, e: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error {
            kind,
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }

    /// Wrap any Display into a library Error.
    pub fn from_display<E>(kind: ErrorKind, e: E) -> Self
    where
        E: Display,
    {
        Error {
            kind,
            message: e.to_string(),
            source: None,
        }
    }

    pub fn setup(message: impl Display) -> Self {
        Error::from_display(ErrorKind::Setup, message)
    }

    pub fn decode(message: impl Display) -> Self {
        Error::from_display(ErrorKind::Decode, message)
    }

    pub fn recognition(message: impl Display) -> Self {
        Error::from_display(ErrorKind::Recognition, message)
    }

    pub fn rename_collision(message: impl Display) -> Self {
        Error::from_display(ErrorKind::RenameCollision, message)
    }

    /// Attach the same kind and a new message, keeping the original error as
    /// the source.
    pub fn context(self, message: impl Display) -> Self {
        Error {
            kind: self.kind,
            message: format!("{}: {}", message, self.message),
            source: Some(Box::new(self)),
        }
    }

    /// Same error, reclassified.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Only setup failures are allowed to stop a batch.
    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Setup
    }
}

/// Represents an attempt to unwrap a None value from an Option.
///
/// ```rs
/// let value = Some(x).ok_or(NoneError)?;
/// ```
#[derive(Debug)]
pub struct NoneError;
impl Display for NoneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "called unwrap() on None")
    }
}
impl std::error::Error for NoneError {}

impl From<NoneError> for Error {
    fn from(e: NoneError) -> Self {
        Error::from_std(ErrorKind::Io, e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::from_std(ErrorKind::Io, e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::from_std(ErrorKind::Decode, e)
    }
}

#[cfg(feature = "tesseract")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::from_std(ErrorKind::Setup, e)
    }
}

#[cfg(feature = "tesseract")]
impl From<tesseract::InitializeError> for Error {
    fn from(e: tesseract::InitializeError) -> Self {
        Error::from_std(ErrorKind::Setup, e)
    }
}

#[cfg(feature = "tesseract")]
impl From<tesseract::plumbing::TessBaseApiSetImageSafetyError> for Error {
    fn from(e: tesseract::plumbing::TessBaseApiSetImageSafetyError) -> Self {
        Error::from_std(ErrorKind::Recognition, e)
    }
}

#[cfg(feature = "tesseract")]
impl From<tesseract::plumbing::TessBaseApiGetUtf8TextError> for Error {
    fn from(e: tesseract::plumbing::TessBaseApiGetUtf8TextError) -> Self {
        Error::from_std(ErrorKind::Recognition, e)
    }
}
