//! Error handling.

use std::{error::Error as StdError, io, path::PathBuf, result::Result as StdResult};

/// Our result type.
pub type Result<T, E = Error> = StdResult<T, E>;

/// A boxed error from another library or an external program.
type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

/// An error that can occur while converting subtitles.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A bitmap's geometry does not match its pixel buffer.
    #[error("Invalid {width}x{height} bitmap with stride {stride} and {len} bytes of data")]
    #[non_exhaustive]
    InvalidBitmap {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Bytes per row.
        stride: u32,
        /// Length of the pixel buffer.
        len: usize,
    },

    /// A subtitle had a time which can't be represented as a time stamp.
    #[error("Invalid subtitle time {seconds} in {path}")]
    #[non_exhaustive]
    InvalidTime {
        /// The time, in seconds.
        seconds: f64,
        /// The file containing the time.
        path: PathBuf,
    },

    /// We could not read an input file.
    #[error("Could not read {path}")]
    #[non_exhaustive]
    ReadFile {
        /// The file we tried to read.
        path: PathBuf,
        /// The original error.
        #[source]
        source: BoxedError,
    },

    /// We could not write an output file.
    #[error("Could not write {path}")]
    #[non_exhaustive]
    WriteFile {
        /// The file we tried to write.
        path: PathBuf,
        /// The original error.
        #[source]
        source: BoxedError,
    },

    /// We could not set up a recognizer for a worker slot.  This is fatal.
    #[error("Failed to initialize OCR for worker slot {slot}")]
    #[non_exhaustive]
    RecognizerInit {
        /// The worker slot we were setting up.
        slot: usize,
        /// The original error.
        #[source]
        source: BoxedError,
    },

    /// The recognizer could not process an image.
    #[error("Text recognition failed")]
    #[non_exhaustive]
    Recognition {
        /// The original error.
        #[source]
        source: BoxedError,
    },

    /// We could not launch a worker thread.
    #[error("Could not start OCR worker for slot {slot}")]
    #[non_exhaustive]
    SpawnWorker {
        /// The worker slot we were starting.
        slot: usize,
        /// The original error.
        #[source]
        source: io::Error,
    },

    /// Every worker slot disappeared while we were waiting for one.
    #[error("OCR worker pool shut down unexpectedly")]
    #[non_exhaustive]
    PoolClosed {},

    /// An I/O error occurred writing subtitles.
    #[error("Error writing subtitles")]
    Io(#[from] io::Error),
}

impl Error {
    /// Failed to initialize the recognizer for `slot`.
    pub fn recognizer_init<E>(slot: usize, source: E) -> Self
    where
        E: Into<BoxedError>,
    {
        Error::RecognizerInit {
            slot,
            source: source.into(),
        }
    }

    /// Failed to recognize the text in an image.
    pub fn recognition<E>(source: E) -> Self
    where
        E: Into<BoxedError>,
    {
        Error::Recognition {
            source: source.into(),
        }
    }

    pub(crate) fn read_file<P, E>(path: P, source: E) -> Self
    where
        P: Into<PathBuf>,
        E: Into<BoxedError>,
    {
        Error::ReadFile {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn write_file<P, E>(path: P, source: E) -> Self
    where
        P: Into<PathBuf>,
        E: Into<BoxedError>,
    {
        Error::WriteFile {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Format an error along with all of its causes, for use in log messages.
pub(crate) fn display_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
