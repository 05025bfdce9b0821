//! This crate converts bitmap subtitles into `*.srt` text subtitles using
//! OCR.  Each subtitle image is handed to an external recognizer (normally
//! the `tesseract` command-line tool), and the recognized text is written
//! out with the subtitle's original timing.
//!
//! ## Example code
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufWriter;
//! use subtitles2srt::{convert, ImageDirSource, OcrConfig, TesseractConfig, TesseractFactory};
//!
//! let source = ImageDirSource::open("movie_subtitles").unwrap();
//! let factory = TesseractFactory::new(TesseractConfig::default());
//! let out = BufWriter::new(File::create("movie.srt").unwrap());
//! let stats = convert(source, factory, OcrConfig::default(), out).unwrap();
//! println!("Converted {} subtitles", stats.accepted);
//! ```
//!
//! ## How it works
//!
//! OCR is slow, so we run several recognizers at once.  Each worker slot
//! owns one initialized recognizer, and at most `max_threads` slots exist.
//! Subtitles are accepted strictly in order and numbered as they arrive,
//! but recognition may finish in any order.  Once every worker has
//! finished, we sort the results back into order and repair any missing
//! end times using the start time of the following subtitle.
//!
//! Recognizers expect dark text on a light background, and subtitle
//! images are usually the opposite, so every image is inverted (with a
//! hard threshold) before recognition.

#![warn(missing_docs)]

mod aggregate;
mod bitmap;
mod config;
mod dispatch;
mod errors;
pub mod lang;
mod pipeline;
mod pool;
mod recognizer;
mod source;
mod srt;
mod tesseract;
#[cfg(test)]
mod test_util;
mod time;

pub use self::aggregate::{RecognitionResult, ResultAggregator};
pub use self::bitmap::{dump_pgm, dump_pgm_path, Bitmap};
pub use self::config::{max_threads_or_default, OcrConfig};
pub use self::dispatch::{Acceptance, Dispatcher};
pub use self::errors::{Error, Result};
pub use self::pipeline::{convert, ConversionStats};
pub use self::recognizer::{Recognizer, RecognizerFactory};
pub use self::source::{ImageDirSource, SubtitleImage, SubtitleUnit};
pub use self::srt::{format_entry, reconcile, write_srt};
pub use self::tesseract::{Tesseract, TesseractConfig, TesseractFactory};
pub use self::time::{Pts, TICKS_PER_SECOND};
