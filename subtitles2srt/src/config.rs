//! Conversion settings.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread;

/// Settings for a single conversion.  These are fixed once the conversion
/// starts.
#[derive(Clone, Debug)]
pub struct OcrConfig {
    /// The maximum number of images to recognize at once.  With a value of
    /// 1, all recognition happens on the calling thread.
    pub max_threads: usize,
    /// Images narrower than this are skipped.
    pub min_width: u32,
    /// Images shorter than this are skipped.
    pub min_height: u32,
    /// Always use the start of the next subtitle as the end of the current
    /// one, even when we know the real end time.
    pub forced_end_times: bool,
    /// If present, dump every preprocessed image to `<base>-<NNNN>.pgm`.
    pub dump_images: Option<PathBuf>,
    /// Log the recognized text of each subtitle at `info` level.
    pub verbose: bool,
}

impl Default for OcrConfig {
    fn default() -> OcrConfig {
        OcrConfig {
            max_threads: max_threads_or_default(0),
            min_width: 9,
            min_height: 1,
            forced_end_times: false,
            dump_images: None,
            verbose: false,
        }
    }
}

/// Interpret a requested thread count, where zero or less means "one per
/// available CPU".
pub fn max_threads_or_default(requested: i64) -> usize {
    match usize::try_from(requested) {
        Ok(n) if n > 0 => n,
        _ => thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1),
    }
}
