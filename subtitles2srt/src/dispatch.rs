//! Deciding which subtitles to recognize, and handing them to the pool.

use log::{trace, warn};

use crate::aggregate::RecognitionResult;
use crate::bitmap::dump_pgm;
use crate::config::OcrConfig;
use crate::errors::Result;
use crate::pipeline::ConversionStats;
use crate::pool::SlotPool;
use crate::recognizer::RecognizerFactory;
use crate::source::{SubtitleImage, SubtitleUnit};
use crate::time::Pts;

/// What happened to a subtitle image passed to `Dispatcher::accept`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acceptance {
    /// The image was sent for recognition with this sequence index.
    Accepted(u32),
    /// The image was smaller than the configured minimum size.
    TooSmall,
    /// The image started at the same time as the previous accepted image,
    /// so it's another fragment of the same subtitle.
    Duplicate,
}

/// Accepts subtitle images in order, numbers them, and dispatches them to
/// a pool of recognizers.
pub struct Dispatcher<F: RecognizerFactory> {
    config: OcrConfig,
    pool: SlotPool<F>,
    next_index: u32,
    last_start: Option<Pts>,
    stats: ConversionStats,
}

impl<F: RecognizerFactory> Dispatcher<F> {
    /// Create a new dispatcher.  No recognizers are created until we see
    /// our first image.
    pub fn new(factory: F, config: OcrConfig) -> Dispatcher<F> {
        let pool = SlotPool::new(factory, config.max_threads, config.verbose);
        Dispatcher {
            config,
            pool,
            next_index: 1,
            last_start: None,
            stats: ConversionStats::default(),
        }
    }

    /// Accept the next subtitle image.  This may block until a worker slot
    /// is free.  The only errors are fatal ones, like a recognizer which
    /// can't be set up.
    pub fn accept(&mut self, image: SubtitleImage) -> Result<Acceptance> {
        let SubtitleImage { bitmap, start, end } = image;

        let (width, height) = (bitmap.width(), bitmap.height());
        if width < self.config.min_width || height < self.config.min_height {
            warn!(
                "Image too small {}, size: {} bytes, {}x{} pixels, expected at least {}x{}",
                self.next_index,
                bitmap.data().len(),
                width,
                height,
                self.config.min_width,
                self.config.min_height,
            );
            self.stats.too_small += 1;
            return Ok(Acceptance::TooSmall);
        }

        if self.last_start == Some(start) {
            trace!("skipping duplicate subtitle fragment at {}", start);
            self.stats.duplicates += 1;
            return Ok(Acceptance::Duplicate);
        }
        self.last_start = Some(start);

        let sequence_index = self.next_index;
        self.next_index += 1;

        let bitmap = bitmap.inverted();
        if let Some(base) = &self.config.dump_images {
            dump_pgm(base, sequence_index, &bitmap);
        }

        self.pool.submit(SubtitleUnit {
            sequence_index,
            start,
            end,
            bitmap,
        })?;
        self.stats.accepted += 1;
        Ok(Acceptance::Accepted(sequence_index))
    }

    /// Wait for all recognition to finish, and return the results in the
    /// order they completed.
    pub fn finish(self) -> (Vec<RecognitionResult>, ConversionStats) {
        let mut stats = self.stats;
        let results = self.pool.finish();
        stats.failed = results.iter().filter(|r| r.text.is_none()).count();
        (results, stats)
    }
}
