//! Running a complete conversion.

use log::info;
use std::io::Write;

use crate::config::OcrConfig;
use crate::dispatch::Dispatcher;
use crate::errors::Result;
use crate::recognizer::RecognizerFactory;
use crate::source::SubtitleImage;
use crate::srt::{reconcile, write_srt};

/// What happened during a conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Subtitles sent for recognition.  Each one appears in the output.
    pub accepted: usize,
    /// Images skipped because they were too small.
    pub too_small: usize,
    /// Images skipped because they continued the previous subtitle.
    pub duplicates: usize,
    /// Accepted subtitles where recognition failed.  These appear in the
    /// output with no text.
    pub failed: usize,
}

/// Recognize the text in `images`, using recognizers from `factory`, and
/// write the results to `out` as SRT subtitles.
///
/// Nothing is written until every image has been recognized.  An error from
/// `images` stops the conversion, as does an error setting up a recognizer,
/// but recognition failures for individual images are only logged.
pub fn convert<I, F, W>(images: I, factory: F, config: OcrConfig, mut out: W) -> Result<ConversionStats>
where
    I: IntoIterator<Item = Result<SubtitleImage>>,
    F: RecognizerFactory,
    W: Write,
{
    let forced = config.forced_end_times;
    let mut dispatcher = Dispatcher::new(factory, config);
    for image in images {
        dispatcher.accept(image?)?;
    }
    let (results, stats) = dispatcher.finish();

    let results = reconcile(results, forced);
    write_srt(&mut out, &results)?;
    out.flush()?;

    info!(
        "converted {} subtitles ({} failed, {} too small, {} duplicates)",
        stats.accepted, stats.failed, stats.too_small, stats.duplicates
    );
    Ok(stats)
}
