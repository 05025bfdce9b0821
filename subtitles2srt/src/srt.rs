//! Putting results back in order and writing them as SRT subtitles.

use std::io::{self, Write};

use crate::aggregate::RecognitionResult;
use crate::time::Pts;

/// Sort `results` into subtitle order, and fill in end times.  Any result
/// with an unknown end time ends when the next one starts.  In `forced`
/// mode, we do this for every result, even ones with a known end time.
///
/// The last result has nothing following it, so its end time is left
/// unchanged.
pub fn reconcile(mut results: Vec<RecognitionResult>, forced: bool) -> Vec<RecognitionResult> {
    results.sort_by_key(|r| r.sequence_index);
    for i in 1..results.len() {
        let next_start = results[i].start;
        let prev = &mut results[i - 1];
        if forced || prev.end.is_none() {
            prev.end = Some(next_start);
        }
    }
    results
}

/// Format a single SRT entry, including the trailing blank line.  An
/// unknown end time is written as the largest possible time stamp, and a
/// failed recognition as an empty line.
pub fn format_entry(result: &RecognitionResult) -> String {
    format!(
        "{}\n{} --> {}\n{}\n\n",
        result.sequence_index,
        result.start,
        result.end.unwrap_or(Pts::UNKNOWN),
        result.text.as_deref().unwrap_or(""),
    )
}

/// Write `results` to `out`, in the order given.
pub fn write_srt<W: Write>(out: &mut W, results: &[RecognitionResult]) -> io::Result<()> {
    for result in results {
        out.write_all(format_entry(result).as_bytes())?;
    }
    Ok(())
}
