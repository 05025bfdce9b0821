//! Tools for working with time stamps.

use std::fmt;

/// The number of `Pts` ticks in one second.
pub const TICKS_PER_SECOND: u32 = 90_000;

/// A presentation time stamp, measured in ticks of a 90kHz clock.  This is
/// the time base used by DVD subtitles.
///
/// Formatting a `Pts` produces the time format used by `*.srt` files:
///
/// ```
/// use subtitles2srt::Pts;
///
/// assert_eq!(Pts(90_000).to_string(), "00:00:01,000");
/// assert_eq!(Pts(5_409_000).to_string(), "00:01:00,100");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub u32);

impl Pts {
    /// The raw value which subtitle decoders use to mean "end time unknown".
    /// We never store this in an end time; we use `None` instead.  But if
    /// an end time is still unknown when we write out the subtitles, we
    /// write this value, which is about 13¼ hours.
    pub const UNKNOWN: Pts = Pts(u32::MAX);

    /// Interpret a raw end time from a decoder, treating `u32::MAX` as
    /// unknown.
    pub fn from_raw_end(raw: u32) -> Option<Pts> {
        if raw == Pts::UNKNOWN.0 {
            None
        } else {
            Some(Pts(raw))
        }
    }

    /// Convert a time in seconds to the nearest tick.  Fails for negative,
    /// non-finite or out-of-range times.
    pub fn from_seconds(seconds: f64) -> Result<Pts, cast::Error> {
        cast::u32((seconds * f64::from(TICKS_PER_SECOND)).round()).map(Pts)
    }

    /// The raw tick count.
    pub fn ticks(self) -> u32 {
        self.0
    }

    /// This time stamp in whole milliseconds, rounding down.
    pub fn as_millis(self) -> u32 {
        self.0 / 90
    }
}

impl fmt::Display for Pts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut ms = self.as_millis();
        let h = ms / (3600 * 1000);
        ms -= h * 3600 * 1000;
        let m = ms / (60 * 1000);
        ms -= m * 60 * 1000;
        let s = ms / 1000;
        ms %= 1000;
        write!(f, "{:02}:{:02}:{:02},{:03}", h, m, s, ms)
    }
}
