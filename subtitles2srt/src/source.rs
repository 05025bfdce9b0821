//! Where our subtitle images come from.
//!
//! The converter accepts any iterator of `Result<SubtitleImage>`.  We
//! provide one such source, `ImageDirSource`, which reads the directory of
//! PNG files and `index.json` written by the `vobsub2png` tool.

use log::{debug, trace};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::vec;

use crate::bitmap::Bitmap;
use crate::errors::{Error, Result};
use crate::time::Pts;

/// A single decoded subtitle image, with its timing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtitleImage {
    /// The image itself, normally light text on a dark background.
    pub bitmap: Bitmap,
    /// When the subtitle appears.
    pub start: Pts,
    /// When the subtitle disappears, if known.
    pub end: Option<Pts>,
}

/// A subtitle image that has been accepted for OCR, and assigned a
/// sequence number.  The sequence number starts at 1, and it is used both
/// to restore the original order after OCR and as the `*.srt` index.
#[derive(Debug)]
pub struct SubtitleUnit {
    /// Our position in the output.
    pub sequence_index: u32,
    /// When the subtitle appears.
    pub start: Pts,
    /// When the subtitle disappears, if known.
    pub end: Option<Pts>,
    /// The preprocessed image which we will pass to the recognizer.
    pub bitmap: Bitmap,
}

/// The contents of an `index.json` file.
#[derive(Debug, Deserialize)]
struct IndexInfo {
    subtitles: Vec<SubInfo>,
}

/// A single entry in `index.json`.  We ignore the other fields written by
/// `vobsub2png`, such as `position` and `force`.
#[derive(Debug, Deserialize)]
struct SubInfo {
    start: f64,
    #[serde(default)]
    end: Option<f64>,
    path: String,
}

/// Reads subtitle images from a directory containing an `index.json` file
/// and one image per subtitle, in the format written by `vobsub2png`:
///
/// ```json
/// {"subtitles": [{"start": 1.5, "end": 3.25, "path": "0000.png"}]}
/// ```
///
/// Times are in seconds.  An `end` of `null` means that the end time is
/// unknown.
pub struct ImageDirSource {
    dir: PathBuf,
    entries: vec::IntoIter<SubInfo>,
}

impl ImageDirSource {
    /// Open the subtitle directory `dir`, and read its index.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<ImageDirSource> {
        let dir = dir.as_ref().to_owned();
        let index_path = dir.join("index.json");
        let json =
            fs::read_to_string(&index_path).map_err(|e| Error::read_file(&index_path, e))?;
        let index: IndexInfo =
            serde_json::from_str(&json).map_err(|e| Error::read_file(&index_path, e))?;
        debug!(
            "found {} subtitles in {}",
            index.subtitles.len(),
            index_path.display()
        );
        Ok(ImageDirSource {
            dir,
            entries: index.subtitles.into_iter(),
        })
    }

    /// Load the image for a single index entry.
    fn load(&self, info: SubInfo) -> Result<SubtitleImage> {
        let path = self.dir.join(&info.path);
        trace!("loading {}", path.display());
        let to_pts = |seconds: f64| {
            Pts::from_seconds(seconds).map_err(|_| Error::InvalidTime {
                seconds,
                path: path.clone(),
            })
        };
        let start = to_pts(info.start)?;
        let end = info.end.map(to_pts).transpose()?;

        let image = image::open(&path)
            .map_err(|e| Error::read_file(&path, e))?
            .to_luma_alpha8();
        let (width, height) = image.dimensions();
        // Composite onto black, the way a subtitle decoder would draw it.
        // `as` is safe here because the product divided by 255 fits in a
        // `u8`.
        let data = image
            .pixels()
            .map(|p| {
                let [luma, alpha] = p.0;
                (u16::from(luma) * u16::from(alpha) / 255) as u8
            })
            .collect();
        let bitmap = Bitmap::new(width, height, width, data)?;
        Ok(SubtitleImage { bitmap, start, end })
    }
}

impl Iterator for ImageDirSource {
    type Item = Result<SubtitleImage>;

    fn next(&mut self) -> Option<Self::Item> {
        let info = self.entries.next()?;
        Some(self.load(info))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for ImageDirSource {}
