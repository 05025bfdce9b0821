//! Grayscale subtitle bitmaps, and the preprocessing we do before OCR.

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ColorType, GrayImage, ImageEncoder};
use log::{debug, warn};
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::{Error, Result};

/// An 8-bit grayscale image, stored in row-major order.  Each row starts
/// `stride` bytes after the previous one, and only the first `width` bytes
/// of each row are pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    stride: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create a new bitmap, checking that `data` is large enough to hold
    /// `height` rows of `stride` bytes (the last row may omit its padding).
    pub fn new(width: u32, height: u32, stride: u32, data: Vec<u8>) -> Result<Bitmap> {
        let needed = if height == 0 {
            0
        } else {
            (height as usize - 1) * stride as usize + width as usize
        };
        if stride < width || data.len() < needed {
            return Err(Error::InvalidBitmap {
                width,
                height,
                stride,
                len: data.len(),
            });
        }
        Ok(Bitmap {
            width,
            height,
            stride,
            data,
        })
    }

    /// Wrap a tightly-packed grayscale image.
    pub fn from_gray_image(image: GrayImage) -> Bitmap {
        let (width, height) = image.dimensions();
        Bitmap {
            width,
            height,
            stride: width,
            data: image.into_raw(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes from the start of one row to the start of the next.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// The raw pixel buffer, including any row padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Iterate over rows of pixels, without padding.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let width = self.width as usize;
        let stride = (self.stride as usize).max(1);
        self.data
            .chunks(stride)
            .take(self.height as usize)
            .map(move |row| &row[..width])
    }

    /// Return an inverted copy of this bitmap, using a hard threshold: every
    /// pixel becomes either black or white.  Subtitles are normally light
    /// text on a dark or transparent background, but OCR engines work best
    /// on dark text on a light background.
    ///
    /// The copy has exactly the same size and stride as the original.
    pub fn inverted(&self) -> Bitmap {
        Bitmap {
            width: self.width,
            height: self.height,
            stride: self.stride,
            data: self.data.iter().map(|&v| invert_pixel(v)).collect(),
        }
    }

    /// Copy this bitmap into a tightly-packed `GrayImage`.
    pub fn to_gray_image(&self) -> GrayImage {
        let mut packed = Vec::with_capacity(self.width as usize * self.height as usize);
        for row in self.rows() {
            packed.extend_from_slice(row);
        }
        // `rows` always yields `height` rows of `width` bytes, because `new`
        // checks the buffer size.
        GrayImage::from_raw(self.width, self.height, packed)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Invert a single pixel with a hard threshold.
fn invert_pixel(value: u8) -> u8 {
    if 255 - value > 0x80 {
        0xff
    } else {
        0
    }
}

/// The path used when dumping subtitle number `sequence_index`:
/// `<base>-<NNNN>.pgm`.
pub fn dump_pgm_path(base: &Path, sequence_index: u32) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!("-{:04}.pgm", sequence_index));
    PathBuf::from(name)
}

/// Write `bitmap` to `<base>-<NNNN>.pgm` for debugging.  Errors are logged
/// and otherwise ignored.
pub fn dump_pgm(base: &Path, sequence_index: u32, bitmap: &Bitmap) {
    let path = dump_pgm_path(base, sequence_index);
    debug!("dumping image: {}", path.display());
    if let Err(err) = write_pgm(&path, bitmap) {
        warn!(
            "could not dump subtitle image: {}",
            crate::errors::display_chain(&err)
        );
    }
}

/// Write `bitmap` as a binary PGM file.
fn write_pgm(path: &Path, bitmap: &Bitmap) -> Result<()> {
    let image = bitmap.to_gray_image();
    let file = File::create(path).map_err(|e| Error::write_file(path, e))?;
    let mut wtr = BufWriter::new(file);
    PnmEncoder::new(&mut wtr)
        .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::L8)
        .map_err(|e| Error::write_file(path, e))?;
    wtr.flush().map_err(|e| Error::write_file(path, e))?;
    Ok(())
}
