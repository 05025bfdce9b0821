//! Test-only utilities.

use image::ColorType;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::bitmap::Bitmap;
use crate::errors::{Error, Result};
use crate::recognizer::Recognizer;
use crate::source::{SubtitleImage, SubtitleUnit};
use crate::time::Pts;

/// A blank bitmap of the given size.  We identify test images by their
/// width.
pub fn blank(width: u32, height: u32) -> Bitmap {
    Bitmap::new(width, height, width, vec![0; (width * height) as usize]).unwrap()
}

/// A subtitle unit which is ready for recognition.
pub fn unit(sequence_index: u32, width: u32) -> SubtitleUnit {
    SubtitleUnit {
        sequence_index,
        start: Pts(sequence_index * 1000),
        end: Some(Pts(sequence_index * 1000 + 500)),
        bitmap: blank(width, 2),
    }
}

/// A subtitle image, as it would come from a source.
pub fn image(width: u32, height: u32, start: u32, end: Option<u32>) -> SubtitleImage {
    SubtitleImage {
        bitmap: blank(width, height),
        start: Pts(start),
        end: end.map(Pts),
    }
}

/// Write a grayscale PNG with an alpha channel.
pub fn write_png(path: &Path, width: u32, height: u32, pixels: &[[u8; 2]]) {
    let data = pixels.iter().flatten().copied().collect::<Vec<u8>>();
    image::save_buffer(path, &data, width, height, ColorType::La8).unwrap();
}

/// Counts how many recognizers are running at once.
#[derive(Clone, Debug, Default)]
pub struct InFlight {
    current: Arc<AtomicUsize>,
    max: Arc<AtomicUsize>,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    /// The number of recognizers running right now.
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// The largest number of recognizers we ever saw running at once.
    pub fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

/// Returns `"width N"` after an optional delay, and tracks concurrency.
pub struct CountingRecognizer {
    in_flight: InFlight,
    delay: Duration,
}

impl CountingRecognizer {
    pub fn new(in_flight: InFlight, delay: Duration) -> CountingRecognizer {
        CountingRecognizer { in_flight, delay }
    }
}

impl Recognizer for CountingRecognizer {
    fn recognize(&mut self, bitmap: &Bitmap) -> Result<String> {
        self.in_flight.enter();
        thread::sleep(self.delay);
        self.in_flight.exit();
        Ok(format!("width {}", bitmap.width()))
    }
}

/// Returns `"width N"`, but wider images finish sooner, so results arrive
/// out of order.
pub struct SlowRecognizer;

impl Recognizer for SlowRecognizer {
    fn recognize(&mut self, bitmap: &Bitmap) -> Result<String> {
        let delay = 40u32.saturating_sub(bitmap.width());
        thread::sleep(Duration::from_millis(u64::from(delay)));
        Ok(format!("width {}\n", bitmap.width()))
    }
}

/// Fails on width 11, panics on width 12, and adds whitespace on width 14.
pub struct FlakyRecognizer;

impl Recognizer for FlakyRecognizer {
    fn recognize(&mut self, bitmap: &Bitmap) -> Result<String> {
        match bitmap.width() {
            11 => Err(Error::recognition("could not read image")),
            12 => panic!("recognizer crashed"),
            14 => Ok("  width 14 \n\n".to_owned()),
            w => Ok(format!("width {}", w)),
        }
    }
}

/// Write a shell script which pretends to be `tesseract`.  It knows the
/// languages `eng` and `deu`, and prints `reply` for every image, unless
/// `reply` is `"FAIL"`.
#[cfg(unix)]
pub fn fake_tesseract(dir: &Path, reply: &str) -> PathBuf {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::process::Command;

    let recognize = if reply == "FAIL" {
        "echo 'Error: could not read image' >&2\nexit 1".to_owned()
    } else {
        format!("printf '%s\\n\\f' '{}'", reply)
    };
    let script = format!(
        r#"#!/bin/sh
for arg in "$@"; do
    if [ "$arg" = "--list-langs" ]; then
        echo 'List of available languages in "/fake/tessdata/" (2):'
        echo deu
        echo eng
        exit 0
    fi
done
{}
"#,
        recognize
    );
    let path = dir.join("fake-tesseract");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

    // If another test forks while we're writing the script, the child can
    // briefly hold it open, and exec fails with ETXTBSY.  Wait until the
    // script is runnable.
    for _ in 0..50 {
        match Command::new(&path).arg("--list-langs").output() {
            Err(e) if e.raw_os_error() == Some(26) => {
                thread::sleep(Duration::from_millis(20));
            }
            _ => break,
        }
    }
    path
}
