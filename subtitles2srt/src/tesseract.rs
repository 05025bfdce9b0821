//! OCR using the `tesseract` command-line tool.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use log::{debug, trace};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use tempfile::TempDir;

use crate::bitmap::Bitmap;
use crate::errors::{Error, Result};
use crate::recognizer::{Recognizer, RecognizerFactory};

/// Tesseract's page segmentation mode 6: "Assume a single uniform block of
/// text."  This is what the tesseract library uses by default.
const PAGE_SEGMENTATION_MODE: &str = "6";

/// How to run tesseract.
#[derive(Clone, Debug)]
pub struct TesseractConfig {
    /// The `tesseract` executable.
    pub executable: PathBuf,
    /// The tesseract language, such as `eng` or `deu+fra`.
    pub language: String,
    /// Where to find tesseract's language data, if not the default.
    pub data_dir: Option<PathBuf>,
    /// OCR engine mode, from 0 (legacy only) to 3 (default).
    pub engine_mode: u8,
    /// The resolution of the subtitle images.
    pub dpi: u32,
    /// Characters which tesseract should never output.
    pub blacklist: Option<String>,
}

impl Default for TesseractConfig {
    fn default() -> TesseractConfig {
        TesseractConfig {
            executable: PathBuf::from("tesseract"),
            language: "eng".to_owned(),
            data_dir: None,
            engine_mode: 3,
            dpi: 72,
            blacklist: None,
        }
    }
}

impl TesseractConfig {
    /// Build a command which runs tesseract with our data directory.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        if let Some(data_dir) = &self.data_dir {
            cmd.arg("--tessdata-dir").arg(data_dir);
        }
        cmd
    }

    /// Ask tesseract which languages it has installed.
    fn available_languages(&self) -> Result<Vec<String>, String> {
        let output = self.command().arg("--list-langs").output().map_err(|e| {
            format!("failed to launch {}: {}", self.executable.display(), e)
        })?;
        check_status(&self.executable, &output)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with("List of available languages"))
            .map(|l| l.to_owned())
            .collect())
    }
}

/// Creates one `Tesseract` recognizer per worker slot.
#[derive(Clone, Debug)]
pub struct TesseractFactory {
    config: Arc<TesseractConfig>,
}

impl TesseractFactory {
    /// Create a new factory using `config`.
    pub fn new(config: TesseractConfig) -> TesseractFactory {
        TesseractFactory {
            config: Arc::new(config),
        }
    }
}

impl RecognizerFactory for TesseractFactory {
    type Recognizer = Tesseract;

    fn create(&self, slot: usize) -> Result<Tesseract> {
        let config = &self.config;
        let available = config
            .available_languages()
            .map_err(|e| Error::recognizer_init(slot, e))?;
        for lang in config.language.split('+') {
            if !available.iter().any(|a| a == lang) {
                return Err(Error::recognizer_init(
                    slot,
                    format!("tesseract language {:?} is not installed", lang),
                ));
            }
        }
        let scratch = tempfile::Builder::new()
            .prefix(&format!("subtitles2srt-{}-", slot))
            .tempdir()
            .map_err(|e| Error::recognizer_init(slot, e))?;
        debug!(
            "slot {}: using tesseract {:?} with language {}",
            slot, config.executable, config.language
        );
        Ok(Tesseract {
            config: self.config.clone(),
            slot,
            scratch,
        })
    }
}

/// A recognizer which runs the `tesseract` command once per image.
pub struct Tesseract {
    config: Arc<TesseractConfig>,
    slot: usize,
    /// Where we write images for tesseract to read.  Deleted on drop.
    scratch: TempDir,
}

impl Tesseract {
    /// Write `bitmap` as a PNG file that tesseract can read.
    fn write_input(&self, bitmap: &Bitmap) -> Result<PathBuf> {
        let path = self.scratch.path().join("input.png");
        let image = bitmap.to_gray_image();
        let file = File::create(&path).map_err(|e| Error::write_file(&path, e))?;
        let mut wtr = BufWriter::new(file);
        PngEncoder::new(&mut wtr)
            .write_image(image.as_raw(), image.width(), image.height(), ColorType::L8)
            .map_err(|e| Error::write_file(&path, e))?;
        wtr.flush().map_err(|e| Error::write_file(&path, e))?;
        Ok(path)
    }
}

impl Recognizer for Tesseract {
    fn recognize(&mut self, bitmap: &Bitmap) -> Result<String> {
        let input = self.write_input(bitmap)?;
        let config = &self.config;
        let mut cmd = config.command();
        cmd.arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(&config.language)
            .arg("--oem")
            .arg(config.engine_mode.to_string())
            .arg("--psm")
            .arg(PAGE_SEGMENTATION_MODE)
            .arg("--dpi")
            .arg(config.dpi.to_string());
        if let Some(blacklist) = &config.blacklist {
            cmd.arg("-c")
                .arg(format!("tessedit_char_blacklist={}", blacklist));
        }
        trace!("slot {}: running {:?}", self.slot, cmd);
        let output = cmd.output().map_err(|e| {
            Error::recognition(format!(
                "failed to launch {}: {}",
                config.executable.display(),
                e
            ))
        })?;
        check_status(&config.executable, &output).map_err(Error::recognition)?;
        String::from_utf8(output.stdout).map_err(Error::recognition)
    }
}

impl Drop for Tesseract {
    fn drop(&mut self) {
        trace!("slot {}: shutting down tesseract", self.slot);
    }
}

/// Turn an unsuccessful exit into an error message, including anything
/// the program printed to standard error.
fn check_status(executable: &Path, output: &Output) -> Result<(), String> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        Err(format!("{} exited with {}", executable.display(), output.status))
    } else {
        Err(format!(
            "{} exited with {}: {}",
            executable.display(),
            output.status,
            stderr.trim()
        ))
    }
}
