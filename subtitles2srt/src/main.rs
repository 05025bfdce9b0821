//! Convert a directory of subtitle images to an `*.srt` file using OCR.

use std::{
    ffi::OsString,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use subtitles2srt::{
    convert, lang::choose_tesseract_lang, max_threads_or_default, ImageDirSource, OcrConfig,
    TesseractConfig, TesseractFactory,
};

#[derive(Debug, Parser)]
/// Convert bitmap subtitles to an *.srt file using tesseract. The input is a
/// directory containing an index.json file and one PNG image per subtitle,
/// as written by vobsub2png.
#[command(name = "subtitles2srt", version)]
struct Args {
    /// Directory containing index.json and the subtitle images.
    subtitle_dir: PathBuf,

    /// Output file. Defaults to the name of the subtitle directory, minus
    /// any "_subtitles" suffix, plus ".srt".
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Write each preprocessed image to <output>-NNNN.pgm for debugging.
    #[arg(long = "dump-images")]
    dump_images: bool,

    /// Show the recognized text of each subtitle as we go.
    #[arg(long = "verbose")]
    verbose: bool,

    /// Always end each subtitle when the next one starts, ignoring the
    /// original end times.
    #[arg(long = "dumb")]
    dumb: bool,

    /// Language of the subtitles, as a two-letter ISO 639-1 code.
    #[arg(short = 'l', long = "lang")]
    lang: Option<String>,

    /// Tesseract language to use, for example "deu" or "eng+fra". Overrides
    /// --lang.
    #[arg(long = "tesseract-lang")]
    tesseract_lang: Option<String>,

    /// Directory containing tesseract's language data.
    #[arg(long = "tesseract-data", env = "TESSDATA_PREFIX")]
    tesseract_data: Option<PathBuf>,

    /// Tesseract OCR engine mode (0-3).
    #[arg(
        long = "tesseract-oem",
        default_value_t = 3,
        value_parser = clap::value_parser!(u8).range(0..=3)
    )]
    tesseract_oem: u8,

    /// The tesseract executable to run.
    #[arg(long = "tesseract-bin", default_value = "tesseract")]
    tesseract_bin: PathBuf,

    /// Characters which tesseract should never recognize.
    #[arg(long = "blacklist")]
    blacklist: Option<String>,

    /// Skip images narrower than this.
    #[arg(long = "min-width", default_value_t = 9)]
    min_width: u32,

    /// Skip images shorter than this.
    #[arg(long = "min-height", default_value_t = 1)]
    min_height: u32,

    /// Resolution to report to tesseract.
    #[arg(long = "dpi", default_value_t = 72)]
    dpi: u32,

    /// Maximum number of images to recognize at once. 0 uses one per CPU.
    #[arg(long = "max-threads", default_value_t = 0, allow_negative_numbers = true)]
    max_threads: i64,
}

/// The default output path for `subtitle_dir`.
fn default_output(subtitle_dir: &Path) -> PathBuf {
    let name = subtitle_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "subtitles".to_owned());
    let stem = match name.strip_suffix("_subtitles") {
        Some(stem) if !stem.is_empty() => stem,
        _ => &name,
    };
    subtitle_dir.with_file_name(format!("{}.srt", stem))
}

/// Strip the extension from `output`, so we can use it as a base name for
/// image dumps.
fn dump_base(output: &Path) -> PathBuf {
    let mut base = OsString::from(output.with_extension("").as_os_str());
    if base.is_empty() {
        base.push("subtitles");
    }
    PathBuf::from(base)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
    debug!("args: {:?}", args);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.subtitle_dir));

    let config = OcrConfig {
        max_threads: max_threads_or_default(args.max_threads),
        min_width: args.min_width,
        min_height: args.min_height,
        forced_end_times: args.dumb,
        dump_images: args.dump_images.then(|| dump_base(&output)),
        verbose: args.verbose,
    };
    let tesseract = TesseractConfig {
        executable: args.tesseract_bin.clone(),
        language: choose_tesseract_lang(args.tesseract_lang.as_deref(), args.lang.as_deref()),
        data_dir: args.tesseract_data.clone(),
        engine_mode: args.tesseract_oem,
        dpi: args.dpi,
        blacklist: args.blacklist.clone(),
    };
    debug!("using {} OCR threads", config.max_threads);

    let source = ImageDirSource::open(&args.subtitle_dir).with_context(|| {
        format!(
            "Could not read subtitles from {}",
            args.subtitle_dir.display()
        )
    })?;
    let file = File::create(&output)
        .with_context(|| format!("Could not create {}", output.display()))?;

    let progress = if args.verbose {
        ProgressBar::hidden()
    } else {
        let style = ProgressStyle::default_bar()
            .template("  {msg:12} {pos:>5}/{len:5} {elapsed_precise} {wide_bar:.cyan/blue} {eta_precise}")?;
        ProgressBar::new(source.len() as u64)
            .with_style(style)
            .with_message("Recognizing")
    };
    let images = progress.wrap_iter(source);

    convert(
        images,
        TesseractFactory::new(tesseract),
        config,
        BufWriter::new(file),
    )
    .with_context(|| format!("Could not convert {}", args.subtitle_dir.display()))?;
    progress.finish_and_clear();

    println!("Wrote Subtitles to '{}'", output.display());
    Ok(())
}
