//! Integration tests for our command-line interface.  We actually run the
//! binary and make sure it produces the expected output.

use std::str::from_utf8;

use cli_test_dir::TestDir;

#[test]
fn show_help() {
    let testdir = TestDir::new("subtitles2srt", "show_help");
    let output = testdir
        .cmd()
        .arg("--help")
        .output()
        .expect("could not run subtitles2srt");
    assert!(output.status.success());
    let stdout = from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("--tesseract-lang"));
}

#[test]
fn show_version() {
    let testdir = TestDir::new("subtitles2srt", "show_version");
    let output = testdir
        .cmd()
        .arg("--version")
        .output()
        .expect("could not run subtitles2srt");
    assert!(output.status.success());
    assert!(from_utf8(&output.stdout)
        .unwrap()
        .contains("subtitles2srt "));
}

#[test]
fn missing_subtitle_dir_fails() {
    let testdir = TestDir::new("subtitles2srt", "missing_subtitle_dir_fails");
    let output = testdir
        .cmd()
        .arg("no_such_subtitles")
        .output()
        .expect("could not run subtitles2srt");
    assert!(!output.status.success());
    assert!(from_utf8(&output.stderr)
        .unwrap()
        .contains("Could not read subtitles from no_such_subtitles"));
    testdir.expect_no_such_path("no_such.srt");
}

#[test]
fn rejects_invalid_engine_mode() {
    let testdir = TestDir::new("subtitles2srt", "rejects_invalid_engine_mode");
    let output = testdir
        .cmd()
        .arg("--tesseract-oem")
        .arg("4")
        .arg("movie_subtitles")
        .output()
        .expect("could not run subtitles2srt");
    assert!(!output.status.success());
}

/// Tests which need a fake `tesseract` shell script.
#[cfg(unix)]
mod with_fake_tesseract {
    use super::*;

    use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
    use std::{
        fs,
        os::unix::fs::PermissionsExt,
        path::{Path, PathBuf},
        process::{Command, Output},
        thread,
        time::Duration,
    };
    use tempfile::TempDir;

    /// A fake `tesseract` which knows about English and prints `reply` for
    /// every image, or fails if `reply` is `"FAIL"`.
    fn fake_tesseract(reply: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let recognize = if reply == "FAIL" {
            "echo 'cannot read image' >&2\nexit 1".to_owned()
        } else {
            format!("printf '%s\\n\\f' '{}'", reply)
        };
        let script = format!(
            "#!/bin/sh\n\
             for arg in \"$@\"; do\n\
             \x20   if [ \"$arg\" = \"--list-langs\" ]; then\n\
             \x20       echo 'List of available languages (1):'\n\
             \x20       echo eng\n\
             \x20       exit 0\n\
             \x20   fi\n\
             done\n\
             {}\n",
            recognize
        );
        let path = dir.path().join("tesseract");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        // Another test may have forked while we held the script open for
        // writing, in which case exec fails with ETXTBSY for a moment.
        for _ in 0..50 {
            match Command::new(&path).arg("--list-langs").output() {
                Err(e) if e.raw_os_error() == Some(26) => {
                    thread::sleep(Duration::from_millis(20));
                }
                _ => break,
            }
        }
        (dir, path)
    }

    /// Encode an opaque white `width`x`height` PNG, with an alpha channel
    /// like the ones written by vobsub2png.
    fn white_png(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![255u8; (width * height * 2) as usize];
        let mut png = vec![];
        PngEncoder::new(&mut png)
            .write_image(&pixels, width, height, ColorType::La8)
            .unwrap();
        png
    }

    /// Create `movie_subtitles/` with three subtitles.  The second is too
    /// small to recognize, and the third has no end time.
    fn create_subtitles(testdir: &TestDir) {
        testdir.create_file(
            "movie_subtitles/index.json",
            r#"{"subtitles": [
  {"start": 1.0, "end": 2.5, "force": false, "position": [10, 400], "size": [20, 4], "path": "0000.png"},
  {"start": 3.0, "end": 3.5, "force": false, "position": [10, 400], "size": [3, 3], "path": "0001.png"},
  {"start": 4.0, "end": null, "force": false, "position": [10, 400], "size": [20, 4], "path": "0002.png"}
]}"#,
        );
        testdir.create_file("movie_subtitles/0000.png", white_png(20, 4));
        testdir.create_file("movie_subtitles/0001.png", white_png(3, 3));
        testdir.create_file("movie_subtitles/0002.png", white_png(20, 4));
    }

    fn run(testdir: &TestDir, tesseract: &Path, args: &[&str]) -> Output {
        testdir
            .cmd()
            .env_remove("TESSDATA_PREFIX")
            .arg("--tesseract-bin")
            .arg(tesseract)
            .args(args)
            .arg("movie_subtitles")
            .output()
            .expect("could not run subtitles2srt")
    }

    #[test]
    fn converts_subtitle_dir() {
        let testdir = TestDir::new("subtitles2srt", "converts_subtitle_dir");
        create_subtitles(&testdir);
        let (_dir, tesseract) = fake_tesseract("Hello");
        let output = run(&testdir, &tesseract, &["--dump-images", "--max-threads", "2"]);
        assert!(output.status.success(), "{:?}", output);
        assert!(from_utf8(&output.stdout)
            .unwrap()
            .contains("Wrote Subtitles to 'movie.srt'"));
        testdir.expect_file_contents(
            "movie.srt",
            "1\n00:00:01,000 --> 00:00:02,500\nHello\n\n\
             2\n00:00:04,000 --> 13:15:21,858\nHello\n\n",
        );
        testdir.expect_path("movie-0001.pgm");
        testdir.expect_path("movie-0002.pgm");
        testdir.expect_no_such_path("movie-0003.pgm");
    }

    #[test]
    fn dumb_mode_uses_next_start_time() {
        let testdir = TestDir::new("subtitles2srt", "dumb_mode_uses_next_start_time");
        create_subtitles(&testdir);
        let (_dir, tesseract) = fake_tesseract("Hallo");
        let output = run(
            &testdir,
            &tesseract,
            &["--dumb", "--lang", "en", "-o", "out.srt", "--max-threads", "1"],
        );
        assert!(output.status.success(), "{:?}", output);
        testdir.expect_contains("out.srt", "1\n00:00:01,000 --> 00:00:04,000\nHallo\n\n");
        testdir.expect_no_such_path("movie.srt");
        testdir.expect_no_such_path("out-0001.pgm");
    }

    #[test]
    fn recognition_failures_leave_empty_subtitles() {
        let testdir = TestDir::new("subtitles2srt", "recognition_failures_leave_empty_subtitles");
        create_subtitles(&testdir);
        let (_dir, tesseract) = fake_tesseract("FAIL");
        let output = run(&testdir, &tesseract, &[]);
        assert!(output.status.success(), "{:?}", output);
        testdir.expect_file_contents(
            "movie.srt",
            "1\n00:00:01,000 --> 00:00:02,500\n\n\n\
             2\n00:00:04,000 --> 13:15:21,858\n\n\n",
        );
        assert!(from_utf8(&output.stderr).unwrap().contains("OCR failed for 1"));
    }

    #[test]
    fn missing_language_is_fatal() {
        let testdir = TestDir::new("subtitles2srt", "missing_language_is_fatal");
        create_subtitles(&testdir);
        let (_dir, tesseract) = fake_tesseract("Hello");
        let output = run(&testdir, &tesseract, &["--tesseract-lang", "deu"]);
        assert!(!output.status.success());
        assert!(from_utf8(&output.stderr)
            .unwrap()
            .contains("tesseract language \"deu\" is not installed"));
    }
}
