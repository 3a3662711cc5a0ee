//! End-to-end batch runs against real files on disk.
//!
//! Fixtures are synthesized with the `image` crate into a temp directory,
//! resized through `ResizeExecutor` + `RustBackend`, and the outputs are
//! decoded again to check sizes, frames, and timing.

use aspect_resize::executor::StartError;
use aspect_resize::imaging::frame_delay_ms;
use aspect_resize::naming::SuffixError;
use aspect_resize::{
    BatchReport, ProgressObserver, Ratio, ResizeExecutor, ResizeOptions, RustBackend,
};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, Frame, Rgba, RgbaImage};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Default)]
struct Recorder {
    progress: Vec<u8>,
    errors: Vec<PathBuf>,
    done: Vec<PathBuf>,
    completions: usize,
}

impl ProgressObserver for Recorder {
    fn on_progress(&mut self, percent: u8) {
        self.progress.push(percent);
    }

    fn on_complete(&mut self, _report: &BatchReport) {
        self.completions += 1;
    }

    fn on_file_error(&mut self, path: &Path, _message: &str) {
        self.errors.push(path.to_path_buf());
    }

    fn on_file_done(&mut self, _source: &Path, output: &Path) {
        self.done.push(output.to_path_buf());
    }
}

fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([90, 90, 30, 255]),
    ))
    .to_rgb8()
    .save(path)
    .unwrap();
}

fn write_gif(path: &Path, width: u32, height: u32, delays_ms: &[u32]) {
    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite).unwrap();
    for (i, &ms) in delays_ms.iter().enumerate() {
        let shade = 40 + (i as u8) * 70;
        let frame = Frame::from_parts(
            RgbaImage::from_pixel(width, height, Rgba([shade, 255 - shade, 0, 255])),
            0,
            0,
            Delay::from_numer_denom_ms(ms, 1),
        );
        encoder.encode_frame(frame).unwrap();
    }
}

fn read_gif(path: &Path) -> Vec<Frame> {
    let decoder = GifDecoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
    decoder.into_frames().collect_frames().unwrap()
}

fn run(batch: Vec<PathBuf>, ratio: Ratio) -> (BatchReport, Recorder) {
    let executor = ResizeExecutor::new(RustBackend::new(), ResizeOptions::default());
    let handle = executor.start(batch, ratio).unwrap();
    let mut recorder = Recorder::default();
    let report = handle.drive(&mut recorder).unwrap();
    (report, recorder)
}

#[test]
fn mixed_batch_survives_a_corrupt_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    write_png(&dir.join("a.png"), 200, 100);
    fs::write(dir.join("b.png"), b"\x89PNG\r\n\x1a\n truncated").unwrap();
    write_jpeg(&dir.join("c.jpg"), 120, 90);
    write_gif(&dir.join("d.gif"), 40, 60, &[100, 100]);

    let batch: Vec<PathBuf> = ["a.png", "b.png", "c.jpg", "d.gif"]
        .iter()
        .map(|n| dir.join(n))
        .collect();
    let (report, recorder) = run(batch, Ratio::SQUARE);

    assert_eq!(recorder.progress, vec![25, 50, 75, 100]);
    assert_eq!(recorder.completions, 1);
    assert_eq!(recorder.errors, vec![dir.join("b.png")]);
    assert_eq!(
        recorder.done,
        vec![
            dir.join("a_resized.png"),
            dir.join("c_resized.jpg"),
            dir.join("d_resized.gif"),
        ]
    );
    assert_eq!(report.succeeded(), 3);
    assert!(!report.cancelled);
    assert!(!dir.join("b_resized.png").exists());

    assert_eq!(
        image::image_dimensions(dir.join("a_resized.png")).unwrap(),
        (100, 100)
    );
    assert_eq!(
        image::image_dimensions(dir.join("c_resized.jpg")).unwrap(),
        (90, 90)
    );
    let frames = read_gif(&dir.join("d_resized.gif"));
    assert!(frames.iter().all(|f| f.buffer().dimensions() == (40, 40)));
}

#[test]
fn animated_gif_keeps_frames_delays_and_loop() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("wave.gif");
    write_gif(&source, 64, 64, &[100, 150, 120]);

    let (report, _) = run(vec![source], Ratio::WIDESCREEN);
    assert_eq!(report.succeeded(), 1);

    let output = tmp.path().join("wave_resized.gif");
    let frames = read_gif(&output);
    assert_eq!(frames.len(), 3);
    let delays: Vec<u32> = frames.iter().map(frame_delay_ms).collect();
    assert_eq!(delays, vec![100, 150, 120]);
    assert!(frames.iter().all(|f| f.buffer().dimensions() == (64, 36)));

    // NETSCAPE2.0 loop count 0 means loop forever
    let bytes = fs::read(&output).unwrap();
    let pos = bytes
        .windows(11)
        .position(|w| w == b"NETSCAPE2.0")
        .expect("loop extension present");
    assert_eq!(&bytes[pos + 11..pos + 15], &[3, 1, 0, 0]);
}

#[test]
fn rerun_overwrites_previous_output() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("dawn.png");
    write_png(&source, 300, 300);

    run(vec![source.clone()], Ratio::WIDESCREEN);
    assert_eq!(
        image::image_dimensions(tmp.path().join("dawn_resized.png")).unwrap(),
        (300, 168)
    );

    run(vec![source], Ratio::STANDARD);
    assert_eq!(
        image::image_dimensions(tmp.path().join("dawn_resized.png")).unwrap(),
        (300, 225)
    );

    let mut names: Vec<String> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["dawn.png", "dawn_resized.png"]);
}

#[test]
fn source_too_small_for_ratio_is_a_per_file_failure() {
    let tmp = TempDir::new().unwrap();
    let sliver = tmp.path().join("sliver.png");
    let normal = tmp.path().join("normal.png");
    write_png(&sliver, 1, 100);
    write_png(&normal, 160, 160);

    let (report, recorder) = run(vec![sliver.clone(), normal], Ratio::WIDESCREEN);

    assert_eq!(recorder.errors, vec![sliver]);
    assert_eq!(recorder.progress, vec![50, 100]);
    let (_, error) = report.failed().next().unwrap();
    assert!(error.to_string().contains("too small"));
    assert_eq!(
        image::image_dimensions(tmp.path().join("normal_resized.png")).unwrap(),
        (160, 90)
    );
}

#[test]
fn progress_is_monotonic_and_ends_at_100() {
    let tmp = TempDir::new().unwrap();
    let batch: Vec<PathBuf> = (0..7)
        .map(|i| {
            let path = tmp.path().join(format!("img{i}.png"));
            write_png(&path, 50 + i * 10, 40);
            path
        })
        .collect();

    let (report, recorder) = run(batch, Ratio::SQUARE);

    assert_eq!(recorder.progress.len(), 7);
    assert!(recorder.progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(recorder.progress.last(), Some(&100));
    assert_eq!(report.succeeded(), 7);
}

#[test]
fn missing_file_is_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let present = tmp.path().join("here.png");
    write_png(&present, 40, 40);

    let (report, recorder) = run(
        vec![tmp.path().join("gone.png"), present],
        Ratio::SQUARE,
    );

    assert_eq!(recorder.errors.len(), 1);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(recorder.progress, vec![50, 100]);
}

#[test]
fn empty_suffix_is_refused_and_source_untouched() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("a.png");
    write_png(&source, 40, 20);
    let before = fs::read(&source).unwrap();

    let options = ResizeOptions {
        suffix: String::new(),
    };
    let executor = ResizeExecutor::new(RustBackend::new(), options);
    let result = executor.start(vec![source.clone()], Ratio::SQUARE);

    assert!(matches!(
        result,
        Err(StartError::InvalidSuffix(SuffixError::Empty))
    ));
    assert_eq!(fs::read(&source).unwrap(), before);
    assert_eq!(image::image_dimensions(&source).unwrap(), (40, 20));
}

#[test]
fn misnamed_png_written_as_real_jpeg() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("photo.jpg");
    write_png(&source, 64, 48);

    let (report, _) = run(vec![source], Ratio::SQUARE);
    assert_eq!(report.succeeded(), 1);

    let output = tmp.path().join("photo_resized.jpg");
    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Jpeg
    );
    assert_eq!(image::image_dimensions(&output).unwrap(), (48, 48));
}
