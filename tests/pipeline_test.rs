use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use image::{Rgba, RgbaImage};
use make_gfx::models::CaptureRegion;
use make_gfx::{
    AppError, Background, CancelToken, CaptureError, DatasetError, GenerationOptions,
    OutputWriter, Pipeline, ProgressEvent, RenderCapture, Renderer, RunError, WorkItem,
};

/// Renders a solid block of the scaled base size, failing for chosen lots
struct FakeRenderer {
    rendered: Vec<WorkItem>,
    /// Shared with progress callbacks to check interleaving
    journal: Rc<RefCell<Vec<String>>>,
    fail_on: Vec<&'static str>,
    cancel_after_first: Option<CancelToken>,
}

impl FakeRenderer {
    fn new() -> Self {
        Self {
            rendered: Vec::new(),
            journal: Rc::new(RefCell::new(Vec::new())),
            fail_on: Vec::new(),
            cancel_after_first: None,
        }
    }

    fn failing_on(lots: &[&'static str]) -> Self {
        Self {
            fail_on: lots.to_vec(),
            ..Self::new()
        }
    }
}

impl Renderer for FakeRenderer {
    async fn capture(
        &mut self,
        item: &WorkItem,
        options: &GenerationOptions,
    ) -> Result<RenderCapture, CaptureError> {
        self.rendered.push(item.clone());
        self.journal.borrow_mut().push(format!("capture {}", item));
        if let Some(token) = self.cancel_after_first.take() {
            token.cancel();
        }
        if self.fail_on.iter().any(|lot| *lot == item.as_str()) {
            return Err(CaptureError::NavigationTimeout { timeout_ms: 15000 });
        }

        let region = CaptureRegion::scaled(1920, 150, options.scale_factor());
        let alpha = match options.background {
            Background::Opaque => 255,
            Background::Transparent => 0,
        };
        Ok(RenderCapture::new(RgbaImage::from_pixel(
            region.width,
            region.height,
            Rgba([255, 255, 255, alpha]),
        )))
    }
}

fn write_dataset(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("data.csv");
    std::fs::write(&path, text).unwrap();
    path
}

fn png_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn renders_every_lot_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot,Name\n7,x\n9,y\n");
    let out = dir.path().join("pgmGfx");
    let mut renderer = FakeRenderer::new();

    let options = GenerationOptions {
        target: None,
        scale: 100,
        background: Background::Transparent,
    };
    let mut events: Vec<ProgressEvent> = Vec::new();
    let result = Pipeline::new(&dataset, OutputWriter::new(&out), &mut renderer)
        .run(&options, &CancelToken::new(), |event| events.push(event.clone()))
        .await
        .unwrap();

    assert_eq!(result.succeeded, 2);
    assert!(result.failed_items.is_empty());
    assert!(!result.cancelled);
    assert_eq!(png_names(&out), vec!["7.png", "9.png"]);
    assert_eq!(renderer.rendered, vec![WorkItem::from("7"), WorkItem::from("9")]);

    let currents: Vec<(usize, usize, &str)> = events
        .iter()
        .map(|e| (e.current, e.total, e.item.as_str()))
        .collect();
    assert_eq!(currents, vec![(1, 2, "7"), (2, 2, "9")]);

    let saved = image::open(out.join("7.png")).unwrap().to_rgba8();
    assert_eq!(saved.get_pixel(0, 0)[3], 0);
}

#[tokio::test]
async fn progress_is_reported_before_each_capture() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot,Name\n7,x\n9,y\n");
    let mut renderer = FakeRenderer::new();
    let journal = Rc::clone(&renderer.journal);

    Pipeline::new(&dataset, OutputWriter::new(dir.path().join("pgmGfx")), &mut renderer)
        .run(&GenerationOptions::default(), &CancelToken::new(), |event| {
            journal.borrow_mut().push(format!("progress {}", event.item));
        })
        .await
        .unwrap();

    assert_eq!(
        *renderer.journal.borrow(),
        vec!["progress 7", "capture 7", "progress 9", "capture 9"]
    );
}

#[tokio::test]
async fn oversized_scale_is_rejected_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot\n1\n");
    let mut renderer = FakeRenderer::new();

    let options = GenerationOptions {
        scale: make_gfx::models::MAX_SCALE + 1,
        ..Default::default()
    };
    let err = Pipeline::new(&dataset, OutputWriter::new(dir.path().join("pgmGfx")), &mut renderer)
        .run(&options, &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Run(RunError::InvalidOptions { .. })));
    assert!(renderer.rendered.is_empty());
}

#[tokio::test]
async fn target_renders_exactly_one_lot() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot,Name\n7,x\n9,y\n11,z\n");
    let out = dir.path().join("pgmGfx");
    let mut renderer = FakeRenderer::new();

    let options = GenerationOptions {
        target: Some(WorkItem::from("9")),
        ..Default::default()
    };
    let result = Pipeline::new(&dataset, OutputWriter::new(&out), &mut renderer)
        .run(&options, &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(result.succeeded, 1);
    assert_eq!(renderer.rendered, vec![WorkItem::from("9")]);
    assert_eq!(png_names(&out), vec!["9.png"]);
}

#[tokio::test]
async fn unknown_target_fails_before_any_lot() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot,Name\n7,x\n9,y\n");
    let mut renderer = FakeRenderer::new();
    let mut progress_calls = 0;

    let options = GenerationOptions {
        target: Some(WorkItem::from("99")),
        ..Default::default()
    };
    let err = Pipeline::new(&dataset, OutputWriter::new(dir.path().join("pgmGfx")), &mut renderer)
        .run(&options, &CancelToken::new(), |_| progress_calls += 1)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Run(RunError::UnknownItem { .. })));
    assert!(renderer.rendered.is_empty());
    assert_eq!(progress_calls, 0);
}

#[tokio::test]
async fn failing_lot_is_recorded_not_thrown() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot\n5\n");
    let out = dir.path().join("pgmGfx");
    let mut renderer = FakeRenderer::failing_on(&["5"]);

    let result = Pipeline::new(&dataset, OutputWriter::new(&out), &mut renderer)
        .run(&GenerationOptions::default(), &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(result.succeeded, 0);
    assert_eq!(result.failed_items.len(), 1);
    assert_eq!(result.failed_items[0].item, WorkItem::from("5"));
    assert!(result.failed_items[0].error.contains("navigation timed out"));
    assert!(png_names(&out).is_empty());
}

#[tokio::test]
async fn one_failure_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot\n1\n2\n3\n");
    let out = dir.path().join("pgmGfx");
    let mut renderer = FakeRenderer::failing_on(&["2"]);

    let result = Pipeline::new(&dataset, OutputWriter::new(&out), &mut renderer)
        .run(&GenerationOptions::default(), &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed_items.len(), 1);
    assert_eq!(png_names(&out), vec!["1.png", "3.png"]);
}

#[tokio::test]
async fn half_scale_halves_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot\n7\n");
    let out = dir.path().join("pgmGfx");
    let mut renderer = FakeRenderer::new();

    let options = GenerationOptions {
        scale: 50,
        background: Background::Opaque,
        ..Default::default()
    };
    Pipeline::new(&dataset, OutputWriter::new(&out), &mut renderer)
        .run(&options, &CancelToken::new(), |_| {})
        .await
        .unwrap();

    let saved = image::open(out.join("7.png")).unwrap();
    assert_eq!((saved.width(), saved.height()), (960, 75));
}

#[tokio::test]
async fn rerun_leaves_one_file_per_lot() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot,Name\n7,x\n9,y\n");
    let out = dir.path().join("pgmGfx");

    for scale in [100, 50] {
        let mut renderer = FakeRenderer::new();
        let options = GenerationOptions {
            scale,
            ..Default::default()
        };
        Pipeline::new(&dataset, OutputWriter::new(&out), &mut renderer)
            .run(&options, &CancelToken::new(), |_| {})
            .await
            .unwrap();
    }

    assert_eq!(png_names(&out), vec!["7.png", "9.png"]);
    let latest = image::open(out.join("9.png")).unwrap();
    assert_eq!(latest.width(), 960);
}

#[tokio::test]
async fn cancellation_stops_at_the_next_lot() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot\n1\n2\n3\n");
    let out = dir.path().join("pgmGfx");
    let cancel = CancelToken::new();
    let mut renderer = FakeRenderer {
        cancel_after_first: Some(cancel.clone()),
        ..FakeRenderer::new()
    };

    let result = Pipeline::new(&dataset, OutputWriter::new(&out), &mut renderer)
        .run(&GenerationOptions::default(), &cancel, |_| {})
        .await
        .unwrap();

    assert!(result.cancelled);
    assert_eq!(result.succeeded, 1);
    assert_eq!(renderer.rendered, vec![WorkItem::from("1")]);
    assert_eq!(png_names(&out), vec!["1.png"]);
}

#[tokio::test]
async fn dataset_errors_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pgmGfx");

    let missing = dir.path().join("data.csv");
    let mut renderer = FakeRenderer::new();
    let err = Pipeline::new(&missing, OutputWriter::new(&out), &mut renderer)
        .run(&GenerationOptions::default(), &CancelToken::new(), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Dataset(DatasetError::NotFound { .. })));

    let no_lot = write_dataset(dir.path(), "Name,Price\nx,1\n");
    let err = Pipeline::new(&no_lot, OutputWriter::new(&out), &mut renderer)
        .run(&GenerationOptions::default(), &CancelToken::new(), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Dataset(DatasetError::MissingIdentifierColumn { .. })
    ));

    let empty = write_dataset(dir.path(), "Lot,Name\n");
    let err = Pipeline::new(&empty, OutputWriter::new(&out), &mut renderer)
        .run(&GenerationOptions::default(), &CancelToken::new(), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Dataset(DatasetError::Empty { .. })));

    assert!(renderer.rendered.is_empty());
    // The output directory is prepared before the dataset is read.
    assert!(out.is_dir());
}

#[tokio::test]
async fn invalid_scale_is_rejected_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot\n1\n");
    let out = dir.path().join("pgmGfx");
    let mut renderer = FakeRenderer::new();

    let options = GenerationOptions {
        scale: 0,
        ..Default::default()
    };
    let err = Pipeline::new(&dataset, OutputWriter::new(&out), &mut renderer)
        .run(&options, &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Run(RunError::InvalidOptions { .. })));
    assert!(!out.exists());
}

#[tokio::test]
async fn unwritable_output_dir_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), "Lot\n1\n");
    let blocker = dir.path().join("pgmGfx");
    std::fs::write(&blocker, b"file in the way").unwrap();
    let mut renderer = FakeRenderer::new();

    let err = Pipeline::new(&dataset, OutputWriter::new(&blocker), &mut renderer)
        .run(&GenerationOptions::default(), &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(err.to_string().contains("not writable"));
    assert!(renderer.rendered.is_empty());
}
