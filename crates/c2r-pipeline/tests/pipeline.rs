use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use c2r_client::{ClientError, Translate};
use c2r_core::{IncludeMatch, OutputFile, TranslationRequest, TranslationResponse};
use c2r_pipeline::{Pipeline, PipelineError, RunConfig, RunEvent, UnitStatus};
use c2r_scan::ScanError;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// ── Helpers ────────────────────────────────────────────────────────

/// Canned translator. Unknown projects get a single `<project>.rs` file.
#[derive(Default)]
struct MockTranslator {
    responses: HashMap<String, TranslationResponse>,
    failures: HashMap<String, String>,
    delay: Duration,
    requests: Mutex<Vec<TranslationRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTranslator {
    fn respond(mut self, project: &str, files: &[(&str, &str)]) -> Self {
        let output = files
            .iter()
            .map(|(path, code)| OutputFile {
                path: (*path).to_string(),
                code: (*code).to_string(),
            })
            .collect();
        self.responses.insert(
            project.to_string(),
            TranslationResponse {
                status: 0,
                output,
                message: None,
            },
        );
        self
    }

    fn fail(mut self, project: &str, message: &str) -> Self {
        self.failures
            .insert(project.to_string(), message.to_string());
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Translate for MockTranslator {
    fn translate(
        &self,
        request: &TranslationRequest,
    ) -> impl Future<Output = Result<TranslationResponse, ClientError>> + Send {
        async move {
            self.requests.lock().unwrap().push(request.clone());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let project = &request.project_name;
            if let Some(message) = self.failures.get(project) {
                return Err(ClientError::Service {
                    status: 1,
                    message: message.clone(),
                });
            }
            Ok(self
                .responses
                .get(project)
                .cloned()
                .unwrap_or_else(|| TranslationResponse {
                    status: 0,
                    output: vec![OutputFile {
                        path: format!("{project}.rs"),
                        code: format!("// {project}\n"),
                    }],
                    message: None,
                }))
        }
    }
}

struct Fixture {
    _dir: TempDir,
    input: std::path::PathBuf,
    output: std::path::PathBuf,
}

fn fixture(files: &[(&str, &str)]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    for (path, content) in files {
        let full = input.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }
    Fixture {
        _dir: dir,
        input,
        output,
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

async fn run(config: RunConfig, translator: MockTranslator) -> (c2r_pipeline::RunReport, Vec<RunEvent>) {
    let (rx, handle) = Pipeline::new(config, translator).start();
    let report = handle.await.unwrap().unwrap();
    let events = collect(rx).await;
    (report, events)
}

async fn collect(mut rx: tokio::sync::mpsc::UnboundedReceiver<RunEvent>) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn translates_unit_with_header_and_source_dependencies() {
    let fx = fixture(&[
        ("a.h", "int a(void);\n"),
        ("a.c", "int a(void) { return 1; }\n"),
        ("test-foo.c", "#include \"a.h\"\nint main(void) { return a(); }\n"),
    ]);
    let translator = MockTranslator::default().respond("foo", &[("src/main.rs", "fn main() {}\n")]);
    let pipeline = Pipeline::new(RunConfig::new(&fx.input, &fx.output), translator);

    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let report = pipeline.run(tx).await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(read(&fx.output.join("foo/src/main.rs")), "fn main() {}\n");
}

#[tokio::test]
async fn bundle_lists_dependencies_before_unit() {
    let fx = fixture(&[
        ("a.h", "int a(void);\n"),
        ("a.c", "int a(void) { return 1; }\n"),
        ("test-foo.c", "#include \"a.h\"\n"),
    ]);
    let translator = std::sync::Arc::new(MockTranslator::default());
    let shared = SharedTranslator(std::sync::Arc::clone(&translator));

    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    Pipeline::new(RunConfig::new(&fx.input, &fx.output), shared)
        .run(tx)
        .await
        .unwrap();

    let requests = translator.requests.lock().unwrap();
    let paths: Vec<&str> = requests[0].content.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["a.h", "a.c", "test-foo.c"]);
    assert_eq!(requests[0].content[0].code, "int a(void);\n");
}

/// Lets a test keep a handle on the mock after the pipeline takes ownership.
struct SharedTranslator(std::sync::Arc<MockTranslator>);

impl Translate for SharedTranslator {
    fn translate(
        &self,
        request: &TranslationRequest,
    ) -> impl Future<Output = Result<TranslationResponse, ClientError>> + Send {
        self.0.translate(request)
    }
}

#[tokio::test]
async fn concurrent_units_write_disjoint_outputs() {
    let fx = fixture(&[
        ("test-one.c", "int one;\n"),
        ("nested/test-two.c", "int two;\n"),
    ]);

    let (report, _) = run(
        RunConfig::new(&fx.input, &fx.output).with_concurrency(2),
        MockTranslator::default(),
    )
    .await;

    assert_eq!(report.succeeded, 2);
    assert_eq!(read(&fx.output.join("one/one.rs")), "// one\n");
    assert_eq!(read(&fx.output.join("two/two.rs")), "// two\n");
}

#[tokio::test]
async fn concurrency_limit_is_respected() {
    let files: Vec<(String, String)> = (0..6)
        .map(|i| (format!("test-u{i}.c"), String::new()))
        .collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
    let fx = fixture(&refs);

    let translator = std::sync::Arc::new(
        MockTranslator::default().with_delay(Duration::from_millis(30)),
    );
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let report = Pipeline::new(
        RunConfig::new(&fx.input, &fx.output).with_concurrency(2),
        SharedTranslator(std::sync::Arc::clone(&translator)),
    )
    .run(tx)
    .await
    .unwrap();

    assert_eq!(report.succeeded, 6);
    let max = translator.max_in_flight.load(Ordering::SeqCst);
    assert!((1..=2).contains(&max), "max in flight was {max}");
}

#[tokio::test]
async fn failing_unit_does_not_affect_sibling() {
    let fx = fixture(&[("test-bad.c", ""), ("test-good.c", "")]);
    let translator = MockTranslator::default().fail("bad", "model overloaded");

    let (report, events) = run(RunConfig::new(&fx.input, &fx.output), translator).await;

    assert_eq!((report.succeeded, report.failed), (1, 1));
    assert!(!report.is_clean());
    match &report.unit("bad").unwrap().status {
        UnitStatus::Failed {
            error,
            partial_output,
        } => {
            assert!(error.contains("model overloaded"), "{error}");
            assert!(!partial_output);
        }
        other => panic!("unexpected status {other:?}"),
    }
    assert!(fx.output.join("good/good.rs").exists());
    assert!(!fx.output.join("bad").exists());
    assert!(events.iter().any(|e| matches!(e, RunEvent::UnitFailed { project, .. } if project == "bad")));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn unreadable_unit_file_fails_only_that_unit() {
    let fx = fixture(&[("test-good.c", "")]);
    // reading /proc/self/mem from offset 0 fails with EIO
    std::os::unix::fs::symlink("/proc/self/mem", fx.input.join("test-bad.c")).unwrap();
    let translator = MockTranslator::default();

    let (report, events) = run(RunConfig::new(&fx.input, &fx.output), translator).await;

    assert_eq!(events.first(), Some(&RunEvent::Discovered { units: 2 }));
    assert_eq!((report.succeeded, report.failed), (1, 1));
    assert!(!report.is_clean());
    match &report.unit("bad").unwrap().status {
        UnitStatus::Failed {
            error,
            partial_output,
        } => {
            assert!(error.contains("test-bad.c"), "{error}");
            assert!(!partial_output);
        }
        other => panic!("unexpected status {other:?}"),
    }
    assert!(fx.output.join("good/good.rs").exists());
    assert!(!fx.output.join("bad").exists());
}

#[tokio::test]
async fn empty_output_leaves_previous_output_in_place() {
    let fx = fixture(&[("test-foo.c", "")]);
    std::fs::create_dir_all(fx.output.join("foo")).unwrap();
    std::fs::write(fx.output.join("foo/old.rs"), "old").unwrap();

    let translator = MockTranslator::default().respond("foo", &[]);
    let (report, events) = run(RunConfig::new(&fx.input, &fx.output), translator).await;

    assert_eq!(report.no_output, 1);
    assert_eq!(report.unit("foo").unwrap().status, UnitStatus::NoOutput);
    assert_eq!(read(&fx.output.join("foo/old.rs")), "old");
    assert!(events.contains(&RunEvent::UnitNoOutput {
        project: "foo".to_string()
    }));
}

#[tokio::test]
async fn rerun_replaces_stale_output() {
    let fx = fixture(&[("test-foo.c", "")]);
    std::fs::create_dir_all(fx.output.join("foo/stale")).unwrap();
    std::fs::write(fx.output.join("foo/stale/gone.rs"), "stale").unwrap();

    let (report, _) = run(RunConfig::new(&fx.input, &fx.output), MockTranslator::default()).await;

    assert_eq!(report.succeeded, 1);
    assert!(!fx.output.join("foo/stale").exists());
    assert!(fx.output.join("foo/foo.rs").exists());
}

#[tokio::test]
async fn unsafe_response_path_fails_unit_without_touching_output() {
    let fx = fixture(&[("test-foo.c", "")]);
    std::fs::create_dir_all(fx.output.join("foo")).unwrap();
    std::fs::write(fx.output.join("foo/keep.rs"), "keep").unwrap();

    let translator = MockTranslator::default().respond("foo", &[("../escape.rs", "x")]);
    let (report, _) = run(RunConfig::new(&fx.input, &fx.output), translator).await;

    assert_eq!(report.failed, 1);
    assert_eq!(read(&fx.output.join("foo/keep.rs")), "keep");
    assert!(!fx.output.join("escape.rs").exists());
}

#[tokio::test]
async fn fixed_unit_dir_rejects_colliding_units() {
    let fx = fixture(&[("test-a.c", ""), ("test-b.c", "")]);
    let translator = std::sync::Arc::new(MockTranslator::default());

    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let report = Pipeline::new(
        RunConfig::new(&fx.input, &fx.output).with_unit_dir("main"),
        SharedTranslator(std::sync::Arc::clone(&translator)),
    )
    .run(tx)
    .await
    .unwrap();

    assert_eq!(report.failed, 2);
    assert!(translator.requests.lock().unwrap().is_empty());
    assert!(!fx.output.join("main").exists());
}

#[tokio::test]
async fn fixed_unit_dir_works_for_single_unit() {
    let fx = fixture(&[("test-a.c", "")]);
    let (report, _) = run(
        RunConfig::new(&fx.input, &fx.output).with_unit_dir("main"),
        MockTranslator::default(),
    )
    .await;

    assert_eq!(report.succeeded, 1);
    assert!(fx.output.join("main/a.rs").exists());
}

#[tokio::test]
async fn invalid_project_name_fails_only_that_unit() {
    let fx = fixture(&[("test-.c", ""), ("test-ok.c", "")]);

    let (report, _) = run(RunConfig::new(&fx.input, &fx.output), MockTranslator::default()).await;

    assert_eq!((report.succeeded, report.failed), (1, 1));
    assert!(matches!(
        report.unit("").unwrap().status,
        UnitStatus::Failed { .. }
    ));
}

#[tokio::test]
async fn prefix_mode_pulls_in_related_files() {
    let fx = fixture(&[
        ("util.h", ""),
        ("util_extra.c", ""),
        ("test-foo.c", "#include \"util.h\"\n"),
    ]);
    let translator = std::sync::Arc::new(MockTranslator::default());

    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    Pipeline::new(
        RunConfig::new(&fx.input, &fx.output).with_include_match(IncludeMatch::Prefix),
        SharedTranslator(std::sync::Arc::clone(&translator)),
    )
    .run(tx)
    .await
    .unwrap();

    let requests = translator.requests.lock().unwrap();
    let paths: Vec<&str> = requests[0].content.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["util.h", "util_extra.c", "test-foo.c"]);
}

#[tokio::test]
async fn missing_input_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(
        RunConfig::new(dir.path().join("nope"), dir.path().join("out")),
        MockTranslator::default(),
    );

    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let err = pipeline.run(tx).await.unwrap_err();
    assert!(matches!(err, PipelineError::Scan(ScanError::NotFound(_))));
}

#[tokio::test]
async fn stopped_run_cancels_pending_units() {
    let fx = fixture(&[("test-a.c", ""), ("test-b.c", "")]);
    let translator = std::sync::Arc::new(MockTranslator::default());
    let pipeline = Pipeline::new(
        RunConfig::new(&fx.input, &fx.output),
        SharedTranslator(std::sync::Arc::clone(&translator)),
    );
    pipeline.stop_handle().stop();

    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let report = pipeline.run(tx).await.unwrap();

    assert_eq!(report.cancelled, 2);
    assert!(!report.is_clean());
    assert!(translator.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_input_tree_reports_nothing() {
    let fx = fixture(&[("readme.txt", "")]);
    let (report, events) = run(RunConfig::new(&fx.input, &fx.output), MockTranslator::default()).await;

    assert!(report.units.is_empty());
    assert!(report.is_clean());
    assert_eq!(events.first(), Some(&RunEvent::Discovered { units: 0 }));
}

#[tokio::test]
async fn event_stream_brackets_unit_events() {
    let fx = fixture(&[("test-foo.c", "")]);
    let (report, events) = run(RunConfig::new(&fx.input, &fx.output), MockTranslator::default()).await;

    assert_eq!(events.first(), Some(&RunEvent::Discovered { units: 1 }));
    assert_eq!(
        events[1],
        RunEvent::UnitStarted {
            project: "foo".to_string()
        }
    );
    assert!(matches!(events[2], RunEvent::UnitSucceeded { files_written: 1, .. }));
    assert_eq!(events.last(), Some(&RunEvent::AllDone(report)));
}
