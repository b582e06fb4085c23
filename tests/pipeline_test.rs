use async_trait::async_trait;
use expediente_lookup::error::{AppError, AppResult, PipelineError};
use expediente_lookup::{Identifier, LookupResult, LookupService, Pipeline, RunState};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// 每次请求都要等测试放行才返回
struct GatedService {
    started: Notify,
    release: Notify,
    calls: AtomicUsize,
}

impl GatedService {
    fn new() -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LookupService for GatedService {
    async fn lookup(&self, identifiers: &[Identifier]) -> AppResult<Vec<LookupResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(identifiers
            .iter()
            .map(|id| LookupResult::new(id.as_str(), None, None))
            .collect())
    }
}

fn csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_second_run_while_running_is_rejected() {
    let service = Arc::new(GatedService::new());
    let pipeline = Arc::new(Pipeline::new(service.clone(), 1));
    let file = csv_file("EXPEDIENTE\n001\n002\n");
    pipeline.select_file(file.path()).unwrap();

    let first = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.run().await }
    });

    // 等第一批请求发出
    service.started.notified().await;
    assert_eq!(pipeline.run_state(), RunState::Running);

    let second = pipeline.run().await;
    assert!(matches!(
        second,
        Err(AppError::Pipeline(PipelineError::AlreadyRunning))
    ));

    let reselect = pipeline.select_file(file.path());
    assert!(matches!(
        reselect,
        Err(AppError::Pipeline(PipelineError::AlreadyRunning))
    ));
    assert_eq!(pipeline.run_state(), RunState::Running);

    // 放行第一批，等第二批发出后再放行
    service.release.notify_one();
    service.started.notified().await;
    service.release.notify_one();

    let outcome = first.await.unwrap().unwrap();

    assert_eq!(outcome.batches_attempted(), 2);
    assert_eq!(outcome.results_total(), 2);
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    assert_eq!(pipeline.run_state(), RunState::Completed);
}

#[tokio::test]
async fn test_progress_is_visible_while_running() {
    let service = Arc::new(GatedService::new());
    let pipeline = Arc::new(Pipeline::new(service.clone(), 1));
    let file = csv_file("EXPEDIENTE\n001\n002\n");
    pipeline.select_file(file.path()).unwrap();

    let handle = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.run().await }
    });

    service.started.notified().await;
    assert!(pipeline.snapshot().progress.is_none());
    service.release.notify_one();

    // 第二批发出时，第一批的进度已经记录
    service.started.notified().await;
    let progress = pipeline.snapshot().progress.unwrap();
    assert_eq!((progress.completed, progress.total), (1, 2));
    assert_eq!(progress.results_so_far, 1);
    let partial: Vec<String> = pipeline.results().iter().map(|r| r.code.clone()).collect();
    assert_eq!(partial, vec!["001"]);
    assert_eq!(pipeline.export_delimited_text().unwrap(), "Codigo,Fecha,Sumilla\n001,,");

    service.release.notify_one();
    handle.await.unwrap().unwrap();

    assert_eq!(pipeline.results().len(), 2);
}

#[tokio::test]
async fn test_dropped_run_releases_guard() {
    let service = Arc::new(GatedService::new());
    let pipeline = Arc::new(Pipeline::new(service.clone(), 1));
    let file = csv_file("EXPEDIENTE\n001\n");
    pipeline.select_file(file.path()).unwrap();

    let handle = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.run().await }
    });
    service.started.notified().await;
    handle.abort();
    let _ = handle.await;

    assert_eq!(pipeline.run_state(), RunState::FileSelected);
}
