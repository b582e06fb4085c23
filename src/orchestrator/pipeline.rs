//! 查询流水线 - 编排层
//!
//! 持有整个流程的状态（选中的文件、运行状态、累计结果），并保证同一时刻
//! 只有一个批次循环在运行。
//!
//! 状态流转：
//!
//! ```text
//! Idle ──选择文件──▶ FileSelected ──运行──▶ Running ──最后一批结束──▶ Completed
//!                         ▲                                              │
//!                         └──────────────────选择新文件───────────────────┘
//! ```
//!
//! `Running` 期间再次调用 `run` 或 `select_file` 会直接返回
//! `PipelineError::AlreadyRunning`，不会创建第二个循环。

use crate::clients::LookupService;
use crate::error::{AppResult, FileError, PipelineError};
use crate::models::loaders::csv_loader::{ingest, is_csv_path, load_csv_file};
use crate::models::ResultSet;
use crate::orchestrator::batch_scheduler::{chunk, BatchProgress, BatchScheduler, RunReport};
use crate::services::{exporter, FailureWriter};
use crate::utils::logging::log_identifiers_loaded;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    FileSelected,
    Running,
    Completed,
}

/// 流水线状态
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub run_state: RunState,
    pub selected_file: Option<PathBuf>,
    pub results: ResultSet,
    pub progress: Option<BatchProgress>,
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 文件中没有解析出任何编号，没有发出请求
    NoIdentifiers { header_found: bool, rows_read: usize },
    /// 所有批次都已处理（可能有失败批次）
    Finished(RunReport),
}

impl RunOutcome {
    pub fn batches_attempted(&self) -> usize {
        match self {
            RunOutcome::NoIdentifiers { .. } => 0,
            RunOutcome::Finished(report) => report.batches_attempted(),
        }
    }

    pub fn batches_failed(&self) -> usize {
        match self {
            RunOutcome::NoIdentifiers { .. } => 0,
            RunOutcome::Finished(report) => report.batches_failed(),
        }
    }

    pub fn results_total(&self) -> usize {
        match self {
            RunOutcome::NoIdentifiers { .. } => 0,
            RunOutcome::Finished(report) => report.results_total(),
        }
    }
}

/// 查询流水线
pub struct Pipeline<S: LookupService> {
    service: S,
    batch_size: usize,
    failure_writer: Option<FailureWriter>,
    verbose_logging: bool,
    state: Mutex<PipelineState>,
}

impl<S: LookupService> Pipeline<S> {
    pub fn new(service: S, batch_size: usize) -> Self {
        Self {
            service,
            batch_size,
            failure_writer: None,
            verbose_logging: false,
            state: Mutex::new(PipelineState::default()),
        }
    }

    pub fn with_failure_writer(mut self, writer: FailureWriter) -> Self {
        self.failure_writer = Some(writer);
        self
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    pub fn run_state(&self) -> RunState {
        self.lock_state().run_state
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> PipelineState {
        self.lock_state().clone()
    }

    /// 当前累计结果快照
    pub fn results(&self) -> ResultSet {
        self.lock_state().results.clone()
    }

    /// 选择待查询的 CSV 文件
    ///
    /// 会清空之前的结果。非 CSV 文件会被拒绝，同时清除已选文件。
    pub fn select_file(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let mut state = self.lock_state();

        if state.run_state == RunState::Running {
            return Err(PipelineError::AlreadyRunning.into());
        }

        state.results = ResultSet::new();
        state.progress = None;

        if !is_csv_path(path) {
            state.selected_file = None;
            state.run_state = RunState::Idle;
            return Err(FileError::NotCsv {
                path: path.display().to_string(),
            }
            .into());
        }

        info!("📁 已选择文件: {}", path.display());
        state.selected_file = Some(path.to_path_buf());
        state.run_state = RunState::FileSelected;
        Ok(())
    }

    /// 读取选中的文件并顺序处理所有批次
    ///
    /// 只有文件读取失败才会返回错误（状态回到 `FileSelected`）；
    /// 批次失败体现在返回的 `RunReport` 中。
    pub async fn run(&self) -> AppResult<RunOutcome> {
        let path = self.begin_run()?;
        let mut guard = RunGuard {
            state: &self.state,
            finished: false,
        };

        let contents = load_csv_file(&path).await?;
        let ingestion = ingest(&contents);

        if ingestion.is_empty() {
            warn!(
                "⚠️ 文件中没有可查询的编号 (找到 EXPEDIENTE 列: {}, 数据行: {})",
                ingestion.header_found, ingestion.rows_read
            );
            guard.complete(ResultSet::new());
            return Ok(RunOutcome::NoIdentifiers {
                header_found: ingestion.header_found,
                rows_read: ingestion.rows_read,
            });
        }

        let batches = chunk(&ingestion.identifiers, self.batch_size);
        log_identifiers_loaded(ingestion.identifiers.len(), self.batch_size, batches.len());

        let mut scheduler =
            BatchScheduler::new(&self.service).with_verbose_logging(self.verbose_logging);
        if let Some(writer) = &self.failure_writer {
            scheduler = scheduler.with_failure_writer(writer);
        }

        let report = scheduler
            .run_with_progress(batches, |progress, results| {
                let mut state = self.lock_state();
                state.progress = Some(progress);
                state.results = results.clone();
            })
            .await;

        guard.complete(report.results.clone());
        Ok(RunOutcome::Finished(report))
    }

    /// 导出 CSV 文本（无结果时返回 None）
    pub fn export_delimited_text(&self) -> Option<String> {
        exporter::to_delimited_text(&self.lock_state().results)
    }

    /// 导出 Excel 工作簿（无结果时返回 None）
    pub fn export_spreadsheet(&self) -> AppResult<Option<Vec<u8>>> {
        let results = self.results();
        exporter::to_spreadsheet(&results)
    }

    fn begin_run(&self) -> AppResult<PathBuf> {
        let mut state = self.lock_state();

        match state.run_state {
            RunState::Running => return Err(PipelineError::AlreadyRunning.into()),
            RunState::Idle => return Err(PipelineError::NoFileSelected.into()),
            RunState::FileSelected | RunState::Completed => {}
        }
        let path = state
            .selected_file
            .clone()
            .ok_or(PipelineError::NoFileSelected)?;

        state.run_state = RunState::Running;
        state.results = ResultSet::new();
        state.progress = None;
        Ok(path)
    }

    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 运行期间持有；未正常完成（读取文件出错或 future 被丢弃）时把状态退回 `FileSelected`
struct RunGuard<'a> {
    state: &'a Mutex<PipelineState>,
    finished: bool,
}

impl RunGuard<'_> {
    fn complete(&mut self, results: ResultSet) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.results = results;
        state.run_state = RunState::Completed;
        self.finished = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.run_state == RunState::Running {
            state.run_state = RunState::FileSelected;
        }
    }
}
