//! 批次调度器 - 编排层
//!
//! ## 职责
//!
//! 1. **分批**：把编号列表切成固定大小的连续批次
//! 2. **顺序提交**：一次只发一个请求，等结果回来再发下一批
//! 3. **容错累计**：失败的批次只记录，不追加结果，也不中断运行
//! 4. **统计**：汇总每个批次的结果，供调用方展示
//!
//! 不做并发、不做重试、不做取消。

use crate::clients::LookupService;
use crate::models::{Batch, Identifier, ResultSet};
use crate::services::{result_accumulator, FailureWriter};
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::workflow::{BatchCtx, BatchFlow, BatchOutcome};

/// 把编号切成连续的批次
///
/// 除最后一批外每批正好 `size` 个，顺序不变。`size` 为 0 时按 1 处理。
pub fn chunk(ids: &[Identifier], size: usize) -> Vec<Batch> {
    ids.chunks(size.max(1))
        .enumerate()
        .map(|(idx, identifiers)| Batch::new(idx + 1, identifiers.to_vec()))
        .collect()
}

/// 单个批次的最终状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Succeeded { result_count: usize },
    Failed { error: String },
}

/// 单个批次的处理记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRecord {
    pub index: usize,
    pub identifiers: Vec<Identifier>,
    pub status: BatchStatus,
}

impl BatchRecord {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, BatchStatus::Failed { .. })
    }
}

/// 一次运行的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// 按提交顺序排列的批次记录
    pub batches: Vec<BatchRecord>,
    /// 累计结果
    pub results: ResultSet,
}

impl RunReport {
    pub fn batches_attempted(&self) -> usize {
        self.batches.len()
    }

    pub fn batches_failed(&self) -> usize {
        self.batches.iter().filter(|b| b.is_failed()).count()
    }

    pub fn results_total(&self) -> usize {
        self.results.len()
    }

    pub fn failed_batches(&self) -> impl Iterator<Item = &BatchRecord> {
        self.batches.iter().filter(|b| b.is_failed())
    }

    /// 有批次失败，但不是全部失败
    pub fn is_partial(&self) -> bool {
        let failed = self.batches_failed();
        failed > 0 && failed < self.batches_attempted()
    }

    /// 至少提交过一批，且全部失败
    pub fn all_failed(&self) -> bool {
        self.batches_attempted() > 0 && self.batches_failed() == self.batches_attempted()
    }
}

/// 批次完成后的进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub failed: usize,
    pub results_so_far: usize,
}

/// 批次调度器
pub struct BatchScheduler<'a, S: LookupService + ?Sized> {
    flow: BatchFlow<'a, S>,
}

impl<'a, S: LookupService + ?Sized> BatchScheduler<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self {
            flow: BatchFlow::new(service),
        }
    }

    pub fn with_failure_writer(mut self, writer: &'a FailureWriter) -> Self {
        self.flow = self.flow.with_failure_writer(writer);
        self
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.flow = self.flow.with_verbose_logging(verbose);
        self
    }

    /// 顺序处理所有批次
    pub async fn run(&self, batches: Vec<Batch>) -> RunReport {
        self.run_with_progress(batches, |_, _| {}).await
    }

    /// 顺序处理所有批次，每个批次结束后回调一次进度和目前累计的结果
    pub async fn run_with_progress<F>(&self, batches: Vec<Batch>, mut on_progress: F) -> RunReport
    where
        F: FnMut(BatchProgress, &ResultSet),
    {
        let total_batches = batches.len();
        let total_identifiers: usize = batches.iter().map(Batch::len).sum();

        let mut report = RunReport {
            batches: Vec::with_capacity(total_batches),
            results: ResultSet::new(),
        };
        let mut position = 0;

        for batch in batches {
            let ctx = BatchCtx::new(
                batch.index,
                total_batches,
                position + 1,
                position + batch.len(),
                total_identifiers,
            );
            position += batch.len();

            log_batch_start(
                ctx.batch_index,
                ctx.total_batches,
                ctx.first_position,
                ctx.last_position,
                ctx.total_identifiers,
            );

            // 一次只有一个请求在途：等本批结束再进入下一轮
            let outcome = self.flow.run(&batch, &ctx).await;

            let record = match outcome {
                BatchOutcome::Succeeded(incoming) => {
                    let result_count = incoming.len();
                    report.results = result_accumulator::merge(report.results, incoming);
                    log_batch_complete(ctx.batch_index, true, result_count, report.results.len());
                    BatchRecord {
                        index: batch.index,
                        identifiers: batch.identifiers,
                        status: BatchStatus::Succeeded { result_count },
                    }
                }
                BatchOutcome::Failed(e) => {
                    log_batch_complete(ctx.batch_index, false, 0, report.results.len());
                    BatchRecord {
                        index: batch.index,
                        identifiers: batch.identifiers,
                        status: BatchStatus::Failed {
                            error: e.to_string(),
                        },
                    }
                }
            };
            report.batches.push(record);

            on_progress(
                BatchProgress {
                    completed: report.batches_attempted(),
                    total: total_batches,
                    failed: report.batches_failed(),
                    results_so_far: report.results_total(),
                },
                &report.results,
            );
        }

        report
    }
}
