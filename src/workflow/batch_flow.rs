//! 单批次处理流程 - 流程层
//!
//! 核心职责：定义"一个批次"的完整处理流程
//!
//! 流程顺序：
//! 1. 调用查询服务（一次请求）
//! 2. 成功 → 返回结果
//! 3. 失败 → 记录日志、写入失败记录文件，返回失败（不中断整个运行）

use tracing::{debug, error, info, warn};

use crate::clients::LookupService;
use crate::error::AppError;
use crate::models::{Batch, LookupResult};
use crate::services::FailureWriter;
use crate::utils::logging::truncate_text;
use crate::workflow::batch_ctx::BatchCtx;

/// 批次处理结果
#[derive(Debug)]
pub enum BatchOutcome {
    /// 查询成功，按服务返回的顺序携带结果
    Succeeded(Vec<LookupResult>),
    /// 查询失败（网络错误、非成功状态码或无法解析的响应）
    Failed(AppError),
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Succeeded(_))
    }
}

/// 单批次处理流程
///
/// - 每个批次只发一次请求，不重试
/// - 失败只影响当前批次
/// - 不持有结果集，合并由调度器负责
pub struct BatchFlow<'a, S: LookupService + ?Sized> {
    service: &'a S,
    failure_writer: Option<&'a FailureWriter>,
    verbose_logging: bool,
}

impl<'a, S: LookupService + ?Sized> BatchFlow<'a, S> {
    /// 创建新的批次处理流程
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            failure_writer: None,
            verbose_logging: false,
        }
    }

    /// 失败批次同时写入记录文件
    pub fn with_failure_writer(mut self, writer: &'a FailureWriter) -> Self {
        self.failure_writer = Some(writer);
        self
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    pub async fn run(&self, batch: &Batch, ctx: &BatchCtx) -> BatchOutcome {
        info!("{} 🔍 提交 {} 个编号到查询服务...", ctx, batch.len());

        if self.verbose_logging {
            debug!("{} 编号: {}", ctx, batch.codes().join(", "));
        }

        match self.service.lookup(&batch.identifiers).await {
            Ok(results) => {
                info!("{} ✓ 查询成功，返回 {} 条结果", ctx, results.len());
                if self.verbose_logging {
                    self.log_results(ctx, &results);
                }
                BatchOutcome::Succeeded(results)
            }
            Err(e) => {
                error!("{} ❌ 查询失败，本批不计入结果: {}", ctx, e);
                self.record_failure(batch, ctx, &e).await;
                BatchOutcome::Failed(e)
            }
        }
    }

    /// 写入失败记录（写入失败只告警，不影响流程）
    async fn record_failure(&self, batch: &Batch, ctx: &BatchCtx, err: &AppError) {
        let Some(writer) = self.failure_writer else {
            return;
        };

        match writer
            .write(batch.index, &batch.identifiers, &err.to_string())
            .await
        {
            Ok(()) => warn!("{} ⚠️ 已写入 {}", ctx, writer.path()),
            Err(write_err) => warn!("{} ⚠️ 写入失败记录出错: {}", ctx, write_err),
        }
    }

    fn log_results(&self, ctx: &BatchCtx, results: &[LookupResult]) {
        for (i, result) in results.iter().take(3).enumerate() {
            debug!(
                "{}   {}. {} | {} | {}",
                ctx,
                i + 1,
                result.code,
                result.date.as_deref().unwrap_or("-"),
                truncate_text(result.summary.as_deref().unwrap_or("-"), 60)
            );
        }
    }
}
