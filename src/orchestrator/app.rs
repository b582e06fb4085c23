//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：写日志文件头并安装日志、创建查询客户端和流水线
//! 2. **运行**：选择输入文件，顺序处理所有批次
//! 3. **统计输出**：打印批次成功/失败数量和结果预览
//! 4. **导出**：把结果写成 CSV 和 Excel 文件（无结果时跳过）

use crate::clients::LookupClient;
use crate::config::Config;
use crate::error::AppError;
use crate::logger;
use crate::orchestrator::pipeline::{Pipeline, RunOutcome};
use crate::services::FailureWriter;
use crate::utils::logging::{init_log_file, log_startup, print_final_stats, print_results_table};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// 导出的文件
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub csv: Option<PathBuf>,
    pub xlsx: Option<PathBuf>,
}

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: Pipeline<LookupClient>,
    /// 日志实际写入的文件；已有全局日志订阅者时为 None
    log_file: Option<String>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件并安装日志
        let file = init_log_file(&config.output_log_file)?;
        let log_file = logger::init_with_log_file(config.verbose_logging, file)
            .then(|| config.output_log_file.clone());

        let client = LookupClient::new(&config)?;
        log_startup(client.url(), config.batch_size);

        let pipeline = Pipeline::new(client, config.batch_size)
            .with_failure_writer(FailureWriter::with_path(&config.failed_batches_file))
            .with_verbose_logging(config.verbose_logging);

        Ok(Self {
            config,
            pipeline,
            log_file,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, input: &Path) -> Result<RunOutcome> {
        self.pipeline
            .select_file(input)
            .with_context(|| format!("无法选择文件: {}", input.display()))?;

        let outcome = self.pipeline.run().await?;

        match &outcome {
            RunOutcome::NoIdentifiers { header_found, .. } => {
                if *header_found {
                    warn!("⚠️ EXPEDIENTE 列中没有有效编号，程序结束");
                } else {
                    warn!("⚠️ 没有找到 EXPEDIENTE 列，程序结束");
                }
            }
            RunOutcome::Finished(report) => {
                print_final_stats(
                    report.batches_attempted(),
                    report.batches_failed(),
                    report.results_total(),
                    self.log_file.as_deref(),
                );
                if report.all_failed() {
                    warn!(
                        "⚠️ 全部 {} 批均失败，没有结果（编号已写入 {}）",
                        report.batches_failed(),
                        self.config.failed_batches_file
                    );
                } else if report.is_partial() {
                    let failed: Vec<String> =
                        report.failed_batches().map(|b| b.index.to_string()).collect();
                    warn!(
                        "⚠️ 部分批次失败: {}（编号已写入 {}）",
                        failed.join(", "),
                        self.config.failed_batches_file
                    );
                }
                print_results_table(&report.results);
            }
        }

        Ok(outcome)
    }

    /// 导出当前结果
    pub async fn export(&self) -> Result<ExportedFiles> {
        let mut exported = ExportedFiles::default();
        let output_dir = Path::new(&self.config.output_dir);

        let csv = self.pipeline.export_delimited_text();
        let xlsx = self.pipeline.export_spreadsheet()?;

        if csv.is_none() && xlsx.is_none() {
            warn!("⚠️ 没有可导出的结果，跳过导出");
            return Ok(exported);
        }

        fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("无法创建导出目录: {}", output_dir.display()))?;

        if let Some(text) = csv {
            let path = output_dir.join(&self.config.csv_file_name);
            write_artifact(&path, text.as_bytes()).await?;
            info!("💾 CSV 已导出: {}", path.display());
            exported.csv = Some(path);
        }

        if let Some(bytes) = xlsx {
            let path = output_dir.join(&self.config.xlsx_file_name);
            write_artifact(&path, &bytes).await?;
            info!("💾 Excel 已导出: {}", path.display());
            exported.xlsx = Some(path);
        }

        Ok(exported)
    }

    pub fn pipeline(&self) -> &Pipeline<LookupClient> {
        &self.pipeline
    }
}

async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(())
}
