//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use crate::error::{AppError, AppResult};
use crate::models::ResultSet;
use std::fs::{self, File, OpenOptions};
use tracing::info;

/// 结果预览最多显示的行数
const PREVIEW_ROWS: usize = 20;

/// 初始化日志文件
///
/// 写入文件头后以追加模式重新打开，返回的句柄交给日志订阅者。
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<File> {
    let log_header = format!(
        "{}\n案件批量查询日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    OpenOptions::new()
        .append(true)
        .open(log_file_path)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))
}

/// 记录程序启动信息
///
/// # 参数
/// - `lookup_url`: 查询接口地址
/// - `batch_size`: 每批编号数量
pub fn log_startup(lookup_url: &str, batch_size: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 案件批量查询模式（逐批顺序提交）");
    info!("🌐 查询接口: {}", lookup_url);
    info!("📊 每批编号数: {}", batch_size);
    info!("{}", "=".repeat(60));
}

/// 记录编号加载信息
///
/// # 参数
/// - `total`: 编号总数
/// - `batch_size`: 每批编号数量
/// - `total_batches`: 批次总数
pub fn log_identifiers_loaded(total: usize, batch_size: usize, total_batches: usize) {
    info!("✓ 找到 {} 个待查询的案件编号", total);
    info!("📋 将以每批 {} 个的方式处理，共 {} 批", batch_size, total_batches);
    info!("💡 每批完成后再开始下一批\n");
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `start`: 起始编号位置
/// - `end`: 结束编号位置
/// - `total`: 编号总数
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批编号: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `success`: 本批是否成功
/// - `results`: 本批返回的结果数
/// - `accumulated`: 目前累计的结果数
pub fn log_batch_complete(batch_num: usize, success: bool, results: usize, accumulated: usize) {
    info!("\n{}", "─".repeat(60));
    if success {
        info!(
            "✓ 第 {} 批完成: 返回 {} 条，累计 {} 条",
            batch_num, results, accumulated
        );
    } else {
        info!("✗ 第 {} 批失败: 累计 {} 条（不变）", batch_num, accumulated);
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `attempted`: 已提交的批次数
/// - `failed`: 失败的批次数
/// - `results`: 累计结果数
/// - `log_file_path`: 日志文件路径（没有写入文件时为 None）
pub fn print_final_stats(
    attempted: usize,
    failed: usize,
    results: usize,
    log_file_path: Option<&str>,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部批次处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功批次: {}/{}", attempted - failed, attempted);
    info!("❌ 失败批次: {}", failed);
    info!("📄 累计结果: {} 条", results);
    info!("{}", "=".repeat(60));
    if let Some(path) = log_file_path {
        info!("\n日志已保存至: {}", path);
    }
}

/// 以表格形式打印结果预览（Nombre | Código | Fecha | Sumilla）
///
/// 只显示前几行，摘要会被截断。
pub fn print_results_table(results: &ResultSet) {
    if results.is_empty() {
        return;
    }

    info!("\n{:<8} | {:<24} | {:<12} | {}", "Nombre", "Código", "Fecha", "Sumilla");
    info!("{}", "─".repeat(80));
    for result in results.iter().take(PREVIEW_ROWS) {
        info!(
            "{:<8} | {:<24} | {:<12} | {}",
            "",
            result.code,
            result.date.as_deref().unwrap_or(""),
            truncate_text(&result.summary.as_deref().unwrap_or("").replace(['\r', '\n'], " "), 40)
        );
    }
    if results.len() > PREVIEW_ROWS {
        info!("... 其余 {} 条省略", results.len() - PREVIEW_ROWS);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
