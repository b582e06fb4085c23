//! 失败批次记录 - 业务能力层
//!
//! 只负责把失败批次的编号写入文件，方便人工重新提交，不做重试。

use crate::error::{AppError, AppResult};
use crate::models::Identifier;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 失败批次写入服务
pub struct FailureWriter {
    file_path: String,
}

impl FailureWriter {
    /// 创建写入 `path` 的失败记录服务
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.file_path
    }

    /// 追加一条失败记录
    ///
    /// 格式：`时间 | 批次 N | 编号: a;b;c | 原因: ...`，一行一条。
    pub async fn write(
        &self,
        batch_index: usize,
        identifiers: &[Identifier],
        reason: &str,
    ) -> AppResult<()> {
        debug!(
            "写入失败批次: 批次 {} | 编号数量: {}",
            batch_index,
            identifiers.len()
        );

        let codes = identifiers
            .iter()
            .map(Identifier::as_str)
            .collect::<Vec<_>>()
            .join(";");
        let line = format!(
            "{} | 批次 {} | 编号: {} | 原因: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            batch_index,
            codes,
            reason.replace(['\r', '\n'], " ")
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await
            .map_err(|e| AppError::file_write_failed(&self.file_path, e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(&self.file_path, e))?;

        Ok(())
    }
}
