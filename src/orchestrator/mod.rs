//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责分批和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_scheduler` - 批次调度器
//! - 把编号切成固定大小的批次（`chunk`）
//! - 逐批顺序提交，同一时刻只有一个请求
//! - 累计成功批次的结果，失败批次只记录
//!
//! ### `pipeline` - 查询流水线
//! - 持有运行状态（Idle / FileSelected / Running / Completed）
//! - 拒绝重入：运行中不能再次运行或更换文件
//! - 提供导出入口
//!
//! ### `app` - 应用入口
//! - 初始化日志、客户端、流水线
//! - 打印统计并写出导出文件
//!
//! ## 层次关系
//!
//! ```text
//! app (配置 / 日志 / 导出文件)
//!     ↓
//! pipeline (状态机，处理一个 CSV 文件)
//!     ↓
//! batch_scheduler (处理 Vec<Batch>)
//!     ↓
//! workflow::BatchFlow (处理单个 Batch)
//!     ↓
//! clients::LookupService (一次 HTTP 请求)
//! ```

pub mod app;
pub mod batch_scheduler;
pub mod pipeline;

// 重新导出主要类型
pub use app::{App, ExportedFiles};
pub use batch_scheduler::{chunk, BatchProgress, BatchRecord, BatchScheduler, BatchStatus, RunReport};
pub use pipeline::{Pipeline, PipelineState, RunOutcome, RunState};
