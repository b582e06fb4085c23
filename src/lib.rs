//! # Expediente Lookup
//!
//! 从 CSV 文件读取案件编号（EXPEDIENTE），分批提交到远程查询服务，
//! 累计结果并导出为 CSV / Excel 的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有 HTTP 客户端，只暴露"查询一批编号"的能力
//! - `LookupService` - 查询能力抽象，`LookupClient` 为 HTTP 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `result_accumulator` - 结果追加合并
//! - `exporter` - CSV / Excel 导出
//! - `FailureWriter` - 写失败批次记录
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个批次"的完整处理流程
//! - `BatchCtx` - 上下文封装（批次编号 + 编号范围）
//! - `BatchFlow` - 流程编排（请求 → 成功/失败 → 记录）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_scheduler` - 分批并逐批顺序提交
//! - `orchestrator/pipeline` - 运行状态机与重入保护
//! - `orchestrator/app` - 应用入口，统计与导出
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{LookupClient, LookupService};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Batch, Identifier, LookupResult, ResultSet};
pub use orchestrator::{chunk, App, Pipeline, RunOutcome, RunReport, RunState};
pub use workflow::{BatchCtx, BatchFlow, BatchOutcome};
