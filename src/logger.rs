//! 日志初始化
//!
//! 控制台一层；给定日志文件时再加一层写文件（不带颜色）。

use std::fs::File;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 初始化 tracing 日志（默认 info 级别，可通过 RUST_LOG 覆盖）
pub fn init() {
    init_with_verbose(false);
}

/// 初始化 tracing 日志，`verbose` 为 true 时默认 debug 级别
///
/// 重复调用不会 panic，只有第一次生效。
pub fn init_with_verbose(verbose: bool) {
    let _ = build_subscriber(verbose, None).try_init();
}

/// 初始化 tracing 日志，同时把日志追加写入 `log_file`
///
/// 返回是否安装成功；已有全局订阅者时返回 false，文件不会收到日志。
pub fn init_with_log_file(verbose: bool, log_file: File) -> bool {
    build_subscriber(verbose, Some(log_file)).try_init().is_ok()
}

fn build_subscriber(verbose: bool, log_file: Option<File>) -> impl Subscriber + Send + Sync {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
}
