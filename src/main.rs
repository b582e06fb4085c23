use anyhow::Result;
use expediente_lookup::{App, Config};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 输入文件：命令行第一个参数优先
    let input = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.input_file));

    // 初始化（含日志）并运行应用
    let app = App::initialize(config).await?;
    app.run(&input).await?;
    app.export().await?;

    Ok(())
}
