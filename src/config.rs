use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 查询服务配置 ---
    /// 查询服务根地址
    pub lookup_api_base_url: String,
    /// 查询接口路径
    pub lookup_endpoint: String,
    /// 每批提交的案件编号数量
    pub batch_size: usize,
    /// 单次请求超时（秒），None 表示不设置
    pub request_timeout_secs: Option<u64>,
    // --- 输入输出 ---
    /// 待查询的 CSV 文件
    pub input_file: String,
    /// 导出目录
    pub output_dir: String,
    /// CSV 导出文件名
    pub csv_file_name: String,
    /// Excel 导出文件名
    pub xlsx_file_name: String,
    /// 失败批次记录文件
    pub failed_batches_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup_api_base_url: "http://localhost:3000".to_string(),
            lookup_endpoint: "/api/expedientes".to_string(),
            batch_size: 20,
            request_timeout_secs: None,
            input_file: "expedientes.csv".to_string(),
            output_dir: "output".to_string(),
            csv_file_name: "Automatizacion1.csv".to_string(),
            xlsx_file_name: "Resultado.xlsx".to_string(),
            failed_batches_file: "failed_batches.txt".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    /// 以默认值为基础，读取环境变量覆盖
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载配置，缺失的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })
    }

    /// 加载配置
    ///
    /// 优先读取 `CONFIG_FILE` 指定的文件，否则尝试当前目录的 `config.toml`，
    /// 都不存在时使用默认值；最后再应用环境变量覆盖。
    pub fn load() -> AppResult<Self> {
        let config = match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_toml_file(path)?.with_env_overrides(),
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(DEFAULT_CONFIG_FILE)?.with_env_overrides()
            }
            Err(_) => Self::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize {
                value: self.batch_size,
            }
            .into());
        }
        if self.lookup_api_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: "lookup_api_base_url".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// 完整的查询接口地址
    pub fn lookup_url(&self) -> String {
        format!(
            "{}{}",
            self.lookup_api_base_url.trim_end_matches('/'),
            self.lookup_endpoint
        )
    }

    fn with_env_overrides(self) -> Self {
        Self {
            lookup_api_base_url: std::env::var("LOOKUP_API_BASE_URL").unwrap_or(self.lookup_api_base_url),
            lookup_endpoint: std::env::var("LOOKUP_ENDPOINT").unwrap_or(self.lookup_endpoint),
            batch_size: std::env::var("BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.batch_size),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).or(self.request_timeout_secs),
            input_file: std::env::var("INPUT_FILE").unwrap_or(self.input_file),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            csv_file_name: std::env::var("CSV_FILE_NAME").unwrap_or(self.csv_file_name),
            xlsx_file_name: std::env::var("XLSX_FILE_NAME").unwrap_or(self.xlsx_file_name),
            failed_batches_file: std::env::var("FAILED_BATCHES_FILE").unwrap_or(self.failed_batches_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 5").unwrap();
        writeln!(file, "lookup_api_base_url = \"http://10.0.0.7:3000/\"").unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();

        assert_eq!(config.batch_size, 5);
        assert_eq!(config.csv_file_name, "Automatizacion1.csv");
        assert_eq!(config.lookup_url(), "http://10.0.0.7:3000/api/expedientes");
    }

    #[test]
    fn test_invalid_toml_is_reported_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = \"mucho\"").unwrap();

        let err = Config::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::File(FileError::TomlParseFailed { .. })));
    }

    #[test]
    fn test_from_env_overrides_defaults() {
        std::env::set_var("BATCH_SIZE", "7");
        std::env::set_var("VERBOSE_LOGGING", "quizas");
        let config = Config::from_env();
        std::env::remove_var("BATCH_SIZE");
        std::env::remove_var("VERBOSE_LOGGING");

        assert_eq!(config.batch_size, 7);
        assert!(!config.verbose_logging);
        assert_eq!(config.xlsx_file_name, "Resultado.xlsx");
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let config = Config {
            batch_size: 0,
            ..Config::default()
        };

        assert!(matches!(
            config.validate(),
            Err(AppError::Config(ConfigError::InvalidBatchSize { value: 0 }))
        ));
    }
}
