use crate::error::{AppError, AppResult, FileError};
use crate::models::expediente::Identifier;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// 案件编号所在列的表头（区分大小写，完全匹配）
pub const IDENTIFIER_COLUMN: &str = "EXPEDIENTE";

const DELIMITER: char = ',';

/// CSV 解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingestion {
    /// 按文件顺序排列的案件编号
    pub identifiers: Vec<Identifier>,
    /// 是否找到 EXPEDIENTE 列
    pub header_found: bool,
    /// 数据行数（不含表头）
    pub rows_read: usize,
    /// 被跳过的行数（缺列或值为空）
    pub rows_skipped: usize,
}

impl Ingestion {
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// 解析 CSV 文本，返回案件编号列表
pub fn parse(contents: &str) -> Vec<Identifier> {
    ingest(contents).identifiers
}

/// 解析 CSV 文本并统计行数
///
/// 第一行为表头。缺少 EXPEDIENTE 列、没有数据行或者行格式不对都不算错误，
/// 只会得到更少（或零个）编号。分隔符为逗号，不处理引号转义。
pub fn ingest(contents: &str) -> Ingestion {
    let mut lines = contents.lines();

    let Some(header) = lines.next() else {
        return Ingestion::default();
    };
    let header = header.strip_prefix('\u{feff}').unwrap_or(header);

    let column = header
        .split(DELIMITER)
        .position(|name| name == IDENTIFIER_COLUMN);

    let mut ingestion = Ingestion {
        header_found: column.is_some(),
        ..Default::default()
    };

    for line in lines {
        ingestion.rows_read += 1;

        let identifier = column
            .and_then(|index| line.split(DELIMITER).nth(index))
            .and_then(Identifier::new);

        match identifier {
            Some(identifier) => ingestion.identifiers.push(identifier),
            None => ingestion.rows_skipped += 1,
        }
    }

    debug!(
        "CSV解析完成: 表头匹配={}, 数据行={}, 跳过={}, 编号={}",
        ingestion.header_found,
        ingestion.rows_read,
        ingestion.rows_skipped,
        ingestion.identifiers.len()
    );

    ingestion
}

/// 判断路径是否为 CSV 文件（按扩展名，不区分大小写）
pub fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// 读取 CSV 文件内容
pub async fn load_csv_file(path: &Path) -> AppResult<String> {
    if !is_csv_path(path) {
        return Err(FileError::NotCsv {
            path: path.display().to_string(),
        }
        .into());
    }

    match fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into()),
        Err(e) => Err(AppError::file_read_failed(path.display().to_string(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(ids: &[Identifier]) -> Vec<&str> {
        ids.iter().map(Identifier::as_str).collect()
    }

    #[test]
    fn test_trims_and_skips_blank_values() {
        let ids = parse("EXPEDIENTE\n  001  \n\n002\n");
        assert_eq!(codes(&ids), vec!["001", "002"]);
    }

    #[test]
    fn test_reads_designated_column_only() {
        let csv = "NOMBRE,EXPEDIENTE,JUZGADO\nPerez,00045-2020,1er\nGomez,00046-2020,2do\n";
        assert_eq!(codes(&parse(csv)), vec!["00045-2020", "00046-2020"]);
    }

    #[test]
    fn test_missing_header_yields_nothing() {
        let ingestion = ingest("expediente\n001\n002\n");
        assert!(!ingestion.header_found);
        assert!(ingestion.is_empty());
        assert_eq!(ingestion.rows_skipped, 2);
    }

    #[test]
    fn test_empty_and_header_only_files() {
        assert!(parse("").is_empty());
        assert!(parse("EXPEDIENTE\n").is_empty());
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let ingestion = ingest("A,EXPEDIENTE\nx,001\nonly_one\ny,002");
        assert_eq!(codes(&ingestion.identifiers), vec!["001", "002"]);
        assert_eq!(ingestion.rows_read, 3);
        assert_eq!(ingestion.rows_skipped, 1);
    }

    #[test]
    fn test_crlf_and_bom() {
        let ids = parse("\u{feff}EXPEDIENTE\r\n001\r\n002\r\n");
        assert_eq!(codes(&ids), vec!["001", "002"]);
    }

    #[test]
    fn test_duplicates_pass_through() {
        let ids = parse("EXPEDIENTE\n001\n001\n");
        assert_eq!(codes(&ids), vec!["001", "001"]);
    }

    #[test]
    fn test_is_csv_path() {
        assert!(is_csv_path(Path::new("lista.csv")));
        assert!(is_csv_path(Path::new("LISTA.CSV")));
        assert!(!is_csv_path(Path::new("lista.xlsx")));
        assert!(!is_csv_path(Path::new("lista")));
    }

    #[tokio::test]
    async fn test_load_rejects_non_csv() {
        let err = load_csv_file(Path::new("datos.txt")).await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::NotCsv { .. })));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv_file(&dir.path().join("no_existe.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::File(FileError::NotFound { .. })));
    }
}
