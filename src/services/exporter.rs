//! 导出服务 - 业务能力层
//!
//! 把累计的查询结果转换为 CSV 文本和 Excel 工作簿。
//! 两个函数都只依赖传入的结果快照；结果为空时不生成文件（返回 None）。

use crate::error::AppResult;
use crate::models::{LookupResult, ResultSet};
use crate::services::xlsx::{self, Cell, Sheet};
use chrono::{NaiveDate, NaiveDateTime};

/// 导出表头
pub const HEADERS: [&str; 3] = ["Codigo", "Fecha", "Sumilla"];

/// Excel 工作表名
pub const SHEET_NAME: &str = "Resultado";

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// 生成 CSV 文本
///
/// 字段直接用逗号连接，不加引号也不转义：摘要里的逗号会导致列错位。
/// 摘要中的换行（`\r\n`、`\n`、`\r`）替换为一个空格。
pub fn to_delimited_text(results: &ResultSet) -> Option<String> {
    if results.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push(HEADERS.join(","));

    for result in results {
        let row = [
            result.code.clone(),
            result.date.clone().unwrap_or_default(),
            result
                .summary
                .as_deref()
                .map(flatten_line_breaks)
                .unwrap_or_default(),
        ];
        lines.push(row.join(","));
    }

    Some(lines.join("\n"))
}

/// 生成 Excel 工作簿（单个工作表 `Resultado`）
///
/// 能识别为日期的 `date` 写成日期单元格，其余写成文本。
pub fn to_spreadsheet(results: &ResultSet) -> AppResult<Option<Vec<u8>>> {
    if results.is_empty() {
        return Ok(None);
    }

    let mut sheet = Sheet::new(SHEET_NAME);
    sheet.push_row(
        HEADERS
            .iter()
            .map(|header| Cell::Text(header.to_string()))
            .collect(),
    );

    for result in results {
        sheet.push_row(spreadsheet_row(result));
    }

    xlsx::write_workbook(&sheet).map(Some)
}

fn spreadsheet_row(result: &LookupResult) -> Vec<Cell> {
    vec![
        Cell::Text(result.code.clone()),
        result.date.as_deref().map(date_cell).unwrap_or(Cell::Empty),
        result
            .summary
            .as_deref()
            .map(|summary| Cell::Text(summary.to_string()))
            .unwrap_or(Cell::Empty),
    ]
}

fn date_cell(raw: &str) -> Cell {
    match parse_date(raw) {
        Some((serial, with_time)) => Cell::Date { serial, with_time },
        None if raw.is_empty() => Cell::Empty,
        None => Cell::Text(raw.to_string()),
    }
}

/// 解析日期，返回 (Excel 序列值, 是否包含时间)
fn parse_date(raw: &str) -> Option<(f64, bool)> {
    let raw = raw.trim();

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some((excel_serial(datetime)?, true));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some((excel_serial(date.and_hms_opt(0, 0, 0)?)?, false));
        }
    }

    None
}

/// Excel 序列值（1900 日期系统）：1900-01-01 为第 1 天
///
/// Excel 把 1900-02-29 算作存在的一天，所以 1900-03-01 起序列值要多加 1。
/// 1900 年之前的日期无法表示，返回 None。
fn excel_serial(datetime: NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 31)?.and_hms_opt(0, 0, 0)?;
    let first_day = NaiveDate::from_ymd_opt(1900, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let phantom_leap_day = NaiveDate::from_ymd_opt(1900, 3, 1)?.and_hms_opt(0, 0, 0)?;

    if datetime < first_day {
        return None;
    }
    let mut days = datetime.signed_duration_since(epoch).num_seconds() as f64 / 86_400.0;
    if datetime >= phantom_leap_day {
        days += 1.0;
    }
    Some(days)
}

fn flatten_line_breaks(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
