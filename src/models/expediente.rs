//! 案件编号与查询结果

use serde::{Deserialize, Serialize};
use std::fmt;

/// 案件编号（EXPEDIENTE 列中去除首尾空白后的非空值）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// 去除首尾空白，空值返回 None
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 查询服务返回的单条结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    /// 案件编号
    #[serde(rename = "codigo")]
    pub code: String,
    /// 日期
    #[serde(rename = "fecha", default)]
    pub date: Option<String>,
    /// 摘要
    #[serde(rename = "sumilla", default)]
    pub summary: Option<String>,
}

impl LookupResult {
    pub fn new(code: impl Into<String>, date: Option<&str>, summary: Option<&str>) -> Self {
        Self {
            code: code.into(),
            date: date.map(str::to_string),
            summary: summary.map(str::to_string),
        }
    }
}

/// 一次运行累计的查询结果
///
/// 只追加，不去重、不排序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    results: Vec<LookupResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LookupResult> {
        self.results.iter()
    }

    pub(crate) fn append(mut self, incoming: Vec<LookupResult>) -> Self {
        self.results.extend(incoming);
        self
    }
}

impl From<Vec<LookupResult>> for ResultSet {
    fn from(results: Vec<LookupResult>) -> Self {
        Self { results }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a LookupResult;
    type IntoIter = std::slice::Iter<'a, LookupResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
