//! 结果累加 - 业务能力层
//!
//! 合并策略刻意保持最简单：直接追加。批次顺序由调度器保证。

use crate::models::{LookupResult, ResultSet};

/// 返回 `existing` 后接 `incoming` 的新结果集
///
/// 不去重、不排序、不校验 `code` 是否重复。
pub fn merge(existing: ResultSet, incoming: Vec<LookupResult>) -> ResultSet {
    existing.append(incoming)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_appends_in_order() {
        let existing = ResultSet::from(vec![LookupResult::new("1", None, None)]);
        let merged = merge(
            existing,
            vec![
                LookupResult::new("3", None, None),
                LookupResult::new("2", None, None),
            ],
        );

        let codes: Vec<&str> = merged.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "3", "2"]);
    }

    #[test]
    fn test_merge_keeps_duplicates() {
        let row = LookupResult::new("1", Some("2024-01-01"), None);
        let merged = merge(ResultSet::from(vec![row.clone()]), vec![row.clone()]);
        assert_eq!(merged, ResultSet::from(vec![row.clone(), row]));
    }

    #[test]
    fn test_merge_empty_incoming() {
        let existing = ResultSet::from(vec![LookupResult::new("1", None, None)]);
        assert_eq!(merge(existing.clone(), Vec::new()), existing);
    }
}
