use crate::models::expediente::Identifier;

/// 一个批次：连续的一段案件编号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 批次编号（从1开始）
    pub index: usize,
    pub identifiers: Vec<Identifier>,
}

impl Batch {
    pub fn new(index: usize, identifiers: Vec<Identifier>) -> Self {
        Self { index, identifiers }
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// 批次内编号的字符串形式，用于请求体和日志
    pub fn codes(&self) -> Vec<&str> {
        self.identifiers.iter().map(Identifier::as_str).collect()
    }
}
