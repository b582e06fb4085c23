//! 批次处理上下文
//!
//! 封装"我正在处理第几批、覆盖哪些编号"这一信息

use std::fmt::Display;

/// 批次处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCtx {
    /// 批次编号（从1开始）
    pub batch_index: usize,

    /// 批次总数
    pub total_batches: usize,

    /// 本批第一个编号的位置（从1开始）
    pub first_position: usize,

    /// 本批最后一个编号的位置（包含）
    pub last_position: usize,

    /// 编号总数
    pub total_identifiers: usize,
}

impl BatchCtx {
    pub fn new(
        batch_index: usize,
        total_batches: usize,
        first_position: usize,
        last_position: usize,
        total_identifiers: usize,
    ) -> Self {
        Self {
            batch_index,
            total_batches,
            first_position,
            last_position,
            total_identifiers,
        }
    }
}

impl Display for BatchCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[批次 {}/{}]", self.batch_index, self.total_batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ctx = BatchCtx::new(2, 5, 4, 6, 14);
        assert_eq!(ctx.to_string(), "[批次 2/5]");
    }
}
