use std::fmt;

use serde::Serialize;

use crate::models::WorkItem;

/// 每个批号开始截图前发出一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// 在工作集中的位置，从 1 开始
    pub current: usize,
    pub total: usize,
    pub item: WorkItem,
}

impl ProgressEvent {
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.current * 100 + self.total / 2) / self.total
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lot {} ({} of {}, {}%)",
            self.item,
            self.current,
            self.total,
            self.percent()
        )
    }
}

/// 未能成功写出图片的批号
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub item: WorkItem,
    pub error: String,
}

/// 单次运行的汇总结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// 成功写出图片的批号数
    pub succeeded: usize,
    /// 按处理顺序
    pub failed_items: Vec<FailedItem>,
    /// 是否因取消请求提前结束
    pub cancelled: bool,
}

impl RunResult {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed_items.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed_items.is_empty() && !self.cancelled
    }

    pub(crate) fn record_failure(&mut self, item: WorkItem, error: impl ToString) {
        self.failed_items.push(FailedItem {
            item,
            error: error.to_string(),
        });
    }
}
