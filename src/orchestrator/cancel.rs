use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 单次运行的取消请求
///
/// 克隆共享同一个标志，界面或信号处理器持有一份，流水线持有另一份。
/// 只在批号之间检查。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
