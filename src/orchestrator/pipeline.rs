//! 流水线编排
//!
//! 按顺序逐个批号驱动渲染器。数据集级别的错误在处理第一个批号前终止运行；
//! 单个批号的失败只记录，不影响后续批号。

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, RunError};
use crate::models::{load_work_items, GenerationOptions, ProgressEvent, RunResult, WorkItem};
use crate::orchestrator::CancelToken;
use crate::services::{OutputWriter, Renderer};
use crate::workflow::ItemFlow;

pub struct Pipeline<'a, R: Renderer> {
    dataset_path: PathBuf,
    writer: OutputWriter,
    renderer: &'a mut R,
}

impl<'a, R: Renderer> Pipeline<'a, R> {
    pub fn new(dataset_path: impl Into<PathBuf>, writer: OutputWriter, renderer: &'a mut R) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            writer,
            renderer,
        }
    }

    /// 按 `options` 选中的批号运行一次
    ///
    /// 每个批号开始截图前调用 `on_progress`
    pub async fn run<F>(
        &mut self,
        options: &GenerationOptions,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> AppResult<RunResult>
    where
        F: FnMut(&ProgressEvent),
    {
        options.validate()?;

        self.writer.ensure_dir().await?;

        let items = load_work_items(&self.dataset_path).await?;
        if items.is_empty() {
            return Err(RunError::NoData.into());
        }

        let working_set = resolve_working_set(items, options.target.as_ref())?;
        let total = working_set.len();
        info!(
            "📋 共 {} 个批号待渲染，缩放 {}%，背景 {}",
            total, options.scale, options.background
        );

        let mut result = RunResult::default();

        for (index, item) in working_set.into_iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("⏹️ 在批号 {} 之前取消 ({}/{})", item, index + 1, total);
                result.cancelled = true;
                break;
            }

            let event = ProgressEvent {
                current: index + 1,
                total,
                item,
            };
            on_progress(&event);

            let mut flow = ItemFlow::new(&mut *self.renderer, &self.writer);
            match flow.run(&event, options).await {
                Ok(_) => result.succeeded += 1,
                Err(e) => {
                    error!("❌ 处理批号 {} 失败: {}", event.item, e);
                    result.record_failure(event.item, e);
                }
            }
        }

        Ok(result)
    }
}

/// 本次运行的批号：只有目标批号，或按加载顺序的全部批号
pub fn resolve_working_set(items: Vec<WorkItem>, target: Option<&WorkItem>) -> AppResult<Vec<WorkItem>> {
    match target {
        None => Ok(items),
        Some(target) if items.contains(target) => Ok(vec![target.clone()]),
        Some(target) => Err(AppError::unknown_item(target.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(ids: &[&str]) -> Vec<WorkItem> {
        ids.iter().map(|id| WorkItem::from(*id)).collect()
    }

    #[test]
    fn no_target_keeps_load_order() {
        let set = resolve_working_set(items(&["9", "7", "11"]), None).unwrap();
        assert_eq!(set, items(&["9", "7", "11"]));
    }

    #[test]
    fn target_selects_a_single_lot() {
        let target = WorkItem::from("7");
        let set = resolve_working_set(items(&["9", "7", "11"]), Some(&target)).unwrap();
        assert_eq!(set, items(&["7"]));
    }

    #[test]
    fn unknown_target_is_rejected() {
        let target = WorkItem::from("99");
        let err = resolve_working_set(items(&["7", "9"]), Some(&target)).unwrap_err();
        assert!(matches!(err, AppError::Run(RunError::UnknownItem { .. })));
    }
}
