//! 单个批号的完整流程：截图，然后写盘

use std::path::PathBuf;

use tracing::info;

use crate::error::ItemError;
use crate::models::{GenerationOptions, ProgressEvent};
use crate::services::{OutputWriter, Renderer};

/// 单批号流程
///
/// 自身不持有资源；渲染器和写入器在处理一个批号期间从流水线借用
pub struct ItemFlow<'a, R: Renderer> {
    renderer: &'a mut R,
    writer: &'a OutputWriter,
}

impl<'a, R: Renderer> ItemFlow<'a, R> {
    pub fn new(renderer: &'a mut R, writer: &'a OutputWriter) -> Self {
        Self { renderer, writer }
    }

    pub async fn run(&mut self, event: &ProgressEvent, options: &GenerationOptions) -> Result<PathBuf, ItemError> {
        info!("[{}/{}] 🎨 处理批号 {}", event.current, event.total, event.item);

        let capture = self.renderer.capture(&event.item, options).await?;
        let path = self.writer.write(&event.item, &capture).await?;

        Ok(path)
    }
}
