//! 输出写入
//!
//! 管理输出目录；每个批号一张 PNG，以批号命名。

use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tokio::fs;
use tracing::{debug, info};

use crate::error::OutputError;
use crate::models::{RenderCapture, WorkItem};

pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 目录不存在时创建；可重复调用
    pub async fn ensure_dir(&self) -> Result<(), OutputError> {
        let unwritable = |source| OutputError::DirUnwritable {
            path: self.output_dir.display().to_string(),
            source,
        };

        match fs::create_dir_all(&self.output_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let metadata = fs::metadata(&self.output_dir).await.map_err(unwritable)?;
                if metadata.is_dir() {
                    Ok(())
                } else {
                    Err(unwritable(e))
                }
            }
            Err(e) => Err(unwritable(e)),
        }
    }

    /// `<output_dir>/<item>.png`；不能作为文件名的批号会被拒绝
    pub fn path_for(&self, item: &WorkItem) -> Result<PathBuf, OutputError> {
        let name = item.as_str();
        let invalid = name.trim().is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if invalid {
            return Err(OutputError::InvalidFileName {
                item: name.to_string(),
            });
        }
        Ok(self.output_dir.join(format!("{}.png", name)))
    }

    /// 编码为 PNG 并写入，覆盖同一批号的旧文件
    pub async fn write(&self, item: &WorkItem, capture: &RenderCapture) -> Result<PathBuf, OutputError> {
        let path = self.path_for(item)?;

        let mut encoded = Vec::new();
        capture
            .image
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|source| OutputError::EncodeFailed {
                item: item.to_string(),
                source,
            })?;
        debug!("批号 {} 编码为 {} 字节的 PNG", item, encoded.len());

        fs::write(&path, &encoded)
            .await
            .map_err(|source| OutputError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;

        info!(
            "💾 已保存 {} ({}x{})",
            path.display(),
            capture.width(),
            capture.height()
        );
        Ok(path)
    }
}
