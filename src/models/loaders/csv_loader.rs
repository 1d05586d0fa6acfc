use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use crate::error::DatasetError;
use crate::models::dataset::{Dataset, DatasetRecord};
use crate::models::WorkItem;

const BOM: char = '\u{feff}';

/// 数据集文件是否存在
pub async fn dataset_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// 读取数据集文本，去掉开头的 BOM
pub async fn read_dataset_text(path: &Path) -> Result<String, DatasetError> {
    if !dataset_exists(path).await {
        return Err(DatasetError::NotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| DatasetError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

    Ok(match content.strip_prefix(BOM) {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// 解析带表头的逗号分隔文本；跳过空行
pub fn parse_dataset(text: &str, path: &Path) -> Result<Dataset, DatasetError> {
    let malformed = |source| DatasetError::Malformed {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(malformed)?;
        let fields = columns
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();
        records.push(DatasetRecord::new(fields));
    }

    if records.is_empty() {
        return Err(DatasetError::Empty {
            path: path.display().to_string(),
        });
    }

    debug!("解析到 {} 条记录，列: {:?}", records.len(), columns);
    Ok(Dataset::new(columns, records))
}

/// 读取并解析整个数据集
pub async fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let text = read_dataset_text(path).await?;
    parse_dataset(&text, path)
}

/// 按文件顺序返回所有批号
pub async fn load_work_items(path: &Path) -> Result<Vec<WorkItem>, DatasetError> {
    info!("📁 从文件读取批号: {}", path.display());
    let dataset = load_dataset(path).await?;
    let items = dataset.work_items()?;
    info!("✓ 找到 {} 个批号", items.len());
    Ok(items)
}
