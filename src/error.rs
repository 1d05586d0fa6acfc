use thiserror::Error;

use crate::models::WorkItem;

/// 应用级错误类型
///
/// 出现在这里的错误会在处理批号之前终止运行。
/// 单个批号的失败使用 [`ItemError`]，记录在运行结果中。
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据集错误
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    /// 流水线的运行级错误
    #[error("run error: {0}")]
    Run(#[from] RunError),
    /// 输出目录错误
    #[error("output error: {0}")]
    Output(#[from] OutputError),
    /// 内容服务器错误
    #[error("server error: {0}")]
    Server(#[from] ServerError),
    /// 浏览器错误
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
    /// 配置错误
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// 数据集加载错误
#[derive(Debug, Error)]
pub enum DatasetError {
    /// 数据集文件不存在
    #[error("dataset not found: {path}")]
    NotFound { path: String },
    /// 文件存在但无法读取
    #[error("failed to read dataset ({path}): {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 文件不是合法的分隔文本
    #[error("malformed dataset ({path}): {source}")]
    Malformed {
        path: String,
        #[source]
        source: csv::Error,
    },
    /// 表头之后没有数据行
    #[error("dataset has no records: {path}")]
    Empty { path: String },
    /// 没有等于或包含 "lot" 的列
    #[error("could not find a Lot column (columns: {})", .columns.join(", "))]
    MissingIdentifierColumn { columns: Vec<String> },
}

/// 编排层的运行级错误
#[derive(Debug, Error)]
pub enum RunError {
    /// 数据集中没有批号
    #[error("no records found in the dataset")]
    NoData,
    /// 指定的批号不在数据集中
    #[error("lot {item} not found in the dataset")]
    UnknownItem { item: WorkItem },
    /// 生成选项校验失败
    #[error("invalid generation options: {reason}")]
    InvalidOptions { reason: String },
}

/// 输出写入错误
#[derive(Debug, Error)]
pub enum OutputError {
    /// 无法创建输出目录
    #[error("output directory is not writable ({path}): {source}")]
    DirUnwritable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 批号不能用作文件名
    #[error("lot {item:?} cannot be used as a file name")]
    InvalidFileName { item: String },
    /// PNG 编码失败
    #[error("failed to encode PNG for lot {item}: {source}")]
    EncodeFailed {
        item: String,
        #[source]
        source: image::ImageError,
    },
    /// 写入文件失败
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 内容服务器错误
#[derive(Debug, Error)]
pub enum ServerError {
    /// 端口绑定失败（端口被占用以外的原因）
    #[error("failed to bind port {port}: {source}")]
    BindFailed {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// 浏览器生命周期错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 无法构建启动配置
    #[error("browser configuration failed: {0}")]
    ConfigurationFailed(String),
    /// 无法启动浏览器进程
    #[error("failed to launch browser: {source}")]
    LaunchFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 无法连接到已运行的浏览器
    #[error("failed to connect to browser on port {port}: {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 无法读取配置文件
    #[error("failed to read config file ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件不是合法的 TOML
    #[error("failed to parse config file ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 单个批号的截图错误
#[derive(Debug, Error)]
pub enum CaptureError {
    /// 导航超时
    #[error("navigation timed out after {timeout_ms}ms")]
    NavigationTimeout { timeout_ms: u64 },
    /// 未检测到就绪标志；调用方记录警告后继续
    #[error("readiness signal not seen after {timeout_ms}ms")]
    RenderTimeout { timeout_ms: u64 },
    /// 渲染或截图过程中的其他错误
    #[error("capture failed: {reason}")]
    CaptureFailed { reason: String },
}

/// 单个批号的失败，记录在运行结果中，不终止批处理
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

// ========== 常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for CaptureError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        CaptureError::CaptureFailed {
            reason: err.to_string(),
        }
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::CaptureFailed {
            reason: format!("screenshot is not a decodable PNG: {}", err),
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 未知的目标批号
    pub fn unknown_item(item: impl Into<WorkItem>) -> Self {
        AppError::Run(RunError::UnknownItem { item: item.into() })
    }
}

impl CaptureError {
    /// 带原因描述的截图失败
    pub fn failed(reason: impl Into<String>) -> Self {
        CaptureError::CaptureFailed {
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_lists_headers() {
        let err = DatasetError::MissingIdentifierColumn {
            columns: vec!["Name".to_string(), "Price".to_string()],
        };
        assert_eq!(err.to_string(), "could not find a Lot column (columns: Name, Price)");
    }

    #[test]
    fn dataset_errors_wrap_into_app_error() {
        let err: AppError = DatasetError::Empty {
            path: "data.csv".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Dataset(DatasetError::Empty { .. })));
        assert!(err.to_string().contains("data.csv"));
    }

    #[test]
    fn item_error_is_transparent() {
        let err: ItemError = CaptureError::NavigationTimeout { timeout_ms: 15000 }.into();
        assert_eq!(err.to_string(), "navigation timed out after 15000ms");
    }
}
