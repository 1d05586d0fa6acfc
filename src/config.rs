use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 应用目录：数据集、模板和静态资源所在目录
    pub app_dir: PathBuf,
    /// `app_dir` 下的数据集文件名
    pub dataset_file: String,
    /// `app_dir` 下的模板文件名
    pub template_file: String,
    /// 输出目录，非绝对路径时相对于 `app_dir`
    pub output_dir: PathBuf,
    /// 内容服务器的回环端口
    pub server_port: u16,
    /// 基础截图宽度 (CSS 像素)
    pub base_width: u32,
    /// 基础截图高度 (CSS 像素)
    pub base_height: u32,
    /// 单个批号的导航超时 (毫秒)
    pub navigation_timeout_ms: u64,
    /// 单个批号的就绪等待时间 (毫秒)
    pub ready_timeout_ms: u64,
    /// 就绪轮询间隔 (毫秒)
    pub ready_poll_interval_ms: u64,
    /// 模板就绪后设置的全局变量
    pub ready_flag: String,
    /// 背景随背景模式变化的元素 id
    pub background_container_id: String,
    /// 应用缩放变换的元素选择器
    pub scale_container_selector: String,
    /// Chrome/Chromium 可执行文件；未设置时自动查找
    pub chrome_executable: Option<PathBuf>,
    /// 连接到在该调试端口上监听的浏览器，而不是启动新的
    pub browser_debug_port: Option<u16>,
    /// 是否显示调试日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("."),
            dataset_file: "data.csv".to_string(),
            template_file: "gfx.html".to_string(),
            output_dir: PathBuf::from("pgmGfx"),
            server_port: 3020,
            base_width: 1920,
            base_height: 150,
            navigation_timeout_ms: 15_000,
            ready_timeout_ms: 10_000,
            ready_poll_interval_ms: 100,
            ready_flag: "screenshotReady".to_string(),
            background_container_id: "bottomRowContainer".to_string(),
            scale_container_selector: ".main-container".to_string(),
            chrome_executable: None,
            browser_debug_port: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            app_dir: std::env::var("MAKEGFX_APP_DIR").map(PathBuf::from).unwrap_or(default.app_dir),
            dataset_file: std::env::var("MAKEGFX_DATASET_FILE").unwrap_or(default.dataset_file),
            template_file: std::env::var("MAKEGFX_TEMPLATE_FILE").unwrap_or(default.template_file),
            output_dir: std::env::var("MAKEGFX_OUTPUT_DIR").map(PathBuf::from).unwrap_or(default.output_dir),
            server_port: std::env::var("MAKEGFX_SERVER_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.server_port),
            base_width: std::env::var("MAKEGFX_BASE_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(default.base_width),
            base_height: std::env::var("MAKEGFX_BASE_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.base_height),
            navigation_timeout_ms: std::env::var("MAKEGFX_NAVIGATION_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.navigation_timeout_ms),
            ready_timeout_ms: std::env::var("MAKEGFX_READY_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ready_timeout_ms),
            ready_poll_interval_ms: std::env::var("MAKEGFX_READY_POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.ready_poll_interval_ms),
            ready_flag: std::env::var("MAKEGFX_READY_FLAG").unwrap_or(default.ready_flag),
            background_container_id: std::env::var("MAKEGFX_BACKGROUND_CONTAINER_ID").unwrap_or(default.background_container_id),
            scale_container_selector: std::env::var("MAKEGFX_SCALE_CONTAINER_SELECTOR").unwrap_or(default.scale_container_selector),
            chrome_executable: std::env::var("MAKEGFX_CHROME_EXECUTABLE").ok().map(PathBuf::from).or(default.chrome_executable),
            browser_debug_port: std::env::var("MAKEGFX_BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).or(default.browser_debug_port),
            verbose_logging: std::env::var("MAKEGFX_VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置；缺失的键保留默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.app_dir.join(&self.dataset_file)
    }

    pub fn template_path(&self) -> PathBuf {
        self.app_dir.join(&self.template_file)
    }

    /// `app_dir.join` 对绝对路径保持不变
    pub fn output_path(&self) -> PathBuf {
        self.app_dir.join(&self.output_dir)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms.max(1))
    }
}
