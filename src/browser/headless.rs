use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::BrowserError;

/// 启动无头浏览器，视口为基础截图尺寸
///
/// 返回浏览器以及驱动 CDP 事件循环的任务；浏览器关闭后任务自行结束
pub async fn launch_headless_browser(config: &Config) -> Result<(Browser, JoinHandle<()>), BrowserError> {
    info!("🚀 启动无头浏览器...");

    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .no_sandbox()
        .window_size(config.base_width, config.base_height)
        .viewport(Viewport {
            width: config.base_width,
            height: config.base_height,
            device_scale_factor: Some(1.0),
            ..Default::default()
        })
        .args(vec![
            "--disable-gpu",
            "--disable-dev-shm-usage",
            "--hide-scrollbars",
        ]);

    if let Some(executable) = &config.chrome_executable {
        debug!("浏览器可执行文件: {}", executable.display());
        builder = builder.chrome_executable(executable);
    }

    let browser_config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        BrowserError::ConfigurationFailed(e)
    })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|source| {
        error!("启动无头浏览器失败: {}", source);
        BrowserError::LaunchFailed { source }
    })?;

    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                debug!("浏览器事件循环已结束");
                break;
            }
        }
    });

    info!("✅ 无头浏览器已就绪");
    Ok((browser, handle))
}
