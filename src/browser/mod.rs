pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_headless_browser;

use chromiumoxide::Browser;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::BrowserError;

/// 配置了 `browser_debug_port` 时连接已有浏览器，否则启动无头浏览器
pub async fn open_browser(config: &Config) -> Result<(Browser, JoinHandle<()>), BrowserError> {
    match config.browser_debug_port {
        Some(port) => connect_to_browser(port).await,
        None => launch_headless_browser(config).await,
    }
}
