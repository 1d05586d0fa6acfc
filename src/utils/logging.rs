//! 日志工具模块
//!
//! 初始化日志订阅器，并输出运行前后的横幅和统计信息。

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::RunResult;

/// 安装全局订阅器；`RUST_LOG` 优先于 `verbose`
pub fn init(verbose: bool) {
    let default_directive = if verbose { "make_gfx=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // 重复调用时保留第一次安装的订阅器
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 makegfx 启动");
    info!("📁 应用目录: {}", config.app_dir.display());
    info!("📄 数据集: {}", config.dataset_path().display());
    info!("🖼️ 输出目录: {}", config.output_path().display());
    info!("{}", "=".repeat(60));
}

/// 打印单次运行的最终统计
pub fn print_final_stats(result: &RunResult) {
    info!("\n{}", "=".repeat(60));
    info!("📊 生成完成");
    info!("完成时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", result.succeeded, result.attempted());
    if result.is_clean() {
        info!("🎉 全部批号渲染成功");
    }
    if !result.failed_items.is_empty() {
        error!("❌ 失败: {}", result.failed_items.len());
        for failed in &result.failed_items {
            error!("   批号 {}: {}", failed.item, truncate_text(&failed.error, 160));
        }
    }
    if result.cancelled {
        warn!("⏹️ 运行已取消；已保存的批号保留");
    }
    info!("{}", "=".repeat(60));
}

/// 截断过长的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
