use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use make_gfx::orchestrator::{dataset_exists, list_work_items};
use make_gfx::utils::logging;
use make_gfx::models::MAX_SCALE;
use make_gfx::{App, Background, CancelToken, Config, GenerationOptions, WorkItem};

/// 为数据集中的每个批号生成一张 PNG 图
#[derive(Parser, Debug)]
#[command(name = "makegfx", version, about)]
struct Cli {
    /// 只渲染该批号；省略时渲染全部
    lot: Option<String>,

    /// 缩放百分比 (1-400)
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SCALE)))]
    scale: u32,

    /// 页面背景: opaque|white 或 transparent|alpha
    #[arg(long, default_value = "transparent")]
    background: Background,

    /// TOML 配置文件；省略时读取环境变量
    #[arg(long)]
    config: Option<PathBuf>,

    /// 打印数据集中的批号后退出
    #[arg(long)]
    list: bool,

    /// 检查数据集是否存在后退出
    #[arg(long)]
    check: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::from_env(),
    };

    logging::init(cli.verbose || config.verbose_logging);

    if cli.check {
        let exists = dataset_exists(&config).await;
        println!(
            "{} {}",
            if exists { "✓" } else { "✗" },
            config.dataset_path().display()
        );
        if !exists {
            std::process::exit(1);
        }
        return Ok(());
    }

    if cli.list {
        let lots = list_work_items(&config).await?;
        for lot in &lots {
            println!("{}", lot);
        }
        info!("共 {} 个批号", lots.len());
        return Ok(());
    }

    let options = GenerationOptions {
        target: cli.lot.map(WorkItem::from),
        scale: cli.scale,
        background: cli.background,
    };

    let mut app = App::initialize(config).await?;

    let cancel = CancelToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⏹️ 收到取消请求，当前批号完成后停止");
            ctrl_c.cancel();
        }
    });

    let outcome = app
        .generate(&options, &cancel, |progress| {
            info!("⏳ 处理中 {}", progress);
        })
        .await;
    app.shutdown().await;

    let result = outcome?;
    if !result.failed_items.is_empty() {
        anyhow::bail!("{} lot(s) failed", result.failed_items.len());
    }

    Ok(())
}
