//! 应用门面
//!
//! 在程序生命周期内持有内容服务器和渲染会话，
//! 对前端暴露数据集查询以及 `generate`（带进度与取消的流水线运行）。

use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{self, GenerationOptions, ProgressEvent, RunResult, WorkItem};
use crate::orchestrator::{CancelToken, Pipeline};
use crate::server::ContentServer;
use crate::services::{OutputWriter, RenderSession, RenderSettings};
use crate::utils::logging::{log_startup, print_final_stats};

pub struct App {
    config: Config,
    server: ContentServer,
    session: RenderSession,
}

impl App {
    /// 启动（或复用）内容服务器，然后启动浏览器
    pub async fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        // 首次导航前服务器必须已在监听
        let server = ContentServer::start_or_attach(&config).await?;

        let (browser, handler) = browser::open_browser(&config).await?;
        let session = RenderSession::new(
            browser,
            handler,
            config.browser_debug_port.is_none(),
            RenderSettings::from_config(&config),
            server.template_endpoint(),
        );

        Ok(Self {
            config,
            server,
            session,
        })
    }

    pub async fn dataset_exists(&self) -> bool {
        dataset_exists(&self.config).await
    }

    pub async fn list_work_items(&self) -> AppResult<Vec<WorkItem>> {
        list_work_items(&self.config).await
    }

    /// 运行一次流水线
    pub async fn generate<F>(
        &mut self,
        options: &GenerationOptions,
        cancel: &CancelToken,
        on_progress: F,
    ) -> AppResult<RunResult>
    where
        F: FnMut(&ProgressEvent),
    {
        let writer = OutputWriter::new(self.config.output_path());
        let mut pipeline = Pipeline::new(self.config.dataset_path(), writer, &mut self.session);

        let result = pipeline.run(options, cancel, on_progress).await?;
        print_final_stats(&result);
        Ok(result)
    }

    /// 关闭浏览器并释放端口
    pub async fn shutdown(self) {
        let Self {
            mut server,
            session,
            ..
        } = self;
        session.close().await;
        server.stop().await;
        info!("👋 已退出");
    }
}

/// 数据集文件是否存在；不需要服务器和浏览器
pub async fn dataset_exists(config: &Config) -> bool {
    let path = config.dataset_path();
    let exists = models::dataset_exists(&path).await;
    if !exists {
        warn!("未找到数据集: {}", path.display());
    }
    exists
}

/// 列出所有批号；不需要服务器和浏览器
pub async fn list_work_items(config: &Config) -> AppResult<Vec<WorkItem>> {
    Ok(models::load_work_items(&config.dataset_path()).await?)
}
