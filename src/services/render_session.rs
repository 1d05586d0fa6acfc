//! 渲染会话
//!
//! 持有本次运行唯一的浏览器实例。每次截图都使用新的浏览器上下文，
//! 批号之间不共享 cookie 和注入的样式；任何退出路径上都会销毁上下文。

use std::future::Future;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, Viewport};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use image::ImageFormat;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::CaptureError;
use crate::infrastructure::JsExecutor;
use crate::models::{Background, CaptureRegion, GenerationOptions, RenderCapture, WorkItem};
use crate::server::content_server::item_url;
use crate::services::page_scripts::{background_script, readiness_script, scale_script};

/// 每个批号产出一张截图
///
/// 流水线只依赖这个 trait，不启动浏览器也能运行
#[allow(async_fn_in_trait)]
pub trait Renderer {
    async fn capture(
        &mut self,
        item: &WorkItem,
        options: &GenerationOptions,
    ) -> Result<RenderCapture, CaptureError>;
}

/// 页面尺寸、超时以及模板约定的名称
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub base_width: u32,
    pub base_height: u32,
    pub navigation_timeout: Duration,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    pub ready_flag: String,
    pub background_container_id: String,
    pub scale_container_selector: String,
}

impl RenderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_width: config.base_width,
            base_height: config.base_height,
            navigation_timeout: config.navigation_timeout(),
            ready_timeout: config.ready_timeout(),
            poll_interval: config.ready_poll_interval(),
            ready_flag: config.ready_flag.clone(),
            background_container_id: config.background_container_id.clone(),
            scale_container_selector: config.scale_container_selector.clone(),
        }
    }

    pub fn region(&self, options: &GenerationOptions) -> CaptureRegion {
        CaptureRegion::scaled(self.base_width, self.base_height, options.scale_factor())
    }
}

pub struct RenderSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 关闭会话时是否同时关闭浏览器进程
    owns_browser: bool,
    settings: RenderSettings,
    /// Template URL without the query, e.g. `http://127.0.0.1:3020/gfx.html`
    template_endpoint: String,
}

impl RenderSession {
    pub fn new(
        browser: Browser,
        handler: JoinHandle<()>,
        owns_browser: bool,
        settings: RenderSettings,
        template_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            browser,
            handler,
            owns_browser,
            settings,
            template_endpoint: template_endpoint.into(),
        }
    }

    /// 关闭浏览器（仅限自己启动的）并停止事件循环
    pub async fn close(mut self) {
        if self.owns_browser {
            if let Err(e) = self.browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                debug!("等待浏览器退出失败: {}", e);
            }
        }
        self.handler.abort();
        info!("🛑 浏览器会话已关闭");
    }

    async fn open_context(&self) -> Result<(BrowserContextId, Page), CaptureError> {
        let context_id = self
            .browser
            .execute(CreateBrowserContextParams::default())
            .await?
            .result
            .browser_context_id;

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(CaptureError::failed)?;

        match self.browser.new_page(target).await {
            Ok(page) => Ok((context_id, page)),
            Err(e) => {
                self.dispose_context(context_id).await;
                Err(e.into())
            }
        }
    }

    async fn dispose_context(&self, context_id: BrowserContextId) {
        if let Err(e) = self
            .browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await
        {
            warn!("销毁浏览器上下文失败: {}", e);
        }
    }

    async fn capture_in_page(
        &self,
        page: &Page,
        item: &WorkItem,
        options: &GenerationOptions,
    ) -> Result<RenderCapture, CaptureError> {
        let settings = &self.settings;

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(settings.base_width),
            i64::from(settings.base_height),
            1.0,
            false,
        ))
        .await?;

        let url = item_url(&self.template_endpoint, item);
        debug!("导航到: {}", url);
        match timeout(settings.navigation_timeout, page.goto(url.as_str())).await {
            Err(_) => {
                return Err(CaptureError::NavigationTimeout {
                    timeout_ms: settings.navigation_timeout.as_millis() as u64,
                })
            }
            Ok(Err(e)) => return Err(CaptureError::failed(format!("navigation failed: {}", e))),
            Ok(Ok(_)) => {}
        }

        let executor = JsExecutor::new(page.clone());

        match await_readiness(&executor, settings).await {
            Ok(()) => debug!("批号 {} 页面已就绪", item),
            Err(e) => warn!(
                "⚠️ 超时: 批号 {1} 未检测到 {0} ({2})，继续截图",
                settings.ready_flag, item, e
            ),
        }

        executor
            .eval(background_script(options.background, &settings.background_container_id))
            .await?;

        if options.scale != 100 {
            let applied: bool = executor
                .eval_as(scale_script(options.scale_factor(), &settings.scale_container_selector))
                .await?;
            if !applied {
                warn!(
                    "批号 {1} 未找到缩放容器 {0}，按未缩放布局截图",
                    settings.scale_container_selector, item
                );
            }
        }

        let region = settings.region(options);
        let png = page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .clip(Viewport {
                        x: 0.0,
                        y: 0.0,
                        width: f64::from(region.width),
                        height: f64::from(region.height),
                        scale: 1.0,
                    })
                    .capture_beyond_viewport(true)
                    .omit_background(options.background == Background::Transparent)
                    .build(),
            )
            .await?;

        let image = image::load_from_memory_with_format(&png, ImageFormat::Png)?.to_rgba8();
        if image.dimensions() != (region.width, region.height) {
            warn!(
                "批号 {}: 截图尺寸 {}x{}，预期 {}x{}",
                item,
                image.width(),
                image.height(),
                region.width,
                region.height
            );
        }

        Ok(RenderCapture::new(image))
    }
}

impl Renderer for RenderSession {
    async fn capture(
        &mut self,
        item: &WorkItem,
        options: &GenerationOptions,
    ) -> Result<RenderCapture, CaptureError> {
        let (context_id, page) = self.open_context().await?;

        let result = self.capture_in_page(&page, item, options).await;

        if let Err(e) = page.close().await {
            debug!("关闭批号 {} 的截图页面失败: {}", item, e);
        }
        self.dispose_context(context_id).await;

        result
    }
}

/// 轮询模板的就绪全局变量，直到为 `true` 或超时
pub async fn await_readiness(executor: &JsExecutor, settings: &RenderSettings) -> Result<(), CaptureError> {
    let script = readiness_script(&settings.ready_flag);
    let script = script.as_str();

    poll_until_ready(
        move || executor.eval_as::<bool>(script),
        settings.poll_interval,
        settings.ready_timeout,
    )
    .await
}

/// 每隔 `interval` 调用一次 `check`，直到返回 `true`；
/// 检查出错视为尚未就绪
pub async fn poll_until_ready<F, Fut>(mut check: F, interval: Duration, limit: Duration) -> Result<(), CaptureError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, CaptureError>>,
{
    let poll = async {
        loop {
            match check().await {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => debug!("就绪检查失败: {}", e),
            }
            sleep(interval).await;
        }
    };

    timeout(limit, poll).await.map_err(|_| CaptureError::RenderTimeout {
        timeout_ms: limit.as_millis() as u64,
    })
}
