//! # make_gfx
//!
//! 为数据集中的每一行（批号）渲染一张 PNG 图：在无头浏览器中加载参数化的
//! HTML 模板并截取固定像素区域。
//!
//! ## 分层
//!
//! ### ① 基础设施层
//! - `browser/` - 启动无头浏览器或连接已运行的浏览器
//! - `infrastructure/` - `JsExecutor`，在截图页面执行脚本
//! - `server/` - 本地内容服务器：数据集、按批号的模板、静态资源
//!
//! ### ② 服务层
//! - `RenderSession` - 每个批号独立上下文：导航、等待就绪、设置样式、截图
//! - `OutputWriter` - `<output>/<lot>.png`
//!
//! ### ③ 工作流层
//! - `ItemFlow` - 单个批号：截图 → 写入
//!
//! ### ④ 编排层
//! - `Pipeline` - 顺序运行，支持进度、取消和单批号失败隔离
//! - `App` - 持有服务器和浏览器，提供前端查询

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

pub use config::Config;
pub use error::{AppError, AppResult, CaptureError, DatasetError, ItemError, OutputError, RunError};
pub use models::{Background, GenerationOptions, ProgressEvent, RenderCapture, RunResult, WorkItem};
pub use orchestrator::{App, CancelToken, Pipeline};
pub use server::{ContentServer, ServeMode};
pub use services::{OutputWriter, RenderSession, Renderer};
