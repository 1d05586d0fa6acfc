//! 本地内容服务器
//!
//! 在固定的回环端口上提供数据集、按批号参数化的模板以及应用目录下的静态文件。
//! 启动采用 start-or-attach 语义：端口已被占用时，认为已有实例在提供相同的文件，
//! 直接复用。

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{DatasetError, ServerError};
use crate::models::{read_dataset_text, WorkItem};
use crate::server::template::{requested_lot, substitute_lot};

/// 当前进程是否持有监听套接字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// 由本进程绑定端口并处理请求
    Owned,
    /// 端口已被占用，请求交给占用端口的服务
    Attached,
}

struct ServerState {
    dataset_file: String,
    dataset_path: PathBuf,
    template_file: String,
    template_path: PathBuf,
}

struct RunningServer {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct ContentServer {
    port: u16,
    mode: ServeMode,
    template_file: String,
    running: Option<RunningServer>,
}

impl ContentServer {
    /// 绑定配置的端口；端口已被占用时直接复用
    pub async fn start_or_attach(config: &Config) -> Result<Self, ServerError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, config.server_port));

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                warn!(
                    "⚠️ 端口 {} 已被占用，复用正在监听的服务",
                    config.server_port
                );
                return Ok(Self {
                    port: config.server_port,
                    mode: ServeMode::Attached,
                    template_file: config.template_file.clone(),
                    running: None,
                });
            }
            Err(source) => {
                return Err(ServerError::BindFailed {
                    port: config.server_port,
                    source,
                })
            }
        };

        let port = listener
            .local_addr()
            .map_err(|source| ServerError::BindFailed {
                port: config.server_port,
                source,
            })?
            .port();

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let app = router(config);
        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                // 发送端被丢弃同样会结束服务
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                error!("内容服务器异常退出: {}", e);
            }
        });

        info!("🌐 Local server running on http://127.0.0.1:{}", port);

        Ok(Self {
            port,
            mode: ServeMode::Owned,
            template_file: config.template_file.clone(),
            running: Some(RunningServer { shutdown, handle }),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn mode(&self) -> ServeMode {
        self.mode
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// 不带查询串的模板 URL
    pub fn template_endpoint(&self) -> String {
        format!("{}/{}", self.base_url(), self.template_file)
    }

    pub fn template_url(&self, item: &WorkItem) -> String {
        item_url(&self.template_endpoint(), item)
    }

    /// 停止服务并释放端口；重复调用无副作用
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown.send(());
            if let Err(e) = running.handle.await {
                warn!("内容服务器任务异常结束: {}", e);
            }
            info!("🛑 本地服务器已停止 (端口 {})", self.port);
        }
    }
}

/// `<endpoint>?<百分号编码的批号>`
///
/// 模板用 `decodeURIComponent` 解析第一个查询参数，
/// 因此空格必须编码为 `%20`，不能是 `+`。
pub fn item_url(endpoint: &str, item: &WorkItem) -> String {
    format!("{}?{}", endpoint, urlencoding::encode(item.as_str()))
}

fn router(config: &Config) -> Router {
    let state = Arc::new(ServerState {
        dataset_file: config.dataset_file.clone(),
        dataset_path: config.dataset_path(),
        template_file: config.template_file.clone(),
        template_path: config.template_path(),
    });

    Router::new()
        .route(&format!("/{}", config.dataset_file), get(serve_dataset))
        .route(&format!("/{}", config.template_file), get(serve_template))
        .fallback_service(ServeDir::new(&config.app_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_dataset(State(state): State<Arc<ServerState>>) -> Response {
    debug!("提供数据集: {}", state.dataset_path.display());
    match read_dataset_text(&state.dataset_path).await {
        Ok(text) => ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], text).into_response(),
        Err(DatasetError::NotFound { path }) => {
            warn!("未找到数据集: {}", path);
            (StatusCode::NOT_FOUND, format!("{} not found", state.dataset_file)).into_response()
        }
        Err(e) => {
            error!("读取数据集失败: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error reading {}", state.dataset_file),
            )
                .into_response()
        }
    }
}

async fn serve_template(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let html = match tokio::fs::read_to_string(&state.template_path).await {
        Ok(html) => html,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("未找到模板: {}", state.template_path.display());
            return (StatusCode::NOT_FOUND, format!("{} not found", state.template_file))
                .into_response();
        }
        Err(e) => {
            error!("读取模板失败: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error reading {}", state.template_file),
            )
                .into_response();
        }
    };

    match requested_lot(&query) {
        Some(lot) => {
            debug!("为批号 {} 提供 {}", lot, state.template_file);
            Html(substitute_lot(&html, &lot)).into_response()
        }
        None => Html(html).into_response(),
    }
}
