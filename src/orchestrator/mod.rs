//! 编排层
//!
//! ```text
//! app (服务器与浏览器生命周期、前端查询)
//!     ↓
//! pipeline (工作集、进度、取消、失败隔离)
//!     ↓
//! workflow::ItemFlow (单个批号: 截图 → 写入)
//!     ↓
//! services (渲染会话 / 输出写入)
//!     ↓
//! infrastructure (JsExecutor)
//! ```

pub mod app;
pub mod cancel;
pub mod pipeline;

pub use app::{dataset_exists, list_work_items, App};
pub use cancel::CancelToken;
pub use pipeline::{resolve_working_set, Pipeline};
