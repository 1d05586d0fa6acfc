//! JS 执行器
//!
//! 封装单个隔离截图上下文中的页面，只负责执行脚本，
//! 不关心批号和选项。

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::CaptureError;

pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 执行 `js_code` 并返回 JSON 值
    ///
    /// 脚本必须以可序列化为 JSON 的表达式结尾；
    /// 返回 `undefined` 时会报错
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, CaptureError> {
        let result = self.page.evaluate(js_code.into()).await?;
        result
            .into_value()
            .map_err(|e| CaptureError::failed(format!("script returned no value: {}", e)))
    }

    /// 执行并反序列化为 `T`
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T, CaptureError> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value)
            .map_err(|e| CaptureError::failed(format!("unexpected script result: {}", e)))
    }
}
