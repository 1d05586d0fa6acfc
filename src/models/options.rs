use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::models::WorkItem;

/// 截图时的页面背景
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// 不透明白色
    #[serde(alias = "white")]
    Opaque,
    /// 完全透明，PNG 保留 alpha 通道
    #[default]
    #[serde(alias = "alpha")]
    Transparent,
}

impl Background {
    /// 应用到页面和容器的 CSS 值
    pub fn css_value(self) -> &'static str {
        match self {
            Background::Opaque => "white",
            Background::Transparent => "transparent",
        }
    }
}

impl FromStr for Background {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opaque" | "white" => Ok(Background::Opaque),
            "transparent" | "alpha" => Ok(Background::Transparent),
            other => Err(format!(
                "unknown background '{}', expected opaque|white|transparent|alpha",
                other
            )),
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Background::Opaque => f.write_str("opaque"),
            Background::Transparent => f.write_str("transparent"),
        }
    }
}

/// 允许的最大缩放百分比；1920×150 的 400% 已是 7680×600
pub const MAX_SCALE: u32 = 400;

/// 单次运行的选项
///
/// 默认：全部批号，100% 缩放，透明背景
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// 只渲染该批号；`None` 时按加载顺序渲染全部
    pub target: Option<WorkItem>,
    /// 缩放百分比，`1..=MAX_SCALE`
    pub scale: u32,
    pub background: Background,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            target: None,
            scale: 100,
            background: Background::default(),
        }
    }
}

impl GenerationOptions {
    /// 运行开始时校验一次
    pub fn validate(&self) -> Result<(), RunError> {
        if self.scale == 0 {
            return Err(RunError::InvalidOptions {
                reason: "scale must be greater than 0".to_string(),
            });
        }
        if self.scale > MAX_SCALE {
            return Err(RunError::InvalidOptions {
                reason: format!("scale {}% exceeds the maximum of {}%", self.scale, MAX_SCALE),
            });
        }
        if let Some(target) = &self.target {
            if target.as_str().trim().is_empty() {
                return Err(RunError::InvalidOptions {
                    reason: "target lot must not be blank".to_string(),
                });
            }
        }
        Ok(())
    }

    /// `scale / 100`，CSS 缩放和截图区域共用
    pub fn scale_factor(&self) -> f64 {
        f64::from(self.scale) / 100.0
    }
}
