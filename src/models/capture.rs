use image::RgbaImage;

/// 指定缩放下截图区域的像素尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    /// 两个方向均为 `round(base * factor)`，从原点开始
    pub fn scaled(base_width: u32, base_height: u32, factor: f64) -> Self {
        Self {
            width: (f64::from(base_width) * factor).round() as u32,
            height: (f64::from(base_height) * factor).round() as u32,
        }
    }
}

/// 截图结果，只存在于截图和写盘之间
#[derive(Debug, Clone)]
pub struct RenderCapture {
    pub image: RgbaImage,
}

impl RenderCapture {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
