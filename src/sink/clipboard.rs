//! # 剪贴板写入模块
//!
//! ## 设计思路
//!
//! 将与操作系统剪贴板交互的逻辑独立出来，便于隔离平台不稳定因素。
//! 剪贴板输出是尽力而为的：失败只返回 `TransferError::Clipboard`，由协调器记录日志，
//! 不重试，也不会让协调进程崩溃。
//!
//! ## 实现思路
//!
//! 渲染面交来的是每像素一个大端 32 位字，`arboard` 需要的是 `[R,G,B,A]` 交错字节，
//! 写入前经 `PixelBuffer` 严格校验 `字节数 == 宽 * 高 * 4`，再通过 `image::RgbaImage` 还原字节布局。

use std::borrow::Cow;

use crate::codec::{Dimensions, PackedPixelBuffer};
use crate::error::TransferError;

/// 剪贴板图片输出端。
pub trait ClipboardSink: Send + Sync {
    fn write_image(&self, pixels: &PackedPixelBuffer, dimensions: Dimensions) -> Result<(), TransferError>;
}

/// 基于 `arboard` 的系统剪贴板实现。
#[derive(Debug, Default)]
pub struct ArboardClipboard;

impl ArboardClipboard {
    pub fn new() -> Self {
        Self
    }

    /// 校验尺寸并还原为 RGBA 图像缓冲。
    pub(crate) fn prepare_image(
        pixels: &PackedPixelBuffer,
        dimensions: Dimensions,
    ) -> Result<image::RgbaImage, TransferError> {
        if dimensions.width == 0 || dimensions.height == 0 {
            return Err(TransferError::Clipboard(format!(
                "图片尺寸无效：{}x{}",
                dimensions.width, dimensions.height
            )));
        }

        let buffer = pixels.to_pixel_buffer(dimensions).map_err(|_| {
            TransferError::Clipboard(format!(
                "像素数 {} 与尺寸 {}x{} 不符",
                pixels.len(),
                dimensions.width,
                dimensions.height
            ))
        })?;

        let Dimensions { width, height } = buffer.dimensions();
        image::RgbaImage::from_raw(width, height, buffer.into_bytes())
            .ok_or_else(|| TransferError::Clipboard("构建剪贴板图像缓冲失败".to_string()))
    }
}

impl ClipboardSink for ArboardClipboard {
    fn write_image(&self, pixels: &PackedPixelBuffer, dimensions: Dimensions) -> Result<(), TransferError> {
        let image = Self::prepare_image(pixels, dimensions)?;
        let (width, height) = image.dimensions();

        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| TransferError::Clipboard(format!("无法访问剪贴板：{}", e)))?;

        let image_data = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(image.into_raw()),
        };

        clipboard
            .set_image(image_data)
            .map_err(|e| TransferError::Clipboard(format!("复制失败：{}", e)))?;

        log::info!("📋 已写入剪贴板图片 {}x{}", width, height);
        Ok(())
    }
}
