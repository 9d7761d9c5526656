//! # 像素格式转换模块
//!
//! ## 设计思路
//!
//! 渲染面产出的数据需要转换成两种完全不同的消费格式：
//! - 文件：逗号分隔的序列化字节串 → 原始 PNG 字节
//! - 剪贴板：按 `[R,G,B,A]` 交错的字节 → 每像素一个大端 32 位字
//!
//! 本模块只做纯转换，不产生任何副作用。
//!
//! ## 实现思路
//!
//! - `encode_blob` 逐个 token 解析并校验 `[0, 255]` 范围。
//! - `pack` 使用 `chunks_exact(4)` + `u32::from_be_bytes`，长度不是 4 的倍数时直接拒绝，
//!   不做截断猜测。

use serde::{Deserialize, Serialize};

use crate::error::TransferError;

/// 图片尺寸（像素）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 像素总数，溢出时返回 `None`。
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }
}

/// 按行优先、`[R,G,B,A]` 交错排列的像素缓冲。
///
/// 不变量：`bytes.len() == width * height * 4`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    dimensions: Dimensions,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(bytes: Vec<u8>, dimensions: Dimensions) -> Result<Self, TransferError> {
        let expected = dimensions
            .pixel_count()
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| TransferError::Format("图片尺寸溢出".to_string()))?;

        if bytes.len() != expected {
            return Err(TransferError::Format(format!(
                "像素长度 {} 与尺寸 {}x{} 不符（应为 {}）",
                bytes.len(),
                dimensions.width,
                dimensions.height,
                expected
            )));
        }

        Ok(Self { dimensions, bytes })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn pack(&self) -> PackedPixelBuffer {
        // 构造时已保证长度是 4 的倍数
        PackedPixelBuffer {
            words: pack_exact(&self.bytes),
        }
    }
}

/// 每像素一个 32 位字：`(R<<24)|(G<<16)|(B<<8)|A`。
///
/// 只能由 [`pack`] 或 [`PixelBuffer::pack`] 派生。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPixelBuffer {
    words: Vec<u32>,
}

impl PackedPixelBuffer {
    pub fn as_words(&self) -> &[u32] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// 还原为 `[R,G,B,A]` 交错字节。
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_be_bytes()).collect()
    }

    /// 结合尺寸还原为 [`PixelBuffer`]，字数与尺寸不符时报错。
    pub fn to_pixel_buffer(&self, dimensions: Dimensions) -> Result<PixelBuffer, TransferError> {
        PixelBuffer::new(self.to_rgba_bytes(), dimensions)
    }
}

/// 将逗号分隔的序列化字节串解析为字节序列。
///
/// 每个 token 允许前后空白；空输入、空 token、非整数或超出 `[0, 255]` 均为 `Format` 错误。
pub fn encode_blob(serialized: &str) -> Result<Vec<u8>, TransferError> {
    if serialized.trim().is_empty() {
        return Err(TransferError::Format("序列化字节串为空".to_string()));
    }

    serialized
        .split(',')
        .enumerate()
        .map(|(index, token)| {
            let token = token.trim();
            token.parse::<u8>().map_err(|_| {
                TransferError::Format(format!("第 {} 个 token {:?} 不是 0~255 的整数", index, token))
            })
        })
        .collect()
}

/// [`encode_blob`] 的逆操作。
pub fn serialize_blob(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| byte.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// 将交错 RGBA 字节打包为每像素一个大端 32 位字。
///
/// - `None`：`MissingInput`
/// - 长度不是 4 的倍数：`Format`
/// - 空切片：返回空缓冲
pub fn pack(pixels: Option<&[u8]>) -> Result<PackedPixelBuffer, TransferError> {
    let pixels = pixels.ok_or(TransferError::MissingInput("pixels"))?;

    if pixels.len() % 4 != 0 {
        return Err(TransferError::Format(format!(
            "像素字节数 {} 不是 4 的倍数",
            pixels.len()
        )));
    }

    Ok(PackedPixelBuffer {
        words: pack_exact(pixels),
    })
}

fn pack_exact(pixels: &[u8]) -> Vec<u32> {
    pixels
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
