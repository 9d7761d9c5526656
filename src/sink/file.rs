use std::fs;
use std::path::Path;

use crate::error::TransferError;

/// 以 `bytes` 作为文件完整内容写入 `path`，文件不存在时创建，存在时覆盖。
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), TransferError> {
    fs::write(path, bytes)?;
    log::debug!("💾 已写入 {} 字节到 {}", bytes.len(), path.display());
    Ok(())
}

/// 嗅探字节内容对应的图片格式，用于日志诊断。
pub fn sniff_image_format(bytes: &[u8]) -> Option<image::ImageFormat> {
    image::guess_format(bytes).ok()
}
