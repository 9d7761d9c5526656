//! 输出端适配器
//!
//! - `file`：将 PNG 字节原样写入用户选择的路径，错误向上传播
//! - `clipboard`：将打包后的像素写入系统剪贴板，错误由协调器捕获并记录

pub mod clipboard;
pub mod file;
