//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 传输协调器中所有失败都收敛到 `TransferError`：
//! - `Format` / `MissingInput`：渲染面发来的消息已损坏，属于协议契约违规，直接向上抛出。
//! - `Io`：保存文件失败，沿保存流程向调用方传播，并经宿主错误通知告知用户。
//! - `Clipboard`：剪贴板写入失败，在 sink 边界被捕获并记录日志，不会中断协调器。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` 提供 `From` 转换，文件写入可直接 `?`。
//! - 实现 `Serialize` 将错误序列化为字符串，满足 Tauri IPC 要求。

use serde::Serialize;

/// 传输协调器统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// 序列化字节串或消息负载格式错误
    #[error("格式错误: {0}")]
    Format(String),

    /// 必需的输入缺失（例如剪贴板消息没有携带像素）
    #[error("缺少输入: {0}")]
    MissingInput(&'static str),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 剪贴板拒绝写入或平台不支持
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 向渲染面发送消息失败
    #[error("消息通道错误: {0}")]
    Channel(String),

    /// 持久化状态读写失败
    #[error("状态存储错误: {0}")]
    State(String),

    /// 面板生命周期状态不允许该操作
    #[error("面板状态错误: {0}")]
    Lifecycle(String),
}

/// Tauri IPC 要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for TransferError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(error: serde_json::Error) -> Self {
        Self::Format(error.to_string())
    }
}
