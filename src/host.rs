//! 宿主协作方接口
//!
//! # 设计思路
//!
//! 协调器运行在特权宿主进程中，但窗口、对话框、编辑器命令等都属于外部服务。
//! 这里为每个协作方定义一个最小 trait，由 [`HostServices`] 打包注入协调器：
//! 生产环境由 Tauri 桌面宿主实现，测试中由记录型替身实现。

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::error::TransferError;
use crate::protocol::SyncMessage;
use crate::settings::SettingsSource;
use crate::sink::clipboard::ClipboardSink;
use crate::storage::StateStore;

/// 等待用户在保存对话框中选择路径；`None` 表示取消。
pub type PendingPath = Pin<Box<dyn Future<Output = Option<PathBuf>> + Send + 'static>>;

/// 宿主 → 渲染面的消息通道（发出即忘，无确认）。
pub trait SurfaceChannel: Send + Sync {
    fn post(&self, message: SyncMessage) -> Result<(), TransferError>;
}

/// 保存文件对话框。
pub trait SaveDialog: Send + Sync {
    /// 弹出保存对话框，默认路径为 `default_path`，仅显示图片文件。
    fn prompt(&self, default_path: &Path) -> PendingPath;
}

/// 面向用户的非阻塞通知。
pub trait Notifier: Send + Sync {
    fn info(&self, text: &str);
    fn error(&self, text: &str);
}

/// 源编辑器命令桥接。
pub trait EditorBridge: Send + Sync {
    /// 以富文本形式复制当前选区（`editor.action.clipboardCopyAction`）。
    fn copy_selection_as_rich_text(&self);
}

/// 协调器依赖的全部外部服务。
#[derive(Clone)]
pub struct HostServices {
    pub channel: Arc<dyn SurfaceChannel>,
    pub dialog: Arc<dyn SaveDialog>,
    pub notifier: Arc<dyn Notifier>,
    pub editor: Arc<dyn EditorBridge>,
    pub settings: Arc<dyn SettingsSource>,
    pub state: Arc<dyn StateStore>,
    pub clipboard: Arc<dyn ClipboardSink>,
}
