//! 选区同步
//!
//! 源编辑器中的选区变为非空时，先以富文本复制选区，再通知渲染面从剪贴板重新渲染。
//! 渲染面因此无需轮询剪贴板。监听器随面板激活安装、随面板销毁卸载。

use std::sync::Arc;

use serde::Deserialize;

use crate::error::TransferError;
use crate::host::{EditorBridge, SurfaceChannel};
use crate::protocol::SyncMessage;

/// 文档中的位置（行、列均从 0 开始）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// 一个选区，`anchor` 为起点，`active` 为光标所在端。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TextSelection {
    pub anchor: Position,
    pub active: Position,
}

impl TextSelection {
    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }
}

/// 已安装的选区监听器。
pub struct SelectionSync {
    editor: Arc<dyn EditorBridge>,
    channel: Arc<dyn SurfaceChannel>,
}

impl SelectionSync {
    pub fn install(editor: Arc<dyn EditorBridge>, channel: Arc<dyn SurfaceChannel>) -> Self {
        log::debug!("选区监听器已安装");
        Self { editor, channel }
    }

    /// 处理一次选区变更，返回是否触发了重新渲染。
    ///
    /// 只看主选区（第一个），与多选区合成无关。
    pub fn handle(&self, selections: &[TextSelection]) -> Result<bool, TransferError> {
        match selections.first() {
            Some(primary) if !primary.is_empty() => {
                self.editor.copy_selection_as_rich_text();
                self.channel.post(SyncMessage::RequestUpdate)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl Drop for SelectionSync {
    fn drop(&mut self) {
        log::debug!("选区监听器已卸载");
    }
}
