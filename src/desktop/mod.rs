//! # Tauri 桌面宿主
//!
//! ## 设计思路
//!
//! 桌面版中 webview 即渲染面，Rust 进程即特权宿主。本模块为 `host` 中的每个协作方
//! 提供 Tauri 实现，`commands` 则只做 IPC 入参/出参适配，不承载业务逻辑。
//!
//! ## 事件约定
//!
//! - `polacode://sync`：宿主 → 渲染面的 `SyncMessage`，只发往 `main` 窗口
//! - `polacode://editor-command`：请求嵌入方编辑器执行命令（如富文本复制）

pub mod commands;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tokio::sync::oneshot;

use crate::error::TransferError;
use crate::host::{EditorBridge, HostServices, Notifier, PendingPath, SaveDialog, SurfaceChannel};
use crate::protocol::SyncMessage;
use crate::settings::JsonSettingsSource;
use crate::sink::clipboard::ArboardClipboard;
use crate::storage::JsonStateStore;

/// 渲染面所在窗口
pub const SURFACE_WINDOW: &str = "main";
pub const SYNC_EVENT: &str = "polacode://sync";
pub const EDITOR_COMMAND_EVENT: &str = "polacode://editor-command";
pub const CLIPBOARD_COPY_COMMAND: &str = "editor.action.clipboardCopyAction";

const PANEL_TITLE: &str = "Polacode 📸";
const SETTINGS_FILE: &str = "settings.json";
const GLOBAL_STATE_FILE: &str = "global_state.json";

/// 应用数据目录下的文件路径，目录不存在时自动创建。
pub(crate) fn app_data_file(app: &AppHandle, name: &str) -> Result<PathBuf, TransferError> {
    let app_data_dir = app
        .path()
        .app_data_dir()
        .map_err(|e| TransferError::State(format!("获取应用数据目录失败: {}", e)))?;

    fs::create_dir_all(&app_data_dir)
        .map_err(|e| TransferError::State(format!("创建应用数据目录失败: {}", e)))?;

    Ok(app_data_dir.join(name))
}

/// 组装桌面版的全部宿主服务。
pub fn host_services(app: &AppHandle) -> Result<HostServices, TransferError> {
    let settings_path = app_data_file(app, SETTINGS_FILE)?;
    let state_path = app_data_file(app, GLOBAL_STATE_FILE)?;
    log::info!(
        "宿主服务初始化：settings={} state={}",
        settings_path.display(),
        state_path.display()
    );

    Ok(HostServices {
        channel: Arc::new(TauriChannel { app: app.clone() }),
        dialog: Arc::new(TauriSaveDialog { app: app.clone() }),
        notifier: Arc::new(TauriNotifier { app: app.clone() }),
        editor: Arc::new(TauriEditorBridge { app: app.clone() }),
        settings: Arc::new(JsonSettingsSource::new(settings_path)),
        state: Arc::new(JsonStateStore::new(state_path)),
        clipboard: Arc::new(ArboardClipboard::new()),
    })
}

struct TauriChannel {
    app: AppHandle,
}

impl SurfaceChannel for TauriChannel {
    fn post(&self, message: SyncMessage) -> Result<(), TransferError> {
        self.app
            .emit_to(SURFACE_WINDOW, SYNC_EVENT, message)
            .map_err(|e| TransferError::Channel(format!("发送同步消息失败: {}", e)))
    }
}

struct TauriSaveDialog {
    app: AppHandle,
}

impl SaveDialog for TauriSaveDialog {
    fn prompt(&self, default_path: &Path) -> PendingPath {
        let (tx, rx) = oneshot::channel();

        let mut builder = self.app.dialog().file().add_filter("Images", &["png"]);
        if let Some(dir) = default_path.parent() {
            builder = builder.set_directory(dir);
        }
        if let Some(name) = default_path.file_name() {
            builder = builder.set_file_name(name.to_string_lossy());
        }

        builder.save_file(move |file_path| {
            let path = file_path.and_then(|file_path| match file_path.into_path() {
                Ok(path) => Some(path),
                Err(err) => {
                    log::warn!("保存对话框返回了无法识别的路径: {}", err);
                    None
                }
            });
            let _ = tx.send(path);
        });

        // 对话框被关闭而未回调时视为取消
        Box::pin(async move { rx.await.ok().flatten() })
    }
}

struct TauriNotifier {
    app: AppHandle,
}

impl TauriNotifier {
    fn show(&self, text: &str, kind: MessageDialogKind) {
        self.app
            .dialog()
            .message(text)
            .title(PANEL_TITLE)
            .kind(kind)
            .show(|_| {});
    }
}

impl Notifier for TauriNotifier {
    fn info(&self, text: &str) {
        self.show(text, MessageDialogKind::Info);
    }

    fn error(&self, text: &str) {
        self.show(text, MessageDialogKind::Error);
    }
}

#[derive(Debug, Clone, Serialize)]
struct EditorCommandPayload {
    command: &'static str,
}

struct TauriEditorBridge {
    app: AppHandle,
}

impl EditorBridge for TauriEditorBridge {
    fn copy_selection_as_rich_text(&self) {
        if let Err(err) = self.app.emit(
            EDITOR_COMMAND_EVENT,
            EditorCommandPayload {
                command: CLIPBOARD_COPY_COMMAND,
            },
        ) {
            log::warn!("发送编辑器命令事件失败: {}", err);
        }
    }
}
